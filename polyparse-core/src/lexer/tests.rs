// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

#![cfg(test)]

mod base_lexer_tests {
    /*!
    ```
    lexicon Test1;
    channels { CH_1, CH_2 }

    fragment Chat           : '(' [ 0-9A-Za-z,.!?]* ')';

    Star                    : '*';
    Keyword                 : 'keyword';
    Id                      : [a-z][a-z0-9]*;

    ModeA                   : 'mode_a'                  -> mode(MODE_A);
    PushA                   : 'push_a'                  -> push(MODE_A);
    Ch1                     : '1' Chat                  -> channel(CH_1);
    Ch2                     : '2' Chat                  -> channel(CH_2);

    SkipWhiteSpace          : [ \n\r\t]+                -> skip;

    //------------------------------------------------------------------
    mode MODE_A;

    StarA                   : '*';
    KeywordA                : 'keyword'                 -> type(Keyword);
    ModeB                   : 'smode_b'                 -> skip, mode(MODE_B);
    MoreModeB               : 'b'                       -> more, mode(MODE_B);
    PushA2                  : 'push_a'                  -> push(MODE_A);
    PushB                   : 'spush_b'                 -> skip, push(MODE_B);
    PopFromA                : 'pop'                     -> pop;
    SkipWhiteSpaceA         : [ \n\r\t]+                -> skip;

    //------------------------------------------------------------------
    mode MODE_B;

    StarB                   : '*';
    KeywordB                : 'keyword'                 -> type(Keyword);
    PopFromB                : 'pop'                     -> pop;
    SkipWhiteSpaceB         : [ \n\r\t]+                -> skip;
    ```
    */

    use crate::lexer::{ChannelId, LexerSpec, ModeId};
    use crate::term;

    const CH_1          : ChannelId = 1;
    const CH_2          : ChannelId = 2;

    const MODE_A        : ModeId = 1;
    const MODE_B        : ModeId = 2;

    mod tok {
        use crate::TokenId;

        pub const STAR              : TokenId = 0 ; //          "*"
        pub const KEYWORD           : TokenId = 1 ; //          "keyword"
        pub const ID                : TokenId = 2 ; //          [a-z][a-z0-9]*
        pub const MODE_A            : TokenId = 3 ; //          "mode_a"
        pub const PUSH_A            : TokenId = 4 ; //          "push_a"
        pub const CH1               : TokenId = 5 ; //          "1(" [ 0-9A-Za-z,.!?] ")"
        pub const CH2               : TokenId = 6 ; //          "2(" [ 0-9A-Za-z,.!?] ")"
        pub const STAR_A            : TokenId = 7 ; //  MODE_A  "*"
        pub const PUSH_A2           : TokenId = 8 ; //  MODE_A  "push_a"
        pub const POP_FROM_A        : TokenId = 9 ; //  MODE_A  "pop"
        pub const STAR_B            : TokenId = 10; //  MODE_B  "*"
        pub const POP_FROM_B        : TokenId = 11; //  MODE_B  "pop"

        pub static NAMES: &[&str; 12] = &[
            "STAR", "KEYWORD", "ID", "MODE_A", "PUSH_A", "CH1", "CH2", "STAR_A",
            "PUSH_A2", "POP_FROM_A", "STAR_B", "POP_FROM_B"
        ];
    }

    use tok::*;

    fn build_spec() -> LexerSpec {
        LexerSpec::builder()
            .mode("DEFAULT_MODE")
            .rule("Star", r"\*", term!(=STAR))
            .rule("Keyword", "keyword", term!(=KEYWORD))
            .rule("Id", "[a-z][a-z0-9]*", term!(=ID))
            .rule("ModeA", "mode_a", term!(=tok::MODE_A) + term!(mode MODE_A))
            .rule("PushA", "push_a", term!(=PUSH_A) + term!(push MODE_A))
            .rule("Ch1", r"1\([ 0-9A-Za-z,.!?]*\)", term!(=CH1) + term!(#CH_1))
            .rule("Ch2", r"2\([ 0-9A-Za-z,.!?]*\)", term!(=CH2) + term!(#CH_2))
            .rule("SkipWhiteSpace", r"[ \n\r\t]+", term!(skip))
            .mode("MODE_A")
            .rule("StarA", r"\*", term!(=STAR_A))
            .rule("KeywordA", "keyword", term!(=KEYWORD))
            .rule("ModeB", "smode_b", term!(skip) + term!(mode MODE_B))
            .rule("MoreModeB", "b", term!(more) + term!(mode MODE_B))
            .rule("PushA2", "push_a", term!(=PUSH_A2) + term!(push MODE_A))
            .rule("PushB", "spush_b", term!(skip) + term!(push MODE_B))
            .rule("PopFromA", "pop", term!(=POP_FROM_A) + term!(pop))
            .rule("SkipWhiteSpaceA", r"[ \n\r\t]+", term!(skip))
            .mode("MODE_B")
            .rule("StarB", r"\*", term!(=STAR_B))
            .rule("KeywordB", "keyword", term!(=KEYWORD))
            .rule("PopFromB", "pop", term!(=POP_FROM_B) + term!(pop))
            .rule("SkipWhiteSpaceB", r"[ \n\r\t]+", term!(skip))
            .build()
            .expect("lexer spec should build")
    }

    mod lexicon {
        use crate::{CollectJoin, TokenId};
        use crate::error::ErrorKind;
        use crate::lexer::{no_classifier, Lexer, Pos, PosSpan};
        use crate::token::{Token, EOF};
        use super::*;
        use super::tok::*;

        #[test]
        fn test_iter() {
            let tests: Vec<(&str, &str, Vec<TokenId>, Vec<TokenId>, Vec<TokenId>, Vec<&str>, Vec<&str>, Vec<&str>)> = vec![
                // input, errors, ch[0], ch[1], ch[2], ch_s[0], ch_s[1], ch_s[2]
                ( // 0
                    "*", "",
                    vec![STAR], vec![], vec![],
                    vec!["*"], vec![], vec![],
                ),
                ( // 1
                    " * ", "",
                    vec![STAR], vec![], vec![],
                    vec!["*"], vec![], vec![],
                ),
                ( // 2
                    "mode_a *", "",
                    vec![tok::MODE_A, STAR_A], vec![], vec![],
                    vec!["mode_a", "*"], vec![], vec![],
                ),
                ( // 3
                    "push_a * spush_b * pop * pop *", "",
                    vec![PUSH_A, STAR_A, STAR_B, POP_FROM_B, STAR_A, POP_FROM_A, STAR], vec![], vec![],
                    vec!["push_a", "*", "*", "pop", "*", "pop", "*"], vec![], vec![],
                ),
                ( // 4
                    "mode_a b*", "",
                    vec![tok::MODE_A, STAR_B], vec![], vec![],
                    vec!["mode_a", "b*"], vec![], vec![],
                ),
                ( // 5
                    "mode_a * keyword smode_b * keyword", "",
                    vec![tok::MODE_A, STAR_A, KEYWORD, STAR_B, KEYWORD], vec![], vec![],
                    vec!["mode_a", "*", "keyword", "*", "keyword"], vec![], vec![],
                ),
                ( // 6
                    "1(hello)2(world)", "",
                    vec![], vec![CH1], vec![CH2],
                    vec![], vec!["1(hello)"], vec!["2(world)"],
                ),
                ( // 7
                    "*+", "line 1:1 token recognition error at: '+'",
                    vec![STAR], vec![], vec![],
                    vec!["*"], vec![], vec![],
                ),
                ( // 8
                    "", "",
                    vec![], vec![], vec![],
                    vec![], vec![], vec![],
                ),
                ( // 9
                    "a\n push_a *", "line 2:1 unterminated MODE_A",
                    vec![ID, PUSH_A, STAR_A], vec![], vec![],
                    vec!["a", "push_a", "*"], vec![], vec![],
                ),
                ( // 10
                    "mode_a pop *", "line 1:7 mode stack underflow at: 'pop'",
                    vec![tok::MODE_A, POP_FROM_A, STAR_A], vec![], vec![],
                    vec!["mode_a", "pop", "*"], vec![], vec![],
                ),
                ( // 11
                    "+*#", "line 1:0 token recognition error at: '+'; line 1:2 token recognition error at: '#'",
                    vec![STAR], vec![], vec![],
                    vec!["*"], vec![], vec![],
                ),
                ( // 12
                    "mode_a * b", "line 1:9 token recognition error at: 'b'",
                    vec![tok::MODE_A, STAR_A], vec![], vec![],
                    vec!["mode_a", "*"], vec![], vec![],
                ),
            ];
            const VERBOSE: bool = false;
            static INDENT1: &str = "                ";
            static INDENT2: &str = "                    ";
            let spec = build_spec();
            for (id, (text, exp_err, exp_ch0, exp_ch1, exp_ch2, exp_ch_s0, exp_ch_s1, exp_ch_s2)) in tests.into_iter().enumerate() {
                let mut lexer = Lexer::new(&spec, text, no_classifier());
                let mut ch = vec![vec![], vec![], vec![]];
                let mut ch_s = vec![vec![], vec![], vec![]];
                for token in lexer.tokens() {
                    if token.is_eof() {
                        break;
                    }
                    assert!(token.channel <= CH_2, "unexpected channel id {}", token.channel);
                    ch[token.channel as usize].push(token.kind);
                    ch_s[token.channel as usize].push(token.text);
                };
                let err = lexer.take_errors().iter().join("; ");
                if VERBOSE {
                    println!("{INDENT1}( // {id}\n{INDENT2}{text:?}, {err:?},");
                    println!("{INDENT2}{},", (0..3).map(|i| format!("vec![{}]", ch[i].iter().map(|&t| NAMES[t as usize]).join(", "))).join(", "));
                    println!("{INDENT2}{},", (0..3).map(|i| format!("vec![{}]", ch_s[i].iter().map(|s| format!("{s:?}")).join(", "))).join(", "));
                    println!("{INDENT1}),");
                }
                let msg = format!("## ERROR in test {id}");
                assert_eq!(err, exp_err, "{msg}: unexpected errors");
                assert_eq!(ch[0], exp_ch0, "{msg}: mismatch in channel 0");
                assert_eq!(ch[1], exp_ch1, "{msg}: mismatch in channel 1");
                assert_eq!(ch[2], exp_ch2, "{msg}: mismatch in channel 2");
                assert_eq!(ch_s[0], exp_ch_s0, "{msg}: mismatch in channel 0");
                assert_eq!(ch_s[1], exp_ch_s1, "{msg}: mismatch in channel 1");
                assert_eq!(ch_s[2], exp_ch_s2, "{msg}: mismatch in channel 2");
                assert!(lexer.state().is_eof(), "{msg}: lexer should be at the end");
                assert_eq!(lexer.state().modes().depth(), 1, "{msg}: modes should be unwound");
                assert_eq!(lexer.state().pushes(), lexer.state().pops(), "{msg}: pushes and pops should balance");
            }
        }

        #[test]
        fn test_next_token() {
            let spec = build_spec();
            let text = "* id 1()";
            let mut lexer = Lexer::new(&spec, text, no_classifier());
            let t = lexer.next_token();
            assert_eq!((t.kind, t.channel, t.text.as_str(), t.span()), (STAR, 0, "*", PosSpan::new(Pos(1, 0), Pos(1, 0))));
            assert_eq!((t.start, t.stop, t.index), (0, 1, 0));
            let t = lexer.next_token();
            assert_eq!((t.kind, t.channel, t.text.as_str(), t.span()), (ID, 0, "id", PosSpan::new(Pos(1, 2), Pos(1, 3))));
            assert_eq!(t.index, 1);
            let t = lexer.next_token();
            assert_eq!((t.kind, t.channel, t.text.as_str(), t.span()), (CH1, CH_1, "1()", PosSpan::new(Pos(1, 5), Pos(1, 7))));
            assert!(!lexer.state().is_eof());
            let t = lexer.next_token();
            assert_eq!((t.kind, t.start, t.pos(), t.index), (EOF, 8, Pos(1, 8), 3));
            assert!(lexer.state().is_eof());
            assert!(!lexer.has_errors());

            let text = "\n *+";
            let mut lexer = Lexer::new(&spec, text, no_classifier());
            let t = lexer.next_token();
            assert_eq!((t.kind, t.text.as_str(), t.pos()), (STAR, "*", Pos(2, 1)));
            let t = lexer.next_token();
            assert!(t.is_eof());
            assert_eq!(t.pos(), Pos(2, 3));
            let errors = lexer.take_errors();
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].to_string(), "line 2:2 token recognition error at: '+'");
            assert_eq!(errors[0].offset, 3);
            assert!(errors[0].is_lexer());

            // text kept by a 'more' rule when the input ends
            let mut lexer = Lexer::new(&spec, "mode_a b", no_classifier());
            let t = lexer.next_token();
            assert_eq!((t.kind, t.index), (tok::MODE_A, 0));
            let t = lexer.next_token();
            assert_eq!((t.kind, t.start, t.index), (EOF, 8, 1));
            let errors = lexer.take_errors();
            assert_eq!(errors.iter().map(|e| (e.kind, e.offset, e.to_string())).collect::<Vec<_>>(),
                       vec![(ErrorKind::IncompleteToken, 7, "line 1:7 token recognition error at: 'b'".to_string())]);
            assert!(errors[0].is_lexer());
        }

        #[test]
        fn test_token_display() {
            let spec = build_spec();
            let tokens = Lexer::new(&spec, "a 2(x)", no_classifier()).tokens().collect::<Vec<Token>>();
            let result = tokens.iter().map(|t| t.to_string()).to_vec();
            assert_eq!(result, vec![
                "[@0,0:0='a',<2>,1:0]",
                "[@1,2:5='2(x)',<6>,channel=2,1:2]",
                "[@2,6:5='<EOF>',<65535>,1:6]",
            ]);
        }
    }
}

mod spec_tests {
    use crate::error::ContractError;
    use crate::lexer::{LexerSpec, ModeStack, Pos, Terminal, ActionOption, ModeOption};
    use crate::term;

    #[test]
    fn test_spec_errors() {
        let results = vec![
            LexerSpec::builder().build().err(),
            LexerSpec::builder().rule("A", "a*", term!(=0)).build().err(),
            LexerSpec::builder().rule("P", "(a", term!(=0)).build().err().map(|e| match e {
                ContractError::InvalidPattern { rule, .. } => ContractError::InvalidPattern { rule, message: String::new() },
                e => e,
            }),
            LexerSpec::builder().rule("B", "b", term!(=0) + term!(push 3)).build().err(),
            LexerSpec::builder().mode("M").rule("B", "b", term!(=0)).build().err(),
        ];
        let expected = vec![
            Some(ContractError::NoLexerMode),
            Some(ContractError::EmptyPattern { rule: "A".to_string() }),
            Some(ContractError::InvalidPattern { rule: "P".to_string(), message: String::new() }),
            Some(ContractError::UnknownMode { rule: "B".to_string(), mode: 3 }),
            None,
        ];
        for (id, (result, expected)) in results.into_iter().zip(expected).enumerate() {
            assert_eq!(result, expected, "test {id} failed");
        }
    }

    #[test]
    fn test_terminal_add() {
        let tests = vec![
            (term!(=1) + term!(push 2), Terminal { action: ActionOption::Token(1), mode: ModeOption::Push(2), ..Default::default() }),
            (term!(more) + term!(pop) + term!(hook 4), Terminal { action: ActionOption::More, pop: true, hook: Some(4), ..Default::default() }),
            (term!(skip) + term!(=3) + term!(#1), Terminal { action: ActionOption::Token(3), channel: 1, ..Default::default() }),
            (term!(mode 1) + term!(push 2), Terminal { mode: ModeOption::Mode(1), ..Default::default() }),
        ];
        for (id, (result, expected)) in tests.into_iter().enumerate() {
            assert_eq!(result, expected, "test {id} failed");
        }
        assert_eq!((term!(=2) + term!(pop)).to_string(), "<end:2,pop>");
        assert!(term!(skip).is_only_skip());
    }

    #[test]
    fn test_mode_stack() {
        let mut stack = ModeStack::new();
        assert_eq!((stack.mode(), stack.depth()), (0, 1));
        assert_eq!(stack.pop(), None);
        assert_eq!(stack.outermost_open(), None);
        stack.push(2, Pos(1, 4), 4);
        stack.push(1, Pos(2, 0), 10);
        assert_eq!((stack.mode(), stack.depth()), (1, 3));
        assert_eq!(stack.outermost_open().map(|f| f.opened_at), Some(Pos(1, 4)));
        stack.set_mode(3);
        assert_eq!(stack.pop().map(|f| (f.mode, f.offset)), Some((3, 10)));
        assert_eq!(stack.pop().map(|f| f.mode), Some(2));
        assert_eq!(stack.pop(), None);
        assert_eq!(stack.mode(), 0);
    }
}

mod classifier_tests {
    use crate::lexer::{HookId, Lexer, LexerControl, LexerSpec, ModeId, TokenClassifier};
    use crate::token::Token;
    use crate::{term, CollectJoin, TokenId};

    const ID: TokenId = 0;
    const BLOCK: TokenId = 1;
    const KW_IF: TokenId = 2;

    const BLOCK_MODE: ModeId = 1;
    const END_BLOCK: HookId = 0;

    /// Nested `{...}` blocks are gathered in a single BLOCK token; `if` is a keyword.
    #[derive(Default)]
    struct BlockClassifier {
        nbr_tokens: usize,
    }

    impl TokenClassifier for BlockClassifier {
        fn reset(&mut self) {
            self.nbr_tokens = 0;
        }

        fn lexer_hook(&mut self, hook: HookId, ctl: &mut LexerControl<'_>) {
            if hook == END_BLOCK {
                if ctl.mode_depth() > 1 {
                    ctl.more();
                } else {
                    ctl.set_kind(BLOCK);
                }
            }
        }

        fn classify(&mut self, token: &mut Token) {
            self.nbr_tokens += 1;
            if token.kind == ID && token.text == "if" {
                assert!(token.reclassify(KW_IF));
                assert!(!token.reclassify(ID));
            }
        }
    }

    fn build_spec() -> LexerSpec {
        LexerSpec::builder()
            .mode("DEFAULT_MODE")
            .rule("ID", "[a-z]+", term!(=ID))
            .rule("OPEN", r"\{", term!(more) + term!(push BLOCK_MODE))
            .rule("WS", r"\s+", term!(skip))
            .mode("BLOCK")
            .unterminated("block", Some(BLOCK))
            .rule("NESTED", r"\{", term!(more) + term!(push BLOCK_MODE))
            .rule("CLOSE", r"\}", term!(pop) + term!(hook END_BLOCK))
            .rule("TEXT", r"[^{}]+", term!(more))
            .build()
            .expect("lexer spec should build")
    }

    #[test]
    fn test_hooks() {
        let tests: Vec<(&str, Vec<(TokenId, &str)>, &str, (usize, usize))> = vec![
            // input, tokens, errors, (pushes, pops)
            ("a {x {y} z} b", vec![(ID, "a"), (BLOCK, "{x {y} z}"), (ID, "b")], "", (2, 2)),
            ("if {}", vec![(KW_IF, "if"), (BLOCK, "{}")], "", (1, 1)),
            ("a {x {y}", vec![(ID, "a"), (BLOCK, "{x {y}")], "line 1:2 unterminated block", (2, 2)),
            ("{", vec![(BLOCK, "{")], "line 1:0 unterminated block", (1, 1)),
            ("a }", vec![(ID, "a")], "line 1:2 token recognition error at: '}'", (0, 0)),
        ];
        let spec = build_spec();
        for (id, (text, exp_tokens, exp_err, exp_counts)) in tests.into_iter().enumerate() {
            let mut lexer = Lexer::new(&spec, text, Box::new(BlockClassifier::default()));
            let tokens = lexer.tokens().filter(|t| !t.is_eof()).map(|t| (t.kind, t.text)).to_vec();
            let tokens = tokens.iter().map(|(k, s)| (*k, s.as_str())).to_vec();
            let err = lexer.take_errors().iter().join("; ");
            let counts = (lexer.state().pushes(), lexer.state().pops());
            assert_eq!(tokens, exp_tokens, "test {id} failed");
            assert_eq!(err, exp_err, "test {id} failed");
            assert_eq!(counts, exp_counts, "test {id} failed");
            assert!(lexer.state().is_balanced(), "test {id} failed");
        }
    }
}
