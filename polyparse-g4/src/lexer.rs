// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

//! Vocabulary and lexer modes of the grammar-description language.
//!
//! Bracketed content is ambiguous at the lexical level: `[a-z]` is a character set in a lexer
//! rule, but `[int x]` is a rule argument elsewhere. The `[` rule only emits `BEGIN_ARGUMENT`
//! and calls a hook; the [classifier](crate::classifier::G4Classifier) chooses the mode.

use polyparse_core::fixed_sym_table::FixedSymTable;
use polyparse_core::lexer::{HookId, LexerSpec, ModeId};
use polyparse_core::token::HIDDEN_CHANNEL;
use polyparse_core::{term, ContractError, TokenId};

pub const TOKEN_REF: TokenId = 0;
pub const RULE_REF: TokenId = 1;
pub const LEXER_CHAR_SET: TokenId = 2;
pub const DOC_COMMENT: TokenId = 3;
pub const BLOCK_COMMENT: TokenId = 4;
pub const LINE_COMMENT: TokenId = 5;
pub const INT: TokenId = 6;
pub const STRING_LITERAL: TokenId = 7;
pub const BEGIN_ARGUMENT: TokenId = 8;
pub const ACTION: TokenId = 9;
pub const OPTIONS: TokenId = 10;
pub const TOKENS: TokenId = 11;
pub const CHANNELS: TokenId = 12;
pub const IMPORT: TokenId = 13;
pub const FRAGMENT: TokenId = 14;
pub const LEXER: TokenId = 15;
pub const PARSER: TokenId = 16;
pub const GRAMMAR: TokenId = 17;
pub const PROTECTED: TokenId = 18;
pub const PUBLIC: TokenId = 19;
pub const PRIVATE: TokenId = 20;
pub const RETURNS: TokenId = 21;
pub const LOCALS: TokenId = 22;
pub const THROWS: TokenId = 23;
pub const CATCH: TokenId = 24;
pub const FINALLY: TokenId = 25;
pub const MODE: TokenId = 26;
pub const COLON: TokenId = 27;
pub const COLONCOLON: TokenId = 28;
pub const COMMA: TokenId = 29;
pub const SEMI: TokenId = 30;
pub const LPAREN: TokenId = 31;
pub const RPAREN: TokenId = 32;
pub const RBRACE: TokenId = 33;
pub const RARROW: TokenId = 34;
pub const LT: TokenId = 35;
pub const GT: TokenId = 36;
pub const ASSIGN: TokenId = 37;
pub const QUESTION: TokenId = 38;
pub const STAR: TokenId = 39;
pub const PLUS_ASSIGN: TokenId = 40;
pub const PLUS: TokenId = 41;
pub const OR: TokenId = 42;
pub const DOLLAR: TokenId = 43;
pub const RANGE: TokenId = 44;
pub const DOT: TokenId = 45;
pub const AT: TokenId = 46;
pub const POUND: TokenId = 47;
pub const NOT: TokenId = 48;
/// identifier before classification, never seen by the parser
pub const ID: TokenId = 49;
pub const WS: TokenId = 50;
pub const END_ARGUMENT: TokenId = 51;
pub const ARGUMENT_CONTENT: TokenId = 52;

static TERMINALS: [(&str, Option<&str>); 53] = [
    ("TOKEN_REF", None),
    ("RULE_REF", None),
    ("LEXER_CHAR_SET", None),
    ("DOC_COMMENT", None),
    ("BLOCK_COMMENT", None),
    ("LINE_COMMENT", None),
    ("INT", None),
    ("STRING_LITERAL", None),
    ("BEGIN_ARGUMENT", Some("[")),
    ("ACTION", None),
    ("OPTIONS", Some("options {")),
    ("TOKENS", Some("tokens {")),
    ("CHANNELS", Some("channels {")),
    ("IMPORT", Some("import")),
    ("FRAGMENT", Some("fragment")),
    ("LEXER", Some("lexer")),
    ("PARSER", Some("parser")),
    ("GRAMMAR", Some("grammar")),
    ("PROTECTED", Some("protected")),
    ("PUBLIC", Some("public")),
    ("PRIVATE", Some("private")),
    ("RETURNS", Some("returns")),
    ("LOCALS", Some("locals")),
    ("THROWS", Some("throws")),
    ("CATCH", Some("catch")),
    ("FINALLY", Some("finally")),
    ("MODE", Some("mode")),
    ("COLON", Some(":")),
    ("COLONCOLON", Some("::")),
    ("COMMA", Some(",")),
    ("SEMI", Some(";")),
    ("LPAREN", Some("(")),
    ("RPAREN", Some(")")),
    ("RBRACE", Some("}")),
    ("RARROW", Some("->")),
    ("LT", Some("<")),
    ("GT", Some(">")),
    ("ASSIGN", Some("=")),
    ("QUESTION", Some("?")),
    ("STAR", Some("*")),
    ("PLUS_ASSIGN", Some("+=")),
    ("PLUS", Some("+")),
    ("OR", Some("|")),
    ("DOLLAR", Some("$")),
    ("RANGE", Some("..")),
    ("DOT", Some(".")),
    ("AT", Some("@")),
    ("POUND", Some("#")),
    ("NOT", Some("~")),
    ("ID", None),
    ("WS", None),
    ("END_ARGUMENT", Some("]")),
    ("ARGUMENT_CONTENT", None),
];

pub const DEFAULT_MODE: ModeId = 0;
pub const ARGUMENT_MODE: ModeId = 1;
pub const CHAR_SET_MODE: ModeId = 2;
pub const ACTION_MODE: ModeId = 3;

/// `[` in the default mode
pub const HOOK_BEGIN_ARGUMENT: HookId = 0;
/// `]` in the argument mode
pub const HOOK_END_ARGUMENT: HookId = 1;
/// `}` in the action mode
pub const HOOK_END_ACTION: HookId = 2;

pub fn vocabulary() -> FixedSymTable {
    FixedSymTable::from_terminals(&TERMINALS)
}

pub fn lexer_spec() -> Result<LexerSpec, ContractError> {
    let hidden = term!(#HIDDEN_CHANNEL);
    LexerSpec::builder()
        .mode("DEFAULT_MODE")
        .rule("DOC_COMMENT", r"/\*\*(?:\*/|[^/][\s\S]*?(?:\*/|\z))", term!(=DOC_COMMENT) + hidden.clone())
        .rule("BLOCK_COMMENT", r"/\*[\s\S]*?(?:\*/|\z)", term!(=BLOCK_COMMENT) + hidden.clone())
        .rule("LINE_COMMENT", r"//[^\r\n]*", term!(=LINE_COMMENT) + hidden.clone())
        .rule("WS", r"[ \t\r\n\f]+", term!(=WS) + hidden)
        .rule("INT", "[0-9]+", term!(=INT))
        .rule("STRING_LITERAL", r"'(?:[^'\\\r\n]|\\.)*'", term!(=STRING_LITERAL))
        .rule("BEGIN_ARGUMENT", r"\[", term!(=BEGIN_ARGUMENT) + term!(hook HOOK_BEGIN_ARGUMENT))
        .rule("BEGIN_ACTION", r"\{", term!(more) + term!(push ACTION_MODE))
        .rule("OPTIONS", r"options[ \t\r\n\f]*\{", term!(=OPTIONS))
        .rule("TOKENS", r"tokens[ \t\r\n\f]*\{", term!(=TOKENS))
        .rule("CHANNELS", r"channels[ \t\r\n\f]*\{", term!(=CHANNELS))
        .rule("IMPORT", "import", term!(=IMPORT))
        .rule("FRAGMENT", "fragment", term!(=FRAGMENT))
        .rule("LEXER", "lexer", term!(=LEXER))
        .rule("PARSER", "parser", term!(=PARSER))
        .rule("GRAMMAR", "grammar", term!(=GRAMMAR))
        .rule("PROTECTED", "protected", term!(=PROTECTED))
        .rule("PUBLIC", "public", term!(=PUBLIC))
        .rule("PRIVATE", "private", term!(=PRIVATE))
        .rule("RETURNS", "returns", term!(=RETURNS))
        .rule("LOCALS", "locals", term!(=LOCALS))
        .rule("THROWS", "throws", term!(=THROWS))
        .rule("CATCH", "catch", term!(=CATCH))
        .rule("FINALLY", "finally", term!(=FINALLY))
        .rule("MODE", "mode", term!(=MODE))
        .rule("COLONCOLON", "::", term!(=COLONCOLON))
        .rule("COLON", ":", term!(=COLON))
        .rule("COMMA", ",", term!(=COMMA))
        .rule("SEMI", ";", term!(=SEMI))
        .rule("LPAREN", r"\(", term!(=LPAREN))
        .rule("RPAREN", r"\)", term!(=RPAREN))
        .rule("RBRACE", r"\}", term!(=RBRACE))
        .rule("RARROW", "->", term!(=RARROW))
        .rule("LT", "<", term!(=LT))
        .rule("GT", ">", term!(=GT))
        .rule("ASSIGN", "=", term!(=ASSIGN))
        .rule("QUESTION", r"\?", term!(=QUESTION))
        .rule("STAR", r"\*", term!(=STAR))
        .rule("PLUS_ASSIGN", r"\+=", term!(=PLUS_ASSIGN))
        .rule("PLUS", r"\+", term!(=PLUS))
        .rule("OR", r"\|", term!(=OR))
        .rule("DOLLAR", r"\$", term!(=DOLLAR))
        .rule("RANGE", r"\.\.", term!(=RANGE))
        .rule("DOT", r"\.", term!(=DOT))
        .rule("AT", "@", term!(=AT))
        .rule("POUND", "#", term!(=POUND))
        .rule("NOT", "~", term!(=NOT))
        .rule("ID", r"\p{L}[\p{L}\p{Nd}_]*", term!(=ID))

        // rule arguments, return values and locals: [ ... ], nested brackets included
        .mode("Argument")
        .unterminated("argument", Some(END_ARGUMENT))
        .rule("NESTED_ARGUMENT", r"\[", term!(=ARGUMENT_CONTENT) + term!(push ARGUMENT_MODE))
        .rule("ARGUMENT_ESCAPE", r"\\[\s\S]", term!(=ARGUMENT_CONTENT))
        .rule("ARGUMENT_STRING", r#""(?:[^"\\]|\\[\s\S])*""#, term!(=ARGUMENT_CONTENT))
        .rule("ARGUMENT_CHAR", r"'(?:[^'\\]|\\[\s\S])*'", term!(=ARGUMENT_CONTENT))
        .rule("ARGUMENT_TEXT", r#"[^\[\]"'\\]+"#, term!(=ARGUMENT_CONTENT))
        .rule("END_ARGUMENT", r"\]", term!(=END_ARGUMENT) + term!(pop) + term!(hook HOOK_END_ARGUMENT))
        .rule("ARGUMENT_ANY", r"[^\[\]]", term!(=ARGUMENT_CONTENT))

        // character set of a lexer rule: [a-z], gathered in one LEXER_CHAR_SET token
        .mode("LexerCharSet")
        .unterminated("character set", Some(LEXER_CHAR_SET))
        .rule("LEXER_CHAR_SET_BODY", r"(?:[^\]\\]|\\[\s\S])+", term!(more))
        .rule("LEXER_CHAR_SET", r"\]", term!(=LEXER_CHAR_SET) + term!(pop))

        // { ... }, gathered in one ACTION token
        .mode("Action")
        .unterminated("action", Some(ACTION))
        .rule("NESTED_ACTION", r"\{", term!(more) + term!(push ACTION_MODE))
        .rule("ACTION_ESCAPE", r"\\[\s\S]", term!(more))
        .rule("ACTION_STRING", r#""(?:[^"\\]|\\[\s\S])*""#, term!(more))
        .rule("ACTION_CHAR", r"'(?:[^'\\]|\\[\s\S])*'", term!(more))
        .rule("ACTION_COMMENT", r"/\*[\s\S]*?\*/", term!(more))
        .rule("ACTION_LINE_COMMENT", r"//[^\r\n]*", term!(more))
        .rule("ACTION_TEXT", r#"[^{}"'/\\]+"#, term!(more))
        .rule("END_ACTION", r"\}", term!(=ACTION) + term!(pop) + term!(hook HOOK_END_ACTION))
        .rule("ACTION_ANY", r"[^{}]", term!(more))
        .build()
}
