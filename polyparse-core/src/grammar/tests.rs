// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

#![cfg(test)]

use std::collections::BTreeSet;
use crate::error::ContractError;
use crate::fixed_sym_table::FixedSymTable;
use crate::grammar::{opt, star, GrammarBuilder, Item};
use crate::lexer::LexerSpec;
use crate::log::{LogStatus, Severity};
use crate::token::EOF;
use crate::{seq, strip, term, CollectJoin, TokenId};

const ID: TokenId = 0;
const NUM: TokenId = 1;
const COMMA: TokenId = 2;
const SEMI: TokenId = 3;
const LPAREN: TokenId = 4;
const RPAREN: TokenId = 5;
const EQ: TokenId = 6;

fn vocabulary() -> FixedSymTable {
    FixedSymTable::from_terminals(&[
        ("ID", None), ("NUM", None), ("COMMA", Some(",")), ("SEMI", Some(";")),
        ("LPAREN", Some("(")), ("RPAREN", Some(")")), ("EQ", Some("=")),
    ])
}

fn lexer() -> LexerSpec {
    LexerSpec::builder()
        .rule("ID", "[a-z]+", term!(=ID))
        .rule("NUM", "[0-9]+", term!(=NUM))
        .rule("COMMA", ",", term!(=COMMA))
        .rule("SEMI", ";", term!(=SEMI))
        .rule("LPAREN", r"\(", term!(=LPAREN))
        .rule("RPAREN", r"\)", term!(=RPAREN))
        .rule("EQ", "=", term!(=EQ))
        .rule("WS", r"\s+", term!(skip))
        .build()
        .expect("lexer spec should build")
}

/// ```text
/// stmts: stmt (';' stmt)* EOF;
/// stmt:  ID '=' expr | expr;
/// expr:  ID | NUM | '(' args? ')';
/// args:  expr (',' expr)*;
/// ```
fn statements(k: usize) -> GrammarBuilder {
    GrammarBuilder::new("statements", vocabulary(), lexer())
        .rule("stmts", vec![seq!["stmt", star(seq![SEMI, "stmt"]), EOF]])
        .rule("stmt", vec![seq![ID, EQ, "expr"], seq!["expr"]])
        .rule("expr", vec![seq![ID], seq![NUM], seq![LPAREN, opt(seq!["args"]), RPAREN]])
        .rule("args", vec![seq!["expr", star(seq![COMMA, "expr"])]])
        .lookahead(k)
}

#[test]
fn test_flatten() {
    let grammar = statements(1).build().expect("grammar should build");
    let expected = [
        "stmts -> stmt stmts_1 <EOF>",
        "stmt -> ID = expr | expr",
        "expr -> ID | NUM | ( expr_1 )",
        "args -> expr args_1",
        "stmts_1 -> ; stmt stmts_1 | ε",
        "expr_1 -> args | ε",
        "args_1 -> , expr args_1 | ε",
    ];
    assert_eq!(grammar.rules_to_str(), expected.join("\n"));
    assert_eq!((grammar.num_rules(), grammar.num_named_rules()), (7, 4));
    assert_eq!(grammar.find_rule("args"), Some(3));
    assert_eq!(grammar.find_rule("args_1"), None);
    assert_eq!(grammar.owner_name(6), "args");
    assert!(grammar.is_synthetic(4));
    assert!(!grammar.is_synthetic(1));
    assert!(grammar.rule(4).is_repeat());
}

#[test]
fn test_sets() {
    let grammar = statements(1).build().expect("grammar should build");
    let tests: Vec<(u16, bool, Vec<TokenId>, Vec<TokenId>)> = vec![
        // var, nullable, first, follow
        (0, false, vec![ID, NUM, LPAREN], vec![EOF]),
        (1, false, vec![ID, NUM, LPAREN], vec![SEMI, EOF]),
        (2, false, vec![ID, NUM, LPAREN], vec![COMMA, SEMI, RPAREN, EOF]),
        (3, false, vec![ID, NUM, LPAREN], vec![RPAREN]),
        (4, true, vec![SEMI], vec![EOF]),
        (5, true, vec![ID, NUM, LPAREN], vec![RPAREN]),
        (6, true, vec![COMMA], vec![RPAREN]),
    ];
    for (id, (var, nullable, first, follow)) in tests.into_iter().enumerate() {
        assert_eq!(grammar.is_nullable(var), nullable, "test {id} failed");
        assert_eq!(grammar.first(var).iter().cloned().to_vec(), first, "test {id} failed");
        assert_eq!(grammar.follow(var).iter().cloned().to_vec(), follow, "test {id} failed");
    }
    let (first, nullable) = grammar.alt_first(5, 1);
    assert!(first.is_empty() && nullable);
}

#[test]
fn test_opcodes() {
    let grammar = statements(1).build().expect("grammar should build");
    let tests = vec![
        (0, 0, strip!(exit 0, t EOF, nt 4, nt 1)),
        (1, 0, strip!(exit 1, nt 2, t EQ, t ID)),
        (2, 2, strip!(exit 2, t RPAREN, nt 5, t LPAREN)),
        (4, 0, strip!(loop 4, nt 1, t SEMI)),
        (4, 1, strip!()),
        (5, 0, strip!(nt 3)),
    ];
    for (id, (var, alt, expected)) in tests.into_iter().enumerate() {
        assert_eq!(grammar.opcodes(var, alt), expected.as_slice(), "test {id} failed");
    }
    let symtab = grammar.get_symbol_table();
    assert_eq!(grammar.opcodes(2, 2).iter().map(|op| op.to_str(Some(symtab))).join(" "), "◄expr ) ►expr_1 (");
    assert_eq!(grammar.first_of_ops(grammar.opcodes(4, 0)), (BTreeSet::from([SEMI]), false));
    assert_eq!(grammar.first_of_ops(&strip!(exit 2, nt 5)), (BTreeSet::from([ID, NUM, LPAREN]), true));
}

#[test]
fn test_decisions() {
    let grammar = statements(1).build().expect("grammar should build");
    let ids = grammar.decisions().iter().map(|d| (d.id, d.var)).to_vec();
    assert_eq!(ids, vec![(0, 1), (1, 2), (2, 4), (3, 5), (4, 6)]);
    assert_eq!(grammar.decision(0), None);
    let warnings = grammar.messages(Severity::Warning).cloned().to_vec();
    assert_eq!(warnings, vec![
        "rule stmt (decision 0, stmt): alternatives 1 and 2 can both start with ID; alternative 1 will be chosen".to_string()
    ]);
    assert_eq!(grammar.num_notes(), 0);

    let grammar = statements(2).build().expect("grammar should build");
    assert_eq!(grammar.lookahead_depth(), 2);
    assert!(grammar.has_no_warnings(), "unexpected warnings:\n{}", grammar.diagnostics_str());
    let decision = grammar.decision(1).expect("stmt should have a decision");
    assert_eq!(decision.alts[0].complete, BTreeSet::from([vec![ID, EQ]]));
    assert!(!decision.alts[0].is_context_dependent());
    assert_eq!(decision.alts[1].open, BTreeSet::from([vec![ID], vec![NUM]]));
    assert_eq!(decision.alts[1].complete.len(), 4);
    assert!(decision.alts[1].matches_complete(&[LPAREN, RPAREN]));
    assert!(decision.alts[1].matches_open(&[ID, SEMI]));
    assert!(!decision.alts[1].matches_open(&[LPAREN, SEMI]));
    let decision = grammar.decision(4).expect("stmts_1 should have a decision");
    assert_eq!(decision.alts[1].open, BTreeSet::from([vec![]]));
    assert!(decision.alts[1].matches_open(&[EOF]));
}

#[test]
fn test_notes() {
    // context-dependent optional item and unreachable rule
    let grammar = GrammarBuilder::new("notes", vocabulary(), lexer())
        .rule("s", vec![seq!["x", ID, EOF]])
        .rule("x", vec![seq![opt(seq![ID])]])
        .rule("orphan", vec![seq![NUM]])
        .build()
        .expect("grammar should build");
    let notes = grammar.messages(Severity::Note).cloned().to_vec();
    assert_eq!(notes, vec![
        "rule x (decision 0, x_1): alternative 2 depends on the context for ID".to_string(),
        "rules not reachable from s: orphan".to_string(),
    ]);
    assert!(grammar.has_no_warnings());
    assert!(grammar.has_no_errors());
}

#[test]
fn test_start_rule() {
    let grammar = statements(1).start("expr").build().expect("grammar should build");
    assert_eq!(grammar.start(), 2);
    assert_eq!(grammar.follow(2).iter().cloned().to_vec(), vec![COMMA, SEMI, RPAREN, EOF]);
    let notes = grammar.messages(Severity::Note).cloned().to_vec();
    assert_eq!(notes, vec!["rules not reachable from expr: stmts, stmt".to_string()]);
}

#[test]
fn test_contract_errors() {
    fn builder() -> GrammarBuilder {
        GrammarBuilder::new("g", vocabulary(), lexer())
    }
    let name = || "g".to_string();
    let tests: Vec<(GrammarBuilder, ContractError)> = vec![
        (builder(), ContractError::EmptyGrammar { grammar: name() }),
        (builder().rule("a", vec![seq![ID]]).lookahead(0), ContractError::InvalidLookahead { grammar: name() }),
        (builder().rule("a", vec![seq![ID]]).rule("a", vec![seq![NUM]]),
         ContractError::DuplicateRule { grammar: name(), rule: "a".to_string() }),
        (builder().rule("a", vec![seq![ID, "b"]]),
         ContractError::UnknownRule { grammar: name(), from: "a".to_string(), rule: "b".to_string() }),
        (builder().rule("a", vec![seq![ID], vec![Item::T(99)]]),
         ContractError::UnknownToken { grammar: name(), from: "a".to_string(), token: 99 }),
        (builder().rule("a", vec![seq![ID]]).start("z"),
         ContractError::NoSuchRule { grammar: name(), rule: "z".to_string() }),
        (builder().rule("a", vec![seq!["a", ID], seq![ID]]),
         ContractError::LeftRecursion { grammar: name(), rule: "a".to_string() }),
        // through a nullable prefix
        (builder().rule("a", vec![seq![opt(seq![NUM]), "a", ID], seq![ID]]),
         ContractError::LeftRecursion { grammar: name(), rule: "a".to_string() }),
        // indirect
        (builder().rule("a", vec![seq!["b", ID]]).rule("b", vec![seq!["a", NUM], seq![NUM]]),
         ContractError::LeftRecursion { grammar: name(), rule: "a".to_string() }),
        (builder().rule("a", vec![seq![star(seq![opt(seq![ID])]), EOF]]),
         ContractError::EmptyLoop { grammar: name(), rule: "a".to_string() }),
    ];
    for (id, (builder, expected)) in tests.into_iter().enumerate() {
        match builder.build() {
            Ok(_) => panic!("test {id} failed: no error, expected {expected}"),
            Err(e) => assert_eq!(e, expected, "test {id} failed"),
        }
    }
}
