// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

//! Parses arithmetic expressions with a small layered grammar:
//!
//! ```text
//! start   : sum EOF ;
//! sum     : product (('+' | '-') product)* ;
//! product : atom (('*' | '/') atom)* ;
//! atom    : NUM | '(' sum ')' | '-' atom ;
//!
//! WS      : [ \t\r\n]+ -> channel(HIDDEN) ;
//! ```

use once_cell::sync::Lazy;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;
use polyparse_core::fixed_sym_table::FixedSymTable;
use polyparse_core::grammar::{group_of, star};
use polyparse_core::lexer::LexerSpec;
use polyparse_core::log::LogStatus;
use polyparse_core::token::{EOF, HIDDEN_CHANNEL};
use polyparse_core::{parse, seq, term, Grammar, GrammarBuilder, TokenId};
use tracing_subscriber::EnvFilter;

const NUM: TokenId = 0;
const PLUS: TokenId = 1;
const MINUS: TokenId = 2;
const STAR: TokenId = 3;
const SLASH: TokenId = 4;
const LPAREN: TokenId = 5;
const RPAREN: TokenId = 6;
const WS: TokenId = 7;

static GRAMMAR: Lazy<Grammar> = Lazy::new(|| {
    let vocabulary = FixedSymTable::from_terminals(&[
        ("NUM", None), ("PLUS", Some("+")), ("MINUS", Some("-")), ("STAR", Some("*")), ("SLASH", Some("/")),
        ("LPAREN", Some("(")), ("RPAREN", Some(")")), ("WS", None),
    ]);
    let lexer = LexerSpec::builder()
        .rule("NUM", "[0-9]+", term!(=NUM))
        .rule("PLUS", r"\+", term!(=PLUS))
        .rule("MINUS", "-", term!(=MINUS))
        .rule("STAR", r"\*", term!(=STAR))
        .rule("SLASH", "/", term!(=SLASH))
        .rule("LPAREN", r"\(", term!(=LPAREN))
        .rule("RPAREN", r"\)", term!(=RPAREN))
        .rule("WS", r"[ \t\r\n]+", term!(=WS) + term!(#HIDDEN_CHANNEL))
        .build()
        .expect("lexer spec should build");
    GrammarBuilder::new("expressions", vocabulary, lexer)
        .rule("start", vec![seq!["sum", EOF]])
        .rule("sum", vec![seq!["product", star(seq![group_of(vec![seq![PLUS], seq![MINUS]]), "product"])]])
        .rule("product", vec![seq!["atom", star(seq![group_of(vec![seq![STAR], seq![SLASH]]), "atom"])]])
        .rule("atom", vec![seq![NUM], seq![LPAREN, "sum", RPAREN], seq![MINUS, "atom"]])
        .build()
        .expect("grammar should build")
});

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn test_grammar() {
    assert!(GRAMMAR.has_no_warnings(), "unexpected warnings:\n{}", GRAMMAR.diagnostics_str());
    assert_eq!(GRAMMAR.rule_name(GRAMMAR.start()), "start");
    assert_eq!(GRAMMAR.t_display(PLUS), "'+'");
    assert_eq!(GRAMMAR.t_display(NUM), "NUM");
}

#[rstest]
#[case::number("7", "(start (sum (product (atom 7))) <EOF>)")]
#[case::precedence("1 + 2 * 3", "(start (sum (product (atom 1)) + (product (atom 2) * (atom 3))) <EOF>)")]
#[case::left_to_right("8 / 4 / 2", "(start (sum (product (atom 8) / (atom 4) / (atom 2))) <EOF>)")]
#[case::parentheses("(1 - 2)", "(start (sum (product (atom ( (sum (product (atom 1)) - (product (atom 2))) )))) <EOF>)")]
#[case::negation("--3", "(start (sum (product (atom - (atom - (atom 3))))) <EOF>)")]
fn tree(#[case] source: &str, #[case] expected: &str) {
    init_tracing();
    let result = parse(&GRAMMAR, source);
    assert!(result.is_success(), "errors: {:?}", result.errors);
    assert_eq!(result.tree.to_string_tree(&GRAMMAR), expected);
}

#[rstest]
#[case::dangling_operator("1 +")]
#[case::unclosed("(1 + 2")]
#[case::two_numbers("1 2")]
#[case::empty_parentheses("()")]
fn rejected(#[case] source: &str) {
    init_tracing();
    let result = parse(&GRAMMAR, source);
    assert!(!result.is_success());
    assert_eq!(result.lexer_errors().count(), 0);
    assert!(result.parser_errors().all(|e| e.line == 1 && e.offset <= source.len()), "errors: {:?}", result.errors);
    // the tree is still built
    assert_eq!(result.tree.rule, GRAMMAR.start());
}

fn expression() -> impl Strategy<Value = String> {
    let leaf = (0u32..1000).prop_map(|n| n.to_string());
    leaf.prop_recursive(4, 32, 2, |inner| prop_oneof![
        (inner.clone(), prop::sample::select(vec!["+", "-", "*", "/"]), inner.clone())
            .prop_map(|(a, op, b)| format!("{a} {op} {b}")),
        inner.clone().prop_map(|a| format!("({a})")),
        inner.prop_map(|a| format!("-{a}")),
    ])
}

proptest! {
    #[test]
    fn prop_valid_expressions(source in expression()) {
        let result = parse(&GRAMMAR, &source);
        prop_assert!(result.is_success(), "{source}: {:?}", result.errors);
        prop_assert_eq!(result.text_of(&result.tree), source.clone());
        let numbers = result.tokens.iter().filter(|t| t.kind == NUM).count();
        prop_assert_eq!(numbers, source.split(|c: char| !c.is_ascii_digit()).filter(|s| !s.is_empty()).count());
    }

    #[test]
    fn prop_any_input(source in "[0-9+*()a -]{0,24}") {
        let result = parse(&GRAMMAR, &source);
        prop_assert!(result.tokens.last().is_some_and(|t| t.is_eof()));
        prop_assert!(result.tokens.iter().enumerate().all(|(i, t)| t.index == i));
        prop_assert_eq!(result.lexer_errors().count(), source.chars().filter(|c| *c == 'a').count());
        prop_assert_eq!(result.is_success(), result.errors.is_empty());
    }
}
