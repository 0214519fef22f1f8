// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

use std::thread;
use polyparse_core::listener::CollectingListener;
use polyparse_core::log::LogStatus;
use polyparse_core::{ParseResult, Parser};
use polyparse_sql::{cql, parse_cql, parse_redshift, redshift, CqlError};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn test_grammars_build() {
    for (name, grammar) in [("CQL", cql::grammar()), ("Redshift", redshift::grammar())] {
        let grammar = grammar.unwrap_or_else(|e| panic!("{name}: {e}"));
        assert!(grammar.has_no_errors(), "{name}:\n{}", grammar.diagnostics_str());
        assert!(grammar.find_rule("root").is_some(), "{name}: no start rule");
    }
}

#[test]
fn test_script() {
    init_tracing();
    let script = "\
        CREATE KEYSPACE shop WITH replication = {'class': 'SimpleStrategy', 'replication_factor': 3};
        USE shop;
        CREATE TABLE orders (id uuid, day text, total int, PRIMARY KEY (day, id));
        INSERT INTO orders (id, day, total) VALUES (uuid(), '2024-01-01', 12);
        SELECT day, total FROM orders WHERE day = '2024-01-01';";
    let result = parse_cql(script).unwrap_or_else(|e| panic!("{e}"));
    let grammar = cql::grammar().expect("grammar should build");
    let statements = result.tree.child_rules().filter(|n| grammar.rule_name(n.rule) == "statement").count();
    assert_eq!(statements, 5);
}

#[test]
fn test_same_text_in_both_dialects() {
    init_tracing();
    let tests: Vec<(&str, bool, bool)> = vec![
        // statement, valid in CQL, valid in Redshift
        ("SELECT a FROM t WHERE a = 1", true, true),
        ("SELECT a FROM t ALLOW FILTERING", true, false),
        ("SELECT a FROM t GROUP BY a", false, true),
        ("USE ks", true, false),
        ("DELETE FROM t WHERE a = 1", true, true),
        ("DELETE FROM t", false, true),
    ];
    for (test_id, (source, cql_ok, redshift_ok)) in tests.into_iter().enumerate() {
        assert_eq!(parse_cql(source).is_ok(), cql_ok, "test {test_id} failed (CQL)");
        assert_eq!(parse_redshift(source).is_ok(), redshift_ok, "test {test_id} failed (Redshift)");
    }
}

#[test]
fn test_error_layers() {
    let source = "SELECT a FROM t WHERE a = 1 LIMIT";
    match parse_cql(source) {
        Err(CqlError::Parser(e)) => assert_eq!(e.line, 1),
        other => panic!("unexpected result: {other:?}"),
    }
    let errors = parse_redshift(source).expect_err("the statement should be rejected");
    assert!(!errors.is_empty());
    assert!(errors.iter().all(|e| e.code == redshift::SYNTAX_ERROR && e.line == 1));
    assert!(errors[0].to_string().starts_with("ERROR 42601: line 1:"), "{}", errors[0]);
}

#[test]
fn test_listener_with_dialect() {
    let grammar = redshift::grammar().expect("grammar should build");
    let mut listener = CollectingListener::new();
    let result = Parser::new(grammar).add_error_listener(&mut listener).parse("SELECT 1 FROM ; SELECT 2");
    assert!(!result.is_success());
    assert_eq!(listener.errors, result.errors);
    assert_eq!(listener.parser_errors().count(), result.parser_errors().count());
}

#[test]
fn test_concurrent_parses() {
    // the grammar tables are shared, each parse has its own state
    let handles = (0..4).map(|i| thread::spawn(move || {
        let cql = parse_cql(&format!("SELECT * FROM t{i} WHERE id = {i}")).map(|r: ParseResult| r.tokens.len());
        let redshift = parse_redshift(&format!("SELECT {i} + 1 FROM t{i}")).map(|r| r.tokens.len());
        (cql.is_ok(), redshift.is_ok())
    })).collect::<Vec<_>>();
    for handle in handles {
        assert_eq!(handle.join().expect("thread should not panic"), (true, true));
    }
}
