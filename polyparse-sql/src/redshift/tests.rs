// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

#![cfg(test)]

use pretty_assertions::assert_eq;
use rstest::rstest;
use polyparse_core::lexer::{no_classifier, Lexer};
use polyparse_core::tree::RuleNode;
use polyparse_core::{ParseResult, TokenId, VarId};
use super::lexer::*;
use super::*;

fn kinds(source: &str) -> Vec<TokenId> {
    let spec = lexer_spec().expect("Redshift lexer should build");
    let mut lexer = Lexer::new(&spec, source, no_classifier());
    let kinds = lexer.tokens().filter(|t| !t.is_hidden() && !t.is_eof()).map(|t| t.kind).collect();
    assert!(!lexer.has_errors(), "unexpected lexer errors in {source:?}");
    kinds
}

/// Texts of the nodes of `rule`, in depth-first order.
fn texts_of(result: &ParseResult, rule: &str) -> Vec<String> {
    fn collect<'a>(node: &'a RuleNode, var: VarId, out: &mut Vec<&'a RuleNode>) {
        if node.rule == var {
            out.push(node);
        }
        for child in node.child_rules() {
            collect(child, var, out);
        }
    }
    let grammar = grammar().expect("grammar should build");
    let var = grammar.find_rule(rule).expect("unknown rule");
    let mut nodes = Vec::new();
    collect(&result.tree, var, &mut nodes);
    nodes.into_iter().map(|n| result.text_of(n)).collect()
}

#[test]
fn test_lexer() {
    let tests: Vec<(&str, Vec<TokenId>)> = vec![
        ("SeLeCt iam_role IAM_ROLE selected", vec![SELECT, IAM_ROLE, IAM_ROLE, ID]),
        ("'it''s' 'a\\'b' \"Col\"\"1\" _x$1", vec![STRING, STRING, QUOTED_ID, ID]),
        ("1 1.5 .5 2e10 3.e-2", vec![NUMBER, NUMBER, NUMBER, NUMBER, NUMBER]),
        ("<> != <= >= < > = :: || %", vec![NEQ, NEQ, LTE, GTE, LT, GT, EQ, DCOLON, CONCAT, PERCENT]),
        ("a.b -- comment\n/* block\n */ - 1", vec![ID, DOT, ID, MINUS, NUMBER]),
    ];
    for (test_id, (source, expected)) in tests.into_iter().enumerate() {
        assert_eq!(kinds(source), expected, "test {test_id} failed");
    }
}

#[rstest]
#[case::select_all("SELECT * FROM sales")]
#[case::select_clauses("select distinct s.id, s.amount * 1.1 as total, \"Mixed Case\" FROM public.sales s WHERE s.amount > 100 AND s.region IN ('EU', 'US') ORDER BY total DESC LIMIT 10")]
#[case::join_group("SELECT c.name, COUNT(*) FROM customers c LEFT OUTER JOIN orders o ON o.customer_id = c.id GROUP BY c.name HAVING COUNT(*) > 1")]
#[case::join_using("SELECT a.* FROM a INNER JOIN b USING (id) CROSS JOIN c")]
#[case::sub_queries("SELECT x FROM (SELECT 1 AS x UNION ALL SELECT 2) t WHERE EXISTS (SELECT 1 FROM u WHERE u.id = t.x)")]
#[case::case_cast("SELECT CASE WHEN a IS NOT NULL THEN 'y' ELSE 'n' END, CAST(b AS VARCHAR(10)), c::numeric(10, 2) FROM t")]
#[case::predicates("SELECT name FROM t WHERE name NOT LIKE 'a%' AND id NOT IN (SELECT id FROM banned) AND v BETWEEN 1 AND 10 LIMIT ALL OFFSET 5")]
#[case::operators("SELECT 'it''s' || name, -price, .5e3 % 2, COUNT(DISTINCT id) FROM t")]
#[case::no_from("SELECT 1")]
#[case::insert_values("INSERT INTO t (a, b) VALUES (1, DEFAULT), (2, 'x')")]
#[case::insert_select("INSERT INTO t SELECT * FROM u")]
#[case::insert_default("INSERT INTO t DEFAULT VALUES")]
#[case::update("UPDATE t SET a = a + 1, b = DEFAULT FROM u WHERE t.id = u.id")]
#[case::delete_using("DELETE FROM t USING u WHERE t.id = u.id")]
#[case::delete_all("DELETE t")]
#[case::create_table("CREATE TEMP TABLE IF NOT EXISTS s.t (id INT IDENTITY(1, 1) PRIMARY KEY, name VARCHAR(256) NOT NULL ENCODE zstd, \
    price DOUBLE PRECISION DEFAULT 0 NOT NULL, created TIMESTAMP DISTKEY, FOREIGN KEY (name) REFERENCES names (name)) \
    DISTSTYLE KEY COMPOUND SORTKEY (created, id)")]
#[case::create_table_as("CREATE TABLE t2 DISTKEY (id) AS SELECT * FROM t")]
#[case::drop_table("DROP TABLE IF EXISTS a, b CASCADE")]
#[case::copy("COPY sales (id, amount) FROM 's3://bucket/data' IAM_ROLE 'arn:aws:iam::123:role/r' \
    FORMAT AS CSV DELIMITER ',' IGNOREHEADER 1 REGION 'us-east-1' GZIP")]
#[case::unload("UNLOAD ('SELECT * FROM t WHERE d = ''2024''') TO 's3://bucket/out_' IAM_ROLE DEFAULT FORMAT AS PARQUET ALLOWOVERWRITE")]
#[case::several("SELECT 1; SELECT 2;")]
#[case::non_reserved_columns("SELECT region, format, delimiter FROM t")]
#[case::non_reserved_names("SELECT s.region AS key FROM temp.sales s WHERE s.format = 'csv'")]
#[case::comments("/* comment */ SELECT 1 -- trailing")]
fn statement(#[case] source: &str) {
    if let Err(errors) = parse_redshift(source) {
        let errors = errors.iter().map(|e| e.to_string()).collect::<Vec<_>>();
        panic!("{source}\n{}", errors.join("\n"));
    }
}

#[test]
fn test_precedence() {
    let tests: Vec<(&str, &str, Vec<&str>)> = vec![
        ("SELECT 1 + 2 * 3", "multiplicative", vec!["1", "2 * 3"]),
        ("SELECT a OR b AND c", "andExpr", vec!["a", "b AND c"]),
        ("SELECT NOT a = 1 AND b", "notExpr", vec!["NOT a = 1", "a = 1", "b"]),
        ("SELECT x BETWEEN 1 AND 2 AND y", "notExpr", vec!["x BETWEEN 1 AND 2", "y"]),
        ("SELECT -a::int * 2", "unary", vec!["-a::int", "a::int", "2"]),
        ("SELECT a || b = c", "additive", vec!["a || b", "c"]),
    ];
    for (test_id, (source, rule, expected)) in tests.into_iter().enumerate() {
        let result = parse_redshift(source).unwrap_or_else(|e| panic!("test {test_id} failed: {e:?}"));
        assert_eq!(texts_of(&result, rule), expected, "test {test_id} failed");
    }
}

#[test]
fn test_errors() {
    let tests: Vec<(&str, Vec<(usize, CaretLine, CaretCol, &str)>)> = vec![
        // expected messages are prefixes
        ("SELECT * FROM t WHERE", vec![
            (16, 1, 16, "extraneous input 'WHERE' expecting {<EOF>, 'GROUP', 'HAVING', 'ORDER', 'LIMIT', 'UNION', 'INTERSECT', 'EXCEPT', ';'}"),
        ]),
        ("SELECT 1 ^ 2", vec![
            (9, 1, 9, "token recognition error at: '^'"),
            (11, 1, 11, "extraneous input '2' expecting {<EOF>, "),
        ]),
        ("SELECT a FROM t WHERE x = = 1; SELECT 2", vec![(24, 1, 24, "extraneous input '=' expecting {<EOF>, ")]),
    ];
    for (test_id, (source, expected)) in tests.into_iter().enumerate() {
        let errors = match parse_redshift(source) {
            Ok(_) => panic!("test {test_id} failed: statement accepted"),
            Err(errors) => errors,
        };
        assert!(errors.iter().all(|e| e.code == SYNTAX_ERROR), "test {test_id} failed");
        let positions = errors.iter().map(|e| (e.offset, e.line, e.column)).collect::<Vec<_>>();
        assert_eq!(positions, expected.iter().map(|(o, l, c, _)| (*o, *l, *c)).collect::<Vec<_>>(), "test {test_id} failed");
        for (error, (_, _, _, message)) in errors.iter().zip(expected) {
            assert!(error.message.starts_with(message), "test {test_id} failed: {}", error.message);
        }
    }
}

#[rstest]
#[case::extra_tokens("SELECT 1; SELECT a b c FROM t; SELECT 2")]
#[case::extra_operator("SELECT 1; SELECT a FROM t WHERE x = = 1; SELECT 2")]
#[case::unexpected_keyword("SELECT 1; SELECT a FROM t WHERE; SELECT 2")]
fn test_statements_after_error(#[case] source: &str) {
    let grammar = grammar().expect("grammar should build");
    let result = polyparse_core::parse(grammar, source);
    assert_eq!(result.parser_errors().count(), 1, "{:?}", result.errors);
    let statements = result.tree.child_rules().filter(|n| grammar.rule_name(n.rule) == "statement").collect::<Vec<_>>();
    assert_eq!(statements.len(), 3);
    assert_eq!(result.text_of(statements[2]), "SELECT 2");
    assert!(!statements[2].is_partial());
}

#[test]
fn test_error_display() {
    let error = RedshiftParseError { code: SYNTAX_ERROR, offset: 7, line: 1, column: 7, message: "mismatched input".to_string() };
    assert_eq!(error.to_string(), "ERROR 42601: line 1:7 mismatched input");
}
