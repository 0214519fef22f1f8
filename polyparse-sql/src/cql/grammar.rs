// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

use once_cell::sync::Lazy;
use polyparse_core::grammar::{group_of, opt, opt_of, star};
use polyparse_core::token::EOF;
use polyparse_core::{seq, ContractError, Grammar, GrammarBuilder};
use super::lexer::*;

pub const GRAMMAR_NAME: &str = "Cql";
pub const START_RULE: &str = "root";

static CQL_GRAMMAR: Lazy<Result<Grammar, ContractError>> = Lazy::new(build_grammar);

/// Grammar table of CQL, built on first use.
pub fn grammar() -> Result<&'static Grammar, ContractError> {
    CQL_GRAMMAR.as_ref().map_err(|e| e.clone())
}

pub fn build_grammar() -> Result<Grammar, ContractError> {
    let if_not_exists = || opt(seq![IF, NOT, EXISTS]);
    let if_exists = || opt(seq![IF, EXISTS]);
    GrammarBuilder::new(GRAMMAR_NAME, vocabulary(), lexer_spec()?)
        .lookahead(2)
        .rule("root", vec![seq![opt(seq!["statement"]), star(seq![SEMI, opt(seq!["statement"])]), EOF]])
        .rule("statement", vec![
            seq!["selectStatement"],
            seq!["insertStatement"],
            seq!["updateStatement"],
            seq!["deleteStatement"],
            seq!["useStatement"],
            seq!["createKeyspace"],
            seq!["createTable"],
            seq!["dropKeyspace"],
            seq!["dropTable"],
            seq!["truncateStatement"],
        ])

        // SELECT
        .rule("selectStatement", vec![seq![
            SELECT, opt(seq![DISTINCT]), "selectElements", FROM, "tableName",
            opt(seq!["whereSpec"]), opt(seq!["orderSpec"]), opt(seq!["limitSpec"]), opt(seq![ALLOW, FILTERING]),
        ]])
        .rule("selectElements", vec![seq![STAR], seq!["selector", star(seq![COMMA, "selector"])]])
        .rule("selector", vec![seq!["selectorTerm", opt(seq![AS, "identifier"])]])
        .rule("selectorTerm", vec![
            seq!["identifier", LPAREN, opt(seq!["functionArgs"]), RPAREN],
            seq!["identifier"],
        ])
        .rule("functionArgs", vec![seq![STAR], seq!["termList"]])
        .rule("whereSpec", vec![seq![WHERE, "relation", star(seq![AND, "relation"])]])
        .rule("relation", vec![
            seq!["identifier", "relOp", "term"],
            seq!["identifier", IN, LPAREN, opt(seq!["termList"]), RPAREN],
        ])
        .rule("relOp", vec![seq![EQ], seq![NEQ], seq![LT], seq![GT], seq![LTE], seq![GTE]])
        .rule("orderSpec", vec![seq![ORDER, BY, "orderElement", star(seq![COMMA, "orderElement"])]])
        .rule("orderElement", vec![seq!["identifier", opt_of(vec![seq![ASC], seq![DESC]])]])
        .rule("limitSpec", vec![seq![LIMIT, group_of(vec![seq![INTEGER], seq![QMARK]])]])

        // data modification
        .rule("insertStatement", vec![seq![
            INSERT, INTO, "tableName", LPAREN, "columnList", RPAREN,
            VALUES, LPAREN, "termList", RPAREN, if_not_exists(), opt(seq!["usingSpec"]),
        ]])
        .rule("usingSpec", vec![seq![USING, "usingOption", star(seq![AND, "usingOption"])]])
        .rule("usingOption", vec![seq![TTL, INTEGER], seq![TIMESTAMP, INTEGER]])
        .rule("updateStatement", vec![seq![
            UPDATE, "tableName", opt(seq!["usingSpec"]), SET, "assignment", star(seq![COMMA, "assignment"]),
            "whereSpec", opt(seq!["ifSpec"]),
        ]])
        .rule("assignment", vec![
            seq!["identifier", EQ, "term"],
            seq!["identifier", LBRACKET, "term", RBRACKET, EQ, "term"],
        ])
        .rule("ifSpec", vec![seq![IF, EXISTS], seq![IF, "condition", star(seq![AND, "condition"])]])
        .rule("condition", vec![seq!["identifier", "relOp", "term"]])
        .rule("deleteStatement", vec![seq![
            DELETE, opt(seq!["columnList"]), FROM, "tableName", opt(seq!["usingSpec"]), "whereSpec", opt(seq!["ifSpec"]),
        ]])

        // schema
        .rule("useStatement", vec![seq![USE, "identifier"]])
        .rule("createKeyspace", vec![seq![
            CREATE, KEYSPACE, if_not_exists(), "identifier", WITH, "property", star(seq![AND, "property"]),
        ]])
        .rule("property", vec![seq!["identifier", EQ, "propertyValue"]])
        .rule("propertyValue", vec![seq!["constant"], seq!["identifier"], seq!["braceLiteral"]])
        .rule("createTable", vec![seq![
            CREATE, TABLE, if_not_exists(), "tableName",
            LPAREN, "tableElement", star(seq![COMMA, "tableElement"]), RPAREN,
            opt(seq![WITH, "tableOption", star(seq![AND, "tableOption"])]),
        ]])
        .rule("tableElement", vec![
            seq!["identifier", "dataType", opt(seq![PRIMARY, KEY])],
            seq![PRIMARY, KEY, LPAREN, "partitionKey", star(seq![COMMA, "identifier"]), RPAREN],
        ])
        .rule("partitionKey", vec![seq!["identifier"], seq![LPAREN, "columnList", RPAREN]])
        .rule("dataType", vec![seq!["identifier", opt(seq!["typeArgs"])], seq![SET, "typeArgs"]])
        .rule("typeArgs", vec![seq![LT, "dataType", star(seq![COMMA, "dataType"]), GT]])
        .rule("tableOption", vec![
            seq!["property"],
            seq![CLUSTERING, ORDER, BY, LPAREN, "orderElement", star(seq![COMMA, "orderElement"]), RPAREN],
        ])
        .rule("dropKeyspace", vec![seq![DROP, KEYSPACE, if_exists(), "identifier"]])
        .rule("dropTable", vec![seq![DROP, TABLE, if_exists(), "tableName"]])
        .rule("truncateStatement", vec![seq![TRUNCATE, opt(seq![TABLE]), "tableName"]])

        // terms
        .rule("tableName", vec![seq!["identifier", opt(seq![DOT, "identifier"])]])
        .rule("columnList", vec![seq!["identifier", star(seq![COMMA, "identifier"])]])
        .rule("termList", vec![seq!["term", star(seq![COMMA, "term"])]])
        .rule("term", vec![seq!["constant"], seq!["identifier"], seq![QMARK], seq!["braceLiteral"], seq!["listLiteral"]])
        // { k: v, ... } map or { v, ... } set
        .rule("braceLiteral", vec![seq![LBRACE, opt(seq!["term", "collectionTail"]), RBRACE]])
        .rule("collectionTail", vec![
            seq![COLON, "term", star(seq![COMMA, "term", COLON, "term"])],
            seq![star(seq![COMMA, "term"])],
        ])
        .rule("listLiteral", vec![seq![LBRACKET, opt(seq!["termList"]), RBRACKET]])
        .rule("constant", vec![seq![STRING], seq![INTEGER], seq![FLOAT], seq![UUID], seq![TRUE], seq![FALSE], seq![NULL]])
        .rule("identifier", vec![seq![ID], seq![QUOTED_ID], seq![KEY], seq![TTL], seq![TIMESTAMP]])
        .build()
}
