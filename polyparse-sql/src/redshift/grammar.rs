// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

//! Rules of the Redshift SQL dialect.
//!
//! The expressions are layered by precedence, from the loosest to the tightest binding:
//!
//! ```text
//! expr           : andExpr (OR andExpr)* ;
//! andExpr        : notExpr (AND notExpr)* ;
//! notExpr        : NOT notExpr | predicate ;
//! predicate      : additive predicateTail? ;
//! additive       : multiplicative (('+' | '-' | '||') multiplicative)* ;
//! multiplicative : unary (('*' | '/' | '%') unary)* ;
//! unary          : ('-' | '+') unary | primary ('::' dataType)* ;
//! ```

use once_cell::sync::Lazy;
use polyparse_core::grammar::{group_of, opt, opt_of, plus, star, star_of};
use polyparse_core::token::EOF;
use polyparse_core::{seq, ContractError, Grammar, GrammarBuilder};
use super::lexer::*;

pub const GRAMMAR_NAME: &str = "Redshift";
pub const START_RULE: &str = "root";

static REDSHIFT_GRAMMAR: Lazy<Result<Grammar, ContractError>> = Lazy::new(build_grammar);

/// Grammar table of the Redshift dialect, built on first use.
pub fn grammar() -> Result<&'static Grammar, ContractError> {
    REDSHIFT_GRAMMAR.as_ref().map_err(|e| e.clone())
}

pub fn build_grammar() -> Result<Grammar, ContractError> {
    let not = || opt(seq![NOT]);
    GrammarBuilder::new(GRAMMAR_NAME, vocabulary(), lexer_spec()?)
        .lookahead(2)
        .rule("root", vec![seq![opt(seq!["statement"]), star(seq![SEMI, opt(seq!["statement"])]), EOF]])
        .rule("statement", vec![
            seq!["query"],
            seq!["insertStatement"],
            seq!["updateStatement"],
            seq!["deleteStatement"],
            seq!["createTable"],
            seq!["dropTable"],
            seq!["copyStatement"],
            seq!["unloadStatement"],
        ])

        // queries
        .rule("query", vec![seq![
            "selectCore", star(seq!["setOperator", "selectCore"]), opt(seq!["orderByClause"]), opt(seq!["limitClause"]),
        ]])
        .rule("setOperator", vec![seq![UNION, opt(seq![ALL])], seq![INTERSECT], seq![EXCEPT]])
        .rule("selectCore", vec![seq![
            SELECT, opt_of(vec![seq![DISTINCT], seq![ALL]]), "selectList",
            opt(seq!["fromClause"]), opt(seq!["whereClause"]), opt(seq!["groupByClause"]), opt(seq!["havingClause"]),
        ]])
        .rule("selectList", vec![seq!["selectItem", star(seq![COMMA, "selectItem"])]])
        .rule("selectItem", vec![seq![STAR], seq!["expr", opt(seq!["alias"])]])
        .rule("alias", vec![seq![opt(seq![AS]), "identifier"]])
        .rule("fromClause", vec![seq![FROM, "tableRef", star(seq![COMMA, "tableRef"])]])
        .rule("tableRef", vec![seq!["tablePrimary", star(seq!["joinClause"])]])
        .rule("tablePrimary", vec![
            seq!["tableName", opt(seq!["alias"])],
            seq![LPAREN, "query", RPAREN, opt(seq!["alias"])],
        ])
        .rule("joinClause", vec![
            seq![opt(seq!["joinType"]), JOIN, "tablePrimary", "joinCondition"],
            seq![CROSS, JOIN, "tablePrimary"],
        ])
        .rule("joinType", vec![
            seq![INNER],
            seq![LEFT, opt(seq![OUTER])],
            seq![RIGHT, opt(seq![OUTER])],
            seq![FULL, opt(seq![OUTER])],
        ])
        .rule("joinCondition", vec![seq![ON, "expr"], seq![USING, LPAREN, "columnList", RPAREN]])
        .rule("whereClause", vec![seq![WHERE, "expr"]])
        .rule("groupByClause", vec![seq![GROUP, BY, "exprList"]])
        .rule("havingClause", vec![seq![HAVING, "expr"]])
        .rule("orderByClause", vec![seq![ORDER, BY, "orderItem", star(seq![COMMA, "orderItem"])]])
        .rule("orderItem", vec![seq!["expr", opt_of(vec![seq![ASC], seq![DESC]])]])
        .rule("limitClause", vec![seq![LIMIT, group_of(vec![seq![NUMBER], seq![ALL]]), opt(seq![OFFSET, NUMBER])]])

        // data modification
        .rule("insertStatement", vec![seq![
            INSERT, INTO, "tableName", opt(seq![LPAREN, "columnList", RPAREN]),
            group_of(vec![
                seq![VALUES, "valuesRow", star(seq![COMMA, "valuesRow"])],
                seq!["query"],
                seq![DEFAULT, VALUES],
            ]),
        ]])
        .rule("valuesRow", vec![seq![LPAREN, "valueItem", star(seq![COMMA, "valueItem"]), RPAREN]])
        .rule("valueItem", vec![seq!["expr"], seq![DEFAULT]])
        .rule("updateStatement", vec![seq![
            UPDATE, "tableName", opt(seq!["alias"]), SET, "setItem", star(seq![COMMA, "setItem"]),
            opt(seq!["fromClause"]), opt(seq!["whereClause"]),
        ]])
        .rule("setItem", vec![seq!["identifier", EQ, "valueItem"]])
        .rule("deleteStatement", vec![seq![
            DELETE, opt(seq![FROM]), "tableName", opt(seq![USING, "tableName", star(seq![COMMA, "tableName"])]),
            opt(seq!["whereClause"]),
        ]])

        // DDL
        .rule("createTable", vec![seq![
            CREATE, opt_of(vec![seq![TEMP], seq![TEMPORARY]]), TABLE, opt(seq![IF, NOT, EXISTS]), "tableName",
            group_of(vec![
                seq![LPAREN, "tableElement", star(seq![COMMA, "tableElement"]), RPAREN, star(seq!["tableAttribute"])],
                seq![star(seq!["tableAttribute"]), AS, "query"],
            ]),
        ]])
        .rule("tableElement", vec![seq!["columnDefinition"], seq!["tableConstraint"]])
        .rule("columnDefinition", vec![seq!["identifier", "dataType", star(seq!["columnAttribute"])]])
        .rule("columnAttribute", vec![
            seq![NOT, NULL],
            seq![NULL],
            seq![DEFAULT, "expr"],
            seq![IDENTITY, LPAREN, NUMBER, COMMA, NUMBER, RPAREN],
            seq![PRIMARY, KEY],
            seq![UNIQUE],
            seq![ENCODE, "identifier"],
            seq![DISTKEY],
            seq![SORTKEY],
            seq![REFERENCES, "tableName", opt(seq![LPAREN, "identifier", RPAREN])],
        ])
        .rule("tableConstraint", vec![
            seq![PRIMARY, KEY, LPAREN, "columnList", RPAREN],
            seq![UNIQUE, LPAREN, "columnList", RPAREN],
            seq![FOREIGN, KEY, LPAREN, "columnList", RPAREN, REFERENCES, "tableName", opt(seq![LPAREN, "columnList", RPAREN])],
        ])
        .rule("tableAttribute", vec![
            seq![DISTSTYLE, group_of(vec![seq![EVEN], seq![KEY], seq![ALL], seq![AUTO]])],
            seq![DISTKEY, LPAREN, "identifier", RPAREN],
            seq![opt_of(vec![seq![COMPOUND], seq![INTERLEAVED]]), SORTKEY, LPAREN, "columnList", RPAREN],
        ])
        .rule("dataType", vec![seq![plus(seq!["identifier"]), opt(seq![LPAREN, NUMBER, opt(seq![COMMA, NUMBER]), RPAREN])]])
        .rule("dropTable", vec![seq![
            DROP, TABLE, opt(seq![IF, EXISTS]), "tableName", star(seq![COMMA, "tableName"]),
            opt_of(vec![seq![CASCADE], seq![RESTRICT]]),
        ]])

        // data loading
        .rule("copyStatement", vec![seq![
            COPY, "tableName", opt(seq![LPAREN, "columnList", RPAREN]), FROM, STRING, "authorization", star(seq!["dataOption"]),
        ]])
        .rule("unloadStatement", vec![seq![UNLOAD, LPAREN, STRING, RPAREN, TO, STRING, "authorization", star(seq!["dataOption"])]])
        .rule("authorization", vec![seq![IAM_ROLE, group_of(vec![seq![STRING], seq![DEFAULT]])], seq![CREDENTIALS, STRING]])
        .rule("dataOption", vec![
            seq![FORMAT, opt(seq![AS]), "identifier", opt(seq![STRING])],
            seq![DELIMITER, opt(seq![AS]), STRING],
            seq![REGION, opt(seq![AS]), STRING],
            seq![IGNOREHEADER, opt(seq![AS]), NUMBER],
            seq![ID],
        ])

        // expressions
        .rule("exprList", vec![seq!["expr", star(seq![COMMA, "expr"])]])
        .rule("expr", vec![seq!["andExpr", star(seq![OR, "andExpr"])]])
        .rule("andExpr", vec![seq!["notExpr", star(seq![AND, "notExpr"])]])
        .rule("notExpr", vec![seq![NOT, "notExpr"], seq!["predicate"]])
        .rule("predicate", vec![seq!["additive", opt(seq!["predicateTail"])]])
        .rule("predicateTail", vec![
            seq!["comparisonOperator", "additive"],
            seq![IS, not(), NULL],
            seq![not(), IN, LPAREN, group_of(vec![seq!["query"], seq!["exprList"]]), RPAREN],
            seq![not(), BETWEEN, "additive", AND, "additive"],
            seq![not(), LIKE, "additive"],
        ])
        .rule("comparisonOperator", vec![seq![EQ], seq![NEQ], seq![LT], seq![LTE], seq![GT], seq![GTE]])
        .rule("additive", vec![seq!["multiplicative", star_of(vec![seq![PLUS, "multiplicative"], seq![MINUS, "multiplicative"], seq![CONCAT, "multiplicative"]])]])
        .rule("multiplicative", vec![seq!["unary", star_of(vec![seq![STAR, "unary"], seq![SLASH, "unary"], seq![PERCENT, "unary"]])]])
        .rule("unary", vec![seq![MINUS, "unary"], seq![PLUS, "unary"], seq!["primary", star(seq![DCOLON, "dataType"])]])
        .rule("primary", vec![
            seq!["literal"],
            seq!["functionCall"],
            seq!["columnRef"],
            seq![LPAREN, "expr", RPAREN],
            seq![LPAREN, "query", RPAREN],
            seq!["caseExpr"],
            seq![CAST, LPAREN, "expr", AS, "dataType", RPAREN],
            seq![EXISTS, LPAREN, "query", RPAREN],
        ])
        .rule("functionCall", vec![seq![
            "identifier", LPAREN, opt_of(vec![seq![STAR], seq![opt(seq![DISTINCT]), "exprList"]]), RPAREN,
        ]])
        // a.b.c, t.*
        .rule("columnRef", vec![seq!["identifier", star(seq![DOT, "identifier"]), opt(seq![DOT, STAR])]])
        .rule("caseExpr", vec![seq![CASE, opt(seq!["expr"]), plus(seq!["whenClause"]), opt(seq![ELSE, "expr"]), END]])
        .rule("whenClause", vec![seq![WHEN, "expr", THEN, "expr"]])
        .rule("literal", vec![seq![STRING], seq![NUMBER], seq![TRUE], seq![FALSE], seq![NULL]])

        // names
        .rule("tableName", vec![seq!["identifier", star(seq![DOT, "identifier"])]])
        .rule("columnList", vec![seq!["identifier", star(seq![COMMA, "identifier"])]])
        .rule("identifier", vec![seq![ID], seq![QUOTED_ID], seq!["nonReservedKeyword"]])
        // keywords that never start a clause where a name is expected
        .rule("nonReservedKeyword", vec![
            seq![REGION], seq![FORMAT], seq![DELIMITER], seq![IGNOREHEADER], seq![CREDENTIALS], seq![IAM_ROLE],
            seq![KEY], seq![TEMP], seq![AUTO], seq![EVEN], seq![COMPOUND], seq![INTERLEAVED],
        ])
        .build()
}
