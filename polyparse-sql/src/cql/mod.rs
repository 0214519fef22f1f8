// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

//! Cassandra query language (CQL).
//!
//! [parse_cql] only accepts statements without error. The lexer errors take precedence: if
//! there are any, the first one is returned, even if a parser error was found before it.

mod grammar;
pub mod lexer;

use polyparse_core::lexer::{CaretCol, CaretLine};
use polyparse_core::listener::ErrorListener;
use polyparse_core::{ContractError, ErrorOrigin, ParseError, ParseResult, Parser};
use thiserror::Error;
use tracing::debug;

pub use grammar::{build_grammar, grammar, GRAMMAR_NAME, START_RULE};

/// Syntax error found in a CQL statement.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
#[error("line {line}:{column} {msg}")]
pub struct CqlParseError {
    pub line: CaretLine,
    pub column: CaretCol,
    pub msg: String,
}

impl From<&ParseError> for CqlParseError {
    fn from(e: &ParseError) -> Self {
        CqlParseError { line: e.line, column: e.column, msg: e.message.clone() }
    }
}

#[derive(Clone, PartialEq, Debug, Error)]
pub enum CqlError {
    #[error("lexer error: {0}")]
    Lexer(CqlParseError),
    #[error("parser error: {0}")]
    Parser(CqlParseError),
    #[error(transparent)]
    Contract(#[from] ContractError),
}

/// Collects the syntax errors reported by one component, the lexer or the parser.
#[derive(Clone, Debug)]
pub struct CqlErrorListener {
    origin: ErrorOrigin,
    pub errors: Vec<CqlParseError>,
}

impl CqlErrorListener {
    pub fn new(origin: ErrorOrigin) -> Self {
        CqlErrorListener { origin, errors: Vec::new() }
    }

    pub fn origin(&self) -> ErrorOrigin {
        self.origin
    }

    pub fn first(&self) -> Option<&CqlParseError> {
        self.errors.first()
    }
}

impl ErrorListener for CqlErrorListener {
    fn syntax_error(&mut self, error: &ParseError) {
        if error.origin == self.origin {
            self.errors.push(CqlParseError::from(error));
        }
    }
}

/// Parses one or more CQL statements separated by `;`.
pub fn parse_cql(statement: &str) -> Result<ParseResult, CqlError> {
    let grammar = grammar()?;
    let mut lexer_errors = CqlErrorListener::new(ErrorOrigin::Lexer);
    let mut parser_errors = CqlErrorListener::new(ErrorOrigin::Parser);
    let result = Parser::new(grammar)
        .add_error_listener(&mut lexer_errors)
        .add_error_listener(&mut parser_errors)
        .parse(statement);
    debug!("CQL: {} lexer error(s), {} parser error(s)", lexer_errors.errors.len(), parser_errors.errors.len());
    if let Some(e) = lexer_errors.errors.into_iter().next() {
        return Err(CqlError::Lexer(e));
    }
    if let Some(e) = parser_errors.errors.into_iter().next() {
        return Err(CqlError::Parser(e));
    }
    Ok(result)
}
