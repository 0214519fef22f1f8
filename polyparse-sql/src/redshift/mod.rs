// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

//! Redshift SQL dialect.

mod grammar;
pub mod lexer;
mod tests;

use polyparse_core::lexer::{CaretCol, CaretLine};
use polyparse_core::{ContractError, ParseError, ParseResult};
use thiserror::Error;
use tracing::debug;

pub use grammar::{build_grammar, grammar, GRAMMAR_NAME, START_RULE};

/// SQLSTATE of a syntax error.
pub const SYNTAX_ERROR: i32 = 42601;
/// Code of the error reported when the grammar table can't be built.
pub const GRAMMAR_ERROR: i32 = 0;

/// Syntax error in the format of the Redshift error reports. `offset` is the byte offset of the
/// offending text in the statement.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
#[error("ERROR {code}: line {line}:{column} {message}")]
pub struct RedshiftParseError {
    pub code: i32,
    pub offset: usize,
    pub line: CaretLine,
    pub column: CaretCol,
    pub message: String,
}

impl From<&ParseError> for RedshiftParseError {
    fn from(e: &ParseError) -> Self {
        RedshiftParseError { code: SYNTAX_ERROR, offset: e.offset, line: e.line, column: e.column, message: e.message.clone() }
    }
}

impl From<&ContractError> for RedshiftParseError {
    fn from(e: &ContractError) -> Self {
        RedshiftParseError { code: GRAMMAR_ERROR, offset: 0, line: 0, column: 0, message: e.to_string() }
    }
}

/// Parses one or more Redshift statements separated by `;`. All the errors are returned, in the
/// order they were found.
pub fn parse_redshift(statement: &str) -> Result<ParseResult, Vec<RedshiftParseError>> {
    let grammar = grammar().map_err(|e| vec![RedshiftParseError::from(&e)])?;
    let result = polyparse_core::parse(grammar, statement);
    if result.is_success() {
        Ok(result)
    } else {
        debug!("Redshift: {} error(s)", result.errors.len());
        Err(result.errors.iter().map(RedshiftParseError::from).collect())
    }
}
