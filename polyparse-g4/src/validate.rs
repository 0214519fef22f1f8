// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

use std::fs;
use std::path::{Path, PathBuf};
use polyparse_core::listener::LogListener;
use polyparse_core::log::{LogStatus, TraceLog};
use polyparse_core::text_span::GetTextSpan;
use polyparse_core::{ContractError, ParseError, ParseResult, Parser};
use thiserror::Error;
use tracing::{debug, info};
use crate::grammar::grammar;

/// Reason why a grammar description was rejected.
#[derive(Debug, Error)]
pub enum GrammarFileError {
    #[error("failed to read {}: {source}", path.display())]
    Io { path: PathBuf, source: std::io::Error },
    #[error("grammar file is empty")]
    Empty,
    #[error("lexer found {} errors", errors.len())]
    Lexer { errors: Vec<ParseError> },
    #[error("parser found {} errors", errors.len())]
    Parser { errors: Vec<ParseError> },
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl GrammarFileError {
    /// Errors found in the source, if that's why it was rejected.
    pub fn parse_errors(&self) -> &[ParseError] {
        match self {
            GrammarFileError::Lexer { errors } | GrammarFileError::Parser { errors } => errors,
            _ => &[],
        }
    }
}

/// Parses a grammar description and accepts it only if it's free of errors. Lexer errors are
/// checked first: if there are any, the parser errors aren't reported.
pub fn validate_grammar_source(source: &str) -> Result<ParseResult, GrammarFileError> {
    if source.is_empty() {
        return Err(GrammarFileError::Empty);
    }
    let grammar = grammar()?;
    let mut log = LogListener::new(TraceLog::new());
    let result = Parser::new(grammar).add_error_listener(&mut log).parse(source);
    debug!("validation: {} error(s), {} note(s), {} ambiguities",
           log.num_errors(), log.num_notes(), result.ambiguities.len());
    for e in &result.errors {
        debug!("{e}\n{}", source.annotate_error(e));
    }
    let lexer_errors = result.lexer_errors().cloned().collect::<Vec<_>>();
    if !lexer_errors.is_empty() {
        return Err(GrammarFileError::Lexer { errors: lexer_errors });
    }
    let parser_errors = result.parser_errors().cloned().collect::<Vec<_>>();
    if !parser_errors.is_empty() {
        return Err(GrammarFileError::Parser { errors: parser_errors });
    }
    Ok(result)
}

/// Reads and validates a grammar file. See [validate_grammar_source].
pub fn validate_grammar_file<P: AsRef<Path>>(path: P) -> Result<ParseResult, GrammarFileError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path)
        .map_err(|source| GrammarFileError::Io { path: path.to_path_buf(), source })?;
    info!("validating {}", path.display());
    validate_grammar_source(&source)
}

/// Finds all the `.g4` files under `root`, recursively, in sorted order.
pub fn find_grammar_files<P: AsRef<Path>>(root: P) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut dirs = vec![root.as_ref().to_path_buf()];
    while let Some(dir) = dirs.pop() {
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                dirs.push(path);
            } else if path.extension().is_some_and(|ext| ext == "g4") {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}
