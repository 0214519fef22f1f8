// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

use polyparse_core::lexer::LexerSpecBuilder;
use polyparse_core::{term, TokenId};

/// Adds a case-insensitive rule for each keyword of the vocabulary. Keywords are the entries
/// with a literal made of letters only; their token ID is their position in `terminals`.
///
/// The keyword rules must be declared before the identifier rule, so that they win the ties.
pub(crate) fn keyword_rules(mut builder: LexerSpecBuilder, terminals: &[(&str, Option<&str>)]) -> LexerSpecBuilder {
    for (id, (name, literal)) in terminals.iter().enumerate() {
        if let Some(word) = literal.filter(|w| is_keyword(w)) {
            builder = builder.rule(*name, &format!("(?i){word}"), term!(=id as TokenId));
        }
    }
    builder
}

pub(crate) fn is_keyword(literal: &str) -> bool {
    !literal.is_empty() && literal.chars().all(|c| c.is_ascii_alphabetic() || c == '_')
}
