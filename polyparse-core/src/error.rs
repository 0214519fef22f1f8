// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

use std::fmt::{Display, Formatter};
use thiserror::Error;
use crate::lexer::{CaretCol, CaretLine, Pos};

/// Component that detected an error.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum ErrorOrigin { Lexer, Parser }

impl Display for ErrorOrigin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorOrigin::Lexer => write!(f, "lexer"),
            ErrorOrigin::Parser => write!(f, "parser"),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum ErrorKind {
    // lexer
    /// No rule of the current mode matches the input character
    UnrecognizedCharacter,
    /// The input ended inside a pushed mode
    UnterminatedRegion,
    /// A rule tried to pop the sentinel mode
    ModeStackUnderflow,
    /// The input ended after text kept by `more` rules, outside any pushed mode
    IncompleteToken,
    // parser
    /// A spurious token was discarded (single-token deletion)
    ExtraneousInput,
    /// A token was assumed present (single-token insertion)
    MissingToken,
    /// A terminal match failed and the parser resynchronized
    MismatchedInput,
    /// No alternative of a decision can match the input
    NoViableAlternative,
}

impl ErrorKind {
    pub fn origin(&self) -> ErrorOrigin {
        match self {
            ErrorKind::UnrecognizedCharacter
            | ErrorKind::UnterminatedRegion
            | ErrorKind::ModeStackUnderflow
            | ErrorKind::IncompleteToken => ErrorOrigin::Lexer,
            ErrorKind::ExtraneousInput
            | ErrorKind::MissingToken
            | ErrorKind::MismatchedInput
            | ErrorKind::NoViableAlternative => ErrorOrigin::Parser,
        }
    }
}

/// Lexical or syntax error found during a parse. Errors are accumulated in the order they're
/// found, they don't stop the parse.
///
/// `line` is 1-based, `column` is 0-based and counts characters, `offset` is the byte offset of
/// the offending text in the source.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ParseError {
    pub origin: ErrorOrigin,
    pub kind: ErrorKind,
    pub line: CaretLine,
    pub column: CaretCol,
    pub offset: usize,
    pub message: String,
}

impl ParseError {
    pub fn new<T: Into<String>>(kind: ErrorKind, pos: Pos, offset: usize, message: T) -> Self {
        ParseError { origin: kind.origin(), kind, line: pos.line(), column: pos.col(), offset, message: message.into() }
    }

    pub fn is_lexer(&self) -> bool {
        self.origin == ErrorOrigin::Lexer
    }

    pub fn is_parser(&self) -> bool {
        self.origin == ErrorOrigin::Parser
    }

    pub fn pos(&self) -> Pos {
        Pos(self.line, self.column)
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}:{} {}", self.line, self.column, self.message)
    }
}

// ---------------------------------------------------------------------------------------------

/// Misuse of the runtime: a grammar table that can't be built, or a reference to something it
/// doesn't contain. This is the only kind of error that prevents a parse from starting.
#[derive(Clone, PartialEq, Debug, Error)]
pub enum ContractError {
    #[error("grammar '{grammar}' has no rule")]
    EmptyGrammar { grammar: String },
    #[error("grammar '{grammar}': rule '{rule}' is defined more than once")]
    DuplicateRule { grammar: String, rule: String },
    #[error("grammar '{grammar}': rule '{from}' refers to unknown rule '{rule}'")]
    UnknownRule { grammar: String, from: String, rule: String },
    #[error("grammar '{grammar}': rule '{from}' refers to token {token}, which isn't in the vocabulary")]
    UnknownToken { grammar: String, from: String, token: u32 },
    #[error("grammar '{grammar}' has no rule named '{rule}'")]
    NoSuchRule { grammar: String, rule: String },
    #[error("grammar '{grammar}': rule '{rule}' is left-recursive")]
    LeftRecursion { grammar: String, rule: String },
    #[error("grammar '{grammar}': the repetition in rule '{rule}' can match empty input")]
    EmptyLoop { grammar: String, rule: String },
    #[error("grammar '{grammar}': the lookahead depth must be at least 1")]
    InvalidLookahead { grammar: String },
    #[error("lexer has no mode")]
    NoLexerMode,
    #[error("lexer rule '{rule}' switches to undefined mode {mode}")]
    UnknownMode { rule: String, mode: u32 },
    #[error("lexer rule '{rule}' has an invalid pattern: {message}")]
    InvalidPattern { rule: String, message: String },
    #[error("lexer rule '{rule}' matches empty input")]
    EmptyPattern { rule: String },
}
