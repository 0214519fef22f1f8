// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

//! Parser of grammar descriptions in the ANTLR v4 syntax.
//!
//! ```ignore
//! let result = polyparse_g4::parse_grammar("grammar T; start : 'a' ;")?;
//! assert!(result.is_success());
//!
//! for path in polyparse_g4::find_grammar_files("grammars")? {
//!     if let Err(e) = polyparse_g4::validate_grammar_file(&path) {
//!         eprintln!("{}: {e}", path.display());
//!     }
//! }
//! ```

pub mod classifier;
pub mod grammar;
pub mod lexer;
mod validate;

pub use classifier::{is_token_name, CurrentRuleTypeState, G4Classifier};
pub use grammar::{grammar, parse_grammar};
pub use validate::{find_grammar_files, validate_grammar_file, validate_grammar_source, GrammarFileError};

// package name & version
pub const G4_PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const G4_PKG_VERSION: &str = env!("CARGO_PKG_VERSION");
