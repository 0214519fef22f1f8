// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

//! SQL dialects built on `polyparse-core`: the Cassandra query language ([cql]) and the
//! Redshift dialect ([redshift]).
//!
//! ```ignore
//! let result = polyparse_sql::cql::parse_cql("SELECT * FROM users WHERE id = 1")?;
//! match polyparse_sql::redshift::parse_redshift("SELECT 1 +") {
//!     Ok(result) => println!("{}", result.tree.to_string_tree(polyparse_sql::redshift::grammar()?)),
//!     Err(errors) => errors.iter().for_each(|e| eprintln!("{e}")),
//! }
//! ```

pub mod cql;
pub mod redshift;
mod lexicon;

pub use cql::{parse_cql, CqlError, CqlErrorListener, CqlParseError};
pub use redshift::{parse_redshift, RedshiftParseError};

// package name & version
pub const SQL_PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const SQL_PKG_VERSION: &str = env!("CARGO_PKG_VERSION");
