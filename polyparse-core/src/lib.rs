// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

//! Grammar-driven parsing runtime.
//!
//! A dialect supplies a [`Grammar`](grammar::Grammar): a token vocabulary, a lexer made of
//! modes and rules, and a rule table built with [`GrammarBuilder`](grammar::GrammarBuilder).
//! The runtime lexes the source through a stack of modes, picks alternatives with bounded
//! lookahead (falling back on a full-context simulation), builds the parse tree and recovers
//! from syntax errors so that a single call reports every error it can find.
//!
//! ```ignore
//! let result = polyparse_core::parse(&grammar, "SELECT a FROM t;");
//! if result.is_success() {
//!     println!("{}", result.tree.to_string_tree(&grammar));
//! } else {
//!     for e in &result.errors {
//!         eprintln!("{e}");
//!     }
//! }
//! ```

pub mod alt;
pub mod error;
pub mod fixed_sym_table;
pub mod grammar;
pub mod lexer;
pub mod listener;
pub mod log;
pub mod parser;
pub mod prediction;
pub mod stream;
pub mod text_span;
pub mod token;
pub mod tree;

pub use error::{ContractError, ErrorKind, ErrorOrigin, ParseError};
pub use grammar::{Grammar, GrammarBuilder};
pub use parser::{parse, ParseResult, Parser, ParserOptions};

// package name & version
pub const CORE_PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const CORE_PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// ID of a lexer token
pub type TokenId = u16;
/// ID of a grammar rule (named or synthetic)
pub type VarId = u16;
/// ID of a rule alternative. We use the same type as [VarId] because they're very similar quantities.
pub type AltId = VarId;
/// ID of a decision point (a rule with several alternatives)
pub type DecisionId = u16;

pub trait CollectJoin {
    fn join(&mut self, separator: &str) -> String
        where Self: Iterator,
              <Self as Iterator>::Item: ToString
    {
        self.map(|x| x.to_string()).collect::<Vec<_>>().join(separator)
    }

    fn to_vec(self) -> Vec<<Self as Iterator>::Item>
        where Self: Iterator + Sized
    {
        self.collect::<Vec<_>>()
    }
}

impl<I: Iterator> CollectJoin for I {}

// ---------------------------------------------------------------------------------------------
// Macros

pub mod macros {
    /// Generates an `OpCode` instance.
    ///
    /// # Examples
    /// ```
    /// # use polyparse_core::{opcode, TokenId};
    /// # use polyparse_core::parser::OpCode;
    /// assert_eq!(opcode!(t 2), OpCode::T(2 as TokenId));
    /// assert_eq!(opcode!(nt 3), OpCode::NT(3));
    /// assert_eq!(opcode!(loop 2), OpCode::Loop(2));
    /// assert_eq!(opcode!(exit 1), OpCode::Exit(1));
    /// ```
    #[macro_export]
    macro_rules! opcode {
        (t $id:expr) => { $crate::parser::OpCode::T($id as $crate::TokenId) };
        (nt $id:expr) => { $crate::parser::OpCode::NT($id as $crate::VarId) };
        (loop $id:expr) => { $crate::parser::OpCode::Loop($id as $crate::VarId) };
        (exit $id:expr) => { $crate::parser::OpCode::Exit($id as $crate::VarId) };
    }

    /// Generates an opcode strip. A strip is made up of `OpCode` items separated by a comma.
    ///
    /// # Example
    /// ```
    /// # use polyparse_core::{strip, opcode};
    /// # use polyparse_core::parser::OpCode;
    /// assert_eq!(strip!(nt 1, loop 5, t 3), vec![opcode!(nt 1), opcode!(loop 5), opcode!(t 3)]);
    /// ```
    #[macro_export]
    macro_rules! strip {
        () => { std::vec![] };
        ($($a:ident $($b:expr)?,)+) => { $crate::strip![$($a $($b)?),+] };
        ($($a:ident $($b:expr)?),*) => { std::vec![$($crate::opcode!($a $($b)?)),*] };
    }

    /// Generates the items of a rule alternative for [`GrammarBuilder::rule`](crate::grammar::GrammarBuilder::rule).
    /// Token IDs are terminals, string slices are references to other rules.
    ///
    /// # Example
    /// ```
    /// # use polyparse_core::{seq, TokenId};
    /// # use polyparse_core::grammar::{Item, star};
    /// const SEMI: TokenId = 3;
    /// let alt = seq!["statement", star(seq![SEMI, "statement"])];
    /// assert_eq!(alt[0], Item::Rule("statement".to_string()));
    /// ```
    #[macro_export]
    macro_rules! seq {
        () => { std::vec::Vec::<$crate::grammar::Item>::new() };
        ($($e:expr),+ $(,)?) => { std::vec![$($crate::grammar::Item::from($e)),+] };
    }
}
