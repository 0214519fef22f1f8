// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

use std::collections::HashMap;
use crate::alt::Symbol;
use crate::token::EOF;
use crate::{TokenId, VarId};

/// Stores the names of the terminal and nonterminal symbols used by a grammar.
///
/// Terminals are defined by the dialect's vocabulary. They have two parts to their name:
/// - the identifier in the lexicon
/// - the source string they represent (optional)
///
/// For example:
/// ```lexicon
/// Plus : '+';
/// ...
/// ID    : [a-zA-Z][a-zA-Z_0-9]*;
/// ```
///
/// If `Plus`'s token ID is 0 and `ID`'s is 24,
/// ```ignore
/// t[0] = ("Plus".to_string(), Some("+".to_string()));
/// t[24] = ("ID".to_string(), None);
/// ```
///
/// Nonterminals are the grammar rules, completed by the synthetic rules created when the
/// optional and repeated items are flattened:
///
/// ```grammar
/// statementList: statement (SEMI statement?)*;
/// ```
/// If `statementList` is 0 and `statement` is 1,
/// ```ignore
/// nt[0] = "statementList".to_string();
/// nt[1] = "statement".to_string();
/// nt[2] = "statementList_1".to_string(); // (SEMI statement?)*
/// nt[3] = "statementList_2".to_string(); // statement?
/// ```
///
/// The `EOF` token isn't stored in the table; its name is `EOF` and its representation `<EOF>`.
#[derive(Clone, Debug, Default)]
pub struct FixedSymTable {
    t: Vec<(String, Option<String>)>,   // terminal identifiers and optional representation
    nt: Vec<String>,                    // nt to nonterminal identifier
    t_index: HashMap<String, TokenId>,
    nt_index: HashMap<String, VarId>,
}

impl FixedSymTable {
    pub fn new(t: Vec<(String, Option<String>)>, nt: Vec<String>) -> Self {
        let t_index = t.iter().enumerate().map(|(i, (name, _))| (name.clone(), i as TokenId)).collect();
        let nt_index = nt.iter().enumerate().map(|(i, name)| (name.clone(), i as VarId)).collect();
        FixedSymTable { t, nt, t_index, nt_index }
    }

    /// Creates a vocabulary from `(name, literal)` pairs, where the token ID is the position in
    /// the slice.
    pub fn from_terminals(t: &[(&str, Option<&str>)]) -> Self {
        FixedSymTable::new(
            t.iter().map(|(name, literal)| (name.to_string(), literal.map(|s| s.to_string()))).collect(),
            Vec::new())
    }

    // -------------------------------------------------------------------------

    pub fn get_terminals(&self) -> impl Iterator<Item = &(String, Option<String>)> {
        self.t.iter()
    }

    pub fn get_num_t(&self) -> usize {
        self.t.len()
    }

    pub fn find_t(&self, name: &str) -> Option<TokenId> {
        if name == "EOF" { Some(EOF) } else { self.t_index.get(name).copied() }
    }

    pub fn is_valid_t(&self, token: TokenId) -> bool {
        token == EOF || (token as usize) < self.t.len()
    }

    // -------------------------------------------------------------------------

    pub fn get_nonterminals(&self) -> impl Iterator<Item = &String> {
        self.nt.iter()
    }

    pub fn get_num_nt(&self) -> usize {
        self.nt.len()
    }

    pub fn add_nonterminal<T: Into<String>>(&mut self, name: T) -> VarId {
        let var = self.nt.len() as VarId;
        let name = name.into();
        self.nt_index.insert(name.clone(), var);
        self.nt.push(name);
        var
    }

    pub fn find_nt(&self, name: &str) -> Option<VarId> {
        self.nt_index.get(name).copied()
    }

    // -------------------------------------------------------------------------

    #[cfg(test)]
    pub fn dump(&self, title: &str) {
        if !title.is_empty() {
            println!("{title}");
        }
        println!(
            "- nonterminals:\n{}",
            self.get_nonterminals().enumerate().map(|(v, s)| format!("  - NT[{v}]: {s}")).collect::<Vec<_>>().join("\n"));
        println!(
            "- terminals:\n{}",
            self.get_terminals().enumerate()
                .map(|(t, (n, v_maybe))| format!("  - T[{t}]: {n}{}", if let Some(v) = v_maybe { format!(" = {v:?}") } else { String::new() }))
                .collect::<Vec<_>>().join("\n"));
    }
}

pub trait SymInfoTable {
    /// Does `token` hold variable lexer string data?
    ///
    /// Terminals are divided into two categories: fixed and variable content. When the
    /// terminal is defined with choices and ranges of characters, like `ID: [a-z]+`, it
    /// contains variable content: data like the ID specifier.
    fn is_token_data(&self, token: TokenId) -> bool;

    fn get_t_str(&self, token: TokenId) -> String;

    fn get_t_name(&self, token: TokenId) -> String;

    fn get_nt_name(&self, var: VarId) -> String;

    /// Gets the symbol's name: the nonterminal identifier or the terminal identifier.
    fn get_name(&self, symbol: &Symbol) -> String;

    /// Gets the symbol's representation string: the nonterminal identifier, or the
    /// terminal string value (if it exists).
    fn get_str(&self, symbol: &Symbol) -> String;

    /// Gets the name of a terminal as it appears in error messages: the quoted literal
    /// if it exists (`')'`), otherwise the identifier (`ID`).
    fn get_t_display(&self, token: TokenId) -> String;
}

impl SymInfoTable for FixedSymTable {
    fn is_token_data(&self, token: TokenId) -> bool {
        self.t.get(token as usize).map(|t| t.1.is_none()).unwrap_or(false)
    }

    fn get_t_str(&self, token: TokenId) -> String {
        match token {
            EOF => "<EOF>".to_string(),
            _ if (token as usize) < self.t.len() => {
                let (name, literal) = &self.t[token as usize];
                literal.as_ref().unwrap_or(name).clone()
            }
            _ => format!("T({token}?)")
        }
    }

    fn get_t_name(&self, token: TokenId) -> String {
        match token {
            EOF => "EOF".to_string(),
            _ if (token as usize) < self.t.len() => self.t[token as usize].0.clone(),
            _ => format!("T({token}?)")
        }
    }

    fn get_nt_name(&self, var: VarId) -> String {
        if var as usize >= self.nt.len() { return format!("NT({var}?)") }
        self.nt[var as usize].clone()
    }

    fn get_name(&self, symbol: &Symbol) -> String {
        match symbol {
            Symbol::T(token) => self.get_t_name(*token),
            Symbol::NT(var) => self.get_nt_name(*var),
        }
    }

    fn get_str(&self, symbol: &Symbol) -> String {
        match symbol {
            Symbol::T(token) => self.get_t_str(*token),
            Symbol::NT(var) => self.get_nt_name(*var),
        }
    }

    fn get_t_display(&self, token: TokenId) -> String {
        match token {
            EOF => "<EOF>".to_string(),
            _ => match self.t.get(token as usize) {
                Some((_, Some(literal))) => format!("'{literal}'"),
                Some((name, None)) => name.clone(),
                None => format!("T({token}?)"),
            }
        }
    }
}
