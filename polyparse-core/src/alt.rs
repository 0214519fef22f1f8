// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::ops::{Deref, DerefMut};
use crate::fixed_sym_table::SymInfoTable;
use crate::{CollectJoin, TokenId, VarId};

// ---------------------------------------------------------------------------------------------

// easier to use than an enum
pub mod ruleflag {
    /// Synthetic rule created for a grouped item `( ... )`.
    pub const CHILD_GROUP: u32 = 1;
    /// Synthetic rule created for an optional item `( ... )?`; its last alternative is empty.
    pub const CHILD_OPTIONAL: u32 = 2;
    /// Synthetic rule created for a repeated item `( ... )*` or `( ... )+`; each non-empty
    /// alternative ends with the rule itself, which is executed as a `Loop`.
    pub const CHILD_REPEAT: u32 = 4;
    /// CHILD_REPEAT for a `+`, not a `*`
    pub const REPEAT_PLUS: u32 = 8;
    /// Named rule that owns synthetic rules.
    pub const PARENT_SUBRULE: u32 = 16;

    pub const SYNTHETIC: u32 = CHILD_GROUP | CHILD_OPTIONAL | CHILD_REPEAT;

    pub fn to_string(flags: u32) -> Vec<String> {
        static NAMES: [(u32, &str); 5] = [
            (CHILD_GROUP                , "child_group"),
            (CHILD_OPTIONAL             , "child_?"),
            (CHILD_REPEAT               , "child_+_or_*"),
            (REPEAT_PLUS                , "plus"),
            (PARENT_SUBRULE             , "parent_subrule"),
        ];
        NAMES.iter().filter_map(|(f, t)| if flags & f != 0 { Some(t.to_string()) } else { None } ).collect()
    }
}

// ---------------------------------------------------------------------------------------------

/// Symbol of a flattened rule alternative.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Symbol {
    T(TokenId),
    NT(VarId),
}

impl Symbol {
    pub fn is_t(&self) -> bool {
        matches!(self, Symbol::T(_))
    }

    pub fn is_nt(&self) -> bool {
        matches!(self, Symbol::NT(_))
    }

    pub fn to_str<T: SymInfoTable>(&self, symbol_table: Option<&T>) -> String {
        symbol_table.map(|t| t.get_str(self)).unwrap_or_else(|| self.to_string())
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Symbol::T(t) => write!(f, ":{t}"),
            Symbol::NT(v) => write!(f, "{v}"),
        }
    }
}

pub fn alt_to_str<T: SymInfoTable>(f: &[Symbol], symbol_table: Option<&T>) -> String {
    if f.is_empty() {
        "ε".to_string()
    } else {
        f.iter().map(|s| s.to_str(symbol_table)).join(" ")
    }
}

pub fn alt_to_rule_str<T: SymInfoTable>(nt: VarId, f: &[Symbol], symbol_table: Option<&T>) -> String {
    format!("{} -> {}", Symbol::NT(nt).to_str(symbol_table), alt_to_str(f, symbol_table))
}

/// Stores a flattened rule alternative: `A a` or `B` in `A -> A a | B`. An empty
/// alternative matches no token.
///
/// The [`Alternative`] type behaves like a `Vec<Symbol>` (`Deref` / `DerefMut`).
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Alternative {
    pub v: Vec<Symbol>,
}

impl Alternative {
    pub fn new(v: Vec<Symbol>) -> Self {
        Alternative { v }
    }

    pub fn symbols(&self) -> &Vec<Symbol> {
        &self.v
    }

    pub fn to_str<T: SymInfoTable>(&self, symbol_table: Option<&T>) -> String {
        alt_to_str(&self.v, symbol_table)
    }

    pub fn to_rule_str<T: SymInfoTable>(&self, nt: VarId, symbol_table: Option<&T>) -> String {
        alt_to_rule_str(nt, &self.v, symbol_table)
    }

    /// Calculates the FIRST_1 set of the alternative and whether it can derive the empty
    /// sequence, from the FIRST_1 sets and nullability of the nonterminals.
    pub fn calc_alt_first(&self, first: &[BTreeSet<TokenId>], nullable: &[bool]) -> (BTreeSet<TokenId>, bool) {
        let mut new = BTreeSet::<TokenId>::new();
        for sym in &self.v {
            match sym {
                Symbol::T(t) => {
                    new.insert(*t);
                    return (new, false);
                }
                Symbol::NT(v) => {
                    new.extend(first[*v as usize].iter());
                    if !nullable[*v as usize] {
                        return (new, false);
                    }
                }
            }
        }
        (new, true)
    }
}

impl Deref for Alternative {
    type Target = Vec<Symbol>;

    fn deref(&self) -> &Self::Target {
        &self.v
    }
}

impl DerefMut for Alternative {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.v
    }
}
