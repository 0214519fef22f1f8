// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

//! Grammar table: vocabulary, lexer specification and flattened rules, with the sets and
//! decision states computed once by [GrammarBuilder].

pub(crate) mod tests;
mod build;
pub(crate) mod sets;

use std::collections::BTreeSet;
use crate::alt::{ruleflag, Alternative};
use crate::fixed_sym_table::{FixedSymTable, SymInfoTable};
use crate::lexer::{ClassifierFactory, LexerSpec, TokenClassifier};
use crate::log::{BufLog, LogReader};
use crate::parser::OpCode;
use crate::{CollectJoin, DecisionId, TokenId, VarId};

pub use build::GrammarBuilder;

// ---------------------------------------------------------------------------------------------
// Rule items given to the builder

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BlockKind {
    /// `( a | b )`
    Group,
    /// `( a | b )?`
    Optional,
    /// `( a | b )*`
    Star,
    /// `( a | b )+`
    Plus,
}

/// Item of a rule alternative, as given to [`GrammarBuilder::rule`]. See also [`seq!`](crate::seq).
#[derive(Clone, PartialEq, Debug)]
pub enum Item {
    /// terminal
    T(TokenId),
    /// reference to a named rule
    Rule(String),
    /// sub-rule
    Block(BlockKind, Vec<Vec<Item>>),
}

impl From<TokenId> for Item {
    fn from(t: TokenId) -> Self {
        Item::T(t)
    }
}

impl From<&str> for Item {
    fn from(name: &str) -> Self {
        Item::Rule(name.to_string())
    }
}

impl From<String> for Item {
    fn from(name: String) -> Self {
        Item::Rule(name)
    }
}

pub fn group(alt: Vec<Item>) -> Item {
    Item::Block(BlockKind::Group, vec![alt])
}

pub fn opt(alt: Vec<Item>) -> Item {
    Item::Block(BlockKind::Optional, vec![alt])
}

pub fn star(alt: Vec<Item>) -> Item {
    Item::Block(BlockKind::Star, vec![alt])
}

pub fn plus(alt: Vec<Item>) -> Item {
    Item::Block(BlockKind::Plus, vec![alt])
}

pub fn group_of(alts: Vec<Vec<Item>>) -> Item {
    Item::Block(BlockKind::Group, alts)
}

pub fn opt_of(alts: Vec<Vec<Item>>) -> Item {
    Item::Block(BlockKind::Optional, alts)
}

pub fn star_of(alts: Vec<Vec<Item>>) -> Item {
    Item::Block(BlockKind::Star, alts)
}

pub fn plus_of(alts: Vec<Vec<Item>>) -> Item {
    Item::Block(BlockKind::Plus, alts)
}

// ---------------------------------------------------------------------------------------------
// Tables

/// Sequence of token kinds, at most `k` long.
pub type Sequence = Vec<TokenId>;

/// Lookahead sequences of an alternative at a decision point.
///
/// * `complete`: sequences of `k` tokens, or ending with `EOF`, which don't depend on what
///   follows the rule.
/// * `open`: shorter sequences, after which the rule may end; what comes next depends on the
///   context.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct LookaheadSet {
    pub complete: BTreeSet<Sequence>,
    pub open: BTreeSet<Sequence>,
}

impl LookaheadSet {
    pub fn matches_complete(&self, la: &[TokenId]) -> bool {
        self.complete.contains(la)
    }

    /// Checks if an open sequence is a prefix of `la`.
    pub fn matches_open(&self, la: &[TokenId]) -> bool {
        self.open.iter().any(|s| la.starts_with(s))
    }

    pub fn is_context_dependent(&self) -> bool {
        !self.open.is_empty()
    }
}

/// Point of choice between the alternatives of a rule.
#[derive(Clone, PartialEq, Debug)]
pub struct DecisionState {
    pub id: DecisionId,
    pub var: VarId,
    /// one set per alternative, in declaration order
    pub alts: Vec<LookaheadSet>,
}

/// Flattened rule. Synthetic rules are created for the sub-rules of a named rule, their `owner`.
#[derive(Clone, PartialEq, Debug)]
pub struct RuleInfo {
    pub name: String,
    pub alts: Vec<Alternative>,
    pub flags: u32,
    pub owner: VarId,
}

impl RuleInfo {
    pub fn is_synthetic(&self) -> bool {
        self.flags & ruleflag::SYNTHETIC != 0
    }

    pub fn is_repeat(&self) -> bool {
        self.flags & ruleflag::CHILD_REPEAT != 0
    }
}

/// Grammar table of a dialect. It's immutable once built and can be shared between threads.
#[derive(Debug)]
pub struct Grammar {
    pub(crate) name: String,
    pub(crate) symbol_table: FixedSymTable,
    pub(crate) lexer: LexerSpec,
    pub(crate) classifier: ClassifierFactory,
    pub(crate) rules: Vec<RuleInfo>,
    pub(crate) num_named: usize,
    pub(crate) start: VarId,
    pub(crate) k: usize,
    pub(crate) nullable: Vec<bool>,
    pub(crate) first: Vec<BTreeSet<TokenId>>,
    pub(crate) follow: Vec<BTreeSet<TokenId>>,
    /// FIRST_1 and nullability of each alternative, `[var][alt]`
    pub(crate) alt_first: Vec<Vec<(BTreeSet<TokenId>, bool)>>,
    /// opcodes of each alternative in stack order, `[var][alt]`
    pub(crate) opcodes: Vec<Vec<Vec<OpCode>>>,
    pub(crate) decisions: Vec<DecisionState>,
    pub(crate) decision_of: Vec<Option<DecisionId>>,
    pub(crate) log: BufLog,
}

impl Grammar {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get_symbol_table(&self) -> &FixedSymTable {
        &self.symbol_table
    }

    pub fn lexer_spec(&self) -> &LexerSpec {
        &self.lexer
    }

    /// Creates the classifier for a new lex.
    pub fn new_classifier(&self) -> Box<dyn TokenClassifier> {
        (self.classifier)()
    }

    pub fn start(&self) -> VarId {
        self.start
    }

    pub fn lookahead_depth(&self) -> usize {
        self.k
    }

    /// Number of rules, synthetic rules included.
    pub fn num_rules(&self) -> usize {
        self.rules.len()
    }

    /// Number of named rules. Their IDs are `0..num_named_rules()`.
    pub fn num_named_rules(&self) -> usize {
        self.num_named
    }

    pub fn rule(&self, var: VarId) -> &RuleInfo {
        &self.rules[var as usize]
    }

    pub fn rule_name(&self, var: VarId) -> &str {
        self.rules.get(var as usize).map(|r| r.name.as_str()).unwrap_or("?")
    }

    /// Name of the named rule that contains `var`.
    pub fn owner_name(&self, var: VarId) -> &str {
        self.rules.get(var as usize).map(|r| self.rule_name(r.owner)).unwrap_or("?")
    }

    /// Finds a named rule.
    pub fn find_rule(&self, name: &str) -> Option<VarId> {
        self.symbol_table.find_nt(name).filter(|v| (*v as usize) < self.num_named)
    }

    pub fn is_synthetic(&self, var: VarId) -> bool {
        self.rules[var as usize].is_synthetic()
    }

    pub fn num_alts(&self, var: VarId) -> usize {
        self.rules[var as usize].alts.len()
    }

    pub fn is_nullable(&self, var: VarId) -> bool {
        self.nullable[var as usize]
    }

    pub fn first(&self, var: VarId) -> &BTreeSet<TokenId> {
        &self.first[var as usize]
    }

    pub fn follow(&self, var: VarId) -> &BTreeSet<TokenId> {
        &self.follow[var as usize]
    }

    /// FIRST_1 set of an alternative and whether it can match empty input.
    pub fn alt_first(&self, var: VarId, alt: usize) -> (&BTreeSet<TokenId>, bool) {
        let (first, nullable) = &self.alt_first[var as usize][alt];
        (first, *nullable)
    }

    /// Opcodes of an alternative, in stack order: the first item is at the end.
    pub fn opcodes(&self, var: VarId, alt: usize) -> &[OpCode] {
        &self.opcodes[var as usize][alt]
    }

    pub fn decision(&self, var: VarId) -> Option<&DecisionState> {
        self.decision_of[var as usize].map(|d| &self.decisions[d as usize])
    }

    pub fn decisions(&self) -> &[DecisionState] {
        &self.decisions
    }

    /// Name of a token kind, as it appears in error messages.
    pub fn t_display(&self, token: TokenId) -> String {
        self.symbol_table.get_t_display(token)
    }

    /// Calculates the FIRST_1 set of a sequence of opcodes in stack order (the top of the stack
    /// is the last item), and whether the sequence can match empty input.
    pub fn first_of_ops(&self, ops: &[OpCode]) -> (BTreeSet<TokenId>, bool) {
        let mut set = BTreeSet::new();
        for op in ops.iter().rev() {
            match op {
                OpCode::T(t) => {
                    set.insert(*t);
                    return (set, false);
                }
                OpCode::NT(v) | OpCode::Loop(v) => {
                    set.extend(self.first[*v as usize].iter());
                    if !self.nullable[*v as usize] {
                        return (set, false);
                    }
                }
                OpCode::Exit(_) => {}
            }
        }
        (set, true)
    }

    /// Representation of a sequence of token kinds, like `ID '('`.
    pub fn seq_to_str(&self, seq: &[TokenId]) -> String {
        if seq.is_empty() {
            "ε".to_string()
        } else {
            seq.iter().map(|t| self.t_display(*t)).join(" ")
        }
    }

    /// Representation of a rule, like `list -> ID list_1`.
    pub fn rule_to_str(&self, var: VarId) -> String {
        let rule = &self.rules[var as usize];
        format!("{} -> {}", rule.name, rule.alts.iter().map(|a| a.to_str(Some(&self.symbol_table))).join(" | "))
    }

    /// Representation of all the rules, one per line.
    pub fn rules_to_str(&self) -> String {
        (0..self.rules.len() as VarId).map(|v| self.rule_to_str(v)).join("\n")
    }
}

impl LogReader for Grammar {
    type Item = BufLog;

    fn get_log(&self) -> &Self::Item {
        &self.log
    }
}
