// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

use std::collections::BTreeSet;
use tracing::{debug, warn};
use crate::alt::{ruleflag, Alternative, Symbol};
use crate::error::ContractError;
use crate::fixed_sym_table::FixedSymTable;
use crate::grammar::sets::{alt_first_k, calc_first, calc_first_k, calc_follow, calc_nullable, find_left_recursion, is_complete};
use crate::grammar::{BlockKind, DecisionState, Grammar, Item, LookaheadSet, RuleInfo};
use crate::lexer::{no_classifier, ClassifierFactory, LexerSpec};
use crate::log::{BufLog, LogStatus, Logger, Severity};
use crate::parser::OpCode;
use crate::{CollectJoin, DecisionId, VarId};

/// Builds a [Grammar] from a vocabulary, a lexer specification and rules.
///
/// ```
/// # use polyparse_core::{seq, term, GrammarBuilder};
/// # use polyparse_core::fixed_sym_table::FixedSymTable;
/// # use polyparse_core::grammar::star;
/// # use polyparse_core::lexer::LexerSpec;
/// # use polyparse_core::token::EOF;
/// const ID: u16 = 0;
/// const COMMA: u16 = 1;
/// let vocabulary = FixedSymTable::from_terminals(&[("ID", None), ("COMMA", Some(","))]);
/// let lexer = LexerSpec::builder()
///     .rule("ID", "[a-z]+", term!(=ID))
///     .rule("COMMA", ",", term!(=COMMA))
///     .rule("WS", r"\s+", term!(skip))
///     .build().unwrap();
/// let grammar = GrammarBuilder::new("list", vocabulary, lexer)
///     .rule("list", vec![seq![ID, star(seq![COMMA, ID]), EOF]])
///     .build()
///     .unwrap();
/// assert_eq!(grammar.rules_to_str(), "list -> ID list_1 <EOF>\nlist_1 -> , ID list_1 | ε");
/// ```
pub struct GrammarBuilder {
    name: String,
    symbol_table: FixedSymTable,
    lexer: LexerSpec,
    rules: Vec<(String, Vec<Vec<Item>>)>,
    start: Option<String>,
    k: usize,
    classifier: ClassifierFactory,
}

impl GrammarBuilder {
    pub fn new<S: Into<String>>(name: S, vocabulary: FixedSymTable, lexer: LexerSpec) -> Self {
        GrammarBuilder {
            name: name.into(),
            symbol_table: vocabulary,
            lexer,
            rules: Vec::new(),
            start: None,
            k: 1,
            classifier: no_classifier,
        }
    }

    /// Adds a named rule with its alternatives. An empty alternative matches no token.
    pub fn rule<S: Into<String>>(mut self, name: S, alts: Vec<Vec<Item>>) -> Self {
        self.rules.push((name.into(), alts));
        self
    }

    /// Sets the start rule. By default, it's the first rule.
    pub fn start<S: Into<String>>(mut self, name: S) -> Self {
        self.start = Some(name.into());
        self
    }

    /// Sets the lookahead depth `k` of the decisions (default 1).
    pub fn lookahead(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Sets the factory of the classifier used by each lex.
    pub fn classifier(mut self, factory: ClassifierFactory) -> Self {
        self.classifier = factory;
        self
    }

    pub fn build(self) -> Result<Grammar, ContractError> {
        let GrammarBuilder { name, mut symbol_table, lexer, rules: named_rules, start, k, classifier } = self;
        if named_rules.is_empty() {
            return Err(ContractError::EmptyGrammar { grammar: name });
        }
        if k == 0 {
            return Err(ContractError::InvalidLookahead { grammar: name });
        }

        // named rules
        let mut rules = Vec::<RuleInfo>::new();
        for (rule_name, _) in &named_rules {
            if symbol_table.find_nt(rule_name).is_some() {
                return Err(ContractError::DuplicateRule { grammar: name, rule: rule_name.clone() });
            }
            let var = symbol_table.add_nonterminal(rule_name.clone());
            rules.push(RuleInfo { name: rule_name.clone(), alts: Vec::new(), flags: 0, owner: var });
        }
        let num_named = rules.len();
        let start = match &start {
            Some(start_name) => symbol_table.find_nt(start_name)
                .ok_or_else(|| ContractError::NoSuchRule { grammar: name.clone(), rule: start_name.clone() })?,
            None => 0,
        };

        // flattening
        let mut flattener = Flattener { grammar: &name, symbol_table: &mut symbol_table, rules, num_named, counters: vec![0; num_named] };
        for (var, (_, alts)) in named_rules.into_iter().enumerate() {
            let alts = flattener.flatten_alts(var as VarId, alts)?;
            flattener.rules[var].alts = alts;
        }
        let rules = flattener.rules;

        // sets and contract checks
        let nullable = calc_nullable(&rules);
        let first = calc_first(&rules, &nullable);
        for rule in rules.iter().filter(|r| r.is_repeat()) {
            for alt in rule.alts.iter().filter(|a| !a.is_empty()) {
                let body = &alt[..alt.len() - 1];
                if Alternative::new(body.to_vec()).calc_alt_first(&first, &nullable).1 {
                    return Err(ContractError::EmptyLoop { grammar: name, rule: rules[rule.owner as usize].name.clone() });
                }
            }
        }
        if let Some(var) = find_left_recursion(&rules, &nullable) {
            let owner = rules[var as usize].owner;
            return Err(ContractError::LeftRecursion { grammar: name, rule: rules[owner as usize].name.clone() });
        }
        let follow = calc_follow(&rules, start, &first, &nullable);
        let alt_first = rules.iter()
            .map(|r| r.alts.iter().map(|a| a.calc_alt_first(&first, &nullable)).collect())
            .collect::<Vec<Vec<_>>>();
        let first_k = calc_first_k(&rules, k);

        // opcodes, in stack order
        let opcodes = rules.iter().enumerate().map(|(v, rule)| {
            let var = v as VarId;
            rule.alts.iter().map(|alt| {
                let mut ops = Vec::with_capacity(alt.len() + 1);
                if !rule.is_synthetic() {
                    ops.push(OpCode::Exit(var));
                }
                for (i, sym) in alt.iter().enumerate().rev() {
                    ops.push(match sym {
                        Symbol::T(t) => OpCode::T(*t),
                        Symbol::NT(w) if *w == var && rule.is_repeat() && i == alt.len() - 1 => OpCode::Loop(var),
                        Symbol::NT(w) => OpCode::NT(*w),
                    });
                }
                ops
            }).collect()
        }).collect::<Vec<Vec<Vec<OpCode>>>>();

        // decisions
        let mut decisions = Vec::<DecisionState>::new();
        let mut decision_of = vec![None; rules.len()];
        for (v, rule) in rules.iter().enumerate() {
            if rule.alts.len() < 2 {
                continue;
            }
            let id = decisions.len() as DecisionId;
            let alts = rule.alts.iter().map(|alt| {
                let (complete, open): (BTreeSet<_>, BTreeSet<_>) = alt_first_k(alt, &first_k, k).into_iter()
                    .partition(|s| is_complete(s, k));
                LookaheadSet { complete, open }
            }).collect();
            decision_of[v] = Some(id);
            decisions.push(DecisionState { id, var: v as VarId, alts });
        }

        let mut grammar = Grammar {
            name,
            symbol_table,
            lexer,
            classifier,
            rules,
            num_named,
            start,
            k,
            nullable,
            first,
            follow,
            alt_first,
            opcodes,
            decisions,
            decision_of,
            log: BufLog::new(),
        };
        grammar.log = grammar.diagnose();
        debug!("grammar {}: {} rules ({} named), {} decisions, k = {}, {} warning(s)",
               grammar.name, grammar.rules.len(), grammar.num_named, grammar.decisions.len(), grammar.k, grammar.log.num_warnings());
        for w in grammar.log.messages(Severity::Warning) {
            warn!(target: "polyparse", "grammar {}: {w}", grammar.name);
        }
        Ok(grammar)
    }
}

// ---------------------------------------------------------------------------------------------

struct Flattener<'a> {
    grammar: &'a str,
    symbol_table: &'a mut FixedSymTable,
    rules: Vec<RuleInfo>,
    num_named: usize,
    counters: Vec<usize>,
}

impl Flattener<'_> {
    fn new_var(&mut self, owner: VarId, flags: u32) -> VarId {
        let name = loop {
            self.counters[owner as usize] += 1;
            let candidate = format!("{}_{}", self.rules[owner as usize].name, self.counters[owner as usize]);
            if self.symbol_table.find_nt(&candidate).is_none() {
                break candidate;
            }
        };
        self.rules[owner as usize].flags |= ruleflag::PARENT_SUBRULE;
        let var = self.symbol_table.add_nonterminal(name.clone());
        self.rules.push(RuleInfo { name, alts: Vec::new(), flags, owner });
        var
    }

    fn flatten_alts(&mut self, owner: VarId, alts: Vec<Vec<Item>>) -> Result<Vec<Alternative>, ContractError> {
        alts.into_iter().map(|items| {
            let mut symbols = Vec::new();
            self.flatten_items(owner, items, &mut symbols)?;
            Ok(Alternative::new(symbols))
        }).collect()
    }

    fn flatten_items(&mut self, owner: VarId, items: Vec<Item>, symbols: &mut Vec<Symbol>) -> Result<(), ContractError> {
        for item in items {
            match item {
                Item::T(t) => {
                    if !self.symbol_table.is_valid_t(t) {
                        return Err(ContractError::UnknownToken {
                            grammar: self.grammar.to_string(), from: self.rules[owner as usize].name.clone(), token: t as u32 });
                    }
                    symbols.push(Symbol::T(t));
                }
                Item::Rule(name) => {
                    match self.symbol_table.find_nt(&name).filter(|v| (*v as usize) < self.num_named) {
                        Some(v) => symbols.push(Symbol::NT(v)),
                        None => return Err(ContractError::UnknownRule {
                            grammar: self.grammar.to_string(), from: self.rules[owner as usize].name.clone(), rule: name }),
                    }
                }
                Item::Block(BlockKind::Group, mut alts) if alts.len() == 1 => {
                    if let Some(items) = alts.pop() {
                        self.flatten_items(owner, items, symbols)?;
                    }
                }
                Item::Block(BlockKind::Group, alts) => {
                    let var = self.new_var(owner, ruleflag::CHILD_GROUP);
                    let alts = self.flatten_alts(owner, alts)?;
                    self.rules[var as usize].alts = alts;
                    symbols.push(Symbol::NT(var));
                }
                Item::Block(BlockKind::Optional, alts) => {
                    let var = self.new_var(owner, ruleflag::CHILD_OPTIONAL);
                    let mut alts = self.flatten_alts(owner, alts)?;
                    alts.push(Alternative::default());
                    self.rules[var as usize].alts = alts;
                    symbols.push(Symbol::NT(var));
                }
                Item::Block(BlockKind::Star, alts) => {
                    let var = self.new_repeat(owner, alts, 0)?;
                    symbols.push(Symbol::NT(var));
                }
                Item::Block(BlockKind::Plus, mut alts) => {
                    // (a)+ = a (a)*
                    if alts.len() == 1 {
                        if let Some(items) = alts.first().cloned() {
                            self.flatten_items(owner, items, symbols)?;
                        }
                    } else {
                        let var = self.new_var(owner, ruleflag::CHILD_GROUP);
                        let group_alts = self.flatten_alts(owner, alts.clone())?;
                        self.rules[var as usize].alts = group_alts;
                        symbols.push(Symbol::NT(var));
                    }
                    let var = self.new_repeat(owner, std::mem::take(&mut alts), ruleflag::REPEAT_PLUS)?;
                    symbols.push(Symbol::NT(var));
                }
            }
        }
        Ok(())
    }

    /// Creates `R -> alt_1 R | ... | alt_n R | ε`.
    fn new_repeat(&mut self, owner: VarId, alts: Vec<Vec<Item>>, flags: u32) -> Result<VarId, ContractError> {
        let var = self.new_var(owner, ruleflag::CHILD_REPEAT | flags);
        let mut alts = self.flatten_alts(owner, alts)?;
        for alt in alts.iter_mut() {
            alt.push(Symbol::NT(var));
        }
        alts.push(Alternative::default());
        self.rules[var as usize].alts = alts;
        Ok(var)
    }
}

// ---------------------------------------------------------------------------------------------

impl Grammar {
    /// Checks the decisions and the rule usage, and returns the messages.
    fn diagnose(&self) -> BufLog {
        let mut log = BufLog::new();
        for decision in &self.decisions {
            let var = decision.var;
            let where_str = format!("rule {} (decision {}, {})", self.owner_name(var), decision.id, self.rule_name(var));
            for (i, a) in decision.alts.iter().enumerate() {
                for (j, b) in decision.alts.iter().enumerate().skip(i + 1) {
                    if let Some(seq) = a.complete.intersection(&b.complete).next() {
                        log.add_warning(format!(
                            "{where_str}: alternatives {} and {} can both start with {}; alternative {} will be chosen",
                            i + 1, j + 1, self.seq_to_str(seq), i + 1));
                    }
                }
            }
            // context-dependent alternatives whose follow meets the other alternatives
            let follow = &self.follow[var as usize];
            for (i, a) in decision.alts.iter().enumerate() {
                if !a.is_context_dependent() {
                    continue;
                }
                let others = (0..decision.alts.len()).filter(|j| *j != i)
                    .flat_map(|j| self.alt_first[var as usize][j].0.iter().cloned())
                    .collect::<BTreeSet<_>>();
                let conflict = follow.intersection(&others).cloned().collect::<Vec<_>>();
                if !conflict.is_empty() {
                    log.add_note(format!(
                        "{where_str}: alternative {} depends on the context for {}",
                        i + 1, conflict.iter().map(|t| self.t_display(*t)).join(", ")));
                }
            }
        }
        // named rules unreachable from the start rule can still be parsed with `parse_rule`
        let mut reached = vec![false; self.rules.len()];
        let mut stack = vec![self.start];
        while let Some(v) = stack.pop() {
            if !reached[v as usize] {
                reached[v as usize] = true;
                stack.extend(self.rules[v as usize].alts.iter().flat_map(|a| a.iter())
                    .filter_map(|s| if let Symbol::NT(w) = s { Some(*w) } else { None }));
            }
        }
        let unused = (0..self.num_named).filter(|v| !reached[*v]).map(|v| self.rules[v].name.as_str()).join(", ");
        if !unused.is_empty() {
            log.add_note(format!("rules not reachable from {}: {unused}", self.rule_name(self.start)));
        }
        log
    }
}
