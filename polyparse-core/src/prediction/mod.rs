// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.


use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt::{Display, Formatter};
use tracing::{debug, trace};
use crate::grammar::{DecisionState, Grammar};
use crate::parser::OpCode;
use crate::stream::Lookahead;
use crate::token::EOF;
use crate::{AltId, CollectJoin, DecisionId, TokenId, VarId};

/// Default limit of live configurations in a full-context simulation.
pub const MAX_CONFIGURATIONS: usize = 4096;

/// Ambiguity found by the full-context simulation: several alternatives match the input and
/// can't be told apart. The lowest one has been chosen. This isn't an error.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct AmbiguityReport {
    pub decision: DecisionId,
    /// rule that owns the decision
    pub rule: String,
    /// 1-based alternatives
    pub alts: Vec<AltId>,
    /// index of the first token examined, in the stream buffer
    pub start_index: usize,
    /// index of the last token examined, in the stream buffer
    pub stop_index: usize,
    /// `true` if the conflict was proven, `false` if the simulation gave up (configuration cap)
    pub exact: bool,
}

impl Display for AmbiguityReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}ambiguity in rule {} (decision {}): alternatives {{{}}} over tokens {}..{}",
               if self.exact { "" } else { "possible " },
               self.rule, self.decision, self.alts.iter().join(", "), self.start_index, self.stop_index)
    }
}

/// Diagnostic event of a decision that required the full-context simulation.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct DecisionEvent {
    pub decision: DecisionId,
    pub rule: String,
    pub start_index: usize,
    pub stop_index: usize,
    /// 1-based alternative chosen, if known
    pub alt: Option<AltId>,
}

impl Display for DecisionEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "rule {} (decision {}) over tokens {}..{}", self.rule, self.decision, self.start_index, self.stop_index)?;
        if let Some(alt) = self.alt {
            write!(f, ": alternative {alt}")?;
        }
        Ok(())
    }
}

/// Alternatives that could not be told apart.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Ambiguity {
    /// 0-based alternatives
    pub alts: Vec<AltId>,
    pub exact: bool,
}

/// Result of a prediction. `depth` is the number of tokens that were examined.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Prediction {
    /// chosen from the lookahead sets
    Lookahead(AltId),
    /// chosen by the full-context simulation
    FullContext { alt: AltId, depth: usize, ambiguity: Option<Ambiguity> },
    /// no alternative can match the input
    NoViable { depth: usize },
}

impl Prediction {
    pub fn alt(&self) -> Option<AltId> {
        match self {
            Prediction::Lookahead(alt) | Prediction::FullContext { alt, .. } => Some(*alt),
            Prediction::NoViable { .. } => None,
        }
    }
}

/// Configuration of the simulation: an alternative being tried, its own stack of opcodes (top
/// at the end) and how much of the parser stack is still below it.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
struct Config {
    alt: AltId,
    ops: Vec<OpCode>,
    depth: usize,
}

impl Config {
    fn is_accepting(&self) -> bool {
        self.ops.is_empty() && self.depth == 0
    }
}

/// Selects the alternative of a decision.
///
/// 1. The alternatives are checked in declaration order against the next `k` tokens; the first
///    one with a matching complete lookahead sequence wins. If only one alternative can match,
///    with a complete or a context-dependent sequence, it's chosen.
/// 2. Otherwise the remaining candidates are simulated token by token with the parser stack as
///    continuation, until only one is left.
pub struct Predictor<'g> {
    grammar: &'g Grammar,
    max_configurations: usize,
}

impl<'g> Predictor<'g> {
    pub fn new(grammar: &'g Grammar, max_configurations: usize) -> Self {
        Predictor { grammar, max_configurations: max_configurations.max(1) }
    }

    /// Predicts the alternative of `var` for the input, where `stack` is the parser stack
    /// below the decision (top at the end).
    pub fn predict<L: Lookahead + ?Sized>(&self, var: VarId, stack: &[OpCode], input: &mut L) -> Prediction {
        let Some(decision) = self.grammar.decision(var) else {
            return if self.grammar.num_alts(var) > 0 { Prediction::Lookahead(0) } else { Prediction::NoViable { depth: 1 } };
        };
        let k = self.grammar.lookahead_depth();
        let mut la = Vec::with_capacity(k);
        for i in 1..=k {
            let t = input.la(i);
            la.push(t);
            if t == EOF {
                break;
            }
        }
        let mut candidates = Vec::<AltId>::new();
        let mut first_is_complete = false;
        for (i, set) in decision.alts.iter().enumerate() {
            let complete = set.matches_complete(&la);
            if complete || set.matches_open(&la) {
                if candidates.is_empty() {
                    first_is_complete = complete;
                }
                candidates.push(i as AltId);
            }
        }
        trace!("predict {} (decision {}) with {}: candidates {:?}",
            self.grammar.rule_name(var), decision.id, self.grammar.seq_to_str(&la), candidates);
        match candidates.len() {
            0 => Prediction::NoViable { depth: Self::viable_prefix(decision, &la) + 1 },
            1 => Prediction::Lookahead(candidates[0]),
            _ if first_is_complete => Prediction::Lookahead(candidates[0]),
            _ => self.full_context(var, &candidates, stack, input),
        }
    }

    /// Length of the longest prefix of `la` that begins a lookahead sequence, capped so that
    /// the offending token is within `la`.
    fn viable_prefix(decision: &DecisionState, la: &[TokenId]) -> usize {
        let common = |s: &Vec<TokenId>| s.iter().zip(la).take_while(|(a, b)| a == b).count();
        decision.alts.iter()
            .flat_map(|set| set.complete.iter().chain(set.open.iter()))
            .map(common)
            .max()
            .unwrap_or(0)
            .min(la.len().saturating_sub(1))
    }

    fn full_context<L: Lookahead + ?Sized>(&self, var: VarId, candidates: &[AltId], stack: &[OpCode], input: &mut L) -> Prediction {
        debug!("full-context prediction for {} with {} candidates", self.grammar.rule_name(var), candidates.len());
        let mut configs = BTreeSet::<Config>::new();
        let mut truncated = false;
        let la1 = input.la(1);
        for &alt in candidates {
            let cfg = Config { alt, ops: self.grammar.opcodes(var, alt as usize).to_vec(), depth: stack.len() };
            truncated |= self.closure(cfg, stack, la1, &mut configs);
        }
        let mut live = candidates.iter().copied().collect::<BTreeSet<AltId>>();
        let mut depth = 1;
        loop {
            if truncated {
                // the alternatives live before the last step can't be told apart anymore
                let alts = live.into_iter().collect::<Vec<_>>();
                debug!("- configuration cap reached, alternatives {:?}", alts);
                return Prediction::FullContext { alt: alts[0], depth, ambiguity: Some(Ambiguity { alts, exact: false }) };
            }
            let alts = configs.iter().map(|c| c.alt).collect::<BTreeSet<_>>();
            trace!("- step {depth}: {} configurations, alternatives {:?}", configs.len(), alts);
            match alts.len() {
                0 => return Prediction::NoViable { depth },
                1 => {
                    let alt = alts.into_iter().next().unwrap_or(0);
                    return Prediction::FullContext { alt, depth, ambiguity: None };
                }
                _ => {}
            }
            let t = input.la(depth);
            if t == EOF || configs.iter().all(|c| c.is_accepting()) || Self::same_states(&configs) {
                let alts = alts.into_iter().collect::<Vec<_>>();
                debug!("- ambiguity between alternatives {:?}", alts);
                return Prediction::FullContext { alt: alts[0], depth, ambiguity: Some(Ambiguity { alts, exact: true }) };
            }
            live = alts;
            let la_next = input.la(depth + 1);
            let mut next = BTreeSet::<Config>::new();
            for cfg in configs {
                if cfg.is_accepting() {
                    next.insert(cfg);
                } else if cfg.ops.last() == Some(&OpCode::T(t)) {
                    let mut cfg = cfg;
                    cfg.ops.pop();
                    truncated |= self.closure(cfg, stack, la_next, &mut next);
                }
            }
            configs = next;
            depth += 1;
        }
    }

    /// Checks if all the alternatives have the same configurations, in which case they can't
    /// diverge anymore.
    fn same_states(configs: &BTreeSet<Config>) -> bool {
        let mut states = BTreeMap::<AltId, BTreeSet<(&Vec<OpCode>, usize)>>::new();
        for c in configs {
            states.entry(c.alt).or_default().insert((&c.ops, c.depth));
        }
        let mut iter = states.values();
        match iter.next() {
            Some(first) => iter.all(|s| s == first),
            None => false,
        }
    }

    /// Expands `cfg` until each resulting configuration has the terminal `la` on top of its
    /// stack, or is accepting. Returns `true` if the configuration cap was reached.
    fn closure(&self, cfg: Config, stack: &[OpCode], la: TokenId, out: &mut BTreeSet<Config>) -> bool {
        let mut work = vec![cfg];
        let mut seen = HashSet::<Config>::new();
        while let Some(mut cfg) = work.pop() {
            if out.len() >= self.max_configurations {
                return true;
            }
            if !seen.insert(cfg.clone()) {
                continue;
            }
            let op = match cfg.ops.pop() {
                Some(op) => op,
                None if cfg.depth > 0 => {
                    cfg.depth -= 1;
                    stack[cfg.depth]
                }
                None => {
                    out.insert(cfg);
                    continue;
                }
            };
            match op {
                OpCode::T(t) => {
                    if t == la {
                        cfg.ops.push(op);
                        out.insert(cfg);
                    }
                }
                OpCode::Exit(_) => work.push(cfg),
                OpCode::NT(w) | OpCode::Loop(w) => {
                    for b in 0..self.grammar.num_alts(w) {
                        let (first, nullable) = self.grammar.alt_first(w, b);
                        if nullable || first.contains(&la) {
                            let mut c = cfg.clone();
                            c.ops.extend_from_slice(self.grammar.opcodes(w, b));
                            work.push(c);
                        }
                    }
                }
            }
        }
        false
    }
}
