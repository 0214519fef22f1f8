// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

//! Fixpoint calculations over the flattened rules: nullability, FIRST_1, FOLLOW_1 and FIRST_k.

use std::collections::BTreeSet;
use tracing::trace;
use crate::alt::{Alternative, Symbol};
use crate::grammar::{RuleInfo, Sequence};
use crate::token::EOF;
use crate::{TokenId, VarId};

pub(crate) fn calc_nullable(rules: &[RuleInfo]) -> Vec<bool> {
    let mut nullable = vec![false; rules.len()];
    let mut change = true;
    while change {
        change = false;
        for (v, rule) in rules.iter().enumerate() {
            if !nullable[v] && rule.alts.iter().any(|alt| alt.iter().all(|s| matches!(s, Symbol::NT(w) if nullable[*w as usize]))) {
                nullable[v] = true;
                change = true;
            }
        }
    }
    nullable
}

pub(crate) fn calc_first(rules: &[RuleInfo], nullable: &[bool]) -> Vec<BTreeSet<TokenId>> {
    let mut first = vec![BTreeSet::<TokenId>::new(); rules.len()];
    let mut change = true;
    while change {
        change = false;
        for (v, rule) in rules.iter().enumerate() {
            let num_items = first[v].len();
            for alt in &rule.alts {
                let (new, _) = alt.calc_alt_first(&first, nullable);
                first[v].extend(new);
            }
            change |= first[v].len() > num_items;
        }
        if change { trace!("calc_first: again"); }
    }
    first
}

pub(crate) fn calc_follow(rules: &[RuleInfo], start: VarId, first: &[BTreeSet<TokenId>], nullable: &[bool]) -> Vec<BTreeSet<TokenId>> {
    let mut follow = vec![BTreeSet::<TokenId>::new(); rules.len()];
    follow[start as usize].insert(EOF);
    let mut change = true;
    while change {
        change = false;
        for (v, rule) in rules.iter().enumerate() {
            for alt in &rule.alts {
                let mut trail = follow[v].clone();
                for sym_i in alt.iter().rev() {
                    match sym_i {
                        Symbol::NT(w) => {
                            let w = *w as usize;
                            let num_items = follow[w].len();
                            follow[w].extend(&trail);
                            change |= follow[w].len() > num_items;
                            if nullable[w] {
                                trail.extend(&first[w]);
                            } else {
                                trail.clone_from(&first[w]);
                            }
                        }
                        Symbol::T(t) => {
                            trail.clear();
                            trail.insert(*t);
                        }
                    }
                }
            }
        }
    }
    follow
}

// ---------------------------------------------------------------------------------------------

/// Is `seq` a complete lookahead sequence: `k` tokens long or ending with `EOF`?
pub(crate) fn is_complete(seq: &[TokenId], k: usize) -> bool {
    seq.len() >= k || seq.last() == Some(&EOF)
}

/// Concatenates each sequence of `a` with each sequence of `b`, truncating the result to `k`
/// tokens. Complete sequences of `a` are kept as they are.
pub(crate) fn concat_k(a: &BTreeSet<Sequence>, b: &BTreeSet<Sequence>, k: usize) -> BTreeSet<Sequence> {
    let mut result = BTreeSet::new();
    for x in a {
        if is_complete(x, k) {
            result.insert(x.clone());
        } else {
            for y in b {
                let mut z = x.clone();
                for t in y {
                    if is_complete(&z, k) {
                        break;
                    }
                    z.push(*t);
                }
                result.insert(z);
            }
        }
    }
    result
}

/// FIRST_k of an alternative, given the FIRST_k of the nonterminals.
pub(crate) fn alt_first_k(alt: &Alternative, first_k: &[BTreeSet<Sequence>], k: usize) -> BTreeSet<Sequence> {
    let mut acc = BTreeSet::from([Sequence::new()]);
    for sym in alt.iter() {
        if acc.iter().all(|s| is_complete(s, k)) {
            break;
        }
        acc = match sym {
            Symbol::T(t) => concat_k(&acc, &BTreeSet::from([vec![*t]]), k),
            Symbol::NT(v) => concat_k(&acc, &first_k[*v as usize], k),
        };
    }
    acc
}

pub(crate) fn calc_first_k(rules: &[RuleInfo], k: usize) -> Vec<BTreeSet<Sequence>> {
    let mut first_k = vec![BTreeSet::<Sequence>::new(); rules.len()];
    let mut change = true;
    while change {
        change = false;
        for (v, rule) in rules.iter().enumerate() {
            let num_items = first_k[v].len();
            for alt in &rule.alts {
                let new = alt_first_k(alt, &first_k, k);
                first_k[v].extend(new);
            }
            change |= first_k[v].len() > num_items;
        }
    }
    first_k
}

// ---------------------------------------------------------------------------------------------

/// Finds a rule that can derive itself without consuming a token. Returns the rule where the
/// cycle was detected.
pub(crate) fn find_left_recursion(rules: &[RuleInfo], nullable: &[bool]) -> Option<VarId> {
    // left corners: v -> w if an alternative of v starts with w after nullable symbols
    let corners: Vec<BTreeSet<VarId>> = rules.iter().map(|rule| {
        let mut set = BTreeSet::new();
        for alt in &rule.alts {
            for sym in alt.iter() {
                match sym {
                    Symbol::T(_) => break,
                    Symbol::NT(w) => {
                        set.insert(*w);
                        if !nullable[*w as usize] {
                            break;
                        }
                    }
                }
            }
        }
        set
    }).collect();
    #[derive(Clone, Copy, PartialEq)]
    enum Mark { New, Active, Done }
    let mut marks = vec![Mark::New; rules.len()];
    for root in 0..rules.len() {
        if marks[root] != Mark::New {
            continue;
        }
        // iterative DFS: (var, index of the next corner to visit)
        let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
        marks[root] = Mark::Active;
        while let Some((v, i)) = stack.pop() {
            if let Some(&w) = corners[v].iter().nth(i) {
                stack.push((v, i + 1));
                let w = w as usize;
                match marks[w] {
                    Mark::Active => return Some(w as VarId),
                    Mark::New => {
                        marks[w] = Mark::Active;
                        stack.push((w, 0));
                    }
                    Mark::Done => {}
                }
            } else {
                marks[v] = Mark::Done;
            }
        }
    }
    None
}
