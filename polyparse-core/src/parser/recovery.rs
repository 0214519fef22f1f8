// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

//! Error recovery: single-token deletion and insertion, then resynchronization on the tokens
//! that can follow the current context.

use std::collections::BTreeSet;
use tracing::debug;
use crate::error::ErrorKind;
use crate::parser::{ActivationState, OpCode, Parser, Run};
use crate::prediction::Predictor;
use crate::stream::{Lookahead, Shifted};
use crate::token::{escape_ws, Token, EOF};
use crate::tree::ErrorNodeKind;
use crate::{TokenId, VarId};

impl Parser<'_, '_> {
    /// Records the position of an error: the current token and the stack depth. Returns `true`
    /// if it's the same position as the previous error, in which case the recovery must consume
    /// a token to make progress.
    fn is_repeated_error(&mut self, run: &mut Run) -> bool {
        let key = (run.stream.token_index(), run.stack.len());
        let repeated = run.last_error == Some(key);
        run.last_error = Some(key);
        repeated
    }

    /// Discards the current token, which is kept in the tree as an error node. `EOF` can't be
    /// discarded.
    fn skip_token(&mut self, run: &mut Run) -> bool {
        if run.stream.la(1) == EOF {
            return false;
        }
        let token = run.stream.consume();
        debug!("skipping {token}");
        self.add_error_node(run, token, ErrorNodeKind::Skipped);
        true
    }

    /// Discards tokens until the current one is in `set` or is `EOF`. Returns the number of
    /// discarded tokens.
    fn skip_until(&mut self, run: &mut Run, set: &BTreeSet<TokenId>) -> usize {
        let mut count = 0;
        while !set.contains(&run.stream.la(1)) && self.skip_token(run) {
            count += 1;
        }
        count
    }

    /// Ends the parse after an error when the recovery is disabled. The activations left on the
    /// stack are closed as failed.
    fn abort_parse(&mut self, run: &mut Run) {
        debug!("parse aborted");
        run.stack.clear();
        run.aborted = true;
    }

    /// Representation of a set of expected token kinds, like `{<EOF>, ID, ';'}`.
    fn expected_to_str(&self, set: &BTreeSet<TokenId>) -> String {
        let mut names = Vec::with_capacity(set.len());
        if set.contains(&EOF) {
            names.push(self.grammar.t_display(EOF));
        }
        names.extend(set.iter().filter(|t| **t != EOF).map(|t| self.grammar.t_display(*t)));
        match names.len() {
            1 => names.pop().unwrap_or_default(),
            _ => format!("{{{}}}", names.join(", ")),
        }
    }

    /// Checks the current token before entering the optional or repeated sub-rule `var`. If it
    /// can neither start `var`, follow it, nor follow an enclosing rule, the token is deleted
    /// when the next one is expected; otherwise the tokens are discarded until one of them is.
    pub(super) fn sync(&mut self, run: &mut Run, var: VarId) {
        let grammar = self.grammar;
        if !self.options.recover || run.recovering {
            return;
        }
        let (follow, nullable) = grammar.first_of_ops(&run.stack);
        if nullable {
            return;
        }
        let la1 = run.stream.la(1);
        let mut expecting = grammar.first(var).clone();
        expecting.extend(follow);
        if expecting.contains(&la1) {
            return;
        }
        // what can follow each enclosing rule
        let mut recovery = BTreeSet::from([EOF]);
        for (pos, _) in run.stack.iter().enumerate().filter(|(_, op)| op.is_exit()) {
            recovery.extend(grammar.first_of_ops(&run.stack[..pos]).0);
        }
        if recovery.contains(&la1) {
            return;
        }
        let found = run.stream.peek(1).display_text();
        let message = format!("extraneous input '{found}' expecting {}", self.expected_to_str(&expecting));
        self.report_parser_error(run, ErrorKind::ExtraneousInput, message);
        if expecting.contains(&run.stream.la(2)) {
            self.skip_token(run);
            run.recovering = false;
        } else {
            recovery.extend(expecting);
            let skipped = self.skip_until(run, &recovery);
            debug!("resynchronized on {} after skipping {skipped} token(s) before {}", run.stream.peek(1), grammar.rule_name(var));
        }
    }

    /// Recovers from a terminal mismatch: the stack expected `t`.
    pub(super) fn recover_terminal(&mut self, run: &mut Run, t: TokenId) {
        let grammar = self.grammar;
        let expected = grammar.t_display(t);
        let current = run.stream.peek(1).clone();
        let found = current.display_text();
        let repeated = self.is_repeated_error(run);
        if !self.options.recover {
            self.report_parser_error(run, ErrorKind::MismatchedInput, format!("mismatched input '{found}' expecting {expected}"));
            self.abort_parse(run);
            return;
        }

        // single-token deletion
        if !current.is_eof() && run.stream.la(2) == t {
            self.report_parser_error(run, ErrorKind::ExtraneousInput, format!("extraneous input '{found}' expecting {expected}"));
            self.skip_token(run);
            let token = run.stream.consume();
            self.add_terminal(run, token);
            run.recovering = false;
            return;
        }

        // single-token insertion
        let (follow, nullable) = grammar.first_of_ops(&run.stack);
        if !repeated && (follow.contains(&current.kind) || nullable && current.is_eof()) {
            self.report_parser_error(run, ErrorKind::MissingToken, format!("missing {expected} at '{found}'"));
            let conjured = Token::conjured(t, format!("<missing {expected}>"), &current);
            self.add_error_node(run, conjured, ErrorNodeKind::Missing);
            return;
        }

        self.report_parser_error(run, ErrorKind::MismatchedInput, format!("mismatched input '{found}' expecting {expected}"));
        self.resync_rule(run, repeated);
    }

    /// Discards tokens until one can follow the innermost named rule, then unwinds the stack to
    /// the `Exit` of that rule, which is marked as failed.
    fn resync_rule(&mut self, run: &mut Run, force_consume: bool) {
        let Some(pos) = run.stack.iter().rposition(|op| op.is_exit()) else {
            run.stack.clear();
            return;
        };
        let (mut follow, _) = self.grammar.first_of_ops(&run.stack[..pos]);
        follow.insert(EOF);
        if force_consume {
            self.skip_token(run);
        }
        let skipped = self.skip_until(run, &follow);
        debug!("resynchronized on {} after skipping {skipped} token(s), unwinding {} opcode(s)",
            run.stream.peek(1), run.stack.len() - pos - 1);
        run.stack.truncate(pos + 1);
        if let Some(a) = run.activations.last_mut() {
            a.state = ActivationState::Failed;
        }
    }

    /// Recovers from a failed decision of `var`, which was reached with `op`. `depth` is the
    /// number of tokens the prediction examined.
    pub(super) fn no_viable_alternative(&mut self, run: &mut Run, var: VarId, op: OpCode, depth: usize) {
        let grammar = self.grammar;
        let decision = grammar.decision(var).map(|d| d.id).unwrap_or_default();
        let start = run.stream.peek(1).start;
        let stop = run.stream.peek(depth.max(1)).stop;
        let text = run.stream.source().get(start..stop).unwrap_or_default();
        let text = if text.is_empty() { "<EOF>".to_string() } else { escape_ws(text) };
        let message = format!("no viable alternative at input '{text}' in rule {} (decision {decision})", grammar.owner_name(var));
        let repeated = self.is_repeated_error(run);
        self.report_parser_error(run, ErrorKind::NoViableAlternative, message);
        if !self.options.recover {
            self.abort_parse(run);
            return;
        }

        // single-token deletion: the decision succeeds without the current token
        if !repeated && run.stream.la(1) != EOF {
            let predictor = Predictor::new(grammar, self.options.max_configurations);
            let prediction = predictor.predict(var, &run.stack, &mut Shifted::new(&mut run.stream, 1));
            if let Some(alt) = prediction.alt() {
                debug!("recovered by deleting {}", run.stream.peek(1));
                self.skip_token(run);
                self.push_alternative(run, var, alt);
                return;
            }
        }

        if !grammar.is_synthetic(var) {
            // the activation was entered without an alternative: unwind it
            run.stack.push(OpCode::Exit(var));
            self.resync_rule(run, repeated);
            return;
        }

        // sub-rule: resynchronize on the sub-rule itself, or on what follows it
        let first = grammar.first(var);
        let (mut follow, _) = grammar.first_of_ops(&run.stack);
        follow.insert(EOF);
        follow.extend(first.iter());
        let mut skipped = 0;
        if repeated && self.skip_token(run) {
            skipped += 1;
        }
        skipped += self.skip_until(run, &follow);
        if first.contains(&run.stream.la(1)) && (skipped > 0 || !repeated) {
            debug!("resynchronized on {} after skipping {skipped} token(s), deciding again", run.stream.peek(1));
            run.stack.push(op);
        } else {
            debug!("resynchronized on {} after skipping {skipped} token(s), leaving {}", run.stream.peek(1), grammar.rule_name(var));
            if let Some(a) = run.activations.last_mut() {
                a.state = ActivationState::Failed;
            }
        }
    }
}
