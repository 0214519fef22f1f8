// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

use polyparse_core::lexer::{HookId, LexerControl, TokenClassifier};
use polyparse_core::token::Token;
use tracing::trace;
use crate::lexer::*;

/// Kind of construct the lexer is in, as far as it can tell from the tokens it emitted.
///
/// The state is only used to tell a character set from a rule argument when a `[` is found:
/// character sets only exist in lexer rules. The heuristic is crude (`grammar T;` starts and
/// ends a "lexer rule" for `T;`) but it's enough for that purpose.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum CurrentRuleTypeState {
    /// outside of any rule
    #[default]
    NoRule,
    /// inside `options {`, `tokens {` or `channels {` at the grammar level
    Prequel,
    LexerRule,
    ParserRule,
    /// inside `options {` of a lexer rule
    OptionsInRule,
    /// between `@` and the action block at the grammar level
    InsideAction,
}

/// Token names start with an ASCII uppercase letter, rule names don't.
pub fn is_token_name(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

/// Contextual classifier of the grammar-description lexer: turns the identifiers into
/// `TOKEN_REF` or `RULE_REF`, and picks the mode of the bracketed content.
#[derive(Clone, Debug, Default)]
pub struct G4Classifier {
    state: CurrentRuleTypeState,
}

impl G4Classifier {
    pub fn new() -> Self {
        G4Classifier::default()
    }

    pub fn state(&self) -> CurrentRuleTypeState {
        self.state
    }
}

impl TokenClassifier for G4Classifier {
    fn reset(&mut self) {
        self.state = CurrentRuleTypeState::NoRule;
    }

    fn lexer_hook(&mut self, hook: HookId, ctl: &mut LexerControl<'_>) {
        match hook {
            HOOK_BEGIN_ARGUMENT => {
                if self.state == CurrentRuleTypeState::LexerRule {
                    ctl.push_mode(CHAR_SET_MODE);
                    ctl.more();
                } else {
                    ctl.push_mode(ARGUMENT_MODE);
                }
            }
            HOOK_END_ARGUMENT => {
                // the mode is already popped: a nested `]` still has an argument mode below
                if ctl.mode_depth() > 1 {
                    ctl.set_kind(ARGUMENT_CONTENT);
                }
            }
            HOOK_END_ACTION => {
                if ctl.mode_depth() > 1 {
                    ctl.more();
                }
            }
            _ => {}
        }
    }

    fn classify(&mut self, token: &mut Token) {
        use CurrentRuleTypeState::*;
        let state = self.state;
        self.state = match (token.kind, state) {
            (OPTIONS | TOKENS | CHANNELS, NoRule) => Prequel,
            (OPTIONS, LexerRule) => OptionsInRule,
            (RBRACE, Prequel) => NoRule,
            (RBRACE, OptionsInRule) => LexerRule,
            (AT, NoRule) => InsideAction,
            (SEMI, Prequel | OptionsInRule) => state,
            (ACTION, InsideAction) => NoRule,
            (ID, _) => {
                let is_token = is_token_name(&token.text);
                token.reclassify(if is_token { TOKEN_REF } else { RULE_REF });
                match state {
                    NoRule if is_token => LexerRule,
                    NoRule => ParserRule,
                    _ => state,
                }
            }
            (SEMI, _) => NoRule,
            _ => state,
        };
        if self.state != state {
            trace!("classifier: {:?} -> {:?} on '{}'", state, self.state, token.display_text());
        }
    }
}

/// Factory given to the grammar builder.
pub fn new_classifier() -> Box<dyn TokenClassifier> {
    Box::new(G4Classifier::new())
}
