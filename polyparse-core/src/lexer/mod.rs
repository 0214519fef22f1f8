// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

pub(crate) mod tests;

use std::fmt::{Display, Formatter};
use std::ops::{Add, AddAssign};
use regex::Regex;
use tracing::{trace, warn};
use crate::error::{ContractError, ErrorKind, ParseError};
use crate::token::{escape_ws, Token, DEFAULT_CHANNEL};
use crate::TokenId;

// ---------------------------------------------------------------------------------------------
// Types used in lexer

pub type ChannelId = u16;
pub type ModeId = u16;
/// ID of a lexer hook, interpreted by the dialect's [TokenClassifier]
pub type HookId = u16;

/// Mode at the bottom of the mode stack
pub const DEFAULT_MODE: ModeId = 0;

/// Terminal instructions for the lexer logic.
///
/// Possible actions:
/// * skip           => doesn't return token, drops current string
/// * more           => doesn't return token, keeps current string for next rule
/// * mode(n)        => switches to mode `n`
/// * push(n)        => pushes mode and switches to mode `n`
/// * pop            => pops next mode from the stack
/// * channel #      => defines output channel
/// * hook #         => calls the classifier, which may change all the above
///
/// The mode stack is updated before the hook is called: `pop` first, then `mode`/`push`.
#[derive(Clone, Debug, PartialEq, Default, Eq)]
pub struct Terminal {
    pub action: ActionOption,
    pub channel: ChannelId,
    pub mode: ModeOption,
    pub pop: bool,
    pub hook: Option<HookId>,
}

impl Terminal {
    #[inline]
    pub fn is_only_skip(&self) -> bool {
        self.action.is_skip() && self.mode.is_none() && !self.pop && self.hook.is_none()
    }

    #[inline]
    pub fn is_token(&self) -> bool {
        self.action.is_token()
    }

    #[inline]
    pub fn get_token(&self) -> Option<TokenId> {
        self.action.get_token()
    }
}

impl Display for Terminal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{}", self.action)?;
        if self.channel != 0 { write!(f, ",ch {}", self.channel)?; }
        match self.mode {
            ModeOption::None => {}
            ModeOption::Mode(m) => write!(f, ",mode({m})")?,
            ModeOption::Push(m) => write!(f, ",push({m})")?,
        }
        if self.pop { write!(f, ",pop")?; }
        if let Some(h) = self.hook { write!(f, ",hook {h}")?; }
        write!(f, ">")
    }
}

impl Add for Terminal {
    type Output = Terminal;

    fn add(self, rhs: Self) -> Self::Output {
        Terminal {
            action: self.action + rhs.action,
            channel: self.channel + rhs.channel,
            mode: if !self.mode.is_none() { self.mode } else { rhs.mode },
            pop: self.pop || rhs.pop,
            hook: self.hook.or(rhs.hook),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Default, Eq)]
pub enum ActionOption {
    #[default] Skip,
    Token(TokenId),
    More
}

impl ActionOption {
    pub fn is_skip(&self) -> bool { self == &ActionOption::Skip }
    pub fn is_token(&self) -> bool { matches!(self, ActionOption::Token(_) ) }
    pub fn is_more(&self) -> bool { self == &ActionOption::More }

    pub fn get_token(&self) -> Option<TokenId> {
        if let ActionOption::Token(token) = self {
            Some(*token)
        } else {
            None
        }
    }
}

/// Adds two actions: `skip` is neutral, otherwise the left operand is kept.
impl Add for ActionOption {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        match self {
            ActionOption::Skip => rhs,
            _ => self
        }
    }
}

impl Display for ActionOption {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionOption::Skip => write!(f, "skip"),
            ActionOption::Token(t) => write!(f, "end:{t}"),
            ActionOption::More => write!(f, "more")
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Default, Eq)]
pub enum ModeOption {
    #[default]
    None,
    Mode(ModeId),
    Push(ModeId)
}

impl ModeOption {
    pub fn is_none(&self) -> bool {
        self == &ModeOption::None
    }

    pub fn is_mode(&self) -> bool {
        matches!(self, &ModeOption::Mode(_))
    }

    pub fn is_push(&self) -> bool {
        matches!(self, &ModeOption::Push(_))
    }
}

/// Generates a [Terminal]. Terminals can be added to combine their actions.
///
/// # Example
/// ```
/// # use polyparse_core::term;
/// # use polyparse_core::lexer::{ActionOption, ModeOption, Terminal};
/// let t = term!(=5) + term!(push 2) + term!(#1);
/// assert_eq!(t.action, ActionOption::Token(5));
/// assert_eq!(t.mode, ModeOption::Push(2));
/// assert_eq!(t.channel, 1);
/// ```
#[macro_export]
macro_rules! term {
    (= $id:expr) =>    { $crate::lexer::Terminal { action: $crate::lexer::ActionOption::Token($id), ..Default::default() } };
    (skip) =>          { $crate::lexer::Terminal::default() };
    (more) =>          { $crate::lexer::Terminal { action: $crate::lexer::ActionOption::More, ..Default::default() } };
    (mode $id:expr) => { $crate::lexer::Terminal { mode: $crate::lexer::ModeOption::Mode($id), ..Default::default() } };
    (push $id:expr) => { $crate::lexer::Terminal { mode: $crate::lexer::ModeOption::Push($id), ..Default::default() } };
    (pop) =>           { $crate::lexer::Terminal { pop: true, ..Default::default() } };
    (# $id:expr) =>    { $crate::lexer::Terminal { channel: $id, ..Default::default() } };
    (hook $id:expr) => { $crate::lexer::Terminal { hook: Some($id), ..Default::default() } };
}

// ---------------------------------------------------------------------------------------------
// Locations

pub type CaretCol = u64;
pub type CaretLine = u64;

/// `Pos(line, col)`, where `line` starts at 1 and `col` at 0.
#[derive(Clone, Copy, PartialEq, PartialOrd, Eq, Debug, Hash)]
pub struct Pos(pub CaretLine, pub CaretCol);

impl Pos {
    pub fn line(&self) -> CaretLine {
        self.0
    }

    pub fn col(&self) -> CaretCol {
        self.1
    }
}

impl Display for Pos {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.0, self.1)
    }
}

/// `PosSpan` defines a text selection where `first` and `last` are the [position](Pos) of the first and last character.
/// When `first` > `last`, no text is selected.
#[derive(Clone, PartialEq, Debug)]
pub struct PosSpan {
    pub first: Pos,
    pub last: Pos,
}

impl PosSpan {
    #[inline(always)]
    pub fn new(first: Pos, last: Pos) -> Self {
        PosSpan { first, last }
    }

    #[inline(always)]
    pub fn empty() -> Self {
        PosSpan { first: Pos(1, 1), last: Pos(0, 0) }
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.first > self.last
    }

    #[inline(always)]
    pub fn is_not_empty(&self) -> bool {
        self.first <= self.last
    }

    pub fn first(&self) -> Option<Pos> {
        if self.is_not_empty() { Some(self.first) } else { None }
    }

    pub fn last(&self) -> Option<Pos> {
        if self.is_not_empty() { Some(self.last) } else { None }
    }
}

impl AddAssign<&PosSpan> for PosSpan {
    fn add_assign(&mut self, rhs: &Self) {
        match (self.is_empty(), rhs.is_empty()) {
            (true, false) => (self.first, self.last) = (rhs.first, rhs.last),
            (false, false) => self.last = rhs.last,
            _ => {}
        }
    }
}

impl Default for PosSpan {
    fn default() -> Self {
        PosSpan::empty()
    }
}

impl Display for PosSpan {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_not_empty() {
            let (first, last) = (&self.first, &self.last);
            if first == last {
                write!(f, "{}:{}", first.0, first.1)
            } else if first.0 == last.0 {
                write!(f, "{}:{}-{}", first.0, first.1, last.1)
            } else {
                write!(f, "{}:{}-{}:{}", first.0, first.1, last.0, last.1)
            }
        } else {
            write!(f, "<empty>")
        }
    }
}

// ---------------------------------------------------------------------------------------------
// Lexer specification

/// Recognition rule of a mode. The pattern is anchored at the current position.
#[derive(Clone, Debug)]
pub struct LexRule {
    pub name: String,
    pub regex: Regex,
    pub terminal: Terminal,
}

/// What the lexer does when the input ends while the mode is still on the stack.
#[derive(Clone, PartialEq, Debug)]
pub struct UnterminatedRegion {
    /// name of the construct, used in the error message: "unterminated {construct}"
    pub construct: String,
    /// token emitted at the end of the input to close the region, if any
    pub close: Option<TokenId>,
}

#[derive(Clone, Debug)]
pub struct ModeSpec {
    pub name: String,
    pub rules: Vec<LexRule>,
    pub unterminated: Option<UnterminatedRegion>,
}

/// Lexer modes of a dialect. Mode 0 is the default mode, at the bottom of the mode stack.
#[derive(Clone, Debug)]
pub struct LexerSpec {
    pub modes: Vec<ModeSpec>,
}

impl LexerSpec {
    pub fn builder() -> LexerSpecBuilder {
        LexerSpecBuilder::new()
    }

    pub fn get_mode_name(&self, mode: ModeId) -> &str {
        self.modes.get(mode as usize).map(|m| m.name.as_str()).unwrap_or("?")
    }
}

/// Builds a [LexerSpec]. Rules are added to the last declared mode; a default mode is
/// created if a rule is added before any mode.
///
/// ```
/// # use polyparse_core::term;
/// # use polyparse_core::lexer::LexerSpec;
/// # use polyparse_core::token::HIDDEN_CHANNEL;
/// const ID: u16 = 0;
/// const WS: u16 = 1;
/// let spec = LexerSpec::builder()
///     .mode("DEFAULT_MODE")
///     .rule("ID", "[a-z]+", term!(=ID))
///     .rule("WS", r"\s+", term!(=WS) + term!(#HIDDEN_CHANNEL))
///     .build()
///     .unwrap();
/// assert_eq!(spec.modes[0].rules.len(), 2);
/// ```
#[derive(Clone, Debug, Default)]
pub struct LexerSpecBuilder {
    modes: Vec<(String, Option<UnterminatedRegion>, Vec<(String, String, Terminal)>)>,
}

impl LexerSpecBuilder {
    pub fn new() -> Self {
        LexerSpecBuilder { modes: Vec::new() }
    }

    /// Starts a new mode. Its ID is the number of modes declared before it.
    pub fn mode<S: Into<String>>(mut self, name: S) -> Self {
        self.modes.push((name.into(), None, Vec::new()));
        self
    }

    /// Defines how the current mode is closed when the input ends inside it.
    pub fn unterminated<S: Into<String>>(mut self, construct: S, close: Option<TokenId>) -> Self {
        if self.modes.is_empty() {
            self = self.mode("DEFAULT_MODE");
        }
        if let Some(mode) = self.modes.last_mut() {
            mode.1 = Some(UnterminatedRegion { construct: construct.into(), close });
        }
        self
    }

    /// Adds a rule to the current mode. The longest match wins; in case of a tie, the rule
    /// added first wins.
    pub fn rule<S: Into<String>>(mut self, name: S, pattern: &str, terminal: Terminal) -> Self {
        if self.modes.is_empty() {
            self = self.mode("DEFAULT_MODE");
        }
        if let Some(mode) = self.modes.last_mut() {
            mode.2.push((name.into(), pattern.to_string(), terminal));
        }
        self
    }

    pub fn build(self) -> Result<LexerSpec, ContractError> {
        if self.modes.is_empty() {
            return Err(ContractError::NoLexerMode);
        }
        let nbr_modes = self.modes.len();
        let mut modes = Vec::with_capacity(nbr_modes);
        for (name, unterminated, rules) in self.modes {
            let mut mode_rules = Vec::with_capacity(rules.len());
            for (rule_name, pattern, terminal) in rules {
                let regex = Regex::new(&format!(r"\A(?:{pattern})"))
                    .map_err(|e| ContractError::InvalidPattern { rule: rule_name.clone(), message: e.to_string() })?;
                if regex.is_match("") {
                    return Err(ContractError::EmptyPattern { rule: rule_name });
                }
                if let ModeOption::Mode(m) | ModeOption::Push(m) = terminal.mode {
                    if m as usize >= nbr_modes {
                        return Err(ContractError::UnknownMode { rule: rule_name, mode: m as u32 });
                    }
                }
                mode_rules.push(LexRule { name: rule_name, regex, terminal });
            }
            modes.push(ModeSpec { name, rules: mode_rules, unterminated });
        }
        Ok(LexerSpec { modes })
    }
}

// ---------------------------------------------------------------------------------------------
// Mode stack

/// Entry of the mode stack, with the location where the mode was pushed.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ModeFrame {
    pub mode: ModeId,
    pub opened_at: Pos,
    pub offset: usize,
}

/// Stack of lexer modes. The bottom frame is a sentinel that can't be popped, so the stack is
/// never empty.
#[derive(Clone, PartialEq, Debug)]
pub struct ModeStack {
    frames: Vec<ModeFrame>,
}

impl ModeStack {
    pub fn new() -> Self {
        ModeStack { frames: vec![ModeFrame { mode: DEFAULT_MODE, opened_at: Pos(1, 0), offset: 0 }] }
    }

    /// Current mode
    pub fn mode(&self) -> ModeId {
        self.frames.last().map(|f| f.mode).unwrap_or(DEFAULT_MODE)
    }

    /// Number of frames, sentinel included
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn push(&mut self, mode: ModeId, opened_at: Pos, offset: usize) {
        self.frames.push(ModeFrame { mode, opened_at, offset });
    }

    /// Pops the current mode. Returns `None` if only the sentinel remains.
    pub fn pop(&mut self) -> Option<ModeFrame> {
        if self.frames.len() > 1 { self.frames.pop() } else { None }
    }

    /// Replaces the current mode.
    pub fn set_mode(&mut self, mode: ModeId) {
        if let Some(frame) = self.frames.last_mut() {
            frame.mode = mode;
        }
    }

    /// Oldest frame pushed on top of the sentinel, if any.
    pub fn outermost_open(&self) -> Option<&ModeFrame> {
        self.frames.get(1)
    }
}

impl Default for ModeStack {
    fn default() -> Self {
        ModeStack::new()
    }
}

// ---------------------------------------------------------------------------------------------
// Lexer state

/// State of one lex, owned by the [Lexer] that runs it.
#[derive(Clone, PartialEq, Debug)]
pub struct LexerState {
    offset: usize,
    line: CaretLine,
    col: CaretCol,
    modes: ModeStack,
    pushes: usize,
    pops: usize,
    next_index: usize,
    eof: bool,
}

impl LexerState {
    pub fn new() -> Self {
        LexerState { offset: 0, line: 1, col: 0, modes: ModeStack::new(), pushes: 0, pops: 0, next_index: 0, eof: false }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn pos(&self) -> Pos {
        Pos(self.line, self.col)
    }

    pub fn modes(&self) -> &ModeStack {
        &self.modes
    }

    pub fn mode(&self) -> ModeId {
        self.modes.mode()
    }

    pub fn pushes(&self) -> usize {
        self.pushes
    }

    pub fn pops(&self) -> usize {
        self.pops
    }

    /// Checks that every pushed mode has been popped.
    pub fn is_balanced(&self) -> bool {
        self.pushes == self.pops && self.modes.depth() == 1
    }

    pub fn is_eof(&self) -> bool {
        self.eof
    }

    fn push_mode(&mut self, mode: ModeId, opened_at: Pos, offset: usize) {
        self.modes.push(mode, opened_at, offset);
        self.pushes += 1;
    }

    fn pop_mode(&mut self) -> bool {
        if self.modes.pop().is_some() {
            self.pops += 1;
            true
        } else {
            false
        }
    }

    fn advance(&mut self, text: &str) {
        for c in text.chars() {
            if c == '\n' {
                self.line += 1;
                self.col = 0;
            } else {
                self.col += 1;
            }
        }
        self.offset += text.len();
    }

    fn take_index(&mut self) -> usize {
        let index = self.next_index;
        self.next_index += 1;
        index
    }
}

impl Default for LexerState {
    fn default() -> Self {
        LexerState::new()
    }
}

// ---------------------------------------------------------------------------------------------
// Classifier

/// Access given to a [TokenClassifier] hook on the lexer while a rule is being applied.
pub struct LexerControl<'a> {
    state: &'a mut LexerState,
    action: ActionOption,
    text: &'a str,
    start: (Pos, usize),
    nbr_modes: usize,
    underflow: bool,
}

impl LexerControl<'_> {
    /// Text matched by the current rule.
    pub fn text(&self) -> &str {
        self.text
    }

    pub fn mode(&self) -> ModeId {
        self.state.mode()
    }

    /// Number of modes on the stack, the sentinel included.
    pub fn mode_depth(&self) -> usize {
        self.state.modes.depth()
    }

    /// Pushes `mode`, recording the start of the current token as the region start.
    pub fn push_mode(&mut self, mode: ModeId) {
        if (mode as usize) < self.nbr_modes {
            let (pos, offset) = self.start;
            self.state.push_mode(mode, pos, offset);
        } else {
            warn!("lexer hook pushed undefined mode {mode}, ignored");
        }
    }

    /// Pops the current mode. Returns `false` (and the lexer reports an error) if only the
    /// sentinel mode was left.
    pub fn pop_mode(&mut self) -> bool {
        let ok = self.state.pop_mode();
        self.underflow |= !ok;
        ok
    }

    /// Kind of token that will be emitted, if the current action emits one.
    pub fn kind(&self) -> Option<TokenId> {
        self.action.get_token()
    }

    pub fn set_kind(&mut self, kind: TokenId) {
        self.action = ActionOption::Token(kind);
    }

    /// Keeps the current text as the prefix of the next token instead of emitting it.
    pub fn more(&mut self) {
        self.action = ActionOption::More;
    }

    pub fn skip(&mut self) {
        self.action = ActionOption::Skip;
    }
}

/// Dialect-specific logic that resolves lexical ambiguities from the grammatical context.
///
/// One instance is created for each lex, so it may keep state.
pub trait TokenClassifier {
    /// Called when a lex starts.
    fn reset(&mut self) {}

    /// Called when a rule with a `hook` terminal has matched, after the mode stack has been
    /// updated by the terminal.
    #[allow(unused_variables)]
    fn lexer_hook(&mut self, hook: HookId, ctl: &mut LexerControl<'_>) {}

    /// Called once for each emitted token, before it's made available. This is the place
    /// where [`Token::reclassify`] may be called.
    #[allow(unused_variables)]
    fn classify(&mut self, token: &mut Token) {}
}

/// Classifier that leaves all the tokens as they are.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoClassifier;

impl TokenClassifier for NoClassifier {}

pub type ClassifierFactory = fn() -> Box<dyn TokenClassifier>;

pub fn no_classifier() -> Box<dyn TokenClassifier> {
    Box::new(NoClassifier)
}

// ---------------------------------------------------------------------------------------------
// Lexer

/// Lexical analyzer interpreting a [LexerSpec] over a source string.
///
/// Errors don't interrupt the lex: they're queued and can be collected with
/// [`take_errors()`](Lexer::take_errors).
pub struct Lexer<'g, 's> {
    spec: &'g LexerSpec,
    source: &'s str,
    state: LexerState,
    classifier: Box<dyn TokenClassifier>,
    errors: Vec<ParseError>,
}

impl<'g, 's> Lexer<'g, 's> {
    pub fn new(spec: &'g LexerSpec, source: &'s str, mut classifier: Box<dyn TokenClassifier>) -> Self {
        classifier.reset();
        Lexer { spec, source, state: LexerState::new(), classifier, errors: Vec::new() }
    }

    pub fn state(&self) -> &LexerState {
        &self.state
    }

    pub fn source(&self) -> &'s str {
        self.source
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Takes the errors found since the last call.
    pub fn take_errors(&mut self) -> Vec<ParseError> {
        std::mem::take(&mut self.errors)
    }

    pub fn tokens(&mut self) -> LexIter<'_, 'g, 's> {
        LexIter { lexer: self, done: false }
    }

    // next_token flow:
    //
    //      loop
    //          if end of input
    //              if modes pushed: report, unwind, emit implicit close if any
    //              else if pending 'more' text: report it
    //              return EOF
    //          find longest match in current mode
    //          if none: report, drop the character, drop pending 'more' text, continue
    //          apply pop, mode/push, hook
    //          skip => drop text, more => keep text, token => emit
    //
    /// Returns the next token. After the end of the input, it returns the `EOF` token
    /// indefinitely.
    pub fn next_token(&mut self) -> Token {
        let (spec, source) = (self.spec, self.source);
        let mut more_start: Option<(usize, Pos)> = None;
        loop {
            let offset = self.state.offset;
            if offset >= source.len() {
                if self.state.modes.outermost_open().is_some() {
                    if let Some(token) = self.close_unterminated(more_start) {
                        return token;
                    }
                } else if let Some((start, pos)) = more_start.take() {
                    self.errors.push(ParseError::new(
                        ErrorKind::IncompleteToken, pos, start,
                        format!("token recognition error at: '{}'", escape_ws(&source[start..]))));
                    trace!("lexer: incomplete token {:?} at {pos}", &source[start..]);
                }
                self.state.eof = true;
                let mut token = Token::eof(source.len(), self.state.pos());
                token.index = self.state.take_index();
                return token;
            }
            let rest = &source[offset..];
            let mode = self.state.mode();
            let Some(mode_spec) = spec.modes.get(mode as usize) else {
                // hooks can only push valid modes, so this is only possible with an empty spec
                self.state.eof = true;
                let mut token = Token::eof(source.len(), self.state.pos());
                token.index = self.state.take_index();
                return token;
            };
            let mut best: Option<(usize, usize)> = None;
            for (i, rule) in mode_spec.rules.iter().enumerate() {
                if let Some(m) = rule.regex.find(rest) {
                    let len = m.end();
                    if len > 0 && best.map(|(_, best_len)| len > best_len).unwrap_or(true) {
                        best = Some((i, len));
                    }
                }
            }
            let pos = self.state.pos();
            let Some((rule_id, len)) = best else {
                let c = rest.chars().next().unwrap_or('\u{fffd}');
                let c_str = &rest[..c.len_utf8()];
                self.errors.push(ParseError::new(
                    ErrorKind::UnrecognizedCharacter, pos, offset,
                    format!("token recognition error at: '{}'", escape_ws(&c.to_string()))));
                trace!("lexer: unrecognized character {c:?} at {pos} in mode {}", mode_spec.name);
                self.state.advance(c_str);
                more_start = None;
                continue;
            };
            let rule = &mode_spec.rules[rule_id];
            let text = &rest[..len];
            let (token_offset, token_pos) = more_start.unwrap_or((offset, pos));
            trace!("lexer: {} matches {text:?} at {pos} in mode {}", rule.name, mode_spec.name);
            self.state.advance(text);
            let terminal = &rule.terminal;
            let mut underflow = false;
            if terminal.pop {
                underflow = !self.state.pop_mode();
            }
            match terminal.mode {
                ModeOption::None => {}
                ModeOption::Mode(m) => self.state.modes.set_mode(m),
                ModeOption::Push(m) => self.state.push_mode(m, token_pos, token_offset),
            }
            let mut action = terminal.action;
            if let Some(hook) = terminal.hook {
                let mut ctl = LexerControl {
                    state: &mut self.state,
                    action,
                    text,
                    start: (token_pos, token_offset),
                    nbr_modes: spec.modes.len(),
                    underflow: false,
                };
                self.classifier.lexer_hook(hook, &mut ctl);
                action = ctl.action;
                underflow |= ctl.underflow;
            }
            if underflow {
                self.errors.push(ParseError::new(
                    ErrorKind::ModeStackUnderflow, pos, offset,
                    format!("mode stack underflow at: '{}'", escape_ws(&text))));
            }
            match action {
                ActionOption::Skip => {
                    more_start = None;
                }
                ActionOption::More => {
                    more_start = Some((token_offset, token_pos));
                }
                ActionOption::Token(kind) => {
                    let text = source[token_offset..self.state.offset].to_string();
                    return self.emit(Token::new(kind, terminal.channel, text, token_offset, token_pos));
                }
            }
        }
    }

    fn emit(&mut self, mut token: Token) -> Token {
        token.index = self.state.take_index();
        self.classifier.classify(&mut token);
        token
    }

    /// Handles the end of the input while modes are still pushed: reports the outermost open
    /// region, unwinds the mode stack and returns the implicit closing token, if the region
    /// defines one.
    fn close_unterminated(&mut self, more_start: Option<(usize, Pos)>) -> Option<Token> {
        let frame = *self.state.modes.outermost_open()?;
        let region = self.spec.modes.get(frame.mode as usize).and_then(|m| m.unterminated.clone());
        let construct = region.as_ref()
            .map(|r| r.construct.clone())
            .unwrap_or_else(|| self.spec.get_mode_name(frame.mode).to_string());
        self.errors.push(ParseError::new(
            ErrorKind::UnterminatedRegion, frame.opened_at, frame.offset,
            format!("unterminated {construct}")));
        trace!("lexer: unterminated {construct} opened at {}", frame.opened_at);
        while self.state.pop_mode() {}
        let close = region.and_then(|r| r.close)?;
        let (start, pos) = more_start.unwrap_or((self.source.len(), self.state.pos()));
        let text = self.source[start..].to_string();
        Some(self.emit(Token::new(close, DEFAULT_CHANNEL, text, start, pos)))
    }
}

/// Iterator over the tokens of a lexer, `EOF` included.
pub struct LexIter<'a, 'g, 's> {
    lexer: &'a mut Lexer<'g, 's>,
    done: bool,
}

impl Iterator for LexIter<'_, '_, '_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            None
        } else {
            let token = self.lexer.next_token();
            self.done = token.is_eof();
            Some(token)
        }
    }
}
