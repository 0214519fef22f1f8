// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

mod recovery;

use std::fmt::{Display, Formatter};
use tracing::{debug, trace};
use crate::error::{ContractError, ErrorKind, ParseError};
use crate::fixed_sym_table::SymInfoTable;
use crate::grammar::Grammar;
use crate::lexer::Lexer;
use crate::listener::ErrorListener;
use crate::prediction::{AmbiguityReport, DecisionEvent, Prediction, Predictor, MAX_CONFIGURATIONS};
use crate::stream::{Lookahead, TokenStream};
use crate::token::Token;
use crate::tree::{ErrorNode, ErrorNodeKind, ParseTree, RuleNode, TreeListener};
use crate::{AltId, CollectJoin, TokenId, VarId};

// ---------------------------------------------------------------------------------------------

/// Instruction of the parser stack machine.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum OpCode {
    T(TokenId),         // terminal
    NT(VarId),          // nonterminal
    Loop(VarId),        // loop to same nonterminal
    Exit(VarId),        // exit named rule
}

impl Display for OpCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OpCode::T(t) => write!(f, ":{t}"),
            OpCode::NT(v) => write!(f, "►{v}"),
            OpCode::Loop(v) => write!(f, "●{v}"),
            OpCode::Exit(v) => write!(f, "◄{v}"),
        }
    }
}

impl OpCode {
    pub fn is_exit(&self) -> bool {
        matches!(self, OpCode::Exit(_))
    }

    pub fn to_str<T: SymInfoTable>(&self, symbol_table: Option<&T>) -> String {
        if let Some(t) = symbol_table {
            match self {
                OpCode::T(v) => t.get_t_str(*v),
                OpCode::NT(v) => format!("►{}", t.get_nt_name(*v)),
                OpCode::Loop(v) => format!("●{}", t.get_nt_name(*v)),
                OpCode::Exit(v) => format!("◄{}", t.get_nt_name(*v)),
            }
        } else {
            self.to_string()
        }
    }
}

// ---------------------------------------------------------------------------------------------

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ActivationState { Entered, SelectingAlternative, MatchingElements, Completed, Failed }

/// Entry of the parser's call stack: a named rule being parsed. The parent is the activation
/// below it; once it's completed, it's moved into the parent's children.
#[derive(Clone, Debug)]
pub struct RuleActivation {
    pub rule: VarId,
    pub alt: Option<AltId>,
    pub children: Vec<ParseTree>,
    pub start: usize,
    pub stop: Option<usize>,
    pub state: ActivationState,
}

impl RuleActivation {
    fn new(rule: VarId, start: usize) -> Self {
        RuleActivation { rule, alt: None, children: Vec::new(), start, stop: None, state: ActivationState::Entered }
    }

    fn into_node(self) -> RuleNode {
        RuleNode {
            rule: self.rule,
            alt: self.alt,
            children: self.children,
            start: self.start,
            stop: self.stop,
            failed: self.state == ActivationState::Failed,
        }
    }
}

// ---------------------------------------------------------------------------------------------

/// Options of a [Parser].
#[derive(Clone, PartialEq, Debug)]
pub struct ParserOptions {
    /// recovers from syntax errors; if `false`, the first parser error ends the parse
    pub recover: bool,
    /// stores the children of the rule nodes; the listeners are called either way
    pub build_tree: bool,
    /// maximum number of parser errors reported (the parse continues)
    pub max_errors: Option<usize>,
    /// cap on the live configurations of a full-context simulation
    pub max_configurations: usize,
    /// reports the ambiguities to the listeners and in the result
    pub report_ambiguities: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        ParserOptions {
            recover: true,
            build_tree: true,
            max_errors: None,
            max_configurations: MAX_CONFIGURATIONS,
            report_ambiguities: true,
        }
    }
}

impl ParserOptions {
    pub fn new() -> Self {
        ParserOptions::default()
    }

    pub fn with_recover(mut self, recover: bool) -> Self {
        self.recover = recover;
        self
    }

    pub fn with_build_tree(mut self, build_tree: bool) -> Self {
        self.build_tree = build_tree;
        self
    }

    pub fn with_max_errors(mut self, max_errors: Option<usize>) -> Self {
        self.max_errors = max_errors;
        self
    }

    pub fn with_max_configurations(mut self, max_configurations: usize) -> Self {
        self.max_configurations = max_configurations;
        self
    }

    pub fn with_report_ambiguities(mut self, report_ambiguities: bool) -> Self {
        self.report_ambiguities = report_ambiguities;
        self
    }
}

// ---------------------------------------------------------------------------------------------

/// Outcome of a parse. The tree is always present, even when errors were found.
#[derive(Clone, Debug)]
pub struct ParseResult {
    pub tree: RuleNode,
    /// lexer and parser errors, in the order they were reported
    pub errors: Vec<ParseError>,
    pub ambiguities: Vec<AmbiguityReport>,
    /// all the tokens, hidden channels included, ending with `EOF`
    pub tokens: Vec<Token>,
}

impl ParseResult {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Checks if a node of the tree failed or contains error nodes.
    pub fn is_partial(&self) -> bool {
        self.tree.is_partial()
    }

    pub fn lexer_errors(&self) -> impl Iterator<Item = &ParseError> {
        self.errors.iter().filter(|e| e.is_lexer())
    }

    pub fn parser_errors(&self) -> impl Iterator<Item = &ParseError> {
        self.errors.iter().filter(|e| e.is_parser())
    }

    /// Text of a node, rebuilt from the tokens it covers, hidden tokens included. Text matched by
    /// skipped lexer rules isn't part of the tokens and doesn't appear.
    pub fn text_of(&self, node: &RuleNode) -> String {
        match node.stop {
            Some(stop) if stop >= node.start && stop < self.tokens.len() => {
                self.tokens[node.start..=stop].iter().filter(|t| !t.is_eof()).map(|t| t.text.as_str()).collect()
            }
            _ => String::new(),
        }
    }
}

/// Parses `source` from the start rule of `grammar`, with the default options.
pub fn parse(grammar: &Grammar, source: &str) -> ParseResult {
    Parser::new(grammar).parse(source)
}

// ---------------------------------------------------------------------------------------------

/// State of one parse.
struct Run<'g, 's> {
    stream: TokenStream<'g, 's>,
    stack: Vec<OpCode>,
    activations: Vec<RuleActivation>,
    root: Option<RuleNode>,
    errors: Vec<ParseError>,
    ambiguities: Vec<AmbiguityReport>,
    num_parser_errors: usize,
    /// errors are suppressed until a token is matched
    recovering: bool,
    /// (token index, stack depth) of the last parser error
    last_error: Option<(usize, usize)>,
    aborted: bool,
}

/// Parser of a [Grammar].
///
/// ```ignore
/// let mut errors = CollectingListener::new();
/// let result = Parser::new(&grammar)
///     .with_options(ParserOptions::new().with_max_errors(Some(10)))
///     .add_error_listener(&mut errors)
///     .parse(source);
/// ```
pub struct Parser<'g, 'l> {
    grammar: &'g Grammar,
    options: ParserOptions,
    error_listeners: Vec<Box<dyn ErrorListener + 'l>>,
    parse_listeners: Vec<Box<dyn TreeListener + 'l>>,
}

impl<'g, 'l> Parser<'g, 'l> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Parser { grammar, options: ParserOptions::default(), error_listeners: Vec::new(), parse_listeners: Vec::new() }
    }

    pub fn with_options(mut self, options: ParserOptions) -> Self {
        self.options = options;
        self
    }

    pub fn add_error_listener<L: ErrorListener + 'l>(mut self, listener: L) -> Self {
        self.error_listeners.push(Box::new(listener));
        self
    }

    pub fn add_parse_listener<L: TreeListener + 'l>(mut self, listener: L) -> Self {
        self.parse_listeners.push(Box::new(listener));
        self
    }

    pub fn get_grammar(&self) -> &'g Grammar {
        self.grammar
    }

    pub fn get_options(&self) -> &ParserOptions {
        &self.options
    }

    /// Parses `source` from the start rule.
    pub fn parse(&mut self, source: &str) -> ParseResult {
        self.run(source, self.grammar.start())
    }

    /// Parses `source` from the named rule `rule`. The rule doesn't need to match the whole input.
    pub fn parse_rule(&mut self, source: &str, rule: &str) -> Result<ParseResult, ContractError> {
        match self.grammar.find_rule(rule) {
            Some(var) => Ok(self.run(source, var)),
            None => Err(ContractError::NoSuchRule { grammar: self.grammar.name().to_string(), rule: rule.to_string() }),
        }
    }

    fn run(&mut self, source: &str, start: VarId) -> ParseResult {
        let grammar = self.grammar;
        debug!("parsing {} from rule {} ({} bytes)", grammar.name(), grammar.rule_name(start), source.len());
        let lexer = Lexer::new(grammar.lexer_spec(), source, grammar.new_classifier());
        let mut run = Run {
            stream: TokenStream::new(lexer),
            stack: vec![OpCode::NT(start)],
            activations: Vec::new(),
            root: None,
            errors: Vec::new(),
            ambiguities: Vec::new(),
            num_parser_errors: 0,
            recovering: false,
            last_error: None,
            aborted: false,
        };
        while let Some(op) = run.stack.pop() {
            if tracing::enabled!(tracing::Level::TRACE) {
                let symtab = Some(grammar.get_symbol_table());
                trace!("input: {}   stack: [{}]   current: {}",
                    run.stream.peek(1), run.stack.iter().map(|s| s.to_str(symtab)).join(" "), op.to_str(symtab));
            }
            match op {
                OpCode::T(t) => self.match_terminal(&mut run, t),
                OpCode::NT(v) => {
                    if !grammar.is_synthetic(v) {
                        self.enter_rule(&mut run, v);
                    } else if grammar.is_nullable(v) {
                        self.sync(&mut run, v);
                    }
                    self.select_alternative(&mut run, v, op);
                }
                OpCode::Loop(v) => {
                    if grammar.is_nullable(v) {
                        self.sync(&mut run, v);
                    }
                    self.select_alternative(&mut run, v, op);
                }
                OpCode::Exit(v) => {
                    trace!("- exit {}", grammar.rule_name(v));
                    self.exit_rule(&mut run, false);
                }
            }
            if run.aborted {
                break;
            }
        }
        while !run.activations.is_empty() {
            self.exit_rule(&mut run, true);
        }
        let Run { stream, root, mut errors, ambiguities, .. } = run;
        let (tokens, lexer_errors) = stream.finish();
        for e in lexer_errors {
            self.notify_error(&e);
            errors.push(e);
        }
        let tree = root.unwrap_or_else(|| RuleNode { failed: true, ..RuleNode::new(start, 0) });
        debug!("parse of {} done: {} error(s), {} ambiguities", grammar.name(), errors.len(), ambiguities.len());
        ParseResult { tree, errors, ambiguities, tokens }
    }

    // -----------------------------------------------------------------------------------------

    fn enter_rule(&mut self, run: &mut Run, var: VarId) {
        let start = run.stream.token_index();
        trace!("- enter {}", self.grammar.rule_name(var));
        let activation = RuleActivation::new(var, start);
        if !self.parse_listeners.is_empty() {
            let node = RuleNode::new(var, start);
            for l in self.parse_listeners.iter_mut() {
                l.enter_rule(&node);
            }
        }
        run.activations.push(activation);
    }

    /// Pops the innermost activation and attaches it to its parent.
    fn exit_rule(&mut self, run: &mut Run, failed: bool) {
        let Some(mut activation) = run.activations.pop() else {
            return;
        };
        activation.stop = run.stream.previous().map(|t| t.index).filter(|i| *i >= activation.start);
        activation.state = if failed || activation.state == ActivationState::Failed {
            ActivationState::Failed
        } else {
            ActivationState::Completed
        };
        let node = activation.into_node();
        for l in self.parse_listeners.iter_mut() {
            l.exit_rule(&node);
        }
        match run.activations.last_mut() {
            Some(parent) => {
                if self.options.build_tree {
                    parent.children.push(ParseTree::Rule(node));
                }
            }
            None => run.root = Some(node),
        }
    }

    fn select_alternative(&mut self, run: &mut Run, var: VarId, op: OpCode) {
        let grammar = self.grammar;
        let is_named = !grammar.is_synthetic(var);
        if is_named {
            if let Some(a) = run.activations.last_mut() {
                a.state = ActivationState::SelectingAlternative;
            }
        }
        let predictor = Predictor::new(grammar, self.options.max_configurations);
        let prediction = predictor.predict(var, &run.stack, &mut run.stream);
        let alt = match prediction {
            Prediction::Lookahead(alt) => alt,
            Prediction::FullContext { alt, depth, ambiguity } => {
                let decision = grammar.decision(var).map(|d| d.id).unwrap_or_default();
                let start_index = run.stream.token_index();
                let stop_index = run.stream.peek(depth).index;
                let rule = grammar.owner_name(var).to_string();
                let mut event = DecisionEvent { decision, rule: rule.clone(), start_index, stop_index, alt: None };
                for l in self.error_listeners.iter_mut() {
                    l.report_attempting_full_context(&event);
                }
                match ambiguity {
                    Some(ambiguity) => {
                        if self.options.report_ambiguities {
                            let report = AmbiguityReport {
                                decision,
                                rule,
                                alts: ambiguity.alts.iter().map(|a| a + 1).collect(),
                                start_index,
                                stop_index,
                                exact: ambiguity.exact,
                            };
                            debug!("{report}");
                            for l in self.error_listeners.iter_mut() {
                                l.report_ambiguity(&report);
                            }
                            run.ambiguities.push(report);
                        }
                    }
                    None => {
                        event.alt = Some(alt + 1);
                        for l in self.error_listeners.iter_mut() {
                            l.report_context_sensitivity(&event);
                        }
                    }
                }
                alt
            }
            Prediction::NoViable { depth } => {
                self.no_viable_alternative(run, var, op, depth);
                return;
            }
        };
        self.push_alternative(run, var, alt);
    }

    fn push_alternative(&mut self, run: &mut Run, var: VarId, alt: AltId) {
        trace!("- {} -> {}", self.grammar.rule_name(var),
            self.grammar.rule(var).alts[alt as usize].to_str(Some(self.grammar.get_symbol_table())));
        if !self.grammar.is_synthetic(var) {
            if let Some(a) = run.activations.last_mut() {
                a.alt = Some(alt);
                a.state = ActivationState::MatchingElements;
            }
        }
        run.stack.extend_from_slice(self.grammar.opcodes(var, alt as usize));
    }

    fn match_terminal(&mut self, run: &mut Run, t: TokenId) {
        if run.stream.la(1) == t {
            let token = run.stream.consume();
            trace!("- match {}", token);
            self.add_terminal(run, token);
            run.recovering = false;
        } else {
            self.recover_terminal(run, t);
        }
    }

    // -----------------------------------------------------------------------------------------
    // tree and listeners

    fn add_terminal(&mut self, run: &mut Run, token: Token) {
        for l in self.parse_listeners.iter_mut() {
            l.visit_terminal(&token);
        }
        if self.options.build_tree {
            if let Some(a) = run.activations.last_mut() {
                a.children.push(ParseTree::Terminal(token));
            }
        }
    }

    fn add_error_node(&mut self, run: &mut Run, token: Token, kind: ErrorNodeKind) {
        let node = ErrorNode { token, kind };
        for l in self.parse_listeners.iter_mut() {
            l.visit_error(&node);
        }
        if self.options.build_tree {
            if let Some(a) = run.activations.last_mut() {
                a.children.push(ParseTree::Error(node));
            }
        }
    }

    fn notify_error(&mut self, error: &ParseError) {
        for l in self.error_listeners.iter_mut() {
            l.syntax_error(error);
        }
    }

    /// Reports the lexer errors found so far.
    fn drain_lexer_errors(&mut self, run: &mut Run) {
        for e in run.stream.take_lexer_errors() {
            self.notify_error(&e);
            run.errors.push(e);
        }
    }

    /// Reports a parser error at the current token, unless the parser is still recovering from
    /// a previous error or the maximum number of errors has been reached.
    fn report_parser_error(&mut self, run: &mut Run, kind: ErrorKind, message: String) {
        self.drain_lexer_errors(run);
        let token = run.stream.peek(1);
        let error = ParseError::new(kind, token.pos(), token.start, message);
        if run.recovering {
            debug!("suppressed: {error}");
            return;
        }
        run.recovering = true;
        if self.options.max_errors.is_some_and(|max| run.num_parser_errors >= max) {
            debug!("over the maximum number of errors: {error}");
            return;
        }
        run.num_parser_errors += 1;
        debug!("{error}");
        self.notify_error(&error);
        run.errors.push(error);
    }
}
