// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

//! Parse tree: a [RuleNode] per named rule, with terminals and error nodes as leaves.
//! Synthetic rules don't have nodes; their children belong to the enclosing named rule.

use crate::grammar::Grammar;
use crate::token::Token;
use crate::{AltId, VarId};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ErrorNodeKind {
    /// token discarded by the recovery
    Skipped,
    /// token assumed present by the recovery; its text is `<missing X>`
    Missing,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ErrorNode {
    pub token: Token,
    pub kind: ErrorNodeKind,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ParseTree {
    Rule(RuleNode),
    Terminal(Token),
    Error(ErrorNode),
}

impl ParseTree {
    fn to_string_tree(&self, grammar: &Grammar, out: &mut String) {
        match self {
            ParseTree::Rule(node) => node.write_tree(grammar, out),
            ParseTree::Terminal(token) => out.push_str(&token.display_text()),
            ParseTree::Error(e) => out.push_str(&e.token.display_text()),
        }
    }
}

/// Node of a named rule.
///
/// `start` is the buffer index of the first token seen by the rule, `stop` the index of the last
/// token it consumed (`None` if it consumed nothing). `alt` is the 0-based alternative chosen,
/// if the selection succeeded.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RuleNode {
    pub rule: VarId,
    pub alt: Option<AltId>,
    pub children: Vec<ParseTree>,
    pub start: usize,
    pub stop: Option<usize>,
    pub failed: bool,
}

impl RuleNode {
    pub fn new(rule: VarId, start: usize) -> Self {
        RuleNode { rule, alt: None, children: Vec::new(), start, stop: None, failed: false }
    }

    /// Checks if the node or one of its descendants failed or contains error nodes.
    pub fn is_partial(&self) -> bool {
        self.failed || self.children.iter().any(|c| match c {
            ParseTree::Rule(node) => node.is_partial(),
            ParseTree::Terminal(_) => false,
            ParseTree::Error(_) => true,
        })
    }

    /// Iterates over the child rule nodes.
    pub fn child_rules(&self) -> impl Iterator<Item = &RuleNode> {
        self.children.iter().filter_map(|c| if let ParseTree::Rule(node) = c { Some(node) } else { None })
    }

    /// Finds the first descendant node of `rule`, in depth-first order (the node itself included).
    pub fn find(&self, rule: VarId) -> Option<&RuleNode> {
        if self.rule == rule {
            return Some(self);
        }
        self.child_rules().find_map(|node| node.find(rule))
    }

    /// Collects the terminals matched in this subtree, in order. Error nodes are excluded.
    pub fn terminals(&self) -> Vec<&Token> {
        let mut result = Vec::new();
        let mut stack = vec![self.children.iter()];
        while let Some(iter) = stack.last_mut() {
            match iter.next() {
                Some(ParseTree::Terminal(token)) => result.push(token),
                Some(ParseTree::Rule(node)) => stack.push(node.children.iter()),
                Some(ParseTree::Error(_)) => {}
                None => { stack.pop(); }
            }
        }
        result
    }

    /// Collects the error nodes of this subtree, in order.
    pub fn error_nodes(&self) -> Vec<&ErrorNode> {
        let mut result = Vec::new();
        for child in &self.children {
            match child {
                ParseTree::Rule(node) => result.extend(node.error_nodes()),
                ParseTree::Error(e) => result.push(e),
                ParseTree::Terminal(_) => {}
            }
        }
        result
    }

    /// Renders the tree in LISP form, like `(expr ( (args a , b) ))`. A node without children
    /// is shown as its rule name.
    pub fn to_string_tree(&self, grammar: &Grammar) -> String {
        let mut out = String::new();
        self.write_tree(grammar, &mut out);
        out
    }

    fn write_tree(&self, grammar: &Grammar, out: &mut String) {
        let name = grammar.rule_name(self.rule);
        if self.children.is_empty() {
            out.push_str(name);
            return;
        }
        out.push('(');
        out.push_str(name);
        for child in &self.children {
            out.push(' ');
            child.to_string_tree(grammar, out);
        }
        out.push(')');
    }
}

// ---------------------------------------------------------------------------------------------

/// Observer of a parse tree, either live during the parse (see
/// [`Parser::add_parse_listener`](crate::parser::Parser::add_parse_listener)) or over a
/// finished tree with [walk].
///
/// During a live parse, `enter_rule` receives the node before its alternative is selected and
/// without children; `exit_rule` receives the complete node.
pub trait TreeListener {
    fn enter_rule(&mut self, _node: &RuleNode) {}
    fn exit_rule(&mut self, _node: &RuleNode) {}
    fn visit_terminal(&mut self, _token: &Token) {}
    fn visit_error(&mut self, _node: &ErrorNode) {}
}

impl<L: TreeListener + ?Sized> TreeListener for &mut L {
    fn enter_rule(&mut self, node: &RuleNode) {
        (**self).enter_rule(node)
    }

    fn exit_rule(&mut self, node: &RuleNode) {
        (**self).exit_rule(node)
    }

    fn visit_terminal(&mut self, token: &Token) {
        (**self).visit_terminal(token)
    }

    fn visit_error(&mut self, node: &ErrorNode) {
        (**self).visit_error(node)
    }
}

/// Walks the tree depth-first, calling the listener for each node.
pub fn walk<L: TreeListener + ?Sized>(listener: &mut L, node: &RuleNode) {
    listener.enter_rule(&node.clone_shallow());
    for child in &node.children {
        match child {
            ParseTree::Rule(sub) => walk(listener, sub),
            ParseTree::Terminal(token) => listener.visit_terminal(token),
            ParseTree::Error(e) => listener.visit_error(e),
        }
    }
    listener.exit_rule(node);
}

impl RuleNode {
    /// Copy of the node without its children.
    fn clone_shallow(&self) -> RuleNode {
        RuleNode { rule: self.rule, alt: self.alt, children: Vec::new(), start: self.start, stop: self.stop, failed: self.failed }
    }
}
