// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

use crate::error::ParseError;
use crate::log::{LogReader, LogStatus, LogWriter, Logger};
use crate::prediction::{AmbiguityReport, DecisionEvent};

/// Receives the errors and the diagnostic events of a parse.
///
/// Errors are delivered in the order they're found; lexer errors found while reading ahead are
/// delivered before the next parser error. Ambiguities and full-context decisions aren't errors.
pub trait ErrorListener {
    fn syntax_error(&mut self, _error: &ParseError) {}
    fn report_ambiguity(&mut self, _report: &AmbiguityReport) {}
    fn report_attempting_full_context(&mut self, _event: &DecisionEvent) {}
    fn report_context_sensitivity(&mut self, _event: &DecisionEvent) {}
}

impl<L: ErrorListener + ?Sized> ErrorListener for &mut L {
    fn syntax_error(&mut self, error: &ParseError) {
        (**self).syntax_error(error)
    }

    fn report_ambiguity(&mut self, report: &AmbiguityReport) {
        (**self).report_ambiguity(report)
    }

    fn report_attempting_full_context(&mut self, event: &DecisionEvent) {
        (**self).report_attempting_full_context(event)
    }

    fn report_context_sensitivity(&mut self, event: &DecisionEvent) {
        (**self).report_context_sensitivity(event)
    }
}

// ---------------------------------------------------------------------------------------------

/// Listener that keeps everything it receives.
#[derive(Clone, Debug, Default)]
pub struct CollectingListener {
    pub errors: Vec<ParseError>,
    pub ambiguities: Vec<AmbiguityReport>,
    pub full_context: Vec<DecisionEvent>,
    pub context_sensitivities: Vec<DecisionEvent>,
}

impl CollectingListener {
    pub fn new() -> Self {
        CollectingListener::default()
    }

    pub fn lexer_errors(&self) -> impl Iterator<Item = &ParseError> {
        self.errors.iter().filter(|e| e.is_lexer())
    }

    pub fn parser_errors(&self) -> impl Iterator<Item = &ParseError> {
        self.errors.iter().filter(|e| e.is_parser())
    }
}

impl ErrorListener for CollectingListener {
    fn syntax_error(&mut self, error: &ParseError) {
        self.errors.push(error.clone());
    }

    fn report_ambiguity(&mut self, report: &AmbiguityReport) {
        self.ambiguities.push(report.clone());
    }

    fn report_attempting_full_context(&mut self, event: &DecisionEvent) {
        self.full_context.push(event.clone());
    }

    fn report_context_sensitivity(&mut self, event: &DecisionEvent) {
        self.context_sensitivities.push(event.clone());
    }
}

// ---------------------------------------------------------------------------------------------

/// Listener that forwards the events to a [Logger]: errors as errors, ambiguities as warnings
/// and full-context decisions as notes.
///
/// ```
/// # use polyparse_core::listener::{ErrorListener, LogListener};
/// # use polyparse_core::log::{BufLog, LogStatus, Severity};
/// # use polyparse_core::{ErrorKind, ParseError};
/// # use polyparse_core::lexer::Pos;
/// let mut listener = LogListener::new(BufLog::new());
/// listener.syntax_error(&ParseError::new(ErrorKind::MissingToken, Pos(2, 4), 12, "missing ';' at 'x'"));
/// assert_eq!(listener.num_errors(), 1);
/// assert_eq!(listener.messages(Severity::Error).next().map(|s| s.as_str()), Some("line 2:4 missing ';' at 'x'"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct LogListener<L: Logger> {
    log: L,
}

impl<L: Logger> LogListener<L> {
    pub fn new(log: L) -> Self {
        LogListener { log }
    }

    pub fn into_log(self) -> L {
        self.log
    }
}

impl<L: Logger> LogWriter for LogListener<L> {
    fn get_mut_log(&mut self) -> &mut impl Logger {
        &mut self.log
    }
}

impl<L: Logger + LogStatus> LogReader for LogListener<L> {
    type Item = L;

    fn get_log(&self) -> &Self::Item {
        &self.log
    }
}

impl<L: Logger> ErrorListener for LogListener<L> {
    fn syntax_error(&mut self, error: &ParseError) {
        self.log.add_error(error.to_string());
    }

    fn report_ambiguity(&mut self, report: &AmbiguityReport) {
        self.log.add_warning(report.to_string());
    }

    fn report_attempting_full_context(&mut self, event: &DecisionEvent) {
        self.log.add_note(format!("attempting full context: {event}"));
    }

    fn report_context_sensitivity(&mut self, event: &DecisionEvent) {
        self.log.add_note(format!("context sensitivity: {event}"));
    }
}
