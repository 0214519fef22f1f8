// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

//! Diagnostics of the grammar builder and of the parse listeners.
//!
//! A [Logger] receives notes, warnings and errors: [BufLog] keeps them, [TraceLog] turns them
//! into `tracing` events. A type that owns a log exposes it with [LogReader] or [LogWriter], and
//! gets [LogStatus] or [Logger] through the blanket implementations.

use std::fmt::{Debug, Display, Formatter};

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Severity {
    Note,
    Warning,
    Error,
}

impl Severity {
    fn index(self) -> usize {
        self as usize
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Note => write!(f, "note"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Message about a grammar table or a parse, like `warning: ambiguity in rule expr ...`.
#[derive(Clone, PartialEq, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

/// Status of a log: how many messages it received, and the messages it kept.
pub trait LogStatus: Debug {
    fn count(&self, severity: Severity) -> usize;

    /// Kept messages, in the order they were received. A log that only forwards its messages
    /// has none.
    fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic>;

    fn num_notes(&self) -> usize {
        self.count(Severity::Note)
    }

    fn num_warnings(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn num_errors(&self) -> usize {
        self.count(Severity::Error)
    }

    fn has_no_errors(&self) -> bool {
        self.num_errors() == 0
    }

    fn has_no_warnings(&self) -> bool {
        self.num_warnings() == 0
    }

    /// Kept messages of one severity.
    fn messages(&self, severity: Severity) -> impl Iterator<Item = &String> {
        self.diagnostics().filter(move |d| d.severity == severity).map(|d| &d.message)
    }

    /// Kept messages, one per line.
    fn diagnostics_str(&self) -> String {
        self.diagnostics().map(|d| format!("- {d}")).collect::<Vec<_>>().join("\n")
    }
}

/// Receiver of diagnostics.
pub trait Logger: Debug {
    fn log(&mut self, severity: Severity, message: String);

    fn add_note<T: Into<String>>(&mut self, msg: T) {
        self.log(Severity::Note, msg.into());
    }

    fn add_warning<T: Into<String>>(&mut self, msg: T) {
        self.log(Severity::Warning, msg.into());
    }

    fn add_error<T: Into<String>>(&mut self, msg: T) {
        self.log(Severity::Error, msg.into());
    }
}

// ---------------------------------------------------------------------------------------------

/// Log that keeps the messages. The grammar tables keep their build diagnostics in one.
#[derive(Clone, Debug, Default)]
pub struct BufLog {
    diagnostics: Vec<Diagnostic>,
}

impl BufLog {
    pub fn new() -> Self {
        BufLog::default()
    }
}

impl LogStatus for BufLog {
    fn count(&self, severity: Severity) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == severity).count()
    }

    fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }
}

impl Logger for BufLog {
    fn log(&mut self, severity: Severity, message: String) {
        self.diagnostics.push(Diagnostic { severity, message });
    }
}

/// Log that emits the messages as `tracing` events under the `polyparse` target, and only
/// counts them.
#[derive(Clone, Debug, Default)]
pub struct TraceLog {
    counts: [usize; 3],
}

impl TraceLog {
    pub fn new() -> TraceLog {
        TraceLog::default()
    }
}

impl LogStatus for TraceLog {
    fn count(&self, severity: Severity) -> usize {
        self.counts[severity.index()]
    }

    fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        std::iter::empty()
    }
}

impl Logger for TraceLog {
    fn log(&mut self, severity: Severity, message: String) {
        self.counts[severity.index()] += 1;
        match severity {
            Severity::Note => tracing::info!(target: "polyparse", "{message}"),
            Severity::Warning => tracing::warn!(target: "polyparse", "{message}"),
            Severity::Error => tracing::error!(target: "polyparse", "{message}"),
        }
    }
}

// ---------------------------------------------------------------------------------------------
// blanket implementations: LogReader -> LogStatus, LogWriter -> Logger

pub trait LogReader {
    type Item: LogStatus;

    fn get_log(&self) -> &Self::Item;
}

pub trait LogWriter {
    fn get_mut_log(&mut self) -> &mut impl Logger;
}

impl<T: LogReader + Debug> LogStatus for T {
    fn count(&self, severity: Severity) -> usize {
        self.get_log().count(severity)
    }

    fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.get_log().diagnostics()
    }
}

impl<L: LogWriter + Debug> Logger for L {
    fn log(&mut self, severity: Severity, message: String) {
        self.get_mut_log().log(severity, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logs() {
        let mut buf = BufLog::new();
        let mut trace = TraceLog::new();
        for (severity, message) in [(Severity::Warning, "w1"), (Severity::Error, "e1"), (Severity::Warning, "w2")] {
            buf.log(severity, message.to_string());
            trace.log(severity, message.to_string());
        }
        for (id, counts) in [(buf.num_notes(), buf.num_warnings(), buf.num_errors()),
                             (trace.num_notes(), trace.num_warnings(), trace.num_errors())].into_iter().enumerate() {
            assert_eq!(counts, (0, 2, 1), "test {id} failed");
        }
        assert_eq!(buf.messages(Severity::Warning).collect::<Vec<_>>(), vec!["w1", "w2"]);
        assert_eq!(buf.diagnostics_str(), "- warning: w1\n- error: e1\n- warning: w2");
        assert!(!buf.has_no_errors());
        assert_eq!(trace.diagnostics().count(), 0);
        assert!(trace.diagnostics_str().is_empty());
    }
}
