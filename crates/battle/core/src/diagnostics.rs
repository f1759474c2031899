//! Diagnostic side channel.
//!
//! battle-core never logs directly. Noteworthy events (skipped catalog
//! entries, failed checkpoints, elemental swings) are reported to a
//! [`DiagnosticSink`] supplied by the caller; the runtime forwards them to
//! `tracing`.

/// Severity of a diagnostic message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticLevel {
    Debug,
    Info,
    Warn,
}

pub trait DiagnosticSink {
    fn record(&mut self, level: DiagnosticLevel, message: String);

    fn debug(&mut self, message: String) {
        self.record(DiagnosticLevel::Debug, message);
    }

    fn info(&mut self, message: String) {
        self.record(DiagnosticLevel::Info, message);
    }

    fn warn(&mut self, message: String) {
        self.record(DiagnosticLevel::Warn, message);
    }
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn record(&mut self, _level: DiagnosticLevel, _message: String) {}
}

/// Buffers messages in memory.
#[derive(Clone, Debug, Default)]
pub struct VecSink {
    pub entries: Vec<(DiagnosticLevel, String)>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(level, _)| *level == DiagnosticLevel::Warn)
            .map(|(_, message)| message.as_str())
    }
}

impl DiagnosticSink for VecSink {
    fn record(&mut self, level: DiagnosticLevel, message: String) {
        self.entries.push((level, message));
    }
}
