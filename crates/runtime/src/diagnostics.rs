//! `tracing` bridge for core diagnostics.

use battle_core::{DiagnosticLevel, DiagnosticSink};

/// Forwards [`DiagnosticSink`] messages to `tracing`, tagged with the
/// encounter they came from.
#[derive(Debug, Clone)]
pub struct TracingSink {
    encounter: String,
}

impl TracingSink {
    pub fn new(encounter: impl Into<String>) -> Self {
        Self {
            encounter: encounter.into(),
        }
    }
}

impl DiagnosticSink for TracingSink {
    fn record(&mut self, level: DiagnosticLevel, message: String) {
        match level {
            DiagnosticLevel::Debug => tracing::debug!(encounter = %self.encounter, "{message}"),
            DiagnosticLevel::Info => tracing::info!(encounter = %self.encounter, "{message}"),
            DiagnosticLevel::Warn => tracing::warn!(encounter = %self.encounter, "{message}"),
        }
    }
}
