//! Structured logging adapter
//!
//! Bridges the ambient `tracing` dispatcher into the vocabulary expected
//! around statement execution: informational, warning, error, and a timed
//! trace that carries statement text, affected-row count, and elapsed time
//! in a single record. The adapter holds only the span its records are
//! attached to; output destinations, encodings, and levels belong to the
//! subscriber the application installed.

use std::time::Instant;
use tracing::Span;

/// Adapter over the ambient structured-log sink.
///
/// Stateless beyond the span it annotates records with. It performs no
/// buffering or filtering, and it does not remap levels per call.
#[derive(Debug, Clone)]
pub struct QueryLogger {
    span: Span,
}

impl QueryLogger {
    /// Adapter rooted in a fresh span named after the relational backend.
    pub fn new() -> Self {
        Self {
            span: tracing::info_span!("sql"),
        }
    }

    /// Adapter annotating records with a caller-supplied span.
    pub fn with_span(span: Span) -> Self {
        Self { span }
    }

    /// Span the adapter attaches its records to.
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Emit an informational record.
    pub fn info(&self, msg: &str) {
        tracing::info!(parent: &self.span, "{msg}");
    }

    /// Emit a warning record.
    pub fn warn(&self, msg: &str) {
        tracing::warn!(parent: &self.span, "{msg}");
    }

    /// Emit an error record.
    pub fn error(&self, msg: &str) {
        tracing::error!(parent: &self.span, "{msg}");
    }

    /// Emit one structured record for an executed statement.
    ///
    /// `fc` lazily produces the statement text and the affected-row count
    /// (when the driver reports one). Elapsed wall-clock time is measured
    /// from `begin` to the moment of this call.
    pub fn trace<F>(&self, begin: Instant, fc: F, err: Option<&dyn std::error::Error>)
    where
        F: FnOnce() -> (String, Option<u64>),
    {
        let elapsed_ms = begin.elapsed().as_secs_f64() * 1000.0;
        let (statement, rows) = fc();
        match err {
            Some(err) => tracing::debug!(
                parent: &self.span,
                statement = %statement,
                rows,
                elapsed_ms,
                error = %err,
                "statement trace"
            ),
            None => tracing::debug!(
                parent: &self.span,
                statement = %statement,
                rows,
                elapsed_ms,
                "statement trace"
            ),
        }
    }

    /// Level control belongs to the subscriber configuration, not to
    /// per-call overrides. Returns the adapter unchanged.
    pub fn set_level(self, _level: tracing::Level) -> Self {
        self
    }
}

impl Default for QueryLogger {
    fn default() -> Self {
        Self::new()
    }
}
