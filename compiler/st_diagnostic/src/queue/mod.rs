//! Collecting sink with an error limit and source-order flushing.

use crate::{Diagnostic, ErrorGuaranteed, ErrorSink};

/// Configuration for diagnostic collection.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Maximum number of errors kept (0 = unlimited). Errors past the limit
    /// are still counted but not stored.
    pub error_limit: usize,
    /// Drop a diagnostic identical to one already queued.
    pub deduplicate: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            error_limit: 100,
            deduplicate: true,
        }
    }
}

impl DiagnosticConfig {
    /// Keep everything (for tests).
    pub fn unlimited() -> Self {
        DiagnosticConfig {
            error_limit: 0,
            deduplicate: false,
        }
    }
}

/// Queue for collecting diagnostics from one or more install batches.
///
/// ```text
/// let mut queue = DiagnosticQueue::new();
/// installer.install(definitions, &mut queue);
/// let sorted = queue.flush();
/// ```
#[derive(Clone, Debug, Default)]
pub struct DiagnosticQueue {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    config: DiagnosticConfig,
}

impl DiagnosticQueue {
    pub fn new() -> Self {
        Self::with_config(DiagnosticConfig::default())
    }

    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticQueue {
            diagnostics: Vec::new(),
            error_count: 0,
            config,
        }
    }

    /// Add a diagnostic. Returns `false` if it was filtered out.
    pub fn add(&mut self, diagnostic: Diagnostic) -> bool {
        let is_error = diagnostic.is_error();
        if is_error {
            self.error_count += 1;
        }
        if is_error && self.limit_reached_before_add() {
            return false;
        }
        if self.config.deduplicate && self.diagnostics.contains(&diagnostic) {
            return false;
        }
        self.diagnostics.push(diagnostic);
        true
    }

    fn limit_reached_before_add(&self) -> bool {
        let stored_errors = self.diagnostics.iter().filter(|d| d.is_error()).count();
        self.config.error_limit > 0 && stored_errors >= self.config.error_limit
    }

    /// Number of errors reported, including ones dropped by the limit.
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn has_errors(&self) -> Option<ErrorGuaranteed> {
        ErrorGuaranteed::from_error_count(self.error_count)
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Queued diagnostics in report order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Take all diagnostics sorted by source position and reset the queue.
    ///
    /// The sort is stable, so diagnostics at the same position keep their
    /// report order.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        let mut drained = std::mem::take(&mut self.diagnostics);
        drained.sort_by_key(|d| (d.start(), d.stop()));
        self.error_count = 0;
        drained
    }
}

impl ErrorSink for DiagnosticQueue {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.add(diagnostic);
    }
}

#[cfg(test)]
mod tests;
