//! The injectable error sink.

use crate::{Diagnostic, ErrorGuaranteed};

/// Receiver of diagnostics.
///
/// The installer and compiler report through this trait and never decide
/// how errors are shown. Any `FnMut(Diagnostic)` closure is a sink, which
/// covers the common "collect into a `Vec`" and "forward to an IDE" cases.
pub trait ErrorSink {
    fn report(&mut self, diagnostic: Diagnostic);

    /// Report an error and get proof that it was reported.
    fn report_error(&mut self, diagnostic: Diagnostic) -> ErrorGuaranteed {
        self.report(diagnostic);
        ErrorGuaranteed::new()
    }
}

impl<F: FnMut(Diagnostic)> ErrorSink for F {
    fn report(&mut self, diagnostic: Diagnostic) {
        self(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCode;

    #[test]
    fn closures_are_sinks() {
        let mut seen = Vec::new();
        {
            let mut sink = |d: Diagnostic| seen.push(d.code);
            sink.report(Diagnostic::error(ErrorCode::E2001));
            let _ = sink.report_error(Diagnostic::error(ErrorCode::E3001));
        }
        assert_eq!(seen, vec![ErrorCode::E2001, ErrorCode::E3001]);
    }
}
