//! Core diagnostic type.

use std::fmt;

use st_ir::Span;

use crate::ErrorCode;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A span with an explanation attached.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Label {
    pub span: Span,
    pub message: String,
    pub is_primary: bool,
}

impl Label {
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Label {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Label {
            span,
            message: message.into(),
            is_primary: false,
        }
    }
}

/// One reported problem: code, message and the source text it blames.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[must_use = "diagnostics should be reported to a sink, not dropped"]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub severity: Severity,
    pub message: String,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    #[cold]
    pub fn error(code: ErrorCode) -> Self {
        Diagnostic {
            code,
            severity: Severity::Error,
            message: String::new(),
            labels: Vec::new(),
            notes: Vec::new(),
        }
    }

    #[cold]
    pub fn warning(code: ErrorCode) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            ..Self::error(code)
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Span of the first primary label.
    pub fn primary_span(&self) -> Option<Span> {
        self.labels
            .iter()
            .find(|label| label.is_primary)
            .map(|label| label.span)
    }

    /// Start offset of the blamed source text (0 when unknown).
    pub fn start(&self) -> u32 {
        self.primary_span().map_or(0, |span| span.start)
    }

    /// Stop offset of the blamed source text (0 when unknown).
    pub fn stop(&self) -> u32 {
        self.primary_span().map_or(0, |span| span.stop)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.code, self.message)?;
        if let Some(span) = self.primary_span() {
            write!(f, " at {span}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builder_sets_primary_span() {
        let diag = Diagnostic::error(ErrorCode::E2001)
            .with_message("undefined identifier `foo`")
            .with_secondary_label(Span::new(0, 3), "in this method")
            .with_label(Span::new(10, 13), "not found in any scope");

        assert!(diag.is_error());
        assert_eq!(diag.primary_span(), Some(Span::new(10, 13)));
        assert_eq!((diag.start(), diag.stop()), (10, 13));
    }

    #[test]
    fn display_includes_code_and_span() {
        let diag = Diagnostic::error(ErrorCode::E1002)
            .with_message("`nil` is protected")
            .with_label(Span::new(4, 7), "here");
        assert_eq!(diag.to_string(), "error[E1002]: `nil` is protected at 4-7");
    }

    #[test]
    fn warning_is_not_error() {
        let diag = Diagnostic::warning(ErrorCode::E5001);
        assert!(!diag.is_error());
        assert_eq!(diag.start(), 0);
    }
}
