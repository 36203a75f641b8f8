use super::*;
use crate::ErrorCode;
use pretty_assertions::assert_eq;
use st_ir::Span;

fn error_at(code: ErrorCode, start: u32) -> Diagnostic {
    Diagnostic::error(code)
        .with_message(format!("{code} at {start}"))
        .with_label(Span::new(start, start + 1), "here")
}

#[test]
fn flush_sorts_by_position() {
    let mut queue = DiagnosticQueue::new();
    queue.report(error_at(ErrorCode::E2001, 30));
    queue.report(error_at(ErrorCode::E1001, 5));
    queue.report(error_at(ErrorCode::E3001, 12));

    let codes: Vec<ErrorCode> = queue.flush().into_iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![ErrorCode::E1001, ErrorCode::E3001, ErrorCode::E2001]);
    assert!(queue.is_empty());
    assert_eq!(queue.error_count(), 0);
}

#[test]
fn duplicates_are_dropped() {
    let mut queue = DiagnosticQueue::new();
    assert!(queue.add(error_at(ErrorCode::E2001, 3)));
    assert!(!queue.add(error_at(ErrorCode::E2001, 3)));
    assert_eq!(queue.len(), 1);
}

#[test]
fn limit_keeps_counting() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig {
        error_limit: 2,
        deduplicate: false,
    });
    for start in 0..5 {
        queue.report(error_at(ErrorCode::E2001, start));
    }
    assert_eq!(queue.len(), 2);
    assert_eq!(queue.error_count(), 5);
    assert!(queue.has_errors().is_some());
}

#[test]
fn warnings_do_not_count_as_errors() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig::unlimited());
    queue.report(Diagnostic::warning(ErrorCode::E5001).with_message("stale"));
    assert_eq!(queue.error_count(), 0);
    assert!(queue.has_errors().is_none());
    assert_eq!(queue.diagnostics().len(), 1);
}
