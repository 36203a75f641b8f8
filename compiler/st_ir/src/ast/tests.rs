use super::*;
use crate::StringInterner;
use pretty_assertions::assert_eq;

fn ident(interner: &StringInterner, text: &str, start: u32) -> Ident {
    #[expect(clippy::cast_possible_truncation, reason = "test identifiers are short")]
    let stop = start + text.len() as u32;
    Ident::new(interner.intern(text), Span::new(start, stop))
}

#[test]
fn send_span_covers_receiver_and_arguments() {
    let interner = StringInterner::new();
    let receiver = Expr::variable(ident(&interner, "x", 0));
    let argument = Expr::literal(Literal::Integer(3), Span::new(4, 5));
    let send = Expr::send(receiver, ident(&interner, "+", 2), vec![argument]);

    assert_eq!(send.span, Span::new(0, 5));
    match &send.kind {
        ExprKind::Send { arguments, .. } => assert_eq!(arguments.len(), 1),
        other => panic!("expected send, got {other:?}"),
    }
}

#[test]
fn assignment_span_starts_at_target() {
    let interner = StringInterner::new();
    let assign = Expr::assign(
        ident(&interner, "total", 10),
        Expr::literal(Literal::Integer(0), Span::new(19, 20)),
    );
    assert_eq!(assign.span, Span::new(10, 20));
}

#[test]
fn method_span_grows_with_body() {
    let interner = StringInterner::new();
    let method = MethodNode::new(ident(&interner, "x", 0), Vec::new())
        .with_statements(vec![Stmt::ret(Expr::variable(ident(&interner, "x", 6)))]);
    assert_eq!(method.span, Span::new(0, 7));
    assert_eq!(method.statements.len(), 1);
}

#[test]
fn initializer_without_statements_has_default_span() {
    let node = InitializerNode::new(Vec::new());
    assert_eq!(node.span, Span::DUMMY);
}
