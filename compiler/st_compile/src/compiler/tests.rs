use super::*;
use pretty_assertions::assert_eq;
use st_ir::{BlockNode, Span};
use st_object::ClassLayout;

struct Fixture {
    interner: StringInterner,
    scope: NameScope,
}

impl Fixture {
    /// `Object` and `Point < Object` with instance variables `x y`.
    fn new() -> Self {
        let interner = StringInterner::new();
        let [object, point, x, y] = ["Object", "Point", "x", "y"].map(|s| interner.intern(s));
        let mut scope = NameScope::new();
        scope.replace_class(SmalltalkClass::new(object, None));
        let mut class = SmalltalkClass::new(point, Some(object));
        class.instance_variables = vec![x, y];
        class.layout = ClassLayout::derive(None, &[x, y], &[]);
        scope.replace_class(class);
        Fixture { interner, scope }
    }

    fn ident(&self, text: &str, start: u32) -> Ident {
        #[expect(clippy::cast_possible_truncation, reason = "test identifiers are short")]
        let stop = start + text.len() as u32;
        Ident::new(self.interner.intern(text), Span::new(start, stop))
    }

    fn var(&self, text: &str, start: u32) -> Expr {
        Expr::variable(self.ident(text, start))
    }

    fn class(&self, name: &str) -> Arc<SmalltalkClass> {
        self.scope.get_class(self.interner.intern(name)).unwrap()
    }

    fn compile(&self, class: &str, node: &MethodNode) -> (Option<BoundMethod>, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();
        let compiler = Compiler::new(&self.interner);
        let result = compiler.compile_method(
            &self.scope,
            &self.class(class),
            MethodSide::Instance,
            node,
            &mut |d: Diagnostic| diagnostics.push(d),
        );
        (result.ok(), diagnostics)
    }
}

fn codes(diagnostics: &[Diagnostic]) -> Vec<ErrorCode> {
    diagnostics.iter().map(|d| d.code).collect()
}

#[test]
fn accessor_binds_instance_variable() {
    let f = Fixture::new();
    let node = MethodNode::new(f.ident("x", 0), vec![])
        .with_statements(vec![Stmt::ret(f.var("x", 5))]);

    let (bound, diagnostics) = f.compile("Point", &node);
    assert_eq!(codes(&diagnostics), vec![]);
    let bound = bound.unwrap();
    assert!(matches!(
        bound.body.statements.as_slice(),
        [BoundStmt::Return(BoundExpr::Variable(NameBinding::InstanceVariable { index: 0 }))]
    ));
}

#[test]
fn pseudo_variables_cannot_be_assigned() {
    let f = Fixture::new();
    for target in ["self", "super", "true", "false", "nil"] {
        let node = MethodNode::new(f.ident("clobber", 0), vec![]).with_statements(vec![
            Stmt::expr(Expr::assign(f.ident(target, 10), Expr::integer(1))),
        ]);
        let (bound, diagnostics) = f.compile("Point", &node);
        assert!(bound.is_none(), "`{target} := 1` compiled");
        assert_eq!(codes(&diagnostics), vec![ErrorCode::E2002], "{target}");
        assert_eq!(diagnostics[0].start(), 10);
    }
}

#[test]
fn arguments_are_read_only() {
    let f = Fixture::new();
    let node = MethodNode::new(f.ident("x:", 0), vec![f.ident("value", 3)]).with_statements(
        vec![Stmt::expr(Expr::assign(f.ident("value", 12), Expr::integer(0)))],
    );
    let (_, diagnostics) = f.compile("Point", &node);
    assert_eq!(codes(&diagnostics), vec![ErrorCode::E2002]);
    assert!(diagnostics[0].message.contains("argument"));
}

#[test]
fn undefined_identifier_points_at_its_span() {
    let f = Fixture::new();
    let node = MethodNode::new(f.ident("z", 0), vec![])
        .with_statements(vec![Stmt::ret(f.var("zork", 20))]);
    let (bound, diagnostics) = f.compile("Point", &node);
    assert!(bound.is_none());
    assert_eq!(codes(&diagnostics), vec![ErrorCode::E2001]);
    assert_eq!((diagnostics[0].start(), diagnostics[0].stop()), (20, 24));
}

#[test]
fn every_error_in_a_body_is_reported() {
    let f = Fixture::new();
    let node = MethodNode::new(f.ident("bad", 0), vec![]).with_statements(vec![
        Stmt::expr(f.var("one", 10)),
        Stmt::expr(f.var("two", 20)),
    ]);
    let (_, diagnostics) = f.compile("Point", &node);
    assert_eq!(codes(&diagnostics), vec![ErrorCode::E2001, ErrorCode::E2001]);
}

#[test]
fn local_declarations_are_validated() {
    let f = Fixture::new();
    let node = MethodNode::new(f.ident("m:", 0), vec![f.ident("a", 3)])
        .with_temporaries(vec![f.ident("a", 8), f.ident("nil", 10)]);
    let (_, diagnostics) = f.compile("Point", &node);
    assert_eq!(codes(&diagnostics), vec![ErrorCode::E2005, ErrorCode::E2006]);
}

#[test]
fn selector_shape_is_checked() {
    let f = Fixture::new();
    let wrong_arity = MethodNode::new(f.ident("at:put:", 0), vec![f.ident("i", 4)]);
    let (_, diagnostics) = f.compile("Point", &wrong_arity);
    assert_eq!(codes(&diagnostics), vec![ErrorCode::E4002]);

    let malformed = MethodNode::new(f.ident("a b", 0), vec![]);
    let (_, diagnostics) = f.compile("Point", &malformed);
    assert_eq!(codes(&diagnostics), vec![ErrorCode::E1004]);
}

#[test]
fn super_receiver_becomes_super_send() {
    let f = Fixture::new();
    let print = f.ident("printString", 20);
    let node = MethodNode::new(f.ident("printString", 0), vec![])
        .with_statements(vec![Stmt::ret(Expr::send(f.var("super", 14), print, vec![]))]);
    let (bound, diagnostics) = f.compile("Point", &node);
    assert_eq!(codes(&diagnostics), vec![]);
    let point = f.interner.intern("Point");
    assert!(matches!(
        bound.unwrap().body.statements.as_slice(),
        [BoundStmt::Return(BoundExpr::SuperSend { defining_class, side: MethodSide::Instance, .. })]
            if *defining_class == point
    ));
}

#[test]
fn super_in_root_class_is_an_error() {
    let f = Fixture::new();
    let node = MethodNode::new(f.ident("m", 0), vec![]).with_statements(vec![Stmt::expr(
        Expr::send(f.var("super", 4), f.ident("foo", 10), vec![]),
    )]);
    let (_, diagnostics) = f.compile("Object", &node);
    assert_eq!(codes(&diagnostics), vec![ErrorCode::E2004]);
}

#[test]
fn block_locals_nest() {
    let f = Fixture::new();
    let block = BlockNode {
        arguments: vec![f.ident("each", 12)],
        temporaries: vec![],
        statements: vec![Stmt::expr(Expr::assign(f.ident("t", 20), f.var("each", 25)))],
        span: Span::new(10, 30),
    };
    let node = MethodNode::new(f.ident("m", 0), vec![])
        .with_temporaries(vec![f.ident("t", 4)])
        .with_statements(vec![Stmt::expr(Expr::block(block))]);
    let (bound, diagnostics) = f.compile("Point", &node);
    assert_eq!(codes(&diagnostics), vec![]);

    let bound = bound.unwrap();
    let [BoundStmt::Expr(BoundExpr::Block(block))] = bound.body.statements.as_slice() else {
        panic!("expected a block statement");
    };
    assert_eq!(block.body.argument_count, 1);
    let [BoundStmt::Expr(BoundExpr::Assign { target, value })] = block.body.statements.as_slice()
    else {
        panic!("expected an assignment");
    };
    assert!(matches!(
        target,
        NameBinding::Local { depth: 1, index: 0, kind: LocalKind::Temporary }
    ));
    assert!(matches!(
        value.as_ref(),
        BoundExpr::Variable(NameBinding::Local { depth: 0, index: 0, kind: LocalKind::Argument })
    ));
}

#[test]
fn program_initializer_has_no_self() {
    let f = Fixture::new();
    let compiler = Compiler::new(&f.interner);
    let node = InitializerNode::new(vec![Stmt::expr(f.var("self", 0))]);
    let mut diagnostics = Vec::new();
    let result = compiler.compile_initializer(&f.scope, None, &node, &mut |d: Diagnostic| {
        diagnostics.push(d)
    });
    assert!(result.is_err());
    assert_eq!(codes(&diagnostics), vec![ErrorCode::E2004]);

    let class = f.class("Point");
    let mut diagnostics = Vec::new();
    let result = compiler.compile_initializer(
        &f.scope,
        Some(&class),
        &node,
        &mut |d: Diagnostic| diagnostics.push(d),
    );
    assert!(result.is_ok());
    assert_eq!(codes(&diagnostics), vec![]);
}

#[test]
fn literals_become_values() {
    let interner = StringInterner::new();
    let sym = interner.intern("sym");
    let literal = Literal::Array(vec![
        Literal::Integer(1),
        Literal::String("two".into()),
        Literal::Symbol(sym),
    ]);
    assert_eq!(
        literal_value(&literal),
        Value::array(vec![Value::Integer(1), Value::string("two"), Value::Symbol(sym)])
    );
}
