use super::*;
use pretty_assertions::assert_eq;
use st_diagnostic::Diagnostic;
use st_ir::{
    BlockNode, CascadeMessage, Expr, Ident, InitializerNode, Literal, MethodNode, MethodSide,
    SharedInterner, Span, Stmt,
};
use st_object::{ClassLayout, CompiledMethod, NameScope};

use st_compile::Compiler;

struct Harness {
    interner: SharedInterner,
    scope: NameScope,
    interpreter: Interpreter,
}

impl Harness {
    fn new() -> Self {
        let interner = SharedInterner::new();
        let interpreter = Interpreter::new(&interner);
        let mut harness = Harness {
            interner,
            scope: NameScope::new(),
            interpreter,
        };
        harness.class("Object", None, &[]);
        harness
    }

    fn id(&self, text: &str) -> Ident {
        Ident::synthetic(self.interner.intern(text))
    }

    fn var(&self, text: &str) -> Expr {
        Expr::variable(self.id(text))
    }

    fn send(&self, receiver: Expr, selector: &str, arguments: Vec<Expr>) -> Expr {
        Expr::send(receiver, self.id(selector), arguments)
    }

    fn block(&self, arguments: &[&str], statements: Vec<Stmt>) -> Expr {
        Expr::block(BlockNode {
            arguments: arguments.iter().map(|a| self.id(a)).collect(),
            temporaries: Vec::new(),
            statements,
            span: Span::DUMMY,
        })
    }

    fn class(&mut self, name: &str, superclass: Option<&str>, ivars: &[&str]) {
        let name = self.interner.intern(name);
        let superclass = superclass.map(|s| self.interner.intern(s));
        let ivars: Vec<_> = ivars.iter().map(|v| self.interner.intern(v)).collect();
        let inherited = superclass
            .and_then(|s| self.scope.get_class(s))
            .map(|s| s.layout.clone());
        let mut class = SmalltalkClass::new(name, superclass);
        class.layout = ClassLayout::derive(inherited.as_ref(), &ivars, &[]);
        class.instance_variables = ivars;
        self.scope.replace_class(class);
    }

    fn method(&mut self, class: &str, side: MethodSide, node: MethodNode) {
        let class = self.scope.get_class(self.interner.intern(class)).unwrap();
        let mut diagnostics = Vec::new();
        let result = Compiler::new(&self.interner).compile_method(
            &self.scope,
            &class,
            side,
            &node,
            &mut |d: Diagnostic| diagnostics.push(d),
        );
        let bound = result.unwrap_or_else(|_| panic!("compile failed: {diagnostics:?}"));
        let method = CompiledMethod {
            selector: bound.selector,
            class: class.name,
            side,
            executable: self.interpreter.generate_method(&bound),
            node: Arc::new(node),
            annotations: Vec::new(),
        };
        self.scope.replace_class(class.with_method(Arc::new(method)));
    }

    fn env(&self) -> ExecEnv {
        ExecEnv::new(Arc::new(self.scope.copy()), self.interner.clone())
    }

    fn call(&self, receiver: Value, selector: &str, arguments: &[Value]) -> Result<Value, EvalError> {
        let selector = self.interner.intern(selector);
        self.interpreter.send(&self.env(), receiver, selector, arguments)
    }

    fn instance(&self, class: &str) -> Value {
        self.call(Value::Class(self.interner.intern(class)), "new", &[])
            .unwrap()
    }
}

/// `Point` with `x`, `x:` and `y` accessors.
fn point() -> Harness {
    let mut h = Harness::new();
    h.class("Point", Some("Object"), &["x", "y"]);
    let getter = MethodNode::new(h.id("x"), vec![]).with_statements(vec![Stmt::ret(h.var("x"))]);
    let setter = MethodNode::new(h.id("x:"), vec![h.id("value")])
        .with_statements(vec![Stmt::expr(Expr::assign(h.id("x"), h.var("value")))]);
    let y = MethodNode::new(h.id("y"), vec![]).with_statements(vec![Stmt::ret(h.var("y"))]);
    h.method("Point", MethodSide::Instance, getter);
    h.method("Point", MethodSide::Instance, setter);
    h.method("Point", MethodSide::Instance, y);
    h
}

#[test]
fn instance_variables_round_trip() {
    let h = point();
    let p = h.instance("Point");

    assert!(h.call(p.clone(), "x", &[]).unwrap().is_nil());
    let answer = h.call(p.clone(), "x:", &[Value::Integer(3)]).unwrap();
    assert!(answer.identical(&p), "a method without ^ answers self");
    assert_eq!(h.call(p.clone(), "x", &[]).unwrap(), Value::Integer(3));
    assert!(h.call(p, "y", &[]).unwrap().is_nil());
}

#[test]
fn blocks_share_their_home_temporaries() {
    let mut h = Harness::new();
    // sumTo: n  | total | total := 0. 1 to: n do: [:i | total := total + i]. ^total
    let body = vec![
        Stmt::expr(Expr::assign(h.id("total"), Expr::integer(0))),
        Stmt::expr(h.send(
            Expr::integer(1),
            "to:do:",
            vec![
                h.var("n"),
                h.block(
                    &["i"],
                    vec![Stmt::expr(Expr::assign(
                        h.id("total"),
                        h.send(h.var("total"), "+", vec![h.var("i")]),
                    ))],
                ),
            ],
        )),
        Stmt::ret(h.var("total")),
    ];
    let node = MethodNode::new(h.id("sumTo:"), vec![h.id("n")])
        .with_temporaries(vec![h.id("total")])
        .with_statements(body);
    h.method("Object", MethodSide::Class, node);

    let object = Value::Class(h.interner.intern("Object"));
    assert_eq!(h.call(object, "sumTo:", &[Value::Integer(10)]).unwrap(), Value::Integer(55));
}

#[test]
fn caret_in_a_block_returns_from_the_method() {
    let mut h = Harness::new();
    // find: n  #(1 2 3) do: [:e | (e = n) ifTrue: [^e]]. ^0
    let elements = Literal::Array(vec![Literal::Integer(1), Literal::Integer(2), Literal::Integer(3)]);
    let test = h.send(h.var("e"), "=", vec![h.var("n")]);
    let inner = h.block(&[], vec![Stmt::ret(h.var("e"))]);
    let each = h.block(&["e"], vec![Stmt::expr(h.send(test, "ifTrue:", vec![inner]))]);
    let node = MethodNode::new(h.id("find:"), vec![h.id("n")]).with_statements(vec![
        Stmt::expr(h.send(Expr::literal(elements, Span::DUMMY), "do:", vec![each])),
        Stmt::ret(Expr::integer(0)),
    ]);
    h.method("Object", MethodSide::Class, node);

    let object = Value::Class(h.interner.intern("Object"));
    assert_eq!(h.call(object.clone(), "find:", &[Value::Integer(2)]).unwrap(), Value::Integer(2));
    assert_eq!(h.call(object, "find:", &[Value::Integer(9)]).unwrap(), Value::Integer(0));
}

#[test]
fn caret_after_home_returned_fails() {
    let mut h = Harness::new();
    let escaping = h.block(&["x"], vec![Stmt::ret(h.var("x"))]);
    let node = MethodNode::new(h.id("escaper"), vec![]).with_statements(vec![Stmt::ret(escaping)]);
    h.method("Object", MethodSide::Class, node);

    let object = Value::Class(h.interner.intern("Object"));
    let Value::Block(block) = h.call(object, "escaper", &[]).unwrap() else {
        panic!("escaper did not answer a block");
    };
    assert_eq!(block.arity(), 1);
    assert!(matches!(
        block.invoke(&h.env(), &[Value::Integer(1)]),
        Err(EvalError::BlockCannotReturn)
    ));
}

#[test]
fn super_sends_start_above_the_defining_class() {
    let mut h = Harness::new();
    h.class("Base", Some("Object"), &[]);
    h.class("Derived", Some("Base"), &[]);
    let base = MethodNode::new(h.id("describe"), vec![]).with_statements(vec![Stmt::ret(Expr::integer(1))]);
    let derived = MethodNode::new(h.id("describe"), vec![]).with_statements(vec![Stmt::ret(h.send(
        h.send(h.var("super"), "describe", vec![]),
        "+",
        vec![Expr::integer(10)],
    ))]);
    h.method("Base", MethodSide::Instance, base);
    h.method("Derived", MethodSide::Instance, derived);

    let instance = h.instance("Derived");
    assert_eq!(h.call(instance, "describe", &[]).unwrap(), Value::Integer(11));
}

#[test]
fn cascade_answers_the_last_message() {
    let mut h = point();
    let message = |h: &Harness, selector: &str, arguments: Vec<Expr>| CascadeMessage {
        selector: h.id(selector),
        arguments,
        span: Span::DUMMY,
    };
    let cascade = Expr::cascade(
        h.var("self"),
        vec![
            message(&h, "x:", vec![Expr::integer(1)]),
            message(&h, "x:", vec![Expr::integer(2)]),
            message(&h, "x", vec![]),
        ],
    );
    let node = MethodNode::new(h.id("twice"), vec![]).with_statements(vec![Stmt::ret(cascade)]);
    h.method("Point", MethodSide::Instance, node);

    let p = h.instance("Point");
    assert_eq!(h.call(p, "twice", &[]).unwrap(), Value::Integer(2));
}

#[test]
fn cascade_to_super_looks_up_above_the_defining_class() {
    let mut h = Harness::new();
    h.class("Base", Some("Object"), &[]);
    h.class("Derived", Some("Base"), &[]);
    let tag = |h: &Harness, value| {
        MethodNode::new(h.id("tag"), vec![]).with_statements(vec![Stmt::ret(Expr::integer(value))])
    };
    let message = |h: &Harness, selector: &str| CascadeMessage {
        selector: h.id(selector),
        arguments: vec![],
        span: Span::DUMMY,
    };
    let base_tag = tag(&h, 1);
    let derived_tag = tag(&h, 2);
    h.method("Base", MethodSide::Instance, base_tag);
    h.method("Derived", MethodSide::Instance, derived_tag);
    let cascade = Expr::cascade(h.var("super"), vec![message(&h, "yourself"), message(&h, "tag")]);
    let node = MethodNode::new(h.id("inherited"), vec![]).with_statements(vec![Stmt::ret(cascade)]);
    h.method("Derived", MethodSide::Instance, node);

    let instance = h.instance("Derived");
    assert_eq!(h.call(instance.clone(), "tag", &[]).unwrap(), Value::Integer(2));
    assert_eq!(h.call(instance, "inherited", &[]).unwrap(), Value::Integer(1));
}

#[test]
fn user_methods_on_host_classes_win() {
    let mut h = Harness::new();
    h.class("SmallInteger", Some("Object"), &[]);
    let node = MethodNode::new(h.id("double"), vec![])
        .with_statements(vec![Stmt::ret(h.send(h.var("self"), "*", vec![Expr::integer(2)]))]);
    h.method("SmallInteger", MethodSide::Instance, node);

    assert_eq!(h.call(Value::Integer(21), "double", &[]).unwrap(), Value::Integer(42));
    assert_eq!(h.call(Value::Integer(21), "+", &[Value::Integer(1)]).unwrap(), Value::Integer(22));
}

#[test]
fn unknown_selectors_and_bad_arity() {
    let h = point();
    assert!(matches!(
        h.call(Value::Integer(3), "frobnicate", &[]),
        Err(EvalError::DoesNotUnderstand { ref selector, .. }) if selector == "frobnicate"
    ));
    assert!(matches!(
        h.call(h.instance("Point"), "x:", &[]),
        Err(EvalError::WrongArgumentCount { expected: 1, got: 0, .. })
    ));
}

#[test]
fn initializer_answers_its_last_statement() {
    let h = Harness::new();
    let node = InitializerNode::new(vec![
        Stmt::expr(Expr::assign(h.id("t"), Expr::integer(3))),
        Stmt::expr(h.send(h.var("t"), "+", vec![Expr::integer(4)])),
    ])
    .with_temporaries(vec![h.id("t")]);
    let mut diagnostics = Vec::new();
    let bound = Compiler::new(&h.interner)
        .compile_initializer(&h.scope, None, &node, &mut |d: Diagnostic| diagnostics.push(d))
        .unwrap();
    let code = h.interpreter.generate_initializer(&bound);

    assert_eq!(code.call(&h.env(), Value::Nil, &[]).unwrap(), Value::Integer(7));
    assert_eq!(diagnostics.len(), 0);
}
