use super::*;
use crate::{LocalKind, SpecialBinding};
use proptest::prelude::*;
use st_object::{Access, ClassLayout, Pool, Value, ValueBinding};

struct World {
    interner: StringInterner,
    names: WellKnownNames,
    scope: NameScope,
}

impl World {
    fn new() -> Self {
        let interner = StringInterner::new();
        let names = WellKnownNames::new(&interner);
        World {
            interner,
            names,
            scope: NameScope::new(),
        }
    }

    fn n(&self, text: &str) -> Name {
        self.interner.intern(text)
    }

    fn class(&self, name: &str) -> Arc<SmalltalkClass> {
        self.scope.get_class(self.n(name)).unwrap()
    }

    fn method_chain(&self, class: &str, side: MethodSide) -> ScopeChain<'_> {
        let class = self.class(class);
        ScopeChain::for_method(&self.scope, &self.interner, &self.names, &class, side)
    }
}

/// `A` with instance variable `a`, class variable `Shared`, class-instance
/// variable `count`; `B < A` with instance variable `b`; pools `P1` and
/// `P2` both defining `Tab`, imported by `B` in that order.
fn world() -> World {
    let mut world = World::new();
    let [a, b, shared, count, p1, p2, tab, a_var, b_var, pi] =
        ["A", "B", "Shared", "count", "P1", "P2", "Tab", "a", "b", "Pi"].map(|s| world.n(s));

    let mut class_a = SmalltalkClass::new(a, None);
    class_a.instance_variables = vec![a_var];
    class_a.class_instance_variables = vec![count];
    class_a
        .class_variables
        .insert(shared, Arc::new(ValueBinding::writable(shared)));
    class_a.layout = ClassLayout::derive(None, &[a_var], &[count]);

    let mut class_b = SmalltalkClass::new(b, Some(a));
    class_b.instance_variables = vec![b_var];
    class_b.imported_pools = vec![p1, p2];
    class_b.layout = ClassLayout::derive(Some(&class_a.layout), &[b_var], &[]);

    world.scope.replace_class(class_a);
    world.scope.replace_class(class_b);
    world
        .scope
        .replace_pool(Pool::new(p1).with_variable(Arc::new(ValueBinding::constant(tab))));
    world
        .scope
        .replace_pool(Pool::new(p2).with_variable(Arc::new(ValueBinding::writable(tab))));
    world
        .scope
        .add_global_constant_binding(Arc::new(ValueBinding::with_value(
            pi,
            Access::Constant,
            Value::Float(2.5),
        )))
        .unwrap();
    world
}

#[test]
fn subclass_sees_the_same_class_variable_binding() {
    let w = world();
    let shared = w.n("Shared");
    let from_a = w.method_chain("A", MethodSide::Instance).resolve(shared);
    let from_b = w.method_chain("B", MethodSide::Instance).resolve(shared);

    let (NameBinding::ClassVariable(a), NameBinding::ClassVariable(b)) = (&from_a, &from_b) else {
        panic!("expected class variables, got {from_a:?} and {from_b:?}");
    };
    assert!(Arc::ptr_eq(a, b));
}

#[test]
fn instance_variables_are_indexed_through_the_layout() {
    let w = world();
    let chain = w.method_chain("B", MethodSide::Instance);
    assert!(matches!(
        chain.resolve(w.n("a")),
        NameBinding::InstanceVariable { index: 0 }
    ));
    assert!(matches!(
        chain.resolve(w.n("b")),
        NameBinding::InstanceVariable { index: 1 }
    ));
}

#[test]
fn class_side_sees_class_instance_variables_only() {
    let w = world();
    let chain = w.method_chain("A", MethodSide::Class);
    assert!(matches!(
        chain.resolve(w.n("count")),
        NameBinding::ClassInstanceVariable { index: 0 }
    ));
    assert!(chain.resolve(w.n("a")).is_error());
}

#[test]
fn first_imported_pool_wins() {
    let w = world();
    let binding = w.method_chain("B", MethodSide::Instance).resolve(w.n("Tab"));
    assert!(matches!(binding, NameBinding::PoolConstant(_)));
    assert!(!binding.is_writable());
}

#[test]
fn globals_and_classes_resolve_last() {
    let w = world();
    let chain = w.method_chain("A", MethodSide::Instance);
    assert!(matches!(chain.resolve(w.n("Pi")), NameBinding::GlobalConstant(_)));
    assert!(matches!(chain.resolve(w.n("B")), NameBinding::Class(_)));
    match chain.resolve(w.n("P1")) {
        NameBinding::Error(failure) => assert_eq!(failure.code, ErrorCode::E2007),
        other => panic!("pool names are not values: {other:?}"),
    }
    match chain.resolve(w.n("missing")) {
        NameBinding::Error(failure) => {
            assert_eq!(failure.code, ErrorCode::E2001);
            assert!(failure.message.contains("missing"));
        }
        other => panic!("expected an error binding, got {other:?}"),
    }
}

#[test]
fn locals_shadow_class_elements_and_blocks_shadow_methods() {
    let w = world();
    let a_var = w.n("a");
    let mut chain = w.method_chain("A", MethodSide::Instance);
    chain.locals_mut().push_layer();
    chain.locals_mut().declare(a_var, LocalKind::Argument);
    assert!(matches!(
        chain.resolve(a_var),
        NameBinding::Local {
            depth: 0,
            index: 0,
            kind: LocalKind::Argument
        }
    ));

    chain.locals_mut().push_layer();
    assert!(matches!(
        chain.resolve(a_var),
        NameBinding::Local { depth: 1, .. }
    ));
    chain.locals_mut().declare(a_var, LocalKind::Temporary);
    assert!(chain.resolve(a_var).is_writable());
}

#[test]
fn super_depends_on_context() {
    let w = world();
    let super_ = w.names.super_;
    let self_ = w.names.self_;

    assert!(w.method_chain("A", MethodSide::Instance).resolve(super_).is_error());
    assert!(matches!(
        w.method_chain("B", MethodSide::Instance).resolve(super_),
        NameBinding::Special(SpecialBinding::Super)
    ));

    let program = ScopeChain::for_initializer(&w.scope, &w.interner, &w.names, None);
    assert!(program.resolve(self_).is_error());
    assert!(program.resolve(super_).is_error());
    assert!(matches!(program.resolve(w.n("Pi")), NameBinding::GlobalConstant(_)));
    assert!(program.resolve(w.n("Shared")).is_error());

    let class_b = w.class("B");
    let class_init =
        ScopeChain::for_initializer(&w.scope, &w.interner, &w.names, Some(&class_b));
    assert!(matches!(
        class_init.resolve(self_),
        NameBinding::Special(SpecialBinding::SelfRef)
    ));
    assert!(class_init.resolve(super_).is_error());
    assert!(matches!(
        class_init.resolve(w.n("Shared")),
        NameBinding::ClassVariable(_)
    ));
}

#[test]
fn reserved_words_beat_locals() {
    let w = world();
    let mut chain = w.method_chain("B", MethodSide::Instance);
    chain.locals_mut().declare(w.names.nil, LocalKind::Temporary);
    assert!(matches!(
        chain.resolve(w.names.nil),
        NameBinding::Special(SpecialBinding::Nil)
    ));
}

proptest! {
    #[test]
    fn resolution_is_deterministic(index in 0usize..8) {
        let w = world();
        let candidates = ["a", "b", "Shared", "count", "Tab", "Pi", "A", "nope"];
        let name = w.n(candidates[index]);
        let first = w.method_chain("B", MethodSide::Instance).resolve(name);
        for _ in 0..4 {
            let again = w.method_chain("B", MethodSide::Instance).resolve(name);
            prop_assert!(first.same_as(&again));
        }
    }
}
