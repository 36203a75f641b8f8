use super::*;
use crate::{Pool, Value};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use st_ir::StringInterner;

fn class_binding(name: Name) -> Arc<ClassBinding> {
    Arc::new(ClassBinding::with_value(
        name,
        Access::Constant,
        Arc::new(SmalltalkClass::new(name, None)),
    ))
}

fn add(scope: &mut NameScope, name: Name, category: BindingCategory) -> Result<(), DefineError> {
    match category {
        BindingCategory::Class => scope.add_class_binding(class_binding(name)),
        BindingCategory::Pool => scope.add_pool_binding(Arc::new(PoolBinding::with_value(
            name,
            Access::Constant,
            Arc::new(Pool::new(name)),
        ))),
        BindingCategory::GlobalVariable => {
            scope.add_global_variable_binding(Arc::new(ValueBinding::writable(name)))
        }
        BindingCategory::GlobalConstant => {
            scope.add_global_constant_binding(Arc::new(ValueBinding::constant(name)))
        }
    }
}

fn local_categories(scope: &NameScope, name: Name) -> usize {
    [
        scope.get_local_class_binding(name).is_some(),
        scope.get_local_pool_binding(name).is_some(),
        scope.get_local_global_variable_binding(name).is_some(),
        scope.get_local_global_constant_binding(name).is_some(),
    ]
    .into_iter()
    .filter(|&present| present)
    .count()
}

#[test]
fn names_are_unique_across_categories() {
    let interner = StringInterner::new();
    let point = interner.intern("Point");
    let mut scope = NameScope::new();

    assert_eq!(add(&mut scope, point, BindingCategory::Class), Ok(()));
    assert_eq!(
        add(&mut scope, point, BindingCategory::GlobalVariable),
        Err(DefineError::Duplicate(BindingCategory::Class))
    );
    assert_eq!(
        add(&mut scope, point, BindingCategory::Class),
        Err(DefineError::Duplicate(BindingCategory::Class))
    );
}

#[test]
fn protected_names_are_rejected_through_extensions() {
    let interner = StringInterner::new();
    let smalltalk = interner.intern("Smalltalk");
    let live = Arc::new(NameScope::with_protected([smalltalk]));
    let mut working = NameScope::extension(live);

    assert!(working.is_protected_name(smalltalk));
    assert_eq!(
        add(&mut working, smalltalk, BindingCategory::GlobalConstant),
        Err(DefineError::Protected)
    );
}

#[test]
fn extension_redefines_same_category_only() {
    let interner = StringInterner::new();
    let [point, pi] = ["Point", "Pi"].map(|s| interner.intern(s));
    let mut live = NameScope::new();
    add(&mut live, point, BindingCategory::Class).unwrap();
    add(&mut live, pi, BindingCategory::GlobalConstant).unwrap();
    let live = Arc::new(live);

    let mut working = NameScope::extension(Arc::clone(&live));
    assert_eq!(add(&mut working, point, BindingCategory::Class), Ok(()));
    assert_eq!(
        add(&mut working, pi, BindingCategory::GlobalVariable),
        Err(DefineError::DifferentKind(BindingCategory::GlobalConstant))
    );

    // lookups fall back, local lookups do not
    assert!(working.get_global_variable_or_constant_binding(pi).is_some());
    assert!(working
        .get_local_global_variable_or_constant_binding(pi)
        .is_none());

    let redefined = working.get_class_binding(point).unwrap();
    let original = live.get_class_binding(point).unwrap();
    assert!(!Arc::ptr_eq(&redefined, &original));
}

#[test]
fn copy_is_independent() {
    let interner = StringInterner::new();
    let [a, b] = ["A", "B"].map(|s| interner.intern(s));
    let mut original = NameScope::new();
    add(&mut original, a, BindingCategory::Class).unwrap();

    let mut copy = original.copy();
    add(&mut copy, b, BindingCategory::Class).unwrap();

    assert!(original.get_class_binding(b).is_none());
    assert!(copy.get_class_binding(a).is_some());
}

#[test]
fn flatten_prefers_inner_bindings_and_keeps_initializer_order() {
    let interner = StringInterner::new();
    let [counter, limit] = ["Counter", "Limit"].map(|s| interner.intern(s));
    let mut live = NameScope::new();
    let old_limit = Arc::new(ValueBinding::with_value(
        limit,
        Access::Writable,
        Value::Integer(1),
    ));
    live.add_global_variable_binding(old_limit).unwrap();
    let live = Arc::new(live);

    let mut working = NameScope::extension(live);
    let new_limit = Arc::new(ValueBinding::writable(limit));
    working
        .add_global_variable_binding(Arc::clone(&new_limit))
        .unwrap();
    add(&mut working, counter, BindingCategory::Class).unwrap();

    let flat = working.flatten();
    assert!(flat.outer().is_none());
    let found = flat.get_local_global_variable_binding(limit).unwrap();
    assert!(Arc::ptr_eq(&found, &new_limit));
    assert_eq!(flat.class_names(), vec![counter]);
}

#[test]
fn flatten_keeps_inner_bindings_when_outer_is_larger() {
    let interner = StringInterner::new();
    let names = ["Object", "Point", "Rect", "Line", "Pi"].map(|s| interner.intern(s));
    let [object, point, rect, line, pi] = names;
    let mut live = NameScope::new();
    for name in [object, point, rect, line] {
        add(&mut live, name, BindingCategory::Class).unwrap();
    }
    live.add_global_constant_binding(Arc::new(ValueBinding::with_value(
        pi,
        Access::Constant,
        Value::Integer(3),
    )))
    .unwrap();
    let live = Arc::new(live);

    let mut working = NameScope::extension(Arc::clone(&live));
    let redefined = working.replace_class(SmalltalkClass::new(point, Some(object)));
    let new_pi = Arc::new(ValueBinding::constant(pi));
    working
        .add_global_constant_binding(Arc::clone(&new_pi))
        .unwrap();

    let flat = working.flatten();
    assert!(Arc::ptr_eq(&flat.get_class_binding(point).unwrap(), &redefined));
    assert!(Arc::ptr_eq(
        &flat.get_global_variable_or_constant_binding(pi).unwrap(),
        &new_pi
    ));
    assert!(Arc::ptr_eq(
        &flat.get_class_binding(rect).unwrap(),
        &live.get_class_binding(rect).unwrap()
    ));
    assert_eq!(flat.class_names().len(), 4);
}

#[test]
fn global_binding_reports_category() {
    let interner = StringInterner::new();
    let pool = interner.intern("Chars");
    let mut scope = NameScope::new();
    add(&mut scope, pool, BindingCategory::Pool).unwrap();

    let binding = scope.get_global_binding(pool).unwrap();
    assert_eq!(binding.category(), BindingCategory::Pool);
    assert!(scope.get_global_binding(interner.intern("Nope")).is_none());
}

#[test]
fn direct_subclasses_follow_superclass_names() {
    let interner = StringInterner::new();
    let [shape, circle, square] = ["Shape", "Circle", "Square"].map(|s| interner.intern(s));
    let mut scope = NameScope::new();
    scope.replace_class(SmalltalkClass::new(shape, None));
    scope.replace_class(SmalltalkClass::new(circle, Some(shape)));
    scope.replace_class(SmalltalkClass::new(square, Some(shape)));

    let mut subclasses = scope.direct_subclasses(shape);
    subclasses.sort();
    let mut expected = vec![circle, square];
    expected.sort();
    assert_eq!(subclasses, expected);
}

fn category_strategy() -> impl Strategy<Value = BindingCategory> {
    prop_oneof![
        Just(BindingCategory::Class),
        Just(BindingCategory::Pool),
        Just(BindingCategory::GlobalVariable),
        Just(BindingCategory::GlobalConstant),
    ]
}

proptest! {
    #[test]
    fn no_name_is_in_two_categories(
        live_ops in prop::collection::vec((0usize..6, category_strategy()), 0..20),
        working_ops in prop::collection::vec((0usize..6, category_strategy()), 0..20),
    ) {
        let interner = StringInterner::new();
        let names: Vec<Name> = (0..6).map(|i| interner.intern(&format!("G{i}"))).collect();

        let mut live = NameScope::new();
        for (index, category) in live_ops {
            let _ = add(&mut live, names[index], category);
        }
        let mut working = NameScope::extension(Arc::new(live));
        for (index, category) in working_ops {
            let _ = add(&mut working, names[index], category);
        }

        let flat = working.flatten();
        for &name in &names {
            prop_assert!(local_categories(&flat, name) <= 1);
        }
    }
}
