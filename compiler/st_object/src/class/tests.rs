use super::*;
use pretty_assertions::assert_eq;
use st_ir::StringInterner;

#[test]
fn layout_puts_inherited_slots_first() {
    let interner = StringInterner::new();
    let [x, y, z, count] = ["x", "y", "z", "count"].map(|s| interner.intern(s));

    let base = ClassLayout::derive(None, &[x, y], &[count]);
    let derived = ClassLayout::derive(Some(&base), &[z], &[]);

    assert_eq!(derived.instance_variables, vec![x, y, z]);
    assert_eq!(derived.instance_index(z), Some(2));
    assert_eq!(derived.class_instance_index(count), Some(0));
    assert_eq!(derived.instance_index(count), None);
}

#[test]
fn relayout_carries_class_instance_values_by_name() {
    let interner = StringInterner::new();
    let [a, b, c] = ["a", "b", "c"].map(|s| interner.intern(s));

    let mut class = SmalltalkClass::new(interner.intern("Counter"), None);
    class.layout = ClassLayout::derive(None, &[], &[a, b]);
    class.set_class_instance_value(0, Value::Integer(1));
    class.set_class_instance_value(1, Value::Integer(2));

    let relaid = class.relaid_out(ClassLayout::derive(None, &[], &[c, b]));

    assert_eq!(relaid.class_instance_value(0), Value::Nil);
    assert_eq!(relaid.class_instance_value(1), Value::Integer(2));
    // the old class keeps its own storage
    assert_eq!(class.class_instance_value(0), Value::Integer(1));
}
