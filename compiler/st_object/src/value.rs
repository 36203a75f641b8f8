//! Runtime values.
//!
//! Immediate values (`nil`, booleans, integers, floats, characters, symbols)
//! are stored inline. Everything with identity is behind an `Arc`, so
//! `==` on those compares pointers.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use st_ir::Name;

use crate::BlockClosure;

/// A Smalltalk value.
#[derive(Clone)]
pub enum Value {
    /// The "no value" sentinel; every unset slot reads as `nil`.
    Nil,
    True,
    False,
    Integer(i64),
    Float(f64),
    Character(char),
    String(Arc<str>),
    Symbol(Name),
    /// Literal array.
    Array(Arc<[Value]>),
    /// Instance of a user-defined class.
    Object(Arc<Object>),
    /// A class used as a receiver (class-side dispatch).
    Class(Name),
    Block(Arc<dyn BlockClosure>),
}

/// Coarse receiver category, used to pick host primitives and the
/// host class a primitive value dispatches through.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueKind {
    Nil,
    Boolean,
    Integer,
    Float,
    Character,
    String,
    Symbol,
    Array,
    Object,
    Class,
    Block,
}

impl ValueKind {
    /// Name of the class that user methods for this kind are installed on.
    ///
    /// `Object` and `Class` receivers dispatch through their own class, so
    /// they have no host class.
    pub fn host_class_name(self) -> Option<&'static str> {
        match self {
            ValueKind::Nil => Some("UndefinedObject"),
            ValueKind::Boolean => Some("Boolean"),
            ValueKind::Integer => Some("SmallInteger"),
            ValueKind::Float => Some("Float"),
            ValueKind::Character => Some("Character"),
            ValueKind::String => Some("String"),
            ValueKind::Symbol => Some("Symbol"),
            ValueKind::Array => Some("Array"),
            ValueKind::Block => Some("BlockClosure"),
            ValueKind::Object | ValueKind::Class => None,
        }
    }
}

impl Value {
    pub fn boolean(value: bool) -> Self {
        if value {
            Value::True
        } else {
            Value::False
        }
    }

    pub fn string(text: &str) -> Self {
        Value::String(Arc::from(text))
    }

    pub fn array(elements: Vec<Value>) -> Self {
        Value::Array(Arc::from(elements))
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Nil => ValueKind::Nil,
            Value::True | Value::False => ValueKind::Boolean,
            Value::Integer(_) => ValueKind::Integer,
            Value::Float(_) => ValueKind::Float,
            Value::Character(_) => ValueKind::Character,
            Value::String(_) => ValueKind::String,
            Value::Symbol(_) => ValueKind::Symbol,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
            Value::Class(_) => ValueKind::Class,
            Value::Block(_) => ValueKind::Block,
        }
    }

    #[inline]
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::True => Some(true),
            Value::False => Some(false),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// `==`: same object, or same immediate value.
    pub fn identical(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil)
            | (Value::True, Value::True)
            | (Value::False, Value::False) => true,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Character(a), Value::Character(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) | (Value::Class(a), Value::Class(b)) => a == b,
            (Value::String(a), Value::String(b)) => Arc::ptr_eq(a, b),
            (Value::Array(a), Value::Array(b)) => Arc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            (Value::Block(a), Value::Block(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            _ => false,
        }
    }

    /// `=`: structural for strings and literal arrays, numeric across
    /// integers and floats, identity otherwise.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.equals(y))
            }
            (Value::Integer(a), Value::Float(b)) | (Value::Float(b), Value::Integer(a)) => {
                int_to_float(*a) == *b
            }
            (Value::Float(a), Value::Float(b)) => a == b,
            _ => self.identical(other),
        }
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "mixed integer/float comparison follows float semantics"
)]
fn int_to_float(n: i64) -> f64 {
    n as f64
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::boolean(b)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::True => write!(f, "true"),
            Value::False => write!(f, "false"),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Character(c) => write!(f, "${c}"),
            Value::String(s) => write!(f, "'{s}'"),
            Value::Symbol(name) => write!(f, "#{name:?}"),
            Value::Array(elements) => f.debug_list().entries(elements.iter()).finish(),
            Value::Object(object) => write!(f, "a {:?}", object.class()),
            Value::Class(name) => write!(f, "class {name:?}"),
            Value::Block(block) => write!(f, "a BlockClosure/{}", block.arity()),
        }
    }
}

/// An instance of a user-defined class.
///
/// The class is held by name and resolved through the active scope on
/// every send, so redefining a class affects existing instances. Slot
/// reads past the end answer `nil`; writes grow the slot vector, which
/// keeps old instances usable after their class gains variables.
pub struct Object {
    class: Name,
    fields: RwLock<Vec<Value>>,
}

impl Object {
    pub fn new(class: Name, field_count: usize) -> Self {
        Object {
            class,
            fields: RwLock::new(vec![Value::Nil; field_count]),
        }
    }

    #[inline]
    pub fn class(&self) -> Name {
        self.class
    }

    pub fn field(&self, index: usize) -> Value {
        self.fields.read().get(index).cloned().unwrap_or(Value::Nil)
    }

    pub fn set_field(&self, index: usize, value: Value) {
        let mut fields = self.fields.write();
        if index >= fields.len() {
            fields.resize(index + 1, Value::Nil);
        }
        fields[index] = value;
    }

    pub fn field_count(&self) -> usize {
        self.fields.read().len()
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("class", &self.class)
            .field("fields", &*self.fields.read())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn strings_are_equal_but_not_identical() {
        let a = Value::string("abc");
        let b = Value::string("abc");
        assert!(a.equals(&b));
        assert!(!a.identical(&b));
        assert!(a.identical(&a.clone()));
    }

    #[test]
    fn mixed_numeric_equality() {
        assert_eq!(Value::Integer(3), Value::Float(3.0));
        assert!(!Value::Integer(3).identical(&Value::Float(3.0)));
    }

    #[test]
    fn object_slots_default_to_nil_and_grow() {
        let object = Object::new(Name::EMPTY, 2);
        assert!(object.field(0).is_nil());
        assert!(object.field(7).is_nil());
        object.set_field(4, Value::Integer(9));
        assert_eq!(object.field_count(), 5);
        assert_eq!(object.field(4), Value::Integer(9));
    }

    #[test]
    fn host_class_names() {
        assert_eq!(Value::Integer(1).kind().host_class_name(), Some("SmallInteger"));
        assert_eq!(Value::True.kind(), Value::False.kind());
        assert_eq!(ValueKind::Object.host_class_name(), None);
    }
}
