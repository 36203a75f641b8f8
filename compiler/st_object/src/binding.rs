//! Named storage cells.
//!
//! A binding starts unset. Constants accept exactly one store; writable
//! bindings accept any number. Bindings are shared by `Arc`: a class
//! variable seen from a subclass and a pool variable seen from an importing
//! class are the *same* cell as in their defining owner.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use st_ir::{Annotation, Name};

use crate::{Pool, SmalltalkClass, Value};

/// Whether a binding may be stored into more than once.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Access {
    /// Set once (by the installer or an initializer), read-only afterwards.
    Constant,
    Writable,
}

/// Misuse of a binding cell.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BindingError {
    #[error("constant {name:?} has already been set")]
    ConstantAlreadySet { name: Name },
}

/// A named cell holding an optional `T`.
pub struct Binding<T> {
    name: Name,
    access: Access,
    cell: RwLock<Option<T>>,
    annotations: RwLock<Vec<Annotation>>,
}

/// Binding of a global variable, global constant, class variable, pool
/// variable or pool constant.
pub type ValueBinding = Binding<Value>;

/// Binding of a class name to its class object.
pub type ClassBinding = Binding<Arc<SmalltalkClass>>;

/// Binding of a pool name to its pool.
pub type PoolBinding = Binding<Arc<Pool>>;

impl<T: Clone> Binding<T> {
    pub fn new(name: Name, access: Access) -> Self {
        Binding {
            name,
            access,
            cell: RwLock::new(None),
            annotations: RwLock::new(Vec::new()),
        }
    }

    pub fn constant(name: Name) -> Self {
        Self::new(name, Access::Constant)
    }

    pub fn writable(name: Name) -> Self {
        Self::new(name, Access::Writable)
    }

    /// A binding that already holds `value`.
    pub fn with_value(name: Name, access: Access, value: T) -> Self {
        let binding = Self::new(name, access);
        *binding.cell.write() = Some(value);
        binding
    }

    #[inline]
    pub fn name(&self) -> Name {
        self.name
    }

    #[inline]
    pub fn access(&self) -> Access {
        self.access
    }

    #[inline]
    pub fn is_writable(&self) -> bool {
        self.access == Access::Writable
    }

    pub fn has_been_set(&self) -> bool {
        self.cell.read().is_some()
    }

    pub fn get(&self) -> Option<T> {
        self.cell.read().clone()
    }

    /// Store `value`. A constant that already holds a value refuses.
    pub fn set(&self, value: T) -> Result<(), BindingError> {
        let mut cell = self.cell.write();
        if self.access == Access::Constant && cell.is_some() {
            return Err(BindingError::ConstantAlreadySet { name: self.name });
        }
        *cell = Some(value);
        Ok(())
    }

    /// Forget the value, so a redefined constant accepts its next store.
    /// Only the installer calls this, after committing the redefinition.
    pub fn reset(&self) {
        *self.cell.write() = None;
    }

    pub fn set_annotations(&self, annotations: Vec<Annotation>) {
        *self.annotations.write() = annotations;
    }

    pub fn annotations(&self) -> Vec<Annotation> {
        self.annotations.read().clone()
    }
}

impl Binding<Value> {
    /// Current value, with unset reading as `nil`.
    pub fn value(&self) -> Value {
        self.get().unwrap_or(Value::Nil)
    }
}

impl<T> fmt::Debug for Binding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("name", &self.name)
            .field("access", &self.access)
            .field("set", &self.cell.read().is_some())
            .finish_non_exhaustive()
    }
}
