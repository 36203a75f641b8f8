//! Classes, their layouts and method dictionaries.
//!
//! A `SmalltalkClass` is a value: the installer never edits a class that
//! readers can see. Adding a method or recomputing a layout builds a new
//! class and rebinds its name in the working scope.

use std::sync::Arc;

use parking_lot::RwLock;
use st_ir::{Annotation, MethodSide, Name};

use crate::{CompiledMethod, Value, ValueBinding};

/// Selector -> method for one side of a class.
#[derive(Clone, Debug, Default)]
pub struct MethodDictionary(im::OrdMap<Name, Arc<CompiledMethod>>);

impl MethodDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, selector: Name) -> Option<&Arc<CompiledMethod>> {
        self.0.get(&selector)
    }

    /// Insert or replace; returns the method previously under `selector`.
    pub fn insert(&mut self, method: Arc<CompiledMethod>) -> Option<Arc<CompiledMethod>> {
        self.0.insert(method.selector, method)
    }

    pub fn remove(&mut self, selector: Name) -> Option<Arc<CompiledMethod>> {
        self.0.remove(&selector)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Methods in selector order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<CompiledMethod>> {
        self.0.values()
    }

    pub fn selectors(&self) -> impl Iterator<Item = Name> + '_ {
        self.0.keys().copied()
    }
}

/// Slot layout of a class: every variable including inherited ones,
/// superclass slots first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassLayout {
    pub instance_variables: Vec<Name>,
    pub class_instance_variables: Vec<Name>,
}

impl ClassLayout {
    /// Extend `inherited` with a class's own variables.
    pub fn derive(
        inherited: Option<&ClassLayout>,
        instance_variables: &[Name],
        class_instance_variables: &[Name],
    ) -> Self {
        let mut layout = inherited.cloned().unwrap_or_default();
        layout.instance_variables.extend_from_slice(instance_variables);
        layout
            .class_instance_variables
            .extend_from_slice(class_instance_variables);
        layout
    }

    /// Slot index of an instance variable. The innermost declaration wins.
    pub fn instance_index(&self, name: Name) -> Option<usize> {
        self.instance_variables.iter().rposition(|&n| n == name)
    }

    pub fn class_instance_index(&self, name: Name) -> Option<usize> {
        self.class_instance_variables.iter().rposition(|&n| n == name)
    }
}

/// A class and its metaclass state.
#[derive(Clone, Debug)]
pub struct SmalltalkClass {
    pub name: Name,
    pub superclass: Option<Name>,
    /// Own instance variables, in declaration order.
    pub instance_variables: Vec<Name>,
    /// Own class variables. Subclasses see them by walking the superclass
    /// chain, never by copying.
    pub class_variables: im::OrdMap<Name, Arc<ValueBinding>>,
    /// Own class-instance variables. Each subclass has separate storage.
    pub class_instance_variables: Vec<Name>,
    /// Imported pools in import order.
    pub imported_pools: Vec<Name>,
    pub layout: ClassLayout,
    /// Class-instance variable slots, indexed by `layout.class_instance_variables`.
    pub class_instance_storage: Arc<RwLock<Vec<Value>>>,
    pub instance_methods: MethodDictionary,
    pub class_methods: MethodDictionary,
    pub annotations: Vec<Annotation>,
}

impl SmalltalkClass {
    /// A class with no variables or methods.
    pub fn new(name: Name, superclass: Option<Name>) -> Self {
        SmalltalkClass {
            name,
            superclass,
            instance_variables: Vec::new(),
            class_variables: im::OrdMap::new(),
            class_instance_variables: Vec::new(),
            imported_pools: Vec::new(),
            layout: ClassLayout::default(),
            class_instance_storage: Arc::new(RwLock::new(Vec::new())),
            instance_methods: MethodDictionary::new(),
            class_methods: MethodDictionary::new(),
            annotations: Vec::new(),
        }
    }

    pub fn methods(&self, side: MethodSide) -> &MethodDictionary {
        match side {
            MethodSide::Instance => &self.instance_methods,
            MethodSide::Class => &self.class_methods,
        }
    }

    pub fn methods_mut(&mut self, side: MethodSide) -> &mut MethodDictionary {
        match side {
            MethodSide::Instance => &mut self.instance_methods,
            MethodSide::Class => &mut self.class_methods,
        }
    }

    /// Copy of this class with `method` added to its dictionary.
    #[must_use]
    pub fn with_method(&self, method: Arc<CompiledMethod>) -> Self {
        let mut class = self.clone();
        class.methods_mut(method.side).insert(method);
        class
    }

    /// Copy of this class laid out under `layout`.
    ///
    /// Class-instance storage moves to a fresh slot vector; values are
    /// carried over by variable name, new variables start as `nil`.
    #[must_use]
    pub fn relaid_out(&self, layout: ClassLayout) -> Self {
        let old = self.class_instance_storage.read();
        let storage: Vec<Value> = layout
            .class_instance_variables
            .iter()
            .map(|&name| {
                self.layout
                    .class_instance_index(name)
                    .and_then(|index| old.get(index).cloned())
                    .unwrap_or(Value::Nil)
            })
            .collect();
        drop(old);
        SmalltalkClass {
            layout,
            class_instance_storage: Arc::new(RwLock::new(storage)),
            ..self.clone()
        }
    }

    pub fn class_instance_value(&self, index: usize) -> Value {
        self.class_instance_storage
            .read()
            .get(index)
            .cloned()
            .unwrap_or(Value::Nil)
    }

    pub fn set_class_instance_value(&self, index: usize, value: Value) {
        let mut storage = self.class_instance_storage.write();
        if index >= storage.len() {
            storage.resize(index + 1, Value::Nil);
        }
        storage[index] = value;
    }

    /// Number of slots an instance of this class gets.
    pub fn instance_size(&self) -> usize {
        self.layout.instance_variables.len()
    }
}

#[cfg(test)]
mod tests;
