//! Pools: named dictionaries of shared variables and constants.

use std::sync::Arc;

use st_ir::{Annotation, Name};

use crate::ValueBinding;

/// A pool, imported by classes by reference.
///
/// Adding a variable produces a new `Pool` whose map shares every existing
/// binding with the old one, so classes compiled against the old pool keep
/// working against the same cells.
#[derive(Clone, Debug)]
pub struct Pool {
    pub name: Name,
    pub variables: im::OrdMap<Name, Arc<ValueBinding>>,
    pub annotations: Vec<Annotation>,
}

impl Pool {
    pub fn new(name: Name) -> Self {
        Pool {
            name,
            variables: im::OrdMap::new(),
            annotations: Vec::new(),
        }
    }

    pub fn variable(&self, name: Name) -> Option<&Arc<ValueBinding>> {
        self.variables.get(&name)
    }

    #[must_use]
    pub fn with_variable(&self, binding: Arc<ValueBinding>) -> Self {
        let mut pool = self.clone();
        pool.variables.insert(binding.name(), binding);
        pool
    }
}
