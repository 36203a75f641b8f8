//! The global namespace.
//!
//! `NameScope` uses `im` persistent maps, so [`NameScope::copy`] is O(1) and
//! edits to a copy are invisible to readers of the original. An install
//! works on an *extension* of the live scope (lookups fall back to the
//! outer scope, `get_local_*` lookups do not) and commits the
//! [`flatten`](NameScope::flatten)ed result.
//!
//! One name belongs to at most one of the four categories (class, pool,
//! global variable, global constant) across the whole chain.

use std::fmt;
use std::sync::Arc;

use st_ir::Name;

use crate::{
    Access, ClassBinding, CompiledInitializer, Pool, PoolBinding, SmalltalkClass, ValueBinding,
};

// ---------------------------------------------------------------------------
// Categories and errors
// ---------------------------------------------------------------------------

/// Which of the four binding maps a global name lives in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BindingCategory {
    Class,
    Pool,
    GlobalVariable,
    GlobalConstant,
}

impl fmt::Display for BindingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BindingCategory::Class => "class",
            BindingCategory::Pool => "pool",
            BindingCategory::GlobalVariable => "global variable",
            BindingCategory::GlobalConstant => "global constant",
        })
    }
}

/// Why a name could not be added to a scope.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DefineError {
    #[error("name is protected")]
    Protected,
    #[error("name is already defined as a {0} in this scope")]
    Duplicate(BindingCategory),
    #[error("name is already defined as a {0}")]
    DifferentKind(BindingCategory),
}

/// A global name resolved to whatever it is bound to.
#[derive(Clone, Debug)]
pub enum GlobalBinding {
    Class(Arc<ClassBinding>),
    Pool(Arc<PoolBinding>),
    Variable(Arc<ValueBinding>),
    Constant(Arc<ValueBinding>),
}

impl GlobalBinding {
    pub fn category(&self) -> BindingCategory {
        match self {
            GlobalBinding::Class(_) => BindingCategory::Class,
            GlobalBinding::Pool(_) => BindingCategory::Pool,
            GlobalBinding::Variable(_) => BindingCategory::GlobalVariable,
            GlobalBinding::Constant(_) => BindingCategory::GlobalConstant,
        }
    }
}

// ---------------------------------------------------------------------------
// NameScope
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct NameScope {
    outer: Option<Arc<NameScope>>,
    classes: im::OrdMap<Name, Arc<ClassBinding>>,
    pools: im::OrdMap<Name, Arc<PoolBinding>>,
    global_variables: im::OrdMap<Name, Arc<ValueBinding>>,
    global_constants: im::OrdMap<Name, Arc<ValueBinding>>,
    protected_names: im::OrdSet<Name>,
    initializers: im::Vector<Arc<CompiledInitializer>>,
}

impl NameScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty scope that forbids defining any of `protected`.
    pub fn with_protected(protected: impl IntoIterator<Item = Name>) -> Self {
        NameScope {
            protected_names: protected.into_iter().collect(),
            ..Self::default()
        }
    }

    /// A scope whose lookups fall back to `outer`.
    pub fn extension(outer: Arc<NameScope>) -> Self {
        NameScope {
            outer: Some(outer),
            ..Self::default()
        }
    }

    /// Independent copy; O(1) thanks to structural sharing.
    #[must_use]
    pub fn copy(&self) -> Self {
        self.clone()
    }

    pub fn outer(&self) -> Option<&Arc<NameScope>> {
        self.outer.as_ref()
    }

    pub fn is_protected_name(&self, name: Name) -> bool {
        self.protected_names.contains(&name)
            || self
                .outer
                .as_ref()
                .is_some_and(|outer| outer.is_protected_name(name))
    }

    pub fn protect(&mut self, name: Name) {
        self.protected_names.insert(name);
    }

    // -- adding ------------------------------------------------------------

    fn local_category(&self, name: Name) -> Option<BindingCategory> {
        if self.classes.contains_key(&name) {
            Some(BindingCategory::Class)
        } else if self.pools.contains_key(&name) {
            Some(BindingCategory::Pool)
        } else if self.global_variables.contains_key(&name) {
            Some(BindingCategory::GlobalVariable)
        } else if self.global_constants.contains_key(&name) {
            Some(BindingCategory::GlobalConstant)
        } else {
            None
        }
    }

    /// Category of `name` anywhere in the chain, innermost first.
    pub fn category_of(&self, name: Name) -> Option<BindingCategory> {
        self.local_category(name).or_else(|| {
            self.outer
                .as_ref()
                .and_then(|outer| outer.category_of(name))
        })
    }

    /// A name may be added when it is not protected, not yet defined in
    /// this scope, and not defined by an outer scope as something else.
    /// Same-category names in an outer scope are redefined.
    pub fn check_definable(&self, name: Name, category: BindingCategory) -> Result<(), DefineError> {
        if self.is_protected_name(name) {
            return Err(DefineError::Protected);
        }
        if let Some(existing) = self.local_category(name) {
            return Err(DefineError::Duplicate(existing));
        }
        match self.outer.as_ref().and_then(|o| o.category_of(name)) {
            Some(existing) if existing != category => Err(DefineError::DifferentKind(existing)),
            _ => Ok(()),
        }
    }

    pub fn add_class_binding(&mut self, binding: Arc<ClassBinding>) -> Result<(), DefineError> {
        self.check_definable(binding.name(), BindingCategory::Class)?;
        self.classes.insert(binding.name(), binding);
        Ok(())
    }

    pub fn add_pool_binding(&mut self, binding: Arc<PoolBinding>) -> Result<(), DefineError> {
        self.check_definable(binding.name(), BindingCategory::Pool)?;
        self.pools.insert(binding.name(), binding);
        Ok(())
    }

    pub fn add_global_variable_binding(
        &mut self,
        binding: Arc<ValueBinding>,
    ) -> Result<(), DefineError> {
        self.check_definable(binding.name(), BindingCategory::GlobalVariable)?;
        self.global_variables.insert(binding.name(), binding);
        Ok(())
    }

    pub fn add_global_constant_binding(
        &mut self,
        binding: Arc<ValueBinding>,
    ) -> Result<(), DefineError> {
        self.check_definable(binding.name(), BindingCategory::GlobalConstant)?;
        self.global_constants.insert(binding.name(), binding);
        Ok(())
    }

    /// Rebind a class name in this scope, shadowing any outer binding.
    ///
    /// Used for copy-on-write edits of classes that are already defined;
    /// skips the uniqueness checks.
    pub fn replace_class(&mut self, class: SmalltalkClass) -> Arc<ClassBinding> {
        let name = class.name;
        let binding = Arc::new(ClassBinding::with_value(
            name,
            Access::Constant,
            Arc::new(class),
        ));
        self.classes.insert(name, Arc::clone(&binding));
        binding
    }

    pub fn replace_pool(&mut self, pool: Pool) -> Arc<PoolBinding> {
        let name = pool.name;
        let binding = Arc::new(PoolBinding::with_value(
            name,
            Access::Constant,
            Arc::new(pool),
        ));
        self.pools.insert(name, Arc::clone(&binding));
        binding
    }

    pub fn add_initializer(&mut self, initializer: Arc<CompiledInitializer>) {
        self.initializers.push_back(initializer);
    }

    /// Swap the initializer at `index` of this scope's own list.
    pub fn replace_initializer(&mut self, index: usize, initializer: Arc<CompiledInitializer>) {
        if index < self.initializers.len() {
            let _previous = self.initializers.set(index, initializer);
        }
    }

    pub fn local_initializer_count(&self) -> usize {
        self.initializers.len()
    }

    // -- lookup ------------------------------------------------------------

    pub fn get_local_class_binding(&self, name: Name) -> Option<Arc<ClassBinding>> {
        self.classes.get(&name).cloned()
    }

    pub fn get_class_binding(&self, name: Name) -> Option<Arc<ClassBinding>> {
        self.get_local_class_binding(name)
            .or_else(|| self.outer.as_ref()?.get_class_binding(name))
    }

    /// The class object bound to `name`, if the binding has been populated.
    pub fn get_class(&self, name: Name) -> Option<Arc<SmalltalkClass>> {
        self.get_class_binding(name)?.get()
    }

    pub fn get_local_pool_binding(&self, name: Name) -> Option<Arc<PoolBinding>> {
        self.pools.get(&name).cloned()
    }

    pub fn get_pool_binding(&self, name: Name) -> Option<Arc<PoolBinding>> {
        self.get_local_pool_binding(name)
            .or_else(|| self.outer.as_ref()?.get_pool_binding(name))
    }

    pub fn get_pool(&self, name: Name) -> Option<Arc<Pool>> {
        self.get_pool_binding(name)?.get()
    }

    pub fn get_local_global_variable_binding(&self, name: Name) -> Option<Arc<ValueBinding>> {
        self.global_variables.get(&name).cloned()
    }

    pub fn get_local_global_constant_binding(&self, name: Name) -> Option<Arc<ValueBinding>> {
        self.global_constants.get(&name).cloned()
    }

    /// A global variable or constant defined in this scope only.
    pub fn get_local_global_variable_or_constant_binding(
        &self,
        name: Name,
    ) -> Option<Arc<ValueBinding>> {
        self.get_local_global_variable_binding(name)
            .or_else(|| self.get_local_global_constant_binding(name))
    }

    pub fn get_global_variable_or_constant_binding(&self, name: Name) -> Option<Arc<ValueBinding>> {
        self.get_local_global_variable_or_constant_binding(name)
            .or_else(|| {
                self.outer
                    .as_ref()?
                    .get_global_variable_or_constant_binding(name)
            })
    }

    fn get_local_global_binding(&self, name: Name) -> Option<GlobalBinding> {
        if let Some(binding) = self.classes.get(&name) {
            return Some(GlobalBinding::Class(Arc::clone(binding)));
        }
        if let Some(binding) = self.pools.get(&name) {
            return Some(GlobalBinding::Pool(Arc::clone(binding)));
        }
        if let Some(binding) = self.global_variables.get(&name) {
            return Some(GlobalBinding::Variable(Arc::clone(binding)));
        }
        self.global_constants
            .get(&name)
            .map(|binding| GlobalBinding::Constant(Arc::clone(binding)))
    }

    /// Whatever `name` is bound to, innermost scope first.
    pub fn get_global_binding(&self, name: Name) -> Option<GlobalBinding> {
        self.get_local_global_binding(name)
            .or_else(|| self.outer.as_ref()?.get_global_binding(name))
    }

    // -- whole-scope views -------------------------------------------------

    /// Every class name visible from this scope.
    pub fn class_names(&self) -> Vec<Name> {
        let mut names: im::OrdSet<Name> = self.classes.keys().copied().collect();
        if let Some(outer) = &self.outer {
            names.extend(outer.class_names());
        }
        names.into_iter().collect()
    }

    /// Classes whose superclass is `name`.
    pub fn direct_subclasses(&self, name: Name) -> Vec<Name> {
        self.class_names()
            .into_iter()
            .filter(|&candidate| {
                self.get_class(candidate)
                    .is_some_and(|class| class.superclass == Some(name))
            })
            .collect()
    }

    /// Pending initializers in registration order, outer scopes first.
    pub fn initializers(&self) -> Vec<Arc<CompiledInitializer>> {
        let mut all = self
            .outer
            .as_ref()
            .map(|outer| outer.initializers())
            .unwrap_or_default();
        all.extend(self.initializers.iter().cloned());
        all
    }

    /// Drop every pending initializer.
    pub fn clear_initializers(&mut self) {
        if self.outer.is_some() {
            *self = self.flatten();
        }
        self.initializers.clear();
    }

    /// Collapse the chain into a single scope with no outer.
    ///
    /// Inner bindings shadow outer ones of the same name; protected names
    /// and pending initializers are concatenated.
    #[must_use]
    pub fn flatten(&self) -> NameScope {
        let Some(outer) = &self.outer else {
            return self.clone();
        };
        let base = outer.flatten();
        let mut initializers = base.initializers;
        initializers.append(self.initializers.clone());
        NameScope {
            outer: None,
            classes: shadow(base.classes, &self.classes),
            pools: shadow(base.pools, &self.pools),
            global_variables: shadow(base.global_variables, &self.global_variables),
            global_constants: shadow(base.global_constants, &self.global_constants),
            protected_names: base.protected_names.union(self.protected_names.clone()),
            initializers,
        }
    }

    /// Number of names defined in this scope's own maps.
    pub fn local_len(&self) -> usize {
        self.classes.len()
            + self.pools.len()
            + self.global_variables.len()
            + self.global_constants.len()
    }
}

/// `outer` with every entry of `inner` inserted over it.
fn shadow<V: Clone>(
    mut outer: im::OrdMap<Name, V>,
    inner: &im::OrdMap<Name, V>,
) -> im::OrdMap<Name, V> {
    for (name, value) in inner {
        outer.insert(*name, value.clone());
    }
    outer
}

impl fmt::Debug for NameScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NameScope")
            .field("classes", &self.classes.len())
            .field("pools", &self.pools.len())
            .field("global_variables", &self.global_variables.len())
            .field("global_constants", &self.global_constants.len())
            .field("initializers", &self.initializers.len())
            .field("has_outer", &self.outer.is_some())
            .finish()
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
