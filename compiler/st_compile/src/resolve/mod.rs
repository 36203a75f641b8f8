//! Scope-chain binding resolution.
//!
//! A [`BindingScope`] either resolves an identifier or declines. A
//! [`ScopeChain`] tries its scopes innermost first:
//!
//! 1. reserved pseudo-variables (`self super true false nil thisContext`)
//! 2. locals (block layers innermost first, then the method/initializer)
//! 3. class elements (instance or class-instance variables, then class
//!    variables up the superclass chain)
//! 4. imported pools in import order
//! 5. globals
//!
//! If every scope declines, the result is a [`NameBinding::Error`], never a
//! panic. Two imported pools defining the same name silently resolve to
//! the first-imported one.

mod class_element;
mod global;
mod local;
mod pool;
mod reserved;

use std::sync::Arc;

use smallvec::SmallVec;
use st_diagnostic::ErrorCode;
use st_ir::{MethodSide, Name, StringInterner, WellKnownNames};
use st_object::{NameScope, SmalltalkClass};

use crate::NameBinding;

pub use class_element::ClassElementScope;
pub use global::GlobalScope;
pub use local::LocalScope;
pub use pool::PoolScope;
pub use reserved::ReservedScope;

/// One layer of the chain.
pub trait BindingScope {
    /// The binding for `name`, or `None` to defer to the next scope.
    fn resolve(&self, name: Name) -> Option<NameBinding>;
}

/// The full resolution chain for one method or initializer body.
pub struct ScopeChain<'a> {
    interner: &'a StringInterner,
    reserved: ReservedScope,
    locals: LocalScope,
    outer: SmallVec<[Box<dyn BindingScope + 'a>; 3]>,
}

impl<'a> ScopeChain<'a> {
    pub fn new(interner: &'a StringInterner, reserved: ReservedScope) -> Self {
        ScopeChain {
            interner,
            reserved,
            locals: LocalScope::new(),
            outer: SmallVec::new(),
        }
    }

    /// Append a scope after the ones already in the chain.
    #[must_use]
    pub fn with_scope(mut self, scope: impl BindingScope + 'a) -> Self {
        self.outer.push(Box::new(scope));
        self
    }

    /// Chain for a method of `class` on `side`.
    pub fn for_method(
        scope: &'a NameScope,
        interner: &'a StringInterner,
        names: &WellKnownNames,
        class: &Arc<SmalltalkClass>,
        side: MethodSide,
    ) -> Self {
        let has_superclass = class.superclass.is_some();
        let reserved = match side {
            MethodSide::Instance => ReservedScope::for_instance_method(names, has_superclass),
            MethodSide::Class => ReservedScope::for_class_method(names, has_superclass),
        };
        ScopeChain::new(interner, reserved)
            .with_scope(ClassElementScope::new(scope, Arc::clone(class), side))
            .with_scope(PoolScope::imported_by(scope, class))
            .with_scope(GlobalScope::new(scope, interner))
    }

    /// Chain for an initializer. A class initializer sees its class the
    /// way a class-side method does; every other initializer sees globals
    /// only.
    pub fn for_initializer(
        scope: &'a NameScope,
        interner: &'a StringInterner,
        names: &WellKnownNames,
        class: Option<&Arc<SmalltalkClass>>,
    ) -> Self {
        match class {
            Some(class) => ScopeChain::new(interner, ReservedScope::for_class_initializer(names))
                .with_scope(ClassElementScope::new(
                    scope,
                    Arc::clone(class),
                    MethodSide::Class,
                ))
                .with_scope(PoolScope::imported_by(scope, class))
                .with_scope(GlobalScope::new(scope, interner)),
            None => ScopeChain::new(interner, ReservedScope::for_initializer(names))
                .with_scope(GlobalScope::new(scope, interner)),
        }
    }

    pub fn locals(&self) -> &LocalScope {
        &self.locals
    }

    pub fn locals_mut(&mut self) -> &mut LocalScope {
        &mut self.locals
    }

    pub fn is_reserved(&self, name: Name) -> bool {
        self.reserved.declares(name)
    }

    /// Resolve `name` through the chain.
    pub fn resolve(&self, name: Name) -> NameBinding {
        let binding = self
            .reserved
            .resolve(name)
            .or_else(|| self.locals.resolve(name))
            .or_else(|| self.outer.iter().find_map(|scope| scope.resolve(name)))
            .unwrap_or_else(|| {
                NameBinding::error(
                    ErrorCode::E2001,
                    format!("undefined identifier `{}`", self.interner.lookup(name)),
                )
            });
        tracing::trace!(
            name = self.interner.lookup(name),
            binding = binding.describe(),
            "resolved"
        );
        binding
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
