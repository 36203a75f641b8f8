//! Method lookup: `class -> selector -> CompiledMethod`, walking the
//! superclass chain on a miss.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use st_ir::{MethodSide, Name, StringInterner};

use crate::{CompiledMethod, NameScope, SmalltalkClass};

/// Outcome of a case-insensitive method lookup.
#[derive(Clone, Debug)]
pub enum MethodLookup {
    Found(Arc<CompiledMethod>),
    NotFound,
    /// More than one selector in the nearest defining class matches when
    /// case is ignored.
    CaseConflict(Vec<Name>),
}

/// Iterator over a class and its superclasses, nearest first.
///
/// Stops at the first name that is unbound or already visited, so a
/// malformed hierarchy cannot loop.
pub struct SuperclassChain<'a> {
    scope: &'a NameScope,
    next: Option<Name>,
    visited: FxHashSet<Name>,
}

impl<'a> SuperclassChain<'a> {
    pub fn new(scope: &'a NameScope, start: Name) -> Self {
        SuperclassChain {
            scope,
            next: Some(start),
            visited: FxHashSet::default(),
        }
    }
}

impl Iterator for SuperclassChain<'_> {
    type Item = Arc<SmalltalkClass>;

    fn next(&mut self) -> Option<Self::Item> {
        let name = self.next.take()?;
        if !self.visited.insert(name) {
            return None;
        }
        let class = self.scope.get_class(name)?;
        self.next = class.superclass;
        Some(class)
    }
}

impl NameScope {
    /// `class` followed by its superclasses.
    pub fn superclass_chain(&self, class: Name) -> SuperclassChain<'_> {
        SuperclassChain::new(self, class)
    }

    /// Whether `ancestor` is `class` itself or one of its superclasses.
    pub fn inherits_from(&self, class: Name, ancestor: Name) -> bool {
        self.superclass_chain(class).any(|c| c.name == ancestor)
    }

    /// Exact, case-sensitive lookup starting at `class`.
    pub fn lookup_method(
        &self,
        class: Name,
        side: MethodSide,
        selector: Name,
    ) -> Option<Arc<CompiledMethod>> {
        let found = self
            .superclass_chain(class)
            .find_map(|c| c.methods(side).get(selector).cloned());
        tracing::trace!(?class, ?selector, found = found.is_some(), "method lookup");
        found
    }

    /// Lookup that ignores ASCII case.
    ///
    /// The nearest class defining any matching selector decides: one match
    /// is `Found`, several are a `CaseConflict` the caller must handle.
    pub fn lookup_method_ignoring_case(
        &self,
        interner: &StringInterner,
        class: Name,
        side: MethodSide,
        selector: &str,
    ) -> MethodLookup {
        for c in self.superclass_chain(class) {
            let matches: Vec<&Arc<CompiledMethod>> = c
                .methods(side)
                .iter()
                .filter(|m| interner.lookup(m.selector).eq_ignore_ascii_case(selector))
                .collect();
            match matches.as_slice() {
                [] => {}
                [only] => return MethodLookup::Found(Arc::clone(only)),
                several => {
                    return MethodLookup::CaseConflict(several.iter().map(|m| m.selector).collect())
                }
            }
        }
        MethodLookup::NotFound
    }
}
