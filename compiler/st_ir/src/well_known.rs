//! Pre-interned names the resolver and dispatcher compare against.
//!
//! Interned once per runtime so that hot paths compare `u32`s instead of
//! hashing strings.

use crate::{Name, StringInterner};

/// The pseudo-variables and a few selectors with fixed meaning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WellKnownNames {
    pub self_: Name,
    pub super_: Name,
    pub true_: Name,
    pub false_: Name,
    pub nil: Name,
    pub this_context: Name,
    pub smalltalk: Name,
}

impl WellKnownNames {
    pub fn new(interner: &StringInterner) -> Self {
        WellKnownNames {
            self_: interner.intern("self"),
            super_: interner.intern("super"),
            true_: interner.intern("true"),
            false_: interner.intern("false"),
            nil: interner.intern("nil"),
            this_context: interner.intern("thisContext"),
            smalltalk: interner.intern("Smalltalk"),
        }
    }

    /// Words no definition, argument or temporary may use as its name.
    pub fn reserved(&self) -> [Name; 6] {
        [
            self.self_,
            self.super_,
            self.true_,
            self.false_,
            self.nil,
            self.this_context,
        ]
    }

    #[inline]
    pub fn is_reserved(&self, name: Name) -> bool {
        self.reserved().contains(&name)
    }
}
