//! Single-capability accessor traits.

use crate::{Name, Span};

/// Anything that remembers where in the source it came from.
pub trait Spanned {
    fn span(&self) -> Span;
}

/// Anything identified by an interned name.
pub trait Named {
    fn name(&self) -> Name;
}
