//! Interned identifier.

use std::fmt;

/// Interned identifier (a Smalltalk symbol).
///
/// Two `Name`s are equal exactly when their texts are equal, so comparison
/// is a single `u32` compare. The high 4 bits select the interner shard and
/// the low 28 bits index into that shard.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    /// The empty identifier, pre-interned in shard 0.
    pub const EMPTY: Name = Name(0);

    /// Number of interner shards.
    pub const NUM_SHARDS: usize = 16;

    const LOCAL_BITS: u32 = 28;
    const LOCAL_MASK: u32 = (1 << Self::LOCAL_BITS) - 1;

    /// Largest local index a shard can hand out.
    pub const MAX_LOCAL: u32 = Self::LOCAL_MASK;

    #[inline]
    pub(crate) const fn new(shard: u32, local: u32) -> Self {
        debug_assert!((shard as usize) < Self::NUM_SHARDS);
        debug_assert!(local <= Self::LOCAL_MASK);
        Name((shard << Self::LOCAL_BITS) | local)
    }

    #[inline]
    pub(crate) const fn shard(self) -> usize {
        (self.0 >> Self::LOCAL_BITS) as usize
    }

    #[inline]
    pub(crate) const fn local(self) -> usize {
        (self.0 & Self::LOCAL_MASK) as usize
    }

    /// Raw encoded value (stable for the lifetime of the interner).
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Rebuild from a raw value. Only meaningful for values produced by
    /// [`Name::raw`] on the same interner, or in tests.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Name(raw)
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({}:{})", self.shard(), self.local())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shard_and_local_round_trip() {
        let name = Name::new(7, 4242);
        assert_eq!(name.shard(), 7);
        assert_eq!(name.local(), 4242);
        assert_eq!(Name::from_raw(name.raw()), name);
    }

    #[test]
    fn empty_is_default() {
        assert_eq!(Name::default(), Name::EMPTY);
        assert_eq!(Name::EMPTY.local(), 0);
    }
}
