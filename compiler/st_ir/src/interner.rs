//! Process-wide symbol table.
//!
//! Interning is insert-or-get under a per-shard `RwLock`: readers take the
//! shared lock, and only a miss upgrades to the exclusive lock (with a
//! re-check, since another thread may have won the race).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::Name;

/// Interning failed because a shard ran out of local indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternError {
    ShardFull { shard: usize },
}

impl std::fmt::Display for InternError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InternError::ShardFull { shard } => write!(
                f,
                "symbol table shard {shard} is full ({} symbols)",
                u64::from(Name::MAX_LOCAL) + 1
            ),
        }
    }
}

impl std::error::Error for InternError {}

#[derive(Default)]
struct Shard {
    index: FxHashMap<&'static str, u32>,
    texts: Vec<&'static str>,
}

impl Shard {
    fn find(&self, text: &str) -> Option<u32> {
        self.index.get(text).copied()
    }

    fn push(&mut self, shard: usize, text: &'static str) -> Result<u32, InternError> {
        let local = u32::try_from(self.texts.len())
            .ok()
            .filter(|local| *local <= Name::MAX_LOCAL)
            .ok_or(InternError::ShardFull { shard })?;
        self.texts.push(text);
        self.index.insert(text, local);
        Ok(local)
    }
}

/// Sharded symbol table.
///
/// Symbols are never removed; their text is leaked so lookups can hand out
/// `&'static str` without holding a lock.
pub struct StringInterner {
    shards: [RwLock<Shard>; Name::NUM_SHARDS],
    count: AtomicUsize,
}

impl StringInterner {
    /// Create a symbol table with the empty symbol and the reserved words
    /// already present.
    pub fn new() -> Self {
        let interner = StringInterner {
            shards: std::array::from_fn(|_| RwLock::new(Shard::default())),
            count: AtomicUsize::new(0),
        };
        // Index 0 of shard 0 must be the empty symbol (`Name::EMPTY`).
        {
            let mut first = interner.shards[0].write();
            first.texts.push("");
            first.index.insert("", 0);
        }
        interner.count.store(1, Ordering::Relaxed);
        for word in PRE_INTERNED {
            interner.intern(word);
        }
        interner
    }

    fn shard_of(text: &str) -> usize {
        let hash = text
            .bytes()
            .take(8)
            .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(u32::from(b)));
        (hash as usize) % Name::NUM_SHARDS
    }

    /// Intern `text`, returning an error instead of panicking on overflow.
    pub fn try_intern(&self, text: &str) -> Result<Name, InternError> {
        if text.is_empty() {
            return Ok(Name::EMPTY);
        }
        let shard_idx = Self::shard_of(text);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "shard index is below NUM_SHARDS"
        )]
        let shard_tag = shard_idx as u32;
        let shard = &self.shards[shard_idx];

        if let Some(local) = shard.read().find(text) {
            return Ok(Name::new(shard_tag, local));
        }

        let mut guard = shard.write();
        if let Some(local) = guard.find(text) {
            return Ok(Name::new(shard_tag, local));
        }
        let leaked: &'static str = Box::leak(text.to_owned().into_boxed_str());
        let local = guard.push(shard_idx, leaked)?;
        self.count.fetch_add(1, Ordering::Relaxed);
        Ok(Name::new(shard_tag, local))
    }

    /// Intern `text`. Equal texts always yield the same `Name`.
    ///
    /// # Panics
    /// Panics if a shard exceeds 2^28 symbols.
    pub fn intern(&self, text: &str) -> Name {
        self.try_intern(text).unwrap_or_else(|e| panic!("{e}"))
    }

    /// The text of an interned symbol.
    pub fn lookup(&self, name: Name) -> &'static str {
        self.shards[name.shard()]
            .read()
            .texts
            .get(name.local())
            .copied()
            .unwrap_or("")
    }

    /// Find an already-interned symbol without creating one.
    pub fn get(&self, text: &str) -> Option<Name> {
        if text.is_empty() {
            return Some(Name::EMPTY);
        }
        let shard_idx = Self::shard_of(text);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "shard index is below NUM_SHARDS"
        )]
        let shard_tag = shard_idx as u32;
        self.shards[shard_idx]
            .read()
            .find(text)
            .map(|local| Name::new(shard_tag, local))
    }

    /// Number of interned symbols, including the empty one.
    pub fn len(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }

    /// True when only the empty symbol is present.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

/// Words every compilation needs; interning them up front keeps the write
/// lock off the hot path.
const PRE_INTERNED: &[&str] = &[
    "self",
    "super",
    "true",
    "false",
    "nil",
    "thisContext",
    "Smalltalk",
    "new",
    "basicNew",
    "value",
    "value:",
    "ifTrue:",
    "ifFalse:",
    "ifTrue:ifFalse:",
    "printString",
    "doesNotUnderstand:",
];

/// Read-only symbol lookup, for code that must not depend on the concrete
/// interner type.
pub trait StringLookup {
    fn lookup(&self, name: Name) -> &str;
}

impl StringLookup for StringInterner {
    fn lookup(&self, name: Name) -> &str {
        StringInterner::lookup(self, name)
    }
}

/// Reference-counted handle to the runtime's symbol table.
///
/// Cloning is cheap; every clone interns into the same table, so symbols
/// produced by independently running compilations compare equal.
#[derive(Clone, Default)]
pub struct SharedInterner(Arc<StringInterner>);

impl SharedInterner {
    pub fn new() -> Self {
        SharedInterner(Arc::new(StringInterner::new()))
    }
}

impl std::ops::Deref for SharedInterner {
    type Target = StringInterner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Debug for SharedInterner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedInterner")
            .field("len", &self.0.len())
            .finish()
    }
}
