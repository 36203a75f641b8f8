//! Host primitives: behaviour of values the runtime supplies itself.
//!
//! A send that finds no user method falls back here. Primitives are keyed
//! by receiver kind and selector; a second table holds the ones every
//! receiver understands (`==`, `printString`, `isNil`, ...). User methods
//! installed on a host class (`SmallInteger`, `String`, ...) always win.
//!
//! # Module Structure
//!
//! - [`numbers`]: `SmallInteger` and `Float` arithmetic and comparison
//! - [`boolean`]: conditionals and logic on `true`/`false`
//! - [`blocks`]: evaluation and loops on block closures
//! - [`collections`]: strings, symbols, characters and literal arrays
//! - [`objects`]: instance creation and the universal protocol

mod blocks;
mod boolean;
mod collections;
mod numbers;
mod objects;

use rustc_hash::FxHashMap;
use st_ir::lexical::selector_kind;
use st_ir::{Name, StringInterner};
use st_object::{EvalError, ExecEnv, Value, ValueKind};

pub use objects::print_string;

/// Host implementation of one selector.
pub type PrimitiveFn = fn(&ExecEnv, &Value, &[Value]) -> Result<Value, EvalError>;

/// Registry key: receiver kind and selector.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct PrimitiveKey {
    pub kind: ValueKind,
    pub selector: Name,
}

impl PrimitiveKey {
    #[inline]
    pub const fn new(kind: ValueKind, selector: Name) -> Self {
        PrimitiveKey { kind, selector }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Primitive {
    pub arity: usize,
    pub run: PrimitiveFn,
}

/// All host primitives, interned against one symbol table.
pub struct PrimitiveRegistry {
    by_kind: FxHashMap<PrimitiveKey, Primitive>,
    common: FxHashMap<Name, Primitive>,
}

impl PrimitiveRegistry {
    pub fn new(interner: &StringInterner) -> Self {
        let mut registry = PrimitiveRegistry {
            by_kind: FxHashMap::default(),
            common: FxHashMap::default(),
        };
        let mut builder = Builder {
            interner,
            registry: &mut registry,
        };
        numbers::register(&mut builder);
        boolean::register(&mut builder);
        blocks::register(&mut builder);
        collections::register(&mut builder);
        objects::register(&mut builder);
        tracing::debug!(
            by_kind = registry.by_kind.len(),
            common = registry.common.len(),
            "primitives registered"
        );
        registry
    }

    /// Kind-specific primitive first, then the universal one.
    pub fn lookup(&self, kind: ValueKind, selector: Name) -> Option<Primitive> {
        self.by_kind
            .get(&PrimitiveKey::new(kind, selector))
            .or_else(|| self.common.get(&selector))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.by_kind.len() + self.common.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for PrimitiveRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrimitiveRegistry")
            .field("len", &self.len())
            .finish()
    }
}

pub(crate) struct Builder<'a> {
    interner: &'a StringInterner,
    registry: &'a mut PrimitiveRegistry,
}

impl Builder<'_> {
    fn primitive(selector: &str, run: PrimitiveFn) -> Primitive {
        Primitive {
            arity: selector_kind(selector).map_or(0, |kind| kind.arity()),
            run,
        }
    }

    pub(crate) fn on(&mut self, kinds: &[ValueKind], selector: &str, run: PrimitiveFn) {
        let name = self.interner.intern(selector);
        for &kind in kinds {
            self.registry
                .by_kind
                .insert(PrimitiveKey::new(kind, name), Self::primitive(selector, run));
        }
    }

    pub(crate) fn common(&mut self, selector: &str, run: PrimitiveFn) {
        let name = self.interner.intern(selector);
        self.registry
            .common
            .insert(name, Self::primitive(selector, run));
    }
}

// ----------------------------------------------------------------------------
// Argument helpers
// ----------------------------------------------------------------------------

pub(crate) fn integer_arg(selector: &str, arguments: &[Value], index: usize) -> Result<i64, EvalError> {
    match arguments.get(index) {
        Some(Value::Integer(n)) => Ok(*n),
        other => Err(EvalError::primitive_failed(
            selector,
            format!("expected an integer argument, got {}", describe(other)),
        )),
    }
}

pub(crate) fn block_arg<'v>(
    selector: &str,
    arguments: &'v [Value],
    index: usize,
) -> Result<&'v std::sync::Arc<dyn st_object::BlockClosure>, EvalError> {
    match arguments.get(index) {
        Some(Value::Block(block)) => Ok(block),
        other => Err(EvalError::primitive_failed(
            selector,
            format!("expected a block argument, got {}", describe(other)),
        )),
    }
}

/// `value` of an argument: blocks are evaluated, anything else answers
/// itself.
pub(crate) fn value_of(env: &ExecEnv, value: &Value) -> Result<Value, EvalError> {
    match value {
        Value::Block(block) => block.invoke(env, &[]),
        other => Ok(other.clone()),
    }
}

pub(crate) fn describe(value: Option<&Value>) -> String {
    value.map_or_else(|| "nothing".to_owned(), |value| format!("{value:?}"))
}
