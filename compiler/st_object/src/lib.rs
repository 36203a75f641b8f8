//! Runtime object model for the Smalltalk core.
//!
//! Everything the resolver consults and the installer mutates lives here:
//!
//! - [`Value`] and [`Object`]: what running code manipulates
//! - [`Binding`]: named storage cells (constant or writable)
//! - [`SmalltalkClass`], [`Pool`]: immutable-by-convention definitions,
//!   replaced wholesale rather than edited in place
//! - [`CompiledMethod`], [`CompiledInitializer`]: executable artifacts
//!   produced by a backend through the [`Executable`] trait
//! - [`NameScope`]: the global namespace, built on persistent maps so a
//!   snapshot is O(1) and readers of an old snapshot never see edits
//!
//! Classes refer to their superclass and to imported pools by [`Name`];
//! the scope is the arena that resolves those names. No class owns another,
//! so superclass cycles cannot leak memory.
//!
//! [`Name`]: st_ir::Name

mod binding;
mod class;
mod error;
mod lookup;
mod method;
mod pool;
mod scope;
mod value;

pub use binding::{
    Access, Binding, BindingError, ClassBinding, PoolBinding, ValueBinding,
};
pub use class::{ClassLayout, MethodDictionary, SmalltalkClass};
pub use error::EvalError;
pub use lookup::{MethodLookup, SuperclassChain};
pub use method::{
    BlockClosure, CompiledInitializer, CompiledMethod, ExecEnv, Executable, InitializerType,
};
pub use pool::Pool;
pub use scope::{BindingCategory, DefineError, GlobalBinding, NameScope};
pub use value::{Object, Value, ValueKind};
