//! Tree-walking backend for the Smalltalk core.
//!
//! Plugs into the compiler through [`CodeGenerator`](st_compile::CodeGenerator):
//! the [`Interpreter`] turns bound methods and initializers into
//! executables that walk the bound tree. Sends dispatch through the live
//! name scope carried by [`ExecEnv`](st_object::ExecEnv), falling back to
//! host [`primitives`] for values the runtime supplies itself.

pub mod dispatch;
mod frame;
mod interpreter;
pub mod primitives;
mod stack;

pub use frame::{Frame, Home, HomeGuard};
pub use interpreter::{Closure, Interpreter};
pub use primitives::{print_string, PrimitiveRegistry};
pub use stack::ensure_sufficient_stack;
