//! Binding resolution, compilation and installation for the Smalltalk core.
//!
//! - [`resolve`]: the scope chain that turns identifiers into
//!   [`NameBinding`]s (reserved words, locals, class elements, pools,
//!   globals)
//! - [`Compiler`]: parse tree -> [`bound`] tree, reporting semantic errors
//! - [`CodeGenerator`]: the backend seam that turns a bound tree into an
//!   [`Executable`](st_object::Executable)
//! - [`install`]: the phased installer that moves a batch of definitions
//!   into the live [`NameScope`](st_object::NameScope)

mod binding;
pub mod bound;
mod codegen;
mod compiler;
pub mod install;
pub mod resolve;

pub use binding::{BindingFailure, LocalKind, NameBinding, SpecialBinding};
pub use bound::{
    BoundBlock, BoundBody, BoundExpr, BoundInitializer, BoundMessage, BoundMethod, BoundStmt,
};
pub use codegen::CodeGenerator;
pub use compiler::{literal_value, Compiler};
pub use install::{InstallFault, InstallOptions, Installer};
