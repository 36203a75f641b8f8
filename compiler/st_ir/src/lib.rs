//! Smalltalk IR - symbols, spans, parse trees and definition records.
//!
//! This crate is the leaf of the workspace. It holds:
//! - `Name`: interned identifiers (one per unique text per runtime)
//! - `StringInterner` / `SharedInterner`: the process-wide symbol table
//! - `Span`: source locations carried by every node for diagnostics
//! - The parse tree consumed by the compiler (`MethodNode`, `InitializerNode`)
//! - The definition records produced by an interchange-file reader
//! - Lexical validation of identifiers and selectors
//!
//! The parser and the interchange reader are external producers; this crate
//! only defines the shapes they hand over.

pub mod ast;
pub mod definition;
mod interner;
pub mod lexical;
mod name;
mod span;
mod traits;
mod well_known;

pub use ast::{
    BlockNode, CascadeMessage, Expr, ExprKind, Ident, InitializerNode, Literal, MethodNode, Stmt,
};
pub use definition::{
    Annotation, ClassDefinition, Definition, GlobalDefinition, GlobalKind, InitializerDefinition,
    InitializerTarget, MethodDefinition, MethodSide, PoolDefinition, PoolVariableDefinition,
    PoolVariableKind,
};
pub use interner::{InternError, SharedInterner, StringInterner, StringLookup};
pub use name::Name;
pub use span::Span;
pub use traits::{Named, Spanned};
pub use well_known::WellKnownNames;
