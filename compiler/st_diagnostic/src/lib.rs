//! Diagnostics for the Smalltalk compiler and installer.
//!
//! Every expected failure (a bad name, an unresolved identifier, a class
//! shape that violates the standard) becomes a [`Diagnostic`] pushed into an
//! injectable [`ErrorSink`]. Nothing in the installer unwinds for these;
//! the caller decides what to do with the collected diagnostics.
//!
//! ```text
//! let mut queue = DiagnosticQueue::new();
//! let committed = runtime.install(definitions, &mut queue)?;
//! for diagnostic in queue.flush() {
//!     eprintln!("{}..{}: {}", diagnostic.start(), diagnostic.stop(), diagnostic.message);
//! }
//! ```

mod diagnostic;
mod error_code;
mod guarantee;
pub mod queue;
mod sink;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::{ErrorCategory, ErrorCode};
pub use guarantee::ErrorGuaranteed;
pub use queue::{DiagnosticConfig, DiagnosticQueue};
pub use sink::ErrorSink;
