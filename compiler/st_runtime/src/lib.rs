//! Live Smalltalk runtime.
//!
//! Ties the workspace together: a [`Runtime`] owns the committed
//! [`NameScope`](st_object::NameScope), installs definition batches through
//! the [`Installer`](st_compile::Installer) with the tree-walking
//! [`Interpreter`](st_eval::Interpreter) as backend, runs pending
//! initializers and sends messages.
//!
//! ```text
//! definitions ──▶ Runtime::install ──▶ live scope ──▶ Runtime::send
//!                      │                   │
//!                 diagnostics      execute_initializers
//! ```

mod config;
mod logging;
mod runtime;

pub use config::RuntimeConfig;
pub use logging::init_tracing;
pub use runtime::Runtime;

pub use st_compile::InstallOptions;
pub use st_diagnostic::{Diagnostic, DiagnosticConfig, DiagnosticQueue, ErrorCode, ErrorSink};
pub use st_object::{EvalError, GlobalBinding, Value};
