//! Backend seam.

use std::sync::Arc;

use st_object::Executable;

use crate::{BoundInitializer, BoundMethod};

/// Turns bound trees into callables.
///
/// Whether the result is interpreted, tree-walked or native code is the
/// backend's business.
pub trait CodeGenerator: Send + Sync {
    fn generate_method(&self, method: &BoundMethod) -> Arc<dyn Executable>;

    fn generate_initializer(&self, initializer: &BoundInitializer) -> Arc<dyn Executable>;
}
