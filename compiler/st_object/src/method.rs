//! Compiled artifacts and the backend seam.
//!
//! The core never runs code itself. A backend turns a bound tree into an
//! [`Executable`]; the object model only stores it and calls it.

use std::fmt;
use std::sync::Arc;

use st_ir::{Annotation, InitializerNode, MethodNode, MethodSide, Name, SharedInterner, Span};

use crate::{EvalError, NameScope, Value, ValueBinding};

/// What running code can see: the scope it resolves classes and globals
/// through, and the symbol table.
#[derive(Clone, Debug)]
pub struct ExecEnv {
    pub scope: Arc<NameScope>,
    pub interner: SharedInterner,
}

impl ExecEnv {
    pub fn new(scope: Arc<NameScope>, interner: SharedInterner) -> Self {
        ExecEnv { scope, interner }
    }
}

/// Opaque callable produced by a backend.
pub trait Executable: Send + Sync {
    fn call(&self, env: &ExecEnv, receiver: Value, arguments: &[Value])
        -> Result<Value, EvalError>;
}

/// A block closure value.
pub trait BlockClosure: Send + Sync {
    fn arity(&self) -> usize;

    fn invoke(&self, env: &ExecEnv, arguments: &[Value]) -> Result<Value, EvalError>;
}

/// One method, ready to dispatch.
#[derive(Clone)]
pub struct CompiledMethod {
    pub selector: Name,
    /// Class whose dictionary holds the method (where `super` starts).
    pub class: Name,
    pub side: MethodSide,
    /// Kept for recompilation against a changed class shape.
    pub node: Arc<MethodNode>,
    pub executable: Arc<dyn Executable>,
    pub annotations: Vec<Annotation>,
}

impl CompiledMethod {
    pub fn argument_count(&self) -> usize {
        self.node.arguments.len()
    }

    pub fn invoke(
        &self,
        env: &ExecEnv,
        receiver: Value,
        arguments: &[Value],
    ) -> Result<Value, EvalError> {
        self.executable.call(env, receiver, arguments)
    }
}

impl fmt::Debug for CompiledMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledMethod")
            .field("selector", &self.selector)
            .field("class", &self.class)
            .field("side", &self.side)
            .field("annotations", &self.annotations)
            .finish_non_exhaustive()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum InitializerType {
    Program,
    Global,
    Class,
    PoolVariable,
}

/// One initializer, pending execution in its scope.
#[derive(Clone)]
pub struct CompiledInitializer {
    pub kind: InitializerType,
    /// Cell the result is stored into, if any.
    pub target: Option<Arc<ValueBinding>>,
    /// `self` while the body runs: the class for class initializers,
    /// `nil` otherwise.
    pub receiver: Value,
    pub node: Arc<InitializerNode>,
    pub executable: Arc<dyn Executable>,
    pub annotations: Vec<Annotation>,
    pub span: Span,
}

impl CompiledInitializer {
    /// Run the body and store the result into the target binding.
    pub fn execute(&self, env: &ExecEnv) -> Result<Value, EvalError> {
        let value = self.executable.call(env, self.receiver.clone(), &[])?;
        if let Some(target) = &self.target {
            target.set(value.clone())?;
        }
        Ok(value)
    }
}

impl fmt::Debug for CompiledInitializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledInitializer")
            .field("kind", &self.kind)
            .field("target", &self.target)
            .field("span", &self.span)
            .finish_non_exhaustive()
    }
}
