//! What an identifier resolves to.

use std::sync::Arc;

use st_diagnostic::ErrorCode;
use st_ir::Name;
use st_object::ValueBinding;

/// Argument or temporary of a method, initializer or block.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LocalKind {
    Argument,
    Temporary,
}

/// Pseudo-variables with fixed meaning.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SpecialBinding {
    /// `self`: the receiver (the class itself in class initializers).
    SelfRef,
    /// `super`: the receiver, with sends starting above the defining class.
    Super,
    True,
    False,
    Nil,
}

/// Resolution failure kept inside the tree so one bad reference degrades
/// to one diagnostic instead of aborting the compilation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BindingFailure {
    pub code: ErrorCode,
    pub message: String,
}

/// The result of resolving one identifier.
#[derive(Clone, Debug)]
pub enum NameBinding {
    /// Slot `index` in the activation `depth` block levels out (0 = the
    /// innermost method, initializer or block).
    Local {
        depth: usize,
        index: usize,
        kind: LocalKind,
    },
    /// Slot in the receiver's instance-variable array.
    InstanceVariable { index: usize },
    /// Slot in the class's class-instance-variable array.
    ClassInstanceVariable { index: usize },
    ClassVariable(Arc<ValueBinding>),
    PoolVariable(Arc<ValueBinding>),
    PoolConstant(Arc<ValueBinding>),
    GlobalVariable(Arc<ValueBinding>),
    GlobalConstant(Arc<ValueBinding>),
    /// A class name; resolved to the current class object at run time.
    Class(Name),
    Special(SpecialBinding),
    Error(BindingFailure),
}

impl NameBinding {
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        NameBinding::Error(BindingFailure {
            code,
            message: message.into(),
        })
    }

    /// Whether `name := value` may target this binding.
    pub fn is_writable(&self) -> bool {
        match self {
            NameBinding::Local { kind, .. } => *kind == LocalKind::Temporary,
            NameBinding::InstanceVariable { .. }
            | NameBinding::ClassInstanceVariable { .. }
            | NameBinding::ClassVariable(_)
            | NameBinding::PoolVariable(_)
            | NameBinding::GlobalVariable(_) => true,
            NameBinding::PoolConstant(_)
            | NameBinding::GlobalConstant(_)
            | NameBinding::Class(_)
            | NameBinding::Special(_)
            | NameBinding::Error(_) => false,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, NameBinding::Error(_))
    }

    /// Human-readable category, for diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            NameBinding::Local {
                kind: LocalKind::Argument,
                ..
            } => "argument",
            NameBinding::Local { .. } => "temporary",
            NameBinding::InstanceVariable { .. } => "instance variable",
            NameBinding::ClassInstanceVariable { .. } => "class-instance variable",
            NameBinding::ClassVariable(_) => "class variable",
            NameBinding::PoolVariable(_) => "pool variable",
            NameBinding::PoolConstant(_) => "pool constant",
            NameBinding::GlobalVariable(_) => "global variable",
            NameBinding::GlobalConstant(_) => "global constant",
            NameBinding::Class(_) => "class",
            NameBinding::Special(_) => "pseudo-variable",
            NameBinding::Error(_) => "unresolved name",
        }
    }

    /// Identity comparison: same slot or same shared cell.
    pub fn same_as(&self, other: &NameBinding) -> bool {
        match (self, other) {
            (
                NameBinding::Local {
                    depth: d1,
                    index: i1,
                    ..
                },
                NameBinding::Local {
                    depth: d2,
                    index: i2,
                    ..
                },
            ) => d1 == d2 && i1 == i2,
            (
                NameBinding::InstanceVariable { index: a },
                NameBinding::InstanceVariable { index: b },
            )
            | (
                NameBinding::ClassInstanceVariable { index: a },
                NameBinding::ClassInstanceVariable { index: b },
            ) => a == b,
            (NameBinding::ClassVariable(a), NameBinding::ClassVariable(b))
            | (NameBinding::PoolVariable(a), NameBinding::PoolVariable(b))
            | (NameBinding::PoolConstant(a), NameBinding::PoolConstant(b))
            | (NameBinding::GlobalVariable(a), NameBinding::GlobalVariable(b))
            | (NameBinding::GlobalConstant(a), NameBinding::GlobalConstant(b)) => Arc::ptr_eq(a, b),
            (NameBinding::Class(a), NameBinding::Class(b)) => a == b,
            (NameBinding::Special(a), NameBinding::Special(b)) => a == b,
            (NameBinding::Error(a), NameBinding::Error(b)) => a == b,
            _ => false,
        }
    }
}
