//! Runtime errors raised while executing compiled code.

use crate::{BindingError, Value};

/// Evaluation failure.
///
/// `NonLocalReturn` is not a failure: it carries a `^` out of a block up
/// to the frame that created the block, and is only visible to callers if
/// that frame has already returned (then it turns into `BlockCannotReturn`).
#[derive(Clone, Debug, thiserror::Error)]
pub enum EvalError {
    #[error("{receiver} does not understand #{selector}")]
    DoesNotUnderstand { receiver: String, selector: String },

    #[error("#{selector} expects {expected} argument(s), got {got}")]
    WrongArgumentCount {
        selector: String,
        expected: usize,
        got: usize,
    },

    #[error("primitive #{selector} failed: {reason}")]
    PrimitiveFailed { selector: String, reason: String },

    #[error(transparent)]
    Binding(#[from] BindingError),

    #[error("#{selector} is ambiguous between {}", .candidates.join(", "))]
    CaseConflict {
        selector: String,
        candidates: Vec<String>,
    },

    #[error("`{name}` is not bound to a value")]
    Unbound { name: String },

    #[error("block cannot return: its home context has already returned")]
    BlockCannotReturn,

    #[error("non-local return")]
    NonLocalReturn { home: u64, value: Value },
}

impl EvalError {
    pub fn primitive_failed(selector: &str, reason: impl Into<String>) -> Self {
        EvalError::PrimitiveFailed {
            selector: selector.to_owned(),
            reason: reason.into(),
        }
    }
}
