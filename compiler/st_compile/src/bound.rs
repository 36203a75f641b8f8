//! The resolved tree handed to a code generator.
//!
//! Every identifier has been replaced by its [`NameBinding`]; literals are
//! already runtime values. A backend never needs the name scope to
//! interpret variable references.

use std::sync::Arc;

use st_ir::{MethodSide, Name, Span};
use st_object::Value;

use crate::NameBinding;

#[derive(Clone, Debug)]
pub enum BoundExpr {
    Literal(Value),
    Variable(NameBinding),
    Assign {
        target: NameBinding,
        value: Box<BoundExpr>,
    },
    Send {
        receiver: Box<BoundExpr>,
        selector: Name,
        arguments: Vec<BoundExpr>,
    },
    /// Send to `self` with lookup starting at the superclass of
    /// `defining_class` on `side`.
    SuperSend {
        defining_class: Name,
        side: MethodSide,
        selector: Name,
        arguments: Vec<BoundExpr>,
    },
    Cascade {
        receiver: Box<BoundExpr>,
        messages: Vec<BoundMessage>,
        /// Set when the receiver is `super`: every message then starts its
        /// lookup above this class on this side.
        super_lookup: Option<(Name, MethodSide)>,
    },
    Block(Arc<BoundBlock>),
}

/// One message of a cascade.
#[derive(Clone, Debug)]
pub struct BoundMessage {
    pub selector: Name,
    pub arguments: Vec<BoundExpr>,
}

#[derive(Clone, Debug)]
pub enum BoundStmt {
    Expr(BoundExpr),
    Return(BoundExpr),
}

/// Slot counts and statements of one activation.
///
/// Slots are numbered arguments first, then temporaries.
#[derive(Clone, Debug, Default)]
pub struct BoundBody {
    pub argument_count: usize,
    pub temporary_count: usize,
    pub statements: Vec<BoundStmt>,
}

impl BoundBody {
    pub fn slot_count(&self) -> usize {
        self.argument_count + self.temporary_count
    }
}

/// A block literal. Answers its last statement's value (`nil` if empty).
#[derive(Clone, Debug)]
pub struct BoundBlock {
    pub body: BoundBody,
    pub span: Span,
}

/// A method. Answers `self` unless a statement returns.
#[derive(Clone, Debug)]
pub struct BoundMethod {
    pub selector: Name,
    pub class: Name,
    pub side: MethodSide,
    pub body: BoundBody,
    pub span: Span,
}

/// An initializer. Answers its last statement's value.
#[derive(Clone, Debug)]
pub struct BoundInitializer {
    pub body: BoundBody,
    pub span: Span,
}
