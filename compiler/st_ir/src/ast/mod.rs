//! Semantic parse tree.
//!
//! These are the nodes an external parser hands to the compiler. The
//! compiler only reads them; every node carries the span of the text it was
//! parsed from so binding errors can point at the exact identifier.
//!
//! Pseudo-variables (`self`, `super`, `true`, `false`, `nil`) are ordinary
//! [`ExprKind::Variable`] identifiers here. Their meaning is decided by the
//! resolver's reserved scope, not by the parser.

use crate::{Name, Named, Span, Spanned};

/// An identifier occurrence: the interned text plus where it was written.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Ident {
    pub name: Name,
    pub span: Span,
}

impl Ident {
    #[inline]
    pub const fn new(name: Name, span: Span) -> Self {
        Ident { name, span }
    }

    /// Identifier with no source location, for host-synthesized trees.
    #[inline]
    pub const fn synthetic(name: Name) -> Self {
        Ident {
            name,
            span: Span::DUMMY,
        }
    }
}

impl Named for Ident {
    fn name(&self) -> Name {
        self.name
    }
}

impl Spanned for Ident {
    fn span(&self) -> Span {
        self.span
    }
}

/// Literal constants.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    Character(char),
    String(String),
    Symbol(Name),
    /// `#(1 $a 'str' #sym)`: elements are themselves literals.
    Array(Vec<Literal>),
}

/// One statement of a method, initializer or block body.
#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Expr(Expr),
    /// `^ expr`. Inside a block this returns from the home method.
    Return { value: Expr, span: Span },
}

impl Stmt {
    pub fn expr(expr: Expr) -> Self {
        Stmt::Expr(expr)
    }

    pub fn ret(value: Expr) -> Self {
        let span = value.span;
        Stmt::Return { value, span }
    }
}

impl Spanned for Stmt {
    fn span(&self) -> Span {
        match self {
            Stmt::Expr(expr) => expr.span,
            Stmt::Return { span, .. } => *span,
        }
    }
}

/// An expression node.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

/// The shape of an expression.
#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Literal(Literal),
    Variable(Ident),
    Assign {
        target: Ident,
        value: Box<Expr>,
    },
    /// Unary, binary and keyword sends share one node; the selector's arity
    /// matches `arguments.len()`.
    Send {
        receiver: Box<Expr>,
        selector: Ident,
        arguments: Vec<Expr>,
    },
    /// `receiver m1; m2; m3` sends every message to the same receiver value
    /// and answers the result of the last one.
    Cascade {
        receiver: Box<Expr>,
        messages: Vec<CascadeMessage>,
    },
    Block(BlockNode),
}

/// One message of a cascade.
#[derive(Clone, Debug, PartialEq)]
pub struct CascadeMessage {
    pub selector: Ident,
    pub arguments: Vec<Expr>,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }

    pub fn literal(literal: Literal, span: Span) -> Self {
        Expr::new(ExprKind::Literal(literal), span)
    }

    pub fn integer(value: i64) -> Self {
        Expr::literal(Literal::Integer(value), Span::DUMMY)
    }

    pub fn variable(ident: Ident) -> Self {
        Expr::new(ExprKind::Variable(ident), ident.span)
    }

    pub fn assign(target: Ident, value: Expr) -> Self {
        let span = target.span.merge(value.span);
        Expr::new(
            ExprKind::Assign {
                target,
                value: Box::new(value),
            },
            span,
        )
    }

    pub fn send(receiver: Expr, selector: Ident, arguments: Vec<Expr>) -> Self {
        let span = arguments
            .iter()
            .fold(receiver.span.merge(selector.span), |acc, arg| {
                acc.merge(arg.span)
            });
        Expr::new(
            ExprKind::Send {
                receiver: Box::new(receiver),
                selector,
                arguments,
            },
            span,
        )
    }

    pub fn cascade(receiver: Expr, messages: Vec<CascadeMessage>) -> Self {
        let span = messages
            .iter()
            .fold(receiver.span, |acc, message| acc.merge(message.span));
        Expr::new(
            ExprKind::Cascade {
                receiver: Box::new(receiver),
                messages,
            },
            span,
        )
    }

    pub fn block(block: BlockNode) -> Self {
        let span = block.span;
        Expr::new(ExprKind::Block(block), span)
    }
}

impl Spanned for Expr {
    fn span(&self) -> Span {
        self.span
    }
}

/// `[:a :b | | t | statements]`
#[derive(Clone, Debug, PartialEq, Default)]
pub struct BlockNode {
    pub arguments: Vec<Ident>,
    pub temporaries: Vec<Ident>,
    pub statements: Vec<Stmt>,
    pub span: Span,
}

/// A parsed method: selector pattern, temporaries and body.
#[derive(Clone, Debug, PartialEq)]
pub struct MethodNode {
    pub selector: Ident,
    pub arguments: Vec<Ident>,
    pub temporaries: Vec<Ident>,
    pub statements: Vec<Stmt>,
    pub span: Span,
}

impl MethodNode {
    pub fn new(selector: Ident, arguments: Vec<Ident>) -> Self {
        MethodNode {
            selector,
            arguments,
            temporaries: Vec::new(),
            statements: Vec::new(),
            span: selector.span,
        }
    }

    #[must_use]
    pub fn with_temporaries(mut self, temporaries: Vec<Ident>) -> Self {
        self.temporaries = temporaries;
        self
    }

    #[must_use]
    pub fn with_statements(mut self, statements: Vec<Stmt>) -> Self {
        self.span = statements
            .iter()
            .fold(self.span, |acc, stmt| acc.merge(stmt.span()));
        self.statements = statements;
        self
    }
}

impl Spanned for MethodNode {
    fn span(&self) -> Span {
        self.span
    }
}

/// A parsed initializer body: temporaries and statements, no arguments.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct InitializerNode {
    pub temporaries: Vec<Ident>,
    pub statements: Vec<Stmt>,
    pub span: Span,
}

impl InitializerNode {
    pub fn new(statements: Vec<Stmt>) -> Self {
        let span = statements
            .iter()
            .map(Spanned::span)
            .reduce(Span::merge)
            .unwrap_or_default();
        InitializerNode {
            temporaries: Vec::new(),
            statements,
            span,
        }
    }

    #[must_use]
    pub fn with_temporaries(mut self, temporaries: Vec<Ident>) -> Self {
        self.temporaries = temporaries;
        self
    }
}

impl Spanned for InitializerNode {
    fn span(&self) -> Span {
        self.span
    }
}

#[cfg(test)]
mod tests;
