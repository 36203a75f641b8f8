//! Parse tree -> bound tree.
//!
//! The compiler walks a method or initializer body with a [`ScopeChain`],
//! replaces every identifier by its binding and reports semantic errors to
//! the sink. It keeps going after an error so one pass reports every
//! problem in the body; the result is `Err` if anything was reported.

use std::sync::Arc;

use st_diagnostic::{Diagnostic, ErrorCode, ErrorGuaranteed, ErrorSink};
use st_ir::lexical::selector_kind;
use st_ir::{
    BlockNode, Expr, ExprKind, Ident, InitializerNode, Literal, MethodNode, MethodSide, Name,
    StringInterner, Stmt, WellKnownNames,
};
use st_object::{NameScope, SmalltalkClass, Value};

use crate::bound::{
    BoundBlock, BoundBody, BoundExpr, BoundInitializer, BoundMessage, BoundMethod, BoundStmt,
};
use crate::resolve::ScopeChain;
use crate::{LocalKind, NameBinding, SpecialBinding};

/// Compiles method and initializer bodies against a name scope.
pub struct Compiler<'a> {
    interner: &'a StringInterner,
    names: WellKnownNames,
}

impl<'a> Compiler<'a> {
    pub fn new(interner: &'a StringInterner) -> Self {
        Compiler {
            interner,
            names: WellKnownNames::new(interner),
        }
    }

    pub fn well_known(&self) -> &WellKnownNames {
        &self.names
    }

    /// Compile a method of `class` on `side`.
    ///
    /// Besides binding errors this checks the selector: it must be a
    /// well-formed unary, binary or keyword selector whose arity matches
    /// the argument count.
    pub fn compile_method(
        &self,
        scope: &NameScope,
        class: &Arc<SmalltalkClass>,
        side: MethodSide,
        node: &MethodNode,
        sink: &mut dyn ErrorSink,
    ) -> Result<BoundMethod, ErrorGuaranteed> {
        let chain = ScopeChain::for_method(scope, self.interner, &self.names, class, side);
        let mut body = BodyCompiler {
            chain,
            sink,
            interner: self.interner,
            names: &self.names,
            super_target: Some((class.name, side)),
            first_error: None,
        };

        body.check_selector(node);
        let bound = body.compile_body(&node.arguments, &node.temporaries, &node.statements);

        match body.first_error {
            Some(guar) => Err(guar),
            None => Ok(BoundMethod {
                selector: node.selector.name,
                class: class.name,
                side,
                body: bound,
                span: node.span,
            }),
        }
    }

    /// Compile an initializer. `class` is the class a class initializer
    /// initializes; other initializers pass `None`.
    pub fn compile_initializer(
        &self,
        scope: &NameScope,
        class: Option<&Arc<SmalltalkClass>>,
        node: &InitializerNode,
        sink: &mut dyn ErrorSink,
    ) -> Result<BoundInitializer, ErrorGuaranteed> {
        let chain = ScopeChain::for_initializer(scope, self.interner, &self.names, class);
        let mut body = BodyCompiler {
            chain,
            sink,
            interner: self.interner,
            names: &self.names,
            super_target: None,
            first_error: None,
        };

        let bound = body.compile_body(&[], &node.temporaries, &node.statements);

        match body.first_error {
            Some(guar) => Err(guar),
            None => Ok(BoundInitializer {
                body: bound,
                span: node.span,
            }),
        }
    }
}

/// State for compiling one body.
struct BodyCompiler<'a, 's> {
    chain: ScopeChain<'a>,
    sink: &'s mut dyn ErrorSink,
    interner: &'a StringInterner,
    names: &'a WellKnownNames,
    /// Class and side `super` sends start above; `None` in initializers.
    super_target: Option<(Name, MethodSide)>,
    first_error: Option<ErrorGuaranteed>,
}

impl BodyCompiler<'_, '_> {
    fn report(&mut self, diagnostic: Diagnostic) {
        let guar = self.sink.report_error(diagnostic);
        self.first_error.get_or_insert(guar);
    }

    fn error(&mut self, code: ErrorCode, message: String, ident: Ident) {
        self.report(
            Diagnostic::error(code)
                .with_message(message)
                .with_label(ident.span, code.description()),
        );
    }

    fn text(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }

    fn check_selector(&mut self, node: &MethodNode) {
        let text = self.text(node.selector.name);
        match selector_kind(text) {
            None => self.error(
                ErrorCode::E1004,
                format!("`{text}` is not a well-formed selector"),
                node.selector,
            ),
            Some(kind) if kind.arity() != node.arguments.len() => self.error(
                ErrorCode::E4002,
                format!(
                    "selector `{text}` takes {} argument(s) but the method declares {}",
                    kind.arity(),
                    node.arguments.len()
                ),
                node.selector,
            ),
            Some(_) => {}
        }
    }

    fn declare(&mut self, ident: Ident, kind: LocalKind) {
        let (what, article) = match kind {
            LocalKind::Argument => ("argument", "an"),
            LocalKind::Temporary => ("temporary", "a"),
        };
        if self.names.is_reserved(ident.name) {
            self.error(
                ErrorCode::E2006,
                format!(
                    "`{}` is reserved and cannot name {article} {what}",
                    self.text(ident.name)
                ),
                ident,
            );
        } else if self.chain.locals().declares_in_current_layer(ident.name) {
            self.error(
                ErrorCode::E2005,
                format!("duplicate {what} `{}`", self.text(ident.name)),
                ident,
            );
        }
        self.chain.locals_mut().declare(ident.name, kind);
    }

    /// Push a layer, declare locals, compile statements, pop the layer.
    fn compile_body(
        &mut self,
        arguments: &[Ident],
        temporaries: &[Ident],
        statements: &[Stmt],
    ) -> BoundBody {
        self.chain.locals_mut().push_layer();
        for &argument in arguments {
            self.declare(argument, LocalKind::Argument);
        }
        for &temporary in temporaries {
            self.declare(temporary, LocalKind::Temporary);
        }
        let statements = statements.iter().map(|stmt| self.compile_stmt(stmt)).collect();
        self.chain.locals_mut().pop_layer();
        BoundBody {
            argument_count: arguments.len(),
            temporary_count: temporaries.len(),
            statements,
        }
    }

    fn compile_stmt(&mut self, stmt: &Stmt) -> BoundStmt {
        match stmt {
            Stmt::Expr(expr) => BoundStmt::Expr(self.compile_expr(expr)),
            Stmt::Return { value, .. } => BoundStmt::Return(self.compile_expr(value)),
        }
    }

    fn resolve(&mut self, ident: Ident) -> NameBinding {
        let binding = self.chain.resolve(ident.name);
        if let NameBinding::Error(failure) = &binding {
            self.error(failure.code, failure.message.clone(), ident);
        }
        binding
    }

    fn compile_exprs(&mut self, exprs: &[Expr]) -> Vec<BoundExpr> {
        exprs.iter().map(|expr| self.compile_expr(expr)).collect()
    }

    fn compile_expr(&mut self, expr: &Expr) -> BoundExpr {
        match &expr.kind {
            ExprKind::Literal(literal) => BoundExpr::Literal(literal_value(literal)),
            ExprKind::Variable(ident) => BoundExpr::Variable(self.resolve(*ident)),
            ExprKind::Assign { target, value } => {
                let binding = self.resolve(*target);
                if !binding.is_error() && !binding.is_writable() {
                    self.error(
                        ErrorCode::E2002,
                        format!(
                            "cannot assign to {} `{}`",
                            binding.describe(),
                            self.text(target.name)
                        ),
                        *target,
                    );
                }
                BoundExpr::Assign {
                    target: binding,
                    value: Box::new(self.compile_expr(value)),
                }
            }
            ExprKind::Send {
                receiver,
                selector,
                arguments,
            } => {
                let receiver = self.compile_expr(receiver);
                let arguments = self.compile_exprs(arguments);
                match (&receiver, self.super_target) {
                    (
                        BoundExpr::Variable(NameBinding::Special(SpecialBinding::Super)),
                        Some((defining_class, side)),
                    ) => BoundExpr::SuperSend {
                        defining_class,
                        side,
                        selector: selector.name,
                        arguments,
                    },
                    _ => BoundExpr::Send {
                        receiver: Box::new(receiver),
                        selector: selector.name,
                        arguments,
                    },
                }
            }
            ExprKind::Cascade { receiver, messages } => {
                let receiver = self.compile_expr(receiver);
                let super_lookup = match &receiver {
                    BoundExpr::Variable(NameBinding::Special(SpecialBinding::Super)) => {
                        self.super_target
                    }
                    _ => None,
                };
                BoundExpr::Cascade {
                    receiver: Box::new(receiver),
                    messages: messages
                        .iter()
                        .map(|message| BoundMessage {
                            selector: message.selector.name,
                            arguments: self.compile_exprs(&message.arguments),
                        })
                        .collect(),
                    super_lookup,
                }
            }
            ExprKind::Block(block) => BoundExpr::Block(Arc::new(self.compile_block(block))),
        }
    }

    fn compile_block(&mut self, block: &BlockNode) -> BoundBlock {
        BoundBlock {
            body: self.compile_body(&block.arguments, &block.temporaries, &block.statements),
            span: block.span,
        }
    }
}

/// Runtime value of a literal.
pub fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::Integer(n) => Value::Integer(*n),
        Literal::Float(x) => Value::Float(*x),
        Literal::Character(c) => Value::Character(*c),
        Literal::String(s) => Value::string(s),
        Literal::Symbol(name) => Value::Symbol(*name),
        Literal::Array(elements) => Value::array(elements.iter().map(literal_value).collect()),
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
