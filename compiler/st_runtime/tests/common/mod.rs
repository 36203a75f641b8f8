//! Source builders shared by the runtime integration tests.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use st_ir::{
    BlockNode, ClassDefinition, Definition, Expr, Ident, InitializerDefinition, InitializerNode,
    InitializerTarget, MethodDefinition, MethodNode, MethodSide, Span, Stmt,
};
use st_runtime::{Diagnostic, DiagnosticConfig, DiagnosticQueue, ErrorCode, Runtime};

pub struct Src<'r> {
    pub rt: &'r Runtime,
}

impl<'r> Src<'r> {
    pub fn new(rt: &'r Runtime) -> Self {
        Src { rt }
    }

    pub fn id(&self, text: &str) -> Ident {
        Ident::synthetic(self.rt.interner().intern(text))
    }

    /// Identifier with a real span, for checking diagnostic positions.
    pub fn at(&self, text: &str, start: u32) -> Ident {
        let stop = start + u32::try_from(text.len()).unwrap();
        Ident::new(self.rt.interner().intern(text), Span::new(start, stop))
    }

    pub fn ids(&self, texts: &[&str]) -> Vec<Ident> {
        texts.iter().map(|text| self.id(text)).collect()
    }

    pub fn var(&self, text: &str) -> Expr {
        Expr::variable(self.id(text))
    }

    pub fn send(&self, receiver: Expr, selector: &str, arguments: Vec<Expr>) -> Expr {
        Expr::send(receiver, self.id(selector), arguments)
    }

    pub fn assign(&self, target: &str, value: Expr) -> Expr {
        Expr::assign(self.id(target), value)
    }

    pub fn block(&self, arguments: &[&str], statements: Vec<Stmt>) -> Expr {
        Expr::block(BlockNode {
            arguments: self.ids(arguments),
            temporaries: Vec::new(),
            statements,
            span: Span::DUMMY,
        })
    }

    pub fn class(&self, name: &str, superclass: Option<&str>) -> ClassDefinition {
        ClassDefinition::new(self.id(name), superclass.map(|s| self.id(s)))
    }

    /// Method `selector` with `arguments` on `side` of `class`.
    pub fn method(
        &self,
        class: &str,
        side: MethodSide,
        selector: &str,
        arguments: &[&str],
        statements: Vec<Stmt>,
    ) -> MethodDefinition {
        let node = MethodNode::new(self.id(selector), self.ids(arguments)).with_statements(statements);
        MethodDefinition::new(self.id(class), side, node)
    }

    /// Instance method answering `expr`.
    pub fn answer(&self, class: &str, selector: &str, expr: Expr) -> Definition {
        self.method(class, MethodSide::Instance, selector, &[], vec![Stmt::ret(expr)])
            .into()
    }

    pub fn initializer(&self, target: InitializerTarget, statements: Vec<Stmt>) -> Definition {
        InitializerDefinition::new(target, InitializerNode::new(statements)).into()
    }
}

pub fn install(rt: &Runtime, definitions: Vec<Definition>) -> (bool, Vec<Diagnostic>) {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig::unlimited());
    let committed = rt.install(definitions, &mut queue);
    (committed, queue.flush())
}

pub fn codes(diagnostics: &[Diagnostic]) -> Vec<ErrorCode> {
    diagnostics.iter().map(|d| d.code).collect()
}

/// Install a batch that must commit cleanly.
pub fn install_ok(rt: &Runtime, definitions: Vec<Definition>) {
    let (committed, diagnostics) = install(rt, definitions);
    assert!(committed, "batch rejected: {diagnostics:#?}");
    assert!(diagnostics.is_empty(), "{diagnostics:#?}");
}
