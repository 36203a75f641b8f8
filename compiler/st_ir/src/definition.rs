//! Definition records handed over by an interchange-file reader.
//!
//! One install batch is an ordered `Vec<Definition>`. The installer never
//! looks at file syntax; it only needs names, the parse trees of bodies, and
//! the span of each definition for error attribution.

use std::sync::Arc;

use crate::{Ident, InitializerNode, MethodNode, Span, Spanned};

/// A `(key, value)` metadata pair attached to a definition.
///
/// Keys starting with [`Annotation::INTERNAL_PREFIX`] are internal to the
/// tooling and are dropped on install unless explicitly requested.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Annotation {
    pub key: String,
    pub value: String,
}

impl Annotation {
    pub const INTERNAL_PREFIX: &'static str = "ist.";

    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Annotation {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn is_internal(&self) -> bool {
        self.key.starts_with(Self::INTERNAL_PREFIX)
    }
}

/// Which dictionary of a class a method belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MethodSide {
    Instance,
    Class,
}

/// `Class named: 'Point' superclass: 'Object' instanceVariableNames: 'x y' ...`
#[derive(Clone, Debug, PartialEq)]
pub struct ClassDefinition {
    pub name: Ident,
    pub superclass: Option<Ident>,
    pub instance_variables: Vec<Ident>,
    pub class_variables: Vec<Ident>,
    pub class_instance_variables: Vec<Ident>,
    pub imported_pools: Vec<Ident>,
    pub annotations: Vec<Annotation>,
    pub span: Span,
}

impl ClassDefinition {
    pub fn new(name: Ident, superclass: Option<Ident>) -> Self {
        ClassDefinition {
            name,
            superclass,
            instance_variables: Vec::new(),
            class_variables: Vec::new(),
            class_instance_variables: Vec::new(),
            imported_pools: Vec::new(),
            annotations: Vec::new(),
            span: name.span,
        }
    }

    #[must_use]
    pub fn with_instance_variables(mut self, names: Vec<Ident>) -> Self {
        self.instance_variables = names;
        self
    }

    #[must_use]
    pub fn with_class_variables(mut self, names: Vec<Ident>) -> Self {
        self.class_variables = names;
        self
    }

    #[must_use]
    pub fn with_class_instance_variables(mut self, names: Vec<Ident>) -> Self {
        self.class_instance_variables = names;
        self
    }

    #[must_use]
    pub fn with_imported_pools(mut self, names: Vec<Ident>) -> Self {
        self.imported_pools = names;
        self
    }

    #[must_use]
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GlobalKind {
    Variable,
    Constant,
}

/// `Global variable: 'Transcript'` / `Global constant: 'Pi'`
#[derive(Clone, Debug, PartialEq)]
pub struct GlobalDefinition {
    pub name: Ident,
    pub kind: GlobalKind,
    pub annotations: Vec<Annotation>,
    pub span: Span,
}

impl GlobalDefinition {
    pub fn new(name: Ident, kind: GlobalKind) -> Self {
        GlobalDefinition {
            name,
            kind,
            annotations: Vec::new(),
            span: name.span,
        }
    }

    #[must_use]
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

/// `Pool named: 'CharacterConstants'`
#[derive(Clone, Debug, PartialEq)]
pub struct PoolDefinition {
    pub name: Ident,
    pub annotations: Vec<Annotation>,
    pub span: Span,
}

impl PoolDefinition {
    pub fn new(name: Ident) -> Self {
        PoolDefinition {
            name,
            annotations: Vec::new(),
            span: name.span,
        }
    }

    #[must_use]
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PoolVariableKind {
    Variable,
    Constant,
}

/// `CharacterConstants variable: 'Tab'` / `... constant: 'Cr'`
#[derive(Clone, Debug, PartialEq)]
pub struct PoolVariableDefinition {
    pub pool: Ident,
    pub name: Ident,
    pub kind: PoolVariableKind,
    pub annotations: Vec<Annotation>,
    pub span: Span,
}

impl PoolVariableDefinition {
    pub fn new(pool: Ident, name: Ident, kind: PoolVariableKind) -> Self {
        PoolVariableDefinition {
            pool,
            name,
            kind,
            annotations: Vec::new(),
            span: pool.span.merge(name.span),
        }
    }

    #[must_use]
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

/// `Point method` / `Point classMethod` followed by the method source.
#[derive(Clone, Debug, PartialEq)]
pub struct MethodDefinition {
    pub class: Ident,
    pub side: MethodSide,
    pub node: Arc<MethodNode>,
    pub annotations: Vec<Annotation>,
    pub span: Span,
}

impl MethodDefinition {
    pub fn new(class: Ident, side: MethodSide, node: MethodNode) -> Self {
        let span = node.span();
        MethodDefinition {
            class,
            side,
            node: Arc::new(node),
            annotations: Vec::new(),
            span,
        }
    }

    #[must_use]
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

/// What an initializer initializes, and where its result goes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InitializerTarget {
    /// Program initializer: runs for effect, `self` is unavailable.
    Program,
    /// Stores its result into the named global variable or constant.
    Global(Ident),
    /// Runs with `self` bound to the class; when `variable` is given the
    /// result is stored into that class variable.
    Class {
        class: Ident,
        variable: Option<Ident>,
    },
    /// Stores its result into a pool variable or pool constant.
    PoolVariable { pool: Ident, variable: Ident },
}

#[derive(Clone, Debug, PartialEq)]
pub struct InitializerDefinition {
    pub target: InitializerTarget,
    pub node: Arc<InitializerNode>,
    pub annotations: Vec<Annotation>,
    pub span: Span,
}

impl InitializerDefinition {
    pub fn new(target: InitializerTarget, node: InitializerNode) -> Self {
        let span = node.span();
        InitializerDefinition {
            target,
            node: Arc::new(node),
            annotations: Vec::new(),
            span,
        }
    }
}

/// Any record an interchange reader can produce.
#[derive(Clone, Debug, PartialEq)]
pub enum Definition {
    Class(ClassDefinition),
    Global(GlobalDefinition),
    Pool(PoolDefinition),
    PoolVariable(PoolVariableDefinition),
    Method(MethodDefinition),
    Initializer(InitializerDefinition),
}

impl Spanned for Definition {
    fn span(&self) -> Span {
        match self {
            Definition::Class(def) => def.span,
            Definition::Global(def) => def.span,
            Definition::Pool(def) => def.span,
            Definition::PoolVariable(def) => def.span,
            Definition::Method(def) => def.span,
            Definition::Initializer(def) => def.span,
        }
    }
}

impl From<ClassDefinition> for Definition {
    fn from(def: ClassDefinition) -> Self {
        Definition::Class(def)
    }
}

impl From<GlobalDefinition> for Definition {
    fn from(def: GlobalDefinition) -> Self {
        Definition::Global(def)
    }
}

impl From<PoolDefinition> for Definition {
    fn from(def: PoolDefinition) -> Self {
        Definition::Pool(def)
    }
}

impl From<PoolVariableDefinition> for Definition {
    fn from(def: PoolVariableDefinition) -> Self {
        Definition::PoolVariable(def)
    }
}

impl From<MethodDefinition> for Definition {
    fn from(def: MethodDefinition) -> Self {
        Definition::Method(def)
    }
}

impl From<InitializerDefinition> for Definition {
    fn from(def: InitializerDefinition) -> Self {
        Definition::Initializer(def)
    }
}
