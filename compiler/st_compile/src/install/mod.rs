//! Definition batches -> live name scope.
//!
//! An install runs strictly ordered phases. Each phase handles every
//! pending definition of its kind before the next one starts, so a phase
//! may assume the previous one is complete across the whole batch:
//!
//! 1. snapshot the live scope into a working extension scope
//! 2. create unset bindings for classes, globals and pools
//! 3. populate class and pool objects
//! 4. validate class shapes
//! 5. add pool variables
//! 6. compile every method and initializer body (dry run)
//! 7. install compiled methods and initializers
//! 8. attach annotations
//! 9. commit the flattened working scope with one atomic store, then
//!    apply the edits to cells the old live scope shares
//! 10. recompile classes whose shape or imported pools may have changed
//!
//! A definition that fails an early phase is dropped from later ones while
//! the rest of the batch keeps going, so one call reports every problem.
//! Any error reported in phases 2-8 prevents the commit: the live scope is
//! then exactly what it was before the call.

mod annotations;
mod bodies;
mod globals;
mod recompile;

use std::sync::Arc;

use arc_swap::ArcSwap;
use rustc_hash::FxHashSet;
use st_diagnostic::{Diagnostic, ErrorCode, ErrorSink};
use st_ir::{
    lexical::is_identifier, Annotation, ClassDefinition, Definition, GlobalDefinition, Ident,
    InitializerDefinition, MethodDefinition, Name, PoolDefinition, PoolVariableDefinition, Span,
    StringInterner,
};
use st_object::{BindingError, NameScope, ValueBinding};

use crate::{CodeGenerator, Compiler};

/// Knobs for one installer.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct InstallOptions {
    /// Keep annotations whose key starts with `ist.`.
    pub include_internal_annotations: bool,
    /// Run phase 10 after a commit.
    pub recompile: bool,
}

impl Default for InstallOptions {
    fn default() -> Self {
        InstallOptions {
            include_internal_annotations: false,
            recompile: true,
        }
    }
}

/// Internal-consistency violation. Expected problems are diagnostics;
/// these mean the installer's own bookkeeping is broken.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InstallFault {
    #[error("no binding was created for {name:?}")]
    MissingBinding { name: Name },
    #[error("class {name:?} was never populated")]
    UnpopulatedClass { name: Name },
    #[error(transparent)]
    Binding(#[from] BindingError),
}

/// Installs definition batches through a code generator.
pub struct Installer<'a> {
    interner: &'a StringInterner,
    codegen: &'a dyn CodeGenerator,
    options: InstallOptions,
}

impl<'a> Installer<'a> {
    pub fn new(interner: &'a StringInterner, codegen: &'a dyn CodeGenerator) -> Self {
        Installer {
            interner,
            codegen,
            options: InstallOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: InstallOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &InstallOptions {
        &self.options
    }

    /// Install `definitions` into `live`.
    ///
    /// Returns `Ok(true)` when the batch was committed and `Ok(false)` when
    /// errors were reported and `live` was left untouched. Callers must not
    /// run two installs against the same `live` concurrently.
    #[tracing::instrument(level = "debug", skip_all, fields(definitions = definitions.len()))]
    pub fn install(
        &self,
        live: &ArcSwap<NameScope>,
        definitions: Vec<Definition>,
        sink: &mut dyn ErrorSink,
    ) -> Result<bool, InstallFault> {
        let batch = Batch::split(definitions);

        // Phase 1: snapshot
        let snapshot = live.load_full();
        let mut cx = InstallContext::new(self, NameScope::extension(snapshot), sink);

        // Phase 2: create global bindings
        let classes = cx.create_class_bindings(batch.classes);
        let globals = cx.create_global_bindings(batch.globals);
        let pools = cx.create_pool_bindings(batch.pools);
        tracing::debug!(
            classes = classes.len(),
            globals = globals.len(),
            pools = pools.len(),
            "global bindings complete"
        );

        // Phase 3: create global objects
        cx.create_pools(&pools)?;
        let classes = cx.create_classes(classes)?;
        tracing::debug!("global objects complete");

        // Phase 4: validate global objects
        cx.validate_classes(&classes);

        // Phase 5: pool variables
        let pool_variables = cx.create_pool_variable_bindings(batch.pool_variables);
        tracing::debug!("validation of global objects complete");

        // Phase 6: validate methods and initializers
        let methods = cx.validate_methods(batch.methods);
        let initializers = cx.validate_initializers(batch.initializers);
        tracing::debug!(
            methods = methods.len(),
            initializers = initializers.len(),
            "body validation complete"
        );

        // Phase 7: create methods and initializers
        let methods = cx.create_methods(methods)?;
        let initializers = cx.create_initializers(initializers);

        if cx.failed {
            tracing::debug!("errors reported; live scope left unchanged");
            return Ok(false);
        }

        // Phase 8: annotations
        cx.add_class_annotations(&classes)?;
        cx.add_global_annotations(&globals);
        cx.add_pool_annotations(&pools, &pool_variables);
        cx.add_method_annotations(&methods)?;
        cx.add_initializer_annotations(&initializers);

        // Phase 9: commit
        let committed = Arc::new(cx.working.flatten());
        live.store(Arc::clone(&committed));
        std::mem::take(&mut cx.shared_cells).apply();
        tracing::debug!("batch committed");

        // Phase 10: recompile
        if self.options.recompile {
            let touched_pools: FxHashSet<Name> = pools
                .iter()
                .map(|def| def.name.name)
                .chain(pool_variables.iter().map(|def| def.pool.name))
                .collect();
            let roots = recompile::roots(&committed, &classes, &touched_pools);
            let recompiled = cx.recompile_classes(&committed, &roots)?;
            live.store(Arc::new(recompiled));
            tracing::debug!(roots = roots.len(), "recompilation complete");
        }

        Ok(true)
    }
}

/// A batch split by definition kind, each list in source order.
#[derive(Default)]
struct Batch {
    classes: Vec<ClassDefinition>,
    globals: Vec<GlobalDefinition>,
    pools: Vec<PoolDefinition>,
    pool_variables: Vec<PoolVariableDefinition>,
    methods: Vec<MethodDefinition>,
    initializers: Vec<InitializerDefinition>,
}

impl Batch {
    fn split(definitions: Vec<Definition>) -> Self {
        let mut batch = Batch::default();
        for definition in definitions {
            match definition {
                Definition::Class(def) => batch.classes.push(def),
                Definition::Global(def) => batch.globals.push(def),
                Definition::Pool(def) => batch.pools.push(def),
                Definition::PoolVariable(def) => batch.pool_variables.push(def),
                Definition::Method(def) => batch.methods.push(def),
                Definition::Initializer(def) => batch.initializers.push(def),
            }
        }
        batch
    }
}

/// State shared by the phases of one install.
struct InstallContext<'a, 's> {
    interner: &'a StringInterner,
    compiler: Compiler<'a>,
    codegen: &'a dyn CodeGenerator,
    options: &'a InstallOptions,
    /// Extension of the live snapshot; only this install mutates it.
    working: NameScope,
    sink: &'s mut dyn ErrorSink,
    /// Set once anything has been reported.
    failed: bool,
    /// Cells shared with the live scope, edited only once the batch commits.
    shared_cells: SharedCellEdits,
}

/// Edits to binding cells that the live scope already holds.
#[derive(Default)]
struct SharedCellEdits {
    /// Redefined constants that keep their cell and must accept a new value.
    resets: Vec<Arc<ValueBinding>>,
    annotations: Vec<(Arc<ValueBinding>, Vec<Annotation>)>,
}

impl SharedCellEdits {
    fn apply(self) {
        for binding in self.resets {
            binding.reset();
        }
        for (binding, annotations) in self.annotations {
            binding.set_annotations(annotations);
        }
    }
}

impl<'a, 's> InstallContext<'a, 's> {
    fn new(installer: &'a Installer<'a>, working: NameScope, sink: &'s mut dyn ErrorSink) -> Self {
        InstallContext {
            interner: installer.interner,
            compiler: Compiler::new(installer.interner),
            codegen: installer.codegen,
            options: &installer.options,
            working,
            sink,
            failed: false,
            shared_cells: SharedCellEdits::default(),
        }
    }

    fn text(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        self.failed |= diagnostic.is_error();
        self.sink.report(diagnostic);
    }

    fn error(&mut self, code: ErrorCode, span: Span, message: String) {
        self.report(
            Diagnostic::error(code)
                .with_message(message)
                .with_label(span, code.description()),
        );
    }

    /// Lexical checks every defined name goes through: a well-formed
    /// identifier that is neither reserved nor protected.
    fn check_name(&mut self, ident: Ident, what: &str) -> bool {
        let text = self.text(ident.name);
        if !is_identifier(text) {
            self.error(
                ErrorCode::E1003,
                ident.span,
                format!("`{text}` is not a valid {what} name"),
            );
            false
        } else if self.compiler.well_known().is_reserved(ident.name)
            || self.working.is_protected_name(ident.name)
        {
            self.error(
                ErrorCode::E1002,
                ident.span,
                format!("`{text}` is protected and cannot be defined as a {what}"),
            );
            false
        } else {
            true
        }
    }

    /// Annotations that survive the internal-key filter.
    fn visible_annotations(&self, annotations: &[Annotation]) -> Vec<Annotation> {
        annotations
            .iter()
            .filter(|a| self.options.include_internal_annotations || !a.is_internal())
            .cloned()
            .collect()
    }
}

/// Names reported as duplicates within one list.
fn duplicates(idents: &[Ident]) -> Vec<Ident> {
    let mut seen = FxHashSet::default();
    idents
        .iter()
        .filter(|ident| !seen.insert(ident.name))
        .copied()
        .collect()
}
