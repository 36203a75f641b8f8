//! Phase 10: recompile classes whose shape may have changed.
//!
//! Runs after the commit, against the committed scope. Each root class
//! (a batch class, or a class importing a pool the batch touched) is
//! recompiled, then every class below it, superclasses before
//! subclasses, so a subclass always sees its superclass's final layout.
//! A method that no longer compiles is removed and reported; nothing is
//! rolled back.

use std::collections::VecDeque;
use std::sync::Arc;

use rustc_hash::FxHashSet;
use st_diagnostic::{Diagnostic, ErrorCode};
use st_ir::{ClassDefinition, MethodSide, Name};
use st_object::{ClassLayout, CompiledMethod, NameScope, SmalltalkClass};

use super::{InstallContext, InstallFault};

/// Classes to recompile: batch classes and importers of `pools`, minus
/// any class that is a subclass of another candidate.
pub(super) fn roots(
    scope: &NameScope,
    batch: &[ClassDefinition],
    pools: &FxHashSet<Name>,
) -> Vec<Name> {
    let mut candidates: Vec<Name> = batch.iter().map(|def| def.name.name).collect();
    if !pools.is_empty() {
        for name in scope.class_names() {
            let imports_pool = scope
                .get_class(name)
                .is_some_and(|class| class.imported_pools.iter().any(|pool| pools.contains(pool)));
            if imports_pool && !candidates.contains(&name) {
                candidates.push(name);
            }
        }
    }
    let names: FxHashSet<Name> = candidates.iter().copied().collect();
    candidates
        .into_iter()
        .filter(|&name| {
            !scope
                .superclass_chain(name)
                .skip(1)
                .any(|ancestor| names.contains(&ancestor.name))
        })
        .collect()
}

impl InstallContext<'_, '_> {
    /// Recompile `roots` and all of their subclasses; returns the scope to
    /// publish.
    #[tracing::instrument(level = "debug", skip_all, fields(roots = roots.len()))]
    pub(super) fn recompile_classes(
        &mut self,
        committed: &Arc<NameScope>,
        roots: &[Name],
    ) -> Result<NameScope, InstallFault> {
        let mut scope = committed.copy();
        let mut queue: VecDeque<Name> = roots.iter().copied().collect();
        let mut visited = FxHashSet::default();

        while let Some(name) = queue.pop_front() {
            if !visited.insert(name) {
                continue;
            }
            let class = self.recompile_class(&scope, name)?;
            scope.replace_class(class);
            queue.extend(scope.direct_subclasses(name));
        }
        Ok(scope)
    }

    fn recompile_class(&mut self, scope: &NameScope, name: Name) -> Result<SmalltalkClass, InstallFault> {
        let class = scope
            .get_class(name)
            .ok_or(InstallFault::UnpopulatedClass { name })?;
        let inherited = class
            .superclass
            .and_then(|superclass| scope.get_class(superclass))
            .map(|superclass| superclass.layout.clone());
        let layout = ClassLayout::derive(
            inherited.as_ref(),
            &class.instance_variables,
            &class.class_instance_variables,
        );
        let shape = if layout == class.layout {
            Arc::clone(&class)
        } else {
            Arc::new(class.relaid_out(layout))
        };

        let mut recompiled = (*shape).clone();
        for side in [MethodSide::Instance, MethodSide::Class] {
            for method in shape.methods(side).iter() {
                let result = self.compiler.compile_method(
                    scope,
                    &shape,
                    side,
                    &method.node,
                    &mut *self.sink,
                );
                match result {
                    Ok(bound) => {
                        let method = CompiledMethod {
                            executable: self.codegen.generate_method(&bound),
                            ..(**method).clone()
                        };
                        recompiled.methods_mut(side).insert(Arc::new(method));
                    }
                    Err(_) => {
                        let selector = self.text(method.selector);
                        let class_name = self.text(name);
                        tracing::warn!(class = class_name, selector, "method dropped on recompile");
                        recompiled.methods_mut(side).remove(method.selector);
                        self.sink.report(
                            Diagnostic::error(ErrorCode::E5001)
                                .with_message(format!(
                                    "`{class_name}>>{selector}` no longer compiles and was removed"
                                ))
                                .with_label(method.node.span, ErrorCode::E5001.description()),
                        );
                    }
                }
            }
        }
        Ok(recompiled)
    }
}
