//! Phase 8: attach annotations.
//!
//! Binding cells of redefined globals and pool variables are shared with
//! the live scope, so their annotation lists are replaced only after the
//! commit.

use std::sync::Arc;

use st_ir::{ClassDefinition, GlobalDefinition, MethodDefinition, PoolDefinition, PoolVariableDefinition};
use st_object::{CompiledInitializer, CompiledMethod, Pool};

use super::bodies::InstalledInitializer;
use super::{InstallContext, InstallFault};

impl InstallContext<'_, '_> {
    pub(super) fn add_class_annotations(
        &mut self,
        definitions: &[ClassDefinition],
    ) -> Result<(), InstallFault> {
        for def in definitions {
            let name = def.name.name;
            let class = self
                .working
                .get_class(name)
                .ok_or(InstallFault::UnpopulatedClass { name })?;
            let mut class = (*class).clone();
            class.annotations = self.visible_annotations(&def.annotations);
            self.working.replace_class(class);
        }
        Ok(())
    }

    pub(super) fn add_global_annotations(&mut self, definitions: &[GlobalDefinition]) {
        for def in definitions {
            let annotations = self.visible_annotations(&def.annotations);
            if let Some(binding) = self
                .working
                .get_local_global_variable_or_constant_binding(def.name.name)
            {
                self.shared_cells.annotations.push((binding, annotations));
            }
        }
    }

    pub(super) fn add_pool_annotations(
        &mut self,
        pools: &[PoolDefinition],
        variables: &[PoolVariableDefinition],
    ) {
        for def in pools {
            if let Some(pool) = self.working.get_pool(def.name.name) {
                let pool = Pool {
                    annotations: self.visible_annotations(&def.annotations),
                    ..(*pool).clone()
                };
                self.working.replace_pool(pool);
            }
        }
        for def in variables {
            let annotations = self.visible_annotations(&def.annotations);
            let binding = self
                .working
                .get_pool(def.pool.name)
                .and_then(|pool| pool.variable(def.name.name).cloned());
            if let Some(binding) = binding {
                self.shared_cells.annotations.push((binding, annotations));
            }
        }
    }

    pub(super) fn add_method_annotations(
        &mut self,
        definitions: &[MethodDefinition],
    ) -> Result<(), InstallFault> {
        for def in definitions {
            let annotations = self.visible_annotations(&def.annotations);
            if annotations.is_empty() {
                continue;
            }
            let name = def.class.name;
            let class = self
                .working
                .get_class(name)
                .ok_or(InstallFault::UnpopulatedClass { name })?;
            let Some(method) = class.methods(def.side).get(def.node.selector.name) else {
                continue;
            };
            let method = CompiledMethod {
                annotations,
                ..(**method).clone()
            };
            self.working.replace_class(class.with_method(Arc::new(method)));
        }
        Ok(())
    }

    pub(super) fn add_initializer_annotations(&mut self, installed: &[InstalledInitializer]) {
        for entry in installed {
            let annotations = self.visible_annotations(&entry.annotations);
            if annotations.is_empty() {
                continue;
            }
            let initializer = CompiledInitializer {
                annotations,
                ..(*entry.initializer).clone()
            };
            self.working
                .replace_initializer(entry.index, Arc::new(initializer));
        }
    }
}
