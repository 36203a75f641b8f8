//! Phases 2-5: global bindings, class and pool objects, shape validation,
//! pool variables.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use st_diagnostic::ErrorCode;
use st_ir::{
    ClassDefinition, GlobalDefinition, GlobalKind, Ident, Name, PoolDefinition,
    PoolVariableDefinition, PoolVariableKind,
};
use st_object::{
    Access, BindingCategory, ClassBinding, ClassLayout, DefineError, NameScope, Pool, PoolBinding,
    SmalltalkClass, Value, ValueBinding,
};

use super::{duplicates, InstallContext, InstallFault};

impl InstallContext<'_, '_> {
    // -----------------------------------------------------------------------
    // Phase 2: global bindings
    // -----------------------------------------------------------------------

    /// Report why `ident` could not be added as a `category`.
    fn report_define_error(&mut self, ident: Ident, category: BindingCategory, err: DefineError) {
        let text = self.text(ident.name);
        match err {
            DefineError::Protected => self.error(
                ErrorCode::E1002,
                ident.span,
                format!("`{text}` is protected and cannot be defined as a {category}"),
            ),
            DefineError::Duplicate(existing) => self.error(
                ErrorCode::E1001,
                ident.span,
                format!("`{text}` is already defined as a {existing} in this batch"),
            ),
            DefineError::DifferentKind(existing) => self.error(
                ErrorCode::E1005,
                ident.span,
                format!("`{text}` is already defined as a {existing} and cannot become a {category}"),
            ),
        }
    }

    /// Run the name checks and `add`; keep the definition when both pass.
    fn define(
        &mut self,
        ident: Ident,
        category: BindingCategory,
        add: impl FnOnce(&mut NameScope) -> Result<(), DefineError>,
    ) -> bool {
        if !self.check_name(ident, &category.to_string()) {
            return false;
        }
        match add(&mut self.working) {
            Ok(()) => true,
            Err(err) => {
                self.report_define_error(ident, category, err);
                false
            }
        }
    }

    pub(super) fn create_class_bindings(
        &mut self,
        definitions: Vec<ClassDefinition>,
    ) -> Vec<ClassDefinition> {
        definitions
            .into_iter()
            .filter(|def| {
                let name = def.name.name;
                self.define(def.name, BindingCategory::Class, |scope| {
                    scope.add_class_binding(Arc::new(ClassBinding::constant(name)))
                })
            })
            .collect()
    }

    /// A redefined global keeps its cell, so code compiled against it stays
    /// connected. A variable keeps its value too; a constant is reset once
    /// the batch commits.
    pub(super) fn create_global_bindings(
        &mut self,
        definitions: Vec<GlobalDefinition>,
    ) -> Vec<GlobalDefinition> {
        definitions
            .into_iter()
            .filter(|def| {
                let name = def.name.name;
                let access = match def.kind {
                    GlobalKind::Variable => Access::Writable,
                    GlobalKind::Constant => Access::Constant,
                };
                let existing = self
                    .working
                    .outer()
                    .and_then(|outer| outer.get_global_variable_or_constant_binding(name))
                    .filter(|binding| binding.access() == access);
                let binding = existing
                    .clone()
                    .unwrap_or_else(|| Arc::new(ValueBinding::new(name, access)));
                let defined = match def.kind {
                    GlobalKind::Variable => {
                        self.define(def.name, BindingCategory::GlobalVariable, |scope| {
                            scope.add_global_variable_binding(binding)
                        })
                    }
                    GlobalKind::Constant => {
                        self.define(def.name, BindingCategory::GlobalConstant, |scope| {
                            scope.add_global_constant_binding(binding)
                        })
                    }
                };
                if defined && access == Access::Constant {
                    if let Some(existing) = existing {
                        self.shared_cells.resets.push(existing);
                    }
                }
                defined
            })
            .collect()
    }

    pub(super) fn create_pool_bindings(
        &mut self,
        definitions: Vec<PoolDefinition>,
    ) -> Vec<PoolDefinition> {
        definitions
            .into_iter()
            .filter(|def| {
                let name = def.name.name;
                self.define(def.name, BindingCategory::Pool, |scope| {
                    scope.add_pool_binding(Arc::new(PoolBinding::constant(name)))
                })
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Phase 3: global objects
    // -----------------------------------------------------------------------

    /// Populate pool bindings. A redefined pool keeps its variables.
    pub(super) fn create_pools(&mut self, definitions: &[PoolDefinition]) -> Result<(), InstallFault> {
        for def in definitions {
            let name = def.name.name;
            let mut pool = Pool::new(name);
            if let Some(existing) = self.working.outer().and_then(|outer| outer.get_pool(name)) {
                pool.variables = existing.variables.clone();
            }
            let binding = self
                .working
                .get_local_pool_binding(name)
                .ok_or(InstallFault::MissingBinding { name })?;
            binding.set(Arc::new(pool))?;
        }
        Ok(())
    }

    /// Populate class bindings, superclasses before subclasses.
    ///
    /// Returns the definitions whose class was created. A class whose
    /// superclass failed is dropped without a second diagnostic.
    pub(super) fn create_classes(
        &mut self,
        definitions: Vec<ClassDefinition>,
    ) -> Result<Vec<ClassDefinition>, InstallFault> {
        let mut created = Vec::with_capacity(definitions.len());
        let mut failed = FxHashSet::default();
        let mut remaining = definitions;

        while !remaining.is_empty() {
            let waiting: FxHashSet<Name> = remaining.iter().map(|def| def.name.name).collect();
            let (ready, blocked): (Vec<_>, Vec<_>) = remaining.into_iter().partition(|def| {
                !def
                    .superclass
                    .is_some_and(|superclass| waiting.contains(&superclass.name))
            });

            if ready.is_empty() {
                for def in &blocked {
                    self.error(
                        ErrorCode::E3006,
                        def.superclass.map_or(def.name.span, |s| s.span),
                        format!(
                            "the superclass chain of `{}` is circular",
                            self.text(def.name.name)
                        ),
                    );
                }
                break;
            }

            for def in ready {
                let superclass_failed = def
                    .superclass
                    .is_some_and(|superclass| failed.contains(&superclass.name));
                if !superclass_failed && self.create_class(&def)? {
                    created.push(def);
                } else {
                    failed.insert(def.name.name);
                }
            }
            remaining = blocked;
        }
        Ok(created)
    }

    fn create_class(&mut self, def: &ClassDefinition) -> Result<bool, InstallFault> {
        let name = def.name.name;

        let superclass = match def.superclass {
            None => None,
            Some(ident) => match self.working.get_class(ident.name) {
                Some(class) => Some(class),
                None => {
                    let message = match self.working.category_of(ident.name) {
                        Some(category) if category != BindingCategory::Class => format!(
                            "`{}` is a {category}, not a class",
                            self.text(ident.name)
                        ),
                        _ => format!("unknown superclass `{}`", self.text(ident.name)),
                    };
                    self.error(ErrorCode::E3003, ident.span, message);
                    return Ok(false);
                }
            },
        };

        // The class being defined is still unset here, so a loop through
        // already installed classes shows up as a superclass naming it.
        if let (Some(superclass), Some(ident)) = (&superclass, def.superclass) {
            let circular = self
                .working
                .superclass_chain(superclass.name)
                .any(|c| c.name == name || c.superclass == Some(name));
            if circular {
                self.error(
                    ErrorCode::E3006,
                    ident.span,
                    format!("the superclass chain of `{}` is circular", self.text(name)),
                );
                return Ok(false);
            }
        }

        let mut ok = true;
        for pool in &def.imported_pools {
            if self.working.get_pool(pool.name).is_none() {
                self.error(
                    ErrorCode::E3004,
                    pool.span,
                    format!("unknown pool `{}`", self.text(pool.name)),
                );
                ok = false;
            }
        }
        for pool in duplicates(&def.imported_pools) {
            self.error(
                ErrorCode::E3011,
                pool.span,
                format!("pool `{}` is imported more than once", self.text(pool.name)),
            );
            ok = false;
        }
        for list in [
            &def.instance_variables,
            &def.class_variables,
            &def.class_instance_variables,
        ] {
            for ident in list {
                ok &= self.check_name(*ident, "variable");
            }
            for ident in duplicates(list) {
                self.error(
                    ErrorCode::E3005,
                    ident.span,
                    format!("variable `{}` is declared twice", self.text(ident.name)),
                );
                ok = false;
            }
        }
        if !ok {
            return Ok(false);
        }

        let existing = self.working.outer().and_then(|outer| outer.get_class(name));

        let mut class = SmalltalkClass::new(name, superclass.as_ref().map(|s| s.name));
        class.instance_variables = names(&def.instance_variables);
        class.class_instance_variables = names(&def.class_instance_variables);
        class.imported_pools = names(&def.imported_pools);
        class.class_variables = def
            .class_variables
            .iter()
            .map(|ident| {
                let binding = existing
                    .as_ref()
                    .and_then(|old| old.class_variables.get(&ident.name).cloned())
                    .unwrap_or_else(|| Arc::new(ValueBinding::writable(ident.name)));
                (ident.name, binding)
            })
            .collect();

        let layout = ClassLayout::derive(
            superclass.as_ref().map(|s| &s.layout),
            &class.instance_variables,
            &class.class_instance_variables,
        );
        let class = match existing {
            Some(old) => {
                class.instance_methods = old.instance_methods.clone();
                class.class_methods = old.class_methods.clone();
                class.layout = old.layout.clone();
                class.class_instance_storage = Arc::clone(&old.class_instance_storage);
                class.relaid_out(layout)
            }
            None => {
                class
                    .class_instance_storage
                    .write()
                    .resize(layout.class_instance_variables.len(), Value::Nil);
                class.layout = layout;
                class
            }
        };

        let binding = self
            .working
            .get_local_class_binding(name)
            .ok_or(InstallFault::MissingBinding { name })?;
        binding.set(Arc::new(class))?;
        tracing::trace!(class = self.text(name), "class created");
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Phase 4: shape validation
    // -----------------------------------------------------------------------

    /// Disjointness rules between the variable kinds of each class, and no
    /// redeclaration of inherited variables.
    pub(super) fn validate_classes(&mut self, definitions: &[ClassDefinition]) {
        for def in definitions {
            let class_variables: FxHashSet<Name> =
                def.class_variables.iter().map(|i| i.name).collect();

            for ident in &def.instance_variables {
                if class_variables.contains(&ident.name) {
                    self.error(
                        ErrorCode::E3001,
                        ident.span,
                        format!(
                            "`{}` is both an instance variable and a class variable",
                            self.text(ident.name)
                        ),
                    );
                }
            }
            for ident in &def.class_instance_variables {
                if class_variables.contains(&ident.name) {
                    self.error(
                        ErrorCode::E3002,
                        ident.span,
                        format!(
                            "`{}` is both a class variable and a class-instance variable",
                            self.text(ident.name)
                        ),
                    );
                }
            }

            let Some(superclass) = def.superclass else {
                continue;
            };
            let inherited = self.inherited_variables(superclass.name);
            for ident in def
                .instance_variables
                .iter()
                .chain(&def.class_variables)
                .chain(&def.class_instance_variables)
            {
                if let Some(kind) = inherited.get(&ident.name).copied() {
                    self.error(
                        ErrorCode::E3010,
                        ident.span,
                        format!(
                            "`{}` redefines an inherited {kind}",
                            self.text(ident.name)
                        ),
                    );
                }
            }
        }

        self.validate_existing_subclasses(definitions);
    }

    /// Installed subclasses outside the batch must not declare a variable
    /// that a redefined ancestor now declares.
    fn validate_existing_subclasses(&mut self, definitions: &[ClassDefinition]) {
        let batch: FxHashSet<Name> = definitions.iter().map(|def| def.name.name).collect();
        let mut visited = FxHashSet::default();

        for def in definitions {
            let redefined = self
                .working
                .outer()
                .is_some_and(|outer| outer.get_class(def.name.name).is_some());
            if !redefined {
                continue;
            }
            let mut pending = self.working.direct_subclasses(def.name.name);
            while let Some(name) = pending.pop() {
                if batch.contains(&name) || !visited.insert(name) {
                    continue;
                }
                pending.extend(self.working.direct_subclasses(name));
                let Some(class) = self.working.get_class(name) else {
                    continue;
                };
                let Some(superclass) = class.superclass else {
                    continue;
                };
                let inherited = self.inherited_variables(superclass);
                let own = class
                    .instance_variables
                    .iter()
                    .chain(class.class_variables.keys())
                    .chain(&class.class_instance_variables);
                for variable in own {
                    if let Some(kind) = inherited.get(variable).copied() {
                        self.error(
                            ErrorCode::E3010,
                            def.name.span,
                            format!(
                                "`{}` would make subclass `{}` redefine an inherited {kind} `{}`",
                                self.text(def.name.name),
                                self.text(name),
                                self.text(*variable)
                            ),
                        );
                    }
                }
            }
        }
    }

    /// Every variable declared by `class` or its superclasses, by kind.
    fn inherited_variables(&self, class: Name) -> FxHashMap<Name, &'static str> {
        let mut inherited = FxHashMap::default();
        for ancestor in self.working.superclass_chain(class) {
            for &name in &ancestor.instance_variables {
                inherited.insert(name, "instance variable");
            }
            for &name in &ancestor.class_instance_variables {
                inherited.insert(name, "class-instance variable");
            }
            for &name in ancestor.class_variables.keys() {
                inherited.insert(name, "class variable");
            }
        }
        inherited
    }

    // -----------------------------------------------------------------------
    // Phase 5: pool variables
    // -----------------------------------------------------------------------

    /// Add pool variables and constants. A name redefined with the same
    /// kind keeps its cell; a kept constant is reset once the batch commits.
    pub(super) fn create_pool_variable_bindings(
        &mut self,
        definitions: Vec<PoolVariableDefinition>,
    ) -> Vec<PoolVariableDefinition> {
        let mut seen = FxHashSet::default();
        definitions
            .into_iter()
            .filter(|def| {
                let Some(pool) = self.working.get_pool(def.pool.name) else {
                    self.error(
                        ErrorCode::E3008,
                        def.pool.span,
                        format!("unknown pool `{}`", self.text(def.pool.name)),
                    );
                    return false;
                };
                if !self.check_name(def.name, "pool variable") {
                    return false;
                }
                if !seen.insert((def.pool.name, def.name.name)) {
                    self.error(
                        ErrorCode::E1001,
                        def.name.span,
                        format!(
                            "`{}` is already defined in pool `{}`",
                            self.text(def.name.name),
                            self.text(def.pool.name)
                        ),
                    );
                    return false;
                }

                let access = match def.kind {
                    PoolVariableKind::Variable => Access::Writable,
                    PoolVariableKind::Constant => Access::Constant,
                };
                match pool.variable(def.name.name) {
                    Some(old) if old.access() == access => {
                        if access == Access::Constant {
                            self.shared_cells.resets.push(Arc::clone(old));
                        }
                    }
                    _ => {
                        let binding = Arc::new(ValueBinding::new(def.name.name, access));
                        self.working.replace_pool(pool.with_variable(binding));
                    }
                }
                true
            })
            .collect()
    }
}

fn names(idents: &[Ident]) -> Vec<Name> {
    idents.iter().map(|ident| ident.name).collect()
}
