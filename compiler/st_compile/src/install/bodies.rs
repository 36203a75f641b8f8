//! Phases 6-7: compile every body, then install what compiled.

use std::sync::Arc;

use st_diagnostic::ErrorCode;
use st_ir::{
    Annotation, Ident, InitializerDefinition, InitializerTarget, MethodDefinition, MethodSide,
};
use st_object::{
    BindingCategory, CompiledInitializer, CompiledMethod, InitializerType, SmalltalkClass, Value,
    ValueBinding,
};

use super::{InstallContext, InstallFault};
use crate::{BoundInitializer, BoundMethod};

/// A method body that passed phase 6.
pub(super) struct ValidMethod {
    pub(super) definition: MethodDefinition,
    pub(super) bound: BoundMethod,
}

/// An initializer that passed phase 6, with its target resolved.
pub(super) struct ValidInitializer {
    pub(super) definition: InitializerDefinition,
    pub(super) kind: InitializerType,
    pub(super) target: Option<Arc<ValueBinding>>,
    pub(super) receiver: Value,
    pub(super) bound: BoundInitializer,
}

/// An initializer added to the working scope in phase 7.
pub(super) struct InstalledInitializer {
    /// Position in the working scope's own initializer list.
    pub(super) index: usize,
    pub(super) initializer: Arc<CompiledInitializer>,
    pub(super) annotations: Vec<Annotation>,
}

/// Resolved target of an initializer definition.
struct Target {
    kind: InitializerType,
    class: Option<Arc<SmalltalkClass>>,
    binding: Option<Arc<ValueBinding>>,
}

fn side_name(side: MethodSide) -> &'static str {
    match side {
        MethodSide::Instance => "instance",
        MethodSide::Class => "class",
    }
}

impl InstallContext<'_, '_> {
    // -----------------------------------------------------------------------
    // Phase 6: dry-run compilation
    // -----------------------------------------------------------------------

    fn class_for(&mut self, ident: Ident) -> Option<Arc<SmalltalkClass>> {
        if let Some(class) = self.working.get_class(ident.name) {
            return Some(class);
        }
        let text = self.text(ident.name);
        let message = match self.working.category_of(ident.name) {
            Some(BindingCategory::Class) => {
                format!("class `{text}` failed to install")
            }
            Some(category) => format!("`{text}` is a {category}, not a class"),
            None => format!("unknown class `{text}`"),
        };
        self.error(ErrorCode::E3007, ident.span, message);
        None
    }

    pub(super) fn validate_methods(&mut self, definitions: Vec<MethodDefinition>) -> Vec<ValidMethod> {
        let mut valid = Vec::with_capacity(definitions.len());
        for definition in definitions {
            let Some(class) = self.class_for(definition.class) else {
                continue;
            };
            let result = self.compiler.compile_method(
                &self.working,
                &class,
                definition.side,
                &definition.node,
                &mut *self.sink,
            );
            match result {
                Ok(bound) => valid.push(ValidMethod { definition, bound }),
                Err(_) => {
                    self.error(
                        ErrorCode::E4001,
                        definition.span,
                        format!(
                            "{} method `{}` of `{}` does not compile",
                            side_name(definition.side),
                            self.text(definition.node.selector.name),
                            self.text(class.name)
                        ),
                    );
                }
            }
        }
        valid
    }

    fn resolve_target(&mut self, target: &InitializerTarget) -> Option<Target> {
        match target {
            InitializerTarget::Program => Some(Target {
                kind: InitializerType::Program,
                class: None,
                binding: None,
            }),
            InitializerTarget::Global(ident) => {
                let Some(binding) = self.working.get_global_variable_or_constant_binding(ident.name)
                else {
                    self.error(
                        ErrorCode::E3009,
                        ident.span,
                        format!(
                            "no global variable or constant named `{}`",
                            self.text(ident.name)
                        ),
                    );
                    return None;
                };
                Some(Target {
                    kind: InitializerType::Global,
                    class: None,
                    binding: Some(binding),
                })
            }
            InitializerTarget::Class { class, variable } => {
                let found = self.class_for(*class)?;
                let binding = match variable {
                    None => None,
                    Some(variable) => {
                        let binding = self
                            .working
                            .superclass_chain(found.name)
                            .find_map(|c| c.class_variables.get(&variable.name).cloned());
                        if binding.is_none() {
                            self.error(
                                ErrorCode::E3009,
                                variable.span,
                                format!(
                                    "`{}` has no class variable `{}`",
                                    self.text(found.name),
                                    self.text(variable.name)
                                ),
                            );
                            return None;
                        }
                        binding
                    }
                };
                Some(Target {
                    kind: InitializerType::Class,
                    class: Some(found),
                    binding,
                })
            }
            InitializerTarget::PoolVariable { pool, variable } => {
                let Some(found) = self.working.get_pool(pool.name) else {
                    self.error(
                        ErrorCode::E3008,
                        pool.span,
                        format!("unknown pool `{}`", self.text(pool.name)),
                    );
                    return None;
                };
                let Some(binding) = found.variable(variable.name).cloned() else {
                    self.error(
                        ErrorCode::E3009,
                        variable.span,
                        format!(
                            "pool `{}` has no variable `{}`",
                            self.text(pool.name),
                            self.text(variable.name)
                        ),
                    );
                    return None;
                };
                Some(Target {
                    kind: InitializerType::PoolVariable,
                    class: None,
                    binding: Some(binding),
                })
            }
        }
    }

    pub(super) fn validate_initializers(
        &mut self,
        definitions: Vec<InitializerDefinition>,
    ) -> Vec<ValidInitializer> {
        let mut valid = Vec::with_capacity(definitions.len());
        for definition in definitions {
            let Some(target) = self.resolve_target(&definition.target) else {
                continue;
            };
            let result = self.compiler.compile_initializer(
                &self.working,
                target.class.as_ref(),
                &definition.node,
                &mut *self.sink,
            );
            match result {
                Ok(bound) => valid.push(ValidInitializer {
                    receiver: target
                        .class
                        .as_ref()
                        .map_or(Value::Nil, |class| Value::Class(class.name)),
                    kind: target.kind,
                    target: target.binding,
                    definition,
                    bound,
                }),
                Err(_) => {
                    self.error(
                        ErrorCode::E4001,
                        definition.span,
                        "initializer does not compile".to_owned(),
                    );
                }
            }
        }
        valid
    }

    // -----------------------------------------------------------------------
    // Phase 7: installation into the working scope
    // -----------------------------------------------------------------------

    /// Generate code for each method and add it to its class. Returns the
    /// definitions that were installed.
    pub(super) fn create_methods(
        &mut self,
        methods: Vec<ValidMethod>,
    ) -> Result<Vec<MethodDefinition>, InstallFault> {
        let mut installed = Vec::with_capacity(methods.len());
        for ValidMethod { definition, bound } in methods {
            let name = bound.class;
            let class = self
                .working
                .get_class(name)
                .ok_or(InstallFault::UnpopulatedClass { name })?;
            let method = CompiledMethod {
                selector: bound.selector,
                class: name,
                side: bound.side,
                node: Arc::clone(&definition.node),
                executable: self.codegen.generate_method(&bound),
                annotations: Vec::new(),
            };
            self.working.replace_class(class.with_method(Arc::new(method)));
            installed.push(definition);
        }
        Ok(installed)
    }

    pub(super) fn create_initializers(
        &mut self,
        initializers: Vec<ValidInitializer>,
    ) -> Vec<InstalledInitializer> {
        initializers
            .into_iter()
            .map(|valid| {
                let initializer = Arc::new(CompiledInitializer {
                    kind: valid.kind,
                    target: valid.target,
                    receiver: valid.receiver,
                    node: Arc::clone(&valid.definition.node),
                    executable: self.codegen.generate_initializer(&valid.bound),
                    annotations: Vec::new(),
                    span: valid.definition.span,
                });
                let index = self.working.local_initializer_count();
                self.working.add_initializer(Arc::clone(&initializer));
                InstalledInitializer {
                    index,
                    initializer,
                    annotations: valid.definition.annotations,
                }
            })
            .collect()
    }
}
