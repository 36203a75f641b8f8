//! The live runtime.

use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use st_compile::Installer;
use st_diagnostic::{Diagnostic, ErrorCode, ErrorSink};
use st_eval::{dispatch, Interpreter};
use st_ir::{Definition, SharedInterner};
use st_object::{EvalError, ExecEnv, GlobalBinding, MethodLookup, NameScope, Value};

use crate::RuntimeConfig;

/// Owns the live name scope and runs code against it.
///
/// Readers take lock-free snapshots; installs and initializer runs are
/// serialized so each one starts from the scope the previous one
/// published.
pub struct Runtime {
    interner: SharedInterner,
    live: ArcSwap<NameScope>,
    writer: Mutex<()>,
    interpreter: Interpreter,
    config: RuntimeConfig,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime {
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        let interner = SharedInterner::new();
        let protected: Vec<_> = config
            .protected_names
            .iter()
            .map(|name| interner.intern(name))
            .collect();
        let interpreter = Interpreter::new(&interner);
        Runtime {
            live: ArcSwap::from_pointee(NameScope::with_protected(protected)),
            writer: Mutex::new(()),
            interner,
            interpreter,
            config,
        }
    }

    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Current committed scope.
    pub fn scope(&self) -> Arc<NameScope> {
        self.live.load_full()
    }

    /// Execution environment over the current scope.
    pub fn env(&self) -> ExecEnv {
        ExecEnv::new(self.scope(), self.interner.clone())
    }

    /// Install a batch of definitions. Returns whether it was committed;
    /// every problem is reported to `sink`.
    pub fn install(&self, definitions: Vec<Definition>, sink: &mut dyn ErrorSink) -> bool {
        let _writer = self.writer.lock();
        let installer = Installer::new(&self.interner, &self.interpreter)
            .with_options(self.config.install.clone());
        match installer.install(&self.live, definitions, sink) {
            Ok(committed) => committed,
            Err(fault) => {
                tracing::error!(%fault, "installer fault");
                sink.report(
                    Diagnostic::error(ErrorCode::E9001)
                        .with_message(fault.to_string())
                        .with_note("the live scope was not changed"),
                );
                false
            }
        }
    }

    /// Whatever `name` is bound to in the live scope.
    pub fn lookup(&self, name: &str) -> Option<GlobalBinding> {
        let name = self.interner.get(name)?;
        self.scope().get_global_binding(name)
    }

    /// Run every pending initializer in registration order, then publish
    /// the scope with none pending. Returns whether all of them succeeded.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn execute_initializers(&self, sink: &mut dyn ErrorSink) -> bool {
        let _writer = self.writer.lock();
        let snapshot = self.live.load_full();
        let env = ExecEnv::new(Arc::clone(&snapshot), self.interner.clone());
        let pending = snapshot.initializers();
        let mut succeeded = true;

        for initializer in &pending {
            let Err(err) = initializer.execute(&env) else {
                continue;
            };
            succeeded = false;
            let code = match err {
                EvalError::Binding(_) => ErrorCode::E6002,
                _ => ErrorCode::E6001,
            };
            tracing::debug!(%err, ?code, "initializer failed");
            sink.report(
                Diagnostic::error(code)
                    .with_message(err.to_string())
                    .with_label(initializer.span, code.description()),
            );
        }

        let mut cleared = snapshot.copy();
        cleared.clear_initializers();
        self.live.store(Arc::new(cleared));
        tracing::debug!(count = pending.len(), succeeded, "initializers complete");
        succeeded
    }

    /// Send `selector` to `receiver` with exact, case-sensitive lookup.
    pub fn send(&self, receiver: Value, selector: &str, arguments: &[Value]) -> Result<Value, EvalError> {
        let selector = self.interner.intern(selector);
        self.interpreter.send(&self.env(), receiver, selector, arguments)
    }

    /// Send for host callers that may get the case of a selector wrong.
    ///
    /// An exact match wins; otherwise the nearest class defining a selector
    /// equal up to ASCII case decides. Several such selectors in that class
    /// are a [`EvalError::CaseConflict`].
    pub fn send_by_name(
        &self,
        receiver: Value,
        selector: &str,
        arguments: &[Value],
    ) -> Result<Value, EvalError> {
        let env = self.env();
        let Some((class, side)) = dispatch::dispatch_class(&env, &receiver) else {
            return self.send(receiver, selector, arguments);
        };
        if let Some(exact) = self.interner.get(selector) {
            if env.scope.lookup_method(class, side, exact).is_some() {
                return self.interpreter.send(&env, receiver, exact, arguments);
            }
        }
        match env
            .scope
            .lookup_method_ignoring_case(&self.interner, class, side, selector)
        {
            MethodLookup::Found(method) => {
                self.interpreter.send(&env, receiver, method.selector, arguments)
            }
            MethodLookup::CaseConflict(candidates) => Err(EvalError::CaseConflict {
                selector: selector.to_owned(),
                candidates: candidates
                    .into_iter()
                    .map(|name| self.interner.lookup(name).to_owned())
                    .collect(),
            }),
            MethodLookup::NotFound => self.send(receiver, selector, arguments),
        }
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("config", &self.config)
            .field("classes", &self.scope().class_names().len())
            .finish_non_exhaustive()
    }
}
