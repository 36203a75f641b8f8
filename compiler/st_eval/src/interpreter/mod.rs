//! Tree-walking backend.
//!
//! [`Interpreter`] is a [`CodeGenerator`]: it wraps each bound method or
//! initializer in an [`Executable`] that walks the bound tree directly.
//! Variable references are already resolved to slots and binding cells,
//! so evaluation never consults the compiler's scope chain.

mod closure;

use std::sync::Arc;

use smallvec::SmallVec;
use st_compile::{
    BoundExpr, BoundInitializer, BoundMethod, BoundStmt, CodeGenerator, NameBinding,
    SpecialBinding,
};
use st_ir::{Name, StringInterner};
use st_object::{EvalError, ExecEnv, Executable, SmalltalkClass, Value};

pub use closure::Closure;

use crate::dispatch;
use crate::frame::Frame;
use crate::primitives::PrimitiveRegistry;
use crate::stack::ensure_sufficient_stack;

type Arguments = SmallVec<[Value; 4]>;

/// The tree-walking code generator.
#[derive(Clone, Debug)]
pub struct Interpreter {
    primitives: Arc<PrimitiveRegistry>,
}

impl Interpreter {
    /// Interpreter whose primitives are interned in `interner`. Code it
    /// generates must run with an [`ExecEnv`] on the same symbol table.
    pub fn new(interner: &StringInterner) -> Self {
        Interpreter {
            primitives: Arc::new(PrimitiveRegistry::new(interner)),
        }
    }

    pub fn primitives(&self) -> &PrimitiveRegistry {
        &self.primitives
    }

    /// Send a message from outside any method.
    pub fn send(
        &self,
        env: &ExecEnv,
        receiver: Value,
        selector: Name,
        arguments: &[Value],
    ) -> Result<Value, EvalError> {
        dispatch::send(env, &self.primitives, receiver, selector, arguments)
    }
}

impl CodeGenerator for Interpreter {
    fn generate_method(&self, method: &BoundMethod) -> Arc<dyn Executable> {
        Arc::new(MethodCode {
            method: method.clone(),
            primitives: Arc::clone(&self.primitives),
        })
    }

    fn generate_initializer(&self, initializer: &BoundInitializer) -> Arc<dyn Executable> {
        Arc::new(InitializerCode {
            initializer: initializer.clone(),
            primitives: Arc::clone(&self.primitives),
        })
    }
}

// ----------------------------------------------------------------------------
// Executables
// ----------------------------------------------------------------------------

struct MethodCode {
    method: BoundMethod,
    primitives: Arc<PrimitiveRegistry>,
}

impl Executable for MethodCode {
    fn call(&self, env: &ExecEnv, receiver: Value, arguments: &[Value]) -> Result<Value, EvalError> {
        let body = &self.method.body;
        if arguments.len() != body.argument_count {
            return Err(EvalError::WrongArgumentCount {
                selector: env.interner.lookup(self.method.selector).to_owned(),
                expected: body.argument_count,
                got: arguments.len(),
            });
        }
        let (frame, _home) = Frame::activation(receiver, arguments, body.slot_count());
        let home = frame.home().id();
        let eval = Evaluator::new(env, &self.primitives, &frame);
        match eval.run(&body.statements) {
            Ok(Flow::Return(value)) => Ok(value),
            Ok(Flow::Normal(_)) => Ok(frame.receiver().clone()),
            Err(EvalError::NonLocalReturn { home: target, value }) if target == home => Ok(value),
            Err(err) => Err(err),
        }
    }
}

struct InitializerCode {
    initializer: BoundInitializer,
    primitives: Arc<PrimitiveRegistry>,
}

impl Executable for InitializerCode {
    fn call(&self, env: &ExecEnv, receiver: Value, arguments: &[Value]) -> Result<Value, EvalError> {
        let body = &self.initializer.body;
        let (frame, _home) = Frame::activation(receiver, arguments, body.slot_count());
        let home = frame.home().id();
        let eval = Evaluator::new(env, &self.primitives, &frame);
        match eval.run(&body.statements) {
            Ok(Flow::Return(value) | Flow::Normal(value)) => Ok(value),
            Err(EvalError::NonLocalReturn { home: target, value }) if target == home => Ok(value),
            Err(err) => Err(err),
        }
    }
}

// ----------------------------------------------------------------------------
// Evaluation
// ----------------------------------------------------------------------------

/// How a statement sequence finished.
pub(crate) enum Flow {
    /// Ran off the end; carries the last statement's value.
    Normal(Value),
    /// Hit `^`.
    Return(Value),
}

/// Evaluates bound expressions inside one frame.
pub(crate) struct Evaluator<'a> {
    env: &'a ExecEnv,
    primitives: &'a Arc<PrimitiveRegistry>,
    frame: &'a Arc<Frame>,
}

impl<'a> Evaluator<'a> {
    pub(crate) fn new(
        env: &'a ExecEnv,
        primitives: &'a Arc<PrimitiveRegistry>,
        frame: &'a Arc<Frame>,
    ) -> Self {
        Evaluator {
            env,
            primitives,
            frame,
        }
    }

    pub(crate) fn run(&self, statements: &[BoundStmt]) -> Result<Flow, EvalError> {
        let mut last = Value::Nil;
        for statement in statements {
            match statement {
                BoundStmt::Expr(expr) => last = self.eval(expr)?,
                BoundStmt::Return(expr) => return Ok(Flow::Return(self.eval(expr)?)),
            }
        }
        Ok(Flow::Normal(last))
    }

    fn eval(&self, expr: &BoundExpr) -> Result<Value, EvalError> {
        ensure_sufficient_stack(|| self.eval_inner(expr))
    }

    fn eval_inner(&self, expr: &BoundExpr) -> Result<Value, EvalError> {
        match expr {
            BoundExpr::Literal(value) => Ok(value.clone()),
            BoundExpr::Variable(binding) => self.read(binding),
            BoundExpr::Assign { target, value } => {
                let value = self.eval(value)?;
                self.write(target, value.clone())?;
                Ok(value)
            }
            BoundExpr::Send {
                receiver,
                selector,
                arguments,
            } => {
                let receiver = self.eval(receiver)?;
                let arguments = self.eval_all(arguments)?;
                dispatch::send(self.env, self.primitives, receiver, *selector, &arguments)
            }
            BoundExpr::SuperSend {
                defining_class,
                side,
                selector,
                arguments,
            } => {
                let arguments = self.eval_all(arguments)?;
                dispatch::send_super(
                    self.env,
                    self.primitives,
                    self.frame.receiver().clone(),
                    *defining_class,
                    *side,
                    *selector,
                    &arguments,
                )
            }
            BoundExpr::Cascade {
                receiver,
                messages,
                super_lookup,
            } => {
                let receiver = self.eval(receiver)?;
                let mut last = Value::Nil;
                for message in messages {
                    let arguments = self.eval_all(&message.arguments)?;
                    last = match *super_lookup {
                        Some((defining_class, side)) => dispatch::send_super(
                            self.env,
                            self.primitives,
                            receiver.clone(),
                            defining_class,
                            side,
                            message.selector,
                            &arguments,
                        )?,
                        None => dispatch::send(
                            self.env,
                            self.primitives,
                            receiver.clone(),
                            message.selector,
                            &arguments,
                        )?,
                    };
                }
                Ok(last)
            }
            BoundExpr::Block(block) => Ok(Value::Block(Arc::new(Closure::new(
                Arc::clone(block),
                Arc::clone(self.frame),
                Arc::clone(self.primitives),
            )))),
        }
    }

    fn eval_all(&self, exprs: &[BoundExpr]) -> Result<Arguments, EvalError> {
        exprs.iter().map(|expr| self.eval(expr)).collect()
    }

    fn read(&self, binding: &NameBinding) -> Result<Value, EvalError> {
        match binding {
            NameBinding::Local { depth, index, .. } => Ok(self.frame.get(*depth, *index)),
            NameBinding::InstanceVariable { index } => match self.frame.receiver() {
                Value::Object(object) => Ok(object.field(*index)),
                other => Err(not_an_instance(other)),
            },
            NameBinding::ClassInstanceVariable { index } => {
                let class = self.receiver_class()?;
                Ok(class.class_instance_value(*index))
            }
            NameBinding::ClassVariable(cell)
            | NameBinding::PoolVariable(cell)
            | NameBinding::PoolConstant(cell)
            | NameBinding::GlobalVariable(cell)
            | NameBinding::GlobalConstant(cell) => Ok(cell.value()),
            NameBinding::Class(name) => match self.env.scope.get_class_binding(*name) {
                Some(_) => Ok(Value::Class(*name)),
                None => Err(self.unbound(*name)),
            },
            NameBinding::Special(special) => Ok(match special {
                SpecialBinding::SelfRef | SpecialBinding::Super => self.frame.receiver().clone(),
                SpecialBinding::True => Value::True,
                SpecialBinding::False => Value::False,
                SpecialBinding::Nil => Value::Nil,
            }),
            NameBinding::Error(failure) => Err(EvalError::Unbound {
                name: failure.message.clone(),
            }),
        }
    }

    fn write(&self, binding: &NameBinding, value: Value) -> Result<(), EvalError> {
        match binding {
            NameBinding::Local { depth, index, .. } => {
                self.frame.set(*depth, *index, value);
                Ok(())
            }
            NameBinding::InstanceVariable { index } => match self.frame.receiver() {
                Value::Object(object) => {
                    object.set_field(*index, value);
                    Ok(())
                }
                other => Err(not_an_instance(other)),
            },
            NameBinding::ClassInstanceVariable { index } => {
                self.receiver_class()?.set_class_instance_value(*index, value);
                Ok(())
            }
            NameBinding::ClassVariable(cell)
            | NameBinding::PoolVariable(cell)
            | NameBinding::GlobalVariable(cell) => Ok(cell.set(value)?),
            other => Err(EvalError::primitive_failed(
                ":=",
                format!("cannot assign to a {}", other.describe()),
            )),
        }
    }

    /// The class a class-side method or class initializer runs for.
    fn receiver_class(&self) -> Result<Arc<SmalltalkClass>, EvalError> {
        match self.frame.receiver() {
            Value::Class(name) => self
                .env
                .scope
                .get_class(*name)
                .ok_or_else(|| self.unbound(*name)),
            other => Err(EvalError::primitive_failed(
                "classInstVar",
                format!("{other:?} is not a class"),
            )),
        }
    }

    fn unbound(&self, name: Name) -> EvalError {
        EvalError::Unbound {
            name: self.env.interner.lookup(name).to_owned(),
        }
    }
}

fn not_an_instance(receiver: &Value) -> EvalError {
    EvalError::primitive_failed(
        "instVar",
        format!("{receiver:?} has no instance variables"),
    )
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
