//! Message dispatch.
//!
//! Order for `receiver selector`:
//! 1. user methods, looked up from the receiver's class (instances on the
//!    instance side, classes on the class side, host values through their
//!    host class when one is defined)
//! 2. host primitives for the receiver's kind, then universal primitives
//! 3. `doesNotUnderstand`

use std::sync::Arc;

use st_ir::{MethodSide, Name};
use st_object::{CompiledMethod, EvalError, ExecEnv, Value};

use crate::primitives::{print_string, PrimitiveRegistry};

/// Send `selector` to `receiver`.
pub fn send(
    env: &ExecEnv,
    primitives: &PrimitiveRegistry,
    receiver: Value,
    selector: Name,
    arguments: &[Value],
) -> Result<Value, EvalError> {
    tracing::trace!(selector = env.interner.lookup(selector), receiver = ?receiver.kind(), "send");
    if let Some((class, side)) = dispatch_class(env, &receiver) {
        if let Some(method) = env.scope.lookup_method(class, side, selector) {
            return invoke(env, &method, receiver, arguments);
        }
    }
    primitive(env, primitives, &receiver, selector, arguments)
}

/// Send to `self` with lookup starting above `defining_class`.
pub fn send_super(
    env: &ExecEnv,
    primitives: &PrimitiveRegistry,
    receiver: Value,
    defining_class: Name,
    side: MethodSide,
    selector: Name,
    arguments: &[Value],
) -> Result<Value, EvalError> {
    let method = env
        .scope
        .get_class(defining_class)
        .and_then(|class| class.superclass)
        .and_then(|superclass| env.scope.lookup_method(superclass, side, selector));
    match method {
        Some(method) => invoke(env, &method, receiver, arguments),
        None => primitive(env, primitives, &receiver, selector, arguments),
    }
}

/// Class and side user methods for `receiver` are looked up in.
pub fn dispatch_class(env: &ExecEnv, receiver: &Value) -> Option<(Name, MethodSide)> {
    match receiver {
        Value::Object(object) => Some((object.class(), MethodSide::Instance)),
        Value::Class(name) => Some((*name, MethodSide::Class)),
        other => {
            let host = env.interner.get(other.kind().host_class_name()?)?;
            env.scope
                .get_class_binding(host)
                .map(|_| (host, MethodSide::Instance))
        }
    }
}

fn invoke(
    env: &ExecEnv,
    method: &Arc<CompiledMethod>,
    receiver: Value,
    arguments: &[Value],
) -> Result<Value, EvalError> {
    if method.argument_count() != arguments.len() {
        return Err(EvalError::WrongArgumentCount {
            selector: env.interner.lookup(method.selector).to_owned(),
            expected: method.argument_count(),
            got: arguments.len(),
        });
    }
    method.invoke(env, receiver, arguments)
}

fn primitive(
    env: &ExecEnv,
    primitives: &PrimitiveRegistry,
    receiver: &Value,
    selector: Name,
    arguments: &[Value],
) -> Result<Value, EvalError> {
    let Some(primitive) = primitives.lookup(receiver.kind(), selector) else {
        return Err(EvalError::DoesNotUnderstand {
            receiver: print_string(env, receiver),
            selector: env.interner.lookup(selector).to_owned(),
        });
    };
    if primitive.arity != arguments.len() {
        return Err(EvalError::WrongArgumentCount {
            selector: env.interner.lookup(selector).to_owned(),
            expected: primitive.arity,
            got: arguments.len(),
        });
    }
    (primitive.run)(env, receiver, arguments)
}
