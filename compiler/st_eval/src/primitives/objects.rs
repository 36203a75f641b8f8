//! Instance creation and the protocol every object understands.

use std::sync::Arc;

use st_object::{EvalError, ExecEnv, Object, Value, ValueKind};

use super::{value_of, Builder};

const CLASS: &[ValueKind] = &[ValueKind::Class];

pub(super) fn register(b: &mut Builder<'_>) {
    b.on(CLASS, "new", instantiate);
    b.on(CLASS, "basicNew", instantiate);
    b.on(CLASS, "name", |env, r, _| Ok(class_name(env, r)));
    b.on(CLASS, "superclass", superclass);

    b.common("==", |_, r, a| Ok(Value::boolean(a.first().is_some_and(|o| r.identical(o)))));
    b.common("~~", |_, r, a| Ok(Value::boolean(!a.first().is_some_and(|o| r.identical(o)))));
    b.common("=", |_, r, a| Ok(Value::boolean(a.first().is_some_and(|o| r.equals(o)))));
    b.common("~=", |_, r, a| Ok(Value::boolean(!a.first().is_some_and(|o| r.equals(o)))));
    b.common("isNil", |_, r, _| Ok(Value::boolean(r.is_nil())));
    b.common("notNil", |_, r, _| Ok(Value::boolean(!r.is_nil())));
    b.common("ifNil:", if_nil);
    b.common("ifNotNil:", if_not_nil);
    b.common("yourself", |_, r, _| Ok(r.clone()));
    b.common("class", class_of);
    b.common("printString", |env, r, _| Ok(Value::string(&print_string(env, r))));
    b.common("displayString", display_string);
}

fn instantiate(env: &ExecEnv, receiver: &Value, _: &[Value]) -> Result<Value, EvalError> {
    let Value::Class(name) = receiver else {
        return Err(EvalError::primitive_failed("new", "receiver is not a class"));
    };
    let class = env.scope.get_class(*name).ok_or_else(|| EvalError::Unbound {
        name: env.interner.lookup(*name).to_owned(),
    })?;
    Ok(Value::Object(Arc::new(Object::new(*name, class.instance_size()))))
}

fn class_name(env: &ExecEnv, receiver: &Value) -> Value {
    match receiver {
        Value::Class(name) => Value::string(env.interner.lookup(*name)),
        _ => Value::Nil,
    }
}

fn superclass(env: &ExecEnv, receiver: &Value, _: &[Value]) -> Result<Value, EvalError> {
    let Value::Class(name) = receiver else {
        return Ok(Value::Nil);
    };
    Ok(env
        .scope
        .get_class(*name)
        .and_then(|class| class.superclass)
        .map_or(Value::Nil, Value::Class))
}

/// The class of a value. Host values answer their host class by name;
/// classes have no metaclass objects and answer `nil`.
fn class_of(env: &ExecEnv, receiver: &Value, _: &[Value]) -> Result<Value, EvalError> {
    Ok(match receiver {
        Value::Object(object) => Value::Class(object.class()),
        Value::Class(_) => Value::Nil,
        other => other
            .kind()
            .host_class_name()
            .map_or(Value::Nil, |name| Value::Class(env.interner.intern(name))),
    })
}

fn if_nil(env: &ExecEnv, receiver: &Value, arguments: &[Value]) -> Result<Value, EvalError> {
    match (receiver, arguments.first()) {
        (Value::Nil, Some(arm)) => value_of(env, arm),
        _ => Ok(receiver.clone()),
    }
}

fn if_not_nil(env: &ExecEnv, receiver: &Value, arguments: &[Value]) -> Result<Value, EvalError> {
    match (receiver, arguments.first()) {
        (Value::Nil, _) => Ok(Value::Nil),
        (_, Some(Value::Block(block))) if block.arity() == 1 => {
            block.invoke(env, std::slice::from_ref(receiver))
        }
        (_, Some(arm)) => value_of(env, arm),
        (_, None) => Ok(receiver.clone()),
    }
}

fn display_string(env: &ExecEnv, receiver: &Value, _: &[Value]) -> Result<Value, EvalError> {
    Ok(match receiver {
        Value::String(_) => receiver.clone(),
        Value::Symbol(name) => Value::string(env.interner.lookup(*name)),
        other => Value::string(&print_string(env, other)),
    })
}

/// Smalltalk `printString` rendering of a value.
pub fn print_string(env: &ExecEnv, value: &Value) -> String {
    match value {
        Value::Nil => "nil".to_owned(),
        Value::True => "true".to_owned(),
        Value::False => "false".to_owned(),
        Value::Integer(n) => n.to_string(),
        Value::Float(x) => format!("{x:?}"),
        Value::Character(c) => format!("${c}"),
        Value::String(s) => format!("'{}'", s.replace('\'', "''")),
        Value::Symbol(name) => format!("#{}", env.interner.lookup(*name)),
        Value::Array(elements) => {
            let inner: Vec<String> = elements.iter().map(|e| print_string(env, e)).collect();
            format!("#({})", inner.join(" "))
        }
        Value::Object(object) => {
            let class = env.interner.lookup(object.class());
            let article = if class.starts_with(['A', 'E', 'I', 'O', 'U']) { "an" } else { "a" };
            format!("{article} {class}")
        }
        Value::Class(name) => env.interner.lookup(*name).to_owned(),
        Value::Block(_) => "a BlockClosure".to_owned(),
    }
}
