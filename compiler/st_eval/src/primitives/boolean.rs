//! Conditionals and logic on `true` and `false`.

use st_object::{EvalError, ExecEnv, Value, ValueKind};

use super::{describe, value_of, Builder};

const BOOLEAN: &[ValueKind] = &[ValueKind::Boolean];

pub(super) fn register(b: &mut Builder<'_>) {
    b.on(BOOLEAN, "ifTrue:", |env, r, a| branch(env, truth(r), a.first(), None));
    b.on(BOOLEAN, "ifFalse:", |env, r, a| branch(env, !truth(r), a.first(), None));
    b.on(BOOLEAN, "ifTrue:ifFalse:", |env, r, a| {
        branch(env, truth(r), a.first(), a.get(1))
    });
    b.on(BOOLEAN, "ifFalse:ifTrue:", |env, r, a| {
        branch(env, !truth(r), a.first(), a.get(1))
    });
    b.on(BOOLEAN, "and:", and);
    b.on(BOOLEAN, "or:", or);
    b.on(BOOLEAN, "&", |_, r, a| Ok(Value::boolean(truth(r) && operand("&", a)?)));
    b.on(BOOLEAN, "|", |_, r, a| Ok(Value::boolean(truth(r) || operand("|", a)?)));
    b.on(BOOLEAN, "not", |_, r, _| Ok(Value::boolean(!truth(r))));
}

fn truth(receiver: &Value) -> bool {
    matches!(receiver, Value::True)
}

fn operand(selector: &str, arguments: &[Value]) -> Result<bool, EvalError> {
    arguments.first().and_then(Value::as_bool).ok_or_else(|| {
        EvalError::primitive_failed(
            selector,
            format!("expected a boolean argument, got {}", describe(arguments.first())),
        )
    })
}

/// Evaluate `taken` when `condition` holds, else `otherwise`; a missing
/// branch answers `nil`.
fn branch(
    env: &ExecEnv,
    condition: bool,
    taken: Option<&Value>,
    otherwise: Option<&Value>,
) -> Result<Value, EvalError> {
    match if condition { taken } else { otherwise } {
        Some(arm) => value_of(env, arm),
        None => Ok(Value::Nil),
    }
}

fn and(env: &ExecEnv, receiver: &Value, arguments: &[Value]) -> Result<Value, EvalError> {
    if !truth(receiver) {
        return Ok(Value::False);
    }
    match arguments.first() {
        Some(rest) => value_of(env, rest),
        None => Ok(Value::Nil),
    }
}

fn or(env: &ExecEnv, receiver: &Value, arguments: &[Value]) -> Result<Value, EvalError> {
    if truth(receiver) {
        return Ok(Value::True);
    }
    match arguments.first() {
        Some(rest) => value_of(env, rest),
        None => Ok(Value::Nil),
    }
}
