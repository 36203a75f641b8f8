//! Block evaluation and block-driven loops.

use st_object::{EvalError, ExecEnv, Value, ValueKind};

use super::{block_arg, describe, Builder};

const BLOCK: &[ValueKind] = &[ValueKind::Block];

pub(super) fn register(b: &mut Builder<'_>) {
    for selector in ["value", "value:", "value:value:", "value:value:value:", "value:value:value:value:"] {
        b.on(BLOCK, selector, evaluate);
    }
    b.on(BLOCK, "valueWithArguments:", value_with_arguments);
    b.on(BLOCK, "numArgs", num_args);
    b.on(BLOCK, "whileTrue:", |env, r, a| while_loop(env, "whileTrue:", r, a, true));
    b.on(BLOCK, "whileFalse:", |env, r, a| while_loop(env, "whileFalse:", r, a, false));
    b.on(BLOCK, "whileTrue", |env, r, _| while_loop(env, "whileTrue", r, &[], true));
    b.on(BLOCK, "whileFalse", |env, r, _| while_loop(env, "whileFalse", r, &[], false));
}

fn evaluate(env: &ExecEnv, receiver: &Value, arguments: &[Value]) -> Result<Value, EvalError> {
    match receiver {
        Value::Block(block) => block.invoke(env, arguments),
        other => Err(EvalError::primitive_failed(
            "value",
            format!("{other:?} is not a block"),
        )),
    }
}

fn value_with_arguments(env: &ExecEnv, receiver: &Value, arguments: &[Value]) -> Result<Value, EvalError> {
    match arguments.first() {
        Some(Value::Array(elements)) => evaluate(env, receiver, elements),
        other => Err(EvalError::primitive_failed(
            "valueWithArguments:",
            format!("expected an array argument, got {}", describe(other)),
        )),
    }
}

#[expect(
    clippy::cast_possible_wrap,
    reason = "block arity is tiny"
)]
fn num_args(_: &ExecEnv, receiver: &Value, _: &[Value]) -> Result<Value, EvalError> {
    match receiver {
        Value::Block(block) => Ok(Value::Integer(block.arity() as i64)),
        _ => Ok(Value::Integer(0)),
    }
}

/// Re-evaluate the receiver until it answers `!expect`, running the body
/// (if any) after each `expect` answer.
fn while_loop(
    env: &ExecEnv,
    selector: &str,
    receiver: &Value,
    arguments: &[Value],
    expect: bool,
) -> Result<Value, EvalError> {
    let Value::Block(condition) = receiver else {
        return Err(EvalError::primitive_failed(selector, "receiver is not a block"));
    };
    let body = if arguments.is_empty() {
        None
    } else {
        Some(block_arg(selector, arguments, 0)?)
    };
    loop {
        let answer = condition.invoke(env, &[])?;
        match answer.as_bool() {
            Some(value) if value == expect => {}
            Some(_) => return Ok(Value::Nil),
            None => {
                return Err(EvalError::primitive_failed(
                    selector,
                    format!("condition answered {answer:?}, not a boolean"),
                ))
            }
        }
        if let Some(body) = body {
            body.invoke(env, &[])?;
        }
    }
}
