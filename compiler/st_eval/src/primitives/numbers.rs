//! `SmallInteger` and `Float` primitives.
//!
//! Integer arithmetic is checked; overflow fails the primitive instead of
//! wrapping. Mixed integer/float operands follow float semantics.

use std::cmp::Ordering;

use st_object::{EvalError, ExecEnv, Value, ValueKind};

use super::{block_arg, describe, integer_arg, Builder};

const NUMBERS: &[ValueKind] = &[ValueKind::Integer, ValueKind::Float];
const INTEGER: &[ValueKind] = &[ValueKind::Integer];

pub(super) fn register(b: &mut Builder<'_>) {
    b.on(NUMBERS, "+", add);
    b.on(NUMBERS, "-", sub);
    b.on(NUMBERS, "*", mul);
    b.on(NUMBERS, "/", div);
    b.on(NUMBERS, "<", |_, r, a| compare("<", r, a, Ordering::is_lt));
    b.on(NUMBERS, ">", |_, r, a| compare(">", r, a, Ordering::is_gt));
    b.on(NUMBERS, "<=", |_, r, a| compare("<=", r, a, Ordering::is_le));
    b.on(NUMBERS, ">=", |_, r, a| compare(">=", r, a, Ordering::is_ge));
    b.on(NUMBERS, "max:", |_, r, a| pick("max:", r, a, Ordering::is_ge));
    b.on(NUMBERS, "min:", |_, r, a| pick("min:", r, a, Ordering::is_le));
    b.on(NUMBERS, "negated", negated);
    b.on(NUMBERS, "abs", abs);
    b.on(NUMBERS, "asFloat", |_, r, _| Ok(Value::Float(as_float(r))));
    b.on(NUMBERS, "isNumber", |_, _, _| Ok(Value::True));
    b.on(INTEGER, "//", floor_div);
    b.on(INTEGER, "\\\\", floor_mod);
    b.on(INTEGER, "rem:", rem);
    b.on(INTEGER, "asInteger", |_, r, _| Ok(r.clone()));
    b.on(INTEGER, "asCharacter", as_character);
    b.on(INTEGER, "even", |_, r, _| Ok(Value::boolean(int(r) % 2 == 0)));
    b.on(INTEGER, "odd", |_, r, _| Ok(Value::boolean(int(r) % 2 != 0)));
    b.on(INTEGER, "to:do:", to_do);
    b.on(INTEGER, "timesRepeat:", times_repeat);
    b.on(&[ValueKind::Float], "truncated", truncated);
}

// ----------------------------------------------------------------------------
// Operands
// ----------------------------------------------------------------------------

enum Operands {
    Integers(i64, i64),
    Floats(f64, f64),
}

#[expect(
    clippy::cast_precision_loss,
    reason = "mixed integer/float arithmetic follows float semantics"
)]
fn as_float(value: &Value) -> f64 {
    match value {
        Value::Integer(n) => *n as f64,
        Value::Float(x) => *x,
        _ => f64::NAN,
    }
}

fn int(value: &Value) -> i64 {
    value.as_integer().unwrap_or_default()
}

fn operands(selector: &str, receiver: &Value, arguments: &[Value]) -> Result<Operands, EvalError> {
    match (receiver, arguments.first()) {
        (Value::Integer(a), Some(Value::Integer(b))) => Ok(Operands::Integers(*a, *b)),
        (Value::Integer(_) | Value::Float(_), Some(arg @ (Value::Integer(_) | Value::Float(_)))) => {
            Ok(Operands::Floats(as_float(receiver), as_float(arg)))
        }
        (_, other) => Err(EvalError::primitive_failed(
            selector,
            format!("expected a number argument, got {}", describe(other)),
        )),
    }
}

fn overflow(selector: &str) -> EvalError {
    EvalError::primitive_failed(selector, "integer overflow")
}

fn zero_divide(selector: &str) -> EvalError {
    EvalError::primitive_failed(selector, "division by zero")
}

// ----------------------------------------------------------------------------
// Arithmetic
// ----------------------------------------------------------------------------

fn add(_: &ExecEnv, receiver: &Value, arguments: &[Value]) -> Result<Value, EvalError> {
    match operands("+", receiver, arguments)? {
        Operands::Integers(a, b) => a.checked_add(b).map(Value::Integer).ok_or_else(|| overflow("+")),
        Operands::Floats(a, b) => Ok(Value::Float(a + b)),
    }
}

fn sub(_: &ExecEnv, receiver: &Value, arguments: &[Value]) -> Result<Value, EvalError> {
    match operands("-", receiver, arguments)? {
        Operands::Integers(a, b) => a.checked_sub(b).map(Value::Integer).ok_or_else(|| overflow("-")),
        Operands::Floats(a, b) => Ok(Value::Float(a - b)),
    }
}

fn mul(_: &ExecEnv, receiver: &Value, arguments: &[Value]) -> Result<Value, EvalError> {
    match operands("*", receiver, arguments)? {
        Operands::Integers(a, b) => a.checked_mul(b).map(Value::Integer).ok_or_else(|| overflow("*")),
        Operands::Floats(a, b) => Ok(Value::Float(a * b)),
    }
}

/// Exact integer quotients stay integers; anything else becomes a float.
#[expect(
    clippy::cast_precision_loss,
    reason = "inexact integer division answers a float"
)]
fn div(_: &ExecEnv, receiver: &Value, arguments: &[Value]) -> Result<Value, EvalError> {
    match operands("/", receiver, arguments)? {
        Operands::Integers(_, 0) => Err(zero_divide("/")),
        Operands::Integers(a, b) if a.checked_rem(b) == Some(0) => {
            a.checked_div(b).map(Value::Integer).ok_or_else(|| overflow("/"))
        }
        Operands::Integers(a, b) => Ok(Value::Float(a as f64 / b as f64)),
        Operands::Floats(_, b) if b == 0.0 => Err(zero_divide("/")),
        Operands::Floats(a, b) => Ok(Value::Float(a / b)),
    }
}

fn floor_div(_: &ExecEnv, receiver: &Value, arguments: &[Value]) -> Result<Value, EvalError> {
    let (a, b) = (int(receiver), integer_arg("//", arguments, 0)?);
    if b == 0 {
        return Err(zero_divide("//"));
    }
    let quotient = a.checked_div(b).ok_or_else(|| overflow("//"))?;
    let adjust = i64::from(a % b != 0 && (a < 0) != (b < 0));
    Ok(Value::Integer(quotient - adjust))
}

fn floor_mod(_: &ExecEnv, receiver: &Value, arguments: &[Value]) -> Result<Value, EvalError> {
    let (a, b) = (int(receiver), integer_arg("\\\\", arguments, 0)?);
    if b == 0 {
        return Err(zero_divide("\\\\"));
    }
    let rem = a.checked_rem(b).ok_or_else(|| overflow("\\\\"))?;
    Ok(Value::Integer(if rem != 0 && (rem < 0) != (b < 0) { rem + b } else { rem }))
}

fn rem(_: &ExecEnv, receiver: &Value, arguments: &[Value]) -> Result<Value, EvalError> {
    let (a, b) = (int(receiver), integer_arg("rem:", arguments, 0)?);
    if b == 0 {
        return Err(zero_divide("rem:"));
    }
    a.checked_rem(b).map(Value::Integer).ok_or_else(|| overflow("rem:"))
}

fn negated(_: &ExecEnv, receiver: &Value, _: &[Value]) -> Result<Value, EvalError> {
    match receiver {
        Value::Integer(n) => n.checked_neg().map(Value::Integer).ok_or_else(|| overflow("negated")),
        other => Ok(Value::Float(-as_float(other))),
    }
}

fn abs(_: &ExecEnv, receiver: &Value, _: &[Value]) -> Result<Value, EvalError> {
    match receiver {
        Value::Integer(n) => n.checked_abs().map(Value::Integer).ok_or_else(|| overflow("abs")),
        other => Ok(Value::Float(as_float(other).abs())),
    }
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    reason = "range is checked before the cast"
)]
fn truncated(_: &ExecEnv, receiver: &Value, _: &[Value]) -> Result<Value, EvalError> {
    let x = as_float(receiver).trunc();
    if x.is_finite() && x >= i64::MIN as f64 && x < i64::MAX as f64 {
        Ok(Value::Integer(x as i64))
    } else {
        Err(EvalError::primitive_failed("truncated", "not representable as an integer"))
    }
}

fn as_character(_: &ExecEnv, receiver: &Value, _: &[Value]) -> Result<Value, EvalError> {
    u32::try_from(int(receiver))
        .ok()
        .and_then(char::from_u32)
        .map(Value::Character)
        .ok_or_else(|| EvalError::primitive_failed("asCharacter", "not a code point"))
}

// ----------------------------------------------------------------------------
// Comparison
// ----------------------------------------------------------------------------

fn ordering(selector: &str, receiver: &Value, arguments: &[Value]) -> Result<Ordering, EvalError> {
    let ordering = match operands(selector, receiver, arguments)? {
        Operands::Integers(a, b) => Some(a.cmp(&b)),
        Operands::Floats(a, b) => a.partial_cmp(&b),
    };
    ordering.ok_or_else(|| EvalError::primitive_failed(selector, "unordered operands"))
}

fn compare(
    selector: &str,
    receiver: &Value,
    arguments: &[Value],
    test: fn(Ordering) -> bool,
) -> Result<Value, EvalError> {
    ordering(selector, receiver, arguments).map(|ord| Value::boolean(test(ord)))
}

fn pick(
    selector: &str,
    receiver: &Value,
    arguments: &[Value],
    keep_receiver: fn(Ordering) -> bool,
) -> Result<Value, EvalError> {
    let ord = ordering(selector, receiver, arguments)?;
    match arguments.first() {
        Some(other) if !keep_receiver(ord) => Ok(other.clone()),
        _ => Ok(receiver.clone()),
    }
}

// ----------------------------------------------------------------------------
// Iteration
// ----------------------------------------------------------------------------

fn to_do(env: &ExecEnv, receiver: &Value, arguments: &[Value]) -> Result<Value, EvalError> {
    let stop = integer_arg("to:do:", arguments, 0)?;
    let block = block_arg("to:do:", arguments, 1)?;
    let mut i = int(receiver);
    while i <= stop {
        block.invoke(env, &[Value::Integer(i)])?;
        i = match i.checked_add(1) {
            Some(next) => next,
            None => break,
        };
    }
    Ok(receiver.clone())
}

fn times_repeat(env: &ExecEnv, receiver: &Value, arguments: &[Value]) -> Result<Value, EvalError> {
    let block = block_arg("timesRepeat:", arguments, 0)?;
    for _ in 0..int(receiver).max(0) {
        block.invoke(env, &[])?;
    }
    Ok(receiver.clone())
}
