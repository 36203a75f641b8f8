//! Strings, symbols, characters and literal arrays.
//!
//! Indexing is 1-based; an index outside the collection fails the
//! primitive. Arrays are immutable literals, so there is no `at:put:`.

use std::sync::Arc;

use st_object::{EvalError, ExecEnv, Value, ValueKind};

use super::{block_arg, describe, integer_arg, Builder};

const TEXT: &[ValueKind] = &[ValueKind::String, ValueKind::Symbol];
const SEQUENCES: &[ValueKind] = &[ValueKind::String, ValueKind::Symbol, ValueKind::Array];

pub(super) fn register(b: &mut Builder<'_>) {
    b.on(SEQUENCES, "size", size);
    b.on(SEQUENCES, "isEmpty", |env, r, _| Ok(Value::boolean(length(env, r) == 0)));
    b.on(SEQUENCES, "notEmpty", |env, r, _| Ok(Value::boolean(length(env, r) != 0)));
    b.on(SEQUENCES, "at:", at);
    b.on(SEQUENCES, "do:", each);
    b.on(SEQUENCES, "includes:", includes);
    b.on(&[ValueKind::Array], "collect:", collect);
    b.on(&[ValueKind::Array], "select:", select);
    b.on(&[ValueKind::Array], "inject:into:", inject_into);
    b.on(TEXT, ",", concatenate);
    b.on(TEXT, "asString", |env, r, _| Ok(Value::string(&text(env, r))));
    b.on(TEXT, "asSymbol", |env, r, _| Ok(Value::Symbol(env.interner.intern(&text(env, r)))));
    b.on(TEXT, "asUppercase", |env, r, _| Ok(Value::string(&text(env, r).to_uppercase())));
    b.on(TEXT, "asLowercase", |env, r, _| Ok(Value::string(&text(env, r).to_lowercase())));
    b.on(TEXT, "reversed", |env, r, _| Ok(Value::string(&text(env, r).chars().rev().collect::<String>())));
    b.on(&[ValueKind::Character], "value", char_value);
    b.on(&[ValueKind::Character], "asInteger", char_value);
    b.on(&[ValueKind::Character], "asString", |_, r, _| Ok(Value::string(&character(r).to_string())));
    b.on(&[ValueKind::Character], "isVowel", |_, r, _| {
        Ok(Value::boolean(matches!(character(r).to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u')))
    });
    b.on(&[ValueKind::Character], "isLetter", |_, r, _| Ok(Value::boolean(character(r).is_alphabetic())));
    b.on(&[ValueKind::Character], "isDigit", |_, r, _| Ok(Value::boolean(character(r).is_ascii_digit())));
}

/// Elements of a sequence as values: characters for text, elements for
/// arrays.
fn elements(env: &ExecEnv, receiver: &Value) -> Vec<Value> {
    match receiver {
        Value::Array(elements) => elements.to_vec(),
        other => text(env, other).chars().map(Value::Character).collect(),
    }
}

fn text(env: &ExecEnv, value: &Value) -> String {
    match value {
        Value::String(s) => s.to_string(),
        Value::Symbol(name) => env.interner.lookup(*name).to_owned(),
        _ => String::new(),
    }
}

fn character(value: &Value) -> char {
    match value {
        Value::Character(c) => *c,
        _ => '\0',
    }
}

fn length(env: &ExecEnv, receiver: &Value) -> usize {
    match receiver {
        Value::Array(elements) => elements.len(),
        other => text(env, other).chars().count(),
    }
}

#[expect(
    clippy::cast_possible_wrap,
    reason = "collection sizes fit in a SmallInteger"
)]
fn size(env: &ExecEnv, receiver: &Value, _: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Integer(length(env, receiver) as i64))
}

fn at(env: &ExecEnv, receiver: &Value, arguments: &[Value]) -> Result<Value, EvalError> {
    let index = integer_arg("at:", arguments, 0)?;
    let element = usize::try_from(index)
        .ok()
        .and_then(|i| i.checked_sub(1))
        .and_then(|i| match receiver {
            Value::Array(elements) => elements.get(i).cloned(),
            other => text(env, other).chars().nth(i).map(Value::Character),
        });
    element.ok_or_else(|| {
        EvalError::primitive_failed(
            "at:",
            format!("index {index} out of bounds for size {}", length(env, receiver)),
        )
    })
}

fn each(env: &ExecEnv, receiver: &Value, arguments: &[Value]) -> Result<Value, EvalError> {
    let block = block_arg("do:", arguments, 0)?;
    for element in elements(env, receiver) {
        block.invoke(env, &[element])?;
    }
    Ok(receiver.clone())
}

fn includes(env: &ExecEnv, receiver: &Value, arguments: &[Value]) -> Result<Value, EvalError> {
    let Some(wanted) = arguments.first() else {
        return Ok(Value::False);
    };
    Ok(Value::boolean(
        elements(env, receiver).iter().any(|element| element.equals(wanted)),
    ))
}

fn collect(env: &ExecEnv, receiver: &Value, arguments: &[Value]) -> Result<Value, EvalError> {
    let block = block_arg("collect:", arguments, 0)?;
    let collected = elements(env, receiver)
        .into_iter()
        .map(|element| block.invoke(env, &[element]))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::array(collected))
}

fn select(env: &ExecEnv, receiver: &Value, arguments: &[Value]) -> Result<Value, EvalError> {
    let block = block_arg("select:", arguments, 0)?;
    let mut selected = Vec::new();
    for element in elements(env, receiver) {
        if block.invoke(env, &[element.clone()])?.as_bool() == Some(true) {
            selected.push(element);
        }
    }
    Ok(Value::array(selected))
}

fn inject_into(env: &ExecEnv, receiver: &Value, arguments: &[Value]) -> Result<Value, EvalError> {
    let block = block_arg("inject:into:", arguments, 1)?;
    let mut accumulator = arguments.first().cloned().unwrap_or(Value::Nil);
    for element in elements(env, receiver) {
        accumulator = block.invoke(env, &[accumulator, element])?;
    }
    Ok(accumulator)
}

fn concatenate(env: &ExecEnv, receiver: &Value, arguments: &[Value]) -> Result<Value, EvalError> {
    match arguments.first() {
        Some(other @ (Value::String(_) | Value::Symbol(_))) => {
            let joined = text(env, receiver) + &text(env, other);
            Ok(Value::String(Arc::from(joined)))
        }
        other => Err(EvalError::primitive_failed(
            ",",
            format!("expected a string argument, got {}", describe(other)),
        )),
    }
}

fn char_value(_: &ExecEnv, receiver: &Value, _: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Integer(i64::from(u32::from(character(receiver)))))
}
