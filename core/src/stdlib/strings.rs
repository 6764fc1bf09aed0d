//! String builtins.

use crate::evaluator::operators::split_str;
use crate::values::{DumpStyle, Value, parse_json};

/// The string itself, or the compact JSON text of any other value.
pub(crate) fn to_text(value: &Value) -> Result<String, Value> {
    match value {
        Value::String(s) => Ok(s.to_string()),
        Value::Invalid(_) => Err(value.clone()),
        _ => value
            .dump(DumpStyle::Compact)
            .map_err(|err| Value::invalid(err.0)),
    }
}

fn string_input<'a>(input: &'a Value, message: &str) -> Result<&'a str, Value> {
    match input {
        Value::String(s) => Ok(s),
        Value::Invalid(_) => Err(input.clone()),
        _ => Err(Value::invalid(message)),
    }
}

// ============================================================================
// Conversion
// ============================================================================

pub(super) fn tostring(input: &Value, _: &[Value]) -> Value {
    match input {
        Value::String(_) => input.clone(),
        _ => to_text(input).map(Value::from).unwrap_or_else(|err| err),
    }
}

pub(super) fn tojson(input: &Value, _: &[Value]) -> Value {
    match input {
        Value::Invalid(_) => input.clone(),
        _ => match input.dump(DumpStyle::Compact) {
            Ok(text) => Value::from(text),
            Err(err) => Value::invalid(err.0),
        },
    }
}

pub(super) fn fromjson(input: &Value, _: &[Value]) -> Value {
    let text = match string_input(input, &format!("{} cannot be parsed as JSON", input.describe())) {
        Ok(text) => text,
        Err(err) => return err,
    };
    match parse_json(text) {
        Ok(value) => value,
        Err(err) => Value::invalid(format!("{} (while parsing '{}')", err.message, text)),
    }
}

pub(super) fn tonumber(input: &Value, _: &[Value]) -> Value {
    match input {
        Value::Number(_) | Value::Invalid(_) => input.clone(),
        Value::String(s) => match parse_json(s.trim()) {
            Ok(n @ Value::Number(_)) => n,
            _ => Value::invalid(format!("Cannot parse '{}' as JSON", s)),
        },
        _ => Value::invalid(format!("{} cannot be parsed as a number", input.describe())),
    }
}

pub(super) fn utf8bytelength(input: &Value, _: &[Value]) -> Value {
    match input {
        Value::String(s) => Value::from(s.len()),
        Value::Invalid(_) => input.clone(),
        _ => Value::invalid(format!("{} only strings have UTF-8 byte length", input.describe())),
    }
}

// ============================================================================
// Case and trimming
// ============================================================================

pub(super) fn ascii_downcase(input: &Value, _: &[Value]) -> Value {
    match string_input(input, "ascii_downcase input must be a string") {
        Ok(s) => Value::from(s.to_ascii_lowercase()),
        Err(err) => err,
    }
}

pub(super) fn ascii_upcase(input: &Value, _: &[Value]) -> Value {
    match string_input(input, "ascii_upcase input must be a string") {
        Ok(s) => Value::from(s.to_ascii_uppercase()),
        Err(err) => err,
    }
}

/// Inputs that are not strings, or do not carry the prefix, pass through.
pub(super) fn ltrimstr(input: &Value, args: &[Value]) -> Value {
    match (input, &args[0]) {
        (Value::String(s), Value::String(prefix)) => match s.strip_prefix(&**prefix) {
            Some(rest) => Value::from(rest),
            None => input.clone(),
        },
        _ => input.clone(),
    }
}

pub(super) fn rtrimstr(input: &Value, args: &[Value]) -> Value {
    match (input, &args[0]) {
        (Value::String(s), Value::String(suffix)) => match s.strip_suffix(&**suffix) {
            Some(rest) => Value::from(rest),
            None => input.clone(),
        },
        _ => input.clone(),
    }
}

pub(super) fn startswith(input: &Value, args: &[Value]) -> Value {
    match (input, &args[0]) {
        (Value::String(s), Value::String(prefix)) => Value::Bool(s.starts_with(&**prefix)),
        _ => Value::invalid("startswith() requires string inputs"),
    }
}

pub(super) fn endswith(input: &Value, args: &[Value]) -> Value {
    match (input, &args[0]) {
        (Value::String(s), Value::String(suffix)) => Value::Bool(s.ends_with(&**suffix)),
        _ => Value::invalid("endswith() requires string inputs"),
    }
}

fn trimmed(input: &Value, f: impl FnOnce(&str) -> &str) -> Value {
    match string_input(input, "trim input must be a string") {
        Ok(s) => Value::from(f(s)),
        Err(err) => err,
    }
}

pub(super) fn trim(input: &Value, _: &[Value]) -> Value {
    trimmed(input, str::trim)
}

pub(super) fn ltrim(input: &Value, _: &[Value]) -> Value {
    trimmed(input, str::trim_start)
}

pub(super) fn rtrim(input: &Value, _: &[Value]) -> Value {
    trimmed(input, str::trim_end)
}

// ============================================================================
// Codepoints, splitting, joining
// ============================================================================

pub(super) fn explode(input: &Value, _: &[Value]) -> Value {
    match string_input(input, "explode input must be a string") {
        Ok(s) => s.chars().map(|c| Value::from(c as u32 as usize)).collect(),
        Err(err) => err,
    }
}

/// Invalid codepoints become U+FFFD.
pub(super) fn implode(input: &Value, _: &[Value]) -> Value {
    let items = match input {
        Value::Array(items) => items,
        Value::Invalid(_) => return input.clone(),
        _ => return Value::invalid("implode input must be an array"),
    };
    let mut out = String::with_capacity(items.len());
    for item in items.iter() {
        match item {
            Value::Number(n) => {
                let c = if *n >= 0.0 && *n <= char::MAX as u32 as f64 {
                    char::from_u32(*n as u32)
                } else {
                    None
                };
                match c {
                    Some(c) => out.push(c),
                    None => return Value::invalid("Invalid codepoint literal"),
                }
            }
            _ => return Value::invalid("Unicode codepoint must be numeric"),
        }
    }
    Value::from(out)
}

/// `split(sep)` on a literal separator.
pub(super) fn split(input: &Value, args: &[Value]) -> Value {
    match (input, &args[0]) {
        (Value::String(s), Value::String(sep)) => split_str(s, sep),
        (Value::Invalid(_), _) => input.clone(),
        _ => Value::invalid("split input and separator must be strings"),
    }
}

/// `join(sep)`: `null` joins as the empty string, numbers and booleans as
/// their JSON text.
pub(super) fn join(input: &Value, args: &[Value]) -> Value {
    let items = match input {
        Value::Array(items) => items,
        Value::Invalid(_) => return input.clone(),
        _ => return Value::invalid(format!("Cannot iterate over {}", input.describe())),
    };
    let sep = match &args[0] {
        Value::String(sep) => &**sep,
        Value::Invalid(_) => return args[0].clone(),
        other if items.len() > 1 => {
            return Value::invalid(format!(
                "string (\"\") and {} cannot be added",
                other.describe()
            ));
        }
        _ => "",
    };
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(sep);
        }
        match item {
            Value::Null => {}
            Value::String(s) => out.push_str(s),
            Value::Number(_) | Value::Bool(_) => out.push_str(&item.to_string()),
            Value::Invalid(_) => return item.clone(),
            _ => return Value::invalid(format!("Cannot join with {}", item.kind())),
        }
    }
    Value::from(out)
}
