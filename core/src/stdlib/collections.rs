//! Builtins over arrays and objects.

use core::cmp::Ordering;
use std::sync::Arc;

use crate::values::{Map, Value};

// ============================================================================
// Inspection
// ============================================================================

pub(super) fn length(input: &Value, _: &[Value]) -> Value {
    input.length()
}

pub(super) fn keys(input: &Value, _: &[Value]) -> Value {
    input.keys()
}

pub(super) fn keys_unsorted(input: &Value, _: &[Value]) -> Value {
    input.keys_unsorted()
}

pub(super) fn type_of(input: &Value, _: &[Value]) -> Value {
    match input {
        Value::Invalid(_) => input.clone(),
        _ => Value::string(input.type_name()),
    }
}

pub(super) fn not(input: &Value, _: &[Value]) -> Value {
    Value::Bool(!input.is_truthy())
}

/// `has(key)`: object key or in-range array index.
pub(super) fn has(input: &Value, args: &[Value]) -> Value {
    match (input, &args[0]) {
        (Value::Object(map), Value::String(k)) => Value::Bool(map.contains_key(&**k)),
        (Value::Array(items), Value::Number(n)) => {
            Value::Bool(*n >= 0.0 && *n < items.len() as f64)
        }
        (Value::Invalid(_), _) => input.clone(),
        (_, key @ Value::Invalid(_)) => key.clone(),
        (_, key) => Value::invalid(format!(
            "Cannot check whether {} has a {} key",
            input.kind(),
            key.kind()
        )),
    }
}

/// Recursive containment: substrings, sub-arrays (in any order) and
/// sub-objects.
pub(super) fn contains(input: &Value, args: &[Value]) -> Value {
    let needle = &args[0];
    if !input.is_valid() {
        return input.clone();
    }
    if !needle.is_valid() {
        return needle.clone();
    }
    if input.kind() != needle.kind() {
        return Value::invalid(format!(
            "{} and {} cannot have their containment checked",
            input.describe(),
            needle.describe()
        ));
    }
    Value::Bool(contains_value(input, needle))
}

fn contains_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Object(a), Value::Object(b)) => b.iter().all(|(k, bv)| match a.get(k) {
            Some(av) => av.kind() == bv.kind() && contains_value(av, bv),
            None => false,
        }),
        (Value::Array(a), Value::Array(b)) => b
            .iter()
            .all(|bv| a.iter().any(|av| av.kind() == bv.kind() && contains_value(av, bv))),
        (Value::String(a), Value::String(b)) => a.contains(&**b),
        _ => a == b,
    }
}

/// `indices(x)`: positions of a substring, an element or a sub-array.
pub(super) fn indices(input: &Value, args: &[Value]) -> Value {
    let needle = &args[0];
    match (input, needle) {
        (Value::Null, _) | (_, Value::Null) => Value::Null,
        (Value::String(s), Value::String(sub)) => string_indices(s, sub),
        (Value::Array(_), Value::Array(_)) => input.index(needle),
        (Value::Array(_), _) => input.index(&Value::array(vec![needle.clone()])),
        _ => input.index(needle),
    }
}

/// Codepoint offsets of every (possibly overlapping) occurrence.
fn string_indices(s: &str, sub: &str) -> Value {
    if sub.is_empty() {
        return Value::Null;
    }
    let mut found = Vec::new();
    let mut chars: usize = 0;
    for (byte, _) in s.char_indices() {
        if s[byte..].starts_with(sub) {
            found.push(Value::from(chars));
        }
        chars += 1;
    }
    Value::array(found)
}

// ============================================================================
// Restructuring
// ============================================================================

/// `flatten` and `flatten(depth)`.
pub(super) fn flatten(input: &Value, args: &[Value]) -> Value {
    let depth = match args.first() {
        None => f64::INFINITY,
        Some(Value::Number(d)) if *d < 0.0 => {
            return Value::invalid("flatten depth must not be negative");
        }
        Some(Value::Number(d)) => *d,
        Some(other @ Value::Invalid(_)) => return other.clone(),
        Some(_) => return Value::invalid("flatten depth must not be negative"),
    };
    match input {
        Value::Array(items) => {
            let mut out = Vec::new();
            flatten_into(items, depth, &mut out);
            Value::array(out)
        }
        Value::Invalid(_) => input.clone(),
        _ => Value::invalid(format!("Cannot iterate over {}", input.describe())),
    }
}

fn flatten_into(items: &[Value], depth: f64, out: &mut Vec<Value>) {
    for item in items {
        match item {
            Value::Array(inner) if depth > 0.0 => flatten_into(inner, depth - 1.0, out),
            _ => out.push(item.clone()),
        }
    }
}

pub(super) fn reverse(input: &Value, _: &[Value]) -> Value {
    match input {
        Value::Array(items) => items.iter().rev().cloned().collect(),
        Value::String(s) => Value::string(s.chars().rev().collect::<String>()),
        Value::Null => Value::array(Vec::new()),
        Value::Invalid(_) => input.clone(),
        _ => Value::invalid(format!("Cannot reverse {}", input.describe())),
    }
}

/// Rows to columns, padding short rows with `null`.
pub(super) fn transpose(input: &Value, _: &[Value]) -> Value {
    let rows = match input {
        Value::Array(rows) => rows,
        Value::Invalid(_) => return input.clone(),
        _ => return Value::invalid(format!("Cannot transpose {}", input.describe())),
    };
    let mut width = 0;
    for row in rows.iter() {
        match row {
            Value::Array(cells) => width = width.max(cells.len()),
            Value::Null => {}
            _ => return Value::invalid(format!("Cannot transpose {}", row.describe())),
        }
    }
    (0..width)
        .map(|col| {
            rows.iter()
                .map(|row| match row {
                    Value::Array(cells) => cells.get(col).cloned().unwrap_or_default(),
                    _ => Value::Null,
                })
                .collect::<Value>()
        })
        .collect()
}

pub(super) fn to_entries(input: &Value, _: &[Value]) -> Value {
    match input {
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| Value::from_pairs([("key", Value::string(k.as_str())), ("value", v.clone())]))
            .collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| Value::from_pairs([("key", Value::from(i)), ("value", v.clone())]))
            .collect(),
        Value::Invalid(_) => input.clone(),
        _ => Value::invalid(format!("{} has no keys", input.describe())),
    }
}

/// Entry keys come from `key`, falling back to `k`/`name`/`Name`/`K`/`Key`;
/// non-string keys are serialized. Values come from `value`, else `v`.
pub(super) fn from_entries(input: &Value, _: &[Value]) -> Value {
    let entries = match input {
        Value::Array(items) => items,
        Value::Invalid(_) => return input.clone(),
        _ => return Value::invalid(format!("Cannot iterate over {}", input.describe())),
    };
    let mut map = Map::new();
    for entry in entries.iter() {
        let fields = match entry {
            Value::Object(fields) => fields,
            _ => return Value::invalid(format!("Cannot index {} with \"key\"", entry.kind())),
        };
        let key = match fields.get("key") {
            Some(key) if !key.is_null() => key.clone(),
            _ => ["k", "name", "Name", "K"]
                .iter()
                .filter_map(|name| fields.get(*name))
                .find(|v| v.is_truthy())
                .or_else(|| fields.get("Key"))
                .cloned()
                .unwrap_or_default(),
        };
        let key = match key {
            Value::String(s) => s.to_string(),
            other => other.to_string(),
        };
        let value = match fields.get("value") {
            Some(value) => value.clone(),
            None => fields.get("v").cloned().unwrap_or_default(),
        };
        map.insert(key, value);
    }
    Value::object(map)
}

// ============================================================================
// Ordering
// ============================================================================

fn sortable<'a>(input: &'a Value, what: &str) -> Result<&'a Arc<Vec<Value>>, Value> {
    match input {
        Value::Array(items) => Ok(items),
        Value::Invalid(_) => Err(input.clone()),
        _ => Err(Value::invalid(format!(
            "{} cannot be {}, as it is not an array",
            input.describe(),
            what
        ))),
    }
}

pub(super) fn sort(input: &Value, _: &[Value]) -> Value {
    match sortable(input, "sorted") {
        Ok(items) => {
            let mut items = items.to_vec();
            items.sort_by(Value::compare);
            Value::array(items)
        }
        Err(err) => err,
    }
}

/// Pair each element with its precomputed sort key.
fn keyed<'a>(input: &'a Value, args: &'a [Value], what: &str) -> Result<Vec<(&'a Value, &'a Value)>, Value> {
    let items = sortable(input, what)?;
    let keys = match &args[0] {
        Value::Array(keys) if keys.len() == items.len() => keys,
        Value::Invalid(_) => return Err(args[0].clone()),
        _ => return Err(Value::invalid("Sort keys must be an array of the same length")),
    };
    let mut pairs: Vec<(&Value, &Value)> = keys.iter().zip(items.iter()).collect();
    pairs.sort_by(|a, b| a.0.compare(b.0));
    Ok(pairs)
}

/// `sort_by(f)` given `map([f])`; stable.
pub(super) fn sort_by_impl(input: &Value, args: &[Value]) -> Value {
    match keyed(input, args, "sorted") {
        Ok(pairs) => pairs.into_iter().map(|(_, v)| v.clone()).collect(),
        Err(err) => err,
    }
}

/// `group_by(f)` given `map([f])`.
pub(super) fn group_by_impl(input: &Value, args: &[Value]) -> Value {
    let pairs = match keyed(input, args, "grouped") {
        Ok(pairs) => pairs,
        Err(err) => return err,
    };
    let mut groups: Vec<Value> = Vec::new();
    let mut current: Vec<Value> = Vec::new();
    let mut current_key: Option<&Value> = None;
    for (key, value) in pairs {
        if let Some(prev) = current_key {
            if prev.compare(key) != Ordering::Equal {
                groups.push(Value::array(core::mem::take(&mut current)));
            }
        }
        current_key = Some(key);
        current.push(value.clone());
    }
    if !current.is_empty() {
        groups.push(Value::array(current));
    }
    Value::array(groups)
}

pub(super) fn unique(input: &Value, _: &[Value]) -> Value {
    match sortable(input, "sorted") {
        Ok(items) => {
            let mut items = items.to_vec();
            items.sort_by(Value::compare);
            items.dedup_by(|a, b| a.compare(b) == Ordering::Equal);
            Value::array(items)
        }
        Err(err) => err,
    }
}

/// The first minimal element, or the last maximal one; `null` when empty.
fn extreme<'a>(pairs: impl Iterator<Item = (&'a Value, &'a Value)>, max: bool) -> Value {
    let mut best: Option<(&Value, &Value)> = None;
    for (key, value) in pairs {
        let better = match best {
            None => true,
            Some((best_key, _)) => {
                let ord = key.compare(best_key);
                if max {
                    ord != Ordering::Less
                } else {
                    ord == Ordering::Less
                }
            }
        };
        if better {
            best = Some((key, value));
        }
    }
    best.map(|(_, v)| v.clone()).unwrap_or_default()
}

pub(super) fn min(input: &Value, _: &[Value]) -> Value {
    match sortable(input, "compared") {
        Ok(items) => extreme(items.iter().map(|v| (v, v)), false),
        Err(err) => err,
    }
}

pub(super) fn max(input: &Value, _: &[Value]) -> Value {
    match sortable(input, "compared") {
        Ok(items) => extreme(items.iter().map(|v| (v, v)), true),
        Err(err) => err,
    }
}

fn extreme_by(input: &Value, args: &[Value], max: bool) -> Value {
    let items = match sortable(input, "compared") {
        Ok(items) => items,
        Err(err) => return err,
    };
    match &args[0] {
        Value::Array(keys) if keys.len() == items.len() => extreme(keys.iter().zip(items.iter()), max),
        Value::Invalid(_) => args[0].clone(),
        _ => Value::invalid("Sort keys must be an array of the same length"),
    }
}

pub(super) fn min_by_impl(input: &Value, args: &[Value]) -> Value {
    extreme_by(input, args, false)
}

pub(super) fn max_by_impl(input: &Value, args: &[Value]) -> Value {
    extreme_by(input, args, true)
}
