//! Reading and writing values at paths.
//!
//! A path is an array of components: object keys (strings), array indices
//! (numbers, negative ones counting from the end) and slices
//! (`{"start": s, "end": e}`).

use std::sync::Arc;

use crate::values::{Map, Value, resolve_index, slice_bounds};

/// Largest index an assignment may extend an array to.
const MAX_ARRAY_INDEX: usize = 536_870_911;

fn components(path: &Value) -> Result<&[Value], Value> {
    match path {
        Value::Array(items) => Ok(items),
        Value::Invalid(_) => Err(path.clone()),
        _ => Err(Value::invalid("Path must be specified as an array")),
    }
}

/// The value at `path`; `null` once the walk leaves the document.
pub fn getpath(value: &Value, path: &Value) -> Value {
    let components = match components(path) {
        Ok(components) => components,
        Err(err) => return err,
    };
    let mut current = value.clone();
    for key in components {
        if current.is_null() {
            return Value::Null;
        }
        current = current.index(key);
        if !current.is_valid() {
            return current;
        }
    }
    current
}

/// `value` with the element at `path` replaced by `new`, creating
/// containers along the way.
pub fn setpath(value: &Value, path: &Value, new: Value) -> Value {
    match components(path) {
        Ok(components) => set_at(value.clone(), components, new).unwrap_or_else(|err| err),
        Err(err) => err,
    }
}

fn set_at(value: Value, path: &[Value], new: Value) -> Result<Value, Value> {
    let Some((key, rest)) = path.split_first() else {
        return Ok(new);
    };
    match (value, key) {
        (Value::Null, Value::String(_)) => set_at(Value::object(Map::new()), path, new),
        (Value::Null, Value::Number(_) | Value::Object(_)) => set_at(Value::array(Vec::new()), path, new),
        (Value::Object(mut map), Value::String(k)) => {
            let inner = Arc::make_mut(&mut map);
            let child = inner.get(&**k).cloned().unwrap_or_default();
            let child = set_at(child, rest, new)?;
            inner.insert(k.to_string(), child);
            Ok(Value::Object(map))
        }
        (Value::Array(mut items), Value::Number(n)) => {
            let len = items.len();
            let index = if *n < 0.0 {
                let adjusted = n.floor() + len as f64;
                if adjusted < 0.0 {
                    return Err(Value::invalid("Out of bounds negative array index"));
                }
                adjusted as usize
            } else if *n > MAX_ARRAY_INDEX as f64 {
                return Err(Value::invalid("Array index too large"));
            } else {
                *n as usize
            };
            let inner = Arc::make_mut(&mut items);
            if index >= inner.len() {
                let len = index
                    .checked_add(1)
                    .ok_or_else(|| Value::invalid("Array index too large"))?;
                inner.resize(len, Value::Null);
            }
            let child = core::mem::take(&mut inner[index]);
            inner[index] = set_at(child, rest, new)?;
            Ok(Value::Array(items))
        }
        (Value::Array(mut items), Value::Object(bounds)) => {
            let start = bounds.get("start").cloned().unwrap_or_default();
            let end = bounds.get("end").cloned().unwrap_or_default();
            let (from, to) = slice_bounds(&start, &end, items.len())?;
            let current = Value::array(items[from..to].to_vec());
            match set_at(current, rest, new)? {
                Value::Array(replacement) => {
                    let inner = Arc::make_mut(&mut items);
                    inner.splice(from..to, replacement.iter().cloned());
                    Ok(Value::Array(items))
                }
                _ => Err(Value::invalid(
                    "A slice of an array can only be assigned another array",
                )),
            }
        }
        (value @ Value::Invalid(_), _) => Err(value),
        (_, key @ Value::Invalid(_)) => Err(key.clone()),
        (value, Value::String(k)) => Err(Value::invalid(format!(
            "Cannot index {} with \"{}\"",
            value.kind(),
            k
        ))),
        (value, key) => Err(Value::invalid(format!(
            "Cannot index {} with {}",
            value.kind(),
            key.kind()
        ))),
    }
}

/// `value` with every path in `paths` removed. Longer and later paths go
/// first so removals do not shift each other.
pub fn delpaths(value: &Value, paths: &Value) -> Value {
    let paths = match paths {
        Value::Array(paths) => paths,
        Value::Invalid(_) => return paths.clone(),
        _ => return Value::invalid("Paths must be specified as an array"),
    };
    let mut sorted: Vec<&Value> = paths.iter().collect();
    sorted.sort_by(|a, b| b.compare(a));
    let mut current = value.clone();
    for path in sorted {
        let components = match components(path) {
            Ok(components) => components,
            Err(err) => return err,
        };
        current = match delete_at(current, components) {
            Ok(value) => value,
            Err(err) => return err,
        };
    }
    current
}

fn delete_at(value: Value, path: &[Value]) -> Result<Value, Value> {
    let Some((key, rest)) = path.split_first() else {
        return Ok(Value::Null);
    };
    if value.is_null() {
        return Ok(Value::Null);
    }
    if !rest.is_empty() {
        let child = value.index(key).into_result().map_err(Value::Invalid)?;
        if child.is_null() {
            return Ok(value);
        }
        let child = delete_at(child, rest)?;
        return set_at(value, core::slice::from_ref(key), child);
    }
    match (value, key) {
        (Value::Object(mut map), Value::String(k)) => {
            Arc::make_mut(&mut map).shift_remove(&**k);
            Ok(Value::Object(map))
        }
        (Value::Array(mut items), Value::Number(n)) => {
            if let Some(index) = resolve_index(*n, items.len()) {
                Arc::make_mut(&mut items).remove(index);
            }
            Ok(Value::Array(items))
        }
        (Value::Array(mut items), Value::Object(bounds)) => {
            let start = bounds.get("start").cloned().unwrap_or_default();
            let end = bounds.get("end").cloned().unwrap_or_default();
            let (from, to) = slice_bounds(&start, &end, items.len())?;
            Arc::make_mut(&mut items).drain(from..to);
            Ok(Value::Array(items))
        }
        (value @ Value::Invalid(_), _) => Err(value),
        (value, Value::String(_)) => Err(Value::invalid(format!(
            "Cannot delete field at object index of {}",
            value.kind()
        ))),
        (value, _) => Err(Value::invalid(format!(
            "Cannot delete field at index of {}",
            value.kind()
        ))),
    }
}

pub(super) fn setpath_native(input: &Value, args: &[Value]) -> Value {
    setpath(input, &args[0], args[1].clone())
}

pub(super) fn delpaths_native(input: &Value, args: &[Value]) -> Value {
    delpaths(input, &args[0])
}
