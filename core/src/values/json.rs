//! JSON text to [`Value`].
//!
//! Parsing is driven by `serde_json` with its built-in recursion limit
//! switched off; nesting is bounded by the depth counter carried in
//! [`ValueSeed`] instead, so the limit is configurable and deep input is
//! reported as an ordinary syntax error.

use core::fmt;

use serde::de::{self, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};

use super::{Map, Value};

/// Maximum container nesting accepted by [`parse_json`].
pub const DEFAULT_MAX_DEPTH: usize = 512;

const DEPTH_EXCEEDED: &str = "Exceeds depth limit for parsing";

/// A JSON syntax error with its position in the source text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct JsonError {
    pub message: String,
    /// 1-based line.
    pub line: usize,
    /// 1-based column (0 when the error is at the very start of a line).
    pub column: usize,
    /// Byte offset into the source text.
    pub offset: usize,
}

impl JsonError {
    fn new(text: &str, err: serde_json::Error) -> Self {
        let line = err.line();
        let column = err.column();
        Self {
            message: err.to_string(),
            line,
            column,
            offset: offset_of(text, line, column),
        }
    }
}

fn offset_of(text: &str, line: usize, column: usize) -> usize {
    let line_start: usize = text
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(text.len())
}

/// Parse JSON text with the default depth limit.
pub fn parse_json(text: &str) -> Result<Value, JsonError> {
    parse_json_with_max_depth(text, DEFAULT_MAX_DEPTH)
}

/// Parse JSON text, rejecting documents nested deeper than `max_depth`.
pub fn parse_json_with_max_depth(text: &str, max_depth: usize) -> Result<Value, JsonError> {
    let mut de = serde_json::Deserializer::from_str(text);
    de.disable_recursion_limit();
    let value = ValueSeed::new(max_depth)
        .deserialize(&mut de)
        .map_err(|err| JsonError::new(text, err))?;
    de.end().map_err(|err| JsonError::new(text, err))?;
    Ok(value)
}

impl Value {
    /// Parse JSON text. Malformed text yields [`Value::Invalid`] carrying
    /// the syntax error message.
    pub fn parse(text: &str) -> Value {
        parse_json(text).unwrap_or_else(|err| Value::invalid(err.message))
    }
}

#[derive(Debug, Clone, Copy)]
struct ValueSeed {
    depth: usize,
    max_depth: usize,
}

impl ValueSeed {
    fn new(max_depth: usize) -> Self {
        Self {
            depth: 0,
            max_depth,
        }
    }

    fn nested<E: de::Error>(self) -> Result<Self, E> {
        if self.depth >= self.max_depth {
            return Err(E::custom(DEPTH_EXCEEDED));
        }
        Ok(Self {
            depth: self.depth + 1,
            ..self
        })
    }
}

impl<'de> DeserializeSeed<'de> for ValueSeed {
    type Value = Value;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for ValueSeed {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON value")
    }

    fn visit_unit<E>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_bool<E>(self, b: bool) -> Result<Value, E> {
        Ok(Value::Bool(b))
    }

    fn visit_i64<E>(self, n: i64) -> Result<Value, E> {
        Ok(Value::Number(n as f64))
    }

    fn visit_u64<E>(self, n: u64) -> Result<Value, E> {
        Ok(Value::Number(n as f64))
    }

    fn visit_f64<E>(self, n: f64) -> Result<Value, E> {
        Ok(Value::Number(n))
    }

    fn visit_str<E>(self, s: &str) -> Result<Value, E> {
        Ok(Value::string(s))
    }

    fn visit_string<E>(self, s: String) -> Result<Value, E> {
        Ok(Value::from(s))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let inner = self.nested()?;
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element_seed(inner)? {
            items.push(item);
        }
        Ok(Value::array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Value, A::Error> {
        let inner = self.nested()?;
        let mut map = Map::with_capacity(access.size_hint().unwrap_or(0));
        while let Some(key) = access.next_key::<String>()? {
            let value = access.next_value_seed(inner)?;
            map.insert(key, value);
        }
        Ok(Value::object(map))
    }
}
