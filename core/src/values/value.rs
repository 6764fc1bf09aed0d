use core::cmp::Ordering;
use std::sync::Arc;

use indexmap::IndexMap;
use static_assertions::assert_impl_all;

/// Object storage: lookup by key, iteration in insertion order.
pub type Map = IndexMap<String, Value>;

/// A JSON value, or an error travelling as a value.
///
/// `Invalid` is produced by operations that fail on their operands (adding
/// a number to a string, taking the length of a boolean, ...). Every value
/// operation returns an `Invalid` operand unchanged, so a failure deep in
/// a computation surfaces at the end of it. The evaluator turns an
/// `Invalid` that reaches the output stream into an execution error.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(Arc<str>),
    Array(Arc<Vec<Value>>),
    Object(Arc<Map>),
    Invalid(Arc<str>),
}

assert_impl_all!(Value: Send, Sync);

/// The kind of a value, in jq sort order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kind {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
    Invalid,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Null => "null",
            Kind::Boolean => "boolean",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::Array => "array",
            Kind::Object => "object",
            Kind::Invalid => "invalid",
        }
    }
}

impl core::fmt::Display for Kind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Value {
    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Value::String(s.into())
    }

    pub fn number(n: impl Into<f64>) -> Self {
        Value::Number(n.into())
    }

    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Arc::new(items))
    }

    pub fn object(map: Map) -> Self {
        Value::Object(Arc::new(map))
    }

    pub fn invalid(message: impl Into<Arc<str>>) -> Self {
        Value::Invalid(message.into())
    }

    /// Build an object from `(key, value)` pairs; later keys win.
    pub fn from_pairs<K: Into<String>>(pairs: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::object(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Boolean,
            Value::Number(_) => Kind::Number,
            Value::String(_) => Kind::String,
            Value::Array(_) => Kind::Array,
            Value::Object(_) => Kind::Object,
            Value::Invalid(_) => Kind::Invalid,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.kind().as_str()
    }

    pub fn is_valid(&self) -> bool {
        !matches!(self, Value::Invalid(_))
    }

    /// Only `null` and `false` are falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Null | Value::Bool(false))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn invalid_message(&self) -> Option<&str> {
        match self {
            Value::Invalid(msg) => Some(msg),
            _ => None,
        }
    }

    /// Convert into a `Result`, splitting off the invalid variant.
    pub fn into_result(self) -> Result<Value, Arc<str>> {
        match self {
            Value::Invalid(msg) => Err(msg),
            v => Ok(v),
        }
    }

    /// `kind (truncated dump)`, the way runtime error messages refer to
    /// an operand.
    pub fn describe(&self) -> String {
        const MAX: usize = 11;
        let dumped = self.to_string();
        if dumped.len() <= MAX {
            return format!("{} ({})", self.kind(), dumped);
        }
        let mut cut = MAX;
        while !dumped.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{} ({}...)", self.kind(), &dumped[..cut])
    }

    /// Total order used by sorting and comparison operators.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Number(a), Value::Number(b)) => compare_numbers(*a, *b),
            (Value::String(a), Value::String(b)) => a.as_bytes().cmp(b.as_bytes()),
            (Value::Array(a), Value::Array(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    match x.compare(y) {
                        Ordering::Equal => continue,
                        ord => return ord,
                    }
                }
                a.len().cmp(&b.len())
            }
            (Value::Object(a), Value::Object(b)) => {
                let mut ka: Vec<&String> = a.keys().collect();
                let mut kb: Vec<&String> = b.keys().collect();
                ka.sort();
                kb.sort();
                match ka.cmp(&kb) {
                    Ordering::Equal => {}
                    ord => return ord,
                }
                for key in ka {
                    match a[key].compare(&b[key]) {
                        Ordering::Equal => continue,
                        ord => return ord,
                    }
                }
                Ordering::Equal
            }
            (Value::Invalid(a), Value::Invalid(b)) => a.cmp(b),
            _ => self.kind().cmp(&other.kind()),
        }
    }

    /// Object keys sorted by codepoint, or array indices.
    pub fn keys(&self) -> Value {
        match self {
            Value::Object(map) => {
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                keys.into_iter().map(|k| Value::string(k.as_str())).collect()
            }
            Value::Array(items) => (0..items.len()).map(|i| Value::Number(i as f64)).collect(),
            Value::Invalid(_) => self.clone(),
            _ => Value::invalid(format!("{} has no keys", self.describe())),
        }
    }

    /// Object keys in insertion order.
    pub fn keys_unsorted(&self) -> Value {
        match self {
            Value::Object(map) => map.keys().map(|k| Value::string(k.as_str())).collect(),
            _ => self.keys(),
        }
    }

    /// Length as jq defines it for every kind.
    pub fn length(&self) -> Value {
        match self {
            Value::Null => Value::Number(0.0),
            Value::Bool(_) => Value::invalid(format!("{} has no length", self.describe())),
            Value::Number(n) => Value::Number(n.abs()),
            Value::String(s) => Value::Number(s.chars().count() as f64),
            Value::Array(items) => Value::Number(items.len() as f64),
            Value::Object(map) => Value::Number(map.len() as f64),
            Value::Invalid(_) => self.clone(),
        }
    }

    /// Read one element by key or index. Missing keys and out of range
    /// indices read as `null`.
    pub fn index(&self, key: &Value) -> Value {
        match (self, key) {
            (Value::Invalid(_), _) => self.clone(),
            (_, Value::Invalid(_)) => key.clone(),
            (Value::Object(map), Value::String(k)) => map.get(&**k).cloned().unwrap_or_default(),
            (Value::Array(items), Value::Number(n)) => match resolve_index(*n, items.len()) {
                Some(i) => items[i].clone(),
                None => Value::Null,
            },
            (Value::Array(_) | Value::String(_), Value::Object(_)) => self.slice_by_object(key),
            (Value::Null, Value::String(_) | Value::Number(_) | Value::Object(_)) => Value::Null,
            (Value::Array(items), Value::Array(needle)) => indices_of_subarray(items, needle),
            (_, Value::String(k)) => {
                Value::invalid(format!("Cannot index {} with \"{}\"", self.kind(), k))
            }
            _ => Value::invalid(format!("Cannot index {} with {}", self.kind(), key.kind())),
        }
    }

    fn slice_by_object(&self, key: &Value) -> Value {
        let map = match key {
            Value::Object(map) => map,
            _ => return Value::invalid("Slice key must be an object"),
        };
        let start = map.get("start").cloned().unwrap_or_default();
        let end = map.get("end").cloned().unwrap_or_default();
        self.slice(&start, &end)
    }

    /// `.[start:end]` on arrays and strings. Bounds clamp; `null` means
    /// open.
    pub fn slice(&self, start: &Value, end: &Value) -> Value {
        let len = match self {
            Value::Null => return Value::Null,
            Value::Array(items) => items.len(),
            Value::String(s) => s.chars().count(),
            Value::Invalid(_) => return self.clone(),
            _ => return Value::invalid(format!("Cannot index {} with object", self.kind())),
        };
        let (from, to) = match slice_bounds(start, end, len) {
            Ok(bounds) => bounds,
            Err(invalid) => return invalid,
        };
        match self {
            Value::Array(items) => Value::array(items[from..to].to_vec()),
            Value::String(s) => Value::string(s.chars().skip(from).take(to - from).collect::<String>()),
            _ => Value::Null,
        }
    }
}

/// Resolve a possibly negative, possibly fractional index against `len`.
pub(crate) fn resolve_index(n: f64, len: usize) -> Option<usize> {
    if n.is_nan() {
        return None;
    }
    let mut i = n.floor();
    if i < 0.0 {
        i += len as f64;
    }
    if i < 0.0 || i >= len as f64 {
        None
    } else {
        Some(i as usize)
    }
}

/// Clamp `start`/`end` slice bounds to `0..=len`.
pub(crate) fn slice_bounds(start: &Value, end: &Value, len: usize) -> Result<(usize, usize), Value> {
    let clamp = |v: &Value, default: usize| -> Result<usize, Value> {
        match v {
            Value::Null => Ok(default),
            Value::Number(n) => {
                let mut i = n.floor();
                if i < 0.0 {
                    i += len as f64;
                }
                Ok(i.clamp(0.0, len as f64) as usize)
            }
            _ => Err(Value::invalid(
                "Start and end indices of an array slice must be numbers",
            )),
        }
    };
    let from = clamp(start, 0)?;
    let to = clamp(end, len)?;
    Ok((from, to.max(from)))
}

fn indices_of_subarray(items: &[Value], needle: &[Value]) -> Value {
    if needle.is_empty() {
        return Value::Null;
    }
    let mut found = Vec::new();
    for i in 0..items.len() {
        if items.len() - i < needle.len() {
            break;
        }
        if items[i..i + needle.len()] == *needle {
            found.push(Value::Number(i as f64));
        }
    }
    Value::array(found)
}

fn compare_numbers(a: f64, b: f64) -> Ordering {
    match a.partial_cmp(&b) {
        Some(ord) => ord,
        None => match (a.is_nan(), b.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            _ => Ordering::Greater,
        },
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Arc::ptr_eq(a, b) || a == b,
            (Value::Object(a), Value::Object(b)) => {
                Arc::ptr_eq(a, b)
                    || (a.len() == b.len()
                        && a.iter().all(|(k, v)| b.get(k).is_some_and(|w| v == w)))
            }
            (Value::Invalid(a), Value::Invalid(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.compare(other))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s.into())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::array(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::object(map)
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Value::array(iter.into_iter().collect())
    }
}
