//! Binary and unary operator implementations.
//!
//! Operators work on plain values and report failures as
//! [`Value::Invalid`]; an invalid operand is returned unchanged.

use core::cmp::Ordering;
use std::sync::Arc;

use crate::parser::{BinaryOp, ComparisonOp};
use crate::values::{Map, Value};

/// Evaluate `left op right`.
pub fn binary(op: BinaryOp, left: &Value, right: &Value) -> Value {
    if !left.is_valid() {
        return left.clone();
    }
    if !right.is_valid() {
        return right.clone();
    }
    match op {
        BinaryOp::Add => add(left, right),
        BinaryOp::Sub => sub(left, right),
        BinaryOp::Mul => mul(left, right),
        BinaryOp::Div => div(left, right),
        BinaryOp::Mod => rem(left, right),
    }
}

/// Evaluate a comparison. Never fails.
pub fn compare(op: ComparisonOp, left: &Value, right: &Value) -> Value {
    let result = match op {
        ComparisonOp::Eq => left == right,
        ComparisonOp::Neq => left != right,
        ComparisonOp::Lt => left.compare(right) == Ordering::Less,
        ComparisonOp::Le => left.compare(right) != Ordering::Greater,
        ComparisonOp::Gt => left.compare(right) == Ordering::Greater,
        ComparisonOp::Ge => left.compare(right) != Ordering::Less,
    };
    Value::Bool(result)
}

/// Unary minus.
pub fn negate(value: &Value) -> Value {
    match value {
        Value::Number(n) => Value::Number(-n),
        Value::Invalid(_) => value.clone(),
        _ => Value::invalid(format!("{} cannot be negated", value.describe())),
    }
}

fn mismatch(left: &Value, right: &Value, verb: &str) -> Value {
    Value::invalid(format!(
        "{} and {} cannot be {}",
        left.describe(),
        right.describe(),
        verb
    ))
}

fn add(left: &Value, right: &Value) -> Value {
    match (left, right) {
        (Value::Null, _) => right.clone(),
        (_, Value::Null) => left.clone(),
        (Value::Number(a), Value::Number(b)) => Value::Number(a + b),
        (Value::String(a), Value::String(b)) => {
            let mut s = String::with_capacity(a.len() + b.len());
            s.push_str(a);
            s.push_str(b);
            Value::string(s)
        }
        (Value::Array(a), Value::Array(b)) => {
            let mut items = Arc::clone(a);
            Arc::make_mut(&mut items).extend(b.iter().cloned());
            Value::Array(items)
        }
        (Value::Object(a), Value::Object(b)) => {
            let mut map = Arc::clone(a);
            let inner = Arc::make_mut(&mut map);
            for (k, v) in b.iter() {
                inner.insert(k.clone(), v.clone());
            }
            Value::Object(map)
        }
        _ => mismatch(left, right, "added"),
    }
}

fn sub(left: &Value, right: &Value) -> Value {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Value::Number(a - b),
        (Value::Array(a), Value::Array(b)) => a.iter().filter(|x| !b.contains(x)).cloned().collect(),
        _ => mismatch(left, right, "subtracted"),
    }
}

fn mul(left: &Value, right: &Value) -> Value {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Value::Number(a * b),
        (Value::String(s), Value::Number(n)) | (Value::Number(n), Value::String(s)) => {
            repeat(s, *n)
        }
        (Value::Object(a), Value::Object(b)) => Value::Object(Arc::new(deep_merge(a, b))),
        _ => mismatch(left, right, "multiplied"),
    }
}

/// `"ab" * 3`; counts at or below zero give `null`.
fn repeat(s: &str, n: f64) -> Value {
    if n.is_nan() || n <= 0.0 {
        return Value::Null;
    }
    let count = n.ceil().min(u32::MAX as f64) as usize;
    Value::string(s.repeat(count))
}

fn deep_merge(a: &Map, b: &Map) -> Map {
    let mut out = a.clone();
    for (k, bv) in b {
        let merged = match (out.get(k), bv) {
            (Some(Value::Object(x)), Value::Object(y)) => Value::Object(Arc::new(deep_merge(x, y))),
            _ => bv.clone(),
        };
        out.insert(k.clone(), merged);
    }
    out
}

fn div(left: &Value, right: &Value) -> Value {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => {
            if *b == 0.0 {
                return Value::invalid(format!(
                    "{} and {} cannot be divided because the divisor is zero",
                    left.describe(),
                    right.describe()
                ));
            }
            Value::Number(a / b)
        }
        (Value::String(a), Value::String(b)) => split_str(a, b),
        _ => mismatch(left, right, "divided"),
    }
}

fn rem(left: &Value, right: &Value) -> Value {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => {
            let divisor = to_int(*b);
            if divisor == 0 {
                return Value::invalid(format!(
                    "{} and {} cannot be divided because the divisor is zero",
                    left.describe(),
                    right.describe()
                ));
            }
            Value::Number(to_int(*a).wrapping_rem(divisor) as f64)
        }
        _ => mismatch(left, right, "divided"),
    }
}

/// Saturating float to integer conversion; `nan` is zero.
fn to_int(n: f64) -> i64 {
    n as i64
}

/// Split a string on a literal separator. An empty input splits into no
/// pieces; an empty separator splits into characters.
pub(crate) fn split_str(s: &str, sep: &str) -> Value {
    if s.is_empty() {
        return Value::array(Vec::new());
    }
    if sep.is_empty() {
        return s.chars().map(|c| Value::string(c.to_string())).collect();
    }
    s.split(sep).map(Value::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::parse_json;

    fn json(text: &str) -> Value {
        parse_json(text).unwrap()
    }

    fn error(v: Value) -> String {
        v.invalid_message().expect("expected an invalid value").to_string()
    }

    #[test]
    fn test_addition_by_kind() {
        assert_eq!(binary(BinaryOp::Add, &json("1"), &json("2")), json("3"));
        assert_eq!(binary(BinaryOp::Add, &json("null"), &json("2")), json("2"));
        assert_eq!(binary(BinaryOp::Add, &json("\"a\""), &json("null")), json("\"a\""));
        assert_eq!(binary(BinaryOp::Add, &json("[1]"), &json("[2]")), json("[1,2]"));
        assert_eq!(
            binary(BinaryOp::Add, &json(r#"{"a":1,"b":2}"#), &json(r#"{"b":3}"#)),
            json(r#"{"a":1,"b":3}"#)
        );
        assert_eq!(
            error(binary(BinaryOp::Add, &json("1"), &json("\"a\""))),
            "number (1) and string (\"a\") cannot be added"
        );
    }

    #[test]
    fn test_array_subtraction_removes_every_occurrence() {
        assert_eq!(
            binary(BinaryOp::Sub, &json("[1,2,1,3]"), &json("[1]")),
            json("[2,3]")
        );
    }

    #[test]
    fn test_string_repetition() {
        assert_eq!(binary(BinaryOp::Mul, &json("\"ab\""), &json("3")), json("\"ababab\""));
        assert_eq!(binary(BinaryOp::Mul, &json("2"), &json("\"x\"")), json("\"xx\""));
        assert_eq!(binary(BinaryOp::Mul, &json("\"ab\""), &json("0")), json("null"));
    }

    #[test]
    fn test_object_multiplication_merges_deeply() {
        assert_eq!(
            binary(
                BinaryOp::Mul,
                &json(r#"{"a":{"b":1,"c":2}}"#),
                &json(r#"{"a":{"b":3},"d":4}"#)
            ),
            json(r#"{"a":{"b":3,"c":2},"d":4}"#)
        );
    }

    #[test]
    fn test_division() {
        assert_eq!(binary(BinaryOp::Div, &json("7"), &json("2")), json("3.5"));
        assert_eq!(
            error(binary(BinaryOp::Div, &json("1"), &json("0"))),
            "number (1) and number (0) cannot be divided because the divisor is zero"
        );
        assert_eq!(
            binary(BinaryOp::Div, &json("\"a,b,c\""), &json("\",\"")),
            json(r#"["a","b","c"]"#)
        );
    }

    #[test]
    fn test_modulo_truncates_operands() {
        assert_eq!(binary(BinaryOp::Mod, &json("7"), &json("3")), json("1"));
        assert_eq!(binary(BinaryOp::Mod, &json("-7"), &json("3")), json("-1"));
        assert_eq!(binary(BinaryOp::Mod, &json("7.9"), &json("3.9")), json("1"));
        assert!(!binary(BinaryOp::Mod, &json("1"), &json("0.5")).is_valid());
    }

    #[test]
    fn test_invalid_operands_pass_through() {
        let bad = Value::invalid("boom");
        assert_eq!(error(binary(BinaryOp::Add, &bad, &json("1"))), "boom");
        assert_eq!(error(binary(BinaryOp::Mul, &json("1"), &bad)), "boom");
        assert_eq!(error(negate(&bad)), "boom");
    }

    #[test]
    fn test_comparisons_use_value_order() {
        assert_eq!(compare(ComparisonOp::Lt, &json("null"), &json("false")), json("true"));
        assert_eq!(compare(ComparisonOp::Gt, &json("{}"), &json("[]")), json("true"));
        assert_eq!(compare(ComparisonOp::Eq, &json(r#"{"a":1,"b":2}"#), &json(r#"{"b":2,"a":1}"#)), json("true"));
        assert_eq!(compare(ComparisonOp::Ge, &json("1"), &json("1")), json("true"));
        assert_eq!(compare(ComparisonOp::Neq, &json("1"), &json("1.0")), json("false"));
    }

    #[test]
    fn test_negation() {
        assert_eq!(negate(&json("3")), json("-3"));
        assert_eq!(error(negate(&json("\"a\""))), "string (\"a\") cannot be negated");
    }
}
