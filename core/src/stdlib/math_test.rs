//! Tests for the numeric builtins.

use super::math::*;
use crate::values::Value;
use pretty_assertions::assert_eq;

fn num(n: f64) -> Value {
    Value::Number(n)
}

#[test]
fn test_rounding() {
    assert_eq!(floor(&num(1.7), &[]), num(1.0));
    assert_eq!(floor(&num(-1.2), &[]), num(-2.0));
    assert_eq!(ceil(&num(1.2), &[]), num(2.0));
    assert_eq!(round(&num(2.5), &[]), num(3.0));
    assert_eq!(round(&num(-2.5), &[]), num(-3.0));
    assert_eq!(trunc(&num(-1.7), &[]), num(-1.0));
}

#[test]
fn test_absolute_values() {
    assert_eq!(fabs(&num(-3.0), &[]), num(3.0));
    assert_eq!(abs(&num(-3.0), &[]), num(3.0));
    assert_eq!(abs(&Value::from("x"), &[]), Value::from("x"));
    assert!(!fabs(&Value::from("x"), &[]).is_valid());
}

#[test]
fn test_powers_and_logarithms() {
    assert_eq!(sqrt(&num(16.0), &[]), num(4.0));
    assert_eq!(pow(&Value::Null, &[num(2.0), num(10.0)]), num(1024.0));
    assert_eq!(log2(&num(8.0), &[]), num(3.0));
    assert_eq!(log10(&num(1.0), &[]), num(0.0));
    assert_eq!(exp(&num(0.0), &[]), num(1.0));
    assert_eq!(exp2(&num(3.0), &[]), num(8.0));
    assert_eq!(exp10(&num(2.0), &[]), num(100.0));
    assert_eq!(log(&num(1.0), &[]), num(0.0));
}

#[test]
fn test_non_numbers_are_rejected() {
    assert_eq!(
        floor(&Value::from("1"), &[]).invalid_message(),
        Some(r#"string ("1") number required"#)
    );
    assert_eq!(
        pow(&Value::Null, &[num(2.0), Value::Null]).invalid_message(),
        Some("null (null) number required")
    );
}

#[test]
fn test_classification() {
    assert_eq!(isinfinite(&infinite(&Value::Null, &[]), &[]), Value::Bool(true));
    assert_eq!(isnan(&nan(&Value::Null, &[]), &[]), Value::Bool(true));
    assert_eq!(isnan(&num(1.0), &[]), Value::Bool(false));
    assert_eq!(isnormal(&num(1.0), &[]), Value::Bool(true));
    assert_eq!(isnormal(&num(0.0), &[]), Value::Bool(false));
}
