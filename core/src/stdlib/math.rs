//! Numeric builtins.
//!
//! Functions: floor, ceil, round, trunc, fabs, abs, sqrt, log, log2,
//! log10, exp, exp2, exp10, pow
//! Classification: infinite, nan, isinfinite, isnan, isnormal

use crate::values::Value;

/// Apply `f` to a number input; anything else is an error.
fn unary(input: &Value, f: impl FnOnce(f64) -> f64) -> Value {
    match input {
        Value::Number(n) => Value::Number(f(*n)),
        Value::Invalid(_) => input.clone(),
        _ => Value::invalid(format!("{} number required", input.describe())),
    }
}

// ============================================================================
// Rounding
// ============================================================================

pub(super) fn floor(input: &Value, _: &[Value]) -> Value {
    unary(input, f64::floor)
}

pub(super) fn ceil(input: &Value, _: &[Value]) -> Value {
    unary(input, f64::ceil)
}

/// Halves round away from zero.
pub(super) fn round(input: &Value, _: &[Value]) -> Value {
    unary(input, f64::round)
}

pub(super) fn trunc(input: &Value, _: &[Value]) -> Value {
    unary(input, f64::trunc)
}

pub(super) fn fabs(input: &Value, _: &[Value]) -> Value {
    unary(input, f64::abs)
}

/// Negative numbers are negated; other values pass through unchanged.
pub(super) fn abs(input: &Value, _: &[Value]) -> Value {
    match input {
        Value::Number(n) if *n < 0.0 => Value::Number(-n),
        _ => input.clone(),
    }
}

// ============================================================================
// Powers and logarithms
// ============================================================================

pub(super) fn sqrt(input: &Value, _: &[Value]) -> Value {
    unary(input, f64::sqrt)
}

pub(super) fn log(input: &Value, _: &[Value]) -> Value {
    unary(input, f64::ln)
}

pub(super) fn log2(input: &Value, _: &[Value]) -> Value {
    unary(input, f64::log2)
}

pub(super) fn log10(input: &Value, _: &[Value]) -> Value {
    unary(input, f64::log10)
}

pub(super) fn exp(input: &Value, _: &[Value]) -> Value {
    unary(input, f64::exp)
}

pub(super) fn exp2(input: &Value, _: &[Value]) -> Value {
    unary(input, f64::exp2)
}

pub(super) fn exp10(input: &Value, _: &[Value]) -> Value {
    unary(input, |n| 10f64.powf(n))
}

/// `pow(base; exponent)`
pub(super) fn pow(_: &Value, args: &[Value]) -> Value {
    match (&args[0], &args[1]) {
        (Value::Number(base), Value::Number(exp)) => Value::Number(base.powf(*exp)),
        (bad @ Value::Invalid(_), _) | (_, bad @ Value::Invalid(_)) => bad.clone(),
        (Value::Number(_), other) | (other, _) => {
            Value::invalid(format!("{} number required", other.describe()))
        }
    }
}

// ============================================================================
// Classification
// ============================================================================

pub(super) fn infinite(_: &Value, _: &[Value]) -> Value {
    Value::Number(f64::INFINITY)
}

pub(super) fn nan(_: &Value, _: &[Value]) -> Value {
    Value::Number(f64::NAN)
}

fn classify(input: &Value, f: impl FnOnce(f64) -> bool) -> Value {
    match input {
        Value::Number(n) => Value::Bool(f(*n)),
        Value::Invalid(_) => input.clone(),
        _ => Value::invalid(format!("{} number required", input.describe())),
    }
}

pub(super) fn isinfinite(input: &Value, _: &[Value]) -> Value {
    classify(input, f64::is_infinite)
}

pub(super) fn isnan(input: &Value, _: &[Value]) -> Value {
    classify(input, f64::is_nan)
}

pub(super) fn isnormal(input: &Value, _: &[Value]) -> Value {
    classify(input, f64::is_normal)
}
