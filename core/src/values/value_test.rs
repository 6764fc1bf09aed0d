use core::cmp::Ordering;

use pretty_assertions::assert_eq;

use super::{Kind, Map, Value};

fn json(text: &str) -> Value {
    super::parse_json(text).expect("test JSON should parse")
}

#[test]
fn test_kinds_sort_in_jq_order() {
    let mut values = vec![
        json(r#"{"a":1}"#),
        json("[1]"),
        json(r#""s""#),
        json("1"),
        json("true"),
        json("false"),
        json("null"),
    ];
    values.sort_by(Value::compare);
    let kinds: Vec<Kind> = values.iter().map(Value::kind).collect();
    assert_eq!(
        kinds,
        vec![
            Kind::Null,
            Kind::Boolean,
            Kind::Boolean,
            Kind::Number,
            Kind::String,
            Kind::Array,
            Kind::Object,
        ]
    );
    assert_eq!(values[1], Value::Bool(false));
}

#[test]
fn test_object_equality_ignores_key_order() {
    assert_eq!(json(r#"{"a":1,"b":2}"#), json(r#"{"b":2,"a":1}"#));
    assert_ne!(json(r#"{"a":1}"#), json(r#"{"a":1,"b":2}"#));
}

#[test]
fn test_nan_is_not_equal_to_itself_but_sorts_first() {
    let nan = Value::Number(f64::NAN);
    assert_ne!(nan, nan.clone());
    assert_eq!(nan.compare(&Value::Number(-1e300)), Ordering::Less);
}

#[test]
fn test_objects_compare_by_keys_then_values() {
    assert_eq!(json(r#"{"a":2}"#).compare(&json(r#"{"b":1}"#)), Ordering::Less);
    assert_eq!(json(r#"{"a":1}"#).compare(&json(r#"{"a":2}"#)), Ordering::Less);
    assert_eq!(json("[1,2]").compare(&json("[1,2,0]")), Ordering::Less);
}

#[test]
fn test_truthiness() {
    assert!(!Value::Null.is_truthy());
    assert!(!Value::Bool(false).is_truthy());
    assert!(Value::Number(0.0).is_truthy());
    assert!(Value::string("").is_truthy());
}

#[test]
fn test_index_reads() {
    let v = json(r#"{"a":[10,20,30]}"#);
    let arr = v.index(&Value::from("a"));
    assert_eq!(arr.index(&Value::from(1.0)), Value::from(20.0));
    assert_eq!(arr.index(&Value::from(-1.0)), Value::from(30.0));
    assert_eq!(arr.index(&Value::from(5.0)), Value::Null);
    assert_eq!(v.index(&Value::from("missing")), Value::Null);
    assert_eq!(Value::Null.index(&Value::from("a")), Value::Null);
}

#[test]
fn test_index_wrong_shape_is_invalid() {
    let err = Value::from(5.0).index(&Value::from("x"));
    assert_eq!(err.invalid_message(), Some("Cannot index number with \"x\""));

    let err = json(r#"{"a":1}"#).index(&Value::from(0.0));
    assert_eq!(err.invalid_message(), Some("Cannot index object with number"));
}

#[test]
fn test_invalid_propagates_through_index() {
    let bad = Value::invalid("boom");
    assert_eq!(bad.index(&Value::from("a")).invalid_message(), Some("boom"));
    assert_eq!(json("[1]").index(&bad).invalid_message(), Some("boom"));
}

#[test]
fn test_slices_clamp() {
    let v = json("[0,1,2,3,4]");
    assert_eq!(v.slice(&Value::from(1.0), &Value::from(3.0)), json("[1,2]"));
    assert_eq!(v.slice(&Value::from(-2.0), &Value::Null), json("[3,4]"));
    assert_eq!(v.slice(&Value::from(10.0), &Value::Null), json("[]"));
    assert_eq!(v.slice(&Value::from(3.0), &Value::from(1.0)), json("[]"));
    assert_eq!(
        Value::from("héllo").slice(&Value::from(1.0), &Value::from(3.0)),
        Value::from("él")
    );
}

#[test]
fn test_length() {
    assert_eq!(Value::Null.length(), Value::from(0.0));
    assert_eq!(Value::from(-3.0).length(), Value::from(3.0));
    assert_eq!(Value::from("héllo").length(), Value::from(5.0));
    assert_eq!(json(r#"{"a":1}"#).length(), Value::from(1.0));
    assert_eq!(
        Value::Bool(true).length().invalid_message(),
        Some("boolean (true) has no length")
    );
}

#[test]
fn test_keys_sorted_and_unsorted() {
    let v = json(r#"{"b":1,"a":2}"#);
    assert_eq!(v.keys(), json(r#"["a","b"]"#));
    assert_eq!(v.keys_unsorted(), json(r#"["b","a"]"#));
    assert_eq!(json("[5,6]").keys(), json("[0,1]"));
}

#[test]
fn test_describe_truncates_long_operands() {
    assert_eq!(Value::from(5.0).describe(), "number (5)");
    assert_eq!(
        Value::from("abcdefghijklmnop").describe(),
        "string (\"abcdefghij...)"
    );
}

#[test]
fn test_from_pairs_keeps_first_position_for_duplicates() {
    let v = Value::from_pairs([("a", Value::from(1.0)), ("b", Value::Null), ("a", Value::from(2.0))]);
    let map: &Map = v.as_object().unwrap();
    assert_eq!(map.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    assert_eq!(map["a"], Value::from(2.0));
}
