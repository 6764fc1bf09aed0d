use indoc::indoc;
use pretty_assertions::assert_eq;

use super::{DumpStyle, InvalidValue, Value, format_number};

fn json(text: &str) -> Value {
    super::parse_json(text).expect("test JSON should parse")
}

#[test]
fn test_compact_display_keeps_key_order() {
    let v = json(r#"{ "z": 1, "a": [true, null, "x"] }"#);
    assert_eq!(v.to_string(), r#"{"z":1,"a":[true,null,"x"]}"#);
}

#[test]
fn test_pretty_dump() {
    let v = json(r#"{"a":[1,2],"b":{},"c":[]}"#);
    let expected = indoc! {r#"
        {
          "a": [
            1,
            2
          ],
          "b": {},
          "c": []
        }"#};
    assert_eq!(v.dump(DumpStyle::pretty()).unwrap(), expected);
}

#[test]
fn test_dump_rejects_nested_invalid() {
    let v = Value::array(vec![Value::from(1.0), Value::invalid("bad")]);
    assert_eq!(
        v.dump(DumpStyle::Compact),
        Err(InvalidValue("bad".to_string()))
    );
    // Display never fails.
    assert_eq!(v.to_string(), "[1,<invalid: bad>]");
}

#[test]
fn test_string_escapes() {
    let v = Value::from("a\"b\\c\n\u{1}\u{7f}é");
    assert_eq!(v.to_string(), r#""a\"b\\c\n\u0001\u007fé""#);
}

#[test]
fn test_number_formatting() {
    assert_eq!(format_number(1.0), "1");
    assert_eq!(format_number(-42.0), "-42");
    assert_eq!(format_number(3.25), "3.25");
    assert_eq!(format_number(0.1), "0.1");
    assert_eq!(format_number(1e300), "1e+300");
    assert_eq!(format_number(1.5e-7), "1.5e-07");
    assert_eq!(format_number(f64::NAN), "null");
    assert_eq!(format_number(f64::INFINITY), "1.7976931348623157e+308");
    assert_eq!(format_number(f64::NEG_INFINITY), "-1.7976931348623157e+308");
}

#[test]
fn test_dump_then_parse_round_trips() {
    let samples = [
        r#"{"b":[1,2.5,-3e-8],"a":{"nested":[{"k":"v"}]},"s":"é\t"}"#,
        "[]",
        "null",
        r#""""#,
        "[[[[1]]]]",
    ];
    for text in samples {
        let v = json(text);
        for style in [DumpStyle::Compact, DumpStyle::pretty()] {
            let dumped = v.dump(style).unwrap();
            let reparsed = json(&dumped);
            assert_eq!(reparsed, v);
            assert_eq!(reparsed.to_string(), v.to_string(), "key order must survive");
        }
    }
}
