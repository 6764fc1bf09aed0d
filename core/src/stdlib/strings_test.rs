//! Tests for the string builtins.

use super::strings::*;
use crate::compiler::compile;
use crate::evaluator::run;
use crate::values::Value;
use pretty_assertions::assert_eq;

fn json(text: &str) -> Value {
    Value::parse(text)
}

fn eval(filter: &str, input: &str) -> Vec<String> {
    let program = compile(filter).unwrap_or_else(|e| panic!("{}: {}", filter, e));
    run(&program, json(input))
        .map(|v| v.map(|v| v.to_string()))
        .collect::<Result<_, _>>()
        .unwrap_or_else(|e| panic!("{}: {}", filter, e))
}

#[test]
fn test_tostring() {
    assert_eq!(tostring(&json(r#""x""#), &[]), json(r#""x""#));
    assert_eq!(tostring(&json("1.5"), &[]), json(r#""1.5""#));
    assert_eq!(tostring(&json(r#"[1,{"a":null}]"#), &[]), json(r#""[1,{\"a\":null}]""#));
}

#[test]
fn test_json_round_trip_builtins() {
    assert_eq!(tojson(&json(r#"[1,"a"]"#), &[]), json(r#""[1,\"a\"]""#));
    assert_eq!(fromjson(&json(r#""{\"a\":1}""#), &[]), json(r#"{"a":1}"#));
    assert!(!fromjson(&json(r#""{""#), &[]).is_valid());
    assert!(!fromjson(&json("1"), &[]).is_valid());
}

#[test]
fn test_tonumber() {
    assert_eq!(tonumber(&json(r#""12""#), &[]), json("12"));
    assert_eq!(tonumber(&json(r#"" 1e3 ""#), &[]), json("1000"));
    assert_eq!(tonumber(&json("7"), &[]), json("7"));
    assert_eq!(
        tonumber(&json(r#""abc""#), &[]).invalid_message(),
        Some("Cannot parse 'abc' as JSON")
    );
    assert!(!tonumber(&json("[]"), &[]).is_valid());
}

#[test]
fn test_lengths() {
    assert_eq!(utf8bytelength(&json(r#""é""#), &[]), json("2"));
    assert!(!utf8bytelength(&json("1"), &[]).is_valid());
}

#[test]
fn test_case() {
    assert_eq!(ascii_downcase(&json(r#""AbÉ""#), &[]), json(r#""abÉ""#));
    assert_eq!(ascii_upcase(&json(r#""abé""#), &[]), json(r#""ABé""#));
    assert!(!ascii_upcase(&json("1"), &[]).is_valid());
}

#[test]
fn test_affixes() {
    assert_eq!(ltrimstr(&json(r#""abc""#), &[json(r#""a""#)]), json(r#""bc""#));
    assert_eq!(ltrimstr(&json(r#""abc""#), &[json(r#""x""#)]), json(r#""abc""#));
    assert_eq!(ltrimstr(&json("1"), &[json(r#""a""#)]), json("1"));
    assert_eq!(rtrimstr(&json(r#""abc""#), &[json(r#""c""#)]), json(r#""ab""#));
    assert_eq!(startswith(&json(r#""abc""#), &[json(r#""ab""#)]), json("true"));
    assert_eq!(endswith(&json(r#""abc""#), &[json(r#""b""#)]), json("false"));
    assert_eq!(
        startswith(&json("1"), &[json(r#""a""#)]).invalid_message(),
        Some("startswith() requires string inputs")
    );
}

#[test]
fn test_trim() {
    assert_eq!(trim(&json(r#""  a b  ""#), &[]), json(r#""a b""#));
    assert_eq!(ltrim(&json(r#""  a  ""#), &[]), json(r#""a  ""#));
    assert_eq!(rtrim(&json(r#""  a  ""#), &[]), json(r#""  a""#));
}

#[test]
fn test_codepoints() {
    assert_eq!(explode(&json(r#""AB😀""#), &[]), json("[65,66,128512]"));
    assert_eq!(implode(&json("[65,66]"), &[]), json(r#""AB""#));
    assert_eq!(implode(&json("[128512]"), &[]), json(r#""😀""#));
    for invalid in ["[-1]", "[55296]", "[57343]", "[1114112]"] {
        assert_eq!(
            implode(&json(invalid), &[]).invalid_message(),
            Some("Invalid codepoint literal"),
            "{}",
            invalid
        );
    }
    assert!(!implode(&json(r#"["a"]"#), &[]).is_valid());
}

#[test]
fn test_split_and_join() {
    assert_eq!(split(&json(r#""a, b""#), &[json(r#"", ""#)]), json(r#"["a","b"]"#));
    assert_eq!(split(&json(r#""""#), &[json(r#"",""#)]), json("[]"));
    assert_eq!(join(&json(r#"["a",1,null,true]"#), &[json(r#""-""#)]), json(r#""a-1--true""#));
    assert_eq!(join(&json("[]"), &[json(r#""-""#)]), json(r#""""#));
    assert_eq!(
        join(&json("[[1]]"), &[json(r#""-""#)]).invalid_message(),
        Some("Cannot join with array")
    );
}

#[test]
fn test_string_builtins_in_filters() {
    assert_eq!(eval("[.[] | tostring]", r#"[1,"1",[1]]"#), vec![r#"["1","1","[1]"]"#]);
    assert_eq!(eval(r#"split(",") | join(";")"#, r#""a,b,c""#), vec![r#""a;b;c""#]);
    assert_eq!(eval("explode | implode", r#""héllo""#), vec![r#""héllo""#]);
}
