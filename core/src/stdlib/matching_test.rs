//! Tests for the regular expression builtins.

use super::matching::{match_impl, split};
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

fn eval_err(filter: &str, input: &str) -> String {
    let program = compile(filter).unwrap();
    match run(&program, json(input)).collect::<Result<Vec<_>, _>>() {
        Ok(values) => panic!("{}: expected an error, got {:?}", filter, values),
        Err(e) => e.to_string(),
    }
}

#[test]
fn test_match_objects() {
    let matches = match_impl(&json(r#""xab""#), &[json(r#""(?<l>a)(b)""#), Value::Null, json("false")]);
    assert_eq!(
        matches,
        json(
            r#"[{"offset":1,"length":2,"string":"ab","captures":[
                {"offset":1,"length":1,"string":"a","name":"l"},
                {"offset":2,"length":1,"string":"b","name":null}]}]"#
        )
    );
}

#[test]
fn test_offsets_count_codepoints() {
    assert_eq!(eval(r#"[match("b"; "g").offset]"#, r#""ébéb""#), vec!["[1,3]"]);
}

#[test]
fn test_unmatched_optional_group() {
    let matches = match_impl(&json(r#""b""#), &[json(r#""(a)?b""#), Value::Null, json("false")]);
    assert_eq!(
        matches.index(&json("0")).index(&json(r#""captures""#)),
        json(r#"[{"offset":-1,"length":0,"string":null,"name":null}]"#)
    );
}

#[test]
fn test_test() {
    assert_eq!(eval(r#"test("A"; "i"), test("A")"#, r#""a""#), vec!["true", "false"]);
    assert_eq!(eval(r#"test(["a b", "x"])"#, r#""ab""#), vec!["true"]);
    assert_eq!(eval(r#"[.[] | select(test("^[0-9]+$"))]"#, r#"["1","a","22"]"#), vec![r#"["1","22"]"#]);
}

#[test]
fn test_global_matching() {
    assert_eq!(eval(r#"[match("a"; "g").offset]"#, r#""aba""#), vec!["[0,2]"]);
    assert_eq!(eval(r#"[match("a").offset]"#, r#""aba""#), vec!["[0]"]);
    assert_eq!(eval(r#"[match(""; "g").offset]"#, r#""ab""#), vec!["[0,1,2]"]);
    assert_eq!(eval(r#"[match(""; "gn").offset]"#, r#""ab""#), vec!["[]"]);
}

#[test]
fn test_capture_and_scan() {
    assert_eq!(eval(r#"capture("(?<n>[0-9]+)")"#, r#""x12""#), vec![r#"{"n":"12"}"#]);
    assert_eq!(eval(r#"[scan("c")]"#, r#""abcdc""#), vec![r#"["c","c"]"#]);
    assert_eq!(eval(r#"[scan("(a)(b)")]"#, r#""abab""#), vec![r#"[["a","b"],["a","b"]]"#]);
}

#[test]
fn test_split_and_splits() {
    assert_eq!(split(&json(r#""xaay""#), &[json(r#""a+""#), Value::Null]), json(r#"["x","y"]"#));
    assert_eq!(eval(r#"split(", *"; null)"#, r#""a, b,c""#), vec![r#"["a","b","c"]"#]);
    assert_eq!(eval(r#"[splits(",")]"#, r#""a,b""#), vec![r#"["a","b"]"#]);
}

#[test]
fn test_sub_and_gsub() {
    assert_eq!(eval(r#"sub("a"; "b")"#, r#""aaa""#), vec![r#""baa""#]);
    assert_eq!(eval(r#"gsub("a"; "b")"#, r#""aaa""#), vec![r#""bbb""#]);
    assert_eq!(eval(r#"sub("(?<x>a)"; "<\(.x)>")"#, r#""cab""#), vec![r#""c<a>b""#]);
    assert_eq!(eval(r#"gsub("(?<d>[0-9])"; "[\(.d)]")"#, r#""a1b2""#), vec![r#""a[1]b[2]""#]);
    assert_eq!(eval(r#"gsub("A"; "x"; "i")"#, r#""aAb""#), vec![r#""xxb""#]);
    assert_eq!(eval(r#"sub("z"; "y")"#, r#""abc""#), vec![r#""abc""#]);
}

#[test]
fn test_regex_errors() {
    assert_eq!(
        eval_err(r#"test("a")"#, "1"),
        "number (1) cannot be matched, as it is not a string"
    );
    assert_eq!(eval_err(r#"test("a"; "q")"#, r#""a""#), "q is not a valid modifier string");
    assert!(eval_err(r#"test("(")"#, r#""a""#).starts_with("( (at offset 0) is not a valid regex"));
}
