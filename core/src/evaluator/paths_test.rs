//! Path expressions and assignment.

use super::*;
use crate::compiler::compile;
use pretty_assertions::assert_eq;

fn run_ok(filter: &str, input: &str) -> Vec<String> {
    let program = compile(filter).unwrap_or_else(|e| panic!("{}: {}", filter, e));
    run(&program, Value::parse(input))
        .map(|v| v.map(|v| v.to_string()))
        .collect::<Result<_, _>>()
        .unwrap_or_else(|e| panic!("{}: {}", filter, e))
}

fn run_err(filter: &str, input: &str) -> String {
    let program = compile(filter).unwrap();
    match run(&program, Value::parse(input)).collect::<Result<Vec<_>, _>>() {
        Ok(values) => panic!("{}: expected an error, got {:?}", filter, values),
        Err(e) => e.to_string(),
    }
}

#[test]
fn test_path_of_simple_expressions() {
    assert_eq!(run_ok("path(.)", "null"), vec!["[]"]);
    assert_eq!(run_ok("path(.a[0].b)", "null"), vec![r#"["a",0,"b"]"#]);
    assert_eq!(run_ok("[path(.a[])]", r#"{"a":[5,6]}"#), vec![r#"[["a",0],["a",1]]"#]);
    assert_eq!(run_ok("path(.[1:3])", "[1,2,3]"), vec![r#"[{"start":1,"end":3}]"#]);
}

#[test]
fn test_path_of_recurse_all() {
    assert_eq!(run_ok("[path(..)]", "[[1]]"), vec!["[[],[0],[0,0]]"]);
    assert_eq!(run_ok("[path(..)]", r#"{"a":1}"#), vec![r#"[[],["a"]]"#]);
}

#[test]
fn test_path_through_control_flow() {
    assert_eq!(run_ok("path(if .a then .b else .c end)", r#"{"a":true}"#), vec![r#"["b"]"#]);
    assert_eq!(run_ok("path(.a // .b)", r#"{"a":null,"b":1}"#), vec![r#"["b"]"#]);
    assert_eq!(run_ok("path(.a // .b)", r#"{"a":1}"#), vec![r#"["a"]"#]);
    assert_eq!(run_ok("path(first(.a, .b))", "null"), vec![r#"["a"]"#]);
    assert_eq!(run_ok("[path(.a[]?)]", r#"{"a":5}"#), vec!["[]"]);
    assert_eq!(run_ok(r#"path(reduce ("a", "b") as $k (.; .[$k]))"#, "null"), vec![
        r#"["a","b"]"#
    ]);
    assert_eq!(run_ok(r#"path("x" as $k | .[$k])"#, "null"), vec![r#"["x"]"#]);
}

#[test]
fn test_path_through_definitions() {
    assert_eq!(run_ok("def f: .a; path(f | .b)", "null"), vec![r#"["a","b"]"#]);
    assert_eq!(run_ok("[path(.[] | select(. > 1))]", "[1,2,3]"), vec!["[[1],[2]]"]);
    assert_eq!(run_ok(r#"path(getpath(["a","b"]))"#, "null"), vec![r#"["a","b"]"#]);
    assert_eq!(run_ok("path(.a | getpath([0]))", "null"), vec![r#"["a",0]"#]);
}

#[test]
fn test_invalid_path_expression() {
    assert_eq!(run_err("path(1)", "null"), "Invalid path expression with result 1");
    assert_eq!(
        run_err("path(.a | tostring)", "null"),
        r#"Invalid path expression with result "null""#
    );
    assert_eq!(
        run_err("path(to_entries)", r#"{"a":1}"#),
        r#"Invalid path expression with result [{"key":"a","value":1}]"#
    );
}

#[test]
fn test_paths_builtins() {
    assert_eq!(run_ok("[paths]", r#"{"a":[1]}"#), vec![r#"[["a"],["a",0]]"#]);
    assert_eq!(run_ok(r#"[paths(type == "number")]"#, r#"{"a":1,"b":"x"}"#), vec![
        r#"[["a"]]"#
    ]);
    assert_eq!(run_ok("[leaf_paths]", r#"{"a":[1],"b":{}}"#), vec![r#"[["a",0]]"#]);
    assert_eq!(run_ok("pick(.a.b)", r#"{"a":{"b":1,"c":2},"d":3}"#), vec![
        r#"{"a":{"b":1}}"#
    ]);
}

#[test]
fn test_set() {
    assert_eq!(run_ok(".a = 1", "{}"), vec![r#"{"a":1}"#]);
    assert_eq!(run_ok(".a = .b", r#"{"b":3}"#), vec![r#"{"b":3,"a":3}"#]);
    assert_eq!(run_ok(".a.b[1] = 1", "null"), vec![r#"{"a":{"b":[null,1]}}"#]);
    assert_eq!(run_ok(".a = (1, 2)", "{}"), vec![r#"{"a":1}"#, r#"{"a":2}"#]);
    assert_eq!(run_ok("(.a, .b) = 1", "{}"), vec![r#"{"a":1,"b":1}"#]);
    assert_eq!(run_ok(".[1:3] = [\"x\"]", "[1,2,3,4]"), vec![r#"[1,"x",4]"#]);
}

#[test]
fn test_update() {
    assert_eq!(run_ok(".a |= . + 1", r#"{"a":1}"#), vec![r#"{"a":2}"#]);
    assert_eq!(run_ok(".a.b |= . + 1", "{}"), vec![r#"{"a":{"b":1}}"#]);
    assert_eq!(run_ok(".[] |= . * 2", "[1,2]"), vec!["[2,4]"]);
    assert_eq!(run_ok(".[] |= (., 10)", "[1,2]"), vec!["[1,2]"]);
    assert_eq!(run_ok(".[2:4] |= map(. * 10)", "[1,2,3,4,5]"), vec!["[1,2,30,40,5]"]);
    assert_eq!(run_ok("map_values(. * 2)", r#"{"a":1,"b":2}"#), vec![r#"{"a":2,"b":4}"#]);
}

#[test]
fn test_update_with_empty_deletes() {
    assert_eq!(run_ok(".[] |= empty", "[1,2,3]"), vec!["[]"]);
    assert_eq!(run_ok(".[] |= select(. > 1)", "[1,2,3]"), vec!["[2,3]"]);
    assert_eq!(run_ok(".a |= empty", r#"{"a":1,"b":2}"#), vec![r#"{"b":2}"#]);
}

#[test]
fn test_arithmetic_update() {
    assert_eq!(run_ok(".a += 1", r#"{"a":1}"#), vec![r#"{"a":2}"#]);
    assert_eq!(run_ok(".a -= 1", r#"{"a":1}"#), vec![r#"{"a":0}"#]);
    assert_eq!(run_ok(".a *= 3", r#"{"a":2}"#), vec![r#"{"a":6}"#]);
    assert_eq!(run_ok(".a /= 2", r#"{"a":3}"#), vec![r#"{"a":1.5}"#]);
    assert_eq!(run_ok(".a %= 2", r#"{"a":5}"#), vec![r#"{"a":1}"#]);
    assert_eq!(run_ok(".[] += 10", "[1,2]"), vec!["[11,12]"]);
    assert_eq!(run_ok(".a += (1, 2)", r#"{"a":0}"#), vec![r#"{"a":1}"#, r#"{"a":2}"#]);
    // The right-hand side sees the original input.
    assert_eq!(run_ok(".a += .b", r#"{"a":1,"b":2}"#), vec![r#"{"a":3,"b":2}"#]);
}

#[test]
fn test_alternative_update() {
    assert_eq!(run_ok(".a //= 5", r#"{"a":null}"#), vec![r#"{"a":5}"#]);
    assert_eq!(run_ok(".a //= 5", r#"{"a":1}"#), vec![r#"{"a":1}"#]);
    assert_eq!(run_ok(".[] //= 0", "[null,false,3]"), vec!["[0,0,3]"]);
}

#[test]
fn test_assignment_errors() {
    assert_eq!(run_err(".a += 1", r#"{"a":"x"}"#), r#"string ("x") and number (1) cannot be added"#);
    assert_eq!(run_err(".a = 1", "[]"), r#"Cannot index array with "a""#);
}

#[test]
fn test_del() {
    assert_eq!(run_ok("del(.a)", r#"{"a":1,"b":2}"#), vec![r#"{"b":2}"#]);
    assert_eq!(run_ok("del(.[1, 2])", "[1,2,3,4]"), vec!["[1,4]"]);
    assert_eq!(run_ok("del(.[] | select(. == 2))", "[1,2,3,2]"), vec!["[1,3]"]);
    assert_eq!(run_ok("del(.[0:2])", "[1,2,3]"), vec!["[3]"]);
    assert_eq!(run_ok("del(.missing)", r#"{"a":1}"#), vec![r#"{"a":1}"#]);
    assert_eq!(run_ok("del(.)", "[1]"), vec!["null"]);
}

#[test]
fn test_with_entries() {
    assert_eq!(run_ok("with_entries(.value += 1)", r#"{"a":1,"b":2}"#), vec![
        r#"{"a":2,"b":3}"#
    ]);
    assert_eq!(run_ok(r#"with_entries(select(.key != "a"))"#, r#"{"a":1,"b":2}"#), vec![
        r#"{"b":2}"#
    ]);
}
