mod cases;

use sift::{Error, Policy, oneshot};

test_case!(
    unclosed_paren,
    filter: "(.a | .b",
    compile_error: "P002",
);

test_case!(
    stray_closing_bracket,
    filter: ".a]",
    compile_error: "P005",
);

test_case!(
    mismatched_delimiters,
    filter: "[.a)",
    compile_error: "P006",
);

test_case!(
    dangling_pipe,
    filter: ".a |",
    compile_error: "P001",
);

test_case!(
    double_dots_in_a_row,
    filter: "..bad..",
    compile_error: "P001",
);

test_case!(
    truncated_input,
    input: r#"{"a": [1, 2"#,
    syntax_error,
);

test_case!(
    not_json,
    input: "{not json",
    syntax_error,
);

test_case!(
    trailing_garbage,
    input: "[1] x",
    syntax_error,
);

test_case!(
    empty_input,
    input: "",
    syntax_error,
);

#[test]
fn test_compile_error_stops_before_parsing_input() {
    // The input is invalid too; only the filter error is reported.
    let err = oneshot::run("{not json", "..bad..", Policy::First).unwrap_err();
    assert!(matches!(err, Error::Compilation { .. }), "{:?}", err);
}

#[test]
fn test_parse_error_stops_before_evaluation() {
    let err = oneshot::run("{not json", r#"error("never")"#, Policy::First).unwrap_err();
    match err {
        Error::Syntax { diagnostic, src } => {
            assert_eq!(src, "{not json");
            assert_eq!(diagnostic.code.as_deref(), Some("J001"));
            assert!(!diagnostic.message.is_empty());
        }
        other => panic!("expected a syntax error, got {:?}", other),
    }
}

#[test]
fn test_type_error_names_the_kind() {
    let err = oneshot::run("5", ".x", Policy::First).unwrap_err();
    assert!(matches!(err, Error::Runtime(_)));
    assert!(err.message().contains("number"), "{}", err.message());
}

#[test]
fn test_resource_error_category() {
    let err = oneshot::run("null", "def f: f; f", Policy::All).unwrap_err();
    assert!(matches!(err, Error::ResourceExceeded(_)), "{:?}", err);
}

#[test]
fn test_diagnostic_span_points_at_unknown_function() {
    let err = oneshot::compile_filter(".a | nope(1)").unwrap_err();
    let (diagnostic, src) = err.diagnostic().unwrap();
    assert_eq!(&src[diagnostic.span.0.clone()], "nope(1)");
    assert_eq!(diagnostic.message, "nope/1 is not defined");
}

#[test]
fn test_error_display() {
    let err = oneshot::parse_json("[1,").unwrap_err();
    assert!(err.to_string().starts_with("Invalid JSON input: "), "{}", err);

    let err = oneshot::run("null", r#"error("boom")"#, Policy::First).unwrap_err();
    assert_eq!(err.to_string(), "boom");
}

#[test]
fn test_rendered_diagnostic_shows_filter() {
    let err = oneshot::compile_filter(".a | nope(1)").unwrap_err();
    let rendered = sift::render_error_to_string_no_color(&err);
    assert!(rendered.contains(".a | nope(1)"), "{}", rendered);
    assert!(rendered.contains("nope/1 is not defined"), "{}", rendered);
}
