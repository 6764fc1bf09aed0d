use pretty_assertions::assert_eq;
use sift::{Engine, EngineOptions, Error, ExecutionOptions, Policy, Session, Stage, Value, oneshot};

const INPUTS: &[&str] = &[
    "null",
    "true",
    "-1.5",
    r#""text""#,
    "[1, [2, {}]]",
    r#"{"z": 1, "a": {"m": [null]}}"#,
];

#[test]
fn test_identity_returns_input() {
    let filter = oneshot::compile_filter(".").unwrap();
    for text in INPUTS {
        let value = oneshot::parse_json(text).unwrap();
        assert_eq!(filter.evaluate(value.clone(), Policy::First).unwrap(), value);
    }
}

#[test]
fn test_dump_round_trip_keeps_key_order() {
    for text in INPUTS {
        let value = Value::parse(text);
        assert_eq!(Value::parse(&value.to_string()), value);
    }
    assert_eq!(Value::parse(r#"{"z": 1, "a": 2}"#).to_string(), r#"{"z":1,"a":2}"#);
}

#[test]
fn test_empty_is_null_under_first() {
    let filter = oneshot::compile_filter("empty").unwrap();
    for text in INPUTS {
        let value = Value::parse(text);
        assert_eq!(filter.evaluate(value, Policy::First).unwrap(), Value::Null);
    }
}

#[test]
fn test_policies_over_the_same_stream() {
    let filter = oneshot::compile_filter(".[] | select(. > 1)").unwrap();
    let input = Value::parse("[1, 2, 3]");

    assert_eq!(filter.evaluate(input.clone(), Policy::First).unwrap(), Value::from(2.0));
    assert_eq!(filter.evaluate(input.clone(), Policy::All).unwrap(), Value::parse("[2, 3]"));
    assert_eq!(filter.evaluate(input.clone(), Policy::Unwrap).unwrap(), Value::parse("[2, 3]"));

    let single = Value::parse("[1, 5]");
    assert_eq!(filter.evaluate(single.clone(), Policy::All).unwrap(), Value::parse("[5]"));
    assert_eq!(filter.evaluate(single, Policy::Unwrap).unwrap(), Value::from(5.0));
}

#[test]
fn test_first_never_pulls_the_error() {
    let result = oneshot::run("null", r#"1, error("x")"#, Policy::First).unwrap();
    assert_eq!(result, Value::from(1.0));
    let err = oneshot::run("null", r#"1, error("x")"#, Policy::All).unwrap_err();
    assert_eq!(err.message(), "x");
}

#[test]
fn test_streaming_a_session() {
    let mut session = Session::new(Engine::default());
    session.compile("range(3) | . * .").unwrap();
    session.parse_input("null").unwrap();

    let mut stream = session.stream().unwrap();
    assert_eq!(stream.next().unwrap().unwrap(), Value::from(0.0));
    assert_eq!(stream.next().unwrap().unwrap(), Value::from(1.0));
    assert_eq!(stream.next().unwrap().unwrap(), Value::from(4.0));
    assert!(stream.next().is_none());
    drop(stream);
    assert_eq!(session.stage(), Stage::Drained);
}

#[test]
fn test_abandoning_an_infinite_stream() {
    let mut session = Session::new(Engine::default());
    session.compile("repeat(. + 1)").unwrap();
    session.parse_input("0").unwrap();

    let taken: Vec<Value> = session
        .stream()
        .unwrap()
        .take(4)
        .collect::<Result<_, Error>>()
        .unwrap();
    assert_eq!(taken, Value::parse("[0, 1, 2, 3]").as_array().unwrap().to_vec());
    assert_eq!(session.stage(), Stage::Evaluating);
}

#[test]
fn test_lenient_indexing_option() {
    let engine = Engine::new(EngineOptions {
        execution: ExecutionOptions {
            strict_indexing: false,
            ..Default::default()
        },
        ..Default::default()
    });
    let filter = engine.compile(".[10]").unwrap();
    assert_eq!(filter.evaluate(Value::parse("[1]"), Policy::First).unwrap(), Value::Null);

    let strict = Engine::default().compile(".[10]").unwrap();
    let err = strict.evaluate(Value::parse("[1]"), Policy::First).unwrap_err();
    assert_eq!(err.message(), "Index 10 out of bounds (length: 1)");
}

#[test]
fn test_parameters_from_the_host() {
    let engine = Engine::default();
    let filter = engine
        .compile_with_params(".[] | select(.age >= $min) | .name", &["min"])
        .unwrap();
    let input = engine
        .parse_json(r#"[{"name": "a", "age": 20}, {"name": "b", "age": 40}]"#)
        .unwrap();
    let result = filter
        .evaluate_with(input, &[Value::from(30.0)], Policy::All)
        .unwrap();
    assert_eq!(result, Value::parse(r#"["b"]"#));
}
