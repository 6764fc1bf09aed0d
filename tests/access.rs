mod cases;

use indoc::indoc;

const PEOPLE: &str = indoc! {r#"
    {
      "people": [
        {"name": "ada", "age": 36, "langs": ["en", "fr"]},
        {"name": "bob", "age": 25, "langs": []},
        {"name": "cyd", "age": 41, "langs": ["de"]}
      ],
      "meta": {"count": 3, "end": true}
    }"#};

test_case!(
    identity,
    filter: ".",
    input: r#"{"b": 1, "a": [true, null]}"#,
    outputs: [r#"{"b": 1, "a": [true, null]}"#],
);

test_case!(
    nested_fields,
    filter: ".meta.count",
    input: PEOPLE,
    outputs: ["3"],
);

test_case!(
    keyword_as_field_name,
    filter: ".meta.end",
    input: PEOPLE,
    outputs: ["true"],
);

test_case!(
    iterate_then_field,
    filter: ".people[].name",
    input: PEOPLE,
    outputs: [r#""ada""#, r#""bob""#, r#""cyd""#],
);

test_case!(
    iterate_object_values,
    filter: ".meta[]",
    input: PEOPLE,
    outputs: ["3", "true"],
);

test_case!(
    negative_index,
    filter: ".people[-1].name",
    input: PEOPLE,
    outputs: [r#""cyd""#],
);

test_case!(
    index_out_of_bounds,
    filter: ".people[3]",
    input: PEOPLE,
    error: "Index 3 out of bounds (length: 3)",
);

test_case!(
    optional_index_out_of_bounds,
    filter: "[.people[3]?]",
    input: PEOPLE,
    outputs: ["[]"],
);

test_case!(
    slices_clamp,
    filter: ".[1:], .[:-1], .[5:10], .[-2:]",
    input: "[1, 2, 3]",
    outputs: ["[2, 3]", "[1, 2]", "[]", "[2, 3]"],
);

test_case!(
    string_slice,
    filter: ".[2:4]",
    input: r#""abcdef""#,
    outputs: [r#""cd""#],
);

test_case!(
    missing_key_is_null,
    filter: ".people[0].email",
    input: PEOPLE,
    outputs: ["null"],
);

test_case!(
    field_on_number,
    filter: ".meta.count.x",
    input: PEOPLE,
    error: r#"Cannot index number with "x""#,
);

test_case!(
    iterate_number,
    filter: ".meta.count[]",
    input: PEOPLE,
    error: "Cannot iterate over number (3)",
);

test_case!(
    optional_suppresses_field_error,
    filter: ".[] | .a?",
    input: r#"[1, {"a": 2}, "x", {"a": 3}]"#,
    outputs: ["2", "3"],
);

test_case!(
    recursive_descent,
    filter: "[.. | numbers]",
    input: r#"{"a": 1, "b": [2, {"c": 3}]}"#,
    outputs: ["[1, 2, 3]"],
);

test_case!(
    generator_index,
    filter: ".[0, 2]",
    input: r#"["a", "b", "c"]"#,
    outputs: [r#""a""#, r#""c""#],
);

test_case!(
    dynamic_key,
    filter: ".[.key]",
    input: r#"{"key": "v", "v": 7}"#,
    outputs: ["7"],
);

test_case!(
    pipe_ordering,
    filter: ".a[] | .b",
    input: r#"{"a": [{"b": 1}, {"b": 2}]}"#,
    outputs: ["1", "2"],
);

test_case!(
    select_by_field,
    filter: ".people[] | select(.age > 30) | .name",
    input: PEOPLE,
    outputs: [r#""ada""#, r#""cyd""#],
);

test_case!(
    comments_are_ignored,
    filter: indoc! {"
        # names of everyone
        .people[]   # each person
        | .name"},
    input: PEOPLE,
    outputs: [r#""ada""#, r#""bob""#, r#""cyd""#],
);
