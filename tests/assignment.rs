mod cases;

const CART: &str = r#"{"items": [{"sku": "a", "qty": 1}, {"sku": "b", "qty": 3}], "note": null}"#;

test_case!(
    plain_assignment,
    filter: ".note = \"gift\"",
    input: CART,
    outputs: [r#"{"items": [{"sku": "a", "qty": 1}, {"sku": "b", "qty": 3}], "note": "gift"}"#],
);

test_case!(
    assignment_value_reads_original_input,
    filter: ".a = .b",
    input: r#"{"a": 1, "b": 2}"#,
    outputs: [r#"{"a": 2, "b": 2}"#],
);

test_case!(
    assignment_with_generator_value,
    filter: ".a = (1, 2)",
    input: r#"{"a": 0}"#,
    outputs: [r#"{"a": 1}"#, r#"{"a": 2}"#],
);

test_case!(
    assignment_to_many_paths,
    filter: ".items[].qty = 0",
    input: CART,
    outputs: [r#"{"items": [{"sku": "a", "qty": 0}, {"sku": "b", "qty": 0}], "note": null}"#],
);

test_case!(
    update_assignment,
    filter: ".items[].qty |= . * 10",
    input: CART,
    outputs: [r#"{"items": [{"sku": "a", "qty": 10}, {"sku": "b", "qty": 30}], "note": null}"#],
);

test_case!(
    update_takes_first_output,
    filter: ".a |= (., 100)",
    input: r#"{"a": 1}"#,
    outputs: [r#"{"a": 1}"#],
);

test_case!(
    update_with_empty_deletes,
    filter: ".[] |= empty",
    input: "[1, 2, 3]",
    outputs: ["[]"],
);

test_case!(
    update_selected_elements,
    filter: "(.[] | select(. > 1)) |= . * 100",
    input: "[1, 2, 3]",
    outputs: ["[1, 200, 300]"],
);

test_case!(
    arithmetic_updates,
    filter: ".a += 1 | .b -= 1 | .c *= 2 | .d /= 2 | .e %= 3",
    input: r#"{"a": 1, "b": 1, "c": 2, "d": 8, "e": 10}"#,
    outputs: [r#"{"a": 2, "b": 0, "c": 4, "d": 4, "e": 1}"#],
);

test_case!(
    arithmetic_update_right_side_sees_input,
    filter: ".items[].qty += .bonus",
    input: r#"{"items": [{"qty": 1}, {"qty": 2}], "bonus": 5}"#,
    outputs: [r#"{"items": [{"qty": 6}, {"qty": 7}], "bonus": 5}"#],
);

test_case!(
    alternative_update,
    filter: ".a //= 1 | .b //= 1",
    input: r#"{"a": null, "b": false, "c": 0}"#,
    outputs: [r#"{"a": 1, "b": 1, "c": 0}"#],
);

test_case!(
    assignment_creates_missing_structure,
    filter: ".a.b[2] = 1",
    input: "null",
    outputs: [r#"{"a": {"b": [null, null, 1]}}"#],
);

test_case!(
    assignment_to_wrong_shape,
    filter: ".a.b = 1",
    input: r#"{"a": 5}"#,
    error: r#"Cannot index number with "b""#,
);

test_case!(
    assignment_to_non_path,
    filter: "(.a | length) = 1",
    input: r#"{"a": "xyz"}"#,
    error: "Invalid path expression with result 3",
);

test_case!(
    with_entries_rename,
    filter: r#"with_entries(.key |= "x_" + .)"#,
    input: r#"{"a": 1, "b": 2}"#,
    outputs: [r#"{"x_a": 1, "x_b": 2}"#],
);

test_case!(
    map_values_drops_empty,
    filter: "map_values(select(. > 1))",
    input: r#"{"a": 1, "b": 2}"#,
    outputs: [r#"{"b": 2}"#],
);

test_case!(
    update_in_reduce,
    filter: "reduce .[] as $w ({}; .[$w] += 1)",
    input: r#"["x", "y", "x"]"#,
    outputs: [r#"{"x": 2, "y": 1}"#],
);

test_case!(
    slice_assignment,
    filter: ".[1:3] = [\"x\"]",
    input: "[0, 1, 2, 3]",
    outputs: [r#"[0, "x", 3]"#],
);

test_case!(
    assignment_past_index_limit,
    filter: ".[1e20] = 1",
    input: "null",
    error: "Array index too large",
);

test_case!(
    setpath_past_index_limit,
    filter: "try setpath([1e9]; 1) catch .",
    input: "[]",
    outputs: [r#""Array index too large""#],
);
