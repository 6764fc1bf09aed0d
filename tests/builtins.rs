mod cases;

const ORDERS: &str = r#"[
  {"id": 1, "user": "ada", "total": 30},
  {"id": 2, "user": "bob", "total": 5},
  {"id": 3, "user": "ada", "total": 12}
]"#;

test_case!(
    length_by_kind,
    filter: ".[] | length",
    input: r#"[[1, 2], {"a": 1}, "héllo", -4, null]"#,
    outputs: ["2", "1", "5", "4", "0"],
);

test_case!(
    length_of_boolean,
    filter: "length",
    input: "true",
    error: "boolean (true) has no length",
);

test_case!(
    keys_sorted_and_unsorted,
    filter: "keys, keys_unsorted",
    input: r#"{"b": 1, "a": 2}"#,
    outputs: [r#"["a", "b"]"#, r#"["b", "a"]"#],
);

test_case!(
    has_and_in,
    filter: r#"has("a"), has("z"), ("a" | in({"a": 1}))"#,
    input: r#"{"a": null}"#,
    outputs: ["true", "false", "true"],
);

test_case!(
    contains_and_inside,
    filter: r#"contains({tags: ["x"]}), ({tags: ["x"]} | inside({tags: ["x", "y"]}))"#,
    input: r#"{"tags": ["xyz", "q"]}"#,
    outputs: ["true", "true"],
);

test_case!(
    map_and_add,
    filter: "map(.total) | add",
    input: ORDERS,
    outputs: ["47"],
);

test_case!(
    add_of_empty_is_null,
    filter: "add",
    input: "[]",
    outputs: ["null"],
);

test_case!(
    map_values_on_object,
    filter: "map_values(. + 1)",
    input: r#"{"a": 1, "b": 2}"#,
    outputs: [r#"{"a": 2, "b": 3}"#],
);

test_case!(
    any_and_all,
    filter: "any(. > 2), all(. > 0), any, all",
    input: "[1, 2, 3]",
    outputs: ["true", "true", "true", "true"],
);

test_case!(
    flatten_with_depth,
    filter: "flatten, flatten(1)",
    input: "[1, [2, [3, [4]]]]",
    outputs: ["[1, 2, 3, 4]", "[1, 2, [3, [4]]]"],
);

test_case!(
    sort_mixed_kinds,
    filter: "sort",
    input: r#"[3, "a", null, [1], true, {"a": 1}, 1, false]"#,
    outputs: [r#"[null, false, true, 1, 3, "a", [1], {"a": 1}]"#],
);

test_case!(
    sort_by_is_stable,
    filter: "sort_by(.user) | map(.id)",
    input: ORDERS,
    outputs: ["[1, 3, 2]"],
);

test_case!(
    group_by_field,
    filter: "group_by(.user) | map({user: .[0].user, spent: map(.total) | add})",
    input: ORDERS,
    outputs: [r#"[{"user": "ada", "spent": 42}, {"user": "bob", "spent": 5}]"#],
);

test_case!(
    unique_and_unique_by,
    filter: "unique, unique_by(length)",
    input: r#"["bb", "a", "bb", "cc"]"#,
    outputs: [r#"["a", "bb", "cc"]"#, r#"["a", "bb"]"#],
);

test_case!(
    min_max,
    filter: "min, max, (map({v: .}) | min_by(.v), max_by(.v))",
    input: "[4, 2, 8]",
    outputs: ["2", "8", r#"{"v": 2}"#, r#"{"v": 8}"#],
);

test_case!(
    min_of_empty_is_null,
    filter: "min",
    input: "[]",
    outputs: ["null"],
);

test_case!(
    reverse_values,
    filter: "reverse",
    input: "[1, 2, 3]",
    outputs: ["[3, 2, 1]"],
);

test_case!(
    entries,
    filter: "to_entries, (to_entries | from_entries), with_entries(.value += 1)",
    input: r#"{"a": 1, "b": 2}"#,
    outputs: [
        r#"[{"key": "a", "value": 1}, {"key": "b", "value": 2}]"#,
        r#"{"a": 1, "b": 2}"#,
        r#"{"a": 2, "b": 3}"#,
    ],
);

test_case!(
    from_entries_accepts_name_and_k,
    filter: "from_entries",
    input: r#"[{"name": "a", "value": 1}, {"k": "b", "v": 2}]"#,
    outputs: [r#"{"a": 1, "b": 2}"#],
);

test_case!(
    transpose_pads_with_null,
    filter: "transpose",
    input: "[[1, 2], [3]]",
    outputs: ["[[1, 3], [2, null]]"],
);

test_case!(
    indices_and_index,
    filter: r#"indices(1), index(1), rindex(1), ("a,b, cd" | indices(", "))"#,
    input: "[0, 1, 2, 1]",
    outputs: ["[1, 3]", "1", "3", "[3]"],
);

test_case!(
    walk_sorts_nested_arrays,
    filter: "walk(if type == \"array\" then sort else . end)",
    input: r#"{"a": [3, 1], "b": {"c": [2, 1]}}"#,
    outputs: [r#"{"a": [1, 3], "b": {"c": [1, 2]}}"#],
);

test_case!(
    type_selectors,
    filter: "[.[] | type], [.[] | scalars], [.[] | iterables | length]",
    input: r#"[1, "s", null, true, [], {}]"#,
    outputs: [
        r#"["number", "string", "null", "boolean", "array", "object"]"#,
        r#"[1, "s", null, true]"#,
        "[0, 0]",
    ],
);

test_case!(
    math_functions,
    filter: "[(.[] | floor), (.[] | ceil), (.[] | round), (.[] | fabs)]",
    input: "[1.5, -2.5]",
    outputs: ["[1, -3, 2, -2, 2, -3, 1.5, 2.5]"],
);

test_case!(
    sqrt_and_pow,
    filter: "(16 | sqrt), pow(2; 10), (8 | log2)",
    input: "null",
    outputs: ["4", "1024", "3"],
);

test_case!(
    infinite_and_nan,
    filter: "(infinite | isinfinite), (nan | isnan), ([nan] | sort | .[0] | isnan), (1 | isnormal)",
    input: "null",
    outputs: ["true", "true", "true", "true"],
);

test_case!(
    toarray_wraps_scalars,
    filter: ".[] | toarray",
    input: "[1, [2]]",
    outputs: ["[1]", "[2]"],
);

test_case!(
    combinations_of_lists,
    filter: "[combinations]",
    input: "[[1, 2], [3, 4]]",
    outputs: ["[[1, 3], [1, 4], [2, 3], [2, 4]]"],
);

test_case!(
    debug_passes_input_through,
    filter: "debug | . + 1",
    input: "1",
    outputs: ["2"],
);
