mod cases;

test_case!(
    interpolation,
    filter: r#""\(.name) is \(.age) years old""#,
    input: r#"{"name": "ada", "age": 36}"#,
    outputs: [r#""ada is 36 years old""#],
);

test_case!(
    interpolation_of_generators,
    filter: r#""x\(1, 2)""#,
    input: "null",
    outputs: [r#""x1""#, r#""x2""#],
);

test_case!(
    interpolation_dumps_structures,
    filter: r#""v=\(.)""#,
    input: r#"{"a": [1, "b"]}"#,
    outputs: [r#""v={\"a\":[1,\"b\"]}""#],
);

test_case!(
    tostring_and_tonumber,
    filter: r#"(.[] | tostring), ("42" | tonumber), ("1.5e3" | tonumber)"#,
    input: r#"[1, "s", [1]]"#,
    outputs: [r#""1""#, r#""s""#, r#""[1]""#, "42", "1500"],
);

test_case!(
    tonumber_rejects_text,
    filter: "tonumber",
    input: r#""abc""#,
    error: r#"Cannot parse 'abc' as JSON"#,
);

test_case!(
    json_round_trip,
    filter: "tojson, (tojson | fromjson)",
    input: r#"{"a": [1, null]}"#,
    outputs: [r#""{\"a\":[1,null]}""#, r#"{"a": [1, null]}"#],
);

test_case!(
    case_conversion,
    filter: "ascii_downcase, ascii_upcase",
    input: r#""Héllo World""#,
    outputs: [r#""héllo world""#, r#""HéLLO WORLD""#],
);

test_case!(
    trim_prefixes_and_suffixes,
    filter: r#"ltrimstr("foo"), rtrimstr(".json"), ltrimstr(1)"#,
    input: r#""foobar.json""#,
    outputs: [r#""bar.json""#, r#""foobar""#, r#""foobar.json""#],
);

test_case!(
    starts_and_ends,
    filter: r#"startswith("foo"), endswith("bar"), endswith("foo")"#,
    input: r#""foobar""#,
    outputs: ["true", "true", "false"],
);

test_case!(
    whitespace_trim,
    filter: "trim, ltrim, rtrim",
    input: r#""  hi  ""#,
    outputs: [r#""hi""#, r#""hi  ""#, r#""  hi""#],
);

test_case!(
    explode_implode,
    filter: "explode, (explode | implode)",
    input: r#""aé""#,
    outputs: ["[97, 233]", r#""aé""#],
);

test_case!(
    split_and_join,
    filter: r#"split(", "), (split(", ") | join("-")), ([1, null, "a", true] | join(","))"#,
    input: r#""a, b, c""#,
    outputs: [r#"["a", "b", "c"]"#, r#""a-b-c""#, r#""1,,a,true""#],
);

test_case!(
    utf8_byte_length,
    filter: "utf8bytelength, length",
    input: r#""é""#,
    outputs: ["2", "1"],
);

test_case!(
    regex_test,
    filter: r#"test("^a.c$"), test("ABC"; "i"), test("x")"#,
    input: r#""abc""#,
    outputs: ["true", "true", "false"],
);

test_case!(
    regex_match_object,
    filter: r#"match("(?<word>[a-z]+)-(\\d+)") | [.offset, .length, .string, .captures[0].name, .captures[1].string]"#,
    input: r#""xx abc-12""#,
    outputs: [r#"[3, 6, "abc-12", "word", "12"]"#],
);

test_case!(
    regex_capture,
    filter: r#"capture("(?<year>\\d{4})-(?<month>\\d{2})")"#,
    input: r#""on 2024-05-01""#,
    outputs: [r#"{"year": "2024", "month": "05"}"#],
);

test_case!(
    regex_scan,
    filter: r#"[scan("\\d+")], [scan("(a)(\\d)")]"#,
    input: r#""a1 b22 a3""#,
    outputs: [r#"["1", "22", "3"]"#, r#"[["a", "1"], ["a", "3"]]"#],
);

test_case!(
    regex_split,
    filter: r#"split(", *"; null), [splits("[0-9]")]"#,
    input: r#""a, b,c1d""#,
    outputs: [r#"["a", "b", "c1d"]"#, r#"["a, b,c", "d"]"#],
);

test_case!(
    regex_sub_and_gsub,
    filter: r#"sub("o"; "0"), gsub("o"; "0"), gsub("(?<l>[a-z])o"; "\(.l)O")"#,
    input: r#""foo boo""#,
    outputs: [r#""f0o boo""#, r#""f00 b00""#, r#""fOo bOo""#],
);

test_case!(
    invalid_regex,
    filter: r#"try test("(") catch startswith("( (at offset 0) is not a valid regex")"#,
    input: r#""x""#,
    outputs: ["true"],
);
