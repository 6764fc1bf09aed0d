//! Regular expression builtins, on top of the `regex` crate.
//!
//! Offsets and lengths in match objects count codepoints, not bytes.

use regex::{Regex, RegexBuilder};

use crate::values::Value;

#[derive(Debug, Default, Clone, Copy)]
struct Flags {
    global: bool,
    skip_empty: bool,
}

/// Compile `re` with jq modifier letters: `g` global, `i` case
/// insensitive, `x` extended, `s` single line, `n` ignore empty matches,
/// `l` and `p` accepted.
fn compile(re: &Value, flags: &Value) -> Result<(Regex, Flags), Value> {
    let pattern: &str = match re {
        Value::String(s) => s,
        Value::Invalid(_) => return Err(re.clone()),
        _ => return Err(Value::invalid(format!("{} cannot be matched, as it is not a string", re.describe()))),
    };
    let modifiers: &str = match flags {
        Value::Null => "",
        Value::String(s) => s,
        Value::Invalid(_) => return Err(flags.clone()),
        _ => return Err(Value::invalid(format!("{} is not a string", flags.describe()))),
    };

    let mut builder = RegexBuilder::new(pattern);
    let mut out = Flags::default();
    for c in modifiers.chars() {
        match c {
            'g' => out.global = true,
            'i' => {
                builder.case_insensitive(true);
            }
            'x' => {
                builder.ignore_whitespace(true);
            }
            's' => {
                builder.dot_matches_new_line(true);
            }
            'n' => out.skip_empty = true,
            'p' => {
                builder.dot_matches_new_line(true);
                out.skip_empty = true;
            }
            'l' => {}
            _ => {
                return Err(Value::invalid(format!(
                    "{} is not a valid modifier string",
                    modifiers
                )));
            }
        }
    }
    let regex = builder
        .build()
        .map_err(|err| Value::invalid(format!("{} (at offset 0) is not a valid regex: {}", pattern, err)))?;
    Ok((regex, out))
}

/// Byte offset to codepoint offset.
fn char_offset(s: &str, byte: usize) -> usize {
    s[..byte].chars().count()
}

fn match_object(s: &str, regex: &Regex, caps: &regex::Captures<'_>) -> Value {
    let whole = caps.get(0);
    let (start, text) = whole.map_or((0, ""), |m| (m.start(), m.as_str()));
    let captures: Value = regex
        .capture_names()
        .enumerate()
        .skip(1)
        .map(|(i, name)| {
            let name = name.map_or(Value::Null, Value::from);
            match caps.get(i) {
                Some(m) => Value::from_pairs([
                    ("offset", Value::from(char_offset(s, m.start()))),
                    ("length", Value::from(m.as_str().chars().count())),
                    ("string", Value::from(m.as_str())),
                    ("name", name),
                ]),
                None => Value::from_pairs([
                    ("offset", Value::Number(-1.0)),
                    ("length", Value::Number(0.0)),
                    ("string", Value::Null),
                    ("name", name),
                ]),
            }
        })
        .collect();
    Value::from_pairs([
        ("offset", Value::from(char_offset(s, start))),
        ("length", Value::from(text.chars().count())),
        ("string", Value::from(text)),
        ("captures", captures),
    ])
}

/// `_match_impl(re; flags; test)`: with `test` true, whether the input
/// matches; otherwise an array of match objects.
pub(super) fn match_impl(input: &Value, args: &[Value]) -> Value {
    let s: &str = match input {
        Value::String(s) => s,
        Value::Invalid(_) => return input.clone(),
        _ => {
            return Value::invalid(format!(
                "{} cannot be matched, as it is not a string",
                input.describe()
            ));
        }
    };
    // `test(["re", "flags"])`
    let (re, flags) = match &args[0] {
        Value::Array(pair) => (
            pair.first().cloned().unwrap_or_default(),
            pair.get(1).cloned().unwrap_or_default(),
        ),
        re => (re.clone(), args[1].clone()),
    };
    let (regex, flags) = match compile(&re, &flags) {
        Ok(compiled) => compiled,
        Err(err) => return err,
    };

    if args[2].is_truthy() {
        return Value::Bool(regex.is_match(s));
    }

    let mut matches = Vec::new();
    for caps in regex.captures_iter(s) {
        if flags.skip_empty && caps.get(0).is_some_and(|m| m.as_str().is_empty()) {
            continue;
        }
        matches.push(match_object(s, &regex, &caps));
        if !flags.global {
            break;
        }
    }
    Value::array(matches)
}

/// `split(re; flags)`: the pieces between every match.
pub(super) fn split(input: &Value, args: &[Value]) -> Value {
    let s: &str = match input {
        Value::String(s) => s,
        Value::Invalid(_) => return input.clone(),
        _ => return Value::invalid("split input must be a string"),
    };
    let (regex, _) = match compile(&args[0], &args[1]) {
        Ok(compiled) => compiled,
        Err(err) => return err,
    };
    let mut pieces = Vec::new();
    let mut previous = 0;
    for m in regex.find_iter(s) {
        pieces.push(Value::from(&s[previous..m.start()]));
        previous = m.end();
    }
    pieces.push(Value::from(&s[previous..]));
    Value::array(pieces)
}
