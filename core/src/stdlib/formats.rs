//! `@format` string formatters.

use core::fmt;

use crate::stdlib::strings::to_text;
use crate::values::{Value, format_number};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
    Html,
    Uri,
    Csv,
    Tsv,
    Sh,
}

impl Format {
    pub fn from_name(name: &str) -> Option<Format> {
        Some(match name {
            "text" => Format::Text,
            "json" => Format::Json,
            "html" => Format::Html,
            "uri" => Format::Uri,
            "csv" => Format::Csv,
            "tsv" => Format::Tsv,
            "sh" => Format::Sh,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Format::Text => "text",
            Format::Json => "json",
            Format::Html => "html",
            Format::Uri => "uri",
            Format::Csv => "csv",
            Format::Tsv => "tsv",
            Format::Sh => "sh",
        }
    }

    /// Format one value. The result is a string or an invalid value.
    pub fn apply(self, value: &Value) -> Value {
        let result = match self {
            Format::Text => to_text(value),
            Format::Json => match value {
                Value::Invalid(_) => Err(value.clone()),
                _ => value
                    .dump(Default::default())
                    .map_err(|err| Value::invalid(err.0)),
            },
            Format::Html => to_text(value).map(|s| escape_html(&s)),
            Format::Uri => to_text(value).map(|s| escape_uri(&s)),
            Format::Csv => csv(value),
            Format::Tsv => tsv(value),
            Format::Sh => sh(value),
        };
        result.map(Value::from).unwrap_or_else(|err| err)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.name())
    }
}

/// `format(name)`
pub(super) fn format(input: &Value, args: &[Value]) -> Value {
    match &args[0] {
        Value::String(name) => match Format::from_name(name) {
            Some(format) => format.apply(input),
            None => Value::invalid(format!("{} is not a valid format", name)),
        },
        Value::Invalid(_) => args[0].clone(),
        other => Value::invalid(format!("{} is not a valid format", other.describe())),
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '\'' => out.push_str("&#39;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

/// Percent-encode everything outside the unreserved set.
fn escape_uri(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

fn row<'a>(value: &'a Value, name: &str) -> Result<&'a [Value], Value> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Invalid(_) => Err(value.clone()),
        _ => Err(Value::invalid(format!(
            "{} cannot be {}-formatted, only an array can be",
            value.describe(),
            name
        ))),
    }
}

fn csv(value: &Value) -> Result<String, Value> {
    let mut cells = Vec::new();
    for item in row(value, "csv")? {
        cells.push(match item {
            Value::Number(n) => format_number(*n),
            Value::String(s) => format!("\"{}\"", s.replace('"', "\"\"")),
            Value::Bool(b) => b.to_string(),
            Value::Null => String::new(),
            _ => {
                return Err(Value::invalid(format!(
                    "{} is not valid in a csv row",
                    item.describe()
                )));
            }
        });
    }
    Ok(cells.join(","))
}

fn tsv(value: &Value) -> Result<String, Value> {
    let mut cells = Vec::new();
    for item in row(value, "tsv")? {
        cells.push(match item {
            Value::Number(n) => format_number(*n),
            Value::String(s) => s
                .replace('\\', "\\\\")
                .replace('\t', "\\t")
                .replace('\n', "\\n")
                .replace('\r', "\\r"),
            Value::Bool(b) => b.to_string(),
            Value::Null => String::new(),
            _ => {
                return Err(Value::invalid(format!(
                    "{} is not valid in a tsv row",
                    item.describe()
                )));
            }
        });
    }
    Ok(cells.join("\t"))
}

/// Single-quote strings for a POSIX shell; arrays become space separated
/// words.
fn sh(value: &Value) -> Result<String, Value> {
    let quote = |item: &Value| -> Result<String, Value> {
        match item {
            Value::String(s) => Ok(format!("'{}'", s.replace('\'', "'\\''"))),
            Value::Array(_) | Value::Object(_) => Err(Value::invalid(format!(
                "{} can not be escaped for shell",
                item.describe()
            ))),
            Value::Invalid(_) => Err(item.clone()),
            _ => to_text(item),
        }
    };
    match value {
        Value::Array(items) => Ok(items
            .iter()
            .map(quote)
            .collect::<Result<Vec<_>, _>>()?
            .join(" ")),
        _ => quote(value),
    }
}
