//! JSON serialization of values.

use core::fmt;

use super::Value;

/// Output layout for [`Value::dump`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DumpStyle {
    /// Everything on one line, no spaces (jq `-c`).
    #[default]
    Compact,
    /// One element per line, nested levels indented by `indent` spaces.
    Pretty { indent: usize },
}

impl DumpStyle {
    pub fn pretty() -> Self {
        DumpStyle::Pretty { indent: 2 }
    }
}

/// Returned when asked to serialize a value that is, or contains, an
/// invalid value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot serialize an invalid value: {0}")]
pub struct InvalidValue(pub String);

impl Value {
    /// Serialize to JSON text.
    pub fn dump(&self, style: DumpStyle) -> Result<String, InvalidValue> {
        let mut out = String::new();
        write_value(&mut out, self, style, 0, true)?;
        Ok(out)
    }
}

fn write_value(
    out: &mut String,
    value: &Value,
    style: DumpStyle,
    level: usize,
    strict: bool,
) -> Result<(), InvalidValue> {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&format_number(*n)),
        Value::String(s) => write_string(out, s),
        Value::Array(items) => {
            if items.is_empty() {
                out.push_str("[]");
                return Ok(());
            }
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                newline(out, style, level + 1);
                write_value(out, item, style, level + 1, strict)?;
            }
            newline(out, style, level);
            out.push(']');
        }
        Value::Object(map) => {
            if map.is_empty() {
                out.push_str("{}");
                return Ok(());
            }
            out.push('{');
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                newline(out, style, level + 1);
                write_string(out, key);
                out.push(':');
                if let DumpStyle::Pretty { .. } = style {
                    out.push(' ');
                }
                write_value(out, item, style, level + 1, strict)?;
            }
            newline(out, style, level);
            out.push('}');
        }
        Value::Invalid(msg) => {
            if strict {
                return Err(InvalidValue(msg.to_string()));
            }
            out.push_str("<invalid: ");
            out.push_str(msg);
            out.push('>');
        }
    }
    Ok(())
}

fn newline(out: &mut String, style: DumpStyle, level: usize) {
    if let DumpStyle::Pretty { indent } = style {
        out.push('\n');
        out.extend(core::iter::repeat_n(' ', indent * level));
    }
}

pub(crate) fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Format a number the way jq prints it.
///
/// Integral values below 1e17 print without a fraction, `nan` prints as
/// `null` and infinities saturate to the largest finite double.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "null".to_string();
    }
    let n = if n.is_infinite() {
        f64::MAX.copysign(n)
    } else {
        n
    };
    if n == n.trunc() && n.abs() < 1e17 {
        return format!("{}", n as i64);
    }
    let mut buf = ryu::Buffer::new();
    let repr = buf.format_finite(n);
    match repr.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exp),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => repr.strip_suffix(".0").unwrap_or(repr).to_string(),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        // Lenient mode never fails.
        let _ = write_value(&mut out, self, DumpStyle::Compact, 0, false);
        f.write_str(&out)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
