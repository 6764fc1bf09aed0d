/// String literal unescaping for filter source.
///
/// Filter strings use JSON escapes: `\"`, `\\`, `\/`, `\b`, `\f`, `\n`,
/// `\r`, `\t` and `\uXXXX`, where a high surrogate must be followed by an
/// escaped low surrogate. Interpolations (`\(...)`) are split off by the
/// grammar before the text reaches this module.
use std::borrow::Cow;
use std::fmt;

/// Errors that can occur when unescaping string literals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnescapeError {
    /// Invalid escape sequence (e.g., `\q`)
    InvalidEscape { pos: usize, seq: String },
    /// Fewer than four hex digits after `\u`
    IncompleteUnicodeEscape { pos: usize },
    /// A surrogate half that is not part of a valid pair
    LoneSurrogate { pos: usize, value: u32 },
}

impl fmt::Display for UnescapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnescapeError::InvalidEscape { pos, seq } => {
                write!(f, "invalid escape sequence '{}' at position {}", seq, pos)
            }
            UnescapeError::IncompleteUnicodeEscape { pos } => {
                write!(f, "incomplete Unicode escape at position {}", pos)
            }
            UnescapeError::LoneSurrogate { pos, value } => {
                write!(f, "invalid surrogate \\u{:04x} at position {}", value, pos)
            }
        }
    }
}

impl std::error::Error for UnescapeError {}

/// Unescape the text between the quotes of a string literal.
///
/// Returns the input unchanged (borrowed) when it holds no backslash.
pub fn unescape_string(input: &str) -> Result<Cow<'_, str>, UnescapeError> {
    if !input.contains('\\') {
        return Ok(Cow::Borrowed(input));
    }

    let mut output = String::with_capacity(input.len());
    let mut chars = input.char_indices().peekable();

    while let Some((pos, ch)) = chars.next() {
        if ch != '\\' {
            output.push(ch);
            continue;
        }
        match chars.next() {
            Some((_, '"')) => output.push('"'),
            Some((_, '\\')) => output.push('\\'),
            Some((_, '/')) => output.push('/'),
            Some((_, 'b')) => output.push('\u{08}'),
            Some((_, 'f')) => output.push('\u{0c}'),
            Some((_, 'n')) => output.push('\n'),
            Some((_, 'r')) => output.push('\r'),
            Some((_, 't')) => output.push('\t'),
            Some((_, 'u')) => {
                let unit = read_hex4(&mut chars, pos)?;
                let code = match unit {
                    0xD800..=0xDBFF => {
                        let low_pos = chars.peek().map_or(input.len(), |(p, _)| *p);
                        let low = match (chars.next(), chars.next()) {
                            (Some((_, '\\')), Some((_, 'u'))) => read_hex4(&mut chars, low_pos)?,
                            _ => return Err(UnescapeError::LoneSurrogate { pos, value: unit }),
                        };
                        if !(0xDC00..=0xDFFF).contains(&low) {
                            return Err(UnescapeError::LoneSurrogate { pos, value: unit });
                        }
                        0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00)
                    }
                    0xDC00..=0xDFFF => {
                        return Err(UnescapeError::LoneSurrogate { pos, value: unit });
                    }
                    _ => unit,
                };
                match char::from_u32(code) {
                    Some(c) => output.push(c),
                    None => return Err(UnescapeError::LoneSurrogate { pos, value: code }),
                }
            }
            Some((_, other)) => {
                return Err(UnescapeError::InvalidEscape {
                    pos,
                    seq: format!("\\{}", other),
                });
            }
            None => {
                return Err(UnescapeError::InvalidEscape {
                    pos,
                    seq: "\\".to_string(),
                });
            }
        }
    }

    Ok(Cow::Owned(output))
}

fn read_hex4(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    pos: usize,
) -> Result<u32, UnescapeError> {
    let mut value = 0u32;
    for _ in 0..4 {
        let digit = chars
            .next()
            .and_then(|(_, c)| c.to_digit(16))
            .ok_or(UnescapeError::IncompleteUnicodeEscape { pos })?;
        value = (value << 4) | digit;
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unescape_no_escapes_borrows() {
        let result = unescape_string("hello").unwrap();
        assert!(matches!(result, Cow::Borrowed("hello")));
    }

    #[test]
    fn test_unescape_common_escapes() {
        assert_eq!(
            unescape_string(r#"a\"b\\c\/d\n\t\r\b\f"#).unwrap(),
            "a\"b\\c/d\n\t\r\u{08}\u{0c}"
        );
    }

    #[test]
    fn test_unescape_unicode() {
        assert_eq!(unescape_string(r"\u00e9t\u00E9").unwrap(), "été");
    }

    #[test]
    fn test_unescape_surrogate_pair() {
        assert_eq!(unescape_string(r"\ud83d\ude00!").unwrap(), "😀!");
    }

    #[test]
    fn test_unescape_lone_surrogates() {
        assert_eq!(
            unescape_string(r"\ud83d"),
            Err(UnescapeError::LoneSurrogate {
                pos: 0,
                value: 0xd83d
            })
        );
        assert!(matches!(
            unescape_string(r"x\ude00"),
            Err(UnescapeError::LoneSurrogate { pos: 1, .. })
        ));
        assert!(unescape_string(r"\ud83dA").is_err());
    }

    #[test]
    fn test_unescape_invalid_escape() {
        assert_eq!(
            unescape_string(r"ab\q"),
            Err(UnescapeError::InvalidEscape {
                pos: 2,
                seq: r"\q".to_string()
            })
        );
    }

    #[test]
    fn test_unescape_incomplete_unicode() {
        assert_eq!(
            unescape_string(r"\u12"),
            Err(UnescapeError::IncompleteUnicodeEscape { pos: 0 })
        );
    }
}
