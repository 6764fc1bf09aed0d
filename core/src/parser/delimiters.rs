//! Delimiter pre-scan.
//!
//! Walks the filter source once before the grammar runs and reports
//! unbalanced brackets, strings and `if`/`end` pairs with precise
//! messages. It also bounds nesting depth, counting open delimiters plus
//! runs of prefix constructs (`try`, `reduce`, `foreach`, unary `-`) that
//! nest without a closing token, so that the recursive-descent parser never
//! sees input deep enough to exhaust the native stack.

use crate::parser::error::{ParseError, ParseErrorKind};
use crate::parser::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Open {
    Paren,
    Bracket,
    Brace,
    /// `\(` inside a string
    Interp,
    /// A string literal; its contents are not scanned for delimiters.
    Quote,
    If,
    /// `def`, closed by the `;` that ends its body
    Def,
}

impl Open {
    fn text(self) -> &'static str {
        match self {
            Open::Paren => "(",
            Open::Bracket => "[",
            Open::Brace => "{",
            Open::Interp => "\\(",
            Open::Quote => "\"",
            Open::If => "if",
            Open::Def => "def",
        }
    }

    fn closer(self) -> &'static str {
        match self {
            Open::Paren | Open::Interp => ")",
            Open::Bracket => "]",
            Open::Brace => "}",
            Open::Quote => "\"",
            Open::If => "end",
            Open::Def => ";",
        }
    }
}

struct Scanner<'s> {
    source: &'s str,
    max_depth: usize,
    stack: Vec<(Open, usize)>,
    /// Consecutive prefix tokens seen since the last other token.
    prefix_run: usize,
}

/// Check delimiter balance and nesting depth of `source`.
pub fn check_delimiters(source: &str, max_depth: usize) -> Result<(), ParseError> {
    Scanner {
        source,
        max_depth,
        stack: Vec::new(),
        prefix_run: 0,
    }
    .scan()
}

impl<'s> Scanner<'s> {
    fn scan(mut self) -> Result<(), ParseError> {
        let source = self.source;
        let bytes = source.as_bytes();
        let mut i = 0;

        while i < bytes.len() {
            if let Some((Open::Quote, _)) = self.stack.last() {
                match bytes[i] {
                    b'"' => {
                        self.stack.pop();
                        i += 1;
                    }
                    b'\\' if bytes.get(i + 1) == Some(&b'(') => {
                        self.open(Open::Interp, i)?;
                        i += 2;
                    }
                    b'\\' => i += 2,
                    _ => i += 1,
                }
                continue;
            }

            let c = bytes[i];
            match c {
                b' ' | b'\t' | b'\r' | b'\n' => i += 1,
                b'#' => {
                    while i < bytes.len() && bytes[i] != b'\n' {
                        i += 1;
                    }
                }
                b'"' => {
                    self.prefix_run = 0;
                    self.open(Open::Quote, i)?;
                    i += 1;
                }
                b'(' | b'[' | b'{' => {
                    self.prefix_run = 0;
                    let kind = match c {
                        b'(' => Open::Paren,
                        b'[' => Open::Bracket,
                        _ => Open::Brace,
                    };
                    self.open(kind, i)?;
                    i += 1;
                }
                b')' | b']' | b'}' => {
                    self.prefix_run = 0;
                    let text = &source[i..i + 1];
                    self.close(text, i, 1)?;
                    i += 1;
                }
                b';' => {
                    self.prefix_run = 0;
                    if let Some((Open::Def, _)) = self.stack.last() {
                        self.stack.pop();
                    }
                    i += 1;
                }
                b'-' if bytes.get(i + 1) != Some(&b'=') => {
                    self.prefix(i, 1)?;
                    i += 1;
                }
                c if c.is_ascii_alphabetic() || c == b'_' => {
                    let start = i;
                    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                        i += 1;
                    }
                    self.word(start, i)?;
                }
                _ => {
                    self.prefix_run = 0;
                    i += 1;
                }
            }
        }

        // `if` and `def` left open are reported by the grammar, which can
        // say what it expected next.
        for &(kind, pos) in self.stack.iter().rev() {
            if !matches!(kind, Open::If | Open::Def) {
                return Err(self.error(
                    ParseErrorKind::UnclosedDelimiter {
                        delimiter: kind.text().to_string(),
                    },
                    pos,
                    kind.text().len(),
                ));
            }
        }
        Ok(())
    }

    fn word(&mut self, start: usize, end: usize) -> Result<(), ParseError> {
        let source = self.source;
        let bytes = source.as_bytes();
        let word = &source[start..end];

        // `.end`, `$if`, `@def` and object keys such as `{if: 1}` are names.
        let after_sigil = start > 0 && matches!(bytes[start - 1], b'.' | b'$' | b'@');
        let before_colon = source[end..].trim_start().starts_with(':');
        if after_sigil || before_colon {
            self.prefix_run = 0;
            return Ok(());
        }

        match word {
            "if" => {
                self.prefix_run = 0;
                self.open(Open::If, start)
            }
            "def" => {
                self.prefix_run = 0;
                self.open(Open::Def, start)
            }
            "end" => {
                self.prefix_run = 0;
                self.close("end", start, 3)
            }
            "try" | "reduce" | "foreach" => self.prefix(start, word.len()),
            _ => {
                self.prefix_run = 0;
                Ok(())
            }
        }
    }

    fn open(&mut self, kind: Open, pos: usize) -> Result<(), ParseError> {
        self.stack.push((kind, pos));
        self.check_depth(pos, kind.text().len())
    }

    fn prefix(&mut self, pos: usize, len: usize) -> Result<(), ParseError> {
        self.prefix_run += 1;
        self.check_depth(pos, len)
    }

    fn check_depth(&self, pos: usize, len: usize) -> Result<(), ParseError> {
        let depth = self.stack.len() + self.prefix_run;
        if depth > self.max_depth {
            return Err(self.error(
                ParseErrorKind::MaxDepthExceeded {
                    depth,
                    max_depth: self.max_depth,
                },
                pos,
                len,
            ));
        }
        Ok(())
    }

    fn close(&mut self, found: &str, pos: usize, len: usize) -> Result<(), ParseError> {
        match self.stack.last() {
            None => Err(self.error(
                ParseErrorKind::UnexpectedDelimiter {
                    delimiter: found.to_string(),
                },
                pos,
                len,
            )),
            Some(&(kind, _)) if kind.closer() == found => {
                self.stack.pop();
                Ok(())
            }
            Some(&(kind, _)) => Err(self.error(
                ParseErrorKind::MismatchedDelimiter {
                    expected: kind.closer().to_string(),
                    found: found.to_string(),
                },
                pos,
                len,
            )),
        }
    }

    fn error(&self, kind: ParseErrorKind, pos: usize, len: usize) -> ParseError {
        ParseError::new(kind, self.source, Span::new(pos, pos + len))
    }
}
