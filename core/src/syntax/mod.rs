//! Lexical helpers shared by the filter parser.

pub mod string_literal;

pub use string_literal::{UnescapeError, unescape_string};
