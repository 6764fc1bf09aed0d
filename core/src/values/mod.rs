//! JSON values.
//!
//! [`Value`] is the single runtime representation used everywhere in the
//! engine: parsed input, intermediate results and outputs. Containers are
//! reference counted and copy-on-write, so cloning a value is cheap and
//! never observable.

mod display;
mod json;
mod value;

#[cfg(test)]
mod display_test;
#[cfg(test)]
mod value_test;

pub use display::{DumpStyle, InvalidValue, format_number};
pub use json::{DEFAULT_MAX_DEPTH, JsonError, parse_json, parse_json_with_max_depth};
pub use value::{Kind, Map, Value};

pub(crate) use display::write_string;
pub(crate) use value::{resolve_index, slice_bounds};
