//! Standard library.
//!
//! Builtins come in three flavours:
//! - **Natives**: plain Rust functions from the input and the argument
//!   values to one result value. The evaluator runs the arguments, forms
//!   their Cartesian product and calls the function once per combination.
//! - **Specials**: builtins that need the evaluator itself (generators,
//!   `path`, `error`, ...). The compiler tags them and the evaluator
//!   implements them directly.
//! - **Prelude definitions**: builtins written in the filter language,
//!   in `prelude.jq`, compiled once and shared by all programs.
//!
//! Natives report failures by returning [`Value::Invalid`].

use core::fmt;

use crate::values::Value;

mod collections;
mod formats;
mod math;
mod matching;
mod paths;
mod strings;

#[cfg(test)]
mod math_test;
#[cfg(test)]
mod matching_test;
#[cfg(test)]
mod strings_test;

pub use formats::Format;
pub use paths::{delpaths, getpath, setpath};

/// Source of the prelude definitions.
pub const PRELUDE_SOURCE: &str = include_str!("prelude.jq");

/// Signature of a native builtin: input, then argument values.
pub type NativeFn = fn(&Value, &[Value]) -> Value;

/// A resolved native builtin.
#[derive(Clone, Copy)]
pub struct Native {
    pub name: &'static str,
    pub func: NativeFn,
}

impl fmt::Debug for Native {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Native({})", self.name)
    }
}

/// Builtins implemented inside the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Special {
    /// `empty`
    Empty,
    /// `error/0`: raise the input.
    Error,
    /// `path(f)`
    Path,
    /// `recurse(f)`, `repeat(f)`
    Recurse,
    /// `range(from; upto)`, `range(from; upto; by)`
    Range,
    /// `while(cond; update)`
    While,
    /// `until(cond; update)`
    Until,
    /// `limit(n; f)`
    Limit,
    /// `first(f)`
    First,
    /// `last(f)`
    Last,
    /// `getpath(p)`
    GetPath,
    /// `debug`
    Debug,
}

#[derive(Debug, Clone, Copy)]
pub enum Implementation {
    Native(NativeFn),
    Special(Special),
}

#[derive(Debug)]
pub struct Builtin {
    pub name: &'static str,
    pub arity: usize,
    pub implementation: Implementation,
}

const fn native(name: &'static str, arity: usize, func: NativeFn) -> Builtin {
    Builtin {
        name,
        arity,
        implementation: Implementation::Native(func),
    }
}

const fn special(name: &'static str, arity: usize, form: Special) -> Builtin {
    Builtin {
        name,
        arity,
        implementation: Implementation::Special(form),
    }
}

static BUILTINS: &[Builtin] = &[
    // Control
    special("empty", 0, Special::Empty),
    special("error", 0, Special::Error),
    special("path", 1, Special::Path),
    special("recurse", 1, Special::Recurse),
    special("repeat", 1, Special::Recurse),
    special("range", 2, Special::Range),
    special("range", 3, Special::Range),
    special("while", 2, Special::While),
    special("until", 2, Special::Until),
    special("limit", 2, Special::Limit),
    special("first", 1, Special::First),
    special("last", 1, Special::Last),
    special("getpath", 1, Special::GetPath),
    special("debug", 0, Special::Debug),
    native("not", 0, collections::not),
    // Collections
    native("length", 0, collections::length),
    native("utf8bytelength", 0, strings::utf8bytelength),
    native("keys", 0, collections::keys),
    native("keys_unsorted", 0, collections::keys_unsorted),
    native("has", 1, collections::has),
    native("contains", 1, collections::contains),
    native("flatten", 0, collections::flatten),
    native("flatten", 1, collections::flatten),
    native("sort", 0, collections::sort),
    native("_sort_by_impl", 1, collections::sort_by_impl),
    native("_group_by_impl", 1, collections::group_by_impl),
    native("unique", 0, collections::unique),
    native("min", 0, collections::min),
    native("max", 0, collections::max),
    native("_min_by_impl", 1, collections::min_by_impl),
    native("_max_by_impl", 1, collections::max_by_impl),
    native("reverse", 0, collections::reverse),
    native("transpose", 0, collections::transpose),
    native("indices", 1, collections::indices),
    native("to_entries", 0, collections::to_entries),
    native("from_entries", 0, collections::from_entries),
    native("type", 0, collections::type_of),
    // Paths
    native("setpath", 2, paths::setpath_native),
    native("delpaths", 1, paths::delpaths_native),
    // Math
    native("infinite", 0, math::infinite),
    native("nan", 0, math::nan),
    native("isinfinite", 0, math::isinfinite),
    native("isnan", 0, math::isnan),
    native("isnormal", 0, math::isnormal),
    native("floor", 0, math::floor),
    native("ceil", 0, math::ceil),
    native("round", 0, math::round),
    native("trunc", 0, math::trunc),
    native("fabs", 0, math::fabs),
    native("abs", 0, math::abs),
    native("sqrt", 0, math::sqrt),
    native("log", 0, math::log),
    native("log2", 0, math::log2),
    native("log10", 0, math::log10),
    native("exp", 0, math::exp),
    native("exp2", 0, math::exp2),
    native("exp10", 0, math::exp10),
    native("pow", 2, math::pow),
    // Strings
    native("tostring", 0, strings::tostring),
    native("tonumber", 0, strings::tonumber),
    native("tojson", 0, strings::tojson),
    native("fromjson", 0, strings::fromjson),
    native("ascii_downcase", 0, strings::ascii_downcase),
    native("ascii_upcase", 0, strings::ascii_upcase),
    native("ltrimstr", 1, strings::ltrimstr),
    native("rtrimstr", 1, strings::rtrimstr),
    native("startswith", 1, strings::startswith),
    native("endswith", 1, strings::endswith),
    native("trim", 0, strings::trim),
    native("ltrim", 0, strings::ltrim),
    native("rtrim", 0, strings::rtrim),
    native("explode", 0, strings::explode),
    native("implode", 0, strings::implode),
    native("split", 1, strings::split),
    native("join", 1, strings::join),
    native("format", 1, formats::format),
    // Regular expressions
    native("_match_impl", 3, matching::match_impl),
    native("split", 2, matching::split),
];

/// Find the builtin `name/arity`.
pub fn lookup(name: &str, arity: usize) -> Option<&'static Builtin> {
    BUILTINS
        .iter()
        .find(|builtin| builtin.name == name && builtin.arity == arity)
}

/// Every arity `name` is defined with.
pub fn arities_of(name: &str) -> impl Iterator<Item = usize> {
    let name = name.to_string();
    BUILTINS
        .iter()
        .filter(move |builtin| builtin.name == name)
        .map(|builtin| builtin.arity)
}

/// All builtins, for listings.
pub fn builtins() -> &'static [Builtin] {
    BUILTINS
}
