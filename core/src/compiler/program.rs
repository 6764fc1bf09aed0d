//! The resolved program representation.
//!
//! A [`Program`] is the filter AST with every name resolved: variables and
//! filter parameters become environment indices, calls point at a local
//! definition, a prelude definition or a native builtin, and format names
//! are checked. It holds no reference to any input and is shared freely
//! between threads.

use core::fmt;

use static_assertions::assert_impl_all;

use crate::parser::{AssignOp, BinaryOp, BoolOp, ComparisonOp};
use crate::stdlib::{Format, Native, Special};
use crate::values::Value;

/// One node of a resolved filter.
#[derive(Debug, Clone)]
pub enum Filter {
    Identity,
    /// `..`
    RecurseAll,
    Literal(Value),
    /// String interpolation; `format` applies to interpolated values.
    Str {
        format: Format,
        parts: Vec<StrPart>,
    },
    /// `@fmt` applied to `.`
    Format(Format),
    Array(Option<Box<Filter>>),
    /// Entries as `(key, value)`.
    Object(Vec<(Filter, Filter)>),
    Neg(Box<Filter>),
    Pipe(Box<Filter>, Box<Filter>),
    Comma(Box<Filter>, Box<Filter>),
    Alternative(Box<Filter>, Box<Filter>),
    Binary(BinaryOp, Box<Filter>, Box<Filter>),
    Comparison(ComparisonOp, Box<Filter>, Box<Filter>),
    Boolean(BoolOp, Box<Filter>, Box<Filter>),
    Assign(AssignOp, Box<Filter>, Box<Filter>),
    Index {
        value: Box<Filter>,
        index: Box<Filter>,
        /// Out of range array indices are an error (when the run allows it).
        checked: bool,
    },
    Slice {
        value: Box<Filter>,
        from: Option<Box<Filter>>,
        to: Option<Box<Filter>>,
    },
    Iterate(Box<Filter>),
    Try {
        body: Box<Filter>,
        handler: Option<Box<Filter>>,
    },
    /// `elif` chains are nested; a missing `else` is the identity.
    If {
        cond: Box<Filter>,
        then: Box<Filter>,
        otherwise: Box<Filter>,
    },
    Reduce {
        source: Box<Filter>,
        pattern: Pattern,
        init: Box<Filter>,
        update: Box<Filter>,
    },
    Foreach {
        source: Box<Filter>,
        pattern: Pattern,
        init: Box<Filter>,
        update: Box<Filter>,
        extract: Option<Box<Filter>>,
    },
    Bind {
        source: Box<Filter>,
        pattern: Pattern,
        body: Box<Filter>,
    },
    /// A variable, by environment index.
    Var(usize),
    /// A filter parameter, by environment index.
    CallParam(usize),
    /// A local definition, by environment index.
    CallDef {
        index: usize,
        args: Vec<Filter>,
    },
    /// A prelude definition, by position in the prelude.
    CallGlobal {
        id: usize,
        args: Vec<Filter>,
    },
    /// `def ...; rest`: binds `def` for `rest`.
    Def {
        def: Box<FuncBody>,
        rest: Box<Filter>,
    },
    /// A builtin computing one value from `.` and its argument values.
    Native {
        native: Native,
        args: Vec<Filter>,
    },
    /// A builtin the evaluator implements directly (generators, `path`,
    /// `error`, ...).
    Special {
        form: Special,
        args: Vec<Filter>,
    },
}

#[derive(Debug, Clone)]
pub enum StrPart {
    Text(String),
    Interp(Filter),
}

/// The body of a definition. Its parameters are the innermost bindings of
/// the body's environment, the last parameter on top.
#[derive(Debug, Clone)]
pub struct FuncBody {
    pub name: String,
    pub arity: usize,
    pub body: Filter,
}

/// A destructuring pattern. Bound variables are pushed in the order they
/// appear in the source.
#[derive(Debug, Clone)]
pub enum Pattern {
    Var,
    Array(Vec<Pattern>),
    Object(Vec<ObjectPatternEntry>),
}

#[derive(Debug, Clone)]
pub struct ObjectPatternEntry {
    /// Evaluated against the input of the binding, in the scope outside
    /// the pattern.
    pub key: Filter,
    /// `$name` entries bind the looked-up value itself.
    pub bind: bool,
    pub pattern: Option<Pattern>,
}

impl Pattern {
    /// Number of variables this pattern binds.
    pub fn var_count(&self) -> usize {
        match self {
            Pattern::Var => 1,
            Pattern::Array(items) => items.iter().map(Pattern::var_count).sum(),
            Pattern::Object(entries) => entries
                .iter()
                .map(|e| usize::from(e.bind) + e.pattern.as_ref().map_or(0, Pattern::var_count))
                .sum(),
        }
    }
}

/// Definitions shared by every program: the filter-language part of the
/// standard library.
#[derive(Debug)]
pub struct Prelude {
    pub(crate) defs: Vec<FuncBody>,
}

impl Prelude {
    pub fn get(&self, id: usize) -> Option<&FuncBody> {
        self.defs.get(id)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

/// A compiled filter.
pub struct Program {
    pub(crate) root: Filter,
    pub(crate) params: Vec<String>,
    pub(crate) prelude: &'static Prelude,
}

assert_impl_all!(Program: Send, Sync);

impl Program {
    pub fn root(&self) -> &Filter {
        &self.root
    }

    /// Names of the `$name` parameters supplied at run time, in order.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn prelude(&self) -> &'static Prelude {
        self.prelude
    }
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Program")
            .field("params", &self.params)
            .field("root", &self.root)
            .finish()
    }
}
