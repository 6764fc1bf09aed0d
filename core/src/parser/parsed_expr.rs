use core::fmt;

use crate::parser::{AssignOp, BinaryOp, BoolOp, ComparisonOp, Span};
use crate::values::{format_number, write_string};

/// An AST node together with the source range it was parsed from.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedExpr {
    pub expr: Expr,
    pub span: Span,
}

impl ParsedExpr {
    pub fn new(expr: Expr, span: Span) -> Self {
        Self { expr, span }
    }

    pub fn boxed(self) -> Box<ParsedExpr> {
        Box::new(self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `.`
    Identity,
    /// `..`
    RecurseAll,
    Literal(Literal),
    /// A string with interpolations, optionally under a format (`@csv "..."`).
    Str {
        format: Option<String>,
        parts: Vec<StringPart>,
    },
    /// `@fmt` applied to `.`
    Format(String),
    /// `$name`
    Var(String),
    /// `name` or `name(arg; ...)`
    Call {
        name: String,
        args: Vec<ParsedExpr>,
    },
    /// `[e]`, or `[]` when `None`
    Array(Option<Box<ParsedExpr>>),
    Object(Vec<ObjectEntry>),
    Neg(Box<ParsedExpr>),
    Pipe(Box<ParsedExpr>, Box<ParsedExpr>),
    Comma(Box<ParsedExpr>, Box<ParsedExpr>),
    /// `a // b`
    Alternative(Box<ParsedExpr>, Box<ParsedExpr>),
    Binary {
        op: BinaryOp,
        left: Box<ParsedExpr>,
        right: Box<ParsedExpr>,
    },
    Comparison {
        op: ComparisonOp,
        left: Box<ParsedExpr>,
        right: Box<ParsedExpr>,
    },
    Boolean {
        op: BoolOp,
        left: Box<ParsedExpr>,
        right: Box<ParsedExpr>,
    },
    Assign {
        op: AssignOp,
        path: Box<ParsedExpr>,
        value: Box<ParsedExpr>,
    },
    /// `v[i]`, `v.name`, `v."name"`
    Index {
        value: Box<ParsedExpr>,
        index: Box<ParsedExpr>,
    },
    /// `v[from:to]`
    Slice {
        value: Box<ParsedExpr>,
        from: Option<Box<ParsedExpr>>,
        to: Option<Box<ParsedExpr>>,
    },
    /// `v[]`
    Iterate(Box<ParsedExpr>),
    /// `try body catch handler`; `body?` has no handler.
    Try {
        body: Box<ParsedExpr>,
        handler: Option<Box<ParsedExpr>>,
    },
    If {
        // REQUIRES: at least one (condition, branch) pair
        branches: Vec<(ParsedExpr, ParsedExpr)>,
        otherwise: Option<Box<ParsedExpr>>,
    },
    Reduce {
        source: Box<ParsedExpr>,
        pattern: Pattern,
        init: Box<ParsedExpr>,
        update: Box<ParsedExpr>,
    },
    Foreach {
        source: Box<ParsedExpr>,
        pattern: Pattern,
        init: Box<ParsedExpr>,
        update: Box<ParsedExpr>,
        extract: Option<Box<ParsedExpr>>,
    },
    /// `source as pattern | body`
    Bind {
        source: Box<ParsedExpr>,
        pattern: Pattern,
        body: Box<ParsedExpr>,
    },
    /// `def name(params): body; rest`
    FuncDef {
        def: Box<FuncDef>,
        rest: Box<ParsedExpr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum StringPart {
    Text(String),
    Interp(ParsedExpr),
}

/// One `key: value` entry of an object constructor. Shorthand entries
/// (`{a}`, `{$x}`, `{"k"}`) are expanded by the parser.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectEntry {
    pub key: ParsedExpr,
    pub value: ParsedExpr,
}

/// Destructuring target of `as`, `reduce` and `foreach`.
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    Var { name: String, span: Span },
    Array(Vec<Pattern>),
    Object(Vec<ObjectPatternEntry>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectPatternEntry {
    /// `$name`, or `$name: pattern`, which binds `.name` and destructures it too.
    Var {
        name: String,
        span: Span,
        pattern: Option<Pattern>,
    },
    /// `key: pattern`, where the key is an identifier, string or `(expr)`.
    Keyed { key: ParsedExpr, pattern: Pattern },
}

impl Pattern {
    /// Variable names bound by this pattern, in order of appearance.
    pub fn variables(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_variables(&mut out);
        out
    }

    fn collect_variables<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Pattern::Var { name, .. } => out.push(name),
            Pattern::Array(items) => items.iter().for_each(|p| p.collect_variables(out)),
            Pattern::Object(entries) => {
                for entry in entries {
                    match entry {
                        ObjectPatternEntry::Var { name, pattern, .. } => {
                            out.push(name);
                            if let Some(p) = pattern {
                                p.collect_variables(out);
                            }
                        }
                        ObjectPatternEntry::Keyed { pattern, .. } => pattern.collect_variables(out),
                    }
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    /// `f`: a filter argument, evaluated lazily in the caller's scope.
    Filter(String),
    /// `$x`: bound to each output of the argument.
    Var(String),
}

impl Param {
    pub fn name(&self) -> &str {
        match self {
            Param::Filter(name) | Param::Var(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncDef {
    pub name: String,
    pub params: Vec<Param>,
    pub body: ParsedExpr,
    pub span: Span,
}

// ============================================================================
// Canonical rendering
// ============================================================================
//
// Every operator application is parenthesized, so the output shows how the
// source was grouped. Spans are not printed.

impl fmt::Display for ParsedExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.expr, f)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => f.write_str("null"),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Number(n) => f.write_str(&format_number(*n)),
            Literal::String(s) => {
                let mut out = String::new();
                write_string(&mut out, s);
                f.write_str(&out)
            }
        }
    }
}

fn write_args(f: &mut fmt::Formatter<'_>, args: &[ParsedExpr]) -> fmt::Result {
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            f.write_str("; ")?;
        }
        write!(f, "{}", arg)?;
    }
    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Identity => f.write_str("."),
            Expr::RecurseAll => f.write_str(".."),
            Expr::Literal(lit) => write!(f, "{}", lit),
            Expr::Str { format, parts } => {
                if let Some(name) = format {
                    write!(f, "@{} ", name)?;
                }
                f.write_str("\"")?;
                for part in parts {
                    match part {
                        StringPart::Text(text) => {
                            let mut out = String::new();
                            write_string(&mut out, text);
                            f.write_str(&out[1..out.len() - 1])?;
                        }
                        StringPart::Interp(e) => write!(f, "\\({})", e)?,
                    }
                }
                f.write_str("\"")
            }
            Expr::Format(name) => write!(f, "@{}", name),
            Expr::Var(name) => write!(f, "${}", name),
            Expr::Call { name, args } if args.is_empty() => f.write_str(name),
            Expr::Call { name, args } => {
                write!(f, "{}(", name)?;
                write_args(f, args)?;
                f.write_str(")")
            }
            Expr::Array(None) => f.write_str("[]"),
            Expr::Array(Some(e)) => write!(f, "[{}]", e),
            Expr::Object(entries) => {
                f.write_str("{")?;
                for (i, entry) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "({}): ({})", entry.key, entry.value)?;
                }
                f.write_str("}")
            }
            Expr::Neg(e) => write!(f, "(-{})", e),
            Expr::Pipe(a, b) => write!(f, "({} | {})", a, b),
            Expr::Comma(a, b) => write!(f, "({}, {})", a, b),
            Expr::Alternative(a, b) => write!(f, "({} // {})", a, b),
            Expr::Binary { op, left, right } => write!(f, "({} {} {})", left, op.symbol(), right),
            Expr::Comparison { op, left, right } => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
            Expr::Boolean { op, left, right } => write!(f, "({} {} {})", left, op.symbol(), right),
            Expr::Assign { op, path, value } => write!(f, "({} {} {})", path, op.symbol(), value),
            Expr::Index { value, index } => write!(f, "{}[{}]", value, index),
            Expr::Slice { value, from, to } => {
                write!(f, "{}[", value)?;
                if let Some(from) = from {
                    write!(f, "{}", from)?;
                }
                f.write_str(":")?;
                if let Some(to) = to {
                    write!(f, "{}", to)?;
                }
                f.write_str("]")
            }
            Expr::Iterate(e) => write!(f, "{}[]", e),
            Expr::Try { body, handler: None } => write!(f, "(try {})", body),
            Expr::Try {
                body,
                handler: Some(handler),
            } => write!(f, "(try {} catch {})", body, handler),
            Expr::If {
                branches,
                otherwise,
            } => {
                for (i, (cond, then)) in branches.iter().enumerate() {
                    let kw = if i == 0 { "if" } else { " elif" };
                    write!(f, "{} {} then {}", kw, cond, then)?;
                }
                if let Some(e) = otherwise {
                    write!(f, " else {}", e)?;
                }
                f.write_str(" end")
            }
            Expr::Reduce {
                source,
                pattern,
                init,
                update,
            } => write!(f, "reduce {} as {} ({}; {})", source, pattern, init, update),
            Expr::Foreach {
                source,
                pattern,
                init,
                update,
                extract,
            } => {
                write!(f, "foreach {} as {} ({}; {}", source, pattern, init, update)?;
                if let Some(extract) = extract {
                    write!(f, "; {}", extract)?;
                }
                f.write_str(")")
            }
            Expr::Bind {
                source,
                pattern,
                body,
            } => write!(f, "({} as {} | {})", source, pattern, body),
            Expr::FuncDef { def, rest } => {
                write!(f, "(def {}", def.name)?;
                if !def.params.is_empty() {
                    f.write_str("(")?;
                    for (i, param) in def.params.iter().enumerate() {
                        if i > 0 {
                            f.write_str("; ")?;
                        }
                        match param {
                            Param::Filter(name) => f.write_str(name)?,
                            Param::Var(name) => write!(f, "${}", name)?,
                        }
                    }
                    f.write_str(")")?;
                }
                write!(f, ": {}; {})", def.body, rest)
            }
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Var { name, .. } => write!(f, "${}", name),
            Pattern::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Pattern::Object(entries) => {
                f.write_str("{")?;
                for (i, entry) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    match entry {
                        ObjectPatternEntry::Var {
                            name,
                            pattern: None,
                            ..
                        } => write!(f, "${}", name)?,
                        ObjectPatternEntry::Var {
                            name,
                            pattern: Some(p),
                            ..
                        } => write!(f, "${}: {}", name, p)?,
                        ObjectPatternEntry::Keyed { key, pattern } => {
                            write!(f, "({}): {}", key, pattern)?
                        }
                    }
                }
                f.write_str("}")
            }
        }
    }
}
