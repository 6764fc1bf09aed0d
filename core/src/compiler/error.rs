//! Compilation errors.

use crate::api::{Diagnostic, Severity};
use crate::parser::{ParseError, Span};

/// Errors that can occur while turning filter source into a [`Program`].
///
/// [`Program`]: super::Program
#[derive(Debug, Clone)]
pub enum CompileError {
    /// The source does not parse.
    Parse(ParseError),
    /// The source parses but refers to something that does not exist.
    Resolve(ResolveError),
}

/// A name or format that could not be resolved, with its location.
#[derive(Debug, Clone)]
pub struct ResolveError {
    pub kind: ResolveErrorKind,
    pub source: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolveErrorKind {
    /// No definition or builtin `name/arity`.
    UndefinedFunction { name: String, arity: usize },
    /// No variable `$name` in scope.
    UndefinedVariable { name: String },
    /// `name` exists, but only with other arities (sorted, deduplicated).
    ArityMismatch {
        name: String,
        expected: Vec<usize>,
        found: usize,
    },
    /// `@name` is not one of the supported formats.
    UnknownFormat { name: String },
    /// The AST is nested deeper than the compiler accepts.
    MaxDepthExceeded { max_depth: usize },
}

impl ResolveError {
    pub fn new(kind: ResolveErrorKind, source: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            source: source.into(),
            span,
        }
    }

    fn message(&self) -> String {
        match &self.kind {
            ResolveErrorKind::UndefinedFunction { name, arity } => {
                format!("{}/{} is not defined", name, arity)
            }
            ResolveErrorKind::UndefinedVariable { name } => format!("${} is not defined", name),
            ResolveErrorKind::ArityMismatch {
                name,
                expected,
                found,
            } => format!(
                "Function '{}' expects {} argument(s), found {}",
                name,
                join_arities(expected),
                found
            ),
            ResolveErrorKind::UnknownFormat { name } => format!("@{} is not a valid format", name),
            ResolveErrorKind::MaxDepthExceeded { max_depth } => format!(
                "Expression nesting depth exceeds maximum of {} levels",
                max_depth
            ),
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let (code, help) = match &self.kind {
            ResolveErrorKind::UndefinedFunction { .. } => ("C001", None),
            ResolveErrorKind::UndefinedVariable { .. } => {
                ("C002", Some("Bind it first with `... as $name | ...`"))
            }
            ResolveErrorKind::ArityMismatch { .. } => ("C003", None),
            ResolveErrorKind::UnknownFormat { .. } => (
                "C004",
                Some("Supported formats: @text, @json, @html, @uri, @csv, @tsv, @sh"),
            ),
            ResolveErrorKind::MaxDepthExceeded { .. } => {
                ("C005", Some("Reduce nesting or simplify the expression"))
            }
        };
        Diagnostic {
            severity: Severity::Error,
            message: self.message(),
            span: self.span.clone(),
            help: help.map(str::to_string),
            code: Some(code.to_string()),
        }
    }
}

/// `0`, `0 or 1`, `1, 2 or 3`
fn join_arities(arities: &[usize]) -> String {
    match arities {
        [] => String::new(),
        [only] => only.to_string(),
        [init @ .., last] => {
            let init: Vec<String> = init.iter().map(usize::to_string).collect();
            format!("{} or {}", init.join(", "), last)
        }
    }
}

impl CompileError {
    /// Convert to a Diagnostic for API boundary.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            CompileError::Parse(err) => err.to_diagnostic(),
            CompileError::Resolve(err) => err.to_diagnostic(),
        }
    }

    /// The filter source the error points into.
    pub fn source(&self) -> &str {
        match self {
            CompileError::Parse(err) => &err.source,
            CompileError::Resolve(err) => &err.source,
        }
    }

    pub fn span(&self) -> &Span {
        match self {
            CompileError::Parse(err) => &err.span,
            CompileError::Resolve(err) => &err.span,
        }
    }
}

impl core::fmt::Display for CompileError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let diagnostic = self.to_diagnostic();
        write!(f, "{}: {}", diagnostic.severity, diagnostic.message)?;
        if let Some(ref code) = diagnostic.code {
            write!(f, " [{}]", code)?;
        }
        Ok(())
    }
}

impl std::error::Error for CompileError {}

impl From<ParseError> for CompileError {
    fn from(err: ParseError) -> Self {
        CompileError::Parse(err)
    }
}

impl From<ResolveError> for CompileError {
    fn from(err: ResolveError) -> Self {
        CompileError::Resolve(err)
    }
}
