//! Filter compiler.
//!
//! Compilation parses the source (see [`crate::parser`]) and resolves the
//! AST into a [`Program`]:
//!
//! - variables and filter parameters become environment indices,
//! - calls are bound to a local definition, a prelude definition or a
//!   builtin, with arities checked,
//! - `@format` names are checked,
//! - AST nesting is bounded.
//!
//! The prelude (the part of the standard library written in the filter
//! language itself) is compiled once per process and shared by every
//! program.

mod error;
mod program;
mod resolver;


pub use error::{CompileError, ResolveError, ResolveErrorKind};
pub use program::{Filter, FuncBody, ObjectPatternEntry, Pattern, Prelude, Program, StrPart};

use lazy_static::lazy_static;

use crate::parser::{self, Expr, FuncDef};
use crate::stdlib::PRELUDE_SOURCE;
use resolver::{Globals, Resolver};

/// Default maximum AST nesting accepted by the resolver.
pub const DEFAULT_MAX_DEPTH: usize = 500;

struct CompiledPrelude {
    prelude: Prelude,
    globals: Globals,
}

lazy_static! {
    static ref PRELUDE: Result<CompiledPrelude, CompileError> = compile_prelude();
}

fn compile_prelude() -> Result<CompiledPrelude, CompileError> {
    let parsed = parser::parse(PRELUDE_SOURCE)?;

    let mut defs: Vec<&FuncDef> = Vec::new();
    let mut rest = &parsed;
    while let Expr::FuncDef { def, rest: next } = &rest.expr {
        defs.push(def);
        rest = next;
    }

    let mut globals = Globals::default();
    for (id, def) in defs.iter().enumerate() {
        globals.insert(&def.name, def.params.len(), id);
    }

    let mut bodies = Vec::with_capacity(defs.len());
    for def in defs {
        let mut resolver = Resolver::new(PRELUDE_SOURCE, &globals, DEFAULT_MAX_DEPTH).unchecked();
        bodies.push(resolver.resolve_global(def)?);
    }
    tracing::debug!(definitions = bodies.len(), "Compiled prelude");

    Ok(CompiledPrelude {
        prelude: Prelude { defs: bodies },
        globals,
    })
}

fn prelude() -> Result<&'static CompiledPrelude, CompileError> {
    PRELUDE.as_ref().map_err(Clone::clone)
}

/// Compile filter source with default limits and no parameters.
pub fn compile(source: &str) -> Result<Program, CompileError> {
    compile_with(source, &[], DEFAULT_MAX_DEPTH)
}

/// Compile filter source. `params` are the `$name` variables the program
/// expects at run time, in the order their values will be supplied.
pub fn compile_with(
    source: &str,
    params: &[String],
    max_depth: usize,
) -> Result<Program, CompileError> {
    let compiled = prelude()?;
    let parsed = parser::parse(source)?;
    let root = Resolver::new(source, &compiled.globals, max_depth)
        .with_vars(params)
        .resolve(&parsed)?;
    tracing::debug!(params = params.len(), "Compiled filter");

    Ok(Program {
        root,
        params: params.to_vec(),
        prelude: &compiled.prelude,
    })
}
