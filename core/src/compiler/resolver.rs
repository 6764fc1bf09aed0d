//! AST to [`Filter`] lowering.
//!
//! The resolver walks the parsed AST once, keeping a [`ScopeStack`] that
//! mirrors the environment the evaluator will build, and replaces every
//! name by what it refers to. Lookups for calls go innermost first:
//! local definitions and filter parameters, then prelude definitions, then
//! native builtins.

use std::collections::HashMap;

use crate::compiler::error::{CompileError, ResolveError, ResolveErrorKind};
use crate::compiler::program::{Filter, FuncBody, ObjectPatternEntry, Pattern, StrPart};
use crate::parser::{
    Expr, FuncDef, Literal, ObjectPatternEntry as AstPatternEntry, Param, ParsedExpr,
    Pattern as AstPattern, Span, StringPart,
};
use crate::scope_stack::{Binding, CallTarget, ScopeStack};
use crate::stdlib::{self, Format, Implementation, Native};
use crate::values::Value;

/// Signatures of the prelude definitions, by `(name, arity)`.
#[derive(Debug, Default)]
pub(crate) struct Globals {
    index: HashMap<(String, usize), usize>,
}

impl Globals {
    pub(crate) fn insert(&mut self, name: &str, arity: usize, id: usize) {
        self.index.insert((name.to_string(), arity), id);
    }

    fn lookup(&self, name: &str, arity: usize) -> Option<usize> {
        self.index.get(&(name.to_string(), arity)).copied()
    }

    fn arities_of<'s>(&'s self, name: &'s str) -> impl Iterator<Item = usize> + 's {
        self.index
            .keys()
            .filter(move |(n, _)| n == name)
            .map(|(_, arity)| *arity)
    }
}

pub(crate) struct Resolver<'a> {
    source: &'a str,
    globals: &'a Globals,
    scope: ScopeStack,
    max_depth: usize,
    /// Whether array indexing may report out of range indices.
    checked_index: bool,
}

type Result<T> = core::result::Result<T, CompileError>;

impl<'a> Resolver<'a> {
    pub(crate) fn new(source: &'a str, globals: &'a Globals, max_depth: usize) -> Self {
        Self {
            source,
            globals,
            scope: ScopeStack::new(),
            max_depth,
            checked_index: true,
        }
    }

    /// Indexing in prelude code keeps jq's lenient `null` for missing
    /// elements.
    pub(crate) fn unchecked(mut self) -> Self {
        self.checked_index = false;
        self
    }

    /// Bind `$name` for each run-time parameter, in order.
    pub(crate) fn with_vars(mut self, names: &[String]) -> Self {
        for name in names {
            self.scope.push(Binding::Var(name.clone()));
        }
        self
    }

    pub(crate) fn resolve(&mut self, expr: &ParsedExpr) -> Result<Filter> {
        self.lower(expr, 0)
    }

    /// Lower the body of a top-level definition. Parameters are the only
    /// bindings in scope; the definition itself is reached through the
    /// globals.
    pub(crate) fn resolve_global(&mut self, def: &FuncDef) -> Result<FuncBody> {
        let mark = self.scope.len();
        let body = self.lower_def_body(def, 0)?;
        self.scope.truncate(mark);
        Ok(body)
    }

    fn error(&self, kind: ResolveErrorKind, span: &Span) -> CompileError {
        ResolveError::new(kind, self.source, span.clone()).into()
    }

    fn lower_box(&mut self, expr: &ParsedExpr, depth: usize) -> Result<Box<Filter>> {
        self.lower(expr, depth).map(Box::new)
    }

    fn lower_opt(&mut self, expr: &Option<Box<ParsedExpr>>, depth: usize) -> Result<Option<Box<Filter>>> {
        expr.as_deref().map(|e| self.lower_box(e, depth)).transpose()
    }

    fn lower(&mut self, expr: &ParsedExpr, depth: usize) -> Result<Filter> {
        if depth > self.max_depth {
            return Err(self.error(
                ResolveErrorKind::MaxDepthExceeded {
                    max_depth: self.max_depth,
                },
                &expr.span,
            ));
        }
        let depth = depth + 1;

        let filter = match &expr.expr {
            Expr::Identity => Filter::Identity,
            Expr::RecurseAll => Filter::RecurseAll,
            Expr::Literal(lit) => Filter::Literal(literal_value(lit)),
            Expr::Str { format, parts } => {
                let format = match format {
                    Some(name) => self.format(name, &expr.span)?,
                    None => Format::Text,
                };
                let parts = parts
                    .iter()
                    .map(|part| match part {
                        StringPart::Text(text) => Ok(StrPart::Text(text.clone())),
                        StringPart::Interp(e) => self.lower(e, depth).map(StrPart::Interp),
                    })
                    .collect::<Result<Vec<_>>>()?;
                Filter::Str { format, parts }
            }
            Expr::Format(name) => Filter::Format(self.format(name, &expr.span)?),
            Expr::Var(name) => self.var(name, &expr.span)?,
            Expr::Call { name, args } => self.call(name, args, &expr.span, depth)?,
            Expr::Array(inner) => Filter::Array(self.lower_opt(inner, depth)?),
            Expr::Object(entries) => Filter::Object(
                entries
                    .iter()
                    .map(|entry| {
                        Ok((
                            self.lower(&entry.key, depth)?,
                            self.lower(&entry.value, depth)?,
                        ))
                    })
                    .collect::<Result<Vec<_>>>()?,
            ),
            Expr::Neg(e) => Filter::Neg(self.lower_box(e, depth)?),
            Expr::Pipe(a, b) => Filter::Pipe(self.lower_box(a, depth)?, self.lower_box(b, depth)?),
            Expr::Comma(a, b) => {
                Filter::Comma(self.lower_box(a, depth)?, self.lower_box(b, depth)?)
            }
            Expr::Alternative(a, b) => {
                Filter::Alternative(self.lower_box(a, depth)?, self.lower_box(b, depth)?)
            }
            Expr::Binary { op, left, right } => Filter::Binary(
                *op,
                self.lower_box(left, depth)?,
                self.lower_box(right, depth)?,
            ),
            Expr::Comparison { op, left, right } => Filter::Comparison(
                *op,
                self.lower_box(left, depth)?,
                self.lower_box(right, depth)?,
            ),
            Expr::Boolean { op, left, right } => Filter::Boolean(
                *op,
                self.lower_box(left, depth)?,
                self.lower_box(right, depth)?,
            ),
            Expr::Assign { op, path, value } => Filter::Assign(
                *op,
                self.lower_box(path, depth)?,
                self.lower_box(value, depth)?,
            ),
            Expr::Index { value, index } => Filter::Index {
                value: self.lower_box(value, depth)?,
                index: self.lower_box(index, depth)?,
                checked: self.checked_index,
            },
            Expr::Slice { value, from, to } => Filter::Slice {
                value: self.lower_box(value, depth)?,
                from: self.lower_opt(from, depth)?,
                to: self.lower_opt(to, depth)?,
            },
            Expr::Iterate(e) => Filter::Iterate(self.lower_box(e, depth)?),
            Expr::Try { body, handler } => Filter::Try {
                body: self.lower_box(body, depth)?,
                handler: self.lower_opt(handler, depth)?,
            },
            Expr::If {
                branches,
                otherwise,
            } => {
                let mut acc = match otherwise {
                    Some(e) => self.lower(e, depth)?,
                    None => Filter::Identity,
                };
                for (cond, then) in branches.iter().rev() {
                    acc = Filter::If {
                        cond: self.lower_box(cond, depth)?,
                        then: self.lower_box(then, depth)?,
                        otherwise: Box::new(acc),
                    };
                }
                acc
            }
            Expr::Reduce {
                source,
                pattern,
                init,
                update,
            } => {
                let source = self.lower_box(source, depth)?;
                let init = self.lower_box(init, depth)?;
                let mark = self.scope.len();
                let pattern = self.pattern(pattern, depth)?;
                let update = self.lower_box(update, depth);
                self.scope.truncate(mark);
                Filter::Reduce {
                    source,
                    pattern,
                    init,
                    update: update?,
                }
            }
            Expr::Foreach {
                source,
                pattern,
                init,
                update,
                extract,
            } => {
                let source = self.lower_box(source, depth)?;
                let init = self.lower_box(init, depth)?;
                let mark = self.scope.len();
                let pattern = self.pattern(pattern, depth)?;
                let update = self.lower_box(update, depth);
                let extract = update.and_then(|u| Ok((u, self.lower_opt(extract, depth)?)));
                self.scope.truncate(mark);
                let (update, extract) = extract?;
                Filter::Foreach {
                    source,
                    pattern,
                    init,
                    update,
                    extract,
                }
            }
            Expr::Bind {
                source,
                pattern,
                body,
            } => {
                let source = self.lower_box(source, depth)?;
                let mark = self.scope.len();
                let pattern = self.pattern(pattern, depth)?;
                let body = self.lower_box(body, depth);
                self.scope.truncate(mark);
                Filter::Bind {
                    source,
                    pattern,
                    body: body?,
                }
            }
            Expr::FuncDef { def, rest } => {
                let mark = self.scope.len();
                self.scope.push(Binding::Def {
                    name: def.name.clone(),
                    arity: def.params.len(),
                });
                let lowered = self.lower_def_body(def, depth).and_then(|body| {
                    // Only the definition itself stays visible to `rest`.
                    self.scope.truncate(mark + 1);
                    Ok((body, self.lower_box(rest, depth)?))
                });
                self.scope.truncate(mark);
                let (body, rest) = lowered?;
                Filter::Def {
                    def: Box::new(body),
                    rest,
                }
            }
        };
        Ok(filter)
    }

    /// Push the parameters of `def` and lower its body. `$name` parameters
    /// become a filter parameter plus a binding of each of its outputs.
    /// The caller restores the scope.
    fn lower_def_body(&mut self, def: &FuncDef, depth: usize) -> Result<FuncBody> {
        for param in &def.params {
            self.scope.push(Binding::Param(param.name().to_string()));
        }
        let mut binds = Vec::new();
        for (position, param) in def.params.iter().enumerate() {
            if let Param::Var(name) = param {
                // Parameters pushed after this one, plus the variables bound so far.
                binds.push(def.params.len() - 1 - position + binds.len());
                self.scope.push(Binding::Var(name.clone()));
            }
        }

        let mut body = self.lower(&def.body, depth)?;
        for index in binds.into_iter().rev() {
            body = Filter::Bind {
                source: Box::new(Filter::CallParam(index)),
                pattern: Pattern::Var,
                body: Box::new(body),
            };
        }
        Ok(FuncBody {
            name: def.name.clone(),
            arity: def.params.len(),
            body,
        })
    }

    /// Lower a pattern: key expressions see the enclosing scope, then the
    /// pattern's variables are pushed in order of appearance.
    fn pattern(&mut self, pattern: &AstPattern, depth: usize) -> Result<Pattern> {
        let lowered = self.pattern_keys(pattern, depth)?;
        for name in pattern.variables() {
            self.scope.push(Binding::Var(name.to_string()));
        }
        Ok(lowered)
    }

    fn pattern_keys(&mut self, pattern: &AstPattern, depth: usize) -> Result<Pattern> {
        match pattern {
            AstPattern::Var { .. } => Ok(Pattern::Var),
            AstPattern::Array(items) => Ok(Pattern::Array(
                items
                    .iter()
                    .map(|p| self.pattern_keys(p, depth))
                    .collect::<Result<Vec<_>>>()?,
            )),
            AstPattern::Object(entries) => {
                let mut lowered = Vec::with_capacity(entries.len());
                for entry in entries {
                    lowered.push(match entry {
                        AstPatternEntry::Var { name, pattern, .. } => ObjectPatternEntry {
                            key: Filter::Literal(Value::string(name.as_str())),
                            bind: true,
                            pattern: pattern
                                .as_ref()
                                .map(|p| self.pattern_keys(p, depth))
                                .transpose()?,
                        },
                        AstPatternEntry::Keyed { key, pattern } => ObjectPatternEntry {
                            key: self.lower(key, depth)?,
                            bind: false,
                            pattern: Some(self.pattern_keys(pattern, depth)?),
                        },
                    });
                }
                Ok(Pattern::Object(lowered))
            }
        }
    }

    fn var(&self, name: &str, span: &Span) -> Result<Filter> {
        if let Some(index) = self.scope.lookup_var(name) {
            return Ok(Filter::Var(index));
        }
        if name == "__loc__" {
            let line = self.source[..span.0.start.min(self.source.len())]
                .matches('\n')
                .count()
                + 1;
            return Ok(Filter::Literal(Value::from_pairs([
                ("file", Value::string("<stdin>")),
                ("line", Value::from(line)),
            ])));
        }
        Err(self.error(
            ResolveErrorKind::UndefinedVariable {
                name: name.to_string(),
            },
            span,
        ))
    }

    fn call(&mut self, name: &str, args: &[ParsedExpr], span: &Span, depth: usize) -> Result<Filter> {
        let arity = args.len();
        let target = self.scope.lookup_call(name, arity);
        if let Some(CallTarget::Param(index)) = target {
            return Ok(Filter::CallParam(index));
        }

        let args = args
            .iter()
            .map(|arg| self.lower(arg, depth))
            .collect::<Result<Vec<_>>>()?;

        if let Some(CallTarget::Def(index)) = target {
            return Ok(Filter::CallDef { index, args });
        }
        if let Some(id) = self.globals.lookup(name, arity) {
            return Ok(Filter::CallGlobal { id, args });
        }
        if let Some(builtin) = stdlib::lookup(name, arity) {
            return Ok(match builtin.implementation {
                Implementation::Native(func) => Filter::Native {
                    native: Native {
                        name: builtin.name,
                        func,
                    },
                    args,
                },
                Implementation::Special(form) => Filter::Special { form, args },
            });
        }

        let mut expected = self.scope.arities_of(name);
        expected.extend(self.globals.arities_of(name));
        expected.extend(stdlib::arities_of(name));
        expected.sort_unstable();
        expected.dedup();

        let kind = if expected.is_empty() {
            ResolveErrorKind::UndefinedFunction {
                name: name.to_string(),
                arity,
            }
        } else {
            ResolveErrorKind::ArityMismatch {
                name: name.to_string(),
                expected,
                found: arity,
            }
        };
        Err(self.error(kind, span))
    }

    fn format(&self, name: &str, span: &Span) -> Result<Format> {
        Format::from_name(name).ok_or_else(|| {
            self.error(
                ResolveErrorKind::UnknownFormat {
                    name: name.to_string(),
                },
                span,
            )
        })
    }
}

fn literal_value(lit: &Literal) -> Value {
    match lit {
        Literal::Null => Value::Null,
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Number(n) => Value::Number(*n),
        Literal::String(s) => Value::string(s.as_str()),
    }
}
