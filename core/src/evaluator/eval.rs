//! Core evaluation logic.
//!
//! Evaluating a filter against an input yields a lazy stream: nothing is
//! computed until the consumer pulls. Generators nest as iterator
//! adapters, so a consumer that stops early (`first`, `limit`, the
//! `First` policy) leaves the rest of the computation undone.
//!
//! Values that fail inside an operation come back from the value layer as
//! [`Value::Invalid`]; [`checked`] turns them into errors at the point
//! where they would enter the stream.

use std::cell::Cell;
use std::iter;
use std::rc::Rc;

use crate::compiler::{Filter, Pattern, Prelude, StrPart};
use crate::evaluator::env::{Binding, Env};
use crate::evaluator::error::{ExecutionError, ResourceExceededError, RuntimeError};
use crate::evaluator::{operators, paths};
use crate::parser::BoolOp;
use crate::stdlib::{Format, Special, getpath};
use crate::values::{Map, Value, resolve_index};

/// A lazy stream of results.
pub(crate) type Stream<'p, T> = Box<dyn Iterator<Item = Result<T, ExecutionError>> + 'p>;

/// The outputs of a running filter.
pub type Outputs<'p> = Stream<'p, Value>;

/// Evaluation settings and the current call depth.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Ctx<'p> {
    pub(crate) prelude: &'p Prelude,
    pub(crate) max_depth: usize,
    /// Out of range array indices are errors in checked index expressions.
    pub(crate) strict: bool,
    pub(crate) depth: usize,
}

impl<'p> Ctx<'p> {
    fn enter(self) -> Result<Ctx<'p>, ExecutionError> {
        let depth = self.depth + 1;
        if depth > self.max_depth {
            return Err(ResourceExceededError::StackOverflow {
                depth,
                max_depth: self.max_depth,
            }
            .into());
        }
        Ok(Ctx { depth, ..self })
    }
}

// ============================================================================
// Stream helpers
// ============================================================================

pub(crate) fn one<'p, T: 'p>(result: Result<T, ExecutionError>) -> Stream<'p, T> {
    Box::new(iter::once(result))
}

pub(crate) fn none<'p, T: 'p>() -> Stream<'p, T> {
    Box::new(iter::empty())
}

/// A stream that is only built when first pulled.
pub(crate) fn defer<'p, T: 'p>(build: impl FnOnce() -> Stream<'p, T> + 'p) -> Stream<'p, T> {
    Box::new(iter::once_with(build).flatten())
}

/// Feed every item of `stream` to `f`, concatenating the streams it
/// returns. Errors pass through.
pub(crate) fn and_then<'p, T: 'p, U: 'p>(
    stream: Stream<'p, T>,
    mut f: impl FnMut(T) -> Stream<'p, U> + 'p,
) -> Stream<'p, U> {
    Box::new(stream.flat_map(move |item| match item {
        Ok(item) => f(item),
        Err(e) => one(Err(e)),
    }))
}

pub(crate) fn runtime_error(message: impl Into<String>) -> ExecutionError {
    RuntimeError::Message(message.into()).into()
}

fn unbound() -> ExecutionError {
    runtime_error("Reference to an unbound name")
}

/// Remaining native stack below which a call moves to a fresh segment.
const RED_ZONE: usize = 128 * 1024;
const STACK_SEGMENT: usize = 2 * 1024 * 1024;

/// Build and pull the stream of a call body with at least [`RED_ZONE`] of
/// native stack left, whatever thread the consumer runs on.
pub(crate) fn grown<'p, T: 'p>(build: impl FnOnce() -> Stream<'p, T>) -> Stream<'p, T> {
    Box::new(Grown(stacker::maybe_grow(RED_ZONE, STACK_SEGMENT, build)))
}

struct Grown<'p, T>(Stream<'p, T>);

impl<T> Iterator for Grown<'_, T> {
    type Item = Result<T, ExecutionError>;

    fn next(&mut self) -> Option<Self::Item> {
        stacker::maybe_grow(RED_ZONE, STACK_SEGMENT, || self.0.next())
    }
}

/// Split an invalid value off into an error.
pub(crate) fn checked(value: Value) -> Result<Value, ExecutionError> {
    value.into_result().map_err(ExecutionError::from)
}

// ============================================================================
// Evaluation
// ============================================================================

/// Run `filter` on `input`.
pub(crate) fn eval<'p>(ctx: Ctx<'p>, filter: &'p Filter, env: &Env<'p>, input: Value) -> Outputs<'p> {
    match filter {
        Filter::Identity => one(Ok(input)),
        Filter::RecurseAll => Box::new(Dfs::new(input, Box::new(|value: Value| match value {
            Value::Array(_) | Value::Object(_) => iterate(value),
            _ => none(),
        }))),
        Filter::Literal(value) => one(Ok(value.clone())),
        Filter::Str { format, parts } => {
            Box::new(interpolate(ctx, *format, parts, env, input).map(|text| text.map(Value::from)))
        }
        Filter::Format(format) => one(checked(format.apply(&input))),
        Filter::Array(None) => one(Ok(Value::array(Vec::new()))),
        Filter::Array(Some(items)) => {
            let env = env.clone();
            defer(move || {
                one(eval(ctx, items, &env, input)
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::array))
            })
        }
        Filter::Object(entries) => object(ctx, entries, env, input, Map::new()),
        Filter::Neg(inner) => Box::new(
            eval(ctx, inner, env, input).map(|value| value.and_then(|v| checked(operators::negate(&v)))),
        ),
        Filter::Pipe(left, right) => {
            let env = env.clone();
            and_then(eval(ctx, left, &env, input), move |value| {
                eval(ctx, right, &env, value)
            })
        }
        Filter::Comma(left, right) => {
            let env = env.clone();
            let first = eval(ctx, left, &env, input.clone());
            Box::new(first.chain(defer(move || eval(ctx, right, &env, input))))
        }
        Filter::Alternative(left, right) => alternative(ctx, left, right, env, input),
        Filter::Binary(op, left, right) => {
            let op = *op;
            cross(ctx, left, right, env, input, move |l, r| operators::binary(op, l, r))
        }
        Filter::Comparison(op, left, right) => {
            let op = *op;
            cross(ctx, left, right, env, input, move |l, r| operators::compare(op, l, r))
        }
        Filter::Boolean(op, left, right) => boolean(ctx, *op, left, right, env, input),
        Filter::Assign(op, path, value) => paths::assign(ctx, *op, path, value, env, input),
        Filter::Index {
            value,
            index,
            checked: checked_index,
        } => {
            let strict = ctx.strict && *checked_index;
            let env = env.clone();
            let subject = input.clone();
            and_then(eval(ctx, index, &env, input), move |key| {
                Box::new(
                    eval(ctx, value, &env, subject.clone())
                        .map(move |v| v.and_then(|v| index_value(&v, &key, strict))),
                )
            })
        }
        Filter::Slice { value, from, to } => {
            let env = env.clone();
            let subject = input.clone();
            and_then(optional(ctx, from.as_deref(), &env, input), move |start| {
                let env = env.clone();
                let subject = subject.clone();
                and_then(optional(ctx, to.as_deref(), &env, subject.clone()), move |end| {
                    let start = start.clone();
                    Box::new(
                        eval(ctx, value, &env, subject.clone())
                            .map(move |v| v.and_then(|v| checked(v.slice(&start, &end)))),
                    )
                })
            })
        }
        Filter::Iterate(inner) => and_then(eval(ctx, inner, env, input), iterate),
        Filter::Try { body, handler } => {
            let handler = handler.as_deref().map(|handler| {
                let env = env.clone();
                Box::new(move |error: Value| eval(ctx, handler, &env, error))
                    as Box<dyn FnOnce(Value) -> Outputs<'p> + 'p>
            });
            Box::new(Try::new(eval(ctx, body, env, input), handler))
        }
        Filter::If {
            cond,
            then: consequent,
            otherwise,
        } => {
            let env = env.clone();
            let subject = input.clone();
            and_then(eval(ctx, cond, &env, input), move |c| {
                let branch = if c.is_truthy() { consequent } else { otherwise };
                eval(ctx, branch, &env, subject.clone())
            })
        }
        Filter::Reduce {
            source,
            pattern,
            init,
            update,
        } => {
            let env = env.clone();
            let subject = input.clone();
            and_then(eval(ctx, init, &env, input), move |acc| {
                one(reduce(ctx, source, pattern, update, &env, subject.clone(), acc))
            })
        }
        Filter::Foreach {
            source,
            pattern,
            init,
            update,
            extract,
        } => {
            let env = env.clone();
            let subject = input.clone();
            and_then(eval(ctx, init, &env, input), move |state| {
                Box::new(Foreach {
                    ctx,
                    pattern,
                    update: &**update,
                    extract: extract.as_deref(),
                    source: eval(ctx, source, &env, subject.clone()),
                    env: env.clone(),
                    input: subject.clone(),
                    state,
                    pending: none(),
                })
            })
        }
        Filter::Bind {
            source,
            pattern,
            body,
        } => {
            let env = env.clone();
            let subject = input.clone();
            and_then(eval(ctx, source, &env, input), move |value| {
                match bind(ctx, pattern, value, &env, &subject) {
                    Ok(scopes) => {
                        let subject = subject.clone();
                        Box::new(
                            scopes
                                .into_iter()
                                .flat_map(move |scope| eval(ctx, body, &scope, subject.clone())),
                        )
                    }
                    Err(e) => one(Err(e)),
                }
            })
        }
        Filter::Var(index) => match env.get(*index) {
            Some((Binding::Var(value), _)) => one(Ok(value.clone())),
            _ => one(Err(unbound())),
        },
        Filter::CallParam(_) | Filter::CallDef { .. } | Filter::CallGlobal { .. } => {
            match callee(ctx, filter, env) {
                Ok((ctx, body, env)) => grown(move || eval(ctx, body, &env, input)),
                Err(e) => one(Err(e)),
            }
        }
        Filter::Def { def, rest } => eval(ctx, rest, &env.push(Binding::Def(def.as_ref())), input),
        Filter::Native { native, args } => {
            let func = native.func;
            if args.is_empty() {
                return one(checked(func(&input, &[])));
            }
            let subject = input.clone();
            Box::new(
                product(ctx, args, env, input)
                    .map(move |row| row.and_then(|values| checked(func(&subject, &values)))),
            )
        }
        Filter::Special { form, args } => special(ctx, *form, args, env, input),
    }
}

/// The body a call runs, with its context and environment. Filter
/// parameters run in the environment they were passed from; definitions
/// run in their defining environment extended with the arguments.
pub(crate) fn callee<'p>(
    ctx: Ctx<'p>,
    call: &'p Filter,
    env: &Env<'p>,
) -> Result<(Ctx<'p>, &'p Filter, Env<'p>), ExecutionError> {
    let with_args = |base: &Env<'p>, args: &'p [Filter]| {
        args.iter().fold(base.clone(), |scope, arg| {
            scope.push(Binding::Closure {
                filter: arg,
                env: env.clone(),
            })
        })
    };
    match call {
        Filter::CallParam(index) => match env.get(*index) {
            Some((Binding::Closure { filter, env }, _)) => {
                let filter: &'p Filter = *filter;
                Ok((ctx, filter, env.clone()))
            }
            _ => Err(unbound()),
        },
        Filter::CallDef { index, args } => match env.get(*index) {
            Some((Binding::Def(def), def_env)) => {
                let def: &'p _ = *def;
                Ok((ctx.enter()?, &def.body, with_args(def_env, args.as_slice())))
            }
            _ => Err(unbound()),
        },
        Filter::CallGlobal { id, args } => match ctx.prelude.get(*id) {
            Some(def) => Ok((ctx.enter()?, &def.body, with_args(&Env::default(), args.as_slice()))),
            None => Err(unbound()),
        },
        _ => Err(unbound()),
    }
}

/// `.[key]` on one value.
fn index_value(value: &Value, key: &Value, strict: bool) -> Result<Value, ExecutionError> {
    if strict {
        if let (Value::Array(items), Value::Number(n)) = (value, key) {
            if !n.is_nan() && resolve_index(*n, items.len()).is_none() {
                return Err(RuntimeError::IndexOutOfBounds {
                    index: n.floor() as i64,
                    len: items.len(),
                }
                .into());
            }
        }
    }
    checked(value.index(key))
}

/// `.[]`
pub(crate) fn iterate<'p>(value: Value) -> Outputs<'p> {
    match value {
        Value::Array(items) => Box::new((0..items.len()).map(move |i| Ok(items[i].clone()))),
        Value::Object(map) => Box::new(
            (0..map.len()).filter_map(move |i| map.get_index(i).map(|(_, v)| Ok(v.clone()))),
        ),
        Value::Null => one(Err(runtime_error("Cannot iterate over null"))),
        Value::Invalid(message) => one(Err(message.into())),
        other => one(Err(runtime_error(format!(
            "Cannot iterate over {}",
            other.describe()
        )))),
    }
}

pub(crate) fn optional<'p>(ctx: Ctx<'p>, filter: Option<&'p Filter>, env: &Env<'p>, input: Value) -> Outputs<'p> {
    match filter {
        Some(filter) => eval(ctx, filter, env, input),
        None => one(Ok(Value::Null)),
    }
}

/// Apply `op` to every combination of outputs, the right operand varying
/// slowest.
fn cross<'p>(
    ctx: Ctx<'p>,
    left: &'p Filter,
    right: &'p Filter,
    env: &Env<'p>,
    input: Value,
    op: impl Fn(&Value, &Value) -> Value + Copy + 'p,
) -> Outputs<'p> {
    let env = env.clone();
    let subject = input.clone();
    and_then(eval(ctx, right, &env, input), move |r| {
        Box::new(
            eval(ctx, left, &env, subject.clone()).map(move |l| l.and_then(|l| checked(op(&l, &r)))),
        )
    })
}

fn boolean<'p>(
    ctx: Ctx<'p>,
    op: BoolOp,
    left: &'p Filter,
    right: &'p Filter,
    env: &Env<'p>,
    input: Value,
) -> Outputs<'p> {
    let env = env.clone();
    let subject = input.clone();
    and_then(eval(ctx, left, &env, input), move |l| match (op, l.is_truthy()) {
        (BoolOp::And, false) => one(Ok(Value::Bool(false))),
        (BoolOp::Or, true) => one(Ok(Value::Bool(true))),
        _ => Box::new(
            eval(ctx, right, &env, subject.clone()).map(|r| r.map(|r| Value::Bool(r.is_truthy()))),
        ),
    })
}

/// `a // b`: the truthy outputs of `a`, or else the outputs of `b`.
/// Runtime errors in `a` count as no output.
fn alternative<'p>(
    ctx: Ctx<'p>,
    left: &'p Filter,
    right: &'p Filter,
    env: &Env<'p>,
    input: Value,
) -> Outputs<'p> {
    let found = Rc::new(Cell::new(false));
    let seen = found.clone();
    let env = env.clone();
    let truthy = eval(ctx, left, &env, input.clone()).filter_map(move |value| match value {
        Ok(v) if v.is_truthy() => {
            seen.set(true);
            Some(Ok(v))
        }
        Err(e) if e.is_resource_exceeded() => Some(Err(e)),
        _ => None,
    });
    Box::new(truthy.chain(defer(move || {
        if found.get() {
            none()
        } else {
            eval(ctx, right, &env, input)
        }
    })))
}

/// String interpolation. The last interpolated expression varies slowest.
fn interpolate<'p>(
    ctx: Ctx<'p>,
    format: Format,
    parts: &'p [StrPart],
    env: &Env<'p>,
    input: Value,
) -> Stream<'p, String> {
    let Some((last, init)) = parts.split_last() else {
        return one(Ok(String::new()));
    };
    match last {
        StrPart::Text(text) => Box::new(
            interpolate(ctx, format, init, env, input).map(move |prefix| prefix.map(|p| p + text)),
        ),
        StrPart::Interp(filter) => {
            let env = env.clone();
            let subject = input.clone();
            and_then(eval(ctx, filter, &env, input), move |value| {
                let piece = match format.apply(&value) {
                    Value::String(s) => s,
                    Value::Invalid(message) => return one(Err(message.into())),
                    other => other.to_string().into(),
                };
                Box::new(
                    interpolate(ctx, format, init, &env, subject.clone())
                        .map(move |prefix| prefix.map(|p| p + &*piece)),
                )
            })
        }
    }
}

/// Object construction. The first entry varies slowest; within an entry
/// the key varies slower than the value.
fn object<'p>(
    ctx: Ctx<'p>,
    entries: &'p [(Filter, Filter)],
    env: &Env<'p>,
    input: Value,
    acc: Map,
) -> Outputs<'p> {
    let Some(((key, value), rest)) = entries.split_first() else {
        return one(Ok(Value::object(acc)));
    };
    let env = env.clone();
    let subject = input.clone();
    and_then(eval(ctx, key, &env, input), move |k| {
        let name = match k {
            Value::String(name) => name,
            _ => return one(Err(runtime_error("Object keys must be strings"))),
        };
        let env = env.clone();
        let subject = subject.clone();
        let acc = acc.clone();
        and_then(eval(ctx, value, &env, subject.clone()), move |v| {
            let mut acc = acc.clone();
            acc.insert(name.to_string(), v);
            object(ctx, rest, &env, subject.clone(), acc)
        })
    })
}

/// Rows of argument values, one per combination of outputs. The last
/// argument varies slowest.
fn product<'p>(ctx: Ctx<'p>, args: &'p [Filter], env: &Env<'p>, input: Value) -> Stream<'p, Vec<Value>> {
    let Some((last, init)) = args.split_last() else {
        return one(Ok(Vec::new()));
    };
    let env = env.clone();
    let subject = input.clone();
    and_then(eval(ctx, last, &env, input), move |value| {
        Box::new(product(ctx, init, &env, subject.clone()).map(move |row| {
            row.map(|mut row| {
                row.push(value.clone());
                row
            })
        }))
    })
}

fn reduce<'p>(
    ctx: Ctx<'p>,
    source: &'p Filter,
    pattern: &'p Pattern,
    update: &'p Filter,
    env: &Env<'p>,
    input: Value,
    mut acc: Value,
) -> Result<Value, ExecutionError> {
    for item in eval(ctx, source, env, input.clone()) {
        for scope in bind(ctx, pattern, item?, env, &input)? {
            let mut last = Value::Null;
            for output in eval(ctx, update, &scope, acc) {
                last = output?;
            }
            acc = last;
        }
    }
    Ok(acc)
}

struct Foreach<'p> {
    ctx: Ctx<'p>,
    pattern: &'p Pattern,
    update: &'p Filter,
    extract: Option<&'p Filter>,
    env: Env<'p>,
    input: Value,
    source: Outputs<'p>,
    state: Value,
    pending: Outputs<'p>,
}

impl<'p> Foreach<'p> {
    /// Run the update for one source item; returns the extracted outputs.
    fn step(&mut self, item: Value) -> Result<Outputs<'p>, ExecutionError> {
        let mut emitted: Vec<Outputs<'p>> = Vec::new();
        for scope in bind(self.ctx, self.pattern, item, &self.env, &self.input)? {
            for output in eval(self.ctx, self.update, &scope, self.state.clone()) {
                let output = output?;
                self.state = output.clone();
                emitted.push(match self.extract {
                    Some(extract) => eval(self.ctx, extract, &scope, output),
                    None => one(Ok(output)),
                });
            }
        }
        Ok(Box::new(emitted.into_iter().flatten()))
    }
}

impl Iterator for Foreach<'_> {
    type Item = Result<Value, ExecutionError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(output) = self.pending.next() {
                return Some(output);
            }
            let item = match self.source.next()? {
                Ok(item) => item,
                Err(e) => return Some(Err(e)),
            };
            match self.step(item) {
                Ok(pending) => self.pending = pending,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

// ============================================================================
// Destructuring
// ============================================================================

/// Bind `value` to `pattern` on top of `env`. Key expressions run in
/// `env` against `input`; a key expression with several outputs yields
/// one environment per output.
pub(crate) fn bind<'p>(
    ctx: Ctx<'p>,
    pattern: &'p Pattern,
    value: Value,
    env: &Env<'p>,
    input: &Value,
) -> Result<Vec<Env<'p>>, ExecutionError> {
    if let Pattern::Var = pattern {
        return Ok(vec![env.push(Binding::Var(value))]);
    }
    let mut rows = vec![Vec::new()];
    destructure(ctx, pattern, &value, env, input, &mut rows)?;
    Ok(rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .fold(env.clone(), |scope, value| scope.push(Binding::Var(value)))
        })
        .collect())
}

fn destructure<'p>(
    ctx: Ctx<'p>,
    pattern: &'p Pattern,
    value: &Value,
    env: &Env<'p>,
    input: &Value,
    rows: &mut Vec<Vec<Value>>,
) -> Result<(), ExecutionError> {
    match pattern {
        Pattern::Var => rows.iter_mut().for_each(|row| row.push(value.clone())),
        Pattern::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                let element = checked(value.index(&Value::from(i)))?;
                destructure(ctx, item, &element, env, input, rows)?;
            }
        }
        Pattern::Object(entries) => {
            for entry in entries {
                let keys = eval(ctx, &entry.key, env, input.clone()).collect::<Result<Vec<_>, _>>()?;
                let mut next = Vec::with_capacity(rows.len() * keys.len());
                for key in keys {
                    let element = checked(value.index(&key))?;
                    let mut branch = rows.clone();
                    if entry.bind {
                        branch.iter_mut().for_each(|row| row.push(element.clone()));
                    }
                    if let Some(sub) = &entry.pattern {
                        destructure(ctx, sub, &element, env, input, &mut branch)?;
                    }
                    next.extend(branch);
                }
                *rows = next;
            }
        }
    }
    Ok(())
}

// ============================================================================
// Builtins implemented by the evaluator
// ============================================================================

fn special<'p>(
    ctx: Ctx<'p>,
    form: Special,
    args: &'p [Filter],
    env: &Env<'p>,
    input: Value,
) -> Outputs<'p> {
    match (form, args) {
        (Special::Empty, _) => none(),
        (Special::Error, _) => one(Err(RuntimeError::Raised(input).into())),
        (Special::Path, [f]) => Box::new(
            paths::paths(ctx, f, env, input).map(|pair| pair.map(|(path, _)| Value::array(path))),
        ),
        (Special::Recurse, [f]) => {
            let env = env.clone();
            Box::new(Dfs::new(input, Box::new(move |value: Value| eval(ctx, f, &env, value))))
        }
        (Special::Range, [from, upto]) => range(ctx, from, upto, None, env, input),
        (Special::Range, [from, upto, by]) => range(ctx, from, upto, Some(by), env, input),
        (Special::While, [cond, update]) => Box::new(Loop::new(ctx, cond, update, env, input, false)),
        (Special::Until, [cond, update]) => Box::new(Loop::new(ctx, cond, update, env, input, true)),
        (Special::Limit, [n, f]) => {
            let env = env.clone();
            let subject = input.clone();
            and_then(eval(ctx, n, &env, input), move |n| match n {
                Value::Number(n) if n > 0.0 => {
                    Box::new(eval(ctx, f, &env, subject.clone()).take(n.ceil() as usize))
                }
                Value::Number(n) if n == 0.0 => none(),
                _ => eval(ctx, f, &env, subject.clone()),
            })
        }
        (Special::First, [f]) => Box::new(eval(ctx, f, env, input).take(1)),
        (Special::Last, [f]) => {
            let env = env.clone();
            defer(move || {
                let mut last = None;
                for output in eval(ctx, f, &env, input) {
                    match output {
                        Ok(value) => last = Some(value),
                        Err(e) => return one(Err(e)),
                    }
                }
                Box::new(last.into_iter().map(Ok))
            })
        }
        (Special::GetPath, [p]) => {
            let subject = input.clone();
            Box::new(
                eval(ctx, p, env, input)
                    .map(move |path| path.and_then(|path| checked(getpath(&subject, &path)))),
            )
        }
        (Special::Debug, _) => {
            let message = Value::array(vec![Value::string("DEBUG:"), input.clone()]);
            tracing::info!(target: "sift::debug", "{}", message);
            one(Ok(input))
        }
        _ => one(Err(runtime_error(format!(
            "{:?} does not take {} argument(s)",
            form,
            args.len()
        )))),
    }
}

/// `range(from; upto; by)`: `from` varies slowest.
fn range<'p>(
    ctx: Ctx<'p>,
    from: &'p Filter,
    upto: &'p Filter,
    by: Option<&'p Filter>,
    env: &Env<'p>,
    input: Value,
) -> Outputs<'p> {
    let env = env.clone();
    let subject = input.clone();
    and_then(eval(ctx, from, &env, input), move |start| {
        let env = env.clone();
        let subject = subject.clone();
        and_then(eval(ctx, upto, &env, subject.clone()), move |end| {
            let start = start.clone();
            let step = match by {
                Some(by) => eval(ctx, by, &env, subject.clone()),
                None => one(Ok(Value::Number(1.0))),
            };
            and_then(step, move |by| match (&start, &end, &by) {
                (Value::Number(start), Value::Number(end), Value::Number(by)) => Box::new(Range {
                    next: *start,
                    end: *end,
                    by: *by,
                }),
                _ => one(Err(runtime_error("Range bounds must be numeric"))),
            })
        })
    })
}

struct Range {
    next: f64,
    end: f64,
    by: f64,
}

impl Iterator for Range {
    type Item = Result<Value, ExecutionError>;

    fn next(&mut self) -> Option<Self::Item> {
        let more = if self.by > 0.0 {
            self.next < self.end
        } else if self.by < 0.0 {
            self.next > self.end
        } else {
            false
        };
        if !more {
            return None;
        }
        let value = self.next;
        self.next += self.by;
        Some(Ok(Value::Number(value)))
    }
}

/// Depth-first, pre-order expansion: each item is produced, then the
/// items `expand` derives from it. Runs on an explicit stack.
pub(crate) struct Dfs<'p, T> {
    start: Option<T>,
    stack: Vec<Stream<'p, T>>,
    expand: Box<dyn Fn(T) -> Stream<'p, T> + 'p>,
}

impl<'p, T> Dfs<'p, T> {
    pub(crate) fn new(start: T, expand: Box<dyn Fn(T) -> Stream<'p, T> + 'p>) -> Self {
        Self {
            start: Some(start),
            stack: Vec::new(),
            expand,
        }
    }
}

impl<T: Clone> Iterator for Dfs<'_, T> {
    type Item = Result<T, ExecutionError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(item) = self.start.take() {
            self.stack.push((self.expand)(item.clone()));
            return Some(Ok(item));
        }
        while let Some(top) = self.stack.last_mut() {
            match top.next() {
                Some(Ok(item)) => {
                    let children = (self.expand)(item.clone());
                    self.stack.push(children);
                    return Some(Ok(item));
                }
                Some(Err(e)) => return Some(Err(e)),
                None => {
                    self.stack.pop();
                }
            }
        }
        None
    }
}

/// `while(cond; update)` and `until(cond; update)`. The first output of
/// `cond` decides.
struct Loop<'p> {
    ctx: Ctx<'p>,
    cond: &'p Filter,
    update: &'p Filter,
    env: Env<'p>,
    until: bool,
    stack: Vec<Outputs<'p>>,
}

impl<'p> Loop<'p> {
    fn new(
        ctx: Ctx<'p>,
        cond: &'p Filter,
        update: &'p Filter,
        env: &Env<'p>,
        input: Value,
        until: bool,
    ) -> Self {
        Self {
            ctx,
            cond,
            update,
            env: env.clone(),
            until,
            stack: vec![one(Ok(input))],
        }
    }
}

impl Iterator for Loop<'_> {
    type Item = Result<Value, ExecutionError>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(top) = self.stack.last_mut() {
            let value = match top.next() {
                Some(Ok(value)) => value,
                Some(Err(e)) => return Some(Err(e)),
                None => {
                    self.stack.pop();
                    continue;
                }
            };
            let holds = match eval(self.ctx, self.cond, &self.env, value.clone()).next() {
                Some(Ok(c)) => c.is_truthy(),
                Some(Err(e)) => return Some(Err(e)),
                None => continue,
            };
            match (self.until, holds) {
                (false, true) => {
                    let next = eval(self.ctx, self.update, &self.env, value.clone());
                    self.stack.push(next);
                    return Some(Ok(value));
                }
                (false, false) => {}
                (true, true) => return Some(Ok(value)),
                (true, false) => {
                    let next = eval(self.ctx, self.update, &self.env, value);
                    self.stack.push(next);
                }
            }
        }
        None
    }
}

/// `try body catch handler`: outputs of `body` up to its first runtime
/// error, then the outputs of the handler on the error's value.
pub(crate) struct Try<'p, T> {
    body: Option<Stream<'p, T>>,
    handler: Option<Box<dyn FnOnce(Value) -> Stream<'p, T> + 'p>>,
    caught: Option<Stream<'p, T>>,
}

impl<'p, T> Try<'p, T> {
    pub(crate) fn new(
        body: Stream<'p, T>,
        handler: Option<Box<dyn FnOnce(Value) -> Stream<'p, T> + 'p>>,
    ) -> Self {
        Self {
            body: Some(body),
            handler,
            caught: None,
        }
    }
}

impl<T> Iterator for Try<'_, T> {
    type Item = Result<T, ExecutionError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(caught) = &mut self.caught {
            return caught.next();
        }
        match self.body.as_mut()?.next() {
            Some(Err(ExecutionError::Runtime(error))) => {
                self.body = None;
                let handler = self.handler.take()?;
                let caught = self.caught.insert(handler(error.value()));
                caught.next()
            }
            Some(Err(e)) => {
                self.body = None;
                Some(Err(e))
            }
            other => other,
        }
    }
}
