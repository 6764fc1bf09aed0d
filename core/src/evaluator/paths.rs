//! Path expressions and assignment.
//!
//! In path mode a filter produces, instead of values, the locations it
//! would read them from: each output is a path (array of keys, indices and
//! slice objects) paired with the value found there. `path(f)`, the
//! assignment operators and the prelude's `del`, `paths` and `pick` are
//! built on it.

use std::cell::Cell;
use std::rc::Rc;

use crate::compiler::{Filter, Pattern};
use crate::evaluator::env::{Binding, Env};
use crate::evaluator::error::{ExecutionError, RuntimeError};
use crate::evaluator::eval::{
    Ctx, Dfs, Outputs, Stream, Try, and_then, bind, callee, checked, defer, eval, grown, none,
    one, optional, runtime_error,
};
use crate::evaluator::operators;
use crate::parser::AssignOp;
use crate::stdlib::{Special, delpaths, getpath, setpath};
use crate::values::Value;

/// A location and the value found there.
type Pair = (Vec<Value>, Value);

type Pairs<'p> = Stream<'p, Pair>;

/// The paths `filter` selects in `root`, with their values.
pub(crate) fn paths<'p>(ctx: Ctx<'p>, filter: &'p Filter, env: &Env<'p>, root: Value) -> Pairs<'p> {
    walk(ctx, filter, env, (Vec::new(), root))
}

fn walk<'p>(ctx: Ctx<'p>, filter: &'p Filter, env: &Env<'p>, current: Pair) -> Pairs<'p> {
    match filter {
        Filter::Identity => one(Ok(current)),
        Filter::RecurseAll => Box::new(Dfs::new(
            current,
            Box::new(|pair: Pair| {
                if matches!(pair.1, Value::Array(_) | Value::Object(_)) {
                    children(pair)
                } else {
                    none()
                }
            }),
        )),
        Filter::Index { value, index, .. } => {
            let env = env.clone();
            let start = current.clone();
            and_then(eval(ctx, index, &env, current.1), move |key| {
                Box::new(
                    walk(ctx, value, &env, start.clone())
                        .map(move |pair| pair.and_then(|(path, v)| step(path, &v, key.clone()))),
                )
            })
        }
        Filter::Slice { value, from, to } => {
            let env = env.clone();
            let start = current.clone();
            and_then(optional(ctx, from.as_deref(), &env, current.1), move |from| {
                let env = env.clone();
                let start = start.clone();
                and_then(optional(ctx, to.as_deref(), &env, start.1.clone()), move |to| {
                    let key = Value::from_pairs([("start", from.clone()), ("end", to)]);
                    Box::new(
                        walk(ctx, value, &env, start.clone())
                            .map(move |pair| pair.and_then(|(path, v)| step(path, &v, key.clone()))),
                    )
                })
            })
        }
        Filter::Iterate(inner) => and_then(walk(ctx, inner, env, current), children),
        Filter::Pipe(left, right) => {
            let env = env.clone();
            and_then(walk(ctx, left, &env, current), move |pair| {
                walk(ctx, right, &env, pair)
            })
        }
        Filter::Comma(left, right) => {
            let env = env.clone();
            let first = walk(ctx, left, &env, current.clone());
            Box::new(first.chain(defer(move || walk(ctx, right, &env, current))))
        }
        Filter::Alternative(left, right) => {
            let found = Rc::new(Cell::new(false));
            let seen = found.clone();
            let env = env.clone();
            let truthy = walk(ctx, left, &env, current.clone()).filter_map(move |pair| match pair {
                Ok(pair) if pair.1.is_truthy() => {
                    seen.set(true);
                    Some(Ok(pair))
                }
                Err(e) if e.is_resource_exceeded() => Some(Err(e)),
                _ => None,
            });
            Box::new(truthy.chain(defer(move || {
                if found.get() {
                    none()
                } else {
                    walk(ctx, right, &env, current)
                }
            })))
        }
        Filter::If {
            cond,
            then: consequent,
            otherwise,
        } => {
            let env = env.clone();
            let start = current.clone();
            and_then(eval(ctx, cond, &env, current.1), move |c| {
                let branch = if c.is_truthy() { consequent } else { otherwise };
                walk(ctx, branch, &env, start.clone())
            })
        }
        Filter::Try { body, handler } => {
            let handler = handler.as_deref().map(|handler| {
                let env = env.clone();
                Box::new(move |error: Value| -> Pairs<'p> {
                    Box::new(eval(ctx, handler, &env, error).map(|value| {
                        value.and_then(|v| Err(RuntimeError::InvalidPath(v).into()))
                    }))
                }) as Box<dyn FnOnce(Value) -> Pairs<'p> + 'p>
            });
            Box::new(Try::new(walk(ctx, body, env, current), handler))
        }
        Filter::Bind {
            source,
            pattern,
            body,
        } => {
            let env = env.clone();
            let start = current.clone();
            and_then(eval(ctx, source, &env, current.1), move |value| {
                match bind(ctx, pattern, value, &env, &start.1) {
                    Ok(scopes) => {
                        let start = start.clone();
                        Box::new(
                            scopes
                                .into_iter()
                                .flat_map(move |scope| walk(ctx, body, &scope, start.clone())),
                        )
                    }
                    Err(e) => one(Err(e)),
                }
            })
        }
        Filter::Reduce {
            source,
            pattern,
            init,
            update,
        } => {
            let env = env.clone();
            let subject = current.1.clone();
            and_then(walk(ctx, init, &env, current), move |acc| {
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
            let subject = current.1.clone();
            and_then(walk(ctx, init, &env, current), move |state| {
                Box::new(
                    foreach(ctx, source, pattern, update, extract.as_deref(), &env, subject.clone(), state)
                        .into_iter(),
                )
            })
        }
        Filter::CallParam(_) | Filter::CallDef { .. } | Filter::CallGlobal { .. } => {
            match callee(ctx, filter, env) {
                Ok((ctx, body, env)) => grown(move || walk(ctx, body, &env, current)),
                Err(e) => one(Err(e)),
            }
        }
        Filter::Def { def, rest } => walk(ctx, rest, &env.push(Binding::Def(def.as_ref())), current),
        Filter::Special { form, args } => match (form, args.as_slice()) {
            (Special::Empty, _) => none(),
            (Special::Error, _) => one(Err(RuntimeError::Raised(current.1).into())),
            (Special::Recurse, [f]) => {
                let env = env.clone();
                Box::new(Dfs::new(current, Box::new(move |pair: Pair| walk(ctx, f, &env, pair))))
            }
            (Special::Limit, [n, f]) => {
                let env = env.clone();
                let start = current.clone();
                and_then(eval(ctx, n, &env, current.1), move |n| match n {
                    Value::Number(n) if n > 0.0 => {
                        Box::new(walk(ctx, f, &env, start.clone()).take(n.ceil() as usize))
                    }
                    Value::Number(n) if n == 0.0 => none(),
                    _ => walk(ctx, f, &env, start.clone()),
                })
            }
            (Special::First, [f]) => Box::new(walk(ctx, f, env, current).take(1)),
            (Special::Last, [f]) => {
                let env = env.clone();
                defer(move || {
                    let mut last = None;
                    for pair in walk(ctx, f, &env, current) {
                        match pair {
                            Ok(pair) => last = Some(pair),
                            Err(e) => return one(Err(e)),
                        }
                    }
                    Box::new(last.into_iter().map(Ok))
                })
            }
            (Special::GetPath, [p]) => {
                let (prefix, value) = current.clone();
                Box::new(eval(ctx, p, env, current.1).map(move |path| {
                    let path = path?;
                    let found = checked(getpath(&value, &path))?;
                    let components = match &path {
                        Value::Array(components) => components.iter().cloned(),
                        _ => return Err(runtime_error("Path must be specified as an array")),
                    };
                    Ok((prefix.iter().cloned().chain(components).collect(), found))
                }))
            }
            _ => not_a_path(ctx, filter, env, current),
        },
        _ => not_a_path(ctx, filter, env, current),
    }
}

/// Evaluate `filter` normally; every value it produces is an error.
fn not_a_path<'p>(ctx: Ctx<'p>, filter: &'p Filter, env: &Env<'p>, current: Pair) -> Pairs<'p> {
    Box::new(
        eval(ctx, filter, env, current.1)
            .map(|value| value.and_then(|v| Err(RuntimeError::InvalidPath(v).into()))),
    )
}

fn step(mut path: Vec<Value>, value: &Value, key: Value) -> Result<Pair, ExecutionError> {
    let next = checked(value.index(&key))?;
    path.push(key);
    Ok((path, next))
}

/// `.[]` in path mode.
fn children<'p>((path, value): Pair) -> Pairs<'p> {
    let extend = move |key: Value| {
        let mut path = path.clone();
        path.push(key);
        path
    };
    match value {
        Value::Array(items) => Box::new(
            (0..items.len()).map(move |i| Ok((extend(Value::from(i)), items[i].clone()))),
        ),
        Value::Object(map) => Box::new((0..map.len()).filter_map(move |i| {
            map.get_index(i)
                .map(|(k, v)| Ok((extend(Value::string(k.as_str())), v.clone())))
        })),
        Value::Null => one(Err(runtime_error("Cannot iterate over null"))),
        other => one(Err(runtime_error(format!(
            "Cannot iterate over {}",
            other.describe()
        )))),
    }
}

fn reduce<'p>(
    ctx: Ctx<'p>,
    source: &'p Filter,
    pattern: &'p Pattern,
    update: &'p Filter,
    env: &Env<'p>,
    input: Value,
    mut acc: Pair,
) -> Result<Pair, ExecutionError> {
    for item in eval(ctx, source, env, input.clone()) {
        for scope in bind(ctx, pattern, item?, env, &input)? {
            let mut last = None;
            for pair in walk(ctx, update, &scope, acc.clone()) {
                last = Some(pair?);
            }
            if let Some(pair) = last {
                acc = pair;
            }
        }
    }
    Ok(acc)
}

#[allow(clippy::too_many_arguments)]
fn foreach<'p>(
    ctx: Ctx<'p>,
    source: &'p Filter,
    pattern: &'p Pattern,
    update: &'p Filter,
    extract: Option<&'p Filter>,
    env: &Env<'p>,
    input: Value,
    mut state: Pair,
) -> Vec<Result<Pair, ExecutionError>> {
    let mut out = Vec::new();
    let mut run = || -> Result<(), ExecutionError> {
        for item in eval(ctx, source, env, input.clone()) {
            for scope in bind(ctx, pattern, item?, env, &input)? {
                for pair in walk(ctx, update, &scope, state.clone()) {
                    let pair = pair?;
                    state = pair.clone();
                    match extract {
                        Some(extract) => {
                            for extracted in walk(ctx, extract, &scope, pair) {
                                out.push(Ok(extracted?));
                            }
                        }
                        None => out.push(Ok(pair)),
                    }
                }
            }
        }
        Ok(())
    };
    if let Err(e) = run() {
        out.push(Err(e));
    }
    out
}

// ============================================================================
// Assignment
// ============================================================================

/// `lhs op rhs` for every assignment operator.
pub(crate) fn assign<'p>(
    ctx: Ctx<'p>,
    op: AssignOp,
    lhs: &'p Filter,
    rhs: &'p Filter,
    env: &Env<'p>,
    input: Value,
) -> Outputs<'p> {
    let env = env.clone();
    if let AssignOp::Update = op {
        return defer(move || one(update(ctx, lhs, rhs, &env, input)));
    }
    // The right-hand side runs on the original input; each of its outputs
    // gives one result.
    let subject = input.clone();
    and_then(eval(ctx, rhs, &env, input), move |value| {
        let result = modify(ctx, lhs, &env, subject.clone(), |old| match op {
            AssignOp::Arith(binary) => checked(operators::binary(binary, old, &value)),
            AssignOp::Alternative if old.is_truthy() => Ok(old.clone()),
            _ => Ok(value.clone()),
        });
        one(result)
    })
}

fn locations<'p>(
    ctx: Ctx<'p>,
    lhs: &'p Filter,
    env: &Env<'p>,
    input: &Value,
) -> Result<Vec<Value>, ExecutionError> {
    paths(ctx, lhs, env, input.clone())
        .map(|pair| pair.map(|(path, _)| Value::array(path)))
        .collect()
}

/// Replace the value at every path of `lhs` by `f` of the current one.
fn modify<'p>(
    ctx: Ctx<'p>,
    lhs: &'p Filter,
    env: &Env<'p>,
    input: Value,
    mut f: impl FnMut(&Value) -> Result<Value, ExecutionError>,
) -> Result<Value, ExecutionError> {
    let mut acc = input.clone();
    for path in locations(ctx, lhs, env, &input)? {
        let old = checked(getpath(&acc, &path))?;
        acc = checked(setpath(&acc, &path, f(&old)?))?;
    }
    Ok(acc)
}

/// `lhs |= rhs`: the first output of `rhs` on the old value; paths where
/// `rhs` is empty are deleted afterwards.
fn update<'p>(
    ctx: Ctx<'p>,
    lhs: &'p Filter,
    rhs: &'p Filter,
    env: &Env<'p>,
    input: Value,
) -> Result<Value, ExecutionError> {
    let mut acc = input.clone();
    let mut deleted = Vec::new();
    for path in locations(ctx, lhs, env, &input)? {
        let old = checked(getpath(&acc, &path))?;
        match eval(ctx, rhs, env, old).next() {
            Some(new) => acc = checked(setpath(&acc, &path, new?))?,
            None => deleted.push(path),
        }
    }
    if deleted.is_empty() {
        Ok(acc)
    } else {
        checked(delpaths(&acc, &Value::array(deleted)))
    }
}
