use lazy_static::lazy_static;
use pest::Parser;
use pest::iterators::{Pair, Pairs};
use pest::pratt_parser::{Assoc, Op, PrattParser};
use pest_derive::Parser;

use crate::parser::delimiters::check_delimiters;
use crate::parser::error::{ParseError, ParseErrorKind, convert_pest_error};
use crate::parser::parsed_expr::{
    Expr, FuncDef, Literal, ObjectEntry, ObjectPatternEntry, Param, ParsedExpr, Pattern,
    StringPart,
};
use crate::parser::{AssignOp, BinaryOp, BoolOp, ComparisonOp, Span};
use crate::syntax::unescape_string;

/// Default limit on syntactic nesting.
pub const DEFAULT_MAX_DEPTH: usize = 500;

lazy_static! {
    // Note: precedence is defined lowest to highest. `//` folds to the
    // right; other infix operators fold to the left.
    static ref PRATT_PARSER: PrattParser<Rule> = PrattParser::new()
        // (lowest precedence)
        .op(Op::infix(Rule::comma, Assoc::Left))                 // `,`
        .op(Op::infix(Rule::alternative, Assoc::Right))          // `//`
        .op(
            Op::infix(Rule::assign, Assoc::Left) |
            Op::infix(Rule::update_assign, Assoc::Left) |
            Op::infix(Rule::add_assign, Assoc::Left) |
            Op::infix(Rule::sub_assign, Assoc::Left) |
            Op::infix(Rule::mul_assign, Assoc::Left) |
            Op::infix(Rule::div_assign, Assoc::Left) |
            Op::infix(Rule::mod_assign, Assoc::Left) |
            Op::infix(Rule::alt_assign, Assoc::Left)
        )                                                        // `=`, `|=`, `+=`, ...
        .op(Op::infix(Rule::or, Assoc::Left))                    // `or`
        .op(Op::infix(Rule::and, Assoc::Left))                   // `and`
        .op(
            Op::infix(Rule::eq, Assoc::Left) |
            Op::infix(Rule::neq, Assoc::Left) |
            Op::infix(Rule::lt, Assoc::Left) |
            Op::infix(Rule::le, Assoc::Left) |
            Op::infix(Rule::gt, Assoc::Left) |
            Op::infix(Rule::ge, Assoc::Left)
        )                                                        // `==`, `<`, ...
        .op(
            Op::infix(Rule::add, Assoc::Left) |
            Op::infix(Rule::sub, Assoc::Left)
        )                                                        // `+`, `-`
        .op(
            Op::infix(Rule::mul, Assoc::Left) |
            Op::infix(Rule::div, Assoc::Left) |
            Op::infix(Rule::modulo, Assoc::Left)
        )                                                        // `*`, `/`, `%`
        .op(Op::prefix(Rule::neg))                               // `-`
        // (highest precedence)
        ;
}

#[derive(Parser)]
#[grammar = "parser/filter.pest"]
pub struct FilterParser;

/// Parse filter source with the default nesting limit.
pub fn parse(source: &str) -> Result<ParsedExpr, ParseError> {
    parse_with_max_depth(source, DEFAULT_MAX_DEPTH)
}

/// Parse filter source into an AST.
///
/// A source that is empty or holds only whitespace and comments parses to
/// the identity filter.
pub fn parse_with_max_depth(source: &str, max_depth: usize) -> Result<ParsedExpr, ParseError> {
    check_delimiters(source, max_depth)?;

    let mut pairs =
        FilterParser::parse(Rule::main, source).map_err(|err| convert_pest_error(err, source))?;
    let builder = Builder { source, max_depth };
    let main = builder.next_pair(&mut pairs, Span::new(0, source.len()), "program")?;

    match main.into_inner().find(|p| p.as_rule() == Rule::pipe) {
        Some(pipe) => builder.pipe(pipe, 0),
        None => Ok(ParsedExpr::new(Expr::Identity, Span::new(0, 0))),
    }
}

fn is_keyword_token(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::kw_def
            | Rule::kw_as
            | Rule::kw_if
            | Rule::kw_then
            | Rule::kw_elif
            | Rule::kw_else
            | Rule::kw_end
            | Rule::kw_reduce
            | Rule::kw_foreach
            | Rule::kw_try
            | Rule::kw_catch
    )
}

/// Children of `pair` without keyword tokens.
fn children(pair: Pair<'_, Rule>) -> impl Iterator<Item = Pair<'_, Rule>> {
    pair.into_inner().filter(|p| !is_keyword_token(p.as_rule()))
}

enum Stage {
    Def(FuncDef),
    Segment {
        expr: ParsedExpr,
        pattern: Option<Pattern>,
    },
}

/// Turns pest pairs into [`ParsedExpr`] trees, tracking nesting depth.
struct Builder<'s> {
    source: &'s str,
    max_depth: usize,
}

impl<'s> Builder<'s> {
    fn error(&self, kind: ParseErrorKind, span: Span) -> ParseError {
        ParseError::new(kind, self.source, span)
    }

    fn next_pair<'i>(
        &self,
        pairs: &mut impl Iterator<Item = Pair<'i, Rule>>,
        span: Span,
        what: &str,
    ) -> Result<Pair<'i, Rule>, ParseError> {
        pairs.next().ok_or_else(|| {
            self.error(
                ParseErrorKind::Other {
                    message: format!("missing {}", what),
                },
                span,
            )
        })
    }

    fn check_depth(&self, depth: usize, span: &Span) -> Result<(), ParseError> {
        if depth > self.max_depth {
            return Err(self.error(
                ParseErrorKind::MaxDepthExceeded {
                    depth,
                    max_depth: self.max_depth,
                },
                span.clone(),
            ));
        }
        Ok(())
    }

    // ========================================================================
    // Pipes, definitions and bindings
    // ========================================================================

    fn pipe(&self, pair: Pair<'s, Rule>, depth: usize) -> Result<ParsedExpr, ParseError> {
        let span: Span = pair.as_span().into();
        let items: Vec<Pair<'s, Rule>> = pair
            .into_inner()
            .filter(|p| p.as_rule() != Rule::pipe_op)
            .collect();
        self.check_depth(depth + items.len(), &span)?;
        let inner = depth + items.len();

        let mut stages = Vec::with_capacity(items.len());
        for item in items {
            stages.push(match item.as_rule() {
                Rule::funcdef => Stage::Def(self.funcdef(item, inner)?),
                _ => self.segment(item, inner)?,
            });
        }

        let mut acc = match stages.pop() {
            Some(Stage::Segment {
                expr,
                pattern: None,
            }) => expr,
            Some(Stage::Segment { expr, .. }) => {
                return Err(self.error(
                    ParseErrorKind::UnexpectedToken {
                        expected: "'|'".to_string(),
                        found: "end of binding".to_string(),
                    },
                    Span::new(expr.span.0.start, span.0.end),
                ));
            }
            _ => {
                return Err(self.error(
                    ParseErrorKind::Other {
                        message: "missing expression after definitions".to_string(),
                    },
                    span,
                ));
            }
        };

        while let Some(stage) = stages.pop() {
            acc = match stage {
                Stage::Def(def) => {
                    let span = Span::combine(&def.span, &acc.span);
                    ParsedExpr::new(
                        Expr::FuncDef {
                            def: Box::new(def),
                            rest: acc.boxed(),
                        },
                        span,
                    )
                }
                Stage::Segment {
                    expr,
                    pattern: None,
                } => {
                    let span = Span::combine(&expr.span, &acc.span);
                    ParsedExpr::new(Expr::Pipe(expr.boxed(), acc.boxed()), span)
                }
                Stage::Segment {
                    expr,
                    pattern: Some(pattern),
                } => {
                    let span = Span::combine(&expr.span, &acc.span);
                    ParsedExpr::new(
                        Expr::Bind {
                            source: expr.boxed(),
                            pattern,
                            body: acc.boxed(),
                        },
                        span,
                    )
                }
            };
        }
        Ok(acc)
    }

    fn segment(&self, pair: Pair<'s, Rule>, depth: usize) -> Result<Stage, ParseError> {
        let span: Span = pair.as_span().into();
        let mut inner = children(pair);
        let expression = self.next_pair(&mut inner, span.clone(), "expression")?;
        let pattern = inner.next();

        if pattern.is_some() && expression.clone().into_inner().count() != 1 {
            return Err(self.error(
                ParseErrorKind::Other {
                    message: "The source of an 'as' binding must be a single term; \
                              wrap it in parentheses"
                        .to_string(),
                },
                expression.as_span().into(),
            ));
        }

        Ok(Stage::Segment {
            expr: self.expression(expression, depth)?,
            pattern: pattern.map(|p| self.pattern(p, depth + 1)).transpose()?,
        })
    }

    fn funcdef(&self, pair: Pair<'s, Rule>, depth: usize) -> Result<FuncDef, ParseError> {
        let span: Span = pair.as_span().into();
        let mut name = None;
        let mut params = Vec::new();
        let mut body = None;

        for child in children(pair) {
            match child.as_rule() {
                Rule::ident => name = Some(child.as_str().to_string()),
                Rule::params => {
                    for param in child.into_inner() {
                        params.push(match param.as_rule() {
                            Rule::variable => Param::Var(param.as_str()[1..].to_string()),
                            _ => Param::Filter(param.as_str().to_string()),
                        });
                    }
                }
                _ => body = Some(self.pipe(child, depth + 1)?),
            }
        }

        match (name, body) {
            (Some(name), Some(body)) => Ok(FuncDef {
                name,
                params,
                body,
                span,
            }),
            _ => Err(self.error(
                ParseErrorKind::Other {
                    message: "incomplete function definition".to_string(),
                },
                span,
            )),
        }
    }

    // ========================================================================
    // Operators
    // ========================================================================

    fn expression(&self, pair: Pair<'s, Rule>, depth: usize) -> Result<ParsedExpr, ParseError> {
        let span: Span = pair.as_span().into();
        let ops = pair
            .clone()
            .into_inner()
            .filter(|p| p.as_rule() != Rule::postfix_term)
            .count();
        self.check_depth(depth + ops, &span)?;
        let inner = depth + ops + 1;

        PRATT_PARSER
            .map_primary(|primary| self.postfix_term(primary, inner))
            .map_prefix(|op, rhs| {
                let rhs = rhs?;
                let span = Span::new(op.as_span().start(), rhs.span.0.end);
                Ok(match rhs.expr {
                    Expr::Literal(Literal::Number(n)) => {
                        ParsedExpr::new(Expr::Literal(Literal::Number(-n)), span)
                    }
                    _ => ParsedExpr::new(Expr::Neg(rhs.boxed()), span),
                })
            })
            .map_infix(|lhs, op, rhs| {
                let (lhs, rhs) = (lhs?, rhs?);
                let span = Span::combine(&lhs.span, &rhs.span);
                let (left, right) = (lhs.boxed(), rhs.boxed());
                let expr = match op.as_rule() {
                    Rule::comma => Expr::Comma(left, right),
                    Rule::alternative => Expr::Alternative(left, right),
                    Rule::or | Rule::and => Expr::Boolean {
                        op: if op.as_rule() == Rule::or {
                            BoolOp::Or
                        } else {
                            BoolOp::And
                        },
                        left,
                        right,
                    },
                    rule => {
                        if let Some(op) = comparison_op(rule) {
                            Expr::Comparison { op, left, right }
                        } else if let Some(op) = binary_op(rule) {
                            Expr::Binary { op, left, right }
                        } else if let Some(op) = assign_op(rule) {
                            Expr::Assign {
                                op,
                                path: left,
                                value: right,
                            }
                        } else {
                            return Err(self.error(
                                ParseErrorKind::Other {
                                    message: format!("unknown operator '{}'", op.as_str()),
                                },
                                op.as_span().into(),
                            ));
                        }
                    }
                };
                Ok(ParsedExpr::new(expr, span))
            })
            .parse(pair.into_inner())
    }

    // ========================================================================
    // Terms
    // ========================================================================

    fn postfix_term(&self, pair: Pair<'s, Rule>, depth: usize) -> Result<ParsedExpr, ParseError> {
        let span: Span = pair.as_span().into();
        let mut inner = pair.into_inner();
        let primary = self.next_pair(&mut inner, span.clone(), "term")?;
        let suffixes: Vec<Pair<'s, Rule>> = inner.collect();
        self.check_depth(depth + suffixes.len(), &span)?;
        let inner_depth = depth + suffixes.len() + 1;

        let mut acc = self.primary(primary, inner_depth)?;
        for suffix in suffixes {
            let span = Span::new(acc.span.0.start, suffix.as_span().end());
            let value = acc.boxed();
            let expr = match suffix.as_rule() {
                Rule::optional => Expr::Try {
                    body: value,
                    handler: None,
                },
                Rule::field => Expr::Index {
                    value,
                    index: self.field_name(&suffix).boxed(),
                },
                Rule::str_field => Expr::Index {
                    value,
                    index: self.str_field(suffix, inner_depth)?.boxed(),
                },
                _ => self.bracket(suffix, value, inner_depth)?,
            };
            acc = ParsedExpr::new(expr, span);
        }
        Ok(acc)
    }

    fn bracket(
        &self,
        pair: Pair<'s, Rule>,
        value: Box<ParsedExpr>,
        depth: usize,
    ) -> Result<Expr, ParseError> {
        let parts: Vec<Pair<'s, Rule>> = pair.into_inner().collect();
        let rules: Vec<Rule> = parts.iter().map(|p| p.as_rule()).collect();
        let mut parts = parts.into_iter();
        let pipe = |parts: &mut std::vec::IntoIter<Pair<'s, Rule>>| -> Result<_, ParseError> {
            match parts.next() {
                Some(p) if p.as_rule() == Rule::pipe => Ok(Some(self.pipe(p, depth + 1)?.boxed())),
                _ => Ok(None),
            }
        };

        Ok(match rules.as_slice() {
            [] => Expr::Iterate(value),
            [Rule::pipe] => Expr::Index {
                value,
                index: pipe(&mut parts)?.ok_or_else(|| self.missing_index())?,
            },
            [Rule::slice_colon, Rule::pipe] => {
                parts.next();
                Expr::Slice {
                    value,
                    from: None,
                    to: pipe(&mut parts)?,
                }
            }
            _ => {
                let from = pipe(&mut parts)?;
                parts.next();
                Expr::Slice {
                    value,
                    from,
                    to: pipe(&mut parts)?,
                }
            }
        })
    }

    fn missing_index(&self) -> ParseError {
        self.error(
            ParseErrorKind::Other {
                message: "missing index expression".to_string(),
            },
            Span::default(),
        )
    }

    fn field_name(&self, pair: &Pair<'s, Rule>) -> ParsedExpr {
        let span: Span = pair.as_span().into();
        let name = pair.as_str()[1..].to_string();
        ParsedExpr::new(Expr::Literal(Literal::String(name)), span)
    }

    fn str_field(&self, pair: Pair<'s, Rule>, depth: usize) -> Result<ParsedExpr, ParseError> {
        let span: Span = pair.as_span().into();
        let string = self.next_pair(&mut pair.into_inner(), span, "string")?;
        self.string(string, None, depth)
    }

    fn primary(&self, pair: Pair<'s, Rule>, depth: usize) -> Result<ParsedExpr, ParseError> {
        let span: Span = pair.as_span().into();
        let identity = || ParsedExpr::new(Expr::Identity, Span::new(span.0.start, span.0.start + 1));

        let expr = match pair.as_rule() {
            Rule::number => {
                let text = pair.as_str();
                let n = text.parse::<f64>().map_err(|_| {
                    self.error(
                        ParseErrorKind::Other {
                            message: format!("Invalid number literal '{}'", text),
                        },
                        span.clone(),
                    )
                })?;
                Expr::Literal(Literal::Number(n))
            }
            Rule::keyword_literal => Expr::Literal(match pair.as_str() {
                "true" => Literal::Bool(true),
                "false" => Literal::Bool(false),
                _ => Literal::Null,
            }),
            Rule::string => return self.string(pair, None, depth),
            Rule::format_expr => {
                let mut inner = pair.into_inner();
                let format = self.next_pair(&mut inner, span.clone(), "format")?;
                let name = format.as_str()[1..].to_string();
                match inner.next() {
                    Some(string) => return self.string(string, Some(name), depth),
                    None => Expr::Format(name),
                }
            }
            Rule::recurse_all => Expr::RecurseAll,
            Rule::identity => Expr::Identity,
            Rule::field => Expr::Index {
                value: identity().boxed(),
                index: self.field_name(&pair).boxed(),
            },
            Rule::str_field => Expr::Index {
                value: identity().boxed(),
                index: self.str_field(pair, depth)?.boxed(),
            },
            Rule::variable => Expr::Var(pair.as_str()[1..].to_string()),
            Rule::array => match pair.into_inner().next() {
                Some(pipe) => Expr::Array(Some(self.pipe(pipe, depth + 1)?.boxed())),
                None => Expr::Array(None),
            },
            Rule::paren => {
                let pipe = self.next_pair(&mut pair.into_inner(), span, "expression")?;
                return self.pipe(pipe, depth + 1);
            }
            Rule::object => Expr::Object(self.object(pair, depth + 1)?),
            Rule::call => {
                let mut inner = pair.into_inner();
                let name = self.next_pair(&mut inner, span.clone(), "function name")?;
                let args = inner
                    .map(|arg| self.pipe(arg, depth + 1))
                    .collect::<Result<Vec<_>, _>>()?;
                Expr::Call {
                    name: name.as_str().to_string(),
                    args,
                }
            }
            Rule::if_expr => self.if_expr(pair, depth + 1)?,
            Rule::try_expr => {
                let mut inner = children(pair);
                let body = self.next_pair(&mut inner, span.clone(), "try body")?;
                let body = self.postfix_term(body, depth + 1)?;
                let handler = match inner.next() {
                    Some(catch) => {
                        let handler = self.next_pair(&mut children(catch), span.clone(), "catch body")?;
                        Some(self.postfix_term(handler, depth + 1)?.boxed())
                    }
                    None => None,
                };
                Expr::Try {
                    body: body.boxed(),
                    handler,
                }
            }
            Rule::reduce_expr | Rule::foreach_expr => {
                let is_reduce = pair.as_rule() == Rule::reduce_expr;
                let mut inner = children(pair);
                let source = self.next_pair(&mut inner, span.clone(), "source")?;
                let source = self.postfix_term(source, depth + 1)?.boxed();
                let pattern = self.next_pair(&mut inner, span.clone(), "pattern")?;
                let pattern = self.pattern(pattern, depth + 1)?;
                let mut pipes = inner.map(|p| self.pipe(p, depth + 1).map(ParsedExpr::boxed));
                let init = pipes.next().transpose()?;
                let update = pipes.next().transpose()?;
                let extract = pipes.next().transpose()?;
                let (Some(init), Some(update)) = (init, update) else {
                    return Err(self.error(
                        ParseErrorKind::Other {
                            message: "missing initial value or update".to_string(),
                        },
                        span,
                    ));
                };
                if is_reduce {
                    Expr::Reduce {
                        source,
                        pattern,
                        init,
                        update,
                    }
                } else {
                    Expr::Foreach {
                        source,
                        pattern,
                        init,
                        update,
                        extract,
                    }
                }
            }
            rule => {
                return Err(self.error(
                    ParseErrorKind::Other {
                        message: format!("Unhandled rule: {:?}", rule),
                    },
                    span,
                ));
            }
        };
        Ok(ParsedExpr::new(expr, span))
    }

    fn if_expr(&self, pair: Pair<'s, Rule>, depth: usize) -> Result<Expr, ParseError> {
        let span: Span = pair.as_span().into();
        let mut branches = Vec::new();
        let mut otherwise = None;
        let mut inner = children(pair);

        let cond = self.next_pair(&mut inner, span.clone(), "condition")?;
        let then = self.next_pair(&mut inner, span.clone(), "then branch")?;
        branches.push((self.pipe(cond, depth)?, self.pipe(then, depth)?));

        for clause in inner {
            match clause.as_rule() {
                Rule::elif_clause => {
                    let mut parts = children(clause);
                    let cond = self.next_pair(&mut parts, span.clone(), "condition")?;
                    let then = self.next_pair(&mut parts, span.clone(), "then branch")?;
                    branches.push((self.pipe(cond, depth)?, self.pipe(then, depth)?));
                }
                _ => {
                    let body = self.next_pair(&mut children(clause), span.clone(), "else branch")?;
                    otherwise = Some(self.pipe(body, depth)?.boxed());
                }
            }
        }

        Ok(Expr::If {
            branches,
            otherwise,
        })
    }

    // ========================================================================
    // Strings
    // ========================================================================

    fn string(
        &self,
        pair: Pair<'s, Rule>,
        format: Option<String>,
        depth: usize,
    ) -> Result<ParsedExpr, ParseError> {
        let span: Span = pair.as_span().into();
        let mut parts = Vec::new();

        for part in pair.into_inner() {
            match part.as_rule() {
                Rule::string_text => {
                    let text = unescape_string(part.as_str()).map_err(|err| {
                        self.error(
                            ParseErrorKind::InvalidString {
                                message: err.to_string(),
                            },
                            part.as_span().into(),
                        )
                    })?;
                    parts.push(StringPart::Text(text.into_owned()));
                }
                _ => {
                    let part_span: Span = part.as_span().into();
                    let pipe = self.next_pair(&mut part.into_inner(), part_span, "interpolation")?;
                    self.check_depth(depth + 1, &span)?;
                    parts.push(StringPart::Interp(self.pipe(pipe, depth + 1)?));
                }
            }
        }

        let has_interp = parts.iter().any(|p| matches!(p, StringPart::Interp(_)));
        let expr = if format.is_none() && !has_interp {
            let text = parts
                .into_iter()
                .map(|p| match p {
                    StringPart::Text(t) => t,
                    StringPart::Interp(_) => String::new(),
                })
                .collect();
            Expr::Literal(Literal::String(text))
        } else {
            Expr::Str { format, parts }
        };
        Ok(ParsedExpr::new(expr, span))
    }

    // ========================================================================
    // Objects and patterns
    // ========================================================================

    /// `a | b | c` in an object value, folded to the right like a pipe.
    fn object_value(&self, pair: Pair<'s, Rule>, depth: usize) -> Result<ParsedExpr, ParseError> {
        let span: Span = pair.as_span().into();
        let terms: Vec<Pair<'s, Rule>> = pair
            .into_inner()
            .filter(|p| p.as_rule() == Rule::value_term)
            .collect();
        self.check_depth(depth + terms.len(), &span)?;
        let inner = depth + terms.len();

        let mut terms = terms
            .into_iter()
            .map(|term| self.expression(term, inner))
            .collect::<Result<Vec<_>, _>>()?;
        let mut acc = match terms.pop() {
            Some(last) => last,
            None => {
                return Err(self.error(
                    ParseErrorKind::Other {
                        message: "missing object value".to_string(),
                    },
                    span,
                ));
            }
        };
        while let Some(term) = terms.pop() {
            let span = Span::combine(&term.span, &acc.span);
            acc = ParsedExpr::new(Expr::Pipe(term.boxed(), acc.boxed()), span);
        }
        Ok(acc)
    }

    fn object(&self, pair: Pair<'s, Rule>, depth: usize) -> Result<Vec<ObjectEntry>, ParseError> {
        self.check_depth(depth, &pair.as_span().into())?;
        let mut entries = Vec::new();

        for entry in pair.into_inner() {
            let entry_span: Span = entry.as_span().into();
            let mut inner = entry.into_inner();
            let key = self.next_pair(&mut inner, entry_span.clone(), "object key")?;
            let value = inner
                .next()
                .map(|v| self.object_value(v, depth + 1))
                .transpose()?;
            let key_span: Span = key.as_span().into();
            let literal_key =
                |name: &str| ParsedExpr::new(Expr::Literal(Literal::String(name.to_string())), key_span.clone());
            let lookup = |key: &ParsedExpr| {
                ParsedExpr::new(
                    Expr::Index {
                        value: ParsedExpr::new(Expr::Identity, key_span.clone()).boxed(),
                        index: key.clone().boxed(),
                    },
                    key_span.clone(),
                )
            };

            let (key, value) = match key.as_rule() {
                Rule::variable => {
                    let name = &key.as_str()[1..];
                    let var = ParsedExpr::new(Expr::Var(name.to_string()), key_span.clone());
                    match value {
                        Some(value) => (var, value),
                        None => (literal_key(name), var),
                    }
                }
                Rule::key_name => {
                    let key = literal_key(key.as_str());
                    let value = value.unwrap_or_else(|| lookup(&key));
                    (key, value)
                }
                Rule::paren => {
                    let pipe = self.next_pair(&mut key.into_inner(), key_span.clone(), "key")?;
                    let key = self.pipe(pipe, depth + 1)?;
                    let Some(value) = value else {
                        return Err(self.error(
                            ParseErrorKind::UnexpectedToken {
                                expected: "':'".to_string(),
                                found: "end of object entry".to_string(),
                            },
                            entry_span,
                        ));
                    };
                    (key, value)
                }
                _ => {
                    let key = self.primary(key, depth + 1)?;
                    let value = value.unwrap_or_else(|| lookup(&key));
                    (key, value)
                }
            };
            entries.push(ObjectEntry { key, value });
        }
        Ok(entries)
    }

    fn pattern(&self, pair: Pair<'s, Rule>, depth: usize) -> Result<Pattern, ParseError> {
        let span: Span = pair.as_span().into();
        self.check_depth(depth, &span)?;

        match pair.as_rule() {
            Rule::variable => Ok(Pattern::Var {
                name: pair.as_str()[1..].to_string(),
                span,
            }),
            Rule::array_pattern => pair
                .into_inner()
                .map(|p| self.pattern(p, depth + 1))
                .collect::<Result<Vec<_>, _>>()
                .map(Pattern::Array),
            _ => {
                let mut entries = Vec::new();
                for entry in pair.into_inner() {
                    entries.push(self.object_pattern_entry(entry, depth + 1)?);
                }
                Ok(Pattern::Object(entries))
            }
        }
    }

    fn object_pattern_entry(
        &self,
        pair: Pair<'s, Rule>,
        depth: usize,
    ) -> Result<ObjectPatternEntry, ParseError> {
        let span: Span = pair.as_span().into();
        let mut inner = pair.into_inner();
        let key = self.next_pair(&mut inner, span.clone(), "pattern key")?;
        let pattern = inner.next().map(|p| self.pattern(p, depth + 1)).transpose()?;
        let key_span: Span = key.as_span().into();

        match key.as_rule() {
            Rule::variable => Ok(ObjectPatternEntry::Var {
                name: key.as_str()[1..].to_string(),
                span: key_span,
                pattern,
            }),
            rule => {
                let key = match rule {
                    Rule::key_name => ParsedExpr::new(
                        Expr::Literal(Literal::String(key.as_str().to_string())),
                        key_span,
                    ),
                    Rule::string => self.string(key, None, depth + 1)?,
                    _ => {
                        let pipe = self.next_pair(&mut key.into_inner(), key_span, "key")?;
                        self.pipe(pipe, depth + 1)?
                    }
                };
                let pattern = pattern.ok_or_else(|| {
                    self.error(
                        ParseErrorKind::Other {
                            message: "missing pattern for object key".to_string(),
                        },
                        span,
                    )
                })?;
                Ok(ObjectPatternEntry::Keyed { key, pattern })
            }
        }
    }
}

fn comparison_op(rule: Rule) -> Option<ComparisonOp> {
    Some(match rule {
        Rule::eq => ComparisonOp::Eq,
        Rule::neq => ComparisonOp::Neq,
        Rule::lt => ComparisonOp::Lt,
        Rule::le => ComparisonOp::Le,
        Rule::gt => ComparisonOp::Gt,
        Rule::ge => ComparisonOp::Ge,
        _ => return None,
    })
}

fn binary_op(rule: Rule) -> Option<BinaryOp> {
    Some(match rule {
        Rule::add => BinaryOp::Add,
        Rule::sub => BinaryOp::Sub,
        Rule::mul => BinaryOp::Mul,
        Rule::div => BinaryOp::Div,
        Rule::modulo => BinaryOp::Mod,
        _ => return None,
    })
}

fn assign_op(rule: Rule) -> Option<AssignOp> {
    Some(match rule {
        Rule::assign => AssignOp::Set,
        Rule::update_assign => AssignOp::Update,
        Rule::alt_assign => AssignOp::Alternative,
        Rule::add_assign => AssignOp::Arith(BinaryOp::Add),
        Rule::sub_assign => AssignOp::Arith(BinaryOp::Sub),
        Rule::mul_assign => AssignOp::Arith(BinaryOp::Mul),
        Rule::div_assign => AssignOp::Arith(BinaryOp::Div),
        Rule::mod_assign => AssignOp::Arith(BinaryOp::Mod),
        _ => return None,
    })
}

/// Parse only, returning pest's raw pair tree (used by `--debug-parse`).
pub fn parse_tree(source: &str) -> Result<Pairs<'_, Rule>, ParseError> {
    FilterParser::parse(Rule::main, source).map_err(|err| convert_pest_error(err, source))
}
