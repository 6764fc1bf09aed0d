use crate::api::{Diagnostic, Severity};
use crate::parser::{Rule, Span};

/// Parser error with context
#[derive(Debug, Clone)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub source: String,
    pub span: Span,
}

/// Specific kinds of parse errors
#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    /// Unexpected token
    UnexpectedToken { expected: String, found: String },
    /// Unclosed delimiter: a bracket, `if` or string quote
    UnclosedDelimiter { delimiter: String },
    /// Malformed string literal (e.g. a lone surrogate escape)
    InvalidString { message: String },
    /// Maximum nesting depth exceeded
    MaxDepthExceeded { depth: usize, max_depth: usize },
    /// A closing delimiter with nothing open
    UnexpectedDelimiter { delimiter: String },
    /// A closing delimiter that does not match the innermost open one
    MismatchedDelimiter { expected: String, found: String },
    /// Other parse errors (catch-all for Pest errors we don't specifically handle)
    Other { message: String },
}

impl ParseError {
    /// Create a new ParseError
    pub fn new(kind: ParseErrorKind, source: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            source: source.into(),
            span,
        }
    }

    /// Convert to a Diagnostic for API boundary
    pub fn to_diagnostic(&self) -> Diagnostic {
        let (message, code, help) = match &self.kind {
            ParseErrorKind::UnexpectedToken { expected, found } => (
                format!("Expected {}, found {}", expected, found),
                "P001",
                None,
            ),
            ParseErrorKind::UnclosedDelimiter { delimiter } => (
                format!("Unclosed delimiter '{}'", delimiter),
                "P002",
                Some("Add the missing closing delimiter"),
            ),
            ParseErrorKind::InvalidString { message } => (
                format!("Invalid string literal: {}", message),
                "P003",
                None,
            ),
            ParseErrorKind::MaxDepthExceeded { max_depth, .. } => (
                format!(
                    "Expression nesting depth exceeds maximum of {} levels",
                    max_depth
                ),
                "P004",
                Some("Reduce nesting or simplify the expression"),
            ),
            ParseErrorKind::UnexpectedDelimiter { delimiter } => (
                format!("Unexpected closing delimiter '{}'", delimiter),
                "P005",
                None,
            ),
            ParseErrorKind::MismatchedDelimiter { expected, found } => (
                format!(
                    "Mismatched delimiter: expected '{}' but found '{}'",
                    expected, found
                ),
                "P006",
                None,
            ),
            ParseErrorKind::Other { message } => (message.clone(), "P999", None),
        };

        Diagnostic {
            severity: Severity::Error,
            message,
            span: self.span.clone(),
            help: help.map(str::to_string),
            code: Some(code.to_string()),
        }
    }
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let diagnostic = self.to_diagnostic();
        write!(f, "{}: {}", diagnostic.severity, diagnostic.message)?;

        if let Some(ref code) = diagnostic.code {
            write!(f, " [{}]", code)?;
        }

        if let Some(ref help) = diagnostic.help {
            write!(f, "\nhelp: {}", help)?;
        }

        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// Convert Pest error to human-readable ParseError
pub fn convert_pest_error(err: pest::error::Error<Rule>, source: &str) -> ParseError {
    use pest::error::ErrorVariant;

    let span = match err.location {
        pest::error::InputLocation::Pos(pos) => Span(pos..pos),
        pest::error::InputLocation::Span((start, end)) => Span(start..end),
    };

    let kind = match err.variant {
        ErrorVariant::ParsingError { positives, .. } => ParseErrorKind::UnexpectedToken {
            expected: format_expected_rules(&positives),
            found: describe_found(source, span.0.start),
        },
        ErrorVariant::CustomError { message } => ParseErrorKind::Other { message },
    };

    ParseError::new(kind, source, span)
}

/// Format expected rules in a human-readable way
fn format_expected_rules(rules: &[Rule]) -> String {
    if rules.is_empty() {
        return "something else".to_string();
    }

    let in_pattern = rules.contains(&Rule::array_pattern);
    let mut concepts: Vec<&str> = Vec::new();

    for rule in rules {
        let concept = match rule {
            Rule::variable | Rule::array_pattern | Rule::object_pattern if in_pattern => "pattern",
            Rule::EOI => "end of input",
            Rule::pipe_op
            | Rule::comma
            | Rule::alternative
            | Rule::alt_assign
            | Rule::update_assign
            | Rule::add_assign
            | Rule::sub_assign
            | Rule::mul_assign
            | Rule::div_assign
            | Rule::mod_assign
            | Rule::assign
            | Rule::eq
            | Rule::neq
            | Rule::le
            | Rule::ge
            | Rule::lt
            | Rule::gt
            | Rule::or
            | Rule::and
            | Rule::add
            | Rule::sub
            | Rule::mul
            | Rule::div
            | Rule::modulo
            | Rule::optional
            | Rule::bracket
            | Rule::field
            | Rule::str_field => "operator",
            Rule::kw_then => "'then'",
            Rule::kw_elif | Rule::kw_else | Rule::kw_end => "'elif', 'else' or 'end'",
            Rule::kw_as => "'as'",
            Rule::kw_catch => "'catch'",
            Rule::ident | Rule::key_name => "identifier",
            Rule::object_entry => "object key",
            Rule::string_text | Rule::interpolation => "string content",
            _ => "expression",
        };
        if !concepts.contains(&concept) {
            concepts.push(concept);
        }
    }

    match concepts.split_last() {
        Some((last, [])) => last.to_string(),
        Some((last, rest)) => format!("{} or {}", rest.join(", "), last),
        None => "something else".to_string(),
    }
}

/// Describe the source text at an error position.
fn describe_found(source: &str, pos: usize) -> String {
    match source.get(pos..).and_then(|rest| rest.chars().next()) {
        None => "end of input".to_string(),
        Some(c) => {
            let word: String = source[pos..]
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
                .collect();
            if word.is_empty() {
                format!("'{}'", c)
            } else {
                format!("'{}'", word)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_to_diagnostic() {
        let error = ParseError::new(
            ParseErrorKind::UnexpectedToken {
                expected: "expression".to_string(),
                found: "','".to_string(),
            },
            "test source",
            Span(10..20),
        );

        let diagnostic = error.to_diagnostic();
        assert_eq!(diagnostic.severity, Severity::Error);
        assert_eq!(diagnostic.message, "Expected expression, found ','");
        assert_eq!(diagnostic.code, Some("P001".to_string()));
        assert_eq!(diagnostic.span, Span(10..20));
    }

    #[test]
    fn test_format_expected_rules() {
        assert_eq!(format_expected_rules(&[Rule::number, Rule::string]), "expression");
        assert_eq!(
            format_expected_rules(&[Rule::EOI, Rule::add, Rule::pipe_op]),
            "end of input or operator"
        );
        assert_eq!(
            format_expected_rules(&[Rule::variable, Rule::array_pattern, Rule::object_pattern]),
            "pattern"
        );
    }

    #[test]
    fn test_describe_found() {
        assert_eq!(describe_found("1 +", 3), "end of input");
        assert_eq!(describe_found("if then", 3), "'then'");
        assert_eq!(describe_found("(]", 1), "']'");
    }

    #[test]
    fn test_display_includes_code_and_help() {
        let error = ParseError::new(
            ParseErrorKind::UnclosedDelimiter {
                delimiter: "(".to_string(),
            },
            "(1",
            Span(0..1),
        );
        assert_eq!(
            error.to_string(),
            "error: Unclosed delimiter '(' [P002]\nhelp: Add the missing closing delimiter"
        );
    }
}
