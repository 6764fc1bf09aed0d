mod delimiters;
pub mod error;
mod parsed_expr;
pub mod parser;
mod syntax;

// Re-export the parser and rule enum for external use
pub use parser::FilterParser;
pub use parser::Rule;
pub use parser::{DEFAULT_MAX_DEPTH, parse, parse_tree, parse_with_max_depth};

pub use error::{ParseError, ParseErrorKind};
pub use parsed_expr::{
    Expr, FuncDef, Literal, ObjectEntry, ObjectPatternEntry, Param, ParsedExpr, Pattern,
    StringPart,
};
pub use syntax::{AssignOp, BinaryOp, BoolOp, ComparisonOp, Span};
