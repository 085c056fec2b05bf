//! formlogic-core: expression language for form conditional logic.
//!
//! Provides the pieces shared by design-time tooling and fill-time
//! evaluation:
//!
//! - [`parse_expression()`] / [`parse()`] -- expression parser and
//!   variable extraction
//! - [`resolve_logic_order()`] -- dependency ordering of logic keys
//! - [`InferredType`] -- confidence-graded type lattice
//! - [`BUILTINS`] -- built-in function signature table

pub mod ast;
pub mod builtins;
pub mod dependency;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod types;

// ── Convenience re-exports ───────────────────────────────────────────

pub use ast::{BinaryOp, Expr, Literal, OperatorClass, UnaryOp};
pub use builtins::{lookup_builtin, Arity, BuiltinSignature, ReturnType, BUILTINS};
pub use dependency::{logic_dependencies, resolve_logic_order, LogicOrder};
pub use error::ParseError;
pub use parser::{parse, parse_expression, ExpressionParser, ParseOutcome, ParserConfig};
pub use types::{Confidence, ExprType, InferredType};

/// Root names an expression may use besides logic keys.
pub const CONTEXT_ROOTS: &[&str] = &["fields", "parties", "witnesses"];
