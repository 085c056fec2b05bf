//! Expression evaluation against an [`EvalContext`].
//!
//! The strict entry point, [`evaluate_expression`], reports every failure.
//! The defaulting entry points absorb failures into a caller-supplied
//! default and log them at debug level; they never panic.

use formlogic_core::{parse, BinaryOp, Expr, Literal, OperatorClass, UnaryOp};
use formlogic_schema::CondExpr;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::debug;

use crate::context::EvalContext;
use crate::error::{EvalErrorKind, ExpressionEvaluationError};
use crate::functions::call_builtin;
use crate::numeric::{arithmetic, compare};
use crate::value::Value;

/// Failure inside evaluation, before it is tied to its source expression.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Fault {
    pub(crate) kind: EvalErrorKind,
    pub(crate) message: String,
}

impl Fault {
    pub(crate) fn type_mismatch(message: impl Into<String>) -> Self {
        Fault {
            kind: EvalErrorKind::TypeMismatch,
            message: message.into(),
        }
    }

    pub(crate) fn failed(message: impl Into<String>) -> Self {
        Fault {
            kind: EvalErrorKind::EvaluationFailed,
            message: message.into(),
        }
    }

    fn undefined(name: &str) -> Self {
        Fault {
            kind: EvalErrorKind::UndefinedVariable,
            message: format!("'{}' is not defined", name),
        }
    }

    fn into_error(self, expression: &str) -> ExpressionEvaluationError {
        ExpressionEvaluationError::new(self.kind, expression).with_cause(self.message)
    }
}

// ── Tree walk ────────────────────────────────────────────────────────

fn eval_expr(expr: &Expr, ctx: &EvalContext) -> Result<Value, Fault> {
    match expr {
        Expr::Literal(lit) => eval_literal(lit),
        Expr::Path(segments) => ctx.resolve(segments).ok_or_else(|| {
            Fault::undefined(segments.first().map(String::as_str).unwrap_or_default())
        }),
        Expr::Member { object, property } => Ok(eval_expr(object, ctx)?
            .get(property)
            .cloned()
            .unwrap_or_default()),
        Expr::Index { object, index } => {
            let object = eval_expr(object, ctx)?;
            let index = eval_expr(index, ctx)?;
            eval_index(&object, &index)
        }
        Expr::Array(items) => items
            .iter()
            .map(|item| eval_expr(item, ctx))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        Expr::Unary { op, operand } => {
            let v = eval_expr(operand, ctx)?;
            match (op, v) {
                (UnaryOp::Not, v) => Ok(Value::Bool(!v.is_truthy())),
                (UnaryOp::Neg, Value::Number(n)) => Ok(Value::Number(-n)),
                (UnaryOp::Plus, Value::Number(n)) => Ok(Value::Number(n)),
                (_, other) => Err(Fault::type_mismatch(format!(
                    "unary operator expects a number, got {}",
                    other.type_name()
                ))),
            }
        }
        Expr::Binary {
            op: BinaryOp::And,
            left,
            right,
        } => {
            if !eval_expr(left, ctx)?.is_truthy() {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(eval_expr(right, ctx)?.is_truthy()))
        }
        Expr::Binary {
            op: BinaryOp::Or,
            left,
            right,
        } => {
            if eval_expr(left, ctx)?.is_truthy() {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(eval_expr(right, ctx)?.is_truthy()))
        }
        Expr::Binary { op, left, right } => {
            let l = eval_expr(left, ctx)?;
            let r = eval_expr(right, ctx)?;
            match op.class() {
                OperatorClass::Comparison => compare(*op, &l, &r).map(Value::Bool),
                _ => arithmetic(*op, &l, &r),
            }
        }
        Expr::Conditional {
            condition,
            then_branch,
            else_branch,
        } => {
            if eval_expr(condition, ctx)?.is_truthy() {
                eval_expr(then_branch, ctx)
            } else {
                eval_expr(else_branch, ctx)
            }
        }
        // Only the taken branch of if() is evaluated
        Expr::Call { function, args } if function == "if" && args.len() == 3 => {
            let branch = if eval_expr(&args[0], ctx)?.is_truthy() {
                &args[1]
            } else {
                &args[2]
            };
            eval_expr(branch, ctx)
        }
        Expr::Call { function, args } => {
            let values = args
                .iter()
                .map(|arg| eval_expr(arg, ctx))
                .collect::<Result<Vec<_>, _>>()?;
            call_builtin(function, &values)
        }
    }
}

fn eval_literal(lit: &Literal) -> Result<Value, Fault> {
    match lit {
        Literal::Bool(b) => Ok(Value::Bool(*b)),
        Literal::Null => Ok(Value::Null),
        Literal::Str(s) => Ok(Value::Text(s.clone())),
        Literal::Number(text) => text
            .parse::<Decimal>()
            .or_else(|_| Decimal::from_scientific(text))
            .map(Value::Number)
            .map_err(|_| Fault::failed(format!("number literal '{}' is out of range", text))),
    }
}

fn eval_index(object: &Value, index: &Value) -> Result<Value, Fault> {
    match (object, index) {
        (Value::Undefined | Value::Null, _) => Ok(Value::Undefined),
        (Value::List(items), Value::Number(n)) => Ok(n
            .fract()
            .is_zero()
            .then(|| n.to_usize())
            .flatten()
            .and_then(|i| items.get(i))
            .cloned()
            .unwrap_or_default()),
        (Value::Object(map), Value::Text(key)) => Ok(map.get(key).cloned().unwrap_or_default()),
        _ => Err(Fault::type_mismatch(format!(
            "cannot index {} with {}",
            object.type_name(),
            index.type_name()
        ))),
    }
}

// ── Entry points ─────────────────────────────────────────────────────

/// Parse and evaluate `expr`, reporting any failure.
pub fn evaluate_expression(
    expr: &str,
    ctx: &EvalContext,
) -> Result<Value, ExpressionEvaluationError> {
    let tree = parse(expr).map_err(|e| {
        ExpressionEvaluationError::new(EvalErrorKind::SyntaxError, expr).with_cause(e.to_string())
    })?;
    eval_expr(&tree, ctx).map_err(|fault| fault.into_error(expr))
}

/// [`evaluate_expression`] with the schema location recorded on failure.
pub fn evaluate_expression_at<S: AsRef<str>>(
    expr: &str,
    ctx: &EvalContext,
    path: &[S],
) -> Result<Value, ExpressionEvaluationError> {
    evaluate_expression(expr, ctx).map_err(|e| e.with_path(path))
}

/// Evaluate `expr`, returning `default` on any failure.
pub fn evaluate_expression_or_default(expr: &str, ctx: &EvalContext, default: Value) -> Value {
    evaluate_or_default_at::<&str>(expr, ctx, default, &[])
}

pub(crate) fn evaluate_or_default_at<S: AsRef<str>>(
    expr: &str,
    ctx: &EvalContext,
    default: Value,
    path: &[S],
) -> Value {
    match evaluate_expression_at(expr, ctx, path) {
        Ok(v) => v,
        Err(e) => {
            debug!(
                path = %e.path.join("."),
                kind = %e.kind,
                error = %e,
                "expression failed; using default"
            );
            default
        }
    }
}

/// Evaluate `expr` as a condition. Failures and results with no boolean
/// reading (undefined) yield `default`; everything else is coerced by
/// truthiness.
pub fn evaluate_boolean_expression(expr: &str, ctx: &EvalContext, default: bool) -> bool {
    evaluate_boolean_at::<&str>(expr, ctx, default, &[])
}

pub(crate) fn evaluate_boolean_at<S: AsRef<str>>(
    expr: &str,
    ctx: &EvalContext,
    default: bool,
    path: &[S],
) -> bool {
    evaluate_or_default_at(expr, ctx, Value::Undefined, path)
        .truthiness()
        .unwrap_or(default)
}

/// Resolve a conditional flag: absent flags take `default`, static flags
/// are used as-is, expressions go through [`evaluate_boolean_expression`].
pub fn evaluate_cond_expr<S: AsRef<str>>(
    cond: Option<&CondExpr>,
    ctx: &EvalContext,
    default: bool,
    path: &[S],
) -> bool {
    match cond {
        None => default,
        Some(CondExpr::Static(b)) => *b,
        Some(CondExpr::Expr(expr)) => evaluate_boolean_at(expr, ctx, default, path),
    }
}

/// Evaluate a batch of named expressions against one context. Each entry
/// carries its own outcome; one failure does not affect the others.
pub fn evaluate_multiple_expressions(
    exprs: &BTreeMap<String, String>,
    ctx: &EvalContext,
) -> BTreeMap<String, Result<Value, ExpressionEvaluationError>> {
    exprs
        .iter()
        .map(|(name, expr)| (name.clone(), evaluate_expression(expr, ctx)))
        .collect()
}
