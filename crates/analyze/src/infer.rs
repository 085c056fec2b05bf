//! Static type inference for expressions.
//!
//! Never fails: anything inference cannot see through is `Unknown`.

use formlogic_core::{
    lookup_builtin, parse, BinaryOp, Expr, ExprType, InferredType, Literal, OperatorClass,
    ReturnType, UnaryOp,
};

use crate::type_env::TypeEnvironment;

/// Inferred result type of `expr`; unparsable expressions are unknown.
pub fn infer_expression_type(expr: &str, env: &TypeEnvironment) -> InferredType {
    parse(expr).map_or(InferredType::Unknown, |tree| infer(&tree, env))
}

pub fn infer(expr: &Expr, env: &TypeEnvironment) -> InferredType {
    match expr {
        Expr::Literal(lit) => InferredType::Certain(match lit {
            Literal::Bool(_) => ExprType::Boolean,
            Literal::Number(_) => ExprType::Number,
            Literal::Str(_) => ExprType::String,
            Literal::Null => ExprType::Null,
        }),
        Expr::Path(segments) => env.lookup(&segments.join(".")),
        Expr::Member { .. } | Expr::Index { .. } => InferredType::Unknown,
        Expr::Array(_) => InferredType::Certain(ExprType::Array),
        Expr::Unary {
            op: UnaryOp::Not, ..
        } => InferredType::Certain(ExprType::Boolean),
        Expr::Unary { operand, .. } => numeric(&[infer(operand, env)]),
        Expr::Binary { op, left, right } => match op.class() {
            OperatorClass::Comparison | OperatorClass::Logical => {
                InferredType::Certain(ExprType::Boolean)
            }
            OperatorClass::Arithmetic => {
                let l = infer(left, env);
                let r = infer(right, env);
                if *op == BinaryOp::Add && (l.is(ExprType::String) || r.is(ExprType::String)) {
                    concatenation(l, r)
                } else {
                    numeric(&[l, r])
                }
            }
        },
        Expr::Conditional {
            then_branch,
            else_branch,
            ..
        } => infer(then_branch, env).join(infer(else_branch, env)),
        Expr::Call { function, args } => call(function, args, env),
    }
}

/// Number, probable when any operand is unknown. An operand known to be
/// something else always fails at runtime, so the result is unknown.
fn numeric(operands: &[InferredType]) -> InferredType {
    if operands
        .iter()
        .any(|t| matches!(t, InferredType::Certain(k) if *k != ExprType::Number))
    {
        InferredType::Unknown
    } else if operands.iter().any(InferredType::is_unknown) {
        InferredType::Probable(ExprType::Number)
    } else {
        InferredType::Certain(ExprType::Number)
    }
}

/// `+` with a string side: certain only when a side is certainly a string.
fn concatenation(l: InferredType, r: InferredType) -> InferredType {
    if l == InferredType::Certain(ExprType::String) || r == InferredType::Certain(ExprType::String) {
        InferredType::Certain(ExprType::String)
    } else {
        InferredType::Probable(ExprType::String)
    }
}

fn call(function: &str, args: &[Expr], env: &TypeEnvironment) -> InferredType {
    let Some(signature) = lookup_builtin(function) else {
        return InferredType::Unknown;
    };
    if !signature.arity.accepts(args.len()) {
        return InferredType::Unknown;
    }
    match signature.returns {
        ReturnType::Fixed(t) => InferredType::Certain(t),
        ReturnType::JoinOf(positions) => {
            join_all(positions.iter().filter_map(|&i| args.get(i)), env)
        }
        ReturnType::JoinAll => join_all(args.iter(), env),
    }
}

fn join_all<'a>(exprs: impl Iterator<Item = &'a Expr>, env: &TypeEnvironment) -> InferredType {
    exprs
        .map(|e| infer(e, env))
        .reduce(InferredType::join)
        .unwrap_or(InferredType::Unknown)
}
