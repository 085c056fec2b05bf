//! Built-in function signature table.
//!
//! Shared by type inference (result types) and the runtime evaluator
//! (name and arity checks). The runtime implementations live with the
//! evaluator; this table is the single list of names that exist.

use crate::types::ExprType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    Range(usize, usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(&self, n: usize) -> bool {
        match *self {
            Arity::Exact(k) => n == k,
            Arity::Range(lo, hi) => (lo..=hi).contains(&n),
            Arity::AtLeast(lo) => n >= lo,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnType {
    Fixed(ExprType),
    /// Join of the argument types at the given positions.
    JoinOf(&'static [usize]),
    /// Join of every argument type.
    JoinAll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinSignature {
    pub name: &'static str,
    pub arity: Arity,
    pub returns: ReturnType,
}

pub const BUILTINS: &[BuiltinSignature] = &[
    BuiltinSignature {
        name: "abs",
        arity: Arity::Exact(1),
        returns: ReturnType::Fixed(ExprType::Number),
    },
    BuiltinSignature {
        name: "ceil",
        arity: Arity::Exact(1),
        returns: ReturnType::Fixed(ExprType::Number),
    },
    BuiltinSignature {
        name: "floor",
        arity: Arity::Exact(1),
        returns: ReturnType::Fixed(ExprType::Number),
    },
    BuiltinSignature {
        name: "round",
        arity: Arity::Range(1, 2),
        returns: ReturnType::Fixed(ExprType::Number),
    },
    BuiltinSignature {
        name: "min",
        arity: Arity::AtLeast(1),
        returns: ReturnType::Fixed(ExprType::Number),
    },
    BuiltinSignature {
        name: "max",
        arity: Arity::AtLeast(1),
        returns: ReturnType::Fixed(ExprType::Number),
    },
    BuiltinSignature {
        name: "length",
        arity: Arity::Exact(1),
        returns: ReturnType::Fixed(ExprType::Number),
    },
    BuiltinSignature {
        name: "lower",
        arity: Arity::Exact(1),
        returns: ReturnType::Fixed(ExprType::String),
    },
    BuiltinSignature {
        name: "upper",
        arity: Arity::Exact(1),
        returns: ReturnType::Fixed(ExprType::String),
    },
    BuiltinSignature {
        name: "trim",
        arity: Arity::Exact(1),
        returns: ReturnType::Fixed(ExprType::String),
    },
    BuiltinSignature {
        name: "contains",
        arity: Arity::Exact(2),
        returns: ReturnType::Fixed(ExprType::Boolean),
    },
    BuiltinSignature {
        name: "isEmpty",
        arity: Arity::Exact(1),
        returns: ReturnType::Fixed(ExprType::Boolean),
    },
    BuiltinSignature {
        name: "if",
        arity: Arity::Exact(3),
        returns: ReturnType::JoinOf(&[1, 2]),
    },
    BuiltinSignature {
        name: "coalesce",
        arity: Arity::AtLeast(1),
        returns: ReturnType::JoinAll,
    },
];

pub fn lookup_builtin(name: &str) -> Option<&'static BuiltinSignature> {
    BUILTINS.iter().find(|b| b.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_known_and_unknown() {
        assert_eq!(lookup_builtin("max").unwrap().arity, Arity::AtLeast(1));
        assert!(lookup_builtin("sqrt").is_none());
    }

    #[test]
    fn arity_bounds() {
        assert!(Arity::Range(1, 2).accepts(2));
        assert!(!Arity::Range(1, 2).accepts(3));
        assert!(!Arity::AtLeast(1).accepts(0));
        assert!(Arity::Exact(3).accepts(3));
    }

    #[test]
    fn names_are_unique() {
        for (i, a) in BUILTINS.iter().enumerate() {
            assert!(BUILTINS[i + 1..].iter().all(|b| b.name != a.name), "{}", a.name);
        }
    }
}
