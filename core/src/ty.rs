//! Surface types: the result of a successful check, and the type ascribed
//! to a lambda binder or an explicit list/foreign annotation.

use std::fmt;

use crate::literal::LitKind;
use crate::names::TypeName;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Type {
    Lit(LitKind),
    Var(TypeName),
    Arrow(Box<Type>, Box<Type>),
    List(Box<Type>),
}

impl Type {
    pub fn arrow(from: Type, to: Type) -> Type {
        Type::Arrow(Box::new(from), Box::new(to))
    }

    pub fn list(elem: Type) -> Type {
        Type::List(Box::new(elem))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Lit(k) => write!(f, "{k}"),
            Type::Var(n) => write!(f, "{n}"),
            Type::Arrow(a, b) => write!(f, "({a} -> {b})"),
            Type::List(a) => write!(f, "[{a}]"),
        }
    }
}
