//! Ground literal kinds.
//!
//! Monomorphised to the closed set a template language's embedded
//! expressions actually need, rather than threading another type
//! parameter through every type in the crate.

use std::fmt;

/// A literal's type, with equality as required for unification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LitKind {
    Int,
    Float,
    Str,
    Bool,
}

impl fmt::Display for LitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LitKind::Int => "int",
            LitKind::Float => "float",
            LitKind::Str => "string",
            LitKind::Bool => "bool",
        };
        write!(f, "{s}")
    }
}

/// A literal value as it appears in source.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LitValue {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

impl LitValue {
    pub fn kind(&self) -> LitKind {
        match self {
            LitValue::Int(_) => LitKind::Int,
            LitValue::Float(_) => LitKind::Float,
            LitValue::Str(_) => LitKind::Str,
            LitValue::Bool(_) => LitKind::Bool,
        }
    }
}
