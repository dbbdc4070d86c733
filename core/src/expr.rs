//! Expression and pattern trees, generic over the annotation carried at
//! every node. The same generic shape is reused for every stage: the input
//! tree is `Expr<A>`, the tree mid-generation is `Expr<(IType<A>, A)>`, and
//! the final typed tree is `Expr<(Type, A)>` — no separate "annotated"
//! type is needed, only a different instantiation of `A`.

use crate::literal::LitValue;
use crate::names::{ConstructorName, FieldName, Name, TypeName};
use crate::ty::Type;

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Pattern<A> {
    Var(A, Name),
    Con(A, ConstructorName, Vec<Pattern<A>>),
}

impl<A: Clone> Pattern<A> {
    pub fn ann(&self) -> A {
        match self {
            Pattern::Var(a, _) | Pattern::Con(a, _, _) => a.clone(),
        }
    }
}

/// One arm of a `case`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Alt<A> {
    pub pattern: Pattern<A>,
    pub body: Expr<A>,
}

/// A non-empty list of case alternatives.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Alts<A>(Vec<Alt<A>>);

impl<A> Alts<A> {
    pub fn new(first: Alt<A>, rest: Vec<Alt<A>>) -> Self {
        let mut v = Vec::with_capacity(rest.len() + 1);
        v.push(first);
        v.extend(rest);
        Alts(v)
    }

    /// Returns `None` for an empty vector — alts must be non-empty per the
    /// data model; this is the only constructor that can fail that check.
    pub fn from_vec(v: Vec<Alt<A>>) -> Option<Self> {
        if v.is_empty() {
            None
        } else {
            Some(Alts(v))
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Alt<A>> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl<A> IntoIterator for Alts<A> {
    type Item = Alt<A>;
    type IntoIter = std::vec::IntoIter<Alt<A>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Expr<A> {
    Lit(A, LitValue),
    Var(A, Name),
    Lam(A, Name, Option<Type>, Box<Expr<A>>),
    App(A, Box<Expr<A>>, Box<Expr<A>>),
    List(A, Type, Vec<Expr<A>>),
    Map(A, Box<Expr<A>>, Box<Expr<A>>),
    Con(A, ConstructorName, TypeName, Vec<Expr<A>>),
    Case(A, Box<Expr<A>>, Alts<A>),
    Prj(A, Box<Expr<A>>, FieldName),
    Foreign(A, Name, Type),
}

impl<A: Clone> Expr<A> {
    pub fn ann(&self) -> A {
        match self {
            Expr::Lit(a, _)
            | Expr::Var(a, _)
            | Expr::Lam(a, _, _, _)
            | Expr::App(a, _, _)
            | Expr::List(a, _, _)
            | Expr::Map(a, _, _)
            | Expr::Con(a, _, _, _)
            | Expr::Case(a, _, _)
            | Expr::Prj(a, _, _)
            | Expr::Foreign(a, _, _) => a.clone(),
        }
    }
}
