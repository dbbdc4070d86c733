//! The type-error taxonomy and an accumulating sink: errors are
//! collected as they're found rather than short-circuiting the first
//! one, and only turned into a `Result` at the boundary.

use thiserror::Error;

use crate::decl::TypeDecl;
use crate::infer::itype::IType;
use crate::names::{ConstructorName, FieldName, Name, TypeName};
use crate::ty::Type;

/// A type carried alongside the original source annotation, as produced
/// by lowering — used inside error payloads that need to show a
/// resolved-as-far-as-possible type at a source location.
pub type AnnotatedType<A> = (Type, A);

#[derive(Debug, Error)]
pub enum TypeError<A: std::fmt::Debug> {
    #[error("cannot unify {t1:?} (at {a1:?}) with {t2:?} (at {a2:?})")]
    Unification {
        t1: IType<A>,
        a1: A,
        t2: IType<A>,
        a2: A,
    },

    #[error("infinite type: variable at {var_ann:?} occurs in {ty:?} (at {ty_ann:?})")]
    InfiniteType {
        var_ann: A,
        ty: IType<A>,
        ty_ann: A,
    },

    #[error("free variable '{0}' at {1:?}")]
    FreeVariable(Name, A),

    #[error("undeclared type '{0}' at {1:?}")]
    UndeclaredType(TypeName, A),

    #[error("'{ctor}' is not a constructor of '{type_name}' at {ann:?}")]
    BadConstructorName {
        ctor: ConstructorName,
        type_name: TypeName,
        decl: TypeDecl,
        ann: A,
    },

    #[error("constructor '{ctor}' expects {expected} argument(s), got {actual} at {ann:?}")]
    BadConstructorArity {
        ctor: ConstructorName,
        expected: usize,
        actual: usize,
        ann: A,
    },

    #[error("pattern for '{ctor}' of type {owner} expects {expected} argument(s), got {actual} at {ann:?}")]
    BadPatternArity {
        ctor: ConstructorName,
        owner: Type,
        expected: usize,
        actual: usize,
        ann: A,
    },

    #[error("'{0}' is not a pattern constructor at {1:?}")]
    BadPatternConstructor(ConstructorName, A),

    #[error("could not infer a concrete type at {0:?}")]
    InferenceError(A),

    #[error("could not infer a concrete type at {ann:?}; stuck on fields {fields:?}")]
    RecordInferenceError {
        ann: A,
        fields: Vec<(FieldName, AnnotatedType<A>)>,
    },

    #[error("type {ty:?} (at {ann:?}) cannot have fields {fields:?}")]
    InvalidRecordFields {
        ty: AnnotatedType<A>,
        ann: A,
        fields: Vec<(FieldName, AnnotatedType<A>)>,
    },
}

// Manual impls: thiserror's derive would otherwise require `A: Clone + PartialEq`
// for a blanket derive, which is not always what callers want to carry.
impl<A: std::fmt::Debug + Clone> Clone for TypeError<A> {
    fn clone(&self) -> Self {
        match self {
            TypeError::Unification { t1, a1, t2, a2 } => TypeError::Unification {
                t1: t1.clone(),
                a1: a1.clone(),
                t2: t2.clone(),
                a2: a2.clone(),
            },
            TypeError::InfiniteType {
                var_ann,
                ty,
                ty_ann,
            } => TypeError::InfiniteType {
                var_ann: var_ann.clone(),
                ty: ty.clone(),
                ty_ann: ty_ann.clone(),
            },
            TypeError::FreeVariable(n, a) => TypeError::FreeVariable(n.clone(), a.clone()),
            TypeError::UndeclaredType(n, a) => TypeError::UndeclaredType(n.clone(), a.clone()),
            TypeError::BadConstructorName {
                ctor,
                type_name,
                decl,
                ann,
            } => TypeError::BadConstructorName {
                ctor: ctor.clone(),
                type_name: type_name.clone(),
                decl: decl.clone(),
                ann: ann.clone(),
            },
            TypeError::BadConstructorArity {
                ctor,
                expected,
                actual,
                ann,
            } => TypeError::BadConstructorArity {
                ctor: ctor.clone(),
                expected: *expected,
                actual: *actual,
                ann: ann.clone(),
            },
            TypeError::BadPatternArity {
                ctor,
                owner,
                expected,
                actual,
                ann,
            } => TypeError::BadPatternArity {
                ctor: ctor.clone(),
                owner: owner.clone(),
                expected: *expected,
                actual: *actual,
                ann: ann.clone(),
            },
            TypeError::BadPatternConstructor(c, a) => {
                TypeError::BadPatternConstructor(c.clone(), a.clone())
            }
            TypeError::InferenceError(a) => TypeError::InferenceError(a.clone()),
            TypeError::RecordInferenceError { ann, fields } => TypeError::RecordInferenceError {
                ann: ann.clone(),
                fields: fields.clone(),
            },
            TypeError::InvalidRecordFields { ty, ann, fields } => {
                TypeError::InvalidRecordFields {
                    ty: ty.clone(),
                    ann: ann.clone(),
                    fields: fields.clone(),
                }
            }
        }
    }
}

/// Accumulates errors during generation and solving across a whole
/// batch without short-circuiting on the first one.
#[derive(Debug, Default)]
pub struct ErrorSink<A: std::fmt::Debug> {
    errors: Vec<TypeError<A>>,
}

impl<A: std::fmt::Debug> ErrorSink<A> {
    pub fn new() -> Self {
        ErrorSink { errors: Vec::new() }
    }

    pub fn push(&mut self, err: TypeError<A>) {
        self.errors.push(err);
    }

    pub fn extend(&mut self, errs: impl IntoIterator<Item = TypeError<A>>) {
        self.errors.extend(errs);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_vec(self) -> Vec<TypeError<A>> {
        self.errors
    }

    pub fn into_result<T>(self, value: T) -> Result<T, Vec<TypeError<A>>> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self.errors)
        }
    }
}

/// The crate-wide result alias: the external entry points return either
/// a value or the full accumulated error list.
pub type CheckResult<T, A> = Result<T, Vec<TypeError<A>>>;
