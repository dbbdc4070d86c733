//! The inference-time type: either an unresolved variable or a known
//! shape, with a list of field constraints attached to *either* case.
//!
//! This is the one recursive type the rest of the `infer` module is
//! built around.

use crate::literal::LitKind;
use crate::names::{FieldName, TypeName};

/// A fresh, session-unique identity for an unresolved type variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeVarId(pub u32);

/// The outer shape of an inference type: either still an unresolved
/// variable, or one of the surface type constructors applied recursively
/// to further `IType`s.
#[derive(Debug)]
pub enum IShape<A> {
    Var(TypeVarId),
    Lit(LitKind),
    TypeRef(TypeName),
    Arrow(Box<IType<A>>, Box<IType<A>>),
    List(Box<IType<A>>),
}

impl<A: Clone> Clone for IShape<A> {
    fn clone(&self) -> Self {
        match self {
            IShape::Var(id) => IShape::Var(*id),
            IShape::Lit(k) => IShape::Lit(*k),
            IShape::TypeRef(n) => IShape::TypeRef(n.clone()),
            IShape::Arrow(a, b) => IShape::Arrow(a.clone(), b.clone()),
            IShape::List(a) => IShape::List(a.clone()),
        }
    }
}

/// An inference-time type: a shape plus the source annotation of the node
/// that produced it, plus whatever field constraints have accumulated on
/// it ("this type must have these fields of these types").
#[derive(Debug)]
pub struct IType<A> {
    pub ann: A,
    pub shape: IShape<A>,
    pub fields: Vec<(FieldName, IType<A>)>,
}

impl<A: Clone> Clone for IType<A> {
    fn clone(&self) -> Self {
        IType {
            ann: self.ann.clone(),
            shape: self.shape.clone(),
            fields: self.fields.clone(),
        }
    }
}

impl<A> IType<A> {
    pub fn new(ann: A, shape: IShape<A>) -> Self {
        IType {
            ann,
            shape,
            fields: Vec::new(),
        }
    }

    pub fn with_fields(mut self, fields: Vec<(FieldName, IType<A>)>) -> Self {
        self.fields = fields;
        self
    }

    pub fn var(id: TypeVarId, ann: A) -> Self {
        IType::new(ann, IShape::Var(id))
    }

    pub fn lit(ann: A, kind: LitKind) -> Self {
        IType::new(ann, IShape::Lit(kind))
    }

    pub fn type_ref(ann: A, name: TypeName) -> Self {
        IType::new(ann, IShape::TypeRef(name))
    }

    pub fn arrow(ann: A, from: IType<A>, to: IType<A>) -> Self {
        IType::new(ann, IShape::Arrow(Box::new(from), Box::new(to)))
    }

    pub fn list(ann: A, elem: IType<A>) -> Self {
        IType::new(ann, IShape::List(Box::new(elem)))
    }

    pub fn as_var(&self) -> Option<TypeVarId> {
        match &self.shape {
            IShape::Var(id) => Some(*id),
            _ => None,
        }
    }
}

impl<A: Clone> IType<A> {
    /// Lift a fully-resolved surface type into the inference domain, for
    /// explicit lambda-binder and `EForeign` annotations.
    pub fn from_surface(ann: &A, ty: &crate::ty::Type) -> Self {
        use crate::ty::Type;
        match ty {
            Type::Lit(k) => IType::lit(ann.clone(), *k),
            Type::Var(n) => IType::type_ref(ann.clone(), n.clone()),
            Type::Arrow(a, b) => IType::arrow(
                ann.clone(),
                IType::from_surface(ann, a),
                IType::from_surface(ann, b),
            ),
            Type::List(a) => IType::list(ann.clone(), IType::from_surface(ann, a)),
        }
    }
}
