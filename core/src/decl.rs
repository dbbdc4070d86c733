//! Declared type environment: variants and records, plus the reverse
//! constructor-name lookup the generator needs for `ECon`/`PCon`.

use std::collections::HashMap;

use crate::names::{ConstructorName, FieldName, TypeName};
use crate::ty::Type;

/// A single declared type: either a sum of constructors or a record of fields.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeDecl {
    Variant(Vec<(ConstructorName, Vec<Type>)>),
    Record(Vec<(FieldName, Type)>),
}

impl TypeDecl {
    pub fn constructor_names(&self) -> Vec<ConstructorName> {
        match self {
            TypeDecl::Variant(ctors) => ctors.iter().map(|(c, _)| c.clone()).collect(),
            TypeDecl::Record(_) => Vec::new(),
        }
    }
}

/// All declared types in a check session, with a reverse index from
/// constructor name to its owning type and declared argument types.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeDecls {
    decls: HashMap<TypeName, TypeDecl>,
    #[cfg_attr(feature = "serde", serde(skip))]
    ctor_index: HashMap<ConstructorName, (TypeName, Vec<Type>)>,
}

impl TypeDecls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_variant(&mut self, name: TypeName, ctors: Vec<(ConstructorName, Vec<Type>)>) {
        for (ctor, args) in &ctors {
            self.ctor_index
                .insert(ctor.clone(), (name.clone(), args.clone()));
        }
        self.decls.insert(name, TypeDecl::Variant(ctors));
    }

    pub fn insert_record(&mut self, name: TypeName, fields: Vec<(FieldName, Type)>) {
        self.decls.insert(name, TypeDecl::Record(fields));
    }

    /// Rebuild the constructor index. Needed after deserializing a
    /// `TypeDecls` value whose index was not carried over the wire.
    pub fn reindex(&mut self) {
        self.ctor_index.clear();
        for (name, decl) in &self.decls {
            if let TypeDecl::Variant(ctors) = decl {
                for (ctor, args) in ctors {
                    self.ctor_index
                        .insert(ctor.clone(), (name.clone(), args.clone()));
                }
            }
        }
    }

    pub fn lookup(&self, name: &TypeName) -> Option<&TypeDecl> {
        self.decls.get(name)
    }

    pub fn lookup_constructor(&self, ctor: &ConstructorName) -> Option<&(TypeName, Vec<Type>)> {
        self.ctor_index.get(ctor)
    }

    pub fn type_names(&self) -> impl Iterator<Item = &TypeName> {
        self.decls.keys()
    }
}
