//! Type inference and checking core for a template language: row-style
//! field constraints over a Hindley-Milner skeleton, union-find
//! unification, and an incremental batch driver for mutually recursive
//! top-level definitions.
//!
//! This crate has no I/O and no knowledge of source syntax — it consumes
//! an already-parsed `Expr<A>` tree (the parser/elaborator is an external
//! collaborator's job) and produces either a fully typed tree or a flat,
//! accumulated list of `TypeError<A>`.

pub mod config;
pub mod decl;
pub mod error;
pub mod expr;
pub mod infer;
pub mod literal;
pub mod names;
pub mod ty;

pub use config::CheckConfig;
pub use decl::{TypeDecl, TypeDecls};
pub use error::{CheckResult, TypeError};
pub use expr::{Alt, Alts, Expr, Pattern};
pub use infer::driver::{type_check, type_check_all, type_check_incremental, type_tree};
pub use literal::{LitKind, LitValue};
pub use names::{ConstructorName, FieldName, Name, TypeName};
pub use ty::Type;
