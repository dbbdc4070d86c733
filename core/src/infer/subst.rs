//! Lowering: turn the mid-generation tree (`Expr<(IType<A>, A)>`, which
//! can still contain unresolved variables) into the final tree
//! (`Expr<(Type, A)>`, which structurally cannot) by reading each node's
//! union-find representative one last time.
//!
//! Resolution does not descend into a variable's accumulated field list
//! beyond one level: once a variable resolves to a known shape, that
//! shape's own fields are resolved too, but a field's own pending
//! constraints (if it is itself still a free variable, e.g. an
//! un-projected record field) surface as their own `InferenceError`
//! rather than being inlined into the parent's error payload. This
//! keeps each error anchored to the node whose type actually failed to
//! resolve.

use std::collections::HashMap;
use std::fmt::Debug;

use super::itype::{IShape, IType, TypeVarId};
use super::unionfind::UnionFindStore;
use crate::config::CheckConfig;
use crate::decl::{TypeDecl, TypeDecls};
use crate::error::{ErrorSink, TypeError};
use crate::expr::{Alt, Alts, Expr, Pattern};
use crate::ty::Type;

/// A snapshot of variable-id to representative descriptor, the
/// test-visible counterpart to the store lookups `resolve_type` performs
/// on demand. Entries whose variable points at its own class (still
/// unbound) are omitted, since substituting a variable for itself is a
/// no-op.
pub struct Substitutions<A> {
    map: HashMap<TypeVarId, IType<A>>,
}

impl<A: Clone> Substitutions<A> {
    pub fn build(store: &mut UnionFindStore<A>) -> Self {
        let mut map = HashMap::new();
        for id in store.known_vars() {
            let root = store.repr(id);
            if let Some(bound) = store.binding(root) {
                map.insert(id, bound);
            }
        }
        Substitutions { map }
    }

    /// Replace `Var` occurrences reachable through `shape` using this
    /// snapshot. Does not descend into a node's own field-constraint
    /// list — field constraints are resolved separately, by
    /// `validate_field_constraints`, not by substitution.
    pub fn apply(&self, ity: &IType<A>) -> IType<A> {
        let shape = match &ity.shape {
            IShape::Var(id) => match self.map.get(id) {
                Some(bound) => self.apply(bound).shape,
                None => IShape::Var(*id),
            },
            IShape::Lit(k) => IShape::Lit(*k),
            IShape::TypeRef(n) => IShape::TypeRef(n.clone()),
            IShape::Arrow(a, b) => IShape::Arrow(Box::new(self.apply(a)), Box::new(self.apply(b))),
            IShape::List(a) => IShape::List(Box::new(self.apply(a))),
        };
        IType {
            ann: ity.ann.clone(),
            shape,
            fields: ity.fields.clone(),
        }
    }
}

#[cfg(test)]
mod substitutions_tests {
    use super::*;
    use crate::names::TypeName;
    use proptest::prelude::*;

    #[test]
    fn idempotent_on_a_resolved_variable() {
        let mut store: UnionFindStore<u32> = UnionFindStore::new();
        let id = store.get_var_point(TypeVarId(0));
        store.bind(id, IType::type_ref(0, TypeName::new("Widget")));

        let subs = Substitutions::build(&mut store);
        let var = IType::var(TypeVarId(0), 0);

        let once = subs.apply(&var);
        let twice = subs.apply(&once);
        assert_eq!(format!("{:?}", once.shape), format!("{:?}", twice.shape));
    }

    proptest! {
        /// Applying a built snapshot twice in a row never changes the
        /// result further: a chain of n bound variables resolves to the
        /// same shape whether `apply` is run once or twice.
        #[test]
        fn apply_is_idempotent_over_arbitrary_bind_chains(len in 1usize..8) {
            let mut store: UnionFindStore<u32> = UnionFindStore::new();
            for i in 0..len as u32 {
                let id = store.get_var_point(TypeVarId(i));
                if i + 1 < len as u32 {
                    store.bind(id, IType::var(TypeVarId(i + 1), 0));
                } else {
                    store.bind(id, IType::lit(0, crate::literal::LitKind::Int));
                }
            }
            let subs = Substitutions::build(&mut store);
            let head = IType::var(TypeVarId(0), 0);
            let once = subs.apply(&head);
            let twice = subs.apply(&once);
            prop_assert_eq!(format!("{:?}", once.shape), format!("{:?}", twice.shape));
        }
    }
}

/// Resolve one inference type to its final surface form, reporting
/// `InferenceError`/`RecordInferenceError` for anything left unbound.
pub fn resolve_type<A: Clone + Debug>(
    store: &mut UnionFindStore<A>,
    sink: &mut ErrorSink<A>,
    ann: &A,
    ity: &IType<A>,
) -> Type {
    let resolved = match &ity.shape {
        IShape::Lit(k) => Some(Type::Lit(*k)),
        IShape::TypeRef(n) => Some(Type::Var(n.clone())),
        IShape::Arrow(a, b) => Some(Type::arrow(
            resolve_type(store, sink, ann, a),
            resolve_type(store, sink, ann, b),
        )),
        IShape::List(a) => Some(Type::list(resolve_type(store, sink, ann, a))),
        IShape::Var(id) => {
            let root = store.repr(*id);
            store
                .binding(root)
                .map(|bound| resolve_type(store, sink, ann, &bound))
        }
    };

    match resolved {
        Some(ty) => ty,
        None => {
            let pending: Vec<_> = match &ity.shape {
                IShape::Var(id) => {
                    let root = store.repr(*id);
                    store
                        .pending_fields(root)
                        .into_iter()
                        .map(|(f, t)| (f, (resolve_type(store, sink, ann, &t), ann.clone())))
                        .collect()
                }
                _ => Vec::new(),
            };

            if pending.is_empty() {
                sink.push(TypeError::InferenceError(ann.clone()));
            } else {
                sink.push(TypeError::RecordInferenceError {
                    ann: ann.clone(),
                    fields: pending,
                });
            }
            // Dummy placeholder; the caller's `sink` already carries the
            // error that makes this value unobservable through a
            // successful `CheckResult`.
            Type::Var(crate::names::TypeName::new("<unresolved>"))
        }
    }
}

pub fn lower_expr<A: Clone + Debug>(
    store: &mut UnionFindStore<A>,
    sink: &mut ErrorSink<A>,
    expr: &Expr<(IType<A>, A)>,
) -> Expr<(Type, A)> {
    match expr {
        Expr::Lit((ity, ann), v) => {
            let ty = resolve_type(store, sink, ann, ity);
            Expr::Lit((ty, ann.clone()), v.clone())
        }
        Expr::Var((ity, ann), name) => {
            let ty = resolve_type(store, sink, ann, ity);
            Expr::Var((ty, ann.clone()), name.clone())
        }
        Expr::Lam((ity, ann), param, annot, body) => {
            let ty = resolve_type(store, sink, ann, ity);
            let body2 = lower_expr(store, sink, body);
            Expr::Lam((ty, ann.clone()), param.clone(), annot.clone(), Box::new(body2))
        }
        Expr::App((ity, ann), f, x) => {
            let ty = resolve_type(store, sink, ann, ity);
            let f2 = lower_expr(store, sink, f);
            let x2 = lower_expr(store, sink, x);
            Expr::App((ty, ann.clone()), Box::new(f2), Box::new(x2))
        }
        Expr::List((ity, ann), elem_annot, elems) => {
            let ty = resolve_type(store, sink, ann, ity);
            let elems2 = elems.iter().map(|e| lower_expr(store, sink, e)).collect();
            Expr::List((ty, ann.clone()), elem_annot.clone(), elems2)
        }
        Expr::Map((ity, ann), f, list) => {
            let ty = resolve_type(store, sink, ann, ity);
            let f2 = lower_expr(store, sink, f);
            let list2 = lower_expr(store, sink, list);
            Expr::Map((ty, ann.clone()), Box::new(f2), Box::new(list2))
        }
        Expr::Con((ity, ann), ctor, type_name, args) => {
            let ty = resolve_type(store, sink, ann, ity);
            let args2 = args.iter().map(|a| lower_expr(store, sink, a)).collect();
            Expr::Con((ty, ann.clone()), ctor.clone(), type_name.clone(), args2)
        }
        Expr::Case((ity, ann), scrutinee, alts) => {
            let ty = resolve_type(store, sink, ann, ity);
            let scrutinee2 = lower_expr(store, sink, scrutinee);
            let alts2: Vec<_> = alts
                .iter()
                .map(|alt| Alt {
                    pattern: lower_pattern(store, sink, &alt.pattern),
                    body: lower_expr(store, sink, &alt.body),
                })
                .collect();
            let alts2 = Alts::from_vec(alts2).expect("case alternatives are non-empty");
            Expr::Case((ty, ann.clone()), Box::new(scrutinee2), alts2)
        }
        Expr::Prj((ity, ann), base, field) => {
            let ty = resolve_type(store, sink, ann, ity);
            let base2 = lower_expr(store, sink, base);
            Expr::Prj((ty, ann.clone()), Box::new(base2), field.clone())
        }
        Expr::Foreign((ity, ann), name, surface_ty) => {
            let ty = resolve_type(store, sink, ann, ity);
            Expr::Foreign((ty, ann.clone()), name.clone(), surface_ty.clone())
        }
    }
}

fn lower_pattern<A: Clone + Debug>(
    store: &mut UnionFindStore<A>,
    sink: &mut ErrorSink<A>,
    pattern: &Pattern<(IType<A>, A)>,
) -> Pattern<(Type, A)> {
    match pattern {
        Pattern::Var((ity, ann), name) => {
            let ty = resolve_type(store, sink, ann, ity);
            Pattern::Var((ty, ann.clone()), name.clone())
        }
        Pattern::Con((ity, ann), ctor, subpats) => {
            let ty = resolve_type(store, sink, ann, ity);
            let subpats2 = subpats
                .iter()
                .map(|p| lower_pattern(store, sink, p))
                .collect();
            Pattern::Con((ty, ann.clone()), ctor.clone(), subpats2)
        }
    }
}

/// Final sweep over every resolved type the store ever produced: check
/// that whatever field constraints accumulated on a `TypeRef` binding are
/// satisfied by that type's declared record fields, and that no field
/// constraint ever landed on a shape that can't carry fields at all.
pub fn validate_field_constraints<A: Clone + Debug>(
    store: &mut UnionFindStore<A>,
    decls: &TypeDecls,
    config: &CheckConfig,
    sink: &mut ErrorSink<A>,
) {
    // `max_errors` bounds only errors raised by this sweep, not whatever
    // generation already pushed onto `sink` before solving started.
    let baseline = sink.len();

    for (_, bound) in store.bound_values() {
        if let Some(max) = config.max_errors {
            if sink.len() - baseline >= max {
                break;
            }
        }

        if bound.fields.is_empty() {
            continue;
        }

        match &bound.shape {
            IShape::TypeRef(name) => match decls.lookup(name) {
                Some(TypeDecl::Record(decl_fields)) => {
                    for (field_name, field_ity) in &bound.fields {
                        match decl_fields.iter().find(|(n, _)| n == field_name) {
                            Some((_, decl_ty)) => {
                                let declared = IType::from_surface(&bound.ann, decl_ty);
                                super::unify::mgu(store, sink, &declared, field_ity);
                            }
                            None if config.permissive_record_fields => {}
                            None => {
                                let ty = resolve_type(store, sink, &bound.ann, &bound);
                                let fields = bound
                                    .fields
                                    .iter()
                                    .map(|(n, t)| {
                                        (n.clone(), (resolve_type(store, sink, &bound.ann, t), bound.ann.clone()))
                                    })
                                    .collect();
                                sink.push(TypeError::InvalidRecordFields {
                                    ty: (ty, bound.ann.clone()),
                                    ann: bound.ann.clone(),
                                    fields,
                                });
                                break;
                            }
                        }
                    }
                }
                _ => {
                    let ty = resolve_type(store, sink, &bound.ann, &bound);
                    let fields = bound
                        .fields
                        .iter()
                        .map(|(n, t)| (n.clone(), (resolve_type(store, sink, &bound.ann, t), bound.ann.clone())))
                        .collect();
                    sink.push(TypeError::InvalidRecordFields {
                        ty: (ty, bound.ann.clone()),
                        ann: bound.ann.clone(),
                        fields,
                    });
                }
            },
            _ => {
                let ty = resolve_type(store, sink, &bound.ann, &bound);
                let fields = bound
                    .fields
                    .iter()
                    .map(|(n, t)| (n.clone(), (resolve_type(store, sink, &bound.ann, t), bound.ann.clone())))
                    .collect();
                sink.push(TypeError::InvalidRecordFields {
                    ty: (ty, bound.ann.clone()),
                    ann: bound.ann.clone(),
                    fields,
                });
            }
        }
    }
}
