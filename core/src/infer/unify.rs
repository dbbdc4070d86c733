//! Most general unifier over inference types, plus the field-constraint
//! bookkeeping that keeps row-style record requirements attached to a
//! variable's union-find class until it resolves to a known shape.
//!
//! Top-level dispatch in `mgu` always matches on the raw shapes of its
//! two arguments; it never pre-resolves a variable to its current
//! binding before matching. Only the `Var` arms read a representative,
//! and they do so by delegating to `unify_var`, which is the one place
//! that inspects what a variable's class is currently bound to.

use std::fmt::Debug;

use super::itype::{IShape, IType, TypeVarId};
use super::unionfind::{Point, UnionFindStore};
use crate::error::{ErrorSink, TypeError};
use crate::names::FieldName;

pub fn mgu<A: Clone + Debug>(
    store: &mut UnionFindStore<A>,
    sink: &mut ErrorSink<A>,
    t1: &IType<A>,
    t2: &IType<A>,
) {
    match (&t1.shape, &t2.shape) {
        (IShape::Var(id1), IShape::Var(id2)) => unify_vars(store, sink, *id1, t1, *id2, t2),
        (IShape::Var(id), _) => unify_var(store, sink, *id, t1, t2),
        (_, IShape::Var(id)) => unify_var(store, sink, *id, t2, t1),

        (IShape::Lit(k1), IShape::Lit(k2)) => {
            if k1 != k2 {
                mismatch(sink, t1, t2);
                return;
            }
            unify_fields(store, sink, t1, t2);
        }

        (IShape::TypeRef(n1), IShape::TypeRef(n2)) => {
            if n1 != n2 {
                mismatch(sink, t1, t2);
                return;
            }
            unify_fields(store, sink, t1, t2);
        }

        (IShape::Arrow(a1, b1), IShape::Arrow(a2, b2)) => {
            mgu(store, sink, a1, a2);
            mgu(store, sink, b1, b2);
            unify_fields(store, sink, t1, t2);
        }

        (IShape::List(a1), IShape::List(a2)) => {
            mgu(store, sink, a1, a2);
            unify_fields(store, sink, t1, t2);
        }

        _ => mismatch(sink, t1, t2),
    }
}

fn mismatch<A: Clone + Debug>(sink: &mut ErrorSink<A>, t1: &IType<A>, t2: &IType<A>) {
    sink.push(TypeError::Unification {
        t1: t1.clone(),
        a1: t1.ann.clone(),
        t2: t2.clone(),
        a2: t2.ann.clone(),
    });
}

/// Unify the field lists of two already-matched known shapes: common
/// field names must agree on type, field names unique to either side
/// simply carry over (the row is open, per the permissive default).
/// Neither side is a variable, so nothing needs to persist in the
/// union-find store — each occurrence of a concrete shape already owns
/// its own field list.
fn unify_fields<A: Clone + Debug>(
    store: &mut UnionFindStore<A>,
    sink: &mut ErrorSink<A>,
    t1: &IType<A>,
    t2: &IType<A>,
) {
    for (name, ty1) in &t1.fields {
        if let Some((_, ty2)) = t2.fields.iter().find(|(n, _)| n == name) {
            mgu(store, sink, ty1, ty2);
        }
    }
}

/// Fold `extra` field requirements into `fields`, unifying on overlap
/// and appending what's new.
fn fold_fields<A: Clone + Debug>(
    store: &mut UnionFindStore<A>,
    sink: &mut ErrorSink<A>,
    fields: &mut Vec<(FieldName, IType<A>)>,
    extra: Vec<(FieldName, IType<A>)>,
) {
    for (name, ty) in extra {
        if let Some((_, existing)) = fields.iter().find(|(n, _)| *n == name) {
            let existing = existing.clone();
            mgu(store, sink, &existing, &ty);
        } else {
            fields.push((name, ty));
        }
    }
}

/// Whether `var` occurs free in `ty`, looking through at most one level
/// of existing binding per variable encountered. Safe to recurse this
/// way because `store.repr` already path-compresses to a single
/// canonical root — there is no unbounded chain to walk, and the binding
/// graph itself is acyclic as long as every prior `bind`/`union` call
/// went through this same check.
fn occurs<A: Clone>(store: &mut UnionFindStore<A>, var: TypeVarId, ty: &IType<A>) -> bool {
    let fields_occur = |store: &mut UnionFindStore<A>, fields: &[(FieldName, IType<A>)]| {
        fields.iter().any(|(_, ft)| occurs(store, var, ft))
    };

    match &ty.shape {
        IShape::Var(id) => {
            if store.repr(var) == store.repr(*id) {
                return true;
            }
            let bound = store.binding(store.repr(*id));
            if let Some(bound) = bound {
                if occurs(store, var, &bound) {
                    return true;
                }
            }
            fields_occur(store, &ty.fields)
        }
        IShape::Lit(_) | IShape::TypeRef(_) => fields_occur(store, &ty.fields),
        IShape::Arrow(a, b) => {
            occurs(store, var, a) || occurs(store, var, b) || fields_occur(store, &ty.fields)
        }
        IShape::List(a) => occurs(store, var, a) || fields_occur(store, &ty.fields),
    }
}

/// Unify a variable occurrence (`var`, carrying `var_ty`'s local field
/// list) against a non-variable type `other`.
fn unify_var<A: Clone + Debug>(
    store: &mut UnionFindStore<A>,
    sink: &mut ErrorSink<A>,
    var: TypeVarId,
    var_ty: &IType<A>,
    other: &IType<A>,
) {
    let point = store.get_var_point(var);
    let root = store.find(point);

    match store.binding(root) {
        Some(bound) => {
            mgu(store, sink, &bound, other);
            unify_fields(store, sink, var_ty, other);
        }
        None => {
            if occurs(store, var, other) {
                sink.push(TypeError::InfiniteType {
                    var_ann: var_ty.ann.clone(),
                    ty: other.clone(),
                    ty_ann: other.ann.clone(),
                });
                return;
            }
            let mut bound = other.clone();
            let pending = store.take_pending_fields(root);
            fold_fields(store, sink, &mut bound.fields, pending);
            fold_fields(store, sink, &mut bound.fields, var_ty.fields.clone());
            store.bind(point, bound);
        }
    }
}

/// Unify two distinct variable occurrences against each other, merging
/// their classes.
fn unify_vars<A: Clone + Debug>(
    store: &mut UnionFindStore<A>,
    sink: &mut ErrorSink<A>,
    id1: TypeVarId,
    t1: &IType<A>,
    id2: TypeVarId,
    t2: &IType<A>,
) {
    let p1 = store.get_var_point(id1);
    let p2 = store.get_var_point(id2);
    let r1 = store.find(p1);
    let r2 = store.find(p2);

    if r1 == r2 {
        merge_occurrence_fields(store, sink, r1, t1);
        merge_occurrence_fields(store, sink, r1, t2);
        return;
    }

    let bound1 = store.binding(r1);
    let bound2 = store.binding(r2);

    if let Some(b1) = &bound1 {
        if occurs(store, id2, b1) {
            sink.push(TypeError::InfiniteType {
                var_ann: t2.ann.clone(),
                ty: b1.clone(),
                ty_ann: b1.ann.clone(),
            });
            return;
        }
    }
    if let Some(b2) = &bound2 {
        if occurs(store, id1, b2) {
            sink.push(TypeError::InfiniteType {
                var_ann: t1.ann.clone(),
                ty: b2.clone(),
                ty_ann: b2.ann.clone(),
            });
            return;
        }
    }

    let mut pending = store.pending_fields(r1);
    let pending2 = store.pending_fields(r2);
    fold_fields(store, sink, &mut pending, pending2);

    store.union(p1, p2);
    let new_root = store.find(p1);

    if let (Some(b1), Some(b2)) = (&bound1, &bound2) {
        mgu(store, sink, b1, b2);
    }

    match store.binding(new_root) {
        Some(mut bound) => {
            fold_fields(store, sink, &mut bound.fields, pending);
            store.rebind(new_root, bound);
        }
        None => store.set_pending_fields(new_root, pending),
    }

    merge_occurrence_fields(store, sink, new_root, t1);
    merge_occurrence_fields(store, sink, new_root, t2);
}

/// Record one occurrence's local field list against the class at `root`,
/// the same way `unify_var`'s unbound case does: fold into the bound
/// value if there is one, otherwise into the pending set.
fn merge_occurrence_fields<A: Clone + Debug>(
    store: &mut UnionFindStore<A>,
    sink: &mut ErrorSink<A>,
    root: Point,
    occurrence: &IType<A>,
) {
    if occurrence.fields.is_empty() {
        return;
    }
    match store.binding(root) {
        Some(mut bound) => {
            fold_fields(store, sink, &mut bound.fields, occurrence.fields.clone());
            store.rebind(root, bound);
        }
        None => {
            let mut pending = store.pending_fields(root);
            fold_fields(store, sink, &mut pending, occurrence.fields.clone());
            store.set_pending_fields(root, pending);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literal::LitKind;
    use crate::names::TypeName;

    fn fresh(store: &mut UnionFindStore<u32>, supply: &mut super::super::ivar::NameSupply, ann: u32) -> IType<u32> {
        supply.fresh_var(ann)
    }

    #[test]
    fn unifies_two_literals_of_the_same_kind() {
        let mut store = UnionFindStore::new();
        let mut sink = ErrorSink::new();
        let t1 = IType::lit(0u32, LitKind::Int);
        let t2 = IType::lit(1u32, LitKind::Int);
        mgu(&mut store, &mut sink, &t1, &t2);
        assert!(!sink.has_errors());
    }

    #[test]
    fn rejects_mismatched_literals() {
        let mut store = UnionFindStore::new();
        let mut sink = ErrorSink::new();
        let t1 = IType::lit(0u32, LitKind::Int);
        let t2 = IType::lit(1u32, LitKind::Str);
        mgu(&mut store, &mut sink, &t1, &t2);
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn binds_a_variable_to_a_concrete_type() {
        let mut store = UnionFindStore::new();
        let mut supply = super::super::ivar::NameSupply::new();
        let mut sink = ErrorSink::new();

        let v = fresh(&mut store, &mut supply, 0);
        let concrete = IType::lit(1u32, LitKind::Bool);
        mgu(&mut store, &mut sink, &v, &concrete);

        let id = v.as_var().unwrap();
        let root = store.repr(id);
        let bound = store.binding(root).unwrap();
        assert!(matches!(bound.shape, IShape::Lit(LitKind::Bool)));
        assert!(!sink.has_errors());
    }

    #[test]
    fn detects_an_infinite_type() {
        let mut store = UnionFindStore::new();
        let mut supply = super::super::ivar::NameSupply::new();
        let mut sink = ErrorSink::new();

        let v = fresh(&mut store, &mut supply, 0);
        let id = v.as_var().unwrap();
        let cyclic = IType::list(1u32, v.clone());

        mgu(&mut store, &mut sink, &v, &cyclic);
        assert_eq!(sink.len(), 1);
        assert!(matches!(
            sink.into_vec().as_slice(),
            [TypeError::InfiniteType { .. }]
        ));
        let _ = id;
    }

    #[test]
    fn detects_an_infinite_type_reached_through_a_bound_variable() {
        // id0 is bound to List(Var(id1)) first; unifying Var(id0) with
        // Var(id1) directly must not silently merge the two classes into
        // a self-referential binding.
        let mut store = UnionFindStore::new();
        let mut supply = super::super::ivar::NameSupply::new();
        let mut sink = ErrorSink::new();

        let v0 = fresh(&mut store, &mut supply, 0);
        let v1 = fresh(&mut store, &mut supply, 1);
        let id1 = v1.as_var().unwrap();

        let list_of_v1 = IType::list(2u32, v1.clone());
        mgu(&mut store, &mut sink, &v0, &list_of_v1);
        assert!(!sink.has_errors());

        mgu(&mut store, &mut sink, &v0, &v1);
        assert_eq!(sink.len(), 1);
        assert!(matches!(
            sink.into_vec().as_slice(),
            [TypeError::InfiniteType { .. }]
        ));
        let _ = id1;
    }

    #[test]
    fn type_ref_mismatch_is_a_unification_error() {
        let mut store = UnionFindStore::new();
        let mut sink = ErrorSink::new();
        let t1 = IType::type_ref(0u32, TypeName::new("Alpha"));
        let t2 = IType::type_ref(1u32, TypeName::new("Beta"));
        mgu(&mut store, &mut sink, &t1, &t2);
        assert_eq!(sink.len(), 1);
    }
}
