//! Union-find store over type variable identities, with path compression
//! and union-by-rank.
//!
//! Two kinds of points exist. A *variable* point stands for one or more
//! variable identities that have been unioned together and may or may
//! not yet be bound to a known shape; these are memoized in `by_var` so
//! that looking up the same `TypeVarId` twice returns the same point. A
//! *known-shape* point is allocated fresh every time one is created and
//! is never looked up by identity — there is nothing to memoize it
//! against, since two occurrences of (say) the same `TypeRef` in the
//! source have no reason to share a union-find class.

use std::collections::HashMap;

use super::itype::{IShape, IType, TypeVarId};
use crate::names::FieldName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point(usize);

#[derive(Debug)]
enum Cell<A> {
    Root { rank: u32, bound: Option<IType<A>> },
    Link(Point),
}

#[derive(Debug, Default)]
pub struct UnionFindStore<A> {
    cells: Vec<Cell<A>>,
    by_var: HashMap<TypeVarId, Point>,
    /// Field constraints recorded against a still-unbound variable class,
    /// keyed by its current root. Folded into the bound value as soon as
    /// the class acquires one (see `unify::bind_var`); a bound point
    /// never has an entry here.
    pending_fields: HashMap<Point, Vec<(FieldName, IType<A>)>>,
}

impl<A> UnionFindStore<A> {
    pub fn new() -> Self {
        UnionFindStore {
            cells: Vec::new(),
            by_var: HashMap::new(),
            pending_fields: HashMap::new(),
        }
    }

    fn alloc(&mut self, bound: Option<IType<A>>) -> Point {
        let p = Point(self.cells.len());
        self.cells.push(Cell::Root { rank: 0, bound });
        p
    }

    /// The point for a variable identity, allocating one the first time
    /// this identity is seen.
    pub fn get_var_point(&mut self, id: TypeVarId) -> Point {
        if let Some(p) = self.by_var.get(&id) {
            return *p;
        }
        let p = self.alloc(None);
        self.by_var.insert(id, p);
        p
    }

    /// A fresh point for a known shape — never shared with any existing
    /// point, even for two structurally identical shapes.
    pub fn new_shape_point(&mut self, ty: IType<A>) -> Point {
        debug_assert!(
            ty.as_var().is_none(),
            "known-shape points must not wrap a bare variable"
        );
        self.alloc(Some(ty))
    }

    /// Follow links to the canonical root of `p`, compressing the path
    /// as it goes. Terminates because the link chain is acyclic and
    /// strictly decreases in length after each full traversal.
    pub fn find(&mut self, p: Point) -> Point {
        match self.cells[p.0] {
            Cell::Root { .. } => p,
            Cell::Link(next) => {
                let root = self.find(next);
                self.cells[p.0] = Cell::Link(root);
                root
            }
        }
    }

    /// The canonical point that represents the class of a variable
    /// identity right now.
    pub fn repr(&mut self, id: TypeVarId) -> Point {
        let p = self.get_var_point(id);
        self.find(p)
    }

    /// What a root point is currently bound to, if anything.
    pub fn binding(&mut self, p: Point) -> Option<IType<A>>
    where
        A: Clone,
    {
        let root = self.find(p);
        match &self.cells[root.0] {
            Cell::Root { bound, .. } => bound.clone(),
            Cell::Link(_) => unreachable!("find always returns a root"),
        }
    }

    fn rank(&self, p: Point) -> u32 {
        match self.cells[p.0] {
            Cell::Root { rank, .. } => rank,
            Cell::Link(_) => unreachable!("rank only queried on roots"),
        }
    }

    /// Union two classes, by rank, keeping whichever side (if either) was
    /// already bound to a known shape. Callers are responsible for
    /// having already unified the two bound shapes, if both sides were
    /// bound, before calling this — `union` itself does not unify.
    pub fn union(&mut self, a: Point, b: Point)
    where
        A: Clone,
    {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }

        let bound = match (self.binding(ra), self.binding(rb)) {
            (Some(t), _) => Some(t),
            (None, Some(t)) => Some(t),
            (None, None) => None,
        };

        let rank_a = self.rank(ra);
        let rank_b = self.rank(rb);

        let (into, from) = if rank_a >= rank_b { (ra, rb) } else { (rb, ra) };
        let new_rank = if rank_a == rank_b { rank_a + 1 } else { self.rank(into) };

        self.cells[from.0] = Cell::Link(into);
        self.cells[into.0] = Cell::Root {
            rank: new_rank,
            bound,
        };
    }

    /// Bind an as-yet-unbound root to a known shape in place, without
    /// merging with another class. Used when a variable is unified
    /// directly against a known shape rather than another variable.
    pub fn bind(&mut self, p: Point, ty: IType<A>) {
        let root = self.find(p);
        match &mut self.cells[root.0] {
            Cell::Root { bound, .. } => {
                debug_assert!(bound.is_none(), "rebinding an already-bound point");
                *bound = Some(ty);
            }
            Cell::Link(_) => unreachable!("find always returns a root"),
        }
    }

    /// Overwrite the bound value of an already-bound root, e.g. after
    /// folding extra field constraints into it.
    pub fn rebind(&mut self, p: Point, ty: IType<A>) {
        let root = self.find(p);
        match &mut self.cells[root.0] {
            Cell::Root { bound, .. } => *bound = Some(ty),
            Cell::Link(_) => unreachable!("find always returns a root"),
        }
    }

    /// Field constraints recorded against `p`'s class while it was still
    /// unbound.
    pub fn pending_fields(&mut self, p: Point) -> Vec<(FieldName, IType<A>)>
    where
        A: Clone,
    {
        let root = self.find(p);
        self.pending_fields.get(&root).cloned().unwrap_or_default()
    }

    /// Take and clear the pending field constraints for `p`'s class.
    pub fn take_pending_fields(&mut self, p: Point) -> Vec<(FieldName, IType<A>)> {
        let root = self.find(p);
        self.pending_fields.remove(&root).unwrap_or_default()
    }

    pub fn set_pending_fields(&mut self, p: Point, fields: Vec<(FieldName, IType<A>)>) {
        let root = self.find(p);
        if fields.is_empty() {
            self.pending_fields.remove(&root);
        } else {
            self.pending_fields.insert(root, fields);
        }
    }

    /// The `TypeRef`/`Arrow`/... shape behind `id`, if one has not been
    /// reduced yet to a shape's own decomposition. Convenience used by
    /// the occurs check and by shape-level matching in `mgu`.
    pub fn shape_of(&mut self, id: TypeVarId) -> Option<IShape<A>>
    where
        A: Clone,
    {
        let root = self.repr(id);
        self.binding(root).map(|t| t.shape)
    }

    /// Every variable identity ever allocated a point in this session.
    pub fn known_vars(&self) -> Vec<TypeVarId> {
        self.by_var.keys().copied().collect()
    }

    /// Every root's bound value, for the end-of-batch sweep that checks
    /// accumulated field constraints against declared record types. Roots
    /// with no binding (free variables) are omitted; callers detect those
    /// separately while walking the typed tree.
    pub fn bound_values(&self) -> Vec<(Point, IType<A>)>
    where
        A: Clone,
    {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, cell)| match cell {
                Cell::Root {
                    bound: Some(ty), ..
                } => Some((Point(i), ty.clone())),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literal::LitKind;

    #[test]
    fn same_identity_is_the_same_point() {
        let mut store: UnionFindStore<u32> = UnionFindStore::new();
        let a = store.get_var_point(TypeVarId(0));
        let b = store.get_var_point(TypeVarId(0));
        assert_eq!(store.find(a), store.find(b));
    }

    #[test]
    fn known_shape_points_are_never_shared() {
        let mut store: UnionFindStore<u32> = UnionFindStore::new();
        let a = store.new_shape_point(IType::lit(0, LitKind::Int));
        let b = store.new_shape_point(IType::lit(0, LitKind::Int));
        assert_ne!(a, b);
    }

    #[test]
    fn union_keeps_an_existing_binding() {
        let mut store: UnionFindStore<u32> = UnionFindStore::new();
        let x = store.get_var_point(TypeVarId(0));
        let y = store.get_var_point(TypeVarId(1));
        store.bind(x, IType::lit(0, LitKind::Bool));

        store.union(x, y);
        let root = store.find(y);
        let bound = store.binding(root).unwrap();
        assert!(matches!(bound.shape, IShape::Lit(LitKind::Bool)));
    }
}
