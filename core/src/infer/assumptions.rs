//! Assumption set: pending requirements of free names, recorded
//! bottom-up during generation and discharged at binding sites.
//!
//! `with_bindings` is written as an explicit save/clear/restore on a
//! single mutable map rather than threading a persistent map through the
//! generator — this also mirrors the `ECase` ordering dependency: a
//! pattern's binders must see only the assumptions contributed by
//! *their* alt's body.

use std::collections::HashMap;

use super::itype::IType;
use crate::names::Name;

#[derive(Debug, Default)]
pub struct AssumptionSet<A> {
    map: HashMap<Name, Vec<IType<A>>>,
}

impl<A> AssumptionSet<A> {
    pub fn new() -> Self {
        AssumptionSet {
            map: HashMap::new(),
        }
    }

    pub fn add(&mut self, name: Name, ty: IType<A>) {
        self.map.entry(name).or_default().push(ty);
    }

    pub fn lookup(&self, name: &Name) -> &[IType<A>] {
        self.map.get(name).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn delete(&mut self, name: &Name) {
        self.map.remove(name);
    }

    pub fn set(&mut self, name: Name, list: Vec<IType<A>>) {
        if list.is_empty() {
            self.map.remove(&name);
        } else {
            self.map.insert(name, list);
        }
    }

    /// Names with at least one recorded use.
    pub fn names(&self) -> impl Iterator<Item = &Name> {
        self.map.keys()
    }

    /// Save the current lists for `names`, clear them, run `action`,
    /// collect whatever lists accumulated during `action`, restore the
    /// saved lists, and return `(collected, action's result)`.
    pub fn with_bindings<R>(
        &mut self,
        names: &[Name],
        action: impl FnOnce(&mut Self) -> R,
    ) -> (Vec<Vec<IType<A>>>, R) {
        let saved: Vec<Vec<IType<A>>> = names.iter().map(|n| self.map.remove(n).unwrap_or_default()).collect();

        let result = action(self);

        let collected: Vec<Vec<IType<A>>> = names.iter().map(|n| self.map.remove(n).unwrap_or_default()).collect();

        for (name, saved_list) in names.iter().zip(saved) {
            if !saved_list.is_empty() {
                self.map.insert(name.clone(), saved_list);
            }
        }

        (collected, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infer::itype::IType;

    #[test]
    fn with_bindings_hides_and_restores_outer_assumptions() {
        let mut set: AssumptionSet<u32> = AssumptionSet::new();
        let x = Name::new("x");
        set.add(x.clone(), IType::lit(0, crate::literal::LitKind::Int));

        let (collected, _) = set.with_bindings(&[x.clone()], |inner| {
            assert!(inner.lookup(&x).is_empty());
            inner.add(x.clone(), IType::lit(1, crate::literal::LitKind::Bool));
        });

        assert_eq!(collected[0].len(), 1);
        // the outer binding for `x` is restored once the inner scope ends
        assert_eq!(set.lookup(&x).len(), 1);
        assert!(matches!(
            set.lookup(&x)[0].shape,
            crate::infer::itype::IShape::Lit(crate::literal::LitKind::Int)
        ));
    }

    #[test]
    fn delete_removes_all_uses_of_a_name() {
        let mut set: AssumptionSet<u32> = AssumptionSet::new();
        let x = Name::new("x");
        set.add(x.clone(), IType::lit(0, crate::literal::LitKind::Int));
        set.delete(&x);
        assert!(set.lookup(&x).is_empty());
    }
}
