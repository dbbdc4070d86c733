//! The inference engine: fresh variables, assumptions, union-find
//! unification, constraint generation, and lowering back to surface
//! types. `driver` wires these into the four external entry points.

pub mod assumptions;
pub mod driver;
pub mod generate;
pub mod itype;
pub mod ivar;
pub mod subst;
pub mod unionfind;
pub mod unify;

pub use itype::{IShape, IType, TypeVarId};
pub use ivar::NameSupply;
