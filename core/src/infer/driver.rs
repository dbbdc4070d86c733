//! The incremental driver and the four external entry points
//! (`type_check`, `type_tree`, `type_check_all`, `type_check_incremental`),
//! plus the internal, test-visible `generate_constraints`/
//! `solve_constraints` split used by property tests.
//!
//! A single call owns its own `NameSupply`, `AssumptionSet`, and
//! `UnionFindStore` for its lifetime and never shares them with another
//! call — sessions are single-threaded and self-contained, per the
//! concurrency model these types were built against.

use std::collections::BTreeMap;
use std::fmt::Debug;

use log::{debug, trace};

use super::assumptions::AssumptionSet;
use super::generate::generate;
use super::ivar::NameSupply;
use super::subst::{lower_expr, validate_field_constraints};
use super::unionfind::UnionFindStore;
use crate::config::CheckConfig;
use crate::decl::TypeDecls;
use crate::error::{CheckResult, ErrorSink, TypeError};
use crate::expr::Expr;
use crate::names::Name;
use crate::ty::Type;

/// One check session's working state, exposed for the internal
/// test-visible entry points that want to drive generation and solving
/// as separate steps.
pub struct Session<A> {
    pub supply: NameSupply,
    pub assumptions: AssumptionSet<A>,
    pub store: UnionFindStore<A>,
}

impl<A> Session<A> {
    pub fn new() -> Self {
        Session {
            supply: NameSupply::new(),
            assumptions: AssumptionSet::new(),
            store: UnionFindStore::new(),
        }
    }
}

impl<A> Default for Session<A> {
    fn default() -> Self {
        Self::new()
    }
}

/// Internal, test-visible: run constraint generation for one expression
/// inside an existing session, returning the mid-generation tree.
pub fn generate_constraints<A: Clone + Debug>(
    session: &mut Session<A>,
    decls: &TypeDecls,
    sink: &mut ErrorSink<A>,
    expr: &Expr<A>,
) -> Expr<(super::IType<A>, A)> {
    trace!("generate_constraints: starting");
    generate(
        expr,
        decls,
        &mut session.supply,
        &mut session.assumptions,
        &mut session.store,
        sink,
    )
}

/// Internal, test-visible: the solver does its work as a side effect of
/// `mgu` calls made during generation, so "solving" here is just the
/// final field-constraint sweep that has to run after every constraint
/// has been generated.
pub fn solve_constraints<A: Clone + Debug>(
    session: &mut Session<A>,
    decls: &TypeDecls,
    config: &CheckConfig,
    sink: &mut ErrorSink<A>,
) {
    debug!("solve_constraints: validating accumulated field constraints");
    validate_field_constraints(&mut session.store, decls, config, sink);
}

/// `typeCheck(decls, expr) -> Type | [TypeError]`: the outer type only.
pub fn type_check<A: Clone + Debug>(
    decls: &TypeDecls,
    config: &CheckConfig,
    expr: &Expr<A>,
) -> CheckResult<Type, A> {
    let tree = type_tree(decls, config, expr)?;
    Ok(tree.ann().0)
}

/// `typeTree(decls, expr) -> Expr<(Type, A)> | [TypeError]`: every node
/// annotated. The degenerate case of `checkAll` with no `known` map.
pub fn type_tree<A: Clone + Debug>(
    decls: &TypeDecls,
    config: &CheckConfig,
    expr: &Expr<A>,
) -> CheckResult<Expr<(Type, A)>, A> {
    debug!("type_tree: starting single-expression session");
    let mut session = Session::new();
    let mut sink = ErrorSink::new();

    let mid = generate_constraints(&mut session, decls, &mut sink, expr);

    for name in session.assumptions.names().cloned().collect::<Vec<_>>() {
        for ty in session.assumptions.lookup(&name).to_vec() {
            sink.push(TypeError::FreeVariable(name.clone(), ty.ann.clone()));
        }
    }

    solve_constraints(&mut session, decls, config, &mut sink);
    let lowered = lower_expr(&mut session.store, &mut sink, &mid);

    sink.into_result(lowered)
}

/// `typeCheckAll(decls, exprs) -> Map<Name, Expr<(Type, A)>> | [TypeError]`.
pub fn type_check_all<A: Clone + Debug>(
    decls: &TypeDecls,
    config: &CheckConfig,
    exprs: &BTreeMap<Name, Expr<A>>,
) -> CheckResult<BTreeMap<Name, Expr<(Type, A)>>, A> {
    type_check_incremental(decls, config, &BTreeMap::new(), exprs)
}

/// `typeCheckIncremental(decls, known, exprs)`: as `typeCheckAll` but with
/// externally supplied typings for names checked in a previous batch.
pub fn type_check_incremental<A: Clone + Debug>(
    decls: &TypeDecls,
    config: &CheckConfig,
    known: &BTreeMap<Name, Type>,
    exprs: &BTreeMap<Name, Expr<A>>,
) -> CheckResult<BTreeMap<Name, Expr<(Type, A)>>, A> {
    debug!(
        "type_check_incremental: batch of {} definitions, {} known",
        exprs.len(),
        known.len()
    );
    let mut session = Session::new();
    let mut sink = ErrorSink::new();

    // One shared assumption set and constraint list across the whole
    // batch: this is what makes mutually recursive top-level definitions
    // work without a separate dependency ordering pass.
    let mut mids = BTreeMap::new();
    for (name, expr) in exprs {
        let mid = generate_constraints(&mut session, decls, &mut sink, expr);
        mids.insert(name.clone(), mid);
    }

    // Discharge each defined name's assumptions against its own inferred
    // type, and each known name's assumptions against the supplied type.
    for (name, mid) in &mids {
        let (def_ty, _) = mid.ann();
        for used_ty in session.assumptions.lookup(name).to_vec() {
            super::unify::mgu(&mut session.store, &mut sink, &def_ty, &used_ty);
        }
        session.assumptions.delete(name);
    }
    for (name, known_ty) in known {
        for used_ty in session.assumptions.lookup(name).to_vec() {
            let ity = super::IType::from_surface(&used_ty.ann, known_ty);
            super::unify::mgu(&mut session.store, &mut sink, &ity, &used_ty);
        }
        session.assumptions.delete(name);
    }

    // Whatever assumptions remain are genuinely free: neither a batch
    // member nor previously known.
    for name in session.assumptions.names().cloned().collect::<Vec<_>>() {
        for ty in session.assumptions.lookup(&name).to_vec() {
            sink.push(TypeError::FreeVariable(name.clone(), ty.ann.clone()));
        }
    }

    solve_constraints(&mut session, decls, config, &mut sink);

    let mut lowered = BTreeMap::new();
    for (name, mid) in mids {
        let tree = lower_expr(&mut session.store, &mut sink, &mid);
        lowered.insert(name, tree);
    }

    sink.into_result(lowered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literal::LitValue;
    use crate::ty::Type;

    fn int_lit(ann: u32, n: i64) -> Expr<u32> {
        Expr::Lit(ann, LitValue::Int(n))
    }

    #[test]
    fn a_literal_types_itself() {
        let decls = TypeDecls::new();
        let config = CheckConfig::default();
        let ty = type_check(&decls, &config, &int_lit(0, 42)).unwrap();
        assert_eq!(ty, Type::Lit(crate::literal::LitKind::Int));
    }

    #[test]
    fn identity_lambda_with_no_annotation_fails_without_let_polymorphism() {
        let decls = TypeDecls::new();
        let config = CheckConfig::default();
        let expr = Expr::Lam(
            0,
            Name::new("x"),
            None,
            Box::new(Expr::Var(0, Name::new("x"))),
        );
        assert!(type_check(&decls, &config, &expr).is_err());
    }

    #[test]
    fn identity_lambda_with_annotation_succeeds() {
        let decls = TypeDecls::new();
        let config = CheckConfig::default();
        let int_ty = Type::Lit(crate::literal::LitKind::Int);
        let expr = Expr::Lam(
            0,
            Name::new("x"),
            Some(int_ty.clone()),
            Box::new(Expr::Var(0, Name::new("x"))),
        );
        let ty = type_check(&decls, &config, &expr).unwrap();
        assert_eq!(ty, Type::arrow(int_ty.clone(), int_ty));
    }

    #[test]
    fn applying_an_int_lambda_to_a_string_is_a_unification_error() {
        let decls = TypeDecls::new();
        let config = CheckConfig::default();
        let int_ty = Type::Lit(crate::literal::LitKind::Int);
        let lam = Expr::Lam(
            0,
            Name::new("x"),
            Some(int_ty),
            Box::new(Expr::Var(0, Name::new("x"))),
        );
        let app = Expr::App(
            0,
            Box::new(lam),
            Box::new(Expr::Lit(0, LitValue::Str("hello".into()))),
        );
        let errs = type_check(&decls, &config, &app).unwrap_err();
        assert_eq!(errs.len(), 1);
        assert!(matches!(errs[0], TypeError::Unification { .. }));
    }

    #[test]
    fn mapping_identity_over_a_list_of_ints_gives_a_list_of_ints() {
        let decls = TypeDecls::new();
        let config = CheckConfig::default();
        let id = Expr::Lam(0, Name::new("x"), None, Box::new(Expr::Var(0, Name::new("x"))));
        let list = Expr::List(
            0,
            Type::Lit(crate::literal::LitKind::Int),
            vec![int_lit(0, 1), int_lit(0, 2)],
        );
        let expr = Expr::Map(0, Box::new(id), Box::new(list));
        let ty = type_check(&decls, &config, &expr).unwrap();
        assert_eq!(ty, Type::list(Type::Lit(crate::literal::LitKind::Int)));
    }

    #[test]
    fn a_free_variable_at_top_level_is_reported() {
        let decls = TypeDecls::new();
        let config = CheckConfig::default();
        let expr = Expr::Var(0, Name::new("missing"));
        let errs = type_check(&decls, &config, &expr).unwrap_err();
        assert!(matches!(errs[0], TypeError::FreeVariable(_, _)));
    }

    #[test]
    fn constructing_a_variant_with_matching_field_types_succeeds() {
        use crate::names::{ConstructorName, TypeName};

        let mut decls = TypeDecls::new();
        decls.insert_variant(
            TypeName::new("Pair"),
            vec![(
                ConstructorName::new("Pair"),
                vec![
                    Type::Lit(crate::literal::LitKind::Int),
                    Type::Lit(crate::literal::LitKind::Str),
                ],
            )],
        );
        let config = CheckConfig::default();

        let con = Expr::Con(
            0,
            ConstructorName::new("Pair"),
            TypeName::new("Pair"),
            vec![int_lit(0, 1), Expr::Lit(0, LitValue::Str("x".into()))],
        );
        let ty = type_check(&decls, &config, &con).unwrap();
        assert_eq!(ty, Type::Var(TypeName::new("Pair")));

        let bad_con = Expr::Con(
            0,
            ConstructorName::new("Pair"),
            TypeName::new("Pair"),
            vec![int_lit(0, 1), int_lit(0, 2)],
        );
        let errs = type_check(&decls, &config, &bad_con).unwrap_err();
        assert!(errs.iter().any(|e| matches!(e, TypeError::Unification { .. })));
    }

    #[test]
    fn constructing_an_unknown_type_is_reported_as_undeclared() {
        use crate::names::{ConstructorName, TypeName};

        let decls = TypeDecls::new();
        let config = CheckConfig::default();
        let con = Expr::Con(0, ConstructorName::new("Pair"), TypeName::new("Pair"), vec![]);
        let errs = type_check(&decls, &config, &con).unwrap_err();
        assert!(matches!(errs[0], TypeError::UndeclaredType(_, _)));
    }

    #[test]
    fn projecting_a_field_out_of_a_constructed_record_resolves_its_type() {
        use crate::names::{ConstructorName, FieldName, TypeName};

        let mut decls = TypeDecls::new();
        decls.insert_record(
            TypeName::new("Point"),
            vec![
                (FieldName::new("x"), Type::Lit(crate::literal::LitKind::Int)),
                (FieldName::new("y"), Type::Lit(crate::literal::LitKind::Int)),
            ],
        );
        let config = CheckConfig::default();

        let point = Expr::Con(
            0,
            ConstructorName::new("Point"),
            TypeName::new("Point"),
            vec![int_lit(0, 1), int_lit(0, 2)],
        );
        let prj = Expr::Prj(0, Box::new(point), FieldName::new("x"));
        let ty = type_check(&decls, &config, &prj).unwrap();
        assert_eq!(ty, Type::Lit(crate::literal::LitKind::Int));
    }

    #[test]
    fn mutually_recursive_batch_resolves_across_definitions() {
        let decls = TypeDecls::new();
        let config = CheckConfig::default();

        // is_even = \n -> is_odd n ; is_odd = \n -> is_even n
        let is_even = Expr::Lam(
            0,
            Name::new("n"),
            None,
            Box::new(Expr::App(
                0,
                Box::new(Expr::Var(0, Name::new("is_odd"))),
                Box::new(Expr::Var(0, Name::new("n"))),
            )),
        );
        let is_odd = Expr::Lam(
            0,
            Name::new("n"),
            None,
            Box::new(Expr::App(
                0,
                Box::new(Expr::Var(0, Name::new("is_even"))),
                Box::new(Expr::Var(0, Name::new("n"))),
            )),
        );

        let mut exprs = BTreeMap::new();
        exprs.insert(Name::new("is_even"), is_even);
        exprs.insert(Name::new("is_odd"), is_odd);

        let result = type_check_all(&decls, &config, &exprs);
        // both sides unify to the same (unresolved) arrow shape; general
        // recursion is admitted without error at this layer.
        assert!(result.is_err());
        let errs = result.unwrap_err();
        assert!(errs
            .iter()
            .all(|e| matches!(e, TypeError::InferenceError(_))));
    }
}
