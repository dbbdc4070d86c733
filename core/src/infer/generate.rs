//! Bottom-up constraint generation: walk an `Expr<A>`, assign every node
//! a fresh (or explicit) inference type, and unify as constraints arise
//! in place rather than collecting them into a separate list first. Free
//! uses of a name are recorded in the running `AssumptionSet` and
//! discharged by whichever binder (`Lam`, a `Case` pattern, or the
//! surrounding batch driver for a top-level def) introduces that name.

use std::fmt::Debug;

use super::assumptions::AssumptionSet;
use super::itype::IType;
use super::ivar::NameSupply;
use super::unionfind::UnionFindStore;
use super::unify::mgu;
use crate::decl::{TypeDecl, TypeDecls};
use crate::error::{ErrorSink, TypeError};
use crate::expr::{Alt, Alts, Expr, Pattern};
use crate::names::Name;

/// One expression node's generation, producing the same tree shape with
/// `(IType<A>, A)` annotations.
pub fn generate<A: Clone + Debug>(
    expr: &Expr<A>,
    decls: &TypeDecls,
    supply: &mut NameSupply,
    assumptions: &mut AssumptionSet<A>,
    store: &mut UnionFindStore<A>,
    sink: &mut ErrorSink<A>,
) -> Expr<(IType<A>, A)> {
    match expr {
        Expr::Lit(ann, v) => {
            let ty = IType::lit(ann.clone(), v.kind());
            Expr::Lit((ty, ann.clone()), v.clone())
        }

        Expr::Var(ann, name) => {
            let ty = supply.fresh_var(ann.clone());
            assumptions.add(name.clone(), ty.clone());
            Expr::Var((ty, ann.clone()), name.clone())
        }

        Expr::Lam(ann, param, annot, body) => {
            let param_ty = match annot {
                Some(t) => IType::from_surface(ann, t),
                None => supply.fresh_var(ann.clone()),
            };

            let (mut collected, body2) = assumptions.with_bindings(
                std::slice::from_ref(param),
                |assumptions| generate(body, decls, supply, assumptions, store, sink),
            );

            for used_ty in collected.pop().unwrap_or_default() {
                mgu(store, sink, &param_ty, &used_ty);
            }

            let (body_ty, _) = body2.ann();
            let lam_ty = IType::arrow(ann.clone(), param_ty, body_ty);
            Expr::Lam((lam_ty, ann.clone()), param.clone(), annot.clone(), Box::new(body2))
        }

        Expr::App(ann, f, x) => {
            let f2 = generate(f, decls, supply, assumptions, store, sink);
            let x2 = generate(x, decls, supply, assumptions, store, sink);

            let result_ty = supply.fresh_var(ann.clone());
            let (f_ty, _) = f2.ann();
            let (x_ty, _) = x2.ann();
            let expected_fn_ty = IType::arrow(ann.clone(), x_ty, result_ty.clone());
            mgu(store, sink, &f_ty, &expected_fn_ty);

            Expr::App((result_ty, ann.clone()), Box::new(f2), Box::new(x2))
        }

        Expr::List(ann, elem_annot, elems) => {
            let elem_ty = IType::from_surface(ann, elem_annot);
            let elems2: Vec<_> = elems
                .iter()
                .map(|e| generate(e, decls, supply, assumptions, store, sink))
                .collect();
            for e2 in &elems2 {
                let (e_ty, _) = e2.ann();
                mgu(store, sink, &elem_ty, &e_ty);
            }
            let list_ty = IType::list(ann.clone(), elem_ty);
            Expr::List((list_ty, ann.clone()), elem_annot.clone(), elems2)
        }

        Expr::Map(ann, f, list) => {
            let f2 = generate(f, decls, supply, assumptions, store, sink);
            let list2 = generate(list, decls, supply, assumptions, store, sink);

            let elem_in = supply.fresh_var(ann.clone());
            let elem_out = supply.fresh_var(ann.clone());

            let (f_ty, _) = f2.ann();
            let expected_f_ty = IType::arrow(ann.clone(), elem_in.clone(), elem_out.clone());
            mgu(store, sink, &f_ty, &expected_f_ty);

            let (list_ty, _) = list2.ann();
            let expected_list_ty = IType::list(ann.clone(), elem_in);
            mgu(store, sink, &list_ty, &expected_list_ty);

            let result_ty = IType::list(ann.clone(), elem_out);
            Expr::Map((result_ty, ann.clone()), Box::new(f2), Box::new(list2))
        }

        Expr::Con(ann, ctor, type_name, args) => {
            let decl = decls.lookup(type_name).cloned();

            let (field_tys, record_fields) = match &decl {
                None => {
                    sink.push(TypeError::UndeclaredType(type_name.clone(), ann.clone()));
                    (Vec::new(), None)
                }
                Some(TypeDecl::Variant(ctors)) => match ctors.iter().find(|(c, _)| c == ctor) {
                    None => {
                        sink.push(TypeError::BadConstructorName {
                            ctor: ctor.clone(),
                            type_name: type_name.clone(),
                            decl: decl.clone().unwrap(),
                            ann: ann.clone(),
                        });
                        (Vec::new(), None)
                    }
                    Some((_, field_tys)) => {
                        if field_tys.len() != args.len() {
                            sink.push(TypeError::BadConstructorArity {
                                ctor: ctor.clone(),
                                expected: field_tys.len(),
                                actual: args.len(),
                                ann: ann.clone(),
                            });
                        }
                        (field_tys.clone(), None)
                    }
                },
                Some(TypeDecl::Record(fields)) => {
                    if fields.len() != args.len() {
                        sink.push(TypeError::BadConstructorArity {
                            ctor: ctor.clone(),
                            expected: fields.len(),
                            actual: args.len(),
                            ann: ann.clone(),
                        });
                    }
                    let field_tys: Vec<_> = fields.iter().map(|(_, t)| t.clone()).collect();
                    (field_tys, Some(fields.clone()))
                }
            };

            let args2: Vec<_> = args
                .iter()
                .enumerate()
                .map(|(i, a)| {
                    let a2 = generate(a, decls, supply, assumptions, store, sink);
                    if let Some(expected) = field_tys.get(i) {
                        let expected_i = IType::from_surface(ann, expected);
                        let (a_ty, _) = a2.ann();
                        mgu(store, sink, &expected_i, &a_ty);
                    }
                    a2
                })
                .collect();

            // Record construction seeds its own field-constraint list so
            // that a later `Prj` on this very node can look its fields up
            // without waiting on unification to reach a declared type.
            let ty = match record_fields {
                Some(fields) => IType::type_ref(ann.clone(), type_name.clone()).with_fields(
                    fields
                        .iter()
                        .map(|(fname, fty)| (fname.clone(), IType::from_surface(ann, fty)))
                        .collect(),
                ),
                None => IType::type_ref(ann.clone(), type_name.clone()),
            };
            Expr::Con((ty, ann.clone()), ctor.clone(), type_name.clone(), args2)
        }

        Expr::Case(ann, scrutinee, alts) => {
            let scrutinee2 = generate(scrutinee, decls, supply, assumptions, store, sink);
            let (scrutinee_ty, _) = scrutinee2.ann();

            let result_ty = supply.fresh_var(ann.clone());
            let mut alts2 = Vec::with_capacity(alts.len());

            for alt in alts.iter() {
                let (pat2, pat_ty, bindings) =
                    generate_pattern(&alt.pattern, decls, supply, store, sink);
                mgu(store, sink, &scrutinee_ty, &pat_ty);

                let names: Vec<Name> = bindings.iter().map(|(n, _)| n.clone()).collect();
                let (collected, body2) = assumptions.with_bindings(&names, |assumptions| {
                    generate(&alt.body, decls, supply, assumptions, store, sink)
                });

                for ((_, binder_ty), uses) in bindings.iter().zip(collected) {
                    for used_ty in uses {
                        mgu(store, sink, binder_ty, &used_ty);
                    }
                }

                let (body_ty, _) = body2.ann();
                mgu(store, sink, &result_ty, &body_ty);

                alts2.push(Alt {
                    pattern: pat2,
                    body: body2,
                });
            }

            let alts2 = Alts::from_vec(alts2).expect("case alternatives are non-empty");
            Expr::Case((result_ty, ann.clone()), Box::new(scrutinee2), alts2)
        }

        Expr::Prj(ann, base, field) => {
            let base2 = generate(base, decls, supply, assumptions, store, sink);
            let (base_ty, _) = base2.ann();

            let field_ty = supply.fresh_var(ann.clone());
            let marker = supply
                .fresh_var(ann.clone())
                .with_fields(vec![(field.clone(), field_ty.clone())]);
            mgu(store, sink, &base_ty, &marker);

            Expr::Prj((field_ty, ann.clone()), Box::new(base2), field.clone())
        }

        Expr::Foreign(ann, name, ty) => {
            let ity = IType::from_surface(ann, ty);
            Expr::Foreign((ity, ann.clone()), name.clone(), ty.clone())
        }
    }
}

/// Generate a pattern's own inference type (what the scrutinee must
/// unify with) plus the bindings it introduces, without touching the
/// assumption set — callers scope those bindings themselves so sibling
/// alternatives don't see each other's binders.
fn generate_pattern<A: Clone + Debug>(
    pattern: &Pattern<A>,
    decls: &TypeDecls,
    supply: &mut NameSupply,
    store: &mut UnionFindStore<A>,
    sink: &mut ErrorSink<A>,
) -> (Pattern<(IType<A>, A)>, IType<A>, Vec<(Name, IType<A>)>) {
    match pattern {
        Pattern::Var(ann, name) => {
            let ty = supply.fresh_var(ann.clone());
            (
                Pattern::Var((ty.clone(), ann.clone()), name.clone()),
                ty.clone(),
                vec![(name.clone(), ty)],
            )
        }

        Pattern::Con(ann, ctor, subpats) => {
            let decl = decls.lookup_constructor(ctor);

            if decl.is_none() {
                sink.push(TypeError::BadPatternConstructor(ctor.clone(), ann.clone()));
            }

            let (owner, field_tys) = match decl {
                Some((owner, field_tys)) => (Some(owner.clone()), field_tys.clone()),
                None => (None, Vec::new()),
            };

            if decl.is_some() && field_tys.len() != subpats.len() {
                let owner_ty = owner
                    .clone()
                    .map(crate::ty::Type::Var)
                    .unwrap_or(crate::ty::Type::Lit(crate::literal::LitKind::Int));
                sink.push(TypeError::BadPatternArity {
                    ctor: ctor.clone(),
                    owner: owner_ty,
                    expected: field_tys.len(),
                    actual: subpats.len(),
                    ann: ann.clone(),
                });
            }

            let mut bindings = Vec::new();
            let subpats2: Vec<_> = subpats
                .iter()
                .enumerate()
                .map(|(i, p)| {
                    let (p2, p_ty, mut p_bindings) = generate_pattern(p, decls, supply, store, sink);
                    if let Some(expected) = field_tys.get(i) {
                        let expected_i = IType::from_surface(ann, expected);
                        mgu(store, sink, &expected_i, &p_ty);
                    }
                    bindings.append(&mut p_bindings);
                    p2
                })
                .collect();

            let ty = match &owner {
                Some(owner) => IType::type_ref(ann.clone(), owner.clone()),
                None => supply.fresh_var(ann.clone()),
            };

            (
                Pattern::Con((ty.clone(), ann.clone()), ctor.clone(), subpats2),
                ty,
                bindings,
            )
        }
    }
}
