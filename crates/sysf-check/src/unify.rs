//! Robinson unification over [`Ty`], plus the fresh-metavariable supply
//! both `infer`/`check` draw from.
//!
//! Grounded on the teacher's `mesh-typeck::unify::InferCtx`: an `ena`
//! union-find table of `TyVar -> Option<Ty>`, a `resolve` that follows
//! bound variables to their representative, and an occurs check that
//! walks through bound-but-unresolved chains. Unlike the teacher there is
//! no level tracking or generalization -- this calculus has no
//! let-polymorphism (spec: all polymorphism is explicit via `Λ`/`forall`),
//! so `InferCtx` carries only the union-find table and the error list.

use ena::unify::{EqUnifyValue, InPlaceUnificationTable, UnifyKey};

use sysf_common::span::Span;

use crate::error::TypeError;
use crate::ty::{Ty, TyVar};

impl UnifyKey for TyVar {
    type Value = Option<Ty>;

    fn index(&self) -> u32 {
        self.0
    }

    fn from_index(u: u32) -> Self {
        TyVar(u)
    }

    fn tag() -> &'static str {
        "TyVar"
    }
}

impl EqUnifyValue for Ty {}

/// Owns the union-find table used to resolve unification metavariables
/// across one input's worth of checking.
pub struct InferCtx {
    table: InPlaceUnificationTable<TyVar>,
}

impl InferCtx {
    pub fn new() -> Self {
        Self {
            table: InPlaceUnificationTable::new(),
        }
    }

    /// Allocate a fresh, unbound metavariable.
    pub fn fresh_var(&mut self) -> Ty {
        Ty::Var(self.table.new_key(None))
    }

    /// Follow bound metavariables to their current value, recursively
    /// resolving through compound types so the result contains no solved
    /// variable.
    pub fn resolve(&mut self, ty: Ty) -> Ty {
        match ty {
            Ty::Var(v) => match self.table.probe_value(v) {
                Some(inner) => self.resolve(inner),
                None => Ty::Var(self.table.find(v)),
            },
            Ty::Arrow(params, ret) => Ty::Arrow(
                params.into_iter().map(|p| self.resolve(p)).collect(),
                Box::new(self.resolve(*ret)),
            ),
            Ty::Forall(n, body) => Ty::Forall(n, Box::new(self.resolve(*body))),
            Ty::TyCon(n, args) => {
                Ty::TyCon(n, args.into_iter().map(|a| self.resolve(a)).collect())
            }
            other @ (Ty::Rigid(_) | Ty::Prim(_)) => other,
        }
    }

    /// Whether `var` appears free anywhere inside `ty`, following bound
    /// (but not yet resolved-out) metavariable chains.
    fn occurs_in(&mut self, var: TyVar, ty: &Ty) -> bool {
        match ty {
            Ty::Var(v) => {
                if *v == var {
                    return true;
                }
                match self.table.probe_value(*v) {
                    Some(inner) => self.occurs_in(var, &inner),
                    None => false,
                }
            }
            Ty::Rigid(_) | Ty::Prim(_) => false,
            Ty::Arrow(params, ret) => {
                params.iter().any(|p| self.occurs_in(var, p)) || self.occurs_in(var, ret)
            }
            Ty::Forall(_, body) => self.occurs_in(var, body),
            Ty::TyCon(_, args) => args.iter().any(|a| self.occurs_in(var, a)),
        }
    }

    /// Unify two types, producing a substitution recorded into the
    /// union-find table (Robinson's algorithm, spec §4.4 "Unification").
    pub fn unify(&mut self, a: Ty, b: Ty, span: Span) -> Result<(), TypeError> {
        let a = self.resolve(a);
        let b = self.resolve(b);

        match (a, b) {
            (Ty::Var(v1), Ty::Var(v2)) if v1 == v2 => Ok(()),
            (Ty::Var(v1), Ty::Var(v2)) => {
                self.table
                    .unify_var_var(v1, v2)
                    .expect("unifying two unbound metavariables cannot fail");
                Ok(())
            }
            (Ty::Var(v), ty) | (ty, Ty::Var(v)) => {
                if self.occurs_in(v, &ty) {
                    return Err(TypeError::OccursCheck {
                        var: Ty::Var(v),
                        ty,
                        span,
                    });
                }
                self.table
                    .unify_var_value(v, Some(ty))
                    .expect("binding a metavariable after a clean occurs check cannot fail");
                Ok(())
            }
            (Ty::Rigid(n1), Ty::Rigid(n2)) => {
                if n1 == n2 {
                    Ok(())
                } else {
                    Err(TypeError::TypeMismatch {
                        expected: Ty::Rigid(n1),
                        found: Ty::Rigid(n2),
                        span,
                    })
                }
            }
            (Ty::Prim(n1), Ty::Prim(n2)) => {
                if n1 == n2 {
                    Ok(())
                } else {
                    Err(TypeError::TypeMismatch {
                        expected: Ty::Prim(n1),
                        found: Ty::Prim(n2),
                        span,
                    })
                }
            }
            (Ty::Arrow(p1, r1), Ty::Arrow(p2, r2)) => {
                if p1.len() != p2.len() {
                    return Err(TypeError::ArityMismatch {
                        expected: p1.len(),
                        found: p2.len(),
                        span,
                    });
                }
                for (x, y) in p1.into_iter().zip(p2.into_iter()) {
                    self.unify(x, y, span)?;
                }
                self.unify(*r1, *r2, span)
            }
            (Ty::TyCon(n1, a1), Ty::TyCon(n2, a2)) => {
                if n1 != n2 {
                    return Err(TypeError::TypeMismatch {
                        expected: Ty::TyCon(n1, a1),
                        found: Ty::TyCon(n2, a2),
                        span,
                    });
                }
                if a1.len() != a2.len() {
                    return Err(TypeError::ArityMismatch {
                        expected: a1.len(),
                        found: a2.len(),
                        span,
                    });
                }
                for (x, y) in a1.into_iter().zip(a2.into_iter()) {
                    self.unify(x, y, span)?;
                }
                Ok(())
            }
            // `forall a. A ≡ forall b. B`: alpha-rename by skolemizing both
            // bound names to the same fresh rigid, then unify bodies.
            (Ty::Forall(n1, b1), Ty::Forall(n2, b2)) => {
                let skolem = Ty::Rigid(format!("#skolem{}", self.table.new_key(None).0));
                let b1 = b1.subst(&n1, &skolem);
                let b2 = b2.subst(&n2, &skolem);
                self.unify(b1, b2, span)
            }
            (expected, found) => Err(TypeError::TypeMismatch { expected, found, span }),
        }
    }
}

impl Default for InferCtx {
    fn default() -> Self {
        Self::new()
    }
}
