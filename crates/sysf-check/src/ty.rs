//! The checker's internal type representation.
//!
//! Distinct from [`sysf_core::Type`]: the core type is the *surface of the
//! target language* (bound universal variables referenced by name, never
//! renumbered), while `Ty` additionally carries unification metavariables
//! introduced during `infer`/`check`. A bound type variable that is in
//! scope because we're checking underneath a `Λ`/`forall` binder is a
//! [`Ty::Rigid`] -- it can only unify with itself, never be solved away,
//! unlike a [`Ty::Var`] metavariable which unification is free to bind.
use std::fmt;

use sysf_core::Type as CoreType;

/// A unification metavariable, identified by a `u32` index into the
/// `ena` union-find table owned by [`crate::unify::InferCtx`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TyVar(pub u32);

/// A type as manipulated during checking.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Ty {
    /// An unsolved unification variable.
    Var(TyVar),
    /// A bound type variable currently in scope (from an enclosing `Λ`/
    /// `forall`), referenced by its surface name. Only equal to another
    /// `Rigid` of the same name -- never unified away.
    Rigid(String),
    /// `params -> ret`, flattened exactly as in the core type.
    Arrow(Vec<Ty>, Box<Ty>),
    /// `forall a. T`, present only when a scheme has not yet been
    /// instantiated (e.g. the still-polymorphic type of a `Global` or
    /// `Ctor` reference before an enclosing `App`/`TApp`/constructor rule
    /// peels it).
    Forall(String, Box<Ty>),
    /// A user data type applied to arguments, e.g. `Maybe Int`.
    TyCon(String, Vec<Ty>),
    /// An opaque primitive type (`Int`, `String`, ...). Unifies only by
    /// name identity and never decomposes.
    Prim(String),
}

impl Ty {
    /// Lift a core type into a `Ty` with no metavariables: every bound
    /// `Type::Var` becomes a `Rigid` of the same name.
    pub fn from_core(ty: &CoreType) -> Ty {
        match ty {
            CoreType::Var(name) => Ty::Rigid(name.clone()),
            CoreType::Arrow { params, ret, .. } => Ty::Arrow(
                params.iter().map(Ty::from_core).collect(),
                Box::new(Ty::from_core(ret)),
            ),
            CoreType::Forall(name, body) => Ty::Forall(name.clone(), Box::new(Ty::from_core(body))),
            CoreType::TyCon(name, args) => {
                Ty::TyCon(name.clone(), args.iter().map(Ty::from_core).collect())
            }
            CoreType::Prim(name) => Ty::Prim(name.clone()),
        }
    }

    /// Substitute every free occurrence of the rigid variable named `name`
    /// with `replacement`. Used both to instantiate a `Forall` (replacement
    /// is a fresh metavariable or an explicit type argument) and to
    /// specialize a constructor's field types to a scrutinee's type
    /// arguments during case-branch checking.
    pub fn subst(&self, name: &str, replacement: &Ty) -> Ty {
        match self {
            Ty::Var(v) => Ty::Var(*v),
            Ty::Rigid(n) if n == name => replacement.clone(),
            Ty::Rigid(n) => Ty::Rigid(n.clone()),
            Ty::Arrow(params, ret) => Ty::Arrow(
                params.iter().map(|p| p.subst(name, replacement)).collect(),
                Box::new(ret.subst(name, replacement)),
            ),
            // Shadowing: an inner forall rebinding the same name closes
            // off the substitution for its own body.
            Ty::Forall(n, body) if n == name => Ty::Forall(n.clone(), body.clone()),
            Ty::Forall(n, body) => Ty::Forall(n.clone(), Box::new(body.subst(name, replacement))),
            Ty::TyCon(n, args) => {
                Ty::TyCon(n.clone(), args.iter().map(|a| a.subst(name, replacement)).collect())
            }
            Ty::Prim(n) => Ty::Prim(n.clone()),
        }
    }

    /// Whether this type is, after stripping no variables, a bare `Arrow`.
    pub fn is_arrow(&self) -> bool {
        matches!(self, Ty::Arrow(..))
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Var(v) => write!(f, "?{}", v.0),
            Ty::Rigid(n) => write!(f, "{n}"),
            Ty::Arrow(params, ret) => {
                for p in params {
                    write!(f, "{p} -> ")?;
                }
                write!(f, "{ret}")
            }
            Ty::Forall(n, body) => write!(f, "forall {n}. {body}"),
            Ty::TyCon(n, args) => {
                write!(f, "{n}")?;
                for a in args {
                    write!(f, " {a}")?;
                }
                Ok(())
            }
            Ty::Prim(n) => write!(f, "{n}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_core_converts_bound_vars_to_rigid() {
        let core = CoreType::Forall("a".into(), Box::new(CoreType::Var("a".into())));
        let ty = Ty::from_core(&core);
        match ty {
            Ty::Forall(n, body) => {
                assert_eq!(n, "a");
                assert_eq!(*body, Ty::Rigid("a".into()));
            }
            other => panic!("expected Forall, got {other:?}"),
        }
    }

    #[test]
    fn subst_replaces_matching_rigid_only() {
        let ty = Ty::Arrow(vec![Ty::Rigid("a".into())], Box::new(Ty::Rigid("b".into())));
        let replaced = ty.subst("a", &Ty::Prim("Int".into()));
        assert_eq!(
            replaced,
            Ty::Arrow(vec![Ty::Prim("Int".into())], Box::new(Ty::Rigid("b".into())))
        );
    }

    #[test]
    fn subst_stops_at_shadowing_forall() {
        let ty = Ty::Forall("a".into(), Box::new(Ty::Rigid("a".into())));
        let replaced = ty.subst("a", &Ty::Prim("Int".into()));
        assert_eq!(replaced, ty);
    }
}
