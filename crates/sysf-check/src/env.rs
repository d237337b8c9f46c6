//! Local typing environment and module-table lookups shared by `infer`/
//! `check`.
//!
//! The local environment is a plain stack of [`Ty`], indexed the same way
//! the core term's `Var(u32)` de Bruijn indices are: index `0` is the
//! innermost binder. Globals, constructors and primitives live in the
//! [`sysf_core::Module`] the checker is handed and are looked up by name,
//! never pushed onto this stack -- the two-tier scope of the core
//! representation carries straight through to checking.
use sysf_core::module::Module;
use sysf_core::types::Type as CoreType;

use crate::ty::Ty;

/// The stack of locally bound types, innermost first.
#[derive(Debug, Default, Clone)]
pub struct LocalEnv {
    locals: Vec<Ty>,
}

impl LocalEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a new innermost binding. Callers push, recurse, then `pop`
    /// explicitly, mirroring the elaborator's own `locals` discipline.
    pub fn push(&mut self, ty: Ty) {
        self.locals.push(ty);
    }

    pub fn pop(&mut self) {
        self.locals.pop();
    }

    /// Resolve a de Bruijn index to its bound type, counting from the
    /// innermost (most recently pushed) binder.
    pub fn get(&self, index: u32) -> Option<&Ty> {
        let len = self.locals.len();
        let idx = index as usize;
        if idx >= len {
            None
        } else {
            Some(&self.locals[len - 1 - idx])
        }
    }

    pub fn depth(&self) -> usize {
        self.locals.len()
    }
}

/// Look up a global's declared scheme by name, converting it to a checker
/// [`Ty`] (any `forall` layers remain, to be instantiated by the caller).
pub fn lookup_global<V>(module: &Module<V>, name: &str) -> Option<Ty> {
    module.global_types.get(name).map(Ty::from_core)
}

/// Look up a primitive op's declared scheme under its bare name (the
/// module stores it keyed with the `$prim.` prefix; see
/// [`sysf_core::module::Module::primitive_type`]).
pub fn lookup_primitive<V>(module: &Module<V>, name: &str) -> Option<Ty> {
    module.primitive_type(name).map(Ty::from_core)
}

/// Look up a constructor's fully generalized scheme.
pub fn lookup_constructor<V>(module: &Module<V>, name: &str) -> Option<Ty> {
    module
        .constructors
        .get(name)
        .map(|info| Ty::from_core(&info.scheme()))
}

/// The registered `Int` primitive type, if any, as a bare `Ty::Prim`.
pub fn int_type<V>(module: &Module<V>) -> Option<Ty> {
    module
        .primitive_types
        .get("Int")
        .map(|decl| Ty::Prim(decl.name.clone()))
}

/// The registered `String` primitive type, if any, as a bare `Ty::Prim`.
pub fn string_type<V>(module: &Module<V>) -> Option<Ty> {
    module
        .primitive_types
        .get("String")
        .map(|decl| Ty::Prim(decl.name.clone()))
}

/// Resolve a `case` scrutinee's type down to a `TyCon` name and argument
/// list, if it is one -- used to find the scrutinee's data type for both
/// constructor-field specialization and exhaustiveness checking.
pub fn as_tycon(ty: &Ty) -> Option<(&str, &[Ty])> {
    match ty {
        Ty::TyCon(name, args) => Some((name.as_str(), args.as_slice())),
        _ => None,
    }
}

/// Lift a core `Type` directly, bypassing `Ty::from_core`, for call sites
/// that already hold a borrowed core type (kept tiny, just forwards).
pub fn lift(ty: &CoreType) -> Ty {
    Ty::from_core(ty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_env_resolves_innermost_first() {
        let mut env = LocalEnv::new();
        env.push(Ty::Prim("A".into()));
        env.push(Ty::Prim("B".into()));
        assert_eq!(env.get(0), Some(&Ty::Prim("B".into())));
        assert_eq!(env.get(1), Some(&Ty::Prim("A".into())));
        assert_eq!(env.get(2), None);
    }

    #[test]
    fn local_env_pop_removes_innermost() {
        let mut env = LocalEnv::new();
        env.push(Ty::Prim("A".into()));
        env.push(Ty::Prim("B".into()));
        env.pop();
        assert_eq!(env.get(0), Some(&Ty::Prim("A".into())));
    }

    #[test]
    fn as_tycon_matches_only_tycon() {
        assert!(as_tycon(&Ty::Prim("Int".into())).is_none());
        assert_eq!(
            as_tycon(&Ty::TyCon("Maybe".into(), vec![Ty::Prim("Int".into())])),
            Some(("Maybe", &[Ty::Prim("Int".into())][..]))
        );
    }
}
