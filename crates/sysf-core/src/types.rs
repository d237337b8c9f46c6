use serde::Serialize;

/// A core type.
///
/// Unlike the surface [`Type`](sysf_parser::ast::Type) this is not a binary
/// arrow tree: an arrow chain is flattened into one `Arrow` node carrying all
/// of its parameter types plus a single return type, so that arity (the
/// count of non-`forall`-hidden arrow prefixes) is a `Vec::len` rather than a
/// tree walk. Parameter docs, if any, run parallel to `params`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Type {
    /// A bound universal type variable, referenced by name.
    Var(String),
    /// `params -> ret`, e.g. `Int -> Int -> Int` is `Arrow([Int, Int], Int)`.
    Arrow {
        params: Vec<Type>,
        ret: Box<Type>,
        param_docs: Option<Vec<Option<String>>>,
    },
    /// `forall a. T`.
    Forall(String, Box<Type>),
    /// A user type constructor applied to zero or more arguments, e.g.
    /// `Maybe Int` is `TyCon("Maybe", [Int])`.
    TyCon(String, Vec<Type>),
    /// An opaque primitive type, e.g. `Int`, `String`. Unifies only by name
    /// identity and never decomposes, unlike `TyCon`.
    Prim(String),
}

impl Type {
    pub fn prim(name: impl Into<String>) -> Self {
        Type::Prim(name.into())
    }

    pub fn con(name: impl Into<String>, args: Vec<Type>) -> Self {
        Type::TyCon(name.into(), args)
    }

    /// Build `params -> ret` with no parameter docs attached.
    pub fn arrow(params: Vec<Type>, ret: Type) -> Self {
        Type::Arrow {
            params,
            ret: Box::new(ret),
            param_docs: None,
        }
    }

    /// Wrap `self` in `n` nested foralls, outermost first.
    pub fn foralls(vars: &[String], body: Type) -> Self {
        vars.iter()
            .rev()
            .fold(body, |acc, v| Type::Forall(v.clone(), Box::new(acc)))
    }

    /// The number of arrow-prefix parameters, not counting any arrows hidden
    /// behind a `forall`. Used to compute a primitive operation's arity.
    pub fn arrow_arity(&self) -> usize {
        match self {
            Type::Arrow { params, .. } => params.len(),
            _ => 0,
        }
    }

    /// Peel off leading `Forall` layers, returning the bound variable names
    /// (outermost first) and the remaining body.
    pub fn peel_foralls(&self) -> (Vec<&str>, &Type) {
        let mut vars = Vec::new();
        let mut cur = self;
        while let Type::Forall(v, body) = cur {
            vars.push(v.as_str());
            cur = body;
        }
        (vars, cur)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrow_arity_counts_flattened_params() {
        let t = Type::arrow(vec![Type::prim("Int"), Type::prim("Int")], Type::prim("Int"));
        assert_eq!(t.arrow_arity(), 2);
    }

    #[test]
    fn arrow_arity_is_zero_behind_a_forall() {
        let body = Type::arrow(vec![Type::Var("a".into())], Type::Var("a".into()));
        let t = Type::foralls(&["a".to_string()], body);
        assert_eq!(t.arrow_arity(), 0);
    }

    #[test]
    fn foralls_wraps_outermost_first() {
        let t = Type::foralls(
            &["a".to_string(), "b".to_string()],
            Type::Var("a".into()),
        );
        match t {
            Type::Forall(name, inner) => {
                assert_eq!(name, "a");
                assert!(matches!(*inner, Type::Forall(ref n, _) if n == "b"));
            }
            other => panic!("expected Forall, got {other:?}"),
        }
    }

    #[test]
    fn peel_foralls_returns_vars_in_binding_order() {
        let t = Type::foralls(
            &["a".to_string(), "b".to_string()],
            Type::Var("a".into()),
        );
        let (vars, body) = t.peel_foralls();
        assert_eq!(vars, vec!["a", "b"]);
        assert_eq!(*body, Type::Var("a".into()));
    }

    #[test]
    fn prim_types_distinguish_from_tycon() {
        assert_ne!(Type::prim("Int"), Type::con("Int", vec![]));
    }
}
