//! Runtime values (spec §3.4).
//!
//! Closed under integers, strings, closures over a persistent environment,
//! type closures, constructor values, and (possibly partially applied)
//! primitive operations. Closures capture [`Env`] by reference count, not
//! by copy, so extending an environment never touches an already-captured
//! closure's own frame chain.

use std::fmt;
use std::rc::Rc;

use sysf_core::Term;

use crate::env::Env;

/// A runtime value.
#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Str(String),
    /// `λx. e` (or `λx:T. e`) closed over the environment it was created
    /// in. The parameter's declared type, if any, is carried only for
    /// printing -- evaluation never inspects it.
    Closure { env: Env, body: Rc<Term> },
    /// `Λa. e` closed over its environment. Type erasure means applying a
    /// type closure never touches a value, so its body is simply
    /// re-evaluated in the captured environment (spec §4.5 `TApp`).
    TClosure { env: Env, body: Rc<Term> },
    /// A saturated data constructor applied to its argument values.
    Ctor { name: String, args: Vec<Value> },
    /// A primitive operation, possibly partially applied. `arity` is
    /// computed once, from the declared type's flattened arrow-prefix
    /// length (spec §9 "Primitive-operation arity"), when the `PrimOp`
    /// term is first evaluated.
    PrimOp {
        name: String,
        arity: usize,
        applied: Vec<Value>,
    },
}

impl Value {
    /// A short tag naming this value's shape, used in error messages
    /// (`NotAFunction`, `NotAConstructor`) where printing the full value
    /// would be noisy or, for a closure, impossible to render usefully.
    pub fn shape(&self) -> &'static str {
        match self {
            Value::Int(_) => "an integer",
            Value::Str(_) => "a string",
            Value::Closure { .. } => "a closure",
            Value::TClosure { .. } => "a type closure",
            Value::Ctor { .. } => "a constructor value",
            Value::PrimOp { .. } => "a primitive operation",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Closure { .. } => write!(f, "<closure>"),
            Value::TClosure { .. } => write!(f, "<type closure>"),
            Value::Ctor { name, args } => {
                write!(f, "{name}")?;
                for a in args {
                    write!(f, " {}", DisplayArg(a))?;
                }
                Ok(())
            }
            Value::PrimOp { name, applied, .. } => {
                write!(f, "<prim {name}, {} arg(s) applied>", applied.len())
            }
        }
    }
}

/// Wraps a constructor argument so that a nested constructor value prints
/// parenthesized, e.g. `Just (Succ Zero)` rather than the ambiguous
/// `Just Succ Zero`.
struct DisplayArg<'a>(&'a Value);

impl fmt::Display for DisplayArg<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Value::Ctor { args, .. } if !args.is_empty() => write!(f, "({})", self.0),
            other => write!(f, "{other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_int_and_string() {
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(Value::Str("hi".into()).to_string(), "\"hi\"");
    }

    #[test]
    fn display_nullary_constructor() {
        let v = Value::Ctor { name: "True".into(), args: vec![] };
        assert_eq!(v.to_string(), "True");
    }

    #[test]
    fn display_nested_constructor_parenthesizes_compound_args() {
        let inner = Value::Ctor { name: "Succ".into(), args: vec![Value::Ctor { name: "Zero".into(), args: vec![] }] };
        let outer = Value::Ctor { name: "Just".into(), args: vec![inner] };
        assert_eq!(outer.to_string(), "Just (Succ Zero)");
    }
}
