//! The runtime error tier (spec §7 "Runtime").
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// A `case` scrutinee reduced to a value but no branch's pattern
    /// matched it.
    PatternMatchFailure { ctor: String },
    /// A `Global` reference named an entry in `global_types` but not yet
    /// (or never) in `global_values` -- e.g. a top-level declaration whose
    /// own body references its own name (spec §9: recursive `let`/`global`
    /// bindings are not supported; `foo : Int = foo` fails here).
    UnboundGlobal { name: String },
    /// A `prim_op` declaration type-checked but no handler was ever
    /// registered for it under its bare name.
    MissingPrimitive { name: String },
    /// A registered handler itself reported a failure.
    PrimitiveHandlerError(String),
    /// `int_divide x 0`, raised by the handler, not an untrapped host
    /// signal (spec invariant 12).
    DivisionByZero,
    /// An application's function position evaluated to something that is
    /// not a closure or a primitive operation. Type safety should prevent
    /// this from ever firing on a checked term; kept for defense in depth.
    NotAFunction { found: &'static str },
    /// A `case` scrutinee evaluated to something other than a constructor
    /// value. Same defense-in-depth status as `NotAFunction`.
    NotAConstructor { found: &'static str },
    /// A `Var` de Bruijn index pointed past the end of the environment.
    /// Cannot arise for a term that passed the checker (invariant 6);
    /// kept for defense in depth.
    UnboundLocal { index: u32 },
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::PatternMatchFailure { ctor } => {
                write!(f, "no branch matched constructor `{ctor}`")
            }
            EvalError::UnboundGlobal { name } => {
                write!(f, "global `{name}` has no value (did it reference itself?)")
            }
            EvalError::MissingPrimitive { name } => {
                write!(f, "no handler is registered for primitive operation `{name}`")
            }
            EvalError::PrimitiveHandlerError(msg) => write!(f, "primitive handler error: {msg}"),
            EvalError::DivisionByZero => write!(f, "division by zero"),
            EvalError::NotAFunction { found } => write!(f, "cannot apply {found}"),
            EvalError::NotAConstructor { found } => {
                write!(f, "cannot case-match on {found}, it is not a constructor value")
            }
            EvalError::UnboundLocal { index } => {
                write!(f, "de Bruijn index {index} has no enclosing binder at runtime")
            }
        }
    }
}

impl std::error::Error for EvalError {}
