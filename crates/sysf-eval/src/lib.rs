//! Call-by-value evaluation of the core calculus (spec §4.5 and §9).
//!
//! Takes a [`sysf_core::Term`] plus a [`Module`](sysf_core::Module)
//! snapshot and a host-supplied [`PrimitiveRegistry`], and reduces the term
//! to a [`Value`]. Has no notion of elaboration or type checking: a term
//! that reaches here is assumed closed and well-typed, and every error this
//! crate can report beyond `MissingPrimitive`, `UnboundGlobal`,
//! `PatternMatchFailure`, and a handler's own `PrimitiveHandlerError`/
//! `DivisionByZero` is defense in depth against a checker bug, not a normal
//! runtime outcome.

pub mod env;
pub mod error;
pub mod eval;
pub mod registry;
pub mod value;

pub use env::Env;
pub use error::EvalError;
pub use eval::Evaluator;
pub use registry::{HandlerRegistry, PrimitiveHandler, PrimitiveRegistry};
pub use value::Value;
