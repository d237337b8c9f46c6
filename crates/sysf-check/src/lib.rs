//! Bidirectional type checking over the core calculus.
//!
//! Bridges [`sysf_core`]'s module/term representation to a concrete
//! `infer`/`check` implementation:
//!
//! - [`ty`]: the checker's internal type representation (adds unification
//!   metavariables and rigid skolem variables on top of the core `Type`)
//! - [`unify`]: Robinson unification over `ty::Ty`, plus the metavariable
//!   supply
//! - [`env`]: the local (de Bruijn) typing environment and module-table
//!   lookups
//! - [`infer`]: the bidirectional checker itself
//! - [`exhaustiveness`]: the lenient "all constructors covered" check for
//!   `case`
//! - [`error`]: the semantic error taxonomy
//! - [`diagnostics`]: ariadne-based rendering of those errors

pub mod diagnostics;
pub mod env;
pub mod error;
pub mod exhaustiveness;
pub mod infer;
pub mod ty;
pub mod unify;

use sysf_common::span::Span;
use sysf_core::module::Module;
use sysf_core::term::Term;

pub use error::TypeError;
pub use infer::Checker;
pub use ty::Ty;
pub use unify::InferCtx;

/// Synthesize the type of a top-level term against a module snapshot,
/// reporting any error at `span` (the declaration or interactive input the
/// term came from). This is the entry point the session layer calls after
/// elaborating one input.
pub fn infer_term<V>(module: &Module<V>, term: &Term, span: Span) -> Result<Ty, TypeError> {
    let mut checker = Checker::new(module);
    let ty = checker.infer(term, span)?;
    Ok(checker.resolve(ty))
}

/// Check a top-level term against a declared type, as when a `name : T =
/// body` declaration's body is checked against its own annotation.
pub fn check_term<V>(
    module: &Module<V>,
    term: &Term,
    expected: &sysf_core::types::Type,
    span: Span,
) -> Result<(), TypeError> {
    let mut checker = Checker::new(module);
    checker.check(term, Ty::from_core(expected), span)
}
