//! The semantic (compile-time) error tier.
//!
//! Every variant carries the source span nearest to the fault, plus
//! whatever payload makes the message actionable. `TypeMismatch` and
//! friends carry `Ty` rather than a rendered string so diagnostics can
//! defer formatting until render time.
use std::fmt;

use sysf_common::span::Span;

use crate::ty::Ty;

#[derive(Clone, Debug, PartialEq)]
pub enum TypeError {
    /// A de Bruijn index pointed past the end of the local environment.
    UnboundIndex { index: u32, span: Span },
    /// A `Global` reference named no entry in `global_types`.
    UnknownGlobal { name: String, span: Span },
    /// A `PrimOp` reference named no entry in `global_types` under
    /// `$prim.<name>`.
    UnknownPrimitive { name: String, span: Span },
    /// A `case` pattern named a constructor absent from `constructors`.
    UnknownConstructor { name: String, span: Span },
    /// A type constructor/data type name that elaboration admitted but the
    /// checker cannot resolve (should not normally arise once elaboration
    /// has already validated type constructors, kept for defense in depth).
    UnknownType { name: String, span: Span },
    /// No `prim_type Int` is registered, so an integer literal has nothing
    /// to synthesize.
    NoIntType { span: Span },
    /// No `prim_type String` is registered.
    NoStringType { span: Span },
    /// A constructor or function application received the wrong number of
    /// arguments relative to its declared arity.
    ArityMismatch { expected: usize, found: usize, span: Span },
    /// Two types that should be equal are not, after resolving through the
    /// unification table.
    TypeMismatch { expected: Ty, found: Ty, span: Span },
    /// A unification variable would have to equal a type containing
    /// itself.
    OccursCheck { var: Ty, ty: Ty, span: Span },
    /// An application's function position synthesized a type that is
    /// neither an arrow nor resolvable to one.
    NotAFunction { found: Ty, span: Span },
    /// A top-level term declaration (or a position requiring one, such as
    /// an un-annotated `\x -> e` with nothing to check it against) has no
    /// type to synthesize from.
    MissingTypeAnnotation { name: String, span: Span },
    /// A `case` whose scrutinee's data type has every constructor
    /// statically known, and at least one is absent from the branch list.
    NonExhaustive { missing: Vec<String>, span: Span },
}

impl TypeError {
    pub fn span(&self) -> Span {
        match self {
            TypeError::UnboundIndex { span, .. }
            | TypeError::UnknownGlobal { span, .. }
            | TypeError::UnknownPrimitive { span, .. }
            | TypeError::UnknownConstructor { span, .. }
            | TypeError::UnknownType { span, .. }
            | TypeError::NoIntType { span }
            | TypeError::NoStringType { span }
            | TypeError::ArityMismatch { span, .. }
            | TypeError::TypeMismatch { span, .. }
            | TypeError::OccursCheck { span, .. }
            | TypeError::NotAFunction { span, .. }
            | TypeError::MissingTypeAnnotation { span, .. }
            | TypeError::NonExhaustive { span, .. } => *span,
        }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeError::UnboundIndex { index, .. } => {
                write!(f, "de Bruijn index {index} has no enclosing binder")
            }
            TypeError::UnknownGlobal { name, .. } => write!(f, "unknown global `{name}`"),
            TypeError::UnknownPrimitive { name, .. } => {
                write!(f, "unknown primitive operation `{name}`")
            }
            TypeError::UnknownConstructor { name, .. } => {
                write!(f, "unknown constructor `{name}`")
            }
            TypeError::UnknownType { name, .. } => write!(f, "unknown type `{name}`"),
            TypeError::NoIntType { .. } => {
                write!(f, "no `prim_type Int` is registered for integer literals")
            }
            TypeError::NoStringType { .. } => {
                write!(f, "no `prim_type String` is registered for string literals")
            }
            TypeError::ArityMismatch { expected, found, .. } => write!(
                f,
                "expected {expected} argument(s), found {found}"
            ),
            TypeError::TypeMismatch { expected, found, .. } => {
                write!(f, "expected type `{expected}`, found `{found}`")
            }
            TypeError::OccursCheck { var, ty, .. } => {
                write!(f, "occurs check: `{var}` occurs in `{ty}`")
            }
            TypeError::NotAFunction { found, .. } => {
                write!(f, "expected a function, found `{found}`")
            }
            TypeError::MissingTypeAnnotation { name, .. } => {
                write!(f, "`{name}` needs a type annotation to be checked")
            }
            TypeError::NonExhaustive { missing, .. } => write!(
                f,
                "non-exhaustive case: missing constructor(s) {}",
                missing.join(", ")
            ),
        }
    }
}

impl std::error::Error for TypeError {}
