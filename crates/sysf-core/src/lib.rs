//! The explicitly-typed core calculus: de Bruijn-indexed locals, named
//! globals, named type variables, plus the module registry that persists
//! them across inputs.
//!
//! This crate has no dependency on the evaluator or the type checker -- it
//! exists so both can share one definition of the target language without
//! either depending on the other.

pub mod module;
pub mod term;
pub mod types;

pub use module::{ConstructorInfo, DataTypeInfo, LlmMetadata, Module, PrimitiveTypeDecl};
pub use term::{Branch, Pattern, Term};
pub use types::Type;
