//! Session lifecycle: owns the persistent module and primitive registry,
//! bootstraps the bundled prelude, and drives every later input through
//! the same lex/parse/elaborate/check/eval pipeline as a single
//! transaction (spec §5, §6).

pub mod error;
pub mod session;

pub use error::SysfError;
pub use session::{EvalOutcome, Session};
