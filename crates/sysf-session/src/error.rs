//! Aggregated error type for the outward-facing session API (spec §7).
use std::fmt;

use sysf_elab::ElabError;
use sysf_eval::EvalError;
use sysf_check::TypeError;
use sysf_parser::ParseError;

/// Whatever stage of the pipeline an input failed at. Each variant wraps
/// the owning crate's own error type rather than flattening it into a
/// string, so a caller that cares (the CLI's diagnostic renderer, a test)
/// can still match on the original payload.
#[derive(Debug, Clone, PartialEq)]
pub enum SysfError {
    /// Lexical or syntactic failure. One input may report more than one
    /// parse error (one per declaration that failed to parse before
    /// recovery resumed at the next declaration boundary).
    Parse(Vec<ParseError>),
    Elab(ElabError),
    Type(TypeError),
    Eval(EvalError),
}

impl fmt::Display for SysfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SysfError::Parse(errors) => {
                for (i, e) in errors.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{e}")?;
                }
                Ok(())
            }
            SysfError::Elab(e) => write!(f, "{e}"),
            SysfError::Type(e) => write!(f, "{e}"),
            SysfError::Eval(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SysfError {}
