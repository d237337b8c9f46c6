pub mod error;
pub mod span;
pub mod token;

pub use error::{LexError, LexErrorKind};
pub use span::{LineIndex, Span};
pub use token::{keyword_from_str, PragmaEntry, Token, TokenKind};
