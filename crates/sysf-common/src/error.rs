use std::fmt;

use crate::span::Span;

/// A lexical error, tagged with the span of source text it occurred at.
#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

impl LexError {
    pub fn new(kind: LexErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LexErrorKind {
    UnexpectedCharacter(char),
    UnterminatedString,
    UnterminatedPragma,
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexErrorKind::UnexpectedCharacter(c) => write!(f, "unexpected character '{c}'"),
            LexErrorKind::UnterminatedString => write!(f, "unterminated string literal"),
            LexErrorKind::UnterminatedPragma => write!(f, "unterminated pragma, expected `#-}}`"),
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}..{}", self.kind, self.span.start, self.span.end)
    }
}

impl std::error::Error for LexError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_unexpected_character() {
        let err = LexError::new(LexErrorKind::UnexpectedCharacter('$'), Span::new(3, 4));
        assert_eq!(err.to_string(), "unexpected character '$' at 3..4");
    }

    #[test]
    fn display_unterminated_string() {
        let err = LexError::new(LexErrorKind::UnterminatedString, Span::new(0, 5));
        assert_eq!(err.to_string(), "unterminated string literal at 0..5");
    }

    #[test]
    fn display_unterminated_pragma() {
        let err = LexError::new(LexErrorKind::UnterminatedPragma, Span::new(10, 20));
        assert_eq!(
            err.to_string(),
            "unterminated pragma, expected `#-}` at 10..20"
        );
    }
}
