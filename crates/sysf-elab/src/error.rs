use std::fmt;

use sysf_common::span::Span;

#[derive(Debug, Clone, PartialEq)]
pub enum ElabErrorKind {
    UnknownName(String),
    UnknownType(String),
    UnknownConstructor(String),
    MissingTypeAnnotation(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElabError {
    pub kind: ElabErrorKind,
    pub span: Span,
}

impl ElabError {
    pub fn new(kind: ElabErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

impl fmt::Display for ElabErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElabErrorKind::UnknownName(n) => write!(f, "unknown name `{n}`"),
            ElabErrorKind::UnknownType(n) => write!(f, "unknown type `{n}`"),
            ElabErrorKind::UnknownConstructor(n) => write!(f, "unknown constructor `{n}`"),
            ElabErrorKind::MissingTypeAnnotation(n) => {
                write!(f, "`{n}` is missing a top-level type annotation")
            }
        }
    }
}

impl fmt::Display for ElabError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}..{}", self.kind, self.span.start, self.span.end)
    }
}

impl std::error::Error for ElabError {}
