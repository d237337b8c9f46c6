//! Ariadne-based rendering of [`TypeError`] values for the CLI and the
//! REPL-style session layer.
use std::ops::Range;

use ariadne::{Label, Report, ReportKind, Source};

use crate::error::TypeError;

/// Render a single [`TypeError`] as a labeled report string, ready to print.
/// `_filename` is accepted for parity with callers that track a source name
/// but is not otherwise used: a bare `Range<usize>` span carries no file id.
pub fn render_diagnostic(error: &TypeError, source: &str, _filename: &str) -> String {
    let span = error.span();
    let start = span.start as usize;
    let source_len = source.len();
    let end = (span.end as usize).max(start + 1).min(source_len.max(start + 1));
    let range: Range<usize> = start.min(source_len)..end;

    let report = Report::build(ReportKind::Error, range.clone())
        .with_message(error.to_string())
        .with_label(Label::new(range).with_message(label_message(error)))
        .finish();

    let mut buf = Vec::new();
    report
        .write(Source::from(source), &mut buf)
        .expect("failed to write diagnostic");
    String::from_utf8_lossy(&buf).into_owned()
}

/// A short, span-local annotation distinct from the error's own headline
/// message -- e.g. "expected `Int`" under a type mismatch, rather than
/// repeating the full `Display` text.
fn label_message(error: &TypeError) -> String {
    match error {
        TypeError::UnboundIndex { index, .. } => format!("index {index} is unbound here"),
        TypeError::UnknownGlobal { name, .. } => format!("`{name}` is not declared"),
        TypeError::UnknownPrimitive { name, .. } => format!("no such primitive `{name}`"),
        TypeError::UnknownConstructor { name, .. } => format!("no such constructor `{name}`"),
        TypeError::UnknownType { name, .. } => format!("no such type `{name}`"),
        TypeError::NoIntType { .. } => "no `Int` primitive type is registered".to_string(),
        TypeError::NoStringType { .. } => "no `String` primitive type is registered".to_string(),
        TypeError::ArityMismatch { expected, found, .. } => {
            format!("expected {expected} argument(s), found {found} here")
        }
        TypeError::TypeMismatch { expected, found, .. } => {
            format!("expected `{expected}`, found `{found}`")
        }
        TypeError::OccursCheck { var, ty, .. } => format!("`{var}` would occur in `{ty}`"),
        TypeError::NotAFunction { found, .. } => format!("`{found}` cannot be applied"),
        TypeError::MissingTypeAnnotation { name, .. } => {
            format!("`{name}` needs an explicit type here")
        }
        TypeError::NonExhaustive { missing, .. } => {
            format!("missing case(s) for {}", missing.join(", "))
        }
    }
}
