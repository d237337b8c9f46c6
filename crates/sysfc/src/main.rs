//! The System F CLI.
//!
//! Stands in for "an external collaborator calling the programmatic
//! interface" (no REPL shell is built here): it loads a file's
//! declarations into a fresh session and, optionally, evaluates one
//! expression against the result.
//!
//! - `sysfc run <file>` - load a file's declarations
//! - `sysfc run <file> --eval <expr>` - also evaluate `<expr>` afterwards

use std::path::PathBuf;
use std::process;

use ariadne::{Label, Report, ReportKind, Source};
use clap::{Parser, Subcommand};
use sysf_session::{Session, SysfError};

#[derive(Parser)]
#[command(name = "sysfc", version, about = "The System F driver")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a file's declarations into a fresh session
    Run {
        /// Path to a source file
        file: PathBuf,

        /// Evaluate this expression against the loaded session afterwards
        #[arg(long)]
        eval: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { file, eval } => {
            if let Err(e) = run(&file, eval.as_deref()) {
                eprintln!("error: {e}");
                process::exit(1);
            }
        }
    }
}

fn run(file: &std::path::Path, eval: Option<&str>) -> Result<(), String> {
    let source = std::fs::read_to_string(file)
        .map_err(|e| format!("failed to read '{}': {e}", file.display()))?;

    let mut session = Session::new();
    match session.load(&source) {
        Ok(names) => {
            for name in &names {
                eprintln!("  loaded: {name}");
            }
        }
        Err(e) => {
            report(&e, &source, file);
            return Err(format!("failed to load '{}'", file.display()));
        }
    }

    if let Some(expr) = eval {
        match session.eval_expression(expr) {
            Ok(outcome) => println!("{outcome}"),
            Err(e) => {
                report(&e, expr, file);
                return Err(format!("failed to evaluate `{expr}`"));
            }
        }
    }

    Ok(())
}

/// Render whichever pipeline stage produced the error. A parse error and a
/// type error both carry a real span, so both get an ariadne-backed report
/// with a caret under the offending range -- a type error through the
/// checker's own `render_diagnostic`, a parse error built inline the same
/// way the teacher's `report_diagnostics` does it, since `ParseError` has
/// no diagnostics module of its own to call into. Elaboration and
/// evaluation errors are printed plainly: neither tier's error type here
/// carries a span (the elaborator erases surface spans once a term is
/// lowered; see `sysf-check/src/infer.rs`'s module doc).
fn report(error: &SysfError, source: &str, file: &std::path::Path) {
    let file_name = file.display().to_string();
    match error {
        SysfError::Parse(errors) => {
            for e in errors {
                let start = e.span.start as usize;
                let end = (e.span.end as usize).max(start + 1);
                let range = start..end;
                let _ = Report::<std::ops::Range<usize>>::build(ReportKind::Error, range.clone())
                    .with_message("Parse error")
                    .with_label(Label::new(range).with_message(&e.message))
                    .finish()
                    .eprint(Source::from(source));
            }
        }
        SysfError::Type(type_error) => {
            eprint!("{}", sysf_check::diagnostics::render_diagnostic(type_error, source, &file_name));
        }
        other => eprintln!("{other}"),
    }
}
