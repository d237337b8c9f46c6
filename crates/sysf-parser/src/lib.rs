//! Recursive-descent parser producing the surface AST.
//!
//! Transforms the token stream from `sysf-lexer` directly into a plain,
//! name-based [`ast::Module`] -- not a lossless CST. There is no tooling
//! in scope (formatter, language server) that would need to reconstruct
//! the original text from the tree, so there is nothing to preserve
//! whitespace or trivia for.

pub mod ast;
pub mod error;
mod parser;

use sysf_common::error::LexError;
use sysf_lexer::Lexer;

pub use ast::Module;
pub use error::ParseError;

/// Parse a source file into a surface [`Module`] plus any lexical and
/// parse errors encountered.
///
/// A non-empty lexical error list is treated as fatal: the lexer's
/// output cannot be trusted token-by-token once the source contains
/// characters it could not classify, so parsing is skipped entirely and
/// only the lex errors (translated to [`ParseError`]) are returned.
pub fn parse(source: &str) -> (Module, Vec<ParseError>) {
    let (tokens, lex_errors) = Lexer::tokenize(source);
    if !lex_errors.is_empty() {
        return (Module::default(), lex_errors_to_parse_errors(lex_errors));
    }

    let mut parser = parser::Parser::new(tokens);
    let module = parser.parse_module();
    (module, parser.errors)
}

/// Parse a single term for interactive expression mode, e.g. a REPL's
/// `eval_expression(source)`. Unlike [`parse`], this expects the entire
/// input to be one term with no trailing tokens.
pub fn parse_expression(source: &str) -> (Option<ast::Term>, Vec<ParseError>) {
    let (tokens, lex_errors) = Lexer::tokenize(source);
    if !lex_errors.is_empty() {
        return (None, lex_errors_to_parse_errors(lex_errors));
    }

    let mut parser = parser::Parser::new(tokens);
    match parser.parse_single_term() {
        Ok(term) => (Some(term), parser.errors),
        Err(e) => {
            parser.errors.push(e);
            (None, parser.errors)
        }
    }
}

fn lex_errors_to_parse_errors(lex_errors: Vec<LexError>) -> Vec<ParseError> {
    lex_errors
        .into_iter()
        .map(|e| ParseError::new(e.kind.to_string(), e.span))
        .collect()
}
