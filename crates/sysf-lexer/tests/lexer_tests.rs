use insta::assert_yaml_snapshot;
use serde::Serialize;
use sysf_lexer::Lexer;

/// A human-readable representation of a token for snapshot testing.
#[derive(Serialize)]
struct TokenSnapshot {
    kind: String,
    span: (u32, u32),
}

fn tokenize_snapshot(source: &str) -> Vec<TokenSnapshot> {
    let (tokens, errors) = Lexer::tokenize(source);
    assert!(errors.is_empty(), "unexpected lex errors: {errors:?}");
    tokens
        .into_iter()
        .map(|tok| TokenSnapshot {
            kind: format!("{:?}", tok.kind),
            span: (tok.span.start, tok.span.end),
        })
        .collect()
}

#[test]
fn snapshot_function_declaration() {
    let source = "add : Int -> Int -> Int\nadd = \\x -> \\y -> x + y";
    assert_yaml_snapshot!(tokenize_snapshot(source));
}

#[test]
fn snapshot_polymorphic_identity() {
    let source = "id : forall a. a -> a\nid = /\\a -> \\x -> x";
    assert_yaml_snapshot!(tokenize_snapshot(source));
}

#[test]
fn snapshot_data_declaration_with_docstring() {
    let source = "-- | A binary tree.\ndata Tree a = Leaf | Node (Tree a) a (Tree a)";
    assert_yaml_snapshot!(tokenize_snapshot(source));
}

#[test]
fn snapshot_pragma_on_prim_op() {
    let source = "{-# LLM model=gpt-4, pure=true #-}\nprim_op add_int : Int -> Int -> Int";
    assert_yaml_snapshot!(tokenize_snapshot(source));
}

#[test]
fn tokenize_reports_unexpected_character() {
    let (_, errors) = Lexer::tokenize("let x $ 1");
    assert_eq!(errors.len(), 1);
}
