use serde::Serialize;

use sysf_common::span::Span;
use sysf_common::token::PragmaEntry;

/// A parsed source file: an ordered list of top-level declarations.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Module {
    pub decls: Vec<Decl>,
}

#[derive(Debug, Clone, Serialize)]
pub enum Decl {
    Data(DataDecl),
    Term(TermDecl),
    PrimType(PrimTypeDecl),
    PrimOp(PrimOpDecl),
}

impl Decl {
    pub fn span(&self) -> Span {
        match self {
            Decl::Data(d) => d.span,
            Decl::Term(d) => d.span,
            Decl::PrimType(d) => d.span,
            Decl::PrimOp(d) => d.span,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DataDecl {
    pub name: String,
    pub type_params: Vec<String>,
    pub ctors: Vec<CtorDecl>,
    pub doc: Option<String>,
    pub pragma: Vec<PragmaEntry>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize)]
pub struct CtorDecl {
    pub name: String,
    pub fields: Vec<Type>,
    /// `-- ^` docs, one slot per field, parallel to `fields`.
    pub field_docs: Vec<Option<String>>,
    pub span: Span,
}

/// A top-level binding. `ty` is `None` when the declaration has no
/// explicit `name : Type` signature; the checker requires one at
/// elaboration/checking time (`MissingTypeAnnotation`), the parser itself
/// does not.
#[derive(Debug, Clone, Serialize)]
pub struct TermDecl {
    pub name: String,
    pub ty: Option<Type>,
    pub body: Term,
    pub doc: Option<String>,
    pub pragma: Vec<PragmaEntry>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrimTypeDecl {
    pub name: String,
    pub doc: Option<String>,
    pub pragma: Vec<PragmaEntry>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrimOpDecl {
    pub name: String,
    pub ty: Type,
    pub doc: Option<String>,
    pub pragma: Vec<PragmaEntry>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize)]
pub enum Type {
    /// A lowercase-initial type variable, e.g. `a`.
    Var(String, Span),
    /// An uppercase-initial type constructor, e.g. `Int`, `Maybe`.
    Con(String, Span),
    /// `T1 -> T2`, optionally carrying the `-- ^` doc for this argument
    /// position, attached lexically while the arrow chain is parsed.
    Arrow(Box<Type>, Box<Type>, Option<String>, Span),
    /// `forall a. T`
    Forall(String, Box<Type>, Span),
    /// `T1 T2` (type-level application, e.g. `Maybe a`).
    App(Box<Type>, Box<Type>, Span),
}

impl Type {
    pub fn span(&self) -> Span {
        match self {
            Type::Var(_, s) => *s,
            Type::Con(_, s) => *s,
            Type::Arrow(_, _, _, s) => *s,
            Type::Forall(_, _, s) => *s,
            Type::App(_, _, s) => *s,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub enum Term {
    Var(String, Span),
    IntLit(i64, Span),
    StrLit(String, Span),
    /// `\x -> e` or `\x : T -> e`
    Lam(String, Option<Type>, Box<Term>, Span),
    /// `/\a -> e`
    TyLam(String, Box<Term>, Span),
    App(Box<Term>, Box<Term>, Span),
    /// `e @T` or `e [T]`
    TyApp(Box<Term>, Type, Span),
    /// `let x = e1 in e2`, or `let x : T = e1 in e2`
    Let(String, Option<Type>, Box<Term>, Box<Term>, Span),
    Case(Box<Term>, Vec<Branch>, Span),
    /// `e1 <op> e2` for `+ - * /`; desugared to `PrimOp` calls by the
    /// elaborator rather than by the parser.
    BinOp(char, Box<Term>, Box<Term>, Span),
    /// `(e : T)`, an explicit type annotation.
    Ann(Box<Term>, Type, Span),
}

impl Term {
    pub fn span(&self) -> Span {
        match self {
            Term::Var(_, s) => *s,
            Term::IntLit(_, s) => *s,
            Term::StrLit(_, s) => *s,
            Term::Lam(_, _, _, s) => *s,
            Term::TyLam(_, _, s) => *s,
            Term::App(_, _, s) => *s,
            Term::TyApp(_, _, s) => *s,
            Term::Let(_, _, _, _, s) => *s,
            Term::Case(_, _, s) => *s,
            Term::BinOp(_, _, _, s) => *s,
            Term::Ann(_, _, s) => *s,
        }
    }
}

/// A single `Ctor x1 x2 -> body` alternative. Patterns are shallow: a
/// constructor applied to bare variable binders, never nested.
#[derive(Debug, Clone, Serialize)]
pub struct Branch {
    pub pattern: Pattern,
    pub body: Term,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize)]
pub struct Pattern {
    pub ctor: String,
    pub vars: Vec<String>,
    pub span: Span,
}
