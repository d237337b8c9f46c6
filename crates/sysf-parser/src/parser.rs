use sysf_common::span::Span;
use sysf_common::token::{PragmaEntry, Token, TokenKind};

use crate::ast::{
    Branch, CtorDecl, DataDecl, Decl, Module, Pattern, PrimOpDecl, PrimTypeDecl, Term, TermDecl,
    Type,
};
use crate::error::ParseError;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    pub(crate) errors: Vec<ParseError>,
    /// Set while parsing a branch body of a braceless-and-barless `case`
    /// (spec §4.2's alternate form). Application parsing stops short of
    /// consuming a following `Ctor Ident* ->` as an argument, since that
    /// shape is the start of the next branch's pattern, not part of this
    /// branch's body. Parenthesizing a term suspends the guard, the same
    /// escape hatch `parse_lambda_ann_type` gives an arrow-typed parameter.
    case_guard: bool,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
            case_guard: false,
        }
    }

    // ── Token stream primitives ────────────────────────────────────────

    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos.min(self.tokens.len() - 1)].kind
    }

    fn current_span(&self) -> Span {
        self.tokens[self.pos.min(self.tokens.len() - 1)].span
    }

    fn prev_span(&self) -> Span {
        if self.pos == 0 {
            self.current_span()
        } else {
            self.tokens[self.pos - 1].span
        }
    }

    fn bump(&mut self) -> Token {
        let tok = self.tokens[self.pos.min(self.tokens.len() - 1)].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek(), TokenKind::Eof)
    }

    fn error_here(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(message, self.current_span())
    }

    fn expect_kind(&mut self, kind: TokenKind, message: &str) -> Result<Token, ParseError> {
        if std::mem::discriminant(self.peek()) == std::mem::discriminant(&kind) {
            Ok(self.bump())
        } else {
            Err(self.error_here(format!("{message}, found {:?}", self.peek())))
        }
    }

    fn expect_ident(&mut self, message: &str) -> Result<(String, Span), ParseError> {
        match self.peek().clone() {
            TokenKind::Ident(name) => {
                let span = self.current_span();
                self.bump();
                Ok((name, span))
            }
            other => Err(self.error_here(format!("{message}, found {other:?}"))),
        }
    }

    fn expect_constructor(&mut self, message: &str) -> Result<(String, Span), ParseError> {
        match self.peek().clone() {
            TokenKind::Constructor(name) => {
                let span = self.current_span();
                self.bump();
                Ok((name, span))
            }
            other => Err(self.error_here(format!("{message}, found {other:?}"))),
        }
    }

    /// Whether the current token is the first of a new top-level
    /// declaration (or leading trivia attached to one); used both to
    /// decide when the declaration list ends and for error recovery.
    fn at_decl_start(&self) -> bool {
        matches!(
            self.peek(),
            TokenKind::Data
                | TokenKind::PrimType
                | TokenKind::PrimOp
                | TokenKind::Ident(_)
                | TokenKind::DocComment(_)
                | TokenKind::TripleDoc(_)
                | TokenKind::Pragma(_)
                | TokenKind::Eof
        )
    }

    /// After a declaration fails to parse, skip tokens until the next
    /// plausible declaration boundary so later declarations can still be
    /// parsed and reported independently (spec: first-error-only per
    /// declaration, with module-wide rollback still applying overall).
    fn recover_to_next_decl(&mut self) {
        self.bump();
        while !self.at_eof() && !self.at_decl_start() {
            self.bump();
        }
    }

    /// Parse a single term followed by `Eof`, for interactive expression
    /// mode (`eval_expression`) rather than a whole program of declarations.
    pub fn parse_single_term(&mut self) -> Result<Term, ParseError> {
        let term = self.parse_term()?;
        if !self.at_eof() {
            return Err(self.error_here(format!(
                "unexpected trailing token {:?} after expression",
                self.peek()
            )));
        }
        Ok(term)
    }

    // ── Module ─────────────────────────────────────────────────────────

    pub fn parse_module(&mut self) -> Module {
        let mut decls = Vec::new();
        while !self.at_eof() {
            match self.parse_decl() {
                Ok(decl) => decls.push(decl),
                Err(e) => {
                    self.errors.push(e);
                    self.recover_to_next_decl();
                }
            }
        }
        Module { decls }
    }

    fn collect_leading_trivia(&mut self) -> (Option<String>, Vec<PragmaEntry>) {
        let mut docs = Vec::new();
        let mut pragma = Vec::new();
        loop {
            match self.peek().clone() {
                TokenKind::DocComment(text) | TokenKind::TripleDoc(text) => {
                    docs.push(text);
                    self.bump();
                }
                TokenKind::Pragma(entries) => {
                    pragma.extend(entries);
                    self.bump();
                }
                _ => break,
            }
        }
        let doc = if docs.is_empty() {
            None
        } else {
            Some(docs.join("\n"))
        };
        (doc, pragma)
    }

    fn parse_decl(&mut self) -> Result<Decl, ParseError> {
        let (doc, pragma) = self.collect_leading_trivia();
        match self.peek() {
            TokenKind::Data => self.parse_data_decl(doc, pragma),
            TokenKind::PrimType => self.parse_prim_type_decl(doc, pragma),
            TokenKind::PrimOp => self.parse_prim_op_decl(doc, pragma),
            TokenKind::Ident(_) => self.parse_term_decl(doc, pragma),
            TokenKind::Eof => Err(self.error_here("unexpected end of input, expected a declaration")),
            other => Err(self.error_here(format!(
                "unexpected token {other:?}, expected a declaration"
            ))),
        }
    }

    fn parse_data_decl(
        &mut self,
        doc: Option<String>,
        pragma: Vec<PragmaEntry>,
    ) -> Result<Decl, ParseError> {
        let start = self.current_span();
        self.bump(); // data
        let (name, _) = self.expect_constructor("expected a type name after `data`")?;
        let mut type_params = Vec::new();
        while let TokenKind::Ident(_) = self.peek() {
            let (p, _) = self.expect_ident("expected a type parameter")?;
            type_params.push(p);
        }
        self.expect_kind(TokenKind::Equals, "expected `=` in data declaration")?;
        let mut ctors = Vec::new();
        loop {
            ctors.push(self.parse_ctor_decl()?);
            if matches!(self.peek(), TokenKind::Pipe) {
                self.bump();
                continue;
            }
            break;
        }
        let span = start.merge(self.prev_span());
        Ok(Decl::Data(DataDecl {
            name,
            type_params,
            ctors,
            doc,
            pragma,
            span,
        }))
    }

    fn parse_ctor_decl(&mut self) -> Result<CtorDecl, ParseError> {
        let start = self.current_span();
        let (name, _) = self.expect_constructor("expected a constructor name")?;
        let mut fields = Vec::new();
        let mut field_docs = Vec::new();
        while self.starts_type_atom() {
            fields.push(self.parse_type_atom()?);
            // `-- ^` after a field type binds to that field (spec:
            // "Field docs (`-- ^`) bind to the preceding field type").
            field_docs.push(self.collect_param_doc());
        }
        let span = start.merge(self.prev_span());
        Ok(CtorDecl { name, fields, field_docs, span })
    }

    fn parse_prim_type_decl(
        &mut self,
        doc: Option<String>,
        pragma: Vec<PragmaEntry>,
    ) -> Result<Decl, ParseError> {
        let start = self.current_span();
        self.bump(); // prim_type
        let (name, _) = self.expect_constructor("expected a type name after `prim_type`")?;
        let span = start.merge(self.prev_span());
        Ok(Decl::PrimType(PrimTypeDecl {
            name,
            doc,
            pragma,
            span,
        }))
    }

    fn parse_prim_op_decl(
        &mut self,
        doc: Option<String>,
        pragma: Vec<PragmaEntry>,
    ) -> Result<Decl, ParseError> {
        let start = self.current_span();
        self.bump(); // prim_op
        let (name, _) = self.expect_ident("expected an operation name after `prim_op`")?;
        self.expect_kind(
            TokenKind::Colon,
            "expected `:` and a type for this primitive operation",
        )?;
        let ty = self.parse_type()?;
        let span = start.merge(self.prev_span());
        Ok(Decl::PrimOp(PrimOpDecl {
            name,
            ty,
            doc,
            pragma,
            span,
        }))
    }

    fn parse_term_decl(
        &mut self,
        doc: Option<String>,
        pragma: Vec<PragmaEntry>,
    ) -> Result<Decl, ParseError> {
        let start = self.current_span();
        let (name, _) = self.expect_ident("expected a declaration name")?;

        let ty = if matches!(self.peek(), TokenKind::Colon) {
            self.bump();
            Some(self.parse_type()?)
        } else {
            None
        };

        self.expect_kind(TokenKind::Equals, "expected `=` in declaration")?;
        let body = self.parse_term()?;
        let span = start.merge(body.span());
        Ok(Decl::Term(TermDecl {
            name,
            ty,
            body,
            doc,
            pragma,
            span,
        }))
    }

    // ── Types ──────────────────────────────────────────────────────────

    fn starts_type_atom(&self) -> bool {
        matches!(
            self.peek(),
            TokenKind::Ident(_) | TokenKind::Constructor(_) | TokenKind::LParen | TokenKind::Forall
        )
    }

    fn parse_type(&mut self) -> Result<Type, ParseError> {
        if matches!(self.peek(), TokenKind::Forall) {
            self.parse_forall_type()
        } else {
            self.parse_arrow_type()
        }
    }

    fn parse_forall_type(&mut self) -> Result<Type, ParseError> {
        let start = self.current_span();
        self.bump(); // forall
        let mut vars = Vec::new();
        while let TokenKind::Ident(_) = self.peek() {
            let (v, _) = self.expect_ident("expected a type variable")?;
            vars.push(v);
        }
        if vars.is_empty() {
            return Err(self.error_here("expected at least one type variable after `forall`"));
        }
        self.expect_kind(TokenKind::Dot, "expected `.` after forall binders")?;
        let body = self.parse_type()?;
        let end = body.span();
        let mut ty = body;
        for v in vars.into_iter().rev() {
            ty = Type::Forall(v, Box::new(ty), start.merge(end));
        }
        Ok(ty)
    }

    fn parse_arrow_type(&mut self) -> Result<Type, ParseError> {
        let lhs = self.parse_app_type()?;
        // `-- ^` binds to the argument position whose type it follows
        // (spec: "after a type T binds to the argument position whose
        // type is T"), so the doc comment is collected only once `lhs`
        // itself has been fully parsed, not before it.
        let param_doc = self.collect_param_doc();
        if matches!(self.peek(), TokenKind::Arrow) {
            self.bump();
            let rhs = self.parse_arrow_type()?;
            let span = lhs.span().merge(rhs.span());
            Ok(Type::Arrow(Box::new(lhs), Box::new(rhs), param_doc, span))
        } else {
            Ok(lhs)
        }
    }

    fn collect_param_doc(&mut self) -> Option<String> {
        match self.peek().clone() {
            TokenKind::ParamDocComment(text) => {
                self.bump();
                Some(text)
            }
            _ => None,
        }
    }

    fn parse_app_type(&mut self) -> Result<Type, ParseError> {
        let mut ty = self.parse_type_atom()?;
        while self.starts_type_atom() {
            let arg = self.parse_type_atom()?;
            let span = ty.span().merge(arg.span());
            ty = Type::App(Box::new(ty), Box::new(arg), span);
        }
        Ok(ty)
    }

    fn parse_type_atom(&mut self) -> Result<Type, ParseError> {
        match self.peek().clone() {
            TokenKind::Ident(name) => {
                let span = self.current_span();
                self.bump();
                Ok(Type::Var(name, span))
            }
            TokenKind::Constructor(name) => {
                let span = self.current_span();
                self.bump();
                Ok(Type::Con(name, span))
            }
            TokenKind::LParen => {
                self.bump();
                let ty = self.parse_type()?;
                self.expect_kind(TokenKind::RParen, "expected `)` to close type")?;
                Ok(ty)
            }
            TokenKind::Forall => self.parse_forall_type(),
            other => Err(self.error_here(format!("expected a type, found {other:?}"))),
        }
    }

    // ── Terms ──────────────────────────────────────────────────────────

    fn parse_term(&mut self) -> Result<Term, ParseError> {
        match self.peek() {
            TokenKind::Lambda => self.parse_lambda(),
            TokenKind::BigLambda => self.parse_ty_lambda(),
            TokenKind::Let => self.parse_let(),
            TokenKind::Case => self.parse_case(),
            _ => self.parse_additive(),
        }
    }

    fn parse_lambda(&mut self) -> Result<Term, ParseError> {
        let start = self.current_span();
        self.bump(); // \
        let (name, _) = self.expect_ident("expected a parameter name after `\\`")?;
        let ann = if matches!(self.peek(), TokenKind::Colon) {
            self.bump();
            Some(self.parse_lambda_ann_type()?)
        } else {
            None
        };
        self.expect_kind(TokenKind::Arrow, "expected `->` after lambda parameter")?;
        let body = self.parse_term()?;
        let span = start.merge(body.span());
        Ok(Term::Lam(name, ann, Box::new(body), span))
    }

    /// Parse a lambda parameter's type annotation. Unlike `name : T = body`
    /// and `let x : T = e1 in e2` (where `=` unambiguously ends `T`),
    /// `\x : T -> body` uses `->` both as the token that could extend an
    /// arrow type and as the mandatory separator before the body, so a
    /// plain `parse_type` would greedily swallow that separator. A bare
    /// annotation therefore stops at the first application level; a
    /// function-typed parameter must be parenthesized (`\f : (a -> b) ->
    /// …`), which `parse_type_atom`'s `(`-handling already parses as a full
    /// type, arrows included.
    fn parse_lambda_ann_type(&mut self) -> Result<Type, ParseError> {
        if matches!(self.peek(), TokenKind::Forall) {
            self.parse_forall_type()
        } else {
            self.parse_app_type()
        }
    }

    fn parse_ty_lambda(&mut self) -> Result<Term, ParseError> {
        let start = self.current_span();
        self.bump(); // /\ or Λ
        let (name, _) = self.expect_ident("expected a type parameter after `/\\`")?;
        self.expect_kind(TokenKind::Arrow, "expected `->` after type-lambda parameter")?;
        let body = self.parse_term()?;
        let span = start.merge(body.span());
        Ok(Term::TyLam(name, Box::new(body), span))
    }

    fn parse_let(&mut self) -> Result<Term, ParseError> {
        let start = self.current_span();
        self.bump(); // let
        let (name, _) = self.expect_ident("expected a name after `let`")?;
        let ann = if matches!(self.peek(), TokenKind::Colon) {
            self.bump();
            Some(self.parse_type()?)
        } else {
            None
        };
        self.expect_kind(TokenKind::Equals, "expected `=` in let binding")?;
        let value = self.parse_term()?;
        self.expect_kind(TokenKind::In, "expected `in` after let binding")?;
        let body = self.parse_term()?;
        let span = start.merge(body.span());
        Ok(Term::Let(name, ann, Box::new(value), Box::new(body), span))
    }

    fn parse_case(&mut self) -> Result<Term, ParseError> {
        let start = self.current_span();
        self.bump(); // case
        let scrutinee = self.parse_term()?;
        self.expect_kind(TokenKind::Of, "expected `of` after case scrutinee")?;

        let braced = matches!(self.peek(), TokenKind::LBrace);
        if braced {
            self.bump();
        }

        // Braces delimit the branch list unambiguously, so a braced case
        // doesn't need the pattern-start lookahead even nested inside an
        // outer unbraced one; an unbraced case always needs it, since the
        // alternate syntax (spec §4.2) allows neither braces nor bars.
        let outer_guard = self.case_guard;
        self.case_guard = !braced;

        let mut branches = Vec::new();
        let branches_result = loop {
            match self.parse_branch() {
                Ok(branch) => branches.push(branch),
                Err(e) => break Err(e),
            }
            if matches!(self.peek(), TokenKind::Pipe) {
                self.bump();
                continue;
            }
            if !braced && self.looks_like_pattern_start() {
                continue;
            }
            break Ok(());
        };

        self.case_guard = outer_guard;
        branches_result?;

        let end_span = if braced {
            self.expect_kind(TokenKind::RBrace, "expected `}` to close case expression")?
                .span
        } else {
            self.prev_span()
        };

        let span = start.merge(end_span);
        Ok(Term::Case(Box::new(scrutinee), branches, span))
    }

    fn parse_branch(&mut self) -> Result<Branch, ParseError> {
        let start = self.current_span();
        let (ctor, ctor_span) = self.expect_constructor("expected a constructor pattern")?;
        let mut vars = Vec::new();
        while let TokenKind::Ident(_) = self.peek() {
            let (v, _) = self.expect_ident("expected a pattern variable")?;
            vars.push(v);
        }
        let pat_span = ctor_span.merge(self.prev_span());
        self.expect_kind(TokenKind::Arrow, "expected `->` after pattern")?;
        let body = self.parse_term()?;
        let span = start.merge(body.span());
        Ok(Branch {
            pattern: Pattern {
                ctor,
                vars,
                span: pat_span,
            },
            body,
            span,
        })
    }

    fn parse_additive(&mut self) -> Result<Term, ParseError> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                TokenKind::Plus => '+',
                TokenKind::Minus => '-',
                _ => break,
            };
            self.bump();
            let rhs = self.parse_multiplicative()?;
            let span = lhs.span().merge(rhs.span());
            lhs = Term::BinOp(op, Box::new(lhs), Box::new(rhs), span);
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<Term, ParseError> {
        let mut lhs = self.parse_app_term()?;
        loop {
            let op = match self.peek() {
                TokenKind::Star => '*',
                TokenKind::Slash => '/',
                _ => break,
            };
            self.bump();
            let rhs = self.parse_app_term()?;
            let span = lhs.span().merge(rhs.span());
            lhs = Term::BinOp(op, Box::new(lhs), Box::new(rhs), span);
        }
        Ok(lhs)
    }

    fn starts_atom_term(&self) -> bool {
        matches!(
            self.peek(),
            TokenKind::Ident(_)
                | TokenKind::Constructor(_)
                | TokenKind::IntLit(_)
                | TokenKind::StringLit(_)
                | TokenKind::LParen
        )
    }

    /// True when the upcoming tokens are `Ctor Ident* ->` — the shape of a
    /// branch pattern. Used only under [`Parser::case_guard`] to stop a
    /// braceless-and-barless case's branch body from swallowing the next
    /// branch's pattern as an application argument.
    fn looks_like_pattern_start(&self) -> bool {
        if !matches!(self.peek(), TokenKind::Constructor(_)) {
            return false;
        }
        let mut i = self.pos + 1;
        while let Some(tok) = self.tokens.get(i) {
            match tok.kind {
                TokenKind::Ident(_) => i += 1,
                TokenKind::Arrow => return true,
                _ => return false,
            }
        }
        false
    }

    fn parse_app_term(&mut self) -> Result<Term, ParseError> {
        let mut term = self.parse_atom_term()?;
        loop {
            match self.peek() {
                TokenKind::At => {
                    self.bump();
                    let ty = self.parse_type_atom()?;
                    let span = term.span().merge(ty.span());
                    term = Term::TyApp(Box::new(term), ty, span);
                }
                TokenKind::LBracket => {
                    self.bump();
                    let ty = self.parse_type()?;
                    let rb =
                        self.expect_kind(TokenKind::RBracket, "expected `]` to close type application")?;
                    let span = term.span().merge(rb.span);
                    term = Term::TyApp(Box::new(term), ty, span);
                }
                _ if self.starts_atom_term()
                    && !(self.case_guard && self.looks_like_pattern_start()) =>
                {
                    let arg = self.parse_atom_term()?;
                    let span = term.span().merge(arg.span());
                    term = Term::App(Box::new(term), Box::new(arg), span);
                }
                _ => break,
            }
        }
        Ok(term)
    }

    fn parse_atom_term(&mut self) -> Result<Term, ParseError> {
        match self.peek().clone() {
            TokenKind::Ident(name) => {
                let span = self.current_span();
                self.bump();
                Ok(Term::Var(name, span))
            }
            TokenKind::Constructor(name) => {
                let span = self.current_span();
                self.bump();
                Ok(Term::Var(name, span))
            }
            TokenKind::IntLit(v) => {
                let span = self.current_span();
                self.bump();
                Ok(Term::IntLit(v, span))
            }
            TokenKind::StringLit(s) => {
                let span = self.current_span();
                self.bump();
                Ok(Term::StrLit(s, span))
            }
            TokenKind::LParen => {
                let start = self.current_span();
                self.bump();
                // `)` delimits this subterm unambiguously, so the
                // braceless-case pattern-start guard doesn't need to reach
                // inside parens; restored once the subterm is parsed out.
                let outer_guard = self.case_guard;
                self.case_guard = false;
                let term_result = self.parse_term();
                self.case_guard = outer_guard;
                let term = term_result?;
                if matches!(self.peek(), TokenKind::Colon) {
                    self.bump();
                    let ty = self.parse_type()?;
                    let close = self.expect_kind(
                        TokenKind::RParen,
                        "expected `)` to close annotated expression",
                    )?;
                    let span = start.merge(close.span);
                    return Ok(Term::Ann(Box::new(term), ty, span));
                }
                self.expect_kind(TokenKind::RParen, "expected `)` to close expression")?;
                Ok(term)
            }
            other => Err(self.error_here(format!("expected an expression, found {other:?}"))),
        }
    }
}
