//! Surface -> Core elaboration.
//!
//! One pass, top-down, exactly the algorithm of the name-resolution and
//! constructor-disambiguation rules: two-tier (local/global) scope, the
//! `App(Constructor(...), arg)` flattening rule, type-application-of-
//! constructor erasure, operator desugaring into `$prim.*` applications,
//! and docstring/pragma ingestion into a [`ScratchModule`] staged apart
//! from the persistent [`Module`] (committed by the session only after a
//! successful check and evaluation of the whole input).

pub mod error;
pub mod scratch;

use rustc_hash::FxHashMap;

use sysf_common::span::Span;
use sysf_core::{
    Branch as CoreBranch, ConstructorInfo, LlmMetadata, Module, Pattern as CorePattern,
    PrimitiveTypeDecl, Term as CoreTerm, Type as CoreType,
};
use sysf_parser::ast;

pub use error::{ElabError, ElabErrorKind};
pub use scratch::ScratchModule;

/// The fixed operator-desugaring table (C10): surface `+ - * /` map to the
/// primitive named on the right, under the synthetic `$prim.` namespace.
fn desugar_op(op: char) -> &'static str {
    match op {
        '+' => "int_plus",
        '-' => "int_minus",
        '*' => "int_multiply",
        '/' => "int_divide",
        other => unreachable!("surface lexer only produces + - * / operators, got {other:?}"),
    }
}

/// A top-level term declaration, elaborated and ready for the checker.
/// `data`/`prim_type`/`prim_op` declarations have no runtime counterpart;
/// their effect is entirely the registry updates staged in [`ScratchModule`].
#[derive(Debug, Clone)]
pub struct ElaboratedTerm {
    pub name: String,
    pub ty: CoreType,
    pub body: CoreTerm,
    pub span: Span,
}

/// Elaborates one input's worth of surface declarations against an
/// existing, read-only [`Module`], staging every registry update into a
/// [`ScratchModule`] rather than mutating `module` in place.
pub struct Elaborator<'m, V> {
    module: &'m Module<V>,
    scratch: ScratchModule,
    /// Names of in-scope de Bruijn locals, outermost first; index of a
    /// reference to `locals[i]` is `locals.len() - 1 - i`.
    locals: Vec<String>,
    /// The data type currently being declared, if any -- lets its own
    /// constructors reference it (e.g. `data Nat = Zero | Succ Nat`)
    /// before it has been committed anywhere.
    current_data_type: Option<String>,
}

impl<'m, V> Elaborator<'m, V> {
    pub fn new(module: &'m Module<V>) -> Self {
        Self {
            module,
            scratch: ScratchModule::new(),
            locals: Vec::new(),
            current_data_type: None,
        }
    }

    /// Consume the elaborator, returning the registry updates it staged.
    pub fn into_scratch(self) -> ScratchModule {
        self.scratch
    }

    /// Elaborate a whole program (sequence of declarations), e.g. a loaded
    /// source file or the bundled prelude. Declarations are processed in
    /// order so a later declaration may reference an earlier one from the
    /// same input.
    pub fn elaborate_program(
        &mut self,
        decls: &[ast::Decl],
    ) -> Result<Vec<ElaboratedTerm>, ElabError> {
        let mut terms = Vec::new();
        for decl in decls {
            if let Some(term) = self.elaborate_decl(decl)? {
                terms.push(term);
            }
        }
        Ok(terms)
    }

    /// Elaborate a single interactive expression against the module's
    /// existing globals, with no registry side effects of its own.
    pub fn elaborate_expression(&mut self, term: &ast::Term) -> Result<CoreTerm, ElabError> {
        self.elaborate_term(term)
    }

    fn elaborate_decl(&mut self, decl: &ast::Decl) -> Result<Option<ElaboratedTerm>, ElabError> {
        match decl {
            ast::Decl::Data(d) => {
                self.elaborate_data_decl(d)?;
                Ok(None)
            }
            ast::Decl::PrimType(d) => {
                self.scratch
                    .primitive_types
                    .insert(d.name.clone(), PrimitiveTypeDecl { name: d.name.clone() });
                if let Some(doc) = &d.doc {
                    self.scratch.docstrings.insert(d.name.clone(), doc.clone());
                }
                Ok(None)
            }
            ast::Decl::PrimOp(d) => {
                let ty = self.elaborate_type(&d.ty)?;
                let prim_name = format!("$prim.{}", d.name);
                self.scratch.global_types.insert(prim_name.clone(), ty.clone());
                self.record_docs(&d.name, &d.doc, &ty);
                if let Some(meta) = self.extract_llm_metadata(&d.pragma, &ty) {
                    self.scratch.llm_functions.insert(d.name.clone(), meta);
                }
                let _ = prim_name;
                Ok(None)
            }
            ast::Decl::Term(d) => {
                let ty_surface = d.ty.as_ref().ok_or_else(|| {
                    ElabError::new(ElabErrorKind::MissingTypeAnnotation(d.name.clone()), d.span)
                })?;
                let ty = self.elaborate_type(ty_surface)?;
                let body = self.elaborate_term(&d.body)?;
                self.record_docs(&d.name, &d.doc, &ty);
                Ok(Some(ElaboratedTerm {
                    name: d.name.clone(),
                    ty,
                    body,
                    span: d.span,
                }))
            }
        }
    }

    /// Record a declaration's own docstring plus, for an arrow type, its
    /// per-parameter docs under `<name>/arg<i>` (0-based position in the
    /// flattened arrow chain).
    fn record_docs(&mut self, name: &str, doc: &Option<String>, ty: &CoreType) {
        if let Some(doc) = doc {
            self.scratch.docstrings.insert(name.to_string(), doc.clone());
        }
        if let CoreType::Arrow { param_docs: Some(docs), .. } = ty {
            for (i, doc) in docs.iter().enumerate() {
                if let Some(doc) = doc {
                    self.scratch
                        .docstrings
                        .insert(format!("{name}/arg{i}"), doc.clone());
                }
            }
        }
    }

    fn extract_llm_metadata(
        &self,
        pragma: &[sysf_common::token::PragmaEntry],
        ty: &CoreType,
    ) -> Option<LlmMetadata> {
        let is_llm = pragma.iter().any(|e| e.key.is_empty() && e.value == "LLM");
        if !is_llm {
            return None;
        }
        let mut tags = FxHashMap::default();
        let mut description = None;
        for entry in pragma {
            if entry.key.is_empty() {
                continue; // the bare `LLM` tag itself
            }
            if entry.key == "description" {
                description = Some(entry.value.clone());
            } else {
                tags.insert(entry.key.clone(), entry.value.clone());
            }
        }
        let (arg_types, arg_docs) = match ty {
            CoreType::Arrow { params, param_docs, .. } => (
                params.clone(),
                param_docs
                    .clone()
                    .unwrap_or_else(|| vec![None; params.len()]),
            ),
            _ => (Vec::new(), Vec::new()),
        };
        Some(LlmMetadata {
            description,
            arg_types,
            arg_docs,
            tags,
        })
    }

    fn elaborate_data_decl(&mut self, d: &ast::DataDecl) -> Result<(), ElabError> {
        self.scratch
            .register_data_type(d.name.clone(), d.type_params.clone());
        if let Some(doc) = &d.doc {
            self.scratch.docstrings.insert(d.name.clone(), doc.clone());
        }
        let prev = self.current_data_type.replace(d.name.clone());
        let mut result = Ok(());
        for ctor in &d.ctors {
            if let Err(e) = self.elaborate_ctor_decl(d, ctor) {
                result = Err(e);
                break;
            }
        }
        self.current_data_type = prev;
        result
    }

    fn elaborate_ctor_decl(&mut self, data: &ast::DataDecl, ctor: &ast::CtorDecl) -> Result<(), ElabError> {
        let mut field_types = Vec::with_capacity(ctor.fields.len());
        for field in &ctor.fields {
            field_types.push(self.elaborate_type(field)?);
        }
        // Field docs key the same way a function's per-parameter docs do
        // (`record_docs`), just under the constructor's own name rather
        // than a term declaration's.
        for (i, doc) in ctor.field_docs.iter().enumerate() {
            if let Some(doc) = doc {
                self.scratch
                    .docstrings
                    .insert(format!("{}/field{i}", ctor.name), doc.clone());
            }
        }
        self.scratch.register_constructor(
            ctor.name.clone(),
            ConstructorInfo {
                data_type: data.name.clone(),
                type_params: data.type_params.clone(),
                field_types,
            },
        );
        Ok(())
    }

    // ── Types ────────────────────────────────────────────────────────

    fn elaborate_type(&self, ty: &ast::Type) -> Result<CoreType, ElabError> {
        match ty {
            ast::Type::Var(name, _) => Ok(CoreType::Var(name.clone())),
            ast::Type::Con(_, _) | ast::Type::App(_, _, _) => {
                let (name, span, args) = self.type_app_spine(ty)?;
                self.resolve_type_con(&name, args, span)
            }
            ast::Type::Arrow(_, _, _, _) => {
                let (params, docs, ret) = self.elaborate_arrow(ty)?;
                let param_docs = if docs.iter().any(Option::is_some) {
                    Some(docs)
                } else {
                    None
                };
                Ok(CoreType::Arrow {
                    params,
                    ret: Box::new(ret),
                    param_docs,
                })
            }
            ast::Type::Forall(name, body, _) => {
                Ok(CoreType::Forall(name.clone(), Box::new(self.elaborate_type(body)?)))
            }
        }
    }

    /// Flatten a type-application spine `((T a1) a2) a3` into its head
    /// constructor name and elaborated argument list.
    fn type_app_spine(&self, ty: &ast::Type) -> Result<(String, Span, Vec<CoreType>), ElabError> {
        match ty {
            ast::Type::Con(name, span) => Ok((name.clone(), *span, Vec::new())),
            ast::Type::App(f, a, _) => {
                let (name, head_span, mut args) = self.type_app_spine(f)?;
                args.push(self.elaborate_type(a)?);
                Ok((name, head_span, args))
            }
            other => Err(ElabError::new(
                ElabErrorKind::UnknownType("<type application headed by a non-constructor>".into()),
                other.span(),
            )),
        }
    }

    fn resolve_type_con(&self, name: &str, args: Vec<CoreType>, span: Span) -> Result<CoreType, ElabError> {
        if self.scratch.has_primitive_type(self.module, name) {
            Ok(CoreType::Prim(name.to_string()))
        } else if self.scratch.has_data_type(self.module, name)
            || self.current_data_type.as_deref() == Some(name)
        {
            Ok(CoreType::TyCon(name.to_string(), args))
        } else {
            Err(ElabError::new(ElabErrorKind::UnknownType(name.to_string()), span))
        }
    }

    /// Flatten a right-associative arrow chain into its parameter types
    /// (with their parallel `-- ^` docs) and final return type.
    fn elaborate_arrow(
        &self,
        ty: &ast::Type,
    ) -> Result<(Vec<CoreType>, Vec<Option<String>>, CoreType), ElabError> {
        match ty {
            ast::Type::Arrow(lhs, rhs, doc, _) => {
                let lhs_ty = self.elaborate_type(lhs)?;
                let (mut params, mut docs, ret) = self.elaborate_arrow(rhs)?;
                params.insert(0, lhs_ty);
                docs.insert(0, doc.clone());
                Ok((params, docs, ret))
            }
            other => {
                let ret = self.elaborate_type(other)?;
                Ok((Vec::new(), Vec::new(), ret))
            }
        }
    }

    // ── Terms ────────────────────────────────────────────────────────

    fn local_index(&self, name: &str) -> Option<u32> {
        let pos = self.locals.iter().rposition(|n| n == name)?;
        Some((self.locals.len() - 1 - pos) as u32)
    }

    fn push_local(&mut self, name: String) {
        self.locals.push(name);
    }

    fn pop_local(&mut self) {
        self.locals.pop();
    }

    fn resolve_var(&self, name: &str, span: Span) -> Result<CoreTerm, ElabError> {
        if let Some(idx) = self.local_index(name) {
            return Ok(CoreTerm::Var(idx));
        }
        if self.scratch.lookup_constructor(self.module, name).is_some() {
            return Ok(CoreTerm::Ctor(name.to_string(), Vec::new()));
        }
        // A literal `$prim.name` reference (only ever produced internally,
        // never written by a user, but handled here too for robustness).
        if let Some(rest) = name.strip_prefix("$prim.") {
            return Ok(CoreTerm::PrimOp(rest.to_string()));
        }
        // `prim_op` declarations are recorded under the `$prim.`-prefixed
        // key (spec §3.3), but users call them by their bare name -- so a
        // bare identifier resolves to a primitive op first, before falling
        // through to an ordinary global.
        let prim_name = format!("$prim.{name}");
        if self
            .scratch
            .lookup_global_type(self.module, &prim_name)
            .is_some()
        {
            return Ok(CoreTerm::PrimOp(name.to_string()));
        }
        if self.scratch.lookup_global_type(self.module, name).is_some() {
            return Ok(CoreTerm::Global(name.to_string()));
        }
        Err(ElabError::new(ElabErrorKind::UnknownName(name.to_string()), span))
    }

    fn elaborate_term(&mut self, term: &ast::Term) -> Result<CoreTerm, ElabError> {
        match term {
            ast::Term::Var(name, span) => self.resolve_var(name, *span),
            ast::Term::IntLit(v, _) => Ok(CoreTerm::IntLit(*v)),
            ast::Term::StrLit(s, _) => Ok(CoreTerm::StrLit(s.clone())),
            ast::Term::Lam(name, ann, body, _) => {
                let ty = ann.as_ref().map(|t| self.elaborate_type(t)).transpose()?;
                self.push_local(name.clone());
                let body = self.elaborate_term(body);
                self.pop_local();
                Ok(CoreTerm::Lam(ty.map(Box::new), Box::new(body?)))
            }
            ast::Term::TyLam(name, body, _) => {
                Ok(CoreTerm::TAbs(name.clone(), Box::new(self.elaborate_term(body)?)))
            }
            ast::Term::App(f, a, _) => {
                let ef = self.elaborate_term(f)?;
                let ea = self.elaborate_term(a)?;
                match ef {
                    CoreTerm::Ctor(name, mut args) => {
                        args.push(ea);
                        Ok(CoreTerm::Ctor(name, args))
                    }
                    other => Ok(CoreTerm::App(Box::new(other), Box::new(ea))),
                }
            }
            ast::Term::TyApp(f, ty, _) => {
                let ef = self.elaborate_term(f)?;
                match ef {
                    // A constructor's universally-quantified type is
                    // instantiated directly by the checker; the type
                    // argument itself is erased at the core level.
                    CoreTerm::Ctor(name, args) => Ok(CoreTerm::Ctor(name, args)),
                    other => {
                        let core_ty = self.elaborate_type(ty)?;
                        Ok(CoreTerm::TApp(Box::new(other), core_ty))
                    }
                }
            }
            ast::Term::Let(name, ann, value, body, _) => {
                // No core `Let` node: desugars to an (optionally annotated)
                // lambda applied to its value, since evaluation is already
                // call-by-value and this spec has no recursive let.
                let ty = ann.as_ref().map(|t| self.elaborate_type(t)).transpose()?;
                let core_value = self.elaborate_term(value)?;
                self.push_local(name.clone());
                let core_body = self.elaborate_term(body);
                self.pop_local();
                let lam = CoreTerm::Lam(ty.map(Box::new), Box::new(core_body?));
                Ok(CoreTerm::App(Box::new(lam), Box::new(core_value)))
            }
            ast::Term::Case(scrutinee, branches, _) => {
                let core_scrutinee = self.elaborate_term(scrutinee)?;
                let mut core_branches = Vec::with_capacity(branches.len());
                for branch in branches {
                    for var in &branch.pattern.vars {
                        self.push_local(var.clone());
                    }
                    let body = self.elaborate_term(&branch.body);
                    for _ in &branch.pattern.vars {
                        self.pop_local();
                    }
                    core_branches.push(CoreBranch {
                        pat: CorePattern {
                            ctor: branch.pattern.ctor.clone(),
                            vars: branch.pattern.vars.clone(),
                        },
                        body: body?,
                    });
                }
                Ok(CoreTerm::Case(Box::new(core_scrutinee), core_branches))
            }
            ast::Term::BinOp(op, lhs, rhs, _) => {
                let prim = CoreTerm::PrimOp(desugar_op(*op).to_string());
                let el = self.elaborate_term(lhs)?;
                let er = self.elaborate_term(rhs)?;
                Ok(CoreTerm::App(
                    Box::new(CoreTerm::App(Box::new(prim), Box::new(el))),
                    Box::new(er),
                ))
            }
            ast::Term::Ann(inner, ty, _) => {
                let core_inner = self.elaborate_term(inner)?;
                let core_ty = self.elaborate_type(ty)?;
                Ok(CoreTerm::Ann(Box::new(core_inner), Box::new(core_ty)))
            }
        }
    }
}
