//! Bidirectional `infer`/`check` over core terms (spec §4.4).
//!
//! The core calculus drops per-subterm spans once a surface tree is
//! elaborated (terms carry de Bruijn indices and names only, never a
//! source range -- see [`sysf_core::term::Term`]). Every error raised
//! while checking one declaration or interactive expression is therefore
//! reported at that declaration's own span, passed down through every
//! `infer`/`check` call rather than carried per-node.
use sysf_core::module::Module;
use sysf_core::term::{Branch as CoreBranch, Pattern as CorePattern, Term};

use sysf_common::span::Span;

use crate::env::{self, LocalEnv};
use crate::error::TypeError;
use crate::exhaustiveness;
use crate::ty::Ty;
use crate::unify::InferCtx;

/// Bidirectional checker for one input's worth of terms, against a
/// read-only module snapshot.
pub struct Checker<'m, V> {
    module: &'m Module<V>,
    ctx: InferCtx,
    locals: LocalEnv,
}

impl<'m, V> Checker<'m, V> {
    pub fn new(module: &'m Module<V>) -> Self {
        Self {
            module,
            ctx: InferCtx::new(),
            locals: LocalEnv::new(),
        }
    }

    /// Resolve a type through the unification table, for callers that want
    /// a final answer (e.g. the declaration's recorded type).
    pub fn resolve(&mut self, ty: Ty) -> Ty {
        self.ctx.resolve(ty)
    }

    /// Peel every leading `Forall`, substituting a fresh metavariable for
    /// each bound name. Used wherever a polymorphic type is used without
    /// an explicit type application (spec §4.4's `App` rule: "instantiate
    /// if it is ∀a.… by introducing a fresh unification variable").
    fn instantiate(&mut self, ty: Ty) -> Ty {
        let mut cur = ty;
        loop {
            match cur {
                Ty::Forall(name, body) => {
                    let fresh = self.ctx.fresh_var();
                    cur = body.subst(&name, &fresh);
                }
                other => return other,
            }
        }
    }

    /// Decompose a type into `(param, residual)`, unifying it against a
    /// fresh one-argument arrow if it is itself still a metavariable. A
    /// multi-parameter core arrow (e.g. `Int -> Int -> Int`, flattened
    /// into one `Arrow` node per [`sysf_core::types::Type`]) is curried
    /// one parameter at a time here, since every core `App` supplies
    /// exactly one argument.
    fn split_arrow(&mut self, ty: Ty, span: Span) -> Result<(Ty, Ty), TypeError> {
        let resolved = self.ctx.resolve(ty);
        match resolved {
            Ty::Arrow(mut params, ret) => {
                if params.is_empty() {
                    return Err(TypeError::NotAFunction {
                        found: Ty::Arrow(params, ret),
                        span,
                    });
                }
                let head = params.remove(0);
                let residual = if params.is_empty() {
                    *ret
                } else {
                    Ty::Arrow(params, ret)
                };
                Ok((head, residual))
            }
            Ty::Var(_) => {
                let param = self.ctx.fresh_var();
                let result = self.ctx.fresh_var();
                let arrow = Ty::Arrow(vec![param.clone()], Box::new(result.clone()));
                self.ctx.unify(resolved, arrow, span)?;
                Ok((param, result))
            }
            other => Err(TypeError::NotAFunction { found: other, span }),
        }
    }

    /// Synthesize the type of `term`, or fail with a [`TypeError`].
    pub fn infer(&mut self, term: &Term, span: Span) -> Result<Ty, TypeError> {
        match term {
            Term::Var(index) => self
                .locals
                .get(*index)
                .cloned()
                .ok_or(TypeError::UnboundIndex { index: *index, span }),

            Term::Global(name) => env::lookup_global(self.module, name)
                .ok_or_else(|| TypeError::UnknownGlobal { name: name.clone(), span }),

            Term::PrimOp(name) => env::lookup_primitive(self.module, name)
                .ok_or_else(|| TypeError::UnknownPrimitive { name: name.clone(), span }),

            Term::IntLit(_) => env::int_type(self.module).ok_or(TypeError::NoIntType { span }),

            Term::StrLit(_) => {
                env::string_type(self.module).ok_or(TypeError::NoStringType { span })
            }

            Term::Lam(ann, body) => {
                let param_ty = match ann {
                    Some(t) => Ty::from_core(t),
                    None => {
                        return Err(TypeError::MissingTypeAnnotation {
                            name: "<lambda parameter>".to_string(),
                            span,
                        })
                    }
                };
                self.locals.push(param_ty.clone());
                let body_ty = self.infer(body, span);
                self.locals.pop();
                Ok(Ty::Arrow(vec![param_ty], Box::new(body_ty?)))
            }

            Term::TAbs(name, body) => {
                let body_ty = self.infer(body, span)?;
                Ok(Ty::Forall(name.clone(), Box::new(body_ty)))
            }

            Term::App(f, a) => {
                let f_ty = self.infer(f, span)?;
                let f_ty = self.instantiate(f_ty);
                let (param_ty, result_ty) = self.split_arrow(f_ty, span)?;
                self.check(a, param_ty, span)?;
                Ok(result_ty)
            }

            Term::TApp(f, ty) => {
                let f_ty = self.infer(f, span)?;
                let resolved = self.ctx.resolve(f_ty);
                match resolved {
                    Ty::Forall(name, body) => {
                        let arg_ty = Ty::from_core(ty);
                        Ok(body.subst(&name, &arg_ty))
                    }
                    // The elaborator erases `Constructor [T]` into a bare
                    // `Ctor` before it reaches the core tree, so a
                    // non-polymorphic function position here is a genuine
                    // fault: a type argument with nothing to instantiate.
                    other => Err(TypeError::TypeMismatch {
                        expected: Ty::Forall("_".to_string(), Box::new(other.clone())),
                        found: other,
                        span,
                    }),
                }
            }

            Term::Ctor(name, args) => self.infer_ctor(name, args, span),

            Term::Case(scrutinee, branches) => self.case_type(scrutinee, branches, None, span),

            // The one synthesis rule that switches into checking mode: an
            // explicit `(e : T)` lets an otherwise un-inferable term (an
            // un-annotated lambda, a bare constructor needing a specific
            // instantiation) be used wherever a type must be synthesized.
            Term::Ann(inner, ty) => {
                let ann_ty = Ty::from_core(ty);
                self.check(inner, ann_ty.clone(), span)?;
                Ok(ann_ty)
            }
        }
    }

    /// Check `term` against `expected`, or fail with a [`TypeError`].
    pub fn check(&mut self, term: &Term, expected: Ty, span: Span) -> Result<(), TypeError> {
        let expected = self.ctx.resolve(expected);

        // Checking against a polymorphic expected type: skolemize and
        // recurse, regardless of the term's own shape (spec §4.4:
        // "checking against a ∀a. T introduces the type variable and
        // checks against T").
        if let Ty::Forall(name, body) = &expected {
            let skolem = Ty::Rigid(format!("#skolem{name}"));
            let specialized = body.subst(name, &skolem);
            return self.check(term, specialized, span);
        }

        match (term, &expected) {
            (Term::Lam(ann, body), Ty::Arrow(params, ret)) => {
                if params.is_empty() {
                    return Err(TypeError::NotAFunction {
                        found: expected.clone(),
                        span,
                    });
                }
                let mut params = params.clone();
                let param_ty = params.remove(0);
                let residual = if params.is_empty() {
                    (**ret).clone()
                } else {
                    Ty::Arrow(params, ret.clone())
                };
                if let Some(t) = ann {
                    let ann_ty = Ty::from_core(t);
                    self.ctx.unify(ann_ty, param_ty.clone(), span)?;
                }
                self.locals.push(param_ty);
                let result = self.check(body, residual, span);
                self.locals.pop();
                result
            }

            (Term::Case(scrutinee, branches), _) => {
                self.case_type(scrutinee, branches, Some(expected), span)?;
                Ok(())
            }

            (Term::Ctor(name, args), Ty::TyCon(..)) => {
                let found = self.infer_ctor(name, args, span)?;
                self.ctx.unify(found, expected, span)
            }

            _ => {
                let found = self.infer(term, span)?;
                self.ctx.unify(found, expected, span)
            }
        }
    }

    fn infer_ctor(&mut self, name: &str, args: &[Term], span: Span) -> Result<Ty, TypeError> {
        let scheme = env::lookup_constructor(self.module, name)
            .ok_or_else(|| TypeError::UnknownConstructor { name: name.to_string(), span })?;
        let instantiated = self.instantiate(scheme);
        let (params, ret) = match instantiated {
            Ty::Arrow(params, ret) => (params, *ret),
            other => (Vec::new(), other),
        };
        if args.len() > params.len() {
            return Err(TypeError::ArityMismatch {
                expected: params.len(),
                found: args.len(),
                span,
            });
        }
        for (arg, field_ty) in args.iter().zip(params.iter()) {
            self.check(arg, field_ty.clone(), span)?;
        }
        let residual = if args.len() == params.len() {
            ret
        } else {
            Ty::Arrow(params[args.len()..].to_vec(), Box::new(ret))
        };
        Ok(residual)
    }

    /// Shared implementation of the `Case` synthesis and checking rules:
    /// infer the scrutinee's data type, bind each branch's pattern
    /// variables at their specialized field types, then either check
    /// every branch body against `expected` or infer and unify a common
    /// result type across branches.
    fn case_type(
        &mut self,
        scrutinee: &Term,
        branches: &[CoreBranch],
        expected: Option<Ty>,
        span: Span,
    ) -> Result<Ty, TypeError> {
        let scrutinee_ty = self.infer(scrutinee, span)?;
        let scrutinee_ty = self.ctx.resolve(scrutinee_ty);
        let (tycon_name, tycon_args) = match env::as_tycon(&scrutinee_ty) {
            Some((name, args)) => (name.to_string(), args.to_vec()),
            None => {
                return Err(TypeError::TypeMismatch {
                    expected: Ty::TyCon("<case scrutinee>".to_string(), Vec::new()),
                    found: scrutinee_ty,
                    span,
                })
            }
        };

        let mut result_ty = expected.clone();
        let mut covered = Vec::with_capacity(branches.len());

        for branch in branches {
            covered.push(branch.pat.ctor.clone());
            let bound = self.bind_pattern(&branch.pat, &tycon_name, &tycon_args, span)?;
            match &expected {
                Some(t) => self.check(&branch.body, t.clone(), span)?,
                None => {
                    let body_ty = self.infer(&branch.body, span)?;
                    result_ty = Some(match result_ty {
                        Some(prev) => {
                            self.ctx.unify(prev.clone(), body_ty, span)?;
                            prev
                        }
                        None => body_ty,
                    });
                }
            }
            for _ in 0..bound {
                self.locals.pop();
            }
        }

        if let Some(data_type) = self.module.data_types.get(&tycon_name) {
            let missing = exhaustiveness::missing_constructors(&data_type.ctors, &covered);
            if !missing.is_empty() {
                return Err(TypeError::NonExhaustive { missing, span });
            }
        }

        Ok(result_ty.unwrap_or_else(|| self.ctx.fresh_var()))
    }

    /// Bind a branch pattern's variables to the constructor's field types,
    /// specialized by the scrutinee's type arguments. Returns the number
    /// of locals pushed, for the caller to pop.
    fn bind_pattern(
        &mut self,
        pat: &CorePattern,
        tycon_name: &str,
        tycon_args: &[Ty],
        span: Span,
    ) -> Result<usize, TypeError> {
        let info = self
            .module
            .constructors
            .get(&pat.ctor)
            .ok_or_else(|| TypeError::UnknownConstructor { name: pat.ctor.clone(), span })?;
        if info.data_type != tycon_name {
            return Err(TypeError::UnknownConstructor { name: pat.ctor.clone(), span });
        }
        if pat.vars.len() != info.field_types.len() {
            return Err(TypeError::ArityMismatch {
                expected: info.field_types.len(),
                found: pat.vars.len(),
                span,
            });
        }
        for field in &info.field_types {
            let mut field_ty = Ty::from_core(field);
            for (param, arg) in info.type_params.iter().zip(tycon_args.iter()) {
                field_ty = field_ty.subst(param, arg);
            }
            self.locals.push(field_ty);
        }
        Ok(pat.vars.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sysf_core::module::{ConstructorInfo, DataTypeInfo, PrimitiveTypeDecl};
    use sysf_core::types::Type as CoreType;

    fn prelude_module() -> Module<()> {
        let mut module = Module::new();
        module.register_primitive_type(PrimitiveTypeDecl { name: "Int".into() });
        module.register_primitive_type(PrimitiveTypeDecl { name: "String".into() });
        module.register_data_type("Bool".into(), Vec::new());
        module.register_constructor(
            "True".into(),
            ConstructorInfo { data_type: "Bool".into(), type_params: Vec::new(), field_types: Vec::new() },
        );
        module.register_constructor(
            "False".into(),
            ConstructorInfo { data_type: "Bool".into(), type_params: Vec::new(), field_types: Vec::new() },
        );
        module.data_types.insert(
            "Maybe".into(),
            DataTypeInfo { type_params: vec!["a".into()], ctors: vec!["Nothing".into(), "Just".into()] },
        );
        module.constructors.insert(
            "Nothing".into(),
            ConstructorInfo { data_type: "Maybe".into(), type_params: vec!["a".into()], field_types: Vec::new() },
        );
        module.global_types.insert("Nothing".into(), CoreType::foralls(&["a".to_string()], CoreType::con("Maybe", vec![CoreType::Var("a".into())])));
        module.constructors.insert(
            "Just".into(),
            ConstructorInfo { data_type: "Maybe".into(), type_params: vec!["a".into()], field_types: vec![CoreType::Var("a".into())] },
        );
        module.global_types.insert(
            "Just".into(),
            CoreType::foralls(
                &["a".to_string()],
                CoreType::arrow(vec![CoreType::Var("a".into())], CoreType::con("Maybe", vec![CoreType::Var("a".into())])),
            ),
        );
        module
            .global_types
            .insert("$prim.int_plus".into(), CoreType::arrow(vec![CoreType::prim("Int"), CoreType::prim("Int")], CoreType::prim("Int")));
        module
    }

    fn span() -> Span {
        Span::new(0, 1)
    }

    #[test]
    fn infers_int_literal() {
        let module = prelude_module();
        let mut checker: Checker<()> = Checker::new(&module);
        let ty = checker.infer(&Term::IntLit(1), span()).unwrap();
        assert_eq!(checker.resolve(ty), Ty::Prim("Int".into()));
    }

    #[test]
    fn infers_primitive_application() {
        let module = prelude_module();
        let mut checker: Checker<()> = Checker::new(&module);
        let term = Term::App(
            Box::new(Term::App(Box::new(Term::PrimOp("int_plus".into())), Box::new(Term::IntLit(1)))),
            Box::new(Term::IntLit(2)),
        );
        let ty = checker.infer(&term, span()).unwrap();
        assert_eq!(checker.resolve(ty), Ty::Prim("Int".into()));
    }

    #[test]
    fn identity_function_applied_at_int() {
        let module = prelude_module();
        let mut checker: Checker<()> = Checker::new(&module);
        // Λa. λx:a. x
        let id = Term::TAbs(
            "a".into(),
            Box::new(Term::Lam(Some(Box::new(CoreType::Var("a".into()))), Box::new(Term::Var(0)))),
        );
        let applied = Term::App(
            Box::new(Term::TApp(Box::new(id), CoreType::prim("Int"))),
            Box::new(Term::IntLit(42)),
        );
        let ty = checker.infer(&applied, span()).unwrap();
        assert_eq!(checker.resolve(ty), Ty::Prim("Int".into()));
    }

    #[test]
    fn constructor_application_instantiates_type_parameter() {
        let module = prelude_module();
        let mut checker: Checker<()> = Checker::new(&module);
        let term = Term::Ctor("Just".into(), vec![Term::IntLit(7)]);
        let ty = checker.infer(&term, span()).unwrap();
        assert_eq!(
            checker.resolve(ty),
            Ty::TyCon("Maybe".into(), vec![Ty::Prim("Int".into())])
        );
    }

    #[test]
    fn unbound_index_is_reported() {
        let module = prelude_module();
        let mut checker: Checker<()> = Checker::new(&module);
        let err = checker.infer(&Term::Var(0), span()).unwrap_err();
        assert!(matches!(err, TypeError::UnboundIndex { index: 0, .. }));
    }

    #[test]
    fn applying_a_non_function_fails() {
        let module = prelude_module();
        let mut checker: Checker<()> = Checker::new(&module);
        let term = Term::App(Box::new(Term::IntLit(1)), Box::new(Term::IntLit(2)));
        let err = checker.infer(&term, span()).unwrap_err();
        assert!(matches!(err, TypeError::NotAFunction { .. }));
    }

    #[test]
    fn case_on_bool_is_exhaustive_with_both_branches() {
        let module = prelude_module();
        let mut checker: Checker<()> = Checker::new(&module);
        let term = Term::Case(
            Box::new(Term::Ctor("True".into(), Vec::new())),
            vec![
                CoreBranch { pat: CorePattern { ctor: "True".into(), vars: Vec::new() }, body: Term::Ctor("False".into(), Vec::new()) },
                CoreBranch { pat: CorePattern { ctor: "False".into(), vars: Vec::new() }, body: Term::Ctor("True".into(), Vec::new()) },
            ],
        );
        let ty = checker.infer(&term, span()).unwrap();
        assert_eq!(checker.resolve(ty), Ty::TyCon("Bool".into(), Vec::new()));
    }

    #[test]
    fn case_missing_a_constructor_is_reported() {
        let module = prelude_module();
        let mut checker: Checker<()> = Checker::new(&module);
        let term = Term::Case(
            Box::new(Term::Ctor("True".into(), Vec::new())),
            vec![CoreBranch {
                pat: CorePattern { ctor: "True".into(), vars: Vec::new() },
                body: Term::Ctor("False".into(), Vec::new()),
            }],
        );
        let err = checker.infer(&term, span()).unwrap_err();
        assert!(matches!(err, TypeError::NonExhaustive { ref missing, .. } if missing == &["False".to_string()]));
    }

    #[test]
    fn case_binds_constructor_fields_specialized_by_scrutinee_type() {
        let module = prelude_module();
        let mut checker: Checker<()> = Checker::new(&module);
        // case (Just 7) of { Nothing -> 0 | Just x -> x }
        let term = Term::Case(
            Box::new(Term::Ctor("Just".into(), vec![Term::IntLit(7)])),
            vec![
                CoreBranch { pat: CorePattern { ctor: "Nothing".into(), vars: Vec::new() }, body: Term::IntLit(0) },
                CoreBranch { pat: CorePattern { ctor: "Just".into(), vars: vec!["x".into()] }, body: Term::Var(0) },
            ],
        );
        let ty = checker.infer(&term, span()).unwrap();
        assert_eq!(checker.resolve(ty), Ty::Prim("Int".into()));
    }
}
