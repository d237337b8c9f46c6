//! Call-by-value, left-to-right evaluation of core terms (spec §4.5).

use std::rc::Rc;

use sysf_core::module::Module;
use sysf_core::term::{Branch, Term};

use crate::env::Env;
use crate::error::EvalError;
use crate::registry::PrimitiveRegistry;
use crate::value::Value;

/// Evaluates closed, well-typed core terms against a module snapshot and a
/// host-supplied primitive registry. Holds no mutable state of its own
/// beyond what each `eval` call threads through explicitly -- every
/// top-level declaration and every interactive expression gets its own
/// `Evaluator` (or, equivalently, the same one reused with a fresh `Env`),
/// since nothing here needs to persist between calls except the module's
/// own `global_values`, which the session commits after the fact (spec
/// §4.5 "Global-value memoization").
pub struct Evaluator<'m, R: PrimitiveRegistry> {
    module: &'m Module<Value>,
    registry: &'m R,
}

impl<'m, R: PrimitiveRegistry> Evaluator<'m, R> {
    pub fn new(module: &'m Module<Value>, registry: &'m R) -> Self {
        Self { module, registry }
    }

    /// Evaluate a closed term under `env`.
    pub fn eval(&self, term: &Term, env: &Env) -> Result<Value, EvalError> {
        match term {
            Term::Var(index) => env
                .get(*index)
                .ok_or(EvalError::UnboundLocal { index: *index }),

            Term::Global(name) => self
                .module
                .global_values
                .get(name)
                .cloned()
                .ok_or_else(|| EvalError::UnboundGlobal { name: name.clone() }),

            Term::Lam(_param_ty, body) => Ok(Value::Closure {
                env: env.clone(),
                body: Rc::new((**body).clone()),
            }),

            Term::TAbs(_name, body) => Ok(Value::TClosure {
                env: env.clone(),
                body: Rc::new((**body).clone()),
            }),

            Term::App(f, a) => {
                let vf = self.eval(f, env)?;
                let va = self.eval(a, env)?;
                self.apply(vf, va)
            }

            // Type erasure: a `Λa. e` closure simply re-evaluates its body
            // in the captured environment; a constructor value passes
            // through unchanged (spec §4.5 `TApp`).
            Term::TApp(f, _ty) => {
                let vf = self.eval(f, env)?;
                match vf {
                    Value::TClosure { env: cenv, body } => self.eval(&body, &cenv),
                    other => Ok(other),
                }
            }

            Term::IntLit(v) => Ok(Value::Int(*v)),
            Term::StrLit(s) => Ok(Value::Str(s.clone())),

            Term::PrimOp(name) => {
                let arity = self
                    .module
                    .primitive_type(name)
                    .map(|ty| ty.arrow_arity())
                    .unwrap_or(0);
                Ok(Value::PrimOp { name: name.clone(), arity, applied: Vec::new() })
            }

            Term::Ctor(name, args) => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval(arg, env)?);
                }
                Ok(Value::Ctor { name: name.clone(), args: values })
            }

            Term::Case(scrutinee, branches) => self.eval_case(scrutinee, branches, env),

            // An explicit annotation carries no runtime weight; it exists
            // only to drive the checker into checking mode.
            Term::Ann(inner, _ty) => self.eval(inner, env),
        }
    }

    fn apply(&self, vf: Value, va: Value) -> Result<Value, EvalError> {
        match vf {
            Value::Closure { env, body } => {
                let extended = env.extend(va);
                self.eval(&body, &extended)
            }
            Value::PrimOp { name, arity, mut applied } => {
                applied.push(va);
                if applied.len() == arity {
                    self.registry.call(&name, &applied)
                } else {
                    Ok(Value::PrimOp { name, arity, applied })
                }
            }
            other => Err(EvalError::NotAFunction { found: other.shape() }),
        }
    }

    /// Try each branch top-to-bottom; the first whose pattern's constructor
    /// name and arity match the scrutinee's value wins (spec §4.5
    /// "Pattern-matching semantics": no reordering, no guards).
    fn eval_case(&self, scrutinee: &Term, branches: &[Branch], env: &Env) -> Result<Value, EvalError> {
        let scrutinee_val = self.eval(scrutinee, env)?;
        let (ctor_name, ctor_args) = match scrutinee_val {
            Value::Ctor { name, args } => (name, args),
            other => return Err(EvalError::NotAConstructor { found: other.shape() }),
        };

        for branch in branches {
            if branch.pat.ctor == ctor_name && branch.pat.vars.len() == ctor_args.len() {
                let mut branch_env = env.clone();
                for arg in &ctor_args {
                    branch_env = branch_env.extend(arg.clone());
                }
                return self.eval(&branch.body, &branch_env);
            }
        }
        Err(EvalError::PatternMatchFailure { ctor: ctor_name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sysf_core::module::PrimitiveTypeDecl;
    use sysf_core::term::{Branch as CoreBranch, Pattern as CorePattern};
    use sysf_core::types::Type as CoreType;

    use crate::registry::HandlerRegistry;

    fn int_plus_registry() -> HandlerRegistry {
        let mut registry = HandlerRegistry::new();
        registry.register("int_plus", |args: &[Value]| match args {
            [Value::Int(a), Value::Int(b)] => Ok(Value::Int(a + b)),
            _ => unreachable!(),
        });
        registry.register("int_divide", |args: &[Value]| match args {
            [Value::Int(_), Value::Int(0)] => Err(EvalError::DivisionByZero),
            [Value::Int(a), Value::Int(b)] => Ok(Value::Int(a / b)),
            _ => unreachable!(),
        });
        registry
    }

    fn module_with_int_plus() -> Module<Value> {
        let mut module: Module<Value> = Module::new();
        module.register_primitive_type(PrimitiveTypeDecl { name: "Int".into() });
        module.global_types.insert(
            "$prim.int_plus".into(),
            CoreType::arrow(vec![CoreType::prim("Int"), CoreType::prim("Int")], CoreType::prim("Int")),
        );
        module.global_types.insert(
            "$prim.int_divide".into(),
            CoreType::arrow(vec![CoreType::prim("Int"), CoreType::prim("Int")], CoreType::prim("Int")),
        );
        module
    }

    #[test]
    fn evaluates_one_plus_two() {
        let module = module_with_int_plus();
        let registry = int_plus_registry();
        let evaluator = Evaluator::new(&module, &registry);
        let term = Term::App(
            Box::new(Term::App(Box::new(Term::PrimOp("int_plus".into())), Box::new(Term::IntLit(1)))),
            Box::new(Term::IntLit(2)),
        );
        let result = evaluator.eval(&term, &Env::empty()).unwrap();
        assert!(matches!(result, Value::Int(3)));
    }

    #[test]
    fn division_by_zero_surfaces_as_eval_error() {
        let module = module_with_int_plus();
        let registry = int_plus_registry();
        let evaluator = Evaluator::new(&module, &registry);
        let term = Term::App(
            Box::new(Term::App(Box::new(Term::PrimOp("int_divide".into())), Box::new(Term::IntLit(1)))),
            Box::new(Term::IntLit(0)),
        );
        let err = evaluator.eval(&term, &Env::empty()).unwrap_err();
        assert_eq!(err, EvalError::DivisionByZero);
    }

    #[test]
    fn missing_primitive_handler_is_reported_only_at_call_site() {
        let mut module: Module<Value> = Module::new();
        module.global_types.insert("$prim.translate".into(), CoreType::arrow(vec![CoreType::prim("String")], CoreType::prim("String")));
        let registry = HandlerRegistry::new();
        let evaluator = Evaluator::new(&module, &registry);
        let term = Term::App(
            Box::new(Term::PrimOp("translate".into())),
            Box::new(Term::StrLit("hello".into())),
        );
        let err = evaluator.eval(&term, &Env::empty()).unwrap_err();
        assert!(matches!(err, EvalError::MissingPrimitive { ref name } if name == "translate"));
    }

    #[test]
    fn case_extends_environment_in_pattern_order() {
        // case (Pair 1 2) of { Pair a b -> a }  -- here branch.vars = [a, b],
        // elaborated so that `a` has the higher de Bruijn index (pushed
        // first) and `b` is innermost (index 0); the term below references
        // `a` as Var(1).
        let module: Module<Value> = Module::new();
        let registry = HandlerRegistry::new();
        let evaluator = Evaluator::new(&module, &registry);
        let term = Term::Case(
            Box::new(Term::Ctor("Pair".into(), vec![Term::IntLit(1), Term::IntLit(2)])),
            vec![CoreBranch {
                pat: CorePattern { ctor: "Pair".into(), vars: vec!["a".into(), "b".into()] },
                body: Term::Var(1),
            }],
        );
        let result = evaluator.eval(&term, &Env::empty()).unwrap();
        assert!(matches!(result, Value::Int(1)));
    }

    #[test]
    fn pattern_match_failure_when_no_branch_matches() {
        let module: Module<Value> = Module::new();
        let registry = HandlerRegistry::new();
        let evaluator = Evaluator::new(&module, &registry);
        let term = Term::Case(
            Box::new(Term::Ctor("Nothing".into(), vec![])),
            vec![CoreBranch {
                pat: CorePattern { ctor: "Just".into(), vars: vec!["x".into()] },
                body: Term::Var(0),
            }],
        );
        let err = evaluator.eval(&term, &Env::empty()).unwrap_err();
        assert!(matches!(err, EvalError::PatternMatchFailure { ref ctor } if ctor == "Nothing"));
    }

    #[test]
    fn type_application_is_erased_at_runtime() {
        let module: Module<Value> = Module::new();
        let registry = HandlerRegistry::new();
        let evaluator = Evaluator::new(&module, &registry);
        // (/\a -> \x:a -> x) [Int] 42
        let id = Term::TAbs(
            "a".into(),
            Box::new(Term::Lam(Some(Box::new(CoreType::Var("a".into()))), Box::new(Term::Var(0)))),
        );
        let applied = Term::App(
            Box::new(Term::TApp(Box::new(id), CoreType::prim("Int"))),
            Box::new(Term::IntLit(42)),
        );
        let result = evaluator.eval(&applied, &Env::empty()).unwrap();
        assert!(matches!(result, Value::Int(42)));
    }

    #[test]
    fn partial_application_of_a_primitive_accumulates_arguments() {
        let module = module_with_int_plus();
        let registry = int_plus_registry();
        let evaluator = Evaluator::new(&module, &registry);
        let partial = evaluator
            .eval(
                &Term::App(Box::new(Term::PrimOp("int_plus".into())), Box::new(Term::IntLit(1))),
                &Env::empty(),
            )
            .unwrap();
        match partial {
            Value::PrimOp { applied, arity, .. } => {
                assert_eq!(applied.len(), 1);
                assert_eq!(arity, 2);
            }
            other => panic!("expected a partially applied PrimOp, got {other:?}"),
        }
    }
}
