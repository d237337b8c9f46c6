//! End-to-end tests driving a full source string through the lexer,
//! parser, elaborator, checker, and evaluator.

use sysf_check::{infer_term, Ty};
use sysf_common::span::Span;
use sysf_core::module::PrimitiveTypeDecl;
use sysf_core::Module;
use sysf_elab::Elaborator;
use sysf_eval::{Env, Evaluator, HandlerRegistry, Value};

fn prelude_module() -> Module<Value> {
    let mut module: Module<Value> = Module::new();
    module.register_primitive_type(PrimitiveTypeDecl { name: "Int".into() });
    module.register_primitive_type(PrimitiveTypeDecl { name: "String".into() });

    let mut elaborator = Elaborator::new(&module);
    let prim_ops = "\
        prim_op int_plus : Int -> Int -> Int\n\
        prim_op int_minus : Int -> Int -> Int\n\
        prim_op int_multiply : Int -> Int -> Int\n\
        prim_op int_divide : Int -> Int -> Int\n\
        data Bool = True | False\n\
        data Maybe a = Nothing | Just a\n\
        data Pair a b = MkPair a b\n\
    ";
    let (parsed, errs) = sysf_parser::parse(prim_ops);
    assert!(errs.is_empty(), "prelude parse errors: {errs:?}");
    elaborator.elaborate_program(&parsed.decls).unwrap();
    let scratch = elaborator.into_scratch();
    scratch.commit_into(&mut module);
    module
}

fn registry() -> HandlerRegistry {
    let mut reg = HandlerRegistry::new();
    reg.register("int_plus", |args: &[Value]| match args {
        [Value::Int(a), Value::Int(b)] => Ok(Value::Int(a + b)),
        _ => unreachable!(),
    });
    reg.register("int_minus", |args: &[Value]| match args {
        [Value::Int(a), Value::Int(b)] => Ok(Value::Int(a - b)),
        _ => unreachable!(),
    });
    reg.register("int_multiply", |args: &[Value]| match args {
        [Value::Int(a), Value::Int(b)] => Ok(Value::Int(a * b)),
        _ => unreachable!(),
    });
    reg.register("int_divide", |args: &[Value]| match args {
        [Value::Int(_), Value::Int(0)] => Err(sysf_eval::EvalError::DivisionByZero),
        [Value::Int(a), Value::Int(b)] => Ok(Value::Int(a / b)),
        _ => unreachable!(),
    });
    reg
}

fn run_expression(module: &Module<Value>, reg: &HandlerRegistry, src: &str) -> Value {
    let (term, errs) = sysf_parser::parse_expression(src);
    assert!(errs.is_empty(), "parse errors for {src:?}: {errs:?}");
    let mut elaborator = Elaborator::new(module);
    let core_term = elaborator.elaborate_expression(&term.unwrap()).unwrap();
    infer_term(module, &core_term, Span::new(0, src.len() as u32)).unwrap();
    let evaluator = Evaluator::new(module, reg);
    evaluator.eval(&core_term, &Env::empty()).unwrap()
}

#[test]
fn arithmetic_desugars_and_evaluates() {
    let module = prelude_module();
    let reg = registry();
    let result = run_expression(&module, &reg, "1 + 2 * 3");
    assert!(matches!(result, Value::Int(7)));
}

#[test]
fn lambda_application_reduces() {
    let module = prelude_module();
    let reg = registry();
    let result = run_expression(&module, &reg, "(\\x : Int -> x + 1) 41");
    assert!(matches!(result, Value::Int(42)));
}

#[test]
fn polymorphic_identity_erases_type_application() {
    let module = prelude_module();
    let reg = registry();
    let result = run_expression(
        &module,
        &reg,
        "(/\\a -> \\x : a -> x) [Int] 7",
    );
    assert!(matches!(result, Value::Int(7)));
}

#[test]
fn case_over_maybe_picks_matching_branch() {
    let module = prelude_module();
    let reg = registry();
    let result = run_expression(
        &module,
        &reg,
        "case (Just 9) of { Just x -> x + 1 | Nothing -> 0 }",
    );
    assert!(matches!(result, Value::Int(10)));
}

#[test]
fn case_over_nothing_picks_its_own_branch() {
    let module = prelude_module();
    let reg = registry();
    let result = run_expression(
        &module,
        &reg,
        "case Nothing of { Just x -> x | Nothing -> 0 }",
    );
    assert!(matches!(result, Value::Int(0)));
}

#[test]
fn nested_constructor_pattern_binds_pair_fields_in_order() {
    let module = prelude_module();
    let reg = registry();
    let result = run_expression(
        &module,
        &reg,
        "case (MkPair 1 2) of { MkPair a b -> a - b }",
    );
    assert!(matches!(result, Value::Int(-1)));
}

#[test]
fn division_by_zero_is_reported_at_the_handler_not_the_checker() {
    let module = prelude_module();
    let reg = registry();
    let (term, errs) = sysf_parser::parse_expression("10 / 0");
    assert!(errs.is_empty());
    let mut elaborator = Elaborator::new(&module);
    let core_term = elaborator.elaborate_expression(&term.unwrap()).unwrap();
    infer_term(&module, &core_term, Span::new(0, 6)).unwrap();
    let evaluator = Evaluator::new(&module, &reg);
    let err = evaluator.eval(&core_term, &Env::empty()).unwrap_err();
    assert_eq!(err, sysf_eval::EvalError::DivisionByZero);
}

#[test]
fn let_desugars_to_an_applied_lambda() {
    let module = prelude_module();
    let reg = registry();
    let result = run_expression(&module, &reg, "let x = 5 in x + x");
    assert!(matches!(result, Value::Int(10)));
}

#[test]
fn type_inference_surfaces_through_the_checker_entry_point() {
    let module = prelude_module();
    let (term, errs) = sysf_parser::parse_expression("True");
    assert!(errs.is_empty());
    let mut elaborator = Elaborator::new(&module);
    let core_term = elaborator.elaborate_expression(&term.unwrap()).unwrap();
    let ty = infer_term(&module, &core_term, Span::new(0, 4)).unwrap();
    assert_eq!(ty, Ty::TyCon("Bool".into(), vec![]));
}
