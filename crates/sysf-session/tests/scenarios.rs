//! Worked scenarios driven entirely through [`Session`]'s public surface.

use sysf_eval::{EvalError, Value};
use sysf_session::{Session, SysfError};

#[test]
fn s1_arithmetic_reduces_through_the_prelude_prim_ops() {
    let session = Session::new();
    let outcome = session.eval_expression("1 + 2").unwrap();
    assert!(matches!(outcome.value, Value::Int(3)));
}

#[test]
fn s2_precedence_is_left_to_right_application_of_desugared_operators() {
    let session = Session::new();
    let outcome = session.eval_expression("(1 + 2) * 3").unwrap();
    assert!(matches!(outcome.value, Value::Int(9)));
}

#[test]
fn s3_case_over_a_freshly_declared_data_type_picks_its_branch() {
    let mut session = Session::new();
    session.load("flag : Bool = False").unwrap();
    let outcome = session
        .eval_expression("case flag of { True -> 1 | False -> 0 }")
        .unwrap();
    assert!(matches!(outcome.value, Value::Int(0)));
}

#[test]
fn s4_type_application_on_a_user_defined_polymorphic_term() {
    let session = Session::new();
    let outcome = session.eval_expression("id [Int] 42").unwrap();
    assert!(matches!(outcome.value, Value::Int(42)));
}

#[test]
fn s5_constructor_application_builds_a_value_of_the_right_shape() {
    let session = Session::new();
    let outcome = session.eval_expression("Just 7").unwrap();
    match outcome.value {
        Value::Ctor { ref name, ref args } => {
            assert_eq!(name, "Just");
            assert!(matches!(args.as_slice(), [Value::Int(7)]));
        }
        other => panic!("expected a constructor value, got {other:?}"),
    }
}

#[test]
fn s6_a_prim_op_with_no_handler_type_checks_but_fails_only_when_called() {
    let mut session = Session::new();
    session
        .load("prim_op translate : String -> String")
        .unwrap();

    assert!(session.lookup_type("translate").is_some());

    let err = session.eval_expression("translate \"hello\"").unwrap_err();
    match err {
        SysfError::Eval(EvalError::MissingPrimitive { name }) => assert_eq!(name, "translate"),
        other => panic!("expected MissingPrimitive, got {other:?}"),
    }
}

#[test]
fn law_a_failed_input_does_not_leak_partial_declarations() {
    let mut session = Session::new();
    let before = session.lookup_type("ok").is_none();
    assert!(before);

    // `ok` would elaborate fine on its own, but `bad` fails to type-check,
    // so neither declaration should survive the rolled-back input.
    let result = session.load("ok : Int = 1\nbad : Int = True");
    assert!(result.is_err());
    assert!(session.lookup_type("ok").is_none());
}

#[test]
fn law_later_inputs_see_earlier_ones_global_values() {
    let mut session = Session::new();
    session.load("half_the_answer : Int = 21").unwrap();
    let outcome = session
        .eval_expression("half_the_answer + half_the_answer")
        .unwrap();
    assert!(matches!(outcome.value, Value::Int(42)));
}

#[test]
fn law_a_term_that_calls_itself_fails_at_evaluation_not_type_checking() {
    let mut session = Session::new();
    let err = session.load("loopy : Int = loopy").unwrap_err();
    assert!(matches!(
        err,
        SysfError::Eval(EvalError::UnboundGlobal { ref name }) if name == "loopy"
    ));
}

#[test]
fn law_docstrings_round_trip_through_lookup_doc() {
    let session = Session::new();
    assert_eq!(session.lookup_doc("id", None), Some("Returns its argument unchanged."));
}

#[test]
fn law_list_llm_functions_is_empty_without_any_llm_pragma() {
    let session = Session::new();
    assert!(session.list_llm_functions().is_empty());
}

#[test]
fn law_registering_a_primitive_makes_a_previously_failing_call_succeed() {
    let mut session = Session::new();
    session
        .load("prim_op shout : String -> String")
        .unwrap();
    session.register_primitive("shout", |args: &[Value]| match args {
        [Value::Str(s)] => Ok(Value::Str(s.to_uppercase())),
        _ => unreachable!(),
    });
    let outcome = session.eval_expression("shout \"hi\"").unwrap();
    assert!(matches!(outcome.value, Value::Str(ref s) if s == "HI"));
}

#[test]
fn law_compose_from_the_prelude_chains_two_functions() {
    let mut session = Session::new();
    session.load("inc : Int -> Int = \\x : Int -> x + 1").unwrap();
    session.load("double : Int -> Int = \\x : Int -> x * 2").unwrap();
    let outcome = session
        .eval_expression("compose [Int] [Int] [Int] inc double 10")
        .unwrap();
    assert!(matches!(outcome.value, Value::Int(21)));
}
