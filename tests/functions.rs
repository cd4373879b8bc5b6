//! End-to-end function definition, application, and closure-capture
//! scenarios (spec §8 scenarios 3-4), plus `BIND`/`APPLY` coverage.

use oliver::config::EvalConfig;
use oliver::value::Value;

fn run(src: &str) -> Vec<Value> {
    oliver::run(src, EvalConfig::default())
}

#[test]
fn function_definition_and_application() {
    assert_eq!(run("def f (x) (x * x) ; f 4"), vec![Value::from_i64(16)]);
}

#[test]
fn closure_captures_the_defining_scope() {
    let src = "def adder (x) (def (y) (x + y)) ; let add3 = adder 3 ; add3 10";
    assert_eq!(run(src), vec![Value::from_i64(13)]);
}

#[test]
fn idnt_pushes_a_defined_name_unevaluated_instead_of_calling_it() {
    // `@` (IDNT) takes the next code item without evaluating it (§4.3): even
    // though `identity` names a zero-... single-argument lambda, `@ identity`
    // must not apply it.
    let src = "def identity (x) (x) ; @ identity";
    assert_eq!(run(src), vec![Value::symbol("identity")]);
}

#[test]
fn lambda_literal_closes_over_let_bound_values() {
    let src = "let base = 100 ; let addbase = lambda (x) (x + base) ; addbase 5";
    assert_eq!(run(src), vec![Value::from_i64(105)]);
}

#[test]
fn bind_fixes_a_leading_argument_and_returns_a_new_lambda() {
    let src = "def add (x y) (x + y) ; let add5 = add == 5 ; add5 10";
    assert_eq!(run(src), vec![Value::from_i64(15)]);
}

#[test]
fn let_apply_runs_the_call_and_assigns_the_result() {
    let src = "def add (x y) (x + y) ; let total <== add 2 3 ; total";
    assert_eq!(run(src), vec![Value::from_i64(5)]);
}

#[test]
fn scope_introduced_inside_a_lambda_does_not_escape_its_end_scope() {
    let src = "let x = 1 ; def f () (let x = 2) ; f ; x";
    assert_eq!(run(src), vec![Value::from_i64(1)]);
}
