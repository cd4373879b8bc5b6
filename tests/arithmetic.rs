//! End-to-end arithmetic and parenthesization scenarios (spec §8 scenario 1-2).

use oliver::config::EvalConfig;
use oliver::value::{Number, Value};

fn run(src: &str) -> Vec<Value> {
    oliver::run(src, EvalConfig::default())
}

#[test]
fn addition_inside_parens() {
    assert_eq!(run("( 1 + 2 )"), vec![Value::from_i64(3)]);
}

#[test]
fn prefix_unary_minus_compiles_to_postfix_neg() {
    assert_eq!(run("( - 5 )"), vec![Value::from_i64(-5)]);
}

#[test]
fn operators_chain_left_to_right_without_precedence() {
    // The compiler normalizes by position, not precedence (§9): user code
    // must parenthesize to get conventional precedence.
    assert_eq!(run("( ( 2 + 3 ) * 4 )"), vec![Value::from_i64(20)]);
}

#[test]
fn division_by_zero_is_nan_valued_not_a_host_error() {
    assert_eq!(run("( 10 / 0 )"), vec![Value::Number(Number::NaN)]);
}

#[test]
fn floor_division_and_modulo_on_negative_operands() {
    assert_eq!(run("-7 2 FDIV"), vec![Value::from_i64(-4)]);
    assert_eq!(run("-7 2 MOD"), vec![Value::from_i64(1)]);
}

#[test]
fn hex_octal_and_binary_numeric_literals() {
    assert_eq!(run("'0xff'"), vec![Value::from_i64(255)]);
    assert_eq!(run("'0o17'"), vec![Value::from_i64(15)]);
    assert_eq!(run("'0b101'"), vec![Value::from_i64(5)]);
}

#[test]
fn power_of_bare_integers() {
    assert_eq!(run("2 10 POW"), vec![Value::from_i64(1024)]);
}
