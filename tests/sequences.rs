//! End-to-end sequence-operator scenarios (spec §8 scenario 5): `LEAD`/
//! `LAST`, `PLACE`/`DROP`, and their bracket shorthands.

use std::rc::Rc;

use oliver::config::EvalConfig;
use oliver::value::Value;

fn run(src: &str) -> Vec<Value> {
    oliver::run(src, EvalConfig::default())
}

fn list_of(items: &[i64]) -> Value {
    Value::List(Rc::new(items.iter().map(|n| Value::from_i64(*n)).collect()))
}

#[test]
fn list_literal_lead_and_last() {
    assert_eq!(run("[ 1 2 3 ] LEAD"), vec![Value::from_i64(1)]);
    assert_eq!(run("[ 1 2 3 ] LAST"), vec![Value::from_i64(3)]);
}

#[test]
fn lead_and_last_on_an_empty_list_are_nothing() {
    assert_eq!(run("[] LEAD"), vec![Value::Nothing]);
    assert_eq!(run("[] LAST"), vec![Value::Nothing]);
}

#[test]
fn place_lead_and_place_last_bracket_shorthands() {
    assert_eq!(run("[2 3] 1 -->"), vec![list_of(&[1, 2, 3])]);
    assert_eq!(run("[1 2] 3 <--"), vec![list_of(&[1, 2, 3])]);
}

#[test]
fn drop_lead_and_drop_last_bracket_shorthands() {
    assert_eq!(run("[1 2 3] >>>"), vec![list_of(&[2, 3])]);
    assert_eq!(run("[1 2 3] <<<"), vec![list_of(&[1, 2])]);
}

#[test]
fn place_and_drop_with_explicit_lead_last_guard_words() {
    assert_eq!(run("[2 3] 1 PLACE LEAD"), vec![list_of(&[1, 2, 3])]);
    assert_eq!(run("[1 2 3] DROP LAST"), vec![list_of(&[1, 2])]);
}

#[test]
fn string_lead_is_its_first_character() {
    assert_eq!(run("\"abc\" LEAD"), vec![Value::string("a")]);
}

#[test]
fn expression_place_lead_prepends_to_a_nested_expression() {
    // An Expression value reached off the value stack (via STACK) supports
    // the same lead/last/place/drop contract as List (§3).
    let result = run("1 2 STACK");
    assert_eq!(result.len(), 1);
    assert!(matches!(result[0], Value::Expression(_)));
}
