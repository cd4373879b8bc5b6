//! Binary operators (§4.3): arithmetic (`ADD`…`POW`), comparison (`EQ`…`GE`),
//! and logical (`AND`/`OR`/`XOR`) opcodes. Every handler pops `y` (top) then
//! `x` via [`Evaluator::pop_pair`] and pushes one result — order matters for
//! non-commutative operators (`SUB`, `DIV`, …).

use crate::eval::Evaluator;
use crate::opcode::OpCode;
use crate::value::{Boolean, Number, Value};

pub fn dispatch(ev: &mut Evaluator, op: OpCode) {
    match op {
        OpCode::AddPost => arithmetic(ev, Number::add),
        OpCode::SubPost => arithmetic(ev, Number::sub),
        OpCode::MulPost => arithmetic(ev, Number::mul),
        OpCode::DivPost => arithmetic(ev, Number::div),
        OpCode::ModPost => arithmetic(ev, Number::modulo),
        OpCode::FdivPost => arithmetic(ev, Number::fdiv),
        OpCode::RemPost => arithmetic(ev, Number::rem),
        OpCode::PowPost => arithmetic(ev, Number::pow),
        OpCode::Eq => compare(ev, |o| o == std::cmp::Ordering::Equal),
        OpCode::Ne => compare(ev, |o| o != std::cmp::Ordering::Equal),
        OpCode::Lt => compare(ev, |o| o == std::cmp::Ordering::Less),
        OpCode::Le => compare(ev, |o| o != std::cmp::Ordering::Greater),
        OpCode::Gt => compare(ev, |o| o == std::cmp::Ordering::Greater),
        OpCode::Ge => compare(ev, |o| o != std::cmp::Ordering::Less),
        OpCode::And => logical(ev, Boolean::and, bitwise_and),
        OpCode::Or => logical(ev, Boolean::or, bitwise_or),
        OpCode::Xor => logical(ev, Boolean::xor, bitwise_xor),
        other => ev.push_value(Value::error(format!("not a binary opcode: {other:?}"))),
    }
}

/// Numeric arithmetic. A type mismatch (either operand not a `Number`) is a
/// different failure mode than an in-domain numeric failure (e.g. division
/// by zero, which `Number::div` already reports as `NaN`): per §7, the
/// former yields `Nothing`, the latter a `NaN`-valued `Number`.
///
/// A `Decimal` result is rounded to the evaluator's configured scale and
/// rounding mode (§6's "configurable decimal scale and rounding mode")
/// before it's pushed; `Integer`/`NaN` results pass through `rounded`
/// unchanged.
fn arithmetic(ev: &mut Evaluator, op: impl Fn(&Number, &Number) -> Number) {
    let Some((x, y)) = ev.pop_pair() else { return };
    match (x, y) {
        (Value::Number(a), Value::Number(b)) => {
            let config = ev.config();
            let result = op(&a, &b).rounded(config.decimal_scale, config.rounding_mode.to_rust_decimal());
            ev.push_value(Value::Number(result));
        }
        _ => ev.push_value(Value::Nothing),
    }
}

/// Tri-valued structural comparison (§3): an incomparable pair (different
/// variants, NaN, …) surfaces as `Nothing` rather than a `Boolean`, per §7's
/// "comparison on incompatible variants → NaN, surfaced as Nothing".
fn compare(ev: &mut Evaluator, accept: impl Fn(std::cmp::Ordering) -> bool) {
    let Some((x, y)) = ev.pop_pair() else { return };
    match x.compare(&y) {
        Some(ordering) => ev.push_value(Value::boolean(accept(ordering))),
        None => ev.push_value(Value::Nothing),
    }
}

/// Logical `AND`/`OR`/`XOR`: fuzzy-boolean for `Boolean` operands, bitwise
/// (two's complement) for integer-typed `Number` operands — the two cases
/// §6 names explicitly. Anything else is a type mismatch, `Nothing`.
fn logical(
    ev: &mut Evaluator,
    bool_op: impl Fn(&Boolean, &Boolean) -> Boolean,
    int_op: impl Fn(&num_bigint::BigInt, &num_bigint::BigInt) -> num_bigint::BigInt,
) {
    let Some((x, y)) = ev.pop_pair() else { return };
    match (x, y) {
        (Value::Boolean(a), Value::Boolean(b)) => ev.push_value(Value::Boolean(bool_op(&a, &b))),
        (Value::Number(Number::Integer(a)), Value::Number(Number::Integer(b))) => {
            ev.push_value(Value::Number(Number::Integer(int_op(&a, &b))))
        }
        _ => ev.push_value(Value::Nothing),
    }
}

fn bitwise_and(a: &num_bigint::BigInt, b: &num_bigint::BigInt) -> num_bigint::BigInt {
    a & b
}

fn bitwise_or(a: &num_bigint::BigInt, b: &num_bigint::BigInt) -> num_bigint::BigInt {
    a | b
}

fn bitwise_xor(a: &num_bigint::BigInt, b: &num_bigint::BigInt) -> num_bigint::BigInt {
    a ^ b
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;
    use crate::config::EvalConfig;
    use crate::lexer::lex;

    fn run_source(src: &str) -> Vec<Value> {
        let program = compile(&lex(src));
        let mut ev = Evaluator::new(EvalConfig::default());
        ev.run(program);
        ev.value_stack().to_vec()
    }

    #[test]
    fn postfix_add_sub_mul_div() {
        assert_eq!(run_source("2 3 ADD"), vec![Value::from_i64(5)]);
        assert_eq!(run_source("5 3 SUB"), vec![Value::from_i64(2)]);
        assert_eq!(run_source("4 3 MUL"), vec![Value::from_i64(12)]);
        assert_eq!(run_source("6 3 DIV"), vec![Value::from_i64(2)]);
    }

    #[test]
    fn division_by_zero_is_nan_not_a_panic() {
        let result = run_source("1 0 DIV");
        assert_eq!(result, vec![Value::Number(Number::NaN)]);
    }

    #[test]
    fn decimal_division_is_rounded_to_the_configured_scale() {
        let program = compile(&lex("'1.0' '3.0' DIV"));
        let config = EvalConfig { decimal_scale: 4, ..EvalConfig::default() };
        let mut ev = Evaluator::new(config);
        ev.run(program);
        assert_eq!(ev.value_stack(), &[Value::Number(Number::Decimal("0.3333".parse().unwrap()))]);
    }

    #[test]
    fn order_matters_for_subtraction() {
        assert_eq!(run_source("5 - 3"), vec![Value::from_i64(2)]);
    }

    #[test]
    fn comparison_yields_boolean() {
        assert_eq!(run_source("3 3 EQ"), vec![Value::boolean(true)]);
        assert_eq!(run_source("3 4 LT"), vec![Value::boolean(true)]);
        assert_eq!(run_source("4 3 GE"), vec![Value::boolean(true)]);
    }

    #[test]
    fn comparison_across_variants_is_nothing() {
        assert_eq!(run_source("\"a\" 1 EQ"), vec![Value::Nothing]);
    }

    #[test]
    fn logical_and_on_booleans_is_fuzzy() {
        assert_eq!(run_source("TRUE FALSE AND"), vec![Value::boolean(false)]);
        assert_eq!(run_source("TRUE TRUE OR"), vec![Value::boolean(true)]);
    }

    #[test]
    fn logical_and_on_integers_is_bitwise() {
        assert_eq!(run_source("6 3 AND"), vec![Value::from_i64(2)]);
        assert_eq!(run_source("6 3 OR"), vec![Value::from_i64(7)]);
    }

    #[test]
    fn arithmetic_type_mismatch_is_nothing() {
        assert_eq!(run_source("\"a\" 1 ADD"), vec![Value::Nothing]);
    }
}
