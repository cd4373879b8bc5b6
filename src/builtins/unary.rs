//! Unary operators (§4.3): `NEG` negates a value in place (numeric
//! negation, or fuzzy-boolean negation per `Boolean::neg`), and `IS` tests
//! truthiness, both popping exactly one operand.

use crate::eval::Evaluator;
use crate::opcode::OpCode;
use crate::value::{Number, Value};

pub fn dispatch(ev: &mut Evaluator, op: OpCode) {
    match op {
        OpCode::Neg => {
            if let Some(v) = ev.try_pop_value() {
                ev.push_value(negate(v));
            }
        }
        OpCode::Is => {
            if let Some(v) = ev.try_pop_value() {
                ev.push_value(Value::boolean(v.is()));
            }
        }
        other => ev.push_value(Value::error(format!("not a unary opcode: {other:?}"))),
    }
}

/// Numbers negate arithmetically, booleans negate per the fuzzy-boolean
/// contract (§3, §6); anything else has no defined negation and the
/// out-of-domain rule applies: `NaN`-equivalent rather than a crash.
fn negate(v: Value) -> Value {
    match v {
        Value::Number(n) => Value::Number(n.neg()),
        Value::Boolean(b) => Value::Boolean(b.neg()),
        Value::Error(_) => v,
        _ => Value::Number(Number::NaN),
    }
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
    fn neg_on_number() {
        assert_eq!(run_source("5 NEG"), vec![Value::from_i64(-5)]);
    }

    #[test]
    fn neg_on_boolean_flips_truth() {
        assert_eq!(run_source("TRUE NEG"), vec![Value::boolean(false)]);
    }

    #[test]
    fn is_reports_truthiness() {
        assert_eq!(run_source("FALSE IS"), vec![Value::boolean(false)]);
        assert_eq!(run_source("TRUE IS"), vec![Value::boolean(true)]);
        assert_eq!(run_source("[] LEAD IS"), vec![Value::boolean(false)]);
    }

    #[test]
    fn neg_underflow_is_an_error_value() {
        assert_eq!(run_source("NEG"), vec![Value::error("Stack underflow.")]);
    }
}
