//! Associative operators (§4.3): `HAS`/`GET`/`SET`/`DEL` over `Map`,
//! `Expression`, or `List` containers; anything else yields `Nothing` per
//! each `Value` method's own fallback.

use crate::eval::Evaluator;
use crate::opcode::OpCode;
use crate::value::Value;

pub fn dispatch(ev: &mut Evaluator, op: OpCode) {
    match op {
        OpCode::Has => {
            if let Some((container, key)) = ev.pop_pair() {
                ev.push_value(Value::boolean(container.has(&key)));
            }
        }
        OpCode::Get => {
            if let Some((container, key)) = ev.pop_pair() {
                ev.push_value(container.get(&key));
            }
        }
        OpCode::Set => set(ev),
        OpCode::Del => {
            if let Some((container, key)) = ev.pop_pair() {
                ev.push_value(container.del(&key));
            }
        }
        other => ev.push_value(Value::error(format!("not an associative opcode: {other:?}"))),
    }
}

/// `SET`: pops value, key, then container (in that push order), resolving
/// the container through the scope stack first — it's commonly a bare
/// symbol naming a previously-bound map or list.
fn set(ev: &mut Evaluator) {
    let Some(value) = ev.try_pop_value() else { return };
    let Some(key) = ev.try_pop_value() else { return };
    let Some(container_raw) = ev.try_pop_value() else { return };
    let container = ev.resolve_value(container_raw);
    ev.push_value(container.set(key, value));
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
    fn map_has_membership() {
        assert_eq!(run_source("{ 'a' 1 = } 'a' HAS"), vec![Value::boolean(true)]);
        assert_eq!(run_source("{ 'a' 1 = } 'z' HAS"), vec![Value::boolean(false)]);
    }

    #[test]
    fn map_get_and_set() {
        assert_eq!(run_source("{ 'a' 1 = } 'a' GET"), vec![Value::from_i64(1)]);
        let result = run_source("{ 'a' 1 = } 'b' 2 SET 'b' GET");
        assert_eq!(result, vec![Value::from_i64(2)]);
    }

    #[test]
    fn map_del_removes_key() {
        let result = run_source("{ 'a' 1 = } 'a' DEL 'a' HAS");
        assert_eq!(result, vec![Value::boolean(false)]);
    }
}
