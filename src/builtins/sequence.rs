//! Sequence operators (§4.3): `LEAD`/`LAST` read an end, `PLACE`/`DROP`
//! write one guided by a following `LEAD`/`LAST` token, and the bracket
//! shorthands `-->`/`<--`/`>>>`/`<<<` compile straight to their own
//! opcodes rather than the generic two-opcode `PLACE LEAD` form — see
//! DESIGN.md.

use crate::eval::Evaluator;
use crate::opcode::OpCode;
use crate::value::Value;

pub fn dispatch(ev: &mut Evaluator, op: OpCode) {
    match op {
        OpCode::Lead => {
            if let Some(v) = ev.try_pop_value() {
                ev.push_value(v.lead());
            }
        }
        OpCode::Last => {
            if let Some(v) = ev.try_pop_value() {
                ev.push_value(v.last());
            }
        }
        OpCode::Place => place(ev),
        OpCode::Drop => drop_one(ev),
        OpCode::PlaceLead => {
            if let Some((container, value)) = ev.pop_pair() {
                ev.push_value(container.place_lead(value));
            }
        }
        OpCode::PlaceLast => {
            if let Some((container, value)) = ev.pop_pair() {
                ev.push_value(container.place_last(value));
            }
        }
        OpCode::DropLead => {
            if let Some(v) = ev.try_pop_value() {
                ev.push_value(v.drop_lead());
            }
        }
        OpCode::DropLast => {
            if let Some(v) = ev.try_pop_value() {
                ev.push_value(v.drop_last());
            }
        }
        other => ev.push_value(Value::error(format!("not a sequence opcode: {other:?}"))),
    }
}

fn place(ev: &mut Evaluator) {
    let Some((container, value)) = ev.pop_pair() else { return };
    let guide = ev.take_raw();
    match ev.resolve_value(guide) {
        Value::OpCall(OpCode::Lead) => ev.push_value(container.place_lead(value)),
        Value::OpCall(OpCode::Last) => ev.push_value(container.place_last(value)),
        _ => ev.push_value(Value::error("PLACE needs a LEAD or LAST guide")),
    }
}

fn drop_one(ev: &mut Evaluator) {
    let Some(container) = ev.try_pop_value() else { return };
    let guide = ev.take_raw();
    match ev.resolve_value(guide) {
        Value::OpCall(OpCode::Lead) => ev.push_value(container.drop_lead()),
        Value::OpCall(OpCode::Last) => ev.push_value(container.drop_last()),
        _ => ev.push_value(Value::error("DROP needs a LEAD or LAST guide")),
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
    fn lead_and_last_on_a_list() {
        assert_eq!(run_source("[1 2 3] LEAD"), vec![Value::from_i64(1)]);
        assert_eq!(run_source("[1 2 3] LAST"), vec![Value::from_i64(3)]);
    }

    #[test]
    fn place_lead_prepends() {
        let result = run_source("[2 3] 1 -->");
        assert_eq!(result, vec![Value::List(std::rc::Rc::new(vec![
            Value::from_i64(1),
            Value::from_i64(2),
            Value::from_i64(3),
        ]))]);
    }

    #[test]
    fn drop_lead_via_guard_word() {
        assert_eq!(
            run_source("[1 2 3] DROP LEAD"),
            vec![Value::List(std::rc::Rc::new(vec![Value::from_i64(2), Value::from_i64(3)]))]
        );
    }
}
