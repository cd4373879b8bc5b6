//! Fundamental operators (§4.3): assignment, identity, scope snapshots, and
//! the language's only I/O, `EMIT`/`ENDL`.

use std::io::Write;

use crate::eval::Evaluator;
use crate::opcode::OpCode;
use crate::value::Value;

pub fn dispatch(ev: &mut Evaluator, op: OpCode) {
    match op {
        OpCode::Idnt => {
            let raw = ev.take_raw();
            ev.push_value(raw);
        }
        OpCode::Stack => {
            ev.push_value(Value::Expression(ev.snapshot_value_stack()));
        }
        OpCode::Queue => {
            ev.push_value(Value::Expression(ev.snapshot_code()));
        }
        OpCode::Clear => clear(ev),
        OpCode::Emit => emit(ev),
        OpCode::Endl => {
            println!();
        }
        OpCode::Return => ev.do_return(),
        OpCode::LetAssign => let_assign(ev),
        other => ev.push_value(Value::error(format!("not a fundamental opcode: {other:?}"))),
    }
}

/// `CLEAR`: the next code token picks the target. `STACK`/`QUEUE` clear the
/// whole value/code stack; anything else resolves through the scope stack
/// and has its own `clear()` pushed back, per the arbitrary-value fallback
/// (see DESIGN.md).
fn clear(ev: &mut Evaluator) {
    let raw = ev.take_raw();
    let resolved = ev.resolve_value(raw);
    match resolved {
        Value::OpCall(OpCode::Stack) => ev.clear_value_stack(),
        Value::OpCall(OpCode::Queue) => ev.clear_code_stack(),
        other => ev.push_value(other.clear()),
    }
}

/// `EMIT`'s `Value::String` case prints the raw body rather than going
/// through `Display` (which quotes, so `parse(print(v)) == v` holds for
/// `String` per §8) — the same split the teacher's own `print`/`println`
/// make between a bare string and every other value.
fn emit(ev: &mut Evaluator) {
    let Some(v) = ev.try_pop_value() else { return };
    match &v {
        Value::String(s) => print!("{s}"),
        other => print!("{other}"),
    }
    let _ = std::io::stdout().flush();
}

/// Runtime `LET`: pop the computed value, then the variable beneath it, and
/// bind it in the current scope — unreachable from surface text directly
/// (case folding always resolves to `let`'s richer statement form), but
/// scheduled here by the `let`/`def` desugar.
fn let_assign(ev: &mut Evaluator) {
    let Some(value) = ev.try_pop_value() else { return };
    let Some(var) = ev.try_pop_value() else { return };
    match var {
        Value::Symbol(name) => ev.scope_mut().define(&name, value),
        _ => ev.push_value(Value::error("let target is not a symbol")),
    }
}
