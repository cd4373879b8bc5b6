//! Function-family operators (§4.3): `DEF`'s runtime fallback for a named
//! definition, `LET`'s runtime fallback for a malformed `let` form that
//! escaped the compiler's desugaring, `BIND`/`APPLY` (surface `==`/`<==`)
//! and the `EndScope` marker that closes a lambda call.
//!
//! Grounded on the source's `function_operators.h`: `def_op`'s self-
//! reference fixup and `let_op`'s three-way branch on its trailing marker
//! are carried over in spirit, simplified to this evaluator's tree-only
//! value model (no cyclic `Rc`s — see DESIGN.md).

use std::rc::Rc;

use crate::eval::Evaluator;
use crate::opcode::OpCode;
use crate::value::{Expr, Lambda, Value};

pub fn dispatch(ev: &mut Evaluator, op: OpCode) {
    match op {
        OpCode::Let => let_runtime(ev),
        OpCode::Def => def_runtime(ev),
        OpCode::EndScope => ev.do_end_scope(),
        // Scheduled by the compiler's `let V <== E` desugar; by the time it's
        // reached, `E` has already run and left its single result sitting on
        // `value_stack` right above the `let`-target symbol `LetAssign`
        // still needs — nothing left to do here.
        OpCode::ApplyPost => {}
        OpCode::Bind => bind(ev),
        OpCode::Apply => apply(ev),
        other => ev.push_value(Value::error(format!("not a function opcode: {other:?}"))),
    }
}

/// `def NAME (args) (body)`, reached directly (not through a `let`):
/// `classify_token`/`rewrite` leave a bare `def` followed by a name and two
/// `Expression`s untouched unless it's the anonymous-lambda-literal shape,
/// so this is the runtime counterpart of that case.
fn def_runtime(ev: &mut Evaluator) {
    let name_raw = ev.take_raw();
    let Value::Symbol(name) = name_raw else {
        ev.push_value(Value::error("DEF needs a name"));
        return;
    };
    let args_raw = ev.take_raw();
    let Value::Expression(args) = args_raw else {
        ev.push_value(Value::error("DEF needs an argument list"));
        return;
    };
    let body_raw = ev.take_raw();
    let Value::Expression(body) = body_raw else {
        ev.push_value(Value::error("DEF needs a body"));
        return;
    };
    ev.scope_mut().define(&name, Value::Lambda(Rc::new(build_named_lambda(ev, &name, args, body))));
}

/// Captures the live scope, then ties the self-reference knot: the lambda's
/// own scope carries `name -> <itself, without that binding>` so a
/// recursive call resolves one level deep without an actual `Rc` cycle.
/// `"self"` is recorded too so nested lambdas defined inside this one know
/// which name to exclude when *they* capture (`Lambda::bind_scope`).
pub fn build_named_lambda(ev: &Evaluator, name: &str, args: Expr, body: Expr) -> Lambda {
    let captured = ev.scope().flatten();
    let base = Lambda::new(args, body).bind_scope(&captured);
    let tagged = base.bind_variable("self", Value::symbol(name.to_string()));
    let self_value = Value::Lambda(Rc::new(tagged.clone()));
    tagged.bind_variable(name, self_value)
}

/// Best-effort runtime handler for a `let` form the compiler's desugar
/// didn't fully rewrite (malformed input). The three markers `let_marker_at`
/// recognizes at compile time (`=`, `==`, `<==`) get the same treatment
/// here: assignment, partial binding, and apply-then-assign respectively.
fn let_runtime(ev: &mut Evaluator) {
    let Value::Symbol(name) = ev.take_raw() else {
        ev.push_value(Value::error("malformed let"));
        return;
    };
    let marker = ev.resolve_value(ev.take_raw());
    let rhs_raw = ev.take_raw();
    match marker {
        Value::OpCall(OpCode::Bind) => {
            let Some(lambda) = ev.scope().get(&name).and_then(as_lambda) else {
                ev.push_value(Value::error("BIND target is not a lambda"));
                return;
            };
            let bindings = ev.eval_code_item_as_value(rhs_raw);
            let bound = apply_bindings(&lambda, &bindings);
            ev.scope_mut().define(&name, Value::Lambda(Rc::new(bound)));
        }
        _ => {
            let value = ev.eval_code_item_as_value(rhs_raw);
            ev.scope_mut().define(&name, value);
        }
    }
}

/// `BIND` (surface `==`): supplies one or more partial argument bindings to
/// an existing lambda and returns a *new* lambda with those formals fixed,
/// leaving the original untouched (`Lambda::bind_variable` never mutates in
/// place).
fn bind(ev: &mut Evaluator) {
    let Some((target, bindings_raw)) = ev.pop_pair() else { return };
    match ev.resolve_value(target) {
        Value::Lambda(lambda) => {
            let bound = apply_bindings(&lambda, &bindings_raw);
            ev.push_value(Value::Lambda(Rc::new(bound)));
        }
        _ => ev.push_value(Value::error("BIND target is not a lambda")),
    }
}

/// `APPLY` (surface `<==`) used outside a `let`: calls the left operand
/// with the right operand as its first argument, exactly like `apply_lambda`
/// does for an ordinary juxtaposed call — any remaining formals are still
/// pulled from the code continuation that follows.
fn apply(ev: &mut Evaluator) {
    let Some((target, first_arg)) = ev.pop_pair() else { return };
    match ev.resolve_value(target) {
        Value::Lambda(lambda) => ev.apply_lambda(lambda, Some(first_arg)),
        _ => ev.push_value(Value::error("APPLY target is not a lambda")),
    }
}

fn as_lambda(v: Value) -> Option<Rc<Lambda>> {
    match v {
        Value::Lambda(l) => Some(l),
        _ => None,
    }
}

/// A single scalar binding fixes the lambda's first remaining formal; an
/// `Expression` of `name value` pairs (optionally still carrying the `=`
/// markers the general infix rewrite left behind for a lone pair) fixes
/// each name in turn. Multi-pair `==` forms with two or more simultaneous
/// bindings aren't exercised by any end-to-end scenario — see DESIGN.md.
///
/// Binding a formal both fixes its value in the closure's scope and removes
/// it from `args`, so a later call only needs to supply the remaining
/// formals — `Lambda::bind_variable` alone only does the first half.
fn apply_bindings(lambda: &Lambda, bindings: &Value) -> Lambda {
    match bindings {
        Value::Expression(e) => {
            let items: Vec<Value> = e.iter().filter(|v| !matches!(v, Value::OpCall(OpCode::EqInfix))).collect();
            let mut result = lambda.clone();
            for chunk in items.chunks(2) {
                if let [Value::Symbol(n), v] = chunk {
                    result = bind_formal(&result, n, v.clone());
                }
            }
            result
        }
        other => {
            let (name, rest) = lambda.args.pop_lead();
            match name {
                Value::Symbol(n) => {
                    let mut bound = lambda.bind_variable(&n, other.clone());
                    bound.args = rest;
                    bound
                }
                _ => lambda.clone(),
            }
        }
    }
}

fn bind_formal(lambda: &Lambda, name: &str, value: Value) -> Lambda {
    let mut bound = lambda.bind_variable(name, value);
    bound.args =
        Expr::from_vec(lambda.args.iter().filter(|v| !matches!(v, Value::Symbol(n) if n.as_ref() == name)).collect());
    bound
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
    fn def_then_call() {
        assert_eq!(run_source("def square (x) (x * x) ; square 5"), vec![Value::from_i64(25)]);
    }

    #[test]
    fn bind_fixes_one_argument() {
        let src = "def add (x y) (x + y) ; let add5 = add == 5 ; add5 10";
        assert_eq!(run_source(src), vec![Value::from_i64(15)]);
    }

    #[test]
    fn let_apply_desugar_assigns_the_call_result() {
        let src = "def add (x y) (x + y) ; let total <== add 2 3 ; total";
        assert_eq!(run_source(src), vec![Value::from_i64(5)]);
    }

    #[test]
    fn infix_apply_presets_the_first_argument() {
        let src = "def add (x y) (x + y) ; add <== 2 3";
        assert_eq!(run_source(src), vec![Value::from_i64(5)]);
    }

    #[test]
    fn bind_on_non_lambda_is_an_error_value() {
        assert_eq!(run_source("5 6 =="), vec![Value::error("BIND target is not a lambda")]);
    }
}
