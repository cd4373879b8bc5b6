//! Oliver: a small dynamically typed expression language. The pipeline is
//! three stages — [`lexer`] cuts source text into tokens, [`compiler`]
//! rewrites the token stream into a tree of [`value::Value`]s (normalizing
//! infix/prefix operators to postfix and reifying lambdas/lists/maps), and
//! [`eval`] reduces that tree on a stack machine. [`opcode`] and [`env`] are
//! shared plumbing between the compiler and the evaluator.

pub mod builtins;
pub mod compiler;
pub mod config;
pub mod env;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod opcode;
pub mod value;

use value::Value;

/// Runs one source program end-to-end: lex, compile, evaluate. Returns the
/// final value stack.
pub fn run(source: &str, config: config::EvalConfig) -> Vec<Value> {
    let tokens = lexer::lex(source);
    let program = compiler::compile(&tokens);
    let mut evaluator = eval::Evaluator::new(config);
    evaluator.run(program);
    evaluator.value_stack().to_vec()
}
