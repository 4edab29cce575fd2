//! A tree-walking interpreter for a small, dynamically-typed,
//! expression-oriented scripting language.
//!
//! Source text flows through four stages: [lexer] turns it into a stream of
//! [token]s, [parser] builds an [ast] with a Pratt (operator-precedence)
//! climb, [eval] walks the tree by structural recursion, carrying an
//! [environment] of lexically scoped bindings, and produces a [value::Value].

pub mod ast;
pub mod builtins;
pub mod environment;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod token;
pub mod value;

/// The type returned by the top-level entry points in this crate. The error
/// is always [error::InterpreterError]; this alias is generic in the return
/// type for everything else.
pub type Result<T> = std::result::Result<T, error::InterpreterError>;

/// Re-exports the items most often needed together: the binary and the
/// integration tests both just want a one-line `use lang::prelude::*;`.
pub mod prelude {
    pub use crate::environment::Environment;
    pub use crate::error::{EvalError, InterpreterError, ParseError};
    pub use crate::value::Value;
    pub use crate::{eval_source, Result};
}

/// Parses and evaluates `source` against `env` in one shot, returning the
/// value its last statement produced. This is what both the script runner
/// and each REPL iteration call.
pub fn eval_source(source: &str, env: &environment::Environment) -> Result<value::Value> {
    let program = parser::parse(source)?;
    let value = eval::eval_program(&program, env)?;
    Ok(value)
}
