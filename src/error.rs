//! Provides [InterpreterError], the error type most fallible operations return.
use thiserror::Error;

/// A syntax error encountered while parsing.
///
/// The parser does not attempt recovery beyond dropping the offending
/// statement (see [`crate::parser`]); this type exists to give the CLI and
/// the REPL a message to print, not to support structured recovery.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("parse error: {message}")]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        ParseError {
            message: message.into(),
        }
    }
}

/// A fatal error raised while evaluating an AST node.
///
/// Undefined-identifier lookups are *not* represented here: per the
/// evaluator's contract they degrade to [`crate::value::Value::Nil`] and are
/// merely logged. Only the fatal kinds from the error taxonomy (type errors,
/// non-hashable keys, division by zero, arity mismatch) live here.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    #[error("type error: {0}")]
    TypeError(String),

    #[error("unknown operator: {operator} for {operand_kind}")]
    UnknownOperator {
        operator: String,
        operand_kind: &'static str,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("value of kind {0} is not hashable")]
    NotHashable(&'static str),

    #[error("wrong number of arguments: expected {expected}, got {got}")]
    ArityMismatch { expected: usize, got: usize },

    #[error("not a function: {0}")]
    NotCallable(String),
}

/// The top-level error type returned by every fallible operation in this crate.
#[derive(Debug, Error)]
pub enum InterpreterError {
    /// A compile-time error: the source failed to parse at all.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A runtime error: evaluation halted partway through.
    #[error(transparent)]
    Eval(#[from] EvalError),

    /// Failure to read a source file.
    #[error("could not read source file: {0}")]
    Io(#[from] std::io::Error),
}
