//! Runtime representation of values produced by the [evaluator](crate::eval).

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::ast::Block;
use crate::environment::Environment;
use crate::error::EvalError;

/// A native function registered in the [builtins](crate::builtins) table.
pub type BuiltinFn = fn(&[Value]) -> Result<Value, EvalError>;

/// A tagged runtime value.
///
/// `Array` and `HashMap` wrap their backing collection in an [Rc] so that
/// passing a collection as a function argument, or binding it with `let`,
/// is a cheap pointer clone rather than a deep copy — collections in this
/// language are otherwise immutable from the evaluator's point of view (no
/// in-place index-assignment is part of the contract), so sharing the
/// backing storage is observationally transparent.
#[derive(Clone)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(Rc<str>),
    Nil,
    Array(Rc<Vec<Value>>),
    HashMap(Rc<HashMap<HashKey, Value>>),
    Function(Rc<FunctionData>),
    Builtin(BuiltinFn),
    /// Sentinel used to unwind a `return` through nested blocks. Never
    /// observed by user code: it is unwrapped exactly once at the
    /// enclosing function-call boundary (or at the top of a Program).
    ReturnWrapper(Box<Value>),
}

/// The data captured by a closure: its parameter names, its body, and the
/// [Environment] that was in effect when the `fn` expression was evaluated.
pub struct FunctionData {
    pub params: Vec<String>,
    pub body: Block,
    pub env: Environment,
}

/// A structural fingerprint over a [Value], used as a `HashMap` key.
///
/// Only integers, booleans, and strings are hashable (§3.3): two values of
/// the same kind with the same printed representation hash-equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HashKey {
    Integer(i64),
    Boolean(bool),
    String(Rc<str>),
}

impl Value {
    /// `Nil` and `Boolean(false)` are falsy; every other value is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Boolean(false))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "Integer",
            Value::Float(_) => "Float",
            Value::Boolean(_) => "Boolean",
            Value::String(_) => "String",
            Value::Nil => "Nil",
            Value::Array(_) => "Array",
            Value::HashMap(_) => "HashMap",
            Value::Function(_) => "Function",
            Value::Builtin(_) => "Builtin",
            Value::ReturnWrapper(_) => "ReturnWrapper",
        }
    }

    /// The structural fingerprint of this value as a hash-map key, or an
    /// error naming the offending kind if it is not hashable.
    pub fn hash_key(&self) -> Result<HashKey, EvalError> {
        match self {
            Value::Integer(i) => Ok(HashKey::Integer(*i)),
            Value::Boolean(b) => Ok(HashKey::Boolean(*b)),
            Value::String(s) => Ok(HashKey::String(s.clone())),
            other => Err(EvalError::NotHashable(other.type_name())),
        }
    }

    /// The canonical `Inspect` form used by `print` and the interactive
    /// prompt (§4.4).
    pub fn inspect(&self) -> String {
        match self {
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => format!("{f}"),
            Value::Boolean(b) => b.to_string(),
            Value::String(s) => s.to_string(),
            Value::Nil => "nil".to_string(),
            Value::Array(items) => {
                let parts: Vec<String> = items.iter().map(Value::inspect).collect();
                format!("[{}]", parts.join(", "))
            }
            Value::HashMap(map) => {
                let parts: Vec<String> = map
                    .iter()
                    .map(|(k, v)| format!("{}:{}", k.inspect(), v.inspect()))
                    .collect();
                format!("{{{}}}", parts.join(", "))
            }
            Value::Function(f) => {
                format!("fn({}){{...}}", f.params.join(", "))
            }
            Value::Builtin(_) => "builtin function".to_string(),
            Value::ReturnWrapper(inner) => inner.inspect(),
        }
    }
}

impl HashKey {
    fn inspect(&self) -> String {
        match self {
            HashKey::Integer(i) => i.to_string(),
            HashKey::Boolean(b) => b.to_string(),
            HashKey::String(s) => s.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inspect())
    }
}

impl fmt::Debug for Value {
    /// Structural shape only — a closure never dumps its captured
    /// environment, which would otherwise risk unbounded output (or a
    /// cycle) for a recursive closure capturing its own binding.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "Integer({i})"),
            Value::Float(n) => write!(f, "Float({n})"),
            Value::Boolean(b) => write!(f, "Boolean({b})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::Nil => write!(f, "Nil"),
            Value::Array(items) => f.debug_list().entries(items.iter()).finish(),
            Value::HashMap(map) => write!(f, "HashMap({} entries)", map.len()),
            Value::Function(fun) => f
                .debug_struct("Function")
                .field("params", &fun.params)
                .finish_non_exhaustive(),
            Value::Builtin(_) => write!(f, "Builtin(..)"),
            Value::ReturnWrapper(inner) => write!(f, "ReturnWrapper({inner:?})"),
        }
    }
}

impl PartialEq for Value {
    /// Used by `==`/`!=` for same-kind operands (§4.3 resolved contract).
    /// Values of differing kinds are never equal.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Integer(a), Value::Float(b)) | (Value::Float(b), Value::Integer(a)) => {
                *a as f64 == *b
            }
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            _ => false,
        }
    }
}
