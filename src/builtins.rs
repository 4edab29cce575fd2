//! The fixed, name-addressed table of host-provided functions (§4.4).
//!
//! Registered once before evaluation begins and read-only thereafter (§5);
//! looked up by name in [lookup].

use std::rc::Rc;

use crate::error::EvalError;
use crate::value::Value;

/// Looks up a built-in by name. Returns `None` if `name` is not a built-in,
/// in which case the caller should fall back to the identifier lookup in
/// the current environment.
pub fn lookup(name: &str) -> Option<Value> {
    let f: crate::value::BuiltinFn = match name {
        "len" => len,
        "print" => print,
        "first" => first,
        "last" => last,
        "rest" => rest,
        "push" => push,
        "str" => str_of,
        _ => return None,
    };
    Some(Value::Builtin(f))
}

/// `len(x)` — the length of an `Array`, or `Nil` for any other kind.
fn len(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [Value::Array(items)] => Ok(Value::Integer(items.len() as i64)),
        [_] => Ok(Value::Nil),
        _ => Err(EvalError::ArityMismatch {
            expected: 1,
            got: args.len(),
        }),
    }
}

/// `print(...args)` — prints each argument's `Inspect` form separated by
/// single spaces, followed by a newline. Always returns `Nil`.
fn print(args: &[Value]) -> Result<Value, EvalError> {
    let rendered: Vec<String> = args.iter().map(Value::inspect).collect();
    println!("{}", rendered.join(" "));
    Ok(Value::Nil)
}

/// `first(array)` — the first element, or `Nil` if empty or not an array.
fn first(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [Value::Array(items)] => Ok(items.first().cloned().unwrap_or(Value::Nil)),
        [_] => Ok(Value::Nil),
        _ => Err(EvalError::ArityMismatch {
            expected: 1,
            got: args.len(),
        }),
    }
}

/// `last(array)` — the last element, or `Nil` if empty or not an array.
fn last(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [Value::Array(items)] => Ok(items.last().cloned().unwrap_or(Value::Nil)),
        [_] => Ok(Value::Nil),
        _ => Err(EvalError::ArityMismatch {
            expected: 1,
            got: args.len(),
        }),
    }
}

/// `rest(array)` — a new array without its first element, or `Nil` for an
/// empty array or a non-array argument.
fn rest(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [Value::Array(items)] if !items.is_empty() => {
            Ok(Value::Array(Rc::new(items[1..].to_vec())))
        }
        [Value::Array(_)] => Ok(Value::Nil),
        [_] => Ok(Value::Nil),
        _ => Err(EvalError::ArityMismatch {
            expected: 1,
            got: args.len(),
        }),
    }
}

/// `push(array, value)` — a new array with `value` appended.
fn push(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [Value::Array(items), value] => {
            let mut copy = (**items).clone();
            copy.push(value.clone());
            Ok(Value::Array(Rc::new(copy)))
        }
        [_, _] => Err(EvalError::TypeError(
            "push expects an array as its first argument".to_string(),
        )),
        _ => Err(EvalError::ArityMismatch {
            expected: 2,
            got: args.len(),
        }),
    }
}

/// `str(x)` — the `Inspect` form of any value, as a `String`.
fn str_of(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [value] => Ok(Value::String(Rc::from(value.inspect()))),
        _ => Err(EvalError::ArityMismatch {
            expected: 1,
            got: args.len(),
        }),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn call(name: &str, args: &[Value]) -> Value {
        match lookup(name).unwrap() {
            Value::Builtin(f) => f(args).unwrap(),
            _ => unreachable!(),
        }
    }

    #[test]
    fn len_of_array() {
        let arr = Value::Array(Rc::new(vec![
            Value::Integer(1),
            Value::Integer(2),
            Value::Integer(3),
            Value::Integer(4),
        ]));
        assert_eq!(Value::Integer(4), call("len", &[arr]));
    }

    #[test]
    fn len_of_non_array_is_nil() {
        assert_eq!(Value::Nil, call("len", &[Value::Integer(5)]));
    }

    #[test]
    fn unknown_builtin_is_none() {
        assert!(lookup("no_such_builtin").is_none());
    }

    #[test]
    fn push_returns_new_array() {
        let arr = Value::Array(Rc::new(vec![Value::Integer(1)]));
        let pushed = call("push", &[arr.clone(), Value::Integer(2)]);
        match pushed {
            Value::Array(items) => assert_eq!(vec![Value::Integer(1), Value::Integer(2)], *items),
            _ => panic!("expected array"),
        }
        // original array is untouched
        match arr {
            Value::Array(items) => assert_eq!(vec![Value::Integer(1)], *items),
            _ => unreachable!(),
        }
    }

    #[test]
    fn rest_of_empty_array_is_nil() {
        let arr = Value::Array(Rc::new(vec![]));
        assert_eq!(Value::Nil, call("rest", &[arr]));
    }
}
