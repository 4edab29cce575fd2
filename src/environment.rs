//! Lexically scoped environments: a chain of frames mapping names to values.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::value::Value;

/// One scope of bindings, linked to its parent frame.
struct EnvironmentData {
    bindings: HashMap<String, Value>,
    parent: Option<Environment>,
}

/// A reference-counted handle to an [EnvironmentData] frame.
///
/// Frames are shared via [Rc]+[RefCell] rather than owned uniquely: a
/// [crate::value::FunctionData] closure keeps its captured frame alive for
/// as long as the closure itself is reachable (§5), and a nested call frame
/// needs to mutate bindings that an outer frame — or another live closure —
/// can also see (this is what makes the counter-closure scenario in §8 of
/// the spec work).
#[derive(Clone)]
pub struct Environment(Rc<RefCell<EnvironmentData>>);

impl Environment {
    /// An empty root environment with no parent.
    pub fn new() -> Self {
        Environment(Rc::new(RefCell::new(EnvironmentData {
            bindings: HashMap::new(),
            parent: None,
        })))
    }

    /// An empty frame whose parent is `parent`.
    pub fn new_with_parent(parent: Environment) -> Self {
        Environment(Rc::new(RefCell::new(EnvironmentData {
            bindings: HashMap::new(),
            parent: Some(parent),
        })))
    }

    /// Binds `name` in this frame only. A re-`let` of the same name in the
    /// same frame shadows silently (overwrites the slot).
    pub fn set(&self, name: &str, value: Value) {
        self.0.borrow_mut().bindings.insert(name.to_owned(), value);
    }

    /// Looks up `name`, walking parent frames until a hit or the root.
    pub fn get(&self, name: &str) -> Option<Value> {
        let data = self.0.borrow();
        if let Some(value) = data.bindings.get(name) {
            return Some(value.clone());
        }
        data.parent.as_ref().and_then(|parent| parent.get(name))
    }

    /// Assigns to an *existing* binding for `name`, walking the scope chain
    /// to find and mutate the frame that owns it (§9's resolved Open
    /// Question — see DESIGN.md). Returns `true` if an existing binding was
    /// found and updated. If no frame in the chain has `name` bound, the
    /// caller falls back to a local-frame write (see [crate::eval]).
    pub fn assign_existing(&self, name: &str, value: Value) -> bool {
        let mut data = self.0.borrow_mut();
        if data.bindings.contains_key(name) {
            data.bindings.insert(name.to_owned(), value);
            return true;
        }
        match &data.parent {
            Some(parent) => parent.assign_existing(name, value),
            None => false,
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::new()
    }
}
