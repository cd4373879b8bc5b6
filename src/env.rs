// ABOUTME: The lexical scope stack shared by the evaluator and captured lambdas
//! The evaluator's `scope_stack`: a stack of maps from symbol text to
//! value, the deepest being the global scope. Unlike a parent-linked
//! environment chain, lookup walks the stack top-down rather than following
//! `Rc` parent pointers — the flat `Vec` form is what makes flattening a
//! snapshot for `Lambda`'s captured scope a single pass instead of
//! a chain walk.

use std::collections::HashMap;

use crate::value::Value;

#[derive(Debug, Default)]
pub struct ScopeStack {
    frames: Vec<HashMap<String, Value>>,
}

impl ScopeStack {
    /// A fresh stack holding only the global scope.
    pub fn new() -> Self {
        ScopeStack { frames: vec![HashMap::new()] }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Pushes a new scope frame, e.g. on lambda application.
    pub fn push(&mut self, frame: HashMap<String, Value>) {
        self.frames.push(frame);
    }

    /// Pops the top scope frame. Popping the last remaining (global) frame
    /// is a caller error; the evaluator never does this.
    pub fn pop(&mut self) -> HashMap<String, Value> {
        self.frames.pop().unwrap_or_default()
    }

    /// `LET`: binds `name` in the current (top) scope.
    pub fn define(&mut self, name: &str, value: Value) {
        if let Some(top) = self.frames.last_mut() {
            top.insert(name.to_string(), value);
        }
    }

    /// Symbol resolution: walk the stack from the top frame down until a
    /// binding is found.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.frames.iter().rev().find_map(|frame| frame.get(name).cloned())
    }

    /// Flattens every live frame into a single map, top overriding bottom.
    /// This is the "bindings that existed in its defining enclosure" a
    /// `Lambda` captures at `def` time. The self-exclusion (the
    /// enclosing scope's own `"self"` entry, if any) happens in
    /// `Lambda::bind_scope`, not here — flattening the stack and deciding
    /// what to drop from it are separate concerns.
    pub fn flatten(&self) -> HashMap<String, Value> {
        let mut out = HashMap::new();
        for frame in &self.frames {
            for (k, v) in frame {
                out.insert(k.clone(), v.clone());
            }
        }
        out
    }
}
