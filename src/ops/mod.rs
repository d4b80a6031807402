//! Remote operation registry.
//!
//! Executable logic never crosses the boundary as source text. Instead the
//! rendering context holds a registry of named, statically defined
//! operations; the control side dispatches by name with a typed argument
//! bag. This preserves the one-call shape (one operation + one bag in, one
//! result out) without runtime code synthesis.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::engine::Document;
use crate::error::BridgeError;
use crate::value::ScriptValue;

mod dom;

/// Decoded argument bag handed to an operation. Reference tokens have
/// already been resolved to live handles; reserved keys are stripped.
pub type ArgBag = BTreeMap<String, ScriptValue>;

/// A remote operation, executed inside the rendering context.
pub type RemoteOp = Arc<dyn Fn(&dyn Document, &ArgBag) -> Result<ScriptValue, BridgeError> + Send + Sync>;

/// Named remote operations available inside one rendering context.
pub struct OpRegistry {
    ops: HashMap<String, RemoteOp>,
}

impl OpRegistry {
    /// Create an empty registry.
    pub fn empty() -> Self {
        Self { ops: HashMap::new() }
    }

    /// Create a registry holding the built-in document operations.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        dom::register(&mut registry);
        registry
    }

    /// Register an operation under a name, replacing any previous entry.
    pub fn register<F>(&mut self, name: &str, op: F)
    where
        F: Fn(&dyn Document, &ArgBag) -> Result<ScriptValue, BridgeError> + Send + Sync + 'static,
    {
        self.ops.insert(name.to_string(), Arc::new(op));
    }

    /// Look up an operation by name.
    pub fn get(&self, name: &str) -> Option<RemoteOp> {
        self.ops.get(name).cloned()
    }

    /// Number of registered operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl Default for OpRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Borrow a string argument from a bag.
pub(crate) fn arg_str<'a>(args: &'a ArgBag, key: &str) -> Option<&'a str> {
    args.get(key).and_then(ScriptValue::as_str)
}
