//! Rendering-context identity and the per-context reference store.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::value::NodeHandle;

/// Identity of one rendering context (one page lifetime).
///
/// Contexts are recreated on every navigation, so tokens minted before a
/// reload carry an id that no longer matches and can never alias handles
/// registered by the new page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextId(Uuid);

impl ContextId {
    /// Mint a fresh context id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ContextId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Append-only registry of live native handles, one per rendering context.
///
/// Token ids are indexes into this sequence. The store is never reset while
/// its context lives; reads are bounds-checked because a token may outlive
/// the entry it was minted against.
#[derive(Default)]
pub struct NodeStore {
    entries: Vec<NodeHandle>,
}

impl NodeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handle and return its id.
    pub fn push(&mut self, handle: NodeHandle) -> usize {
        self.entries.push(handle);
        self.entries.len() - 1
    }

    /// Look up a handle by id. Out-of-range ids yield `None`, never a panic.
    pub fn get(&self, id: usize) -> Option<NodeHandle> {
        self.entries.get(id).cloned()
    }

    /// Number of registered handles.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no handles.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One rendering context: its identity plus its reference store.
///
/// Owned by the page that created it and passed explicitly into every codec
/// call; there is no ambient or global store.
pub struct PageContext {
    id: ContextId,
    store: NodeStore,
}

impl PageContext {
    /// Create a fresh context with an empty store.
    pub fn new() -> Self {
        Self {
            id: ContextId::new(),
            store: NodeStore::new(),
        }
    }

    /// This context's identity.
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// The context's reference store.
    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    /// Mutable access to the reference store, for encoding.
    pub fn store_mut(&mut self) -> &mut NodeStore {
        &mut self.store
    }
}

impl Default for PageContext {
    fn default() -> Self {
        Self::new()
    }
}
