//! Script value model and transport conversion.
//!
//! The codec operates over a closed sum type rather than dynamic type-name
//! matching: every value crossing the boundary is a `ScriptValue`, and native
//! document-node handles are the single non-transportable variant. On the
//! wire (the engine's evaluate transport) values are plain JSON; node handles
//! travel as reference-token objects carrying the reserved marker.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Number, Value as Json, json};
use tracing::warn;

use crate::context::ContextId;

/// Reserved property namespace. Kept distinct from any plausible caller
/// argument name; the interceptor strips every key under this prefix before
/// the invoked operation sees its argument bag.
pub const RESERVED_PREFIX: &str = "__revenant_reserved_";

/// Transport key holding the remote operation name.
pub const PAYLOAD_KEY: &str = "__revenant_reserved_op";

/// Marker value tagging a reference token on the wire.
pub const NODE_MARKER: &str = "__revenant_reserved_node";

/// A live native document node, owned by the rendering engine.
///
/// Handles never cross the process boundary; the codec replaces them with
/// reference tokens on the way out and resolves tokens back on the way in.
pub trait NativeNode: Send + Sync {
    /// Type name recorded on tokens minted for this node.
    fn type_tag(&self) -> &str;

    /// Visible text content.
    fn inner_text(&self) -> String;

    /// Inner markup.
    fn inner_html(&self) -> String;

    /// Current form value, if the node carries one.
    fn value(&self) -> Option<String>;

    /// Set the form value.
    fn set_value(&self, value: &str);

    /// Dispatch a click at this node.
    fn click(&self);

    /// Set an attribute.
    fn set_attribute(&self, name: &str, value: &str);

    /// Remove an attribute.
    fn remove_attribute(&self, name: &str);

    /// Downcast support for engine implementations.
    fn as_any(&self) -> &dyn Any;
}

/// Shared reference to a live native node.
#[derive(Clone)]
pub struct NodeHandle(Arc<dyn NativeNode>);

impl NodeHandle {
    /// Wrap a native node.
    pub fn new(node: Arc<dyn NativeNode>) -> Self {
        Self(node)
    }

    /// Whether two handles reference the same live node.
    pub fn same_node(&self, other: &NodeHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl std::ops::Deref for NodeHandle {
    type Target = dyn NativeNode;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl fmt::Debug for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeHandle({})", self.type_tag())
    }
}

/// Serializable surrogate for a native node handle.
///
/// Valid only within the context that minted it; the id indexes the minting
/// context's reference store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeToken {
    /// Index into the minting context's reference store.
    pub id: usize,
    /// Identity of the minting context.
    pub context_id: ContextId,
    /// Type name of the tokenized node.
    pub type_tag: String,
}

/// A value flowing through the remote-execution bridge.
#[derive(Debug, Clone)]
pub enum ScriptValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<ScriptValue>),
    Object(BTreeMap<String, ScriptValue>),
    /// Live native handle. Engine-side only; never crosses the boundary.
    Node(NodeHandle),
    /// Reference token standing in for a native handle.
    NodeRef(NodeToken),
}

impl ScriptValue {
    /// Borrow the string content, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScriptValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Convert to transport JSON.
    ///
    /// Tokens become marker-tagged objects. A residual live handle cannot
    /// cross the boundary and is shipped as null; this only happens past the
    /// codec's depth bound.
    pub fn to_transport(&self) -> Json {
        match self {
            ScriptValue::Null => Json::Null,
            ScriptValue::Bool(b) => Json::Bool(*b),
            ScriptValue::Number(n) => Number::from_f64(*n).map(Json::Number).unwrap_or(Json::Null),
            ScriptValue::String(s) => Json::String(s.clone()),
            ScriptValue::Array(items) => {
                Json::Array(items.iter().map(ScriptValue::to_transport).collect())
            }
            ScriptValue::Object(map) => {
                let mut out = Map::with_capacity(map.len());
                for (key, value) in map {
                    out.insert(key.clone(), value.to_transport());
                }
                Json::Object(out)
            }
            ScriptValue::Node(handle) => {
                warn!("Dropping untokenized {} handle at transport boundary", handle.type_tag());
                Json::Null
            }
            ScriptValue::NodeRef(token) => json!({
                "special": NODE_MARKER,
                "id": token.id,
                "contextId": token.context_id,
                "typeTag": token.type_tag,
            }),
        }
    }

    /// Convert transport JSON into a script value, recognizing token objects.
    pub fn from_transport(json: &Json) -> ScriptValue {
        match json {
            Json::Null => ScriptValue::Null,
            Json::Bool(b) => ScriptValue::Bool(*b),
            Json::Number(n) => ScriptValue::Number(n.as_f64().unwrap_or(0.0)),
            Json::String(s) => ScriptValue::String(s.clone()),
            Json::Array(items) => {
                ScriptValue::Array(items.iter().map(ScriptValue::from_transport).collect())
            }
            Json::Object(map) => {
                if let Some(token) = token_from_map(map) {
                    return ScriptValue::NodeRef(token);
                }
                ScriptValue::Object(
                    map.iter()
                        .map(|(k, v)| (k.clone(), ScriptValue::from_transport(v)))
                        .collect(),
                )
            }
        }
    }
}

/// Parse a wire object as a reference token. Objects that carry the marker
/// but are otherwise malformed are treated as plain data.
fn token_from_map(map: &Map<String, Json>) -> Option<NodeToken> {
    if map.get("special")?.as_str()? != NODE_MARKER {
        return None;
    }
    let id = map.get("id")?.as_u64()? as usize;
    let context_id: ContextId = serde_json::from_value(map.get("contextId")?.clone()).ok()?;
    let type_tag = map.get("typeTag")?.as_str()?.to_string();
    Some(NodeToken { id, context_id, type_tag })
}

#[cfg(test)]
#[path = "value_tests.rs"]
mod tests;
