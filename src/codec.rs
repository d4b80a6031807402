//! Token codec: recursive replacement of native handles with reference
//! tokens (encode) and resolution of tokens back to live handles (decode).
//!
//! Both directions walk the value tree under a fixed depth bound. Subtrees
//! past the bound are passed through unchanged, even if they contain
//! tokenizable handles.

use tracing::{debug, trace};

use crate::context::PageContext;
use crate::value::{NodeToken, ScriptValue};

/// Maximum traversal depth. The root sits at depth 0; nodes deeper than this
/// are not visited.
pub const MAX_DEPTH: usize = 12;

/// Replace native handles with fresh reference tokens, registering each
/// handle in the context's reference store.
pub fn encode(value: ScriptValue, ctx: &mut PageContext) -> ScriptValue {
    encode_at(value, ctx, 0)
}

fn encode_at(value: ScriptValue, ctx: &mut PageContext, depth: usize) -> ScriptValue {
    match value {
        ScriptValue::Node(handle) => {
            let type_tag = handle.type_tag().to_string();
            let id = ctx.store_mut().push(handle);
            trace!("Tokenized {} as id {} in context {}", type_tag, id, ctx.id());
            // A tokenized node is opaque; traversal does not descend into it.
            ScriptValue::NodeRef(NodeToken {
                id,
                context_id: ctx.id(),
                type_tag,
            })
        }
        ScriptValue::Array(items) if depth < MAX_DEPTH => ScriptValue::Array(
            items
                .into_iter()
                .map(|item| encode_at(item, ctx, depth + 1))
                .collect(),
        ),
        ScriptValue::Object(map) if depth < MAX_DEPTH => ScriptValue::Object(
            map.into_iter()
                .map(|(key, item)| (key, encode_at(item, ctx, depth + 1)))
                .collect(),
        ),
        other => other,
    }
}

/// Resolve reference tokens back to live handles against the given context.
///
/// A token from a foreign context, or one whose id falls outside the store,
/// resolves to `Null` rather than failing: one stale reference must not
/// abort the decode of an otherwise-valid structure.
pub fn decode(value: ScriptValue, ctx: &PageContext) -> ScriptValue {
    decode_at(value, ctx, 0)
}

fn decode_at(value: ScriptValue, ctx: &PageContext, depth: usize) -> ScriptValue {
    match value {
        ScriptValue::NodeRef(token) => {
            if token.context_id != ctx.id() {
                debug!(
                    "Dropping token from foreign context {} (current {})",
                    token.context_id,
                    ctx.id()
                );
                return ScriptValue::Null;
            }
            match ctx.store().get(token.id) {
                Some(handle) => ScriptValue::Node(handle),
                None => {
                    debug!(
                        "Token id {} out of range (store holds {})",
                        token.id,
                        ctx.store().len()
                    );
                    ScriptValue::Null
                }
            }
        }
        ScriptValue::Array(items) if depth < MAX_DEPTH => ScriptValue::Array(
            items
                .into_iter()
                .map(|item| decode_at(item, ctx, depth + 1))
                .collect(),
        ),
        ScriptValue::Object(map) if depth < MAX_DEPTH => ScriptValue::Object(
            map.into_iter()
                .map(|(key, item)| (key, decode_at(item, ctx, depth + 1)))
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
