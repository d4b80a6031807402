//! Engine-side dispatch pipeline.
//!
//! Runs inside the rendering context for every remote call: extract and
//! strip the reserved payload key, look up the named operation, decode the
//! remaining argument bag (resolving reference tokens to live handles),
//! invoke, and encode the result for the trip back.

use serde_json::{Map, Value as Json};
use tracing::{debug, trace};

use crate::codec;
use crate::context::PageContext;
use crate::engine::Document;
use crate::error::BridgeError;
use crate::ops::{ArgBag, OpRegistry};
use crate::value::{PAYLOAD_KEY, RESERVED_PREFIX, ScriptValue};

/// Execute one remote call against a rendering context.
pub fn run(
    registry: &OpRegistry,
    doc: &dyn Document,
    ctx: &mut PageContext,
    mut payload: Map<String, Json>,
) -> Result<Json, BridgeError> {
    let op_name = payload
        .remove(PAYLOAD_KEY)
        .and_then(|v| v.as_str().map(str::to_string))
        .ok_or_else(|| BridgeError::MalformedPayload("missing operation key".to_string()))?;

    let op = registry
        .get(&op_name)
        .ok_or_else(|| BridgeError::UnknownOperation(op_name.clone()))?;

    debug!("Dispatching {} in context {}", op_name, ctx.id());

    // The invoked operation never sees the reserved namespace, no matter
    // what the caller put in its bag.
    let mut args = ArgBag::new();
    for (key, value) in payload {
        if key.starts_with(RESERVED_PREFIX) {
            trace!("Stripping reserved key {}", key);
            continue;
        }
        args.insert(key, codec::decode(ScriptValue::from_transport(&value), ctx));
    }

    let result = op(doc, &args)?;
    let encoded = codec::encode(result, ctx);
    Ok(encoded.to_transport())
}

#[cfg(test)]
#[path = "interceptor_tests.rs"]
mod tests;
