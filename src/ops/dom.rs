//! Built-in document operations.
//!
//! These are the engine-side bodies of the high-level façade: each receives
//! the decoded argument bag and runs against the page's document. Operations
//! that target an element return its handle (tokenized by the interceptor on
//! the way out) so callers can feed it back as a context argument later;
//! a missing element yields `Null` rather than an error.

use crate::engine::Document;
use crate::error::BridgeError;
use crate::value::{NodeHandle, ScriptValue};

use super::{ArgBag, OpRegistry, arg_str};

/// Register the built-in operations.
pub(super) fn register(registry: &mut OpRegistry) {
    registry.register("fill", fill);
    registry.register("press_button", press_button);
    registry.register("check", check);
    registry.register("uncheck", uncheck);
    registry.register("text", text);
    registry.register("html", html);
    registry.register("query", query);
    registry.register("query_all", query_all);
    registry.register("xpath", xpath);
}

/// Where a lookup is rooted: the document, a context element, or nowhere
/// because the requested context did not resolve.
enum Scope {
    Document,
    Element(NodeHandle),
    Missing,
}

/// Resolve the optional `context` argument. It may be a selector string or a
/// live handle (a token the codec already resolved). An unresolved token
/// arrives as `Null`, which falls back to a document-rooted lookup the same
/// as an absent context.
fn resolve_scope(doc: &dyn Document, args: &ArgBag) -> Scope {
    match args.get("context") {
        None | Some(ScriptValue::Null) => Scope::Document,
        Some(ScriptValue::String(selector)) => match doc.query_selector(selector) {
            Some(handle) => Scope::Element(handle),
            None => Scope::Missing,
        },
        Some(ScriptValue::Node(handle)) => Scope::Element(handle.clone()),
        Some(_) => Scope::Missing,
    }
}

/// Find the element addressed by the `selector` argument within the
/// resolved scope.
fn find(doc: &dyn Document, args: &ArgBag) -> Result<Option<NodeHandle>, BridgeError> {
    let selector =
        arg_str(args, "selector").ok_or_else(|| BridgeError::MalformedPayload("missing selector".to_string()))?;
    Ok(match resolve_scope(doc, args) {
        Scope::Document => doc.query_selector(selector),
        Scope::Element(context) => doc.query_selector_in(&context, selector),
        Scope::Missing => None,
    })
}

fn fill(doc: &dyn Document, args: &ArgBag) -> Result<ScriptValue, BridgeError> {
    let value = arg_str(args, "value").unwrap_or_default().to_string();
    Ok(match find(doc, args)? {
        Some(element) => {
            element.set_value(&value);
            ScriptValue::Node(element)
        }
        None => ScriptValue::Null,
    })
}

fn press_button(doc: &dyn Document, args: &ArgBag) -> Result<ScriptValue, BridgeError> {
    Ok(match find(doc, args)? {
        Some(element) => {
            element.click();
            ScriptValue::Node(element)
        }
        None => ScriptValue::Null,
    })
}

fn check(doc: &dyn Document, args: &ArgBag) -> Result<ScriptValue, BridgeError> {
    Ok(match find(doc, args)? {
        Some(element) => {
            element.set_attribute("checked", "checked");
            ScriptValue::Node(element)
        }
        None => ScriptValue::Null,
    })
}

fn uncheck(doc: &dyn Document, args: &ArgBag) -> Result<ScriptValue, BridgeError> {
    Ok(match find(doc, args)? {
        Some(element) => {
            element.remove_attribute("checked");
            ScriptValue::Node(element)
        }
        None => ScriptValue::Null,
    })
}

fn text(doc: &dyn Document, args: &ArgBag) -> Result<ScriptValue, BridgeError> {
    Ok(match find(doc, args)? {
        Some(element) => ScriptValue::String(element.inner_text()),
        None => ScriptValue::Null,
    })
}

/// Inner markup of the addressed element, or the full document markup when
/// no selector is given.
fn html(doc: &dyn Document, args: &ArgBag) -> Result<ScriptValue, BridgeError> {
    let selector_missing = matches!(args.get("selector"), None | Some(ScriptValue::Null));
    if selector_missing {
        return Ok(ScriptValue::String(doc.document_html()));
    }
    Ok(match find(doc, args)? {
        Some(element) => ScriptValue::String(element.inner_html()),
        None => ScriptValue::Null,
    })
}

fn query(doc: &dyn Document, args: &ArgBag) -> Result<ScriptValue, BridgeError> {
    Ok(match find(doc, args)? {
        Some(element) => ScriptValue::Node(element),
        None => ScriptValue::Null,
    })
}

fn query_all(doc: &dyn Document, args: &ArgBag) -> Result<ScriptValue, BridgeError> {
    let selector =
        arg_str(args, "selector").ok_or_else(|| BridgeError::MalformedPayload("missing selector".to_string()))?;
    let handles = match resolve_scope(doc, args) {
        Scope::Document => doc.query_selector_all(selector),
        Scope::Element(context) => doc.query_selector_all_in(&context, selector),
        Scope::Missing => Vec::new(),
    };
    Ok(ScriptValue::Array(handles.into_iter().map(ScriptValue::Node).collect()))
}

fn xpath(doc: &dyn Document, args: &ArgBag) -> Result<ScriptValue, BridgeError> {
    let expression = arg_str(args, "expression")
        .ok_or_else(|| BridgeError::MalformedPayload("missing expression".to_string()))?;
    let handles = match resolve_scope(doc, args) {
        Scope::Document => doc.evaluate_xpath(expression),
        Scope::Element(context) => doc.evaluate_xpath_in(&context, expression),
        Scope::Missing => Vec::new(),
    };
    Ok(ScriptValue::Array(handles.into_iter().map(ScriptValue::Node).collect()))
}

#[cfg(test)]
#[path = "dom_tests.rs"]
mod tests;
