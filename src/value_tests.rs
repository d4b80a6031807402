use std::sync::Arc;

use serde_json::json;

use crate::context::ContextId;
use crate::engine::local::LocalElement;

use super::*;

#[test]
fn test_token_wire_shape() {
    let context_id = ContextId::new();
    let token = ScriptValue::NodeRef(NodeToken {
        id: 3,
        context_id,
        type_tag: "HTMLElement".to_string(),
    });

    let wire = token.to_transport();
    assert_eq!(wire["special"], NODE_MARKER);
    assert_eq!(wire["id"], 3);
    assert_eq!(wire["contextId"], json!(context_id));
    assert_eq!(wire["typeTag"], "HTMLElement");
}

#[test]
fn test_token_transport_round_trip() {
    let token = NodeToken {
        id: 7,
        context_id: ContextId::new(),
        type_tag: "HTMLElement".to_string(),
    };

    let wire = ScriptValue::NodeRef(token.clone()).to_transport();
    match ScriptValue::from_transport(&wire) {
        ScriptValue::NodeRef(parsed) => assert_eq!(parsed, token),
        other => panic!("expected token, got {:?}", other),
    }
}

#[test]
fn test_malformed_token_is_plain_data() {
    // Carries the marker but no id: treated as an ordinary object.
    let wire = json!({ "special": NODE_MARKER, "typeTag": "HTMLElement" });
    match ScriptValue::from_transport(&wire) {
        ScriptValue::Object(map) => assert_eq!(map.len(), 2),
        other => panic!("expected object, got {:?}", other),
    }
}

#[test]
fn test_residual_handle_ships_as_null() {
    let handle = Arc::new(LocalElement::new()).handle();
    assert_eq!(ScriptValue::Node(handle).to_transport(), serde_json::Value::Null);
}

#[test]
fn test_nested_structure_round_trip() {
    let wire = json!({
        "name": "field",
        "count": 2.0,
        "flags": [true, false, null],
        "inner": { "text": "hello" },
    });

    let value = ScriptValue::from_transport(&wire);
    assert_eq!(value.to_transport(), wire);
}

#[test]
fn test_as_str() {
    assert_eq!(ScriptValue::String("hi".to_string()).as_str(), Some("hi"));
    assert_eq!(ScriptValue::Number(1.0).as_str(), None);
    assert_eq!(ScriptValue::Null.as_str(), None);
}
