//! High-level page operations.
//!
//! Thin call-sites over [`Browser::execute`]: each dispatches one built-in
//! remote operation and shapes its result. No marshaling happens here;
//! element results come back as opaque reference tokens usable as context
//! arguments in later calls.

use std::time::Duration;

use serde_json::{Map, Value as Json, json};

use crate::error::BridgeError;

use super::Browser;

/// Build an argument bag from a `json!` object literal.
fn bag(value: Json) -> Map<String, Json> {
    value.as_object().cloned().unwrap_or_default()
}

/// Truthiness of a transport result, for polling waits.
fn is_truthy(value: &Json) -> bool {
    match value {
        Json::Null => false,
        Json::Bool(b) => *b,
        Json::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Json::String(s) => !s.is_empty(),
        Json::Array(_) | Json::Object(_) => true,
    }
}

impl Browser {
    /// Fill the element at `selector` with a value. Returns the element's
    /// token, or null if nothing matched.
    pub async fn fill(&self, selector: &str, value: &str) -> Result<Json, BridgeError> {
        self.execute("fill", bag(json!({ "selector": selector, "value": value }))).await
    }

    /// Select an option. Alias of [`Browser::fill`].
    pub async fn select(&self, selector: &str, value: &str) -> Result<Json, BridgeError> {
        self.fill(selector, value).await
    }

    /// Click the element at `selector`.
    pub async fn press_button(&self, selector: &str) -> Result<Json, BridgeError> {
        self.execute("press_button", bag(json!({ "selector": selector }))).await
    }

    /// Check a checkbox.
    pub async fn check(&self, selector: &str) -> Result<Json, BridgeError> {
        self.execute("check", bag(json!({ "selector": selector }))).await
    }

    /// Uncheck a checkbox.
    pub async fn uncheck(&self, selector: &str) -> Result<Json, BridgeError> {
        self.execute("uncheck", bag(json!({ "selector": selector }))).await
    }

    /// Choose a radio element. Alias of [`Browser::check`].
    pub async fn choose(&self, selector: &str) -> Result<Json, BridgeError> {
        self.check(selector).await
    }

    /// Text content of the element at `selector`, optionally scoped to a
    /// context selector. `None` if nothing matched.
    pub async fn text(&self, selector: &str, context: Option<&str>) -> Result<Option<String>, BridgeError> {
        let result = self
            .execute("text", bag(json!({ "selector": selector, "context": context })))
            .await?;
        Ok(result.as_str().map(str::to_string))
    }

    /// Inner markup of the element at `selector`, or the full document
    /// markup (doctype included) when no selector is given.
    pub async fn html(
        &self,
        selector: Option<&str>,
        context: Option<&str>,
    ) -> Result<Option<String>, BridgeError> {
        let result = self
            .execute("html", bag(json!({ "selector": selector, "context": context })))
            .await?;
        Ok(result.as_str().map(str::to_string))
    }

    /// Token of the first element matching `selector`, or null. The lookup
    /// can be scoped to a context selector.
    pub async fn query(&self, selector: &str, context: Option<&str>) -> Result<Json, BridgeError> {
        self.execute("query", bag(json!({ "selector": selector, "context": context }))).await
    }

    /// Tokens of every element matching `selector`, optionally scoped to a
    /// context selector.
    pub async fn query_all(&self, selector: &str, context: Option<&str>) -> Result<Json, BridgeError> {
        self.execute("query_all", bag(json!({ "selector": selector, "context": context })))
            .await
    }

    /// Tokens of the nodes matched by an XPath expression, optionally rooted
    /// at a context selector.
    pub async fn xpath(&self, expression: &str, context: Option<&str>) -> Result<Json, BridgeError> {
        self.execute("xpath", bag(json!({ "expression": expression, "context": context })))
            .await
    }

    /// Click the link at `selector` and wait for the navigation it triggers
    /// to settle. Returns the link's token, or null if nothing matched.
    pub async fn click_link(&self, selector: &str) -> Result<Json, BridgeError> {
        let result = self.execute("press_button", bag(json!({ "selector": selector }))).await?;
        self.page().await?;
        Ok(result)
    }

    /// Repeatedly dispatch an operation until it returns a truthy result.
    pub async fn wait_until(
        &self,
        op: &str,
        args: Map<String, Json>,
        timeout: Duration,
    ) -> Result<(), BridgeError> {
        let start = std::time::Instant::now();
        loop {
            let result = self.execute(op, args.clone()).await?;
            if is_truthy(&result) {
                return Ok(());
            }
            if start.elapsed() >= timeout {
                return Err(BridgeError::Timeout(format!(
                    "Operation {} still falsy after {}ms",
                    op,
                    timeout.as_millis()
                )));
            }
            tokio::time::sleep(self.config.idle_poll_interval).await;
        }
    }
}
