//! Rendering-engine interface.
//!
//! The engine itself is an external collaborator: it parses and executes
//! page content in a process isolated from the control side. This module
//! specifies the seam the bridge drives it through, plus the engine-side
//! document substrate that remote operations run against.
//!
//! [`local::LocalEngine`] is a complete in-process implementation with a
//! miniature document model, used by the integration tests and as a template
//! for real transports.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value as Json};

use crate::config::EngineConfig;
use crate::error::BridgeError;
use crate::value::NodeHandle;

pub mod local;

/// Assignable load-signal callback, wired onto a page at creation time.
pub type LoadHandler = Box<dyn Fn() + Send + Sync>;

/// Launches rendering-engine instances.
#[async_trait]
pub trait EngineLauncher: Send + Sync {
    /// Create an engine instance with the given launch options.
    async fn create(&self, config: &EngineConfig) -> Result<Arc<dyn RenderingEngine>, BridgeError>;
}

/// A running rendering-engine instance.
#[async_trait]
pub trait RenderingEngine: Send + Sync {
    /// Create a page inside this instance.
    async fn create_page(&self) -> Result<Arc<dyn Page>, BridgeError>;

    /// Terminate the instance.
    async fn exit(&self) -> Result<(), BridgeError>;
}

/// A page inside the rendering engine.
#[async_trait]
pub trait Page: Send + Sync {
    /// Wire the load-started and load-finished signal handlers. Called once,
    /// at page creation.
    fn set_load_handlers(&self, on_started: LoadHandler, on_finished: LoadHandler);

    /// Navigate to a URL, resolving when the load finishes.
    async fn open(&self, url: &str) -> Result<(), BridgeError>;

    /// Run the interceptor routine over a transport payload inside this
    /// page's rendering context and return the encoded result.
    async fn evaluate(&self, payload: Map<String, Json>) -> Result<Json, BridgeError>;

    /// The page's current URL.
    async fn current_url(&self) -> String;
}

/// Engine-side document surface consumed by remote operations.
pub trait Document: Send + Sync {
    /// Find the first element matching a selector.
    fn query_selector(&self, selector: &str) -> Option<NodeHandle>;

    /// Find the first element matching a selector within a context node.
    fn query_selector_in(&self, context: &NodeHandle, selector: &str) -> Option<NodeHandle>;

    /// Find all elements matching a selector.
    fn query_selector_all(&self, selector: &str) -> Vec<NodeHandle>;

    /// Find all elements matching a selector within a context node.
    fn query_selector_all_in(&self, context: &NodeHandle, selector: &str) -> Vec<NodeHandle>;

    /// Evaluate an XPath expression against the document.
    fn evaluate_xpath(&self, expression: &str) -> Vec<NodeHandle>;

    /// Evaluate an XPath expression rooted at a context node.
    fn evaluate_xpath_in(&self, context: &NodeHandle, expression: &str) -> Vec<NodeHandle>;

    /// Full document markup, including the doctype line.
    fn document_html(&self) -> String;
}
