//! In-process reference engine.
//!
//! A complete implementation of the engine seam with a miniature document
//! model: selectors and XPath expressions are exact keys registered up
//! front, and `evaluate` runs the interceptor directly against the page's
//! context. The integration tests drive the whole bridge through it, and a
//! real transport (a child process speaking an evaluate protocol) slots in
//! behind the same traits.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Map, Value as Json};
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::context::PageContext;
use crate::error::BridgeError;
use crate::interceptor;
use crate::ops::OpRegistry;
use crate::value::{NativeNode, NodeHandle};

use super::{Document, EngineLauncher, LoadHandler, Page, RenderingEngine};

/// A document element held by the local engine.
pub struct LocalElement {
    state: Mutex<ElementState>,
    clicks: AtomicUsize,
    children: Mutex<BTreeMap<String, Arc<LocalElement>>>,
    xpath: Mutex<BTreeMap<String, Vec<Arc<LocalElement>>>>,
}

struct ElementState {
    text: String,
    html: String,
    value: Option<String>,
    attributes: BTreeMap<String, String>,
}

impl LocalElement {
    /// Create an empty element.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ElementState {
                text: String::new(),
                html: String::new(),
                value: None,
                attributes: BTreeMap::new(),
            }),
            clicks: AtomicUsize::new(0),
            children: Mutex::new(BTreeMap::new()),
            xpath: Mutex::new(BTreeMap::new()),
        }
    }

    /// Set the text content.
    pub fn with_text(self, text: &str) -> Self {
        self.state.lock().text = text.to_string();
        self
    }

    /// Set the inner markup.
    pub fn with_html(self, html: &str) -> Self {
        self.state.lock().html = html.to_string();
        self
    }

    /// Set the form value.
    pub fn with_value(self, value: &str) -> Self {
        self.state.lock().value = Some(value.to_string());
        self
    }

    /// Set an attribute.
    pub fn with_attribute(self, name: &str, value: &str) -> Self {
        self.state.lock().attributes.insert(name.to_string(), value.to_string());
        self
    }

    /// Register a child reachable through `query_selector_in`.
    pub fn with_child(self, selector: &str, child: Arc<LocalElement>) -> Self {
        self.children.lock().insert(selector.to_string(), child);
        self
    }

    /// Register the result set of an XPath expression rooted at this element.
    pub fn with_xpath(self, expression: &str, elements: Vec<Arc<LocalElement>>) -> Self {
        self.xpath.lock().insert(expression.to_string(), elements);
        self
    }

    /// Current value of an attribute.
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.state.lock().attributes.get(name).cloned()
    }

    /// Number of clicks dispatched at this element.
    pub fn clicks(&self) -> usize {
        self.clicks.load(Ordering::SeqCst)
    }

    /// Wrap this element as a native handle.
    pub fn handle(self: &Arc<Self>) -> NodeHandle {
        NodeHandle::new(self.clone())
    }
}

impl Default for LocalElement {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeNode for LocalElement {
    fn type_tag(&self) -> &str {
        "HTMLElement"
    }

    fn inner_text(&self) -> String {
        self.state.lock().text.clone()
    }

    fn inner_html(&self) -> String {
        self.state.lock().html.clone()
    }

    fn value(&self) -> Option<String> {
        self.state.lock().value.clone()
    }

    fn set_value(&self, value: &str) {
        self.state.lock().value = Some(value.to_string());
    }

    fn click(&self) {
        self.clicks.fetch_add(1, Ordering::SeqCst);
    }

    fn set_attribute(&self, name: &str, value: &str) {
        self.state.lock().attributes.insert(name.to_string(), value.to_string());
    }

    fn remove_attribute(&self, name: &str) {
        self.state.lock().attributes.remove(name);
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Miniature document: selectors and XPath expressions are exact keys.
pub struct LocalDom {
    elements: Mutex<BTreeMap<String, Arc<LocalElement>>>,
    xpath: Mutex<BTreeMap<String, Vec<Arc<LocalElement>>>>,
    html: Mutex<String>,
}

impl LocalDom {
    /// Create an empty document.
    pub fn new() -> Self {
        Self {
            elements: Mutex::new(BTreeMap::new()),
            xpath: Mutex::new(BTreeMap::new()),
            html: Mutex::new("<!DOCTYPE html>\n<html><head></head><body></body></html>".to_string()),
        }
    }

    /// Register an element under a selector.
    pub fn insert(&self, selector: &str, element: Arc<LocalElement>) {
        self.elements.lock().insert(selector.to_string(), element);
    }

    /// Register the result set of an XPath expression.
    pub fn insert_xpath(&self, expression: &str, elements: Vec<Arc<LocalElement>>) {
        self.xpath.lock().insert(expression.to_string(), elements);
    }

    /// Replace the full document markup.
    pub fn set_document_html(&self, html: &str) {
        *self.html.lock() = html.to_string();
    }
}

impl Default for LocalDom {
    fn default() -> Self {
        Self::new()
    }
}

impl Document for LocalDom {
    fn query_selector(&self, selector: &str) -> Option<NodeHandle> {
        self.elements.lock().get(selector).map(LocalElement::handle)
    }

    fn query_selector_in(&self, context: &NodeHandle, selector: &str) -> Option<NodeHandle> {
        let element = context.as_any().downcast_ref::<LocalElement>()?;
        element.children.lock().get(selector).map(LocalElement::handle)
    }

    fn query_selector_all(&self, selector: &str) -> Vec<NodeHandle> {
        // Selectors are exact keys, so at most one element matches.
        self.elements
            .lock()
            .get(selector)
            .map(LocalElement::handle)
            .into_iter()
            .collect()
    }

    fn query_selector_all_in(&self, context: &NodeHandle, selector: &str) -> Vec<NodeHandle> {
        let Some(element) = context.as_any().downcast_ref::<LocalElement>() else {
            return Vec::new();
        };
        element.children.lock().get(selector).map(LocalElement::handle).into_iter().collect()
    }

    fn evaluate_xpath(&self, expression: &str) -> Vec<NodeHandle> {
        self.xpath
            .lock()
            .get(expression)
            .map(|elements| elements.iter().map(LocalElement::handle).collect())
            .unwrap_or_default()
    }

    fn evaluate_xpath_in(&self, context: &NodeHandle, expression: &str) -> Vec<NodeHandle> {
        let Some(element) = context.as_any().downcast_ref::<LocalElement>() else {
            return Vec::new();
        };
        element
            .xpath
            .lock()
            .get(expression)
            .map(|elements| elements.iter().map(LocalElement::handle).collect())
            .unwrap_or_default()
    }

    fn document_html(&self) -> String {
        self.html.lock().clone()
    }
}

/// Launch and page-creation counters, shared with tests.
#[derive(Default)]
pub struct LaunchCounters {
    engines: AtomicUsize,
    pages: AtomicUsize,
}

impl LaunchCounters {
    /// Engine instances created so far.
    pub fn engines(&self) -> usize {
        self.engines.load(Ordering::SeqCst)
    }

    /// Pages created so far.
    pub fn pages(&self) -> usize {
        self.pages.load(Ordering::SeqCst)
    }
}

/// Launcher for the in-process engine.
pub struct LocalLauncher {
    dom: Arc<LocalDom>,
    registry: Arc<OpRegistry>,
    load_latency: Duration,
    counters: Arc<LaunchCounters>,
}

impl LocalLauncher {
    /// Create a launcher serving the given document with the built-in
    /// operation registry and no simulated load latency.
    pub fn new(dom: Arc<LocalDom>) -> Self {
        Self {
            dom,
            registry: Arc::new(OpRegistry::builtin()),
            load_latency: Duration::ZERO,
            counters: Arc::new(LaunchCounters::default()),
        }
    }

    /// Simulate this much time between load start and load finish.
    pub fn with_load_latency(mut self, latency: Duration) -> Self {
        self.load_latency = latency;
        self
    }

    /// Replace the operation registry shipped to pages.
    pub fn with_registry(mut self, registry: OpRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    /// Counters observed by this launcher's engines.
    pub fn counters(&self) -> Arc<LaunchCounters> {
        self.counters.clone()
    }
}

#[async_trait]
impl EngineLauncher for LocalLauncher {
    async fn create(&self, config: &EngineConfig) -> Result<Arc<dyn RenderingEngine>, BridgeError> {
        debug!(
            "Creating local engine ({} forwarded parameters)",
            config.forwarded_parameters.len()
        );
        self.counters.engines.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(LocalEngine {
            dom: self.dom.clone(),
            registry: self.registry.clone(),
            load_latency: self.load_latency,
            counters: self.counters.clone(),
            exited: AtomicBool::new(false),
        }))
    }
}

/// In-process rendering engine instance.
pub struct LocalEngine {
    dom: Arc<LocalDom>,
    registry: Arc<OpRegistry>,
    load_latency: Duration,
    counters: Arc<LaunchCounters>,
    exited: AtomicBool,
}

#[async_trait]
impl RenderingEngine for LocalEngine {
    async fn create_page(&self) -> Result<Arc<dyn Page>, BridgeError> {
        if self.exited.load(Ordering::SeqCst) {
            return Err(BridgeError::PageCreationFailed("engine has exited".to_string()));
        }
        self.counters.pages.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(LocalPage {
            dom: self.dom.clone(),
            registry: self.registry.clone(),
            context: Mutex::new(PageContext::new()),
            handlers: Mutex::new(None),
            url: Mutex::new("about:blank".to_string()),
            load_latency: self.load_latency,
        }))
    }

    async fn exit(&self) -> Result<(), BridgeError> {
        self.exited.store(true, Ordering::SeqCst);
        info!("Local engine exited");
        Ok(())
    }
}

/// A page inside the local engine.
pub struct LocalPage {
    dom: Arc<LocalDom>,
    registry: Arc<OpRegistry>,
    context: Mutex<PageContext>,
    handlers: Mutex<Option<(LoadHandler, LoadHandler)>>,
    url: Mutex<String>,
    load_latency: Duration,
}

impl LocalPage {
    fn fire_started(&self) {
        if let Some((started, _)) = &*self.handlers.lock() {
            started();
        }
    }

    fn fire_finished(&self) {
        if let Some((_, finished)) = &*self.handlers.lock() {
            finished();
        }
    }
}

#[async_trait]
impl Page for LocalPage {
    fn set_load_handlers(&self, on_started: LoadHandler, on_finished: LoadHandler) {
        *self.handlers.lock() = Some((on_started, on_finished));
    }

    async fn open(&self, url: &str) -> Result<(), BridgeError> {
        debug!("Local page opening {}", url);
        self.fire_started();
        tokio::time::sleep(self.load_latency).await;
        *self.url.lock() = url.to_string();
        // Navigation tears down the rendering context; the new one carries a
        // fresh identity and an empty store.
        *self.context.lock() = PageContext::new();
        self.fire_finished();
        Ok(())
    }

    async fn evaluate(&self, payload: Map<String, Json>) -> Result<Json, BridgeError> {
        let mut ctx = self.context.lock();
        interceptor::run(&self.registry, self.dom.as_ref(), &mut ctx, payload)
    }

    async fn current_url(&self) -> String {
        self.url.lock().clone()
    }
}
