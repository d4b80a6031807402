//! Browser struct, lazy session init, and the remote call bridge.

use std::sync::Arc;

use serde_json::{Map, Value as Json};
use tokio::sync::RwLock;
use tracing::{debug, info, trace, warn};

use crate::config::BrowserConfig;
use crate::engine::{EngineLauncher, Page, RenderingEngine};
use crate::error::BridgeError;
use crate::readiness::LoadTracker;
use crate::value::PAYLOAD_KEY;

/// Bridge to a single page inside a single rendering-engine instance.
pub struct Browser {
    pub(super) config: BrowserConfig,
    launcher: Box<dyn EngineLauncher>,
    engine: RwLock<Option<Arc<dyn RenderingEngine>>>,
    page: RwLock<Option<Arc<dyn Page>>>,
    tracker: Arc<LoadTracker>,
}

impl Browser {
    /// Create a bridge. Nothing is launched until the first operation that
    /// needs a page.
    pub fn new(config: BrowserConfig, launcher: Box<dyn EngineLauncher>) -> Self {
        Self {
            config,
            launcher,
            engine: RwLock::new(None),
            page: RwLock::new(None),
            tracker: Arc::new(LoadTracker::new()),
        }
    }

    /// Whether a navigation is currently in flight.
    pub fn is_loading(&self) -> bool {
        self.tracker.is_loading()
    }

    /// Get the ready page, creating the engine instance and page on first
    /// use. Resolves only once the page is idle. Creation failures propagate
    /// to the caller; no retry is attempted.
    pub async fn page(&self) -> Result<Arc<dyn Page>, BridgeError> {
        // Drop the read guard before falling through to creation, which
        // takes the write lock.
        let cached = self.page.read().await.clone();
        let page = match cached {
            Some(page) => page,
            None => self.create_session().await?,
        };
        self.tracker
            .await_idle(self.config.idle_poll_interval, self.config.load_timeout)
            .await?;
        Ok(page)
    }

    async fn create_session(&self) -> Result<Arc<dyn Page>, BridgeError> {
        let mut slot = self.page.write().await;
        if let Some(page) = slot.as_ref() {
            return Ok(page.clone());
        }

        info!("Launching rendering engine");
        let engine = self.launcher.create(&self.config.engine).await?;
        let page = match engine.create_page().await {
            Ok(page) => page,
            Err(err) => {
                // Don't leave an orphaned engine instance behind.
                if let Err(exit_err) = engine.exit().await {
                    warn!("Engine exit after failed page creation: {}", exit_err);
                }
                return Err(err);
            }
        };

        let started = self.tracker.clone();
        let finished = self.tracker.clone();
        page.set_load_handlers(
            Box::new(move || started.load_started()),
            Box::new(move || finished.load_finished()),
        );

        *self.engine.write().await = Some(engine);
        *slot = Some(page.clone());
        debug!("Session ready");
        Ok(page)
    }

    /// Dispatch a named remote operation with an argument bag and return the
    /// transport-level result.
    ///
    /// Waits for the page to be idle first. Concurrent calls against the
    /// same session are not ordered or isolated relative to each other; the
    /// engine interleaves them however its transport permits. Once
    /// dispatched a call runs to completion or failure; there is no
    /// cancellation.
    pub async fn execute(&self, op: &str, mut args: Map<String, Json>) -> Result<Json, BridgeError> {
        args.insert(PAYLOAD_KEY.to_string(), Json::String(op.to_string()));

        let page = self.page().await?;
        trace!("Dispatching {} with {} arguments", op, args.len() - 1);

        match tokio::time::timeout(self.config.eval_timeout, page.evaluate(args)).await {
            Ok(result) => result,
            Err(_) => Err(BridgeError::Timeout(format!(
                "Operation {} timed out after {}ms",
                op,
                self.config.eval_timeout.as_millis()
            ))),
        }
    }

    /// Navigate the page to `site` + `url`, resolving when the load
    /// finishes. Does not use the marshal pipeline.
    pub async fn visit(&self, url: &str) -> Result<(), BridgeError> {
        let page = self.page().await?;
        let target = format!("{}{}", self.config.site, url);
        info!("Visiting {}", target);

        match tokio::time::timeout(self.config.load_timeout, page.open(&target)).await {
            Ok(result) => result,
            Err(_) => Err(BridgeError::Timeout(format!(
                "Navigation to {} timed out after {}ms",
                target,
                self.config.load_timeout.as_millis()
            ))),
        }
    }

    /// Close the session, terminating the engine instance. Idempotent no-op
    /// if nothing was ever created; a later operation lazily recreates the
    /// session.
    pub async fn close(&self) -> Result<(), BridgeError> {
        self.page.write().await.take();
        if let Some(engine) = self.engine.write().await.take() {
            engine.exit().await?;
            info!("Session closed");
        }
        Ok(())
    }
}
