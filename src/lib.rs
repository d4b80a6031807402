//! Remote execution and object-reference bridge for driving a headless
//! rendering engine.
//!
//! A control process drives a sandboxed page-rendering process through one
//! lazily created session (one engine instance, one page). Named remote
//! operations are dispatched into the rendering context with an argument
//! bag; on the way out, native document-node handles — which cannot cross
//! the process boundary as data — are replaced with opaque reference tokens,
//! and on the way in, tokens are resolved back to live handles.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐    evaluate      ┌─────────────────────┐
//! │  Control side   │ ◄──────────────► │  Rendering context   │
//! │  Browser        │   (transport)    │  interceptor + ops   │
//! │  execute/visit  │                  │  codec + ref store   │
//! └─────────────────┘                  └─────────────────────┘
//! ```
//!
//! Every operation waits for the page to be idle before dispatch; the
//! readiness tracker follows the engine's load-started/load-finished
//! signals. Reference tokens are scoped to the rendering context that
//! minted them: contexts are recreated on navigation, so stale tokens
//! resolve to null rather than aliasing unrelated handles.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let dom = Arc::new(LocalDom::new());
//! let browser = Browser::new(BrowserConfig::default(), Box::new(LocalLauncher::new(dom)));
//! browser.visit("/index.html").await?;
//! let title = browser.text("#title", None).await?;
//! browser.close().await?;
//! ```

pub mod browser;
pub mod codec;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod interceptor;
pub mod ops;
pub mod readiness;
pub mod value;

pub use browser::Browser;
pub use config::{BrowserConfig, EngineConfig};
pub use context::{ContextId, NodeStore, PageContext};
pub use engine::local::{LaunchCounters, LocalDom, LocalElement, LocalEngine, LocalLauncher, LocalPage};
pub use engine::{Document, EngineLauncher, LoadHandler, Page, RenderingEngine};
pub use error::BridgeError;
pub use ops::{ArgBag, OpRegistry, RemoteOp};
pub use readiness::LoadTracker;
pub use value::{
    NODE_MARKER, NativeNode, NodeHandle, NodeToken, PAYLOAD_KEY, RESERVED_PREFIX, ScriptValue,
};
