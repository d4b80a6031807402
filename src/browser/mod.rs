//! Control-side browser bridge.
//!
//! One `Browser` owns at most one rendering-engine instance and one page,
//! created lazily on the first operation that needs them. Every operation
//! observes page readiness before dispatch; results come back as transport
//! JSON in which reference tokens stay opaque (they are only ever resolved
//! inside the rendering context that minted them).

mod actions;
mod session;

pub use session::Browser;

#[cfg(test)]
#[path = "browser_tests.rs"]
mod tests;
