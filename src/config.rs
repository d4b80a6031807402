//! Bridge configuration.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Options forwarded to the rendering-engine launcher.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Parameters passed verbatim to the engine launch.
    pub forwarded_parameters: HashMap<String, String>,
    /// Override path to the engine binary.
    pub engine_path: Option<PathBuf>,
}

/// Browser bridge configuration.
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Base URL prepended to every `visit` target.
    pub site: String,
    /// Engine launch options.
    pub engine: EngineConfig,
    /// Interval between load-state polls while waiting for the page to go idle.
    pub idle_poll_interval: Duration,
    /// Deadline for a page load to finish.
    pub load_timeout: Duration,
    /// Deadline for a single remote operation round trip.
    pub eval_timeout: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            site: String::new(),
            engine: EngineConfig::default(),
            idle_poll_interval: Duration::from_millis(50),
            load_timeout: Duration::from_secs(30),
            eval_timeout: Duration::from_secs(30),
        }
    }
}
