use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShadowPathConfig {
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub query: QueryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default)]
    pub visible: bool,
    #[serde(default = "default_no_sandbox")]
    pub no_sandbox: bool,
    #[serde(default)]
    pub chrome_bin: Option<PathBuf>,
    /// Persistent profile directory. A temporary one is used when unset.
    #[serde(default)]
    pub user_data_dir: Option<PathBuf>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            visible: false,
            no_sandbox: default_no_sandbox(),
            chrome_bin: None,
            user_data_dir: None,
        }
    }
}

fn default_no_sandbox() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// How long to keep polling for a non-empty result. Zero means one attempt.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Pause after navigation before the first query.
    #[serde(default)]
    pub settle_ms: u64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            settle_ms: 0,
        }
    }
}

fn default_timeout_ms() -> u64 {
    4000
}

fn default_poll_interval_ms() -> u64 {
    200
}
