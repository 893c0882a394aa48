//! Host-level shell behaviour (`forge-shell.toml`)

use crate::error::{Result, ShellError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Signal application shutdown when the last window goes away
    pub quit_on_empty: bool,
    /// Frontend loaded into developer tools shells
    pub devtools_url: String,
    pub devtools_width: u32,
    pub devtools_height: u32,
    /// `tracing` filter used when `FORGE_LOG` is unset
    pub log_filter: Option<String>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            quit_on_empty: true,
            devtools_url: Self::BUILTIN_DEVTOOLS_URL.to_string(),
            devtools_width: 800,
            devtools_height: 600,
            log_filter: None,
        }
    }
}

impl ShellConfig {
    pub const FILE_NAME: &'static str = "forge-shell.toml";
    /// Devtools page the host serves itself
    pub const BUILTIN_DEVTOOLS_URL: &'static str = "app://__forge/devtools.html";

    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| ShellError::invalid_config(e.to_string()))
    }
}
