//! Application package manifest (`package.json`)

use crate::config::ShellConfig;
use crate::error::{Result, ShellError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowPosition {
    Center,
    Mouse,
}

/// `window` section of the manifest
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WindowManifest {
    pub title: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub min_width: Option<u32>,
    pub min_height: Option<u32>,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub position: Option<WindowPosition>,
    pub resizable: Option<bool>,
    pub frame: Option<bool>,
    pub toolbar: Option<bool>,
    pub show: Option<bool>,
    #[serde(alias = "always-on-top")]
    pub always_on_top: Option<bool>,
    pub fullscreen: Option<bool>,
    pub show_devtools: Option<bool>,
}

impl WindowManifest {
    pub fn is_shown(&self) -> bool {
        self.show.unwrap_or(true)
    }

    pub fn has_frame(&self) -> bool {
        self.frame.unwrap_or(true)
    }

    pub fn has_toolbar(&self) -> bool {
        self.toolbar.unwrap_or(true)
    }

    pub fn wants_devtools(&self) -> bool {
        self.show_devtools.unwrap_or(false)
    }

    /// Window used for a developer tools shell
    pub fn for_devtools(config: &ShellConfig) -> Self {
        Self {
            title: Some("Developer Tools".to_string()),
            width: Some(config.devtools_width),
            height: Some(config.devtools_height),
            toolbar: Some(false),
            show: Some(true),
            ..Self::default()
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawPackage {
    #[serde(default)]
    name: String,
    #[serde(default)]
    main: String,
    #[serde(default)]
    window: WindowManifest,
}

/// Loaded application package; read-only once the shell context holds it
#[derive(Debug, Clone)]
pub struct Package {
    root: PathBuf,
    name: String,
    main: String,
    window: WindowManifest,
    raw: serde_json::Value,
}

impl Package {
    pub const MANIFEST_FILE: &'static str = "package.json";

    /// Parse manifest text belonging to the package rooted at `root`
    pub fn from_json(root: impl Into<PathBuf>, text: &str) -> Result<Self> {
        let raw: serde_json::Value = serde_json::from_str(text)
            .map_err(|e| ShellError::invalid_manifest(e.to_string()))?;
        let parsed: RawPackage = serde_json::from_value(raw.clone())
            .map_err(|e| ShellError::invalid_manifest(e.to_string()))?;

        if parsed.name.trim().is_empty() {
            return Err(ShellError::invalid_manifest("field `name` must not be empty"));
        }
        if parsed.main.trim().is_empty() {
            return Err(ShellError::invalid_manifest("field `main` must not be empty"));
        }

        Ok(Self {
            root: root.into(),
            name: parsed.name,
            main: parsed.main,
            window: parsed.window,
            raw,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn main(&self) -> &str {
        &self.main
    }

    pub fn window_manifest(&self) -> &WindowManifest {
        &self.window
    }

    /// Whole manifest, for consumers reading keys the shell does not know about
    pub fn raw(&self) -> &serde_json::Value {
        &self.raw
    }

    /// URL the first window navigates to
    pub fn start_url(&self) -> String {
        if self.main.contains("://") {
            self.main.clone()
        } else {
            format!("app://{}", self.main.trim_start_matches("./").trim_start_matches('/'))
        }
    }
}
