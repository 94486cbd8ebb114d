#![forbid(unsafe_code)]

//! Editor configuration as data.
//!
//! Every tunable of the editor core lives in one [`EditorConfig`] that can
//! be loaded from TOML or JSON at startup. Missing sections and keys keep
//! their defaults.
//!
//! # Loading
//!
//! ```toml
//! # flowcanvas.toml
//! [history]
//! max_depth = 250
//!
//! [layout]
//! direction = "vertical"
//! ```
//!
//! ```rust,ignore
//! let config = EditorConfig::from_toml_file("flowcanvas.toml")?;
//! let config = EditorConfig::from_json_str(json)?;
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::undo::HistoryConfig;

// ---------------------------------------------------------------------------
// Top-level EditorConfig
// ---------------------------------------------------------------------------

/// Top-level configuration for one editor instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Undo history bounds.
    pub history: HistoryConfig,

    /// Geometry for newly created nodes.
    pub nodes: NodeConfig,

    /// Geometry for newly created comments.
    pub comments: CommentConfig,

    /// Link acceptance rules.
    pub links: LinkRules,

    /// Auto-layout parameters.
    pub layout: LayoutConfig,

    /// Cut/copy/paste behavior.
    pub clipboard: ClipboardConfig,
}

impl EditorConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.history.max_depth == 0 {
            errors.push("history.max_depth must be at least 1".to_string());
        }

        for (name, value) in [
            ("nodes.default_width", self.nodes.default_width),
            ("nodes.default_height", self.nodes.default_height),
            ("nodes.placement_step", self.nodes.placement_step),
            ("comments.default_width", self.comments.default_width),
            ("comments.default_height", self.comments.default_height),
        ] {
            if !(value.is_finite() && value > 0.0) {
                errors.push(format!("{name} must be a positive number, got {value}"));
            }
        }

        for (name, value) in [
            ("layout.layer_gap", self.layout.layer_gap),
            ("layout.node_gap", self.layout.node_gap),
            ("layout.margin", self.layout.margin),
            ("clipboard.paste_offset", self.clipboard.paste_offset),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                errors.push(format!("{name} must be zero or more, got {value}"));
            }
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Defaults for nodes created without explicit geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub default_width: f64,
    pub default_height: f64,
    /// Diagonal step used when searching for a free spot.
    pub placement_step: f64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            default_width: 70.0,
            default_height: 75.0,
            placement_step: 20.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentConfig {
    pub default_width: f64,
    pub default_height: f64,
}

impl Default for CommentConfig {
    fn default() -> Self {
        Self {
            default_width: 175.0,
            default_height: 42.0,
        }
    }
}

/// Which new links are accepted besides the port cardinality check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkRules {
    pub allow_self_links: bool,
    pub allow_duplicate_links: bool,
}

/// Flow direction of the layered auto-layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutDirection {
    /// Layers run left to right.
    #[default]
    Horizontal,
    /// Layers run top to bottom.
    Vertical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub direction: LayoutDirection,
    /// Space between consecutive layers.
    pub layer_gap: f64,
    /// Space between nodes within a layer.
    pub node_gap: f64,
    /// Offset of the first layer and first node from the origin.
    pub margin: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            direction: LayoutDirection::Horizontal,
            layer_gap: 100.0,
            node_gap: 40.0,
            margin: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipboardConfig {
    /// Displacement applied to pasted objects on both axes.
    pub paste_offset: f64,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self { paste_offset: 10.0 }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from loading an [`EditorConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(toml::de::Error),

    #[error("JSON parse error: {0}")]
    Json(serde_json::Error),
}
