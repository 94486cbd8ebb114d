#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::is_default;
use crate::id::ObjectId;

/// A free-text annotation placed on a pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: ObjectId,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub x_pos: f64,
    #[serde(default)]
    pub y_pos: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Value>,
    #[serde(default, skip_serializing_if = "is_default")]
    pub app_data: BTreeMap<String, Value>,
}

impl Comment {
    #[must_use]
    pub fn new(id: impl Into<ObjectId>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            x_pos: 0.0,
            y_pos: 0.0,
            width: 0.0,
            height: 0.0,
            style: None,
            app_data: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.x_pos = x;
        self.y_pos = y;
        self
    }

    #[must_use]
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}
