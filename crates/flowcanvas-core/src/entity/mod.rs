#![forbid(unsafe_code)]

//! Plain records of the entity store.
//!
//! None of these types carry behavior beyond construction helpers and
//! lookups; every mutation goes through [`crate::reducer`].

mod comment;
mod flow;
mod link;
mod node;
mod pipeline;
mod port;

pub use comment::Comment;
pub use flow::PipelineFlow;
pub use link::{Link, LinkType};
pub use node::{MessageType, Node, NodeMessage, NodeType, SubflowRef};
pub use pipeline::{Pipeline, Zoom};
pub use port::{Cardinality, ParseCardinalityError, Port};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A visual overlay on a node or link. Opaque to the core beyond its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decoration {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Value>,
}

impl Decoration {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            position: None,
            style: None,
        }
    }
}

/// A position update for one node or comment.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectPosition {
    pub id: crate::ObjectId,
    pub x: f64,
    pub y: f64,
}

pub(crate) fn is_default<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}
