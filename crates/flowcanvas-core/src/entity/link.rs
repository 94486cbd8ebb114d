#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Decoration, is_default};
use crate::id::ObjectId;

/// The three kinds of link a pipeline can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LinkType {
    /// Data flow from a node output port to a node input port.
    #[default]
    NodeLink,
    /// Annotation from a comment to a node.
    CommentLink,
    /// Untyped association between two nodes.
    AssociationLink,
}

/// A connection between two objects of the same pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub id: ObjectId,
    #[serde(rename = "type", default)]
    pub link_type: LinkType,
    pub src_id: ObjectId,
    pub trg_id: ObjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_port_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trg_port_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decorations: Vec<Decoration>,
    #[serde(default, skip_serializing_if = "is_default")]
    pub app_data: BTreeMap<String, Value>,
}

impl Link {
    fn base(id: ObjectId, link_type: LinkType, src_id: ObjectId, trg_id: ObjectId) -> Self {
        Self {
            id,
            link_type,
            src_id,
            trg_id,
            src_port_id: None,
            trg_port_id: None,
            label: None,
            style: None,
            decorations: Vec::new(),
            app_data: BTreeMap::new(),
        }
    }

    /// A data link between two nodes, optionally naming the ports.
    #[must_use]
    pub fn node_link(
        id: impl Into<ObjectId>,
        src_id: impl Into<ObjectId>,
        src_port_id: Option<&str>,
        trg_id: impl Into<ObjectId>,
        trg_port_id: Option<&str>,
    ) -> Self {
        let mut link = Self::base(id.into(), LinkType::NodeLink, src_id.into(), trg_id.into());
        link.src_port_id = src_port_id.map(str::to_string);
        link.trg_port_id = trg_port_id.map(str::to_string);
        link
    }

    /// A link from a comment to the node it annotates.
    #[must_use]
    pub fn comment_link(
        id: impl Into<ObjectId>,
        comment_id: impl Into<ObjectId>,
        node_id: impl Into<ObjectId>,
    ) -> Self {
        Self::base(id.into(), LinkType::CommentLink, comment_id.into(), node_id.into())
    }

    #[must_use]
    pub fn association_link(
        id: impl Into<ObjectId>,
        src_id: impl Into<ObjectId>,
        trg_id: impl Into<ObjectId>,
    ) -> Self {
        Self::base(id.into(), LinkType::AssociationLink, src_id.into(), trg_id.into())
    }

    /// Whether either end of the link is `id`.
    #[must_use]
    pub fn touches(&self, id: &str) -> bool {
        self.src_id == id || self.trg_id == id
    }

    /// Same kind, same endpoints, same ports. Ids and display data are ignored.
    #[must_use]
    pub fn connects_same_as(&self, other: &Link) -> bool {
        self.link_type == other.link_type
            && self.src_id == other.src_id
            && self.trg_id == other.trg_id
            && self.src_port_id == other.src_port_id
            && self.trg_port_id == other.trg_port_id
    }
}
