#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use im::Vector;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Comment, Link, Node, is_default};
use crate::error::ObjectKind;
use crate::id::{ObjectId, PipelineId};

/// Pan/scale state of a pipeline view. Opaque to the core.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Zoom {
    pub x: f64,
    pub y: f64,
    pub k: f64,
}

/// One graph scope: nodes, comments, and the links between them.
///
/// Collections are persistent vectors, so cloning a pipeline (and therefore
/// taking a snapshot of the store) shares structure with the original.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pipeline {
    pub id: PipelineId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<Zoom>,
    #[serde(default)]
    pub nodes: Vector<Node>,
    #[serde(default)]
    pub comments: Vector<Comment>,
    #[serde(default)]
    pub links: Vector<Link>,
    /// Set when this pipeline was loaded from an external pipeline flow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
    #[serde(default, skip_serializing_if = "is_default")]
    pub app_data: BTreeMap<String, Value>,
}

impl Pipeline {
    #[must_use]
    pub fn new(id: impl Into<PipelineId>) -> Self {
        Self {
            id: id.into(),
            zoom: None,
            nodes: Vector::new(),
            comments: Vector::new(),
            links: Vector::new(),
            external_url: None,
            app_data: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_nodes(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.nodes.extend(nodes);
        self
    }

    #[must_use]
    pub fn with_comments(mut self, comments: impl IntoIterator<Item = Comment>) -> Self {
        self.comments.extend(comments);
        self
    }

    #[must_use]
    pub fn with_links(mut self, links: impl IntoIterator<Item = Link>) -> Self {
        self.links.extend(links);
        self
    }

    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    #[must_use]
    pub fn comment(&self, id: &str) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == id)
    }

    #[must_use]
    pub fn link(&self, id: &str) -> Option<&Link> {
        self.links.iter().find(|l| l.id == id)
    }

    /// What kind of object `id` names in this pipeline, if any.
    #[must_use]
    pub fn object_kind(&self, id: &str) -> Option<ObjectKind> {
        if self.node(id).is_some() {
            Some(ObjectKind::Node)
        } else if self.comment(id).is_some() {
            Some(ObjectKind::Comment)
        } else if self.link(id).is_some() {
            Some(ObjectKind::Link)
        } else {
            None
        }
    }

    /// Whether `id` names a node or a comment (a valid link endpoint).
    #[must_use]
    pub fn has_endpoint(&self, id: &str) -> bool {
        self.node(id).is_some() || self.comment(id).is_some()
    }

    #[must_use]
    pub fn contains_object(&self, id: &str) -> bool {
        self.object_kind(id).is_some()
    }

    /// Every link with `id` as either endpoint, in pipeline order.
    #[must_use]
    pub fn links_containing_id(&self, id: &str) -> Vec<Link> {
        self.links.iter().filter(|l| l.touches(id)).cloned().collect()
    }

    /// Supernodes on this pipeline.
    pub fn supernodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.subflow_pipeline_id().is_some())
    }

    /// Ids of every node, comment, and link, in that order.
    #[must_use]
    pub fn object_ids(&self) -> Vec<ObjectId> {
        self.nodes
            .iter()
            .map(|n| n.id.clone())
            .chain(self.comments.iter().map(|c| c.id.clone()))
            .chain(self.links.iter().map(|l| l.id.clone()))
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.comments.is_empty() && self.links.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Pipeline {
        Pipeline::new("p1")
            .with_nodes([Node::new("n1"), Node::new("n2")])
            .with_comments([Comment::new("c1", "hi")])
            .with_links([
                Link::node_link("l1", "n1", None, "n2", None),
                Link::comment_link("l2", "c1", "n2"),
            ])
    }

    #[test]
    fn object_kind_lookup() {
        let p = sample();
        assert_eq!(p.object_kind("n1"), Some(ObjectKind::Node));
        assert_eq!(p.object_kind("c1"), Some(ObjectKind::Comment));
        assert_eq!(p.object_kind("l2"), Some(ObjectKind::Link));
        assert_eq!(p.object_kind("zz"), None);
    }

    #[test]
    fn links_containing_id_matches_both_ends() {
        let p = sample();
        let ids: Vec<_> = p
            .links_containing_id("n2")
            .into_iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(ids, vec![ObjectId::new("l1"), ObjectId::new("l2")]);
        assert_eq!(p.links_containing_id("c1").len(), 1);
        assert!(p.links_containing_id("nope").is_empty());
    }
}
