#![forbid(unsafe_code)]

//! Self-contained groups of objects for copy, paste, and clone.

use std::collections::{HashMap, HashSet};

use flowcanvas_core::query::descendant_pipelines;
use flowcanvas_core::{Comment, IdKind, Link, ModelError, Node, ObjectId, Pipeline, PipelineId};
use serde::{Deserialize, Serialize};

use super::ObjectModel;

/// Nodes, comments, and links lifted out of one pipeline, with every
/// pipeline their supernodes reach.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectBundle {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    /// Only links whose two ends are both in the bundle.
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub pipelines: Vec<Pipeline>,
}

impl ObjectBundle {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.comments.is_empty()
    }

    /// Ids of the top-level nodes, comments, and links.
    #[must_use]
    pub fn object_ids(&self) -> Vec<ObjectId> {
        self.nodes
            .iter()
            .map(|n| n.id.clone())
            .chain(self.comments.iter().map(|c| c.id.clone()))
            .chain(self.links.iter().map(|l| l.id.clone()))
            .collect()
    }
}

impl ObjectModel {
    /// Copy the nodes and comments among `ids`, the links between them, and
    /// the pipelines nested under copied supernodes.
    ///
    /// External subflows are not copied; a cloned supernode keeps pointing
    /// at the same external pipeline.
    pub fn bundle_objects(&self, pipeline_id: &str, ids: &[ObjectId]) -> Result<ObjectBundle, ModelError> {
        let pipeline = self.require_pipeline(pipeline_id)?;
        let wanted: HashSet<&str> = ids.iter().map(ObjectId::as_str).collect();

        let nodes: Vec<Node> = pipeline
            .nodes
            .iter()
            .filter(|n| wanted.contains(n.id.as_str()))
            .cloned()
            .collect();
        let comments: Vec<Comment> = pipeline
            .comments
            .iter()
            .filter(|c| wanted.contains(c.id.as_str()))
            .cloned()
            .collect();
        let ends: HashSet<&str> = nodes
            .iter()
            .map(|n| n.id.as_str())
            .chain(comments.iter().map(|c| c.id.as_str()))
            .collect();
        let links = pipeline
            .links
            .iter()
            .filter(|l| ends.contains(l.src_id.as_str()) && ends.contains(l.trg_id.as_str()))
            .cloned()
            .collect();

        let supernodes: Vec<ObjectId> = nodes
            .iter()
            .filter(|n| n.local_subflow_pipeline_id().is_some())
            .map(|n| n.id.clone())
            .collect();
        let pipelines = descendant_pipelines(&self.flow, pipeline_id, &supernodes)
            .iter()
            .filter_map(|id| self.flow.pipeline(id.as_str()).cloned())
            .collect();

        Ok(ObjectBundle {
            nodes,
            comments,
            links,
            pipelines,
        })
    }

    /// A copy of `bundle` with fresh ids throughout, shifted by the offset.
    ///
    /// Nested pipelines get new ids and the supernode references to them are
    /// rewritten. Objects inside nested pipelines keep their ids, which only
    /// need to be unique per pipeline. Links with an end outside the bundle
    /// are dropped.
    pub fn clone_bundle(&mut self, bundle: &ObjectBundle, offset_x: f64, offset_y: f64) -> ObjectBundle {
        let pipeline_ids: HashMap<PipelineId, PipelineId> = bundle
            .pipelines
            .iter()
            .map(|p| (p.id.clone(), self.allocate_pipeline_id()))
            .collect();
        let remap_subflow = |node: &mut Node| {
            if let Some(subflow) = node.subflow_ref.as_mut().filter(|s| !s.is_external()) {
                if let Some(new_id) = pipeline_ids.get(&subflow.pipeline_id_ref) {
                    subflow.pipeline_id_ref = new_id.clone();
                }
            }
        };

        let pipelines = bundle
            .pipelines
            .iter()
            .map(|p| {
                let mut copy = p.clone();
                if let Some(new_id) = pipeline_ids.get(&p.id) {
                    copy.id = new_id.clone();
                }
                for index in 0..copy.nodes.len() {
                    if let Some(node) = copy.nodes.get_mut(index) {
                        remap_subflow(node);
                    }
                }
                copy
            })
            .collect();

        let mut object_ids: HashMap<ObjectId, ObjectId> = HashMap::new();
        let mut nodes = Vec::with_capacity(bundle.nodes.len());
        for node in &bundle.nodes {
            let mut copy = node.clone();
            copy.id = self.allocate_id(IdKind::Node);
            copy.x_pos += offset_x;
            copy.y_pos += offset_y;
            remap_subflow(&mut copy);
            object_ids.insert(node.id.clone(), copy.id.clone());
            nodes.push(copy);
        }
        let mut comments = Vec::with_capacity(bundle.comments.len());
        for comment in &bundle.comments {
            let mut copy = comment.clone();
            copy.id = self.allocate_id(IdKind::Comment);
            copy.x_pos += offset_x;
            copy.y_pos += offset_y;
            object_ids.insert(comment.id.clone(), copy.id.clone());
            comments.push(copy);
        }
        let mut links = Vec::with_capacity(bundle.links.len());
        for link in &bundle.links {
            let (Some(src), Some(trg)) = (object_ids.get(&link.src_id), object_ids.get(&link.trg_id)) else {
                continue;
            };
            let mut copy = link.clone();
            copy.src_id = src.clone();
            copy.trg_id = trg.clone();
            copy.id = self.allocate_id(IdKind::Link);
            links.push(copy);
        }

        ObjectBundle {
            nodes,
            comments,
            links,
            pipelines,
        }
    }

    /// Insert a bundle into a pipeline: pipelines, then nodes and comments,
    /// then links. All or nothing.
    pub fn add_bundle(&mut self, pipeline_id: &str, bundle: &ObjectBundle) -> Result<(), ModelError> {
        self.require_pipeline(pipeline_id)?;
        self.try_batch(|m| {
            if !bundle.pipelines.is_empty() {
                m.add_pipelines(bundle.pipelines.clone())?;
            }
            for node in &bundle.nodes {
                m.add_node(pipeline_id, node.clone())?;
            }
            for comment in &bundle.comments {
                m.add_comment(pipeline_id, comment.clone())?;
            }
            m.add_links(pipeline_id, bundle.links.clone())
        })
    }
}
