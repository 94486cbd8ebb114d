#![forbid(unsafe_code)]

//! Read-only graph walks over a [`PipelineFlow`].
//!
//! The flow is an arena of pipelines; supernodes point into it by id. These
//! helpers turn those references into explicit walks so cascade and
//! selection logic never chase pointers.

use std::collections::{HashSet, VecDeque};

use crate::entity::{LinkType, Pipeline, PipelineFlow};
use crate::error::PortDirection;
use crate::id::{ObjectId, PipelineId};

/// Every pipeline reachable through the supernodes `node_ids` of
/// `pipeline_id`, transitively, in breadth-first discovery order.
///
/// Only local references are followed; an external subflow belongs to
/// another flow. Ids referenced but absent from the arena are skipped.
/// Cycles terminate.
#[must_use]
pub fn descendant_pipelines(flow: &PipelineFlow, pipeline_id: &str, node_ids: &[ObjectId]) -> Vec<PipelineId> {
    let Some(pipeline) = flow.pipeline(pipeline_id) else {
        return Vec::new();
    };
    let roots = pipeline
        .supernodes()
        .filter(|n| node_ids.iter().any(|id| *id == n.id))
        .filter_map(|n| n.local_subflow_pipeline_id().cloned());
    walk_subflows(flow, roots, &HashSet::new())
}

/// The descendant pipelines of `node_ids` that nothing else in the flow
/// still references.
///
/// A pipeline shared with a supernode that survives the deletion is kept.
/// This is what deleting those supernodes must remove from the arena.
#[must_use]
pub fn owned_descendant_pipelines(
    flow: &PipelineFlow,
    pipeline_id: &str,
    node_ids: &[ObjectId],
) -> Vec<PipelineId> {
    let descendants = descendant_pipelines(flow, pipeline_id, node_ids);
    if descendants.is_empty() {
        return descendants;
    }

    let removed: HashSet<(&str, &str)> = node_ids
        .iter()
        .map(|id| (pipeline_id, id.as_str()))
        .collect();
    let referenced: HashSet<&str> = flow
        .pipelines
        .iter()
        .flat_map(|p| p.supernodes())
        .filter_map(|n| n.subflow_pipeline_id())
        .map(PipelineId::as_str)
        .collect();
    let roots: Vec<PipelineId> = flow
        .pipelines
        .iter()
        .filter(|p| !referenced.contains(p.id.as_str()))
        .map(|p| p.id.clone())
        .collect();

    let mut kept: HashSet<PipelineId> = roots.iter().cloned().collect();
    kept.extend(walk_subflows(flow, roots, &removed));
    descendants.into_iter().filter(|id| !kept.contains(id)).collect()
}

fn walk_subflows(
    flow: &PipelineFlow,
    roots: impl IntoIterator<Item = PipelineId>,
    skip: &HashSet<(&str, &str)>,
) -> Vec<PipelineId> {
    let mut seen = HashSet::new();
    let mut order = Vec::new();
    let mut queue: VecDeque<PipelineId> = roots.into_iter().collect();
    while let Some(id) = queue.pop_front() {
        let Some(pipeline) = flow.pipeline(id.as_str()) else {
            continue;
        };
        if !seen.insert(id.clone()) {
            continue;
        }
        for node in pipeline.supernodes() {
            if skip.contains(&(pipeline.id.as_str(), node.id.as_str())) {
                continue;
            }
            if let Some(child) = node.local_subflow_pipeline_id() {
                queue.push_back(child.clone());
            }
        }
        order.push(id);
    }
    order
}

/// `start` followed by every object reachable by following links forward,
/// breadth first, in link order.
#[must_use]
pub fn forward_reachable(pipeline: &Pipeline, start: &str) -> Vec<ObjectId> {
    if !pipeline.has_endpoint(start) {
        return Vec::new();
    }
    let mut seen: HashSet<&str> = HashSet::new();
    let mut order = Vec::new();
    let mut queue = VecDeque::from([start]);
    seen.insert(start);
    while let Some(current) = queue.pop_front() {
        order.push(ObjectId::new(current));
        for link in pipeline.links.iter().filter(|l| l.src_id == current) {
            let next = link.trg_id.as_str();
            if seen.insert(next) {
                queue.push_back(next);
            }
        }
    }
    order
}

/// Number of data links bound to `port_id` on `node_id`.
///
/// Links that name no port bind to the node's first port in that direction.
#[must_use]
pub fn port_link_count(pipeline: &Pipeline, node_id: &str, direction: PortDirection, port_id: &str) -> usize {
    let Some(node) = pipeline.node(node_id) else {
        return 0;
    };
    let first = node.ports(direction).first().map(|p| p.id.as_str());
    pipeline
        .links
        .iter()
        .filter(|l| l.link_type == LinkType::NodeLink)
        .filter(|l| {
            let (end, port) = match direction {
                PortDirection::Output => (&l.src_id, l.src_port_id.as_deref()),
                PortDirection::Input => (&l.trg_id, l.trg_port_id.as_deref()),
            };
            *end == node_id && port.or(first) == Some(port_id)
        })
        .count()
}

/// Links whose source or target is missing from their pipeline, as
/// `(pipeline, link)` pairs. Empty for every state the reducers produce.
#[must_use]
pub fn dangling_links(flow: &PipelineFlow) -> Vec<(PipelineId, ObjectId)> {
    flow.pipelines
        .iter()
        .flat_map(|p| {
            p.links
                .iter()
                .filter(|l| !p.has_endpoint(l.src_id.as_str()) || !p.has_endpoint(l.trg_id.as_str()))
                .map(|l| (p.id.clone(), l.id.clone()))
        })
        .collect()
}

/// Pipelines no supernode references, other than the primary one and
/// pipelines loaded from an external flow.
#[must_use]
pub fn orphan_pipelines(flow: &PipelineFlow) -> Vec<PipelineId> {
    let referenced: HashSet<&str> = flow
        .pipelines
        .iter()
        .flat_map(|p| p.supernodes())
        .filter_map(|n| n.subflow_pipeline_id())
        .map(PipelineId::as_str)
        .collect();
    flow.pipelines
        .iter()
        .filter(|p| p.id != flow.primary_pipeline_id && p.external_url.is_none())
        .filter(|p| !referenced.contains(p.id.as_str()))
        .map(|p| p.id.clone())
        .collect()
}
