#![forbid(unsafe_code)]

//! Layered auto-layout.
//!
//! Nodes are assigned to layers by longest path over data links, after
//! dropping the back edges a depth-first walk finds, so cycles still lay out.
//! Within a layer nodes keep their pipeline order. Comments are not moved.

use std::collections::{HashMap, VecDeque};

use flowcanvas_core::{LinkType, ModelError, Node, ObjectPosition, Pipeline};

use super::ObjectModel;
use crate::config::{LayoutConfig, LayoutDirection, NodeConfig};

/// Positions for every node of `pipeline`, in node order.
#[must_use]
pub fn compute_layout(pipeline: &Pipeline, layout: &LayoutConfig, defaults: &NodeConfig) -> Vec<ObjectPosition> {
    let count = pipeline.nodes.len();
    if count == 0 {
        return Vec::new();
    }
    let index: HashMap<&str, usize> = pipeline
        .nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.as_str(), i))
        .collect();

    let mut successors = vec![Vec::new(); count];
    for link in pipeline.links.iter().filter(|l| l.link_type == LinkType::NodeLink) {
        if let (Some(&src), Some(&trg)) = (index.get(link.src_id.as_str()), index.get(link.trg_id.as_str())) {
            if src != trg {
                successors[src].push(trg);
            }
        }
    }
    let layers = longest_path_layers(&drop_back_edges(&successors));

    let width = |n: &Node| if n.width > 0.0 { n.width } else { defaults.default_width };
    let height = |n: &Node| if n.height > 0.0 { n.height } else { defaults.default_height };
    let cell_width = pipeline.nodes.iter().map(width).fold(0.0, f64::max);
    let cell_height = pipeline.nodes.iter().map(height).fold(0.0, f64::max);
    let (major, minor) = match layout.direction {
        LayoutDirection::Horizontal => (cell_width, cell_height),
        LayoutDirection::Vertical => (cell_height, cell_width),
    };

    let mut filled = vec![0usize; layers.iter().copied().max().unwrap_or(0) + 1];
    pipeline
        .nodes
        .iter()
        .zip(&layers)
        .map(|(node, &layer)| {
            let slot = filled[layer];
            filled[layer] += 1;
            let along = layout.margin + layer as f64 * (major + layout.layer_gap);
            let across = layout.margin + slot as f64 * (minor + layout.node_gap);
            let (x, y) = match layout.direction {
                LayoutDirection::Horizontal => (along, across),
                LayoutDirection::Vertical => (across, along),
            };
            ObjectPosition {
                id: node.id.clone(),
                x,
                y,
            }
        })
        .collect()
}

fn drop_back_edges(successors: &[Vec<usize>]) -> Vec<Vec<usize>> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        New,
        Active,
        Done,
    }

    let mut marks = vec![Mark::New; successors.len()];
    let mut kept = vec![Vec::new(); successors.len()];
    for root in 0..successors.len() {
        if marks[root] != Mark::New {
            continue;
        }
        marks[root] = Mark::Active;
        let mut stack = vec![(root, 0usize)];
        while let Some((node, next)) = stack.pop() {
            let Some(&child) = successors[node].get(next) else {
                marks[node] = Mark::Done;
                continue;
            };
            stack.push((node, next + 1));
            match marks[child] {
                Mark::Active => {}
                Mark::Done => kept[node].push(child),
                Mark::New => {
                    kept[node].push(child);
                    marks[child] = Mark::Active;
                    stack.push((child, 0));
                }
            }
        }
    }
    kept
}

fn longest_path_layers(successors: &[Vec<usize>]) -> Vec<usize> {
    let mut indegree = vec![0usize; successors.len()];
    for &child in successors.iter().flatten() {
        indegree[child] += 1;
    }
    let mut layers = vec![0usize; successors.len()];
    let mut ready: VecDeque<usize> = (0..successors.len()).filter(|&i| indegree[i] == 0).collect();
    while let Some(node) = ready.pop_front() {
        for &child in &successors[node] {
            layers[child] = layers[child].max(layers[node] + 1);
            indegree[child] -= 1;
            if indegree[child] == 0 {
                ready.push_back(child);
            }
        }
    }
    layers
}

impl ObjectModel {
    /// Where auto-layout would put each node of the pipeline.
    pub fn plan_layout(&self, pipeline_id: &str) -> Result<Vec<ObjectPosition>, ModelError> {
        let pipeline = self.require_pipeline(pipeline_id)?;
        Ok(compute_layout(pipeline, &self.config.layout, &self.config.nodes))
    }

    /// Move every node of the pipeline to its auto-layout position.
    pub fn arrange_layout(&mut self, pipeline_id: &str) -> Result<(), ModelError> {
        let positions = self.plan_layout(pipeline_id)?;
        self.set_object_positions(pipeline_id, positions)
    }
}
