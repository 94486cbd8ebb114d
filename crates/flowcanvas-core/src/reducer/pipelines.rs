#![forbid(unsafe_code)]

use std::collections::HashSet;

use im::Vector;

use super::{restore_at, upsert};
use crate::action::{Action, PipelineAction};
use crate::entity::{Pipeline, Zoom};

/// Transition function for the pipeline arena.
#[must_use]
pub fn reduce(pipelines: &Vector<Pipeline>, action: &Action) -> Vector<Pipeline> {
    match action {
        Action::AddPipelines(added) => added
            .iter()
            .fold(pipelines.clone(), |acc, p| upsert(&acc, p.clone(), |q| q.id == p.id)),
        Action::DeletePipelines(ids) => {
            let ids: HashSet<&str> = ids.iter().map(|id| id.as_str()).collect();
            pipelines
                .iter()
                .filter(|p| !ids.contains(p.id.as_str()))
                .cloned()
                .collect()
        }
        Action::RestorePipelines(restored) => restore_at(pipelines, restored),
        Action::Pipeline { .. } | Action::ReplaceFlow(_) | Action::Batch(_) => pipelines.clone(),
    }
}

/// Transition function for a pipeline's view state.
#[must_use]
pub fn reduce_zoom(zoom: Option<Zoom>, action: &PipelineAction) -> Option<Zoom> {
    match action {
        PipelineAction::SetZoom(next) => *next,
        _ => zoom,
    }
}
