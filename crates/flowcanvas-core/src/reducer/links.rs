#![forbid(unsafe_code)]

use im::Vector;

use super::{id_set, restore_at, upsert};
use crate::action::PipelineAction;
use crate::entity::Link;

/// Transition function for a pipeline's links.
///
/// Deleting a node or comment drops every link that touches it here, in the
/// same transition, so no snapshot ever holds a dangling link.
#[must_use]
pub fn reduce(links: &Vector<Link>, action: &PipelineAction) -> Vector<Link> {
    match action {
        PipelineAction::AddLinks(added) => added
            .iter()
            .fold(links.clone(), |acc, link| upsert(&acc, link.clone(), |l| l.id == link.id)),
        PipelineAction::DeleteLinks(ids) => {
            let ids = id_set(ids);
            links
                .iter()
                .filter(|l| !ids.contains(l.id.as_str()))
                .cloned()
                .collect()
        }
        PipelineAction::DeleteNode(id) | PipelineAction::DeleteComment(id) => links
            .iter()
            .filter(|l| !l.touches(id.as_str()))
            .cloned()
            .collect(),
        PipelineAction::DeleteObjects(ids) => {
            let ids = id_set(ids);
            links
                .iter()
                .filter(|l| {
                    !ids.contains(l.id.as_str())
                        && !ids.contains(l.src_id.as_str())
                        && !ids.contains(l.trg_id.as_str())
                })
                .cloned()
                .collect()
        }
        PipelineAction::RestoreObjects { links: restored, .. } => restore_at(links, restored),
        PipelineAction::AddNode(_)
        | PipelineAction::SetNodeLabel { .. }
        | PipelineAction::SetNodeParameters { .. }
        | PipelineAction::SetNodeMessage { .. }
        | PipelineAction::SetNodeMessages { .. }
        | PipelineAction::AddComment(_)
        | PipelineAction::EditComment { .. }
        | PipelineAction::MoveObjects { .. }
        | PipelineAction::SetObjectPositions(_)
        | PipelineAction::SetZoom(_) => links.clone(),
    }
}
