#![forbid(unsafe_code)]

use im::Vector;

use super::{id_set, restore_at, upsert, update_one, update_where};
use crate::action::PipelineAction;
use crate::entity::Node;

/// Transition function for a pipeline's nodes.
#[must_use]
pub fn reduce(nodes: &Vector<Node>, action: &PipelineAction) -> Vector<Node> {
    match action {
        PipelineAction::AddNode(node) => upsert(nodes, node.clone(), |n| n.id == node.id),
        PipelineAction::DeleteNode(id) => nodes.iter().filter(|n| n.id != *id).cloned().collect(),
        PipelineAction::SetNodeLabel { id, label } => {
            update_one(nodes, |n| n.id == *id, |n| n.label = label.clone())
        }
        PipelineAction::SetNodeParameters { id, parameters } => {
            update_one(nodes, |n| n.id == *id, |n| n.parameters = parameters.clone())
        }
        PipelineAction::SetNodeMessage { id, message } => update_one(
            nodes,
            |n| n.id == *id,
            |n| match n.messages.iter_mut().find(|m| m.id_ref == message.id_ref) {
                Some(existing) => *existing = message.clone(),
                None => n.messages.push(message.clone()),
            },
        ),
        PipelineAction::SetNodeMessages { id, messages } => {
            update_one(nodes, |n| n.id == *id, |n| n.messages = messages.clone())
        }
        PipelineAction::MoveObjects {
            ids,
            offset_x,
            offset_y,
        } => {
            let ids = id_set(ids);
            update_where(
                nodes,
                |n| ids.contains(n.id.as_str()),
                |n| {
                    n.x_pos += offset_x;
                    n.y_pos += offset_y;
                },
            )
        }
        PipelineAction::SetObjectPositions(positions) => update_where(
            nodes,
            |n| positions.iter().any(|p| p.id == n.id),
            |n| {
                if let Some(p) = positions.iter().find(|p| p.id == n.id) {
                    n.x_pos = p.x;
                    n.y_pos = p.y;
                }
            },
        ),
        PipelineAction::DeleteObjects(ids) => {
            let ids = id_set(ids);
            nodes
                .iter()
                .filter(|n| !ids.contains(n.id.as_str()))
                .cloned()
                .collect()
        }
        PipelineAction::RestoreObjects { nodes: restored, .. } => restore_at(nodes, restored),
        PipelineAction::AddComment(_)
        | PipelineAction::DeleteComment(_)
        | PipelineAction::EditComment { .. }
        | PipelineAction::AddLinks(_)
        | PipelineAction::DeleteLinks(_)
        | PipelineAction::SetZoom(_) => nodes.clone(),
    }
}
