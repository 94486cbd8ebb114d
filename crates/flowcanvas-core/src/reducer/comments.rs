#![forbid(unsafe_code)]

use im::Vector;

use super::{id_set, restore_at, upsert, update_one, update_where};
use crate::action::PipelineAction;
use crate::entity::Comment;

/// Transition function for a pipeline's comments.
#[must_use]
pub fn reduce(comments: &Vector<Comment>, action: &PipelineAction) -> Vector<Comment> {
    match action {
        PipelineAction::AddComment(comment) => {
            upsert(comments, comment.clone(), |c| c.id == comment.id)
        }
        PipelineAction::DeleteComment(id) => {
            comments.iter().filter(|c| c.id != *id).cloned().collect()
        }
        PipelineAction::EditComment {
            id,
            content,
            width,
            height,
        } => update_one(
            comments,
            |c| c.id == *id,
            |c| {
                c.content = content.clone();
                c.width = *width;
                c.height = *height;
            },
        ),
        PipelineAction::MoveObjects {
            ids,
            offset_x,
            offset_y,
        } => {
            let ids = id_set(ids);
            update_where(
                comments,
                |c| ids.contains(c.id.as_str()),
                |c| {
                    c.x_pos += offset_x;
                    c.y_pos += offset_y;
                },
            )
        }
        PipelineAction::SetObjectPositions(positions) => update_where(
            comments,
            |c| positions.iter().any(|p| p.id == c.id),
            |c| {
                if let Some(p) = positions.iter().find(|p| p.id == c.id) {
                    c.x_pos = p.x;
                    c.y_pos = p.y;
                }
            },
        ),
        PipelineAction::DeleteObjects(ids) => {
            let ids = id_set(ids);
            comments
                .iter()
                .filter(|c| !ids.contains(c.id.as_str()))
                .cloned()
                .collect()
        }
        PipelineAction::RestoreObjects {
            comments: restored, ..
        } => restore_at(comments, restored),
        PipelineAction::AddNode(_)
        | PipelineAction::DeleteNode(_)
        | PipelineAction::SetNodeLabel { .. }
        | PipelineAction::SetNodeParameters { .. }
        | PipelineAction::SetNodeMessage { .. }
        | PipelineAction::SetNodeMessages { .. }
        | PipelineAction::AddLinks(_)
        | PipelineAction::DeleteLinks(_)
        | PipelineAction::SetZoom(_) => comments.clone(),
    }
}
