#![forbid(unsafe_code)]

//! Property edits that undo by writing the previous value back.

use std::any::Any;

use flowcanvas_core::{ObjectId, ObjectKind, PipelineId};

use crate::object_model::{CommentEdit, ObjectModel};
use crate::undo::{CommandError, CommandMetadata, CommandResult, TargetKind, UndoableCmd};

/// Change a comment's text and size.
#[derive(Debug)]
pub struct EditCommentCmd {
    pipeline_id: PipelineId,
    before: CommentEdit,
    after: CommentEdit,
    metadata: CommandMetadata,
}

impl EditCommentCmd {
    pub fn new(model: &ObjectModel, pipeline_id: impl Into<PipelineId>, edit: CommentEdit) -> Result<Self, CommandError> {
        let pipeline_id = pipeline_id.into();
        let Some(current) = model.comment(pipeline_id.as_str(), edit.id.as_str()) else {
            if model.flow().contains_pipeline(pipeline_id.as_str()) {
                return Err(CommandError::object_missing(
                    TargetKind::Object(ObjectKind::Comment),
                    &edit.id,
                    &pipeline_id,
                ));
            }
            return Err(CommandError::pipeline_missing(&pipeline_id));
        };
        let before = CommentEdit {
            id: current.id,
            content: current.content,
            width: current.width,
            height: current.height,
        };
        Ok(Self {
            pipeline_id,
            before,
            after: edit,
            metadata: CommandMetadata::new("Edit comment"),
        })
    }
}

impl UndoableCmd<ObjectModel> for EditCommentCmd {
    fn execute(&mut self, model: &mut ObjectModel) -> CommandResult {
        model.edit_comment(self.pipeline_id.as_str(), self.after.clone())?;
        Ok(())
    }

    fn undo(&mut self, model: &mut ObjectModel) -> CommandResult {
        model.edit_comment(self.pipeline_id.as_str(), self.before.clone())?;
        Ok(())
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn is_noop(&self) -> bool {
        self.before == self.after
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn debug_name(&self) -> &'static str {
        "EditCommentCmd"
    }
}

/// Rename a node.
#[derive(Debug)]
pub struct SetNodeLabelCmd {
    pipeline_id: PipelineId,
    id: ObjectId,
    before: String,
    after: String,
    metadata: CommandMetadata,
}

impl SetNodeLabelCmd {
    pub fn new(
        model: &ObjectModel,
        pipeline_id: impl Into<PipelineId>,
        id: impl Into<ObjectId>,
        label: impl Into<String>,
    ) -> Result<Self, CommandError> {
        let pipeline_id = pipeline_id.into();
        let id = id.into();
        super::check_targets(
            model,
            &pipeline_id,
            std::slice::from_ref(&id),
            TargetKind::Object(ObjectKind::Node),
            |kind| kind == ObjectKind::Node,
        )?;
        let before = model
            .node(pipeline_id.as_str(), id.as_str())
            .map(|n| n.label)
            .unwrap_or_default();
        Ok(Self {
            pipeline_id,
            id,
            before,
            after: label.into(),
            metadata: CommandMetadata::new("Rename node"),
        })
    }
}

impl UndoableCmd<ObjectModel> for SetNodeLabelCmd {
    fn execute(&mut self, model: &mut ObjectModel) -> CommandResult {
        model.set_node_label(self.pipeline_id.as_str(), self.id.as_str(), self.after.clone())?;
        Ok(())
    }

    fn undo(&mut self, model: &mut ObjectModel) -> CommandResult {
        model.set_node_label(self.pipeline_id.as_str(), self.id.as_str(), self.before.clone())?;
        Ok(())
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn is_noop(&self) -> bool {
        self.before == self.after
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn debug_name(&self) -> &'static str {
        "SetNodeLabelCmd"
    }
}
