#![forbid(unsafe_code)]

//! Node and comment creation.

use std::any::Any;

use flowcanvas_core::{Comment, Link, Node, Pipeline, PipelineId};

use super::{check_pipeline, remove_created};
use crate::object_model::ObjectModel;
use crate::undo::{CommandError, CommandMetadata, CommandResult, UndoableCmd};

/// Insert an already decided node, optionally with new pipelines for it to
/// reference.
#[derive(Debug)]
pub struct CreateNodeCmd {
    pipeline_id: PipelineId,
    node: Node,
    sub_pipelines: Vec<Pipeline>,
    metadata: CommandMetadata,
}

impl CreateNodeCmd {
    pub fn new(model: &ObjectModel, pipeline_id: impl Into<PipelineId>, node: Node) -> Result<Self, CommandError> {
        Self::supernode(model, pipeline_id, node, Vec::new())
    }

    /// A supernode and the pipelines it brings along. The pipelines are
    /// fixed here so redo re-adds the very same ones.
    pub fn supernode(
        model: &ObjectModel,
        pipeline_id: impl Into<PipelineId>,
        node: Node,
        sub_pipelines: Vec<Pipeline>,
    ) -> Result<Self, CommandError> {
        let pipeline_id = pipeline_id.into();
        check_pipeline(model, &pipeline_id)?;
        let description = if node.label.is_empty() {
            "Create node".to_string()
        } else {
            format!("Create node '{}'", node.label)
        };
        Ok(Self {
            pipeline_id,
            node,
            sub_pipelines,
            metadata: CommandMetadata::new(description),
        })
    }

    #[must_use]
    pub fn node(&self) -> &Node {
        &self.node
    }
}

impl UndoableCmd<ObjectModel> for CreateNodeCmd {
    fn execute(&mut self, model: &mut ObjectModel) -> CommandResult {
        let pipeline_id = self.pipeline_id.as_str();
        if self.sub_pipelines.is_empty() {
            model.add_node(pipeline_id, self.node.clone())?;
        } else {
            model.add_supernode(pipeline_id, self.node.clone(), self.sub_pipelines.clone())?;
        }
        Ok(())
    }

    fn undo(&mut self, model: &mut ObjectModel) -> CommandResult {
        remove_created(
            model,
            &self.pipeline_id,
            std::slice::from_ref(&self.node.id),
            &self.sub_pipelines,
        )
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn debug_name(&self) -> &'static str {
        "CreateNodeCmd"
    }
}

/// Insert a comment, optionally linked to nodes.
#[derive(Debug)]
pub struct CreateCommentCmd {
    pipeline_id: PipelineId,
    comment: Comment,
    links: Vec<Link>,
    metadata: CommandMetadata,
}

impl CreateCommentCmd {
    pub fn new(
        model: &ObjectModel,
        pipeline_id: impl Into<PipelineId>,
        comment: Comment,
        links: Vec<Link>,
    ) -> Result<Self, CommandError> {
        let pipeline_id = pipeline_id.into();
        check_pipeline(model, &pipeline_id)?;
        Ok(Self {
            pipeline_id,
            comment,
            links,
            metadata: CommandMetadata::new("Create comment"),
        })
    }

    #[must_use]
    pub fn comment(&self) -> &Comment {
        &self.comment
    }
}

impl UndoableCmd<ObjectModel> for CreateCommentCmd {
    fn execute(&mut self, model: &mut ObjectModel) -> CommandResult {
        let pipeline_id = self.pipeline_id.as_str();
        let (comment, links) = (&self.comment, &self.links);
        model.try_batch(|m| {
            m.add_comment(pipeline_id, comment.clone())?;
            m.add_links(pipeline_id, links.clone())
        })?;
        Ok(())
    }

    fn undo(&mut self, model: &mut ObjectModel) -> CommandResult {
        let mut ids = vec![self.comment.id.clone()];
        ids.extend(self.links.iter().map(|l| l.id.clone()));
        remove_created(model, &self.pipeline_id, &ids, &[])
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn debug_name(&self) -> &'static str {
        "CreateCommentCmd"
    }
}
