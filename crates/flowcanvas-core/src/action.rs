#![forbid(unsafe_code)]

//! The closed set of mutations the entity store understands.
//!
//! [`Action`] is the combined stream handed to [`crate::reducer::reduce`].
//! Edits inside one pipeline are [`PipelineAction`]s wrapped in
//! [`Action::Pipeline`]; each per-entity transition function matches every
//! variant and passes through the ones that are not its concern.

use serde_json::Value;

use crate::entity::{Comment, Link, Node, NodeMessage, ObjectPosition, Pipeline, PipelineFlow, Zoom};
use crate::id::{ObjectId, PipelineId};

/// A mutation scoped to one pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineAction {
    AddNode(Node),
    /// Removes the node and, in the same transition, every link touching it.
    DeleteNode(ObjectId),
    SetNodeLabel { id: ObjectId, label: String },
    SetNodeParameters { id: ObjectId, parameters: Option<Value> },
    /// Replace any message for the same control, or append.
    SetNodeMessage { id: ObjectId, message: NodeMessage },
    SetNodeMessages { id: ObjectId, messages: Vec<NodeMessage> },
    AddComment(Comment),
    /// Removes the comment and every link touching it.
    DeleteComment(ObjectId),
    EditComment {
        id: ObjectId,
        content: String,
        width: f64,
        height: f64,
    },
    /// Shift nodes and comments by an offset. Ids that are not nodes or
    /// comments are ignored.
    MoveObjects {
        ids: Vec<ObjectId>,
        offset_x: f64,
        offset_y: f64,
    },
    /// Put nodes and comments at absolute positions.
    SetObjectPositions(Vec<ObjectPosition>),
    AddLinks(Vec<Link>),
    DeleteLinks(Vec<ObjectId>),
    /// Remove every listed node, comment, and link plus every link left
    /// dangling, computed against one snapshot.
    DeleteObjects(Vec<ObjectId>),
    /// Put previously removed objects back at their recorded indices.
    /// Each list must be sorted by index, ascending.
    RestoreObjects {
        nodes: Vec<(usize, Node)>,
        comments: Vec<(usize, Comment)>,
        links: Vec<(usize, Link)>,
    },
    SetZoom(Option<Zoom>),
}

/// A mutation of the pipeline flow.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// An edit inside one pipeline. Unknown pipeline ids are a no-op.
    Pipeline {
        pipeline_id: PipelineId,
        action: PipelineAction,
    },
    /// Append pipelines. A pipeline whose id is already present replaces it
    /// in place.
    AddPipelines(Vec<Pipeline>),
    DeletePipelines(Vec<PipelineId>),
    /// Put previously removed pipelines back at their recorded indices,
    /// sorted ascending.
    RestorePipelines(Vec<(usize, Pipeline)>),
    /// Swap in a whole new document.
    ReplaceFlow(PipelineFlow),
    /// Apply several actions in order, producing one new state.
    Batch(Vec<Action>),
}

impl Action {
    /// Shorthand for [`Action::Pipeline`].
    #[must_use]
    pub fn in_pipeline(pipeline_id: impl Into<PipelineId>, action: PipelineAction) -> Self {
        Self::Pipeline {
            pipeline_id: pipeline_id.into(),
            action,
        }
    }

    /// The pipeline this action is scoped to, if any.
    #[must_use]
    pub fn pipeline_id(&self) -> Option<&PipelineId> {
        match self {
            Self::Pipeline { pipeline_id, .. } => Some(pipeline_id),
            Self::AddPipelines(_)
            | Self::DeletePipelines(_)
            | Self::RestorePipelines(_)
            | Self::ReplaceFlow(_)
            | Self::Batch(_) => None,
        }
    }

    /// Short name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pipeline { action, .. } => action.name(),
            Self::AddPipelines(_) => "add_pipelines",
            Self::DeletePipelines(_) => "delete_pipelines",
            Self::RestorePipelines(_) => "restore_pipelines",
            Self::ReplaceFlow(_) => "replace_flow",
            Self::Batch(_) => "batch",
        }
    }
}

impl PipelineAction {
    /// Short name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddNode(_) => "add_node",
            Self::DeleteNode(_) => "delete_node",
            Self::SetNodeLabel { .. } => "set_node_label",
            Self::SetNodeParameters { .. } => "set_node_parameters",
            Self::SetNodeMessage { .. } => "set_node_message",
            Self::SetNodeMessages { .. } => "set_node_messages",
            Self::AddComment(_) => "add_comment",
            Self::DeleteComment(_) => "delete_comment",
            Self::EditComment { .. } => "edit_comment",
            Self::MoveObjects { .. } => "move_objects",
            Self::SetObjectPositions(_) => "set_object_positions",
            Self::AddLinks(_) => "add_links",
            Self::DeleteLinks(_) => "delete_links",
            Self::DeleteObjects(_) => "delete_objects",
            Self::RestoreObjects { .. } => "restore_objects",
            Self::SetZoom(_) => "set_zoom",
        }
    }
}
