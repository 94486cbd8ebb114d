#![forbid(unsafe_code)]

//! Removals: objects with cascade, bare links, and disconnects.
//!
//! All three snapshot what they remove at construction, with positions, and
//! undo by putting the snapshot back in place.

use std::any::Any;

use flowcanvas_core::{ObjectId, ObjectKind, PipelineId};

use super::{check_targets, counted};
use crate::object_model::{ObjectModel, RemovedObjects};
use crate::undo::{CommandError, CommandMetadata, CommandResult, TargetKind, UndoableCmd};

macro_rules! removal_command {
    ($name:ident) => {
        impl $name {
            /// What this command takes out of the model.
            #[must_use]
            pub fn removed(&self) -> &RemovedObjects {
                &self.removed
            }
        }

        impl UndoableCmd<ObjectModel> for $name {
            fn execute(&mut self, model: &mut ObjectModel) -> CommandResult {
                model.apply_removal(&self.removed)?;
                Ok(())
            }

            fn undo(&mut self, model: &mut ObjectModel) -> CommandResult {
                model.restore_objects(&self.removed)?;
                Ok(())
            }

            fn metadata(&self) -> &CommandMetadata {
                &self.metadata
            }

            fn is_noop(&self) -> bool {
                self.removed.is_empty()
            }

            fn as_any(&self) -> &dyn Any {
                self
            }

            fn debug_name(&self) -> &'static str {
                stringify!($name)
            }
        }
    };
}

/// Delete nodes, comments, and links, with the links they leave dangling
/// and the pipelines owned by deleted supernodes.
#[derive(Debug)]
pub struct DeleteObjectsCmd {
    removed: RemovedObjects,
    metadata: CommandMetadata,
}

impl DeleteObjectsCmd {
    pub fn new(model: &ObjectModel, pipeline_id: impl Into<PipelineId>, ids: &[ObjectId]) -> Result<Self, CommandError> {
        let pipeline_id = pipeline_id.into();
        check_targets(model, &pipeline_id, ids, TargetKind::Unknown, |_| true)?;
        let removed = model.plan_deletion(pipeline_id.as_str(), ids)?;
        let description = format!("Delete {}", counted(ids.len(), "object"));
        Ok(Self {
            removed,
            metadata: CommandMetadata::new(description),
        })
    }
}

removal_command!(DeleteObjectsCmd);

/// Delete links by id.
#[derive(Debug)]
pub struct DeleteLinksCmd {
    removed: RemovedObjects,
    metadata: CommandMetadata,
}

impl DeleteLinksCmd {
    pub fn new(model: &ObjectModel, pipeline_id: impl Into<PipelineId>, ids: &[ObjectId]) -> Result<Self, CommandError> {
        let pipeline_id = pipeline_id.into();
        check_targets(model, &pipeline_id, ids, TargetKind::Object(ObjectKind::Link), |kind| {
            kind == ObjectKind::Link
        })?;
        let removed = model.plan_link_removal(pipeline_id.as_str(), ids)?;
        let description = format!("Delete {}", counted(ids.len(), "link"));
        Ok(Self {
            removed,
            metadata: CommandMetadata::new(description),
        })
    }
}

removal_command!(DeleteLinksCmd);

/// Remove every link touching the given nodes or comments.
#[derive(Debug)]
pub struct DisconnectNodesCmd {
    removed: RemovedObjects,
    metadata: CommandMetadata,
}

impl DisconnectNodesCmd {
    pub fn new(model: &ObjectModel, pipeline_id: impl Into<PipelineId>, ids: &[ObjectId]) -> Result<Self, CommandError> {
        let pipeline_id = pipeline_id.into();
        check_targets(model, &pipeline_id, ids, TargetKind::Unknown, |kind| kind != ObjectKind::Link)?;
        let removed = model.plan_disconnect(pipeline_id.as_str(), ids)?;
        let description = format!("Disconnect {}", counted(removed.links.len(), "link"));
        Ok(Self {
            removed,
            metadata: CommandMetadata::new(description),
        })
    }
}

removal_command!(DisconnectNodesCmd);
