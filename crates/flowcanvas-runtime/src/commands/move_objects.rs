#![forbid(unsafe_code)]

use std::any::Any;

use flowcanvas_core::{ObjectId, PipelineId};

use super::{check_targets, counted};
use crate::object_model::ObjectModel;
use crate::undo::{CommandError, CommandMetadata, CommandResult, TargetKind, UndoableCmd};

/// Shift nodes and comments by an offset. Undo applies the negated offset.
#[derive(Debug)]
pub struct MoveObjectsCmd {
    pipeline_id: PipelineId,
    ids: Vec<ObjectId>,
    offset_x: f64,
    offset_y: f64,
    metadata: CommandMetadata,
}

impl MoveObjectsCmd {
    pub fn new(
        model: &ObjectModel,
        pipeline_id: impl Into<PipelineId>,
        ids: Vec<ObjectId>,
        offset_x: f64,
        offset_y: f64,
    ) -> Result<Self, CommandError> {
        let pipeline_id = pipeline_id.into();
        check_targets(model, &pipeline_id, &ids, TargetKind::Unknown, |_| true)?;
        let description = format!("Move {}", counted(ids.len(), "object"));
        Ok(Self {
            pipeline_id,
            ids,
            offset_x,
            offset_y,
            metadata: CommandMetadata::new(description),
        })
    }

    fn shift(&self, model: &mut ObjectModel, sign: f64) -> CommandResult {
        model.move_objects(
            self.pipeline_id.as_str(),
            &self.ids,
            sign * self.offset_x,
            sign * self.offset_y,
        )?;
        Ok(())
    }
}

impl UndoableCmd<ObjectModel> for MoveObjectsCmd {
    fn execute(&mut self, model: &mut ObjectModel) -> CommandResult {
        self.shift(model, 1.0)
    }

    fn undo(&mut self, model: &mut ObjectModel) -> CommandResult {
        self.shift(model, -1.0)
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn is_noop(&self) -> bool {
        self.ids.is_empty() || (self.offset_x == 0.0 && self.offset_y == 0.0)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn debug_name(&self) -> &'static str {
        "MoveObjectsCmd"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures;
    use crate::undo::{CommandStack, Executed};

    #[test]
    fn move_undo_redo() {
        let mut model = fixtures::model();
        let mut stack = CommandStack::default();
        let before = model.pipeline_flow();
        let cmd = MoveObjectsCmd::new(&model, "p1", vec!["a".into(), "c1".into()], 15.0, -5.0).unwrap();
        stack.execute(Box::new(cmd), &mut model).unwrap();
        let node = model.node("p1", "a").unwrap();
        assert_eq!((node.x_pos, node.y_pos), (15.0, -5.0));
        let comment = model.comment("p1", "c1").unwrap();
        assert_eq!((comment.x_pos, comment.y_pos), (15.0, -85.0));

        stack.undo(&mut model).unwrap().unwrap();
        assert_eq!(model.pipeline_flow(), before);
        stack.redo(&mut model).unwrap().unwrap();
        assert!(stack.redo(&mut model).is_none());
        assert_eq!(model.node("p1", "a").unwrap().x_pos, 15.0);
    }

    #[test]
    fn zero_offset_is_a_noop() {
        let mut model = fixtures::model();
        let mut stack = CommandStack::default();
        let cmd = MoveObjectsCmd::new(&model, "p1", vec!["a".into()], 0.0, 0.0).unwrap();
        assert_eq!(stack.execute(Box::new(cmd), &mut model).unwrap(), Executed::Skipped);
    }

    #[test]
    fn unknown_id_is_rejected() {
        let model = fixtures::model();
        assert!(MoveObjectsCmd::new(&model, "p1", vec!["zzz".into()], 1.0, 1.0).is_err());
    }
}
