#![forbid(unsafe_code)]

use std::any::Any;

use flowcanvas_core::{ObjectId, ObjectPosition, PipelineId};

use super::check_pipeline;
use crate::object_model::ObjectModel;
use crate::undo::{CommandError, CommandMetadata, CommandResult, UndoableCmd};

/// Auto-layout a pipeline. Both the old and the new positions are fixed at
/// construction; undo writes the old ones back wholesale.
#[derive(Debug)]
pub struct ArrangeLayoutCmd {
    pipeline_id: PipelineId,
    before: Vec<ObjectPosition>,
    after: Vec<ObjectPosition>,
    metadata: CommandMetadata,
}

impl ArrangeLayoutCmd {
    pub fn new(model: &ObjectModel, pipeline_id: impl Into<PipelineId>) -> Result<Self, CommandError> {
        let pipeline_id = pipeline_id.into();
        check_pipeline(model, &pipeline_id)?;
        let after = model.plan_layout(pipeline_id.as_str())?;
        let ids: Vec<ObjectId> = after.iter().map(|p| p.id.clone()).collect();
        let before = model.object_positions(pipeline_id.as_str(), &ids);
        Ok(Self {
            pipeline_id,
            before,
            after,
            metadata: CommandMetadata::new("Arrange layout"),
        })
    }
}

impl UndoableCmd<ObjectModel> for ArrangeLayoutCmd {
    fn execute(&mut self, model: &mut ObjectModel) -> CommandResult {
        model.set_object_positions(self.pipeline_id.as_str(), self.after.clone())?;
        Ok(())
    }

    fn undo(&mut self, model: &mut ObjectModel) -> CommandResult {
        model.set_object_positions(self.pipeline_id.as_str(), self.before.clone())?;
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
        "ArrangeLayoutCmd"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures;
    use crate::undo::{CommandStack, Executed};

    #[test]
    fn arrange_then_undo_restores_positions() {
        let mut model = fixtures::model();
        let mut stack = CommandStack::default();
        let before = model.pipeline_flow();
        let cmd = ArrangeLayoutCmd::new(&model, "p1").unwrap();
        stack.execute(Box::new(cmd), &mut model).unwrap();
        assert_eq!(model.node("p1", "b").unwrap().x_pos, 220.0);

        stack.undo(&mut model).unwrap().unwrap();
        assert_eq!(model.pipeline_flow(), before);

        stack.redo(&mut model).unwrap().unwrap();
        let again = ArrangeLayoutCmd::new(&model, "p1").unwrap();
        assert!(again.is_noop());
        assert_eq!(stack.execute(Box::new(again), &mut model).unwrap(), Executed::Skipped);
    }
}
