#![forbid(unsafe_code)]

use std::any::Any;

use flowcanvas_core::{ObjectId, PipelineId};

use super::{check_pipeline, counted, remove_created};
use crate::object_model::{ObjectBundle, ObjectModel};
use crate::undo::{CommandError, CommandMetadata, CommandResult, UndoableCmd};

/// Insert copies of a bundle of objects, as paste and duplicate do.
///
/// Every id of the copy, including those of cloned nested pipelines, is
/// allocated when the command is built, so redo inserts the very same
/// objects.
#[derive(Debug)]
pub struct CloneMultipleObjectsCmd {
    pipeline_id: PipelineId,
    clones: ObjectBundle,
    metadata: CommandMetadata,
}

impl CloneMultipleObjectsCmd {
    pub fn new(
        model: &mut ObjectModel,
        pipeline_id: impl Into<PipelineId>,
        source: &ObjectBundle,
        offset_x: f64,
        offset_y: f64,
    ) -> Result<Self, CommandError> {
        let pipeline_id = pipeline_id.into();
        check_pipeline(model, &pipeline_id)?;
        let clones = model.clone_bundle(source, offset_x, offset_y);
        let description = format!(
            "Paste {}",
            counted(clones.nodes.len() + clones.comments.len(), "object")
        );
        Ok(Self {
            pipeline_id,
            clones,
            metadata: CommandMetadata::new(description),
        })
    }

    /// The objects this command inserts.
    #[must_use]
    pub fn clones(&self) -> &ObjectBundle {
        &self.clones
    }

    /// Ids of the inserted nodes and comments.
    #[must_use]
    pub fn top_level_ids(&self) -> Vec<ObjectId> {
        self.clones
            .nodes
            .iter()
            .map(|n| n.id.clone())
            .chain(self.clones.comments.iter().map(|c| c.id.clone()))
            .collect()
    }
}

impl UndoableCmd<ObjectModel> for CloneMultipleObjectsCmd {
    fn execute(&mut self, model: &mut ObjectModel) -> CommandResult {
        model.add_bundle(self.pipeline_id.as_str(), &self.clones)?;
        Ok(())
    }

    fn undo(&mut self, model: &mut ObjectModel) -> CommandResult {
        remove_created(
            model,
            &self.pipeline_id,
            &self.clones.object_ids(),
            &self.clones.pipelines,
        )
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn is_noop(&self) -> bool {
        self.clones.is_empty()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn debug_name(&self) -> &'static str {
        "CloneMultipleObjectsCmd"
    }
}

#[cfg(test)]
mod tests {
    use flowcanvas_core::{Node, Pipeline, SubflowRef};

    use super::*;
    use crate::commands::fixtures;
    use crate::undo::CommandStack;

    #[test]
    fn paste_twice_then_undo_everything() {
        let mut model = fixtures::model();
        let mut stack = CommandStack::default();
        let before = model.pipeline_flow();
        let bundle = model
            .bundle_objects("p1", &["a".into(), "b".into(), "c1".into()])
            .unwrap();
        assert_eq!(bundle.links.len(), 2);

        for _ in 0..2 {
            let cmd = CloneMultipleObjectsCmd::new(&mut model, "p1", &bundle, 10.0, 10.0).unwrap();
            assert_eq!(cmd.description(), "Paste 3 objects");
            stack.execute(Box::new(cmd), &mut model).unwrap();
        }
        assert_eq!(model.nodes("p1").len(), 7);
        assert_eq!(model.links("p1").len(), 6);

        stack.undo(&mut model).unwrap().unwrap();
        stack.undo(&mut model).unwrap().unwrap();
        assert_eq!(model.pipeline_flow(), before);
    }

    #[test]
    fn redo_reinserts_identical_clones() {
        let mut model = fixtures::model();
        let mut stack = CommandStack::default();
        model.add_pipelines(vec![Pipeline::new("inner")]).unwrap();
        model
            .add_node("p1", Node::new("s").into_supernode(SubflowRef::local("inner".into())))
            .unwrap();
        let bundle = model.bundle_objects("p1", &["s".into()]).unwrap();

        let cmd = CloneMultipleObjectsCmd::new(&mut model, "p1", &bundle, 0.0, 0.0).unwrap();
        let cloned_pipeline = cmd.clones().pipelines[0].id.clone();
        stack.execute(Box::new(cmd), &mut model).unwrap();
        let after = model.pipeline_flow();
        assert!(model.pipeline(cloned_pipeline.as_str()).is_some());

        stack.undo(&mut model).unwrap().unwrap();
        assert!(model.pipeline(cloned_pipeline.as_str()).is_none());
        assert!(model.pipeline("inner").is_some());
        stack.redo(&mut model).unwrap().unwrap();
        assert_eq!(model.pipeline_flow(), after);
    }
}
