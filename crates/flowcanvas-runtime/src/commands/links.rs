#![forbid(unsafe_code)]

use std::any::Any;

use flowcanvas_core::{IdKind, Link, LinkType, Node, ObjectId, ObjectKind, PipelineId};

use super::{CreateNodeCmd, DeleteLinksCmd, check_pipeline, counted};
use crate::object_model::ObjectModel;
use crate::undo::{CommandBatch, CommandError, CommandMetadata, CommandResult, TargetKind, UndoableCmd};

/// Add links. Rejected as a whole if any link breaks a rule.
#[derive(Debug)]
pub struct AddLinksCmd {
    pipeline_id: PipelineId,
    links: Vec<Link>,
    metadata: CommandMetadata,
}

impl AddLinksCmd {
    pub fn new(model: &ObjectModel, pipeline_id: impl Into<PipelineId>, links: Vec<Link>) -> Result<Self, CommandError> {
        let pipeline_id = pipeline_id.into();
        check_pipeline(model, &pipeline_id)?;
        let description = format!("Add {}", counted(links.len(), "link"));
        Ok(Self {
            pipeline_id,
            links,
            metadata: CommandMetadata::new(description),
        })
    }

    #[must_use]
    pub fn links(&self) -> &[Link] {
        &self.links
    }
}

impl UndoableCmd<ObjectModel> for AddLinksCmd {
    fn execute(&mut self, model: &mut ObjectModel) -> CommandResult {
        model.add_links(self.pipeline_id.as_str(), self.links.clone())?;
        Ok(())
    }

    fn undo(&mut self, model: &mut ObjectModel) -> CommandResult {
        let ids: Vec<ObjectId> = self.links.iter().map(|l| l.id.clone()).collect();
        model.delete_links(self.pipeline_id.as_str(), &ids)?;
        Ok(())
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn is_noop(&self) -> bool {
        self.links.is_empty()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn debug_name(&self) -> &'static str {
        "AddLinksCmd"
    }
}

/// Drop a node onto a data link: the link is replaced by two links running
/// through the new node.
///
/// Built from a delete-links, a create-node, and an add-links step that run
/// as one batch and one history entry.
pub struct CreateNodeOnLinkCmd {
    batch: CommandBatch<ObjectModel>,
    node_id: ObjectId,
}

impl std::fmt::Debug for CreateNodeOnLinkCmd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateNodeOnLinkCmd")
            .field("batch", &self.batch)
            .field("node_id", &self.node_id)
            .finish()
    }
}

impl CreateNodeOnLinkCmd {
    /// Link ids for the two new links are allocated here.
    pub fn new(
        model: &mut ObjectModel,
        pipeline_id: impl Into<PipelineId>,
        link_id: &str,
        node: Node,
    ) -> Result<Self, CommandError> {
        let pipeline_id = pipeline_id.into();
        check_pipeline(model, &pipeline_id)?;
        let link = model
            .link(pipeline_id.as_str(), link_id)
            .filter(|l| l.link_type == LinkType::NodeLink)
            .ok_or_else(|| {
                CommandError::object_missing(TargetKind::Object(ObjectKind::Link), &link_id.into(), &pipeline_id)
            })?;

        let into_node = Link::node_link(
            model.allocate_id(IdKind::Link),
            link.src_id.clone(),
            link.src_port_id.as_deref(),
            node.id.clone(),
            None,
        );
        let out_of_node = Link::node_link(
            model.allocate_id(IdKind::Link),
            node.id.clone(),
            None,
            link.trg_id.clone(),
            link.trg_port_id.as_deref(),
        );

        let node_id = node.id.clone();
        let mut batch = CommandBatch::new("Create node on link");
        batch.push(Box::new(DeleteLinksCmd::new(
            model,
            pipeline_id.clone(),
            std::slice::from_ref(&link.id),
        )?));
        batch.push(Box::new(CreateNodeCmd::new(model, pipeline_id.clone(), node)?));
        batch.push(Box::new(AddLinksCmd::new(model, pipeline_id, vec![into_node, out_of_node])?));
        Ok(Self { batch, node_id })
    }

    #[must_use]
    pub fn node_id(&self) -> &ObjectId {
        &self.node_id
    }
}

impl UndoableCmd<ObjectModel> for CreateNodeOnLinkCmd {
    fn execute(&mut self, model: &mut ObjectModel) -> CommandResult {
        let batch = &mut self.batch;
        model.batch(|m| batch.execute(m))
    }

    fn undo(&mut self, model: &mut ObjectModel) -> CommandResult {
        let batch = &mut self.batch;
        model.batch(|m| batch.undo(m))
    }

    fn redo(&mut self, model: &mut ObjectModel) -> CommandResult {
        let batch = &mut self.batch;
        model.batch(|m| batch.redo(m))
    }

    fn metadata(&self) -> &CommandMetadata {
        self.batch.metadata()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn debug_name(&self) -> &'static str {
        "CreateNodeOnLinkCmd"
    }
}

#[cfg(test)]
mod tests {
    use flowcanvas_core::{Cardinality, ConstraintViolation, ModelError, Port};

    use super::*;
    use crate::commands::fixtures;
    use crate::undo::CommandStack;

    #[test]
    fn add_links_undo_removes_exactly_those() {
        let mut model = fixtures::model();
        let mut stack = CommandStack::default();
        let before = model.pipeline_flow();
        let cmd = AddLinksCmd::new(&model, "p1", vec![Link::node_link("l9", "b", None, "c", None)]).unwrap();
        stack.execute(Box::new(cmd), &mut model).unwrap();
        assert_eq!(model.links("p1").len(), 3);
        stack.undo(&mut model).unwrap().unwrap();
        assert_eq!(model.pipeline_flow(), before);
    }

    #[test]
    fn cardinality_rejection_keeps_one_link() {
        let mut model = fixtures::model();
        let mut stack = CommandStack::default();
        model
            .add_node("p1", Node::new("d").with_outputs(vec![Port::new("out", Cardinality::UNBOUNDED)]))
            .unwrap();
        let cmd = AddLinksCmd::new(&model, "p1", vec![Link::node_link("l9", "d", None, "b", None)]).unwrap();
        let err = stack.execute(Box::new(cmd), &mut model).unwrap_err();
        assert!(matches!(
            err,
            CommandError::Model(ModelError::Constraint(ConstraintViolation::CardinalityExceeded { .. }))
        ));
        assert_eq!(model.links_containing_id("p1", "b").len(), 1);
        assert!(!stack.can_undo());
    }

    #[test]
    fn node_on_link_splits_and_restores() {
        let mut model = fixtures::model();
        let mut stack = CommandStack::default();
        let before = model.pipeline_flow();
        let cmd = CreateNodeOnLinkCmd::new(&mut model, "p1", "l1", Node::new("mid")).unwrap();
        stack.execute(Box::new(cmd), &mut model).unwrap();

        assert!(model.link("p1", "l1").is_none());
        let through: Vec<(String, String)> = model
            .links_containing_id("p1", "mid")
            .into_iter()
            .map(|l| (l.src_id.to_string(), l.trg_id.to_string()))
            .collect();
        assert_eq!(
            through,
            vec![("a".to_string(), "mid".to_string()), ("mid".to_string(), "b".to_string())]
        );
        assert_eq!(stack.undo_depth(), 1);

        stack.undo(&mut model).unwrap().unwrap();
        assert_eq!(model.pipeline_flow(), before);
        stack.redo(&mut model).unwrap().unwrap();
        assert_eq!(model.links_containing_id("p1", "mid").len(), 2);
    }

    #[test]
    fn node_on_comment_link_is_rejected() {
        let mut model = fixtures::model();
        assert!(CreateNodeOnLinkCmd::new(&mut model, "p1", "l2", Node::new("mid")).is_err());
    }
}
