#![forbid(unsafe_code)]

//! The object model: sole owner of the pipeline flow.
//!
//! Every read goes through a getter that hands out owned copies or shared
//! borrows; every write goes through a mutation method that checks its
//! preconditions, then dispatches one [`Action`] to the pure reducers in
//! `flowcanvas-core`. A rejected mutation leaves the flow untouched.
//!
//! After each dispatch the selection is pruned of ids that no longer exist
//! and the selection observer is notified, unless a [`batch`] is open, in
//! which case a single notification is sent when the outermost batch ends.
//!
//! [`batch`]: ObjectModel::batch

mod bundle;
mod layout;
mod links;
mod supernode;

pub use bundle::ObjectBundle;
pub use layout::compute_layout;
pub use supernode::RemovedObjects;

use flowcanvas_core::{
    Action, Comment, IdGenerator, IdKind, Link, ModelError, Node, NodeMessage, NodeType, ObjectId,
    ObjectKind, ObjectPosition, Pipeline, PipelineAction, PipelineFlow, PipelineId, Port, SubflowRef,
    UuidGenerator, Zoom, reduce,
};
use serde_json::Value;
use tracing::trace;

use crate::config::EditorConfig;
use crate::selection::{Selection, SelectionCallback, SelectionRequest, SelectionTracker};

/// What to build when proposing a new node. Unset fields take defaults from
/// [`EditorConfig`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeTemplate {
    pub label: String,
    pub node_type: NodeType,
    pub op: Option<String>,
    pub position: Option<(f64, f64)>,
    pub size: Option<(f64, f64)>,
    pub inputs: Vec<Port>,
    pub outputs: Vec<Port>,
    pub parameters: Option<Value>,
    pub subflow_ref: Option<SubflowRef>,
}

impl NodeTemplate {
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Some((x, y));
        self
    }

    #[must_use]
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    #[must_use]
    pub fn with_ports(mut self, inputs: Vec<Port>, outputs: Vec<Port>) -> Self {
        self.inputs = inputs;
        self.outputs = outputs;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentTemplate {
    pub content: String,
    pub position: Option<(f64, f64)>,
    pub size: Option<(f64, f64)>,
}

impl CommentTemplate {
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Some((x, y));
        self
    }
}

/// New content and size for a comment.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentEdit {
    pub id: ObjectId,
    pub content: String,
    pub width: f64,
    pub height: f64,
}

/// Owner of one pipeline flow, its id source, and its selection.
#[derive(Debug)]
pub struct ObjectModel {
    flow: PipelineFlow,
    ids: Box<dyn IdGenerator>,
    selection: SelectionTracker,
    config: EditorConfig,
    batch_depth: u32,
}

impl Default for ObjectModel {
    fn default() -> Self {
        Self::empty(EditorConfig::default())
    }
}

impl ObjectModel {
    /// Wrap an existing flow. The flow is taken as given; use
    /// [`set_pipeline_flow`](Self::set_pipeline_flow) to validate one.
    #[must_use]
    pub fn new(flow: PipelineFlow) -> Self {
        Self::with_config(flow, EditorConfig::default())
    }

    #[must_use]
    pub fn with_config(flow: PipelineFlow, config: EditorConfig) -> Self {
        Self {
            flow,
            ids: Box::new(UuidGenerator),
            selection: SelectionTracker::new(),
            config,
            batch_depth: 0,
        }
    }

    /// A flow holding one empty primary pipeline with generated ids.
    #[must_use]
    pub fn empty(config: EditorConfig) -> Self {
        Self::empty_with_ids(config, Box::new(UuidGenerator))
    }

    #[must_use]
    pub fn empty_with_ids(config: EditorConfig, mut ids: Box<dyn IdGenerator>) -> Self {
        let flow = PipelineFlow::new(ids.next_id(IdKind::Flow), ids.pipeline_id());
        Self::with_config(flow, config).with_id_generator(ids)
    }

    /// Replace the id source.
    #[must_use]
    pub fn with_id_generator(mut self, ids: Box<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Dispatch and batching
    // -----------------------------------------------------------------------

    fn dispatch(&mut self, action: Action) {
        trace!(action = action.name(), pipeline = ?action.pipeline_id(), "dispatch");
        self.flow = reduce(&self.flow, &action);
        self.selection.prune(&self.flow);
        self.flush();
    }

    fn flush(&mut self) {
        if self.batch_depth == 0 {
            self.selection.notify(&self.flow);
        }
    }

    /// Run `f` with selection notifications deferred. Nested batches flush
    /// only when the outermost one ends.
    pub fn batch<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.batch_depth += 1;
        let out = f(self);
        self.batch_depth -= 1;
        self.flush();
        out
    }

    /// Like [`batch`](Self::batch), but on `Err` the flow is put back to
    /// what it was before `f` ran.
    pub fn try_batch<T, E>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, E>) -> Result<T, E> {
        let before = self.flow.clone();
        self.batch_depth += 1;
        let out = f(self);
        if out.is_err() {
            self.flow = before;
            self.selection.prune(&self.flow);
        }
        self.batch_depth -= 1;
        self.flush();
        out
    }

    fn require_pipeline(&self, pipeline_id: &str) -> Result<&Pipeline, ModelError> {
        self.flow
            .pipeline(pipeline_id)
            .ok_or_else(|| ModelError::PipelineNotFound(pipeline_id.into()))
    }

    fn require_node(&self, pipeline_id: &str, id: &str) -> Result<&Node, ModelError> {
        self.require_pipeline(pipeline_id)?
            .node(id)
            .ok_or_else(|| not_found(ObjectKind::Node, id, pipeline_id))
    }

    fn require_comment(&self, pipeline_id: &str, id: &str) -> Result<&Comment, ModelError> {
        self.require_pipeline(pipeline_id)?
            .comment(id)
            .ok_or_else(|| not_found(ObjectKind::Comment, id, pipeline_id))
    }

    fn require_unused(&self, pipeline_id: &str, id: &ObjectId) -> Result<(), ModelError> {
        if self.require_pipeline(pipeline_id)?.contains_object(id.as_str()) {
            return Err(ModelError::DuplicateId {
                id: id.to_string(),
                pipeline_id: pipeline_id.into(),
            });
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Borrow the current flow snapshot.
    #[must_use]
    pub fn flow(&self) -> &PipelineFlow {
        &self.flow
    }

    /// A copy of the whole document.
    #[must_use]
    pub fn pipeline_flow(&self) -> PipelineFlow {
        self.flow.clone()
    }

    #[must_use]
    pub fn primary_pipeline_id(&self) -> &PipelineId {
        &self.flow.primary_pipeline_id
    }

    #[must_use]
    pub fn pipeline_ids(&self) -> Vec<PipelineId> {
        self.flow.pipelines.iter().map(|p| p.id.clone()).collect()
    }

    #[must_use]
    pub fn pipeline(&self, pipeline_id: &str) -> Option<Pipeline> {
        self.flow.pipeline(pipeline_id).cloned()
    }

    #[must_use]
    pub fn node(&self, pipeline_id: &str, id: &str) -> Option<Node> {
        self.flow.pipeline(pipeline_id)?.node(id).cloned()
    }

    #[must_use]
    pub fn comment(&self, pipeline_id: &str, id: &str) -> Option<Comment> {
        self.flow.pipeline(pipeline_id)?.comment(id).cloned()
    }

    #[must_use]
    pub fn link(&self, pipeline_id: &str, id: &str) -> Option<Link> {
        self.flow.pipeline(pipeline_id)?.link(id).cloned()
    }

    #[must_use]
    pub fn nodes(&self, pipeline_id: &str) -> Vec<Node> {
        self.flow
            .pipeline(pipeline_id)
            .map(|p| p.nodes.iter().cloned().collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn comments(&self, pipeline_id: &str) -> Vec<Comment> {
        self.flow
            .pipeline(pipeline_id)
            .map(|p| p.comments.iter().cloned().collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn links(&self, pipeline_id: &str) -> Vec<Link> {
        self.flow
            .pipeline(pipeline_id)
            .map(|p| p.links.iter().cloned().collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn object_kind(&self, pipeline_id: &str, id: &str) -> Option<ObjectKind> {
        self.flow.pipeline(pipeline_id)?.object_kind(id)
    }

    /// Current `(x, y)` of every node and comment in `ids`, in the order
    /// given. Ids that are not nodes or comments are skipped.
    #[must_use]
    pub fn object_positions(&self, pipeline_id: &str, ids: &[ObjectId]) -> Vec<ObjectPosition> {
        let Some(pipeline) = self.flow.pipeline(pipeline_id) else {
            return Vec::new();
        };
        ids.iter()
            .filter_map(|id| {
                let (x, y) = match pipeline.node(id.as_str()) {
                    Some(node) => (node.x_pos, node.y_pos),
                    None => {
                        let comment = pipeline.comment(id.as_str())?;
                        (comment.x_pos, comment.y_pos)
                    }
                };
                Some(ObjectPosition { id: id.clone(), x, y })
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Proposals
    // -----------------------------------------------------------------------

    /// Allocate a fresh object id.
    pub fn allocate_id(&mut self, kind: IdKind) -> ObjectId {
        self.ids.object_id(kind)
    }

    pub fn allocate_pipeline_id(&mut self) -> PipelineId {
        self.ids.pipeline_id()
    }

    /// Build a node for `pipeline_id` without adding it.
    ///
    /// Without a position in the template the node goes to the first spot,
    /// stepping diagonally from the layout margin, that no other node
    /// already occupies.
    pub fn create_node(&mut self, pipeline_id: &str, template: NodeTemplate) -> Result<Node, ModelError> {
        let pipeline = self.require_pipeline(pipeline_id)?;
        let (x, y) = template
            .position
            .unwrap_or_else(|| self.free_position(pipeline));
        let (width, height) = template
            .size
            .unwrap_or((self.config.nodes.default_width, self.config.nodes.default_height));

        let mut node = Node::new(self.allocate_id(IdKind::Node))
            .with_label(template.label)
            .with_position(x, y)
            .with_size(width, height)
            .with_inputs(template.inputs)
            .with_outputs(template.outputs);
        node.node_type = template.node_type;
        node.op = template.op;
        node.parameters = template.parameters;
        if let Some(subflow) = template.subflow_ref {
            node = node.into_supernode(subflow);
        }
        Ok(node)
    }

    /// Build a comment for `pipeline_id` without adding it.
    pub fn create_comment(&mut self, pipeline_id: &str, template: CommentTemplate) -> Result<Comment, ModelError> {
        self.require_pipeline(pipeline_id)?;
        let margin = self.config.layout.margin;
        let (x, y) = template.position.unwrap_or((margin, margin));
        let (width, height) = template
            .size
            .unwrap_or((self.config.comments.default_width, self.config.comments.default_height));
        Ok(Comment::new(self.allocate_id(IdKind::Comment), template.content)
            .with_position(x, y)
            .with_size(width, height))
    }

    fn free_position(&self, pipeline: &Pipeline) -> (f64, f64) {
        let step = self.config.nodes.placement_step;
        let mut x = self.config.layout.margin;
        let mut y = x;
        for _ in 0..=pipeline.nodes.len() {
            let taken = pipeline
                .nodes
                .iter()
                .any(|n| (n.x_pos - x).abs() < step && (n.y_pos - y).abs() < step);
            if !taken {
                break;
            }
            x += step;
            y += step;
        }
        (x, y)
    }

    // -----------------------------------------------------------------------
    // Nodes and comments
    // -----------------------------------------------------------------------

    /// Add a node. Supernodes are routed through
    /// [`add_supernode`](Self::add_supernode) with no new pipelines.
    pub fn add_node(&mut self, pipeline_id: &str, node: Node) -> Result<(), ModelError> {
        if node.subflow_pipeline_id().is_some() {
            return self.add_supernode(pipeline_id, node, Vec::new());
        }
        self.require_unused(pipeline_id, &node.id)?;
        self.dispatch(Action::in_pipeline(pipeline_id, PipelineAction::AddNode(node)));
        Ok(())
    }

    /// Remove a node and its links. A supernode takes the pipelines only it
    /// references with it.
    pub fn delete_node(&mut self, pipeline_id: &str, id: &str) -> Result<(), ModelError> {
        let is_supernode = self
            .require_pipeline(pipeline_id)?
            .node(id)
            .map(|node| node.subflow_pipeline_id().is_some());
        match is_supernode {
            Some(true) => {
                self.delete_supernode(pipeline_id, id)?;
            }
            Some(false) => self.dispatch(Action::in_pipeline(pipeline_id, PipelineAction::DeleteNode(id.into()))),
            None => {}
        }
        Ok(())
    }

    pub fn move_objects(
        &mut self,
        pipeline_id: &str,
        ids: &[ObjectId],
        offset_x: f64,
        offset_y: f64,
    ) -> Result<(), ModelError> {
        self.require_pipeline(pipeline_id)?;
        self.dispatch(Action::in_pipeline(
            pipeline_id,
            PipelineAction::MoveObjects {
                ids: ids.to_vec(),
                offset_x,
                offset_y,
            },
        ));
        Ok(())
    }

    pub fn set_object_positions(&mut self, pipeline_id: &str, positions: Vec<ObjectPosition>) -> Result<(), ModelError> {
        self.require_pipeline(pipeline_id)?;
        self.dispatch(Action::in_pipeline(pipeline_id, PipelineAction::SetObjectPositions(positions)));
        Ok(())
    }

    pub fn add_comment(&mut self, pipeline_id: &str, comment: Comment) -> Result<(), ModelError> {
        self.require_unused(pipeline_id, &comment.id)?;
        self.dispatch(Action::in_pipeline(pipeline_id, PipelineAction::AddComment(comment)));
        Ok(())
    }

    pub fn delete_comment(&mut self, pipeline_id: &str, id: &str) -> Result<(), ModelError> {
        self.require_pipeline(pipeline_id)?;
        self.dispatch(Action::in_pipeline(pipeline_id, PipelineAction::DeleteComment(id.into())));
        Ok(())
    }

    pub fn edit_comment(&mut self, pipeline_id: &str, edit: CommentEdit) -> Result<(), ModelError> {
        self.require_comment(pipeline_id, edit.id.as_str())?;
        self.dispatch(Action::in_pipeline(
            pipeline_id,
            PipelineAction::EditComment {
                id: edit.id,
                content: edit.content,
                width: edit.width,
                height: edit.height,
            },
        ));
        Ok(())
    }

    pub fn set_node_label(&mut self, pipeline_id: &str, id: &str, label: impl Into<String>) -> Result<(), ModelError> {
        self.require_node(pipeline_id, id)?;
        self.dispatch(Action::in_pipeline(
            pipeline_id,
            PipelineAction::SetNodeLabel {
                id: id.into(),
                label: label.into(),
            },
        ));
        Ok(())
    }

    pub fn set_node_parameters(
        &mut self,
        pipeline_id: &str,
        id: &str,
        parameters: Option<Value>,
    ) -> Result<(), ModelError> {
        self.require_node(pipeline_id, id)?;
        self.dispatch(Action::in_pipeline(
            pipeline_id,
            PipelineAction::SetNodeParameters {
                id: id.into(),
                parameters,
            },
        ));
        Ok(())
    }

    /// Attach a message, replacing any earlier one for the same control.
    pub fn set_node_message(&mut self, pipeline_id: &str, id: &str, message: NodeMessage) -> Result<(), ModelError> {
        self.require_node(pipeline_id, id)?;
        self.dispatch(Action::in_pipeline(
            pipeline_id,
            PipelineAction::SetNodeMessage { id: id.into(), message },
        ));
        Ok(())
    }

    pub fn set_node_messages(
        &mut self,
        pipeline_id: &str,
        id: &str,
        messages: Vec<NodeMessage>,
    ) -> Result<(), ModelError> {
        self.require_node(pipeline_id, id)?;
        self.dispatch(Action::in_pipeline(
            pipeline_id,
            PipelineAction::SetNodeMessages { id: id.into(), messages },
        ));
        Ok(())
    }

    pub fn set_zoom(&mut self, pipeline_id: &str, zoom: Option<Zoom>) -> Result<(), ModelError> {
        self.require_pipeline(pipeline_id)?;
        self.dispatch(Action::in_pipeline(pipeline_id, PipelineAction::SetZoom(zoom)));
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Whole document
    // -----------------------------------------------------------------------

    /// Swap in a new document after validating it.
    pub fn set_pipeline_flow(&mut self, flow: PipelineFlow) -> Result<(), ModelError> {
        flow.validate()?;
        self.dispatch(Action::ReplaceFlow(flow));
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    /// Register the selection observer.
    pub fn set_selection_callback(&mut self, callback: SelectionCallback) {
        self.selection.set_callback(callback);
    }

    pub fn clear_selection_callback(&mut self) {
        self.selection.clear_callback();
    }

    fn select(&mut self, request: SelectionRequest) {
        self.selection.apply(request, &self.flow);
        self.flush();
    }

    pub fn set_selections(&mut self, pipeline_id: &str, ids: Vec<ObjectId>) -> Result<(), ModelError> {
        self.require_pipeline(pipeline_id)?;
        self.select(SelectionRequest::Set {
            pipeline_id: pipeline_id.into(),
            ids,
        });
        Ok(())
    }

    pub fn toggle_selection(&mut self, pipeline_id: &str, id: &str, clear: bool) -> Result<(), ModelError> {
        self.require_pipeline(pipeline_id)?;
        self.select(SelectionRequest::Toggle {
            pipeline_id: pipeline_id.into(),
            id: id.into(),
            clear,
        });
        Ok(())
    }

    pub fn select_sub_graph(&mut self, pipeline_id: &str, id: &str) -> Result<(), ModelError> {
        self.require_pipeline(pipeline_id)?;
        self.select(SelectionRequest::SubGraph {
            pipeline_id: pipeline_id.into(),
            id: id.into(),
        });
        Ok(())
    }

    pub fn select_all(&mut self, pipeline_id: &str) -> Result<(), ModelError> {
        self.require_pipeline(pipeline_id)?;
        self.select(SelectionRequest::SelectAll {
            pipeline_id: pipeline_id.into(),
        });
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.select(SelectionRequest::Clear);
    }

    #[must_use]
    pub fn selection(&self) -> Selection {
        self.selection.selection().clone()
    }

    #[must_use]
    pub fn selected_object_ids(&self) -> Vec<ObjectId> {
        self.selection.selection().ids.clone()
    }

    #[must_use]
    pub fn selection_pipeline_id(&self) -> Option<PipelineId> {
        self.selection.selection().pipeline_id.clone()
    }

    #[must_use]
    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.selection().contains(id)
    }

    #[must_use]
    pub fn selected_nodes(&self) -> Vec<Node> {
        self.with_selected(|p, id| p.node(id).cloned())
    }

    #[must_use]
    pub fn selected_comments(&self) -> Vec<Comment> {
        self.with_selected(|p, id| p.comment(id).cloned())
    }

    #[must_use]
    pub fn selected_links(&self) -> Vec<Link> {
        self.with_selected(|p, id| p.link(id).cloned())
    }

    fn with_selected<T>(&self, lookup: impl Fn(&Pipeline, &str) -> Option<T>) -> Vec<T> {
        let selection = self.selection.selection();
        let Some(pipeline) = selection
            .pipeline_id
            .as_ref()
            .and_then(|id| self.flow.pipeline(id.as_str()))
        else {
            return Vec::new();
        };
        selection
            .ids
            .iter()
            .filter_map(|id| lookup(pipeline, id.as_str()))
            .collect()
    }
}

fn not_found(kind: ObjectKind, id: &str, pipeline_id: &str) -> ModelError {
    ModelError::ObjectNotFound {
        kind,
        id: id.into(),
        pipeline_id: pipeline_id.into(),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use flowcanvas_core::{MessageType, SequentialIdGenerator};

    use crate::selection::SelectionChangeEvent;

    pub(crate) fn model() -> ObjectModel {
        ObjectModel::empty_with_ids(EditorConfig::default(), Box::new(SequentialIdGenerator::new()))
    }

    fn primary(model: &ObjectModel) -> String {
        model.primary_pipeline_id().to_string()
    }

    #[test]
    fn empty_model_has_one_pipeline() {
        let model = model();
        assert_eq!(model.primary_pipeline_id(), &PipelineId::new("pipeline-2"));
        assert_eq!(model.pipeline_ids().len(), 1);
        assert_eq!(model.flow().id, "flow-1");
    }

    #[test]
    fn create_node_proposes_without_committing() {
        let mut model = model();
        let pid = primary(&model);
        let node = model.create_node(&pid, NodeTemplate::new("Read")).unwrap();
        assert_eq!(node.id, ObjectId::new("node-3"));
        assert_eq!((node.width, node.height), (70.0, 75.0));
        assert_eq!((node.x_pos, node.y_pos), (50.0, 50.0));
        assert!(model.nodes(&pid).is_empty());
    }

    #[test]
    fn default_positions_avoid_existing_nodes() {
        let mut model = model();
        let pid = primary(&model);
        for _ in 0..3 {
            let node = model.create_node(&pid, NodeTemplate::new("n")).unwrap();
            model.add_node(&pid, node).unwrap();
        }
        let xs: Vec<f64> = model.nodes(&pid).iter().map(|n| n.x_pos).collect();
        assert_eq!(xs, vec![50.0, 70.0, 90.0]);
    }

    #[test]
    fn unknown_pipeline_is_reported() {
        let mut model = model();
        let err = model.add_node("nope", Node::new("n1")).unwrap_err();
        assert_eq!(err, ModelError::PipelineNotFound("nope".into()));
        assert!(model.create_node("nope", NodeTemplate::default()).is_err());
        assert!(model.move_objects("nope", &[], 1.0, 1.0).is_err());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut model = model();
        let pid = primary(&model);
        model.add_node(&pid, Node::new("n1")).unwrap();
        assert!(matches!(
            model.add_comment(&pid, Comment::new("n1", "clash")),
            Err(ModelError::DuplicateId { .. })
        ));
        assert_eq!(model.comments(&pid).len(), 0);
    }

    #[test]
    fn getters_return_copies() {
        let mut model = model();
        let pid = primary(&model);
        model.add_node(&pid, Node::new("n1").with_label("before")).unwrap();
        let mut copy = model.node(&pid, "n1").unwrap();
        copy.label = "after".into();
        assert_eq!(model.node(&pid, "n1").unwrap().label, "before");
    }

    #[test]
    fn node_property_edits() {
        let mut model = model();
        let pid = primary(&model);
        model.add_node(&pid, Node::new("n1")).unwrap();
        model.set_node_label(&pid, "n1", "Sort").unwrap();
        model
            .set_node_parameters(&pid, "n1", Some(serde_json::json!({"key": "age"})))
            .unwrap();
        model
            .set_node_message(&pid, "n1", NodeMessage::new("key", MessageType::Error, "required"))
            .unwrap();
        model
            .set_node_message(&pid, "n1", NodeMessage::new("key", MessageType::Warning, "odd"))
            .unwrap();
        let node = model.node(&pid, "n1").unwrap();
        assert_eq!(node.label, "Sort");
        assert_eq!(node.messages.len(), 1);
        assert_eq!(node.messages[0].message_type, MessageType::Warning);
        assert!(matches!(
            model.set_node_label(&pid, "ghost", "x"),
            Err(ModelError::ObjectNotFound { .. })
        ));
    }

    #[test]
    fn failed_try_batch_restores_flow() {
        let mut model = model();
        let pid = primary(&model);
        let before = model.pipeline_flow();
        let result: Result<(), ModelError> = model.try_batch(|m| {
            m.add_node(&pid, Node::new("n1"))?;
            m.add_node(&pid, Node::new("n1"))
        });
        assert!(result.is_err());
        assert_eq!(model.pipeline_flow(), before);
    }

    #[test]
    fn batch_sends_one_notification() {
        let mut model = model();
        let pid = primary(&model);
        model.add_node(&pid, Node::new("n1")).unwrap();
        model.add_node(&pid, Node::new("n2")).unwrap();
        let events: Rc<RefCell<Vec<SelectionChangeEvent>>> = Rc::default();
        let sink = Rc::clone(&events);
        model.set_selection_callback(Box::new(move |event, _| sink.borrow_mut().push(event.clone())));
        model.set_selections(&pid, vec!["n1".into()]).unwrap();

        model.batch(|m| {
            m.delete_node(&pid, "n1").unwrap();
            m.batch(|m| m.set_selections(&pid, vec!["n2".into()]).unwrap());
        });

        let events = events.borrow();
        assert_eq!(events.len(), 2);
        let last = &events[1];
        assert_eq!(last.deselected_nodes.len(), 1);
        assert_eq!(last.deselected_nodes[0].id, ObjectId::new("n1"));
        assert_eq!(last.added_nodes[0].id, ObjectId::new("n2"));
    }

    #[test]
    fn selected_objects_resolve_by_kind() {
        let mut model = model();
        let pid = primary(&model);
        model.add_node(&pid, Node::new("n1")).unwrap();
        model.add_comment(&pid, Comment::new("c1", "note")).unwrap();
        model.select_all(&pid).unwrap();
        assert_eq!(model.selected_nodes().len(), 1);
        assert_eq!(model.selected_comments().len(), 1);
        assert!(model.selected_links().is_empty());
        model.clear_selection();
        assert!(model.selected_object_ids().is_empty());
        assert_eq!(model.selection_pipeline_id(), None);
    }
}
