#![forbid(unsafe_code)]

//! The editing surface the view layer talks to.
//!
//! [`CanvasController`] owns one [`ObjectModel`] and its history. Every verb
//! that changes the document builds a command and runs it through the
//! [`CommandStack`]; selection changes and queries go to the model directly.
//!
//! # Failure Modes
//!
//! - **Rejected edit** (cardinality, cycle, missing target): logged at
//!   `warn`, returned as [`Error`], and the document and history are left
//!   untouched.
//! - **No-op edit** (zero move, unchanged comment): reported as
//!   [`Executed::Skipped`] and not stored.

use flowcanvas_core::{
    Comment, IdGenerator, IdKind, Link, Node, ObjectId, Pipeline, PipelineFlow, PipelineId,
    SubflowRef, document,
};
use flowcanvas_runtime::commands::{
    AddLinksCmd, ArrangeLayoutCmd, CreateCommentCmd, CreateNodeCmd, CreateNodeOnLinkCmd,
    DeleteLinksCmd, DeleteObjectsCmd, DisconnectNodesCmd, EditCommentCmd, MoveObjectsCmd,
    SetNodeLabelCmd,
};
use flowcanvas_runtime::{
    CommandError, CommandStack, CommentEdit, CommentTemplate, EditorConfig, Executed,
    NodeTemplate, ObjectModel, Selection, SelectionCallback, StackSnapshot, UndoableCmd,
};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// One editor instance: a document, its selection, and its undo history.
#[derive(Debug)]
pub struct CanvasController {
    pub(crate) model: ObjectModel,
    history: CommandStack<ObjectModel>,
}

impl Default for CanvasController {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl CanvasController {
    /// An editor on an empty document.
    #[must_use]
    pub fn new(config: EditorConfig) -> Self {
        let history = CommandStack::new(config.history.clone());
        Self {
            model: ObjectModel::empty(config),
            history,
        }
    }

    /// An editor on an empty document whose ids, including the document's
    /// own, come from `ids`.
    #[must_use]
    pub fn with_ids(config: EditorConfig, ids: Box<dyn IdGenerator>) -> Self {
        let history = CommandStack::new(config.history.clone());
        Self {
            model: ObjectModel::empty_with_ids(config, ids),
            history,
        }
    }

    /// An editor on an existing document, validated first.
    pub fn with_flow(flow: PipelineFlow, config: EditorConfig) -> Result<Self> {
        flow.validate()?;
        let history = CommandStack::new(config.history.clone());
        Ok(Self {
            model: ObjectModel::with_config(flow, config),
            history,
        })
    }

    /// Replace the id source used for new objects.
    #[must_use]
    pub fn with_id_generator(self, ids: Box<dyn IdGenerator>) -> Self {
        Self {
            model: self.model.with_id_generator(ids),
            history: self.history,
        }
    }

    /// Read access to the document and selection.
    #[must_use]
    pub fn model(&self) -> &ObjectModel {
        &self.model
    }

    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        self.model.config()
    }

    // -----------------------------------------------------------------------
    // Running commands
    // -----------------------------------------------------------------------

    /// Run a command through the history. Rejections are logged and leave
    /// both the document and the history as they were.
    pub fn execute(&mut self, cmd: Box<dyn UndoableCmd<ObjectModel>>) -> Result<Executed> {
        let description = cmd.description().to_string();
        self.history
            .execute(cmd, &mut self.model)
            .map_err(|err| rejected(&description, err))
    }

    fn submit<C>(&mut self, built: std::result::Result<C, CommandError>) -> Result<Executed>
    where
        C: UndoableCmd<ObjectModel> + 'static,
    {
        match built {
            Ok(cmd) => self.execute(Box::new(cmd)),
            Err(err) => Err(rejected("build command", err)),
        }
    }

    /// Undo the most recent edit. `Ok(None)` when there is nothing to undo.
    pub fn undo(&mut self) -> Result<Option<String>> {
        match self.history.undo(&mut self.model) {
            None => Ok(None),
            Some(Ok(description)) => Ok(Some(description)),
            Some(Err(err)) => Err(rejected("undo", err)),
        }
    }

    /// Redo the most recently undone edit. `Ok(None)` when there is nothing
    /// to redo.
    pub fn redo(&mut self) -> Result<Option<String>> {
        match self.history.redo(&mut self.model) {
            None => Ok(None),
            Some(Ok(description)) => Ok(Some(description)),
            Some(Err(err)) => Err(rejected("redo", err)),
        }
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    #[must_use]
    pub fn undo_description(&self) -> Option<&str> {
        self.history.next_undo_description()
    }

    #[must_use]
    pub fn redo_description(&self) -> Option<&str> {
        self.history.next_redo_description()
    }

    /// Both history stacks as descriptions, bottom to top.
    #[must_use]
    pub fn history(&self) -> StackSnapshot {
        self.history.snapshot()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    // -----------------------------------------------------------------------
    // Nodes and comments
    // -----------------------------------------------------------------------

    /// Create a node from a template and return it as inserted.
    pub fn create_node(&mut self, pipeline_id: &str, template: NodeTemplate) -> Result<Node> {
        let node = self
            .model
            .create_node(pipeline_id, template)
            .map_err(|err| rejected("create node", err))?;
        self.submit(CreateNodeCmd::new(&self.model, pipeline_id, node.clone()))?;
        Ok(node)
    }

    /// Create a supernode together with a new, empty pipeline for it.
    pub fn create_supernode(&mut self, pipeline_id: &str, mut template: NodeTemplate) -> Result<Node> {
        let sub_pipeline = Pipeline::new(self.model.allocate_pipeline_id());
        template.subflow_ref = Some(SubflowRef::local(sub_pipeline.id.clone()));
        let node = self
            .model
            .create_node(pipeline_id, template)
            .map_err(|err| rejected("create supernode", err))?;
        self.submit(CreateNodeCmd::supernode(
            &self.model,
            pipeline_id,
            node.clone(),
            vec![sub_pipeline],
        ))?;
        Ok(node)
    }

    /// Create a comment, linked to each node in `attach_to`.
    pub fn create_comment(
        &mut self,
        pipeline_id: &str,
        template: CommentTemplate,
        attach_to: &[ObjectId],
    ) -> Result<Comment> {
        let comment = self
            .model
            .create_comment(pipeline_id, template)
            .map_err(|err| rejected("create comment", err))?;
        let links = attach_to
            .iter()
            .map(|node_id| Link::comment_link(self.model.allocate_id(IdKind::Link), comment.id.clone(), node_id.clone()))
            .collect();
        self.submit(CreateCommentCmd::new(&self.model, pipeline_id, comment.clone(), links))?;
        Ok(comment)
    }

    /// Insert a new node in the middle of a data link.
    pub fn create_node_on_link(&mut self, pipeline_id: &str, link_id: &str, template: NodeTemplate) -> Result<Node> {
        let node = self
            .model
            .create_node(pipeline_id, template)
            .map_err(|err| rejected("create node on link", err))?;
        let built = CreateNodeOnLinkCmd::new(&mut self.model, pipeline_id, link_id, node.clone());
        self.submit(built)?;
        Ok(node)
    }

    pub fn edit_comment(&mut self, pipeline_id: &str, edit: CommentEdit) -> Result<Executed> {
        self.submit(EditCommentCmd::new(&self.model, pipeline_id, edit))
    }

    pub fn set_node_label(&mut self, pipeline_id: &str, id: &str, label: impl Into<String>) -> Result<Executed> {
        self.submit(SetNodeLabelCmd::new(&self.model, pipeline_id, id, label))
    }

    /// Move objects by an offset.
    pub fn move_objects(
        &mut self,
        pipeline_id: &str,
        ids: Vec<ObjectId>,
        offset_x: f64,
        offset_y: f64,
    ) -> Result<Executed> {
        self.submit(MoveObjectsCmd::new(&self.model, pipeline_id, ids, offset_x, offset_y))
    }

    /// Move the current selection by an offset.
    pub fn move_selected(&mut self, offset_x: f64, offset_y: f64) -> Result<Executed> {
        let Some((pipeline_id, ids)) = self.selected() else {
            return Ok(Executed::Skipped);
        };
        self.move_objects(pipeline_id.as_str(), ids, offset_x, offset_y)
    }

    /// Lay a pipeline out in layers along its data links.
    pub fn arrange_layout(&mut self, pipeline_id: &str) -> Result<Executed> {
        self.submit(ArrangeLayoutCmd::new(&self.model, pipeline_id))
    }

    // -----------------------------------------------------------------------
    // Deletion
    // -----------------------------------------------------------------------

    /// Delete objects of any kind, with their links and any pipelines only
    /// they reference.
    pub fn delete_objects(&mut self, pipeline_id: &str, ids: &[ObjectId]) -> Result<Executed> {
        self.submit(DeleteObjectsCmd::new(&self.model, pipeline_id, ids))
    }

    /// Delete everything selected.
    pub fn delete_selected(&mut self) -> Result<Executed> {
        let Some((pipeline_id, ids)) = self.selected() else {
            return Ok(Executed::Skipped);
        };
        self.delete_objects(pipeline_id.as_str(), &ids)
    }

    pub fn delete_links(&mut self, pipeline_id: &str, ids: &[ObjectId]) -> Result<Executed> {
        self.submit(DeleteLinksCmd::new(&self.model, pipeline_id, ids))
    }

    /// Remove every link touching the given nodes or comments.
    pub fn disconnect_nodes(&mut self, pipeline_id: &str, ids: &[ObjectId]) -> Result<Executed> {
        self.submit(DisconnectNodesCmd::new(&self.model, pipeline_id, ids))
    }

    // -----------------------------------------------------------------------
    // Links
    // -----------------------------------------------------------------------

    /// Connect two nodes with a data link. Port ids may be left out to use
    /// each node's first port.
    pub fn link_nodes(
        &mut self,
        pipeline_id: &str,
        src_id: &str,
        src_port_id: Option<&str>,
        trg_id: &str,
        trg_port_id: Option<&str>,
    ) -> Result<Link> {
        let link = Link::node_link(self.model.allocate_id(IdKind::Link), src_id, src_port_id, trg_id, trg_port_id);
        self.add_links(pipeline_id, vec![link.clone()])?;
        Ok(link)
    }

    /// Attach a comment to a node.
    pub fn link_comment(&mut self, pipeline_id: &str, comment_id: &str, node_id: &str) -> Result<Link> {
        let link = Link::comment_link(self.model.allocate_id(IdKind::Link), comment_id, node_id);
        self.add_links(pipeline_id, vec![link.clone()])?;
        Ok(link)
    }

    /// Add prepared links. Rejected as a whole if any one breaks a rule.
    pub fn add_links(&mut self, pipeline_id: &str, links: Vec<Link>) -> Result<Executed> {
        self.submit(AddLinksCmd::new(&self.model, pipeline_id, links))
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    pub fn set_selection_callback(&mut self, callback: SelectionCallback) {
        self.model.set_selection_callback(callback);
    }

    pub fn set_selections(&mut self, pipeline_id: &str, ids: Vec<ObjectId>) -> Result<()> {
        Ok(self.model.set_selections(pipeline_id, ids)?)
    }

    pub fn toggle_selection(&mut self, pipeline_id: &str, id: &str, clear: bool) -> Result<()> {
        Ok(self.model.toggle_selection(pipeline_id, id, clear)?)
    }

    pub fn select_sub_graph(&mut self, pipeline_id: &str, id: &str) -> Result<()> {
        Ok(self.model.select_sub_graph(pipeline_id, id)?)
    }

    pub fn select_all(&mut self, pipeline_id: &str) -> Result<()> {
        Ok(self.model.select_all(pipeline_id)?)
    }

    pub fn clear_selection(&mut self) {
        self.model.clear_selection();
    }

    #[must_use]
    pub fn selection(&self) -> Selection {
        self.model.selection()
    }

    pub(crate) fn selected(&self) -> Option<(PipelineId, Vec<ObjectId>)> {
        let selection = self.model.selection();
        match selection.pipeline_id {
            Some(pipeline_id) if !selection.ids.is_empty() => Some((pipeline_id, selection.ids)),
            _ => None,
        }
    }

    // -----------------------------------------------------------------------
    // Documents
    // -----------------------------------------------------------------------

    /// Replace the document. The history is cleared since its commands
    /// refer to the old one.
    pub fn set_pipeline_flow(&mut self, flow: PipelineFlow) -> Result<()> {
        self.model.set_pipeline_flow(flow)?;
        self.history.clear();
        debug!(flow = %self.model.flow().id, "document replaced");
        Ok(())
    }

    #[must_use]
    pub fn pipeline_flow(&self) -> PipelineFlow {
        self.model.pipeline_flow()
    }

    /// Load a document from JSON. See [`set_pipeline_flow`](Self::set_pipeline_flow).
    pub fn load_json(&mut self, json: &str) -> Result<()> {
        let flow = document::from_json(json)?;
        self.set_pipeline_flow(flow)
    }

    pub fn save_json(&self) -> Result<String> {
        Ok(document::to_json(self.model.flow())?)
    }

    pub fn save_json_pretty(&self) -> Result<String> {
        Ok(document::to_json_pretty(self.model.flow())?)
    }
}

pub(crate) fn rejected(verb: &str, err: impl Into<Error>) -> Error {
    let err = err.into();
    warn!(verb, error = %err, "edit rejected");
    err
}
