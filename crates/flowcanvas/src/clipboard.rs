#![forbid(unsafe_code)]

//! Cut, copy, and paste of the current selection.
//!
//! Copied text is an [`ObjectBundle`] as JSON: the selected nodes and
//! comments, the links running between them, and the pipelines nested under
//! any copied supernode. Pasting clones the bundle under fresh ids, shifted
//! by the configured paste offset, and selects the copies.

use flowcanvas_core::ObjectId;
use flowcanvas_runtime::ObjectBundle;
use flowcanvas_runtime::commands::CloneMultipleObjectsCmd;
use tracing::debug;

use crate::controller::{CanvasController, rejected};
use crate::error::Result;

impl CanvasController {
    /// Serialize the selection. `Ok(None)` when no node or comment is
    /// selected.
    pub fn copy(&self) -> Result<Option<String>> {
        let Some((pipeline_id, ids)) = self.selected() else {
            return Ok(None);
        };
        let bundle = self
            .model
            .bundle_objects(pipeline_id.as_str(), &ids)
            .map_err(|err| rejected("copy", err))?;
        if bundle.is_empty() {
            return Ok(None);
        }
        debug!(
            nodes = bundle.nodes.len(),
            comments = bundle.comments.len(),
            links = bundle.links.len(),
            pipelines = bundle.pipelines.len(),
            "copied selection"
        );
        Ok(Some(serde_json::to_string(&bundle)?))
    }

    /// Copy the selection, then delete it as one undoable edit.
    pub fn cut(&mut self) -> Result<Option<String>> {
        let Some(text) = self.copy()? else {
            return Ok(None);
        };
        self.delete_selected()?;
        Ok(Some(text))
    }

    /// Paste copied text into a pipeline and select what was pasted.
    ///
    /// Returns the ids of the pasted nodes and comments.
    pub fn paste(&mut self, pipeline_id: &str, text: &str) -> Result<Vec<ObjectId>> {
        let bundle: ObjectBundle = serde_json::from_str(text)?;
        if bundle.is_empty() {
            return Ok(Vec::new());
        }
        let offset = self.config().clipboard.paste_offset;
        let cmd = CloneMultipleObjectsCmd::new(&mut self.model, pipeline_id, &bundle, offset, offset)
            .map_err(|err| rejected("paste", err))?;
        let pasted = cmd.top_level_ids();
        self.execute(Box::new(cmd))?;
        self.model.set_selections(pipeline_id, pasted.clone())?;
        Ok(pasted)
    }
}
