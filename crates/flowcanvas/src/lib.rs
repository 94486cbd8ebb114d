#![forbid(unsafe_code)]

//! FlowCanvas public facade crate.
//!
//! This crate provides the surface a view layer talks to: a
//! [`CanvasController`] that owns one document, its selection, and its undo
//! history, plus clipboard verbs and a unified [`Error`]. It re-exports the
//! common types from the internal crates and offers a prelude.
//!
//! ```no_run
//! use flowcanvas::prelude::*;
//!
//! let mut editor = CanvasController::default();
//! let pipeline = editor.model().primary_pipeline_id().to_string();
//! let read = editor.create_node(&pipeline, NodeTemplate::new("Read"))?;
//! let write = editor.create_node(&pipeline, NodeTemplate::new("Write"))?;
//! editor.link_nodes(&pipeline, read.id.as_str(), None, write.id.as_str(), None)?;
//! editor.undo()?;
//! # Ok::<(), flowcanvas::Error>(())
//! ```

mod clipboard;
mod controller;
mod error;

pub use controller::CanvasController;
pub use error::{Error, Result};

// --- Core re-exports -------------------------------------------------------

pub use flowcanvas_core::{
    Cardinality, Comment, IdGenerator, Link, LinkType, ModelError, Node, NodeType, ObjectId,
    Pipeline, PipelineFlow, PipelineId, Port, SequentialIdGenerator, SubflowRef, UuidGenerator,
};

// --- Runtime re-exports ----------------------------------------------------

pub use flowcanvas_runtime::{
    CommandError, CommentEdit, CommentTemplate, EditorConfig, Executed, NodeTemplate, ObjectBundle,
    ObjectModel, Selection, SelectionChangeEvent, SelectionQueue, StackSnapshot,
};

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        CanvasController, Comment, CommentEdit, CommentTemplate, EditorConfig, Error, Executed,
        Link, Node, NodeTemplate, ObjectId, PipelineFlow, PipelineId, Result,
        SelectionChangeEvent, SelectionQueue,
    };

    pub use crate::{core, runtime};
}

pub use flowcanvas_core as core;
pub use flowcanvas_runtime as runtime;
