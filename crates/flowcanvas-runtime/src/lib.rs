#![forbid(unsafe_code)]

//! FlowCanvas Runtime
//!
//! The stateful half of the editor core: it owns one pipeline flow and
//! makes every edit reversible.
//!
//! # Key Components
//!
//! - [`ObjectModel`] - Sole owner of the flow; validated mutations and copy-returning queries
//! - [`SelectionTracker`] - Single-pipeline selection with delta notifications
//! - [`CommandStack`] - Bounded two-stack undo/redo history
//! - [`commands`] - One undoable command per user-level edit
//! - [`EditorConfig`] - Tunables loaded from TOML or JSON
//!
//! # Role in FlowCanvas
//! `flowcanvas-runtime` sits between the pure data layer
//! (`flowcanvas-core`) and the controller in `flowcanvas`. It turns
//! user-level edits into actions for the core reducers and records how to
//! reverse them.
//!
//! # How it fits in the system
//! Control flows controller → command → [`CommandStack`] → command body →
//! [`ObjectModel`] mutation → core reducer → selection notification. Logs go
//! through `tracing`; no subscriber is installed here.

pub mod commands;
pub mod config;
pub mod object_model;
pub mod selection;
pub mod undo;

pub use config::{ConfigError, EditorConfig, LayoutDirection};
pub use object_model::{
    CommentEdit, CommentTemplate, NodeTemplate, ObjectBundle, ObjectModel, RemovedObjects,
};
pub use selection::{
    Selection, SelectionCallback, SelectionChangeEvent, SelectionQueue, SelectionRequest,
    SelectionTracker,
};
pub use undo::{
    CommandBatch, CommandError, CommandMetadata, CommandResult, CommandStack, Executed,
    HistoryConfig, StackSnapshot, UndoableCmd,
};
