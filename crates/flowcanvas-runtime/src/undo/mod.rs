#![forbid(unsafe_code)]

//! Undo/Redo command history.
//!
//! This module implements the Command Pattern for reversible editor
//! operations:
//!
//! - **Reversibility**: Every command can be undone and redone
//! - **Exact replay**: `redo()` re-applies decisions captured the first time
//! - **Bounded history**: The oldest entries are evicted past `max_depth`
//! - **Batching**: Multiple commands group into one history entry
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        CommandStack                               │
//! │  ┌──────────────────┐          ┌──────────────────┐             │
//! │  │   Undo Stack     │          │   Redo Stack     │             │
//! │  │  ┌────────────┐  │          │  ┌────────────┐  │             │
//! │  │  │ CommandN   │  │  undo()  │  │ Command1   │  │             │
//! │  │  ├────────────┤  │ ──────►  │  ├────────────┤  │             │
//! │  │  │ Command2   │  │          │  │ Command2   │  │             │
//! │  │  ├────────────┤  │  ◄────── │  ├────────────┤  │             │
//! │  │  │ Command1   │  │  redo()  │  │ CommandN   │  │             │
//! │  │  └────────────┘  │          │  └────────────┘  │             │
//! │  └──────────────────┘          └──────────────────┘             │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```ignore
//! use flowcanvas_runtime::undo::CommandStack;
//! use flowcanvas_runtime::commands::MoveObjectsCmd;
//!
//! let mut stack = CommandStack::default();
//! let cmd = MoveObjectsCmd::new("p1", vec!["node-1".into()], 10.0, 0.0);
//! stack.execute(Box::new(cmd), &mut model)?;
//! stack.undo(&mut model);
//! ```
//!
//! # Design Notes
//!
//! Commands do not hold references into the object model. The model is
//! passed to every `execute`/`undo`/`redo` call and commands keep owned
//! copies of whatever they need to invert themselves.

pub mod command;
pub mod history;

pub use command::{
    CommandBatch, CommandError, CommandMetadata, CommandResult, TargetKind, UndoableCmd,
};
pub use history::{CommandStack, Executed, HistoryConfig, StackSnapshot};
