#![forbid(unsafe_code)]

//! Undoable command infrastructure.
//!
//! This module provides the [`UndoableCmd`] trait for reversible edits and
//! [`CommandBatch`] for running several of them as one history entry.
//!
//! Commands are generic over the context they act on. The editor uses
//! [`ObjectModel`](crate::ObjectModel); tests can use anything.
//!
//! # Invariants
//!
//! - `execute()` followed by `undo()` restores prior state exactly
//! - `undo()` followed by `redo()` restores the executed state exactly
//! - `redo()` replays decisions made at construction or first execution; it
//!   never allocates new ids or recomputes positions
//!
//! # Failure Modes
//!
//! - **Stale target**: the object a command was built for is gone
//!   - Mitigation: constructors resolve their targets up front and fail with
//!     [`CommandError::TargetNotFound`]
//! - **State drift**: edits that bypass the stack invalidate undo data
//!   - Mitigation: clear the stack when a new document is loaded

use std::any::Any;
use std::fmt;
use std::time::Instant;

use flowcanvas_core::{ModelError, ObjectId, ObjectKind, PipelineId};
use thiserror::Error;

/// Metadata attached to every command for tracing and UI display.
#[derive(Debug, Clone)]
pub struct CommandMetadata {
    /// Human-readable description for UI (e.g., "Delete 3 objects").
    pub description: String,
    /// When the command was created.
    pub timestamp: Instant,
}

impl CommandMetadata {
    /// Create new metadata with the given description.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            timestamp: Instant::now(),
        }
    }
}

impl Default for CommandMetadata {
    fn default() -> Self {
        Self::new("Unknown")
    }
}

/// Result of command execution or undo.
pub type CommandResult = Result<(), CommandError>;

/// Errors that can occur while building or running a command.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The object a command targets does not exist.
    #[error("{kind} '{id}' not found in pipeline '{pipeline_id}'")]
    TargetNotFound {
        kind: TargetKind,
        id: String,
        pipeline_id: PipelineId,
    },

    /// The object model refused the edit.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Command cannot run in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
}

impl CommandError {
    pub(crate) fn pipeline_missing(pipeline_id: &PipelineId) -> Self {
        Self::TargetNotFound {
            kind: TargetKind::Pipeline,
            id: pipeline_id.to_string(),
            pipeline_id: pipeline_id.clone(),
        }
    }

    pub(crate) fn object_missing(kind: TargetKind, id: &ObjectId, pipeline_id: &PipelineId) -> Self {
        Self::TargetNotFound {
            kind,
            id: id.to_string(),
            pipeline_id: pipeline_id.clone(),
        }
    }
}

/// What a missing command target was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Pipeline,
    Object(ObjectKind),
    /// An id that is not a node, comment, or link.
    Unknown,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pipeline => f.write_str("pipeline"),
            Self::Object(kind) => fmt::Display::fmt(kind, f),
            Self::Unknown => f.write_str("object"),
        }
    }
}

/// A reversible edit that can be undone and redone against `Ctx`.
pub trait UndoableCmd<Ctx> {
    /// Execute the command, applying its effect.
    fn execute(&mut self, ctx: &mut Ctx) -> CommandResult;

    /// Undo the command, reverting its effect.
    fn undo(&mut self, ctx: &mut Ctx) -> CommandResult;

    /// Redo the command after it was undone.
    fn redo(&mut self, ctx: &mut Ctx) -> CommandResult {
        self.execute(ctx)
    }

    /// Get the command metadata.
    fn metadata(&self) -> &CommandMetadata;

    /// Human-readable description for UI display.
    fn description(&self) -> &str {
        &self.metadata().description
    }

    /// Whether executing this command would change nothing.
    ///
    /// No-op commands are never pushed onto a history stack.
    fn is_noop(&self) -> bool {
        false
    }

    /// Downcast to the concrete type.
    fn as_any(&self) -> &dyn Any;

    /// Debug description of the command.
    fn debug_name(&self) -> &'static str {
        "UndoableCmd"
    }
}

impl<Ctx> fmt::Debug for dyn UndoableCmd<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(self.debug_name())
            .field("description", &self.description())
            .finish()
    }
}

/// A batch of commands that execute and undo together.
///
/// Useful for edits made of several steps that should appear as a single
/// undo entry.
pub struct CommandBatch<Ctx> {
    /// Commands in execution order.
    commands: Vec<Box<dyn UndoableCmd<Ctx>>>,
    /// Batch metadata.
    metadata: CommandMetadata,
    /// Number of commands currently applied.
    executed_to: usize,
}

impl<Ctx> fmt::Debug for CommandBatch<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandBatch")
            .field("commands_count", &self.commands.len())
            .field("metadata", &self.metadata)
            .field("executed_to", &self.executed_to)
            .finish()
    }
}

impl<Ctx> CommandBatch<Ctx> {
    /// Create a new command batch.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            commands: Vec::new(),
            metadata: CommandMetadata::new(description),
            executed_to: 0,
        }
    }

    /// Add a command to the batch.
    pub fn push(&mut self, cmd: Box<dyn UndoableCmd<Ctx>>) {
        self.commands.push(cmd);
    }

    /// Number of commands in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if the batch is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    fn run_forward(&mut self, ctx: &mut Ctx, redo: bool) -> CommandResult {
        for i in 0..self.commands.len() {
            let step = if redo {
                self.commands[i].redo(ctx)
            } else {
                self.commands[i].execute(ctx)
            };
            if let Err(e) = step {
                // Roll back what this pass applied.
                for j in (0..i).rev() {
                    let _ = self.commands[j].undo(ctx);
                }
                self.executed_to = 0;
                return Err(e);
            }
            self.executed_to = i + 1;
        }
        Ok(())
    }
}

impl<Ctx: 'static> UndoableCmd<Ctx> for CommandBatch<Ctx> {
    fn execute(&mut self, ctx: &mut Ctx) -> CommandResult {
        self.run_forward(ctx, false)
    }

    fn undo(&mut self, ctx: &mut Ctx) -> CommandResult {
        // Undo in reverse order
        for i in (0..self.executed_to).rev() {
            self.commands[i].undo(ctx)?;
            self.executed_to = i;
        }
        Ok(())
    }

    fn redo(&mut self, ctx: &mut Ctx) -> CommandResult {
        self.run_forward(ctx, true)
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn is_noop(&self) -> bool {
        self.commands.iter().all(|cmd| cmd.is_noop())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn debug_name(&self) -> &'static str {
        "CommandBatch"
    }
}
