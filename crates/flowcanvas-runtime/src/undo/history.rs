#![forbid(unsafe_code)]

//! Bounded undo/redo stack.
//!
//! This module provides the [`CommandStack`] which maintains dual stacks
//! of executed commands with:
//!
//! - **Depth limits**: Oldest commands evicted once `max_depth` is exceeded
//! - **Branch handling**: A new command clears the redo stack
//! - **No-op filtering**: Commands reporting `is_noop()` never take a slot
//!
//! # Invariants
//!
//! 1. `undo_stack.len() <= config.max_depth` (after any operation)
//! 2. Redo stack is cleared whenever a new command is executed, and only then
//! 3. `undo()`/`redo()` on an empty stack do nothing
//! 4. A command whose execute/undo/redo fails stays where it was
//!
//! # Memory Model
//!
//! Commands are stored in `VecDeque` for O(1) eviction from the front.
//!
//! ```text
//! execute(cmd5)
//! ┌───────────────────────────────────────────────┐
//! │ Undo Stack: [cmd1, cmd2, cmd3, cmd4, cmd5]    │
//! │ Redo Stack: []                                 │
//! └───────────────────────────────────────────────┘
//!
//! undo() x2
//! ┌───────────────────────────────────────────────┐
//! │ Undo Stack: [cmd1, cmd2, cmd3]                │
//! │ Redo Stack: [cmd5, cmd4]                       │
//! └───────────────────────────────────────────────┘
//!
//! execute(cmd6)  <-- new branch, clears redo
//! ┌───────────────────────────────────────────────┐
//! │ Undo Stack: [cmd1, cmd2, cmd3, cmd6]          │
//! │ Redo Stack: []                                 │
//! └───────────────────────────────────────────────┘
//! ```

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::command::{CommandError, UndoableCmd};

/// Configuration for the command stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of commands to keep in undo history.
    pub max_depth: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_depth: 100 }
    }
}

impl HistoryConfig {
    /// Create a new configuration with a custom depth.
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Create unlimited configuration (for testing).
    #[must_use]
    pub fn unlimited() -> Self {
        Self {
            max_depth: usize::MAX,
        }
    }
}

/// What happened when a command was handed to [`CommandStack::execute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Executed {
    /// The command ran and is now on top of the undo stack.
    Pushed,
    /// The command reported nothing to do; it was not run or stored.
    Skipped,
}

/// Descriptions of both stacks, bottom to top.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackSnapshot {
    pub undo: Vec<String>,
    /// Bottom is the command undone first, top the one redone next.
    pub redo: Vec<String>,
}

/// Undo/redo history over commands acting on `Ctx`.
///
/// Maintains dual stacks for undo and redo with a configurable depth bound.
pub struct CommandStack<Ctx: 'static> {
    /// Commands available for undo (newest at back).
    undo_stack: VecDeque<Box<dyn UndoableCmd<Ctx>>>,
    /// Commands available for redo (newest at back).
    redo_stack: VecDeque<Box<dyn UndoableCmd<Ctx>>>,
    /// Configuration for limits.
    config: HistoryConfig,
}

impl<Ctx: 'static> fmt::Debug for CommandStack<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandStack")
            .field("undo_depth", &self.undo_stack.len())
            .field("redo_depth", &self.redo_stack.len())
            .field("config", &self.config)
            .finish()
    }
}

impl<Ctx: 'static> Default for CommandStack<Ctx> {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl<Ctx: 'static> CommandStack<Ctx> {
    /// Create a new command stack with the given configuration.
    #[must_use]
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            config,
        }
    }

    // ========================================================================
    // Core Operations
    // ========================================================================

    /// Execute a command and push it onto the undo stack.
    ///
    /// This clears the redo stack (new branch) and enforces the depth limit.
    /// A failing command is dropped and leaves both stacks untouched.
    pub fn execute(&mut self, mut cmd: Box<dyn UndoableCmd<Ctx>>, ctx: &mut Ctx) -> Result<Executed, CommandError> {
        if cmd.is_noop() {
            trace!(description = cmd.description(), "skipping no-op command");
            return Ok(Executed::Skipped);
        }
        cmd.execute(ctx)?;

        // Clear redo stack (new branch)
        self.redo_stack.clear();
        self.undo_stack.push_back(cmd);
        self.enforce_limits();

        debug!(
            description = self.next_undo_description().unwrap_or_default(),
            undo_depth = self.undo_stack.len(),
            redo_depth = self.redo_stack.len(),
            "executed command"
        );
        Ok(Executed::Pushed)
    }

    /// Undo the last command.
    ///
    /// Moves the command from undo stack to redo stack and calls undo().
    ///
    /// # Returns
    ///
    /// - `Ok(description)` if undo succeeded
    /// - `Err(error)` if undo failed (command remains on undo stack)
    /// - `None` if no commands to undo
    pub fn undo(&mut self, ctx: &mut Ctx) -> Option<Result<String, CommandError>> {
        let mut cmd = self.undo_stack.pop_back()?;
        let description = cmd.description().to_string();

        match cmd.undo(ctx) {
            Ok(()) => {
                // Move to redo stack
                self.redo_stack.push_back(cmd);
                debug!(
                    description = %description,
                    undo_depth = self.undo_stack.len(),
                    redo_depth = self.redo_stack.len(),
                    "undid command"
                );
                Some(Ok(description))
            }
            Err(e) => {
                // Put back on undo stack
                self.undo_stack.push_back(cmd);
                Some(Err(e))
            }
        }
    }

    /// Redo the last undone command.
    ///
    /// Moves the command from redo stack to undo stack and calls redo().
    ///
    /// # Returns
    ///
    /// - `Ok(description)` if redo succeeded
    /// - `Err(error)` if redo failed (command remains on redo stack)
    /// - `None` if no commands to redo
    pub fn redo(&mut self, ctx: &mut Ctx) -> Option<Result<String, CommandError>> {
        let mut cmd = self.redo_stack.pop_back()?;
        let description = cmd.description().to_string();

        match cmd.redo(ctx) {
            Ok(()) => {
                // Move to undo stack
                self.undo_stack.push_back(cmd);
                debug!(
                    description = %description,
                    undo_depth = self.undo_stack.len(),
                    redo_depth = self.redo_stack.len(),
                    "redid command"
                );
                Some(Ok(description))
            }
            Err(e) => {
                // Put back on redo stack
                self.redo_stack.push_back(cmd);
                Some(Err(e))
            }
        }
    }

    /// Check if undo is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    // ========================================================================
    // Info
    // ========================================================================

    /// Get the undo stack depth.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get the redo stack depth.
    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Get descriptions for undo commands (most recent first).
    pub fn undo_descriptions(&self, limit: usize) -> Vec<&str> {
        self.undo_stack
            .iter()
            .rev()
            .take(limit)
            .map(|c| c.description())
            .collect()
    }

    /// Get descriptions for redo commands (most recent first).
    pub fn redo_descriptions(&self, limit: usize) -> Vec<&str> {
        self.redo_stack
            .iter()
            .rev()
            .take(limit)
            .map(|c| c.description())
            .collect()
    }

    /// Get the description of the next undo command.
    #[must_use]
    pub fn next_undo_description(&self) -> Option<&str> {
        self.undo_stack.back().map(|c| c.description())
    }

    /// Get the description of the next redo command.
    #[must_use]
    pub fn next_redo_description(&self) -> Option<&str> {
        self.redo_stack.back().map(|c| c.description())
    }

    /// Both stacks as descriptions, bottom to top.
    #[must_use]
    pub fn snapshot(&self) -> StackSnapshot {
        StackSnapshot {
            undo: self.undo_stack.iter().map(|c| c.description().to_string()).collect(),
            redo: self.redo_stack.iter().map(|c| c.description().to_string()).collect(),
        }
    }

    /// The command on top of the undo stack, for inspection.
    #[must_use]
    pub fn peek_undo(&self) -> Option<&dyn UndoableCmd<Ctx>> {
        self.undo_stack.back().map(|c| c.as_ref())
    }

    /// Get the current configuration.
    #[must_use]
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    // ========================================================================
    // Maintenance
    // ========================================================================

    /// Clear all history (both undo and redo).
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Enforce the depth limit by evicting oldest commands.
    fn enforce_limits(&mut self) {
        while self.undo_stack.len() > self.config.max_depth {
            if let Some(cmd) = self.undo_stack.pop_front() {
                trace!(description = cmd.description(), "evicted oldest undo entry");
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::undo::command::tests::PushWord;

    type Log = Vec<&'static str>;

    fn push(stack: &mut CommandStack<Log>, log: &mut Log, word: &'static str) {
        stack.execute(Box::new(PushWord::new(word)), log).unwrap();
    }

    #[test]
    fn test_new_stack() {
        let stack: CommandStack<Log> = CommandStack::default();
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
        assert_eq!(stack.undo_depth(), 0);
        assert_eq!(stack.redo_depth(), 0);
    }

    #[test]
    fn test_execute_runs_and_enables_undo() {
        let mut stack = CommandStack::default();
        let mut log = Vec::new();
        push(&mut stack, &mut log, "a1");

        assert_eq!(log, vec!["a1"]);
        assert!(stack.can_undo());
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_do_undo_redo_leaves_one_undo_entry() {
        let mut stack = CommandStack::default();
        let mut log = Vec::new();
        push(&mut stack, &mut log, "a1");
        assert_eq!(stack.undo(&mut log), Some(Ok("a1".to_string())));
        assert_eq!(stack.redo(&mut log), Some(Ok("a1".to_string())));

        let snapshot = stack.snapshot();
        assert_eq!(snapshot.undo, vec!["a1"]);
        assert!(snapshot.redo.is_empty());
        assert_eq!(log, vec!["a1"]);
    }

    #[test]
    fn test_two_undos_fill_redo_in_undo_order() {
        let mut stack = CommandStack::default();
        let mut log = Vec::new();
        push(&mut stack, &mut log, "a1");
        push(&mut stack, &mut log, "a2");
        stack.undo(&mut log);
        stack.undo(&mut log);

        let snapshot = stack.snapshot();
        assert!(snapshot.undo.is_empty());
        assert_eq!(snapshot.redo, vec!["a2", "a1"]);
        assert!(log.is_empty());
    }

    #[test]
    fn test_execute_clears_redo() {
        let mut stack = CommandStack::default();
        let mut log = Vec::new();
        push(&mut stack, &mut log, "a");
        push(&mut stack, &mut log, "b");
        stack.undo(&mut log);
        assert_eq!(stack.snapshot().redo, vec!["b"]);

        push(&mut stack, &mut log, "c");
        assert!(!stack.can_redo());
        assert!(stack.redo(&mut log).is_none());
        assert_eq!(log, vec!["a", "c"]);
    }

    #[test]
    fn test_failed_execute_keeps_redo() {
        let mut stack = CommandStack::default();
        let mut log = Vec::new();
        push(&mut stack, &mut log, "a");
        stack.undo(&mut log);

        let result = stack.execute(Box::new(PushWord::failing("b")), &mut log);
        assert!(result.is_err());
        assert!(stack.can_redo());
        assert_eq!(stack.undo_depth(), 0);
    }

    #[test]
    fn test_max_depth_enforced() {
        let mut stack = CommandStack::new(HistoryConfig::new(3));
        let mut log = Vec::new();
        for word in ["w0", "w1", "w2", "w3", "w4"] {
            push(&mut stack, &mut log, word);
        }

        assert_eq!(stack.undo_depth(), 3);
        assert_eq!(stack.snapshot().undo, vec!["w2", "w3", "w4"]);
    }

    #[test]
    #[tracing_test::traced_test]
    fn test_eviction_is_traced() {
        let mut stack = CommandStack::new(HistoryConfig::new(1));
        let mut log = Vec::new();
        push(&mut stack, &mut log, "w0");
        assert!(!logs_contain("evicted oldest undo entry"));
        push(&mut stack, &mut log, "w1");
        assert!(logs_contain("evicted oldest undo entry"));
        assert_eq!(stack.snapshot().undo, vec!["w1"]);
    }

    #[test]
    fn test_undo_without_commands() {
        let mut stack: CommandStack<Log> = CommandStack::default();
        let mut log = Vec::new();
        assert!(stack.undo(&mut log).is_none());
        assert!(stack.redo(&mut log).is_none());
    }

    #[test]
    fn test_next_descriptions() {
        let mut stack = CommandStack::default();
        let mut log = Vec::new();
        push(&mut stack, &mut log, "hello");

        assert_eq!(stack.next_undo_description(), Some("hello"));
        assert_eq!(stack.next_redo_description(), None);

        stack.undo(&mut log);

        assert_eq!(stack.next_undo_description(), None);
        assert_eq!(stack.next_redo_description(), Some("hello"));
    }

    #[test]
    fn test_descriptions_most_recent_first() {
        let mut stack = CommandStack::default();
        let mut log = Vec::new();
        push(&mut stack, &mut log, "a");
        push(&mut stack, &mut log, "b");
        push(&mut stack, &mut log, "c");

        assert_eq!(stack.undo_descriptions(5), vec!["c", "b", "a"]);
        assert_eq!(stack.undo_descriptions(2), vec!["c", "b"]);

        stack.undo(&mut log);
        stack.undo(&mut log);
        assert_eq!(stack.redo_descriptions(5), vec!["b", "c"]);
    }

    #[test]
    fn test_clear() {
        let mut stack = CommandStack::default();
        let mut log = Vec::new();
        push(&mut stack, &mut log, "a");
        push(&mut stack, &mut log, "b");
        stack.undo(&mut log);

        stack.clear();

        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_config_default() {
        assert_eq!(HistoryConfig::default().max_depth, 100);
        assert_eq!(HistoryConfig::unlimited().max_depth, usize::MAX);
    }

    #[test]
    fn test_debug_impl() {
        let stack: CommandStack<Log> = CommandStack::default();
        let debug_str = format!("{stack:?}");
        assert!(debug_str.contains("CommandStack"));
        assert!(debug_str.contains("undo_depth"));
    }
}
