#![forbid(unsafe_code)]

//! Unified error type for the controller surface.
//!
//! Each layer keeps its own typed error so callers can match on what
//! matters; this enum only gathers them behind one `?`.

use flowcanvas_core::{DocumentError, ModelError};
use flowcanvas_runtime::{CommandError, ConfigError};
use thiserror::Error;

/// Top-level error type for FlowCanvas editors.
#[derive(Error, Debug)]
pub enum Error {
    /// The object model refused an edit or a query target was absent.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// A command could not be built, executed, undone, or redone.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// A document failed to load or save.
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Editor configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Clipboard text is not a copied object bundle.
    #[error("clipboard content is not a FlowCanvas selection: {0}")]
    Clipboard(#[from] serde_json::Error),
}

impl Error {
    /// Whether the edit was refused by a link or nesting rule, as opposed to
    /// naming something that does not exist.
    #[must_use]
    pub fn is_constraint(&self) -> bool {
        match self {
            Self::Model(err) | Self::Command(CommandError::Model(err)) => err.is_constraint(),
            _ => false,
        }
    }
}

/// Standard result type for FlowCanvas APIs.
pub type Result<T> = std::result::Result<T, Error>;
