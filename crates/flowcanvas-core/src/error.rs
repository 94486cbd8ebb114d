#![forbid(unsafe_code)]

//! Error types for the entity store.

use thiserror::Error;

use crate::id::{ObjectId, PipelineId};

/// The kind of object an id refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Node,
    Comment,
    Link,
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Node => "node",
            Self::Comment => "comment",
            Self::Link => "link",
        })
    }
}

/// Which end of a link a check applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortDirection {
    Input,
    Output,
}

impl std::fmt::Display for PortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Input => "input",
            Self::Output => "output",
        })
    }
}

/// An edit that would break a structural rule. Rejected before any state
/// changes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstraintViolation {
    #[error(
        "{direction} port '{port_id}' on node '{node_id}' already carries {existing} link(s); maximum is {max}"
    )]
    CardinalityExceeded {
        node_id: ObjectId,
        port_id: String,
        direction: PortDirection,
        existing: usize,
        max: u32,
    },

    #[error("node '{node_id}' has no {direction} port '{port_id}'")]
    UnknownPort {
        node_id: ObjectId,
        port_id: String,
        direction: PortDirection,
    },

    #[error("link endpoint '{0}' does not exist in the pipeline")]
    MissingEndpoint(ObjectId),

    #[error("link would connect '{0}' to itself")]
    SelfLink(ObjectId),

    #[error("an identical link from '{src_id}' to '{trg_id}' already exists")]
    DuplicateLink { src_id: ObjectId, trg_id: ObjectId },

    #[error("link type does not fit its endpoints: {0}")]
    InvalidLinkEndpoints(String),

    #[error("supernode '{node_id}' would make pipeline '{pipeline_id}' contain itself")]
    SupernodeCycle {
        node_id: ObjectId,
        pipeline_id: PipelineId,
    },
}

/// Errors raised by object model mutations and document validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("pipeline '{0}' not found")]
    PipelineNotFound(PipelineId),

    #[error("{kind} '{id}' not found in pipeline '{pipeline_id}'")]
    ObjectNotFound {
        kind: ObjectKind,
        id: ObjectId,
        pipeline_id: PipelineId,
    },

    #[error("id '{id}' is already used in pipeline '{pipeline_id}'")]
    DuplicateId { id: String, pipeline_id: PipelineId },

    #[error("pipeline id '{0}' is already used")]
    DuplicatePipelineId(PipelineId),

    #[error("constraint violation: {0}")]
    Constraint(#[from] ConstraintViolation),

    #[error("invalid document: {0}")]
    InvalidDocument(String),
}

impl ModelError {
    /// Whether this error means the edit was refused by a structural rule.
    #[must_use]
    pub fn is_constraint(&self) -> bool {
        matches!(self, Self::Constraint(_))
    }
}

/// Errors from reading or writing the persisted document.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] ModelError),
}
