#![forbid(unsafe_code)]

//! Core: the pipeline-flow entity store and its pure transition functions.
//!
//! # Role in FlowCanvas
//! `flowcanvas-core` is the data layer. It owns the plain records of a
//! document (nodes, comments, links, pipelines, and the pipeline flow that
//! groups them), the closed set of actions that can change them, and the
//! transition functions that apply those actions.
//!
//! # Primary responsibilities
//! - **Entities**: normalized, serde-ready records with structurally shared
//!   collections, so every snapshot is cheap to keep.
//! - **Actions + reducers**: `reduce(&flow, &action) -> flow`, deterministic
//!   and never mutating its input.
//! - **Queries**: supernode descendant walks, forward reachability, port
//!   occupancy.
//! - **Documents**: JSON load/save with invariant validation.
//!
//! # How it fits in the system
//! The runtime (`flowcanvas-runtime`) owns one flow, feeds actions through
//! [`reducer::reduce`], and builds undoable commands on top. Nothing here
//! logs or has side effects.

pub mod action;
pub mod document;
pub mod entity;
pub mod error;
pub mod id;
pub mod query;
pub mod reducer;

pub use action::{Action, PipelineAction};
pub use entity::{
    Cardinality, Comment, Decoration, Link, LinkType, MessageType, Node, NodeMessage, NodeType,
    ObjectPosition, ParseCardinalityError, Pipeline, PipelineFlow, Port, SubflowRef, Zoom,
};
pub use error::{ConstraintViolation, DocumentError, ModelError, ObjectKind, PortDirection};
pub use id::{IdGenerator, IdKind, ObjectId, PipelineId, SequentialIdGenerator, UuidGenerator};
pub use reducer::reduce;
