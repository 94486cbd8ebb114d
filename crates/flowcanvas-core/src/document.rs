#![forbid(unsafe_code)]

//! Persisted document shape.
//!
//! A pipeline flow serializes as
//! `{id, primaryPipelineId, pipelines: [{id, nodes, comments, links}]}` and
//! reading it back yields an equal value. Loading validates the structural
//! invariants before handing the flow out.

use crate::entity::PipelineFlow;
use crate::error::DocumentError;

/// Serialize a flow to compact JSON.
pub fn to_json(flow: &PipelineFlow) -> Result<String, DocumentError> {
    Ok(serde_json::to_string(flow)?)
}

/// Serialize a flow to indented JSON.
pub fn to_json_pretty(flow: &PipelineFlow) -> Result<String, DocumentError> {
    Ok(serde_json::to_string_pretty(flow)?)
}

/// Parse and validate a flow.
pub fn from_json(json: &str) -> Result<PipelineFlow, DocumentError> {
    let flow: PipelineFlow = serde_json::from_str(json)?;
    flow.validate()?;
    Ok(flow)
}

/// Convert a flow into a JSON value tree.
pub fn to_value(flow: &PipelineFlow) -> Result<serde_json::Value, DocumentError> {
    Ok(serde_json::to_value(flow)?)
}

/// Parse and validate a flow from a JSON value tree.
pub fn from_value(value: serde_json::Value) -> Result<PipelineFlow, DocumentError> {
    let flow: PipelineFlow = serde_json::from_value(value)?;
    flow.validate()?;
    Ok(flow)
}
