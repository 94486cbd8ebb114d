#![forbid(unsafe_code)]

//! Nodes: the operations, bindings, and supernodes placed on a pipeline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::port::Port;
use super::{Decoration, is_default};
use crate::error::PortDirection;
use crate::id::{ObjectId, PipelineId};

/// What a node is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    #[default]
    ExecutionNode,
    BindingEntryNode,
    BindingExitNode,
    ModelNode,
    SuperNode,
}

impl NodeType {
    #[must_use]
    pub fn is_binding(self) -> bool {
        matches!(self, Self::BindingEntryNode | Self::BindingExitNode)
    }
}

/// Reference from a supernode to the pipeline it contains.
///
/// With `url` set the pipeline belongs to an external flow; the supernode
/// does not own it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubflowRef {
    pub pipeline_id_ref: PipelineId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl SubflowRef {
    #[must_use]
    pub fn local(pipeline_id: PipelineId) -> Self {
        Self {
            pipeline_id_ref: pipeline_id,
            url: None,
        }
    }

    #[must_use]
    pub fn external(pipeline_id: PipelineId, url: impl Into<String>) -> Self {
        Self {
            pipeline_id_ref: pipeline_id,
            url: Some(url.into()),
        }
    }

    #[must_use]
    pub fn is_external(&self) -> bool {
        self.url.is_some()
    }
}

/// Severity of a node message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Error,
    Warning,
    #[default]
    Info,
}

/// A diagnostic annotation on a node, keyed by the control it describes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMessage {
    /// Name of the control (parameter) this message is about.
    pub id_ref: String,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub text: String,
}

impl NodeMessage {
    #[must_use]
    pub fn new(id_ref: impl Into<String>, message_type: MessageType, text: impl Into<String>) -> Self {
        Self {
            id_ref: id_ref.into(),
            message_type,
            text: text.into(),
        }
    }
}

/// A node on a pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: ObjectId,
    #[serde(rename = "type", default)]
    pub node_type: NodeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub op: Option<String>,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub x_pos: f64,
    #[serde(default)]
    pub y_pos: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<Port>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<Port>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<NodeMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decorations: Vec<Decoration>,
    #[serde(default, skip_serializing_if = "is_default")]
    pub app_data: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subflow_ref: Option<SubflowRef>,
}

impl Node {
    /// A bare execution node at the origin.
    #[must_use]
    pub fn new(id: impl Into<ObjectId>) -> Self {
        Self {
            id: id.into(),
            node_type: NodeType::ExecutionNode,
            op: None,
            label: String::new(),
            description: None,
            x_pos: 0.0,
            y_pos: 0.0,
            width: 0.0,
            height: 0.0,
            inputs: Vec::new(),
            outputs: Vec::new(),
            parameters: None,
            messages: Vec::new(),
            style: None,
            decorations: Vec::new(),
            app_data: BTreeMap::new(),
            subflow_ref: None,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    #[must_use]
    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.x_pos = x;
        self.y_pos = y;
        self
    }

    #[must_use]
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    #[must_use]
    pub fn with_inputs(mut self, inputs: Vec<Port>) -> Self {
        self.inputs = inputs;
        self
    }

    #[must_use]
    pub fn with_outputs(mut self, outputs: Vec<Port>) -> Self {
        self.outputs = outputs;
        self
    }

    /// Turn this node into a supernode referencing `subflow`.
    #[must_use]
    pub fn into_supernode(mut self, subflow: SubflowRef) -> Self {
        self.node_type = NodeType::SuperNode;
        self.subflow_ref = Some(subflow);
        self
    }

    #[must_use]
    pub fn is_supernode(&self) -> bool {
        self.node_type == NodeType::SuperNode && self.subflow_ref.is_some()
    }

    /// The pipeline a supernode references, if this is one.
    #[must_use]
    pub fn subflow_pipeline_id(&self) -> Option<&PipelineId> {
        if self.node_type != NodeType::SuperNode {
            return None;
        }
        self.subflow_ref.as_ref().map(|r| &r.pipeline_id_ref)
    }

    /// The referenced pipeline when this supernode owns it, i.e. the
    /// reference carries no external `url`.
    #[must_use]
    pub fn local_subflow_pipeline_id(&self) -> Option<&PipelineId> {
        match &self.subflow_ref {
            Some(subflow) if !subflow.is_external() => self.subflow_pipeline_id(),
            _ => None,
        }
    }

    #[must_use]
    pub fn ports(&self, direction: PortDirection) -> &[Port] {
        match direction {
            PortDirection::Input => &self.inputs,
            PortDirection::Output => &self.outputs,
        }
    }

    /// Resolve the port a link end binds to: the named port, or the first
    /// declared port when no name is given.
    #[must_use]
    pub fn resolve_port(&self, direction: PortDirection, port_id: Option<&str>) -> Option<&Port> {
        let ports = self.ports(direction);
        match port_id {
            Some(id) => ports.iter().find(|p| p.id == id),
            None => ports.first(),
        }
    }

    /// Messages currently attached to the control named `id_ref`.
    pub fn messages_for<'a>(&'a self, id_ref: &'a str) -> impl Iterator<Item = &'a NodeMessage> + 'a {
        self.messages.iter().filter(move |m| m.id_ref == id_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::port::Cardinality;

    #[test]
    fn resolve_port_falls_back_to_first() {
        let node = Node::new("n1").with_inputs(vec![
            Port::new("a", Cardinality::OPTIONAL_SINGLE),
            Port::new("b", Cardinality::UNBOUNDED),
        ]);
        assert_eq!(
            node.resolve_port(PortDirection::Input, None).map(|p| p.id.as_str()),
            Some("a")
        );
        assert_eq!(
            node.resolve_port(PortDirection::Input, Some("b")).map(|p| p.id.as_str()),
            Some("b")
        );
        assert!(node.resolve_port(PortDirection::Input, Some("zz")).is_none());
        assert!(node.resolve_port(PortDirection::Output, None).is_none());
    }

    #[test]
    fn supernode_reports_its_subflow() {
        let node = Node::new("s1").into_supernode(SubflowRef::local(PipelineId::new("p2")));
        assert!(node.is_supernode());
        assert_eq!(node.subflow_pipeline_id(), Some(&PipelineId::new("p2")));
        assert!(Node::new("n").subflow_pipeline_id().is_none());
        assert_eq!(node.local_subflow_pipeline_id(), Some(&PipelineId::new("p2")));

        let external = Node::new("s2").into_supernode(SubflowRef::external(PipelineId::new("ext"), "flows/a.json"));
        assert_eq!(external.subflow_pipeline_id(), Some(&PipelineId::new("ext")));
        assert!(external.local_subflow_pipeline_id().is_none());
    }

    #[test]
    fn node_type_uses_snake_case_names() {
        let json = serde_json::to_value(NodeType::SuperNode).unwrap();
        assert_eq!(json, "super_node");
    }
}
