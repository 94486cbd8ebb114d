#![forbid(unsafe_code)]

use std::collections::{HashMap, HashSet};

use im::Vector;
use serde::{Deserialize, Serialize};

use super::{LinkType, Pipeline};
use crate::error::{ConstraintViolation, ModelError};
use crate::id::PipelineId;

/// The whole document: a set of pipelines with one primary entry point.
///
/// Supernodes refer to other pipelines of the same flow by id; the flow is
/// an arena of pipelines, not a tree of embedded ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineFlow {
    pub id: String,
    pub primary_pipeline_id: PipelineId,
    #[serde(default)]
    pub pipelines: Vector<Pipeline>,
}

impl PipelineFlow {
    /// A flow with a single empty primary pipeline.
    #[must_use]
    pub fn new(id: impl Into<String>, primary_pipeline_id: impl Into<PipelineId>) -> Self {
        let primary = Pipeline::new(primary_pipeline_id);
        Self {
            id: id.into(),
            primary_pipeline_id: primary.id.clone(),
            pipelines: Vector::unit(primary),
        }
    }

    #[must_use]
    pub fn pipeline(&self, id: &str) -> Option<&Pipeline> {
        self.pipelines.iter().find(|p| p.id == id)
    }

    #[must_use]
    pub fn pipeline_index(&self, id: &str) -> Option<usize> {
        self.pipelines.iter().position(|p| p.id == id)
    }

    #[must_use]
    pub fn primary_pipeline(&self) -> Option<&Pipeline> {
        self.pipeline(self.primary_pipeline_id.as_str())
    }

    #[must_use]
    pub fn contains_pipeline(&self, id: &str) -> bool {
        self.pipeline_index(id).is_some()
    }

    /// Check every structural invariant of the document.
    ///
    /// Reports the first violation found.
    pub fn validate(&self) -> Result<(), ModelError> {
        let mut pipeline_ids = HashSet::new();
        for pipeline in &self.pipelines {
            if !pipeline_ids.insert(pipeline.id.as_str()) {
                return Err(ModelError::DuplicatePipelineId(pipeline.id.clone()));
            }
        }
        if !pipeline_ids.contains(self.primary_pipeline_id.as_str()) {
            return Err(ModelError::PipelineNotFound(self.primary_pipeline_id.clone()));
        }

        for pipeline in &self.pipelines {
            validate_pipeline(pipeline)?;
            for node in pipeline.supernodes() {
                let Some(subflow) = node.subflow_ref.as_ref() else {
                    continue;
                };
                if !subflow.is_external() && !self.contains_pipeline(subflow.pipeline_id_ref.as_str()) {
                    return Err(ModelError::InvalidDocument(format!(
                        "supernode '{}' references missing pipeline '{}'",
                        node.id, subflow.pipeline_id_ref
                    )));
                }
            }
        }

        self.check_acyclic()
    }

    /// Depth-first walk over supernode references looking for a pipeline
    /// that contains itself.
    pub fn check_acyclic(&self) -> Result<(), ModelError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Active,
            Done,
        }

        let children: HashMap<&str, Vec<(&str, &str)>> = self
            .pipelines
            .iter()
            .map(|p| {
                let refs = p
                    .supernodes()
                    .filter_map(|n| n.subflow_pipeline_id().map(|pid| (n.id.as_str(), pid.as_str())))
                    .collect();
                (p.id.as_str(), refs)
            })
            .collect();

        let mut marks: HashMap<&str, Mark> = HashMap::new();
        for root in self.pipelines.iter().map(|p| p.id.as_str()) {
            if marks.contains_key(root) {
                continue;
            }
            // (pipeline, index of next child to visit)
            let mut stack: Vec<(&str, usize)> = vec![(root, 0)];
            marks.insert(root, Mark::Active);
            while let Some((current, next)) = stack.pop() {
                let refs = children.get(current).map(Vec::as_slice).unwrap_or(&[]);
                let Some(&(node_id, child)) = refs.get(next) else {
                    marks.insert(current, Mark::Done);
                    continue;
                };
                stack.push((current, next + 1));
                match marks.get(child) {
                    Some(Mark::Active) => {
                        return Err(ConstraintViolation::SupernodeCycle {
                            node_id: node_id.into(),
                            pipeline_id: child.into(),
                        }
                        .into());
                    }
                    Some(Mark::Done) => {}
                    None => {
                        if children.contains_key(child) {
                            marks.insert(child, Mark::Active);
                            stack.push((child, 0));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

fn validate_pipeline(pipeline: &Pipeline) -> Result<(), ModelError> {
    let mut seen = HashSet::new();
    for id in pipeline.object_ids() {
        if !seen.insert(id.clone()) {
            return Err(ModelError::DuplicateId {
                id: id.to_string(),
                pipeline_id: pipeline.id.clone(),
            });
        }
    }

    for link in &pipeline.links {
        for end in [&link.src_id, &link.trg_id] {
            if !pipeline.has_endpoint(end.as_str()) {
                return Err(ModelError::InvalidDocument(format!(
                    "link '{}' in pipeline '{}' references missing object '{}'",
                    link.id, pipeline.id, end
                )));
            }
        }
        if link.link_type == LinkType::CommentLink
            && (pipeline.comment(link.src_id.as_str()).is_none()
                || pipeline.node(link.trg_id.as_str()).is_none())
        {
            return Err(ModelError::InvalidDocument(format!(
                "comment link '{}' must run from a comment to a node",
                link.id
            )));
        }
    }
    Ok(())
}
