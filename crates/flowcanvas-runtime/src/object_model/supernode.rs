#![forbid(unsafe_code)]

//! Deletion with cascade, restore, and supernode/pipeline bookkeeping.
//!
//! Deleting a supernode removes every pipeline reachable only through it,
//! recursively. Pipelines still referenced from elsewhere, and external
//! subflows, stay. Every removal is first planned into a
//! [`RemovedObjects`] record that also serves as its exact inverse.

use std::collections::HashSet;

use flowcanvas_core::query::owned_descendant_pipelines;
use flowcanvas_core::{
    Action, Comment, Link, ModelError, Node, ObjectId, Pipeline, PipelineAction, PipelineId, reduce,
};

use super::ObjectModel;

/// Everything one removal takes out of the flow, with original positions.
///
/// Each list is in ascending index order, which is the order restoring
/// needs.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedObjects {
    pub pipeline_id: PipelineId,
    pub nodes: Vec<(usize, Node)>,
    pub comments: Vec<(usize, Comment)>,
    pub links: Vec<(usize, Link)>,
    /// Pipelines that belonged only to removed supernodes, by arena index.
    pub pipelines: Vec<(usize, Pipeline)>,
}

impl RemovedObjects {
    pub(crate) fn links_only(pipeline_id: PipelineId, links: Vec<(usize, Link)>) -> Self {
        Self {
            pipeline_id,
            nodes: Vec::new(),
            comments: Vec::new(),
            links,
            pipelines: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.comments.is_empty() && self.links.is_empty() && self.pipelines.is_empty()
    }

    /// Ids of the removed nodes, comments, and links.
    #[must_use]
    pub fn object_ids(&self) -> Vec<ObjectId> {
        self.nodes
            .iter()
            .map(|(_, n)| n.id.clone())
            .chain(self.comments.iter().map(|(_, c)| c.id.clone()))
            .chain(self.links.iter().map(|(_, l)| l.id.clone()))
            .collect()
    }

    /// Number of removed nodes, comments, and links.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.nodes.len() + self.comments.len() + self.links.len()
    }
}

impl ObjectModel {
    /// Work out what deleting `ids` would remove, without removing it.
    ///
    /// Ids that do not exist are skipped.
    pub fn plan_deletion(&self, pipeline_id: &str, ids: &[ObjectId]) -> Result<RemovedObjects, ModelError> {
        let pipeline = self.require_pipeline(pipeline_id)?;
        let wanted: HashSet<&str> = ids.iter().map(ObjectId::as_str).collect();

        let nodes: Vec<(usize, Node)> = indexed(pipeline.nodes.iter(), |n| wanted.contains(n.id.as_str()));
        let comments = indexed(pipeline.comments.iter(), |c| wanted.contains(c.id.as_str()));
        let links = indexed(pipeline.links.iter(), |l| {
            wanted.contains(l.id.as_str()) || wanted.contains(l.src_id.as_str()) || wanted.contains(l.trg_id.as_str())
        });

        let supernodes: Vec<ObjectId> = nodes
            .iter()
            .filter(|(_, n)| n.local_subflow_pipeline_id().is_some())
            .map(|(_, n)| n.id.clone())
            .collect();
        let owned: HashSet<PipelineId> = owned_descendant_pipelines(&self.flow, pipeline_id, &supernodes)
            .into_iter()
            .collect();
        let pipelines = indexed(self.flow.pipelines.iter(), |p| owned.contains(&p.id));

        Ok(RemovedObjects {
            pipeline_id: pipeline_id.into(),
            nodes,
            comments,
            links,
            pipelines,
        })
    }

    /// Remove what a plan describes in one transition.
    pub fn apply_removal(&mut self, removed: &RemovedObjects) -> Result<(), ModelError> {
        self.require_pipeline(removed.pipeline_id.as_str())?;
        if removed.is_empty() {
            return Ok(());
        }
        let mut actions = vec![Action::in_pipeline(
            removed.pipeline_id.clone(),
            PipelineAction::DeleteObjects(removed.object_ids()),
        )];
        if !removed.pipelines.is_empty() {
            actions.push(Action::DeletePipelines(
                removed.pipelines.iter().map(|(_, p)| p.id.clone()).collect(),
            ));
        }
        self.dispatch(Action::Batch(actions));
        Ok(())
    }

    /// Put back what [`apply_removal`](Self::apply_removal) took out:
    /// pipelines first, then nodes and comments, then links, each at its
    /// original index.
    pub fn restore_objects(&mut self, removed: &RemovedObjects) -> Result<(), ModelError> {
        self.require_pipeline(removed.pipeline_id.as_str())?;
        if removed.is_empty() {
            return Ok(());
        }
        self.dispatch(Action::Batch(vec![
            Action::RestorePipelines(removed.pipelines.clone()),
            Action::in_pipeline(
                removed.pipeline_id.clone(),
                PipelineAction::RestoreObjects {
                    nodes: removed.nodes.clone(),
                    comments: removed.comments.clone(),
                    links: removed.links.clone(),
                },
            ),
        ]));
        Ok(())
    }

    /// Delete nodes, comments, and links together, plus every link left
    /// dangling and every pipeline owned only by a deleted supernode.
    pub fn delete_objects(&mut self, pipeline_id: &str, ids: &[ObjectId]) -> Result<RemovedObjects, ModelError> {
        let removed = self.plan_deletion(pipeline_id, ids)?;
        self.apply_removal(&removed)?;
        Ok(removed)
    }

    /// Add a supernode together with the pipelines it brings along.
    ///
    /// Rejected when a new pipeline id is taken, when a local subflow
    /// reference does not resolve, or when the result would nest a pipeline
    /// inside itself.
    pub fn add_supernode(
        &mut self,
        pipeline_id: &str,
        node: Node,
        sub_pipelines: Vec<Pipeline>,
    ) -> Result<(), ModelError> {
        self.require_unused(pipeline_id, &node.id)?;
        let subflow = node.subflow_ref.clone();
        let action = Action::Batch(vec![
            Action::AddPipelines(sub_pipelines),
            Action::in_pipeline(pipeline_id, PipelineAction::AddNode(node)),
        ]);
        self.check_pipelines_added(&action)?;

        let candidate = reduce(&self.flow, &action);
        if let Some(subflow) = subflow.filter(|s| !s.is_external()) {
            if !candidate.contains_pipeline(subflow.pipeline_id_ref.as_str()) {
                return Err(ModelError::PipelineNotFound(subflow.pipeline_id_ref));
            }
        }
        candidate.check_acyclic()?;
        self.dispatch(action);
        Ok(())
    }

    /// Delete a supernode and the pipelines only it reaches.
    pub fn delete_supernode(&mut self, pipeline_id: &str, id: &str) -> Result<RemovedObjects, ModelError> {
        self.delete_objects(pipeline_id, &[ObjectId::new(id)])
    }

    /// Add pipelines to the arena. Ids must be new.
    pub fn add_pipelines(&mut self, pipelines: Vec<Pipeline>) -> Result<(), ModelError> {
        let action = Action::AddPipelines(pipelines);
        self.check_pipelines_added(&action)?;
        reduce(&self.flow, &action).check_acyclic()?;
        self.dispatch(action);
        Ok(())
    }

    /// Remove pipelines from the arena.
    ///
    /// The primary pipeline and pipelines still referenced by a remaining
    /// supernode cannot be removed. Unknown ids are skipped.
    pub fn delete_pipelines(&mut self, ids: &[PipelineId]) -> Result<(), ModelError> {
        if ids.contains(&self.flow.primary_pipeline_id) {
            return Err(ModelError::InvalidDocument(format!(
                "primary pipeline '{}' cannot be deleted",
                self.flow.primary_pipeline_id
            )));
        }
        let candidate = reduce(&self.flow, &Action::DeletePipelines(ids.to_vec()));
        for pipeline in &candidate.pipelines {
            for node in pipeline.supernodes() {
                let Some(subflow) = node.subflow_ref.as_ref().filter(|s| !s.is_external()) else {
                    continue;
                };
                if ids.contains(&subflow.pipeline_id_ref) {
                    return Err(ModelError::InvalidDocument(format!(
                        "pipeline '{}' is still referenced by supernode '{}'",
                        subflow.pipeline_id_ref, node.id
                    )));
                }
            }
        }
        self.dispatch(Action::DeletePipelines(ids.to_vec()));
        Ok(())
    }

    fn check_pipelines_added(&self, action: &Action) -> Result<(), ModelError> {
        let added = match action {
            Action::AddPipelines(pipelines) => pipelines,
            Action::Batch(actions) => {
                return actions.iter().try_for_each(|a| self.check_pipelines_added(a));
            }
            _ => return Ok(()),
        };
        let mut seen = HashSet::new();
        for pipeline in added {
            if self.flow.contains_pipeline(pipeline.id.as_str()) || !seen.insert(pipeline.id.as_str()) {
                return Err(ModelError::DuplicatePipelineId(pipeline.id.clone()));
            }
        }
        Ok(())
    }
}

fn indexed<'a, T: Clone + 'a>(items: impl Iterator<Item = &'a T>, keep: impl Fn(&T) -> bool) -> Vec<(usize, T)> {
    items
        .enumerate()
        .filter(|(_, item)| keep(item))
        .map(|(index, item)| (index, item.clone()))
        .collect()
}
