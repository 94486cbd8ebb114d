#![forbid(unsafe_code)]

//! Undoable edits of the object model.
//!
//! One command per user-level edit. Constructors look at the model, resolve
//! their targets, and record everything needed to reverse the edit. A
//! missing target fails the constructor rather than the later `execute`.
//!
//! | Command | Undo strategy |
//! |---------|---------------|
//! | [`CreateNodeCmd`], [`CreateCommentCmd`] | delete by id |
//! | [`DeleteObjectsCmd`], [`DeleteLinksCmd`], [`DisconnectNodesCmd`] | restore snapshot at recorded indices |
//! | [`MoveObjectsCmd`] | negated offset |
//! | [`AddLinksCmd`] | delete the added links |
//! | [`ArrangeLayoutCmd`] | restore previous positions |
//! | [`EditCommentCmd`], [`SetNodeLabelCmd`] | write back previous value |
//! | [`CreateNodeOnLinkCmd`] | inner [`CommandBatch`](crate::undo::CommandBatch) in reverse |
//! | [`CloneMultipleObjectsCmd`] | delete clones and their pipelines |

mod clone;
mod create;
mod delete;
mod edit;
mod layout;
mod links;
mod move_objects;

pub use clone::CloneMultipleObjectsCmd;
pub use create::{CreateCommentCmd, CreateNodeCmd};
pub use delete::{DeleteLinksCmd, DeleteObjectsCmd, DisconnectNodesCmd};
pub use edit::{EditCommentCmd, SetNodeLabelCmd};
pub use layout::ArrangeLayoutCmd;
pub use links::{AddLinksCmd, CreateNodeOnLinkCmd};
pub use move_objects::MoveObjectsCmd;

use flowcanvas_core::{ObjectId, ObjectKind, Pipeline, PipelineId};

use crate::object_model::ObjectModel;
use crate::undo::{CommandError, CommandResult, TargetKind};

/// Fail unless every id in `ids` exists in the pipeline as a kind `accept`
/// allows.
pub(crate) fn check_targets(
    model: &ObjectModel,
    pipeline_id: &PipelineId,
    ids: &[ObjectId],
    expected: TargetKind,
    accept: impl Fn(ObjectKind) -> bool,
) -> Result<(), CommandError> {
    let Some(pipeline) = model.flow().pipeline(pipeline_id.as_str()) else {
        return Err(CommandError::pipeline_missing(pipeline_id));
    };
    for id in ids {
        match pipeline.object_kind(id.as_str()) {
            Some(kind) if accept(kind) => {}
            _ => return Err(CommandError::object_missing(expected, id, pipeline_id)),
        }
    }
    Ok(())
}

pub(crate) fn check_pipeline(model: &ObjectModel, pipeline_id: &PipelineId) -> Result<(), CommandError> {
    check_targets(model, pipeline_id, &[], TargetKind::Pipeline, |_| true)
}

/// Remove objects a command created, along with exactly the pipelines it
/// brought in.
pub(crate) fn remove_created(
    model: &mut ObjectModel,
    pipeline_id: &PipelineId,
    ids: &[ObjectId],
    pipelines: &[Pipeline],
) -> CommandResult {
    let mut removed = model.plan_deletion(pipeline_id.as_str(), ids)?;
    removed.pipelines = model
        .flow()
        .pipelines
        .iter()
        .enumerate()
        .filter(|(_, p)| pipelines.iter().any(|created| created.id == p.id))
        .map(|(index, p)| (index, p.clone()))
        .collect();
    model.apply_removal(&removed)?;
    Ok(())
}

pub(crate) fn counted(count: usize, singular: &str) -> String {
    if count == 1 {
        format!("1 {singular}")
    } else {
        format!("{count} {singular}s")
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use flowcanvas_core::{
        Cardinality, Comment, Link, Node, Pipeline, PipelineFlow, Port, SequentialIdGenerator,
    };
    use im::Vector;

    use crate::object_model::ObjectModel;

    /// p1: a -> b over single-link ports, c unconnected, comment c1 on a.
    pub(crate) fn model() -> ObjectModel {
        let single = |id: &str| vec![Port::new(id, Cardinality::OPTIONAL_SINGLE)];
        let mut flow = PipelineFlow::new("f", "p1");
        flow.pipelines = Vector::unit(
            Pipeline::new("p1")
                .with_nodes([
                    Node::new("a").with_position(0.0, 0.0).with_outputs(single("out")),
                    Node::new("b").with_position(200.0, 0.0).with_inputs(single("in")),
                    Node::new("c").with_position(0.0, 200.0),
                ])
                .with_comments([Comment::new("c1", "note").with_position(0.0, -80.0)])
                .with_links([
                    Link::node_link("l1", "a", None, "b", None),
                    Link::comment_link("l2", "c1", "a"),
                ]),
        );
        ObjectModel::new(flow).with_id_generator(Box::new(SequentialIdGenerator::new()))
    }
}
