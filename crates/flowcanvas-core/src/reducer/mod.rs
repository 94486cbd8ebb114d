#![forbid(unsafe_code)]

//! Pure state transitions.
//!
//! `reduce(state, action)` returns a new [`PipelineFlow`]; the input is never
//! modified and stays a valid snapshot. One transition function per entity
//! kind ([`nodes`], [`comments`], [`links`], [`pipelines`]) is composed into
//! [`reduce_pipeline`] and [`reduce`]. Each of them passes through actions it
//! does not handle, so all of them can be fed the same action stream.
//!
//! # Invariants
//!
//! 1. Same state + same action -> same result.
//! 2. Deleting an id that does not exist returns an equal state.
//! 3. An action scoped to a missing pipeline returns an equal state.
//! 4. Deleting a node or comment removes its links in the same transition.
//! 5. `DeleteObjects` is evaluated against the snapshot it is applied to,
//!    not as a sequence of single deletes.

pub mod comments;
pub mod links;
pub mod nodes;
pub mod pipelines;

use std::collections::HashSet;

use im::Vector;

use crate::action::{Action, PipelineAction};
use crate::entity::{Pipeline, PipelineFlow};
use crate::id::ObjectId;

/// Top-level transition function.
#[must_use]
pub fn reduce(flow: &PipelineFlow, action: &Action) -> PipelineFlow {
    match action {
        Action::Pipeline {
            pipeline_id,
            action,
        } => {
            let Some(index) = flow.pipeline_index(pipeline_id.as_str()) else {
                return flow.clone();
            };
            let Some(pipeline) = flow.pipelines.get(index) else {
                return flow.clone();
            };
            let next = reduce_pipeline(pipeline, action);
            let mut out = flow.clone();
            out.pipelines.set(index, next);
            out
        }
        Action::AddPipelines(_) | Action::DeletePipelines(_) | Action::RestorePipelines(_) => PipelineFlow {
            pipelines: pipelines::reduce(&flow.pipelines, action),
            ..flow.clone()
        },
        Action::ReplaceFlow(next) => next.clone(),
        Action::Batch(actions) => actions
            .iter()
            .fold(flow.clone(), |state, action| reduce(&state, action)),
    }
}

/// Apply one pipeline-scoped action to a pipeline.
#[must_use]
pub fn reduce_pipeline(pipeline: &Pipeline, action: &PipelineAction) -> Pipeline {
    Pipeline {
        zoom: pipelines::reduce_zoom(pipeline.zoom, action),
        nodes: nodes::reduce(&pipeline.nodes, action),
        comments: comments::reduce(&pipeline.comments, action),
        links: links::reduce(&pipeline.links, action),
        ..pipeline.clone()
    }
}

pub(crate) fn id_set(ids: &[ObjectId]) -> HashSet<&str> {
    ids.iter().map(ObjectId::as_str).collect()
}

/// Replace the first item matching `matches` with `item`, or append it.
pub(crate) fn upsert<T: Clone>(items: &Vector<T>, item: T, matches: impl Fn(&T) -> bool) -> Vector<T> {
    let mut out = items.clone();
    match items.iter().position(matches) {
        Some(index) => {
            out.set(index, item);
        }
        None => out.push_back(item),
    }
    out
}

/// Insert `(index, item)` pairs in ascending index order. Indices past the
/// end append.
pub(crate) fn restore_at<T: Clone>(items: &Vector<T>, entries: &[(usize, T)]) -> Vector<T> {
    let mut out = items.clone();
    for (index, item) in entries {
        let index = (*index).min(out.len());
        out.insert(index, item.clone());
    }
    out
}

/// Apply `f` to a copy of the first matching item. Returns an equal vector
/// when nothing matches.
pub(crate) fn update_one<T: Clone>(
    items: &Vector<T>,
    matches: impl Fn(&T) -> bool,
    f: impl FnOnce(&mut T),
) -> Vector<T> {
    let mut out = items.clone();
    if let Some(index) = items.iter().position(matches) {
        if let Some(current) = items.get(index) {
            let mut updated = current.clone();
            f(&mut updated);
            out.set(index, updated);
        }
    }
    out
}

/// Apply `f` to a copy of every matching item.
pub(crate) fn update_where<T: Clone>(
    items: &Vector<T>,
    matches: impl Fn(&T) -> bool,
    f: impl Fn(&mut T),
) -> Vector<T> {
    let mut out = items.clone();
    for (index, item) in items.iter().enumerate() {
        if matches(item) {
            let mut updated = item.clone();
            f(&mut updated);
            out.set(index, updated);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Comment, Link, Node, NodeMessage, MessageType, ObjectPosition};
    use crate::id::PipelineId;

    fn flow() -> PipelineFlow {
        let mut flow = PipelineFlow::new("f1", "p1");
        flow.pipelines = Vector::unit(
            Pipeline::new("p1")
                .with_nodes([
                    Node::new("n1").with_position(10.0, 10.0),
                    Node::new("n2").with_position(100.0, 10.0),
                    Node::new("n3").with_position(200.0, 10.0),
                ])
                .with_comments([Comment::new("c1", "note").with_position(5.0, 5.0)])
                .with_links([
                    Link::node_link("l1", "n1", None, "n2", None),
                    Link::node_link("l2", "n2", None, "n3", None),
                    Link::comment_link("l3", "c1", "n2"),
                ]),
        );
        flow
    }

    fn p1(action: PipelineAction) -> Action {
        Action::in_pipeline("p1", action)
    }

    fn link_ids(flow: &PipelineFlow) -> Vec<String> {
        flow.pipeline("p1")
            .map(|p| p.links.iter().map(|l| l.id.to_string()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn reduce_never_mutates_input() {
        let before = flow();
        let copy = before.clone();
        let after = reduce(&before, &p1(PipelineAction::DeleteNode("n2".into())));
        assert_eq!(before, copy);
        assert_ne!(before, after);
    }

    #[test]
    fn delete_node_drops_its_links_in_same_transition() {
        let after = reduce(&flow(), &p1(PipelineAction::DeleteNode("n2".into())));
        assert!(link_ids(&after).is_empty());
        let p = after.pipeline("p1").unwrap();
        assert!(p.node("n2").is_none());
        assert_eq!(p.nodes.len(), 2);
    }

    #[test]
    fn delete_comment_drops_comment_links() {
        let after = reduce(&flow(), &p1(PipelineAction::DeleteComment("c1".into())));
        assert_eq!(link_ids(&after), vec!["l1", "l2"]);
    }

    #[test]
    fn deleting_missing_id_is_a_noop() {
        let before = flow();
        assert_eq!(reduce(&before, &p1(PipelineAction::DeleteNode("ghost".into()))), before);
        assert_eq!(reduce(&before, &p1(PipelineAction::DeleteLinks(vec!["ghost".into()]))), before);
    }

    #[test]
    fn unknown_pipeline_is_a_noop() {
        let before = flow();
        let action = Action::in_pipeline("elsewhere", PipelineAction::DeleteNode("n1".into()));
        assert_eq!(reduce(&before, &action), before);
    }

    #[test]
    fn delete_objects_is_one_snapshot() {
        let after = reduce(
            &flow(),
            &p1(PipelineAction::DeleteObjects(vec!["n1".into(), "l2".into(), "c1".into()])),
        );
        let p = after.pipeline("p1").unwrap();
        assert_eq!(p.nodes.len(), 2);
        assert!(p.comments.is_empty());
        // l1 dangles on n1, l2 is listed, l3 dangles on c1.
        assert!(p.links.is_empty());
    }

    #[test]
    fn move_objects_offsets_nodes_and_comments() {
        let after = reduce(
            &flow(),
            &p1(PipelineAction::MoveObjects {
                ids: vec!["n1".into(), "c1".into(), "l1".into()],
                offset_x: 5.0,
                offset_y: -2.0,
            }),
        );
        let p = after.pipeline("p1").unwrap();
        assert_eq!((p.node("n1").unwrap().x_pos, p.node("n1").unwrap().y_pos), (15.0, 8.0));
        assert_eq!((p.comment("c1").unwrap().x_pos, p.comment("c1").unwrap().y_pos), (10.0, 3.0));
        assert_eq!(p.node("n2").unwrap().x_pos, 100.0);
    }

    #[test]
    fn set_positions_is_absolute() {
        let after = reduce(
            &flow(),
            &p1(PipelineAction::SetObjectPositions(vec![ObjectPosition {
                id: "n3".into(),
                x: 1.0,
                y: 2.0,
            }])),
        );
        let n3 = after.pipeline("p1").unwrap().node("n3").unwrap().clone();
        assert_eq!((n3.x_pos, n3.y_pos), (1.0, 2.0));
    }

    #[test]
    fn node_message_replaces_same_control() {
        let first = NodeMessage::new("threshold", MessageType::Error, "required");
        let second = NodeMessage::new("threshold", MessageType::Warning, "too high");
        let other = NodeMessage::new("name", MessageType::Info, "ok");
        let state = [first, other, second.clone()].into_iter().fold(flow(), |state, m| {
            reduce(
                &state,
                &p1(PipelineAction::SetNodeMessage {
                    id: "n1".into(),
                    message: m,
                }),
            )
        });
        let node = state.pipeline("p1").unwrap().node("n1").unwrap().clone();
        assert_eq!(node.messages.len(), 2);
        assert_eq!(node.messages_for("threshold").next(), Some(&second));
    }

    #[test]
    fn pipelines_add_and_delete() {
        let added = reduce(&flow(), &Action::AddPipelines(vec![Pipeline::new("p2")]));
        assert!(added.contains_pipeline("p2"));
        let removed = reduce(&added, &Action::DeletePipelines(vec![PipelineId::new("p2")]));
        assert_eq!(removed, flow());
    }

    #[test]
    fn batch_folds_in_order() {
        let after = reduce(
            &flow(),
            &Action::Batch(vec![
                p1(PipelineAction::AddNode(Node::new("n4"))),
                p1(PipelineAction::AddLinks(vec![Link::node_link("l4", "n3", None, "n4", None)])),
                p1(PipelineAction::DeleteNode("n3".into())),
            ]),
        );
        assert_eq!(link_ids(&after), vec!["l1", "l3"]);
        assert!(after.pipeline("p1").unwrap().node("n4").is_some());
    }

    #[test]
    fn restore_puts_objects_back_in_place() {
        let before = flow();
        let pipeline = before.pipeline("p1").unwrap().clone();
        let deleted = reduce(&before, &p1(PipelineAction::DeleteNode("n2".into())));
        let links: Vec<_> = pipeline
            .links
            .iter()
            .cloned()
            .enumerate()
            .collect();
        let restored = reduce(
            &deleted,
            &p1(PipelineAction::RestoreObjects {
                nodes: vec![(1, pipeline.node("n2").unwrap().clone())],
                comments: Vec::new(),
                links,
            }),
        );
        assert_eq!(restored, before);
    }

    #[test]
    fn restore_pipelines_keeps_arena_order() {
        let with_three = reduce(
            &flow(),
            &Action::AddPipelines(vec![Pipeline::new("p2"), Pipeline::new("p3")]),
        );
        let removed = reduce(&with_three, &Action::DeletePipelines(vec![PipelineId::new("p2")]));
        let restored = reduce(&removed, &Action::RestorePipelines(vec![(1, Pipeline::new("p2"))]));
        assert_eq!(restored, with_three);
    }

    #[test]
    fn add_node_with_existing_id_replaces() {
        let after = reduce(
            &flow(),
            &p1(PipelineAction::AddNode(Node::new("n1").with_label("renamed"))),
        );
        let p = after.pipeline("p1").unwrap();
        assert_eq!(p.nodes.len(), 3);
        assert_eq!(p.node("n1").unwrap().label, "renamed");
        assert_eq!(p.nodes.get(0).map(|n| n.id.as_str()), Some("n1"));
    }
}
