#![forbid(unsafe_code)]

//! Property tests for the entity store.
//!
//! Validates:
//! - Any generated document survives JSON save/load unchanged.
//! - No sequence of node/comment deletions leaves a dangling link.
//! - Reducing never changes the input snapshot.
//! - Batched deletion matches deleting the same ids in one `DeleteObjects`.

use im::Vector;
use proptest::prelude::*;
use serde_json::json;

use flowcanvas_core::query::dangling_links;
use flowcanvas_core::{
    Action, Cardinality, Comment, Link, Node, Pipeline, PipelineAction, PipelineFlow, PipelineId,
    Port, SubflowRef, Zoom, document, reduce,
};

// ============================================================================
// Strategy helpers
// ============================================================================

fn coord() -> impl Strategy<Value = f64> {
    -10_000.0f64..10_000.0
}

fn node_strategy(index: usize) -> impl Strategy<Value = Node> {
    (
        coord(),
        coord(),
        "[a-z ]{0,12}",
        prop::option::of(0u32..100),
        any::<bool>(),
    )
        .prop_map(move |(x, y, label, param, with_ports)| {
            let mut node = Node::new(format!("n{index}"))
                .with_label(label)
                .with_position(x, y)
                .with_size(70.0, 75.0);
            if let Some(param) = param {
                node.parameters = Some(json!({ "threshold": param }));
            }
            if with_ports {
                node = node
                    .with_inputs(vec![Port::new("in", Cardinality::OPTIONAL_SINGLE)])
                    .with_outputs(vec![Port::new("out", Cardinality::UNBOUNDED).with_label("Out")]);
            }
            node
        })
}

fn pipeline_strategy(index: usize) -> impl Strategy<Value = Pipeline> {
    (
        prop::collection::vec(any::<u8>(), 0..8),
        prop::collection::vec((coord(), coord(), "[a-z]{0,8}"), 0..3),
        prop::collection::vec((any::<prop::sample::Index>(), any::<prop::sample::Index>()), 0..10),
        prop::option::of((coord(), coord(), 0.1f64..4.0)),
    )
        .prop_flat_map(move |(seeds, comments, links, zoom)| {
            let nodes: Vec<_> = (0..seeds.len()).map(node_strategy).collect();
            (nodes, Just(comments), Just(links), Just(zoom))
        })
        .prop_map(move |(nodes, comments, links, zoom)| {
            let comments: Vec<Comment> = comments
                .into_iter()
                .enumerate()
                .map(|(i, (x, y, text))| Comment::new(format!("c{i}"), text).with_position(x, y))
                .collect();
            let links: Vec<Link> = if nodes.is_empty() {
                Vec::new()
            } else {
                links
                    .into_iter()
                    .enumerate()
                    .map(|(i, (src, trg))| {
                        Link::node_link(
                            format!("l{i}"),
                            nodes[src.index(nodes.len())].id.clone(),
                            None,
                            nodes[trg.index(nodes.len())].id.clone(),
                            None,
                        )
                    })
                    .chain(
                        comments
                            .iter()
                            .enumerate()
                            .map(|(i, c)| Link::comment_link(format!("cl{i}"), c.id.clone(), nodes[0].id.clone())),
                    )
                    .collect()
            };
            let mut pipeline = Pipeline::new(format!("p{index}"))
                .with_nodes(nodes)
                .with_comments(comments)
                .with_links(links);
            pipeline.zoom = zoom.map(|(x, y, k)| Zoom { x, y, k });
            pipeline
        })
}

/// A flow of up to five pipelines; pipeline `i > 0` is owned by a supernode
/// in some earlier pipeline, so supernode references form a tree.
fn flow_strategy() -> impl Strategy<Value = PipelineFlow> {
    (1usize..5)
        .prop_flat_map(|count| {
            let pipelines: Vec<_> = (0..count).map(pipeline_strategy).collect();
            let parents = prop::collection::vec(any::<prop::sample::Index>(), count.saturating_sub(1));
            (pipelines, parents)
        })
        .prop_map(|(mut pipelines, parents)| {
            for (offset, parent) in parents.into_iter().enumerate() {
                let child = offset + 1;
                let parent = parent.index(child);
                let supernode = Node::new(format!("s{child}"))
                    .with_position(5.0, 5.0)
                    .into_supernode(SubflowRef::local(PipelineId::new(format!("p{child}"))));
                pipelines[parent].nodes.push_back(supernode);
            }
            PipelineFlow {
                id: "flow".to_string(),
                primary_pipeline_id: PipelineId::new("p0"),
                pipelines: Vector::from(pipelines),
            }
        })
}

fn deletion_strategy() -> impl Strategy<Value = Vec<(prop::sample::Index, prop::sample::Index, bool)>> {
    prop::collection::vec(
        (any::<prop::sample::Index>(), any::<prop::sample::Index>(), any::<bool>()),
        1..12,
    )
}

fn deletion_action(flow: &PipelineFlow, pick: &(prop::sample::Index, prop::sample::Index, bool)) -> Option<Action> {
    let (pipeline, object, comment) = pick;
    let pipeline = flow.pipelines.get(pipeline.index(flow.pipelines.len()))?;
    let action = if *comment && !pipeline.comments.is_empty() {
        let c = pipeline.comments.get(object.index(pipeline.comments.len()))?;
        PipelineAction::DeleteComment(c.id.clone())
    } else if !pipeline.nodes.is_empty() {
        let n = pipeline.nodes.get(object.index(pipeline.nodes.len()))?;
        PipelineAction::DeleteNode(n.id.clone())
    } else {
        return None;
    };
    Some(Action::in_pipeline(pipeline.id.clone(), action))
}

// ============================================================================
// Invariant 1: save/load round-trips exactly
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn generated_documents_round_trip(flow in flow_strategy()) {
        prop_assert!(flow.validate().is_ok());
        let json = document::to_json(&flow).unwrap();
        let back = document::from_json(&json).unwrap();
        prop_assert_eq!(&back, &flow);
        prop_assert_eq!(document::to_json(&back).unwrap(), json);
    }
}

// ============================================================================
// Invariant 2: deletions never leave dangling links
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn deletions_never_leave_dangling_links(flow in flow_strategy(), picks in deletion_strategy()) {
        let mut state = flow;
        for pick in &picks {
            let Some(action) = deletion_action(&state, pick) else { continue };
            state = reduce(&state, &action);
            prop_assert!(dangling_links(&state).is_empty(), "dangling after {:?}", action);
        }
    }

    #[test]
    fn reduce_leaves_input_untouched(flow in flow_strategy(), picks in deletion_strategy()) {
        let before = document::to_json(&flow).unwrap();
        for pick in &picks {
            if let Some(action) = deletion_action(&flow, pick) {
                let _ = reduce(&flow, &action);
            }
        }
        prop_assert_eq!(document::to_json(&flow).unwrap(), before);
    }
}

// ============================================================================
// Invariant 3: batched delete equals one DeleteObjects over the same ids
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn delete_objects_matches_node_by_node_deletion(
        flow in flow_strategy(),
        picks in prop::collection::vec(any::<prop::sample::Index>(), 0..6),
    ) {
        let Some(primary) = flow.primary_pipeline().cloned() else {
            return Ok(());
        };
        if primary.nodes.is_empty() {
            return Ok(());
        }
        let mut ids: Vec<_> = picks
            .iter()
            .filter_map(|i| primary.nodes.get(i.index(primary.nodes.len())))
            .map(|n| n.id.clone())
            .collect();
        ids.sort();
        ids.dedup();

        let at_once = reduce(
            &flow,
            &Action::in_pipeline("p0", PipelineAction::DeleteObjects(ids.clone())),
        );
        let one_by_one = reduce(
            &flow,
            &Action::Batch(
                ids.iter()
                    .map(|id| Action::in_pipeline("p0", PipelineAction::DeleteNode(id.clone())))
                    .collect(),
            ),
        );
        prop_assert_eq!(at_once, one_by_one);
    }
}
