#![forbid(unsafe_code)]

//! Link creation rules and link removal.

use flowcanvas_core::query::port_link_count;
use flowcanvas_core::{
    Action, ConstraintViolation, Link, LinkType, ModelError, ObjectId, Pipeline, PipelineAction,
    PortDirection,
};

use super::ObjectModel;
use super::supernode::RemovedObjects;
use crate::config::LinkRules;

impl ObjectModel {
    /// Add links, all or nothing.
    ///
    /// Each link is checked against the pipeline as it would be with the
    /// links before it in `links` already added, so two new links competing
    /// for a single-link port are rejected together.
    pub fn add_links(&mut self, pipeline_id: &str, links: Vec<Link>) -> Result<(), ModelError> {
        let mut working = self.require_pipeline(pipeline_id)?.clone();
        for link in &links {
            check_link(&working, link, &self.config.links)?;
            working.links.push_back(link.clone());
        }
        if links.is_empty() {
            return Ok(());
        }
        self.dispatch(Action::in_pipeline(pipeline_id, PipelineAction::AddLinks(links)));
        Ok(())
    }

    /// Check one link without adding it.
    pub fn can_add_link(&self, pipeline_id: &str, link: &Link) -> Result<(), ModelError> {
        check_link(self.require_pipeline(pipeline_id)?, link, &self.config.links)
    }

    pub fn delete_links(&mut self, pipeline_id: &str, ids: &[ObjectId]) -> Result<(), ModelError> {
        self.require_pipeline(pipeline_id)?;
        if ids.is_empty() {
            return Ok(());
        }
        self.dispatch(Action::in_pipeline(pipeline_id, PipelineAction::DeleteLinks(ids.to_vec())));
        Ok(())
    }

    pub fn delete_link(&mut self, pipeline_id: &str, link: &Link) -> Result<(), ModelError> {
        self.delete_links(pipeline_id, std::slice::from_ref(&link.id))
    }

    /// Every link with `id` as source or target.
    #[must_use]
    pub fn links_containing_id(&self, pipeline_id: &str, id: &str) -> Vec<Link> {
        self.flow
            .pipeline(pipeline_id)
            .map(|p| p.links_containing_id(id))
            .unwrap_or_default()
    }

    /// Links touching any of `ids`, with their positions in the pipeline.
    pub fn plan_disconnect(&self, pipeline_id: &str, ids: &[ObjectId]) -> Result<RemovedObjects, ModelError> {
        let pipeline = self.require_pipeline(pipeline_id)?;
        let links = pipeline
            .links
            .iter()
            .enumerate()
            .filter(|(_, l)| ids.iter().any(|id| l.touches(id.as_str())))
            .map(|(index, l)| (index, l.clone()))
            .collect();
        Ok(RemovedObjects::links_only(pipeline_id.into(), links))
    }

    /// The links named by `ids`, with their positions in the pipeline.
    /// Ids that are not links are skipped.
    pub fn plan_link_removal(&self, pipeline_id: &str, ids: &[ObjectId]) -> Result<RemovedObjects, ModelError> {
        let pipeline = self.require_pipeline(pipeline_id)?;
        let links = pipeline
            .links
            .iter()
            .enumerate()
            .filter(|(_, l)| ids.contains(&l.id))
            .map(|(index, l)| (index, l.clone()))
            .collect();
        Ok(RemovedObjects::links_only(pipeline_id.into(), links))
    }

    /// Remove every link touching any of `ids`. Returns what was removed.
    pub fn disconnect_nodes(&mut self, pipeline_id: &str, ids: &[ObjectId]) -> Result<RemovedObjects, ModelError> {
        let removed = self.plan_disconnect(pipeline_id, ids)?;
        self.apply_removal(&removed)?;
        Ok(removed)
    }
}

fn check_link(pipeline: &Pipeline, link: &Link, rules: &LinkRules) -> Result<(), ModelError> {
    if pipeline.contains_object(link.id.as_str()) {
        return Err(ModelError::DuplicateId {
            id: link.id.to_string(),
            pipeline_id: pipeline.id.clone(),
        });
    }
    for end in [&link.src_id, &link.trg_id] {
        if !pipeline.has_endpoint(end.as_str()) {
            return Err(ConstraintViolation::MissingEndpoint(end.clone()).into());
        }
    }

    let src_is_node = pipeline.node(link.src_id.as_str()).is_some();
    let trg_is_node = pipeline.node(link.trg_id.as_str()).is_some();
    let fits = match link.link_type {
        LinkType::NodeLink | LinkType::AssociationLink => src_is_node && trg_is_node,
        LinkType::CommentLink => !src_is_node && trg_is_node,
    };
    if !fits {
        return Err(ConstraintViolation::InvalidLinkEndpoints(format!(
            "{:?} from '{}' to '{}'",
            link.link_type, link.src_id, link.trg_id
        ))
        .into());
    }

    if link.src_id == link.trg_id && !rules.allow_self_links {
        return Err(ConstraintViolation::SelfLink(link.src_id.clone()).into());
    }
    if !rules.allow_duplicate_links && pipeline.links.iter().any(|l| l.connects_same_as(link)) {
        return Err(ConstraintViolation::DuplicateLink {
            src_id: link.src_id.clone(),
            trg_id: link.trg_id.clone(),
        }
        .into());
    }

    if link.link_type == LinkType::NodeLink {
        check_port(pipeline, &link.src_id, PortDirection::Output, link.src_port_id.as_deref())?;
        check_port(pipeline, &link.trg_id, PortDirection::Input, link.trg_port_id.as_deref())?;
    }
    Ok(())
}

fn check_port(
    pipeline: &Pipeline,
    node_id: &ObjectId,
    direction: PortDirection,
    port_id: Option<&str>,
) -> Result<(), ConstraintViolation> {
    let Some(node) = pipeline.node(node_id.as_str()) else {
        return Err(ConstraintViolation::MissingEndpoint(node_id.clone()));
    };
    if node.ports(direction).is_empty() {
        return Ok(());
    }
    let Some(port) = node.resolve_port(direction, port_id) else {
        return Err(ConstraintViolation::UnknownPort {
            node_id: node_id.clone(),
            port_id: port_id.unwrap_or_default().to_string(),
            direction,
        });
    };
    let existing = port_link_count(pipeline, node_id.as_str(), direction, &port.id);
    match port.cardinality.max {
        Some(max) if !port.cardinality.accepts_another(existing) => Err(ConstraintViolation::CardinalityExceeded {
            node_id: node_id.clone(),
            port_id: port.id.clone(),
            direction,
            existing,
            max,
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use flowcanvas_core::{Cardinality, Comment, Node, Port};

    use super::*;
    use crate::config::EditorConfig;
    use flowcanvas_core::PipelineFlow;

    fn single(id: &str) -> Vec<Port> {
        vec![Port::new(id, Cardinality::OPTIONAL_SINGLE)]
    }

    fn model() -> ObjectModel {
        let pipeline = Pipeline::new("p1")
            .with_nodes([
                Node::new("a").with_outputs(single("out")),
                Node::new("b").with_inputs(single("in")),
                Node::new("c").with_outputs(vec![Port::new("out", Cardinality::UNBOUNDED)]),
                Node::new("free"),
            ])
            .with_comments([Comment::new("note", "hi")]);
        let mut flow = PipelineFlow::new("f", "p1");
        flow.pipelines = im::Vector::unit(pipeline);
        ObjectModel::new(flow)
    }

    fn link(id: &str, src: &str, trg: &str) -> Link {
        Link::node_link(id, src, None, trg, None)
    }

    #[test]
    fn second_link_on_single_port_is_rejected() {
        let mut model = model();
        model.add_links("p1", vec![link("l1", "a", "b")]).unwrap();
        let err = model.add_links("p1", vec![link("l2", "c", "b")]).unwrap_err();
        assert!(matches!(
            err,
            ModelError::Constraint(ConstraintViolation::CardinalityExceeded { existing: 1, max: 1, .. })
        ));
        assert_eq!(model.links("p1").len(), 1);
    }

    #[test]
    fn links_in_one_call_count_against_each_other() {
        let mut model = model();
        let err = model
            .add_links("p1", vec![link("l1", "a", "free"), link("l2", "c", "b"), link("l3", "a", "b")])
            .unwrap_err();
        assert!(err.is_constraint());
        assert!(model.links("p1").is_empty());
    }

    #[test]
    fn unconstrained_and_unknown_ports() {
        let mut model = model();
        // `free` declares no ports, so nothing limits links into it.
        model
            .add_links("p1", vec![link("l1", "c", "free"), link("l2", "a", "free")])
            .unwrap();
        assert!(matches!(
            model.can_add_link("p1", &link("l3", "c", "free")),
            Err(ModelError::Constraint(ConstraintViolation::DuplicateLink { .. }))
        ));

        let mut lenient = ObjectModel::with_config(
            model.pipeline_flow(),
            EditorConfig {
                links: LinkRules {
                    allow_duplicate_links: true,
                    allow_self_links: false,
                },
                ..EditorConfig::default()
            },
        );
        lenient.add_links("p1", vec![link("l3", "c", "free")]).unwrap();
        assert_eq!(lenient.links("p1").len(), 3);

        let named = Link::node_link("l9", "c", Some("nope"), "b", None);
        assert!(matches!(
            model.can_add_link("p1", &named),
            Err(ModelError::Constraint(ConstraintViolation::UnknownPort { .. }))
        ));
    }

    #[test]
    fn link_shape_rules() {
        let model = model();
        assert!(matches!(
            model.can_add_link("p1", &link("l1", "free", "free")),
            Err(ModelError::Constraint(ConstraintViolation::SelfLink(_)))
        ));
        assert!(matches!(
            model.can_add_link("p1", &link("l1", "note", "free")),
            Err(ModelError::Constraint(ConstraintViolation::InvalidLinkEndpoints(_)))
        ));
        assert!(model.can_add_link("p1", &Link::comment_link("l1", "note", "free")).is_ok());
        assert!(matches!(
            model.can_add_link("p1", &Link::comment_link("l1", "free", "note")),
            Err(ModelError::Constraint(ConstraintViolation::InvalidLinkEndpoints(_)))
        ));
        assert!(matches!(
            model.can_add_link("p1", &link("l1", "a", "ghost")),
            Err(ModelError::Constraint(ConstraintViolation::MissingEndpoint(_)))
        ));
    }

    #[test]
    fn disconnect_returns_removed_links_in_order() {
        let mut model = model();
        model
            .add_links(
                "p1",
                vec![
                    link("l1", "a", "b"),
                    link("l2", "c", "free"),
                    Link::comment_link("l3", "note", "free"),
                ],
            )
            .unwrap();
        let removed = model.disconnect_nodes("p1", &["free".into()]).unwrap();
        let ids: Vec<_> = removed.links.iter().map(|(i, l)| (*i, l.id.as_str())).collect();
        assert_eq!(ids, vec![(1, "l2"), (2, "l3")]);
        assert_eq!(model.links("p1").len(), 1);
        assert_eq!(model.links_containing_id("p1", "a").len(), 1);
    }
}
