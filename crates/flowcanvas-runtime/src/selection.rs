#![forbid(unsafe_code)]

//! Selection tracking with delta notifications.
//!
//! The [`SelectionTracker`] holds the ids selected in one pipeline at a time
//! and tells a single observer what changed.
//!
//! # State machine
//!
//! ```text
//!            change + callback
//!   Idle ─────────────────────────► Notifying
//!    ▲                                  │
//!    │   callback returns; queued        │
//!    └── requests applied, maybe again ◄─┘
//! ```
//!
//! While the observer runs it cannot touch the tracker directly. It gets a
//! [`SelectionQueue`]; requests pushed there are applied after the callback
//! returns and produce a follow-up notification if they change anything.
//!
//! # Invariants
//!
//! 1. Selection never spans two pipelines. Selecting in pipeline B drops
//!    everything selected in pipeline A.
//! 2. Deltas are computed against the selection last reported to the
//!    observer, so any number of changes between two notifications collapse
//!    into one event.
//! 3. Deselected objects are resolved from the document as it was at the
//!    last notification. A deleted object therefore still shows up, with
//!    its last known contents, in `deselected_nodes`/`deselected_comments`.
//! 4. No event fires when the selected set is unchanged.

use std::collections::{HashSet, VecDeque};
use std::fmt;

use flowcanvas_core::query::forward_reachable;
use flowcanvas_core::{Comment, Link, Node, ObjectId, Pipeline, PipelineFlow, PipelineId};
use tracing::{info_span, trace, warn};

/// Follow-up rounds allowed before a re-entrant observer is cut off.
const MAX_NOTIFY_ROUNDS: usize = 16;

/// Selected ids and the pipeline they belong to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub pipeline_id: Option<PipelineId>,
    /// In selection order, without duplicates.
    pub ids: Vec<ObjectId>,
}

impl Selection {
    fn same_set(&self, other: &Selection) -> bool {
        // Empty is empty, whichever pipeline it was scoped to.
        if self.ids.is_empty() && other.ids.is_empty() {
            return true;
        }
        if self.pipeline_id != other.pipeline_id || self.ids.len() != other.ids.len() {
            return false;
        }
        let mine: HashSet<&ObjectId> = self.ids.iter().collect();
        other.ids.iter().all(|id| mine.contains(id))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|s| *s == id)
    }
}

/// A change to the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionRequest {
    /// Replace the selection wholesale.
    Set {
        pipeline_id: PipelineId,
        ids: Vec<ObjectId>,
    },
    /// Add `id` if absent, remove it if present. With `clear`, everything
    /// else is deselected first.
    Toggle {
        pipeline_id: PipelineId,
        id: ObjectId,
        clear: bool,
    },
    /// `id` plus everything reachable from it along links.
    SubGraph { pipeline_id: PipelineId, id: ObjectId },
    /// Every node, comment, and link of the pipeline.
    SelectAll { pipeline_id: PipelineId },
    Clear,
}

/// Requests an observer makes while it is being notified.
#[derive(Debug, Default)]
pub struct SelectionQueue {
    requests: Vec<SelectionRequest>,
}

impl SelectionQueue {
    pub fn push(&mut self, request: SelectionRequest) {
        self.requests.push(request);
    }

    pub fn set_selections(&mut self, pipeline_id: impl Into<PipelineId>, ids: Vec<ObjectId>) {
        self.push(SelectionRequest::Set {
            pipeline_id: pipeline_id.into(),
            ids,
        });
    }

    pub fn clear_selection(&mut self) {
        self.push(SelectionRequest::Clear);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

/// What the observer receives on every selection change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionChangeEvent {
    pub pipeline_id: Option<PipelineId>,
    pub selected_object_ids: Vec<ObjectId>,
    pub selected_nodes: Vec<Node>,
    pub selected_comments: Vec<Comment>,
    pub selected_links: Vec<Link>,
    pub added_nodes: Vec<Node>,
    pub added_comments: Vec<Comment>,
    pub deselected_nodes: Vec<Node>,
    pub deselected_comments: Vec<Comment>,
}

/// Observer callback.
pub type SelectionCallback = Box<dyn FnMut(&SelectionChangeEvent, &mut SelectionQueue)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    Idle,
    Notifying,
}

/// Current selection plus what was last reported.
pub struct SelectionTracker {
    state: TrackerState,
    current: Selection,
    notified: Selection,
    /// Document as of the last notification.
    notified_flow: Option<PipelineFlow>,
    callback: Option<SelectionCallback>,
    pending: VecDeque<SelectionRequest>,
    notifications: u64,
}

impl fmt::Debug for SelectionTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionTracker")
            .field("state", &self.state)
            .field("current", &self.current)
            .field("notified", &self.notified)
            .field("has_callback", &self.callback.is_some())
            .field("pending", &self.pending.len())
            .field("notifications", &self.notifications)
            .finish()
    }
}

impl Default for SelectionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionTracker {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: TrackerState::Idle,
            current: Selection::default(),
            notified: Selection::default(),
            notified_flow: None,
            callback: None,
            pending: VecDeque::new(),
            notifications: 0,
        }
    }

    /// Register the observer, replacing any previous one.
    pub fn set_callback(&mut self, callback: SelectionCallback) {
        self.callback = Some(callback);
    }

    pub fn clear_callback(&mut self) {
        self.callback = None;
    }

    #[must_use]
    pub fn state(&self) -> TrackerState {
        self.state
    }

    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.current
    }

    /// Number of events delivered so far.
    #[must_use]
    pub fn notification_count(&self) -> u64 {
        self.notifications
    }

    /// Change the current selection. Nothing is reported until
    /// [`notify`](Self::notify).
    ///
    /// Ids that do not exist in the pipeline are ignored; a request naming a
    /// missing pipeline clears the selection.
    pub fn apply(&mut self, request: SelectionRequest, flow: &PipelineFlow) {
        if self.state == TrackerState::Notifying {
            self.pending.push_back(request);
            return;
        }
        self.current = next_selection(&self.current, request, flow);
    }

    /// Drop ids that no longer exist in `flow`.
    pub fn prune(&mut self, flow: &PipelineFlow) {
        let Some(pipeline_id) = self.current.pipeline_id.as_ref() else {
            return;
        };
        match flow.pipeline(pipeline_id.as_str()) {
            Some(pipeline) => self.current.ids.retain(|id| pipeline.contains_object(id.as_str())),
            None => self.current = Selection::default(),
        }
    }

    /// Report the difference between the current selection and the last
    /// reported one, then apply whatever the observer queued.
    pub fn notify(&mut self, flow: &PipelineFlow) {
        if self.state == TrackerState::Notifying {
            return;
        }
        for _ in 0..MAX_NOTIFY_ROUNDS {
            while let Some(request) = self.pending.pop_front() {
                self.current = next_selection(&self.current, request, flow);
            }
            if self.current.same_set(&self.notified) {
                return;
            }

            let event = self.build_event(flow);
            self.notified = self.current.clone();
            self.notified_flow = Some(flow.clone());
            self.notifications += 1;

            let Some(mut callback) = self.callback.take() else {
                trace!(selected = event.selected_object_ids.len(), "selection changed without observer");
                return;
            };
            let mut queue = SelectionQueue::default();
            {
                let _span = info_span!(
                    "selection.notify",
                    pipeline = ?event.pipeline_id,
                    selected = event.selected_object_ids.len(),
                )
                .entered();
                trace!(
                    added_nodes = event.added_nodes.len(),
                    deselected_nodes = event.deselected_nodes.len(),
                    added_comments = event.added_comments.len(),
                    deselected_comments = event.deselected_comments.len(),
                    "notifying selection observer"
                );
                self.state = TrackerState::Notifying;
                callback(&event, &mut queue);
                self.state = TrackerState::Idle;
            }
            if self.callback.is_none() {
                self.callback = Some(callback);
            }
            self.pending.extend(queue.requests);
            if self.pending.is_empty() {
                return;
            }
        }
        warn!(
            rounds = MAX_NOTIFY_ROUNDS,
            dropped = self.pending.len(),
            "selection observer keeps changing the selection; dropping queued requests"
        );
        self.pending.clear();
    }

    fn build_event(&self, flow: &PipelineFlow) -> SelectionChangeEvent {
        let before = &self.notified;
        let after = &self.current;
        let same_scope = before.pipeline_id == after.pipeline_id;

        let old_pipeline = self
            .notified_flow
            .as_ref()
            .zip(before.pipeline_id.as_ref())
            .and_then(|(old, id)| old.pipeline(id.as_str()));
        let new_pipeline = after.pipeline_id.as_ref().and_then(|id| flow.pipeline(id.as_str()));

        let removed: Vec<&ObjectId> = before
            .ids
            .iter()
            .filter(|id| !same_scope || !after.contains(id.as_str()))
            .collect();
        let added: Vec<&ObjectId> = after
            .ids
            .iter()
            .filter(|id| !same_scope || !before.contains(id.as_str()))
            .collect();
        let current: Vec<&ObjectId> = after.ids.iter().collect();

        SelectionChangeEvent {
            pipeline_id: after.pipeline_id.clone(),
            selected_object_ids: after.ids.clone(),
            selected_nodes: resolve(new_pipeline, &current, |p, id| p.node(id)),
            selected_comments: resolve(new_pipeline, &current, |p, id| p.comment(id)),
            selected_links: resolve(new_pipeline, &current, |p, id| p.link(id)),
            added_nodes: resolve(new_pipeline, &added, |p, id| p.node(id)),
            added_comments: resolve(new_pipeline, &added, |p, id| p.comment(id)),
            deselected_nodes: resolve(old_pipeline, &removed, |p, id| p.node(id)),
            deselected_comments: resolve(old_pipeline, &removed, |p, id| p.comment(id)),
        }
    }
}

fn resolve<T: Clone>(
    pipeline: Option<&Pipeline>,
    ids: &[&ObjectId],
    lookup: impl for<'a> Fn(&'a Pipeline, &str) -> Option<&'a T>,
) -> Vec<T> {
    let Some(pipeline) = pipeline else {
        return Vec::new();
    };
    ids.iter()
        .filter_map(|id| lookup(pipeline, id.as_str()))
        .cloned()
        .collect()
}

fn existing_ids(pipeline: &Pipeline, ids: impl IntoIterator<Item = ObjectId>) -> Vec<ObjectId> {
    let mut seen = HashSet::new();
    ids.into_iter()
        .filter(|id| pipeline.contains_object(id.as_str()) && seen.insert(id.clone()))
        .collect()
}

fn next_selection(current: &Selection, request: SelectionRequest, flow: &PipelineFlow) -> Selection {
    let scoped = |pipeline_id: &PipelineId| flow.pipeline(pipeline_id.as_str());
    match request {
        SelectionRequest::Clear => Selection::default(),
        SelectionRequest::Set { pipeline_id, ids } => match scoped(&pipeline_id) {
            Some(pipeline) => Selection {
                ids: existing_ids(pipeline, ids),
                pipeline_id: Some(pipeline_id),
            },
            None => Selection::default(),
        },
        SelectionRequest::Toggle {
            pipeline_id,
            id,
            clear,
        } => {
            let Some(pipeline) = scoped(&pipeline_id) else {
                return Selection::default();
            };
            let mut ids = if current.pipeline_id.as_ref() == Some(&pipeline_id) {
                current.ids.clone()
            } else {
                Vec::new()
            };
            if clear {
                ids.retain(|s| *s == id);
            }
            if let Some(index) = ids.iter().position(|s| *s == id) {
                ids.remove(index);
            } else if pipeline.contains_object(id.as_str()) {
                ids.push(id);
            }
            Selection {
                pipeline_id: Some(pipeline_id),
                ids,
            }
        }
        SelectionRequest::SubGraph { pipeline_id, id } => match scoped(&pipeline_id) {
            Some(pipeline) => Selection {
                ids: forward_reachable(pipeline, id.as_str()),
                pipeline_id: Some(pipeline_id),
            },
            None => Selection::default(),
        },
        SelectionRequest::SelectAll { pipeline_id } => match scoped(&pipeline_id) {
            Some(pipeline) => Selection {
                ids: pipeline.object_ids(),
                pipeline_id: Some(pipeline_id),
            },
            None => Selection::default(),
        },
    }
}
