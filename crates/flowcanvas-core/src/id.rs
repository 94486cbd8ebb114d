#![forbid(unsafe_code)]

//! Identifiers and id allocation.
//!
//! Every pipeline and every object (node, comment, link) is addressed by an
//! opaque string id. The two newtypes keep pipeline ids and object ids from
//! being mixed up at call sites while serializing as bare strings.
//!
//! New ids are allocated through an [`IdGenerator`], which the object model
//! takes by injection so tests can use deterministic ids.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create an id from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the raw id.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

string_id!(
    /// Id of a [`Pipeline`](crate::Pipeline) within a pipeline flow.
    PipelineId
);

string_id!(
    /// Id of a node, comment, or link. Unique within its pipeline.
    ObjectId
);

/// What an id is being allocated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdKind {
    Node,
    Comment,
    Link,
    Pipeline,
    Flow,
}

impl IdKind {
    fn prefix(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Comment => "comment",
            Self::Link => "link",
            Self::Pipeline => "pipeline",
            Self::Flow => "flow",
        }
    }
}

/// Source of fresh ids.
pub trait IdGenerator {
    /// Produce an id that has not been handed out before.
    fn next_id(&mut self, kind: IdKind) -> String;

    /// Allocate an object id.
    fn object_id(&mut self, kind: IdKind) -> ObjectId {
        ObjectId::new(self.next_id(kind))
    }

    /// Allocate a pipeline id.
    fn pipeline_id(&mut self) -> PipelineId {
        PipelineId::new(self.next_id(IdKind::Pipeline))
    }
}

impl fmt::Debug for dyn IdGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IdGenerator")
    }
}

/// Random v4 UUIDs. The default generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&mut self, _kind: IdKind) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Deterministic `<kind>-<n>` ids with one shared counter.
#[derive(Debug, Clone, Default)]
pub struct SequentialIdGenerator {
    next: u64,
}

impl SequentialIdGenerator {
    /// Start counting at 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting after `start`.
    #[must_use]
    pub fn starting_after(start: u64) -> Self {
        Self { next: start }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&mut self, kind: IdKind) -> String {
        self.next += 1;
        format!("{}-{}", kind.prefix(), self.next)
    }
}
