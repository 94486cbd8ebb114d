#![forbid(unsafe_code)]

//! Node ports and their cardinality ranges.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How many links a port accepts, written `"min:max"` with `N` for no upper
/// bound (e.g. `"0:1"`, `"1:N"`). Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cardinality {
    pub min: u32,
    /// `None` is unbounded.
    pub max: Option<u32>,
}

impl Cardinality {
    /// `0:1`
    pub const OPTIONAL_SINGLE: Self = Self {
        min: 0,
        max: Some(1),
    };
    /// `0:N`
    pub const UNBOUNDED: Self = Self { min: 0, max: None };

    #[must_use]
    pub const fn new(min: u32, max: Option<u32>) -> Self {
        Self { min, max }
    }

    /// Whether one more link fits on a port that already carries `existing`.
    #[must_use]
    pub fn accepts_another(&self, existing: usize) -> bool {
        match self.max {
            None => true,
            Some(max) => existing < max as usize,
        }
    }

    /// Whether `count` links satisfy the lower bound.
    #[must_use]
    pub fn is_satisfied_by(&self, count: usize) -> bool {
        count >= self.min as usize && self.max.is_none_or(|max| count <= max as usize)
    }
}

impl Default for Cardinality {
    fn default() -> Self {
        Self::UNBOUNDED
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "{}:{}", self.min, max),
            None => write!(f, "{}:N", self.min),
        }
    }
}

/// Why a cardinality string could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid cardinality '{0}', expected '<min>:<max|N>'")]
pub struct ParseCardinalityError(String);

impl FromStr for Cardinality {
    type Err = ParseCardinalityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseCardinalityError(s.to_string());
        let (min, max) = s.split_once(':').ok_or_else(err)?;
        let min: u32 = min.trim().parse().map_err(|_| err())?;
        let max = match max.trim() {
            "N" | "n" => None,
            bound => Some(bound.parse::<u32>().map_err(|_| err())?),
        };
        if max.is_some_and(|max| max < min) {
            return Err(err());
        }
        Ok(Self { min, max })
    }
}

impl TryFrom<String> for Cardinality {
    type Error = ParseCardinalityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Cardinality> for String {
    fn from(value: Cardinality) -> Self {
        value.to_string()
    }
}

/// An input or output port on a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Port {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub cardinality: Cardinality,
}

impl Port {
    #[must_use]
    pub fn new(id: impl Into<String>, cardinality: Cardinality) -> Self {
        Self {
            id: id.into(),
            label: None,
            cardinality,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}
