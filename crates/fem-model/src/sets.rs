//! Node sets and element sets for grouping entities.
//!
//! Sets are global to the model and keyed by integer id. Members are ids into
//! whichever mesh consumes the set.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Elementset collecting elements that no explicit elementset covers.
pub const DEFAULT_ELEMENTSET: i32 = 999;

/// A numbered set of nodes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Nodeset {
    pub id: i32,
    pub nodes: BTreeSet<i32>,
}

impl Nodeset {
    pub fn new(id: i32, nodes: impl IntoIterator<Item = i32>) -> Self {
        Self {
            id,
            nodes: nodes.into_iter().collect(),
        }
    }
}

/// A numbered set of elements
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Elementset {
    pub id: i32,
    pub elements: BTreeSet<i32>,
}

impl Elementset {
    pub fn new(id: i32, elements: impl IntoIterator<Item = i32>) -> Self {
        Self {
            id,
            elements: elements.into_iter().collect(),
        }
    }
}

/// Rewrites set members through `map`; members missing from the map are kept.
pub(crate) fn remap_members(members: &mut BTreeSet<i32>, map: &BTreeMap<i32, i32>) {
    if members.iter().any(|m| map.contains_key(m)) {
        *members = members
            .iter()
            .map(|m| map.get(m).copied().unwrap_or(*m))
            .collect();
    }
}
