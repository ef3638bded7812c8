//! Mutating operations on a mesh's nodes and elements.
//!
//! Every operation validates its whole selection before touching the mesh.
//! Batch operations may still skip individual elements (a degenerate mirror,
//! an extrusion with no leading face); those are logged, listed in the
//! returned [`BatchReport`], and the rest of the batch proceeds.

pub mod convert;
pub mod extrude;
pub mod fuse;
pub mod mirror;
pub mod renumber;
pub mod split;
pub mod transform;

use log::warn;

pub use convert::convert_elements;
pub use extrude::{ExtrudeParams, extrude_elements};
pub use fuse::{FuseReport, fuse_nodes};
pub use mirror::mirror_copy_elements;
pub use renumber::{renumber_elements, renumber_nodes};
pub use split::{parse_divisions, split_beams};
pub use transform::{
    copy_elements, copy_nodes, move_elements, move_nodes, rotate_elements, rotate_nodes,
    set_beam_orientation,
};

/// An element a batch operation left alone, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub element: i32,
    pub reason: String,
}

/// Ids created by a batch operation plus the elements it skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub created_nodes: Vec<i32>,
    pub created_elements: Vec<i32>,
    pub skipped: Vec<Skipped>,
}

impl BatchReport {
    pub(crate) fn skip(&mut self, operation: &str, element: i32, reason: impl Into<String>) {
        let reason = reason.into();
        warn!("{operation}: skipping element {element}: {reason}");
        self.skipped.push(Skipped { element, reason });
    }

    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }

    pub(crate) fn absorb(&mut self, other: BatchReport) {
        self.created_nodes.extend(other.created_nodes);
        self.created_elements.extend(other.created_elements);
        self.skipped.extend(other.skipped);
    }
}

/// Sorted, deduplicated copy of a selection.
pub(crate) fn sorted_selection(ids: &[i32]) -> Vec<i32> {
    let mut out = ids.to_vec();
    out.sort_unstable();
    out.dedup();
    out
}
