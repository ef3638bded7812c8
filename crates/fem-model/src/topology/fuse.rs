//! Merging of coincident nodes.

use std::collections::BTreeMap;

use log::{debug, warn};
use rayon::prelude::*;

use crate::error::{ModelError, Result};
use crate::geometry;
use crate::mesh::Mesh;

use super::sorted_selection;

/// Outcome of a fuse: which nodes were merged into which, and which
/// element/pair combinations were refused because they would collapse an
/// element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FuseReport {
    /// Removed node -> node that replaced it
    pub merged: BTreeMap<i32, i32>,
    /// `ModelError::DegenerateFuse` entries, one per refused element
    pub refused: Vec<ModelError>,
}

/// Pairs of selected nodes no further apart than `tolerance`, ascending.
fn candidate_pairs(mesh: &Mesh, ids: &[i32], tolerance: f64) -> Result<Vec<(i32, i32)>> {
    let points = ids
        .iter()
        .map(|&id| mesh.coords(id))
        .collect::<Result<Vec<_>>>()?;
    let mut pairs: Vec<(i32, i32)> = (0..ids.len())
        .into_par_iter()
        .flat_map_iter(|i| {
            let points = &points;
            (i + 1..ids.len())
                .filter(move |&j| geometry::distance(points[i], points[j]) <= tolerance)
                .map(move |j| (ids[i], ids[j]))
        })
        .collect();
    pairs.sort_unstable();
    Ok(pairs)
}

/// Fuses selected nodes that lie within `tolerance` of each other.
///
/// Pairs are handled in ascending order and resolved through earlier merges.
/// Elements referencing the higher id are re-pointed to the lower one unless
/// they already reference it; a node no element references afterwards is
/// removed.
pub fn fuse_nodes(mesh: &mut Mesh, ids: &[i32], tolerance: f64) -> Result<FuseReport> {
    mesh.require_nodes(ids)?;
    if !(tolerance >= 0.0) {
        return Err(ModelError::InvalidParameter(format!(
            "fuse tolerance must be non-negative, got {tolerance}"
        )));
    }
    let selection = sorted_selection(ids);
    let pairs = candidate_pairs(mesh, &selection, tolerance)?;
    debug!("fuse: {} candidate pairs among {} nodes", pairs.len(), selection.len());

    let mut report = FuseReport::default();
    let resolve = |merged: &BTreeMap<i32, i32>, mut id: i32| {
        while let Some(&next) = merged.get(&id) {
            id = next;
        }
        id
    };

    for (a, b) in pairs {
        let (a, b) = (resolve(&report.merged, a), resolve(&report.merged, b));
        if a == b {
            continue;
        }
        let (kept, dropped) = (a.min(b), a.max(b));
        for element in mesh.elements.values_mut() {
            if !element.references(dropped) {
                continue;
            }
            if element.references(kept) {
                let refusal = ModelError::DegenerateFuse {
                    element: element.id,
                    kept,
                    dropped,
                };
                warn!("{refusal}");
                report.refused.push(refusal);
                continue;
            }
            for node in element.nodes.iter_mut() {
                if *node == dropped {
                    *node = kept;
                }
            }
        }
        if !mesh.remove_unreferenced([dropped]).is_empty() {
            report.merged.insert(dropped, kept);
        }
    }
    Ok(report)
}
