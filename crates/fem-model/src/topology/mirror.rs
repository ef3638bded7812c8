//! Mirrored copies of elements.
//!
//! Reflecting coordinates flips the winding of every face and solid, so each
//! copy's corners are re-ordered through a permutation keyed by the linear
//! family and the mirror plane. Every permutation is its own inverse, which
//! makes mirroring twice about one plane restore both coordinates and order.
//! Mid-edge nodes are placed on the permuted corners' edges.

use std::collections::BTreeMap;

use log::debug;

use crate::error::Result;
use crate::family::ElementFamily;
use crate::geometry::{self, Plane};
use crate::mesh::{BeamOrientation, Element, Mesh, Node};

use super::{BatchReport, sorted_selection};

const IDENTITY_LINE: &[usize] = &[0, 1];
const TRI_FLIP: &[usize] = &[0, 2, 1];
const QUAD_FLIP_X: &[usize] = &[1, 0, 3, 2];
const QUAD_FLIP_Y: &[usize] = &[3, 2, 1, 0];
const TET_FLIP: &[usize] = &[0, 2, 1, 3];
const HEX_FLIP_X: &[usize] = &[1, 0, 3, 2, 5, 4, 7, 6];
const HEX_FLIP_Y: &[usize] = &[3, 2, 1, 0, 7, 6, 5, 4];
const HEX_FLIP_Z: &[usize] = &[4, 5, 6, 7, 0, 1, 2, 3];

/// Corner permutation for a mirrored copy; `None` when the copy would be
/// degenerate (a planar family reflected through its own plane).
fn corner_permutation(family: ElementFamily, plane: Plane) -> Option<&'static [usize]> {
    if family.is_planar() && plane == Plane::XY {
        return None;
    }
    let perm = match (family.linear(), plane) {
        (ElementFamily::Tri3N, _) => TRI_FLIP,
        (ElementFamily::Quad4N, Plane::YZ) => QUAD_FLIP_X,
        (ElementFamily::Quad4N, _) => QUAD_FLIP_Y,
        (ElementFamily::Tet4N, _) => TET_FLIP,
        (ElementFamily::Hex8N, Plane::YZ) => HEX_FLIP_X,
        (ElementFamily::Hex8N, Plane::XZ) => HEX_FLIP_Y,
        (ElementFamily::Hex8N, Plane::XY) => HEX_FLIP_Z,
        _ => IDENTITY_LINE,
    };
    Some(perm)
}

/// Slot order of the mirrored copy: `out[i]` is the source slot feeding slot `i`.
fn slot_order(family: ElementFamily, perm: &[usize]) -> Option<Vec<usize>> {
    let mut order = perm.to_vec();
    for &(a, b) in family.mid_edges() {
        order.push(family.mid_slot(perm[a], perm[b])?);
    }
    Some(order)
}

/// Adds a mirrored copy of each selected element. Referenced nodes are copied
/// once with the coordinate normal to `plane` negated.
pub fn mirror_copy_elements(mesh: &mut Mesh, ids: &[i32], plane: Plane) -> Result<BatchReport> {
    mesh.require_elements(ids)?;
    let mut report = BatchReport::default();

    let mut plans = Vec::new();
    for id in sorted_selection(ids) {
        let family = mesh.elements[&id].family;
        match corner_permutation(family, plane).and_then(|perm| slot_order(family, perm)) {
            Some(order) => plans.push((id, order)),
            None => report.skip(
                "mirror",
                id,
                format!("{family} cannot be mirrored about {plane:?}"),
            ),
        }
    }

    let mut copies: BTreeMap<i32, i32> = BTreeMap::new();
    for (id, _) in &plans {
        for node in &mesh.elements[id].nodes {
            copies.entry(*node).or_insert(0);
        }
    }
    for (old, new) in copies.iter_mut() {
        let p = geometry::mirror(mesh.coords(*old)?, plane);
        *new = mesh.next_node_id();
        mesh.add_node(Node::at(*new, p))?;
        report.created_nodes.push(*new);
    }

    for (id, order) in plans {
        let source = mesh.elements[&id].clone();
        let nodes: Vec<i32> = order.iter().map(|&slot| copies[&source.nodes[slot]]).collect();
        let orientation = match &source.orientation {
            Some(frame) => {
                let axis = geometry::sub(mesh.coords(nodes[1])?, mesh.coords(nodes[0])?);
                BeamOrientation::from_axis(axis, geometry::mirror(frame.y_vec, plane))
            }
            None => None,
        };
        let element = Element {
            id: mesh.next_element_id(),
            nodes,
            orientation,
            ..source
        };
        report.created_elements.push(element.id);
        mesh.add_element(element)?;
    }
    debug!(
        "mirror about {plane:?}: {} elements, {} skipped",
        report.created_elements.len(),
        report.skipped.len()
    );
    Ok(report)
}
