//! Rigid copies and in-place moves of nodes and elements.

use std::collections::BTreeMap;

use crate::error::{ModelError, Result};
use crate::geometry::{self, Point};
use crate::mesh::{BeamOrientation, Element, Mesh, Node};

use super::{BatchReport, sorted_selection};

/// Copies nodes shifted by `offset`. New ids start above the current maximum
/// and follow the ascending order of the originals. Returns old -> new.
pub fn copy_nodes(mesh: &mut Mesh, ids: &[i32], offset: Point) -> Result<BTreeMap<i32, i32>> {
    mesh.require_nodes(ids)?;
    let mut map = BTreeMap::new();
    for old in sorted_selection(ids) {
        let p = geometry::add(mesh.coords(old)?, offset);
        let new = mesh.next_node_id();
        mesh.add_node(Node::at(new, p))?;
        map.insert(old, new);
    }
    Ok(map)
}

/// Referenced nodes of the selected elements, each listed once.
fn referenced_nodes(mesh: &Mesh, elements: &[i32]) -> Vec<i32> {
    let mut nodes: Vec<i32> = elements
        .iter()
        .filter_map(|id| mesh.elements.get(id))
        .flat_map(|e| e.nodes.iter().copied())
        .collect();
    nodes.sort_unstable();
    nodes.dedup();
    nodes
}

/// Copies elements shifted by `offset`. Nodes shared between selected
/// elements are copied once and shared by the copies.
pub fn copy_elements(mesh: &mut Mesh, ids: &[i32], offset: Point) -> Result<BatchReport> {
    mesh.require_elements(ids)?;
    let selection = sorted_selection(ids);
    let node_map = copy_nodes(mesh, &referenced_nodes(mesh, &selection), offset)?;

    let mut report = BatchReport {
        created_nodes: node_map.values().copied().collect(),
        ..BatchReport::default()
    };
    for old in selection {
        let source = mesh.elements[&old].clone();
        let element = Element {
            id: mesh.next_element_id(),
            nodes: source.nodes.iter().map(|n| node_map[n]).collect(),
            ..source
        };
        report.created_elements.push(element.id);
        mesh.add_element(element)?;
    }
    Ok(report)
}

pub fn move_nodes(mesh: &mut Mesh, ids: &[i32], offset: Point) -> Result<()> {
    mesh.require_nodes(ids)?;
    for id in sorted_selection(ids) {
        if let Some(node) = mesh.nodes.get_mut(&id) {
            node.set_coords(geometry::add(node.coords(), offset));
        }
    }
    Ok(())
}

/// Rotates nodes by `angle` radians about the line through `origin` along `axis`.
pub fn rotate_nodes(
    mesh: &mut Mesh,
    ids: &[i32],
    origin: Point,
    axis: Point,
    angle: f64,
) -> Result<()> {
    mesh.require_nodes(ids)?;
    if geometry::normalize(axis).is_none() {
        return Err(ModelError::InvalidParameter("rotation axis is zero".to_string()));
    }
    for id in sorted_selection(ids) {
        if let Some(node) = mesh.nodes.get_mut(&id) {
            node.set_coords(geometry::rotate_about_axis(node.coords(), origin, axis, angle));
        }
    }
    Ok(())
}

/// Moves every node the selected elements reference, each exactly once.
pub fn move_elements(mesh: &mut Mesh, ids: &[i32], offset: Point) -> Result<()> {
    mesh.require_elements(ids)?;
    let nodes = referenced_nodes(mesh, ids);
    move_nodes(mesh, &nodes, offset)
}

/// Rotates the selected elements; beam frames turn with them.
pub fn rotate_elements(
    mesh: &mut Mesh,
    ids: &[i32],
    origin: Point,
    axis: Point,
    angle: f64,
) -> Result<()> {
    mesh.require_elements(ids)?;
    let nodes = referenced_nodes(mesh, ids);
    rotate_nodes(mesh, &nodes, origin, axis, angle)?;
    let turn = |v: Point| geometry::rotate_about_axis(v, [0.0; 3], axis, angle);
    for id in sorted_selection(ids) {
        if let Some(frame) = mesh.elements.get_mut(&id).and_then(|e| e.orientation.as_mut()) {
            frame.x_vec = turn(frame.x_vec);
            frame.y_vec = turn(frame.y_vec);
            frame.z_vec = turn(frame.z_vec);
        }
    }
    Ok(())
}

/// Sets the local frame of a beam: x runs from the first node to the second,
/// `y_hint` is made orthogonal to it and z completes the right-handed frame.
pub fn set_beam_orientation(mesh: &mut Mesh, element: i32, y_hint: Point) -> Result<()> {
    let target = mesh
        .get_element(element)
        .ok_or(ModelError::UnknownElement(element))?;
    if !target.family.is_beam() {
        return Err(ModelError::NotABeam(element));
    }
    let axis = geometry::sub(mesh.coords(target.nodes[1])?, mesh.coords(target.nodes[0])?);
    let frame = BeamOrientation::from_axis(axis, y_hint).ok_or_else(|| {
        ModelError::InvalidParameter(format!(
            "y vector {y_hint:?} is parallel to beam {element} or the beam has zero length"
        ))
    })?;
    if let Some(target) = mesh.elements.get_mut(&element) {
        target.orientation = Some(frame);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::family::ElementFamily;

    fn two_quads() -> Mesh {
        let mut mesh = Mesh::new("strip");
        let coords = [
            (1, 0.0, 0.0),
            (2, 1.0, 0.0),
            (3, 2.0, 0.0),
            (4, 2.0, 1.0),
            (5, 1.0, 1.0),
            (6, 0.0, 1.0),
        ];
        for (id, x, y) in coords {
            mesh.create_node(id, x, y, 0.0).unwrap();
        }
        mesh.create_element(1, ElementFamily::Quad4N, vec![1, 2, 5, 6]).unwrap();
        mesh.create_element(2, ElementFamily::Quad4N, vec![2, 3, 4, 5]).unwrap();
        mesh
    }

    #[test]
    fn copy_nodes_allocates_above_maximum() {
        let mut mesh = two_quads();
        let map = copy_nodes(&mut mesh, &[3, 1], [0.0, 0.0, 5.0]).unwrap();
        assert_eq!(map.get(&1), Some(&7));
        assert_eq!(map.get(&3), Some(&8));
        assert_eq!(mesh.coords(8).unwrap(), [2.0, 0.0, 5.0]);
    }

    #[test]
    fn copy_elements_shares_copied_nodes() {
        let mut mesh = two_quads();
        let report = copy_elements(&mut mesh, &[1, 2], [0.0, 2.0, 0.0]).unwrap();
        assert_eq!(report.created_nodes.len(), 6);
        assert_eq!(report.created_elements, vec![3, 4]);
        let a = &mesh.elements[&3];
        let b = &mesh.elements[&4];
        assert_eq!(a.nodes[1], b.nodes[0]);
        assert_eq!(a.nodes[2], b.nodes[3]);
        assert_eq!(mesh.coords(a.nodes[0]).unwrap(), [0.0, 2.0, 0.0]);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn move_elements_moves_shared_nodes_once() {
        let mut mesh = two_quads();
        move_elements(&mut mesh, &[1, 2], [1.0, 0.0, 0.0]).unwrap();
        assert_eq!(mesh.coords(2).unwrap(), [2.0, 0.0, 0.0]);
        assert_eq!(mesh.coords(3).unwrap(), [3.0, 0.0, 0.0]);
    }

    #[test]
    fn rotate_nodes_about_z() {
        let mut mesh = two_quads();
        rotate_nodes(&mut mesh, &[2], [0.0; 3], [0.0, 0.0, 1.0], std::f64::consts::FRAC_PI_2)
            .unwrap();
        let p = mesh.coords(2).unwrap();
        assert!(p[0].abs() < 1e-12 && (p[1] - 1.0).abs() < 1e-12);
        assert!(rotate_nodes(&mut mesh, &[2], [0.0; 3], [0.0; 3], 1.0).is_err());
    }

    #[test]
    fn beam_orientation_needs_beam() {
        let mut mesh = two_quads();
        mesh.create_element(3, ElementFamily::Beam2N, vec![1, 2]).unwrap();
        assert_eq!(
            set_beam_orientation(&mut mesh, 1, [0.0, 1.0, 0.0]),
            Err(ModelError::NotABeam(1))
        );
        set_beam_orientation(&mut mesh, 3, [0.0, 0.0, 1.0]).unwrap();
        let frame = mesh.elements[&3].orientation.clone().unwrap();
        assert_eq!(frame.x_vec, [1.0, 0.0, 0.0]);
        assert_eq!(frame.z_vec, [0.0, -1.0, 0.0]);
        assert_eq!(frame.length, 1.0);
    }
}
