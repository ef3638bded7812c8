//! Extrusion of elements along a direction or around an orbit axis.
//!
//! Two modes share one pass loop:
//!
//! - stacking: the target family equals the source family (line families,
//!   QUAD4N, HEX8N). The element's leading nodes are copied forward and a new
//!   element is built on the old leading face and its copy.
//! - sweeping: the target is one dimension up (planar lines to QUAD4N, QUAD4N
//!   to HEX8N). Every node is copied and the new element spans both layers.
//!
//! With a non-zero angle each copy is rotated about an orbit axis instead of
//! translated, and the direction turns with every pass so that repeated passes
//! follow an arc. Outputs of one pass are the inputs of the next; copied nodes
//! are shared within a pass. A direction parallel to the axis extrudes nothing,
//! whatever the angle.

use std::collections::HashMap;

use log::debug;

use crate::error::{ModelError, Result};
use crate::family::ElementFamily;
use crate::geometry::{self, Point};
use crate::mesh::{BeamOrientation, Element, Mesh, Node};

use super::{BatchReport, sorted_selection};

#[derive(Debug, Clone, PartialEq)]
pub struct ExtrudeParams {
    /// Extrusion direction. Stacking uses only its sense; sweeping moves the
    /// copied layer by the full vector.
    pub direction: Point,
    /// Rotation per pass in radians; zero extrudes straight
    pub angle: f64,
    pub axis: Point,
    /// Distance from the first element's centroid to the orbit axis
    pub axis_radius: f64,
    pub count: usize,
    /// Family of the new elements; `None` stacks the source family
    pub target: Option<ElementFamily>,
}

impl Default for ExtrudeParams {
    fn default() -> Self {
        Self {
            direction: [1.0, 0.0, 0.0],
            angle: 0.0,
            axis: [0.0, 0.0, 1.0],
            axis_radius: 0.0,
            count: 1,
            target: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Stack,
    Sweep,
}

fn plan_step(family: ElementFamily, target: ElementFamily) -> Option<Step> {
    if family == target {
        let stackable =
            family.is_line() || matches!(family, ElementFamily::Quad4N | ElementFamily::Hex8N);
        return stackable.then_some(Step::Stack);
    }
    match (family, target) {
        (ElementFamily::Rod2N2D | ElementFamily::Beam2N2D, ElementFamily::Quad4N)
        | (ElementFamily::Quad4N, ElementFamily::Hex8N) => Some(Step::Sweep),
        _ => None,
    }
}

struct Orbit {
    origin: Point,
    axis: Point,
    angle: f64,
}

impl Orbit {
    fn turn(&self, p: Point) -> Point {
        geometry::rotate_about_axis(p, self.origin, self.axis, self.angle)
    }

    fn turn_vector(&self, v: Point) -> Point {
        geometry::rotate_about_axis(v, [0.0; 3], self.axis, self.angle)
    }
}

/// Pairs each trailing corner with the leading corner it shares an edge
/// with. Returns `(trailing, leading)` slot pairs, or `None` when the
/// element has no clean leading face along `dir`.
fn pair_faces(family: ElementFamily, coords: &[Point], dir: Point) -> Option<Vec<(usize, usize)>> {
    let c = geometry::centroid(coords);
    let size = coords
        .iter()
        .map(|p| geometry::distance(*p, c))
        .fold(0.0, f64::max);
    let tol = 1e-9 * size.max(geometry::EPSILON);
    let leading: Vec<bool> = coords
        .iter()
        .map(|p| geometry::dot(geometry::sub(*p, c), dir) > tol)
        .collect();
    if leading.iter().filter(|l| **l).count() * 2 != coords.len() {
        return None;
    }

    let trailing: Vec<usize> = (0..coords.len()).filter(|i| !leading[*i]).collect();
    let candidates: Vec<Vec<usize>> = trailing
        .iter()
        .map(|&i| {
            family
                .corner_neighbours(i)
                .into_iter()
                .filter(|j| leading[*j])
                .collect()
        })
        .collect();

    // A leading corner is an edge-neighbour of up to three trailing ones;
    // settle the unambiguous ones first and repeat.
    let mut partner: Vec<Option<usize>> = vec![None; trailing.len()];
    let mut taken = vec![false; coords.len()];
    loop {
        let mut progress = false;
        for (k, options) in candidates.iter().enumerate() {
            if partner[k].is_some() {
                continue;
            }
            let free: Vec<usize> = options.iter().copied().filter(|j| !taken[*j]).collect();
            match free.as_slice() {
                [] => return None,
                [only] => {
                    partner[k] = Some(*only);
                    taken[*only] = true;
                    progress = true;
                }
                _ => {}
            }
        }
        if !progress {
            break;
        }
    }
    trailing
        .iter()
        .zip(partner)
        .map(|(&i, j)| j.map(|j| (i, j)))
        .collect()
}

/// Extrudes the selected elements `params.count` times.
pub fn extrude_elements(
    mesh: &mut Mesh,
    ids: &[i32],
    params: &ExtrudeParams,
) -> Result<BatchReport> {
    mesh.require_elements(ids)?;
    let mut direction = params.direction;
    if geometry::normalize(direction).is_none() {
        return Err(ModelError::InvalidParameter(
            "extrude direction is zero".to_string(),
        ));
    }
    let mut report = BatchReport::default();
    let selection = sorted_selection(ids);
    let Some(&first) = selection.first() else {
        return Ok(report);
    };

    if geometry::parallel(direction, params.axis) {
        debug!("extrude: direction parallel to the rotation axis, nothing to do");
        return Ok(report);
    }

    let orbit = if params.angle != 0.0 {
        let c = geometry::centroid(&mesh.element_coords(&mesh.elements[&first])?);
        let Some(outward) = geometry::normalize(geometry::cross(direction, params.axis)) else {
            return Ok(report);
        };
        Some(Orbit {
            origin: geometry::sub(c, geometry::scale(outward, params.axis_radius)),
            axis: params.axis,
            angle: params.angle,
        })
    } else {
        None
    };

    let mut current = selection;
    for pass in 0..params.count {
        let mut copies: HashMap<i32, i32> = HashMap::new();
        let mut produced = Vec::new();
        for id in current {
            let source = mesh.elements[&id].clone();
            let target = params.target.unwrap_or(source.family);
            let Some(step) = plan_step(source.family, target) else {
                report.skip(
                    "extrude",
                    id,
                    format!("no extrusion from {} to {target}", source.family),
                );
                continue;
            };
            let coords = mesh.element_coords(&source)?;
            let built = match step {
                Step::Stack => stack(
                    mesh,
                    &source,
                    &coords,
                    direction,
                    orbit.as_ref(),
                    &mut copies,
                    &mut report,
                )?,
                Step::Sweep => Some(sweep(
                    mesh,
                    &source,
                    &coords,
                    target,
                    direction,
                    orbit.as_ref(),
                    &mut copies,
                    &mut report,
                )?),
            };
            let Some(element) = built else {
                report.skip("extrude", id, "no leading face along the direction");
                continue;
            };
            produced.push(element.id);
            report.created_elements.push(element.id);
            mesh.add_element(element)?;
        }
        debug!("extrude pass {}: {} elements", pass + 1, produced.len());
        current = produced;
        if let Some(orbit) = &orbit {
            direction = orbit.turn_vector(direction);
        }
    }
    Ok(report)
}

/// Copy of `node` for this pass, created on first use.
fn copy_of(
    mesh: &mut Mesh,
    copies: &mut HashMap<i32, i32>,
    report: &mut BatchReport,
    node: i32,
    place: impl FnOnce(Point) -> Point,
) -> Result<i32> {
    if let Some(&copy) = copies.get(&node) {
        return Ok(copy);
    }
    let p = place(mesh.coords(node)?);
    let id = mesh.next_node_id();
    mesh.add_node(Node::at(id, p))?;
    copies.insert(node, id);
    report.created_nodes.push(id);
    Ok(id)
}

fn stack(
    mesh: &mut Mesh,
    source: &Element,
    coords: &[Point],
    direction: Point,
    orbit: Option<&Orbit>,
    copies: &mut HashMap<i32, i32>,
    report: &mut BatchReport,
) -> Result<Option<Element>> {
    let Some(unit) = geometry::normalize(direction) else {
        return Ok(None);
    };
    let Some(pairs) = pair_faces(source.family, coords, unit) else {
        return Ok(None);
    };
    let length = pairs
        .iter()
        .map(|&(i, j)| geometry::distance(coords[i], coords[j]))
        .sum::<f64>()
        / pairs.len() as f64;
    let offset = geometry::scale(unit, length);

    let mut nodes = source.nodes.clone();
    for &(i, j) in &pairs {
        let leading = source.nodes[j];
        let copy = copy_of(mesh, copies, report, leading, |p| match orbit {
            Some(orbit) => orbit.turn(p),
            None => geometry::add(p, offset),
        })?;
        nodes[i] = leading;
        nodes[j] = copy;
    }
    let orientation = match (&source.orientation, orbit) {
        (Some(frame), Some(orbit)) => {
            let axis = geometry::sub(mesh.coords(nodes[1])?, mesh.coords(nodes[0])?);
            BeamOrientation::from_axis(axis, orbit.turn_vector(frame.y_vec))
        }
        (frame, _) => frame.clone(),
    };
    Ok(Some(Element {
        id: mesh.next_element_id(),
        family: source.family,
        nodes,
        section: source.section.clone(),
        orientation,
    }))
}

#[allow(clippy::too_many_arguments)]
fn sweep(
    mesh: &mut Mesh,
    source: &Element,
    coords: &[Point],
    target: ElementFamily,
    direction: Point,
    orbit: Option<&Orbit>,
    copies: &mut HashMap<i32, i32>,
    report: &mut BatchReport,
) -> Result<Element> {
    let mut lifted = Vec::with_capacity(source.nodes.len());
    for &node in &source.nodes {
        lifted.push(copy_of(mesh, copies, report, node, |p| match orbit {
            Some(orbit) => orbit.turn(p),
            None => geometry::add(p, direction),
        })?);
    }
    let moved = lifted
        .iter()
        .map(|&n| mesh.coords(n))
        .collect::<Result<Vec<_>>>()?;
    let old = &source.nodes;

    let nodes = if source.family.is_line() {
        let normal = geometry::cross(
            geometry::sub(coords[1], coords[0]),
            geometry::sub(moved[0], coords[0]),
        );
        if normal[2] >= 0.0 {
            vec![old[0], old[1], lifted[1], lifted[0]]
        } else {
            vec![old[1], old[0], lifted[0], lifted[1]]
        }
    } else {
        let normal = geometry::cross(
            geometry::sub(coords[1], coords[0]),
            geometry::sub(coords[3], coords[0]),
        );
        let travel = geometry::sub(geometry::centroid(&moved), geometry::centroid(coords));
        if geometry::dot(normal, travel) >= 0.0 {
            vec![
                old[0], old[1], old[2], old[3], lifted[0], lifted[1], lifted[2], lifted[3],
            ]
        } else {
            vec![
                old[0], old[3], old[2], old[1], lifted[0], lifted[3], lifted[2], lifted[1],
            ]
        }
    };
    Ok(Element::new(mesh.next_element_id(), target, nodes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Mesh {
        let mut mesh = Mesh::new("square");
        mesh.create_node(1, 0.0, 0.0, 0.0).unwrap();
        mesh.create_node(2, 1.0, 0.0, 0.0).unwrap();
        mesh.create_node(3, 1.0, 1.0, 0.0).unwrap();
        mesh.create_node(4, 0.0, 1.0, 0.0).unwrap();
        mesh.create_element(1, ElementFamily::Quad4N, vec![1, 2, 3, 4]).unwrap();
        mesh
    }

    fn unit_cube() -> Mesh {
        let mut mesh = Mesh::new("cube");
        let corners = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 1.0],
            [1.0, 1.0, 1.0],
            [0.0, 1.0, 1.0],
        ];
        for (k, p) in corners.iter().enumerate() {
            mesh.create_node(k as i32 + 1, p[0], p[1], p[2]).unwrap();
        }
        mesh.create_element(1, ElementFamily::Hex8N, (1..=8).collect()).unwrap();
        mesh
    }

    #[test]
    fn quad_stacks_along_its_edge() {
        let mut mesh = unit_square();
        let params = ExtrudeParams {
            direction: [0.0, 1.0, 0.0],
            count: 2,
            ..ExtrudeParams::default()
        };
        let report = extrude_elements(&mut mesh, &[1], &params).unwrap();
        assert!(report.is_clean());
        assert_eq!(report.created_elements, vec![2, 3]);
        assert_eq!(mesh.elements[&2].nodes, vec![4, 3, 6, 5]);
        assert_eq!(mesh.elements[&3].nodes, vec![5, 6, 8, 7]);
        assert_eq!(mesh.coords(7).unwrap(), [0.0, 3.0, 0.0]);
    }

    #[test]
    fn quad_without_leading_face_is_skipped() {
        let mut mesh = unit_square();
        let params = ExtrudeParams {
            direction: [0.0, 0.0, 1.0],
            axis: [1.0, 0.0, 0.0],
            ..ExtrudeParams::default()
        };
        let report = extrude_elements(&mut mesh, &[1], &params).unwrap();
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(mesh.elements.len(), 1);
        assert_eq!(mesh.nodes.len(), 4);
    }

    #[test]
    fn hex_stacking_resolves_slots() {
        let mut mesh = unit_cube();
        let params = ExtrudeParams {
            direction: [1.0, 0.0, 0.0],
            ..ExtrudeParams::default()
        };
        let report = extrude_elements(&mut mesh, &[1], &params).unwrap();
        assert_eq!(report.created_nodes.len(), 4);
        let hex = &mesh.elements[&2];
        assert_eq!(hex.nodes[0], 2);
        assert_eq!(hex.nodes[3], 3);
        assert_eq!(hex.nodes[4], 6);
        assert_eq!(hex.nodes[7], 7);
        for slot in [1, 2, 5, 6] {
            assert_eq!(mesh.coords(hex.nodes[slot]).unwrap()[0], 2.0);
        }
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn quad_sweeps_into_hex() {
        let mut mesh = unit_square();
        let up = ExtrudeParams {
            direction: [0.0, 0.0, 2.0],
            axis: [1.0, 0.0, 0.0],
            target: Some(ElementFamily::Hex8N),
            ..ExtrudeParams::default()
        };
        extrude_elements(&mut mesh, &[1], &up).unwrap();
        assert_eq!(mesh.elements[&2].family, ElementFamily::Hex8N);
        assert_eq!(mesh.elements[&2].nodes, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(mesh.coords(5).unwrap(), [0.0, 0.0, 2.0]);

        let mut mesh = unit_square();
        let down = ExtrudeParams {
            direction: [0.0, 0.0, -1.0],
            ..up
        };
        extrude_elements(&mut mesh, &[1], &down).unwrap();
        assert_eq!(mesh.elements[&2].nodes, vec![1, 4, 3, 2, 5, 8, 7, 6]);
    }

    #[test]
    fn line_sweeps_around_orbit() {
        let mut mesh = Mesh::new("arc");
        mesh.create_node(1, 1.0, 0.0, 0.0).unwrap();
        mesh.create_node(2, 2.0, 0.0, 0.0).unwrap();
        mesh.create_element(1, ElementFamily::Rod2N2D, vec![1, 2]).unwrap();
        let params = ExtrudeParams {
            direction: [0.0, 1.0, 0.0],
            angle: std::f64::consts::FRAC_PI_2,
            axis: [0.0, 0.0, 1.0],
            axis_radius: 1.5,
            count: 1,
            target: Some(ElementFamily::Quad4N),
        };
        extrude_elements(&mut mesh, &[1], &params).unwrap();
        let quad = &mesh.elements[&2];
        assert_eq!(quad.nodes, vec![1, 2, 4, 3]);
        let p = mesh.coords(4).unwrap();
        assert!(p[0].abs() < 1e-12 && (p[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn repeated_orbit_passes_chain_around_the_axis() {
        // A chord of the circle of radius sqrt(2) about the z axis, swept a
        // quarter turn per pass.
        let mut mesh = Mesh::new("ring");
        mesh.create_node(1, 1.0, -1.0, 0.0).unwrap();
        mesh.create_node(2, 1.0, 1.0, 0.0).unwrap();
        mesh.create_element(1, ElementFamily::Rod2N, vec![1, 2]).unwrap();
        let params = ExtrudeParams {
            direction: [0.0, 1.0, 0.0],
            angle: std::f64::consts::FRAC_PI_2,
            axis: [0.0, 0.0, 1.0],
            axis_radius: 1.0,
            count: 3,
            target: None,
        };
        let report = extrude_elements(&mut mesh, &[1], &params).unwrap();
        assert!(report.is_clean());
        assert_eq!(report.created_elements, vec![2, 3, 4]);
        assert_eq!(report.created_nodes, vec![3, 4, 5]);
        assert_eq!(mesh.elements[&2].nodes, vec![2, 3]);
        assert_eq!(mesh.elements[&3].nodes, vec![3, 4]);
        assert_eq!(mesh.elements[&4].nodes, vec![4, 5]);
        let expected = [(3, [-1.0, 1.0]), (4, [-1.0, -1.0]), (5, [1.0, -1.0])];
        for (node, [x, y]) in expected {
            let p = mesh.coords(node).unwrap();
            assert!(
                (p[0] - x).abs() < 1e-12 && (p[1] - y).abs() < 1e-12 && p[2].abs() < 1e-12,
                "node {node} at {p:?}"
            );
        }
    }

    #[test]
    fn direction_along_axis_does_nothing() {
        for angle in [0.3, 0.0] {
            let mut mesh = unit_square();
            let params = ExtrudeParams {
                direction: [0.0, 2.0, 0.0],
                angle,
                axis: [0.0, -1.0, 0.0],
                ..ExtrudeParams::default()
            };
            let report = extrude_elements(&mut mesh, &[1], &params).unwrap();
            assert_eq!(report, BatchReport::default());
            assert_eq!(mesh.elements.len(), 1);
            assert_eq!(mesh.nodes.len(), 4);
        }
    }
}
