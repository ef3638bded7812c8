//! Subdivision of line elements.

use crate::error::{ModelError, Result};
use crate::geometry;
use crate::mesh::{BeamOrientation, Element, Mesh, Node};

use super::{BatchReport, sorted_selection};

/// Parses a division count typed by a user; only positive whole numbers pass.
pub fn parse_divisions(text: &str) -> Result<i64> {
    match text.trim().parse::<i64>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(ModelError::NotAnInteger(text.to_string())),
    }
}

/// Replaces each selected line element with `divisions` elements of the same
/// family joined by evenly spaced new nodes. Every replacement gets a fresh
/// id and the original id is retired.
pub fn split_beams(mesh: &mut Mesh, ids: &[i32], divisions: i64) -> Result<BatchReport> {
    if divisions < 1 {
        return Err(ModelError::NotAnInteger(divisions.to_string()));
    }
    mesh.require_elements(ids)?;
    let mut report = BatchReport::default();

    for id in sorted_selection(ids) {
        let source = mesh.elements[&id].clone();
        if !source.family.is_line() {
            report.skip("split", id, format!("{} is not a line element", source.family));
            continue;
        }
        let start = mesh.coords(source.nodes[0])?;
        let end = mesh.coords(source.nodes[1])?;
        let step = geometry::scale(geometry::sub(end, start), 1.0 / divisions as f64);

        let mut chain = vec![source.nodes[0]];
        for k in 1..divisions {
            let node = mesh.next_node_id();
            mesh.add_node(Node::at(node, geometry::add(start, geometry::scale(step, k as f64))))?;
            report.created_nodes.push(node);
            chain.push(node);
        }
        chain.push(source.nodes[1]);

        let orientation = source.orientation.as_ref().map(|frame| BeamOrientation {
            length: geometry::norm(step),
            ..frame.clone()
        });
        for pair in chain.windows(2) {
            let element = Element {
                id: mesh.next_element_id(),
                family: source.family,
                nodes: pair.to_vec(),
                section: source.section.clone(),
                orientation: orientation.clone(),
            };
            report.created_elements.push(element.id);
            mesh.add_element(element)?;
        }
        mesh.elements.remove(&id);
    }
    Ok(report)
}
