//! Conversion between element families.
//!
//! Three kinds of rule exist: degree elevation (insert one node per edge),
//! subdivision (split into simplices through a fixed corner table) and
//! retagging of line families. Midpoint nodes are shared by every element of
//! the batch that meets the same edge; the key is the sorted pair of corner
//! node ids. Separate batches do not share midpoints.

use std::collections::HashMap;

use log::debug;

use crate::error::{ModelError, Result};
use crate::family::ElementFamily;
use crate::geometry;
use crate::mesh::{Element, Mesh, Node};

use super::{BatchReport, sorted_selection};

const QUAD_TO_TRI: &[&[usize]] = &[&[0, 1, 2], &[0, 2, 3]];

/// Six tetrahedra around the diagonal from corner 1 to corner 7.
const HEX_TO_TET: &[&[usize]] = &[
    &[0, 1, 2, 6],
    &[0, 5, 1, 6],
    &[0, 2, 3, 6],
    &[0, 3, 7, 6],
    &[0, 4, 5, 6],
    &[0, 7, 4, 6],
];

#[derive(Debug, Clone, Copy)]
enum Rule {
    Retag,
    Elevate,
    Split(&'static [&'static [usize]]),
}

fn rule_for(from: ElementFamily, to: ElementFamily) -> Option<Rule> {
    use ElementFamily::*;
    match (from, to) {
        (Tet4N, Tet10N) | (Tri3N, Tri6N) | (Quad4N, Quad8N) | (Hex8N, Hex20N) => {
            Some(Rule::Elevate)
        }
        (Hex8N | Hex20N, Tet10N) | (Hex8N, Tet4N) => Some(Rule::Split(HEX_TO_TET)),
        (Quad4N, Tri3N | Tri6N) | (Quad8N, Tri6N) => Some(Rule::Split(QUAD_TO_TRI)),
        (Rod2N, Beam2N)
        | (Beam2N, Rod2N)
        | (Rod2N2D, Beam2N2D)
        | (Beam2N2D, Rod2N2D)
        | (Rod2N, Rod2N2D)
        | (Rod2N2D, Rod2N)
        | (Beam2N, Beam2N2D)
        | (Beam2N2D, Beam2N) => Some(Rule::Retag),
        _ => None,
    }
}

/// Batch-scoped edge -> midpoint node table.
struct Midpoints {
    nodes: HashMap<(i32, i32), i32>,
}

impl Midpoints {
    fn key(a: i32, b: i32) -> (i32, i32) {
        (a.min(b), a.max(b))
    }

    fn get_or_create(
        &mut self,
        mesh: &mut Mesh,
        report: &mut BatchReport,
        a: i32,
        b: i32,
    ) -> Result<i32> {
        if let Some(&mid) = self.nodes.get(&Self::key(a, b)) {
            return Ok(mid);
        }
        let p = geometry::midpoint(mesh.coords(a)?, mesh.coords(b)?);
        let id = mesh.next_node_id();
        mesh.add_node(Node::at(id, p))?;
        self.nodes.insert(Self::key(a, b), id);
        report.created_nodes.push(id);
        Ok(id)
    }

    /// Registers the mid nodes an already quadratic element carries.
    fn adopt(&mut self, element: &Element) {
        let family = element.family;
        for (k, &(a, b)) in family.mid_edges().iter().enumerate() {
            let mid = element.nodes[family.corner_count() + k];
            self.nodes
                .insert(Self::key(element.nodes[a], element.nodes[b]), mid);
        }
    }

    /// Corner ids followed by one midpoint per edge of `family`.
    fn complete(
        &mut self,
        mesh: &mut Mesh,
        report: &mut BatchReport,
        family: ElementFamily,
        corners: Vec<i32>,
    ) -> Result<Vec<i32>> {
        let mut nodes = corners;
        for &(a, b) in family.mid_edges() {
            let mid = self.get_or_create(mesh, report, nodes[a], nodes[b])?;
            nodes.push(mid);
        }
        Ok(nodes)
    }
}

/// Converts every selected element to `target`. The selection must share one
/// family and a rule must exist for the pair; nothing changes otherwise.
pub fn convert_elements(
    mesh: &mut Mesh,
    ids: &[i32],
    target: ElementFamily,
) -> Result<BatchReport> {
    mesh.require_elements(ids)?;
    let selection = sorted_selection(ids);
    let mut report = BatchReport::default();
    let Some(&first) = selection.first() else {
        return Ok(report);
    };
    let source = mesh.elements[&first].family;
    if let Some(other) = selection
        .iter()
        .map(|id| mesh.elements[id].family)
        .find(|f| *f != source)
    {
        return Err(ModelError::MixedFamily {
            first: source,
            second: other,
        });
    }
    if source == target {
        return Ok(report);
    }
    let rule = rule_for(source, target).ok_or(ModelError::UnsupportedConversion {
        from: source,
        to: target,
    })?;

    let mut mids = Midpoints {
        nodes: HashMap::new(),
    };
    for id in &selection {
        let element = mesh.elements[id].clone();
        match rule {
            Rule::Retag => {
                if let Some(e) = mesh.elements.get_mut(id) {
                    e.family = target;
                    if !target.is_beam() {
                        e.orientation = None;
                    }
                }
            }
            Rule::Elevate => {
                let corners = element.corner_nodes().to_vec();
                let nodes = mids.complete(mesh, &mut report, target, corners)?;
                if let Some(e) = mesh.elements.get_mut(id) {
                    e.family = target;
                    e.nodes = nodes;
                }
            }
            Rule::Split(table) => {
                mids.adopt(&element);
                for (k, slots) in table.iter().enumerate() {
                    let corners: Vec<i32> = slots.iter().map(|&s| element.nodes[s]).collect();
                    let nodes = mids.complete(mesh, &mut report, target, corners)?;
                    let sub_id = if k == 0 { *id } else { mesh.next_element_id() };
                    let sub = Element {
                        id: sub_id,
                        family: target,
                        nodes,
                        section: element.section.clone(),
                        orientation: None,
                    };
                    if k > 0 {
                        report.created_elements.push(sub_id);
                    }
                    mesh.elements.insert(sub_id, sub);
                }
            }
        }
    }
    debug!(
        "converted {} elements {source} -> {target}: {} new nodes, {} new elements",
        selection.len(),
        report.created_nodes.len(),
        report.created_elements.len()
    );
    Ok(report)
}
