//! Renumbering of node and element ids into a contiguous block.

use std::collections::BTreeMap;

use crate::error::{ModelError, Result};
use crate::mesh::Mesh;

use super::sorted_selection;

/// Old -> new mapping for `selection` moved to `[first, first + len)`.
///
/// Fails without side effects when the block overlaps the selection's own
/// id range or an id outside the selection.
fn plan<T>(
    entity: &'static str,
    arena: &BTreeMap<i32, T>,
    selection: &[i32],
    first: i32,
) -> Result<BTreeMap<i32, i32>> {
    let (Some(&low), Some(&high)) = (selection.first(), selection.last()) else {
        return Ok(BTreeMap::new());
    };
    if first <= 0 {
        return Err(ModelError::InvalidParameter(format!(
            "{entity} ids must be positive, got {first}"
        )));
    }
    let last = i32::try_from(selection.len() - 1)
        .ok()
        .and_then(|span| first.checked_add(span))
        .ok_or_else(|| ModelError::InvalidParameter(format!("{entity} id block overflows")))?;
    if first <= high && last >= low {
        return Err(ModelError::RenumberOverlap { first, last });
    }
    if let Some((&taken, _)) = arena.range(first..=last).next() {
        return Err(ModelError::DuplicateId { entity, id: taken });
    }
    Ok(selection.iter().copied().zip(first..).collect())
}

/// Renumbers nodes and rewrites element connectivity. Returns old -> new.
pub fn renumber_nodes(
    mesh: &mut Mesh,
    selection: &[i32],
    first: i32,
) -> Result<BTreeMap<i32, i32>> {
    mesh.require_nodes(selection)?;
    let map = plan("node", &mesh.nodes, &sorted_selection(selection), first)?;
    for (old, new) in &map {
        if let Some(mut node) = mesh.nodes.remove(old) {
            node.id = *new;
            mesh.nodes.insert(*new, node);
        }
    }
    for element in mesh.elements.values_mut() {
        for node in element.nodes.iter_mut() {
            if let Some(new) = map.get(node) {
                *node = *new;
            }
        }
    }
    Ok(map)
}

/// Renumbers elements. Returns old -> new.
pub fn renumber_elements(
    mesh: &mut Mesh,
    selection: &[i32],
    first: i32,
) -> Result<BTreeMap<i32, i32>> {
    mesh.require_elements(selection)?;
    let map = plan("element", &mesh.elements, &sorted_selection(selection), first)?;
    for (old, new) in &map {
        if let Some(mut element) = mesh.elements.remove(old) {
            element.id = *new;
            mesh.elements.insert(*new, element);
        }
    }
    Ok(map)
}
