//! Cascading deletion of model entities.

use log::info;

use crate::error::{ModelError, Result};
use crate::model::Model;

/// What to delete. Mesh-scoped targets name their mesh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    Node { mesh: String, id: i32 },
    Element { mesh: String, id: i32 },
    Material(String),
    Section(String),
    Mesh(String),
    Solution { mesh: String, name: String },
    Boundary { mesh: String, solution: String, name: String },
    Constraint { mesh: String, solution: String, name: String },
    Load { mesh: String, solution: String, name: String },
    Nodeset(i32),
    Elementset(i32),
}

/// Removes `target` and everything that only exists through it:
///
/// - a node must not be referenced by any element (`NodeInUse`)
/// - an element takes the nodes no other element references with it
/// - a material takes its sections; elements using them lose their section
/// - a mesh takes its solutions, a solution its records
/// - a set must not be referenced by any record (`SetInUse`)
///
/// Removed nodes and elements also leave the global sets of their mesh.
pub fn delete_from_model(model: &mut Model, target: &DeleteTarget) -> Result<()> {
    match target {
        DeleteTarget::Node { mesh, id } => {
            let owner = model.mesh(mesh)?;
            if owner.get_node(*id).is_none() {
                return Err(ModelError::UnknownNode(*id));
            }
            if let Some(&element) = owner.elements_using(*id).first() {
                return Err(ModelError::NodeInUse { node: *id, element });
            }
            let sets = model.nodesets_within(mesh)?;
            model.mesh_mut(mesh)?.nodes.remove(id);
            model.strip_nodes(&sets, &[*id]);
        }
        DeleteTarget::Element { mesh, id } => {
            let node_sets = model.nodesets_within(mesh)?;
            let element_sets = model.elementsets_within(mesh)?;
            let owner = model.mesh_mut(mesh)?;
            let element = owner
                .elements
                .remove(id)
                .ok_or(ModelError::UnknownElement(*id))?;
            let orphans = owner.remove_unreferenced(element.nodes.iter().copied());
            model.strip_nodes(&node_sets, &orphans);
            model.strip_elements(&element_sets, &[*id]);
        }
        DeleteTarget::Material(name) => {
            if model.materials.remove(name).is_none() {
                return Err(ModelError::UnknownMaterial(name.clone()));
            }
            let doomed: Vec<String> = model
                .sections
                .values()
                .filter(|s| s.material == *name)
                .map(|s| s.name.clone())
                .collect();
            for section in &doomed {
                model.sections.remove(section);
                model.unassign_section(section);
            }
            info!("deleted material '{name}' and {} sections", doomed.len());
        }
        DeleteTarget::Section(name) => {
            if model.sections.remove(name).is_none() {
                return Err(ModelError::UnknownSection(name.clone()));
            }
            model.unassign_section(name);
        }
        DeleteTarget::Mesh(name) => {
            if model.meshes.remove(name).is_none() {
                return Err(ModelError::UnknownMesh(name.clone()));
            }
        }
        DeleteTarget::Solution { mesh, name } => {
            if model.mesh_mut(mesh)?.solutions.remove(name).is_none() {
                return Err(ModelError::UnknownSolution {
                    mesh: mesh.clone(),
                    name: name.clone(),
                });
            }
        }
        DeleteTarget::Boundary {
            mesh,
            solution,
            name,
        } => {
            let removed = model
                .solution_mut(mesh, solution)?
                .boundaries
                .remove(name)
                .is_some();
            require_record(removed, "boundary", solution, name)?;
        }
        DeleteTarget::Constraint {
            mesh,
            solution,
            name,
        } => {
            let removed = model
                .solution_mut(mesh, solution)?
                .constraints
                .remove(name)
                .is_some();
            require_record(removed, "constraint", solution, name)?;
        }
        DeleteTarget::Load {
            mesh,
            solution,
            name,
        } => {
            let removed = model
                .solution_mut(mesh, solution)?
                .loads
                .remove(name)
                .is_some();
            require_record(removed, "load", solution, name)?;
        }
        DeleteTarget::Nodeset(id) => {
            if !model.nodesets.contains_key(id) {
                return Err(ModelError::UnknownNodeset(*id));
            }
            if let Some(record) = model.set_user("nodeset", *id) {
                return Err(ModelError::SetInUse {
                    kind: "nodeset",
                    set: *id,
                    record,
                });
            }
            model.nodesets.remove(id);
            for mesh in model.meshes.values_mut() {
                mesh.nodesets.remove(id);
            }
        }
        DeleteTarget::Elementset(id) => {
            if !model.elementsets.contains_key(id) {
                return Err(ModelError::UnknownElementset(*id));
            }
            if let Some(record) = model.set_user("elementset", *id) {
                return Err(ModelError::SetInUse {
                    kind: "elementset",
                    set: *id,
                    record,
                });
            }
            model.elementsets.remove(id);
            for mesh in model.meshes.values_mut() {
                mesh.elementsets.remove(id);
            }
        }
    }
    Ok(())
}

fn require_record(removed: bool, kind: &'static str, solution: &str, name: &str) -> Result<()> {
    if removed {
        Ok(())
    } else {
        Err(ModelError::UnknownRecord {
            kind,
            solution: solution.to_string(),
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::family::ElementFamily;
    use crate::materials::{Material, Section, SectionShape};
    use crate::mesh::Mesh;
    use crate::sets::{Elementset, Nodeset};
    use crate::solution::{Boundary, BoundaryKind, SolutionType};

    fn model() -> Model {
        let mut mesh = Mesh::new("m");
        for id in 1..=3 {
            mesh.create_node(id, id as f64, 0.0, 0.0).unwrap();
        }
        mesh.create_element(1, ElementFamily::Rod2N, vec![1, 2]).unwrap();
        mesh.create_element(2, ElementFamily::Rod2N, vec![2, 3]).unwrap();
        let mut model = Model::new();
        model.add_mesh(mesh).unwrap();
        model.add_material(Material::new("steel", 1.0, 0.3, 1.0)).unwrap();
        model
            .add_section(Section::new("rod", "steel", SectionShape::Rod { area: 1.0 }))
            .unwrap();
        model.assign_section("m", &[1, 2], "rod").unwrap();
        model.add_nodeset(Nodeset::new(1, [1, 3])).unwrap();
        model.add_elementset(Elementset::new(2, [1, 2])).unwrap();
        model
    }

    fn node(id: i32) -> DeleteTarget {
        DeleteTarget::Node {
            mesh: "m".to_string(),
            id,
        }
    }

    #[test]
    fn node_in_use_cannot_be_deleted() {
        let mut model = model();
        assert_eq!(
            delete_from_model(&mut model, &node(2)),
            Err(ModelError::NodeInUse { node: 2, element: 1 })
        );
    }

    #[test]
    fn element_takes_orphaned_nodes() {
        let mut model = model();
        let target = DeleteTarget::Element {
            mesh: "m".to_string(),
            id: 2,
        };
        delete_from_model(&mut model, &target).unwrap();
        let mesh = model.mesh("m").unwrap();
        assert!(mesh.get_node(3).is_none());
        assert!(mesh.get_node(2).is_some());
        assert_eq!(model.nodesets[&1].nodes.iter().copied().collect::<Vec<_>>(), vec![1]);
        assert_eq!(model.elementsets[&2].elements.len(), 1);
    }

    #[test]
    fn material_cascades_to_sections_and_elements() {
        let mut model = model();
        delete_from_model(&mut model, &DeleteTarget::Material("steel".to_string())).unwrap();
        assert!(model.sections.is_empty());
        assert!(model.mesh("m").unwrap().elements.values().all(|e| e.section.is_none()));
    }

    #[test]
    fn referenced_set_cannot_be_deleted() {
        let mut model = model();
        model.create_solution("m", "s", SolutionType::Static).unwrap();
        let bc = Boundary {
            name: "fix".to_string(),
            kind: BoundaryKind::Displacement,
            nodeset: 1,
            value: 0.0,
            dofs: vec![1, 2, 3],
        };
        model.apply_boundary("m", "s", bc).unwrap();
        assert!(matches!(
            delete_from_model(&mut model, &DeleteTarget::Nodeset(1)),
            Err(ModelError::SetInUse { set: 1, .. })
        ));
        let fix = DeleteTarget::Boundary {
            mesh: "m".to_string(),
            solution: "s".to_string(),
            name: "fix".to_string(),
        };
        delete_from_model(&mut model, &fix).unwrap();
        delete_from_model(&mut model, &DeleteTarget::Nodeset(1)).unwrap();
        assert!(!model.mesh("m").unwrap().nodesets.contains(&1));
        assert!(matches!(
            delete_from_model(&mut model, &fix),
            Err(ModelError::UnknownRecord { kind: "boundary", .. })
        ));
    }

    #[test]
    fn mesh_takes_its_solutions() {
        let mut model = model();
        model.create_solution("m", "s", SolutionType::Eigenmodes).unwrap();
        delete_from_model(&mut model, &DeleteTarget::Mesh("m".to_string())).unwrap();
        assert!(model.meshes.is_empty());
        assert!(model.solution("m", "s").is_err());
    }
}
