//! The model aggregate: meshes, global sets, materials and sections.
//!
//! `Model` is passed explicitly to every operation that needs more than one
//! mesh or touches global sets; there is no process-wide state.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::materials::{Material, Section};
use crate::mesh::{Element, Mesh};
use crate::sets::{Elementset, Nodeset, remap_members};
use crate::solution::{
    Boundary, Constraint, ConstraintKind, Damping, Load, LoadTarget, ResultKind, Solution,
    SolutionType, Table, normalize_dofs,
};
use crate::topology::{self, BatchReport, FuseReport, sorted_selection};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub meshes: BTreeMap<String, Mesh>,
    pub nodesets: BTreeMap<i32, Nodeset>,
    pub elementsets: BTreeMap<i32, Elementset>,
    pub materials: BTreeMap<String, Material>,
    pub sections: BTreeMap<String, Section>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> Result<()> {
        if self.meshes.contains_key(&mesh.name) {
            return Err(ModelError::DuplicateName {
                entity: "mesh",
                name: mesh.name,
            });
        }
        self.meshes.insert(mesh.name.clone(), mesh);
        Ok(())
    }

    pub fn mesh(&self, name: &str) -> Result<&Mesh> {
        self.meshes
            .get(name)
            .ok_or_else(|| ModelError::UnknownMesh(name.to_string()))
    }

    pub fn mesh_mut(&mut self, name: &str) -> Result<&mut Mesh> {
        self.meshes
            .get_mut(name)
            .ok_or_else(|| ModelError::UnknownMesh(name.to_string()))
    }

    pub fn add_nodeset(&mut self, set: Nodeset) -> Result<()> {
        if self.nodesets.contains_key(&set.id) {
            return Err(ModelError::DuplicateId {
                entity: "nodeset",
                id: set.id,
            });
        }
        self.nodesets.insert(set.id, set);
        Ok(())
    }

    pub fn add_elementset(&mut self, set: Elementset) -> Result<()> {
        if self.elementsets.contains_key(&set.id) {
            return Err(ModelError::DuplicateId {
                entity: "elementset",
                id: set.id,
            });
        }
        self.elementsets.insert(set.id, set);
        Ok(())
    }

    pub fn add_material(&mut self, material: Material) -> Result<()> {
        if self.materials.contains_key(&material.name) {
            return Err(ModelError::DuplicateName {
                entity: "material",
                name: material.name,
            });
        }
        self.materials.insert(material.name.clone(), material);
        Ok(())
    }

    /// Explicit edit of a material's constants; sections keep pointing at it.
    pub fn edit_material(
        &mut self,
        name: &str,
        youngs_modulus: f64,
        poisson_ratio: f64,
        density: f64,
    ) -> Result<()> {
        let material = self
            .materials
            .get_mut(name)
            .ok_or_else(|| ModelError::UnknownMaterial(name.to_string()))?;
        material.youngs_modulus = youngs_modulus;
        material.poisson_ratio = poisson_ratio;
        material.density = density;
        Ok(())
    }

    pub fn add_section(&mut self, section: Section) -> Result<()> {
        if !self.materials.contains_key(&section.material) {
            return Err(ModelError::UnknownMaterial(section.material));
        }
        if self.sections.contains_key(&section.name) {
            return Err(ModelError::DuplicateName {
                entity: "section",
                name: section.name,
            });
        }
        self.sections.insert(section.name.clone(), section);
        Ok(())
    }

    /// Points every listed element at `section`. All elements are checked
    /// before any is changed.
    pub fn assign_section(&mut self, mesh: &str, elements: &[i32], section: &str) -> Result<()> {
        let sect = self
            .sections
            .get(section)
            .ok_or_else(|| ModelError::UnknownSection(section.to_string()))?;
        let target = self
            .meshes
            .get_mut(mesh)
            .ok_or_else(|| ModelError::UnknownMesh(mesh.to_string()))?;
        target.require_elements(elements)?;
        for id in elements {
            let family = target.elements[id].family;
            if !sect.accepts(family) {
                return Err(ModelError::SectionMismatch {
                    section: section.to_string(),
                    family,
                });
            }
        }
        for id in elements {
            if let Some(element) = target.elements.get_mut(id) {
                element.section = Some(section.to_string());
            }
        }
        Ok(())
    }

    /// Builds a new mesh from elementsets of `source`, copying the listed
    /// elements and every node they reference.
    pub fn extract_mesh(&mut self, name: &str, source: &str, elementsets: &[i32]) -> Result<()> {
        if self.meshes.contains_key(name) {
            return Err(ModelError::DuplicateName {
                entity: "mesh",
                name: name.to_string(),
            });
        }
        let src = self.mesh(source)?;
        let mut element_ids = BTreeSet::new();
        for set_id in elementsets {
            let set = self
                .elementsets
                .get(set_id)
                .ok_or(ModelError::UnknownElementset(*set_id))?;
            if set.elements.iter().any(|e| !src.elements.contains_key(e)) {
                return Err(ModelError::SetNotInMesh {
                    kind: "elementset",
                    set: *set_id,
                    mesh: source.to_string(),
                });
            }
            element_ids.extend(set.elements.iter().copied());
        }

        let mut mesh = Mesh::new(name);
        let elements: Vec<Element> = element_ids
            .iter()
            .map(|id| src.elements[id].clone())
            .collect();
        for element in &elements {
            for node in &element.nodes {
                if !mesh.nodes.contains_key(node) {
                    let n = src.get_node(*node).ok_or(ModelError::UnknownNode(*node))?;
                    mesh.nodes.insert(*node, n.clone());
                }
            }
        }
        for element in elements {
            mesh.elements.insert(element.id, element);
        }
        mesh.elementsets = elementsets.iter().copied().collect();
        debug!(
            "extracted mesh '{name}' from '{source}': {} nodes, {} elements",
            mesh.nodes.len(),
            mesh.elements.len()
        );
        self.meshes.insert(name.to_string(), mesh);
        Ok(())
    }

    // ========================
    // Solution registry
    // ========================

    pub fn create_solution(&mut self, mesh: &str, name: &str, kind: SolutionType) -> Result<()> {
        let target = self.mesh_mut(mesh)?;
        if target.solutions.contains_key(name) {
            return Err(ModelError::DuplicateName {
                entity: "solution",
                name: name.to_string(),
            });
        }
        target
            .solutions
            .insert(name.to_string(), Solution::new(name, kind));
        Ok(())
    }

    pub fn solution(&self, mesh: &str, name: &str) -> Result<&Solution> {
        self.mesh(mesh)?
            .solutions
            .get(name)
            .ok_or_else(|| ModelError::UnknownSolution {
                mesh: mesh.to_string(),
                name: name.to_string(),
            })
    }

    pub(crate) fn solution_mut(&mut self, mesh: &str, name: &str) -> Result<&mut Solution> {
        self.mesh_mut(mesh)?
            .solutions
            .get_mut(name)
            .ok_or_else(|| ModelError::UnknownSolution {
                mesh: mesh.to_string(),
                name: name.to_string(),
            })
    }

    /// Checks a nodeset exists and every member is a node of `mesh`.
    pub fn check_nodeset_in_mesh(&self, mesh: &str, set_id: i32) -> Result<()> {
        let target = self.mesh(mesh)?;
        let set = self
            .nodesets
            .get(&set_id)
            .ok_or(ModelError::UnknownNodeset(set_id))?;
        if set.nodes.iter().any(|n| !target.nodes.contains_key(n)) {
            return Err(ModelError::SetNotInMesh {
                kind: "nodeset",
                set: set_id,
                mesh: mesh.to_string(),
            });
        }
        Ok(())
    }

    /// Checks an elementset exists and every member is an element of `mesh`.
    pub fn check_elementset_in_mesh(&self, mesh: &str, set_id: i32) -> Result<()> {
        let target = self.mesh(mesh)?;
        let set = self
            .elementsets
            .get(&set_id)
            .ok_or(ModelError::UnknownElementset(set_id))?;
        if set.elements.iter().any(|e| !target.elements.contains_key(e)) {
            return Err(ModelError::SetNotInMesh {
                kind: "elementset",
                set: set_id,
                mesh: mesh.to_string(),
            });
        }
        Ok(())
    }

    pub fn apply_boundary(
        &mut self,
        mesh: &str,
        solution: &str,
        mut boundary: Boundary,
    ) -> Result<()> {
        self.check_nodeset_in_mesh(mesh, boundary.nodeset)?;
        boundary.dofs = normalize_dofs(&boundary.dofs)?;
        let nodeset = boundary.nodeset;
        let target = self.solution_mut(mesh, solution)?;
        if target.boundaries.contains_key(&boundary.name) {
            return Err(ModelError::DuplicateName {
                entity: "boundary",
                name: boundary.name,
            });
        }
        target.boundaries.insert(boundary.name.clone(), boundary);
        self.mesh_mut(mesh)?.nodesets.insert(nodeset);
        Ok(())
    }

    pub fn apply_constraint(
        &mut self,
        mesh: &str,
        solution: &str,
        mut constraint: Constraint,
    ) -> Result<()> {
        let (first, second) = constraint.nodesets;
        self.check_nodeset_in_mesh(mesh, first)?;
        self.check_nodeset_in_mesh(mesh, second)?;
        if let ConstraintKind::TouchLock { tolerance } = constraint.kind
            && !(tolerance >= 0.0)
        {
            return Err(ModelError::InvalidParameter(format!(
                "touch lock tolerance must be non-negative, got {tolerance}"
            )));
        }
        constraint.dofs = normalize_dofs(&constraint.dofs)?;
        let target = self.solution_mut(mesh, solution)?;
        if target.constraints.contains_key(&constraint.name) {
            return Err(ModelError::DuplicateName {
                entity: "constraint",
                name: constraint.name,
            });
        }
        target
            .constraints
            .insert(constraint.name.clone(), constraint);
        let consumed = &mut self.mesh_mut(mesh)?.nodesets;
        consumed.insert(first);
        consumed.insert(second);
        Ok(())
    }

    pub fn apply_load(&mut self, mesh: &str, solution: &str, load: Load) -> Result<()> {
        match load.target {
            LoadTarget::Nodeset(id) if !load.kind.targets_elements() => {
                self.check_nodeset_in_mesh(mesh, id)?
            }
            LoadTarget::Elementset(id) if load.kind.targets_elements() => {
                self.check_elementset_in_mesh(mesh, id)?
            }
            _ => {
                return Err(ModelError::InvalidParameter(format!(
                    "{} load '{}' cannot target {:?}",
                    load.kind.keyword(),
                    load.name,
                    load.target
                )));
            }
        }
        let target = self.solution_mut(mesh, solution)?;
        if let Some(table) = &load.table
            && !target.tables.contains_key(table)
        {
            return Err(ModelError::UnknownRecord {
                kind: "table",
                solution: solution.to_string(),
                name: table.clone(),
            });
        }
        if target.loads.contains_key(&load.name) {
            return Err(ModelError::DuplicateName {
                entity: "load",
                name: load.name,
            });
        }
        let set = load.target;
        target.loads.insert(load.name.clone(), load);
        let owner = self.mesh_mut(mesh)?;
        match set {
            LoadTarget::Nodeset(id) => owner.nodesets.insert(id),
            LoadTarget::Elementset(id) => owner.elementsets.insert(id),
        };
        Ok(())
    }

    pub fn set_damping(&mut self, mesh: &str, solution: &str, damping: Damping) -> Result<()> {
        self.solution_mut(mesh, solution)?.damping = Some(damping);
        Ok(())
    }

    pub fn add_table(&mut self, mesh: &str, solution: &str, table: Table) -> Result<()> {
        let target = self.solution_mut(mesh, solution)?;
        if target.tables.contains_key(&table.name) {
            return Err(ModelError::DuplicateName {
                entity: "table",
                name: table.name,
            });
        }
        target.tables.insert(table.name.clone(), table);
        Ok(())
    }

    pub fn set_results(
        &mut self,
        mesh: &str,
        solution: &str,
        results: &[ResultKind],
    ) -> Result<()> {
        let target = self.solution_mut(mesh, solution)?;
        target.results.clear();
        for kind in results {
            target.request_result(*kind);
        }
        Ok(())
    }

    /// Global nodesets whose members all belong to `mesh`.
    pub fn nodesets_within(&self, mesh: &str) -> Result<Vec<i32>> {
        let target = self.mesh(mesh)?;
        Ok(self
            .nodesets
            .values()
            .filter(|s| s.nodes.iter().all(|n| target.nodes.contains_key(n)))
            .map(|s| s.id)
            .collect())
    }

    /// Global elementsets whose members all belong to `mesh`.
    pub fn elementsets_within(&self, mesh: &str) -> Result<Vec<i32>> {
        let target = self.mesh(mesh)?;
        Ok(self
            .elementsets
            .values()
            .filter(|s| s.elements.iter().all(|e| target.elements.contains_key(e)))
            .map(|s| s.id)
            .collect())
    }

    pub(crate) fn strip_nodes(&mut self, sets: &[i32], nodes: &[i32]) {
        for id in sets {
            if let Some(set) = self.nodesets.get_mut(id) {
                set.nodes.retain(|n| !nodes.contains(n));
            }
        }
    }

    pub(crate) fn strip_elements(&mut self, sets: &[i32], elements: &[i32]) {
        for id in sets {
            if let Some(set) = self.elementsets.get_mut(id) {
                set.elements.retain(|e| !elements.contains(e));
            }
        }
    }

    fn remap_nodesets(&mut self, sets: &[i32], map: &BTreeMap<i32, i32>) {
        for id in sets {
            if let Some(set) = self.nodesets.get_mut(id) {
                remap_members(&mut set.nodes, map);
            }
        }
    }

    pub(crate) fn unassign_section(&mut self, section: &str) {
        for mesh in self.meshes.values_mut() {
            for element in mesh.elements.values_mut() {
                if element.section.as_deref() == Some(section) {
                    element.section = None;
                }
            }
        }
    }

    /// First record, in any mesh, that references the given set.
    pub(crate) fn set_user(&self, kind: &str, set: i32) -> Option<String> {
        for mesh in self.meshes.values() {
            for solution in mesh.solutions.values() {
                let refs = if kind == "nodeset" {
                    solution.nodeset_references()
                } else {
                    solution.elementset_references()
                };
                if let Some((_, record)) = refs.into_iter().find(|(id, _)| *id == set) {
                    return Some(format!(
                        "{record} of solution '{}' in mesh '{}'",
                        solution.name, mesh.name
                    ));
                }
            }
        }
        None
    }

    /// Fuses coincident nodes of `mesh` and points the mesh's nodesets at
    /// the surviving nodes.
    pub fn fuse_nodes(&mut self, mesh: &str, ids: &[i32], tolerance: f64) -> Result<FuseReport> {
        let sets = self.nodesets_within(mesh)?;
        let report = topology::fuse_nodes(self.mesh_mut(mesh)?, ids, tolerance)?;
        self.remap_nodesets(&sets, &report.merged);
        Ok(report)
    }

    /// Splits line elements of `mesh`; every elementset of the mesh that held
    /// a split element holds its pieces instead.
    pub fn split_beams(
        &mut self,
        mesh: &str,
        ids: &[i32],
        divisions: i64,
    ) -> Result<BatchReport> {
        if divisions < 1 {
            return Err(ModelError::NotAnInteger(divisions.to_string()));
        }
        let sets = self.elementsets_within(mesh)?;
        let target = self.mesh_mut(mesh)?;
        target.require_elements(ids)?;

        let mut report = BatchReport::default();
        let mut pieces: BTreeMap<i32, Vec<i32>> = BTreeMap::new();
        for id in sorted_selection(ids) {
            let part = topology::split_beams(target, &[id], divisions)?;
            if !target.elements.contains_key(&id) {
                pieces.insert(id, part.created_elements.clone());
            }
            report.absorb(part);
        }
        for set_id in &sets {
            if let Some(set) = self.elementsets.get_mut(set_id) {
                for (old, new) in &pieces {
                    if set.elements.remove(old) {
                        set.elements.extend(new.iter().copied());
                    }
                }
            }
        }
        Ok(report)
    }

    /// Renumbers nodes of `mesh`, carrying the mesh's nodesets along.
    pub fn renumber_nodes(
        &mut self,
        mesh: &str,
        selection: &[i32],
        first: i32,
    ) -> Result<BTreeMap<i32, i32>> {
        let sets = self.nodesets_within(mesh)?;
        let map = topology::renumber_nodes(self.mesh_mut(mesh)?, selection, first)?;
        self.remap_nodesets(&sets, &map);
        Ok(map)
    }

    /// Renumbers elements of `mesh`, carrying the mesh's elementsets along.
    pub fn renumber_elements(
        &mut self,
        mesh: &str,
        selection: &[i32],
        first: i32,
    ) -> Result<BTreeMap<i32, i32>> {
        let sets = self.elementsets_within(mesh)?;
        let map = topology::renumber_elements(self.mesh_mut(mesh)?, selection, first)?;
        for id in &sets {
            if let Some(set) = self.elementsets.get_mut(id) {
                remap_members(&mut set.elements, &map);
            }
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::family::ElementFamily;
    use crate::materials::SectionShape;
    use crate::solution::{BoundaryKind, LoadKind};

    fn two_rods() -> Model {
        let mut mesh = Mesh::new("m");
        for (id, x) in [(1, 0.0), (2, 1.0), (3, 2.0)] {
            mesh.create_node(id, x, 0.0, 0.0).unwrap();
        }
        mesh.create_element(1, ElementFamily::Rod2N, vec![1, 2]).unwrap();
        mesh.create_element(2, ElementFamily::Rod2N, vec![2, 3]).unwrap();
        let mut model = Model::new();
        model.add_mesh(mesh).unwrap();
        model.add_nodeset(Nodeset::new(1, [1])).unwrap();
        model.add_nodeset(Nodeset::new(2, [3])).unwrap();
        model.add_nodeset(Nodeset::new(7, [1, 42])).unwrap();
        model.add_elementset(Elementset::new(10, [1])).unwrap();
        model.create_solution("m", "static", SolutionType::Static).unwrap();
        model
    }

    fn force(name: &str, target: LoadTarget) -> Load {
        Load {
            name: name.to_string(),
            kind: LoadKind::Force,
            target,
            magnitude: 10.0,
            direction: [1.0, 0.0, 0.0],
            table: None,
        }
    }

    #[test]
    fn load_on_foreign_nodeset_is_rejected() {
        let mut model = two_rods();
        let err = model
            .apply_load("m", "static", force("f", LoadTarget::Nodeset(7)))
            .unwrap_err();
        assert!(matches!(err, ModelError::SetNotInMesh { set: 7, .. }));
        assert!(model.solution("m", "static").unwrap().loads.is_empty());
        assert!(!model.mesh("m").unwrap().nodesets.contains(&7));
    }

    #[test]
    fn boundary_normalises_dofs_and_marks_set_consumed() {
        let mut model = two_rods();
        let bc = Boundary {
            name: "fix".to_string(),
            kind: BoundaryKind::Displacement,
            nodeset: 1,
            value: 0.0,
            dofs: vec![3, 1, 2, 2],
        };
        model.apply_boundary("m", "static", bc.clone()).unwrap();
        let stored = &model.solution("m", "static").unwrap().boundaries["fix"];
        assert_eq!(stored.dofs, vec![1, 2, 3]);
        assert!(model.mesh("m").unwrap().nodesets.contains(&1));
        assert!(matches!(
            model.apply_boundary("m", "static", bc),
            Err(ModelError::DuplicateName { entity: "boundary", .. })
        ));
    }

    #[test]
    fn touch_lock_requires_valid_tolerance() {
        let mut model = two_rods();
        let lock = Constraint {
            name: "tie".to_string(),
            kind: ConstraintKind::TouchLock { tolerance: -1.0 },
            nodesets: (1, 2),
            dofs: vec![1],
        };
        assert!(matches!(
            model.apply_constraint("m", "static", lock.clone()),
            Err(ModelError::InvalidParameter(_))
        ));
        let ok = Constraint {
            kind: ConstraintKind::TouchLock { tolerance: 0.01 },
            ..lock
        };
        model.apply_constraint("m", "static", ok).unwrap();
        assert_eq!(model.solution("m", "static").unwrap().constraints.len(), 1);
    }

    #[test]
    fn gravity_targets_elementsets_only() {
        let mut model = two_rods();
        let gravity = Load {
            kind: LoadKind::Gravity,
            ..force("g", LoadTarget::Nodeset(1))
        };
        assert!(matches!(
            model.apply_load("m", "static", gravity.clone()),
            Err(ModelError::InvalidParameter(_))
        ));
        let gravity = Load {
            target: LoadTarget::Elementset(10),
            ..gravity
        };
        model.apply_load("m", "static", gravity).unwrap();
        assert!(model.mesh("m").unwrap().elementsets.contains(&10));
    }

    #[test]
    fn dynamic_load_needs_known_table() {
        let mut model = two_rods();
        let dynamic = Load {
            kind: LoadKind::DynamicForce,
            table: Some("sweep".to_string()),
            ..force("d", LoadTarget::Nodeset(2))
        };
        assert!(matches!(
            model.apply_load("m", "static", dynamic.clone()),
            Err(ModelError::UnknownRecord { kind: "table", .. })
        ));
        model
            .add_table(
                "m",
                "static",
                Table {
                    name: "sweep".to_string(),
                    points: vec![(0.0, 1.0), (100.0, 1.0)],
                },
            )
            .unwrap();
        model.apply_load("m", "static", dynamic).unwrap();
    }

    #[test]
    fn section_assignment_checks_family() {
        let mut model = two_rods();
        model
            .add_material(Material::new("steel", 210e9, 0.3, 7850.0))
            .unwrap();
        model
            .add_section(Section::new("plate", "steel", SectionShape::Plane { thickness: 1.0 }))
            .unwrap();
        model
            .add_section(Section::new("rod", "steel", SectionShape::Rod { area: 1.0 }))
            .unwrap();
        assert!(matches!(
            model.assign_section("m", &[1, 2], "plate"),
            Err(ModelError::SectionMismatch { .. })
        ));
        model.assign_section("m", &[1, 2], "rod").unwrap();
        assert_eq!(
            model.mesh("m").unwrap().elements[&2].section.as_deref(),
            Some("rod")
        );
        assert!(matches!(
            model.add_section(Section::new("x", "alu", SectionShape::Solid)),
            Err(ModelError::UnknownMaterial(_))
        ));
    }

    #[test]
    fn extract_mesh_copies_referenced_nodes() {
        let mut model = two_rods();
        model.extract_mesh("sub", "m", &[10]).unwrap();
        let sub = model.mesh("sub").unwrap();
        assert_eq!(sub.elements.keys().copied().collect::<Vec<_>>(), vec![1]);
        assert_eq!(sub.nodes.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert!(sub.elementsets.contains(&10));
        assert!(sub.validate().is_ok());
    }

    #[test]
    fn renumber_carries_sets_along() {
        let mut model = two_rods();
        model.renumber_nodes("m", &[1, 2, 3], 10).unwrap();
        assert_eq!(model.nodesets[&1].nodes.iter().copied().collect::<Vec<_>>(), vec![10]);
        assert_eq!(model.nodesets[&2].nodes.iter().copied().collect::<Vec<_>>(), vec![12]);
        // node 42 is not in the mesh, so set 7 is left alone
        assert!(model.nodesets[&7].nodes.contains(&1));
        model.renumber_elements("m", &[1, 2], 20).unwrap();
        assert!(model.elementsets[&10].elements.contains(&20));
    }

    #[test]
    fn split_replaces_members_of_the_mesh_sets() {
        let mut model = two_rods();
        model.add_elementset(Elementset::new(11, [1, 2])).unwrap();
        model.add_elementset(Elementset::new(12, [1, 77])).unwrap();
        let report = model.split_beams("m", &[1], 2).unwrap();
        assert_eq!(report.created_elements, vec![3, 4]);
        assert!(model.mesh("m").unwrap().get_element(1).is_none());
        let members = |id: i32| -> Vec<i32> {
            model.elementsets[&id].elements.iter().copied().collect()
        };
        assert_eq!(members(10), vec![3, 4]);
        assert_eq!(members(11), vec![2, 3, 4]);
        // element 77 is not in the mesh, so set 12 is left alone
        assert_eq!(members(12), vec![1, 77]);
        model.check_elementset_in_mesh("m", 10).unwrap();
        assert!(matches!(
            model.split_beams("m", &[3], 0),
            Err(ModelError::NotAnInteger(_))
        ));
    }

    #[test]
    fn fuse_remaps_nodesets() {
        let mut model = two_rods();
        let mesh = model.mesh_mut("m").unwrap();
        mesh.create_node(4, 2.0, 0.0, 0.0).unwrap();
        mesh.create_node(5, 3.0, 0.0, 0.0).unwrap();
        mesh.create_element(3, ElementFamily::Rod2N, vec![4, 5]).unwrap();
        model.add_nodeset(Nodeset::new(4, [4, 5])).unwrap();
        let report = model.fuse_nodes("m", &[3, 4], 1e-9).unwrap();
        assert_eq!(report.merged.get(&4), Some(&3));
        assert_eq!(model.nodesets[&4].nodes.iter().copied().collect::<Vec<_>>(), vec![3, 5]);
        assert_eq!(model.mesh("m").unwrap().elements[&3].nodes, vec![3, 5]);
    }
}
