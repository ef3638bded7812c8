//! Mesh data structures.
//!
//! A `Mesh` owns its nodes and elements in id-keyed arenas. Elements refer to
//! nodes by id only; node-to-element adjacency is never stored and is
//! recomputed by scanning when needed.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::family::ElementFamily;
use crate::geometry::{self, Extent, Point};
use crate::solution::Solution;

/// A node in the finite element mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Node ID (positive, unique within a mesh)
    pub id: i32,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Node {
    pub fn new(id: i32, x: f64, y: f64, z: f64) -> Self {
        Self { id, x, y, z }
    }

    pub fn at(id: i32, p: Point) -> Self {
        Self::new(id, p[0], p[1], p[2])
    }

    /// Get coordinates as an array
    pub fn coords(&self) -> Point {
        [self.x, self.y, self.z]
    }

    pub fn set_coords(&mut self, p: Point) {
        self.x = p[0];
        self.y = p[1];
        self.z = p[2];
    }
}

/// Local frame of a beam element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamOrientation {
    pub x_vec: Point,
    pub y_vec: Point,
    pub z_vec: Point,
    /// Distance between the two end nodes when the frame was computed.
    pub length: f64,
}

impl BeamOrientation {
    /// Builds the frame from the beam axis and a hint for local y. The hint is
    /// made orthogonal to the axis; `None` when it is parallel to it.
    pub fn from_axis(axis: Point, y_hint: Point) -> Option<Self> {
        let length = geometry::norm(axis);
        let x_vec = geometry::normalize(axis)?;
        let projected = geometry::sub(y_hint, geometry::scale(x_vec, geometry::dot(y_hint, x_vec)));
        let y_vec = geometry::normalize(projected)?;
        let z_vec = geometry::cross(x_vec, y_vec);
        Some(Self {
            x_vec,
            y_vec,
            z_vec,
            length,
        })
    }
}

/// An element in the finite element mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Element ID (positive, unique within a mesh)
    pub id: i32,
    pub family: ElementFamily,
    /// Node connectivity in the family's canonical order
    pub nodes: Vec<i32>,
    /// Section name, `None` until assigned
    pub section: Option<String>,
    /// Local frame, BEAM families only
    pub orientation: Option<BeamOrientation>,
}

impl Element {
    pub fn new(id: i32, family: ElementFamily, nodes: Vec<i32>) -> Self {
        Self {
            id,
            family,
            nodes,
            section: None,
            orientation: None,
        }
    }

    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    /// Validate that the element has the correct number of nodes
    pub fn validate(&self) -> Result<()> {
        let expected = self.family.arity();
        if self.nodes.len() != expected {
            return Err(ModelError::WrongArity {
                family: self.family,
                expected,
                found: self.nodes.len(),
            });
        }
        Ok(())
    }

    pub fn corner_nodes(&self) -> &[i32] {
        let n = self.family.corner_count().min(self.nodes.len());
        &self.nodes[..n]
    }

    pub fn references(&self, node: i32) -> bool {
        self.nodes.contains(&node)
    }
}

/// Finite element mesh with its solutions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub name: String,
    /// All nodes in the mesh, indexed by node ID
    pub nodes: BTreeMap<i32, Node>,
    /// All elements in the mesh, indexed by element ID
    pub elements: BTreeMap<i32, Element>,
    pub solutions: BTreeMap<String, Solution>,
    /// Global nodesets consumed by this mesh's solutions
    pub nodesets: BTreeSet<i32>,
    /// Global elementsets this mesh was built from or whose records it holds
    pub elementsets: BTreeSet<i32>,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Inserts a node; fails if the id is taken.
    pub fn add_node(&mut self, node: Node) -> Result<()> {
        if self.nodes.contains_key(&node.id) {
            return Err(ModelError::DuplicateId {
                entity: "node",
                id: node.id,
            });
        }
        self.nodes.insert(node.id, node);
        Ok(())
    }

    /// Create a node at `(x, y, z)`. The caller's cached extent becomes stale.
    pub fn create_node(&mut self, id: i32, x: f64, y: f64, z: f64) -> Result<()> {
        if id <= 0 {
            return Err(ModelError::InvalidParameter(format!(
                "node id must be positive, got {id}"
            )));
        }
        self.add_node(Node::new(id, x, y, z))
    }

    /// Inserts an element after checking arity, id uniqueness and that every
    /// referenced node exists.
    pub fn add_element(&mut self, element: Element) -> Result<()> {
        element.validate()?;
        if self.elements.contains_key(&element.id) {
            return Err(ModelError::DuplicateId {
                entity: "element",
                id: element.id,
            });
        }
        if let Some(&missing) = element.nodes.iter().find(|n| !self.nodes.contains_key(n)) {
            return Err(ModelError::UnknownNode(missing));
        }
        self.elements.insert(element.id, element);
        Ok(())
    }

    pub fn create_element(
        &mut self,
        id: i32,
        family: ElementFamily,
        nodes: Vec<i32>,
    ) -> Result<()> {
        if id <= 0 {
            return Err(ModelError::InvalidParameter(format!(
                "element id must be positive, got {id}"
            )));
        }
        self.add_element(Element::new(id, family, nodes))
    }

    /// Get a node by ID
    pub fn get_node(&self, id: i32) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Get an element by ID
    pub fn get_element(&self, id: i32) -> Option<&Element> {
        self.elements.get(&id)
    }

    pub fn coords(&self, node: i32) -> Result<Point> {
        self.nodes
            .get(&node)
            .map(Node::coords)
            .ok_or(ModelError::UnknownNode(node))
    }

    /// Coordinates of every node of `element`, in slot order.
    pub fn element_coords(&self, element: &Element) -> Result<Vec<Point>> {
        element.nodes.iter().map(|&n| self.coords(n)).collect()
    }

    /// First free node id above every existing one.
    pub fn next_node_id(&self) -> i32 {
        self.nodes.keys().next_back().map_or(1, |id| id + 1)
    }

    /// First free element id above every existing one.
    pub fn next_element_id(&self) -> i32 {
        self.elements.keys().next_back().map_or(1, |id| id + 1)
    }

    /// Elements referencing `node`, ascending by id.
    pub fn elements_using(&self, node: i32) -> Vec<i32> {
        self.elements
            .values()
            .filter(|e| e.references(node))
            .map(|e| e.id)
            .collect()
    }

    /// Reference count of every node used by at least one element.
    pub fn node_usage(&self) -> HashMap<i32, usize> {
        let mut usage = HashMap::new();
        for element in self.elements.values() {
            for &node in &element.nodes {
                *usage.entry(node).or_insert(0) += 1;
            }
        }
        usage
    }

    /// Removes the given nodes that no element references; returns them.
    pub fn remove_unreferenced(&mut self, candidates: impl IntoIterator<Item = i32>) -> Vec<i32> {
        let usage = self.node_usage();
        let mut removed = Vec::new();
        for node in candidates {
            if !usage.contains_key(&node) && self.nodes.remove(&node).is_some() {
                removed.push(node);
            }
        }
        removed.sort_unstable();
        removed
    }

    /// Checks every selected element exists.
    pub fn require_elements(&self, ids: &[i32]) -> Result<()> {
        match ids.iter().find(|id| !self.elements.contains_key(id)) {
            Some(&missing) => Err(ModelError::UnknownElement(missing)),
            None => Ok(()),
        }
    }

    /// Checks every selected node exists.
    pub fn require_nodes(&self, ids: &[i32]) -> Result<()> {
        match ids.iter().find(|id| !self.nodes.contains_key(id)) {
            Some(&missing) => Err(ModelError::UnknownNode(missing)),
            None => Ok(()),
        }
    }

    /// Validate the mesh
    pub fn validate(&self) -> Result<()> {
        for element in self.elements.values() {
            element.validate()?;
            if let Some(&missing) = element.nodes.iter().find(|n| !self.nodes.contains_key(n)) {
                return Err(ModelError::UnknownNode(missing));
            }
        }
        Ok(())
    }

    /// Bounding box of all nodes, recomputed on every call.
    pub fn extent(&self) -> Option<Extent> {
        Extent::from_points(self.nodes.values().map(Node::coords))
    }

    /// Get mesh statistics
    pub fn statistics(&self) -> MeshStatistics {
        let mut family_counts = BTreeMap::new();
        for element in self.elements.values() {
            *family_counts.entry(element.family).or_insert(0) += 1;
        }

        MeshStatistics {
            name: self.name.clone(),
            num_nodes: self.nodes.len(),
            num_elements: self.elements.len(),
            num_solutions: self.solutions.len(),
            family_counts,
        }
    }
}

/// Mesh statistics for reporting
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeshStatistics {
    pub name: String,
    pub num_nodes: usize,
    pub num_elements: usize,
    pub num_solutions: usize,
    pub family_counts: BTreeMap<ElementFamily, usize>,
}

impl MeshStatistics {
    /// Format as a human-readable string
    pub fn format(&self) -> String {
        let mut lines = vec![
            format!("Mesh: {}", self.name),
            format!("Nodes: {}", self.num_nodes),
            format!("Elements: {}", self.num_elements),
            format!("Solutions: {}", self.num_solutions),
        ];

        if !self.family_counts.is_empty() {
            lines.push("Element families:".to_string());
            for (family, count) in &self.family_counts {
                lines.push(format!("  {family}: {count}"));
            }
        }

        lines.join("\n")
    }
}
