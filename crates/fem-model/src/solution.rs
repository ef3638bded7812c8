//! Named solutions and the boundary conditions, constraints and loads they own.
//!
//! Records never hold node or element ids directly; they point at global
//! nodesets and elementsets.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SolutionType {
    Static,
    Eigenmodes,
    ModalDynamic,
    StaticPlastic,
    HeatTransfer,
}

impl SolutionType {
    pub const ALL: [SolutionType; 5] = [
        SolutionType::Static,
        SolutionType::Eigenmodes,
        SolutionType::ModalDynamic,
        SolutionType::StaticPlastic,
        SolutionType::HeatTransfer,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            SolutionType::Static => "Static",
            SolutionType::Eigenmodes => "Eigenmodes",
            SolutionType::ModalDynamic => "ModalDynamic",
            SolutionType::StaticPlastic => "StaticPlastic",
            SolutionType::HeatTransfer => "HeatTransfer",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.keyword() == keyword)
    }
}

/// Result categories a solution asks the solver to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResultKind {
    Displacement,
    NodeForce,
    ElementForce,
    Stress,
    Strain,
    ModeShapes,
    Acceleration,
    Velocity,
    FrfAccel,
}

impl ResultKind {
    pub const ALL: [ResultKind; 9] = [
        ResultKind::Displacement,
        ResultKind::NodeForce,
        ResultKind::ElementForce,
        ResultKind::Stress,
        ResultKind::Strain,
        ResultKind::ModeShapes,
        ResultKind::Acceleration,
        ResultKind::Velocity,
        ResultKind::FrfAccel,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            ResultKind::Displacement => "DISPLACEMENT",
            ResultKind::NodeForce => "NODEFORCE",
            ResultKind::ElementForce => "ELEMENTFORCE",
            ResultKind::Stress => "STRESS",
            ResultKind::Strain => "STRAIN",
            ResultKind::ModeShapes => "MODESHAPES",
            ResultKind::Acceleration => "ACCELERATION",
            ResultKind::Velocity => "VELOCITY",
            ResultKind::FrfAccel => "FRF_ACCEL",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.keyword() == keyword)
    }
}

/// Rayleigh damping coefficients for modal dynamic solutions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Damping {
    pub alpha: f64,
    pub beta: f64,
}

/// Piecewise-linear table, e.g. a load amplitude over frequency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundaryKind {
    Displacement,
}

impl BoundaryKind {
    pub fn keyword(self) -> &'static str {
        match self {
            BoundaryKind::Displacement => "Displacement",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        (keyword == "Displacement").then_some(BoundaryKind::Displacement)
    }
}

/// Prescribed displacement on every node of a nodeset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    pub name: String,
    pub kind: BoundaryKind,
    pub nodeset: i32,
    pub value: f64,
    /// Active degrees of freedom, 1-6, ascending
    pub dofs: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ConstraintKind {
    /// Ties the listed DOFs of two nodesets together.
    NodeLock,
    /// Like `NodeLock`, restricted to node pairs closer than `tolerance`.
    TouchLock { tolerance: f64 },
}

impl ConstraintKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            ConstraintKind::NodeLock => "NodeLock",
            ConstraintKind::TouchLock { .. } => "TouchLock",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub name: String,
    pub kind: ConstraintKind,
    pub nodesets: (i32, i32),
    pub dofs: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoadKind {
    Force,
    ForceConcentrated,
    ForceDistributed,
    Torque,
    Gravity,
    DynamicForce,
    DynamicTorque,
}

impl LoadKind {
    pub const ALL: [LoadKind; 7] = [
        LoadKind::Force,
        LoadKind::ForceConcentrated,
        LoadKind::ForceDistributed,
        LoadKind::Torque,
        LoadKind::Gravity,
        LoadKind::DynamicForce,
        LoadKind::DynamicTorque,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            LoadKind::Force => "Force",
            LoadKind::ForceConcentrated => "ForceConcentrated",
            LoadKind::ForceDistributed => "ForceDistributed",
            LoadKind::Torque => "Torque",
            LoadKind::Gravity => "Gravity",
            LoadKind::DynamicForce => "DynamicForce",
            LoadKind::DynamicTorque => "DynamicTorque",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.keyword() == keyword)
    }

    /// Distributed and body loads act on elements, the rest on nodes.
    pub fn targets_elements(self) -> bool {
        matches!(self, LoadKind::ForceDistributed | LoadKind::Gravity)
    }

    pub fn is_dynamic(self) -> bool {
        matches!(self, LoadKind::DynamicForce | LoadKind::DynamicTorque)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadTarget {
    Nodeset(i32),
    Elementset(i32),
}

impl LoadTarget {
    pub fn set_id(self) -> i32 {
        match self {
            LoadTarget::Nodeset(id) | LoadTarget::Elementset(id) => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Load {
    pub name: String,
    pub kind: LoadKind,
    pub target: LoadTarget,
    pub magnitude: f64,
    pub direction: [f64; 3],
    /// Amplitude table for dynamic loads
    pub table: Option<String>,
}

/// A named analysis configuration attached to one mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub name: String,
    pub kind: SolutionType,
    pub results: Vec<ResultKind>,
    pub damping: Option<Damping>,
    pub tables: BTreeMap<String, Table>,
    pub boundaries: BTreeMap<String, Boundary>,
    pub constraints: BTreeMap<String, Constraint>,
    pub loads: BTreeMap<String, Load>,
}

impl Solution {
    pub fn new(name: impl Into<String>, kind: SolutionType) -> Self {
        Self {
            name: name.into(),
            kind,
            results: Vec::new(),
            damping: None,
            tables: BTreeMap::new(),
            boundaries: BTreeMap::new(),
            constraints: BTreeMap::new(),
            loads: BTreeMap::new(),
        }
    }

    /// Adds a result category once, keeping request order.
    pub fn request_result(&mut self, kind: ResultKind) {
        if !self.results.contains(&kind) {
            self.results.push(kind);
        }
    }

    /// Nodesets referenced by any record, with the referencing record's name.
    pub fn nodeset_references(&self) -> Vec<(i32, String)> {
        let mut refs = Vec::new();
        for b in self.boundaries.values() {
            refs.push((b.nodeset, format!("boundary '{}'", b.name)));
        }
        for c in self.constraints.values() {
            refs.push((c.nodesets.0, format!("constraint '{}'", c.name)));
            refs.push((c.nodesets.1, format!("constraint '{}'", c.name)));
        }
        for l in self.loads.values() {
            if let LoadTarget::Nodeset(id) = l.target {
                refs.push((id, format!("load '{}'", l.name)));
            }
        }
        refs
    }

    /// Elementsets referenced by any load.
    pub fn elementset_references(&self) -> Vec<(i32, String)> {
        self.loads
            .values()
            .filter_map(|l| match l.target {
                LoadTarget::Elementset(id) => Some((id, format!("load '{}'", l.name))),
                LoadTarget::Nodeset(_) => None,
            })
            .collect()
    }
}

impl Display for SolutionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Normalises a degree-of-freedom list given as text: `"1,2,3"`,
/// `"[1, 2, 3]"`, `"(1 2 3)"` all yield `[1, 2, 3]`.
pub fn parse_dofs(input: &str) -> Result<Vec<u8>> {
    let inner = input
        .trim()
        .trim_start_matches(['[', '('])
        .trim_end_matches([']', ')']);
    let mut dofs = Vec::new();
    for token in inner.split(|c: char| c == ',' || c.is_whitespace()) {
        if token.is_empty() {
            continue;
        }
        let dof = token
            .parse::<u8>()
            .map_err(|_| ModelError::InvalidDof(input.to_string()))?;
        dofs.push(dof);
    }
    normalize_dofs(&dofs).map_err(|_| ModelError::InvalidDof(input.to_string()))
}

/// Sorts and deduplicates a list of DOF indices, all of which must be 1-6.
pub fn normalize_dofs(dofs: &[u8]) -> Result<Vec<u8>> {
    if dofs.is_empty() || dofs.iter().any(|d| !(1..=6).contains(d)) {
        return Err(ModelError::InvalidDof(format!("{dofs:?}")));
    }
    let mut out = dofs.to_vec();
    out.sort_unstable();
    out.dedup();
    Ok(out)
}
