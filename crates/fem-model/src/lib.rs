//! Entity model and topology engine for finite-element pre-processing.
//!
//! Meshes own nodes and elements in id-keyed arenas; every cross reference is
//! an integer id. The [`Model`] aggregate holds meshes together with the
//! global sets, materials and sections their solutions refer to.
//!
//! Mutating operations live in [`topology`] (copy, mirror, extrude, convert,
//! fuse, split, renumber) and [`delete`] (cascading removal). They validate
//! before they mutate, so a failed call leaves the model unchanged.

pub mod delete;
pub mod error;
pub mod family;
pub mod geometry;
pub mod materials;
pub mod mesh;
pub mod model;
pub mod sets;
pub mod solution;
pub mod topology;

pub use delete::{DeleteTarget, delete_from_model};
pub use error::{ModelError, Result};
pub use family::{ElementFamily, SectionCategory};
pub use geometry::{Extent, Plane, Point};
pub use materials::{
    CrossSection, LEGACY_DENSITY, Material, Section, SectionProperties, SectionShape,
};
pub use mesh::{BeamOrientation, Element, Mesh, MeshStatistics, Node};
pub use model::Model;
pub use sets::{DEFAULT_ELEMENTSET, Elementset, Nodeset};
pub use solution::{
    Boundary, BoundaryKind, Constraint, ConstraintKind, Damping, Load, LoadKind, LoadTarget,
    ResultKind, Solution, SolutionType, Table, normalize_dofs, parse_dofs,
};
pub use topology::{BatchReport, ExtrudeParams, FuseReport, Skipped};
