//! Error types for fem-model

use thiserror::Error;

use crate::family::ElementFamily;

pub type Result<T> = std::result::Result<T, ModelError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("{entity} id {id} already exists")]
    DuplicateId { entity: &'static str, id: i32 },

    #[error("{entity} '{name}' already exists")]
    DuplicateName { entity: &'static str, name: String },

    #[error("selection mixes element families {first} and {second}")]
    MixedFamily {
        first: ElementFamily,
        second: ElementFamily,
    },

    #[error("'{0}' is not a positive integer")]
    NotAnInteger(String),

    #[error("{kind} {set} has members missing from mesh '{mesh}'")]
    SetNotInMesh {
        kind: &'static str,
        set: i32,
        mesh: String,
    },

    #[error("elements without a section in mesh '{mesh}': {elements:?}")]
    IncompleteSectionAssignment { mesh: String, elements: Vec<i32> },

    #[error("fusing node {dropped} into {kept} would collapse element {element}")]
    DegenerateFuse { element: i32, kept: i32, dropped: i32 },

    #[error("no conversion rule from {from} to {to}")]
    UnsupportedConversion {
        from: ElementFamily,
        to: ElementFamily,
    },

    #[error("{family} takes {expected} nodes, got {found}")]
    WrongArity {
        family: ElementFamily,
        expected: usize,
        found: usize,
    },

    #[error("unknown node {0}")]
    UnknownNode(i32),

    #[error("unknown element {0}")]
    UnknownElement(i32),

    #[error("unknown mesh '{0}'")]
    UnknownMesh(String),

    #[error("unknown solution '{name}' in mesh '{mesh}'")]
    UnknownSolution { mesh: String, name: String },

    #[error("unknown {kind} '{name}' in solution '{solution}'")]
    UnknownRecord {
        kind: &'static str,
        solution: String,
        name: String,
    },

    #[error("unknown material '{0}'")]
    UnknownMaterial(String),

    #[error("unknown section '{0}'")]
    UnknownSection(String),

    #[error("unknown nodeset {0}")]
    UnknownNodeset(i32),

    #[error("unknown elementset {0}")]
    UnknownElementset(i32),

    #[error("node {node} is still used by element {element}")]
    NodeInUse { node: i32, element: i32 },

    #[error("{kind} {set} is still referenced by {record}")]
    SetInUse {
        kind: &'static str,
        set: i32,
        record: String,
    },

    #[error("invalid degree of freedom list '{0}'")]
    InvalidDof(String),

    #[error("target block {first}..={last} overlaps the selection")]
    RenumberOverlap { first: i32, last: i32 },

    #[error("section '{section}' cannot be used by {family} elements")]
    SectionMismatch {
        section: String,
        family: ElementFamily,
    },

    #[error("element {0} is not a beam")]
    NotABeam(i32),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}
