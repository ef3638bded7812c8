use std::fmt::{Display, Formatter};

/// Directive keywords understood by the `.sol` format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directive {
    Solution,
    Meshes,
    Boundaries,
    Constraints,
    Loads,
    Results,
    Displacement,
    NodeForce,
    ElementForce,
    Stress,
    Strain,
    ModeShapes,
    Acceleration,
    Velocity,
    FrfAccel,
    SetNodes,
    SetElements,
    Material,
    Section,
    BeamOrient,
    Damping,
    Table,
    Boundary,
    Constraint,
    Load,
    Node,
    Element,
}

const ALL: &[Directive] = &[
    Directive::Solution,
    Directive::Meshes,
    Directive::Boundaries,
    Directive::Constraints,
    Directive::Loads,
    Directive::Results,
    Directive::Displacement,
    Directive::NodeForce,
    Directive::ElementForce,
    Directive::Stress,
    Directive::Strain,
    Directive::ModeShapes,
    Directive::Acceleration,
    Directive::Velocity,
    Directive::FrfAccel,
    Directive::SetNodes,
    Directive::SetElements,
    Directive::Material,
    Directive::Section,
    Directive::BeamOrient,
    Directive::Damping,
    Directive::Table,
    Directive::Boundary,
    Directive::Constraint,
    Directive::Load,
    Directive::Node,
    Directive::Element,
];

impl Directive {
    /// Keywords are upper-case in the format; lookup is exact.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        ALL.iter().copied().find(|d| d.keyword() == keyword)
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Directive::Solution => "SOLUTION",
            Directive::Meshes => "MESHES",
            Directive::Boundaries => "BOUNDARIES",
            Directive::Constraints => "CONSTRAINTS",
            Directive::Loads => "LOADS",
            Directive::Results => "RESULTS",
            Directive::Displacement => "DISPLACEMENT",
            Directive::NodeForce => "NODEFORCE",
            Directive::ElementForce => "ELEMENTFORCE",
            Directive::Stress => "STRESS",
            Directive::Strain => "STRAIN",
            Directive::ModeShapes => "MODESHAPES",
            Directive::Acceleration => "ACCELERATION",
            Directive::Velocity => "VELOCITY",
            Directive::FrfAccel => "FRF_ACCEL",
            Directive::SetNodes => "SET_NODES",
            Directive::SetElements => "SET_ELEMENTS",
            Directive::Material => "MATERIAL",
            Directive::Section => "SECTION",
            Directive::BeamOrient => "BEAMORIENT",
            Directive::Damping => "DAMPING",
            Directive::Table => "TABLE",
            Directive::Boundary => "BOUNDARY",
            Directive::Constraint => "CONSTRAINT",
            Directive::Load => "LOAD",
            Directive::Node => "NODE",
            Directive::Element => "ELEMENT",
        }
    }

    /// Result-kind keywords that may follow a `RESULTS` line.
    pub fn is_result_kind(self) -> bool {
        matches!(
            self,
            Directive::Displacement
                | Directive::NodeForce
                | Directive::ElementForce
                | Directive::Stress
                | Directive::Strain
                | Directive::ModeShapes
                | Directive::Acceleration
                | Directive::Velocity
                | Directive::FrfAccel
        )
    }
}

impl Display for Directive {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}
