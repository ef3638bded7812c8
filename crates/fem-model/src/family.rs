//! Element families and their fixed node-ordering conventions.
//!
//! Corners always come first. Quadratic families append one mid-edge node per
//! edge of their linear base, in the order of that base's edge table:
//!
//! - TRI6N: mids on (1,2), (2,3), (3,1)
//! - QUAD8N: mids on (1,2), (2,3), (3,4), (4,1)
//! - TET10N: mids on (1,2), (2,3), (3,1), (1,4), (2,4), (3,4)
//! - HEX20N: mids on the bottom ring, the top ring, then the four verticals
//!
//! HEX8N lists the bottom face 1-4 counter-clockwise seen from above, then the
//! top face 5-8 with node 5 above node 1.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Closed set of supported element families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ElementFamily {
    /// 2-node 3D truss
    Rod2N,
    /// 2-node truss in the XY plane
    Rod2N2D,
    /// 2-node 3D beam
    Beam2N,
    /// 2-node beam in the XY plane
    Beam2N2D,
    Tri3N,
    Tri6N,
    Quad4N,
    Quad8N,
    Tet4N,
    Tet10N,
    Hex8N,
    Hex20N,
}

/// Section type an element family consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionCategory {
    Rod,
    Beam,
    Plane,
    Solid,
}

const LINE_EDGES: &[(usize, usize)] = &[(0, 1)];
const TRI_EDGES: &[(usize, usize)] = &[(0, 1), (1, 2), (2, 0)];
const QUAD_EDGES: &[(usize, usize)] = &[(0, 1), (1, 2), (2, 3), (3, 0)];
const TET_EDGES: &[(usize, usize)] = &[(0, 1), (1, 2), (2, 0), (0, 3), (1, 3), (2, 3)];
const HEX_EDGES: &[(usize, usize)] = &[
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 0),
    (4, 5),
    (5, 6),
    (6, 7),
    (7, 4),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

impl ElementFamily {
    pub const ALL: [ElementFamily; 12] = [
        ElementFamily::Rod2N,
        ElementFamily::Rod2N2D,
        ElementFamily::Beam2N,
        ElementFamily::Beam2N2D,
        ElementFamily::Tri3N,
        ElementFamily::Tri6N,
        ElementFamily::Quad4N,
        ElementFamily::Quad8N,
        ElementFamily::Tet4N,
        ElementFamily::Tet10N,
        ElementFamily::Hex8N,
        ElementFamily::Hex20N,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            ElementFamily::Rod2N => "ROD2N",
            ElementFamily::Rod2N2D => "ROD2N2D",
            ElementFamily::Beam2N => "BEAM2N",
            ElementFamily::Beam2N2D => "BEAM2N2D",
            ElementFamily::Tri3N => "TRI3N",
            ElementFamily::Tri6N => "TRI6N",
            ElementFamily::Quad4N => "QUAD4N",
            ElementFamily::Quad8N => "QUAD8N",
            ElementFamily::Tet4N => "TET4N",
            ElementFamily::Tet10N => "TET10N",
            ElementFamily::Hex8N => "HEX8N",
            ElementFamily::Hex20N => "HEX20N",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let upper = keyword.trim().to_ascii_uppercase();
        Self::ALL.into_iter().find(|f| f.keyword() == upper)
    }

    /// Number of nodes an element of this family references.
    pub fn arity(self) -> usize {
        match self {
            ElementFamily::Rod2N
            | ElementFamily::Rod2N2D
            | ElementFamily::Beam2N
            | ElementFamily::Beam2N2D => 2,
            ElementFamily::Tri3N => 3,
            ElementFamily::Tri6N => 6,
            ElementFamily::Quad4N => 4,
            ElementFamily::Quad8N => 8,
            ElementFamily::Tet4N => 4,
            ElementFamily::Tet10N => 10,
            ElementFamily::Hex8N => 8,
            ElementFamily::Hex20N => 20,
        }
    }

    pub fn corner_count(self) -> usize {
        self.linear().arity()
    }

    /// Topological dimension: 1 for lines, 2 for faces, 3 for solids.
    pub fn dimension(self) -> usize {
        match self {
            ElementFamily::Rod2N
            | ElementFamily::Rod2N2D
            | ElementFamily::Beam2N
            | ElementFamily::Beam2N2D => 1,
            ElementFamily::Tri3N
            | ElementFamily::Tri6N
            | ElementFamily::Quad4N
            | ElementFamily::Quad8N => 2,
            ElementFamily::Tet4N
            | ElementFamily::Tet10N
            | ElementFamily::Hex8N
            | ElementFamily::Hex20N => 3,
        }
    }

    pub fn is_line(self) -> bool {
        self.dimension() == 1
    }

    pub fn is_beam(self) -> bool {
        matches!(self, ElementFamily::Beam2N | ElementFamily::Beam2N2D)
    }

    /// Families that live in the XY plane of a 2-D analysis.
    pub fn is_planar(self) -> bool {
        matches!(
            self,
            ElementFamily::Rod2N2D
                | ElementFamily::Beam2N2D
                | ElementFamily::Tri3N
                | ElementFamily::Tri6N
                | ElementFamily::Quad4N
                | ElementFamily::Quad8N
        )
    }

    pub fn is_quadratic(self) -> bool {
        self.linear() != self
    }

    /// Corner-only sibling.
    pub fn linear(self) -> Self {
        match self {
            ElementFamily::Tri6N => ElementFamily::Tri3N,
            ElementFamily::Quad8N => ElementFamily::Quad4N,
            ElementFamily::Tet10N => ElementFamily::Tet4N,
            ElementFamily::Hex20N => ElementFamily::Hex8N,
            other => other,
        }
    }

    /// Mid-edge sibling, if one exists.
    pub fn quadratic(self) -> Option<Self> {
        match self {
            ElementFamily::Tri3N => Some(ElementFamily::Tri6N),
            ElementFamily::Quad4N => Some(ElementFamily::Quad8N),
            ElementFamily::Tet4N => Some(ElementFamily::Tet10N),
            ElementFamily::Hex8N => Some(ElementFamily::Hex20N),
            _ => None,
        }
    }

    /// Corner pairs of every edge, in canonical order.
    pub fn edges(self) -> &'static [(usize, usize)] {
        match self.linear() {
            ElementFamily::Tri3N => TRI_EDGES,
            ElementFamily::Quad4N => QUAD_EDGES,
            ElementFamily::Tet4N => TET_EDGES,
            ElementFamily::Hex8N => HEX_EDGES,
            _ => LINE_EDGES,
        }
    }

    /// Corner pair carrying each mid-edge slot; slot `corner_count() + k`
    /// sits on `mid_edges()[k]`.
    pub fn mid_edges(self) -> &'static [(usize, usize)] {
        if self.is_quadratic() { self.edges() } else { &[] }
    }

    /// Mid-edge slot for the edge between corners `a` and `b`, either order.
    pub fn mid_slot(self, a: usize, b: usize) -> Option<usize> {
        self.mid_edges()
            .iter()
            .position(|&(p, q)| (p, q) == (a, b) || (p, q) == (b, a))
            .map(|k| self.corner_count() + k)
    }

    /// Corners sharing an edge with `corner`.
    pub fn corner_neighbours(self, corner: usize) -> Vec<usize> {
        self.edges()
            .iter()
            .filter_map(|&(a, b)| {
                if a == corner {
                    Some(b)
                } else if b == corner {
                    Some(a)
                } else {
                    None
                }
            })
            .collect()
    }

    pub fn section_category(self) -> SectionCategory {
        match self {
            ElementFamily::Rod2N | ElementFamily::Rod2N2D => SectionCategory::Rod,
            ElementFamily::Beam2N | ElementFamily::Beam2N2D => SectionCategory::Beam,
            ElementFamily::Tri3N
            | ElementFamily::Tri6N
            | ElementFamily::Quad4N
            | ElementFamily::Quad8N => SectionCategory::Plane,
            ElementFamily::Tet4N
            | ElementFamily::Tet10N
            | ElementFamily::Hex8N
            | ElementFamily::Hex20N => SectionCategory::Solid,
        }
    }
}

impl Display for ElementFamily {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}
