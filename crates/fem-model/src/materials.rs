//! Materials, sections and parametric cross-sections.

use serde::{Deserialize, Serialize};

use crate::family::{ElementFamily, SectionCategory};

/// Density assumed for material records that predate the density field.
pub const LEGACY_DENSITY: f64 = 1.0;

/// A linear elastic isotropic material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    /// Young's modulus (E)
    pub youngs_modulus: f64,
    /// Poisson's ratio (ν)
    pub poisson_ratio: f64,
    pub density: f64,
}

impl Material {
    pub fn new(
        name: impl Into<String>,
        youngs_modulus: f64,
        poisson_ratio: f64,
        density: f64,
    ) -> Self {
        Self {
            name: name.into(),
            youngs_modulus,
            poisson_ratio,
            density,
        }
    }

    /// Get the shear modulus (G) from E and ν
    pub fn shear_modulus(&self) -> f64 {
        self.youngs_modulus / (2.0 * (1.0 + self.poisson_ratio))
    }
}

/// Shape-specific section parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SectionShape {
    Solid,
    Rod { area: f64 },
    /// `iyy` is only present for beams that bend out of the XY plane.
    Beam { area: f64, izz: f64, iyy: Option<f64> },
    Plane { thickness: f64 },
}

impl SectionShape {
    pub fn category(&self) -> SectionCategory {
        match self {
            SectionShape::Solid => SectionCategory::Solid,
            SectionShape::Rod { .. } => SectionCategory::Rod,
            SectionShape::Beam { .. } => SectionCategory::Beam,
            SectionShape::Plane { .. } => SectionCategory::Plane,
        }
    }
}

/// Parametric cross-section of a rod or beam.
///
/// Dimension names: `w`/`h` width and height, `i*` inner (hollow) sizes,
/// `tw`/`tt` top flange width and thickness, `mt` web thickness, `bw`/`bt`
/// bottom flange width and thickness, `st` vertical leg thickness.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CrossSection {
    Rectangle { w: f64, h: f64, iw: f64, ih: f64 },
    Circle { r: f64, ir: f64 },
    IBeam { tw: f64, tt: f64, mt: f64, bw: f64, bt: f64, h: f64 },
    CBeam { tw: f64, tt: f64, mt: f64, bw: f64, bt: f64, h: f64 },
    TBeam { tw: f64, tt: f64, mt: f64, h: f64 },
    LBeam { st: f64, bw: f64, bt: f64, h: f64 },
}

/// Area and second moments of a cross-section about its centroid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionProperties {
    pub area: f64,
    /// About the horizontal (local z) axis
    pub izz: f64,
    /// About the vertical (local y) axis
    pub iyy: f64,
}

/// Axis-aligned rectangle: centre (x, y), width b along x, height d along y.
struct Rect {
    x: f64,
    y: f64,
    b: f64,
    d: f64,
}

fn rect(x: f64, y: f64, b: f64, d: f64) -> Rect {
    Rect { x, y, b, d }
}

fn composite(rects: &[Rect]) -> SectionProperties {
    let area: f64 = rects.iter().map(|r| r.b * r.d).sum();
    if area <= 0.0 {
        return SectionProperties {
            area,
            izz: 0.0,
            iyy: 0.0,
        };
    }
    let xc = rects.iter().map(|r| r.b * r.d * r.x).sum::<f64>() / area;
    let yc = rects.iter().map(|r| r.b * r.d * r.y).sum::<f64>() / area;
    let izz = rects
        .iter()
        .map(|r| r.b * r.d.powi(3) / 12.0 + r.b * r.d * (r.y - yc).powi(2))
        .sum();
    let iyy = rects
        .iter()
        .map(|r| r.d * r.b.powi(3) / 12.0 + r.b * r.d * (r.x - xc).powi(2))
        .sum();
    SectionProperties { area, izz, iyy }
}

impl CrossSection {
    pub fn shape_name(&self) -> &'static str {
        match self {
            CrossSection::Rectangle { .. } => "Rectangle",
            CrossSection::Circle { .. } => "Circle",
            CrossSection::IBeam { .. } => "I-Beam",
            CrossSection::CBeam { .. } => "C-Beam",
            CrossSection::TBeam { .. } => "T-Beam",
            CrossSection::LBeam { .. } => "L-Beam",
        }
    }

    /// Dimensions in file order.
    pub fn dimensions(&self) -> Vec<f64> {
        match *self {
            CrossSection::Rectangle { w, h, iw, ih } => vec![w, h, iw, ih],
            CrossSection::Circle { r, ir } => vec![r, ir],
            CrossSection::IBeam { tw, tt, mt, bw, bt, h }
            | CrossSection::CBeam { tw, tt, mt, bw, bt, h } => vec![tw, tt, mt, bw, bt, h],
            CrossSection::TBeam { tw, tt, mt, h } => vec![tw, tt, mt, h],
            CrossSection::LBeam { st, bw, bt, h } => vec![st, bw, bt, h],
        }
    }

    /// Number of dimensions a shape takes, `None` for an unknown shape name.
    pub fn dimension_count(shape_name: &str) -> Option<usize> {
        match shape_name {
            "Rectangle" => Some(4),
            "Circle" => Some(2),
            "I-Beam" | "C-Beam" => Some(6),
            "T-Beam" | "L-Beam" => Some(4),
            _ => None,
        }
    }

    /// Rebuilds a cross-section from its shape name and file-ordered dimensions.
    pub fn from_dimensions(shape_name: &str, d: &[f64]) -> Option<Self> {
        if Self::dimension_count(shape_name)? != d.len() {
            return None;
        }
        Some(match shape_name {
            "Rectangle" => CrossSection::Rectangle {
                w: d[0],
                h: d[1],
                iw: d[2],
                ih: d[3],
            },
            "Circle" => CrossSection::Circle { r: d[0], ir: d[1] },
            "I-Beam" => CrossSection::IBeam {
                tw: d[0],
                tt: d[1],
                mt: d[2],
                bw: d[3],
                bt: d[4],
                h: d[5],
            },
            "C-Beam" => CrossSection::CBeam {
                tw: d[0],
                tt: d[1],
                mt: d[2],
                bw: d[3],
                bt: d[4],
                h: d[5],
            },
            "T-Beam" => CrossSection::TBeam {
                tw: d[0],
                tt: d[1],
                mt: d[2],
                h: d[3],
            },
            _ => CrossSection::LBeam {
                st: d[0],
                bw: d[1],
                bt: d[2],
                h: d[3],
            },
        })
    }

    pub fn properties(&self) -> SectionProperties {
        match *self {
            CrossSection::Rectangle { w, h, iw, ih } => SectionProperties {
                area: w * h - iw * ih,
                izz: (w * h.powi(3) - iw * ih.powi(3)) / 12.0,
                iyy: (h * w.powi(3) - ih * iw.powi(3)) / 12.0,
            },
            CrossSection::Circle { r, ir } => {
                let i = std::f64::consts::PI * (r.powi(4) - ir.powi(4)) / 4.0;
                SectionProperties {
                    area: std::f64::consts::PI * (r.powi(2) - ir.powi(2)),
                    izz: i,
                    iyy: i,
                }
            }
            CrossSection::IBeam { tw, tt, mt, bw, bt, h } => {
                let web = h - tt - bt;
                composite(&[
                    rect(0.0, bt / 2.0, bw, bt),
                    rect(0.0, bt + web / 2.0, mt, web),
                    rect(0.0, h - tt / 2.0, tw, tt),
                ])
            }
            CrossSection::CBeam { tw, tt, mt, bw, bt, h } => {
                // Flanges run from the back of the web in +x.
                let web = h - tt - bt;
                composite(&[
                    rect(bw / 2.0, bt / 2.0, bw, bt),
                    rect(mt / 2.0, bt + web / 2.0, mt, web),
                    rect(tw / 2.0, h - tt / 2.0, tw, tt),
                ])
            }
            CrossSection::TBeam { tw, tt, mt, h } => {
                let web = h - tt;
                composite(&[
                    rect(0.0, web / 2.0, mt, web),
                    rect(0.0, h - tt / 2.0, tw, tt),
                ])
            }
            CrossSection::LBeam { st, bw, bt, h } => {
                let foot = bw - st;
                composite(&[
                    rect(st / 2.0, h / 2.0, st, h),
                    rect(st + foot / 2.0, bt / 2.0, foot, bt),
                ])
            }
        }
    }
}

/// A named section tying a material to shape parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub material: String,
    pub shape: SectionShape,
    pub cross_section: Option<CrossSection>,
}

impl Section {
    pub fn new(name: impl Into<String>, material: impl Into<String>, shape: SectionShape) -> Self {
        Self {
            name: name.into(),
            material: material.into(),
            shape,
            cross_section: None,
        }
    }

    /// Rod or beam section whose numbers come from a parametric cross-section.
    /// `three_d` keeps Iyy for beams bending out of plane.
    pub fn from_cross_section(
        name: impl Into<String>,
        material: impl Into<String>,
        category: SectionCategory,
        cross_section: CrossSection,
        three_d: bool,
    ) -> Option<Self> {
        let props = cross_section.properties();
        let shape = match category {
            SectionCategory::Rod => SectionShape::Rod { area: props.area },
            SectionCategory::Beam => SectionShape::Beam {
                area: props.area,
                izz: props.izz,
                iyy: three_d.then_some(props.iyy),
            },
            _ => return None,
        };
        Some(Self {
            name: name.into(),
            material: material.into(),
            shape,
            cross_section: Some(cross_section),
        })
    }

    /// Whether elements of `family` can carry this section.
    pub fn accepts(&self, family: ElementFamily) -> bool {
        if self.shape.category() != family.section_category() {
            return false;
        }
        // 3-D beams bend about both axes.
        !matches!(
            (family, &self.shape),
            (ElementFamily::Beam2N, SectionShape::Beam { iyy: None, .. })
        )
    }
}
