//! `.sol` writer for one mesh of a model.
//!
//! Output is deterministic: every collection is emitted in id or name order.
//! Elements outside every written elementset are written into set 999, and
//! `MESHES` lists exactly the elementsets in the file, so reading the text
//! back yields every element of the mesh.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use fem_model::{
    ConstraintKind, DEFAULT_ELEMENTSET, Element, Mesh, Model, ModelError, SectionCategory,
    SectionShape, Solution,
};
use fem_sol::{Directive, encode_id_ranges};
use log::debug;

use crate::error::{IoError, Result};
use crate::reader::{BEAM_SECTION, CROSS_SECTION_TAG, PLANE_SECTION, ROD_SECTION, SOLID_SECTION};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriterOptions {
    /// Comment written at the top of the file, one `#` line per text line.
    pub header: Option<String>,
    /// Fixed number of decimals for reals; shortest round-trip form if unset.
    pub precision: Option<usize>,
}

impl WriterOptions {
    fn number(&self, value: f64) -> String {
        match self.precision {
            Some(p) => format!("{value:.p$}"),
            None => value.to_string(),
        }
    }
}

/// Renders `mesh` and everything it uses as `.sol` text.
pub fn write_mesh(model: &Model, mesh: &str, options: &WriterOptions) -> Result<String> {
    let mesh = model.mesh(mesh)?;
    let unassigned: Vec<i32> = mesh
        .elements
        .values()
        .filter(|e| e.section.is_none())
        .map(|e| e.id)
        .collect();
    if !unassigned.is_empty() {
        return Err(ModelError::IncompleteSectionAssignment {
            mesh: mesh.name.clone(),
            elements: unassigned,
        }
        .into());
    }

    let mut writer = SolWriter {
        model,
        mesh,
        options,
        listing: Vec::new(),
        out: String::new(),
    };
    writer.header();
    writer.materials_and_sections()?;
    writer.nodes_and_elements();
    writer.sets()?;
    writer.solutions()?;
    debug!(
        "wrote mesh '{}': {} nodes, {} elements",
        mesh.name,
        mesh.nodes.len(),
        mesh.elements.len()
    );
    Ok(writer.out)
}

pub fn write_file(
    model: &Model,
    mesh: &str,
    path: impl AsRef<Path>,
    options: &WriterOptions,
) -> Result<()> {
    let text = write_mesh(model, mesh, options)?;
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, text)?;
    Ok(())
}

/// Names end up as bare comma-separated fields.
fn check_name(name: &str) -> Result<&str> {
    let bad = name.is_empty()
        || name.trim() != name
        || name.contains([',', '\n', '\r']);
    if bad {
        Err(IoError::InvalidName(name.to_string()))
    } else {
        Ok(name)
    }
}

fn section_keyword(category: SectionCategory) -> &'static str {
    match category {
        SectionCategory::Rod => ROD_SECTION,
        SectionCategory::Beam => BEAM_SECTION,
        SectionCategory::Plane => PLANE_SECTION,
        SectionCategory::Solid => SOLID_SECTION,
    }
}

struct SolWriter<'a> {
    model: &'a Model,
    mesh: &'a Mesh,
    options: &'a WriterOptions,
    /// Elementsets written to the file, in id order.
    listing: Vec<i32>,
    out: String,
}

impl SolWriter<'_> {
    fn line<I, S>(&mut self, directive: Directive, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.out.push_str(directive.keyword());
        for field in fields {
            self.out.push(',');
            self.out.push_str(field.as_ref());
        }
        self.out.push('\n');
    }

    fn num(&self, value: f64) -> String {
        self.options.number(value)
    }

    fn nums(&self, values: &[f64]) -> Vec<String> {
        values.iter().map(|v| self.num(*v)).collect()
    }

    fn header(&mut self) {
        if let Some(header) = &self.options.header {
            for text in header.lines() {
                self.out.push_str("# ");
                self.out.push_str(text);
                self.out.push('\n');
            }
        }
    }

    fn materials_and_sections(&mut self) -> Result<()> {
        let (model, mesh) = (self.model, self.mesh);
        let used: BTreeSet<&str> = mesh
            .elements
            .values()
            .filter_map(|e| e.section.as_deref())
            .collect();
        let mut sections = Vec::with_capacity(used.len());
        for name in used {
            let section = model
                .sections
                .get(name)
                .ok_or_else(|| ModelError::UnknownSection(name.to_string()))?;
            if let Some(element) = mesh.elements.values().find(|e| {
                e.section.as_deref() == Some(name) && !section.accepts(e.family)
            }) {
                return Err(IoError::SectionMismatch {
                    section: name.to_string(),
                    family: element.family,
                });
            }
            sections.push(section);
        }

        let materials: BTreeSet<&str> = sections.iter().map(|s| s.material.as_str()).collect();
        for name in materials {
            let material = model
                .materials
                .get(name)
                .ok_or_else(|| ModelError::UnknownMaterial(name.to_string()))?;
            let fields = vec![
                check_name(&material.name)?.to_string(),
                self.num(material.youngs_modulus),
                self.num(material.poisson_ratio),
                self.num(material.density),
            ];
            self.line(Directive::Material, fields);
        }

        for section in sections {
            let mut fields = vec![
                section_keyword(section.shape.category()).to_string(),
                check_name(&section.name)?.to_string(),
                section.material.clone(),
            ];
            fields.extend(match section.shape {
                SectionShape::Solid => Vec::new(),
                SectionShape::Rod { area } => self.nums(&[area]),
                SectionShape::Plane { thickness } => self.nums(&[thickness]),
                SectionShape::Beam { area, izz, iyy } => {
                    let mut values = vec![area, izz];
                    values.extend(iyy);
                    self.nums(&values)
                }
            });
            if let Some(cross_section) = &section.cross_section {
                fields.push(CROSS_SECTION_TAG.to_string());
                fields.push(cross_section.shape_name().to_string());
                fields.extend(self.nums(&cross_section.dimensions()));
            }
            self.line(Directive::Section, fields);
        }
        Ok(())
    }

    fn nodes_and_elements(&mut self) {
        let mesh = self.mesh;
        for node in mesh.nodes.values() {
            let fields = vec![
                node.id.to_string(),
                self.num(node.x),
                self.num(node.y),
                self.num(node.z),
            ];
            self.line(Directive::Node, fields);
        }
        for element in mesh.elements.values() {
            self.element(element);
        }
        for element in mesh.elements.values() {
            if let Some(frame) = &element.orientation {
                let mut fields = vec![element.id.to_string()];
                fields.extend(self.nums(&frame.x_vec));
                fields.extend(self.nums(&frame.y_vec));
                self.line(Directive::BeamOrient, fields);
            }
        }
    }

    fn element(&mut self, element: &Element) {
        let mut fields = vec![
            element.id.to_string(),
            element.family.keyword().to_string(),
            element.section.clone().unwrap_or_default(),
        ];
        fields.extend(element.nodes.iter().map(i32::to_string));
        self.line(Directive::Element, fields);
    }

    fn sets(&mut self) -> Result<()> {
        let (model, mesh) = (self.model, self.mesh);
        for id in model.nodesets_within(&mesh.name)? {
            let members: Vec<i32> = model.nodesets[&id].nodes.iter().copied().collect();
            self.set_line(Directive::SetNodes, id, &members);
        }

        let mut elementsets: BTreeMap<i32, BTreeSet<i32>> = model
            .elementsets_within(&mesh.name)?
            .into_iter()
            .map(|id| (id, model.elementsets[&id].elements.clone()))
            .collect();
        let covered: BTreeSet<i32> = elementsets.values().flatten().copied().collect();
        let uncovered: Vec<i32> = mesh
            .elements
            .keys()
            .copied()
            .filter(|id| !covered.contains(id))
            .collect();
        if !uncovered.is_empty() {
            debug!(
                "{} elements outside any written elementset, grouped into {DEFAULT_ELEMENTSET}",
                uncovered.len()
            );
            elementsets
                .entry(DEFAULT_ELEMENTSET)
                .or_default()
                .extend(uncovered);
        }
        for (id, members) in &elementsets {
            let members: Vec<i32> = members.iter().copied().collect();
            self.set_line(Directive::SetElements, *id, &members);
        }
        self.listing = elementsets.into_keys().collect();
        Ok(())
    }

    fn set_line(&mut self, directive: Directive, id: i32, members: &[i32]) {
        let encoded = encode_id_ranges(members);
        if encoded.is_empty() {
            self.line(directive, [id.to_string()]);
        } else {
            self.line(directive, [id.to_string(), encoded]);
        }
    }

    fn solutions(&mut self) -> Result<()> {
        let mesh = self.mesh;
        for solution in mesh.solutions.values() {
            self.solution_block(solution)?;
        }
        for solution in mesh.solutions.values() {
            self.records(solution)?;
        }
        Ok(())
    }

    fn solution_block(&mut self, solution: &Solution) -> Result<()> {
        let name = check_name(&solution.name)?;
        self.line(Directive::Solution, [name, solution.kind.keyword()]);
        if !self.listing.is_empty() {
            let ids: Vec<String> = self.listing.iter().map(i32::to_string).collect();
            self.line(Directive::Meshes, ids);
        }

        let declarations = [
            (Directive::Boundaries, solution.boundaries.keys().collect::<Vec<_>>()),
            (Directive::Constraints, solution.constraints.keys().collect()),
            (Directive::Loads, solution.loads.keys().collect()),
        ];
        for (directive, names) in declarations {
            if names.is_empty() {
                continue;
            }
            for name in &names {
                check_name(name)?;
            }
            self.line(directive, names);
        }

        if let Some(damping) = solution.damping {
            let fields = self.nums(&[damping.alpha, damping.beta]);
            self.line(Directive::Damping, fields);
        }
        for table in solution.tables.values() {
            let mut fields = vec![check_name(&table.name)?.to_string()];
            for (x, y) in &table.points {
                fields.push(self.num(*x));
                fields.push(self.num(*y));
            }
            self.line(Directive::Table, fields);
        }
        if !solution.results.is_empty() {
            self.out.push_str(Directive::Results.keyword());
            self.out.push('\n');
            for kind in &solution.results {
                self.out.push_str(kind.keyword());
                self.out.push('\n');
            }
        }
        Ok(())
    }

    fn records(&mut self, solution: &Solution) -> Result<()> {
        let owner = solution.name.as_str();
        for b in solution.boundaries.values() {
            let mut fields = vec![
                owner.to_string(),
                b.name.clone(),
                b.kind.keyword().to_string(),
                b.nodeset.to_string(),
                self.num(b.value),
            ];
            fields.extend(b.dofs.iter().map(u8::to_string));
            self.line(Directive::Boundary, fields);
        }
        for c in solution.constraints.values() {
            let mut fields = vec![
                owner.to_string(),
                c.name.clone(),
                c.kind.keyword().to_string(),
                c.nodesets.0.to_string(),
                c.nodesets.1.to_string(),
            ];
            if let ConstraintKind::TouchLock { tolerance } = c.kind {
                fields.push(self.num(tolerance));
            }
            fields.extend(c.dofs.iter().map(u8::to_string));
            self.line(Directive::Constraint, fields);
        }
        for l in solution.loads.values() {
            let mut fields = vec![
                owner.to_string(),
                l.name.clone(),
                l.kind.keyword().to_string(),
                l.target.set_id().to_string(),
                self.num(l.magnitude),
            ];
            fields.extend(self.nums(&l.direction));
            if let Some(table) = &l.table {
                fields.push(check_name(table)?.to_string());
            }
            self.line(Directive::Load, fields);
        }
        Ok(())
    }
}
