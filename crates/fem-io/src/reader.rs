//! `.sol` reader.
//!
//! Records are consumed in one streaming pass into a [`Builder`], which is
//! then assembled into a [`Model`]. `SOLUTION` opens a context that the
//! following `MESHES`, declaration, `DAMPING`, `TABLE` and `RESULTS` lines
//! attach to. `BOUNDARY`, `CONSTRAINT` and `LOAD` lines name their solution
//! and are attached to every solution of that name declared so far.
//!
//! Any malformed line aborts the read; no partial model is returned.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use fem_model::{
    BeamOrientation, Boundary, BoundaryKind, Constraint, ConstraintKind, CrossSection, Damping,
    DEFAULT_ELEMENTSET, Element, ElementFamily, Elementset, LEGACY_DENSITY, Load, LoadKind,
    LoadTarget, Material, Mesh, Model, Node, Nodeset, Point, ResultKind, Section, SectionShape,
    SolutionType, Table, geometry, parse_dofs,
};
use fem_sol::{Directive, Record, SolFile, decode_id_members};
use log::{debug, info};

use crate::error::{IoError, Result};

/// Field that introduces the optional parametric cross-section of a section.
pub const CROSS_SECTION_TAG: &str = "CrossSection";

/// Section type keywords, as written after `SECTION`.
pub const ROD_SECTION: &str = "RodSect";
pub const BEAM_SECTION: &str = "BeamSect";
pub const PLANE_SECTION: &str = "PlaneSect";
pub const SOLID_SECTION: &str = "SolidSect";

pub fn read_file(path: impl AsRef<Path>) -> Result<Model> {
    let raw = fs::read_to_string(path.as_ref())?;
    read_str(&raw)
}

pub fn read_str(raw: &str) -> Result<Model> {
    let file = SolFile::parse_str(raw)?;
    let mut builder = Builder::default();
    for record in &file.records {
        builder.consume(record)?;
    }
    let model = builder.assemble()?;
    info!(
        "read {} meshes, {} materials, {} sections",
        model.meshes.len(),
        model.materials.len(),
        model.sections.len()
    );
    Ok(model)
}

#[derive(Debug, Default)]
struct PendingSolution {
    name: String,
    kind: Option<SolutionType>,
    line: usize,
    meshes: Option<Vec<i32>>,
    declared_boundaries: Vec<String>,
    declared_constraints: Vec<String>,
    declared_loads: Vec<String>,
    results: Vec<ResultKind>,
    damping: Option<Damping>,
    tables: Vec<Table>,
    boundaries: Vec<Boundary>,
    constraints: Vec<Constraint>,
    loads: Vec<Load>,
}

#[derive(Debug, Default)]
struct Builder {
    model: Model,
    nodes: BTreeMap<i32, Node>,
    elements: BTreeMap<i32, Element>,
    /// Element -> (line, x vector, y vector)
    orientations: BTreeMap<i32, (usize, Point, Point)>,
    solutions: Vec<PendingSolution>,
    current: Option<usize>,
    results_open: bool,
}

fn model_error(record: &Record, err: fem_model::ModelError) -> IoError {
    IoError::malformed(record.line, err.to_string())
}

impl Builder {
    fn consume(&mut self, record: &Record) -> Result<()> {
        match record.directive {
            Directive::Material => self.material(record),
            Directive::Section => self.section(record),
            Directive::Node => self.node(record),
            Directive::Element => self.element(record),
            Directive::BeamOrient => self.beam_orientation(record),
            Directive::SetNodes => self.set(record, true),
            Directive::SetElements => self.set(record, false),
            Directive::Solution => self.solution(record),
            Directive::Boundary => self.boundary(record),
            Directive::Constraint => self.constraint(record),
            Directive::Load => self.load(record),
            _ => self.solution_detail(record),
        }
    }

    fn material(&mut self, record: &Record) -> Result<()> {
        record.expect_min_fields(3)?;
        let density = if record.fields.len() > 3 {
            record.float(3)?
        } else {
            LEGACY_DENSITY
        };
        let material = Material::new(record.field(0)?, record.float(1)?, record.float(2)?, density);
        self.model
            .add_material(material)
            .map_err(|e| model_error(record, e))
    }

    fn section(&mut self, record: &Record) -> Result<()> {
        record.expect_min_fields(3)?;
        let tag = record
            .fields
            .iter()
            .position(|f| f == CROSS_SECTION_TAG)
            .unwrap_or(record.fields.len());
        let numbers = record.floats(3..tag)?;
        let exact = |n: usize| -> Result<()> {
            if numbers.len() == n {
                Ok(())
            } else {
                let message = format!("section expects {n} values, found {}", numbers.len());
                Err(record.error(message).into())
            }
        };
        let shape = match record.field(0)? {
            ROD_SECTION => {
                exact(1)?;
                SectionShape::Rod { area: numbers[0] }
            }
            BEAM_SECTION => {
                if numbers.len() != 2 && numbers.len() != 3 {
                    exact(3)?;
                }
                SectionShape::Beam {
                    area: numbers[0],
                    izz: numbers[1],
                    iyy: numbers.get(2).copied(),
                }
            }
            PLANE_SECTION => {
                exact(1)?;
                SectionShape::Plane {
                    thickness: numbers[0],
                }
            }
            SOLID_SECTION => {
                exact(0)?;
                SectionShape::Solid
            }
            other => return Err(record.error(format!("unknown section type '{other}'")).into()),
        };

        let mut section = Section::new(record.field(1)?, record.field(2)?, shape);
        if tag < record.fields.len() {
            let shape_name = record.field(tag + 1)?;
            let dims = record.floats(tag + 2..record.fields.len())?;
            let cross_section = CrossSection::from_dimensions(shape_name, &dims).ok_or_else(|| {
                record.error(format!(
                    "cross-section '{shape_name}' does not take {} dimensions",
                    dims.len()
                ))
            })?;
            section.cross_section = Some(cross_section);
        }
        self.model
            .add_section(section)
            .map_err(|e| model_error(record, e))
    }

    fn node(&mut self, record: &Record) -> Result<()> {
        record.expect_min_fields(4)?;
        let id = record.int(0)?;
        let p = record.floats(1..4)?;
        if self.nodes.insert(id, Node::new(id, p[0], p[1], p[2])).is_some() {
            return Err(record.error(format!("duplicate node {id}")).into());
        }
        Ok(())
    }

    fn element(&mut self, record: &Record) -> Result<()> {
        record.expect_min_fields(3)?;
        let id = record.int(0)?;
        let keyword = record.field(1)?;
        let family = ElementFamily::from_keyword(keyword)
            .ok_or_else(|| record.error(format!("unknown element family '{keyword}'")))?;
        let section = match record.field(2)? {
            "" => None,
            name => Some(name.to_string()),
        };
        let element = Element {
            section,
            ..Element::new(id, family, record.ints_from(3)?)
        };
        element.validate().map_err(|e| model_error(record, e))?;
        if self.elements.insert(id, element).is_some() {
            return Err(record.error(format!("duplicate element {id}")).into());
        }
        Ok(())
    }

    fn beam_orientation(&mut self, record: &Record) -> Result<()> {
        record.expect_min_fields(7)?;
        let id = record.int(0)?;
        let v = record.floats(1..7)?;
        match self.elements.get(&id) {
            Some(e) if e.family.is_beam() => {}
            Some(_) => return Err(record.error(format!("element {id} is not a beam")).into()),
            None => return Err(record.error(format!("unknown element {id}")).into()),
        }
        self.orientations
            .insert(id, (record.line, [v[0], v[1], v[2]], [v[3], v[4], v[5]]));
        Ok(())
    }

    fn set(&mut self, record: &Record, nodes: bool) -> Result<()> {
        record.expect_min_fields(1)?;
        let id = record.int(0)?;
        let members = decode_id_members(&record.fields[1..]).map_err(|m| record.error(m))?;
        let added = if nodes {
            self.model.add_nodeset(Nodeset::new(id, members))
        } else {
            self.model.add_elementset(Elementset::new(id, members))
        };
        added.map_err(|e| model_error(record, e))
    }

    fn solution(&mut self, record: &Record) -> Result<()> {
        record.expect_min_fields(2)?;
        let keyword = record.field(1)?;
        let kind = SolutionType::from_keyword(keyword)
            .ok_or_else(|| record.error(format!("unknown solution type '{keyword}'")))?;
        self.solutions.push(PendingSolution {
            name: record.field(0)?.to_string(),
            kind: Some(kind),
            line: record.line,
            ..PendingSolution::default()
        });
        self.current = Some(self.solutions.len() - 1);
        self.results_open = false;
        Ok(())
    }

    fn current(&mut self, record: &Record) -> Result<&mut PendingSolution> {
        match self.current {
            Some(index) => Ok(&mut self.solutions[index]),
            None => Err(record
                .error(format!("{} outside of a SOLUTION block", record.directive))
                .into()),
        }
    }

    fn solution_detail(&mut self, record: &Record) -> Result<()> {
        let directive = record.directive;
        if directive.is_result_kind() {
            if !self.results_open {
                return Err(record
                    .error(format!("{directive} must follow a RESULTS line"))
                    .into());
            }
            let kind = result_kind(record, directive.keyword())?;
            let solution = self.current(record)?;
            if !solution.results.contains(&kind) {
                solution.results.push(kind);
            }
            return Ok(());
        }

        let fields: Vec<String> = record.fields.clone();
        match directive {
            Directive::Meshes => {
                let ids = record.ints_from(0)?;
                self.current(record)?.meshes = Some(ids);
            }
            Directive::Boundaries => self.current(record)?.declared_boundaries.extend(fields),
            Directive::Constraints => self.current(record)?.declared_constraints.extend(fields),
            Directive::Loads => self.current(record)?.declared_loads.extend(fields),
            Directive::Damping => {
                record.expect_min_fields(2)?;
                let damping = Damping {
                    alpha: record.float(0)?,
                    beta: record.float(1)?,
                };
                self.current(record)?.damping = Some(damping);
            }
            Directive::Table => {
                record.expect_min_fields(1)?;
                let values = record.floats(1..record.fields.len())?;
                if values.len() % 2 != 0 {
                    return Err(record.error("table values must come in x, y pairs").into());
                }
                let table = Table {
                    name: record.field(0)?.to_string(),
                    points: values.chunks(2).map(|p| (p[0], p[1])).collect(),
                };
                self.current(record)?.tables.push(table);
            }
            Directive::Results => {
                let kinds = fields
                    .iter()
                    .map(|f| result_kind(record, f))
                    .collect::<Result<Vec<_>>>()?;
                let solution = self.current(record)?;
                for kind in kinds {
                    if !solution.results.contains(&kind) {
                        solution.results.push(kind);
                    }
                }
                self.results_open = true;
            }
            other => {
                return Err(record.error(format!("unexpected directive {other}")).into());
            }
        }
        Ok(())
    }

    /// Indices of every solution declared so far under `name`.
    fn targets(&self, record: &Record, name: &str) -> Result<Vec<usize>> {
        let found: Vec<usize> = self
            .solutions
            .iter()
            .enumerate()
            .filter(|(_, s)| s.name == name)
            .map(|(i, _)| i)
            .collect();
        if found.is_empty() {
            return Err(record.error(format!("no solution named '{name}'")).into());
        }
        Ok(found)
    }

    fn dofs(record: &Record, start: usize) -> Result<Vec<u8>> {
        let text = record.fields[start.min(record.fields.len())..].join(",");
        parse_dofs(&text).map_err(|e| model_error(record, e))
    }

    fn boundary(&mut self, record: &Record) -> Result<()> {
        record.expect_min_fields(6)?;
        let keyword = record.field(2)?;
        let kind = BoundaryKind::from_keyword(keyword)
            .ok_or_else(|| record.error(format!("unknown boundary type '{keyword}'")))?;
        let boundary = Boundary {
            name: record.field(1)?.to_string(),
            kind,
            nodeset: record.int(3)?,
            value: record.float(4)?,
            dofs: Self::dofs(record, 5)?,
        };
        for i in self.targets(record, record.field(0)?)? {
            self.solutions[i].boundaries.push(boundary.clone());
        }
        Ok(())
    }

    fn constraint(&mut self, record: &Record) -> Result<()> {
        record.expect_min_fields(6)?;
        let (kind, dofs_at) = match record.field(2)? {
            "NodeLock" => (ConstraintKind::NodeLock, 5),
            "TouchLock" => (
                ConstraintKind::TouchLock {
                    tolerance: record.float(5)?,
                },
                6,
            ),
            other => {
                return Err(record
                    .error(format!("unknown constraint type '{other}'"))
                    .into());
            }
        };
        let constraint = Constraint {
            name: record.field(1)?.to_string(),
            kind,
            nodesets: (record.int(3)?, record.int(4)?),
            dofs: Self::dofs(record, dofs_at)?,
        };
        for i in self.targets(record, record.field(0)?)? {
            self.solutions[i].constraints.push(constraint.clone());
        }
        Ok(())
    }

    fn load(&mut self, record: &Record) -> Result<()> {
        record.expect_min_fields(8)?;
        let keyword = record.field(2)?;
        let kind = LoadKind::from_keyword(keyword)
            .ok_or_else(|| record.error(format!("unknown load type '{keyword}'")))?;
        let set = record.int(3)?;
        let d = record.floats(5..8)?;
        let load = Load {
            name: record.field(1)?.to_string(),
            kind,
            target: if kind.targets_elements() {
                LoadTarget::Elementset(set)
            } else {
                LoadTarget::Nodeset(set)
            },
            magnitude: record.float(4)?,
            direction: [d[0], d[1], d[2]],
            table: record.fields.get(8).cloned(),
        };
        for i in self.targets(record, record.field(0)?)? {
            self.solutions[i].loads.push(load.clone());
        }
        Ok(())
    }

    fn assemble(mut self) -> Result<Model> {
        self.default_elementset();

        let all_sets: Vec<i32> = self.model.elementsets.keys().copied().collect();
        let mut listings: Vec<Vec<i32>> = Vec::new();
        let mut owner = Vec::with_capacity(self.solutions.len());
        for solution in &self.solutions {
            let listing = solution.meshes.clone().unwrap_or_else(|| all_sets.clone());
            let index = match listings.iter().position(|l| *l == listing) {
                Some(index) => index,
                None => {
                    listings.push(listing);
                    listings.len() - 1
                }
            };
            owner.push(index);
        }
        if listings.is_empty() {
            listings.push(all_sets.clone());
        }

        let names: Vec<String> = (1..=listings.len()).map(|i| format!("Mesh-{i}")).collect();
        for (index, listing) in listings.iter().enumerate() {
            let extra_nodes: BTreeSet<i32> = self
                .solutions
                .iter()
                .zip(&owner)
                .filter(|(_, o)| **o == index)
                .flat_map(|(s, _)| referenced_nodesets(s))
                .filter_map(|id| self.model.nodesets.get(&id))
                .flat_map(|set| set.nodes.iter().copied())
                .collect();
            let mesh = self.build_mesh(&names[index], listing, *listing == all_sets, &extra_nodes)?;
            self.model.add_mesh(mesh)?;
        }

        let solutions = std::mem::take(&mut self.solutions);
        for (solution, index) in solutions.into_iter().zip(owner) {
            self.attach(&names[index], solution)?;
        }
        Ok(self.model)
    }

    /// Collects elements that no explicit elementset covers into set 999.
    fn default_elementset(&mut self) {
        let covered: BTreeSet<i32> = self
            .model
            .elementsets
            .values()
            .flat_map(|s| s.elements.iter().copied())
            .collect();
        let uncovered: Vec<i32> = self
            .elements
            .keys()
            .copied()
            .filter(|id| !covered.contains(id))
            .collect();
        if uncovered.is_empty() {
            return;
        }
        debug!(
            "{} elements outside any elementset, grouped into {DEFAULT_ELEMENTSET}",
            uncovered.len()
        );
        self.model
            .elementsets
            .entry(DEFAULT_ELEMENTSET)
            .or_insert_with(|| Elementset::new(DEFAULT_ELEMENTSET, []))
            .elements
            .extend(uncovered);
    }

    fn build_mesh(
        &self,
        name: &str,
        listing: &[i32],
        every_node: bool,
        extra_nodes: &BTreeSet<i32>,
    ) -> Result<Mesh> {
        let mut element_ids = BTreeSet::new();
        for set_id in listing {
            let set = self
                .model
                .elementsets
                .get(set_id)
                .ok_or(fem_model::ModelError::UnknownElementset(*set_id))?;
            element_ids.extend(set.elements.iter().copied());
        }

        let mut wanted: BTreeSet<i32> = extra_nodes.clone();
        for id in &element_ids {
            let element = self
                .elements
                .get(id)
                .ok_or(fem_model::ModelError::UnknownElement(*id))?;
            wanted.extend(element.nodes.iter().copied());
        }
        if every_node {
            wanted.extend(self.nodes.keys().copied());
        }

        let mut mesh = Mesh::new(name);
        for id in &wanted {
            if let Some(node) = self.nodes.get(id) {
                mesh.add_node(node.clone())?;
            }
        }
        for id in &element_ids {
            let mut element = self.elements[id].clone();
            if let Some((line, x_vec, y_vec)) = self.orientations.get(id) {
                let length = geometry::distance(
                    mesh.coords(element.nodes[0])?,
                    mesh.coords(element.nodes[1])?,
                );
                element.orientation = Some(BeamOrientation {
                    x_vec: *x_vec,
                    y_vec: *y_vec,
                    z_vec: geometry::cross(*x_vec, *y_vec),
                    length,
                });
                debug!("line {line}: orientation for beam {id}");
            }
            mesh.add_element(element)?;
        }
        mesh.elementsets = listing.iter().copied().collect();
        Ok(mesh)
    }

    fn attach(&mut self, mesh: &str, pending: PendingSolution) -> Result<()> {
        let kind = pending.kind.unwrap_or(SolutionType::Static);
        let boundaries = record_names(&pending.boundaries, |b| &b.name);
        let constraints = record_names(&pending.constraints, |c| &c.name);
        let loads = record_names(&pending.loads, |l| &l.name);
        let declared = [
            ("boundary", &pending.declared_boundaries, boundaries),
            ("constraint", &pending.declared_constraints, constraints),
            ("load", &pending.declared_loads, loads),
        ];
        for (label, names, present) in declared {
            if let Some(missing) = names.iter().find(|n| !present.contains(n.as_str())) {
                return Err(IoError::malformed(
                    pending.line,
                    format!(
                        "solution '{}' declares {label} '{missing}' but no record defines it",
                        pending.name
                    ),
                ));
            }
        }

        let model = &mut self.model;
        model.create_solution(mesh, &pending.name, kind)?;
        model.set_results(mesh, &pending.name, &pending.results)?;
        if let Some(damping) = pending.damping {
            model.set_damping(mesh, &pending.name, damping)?;
        }
        for table in pending.tables {
            model.add_table(mesh, &pending.name, table)?;
        }
        for boundary in pending.boundaries {
            model.apply_boundary(mesh, &pending.name, boundary)?;
        }
        for constraint in pending.constraints {
            model.apply_constraint(mesh, &pending.name, constraint)?;
        }
        for load in pending.loads {
            model.apply_load(mesh, &pending.name, load)?;
        }
        Ok(())
    }
}

fn result_kind(record: &Record, keyword: &str) -> Result<ResultKind> {
    ResultKind::from_keyword(keyword)
        .ok_or_else(|| record.error(format!("unknown result kind '{keyword}'")).into())
}

fn record_names<T>(records: &[T], name: impl Fn(&T) -> &String) -> BTreeSet<&str> {
    records.iter().map(|r| name(r).as_str()).collect()
}

fn referenced_nodesets(solution: &PendingSolution) -> Vec<i32> {
    let mut ids: Vec<i32> = solution.boundaries.iter().map(|b| b.nodeset).collect();
    for c in &solution.constraints {
        ids.push(c.nodesets.0);
        ids.push(c.nodesets.1);
    }
    for l in &solution.loads {
        if let LoadTarget::Nodeset(id) = l.target {
            ids.push(id);
        }
    }
    ids
}
