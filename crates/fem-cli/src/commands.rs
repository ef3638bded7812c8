//! Subcommand bodies. Each loads a model, works on it through the library
//! API and writes the result back out.

use std::collections::BTreeMap;
use std::path::Path;

use fem_io::{IoError, Result, WriterOptions, load_snapshot, read_file, save_snapshot, write_file};
use fem_model::topology::convert_elements;
use fem_model::{ElementFamily, MeshStatistics, Model, ModelError};
use log::info;

const SNAPSHOT_EXTENSION: &str = "mdl";

fn is_snapshot(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(SNAPSHOT_EXTENSION))
}

pub fn load(path: &Path) -> Result<Model> {
    let model = if is_snapshot(path) {
        load_snapshot(path)?
    } else {
        read_file(path)?
    };
    info!("loaded {} with {} meshes", path.display(), model.meshes.len());
    Ok(model)
}

/// Snapshots keep the whole model; `.sol` output holds one mesh.
pub fn save(model: &Model, mesh: Option<&str>, path: &Path) -> Result<()> {
    if is_snapshot(path) {
        return save_snapshot(path, model);
    }
    let mesh = pick_mesh(model, mesh)?;
    let options = WriterOptions {
        header: Some(format!(
            "written by fem-cli {} on {}",
            env!("CARGO_PKG_VERSION"),
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        )),
        precision: None,
    };
    write_file(model, &mesh, path, &options)
}

/// The named mesh, or the only one when no name is given.
pub fn pick_mesh(model: &Model, requested: Option<&str>) -> Result<String> {
    if let Some(name) = requested {
        return Ok(model.mesh(name)?.name.clone());
    }
    let mut names = model.meshes.keys();
    match (names.next(), names.next()) {
        (Some(only), None) => Ok(only.clone()),
        (None, _) => Err(ModelError::InvalidParameter("model has no mesh".to_string()).into()),
        (Some(_), Some(_)) => Err(ModelError::InvalidParameter(format!(
            "model has {} meshes; choose one with --mesh",
            model.meshes.len()
        ))
        .into()),
    }
}

pub fn summary(input: &Path, json: bool) -> Result<()> {
    let model = load(input)?;
    let stats: Vec<MeshStatistics> = model.meshes.values().map(|m| m.statistics()).collect();
    if json {
        println!("{}", serde_json::to_string_pretty(&stats).map_err(IoError::from)?);
        return Ok(());
    }
    println!("materials: {}", model.materials.len());
    println!("sections: {}", model.sections.len());
    println!("nodesets: {}", model.nodesets.len());
    println!("elementsets: {}", model.elementsets.len());
    for s in &stats {
        println!();
        println!("{}", s.format());
    }
    Ok(())
}

pub fn convert(input: &Path, output: &Path, mesh: Option<&str>) -> Result<()> {
    let model = load(input)?;
    save(&model, mesh, output)
}

pub fn fuse(input: &Path, output: &Path, tolerance: f64, mesh: Option<&str>) -> Result<()> {
    let mut model = load(input)?;
    let name = pick_mesh(&model, mesh)?;
    let ids: Vec<i32> = model.mesh(&name)?.nodes.keys().copied().collect();
    let report = model.fuse_nodes(&name, &ids, tolerance)?;
    println!("merged {} nodes", report.merged.len());
    for refused in &report.refused {
        println!("refused: {refused}");
    }
    save(&model, Some(&name), output)
}

/// Groups elements by family and raises each group with a quadratic sibling.
pub fn elevate_mesh(model: &mut Model, mesh: &str) -> Result<usize> {
    let target = model.mesh_mut(mesh)?;
    let mut groups: BTreeMap<ElementFamily, Vec<i32>> = BTreeMap::new();
    for element in target.elements.values() {
        if element.family.quadratic().is_some() {
            groups.entry(element.family).or_default().push(element.id);
        }
    }
    let mut created = 0;
    for (family, ids) in groups {
        if let Some(quadratic) = family.quadratic() {
            let report = convert_elements(target, &ids, quadratic)?;
            created += report.created_nodes.len();
            info!("{family} -> {quadratic}: {} elements", ids.len());
        }
    }
    Ok(created)
}

pub fn elevate(input: &Path, output: &Path, mesh: Option<&str>) -> Result<()> {
    let mut model = load(input)?;
    let name = pick_mesh(&model, mesh)?;
    let created = elevate_mesh(&mut model, &name)?;
    println!("created {created} midside nodes");
    save(&model, Some(&name), output)
}
