//! JSON snapshots of a whole model (`.mdl`).

use std::fs;
use std::path::Path;

use fem_model::Model;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{IoError, Result};

pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub schema_version: u32,
    pub model: Model,
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    schema_version: u32,
    model: &'a Model,
}

pub fn save_snapshot(path: impl AsRef<Path>, model: &Model) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let bytes = serde_json::to_vec_pretty(&SnapshotRef {
        schema_version: SNAPSHOT_SCHEMA_VERSION,
        model,
    })?;
    fs::write(path, bytes)?;
    debug!("saved snapshot to {}", path.display());
    Ok(())
}

/// Loads a snapshot, checking its schema version before decoding the model.
pub fn load_snapshot(path: impl AsRef<Path>) -> Result<Model> {
    let bytes = fs::read(path)?;
    let value: serde_json::Value = serde_json::from_slice(&bytes)?;
    let found = value
        .get("schema_version")
        .and_then(serde_json::Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(0);
    if found != SNAPSHOT_SCHEMA_VERSION {
        return Err(IoError::SchemaVersion {
            found,
            expected: SNAPSHOT_SCHEMA_VERSION,
        });
    }
    let snapshot: Snapshot = serde_json::from_value(value)?;
    Ok(snapshot.model)
}
