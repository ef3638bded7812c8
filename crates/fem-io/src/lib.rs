//! Interchange for finite-element models.
//!
//! - **`.sol` reader**: streaming parse into a [`fem_model::Model`]
//! - **`.sol` writer**: one mesh with its materials, sets and solutions
//! - **Snapshots**: JSON persistence of a whole model (`.mdl`)

pub mod error;
pub mod reader;
pub mod snapshot;
pub mod writer;

pub use error::{IoError, Result};
pub use reader::{read_file, read_str};
pub use snapshot::{SNAPSHOT_SCHEMA_VERSION, Snapshot, load_snapshot, save_snapshot};
pub use writer::{WriterOptions, write_file, write_mesh};
