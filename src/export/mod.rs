//! Writing scene data to disk: rendered frames and position tables.

use std::path::PathBuf;

use thiserror::Error;

use crate::ephemeris::EphemerisError;

pub mod frames;
pub mod positions;

pub use frames::FrameExporter;
pub use positions::{export_positions, PositionRequest};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to draw {path}: {message}")]
    Plot { path: PathBuf, message: String },
    #[error(transparent)]
    Ephemeris(#[from] EphemerisError),
}

pub(crate) fn create_dir(path: &std::path::Path) -> Result<(), ExportError> {
    std::fs::create_dir_all(path).map_err(|source| ExportError::Io {
        path: path.to_owned(),
        source,
    })
}
