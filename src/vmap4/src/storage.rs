//! Client data access seam.
//!
//! Decoding the proprietary archive and record-table formats is not this
//! crate's job; a backend implements these traits and the pipeline stays
//! format-agnostic. Every handle is a plain value with scoped ownership, so
//! dropping it releases the underlying resource on any exit path.

use std::io;

use thiserror::Error;

use crate::catalog::MapTable;
use crate::locale::Locale;
use crate::model::ModelSource;
use crate::walker::TerrainSource;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("file not found in client data: {0}")]
    NotFound(String),

    #[error("malformed client data in {name}: {reason}")]
    Malformed { name: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// An open, locale-bound view of the client's data.
///
/// `read_file` resolves archive-internal paths, which use `\` separators and
/// arbitrary case. The remaining accessors expose the decoded collaborators
/// the pipeline consumes.
pub trait GameData {
    /// Read a whole file out of the client data.
    fn read_file(&self, path: &str) -> Result<Vec<u8>, StorageError>;

    /// Load the map record table (rows plus copy records).
    fn map_table(&self) -> Result<Box<dyn MapTable>, StorageError>;

    /// Object-model references listed by the flat display-info manifest.
    fn display_info_models(&self) -> Result<Vec<String>, StorageError>;

    /// Terrain container access for tile walking.
    fn terrain_source(&self) -> &dyn TerrainSource;

    /// Object-model descriptor access for export.
    fn model_source(&self) -> &dyn ModelSource;
}

/// Opens client data for one locale candidate.
pub trait StorageOpener {
    /// `None` when this locale's data is absent or unreadable; that is a
    /// per-candidate outcome, never fatal on its own.
    fn open(&self, locale: Locale) -> Option<Box<dyn GameData>>;
}
