//! Object-model naming, classification, and descriptor access.
//!
//! A model reference either names a root descriptor or one of its fragment
//! groups. Groups follow the `<root>_DDD` naming scheme (underscore plus
//! three decimal digits before the extension) and are only ever pulled in
//! through their root, so a reference that classifies as a group is never
//! opened on its own.

use std::io::{self, Write};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("descriptor not found: {0}")]
    NotFound(String),

    #[error("corrupt descriptor {name}: {reason}")]
    Corrupt { name: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// What a reference names, judged by filename alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelClass {
    Root,
    FragmentGroup,
}

/// Strip any archive directory components (`\` or `/` separated).
pub fn plain_name(path: &str) -> &str {
    path.rsplit(['\\', '/']).next().unwrap_or(path)
}

/// Deterministic local filename: lowercase, spaces become underscores.
pub fn normalize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            ' ' => '_',
            _ => c.to_ascii_lowercase(),
        })
        .collect()
}

/// Classify a filename as a root or a fragment group.
///
/// A fragment group has a `_` whose next three characters are decimal
/// digits (`ironforge_017.wmo`). The check looks at the last underscore
/// only, matching the group naming scheme.
pub fn classify(file_name: &str) -> ModelClass {
    if let Some(pos) = file_name.rfind('_') {
        let digits = file_name[pos + 1..]
            .bytes()
            .take(3)
            .filter(u8::is_ascii_digit)
            .count();
        if digits == 3 {
            return ModelClass::FragmentGroup;
        }
    }
    ModelClass::Root
}

/// Synthetic archive name for a fragment group's file data id.
pub fn group_file_name(file_data_id: u32) -> String {
    format!("FILE{file_data_id:08X}.xxx")
}

/// Opens root descriptors out of the client data.
pub trait ModelSource {
    fn open_root<'a>(&'a self, reference: &str) -> Result<Box<dyn ObjectRoot + 'a>, ModelError>;
}

/// An opened object-model root.
pub trait ObjectRoot {
    /// Convert and write the root's header and metadata (everything after
    /// the container magic and vertex-count field).
    fn convert_header(&self, out: &mut dyn Write) -> Result<(), ModelError>;

    /// Fragment-group file data ids, in the root's declared order.
    fn group_ids(&self) -> &[u32];

    /// Open one fragment group by its synthetic name. Groups carry root
    /// state into their conversion, so they open through the root.
    fn open_group<'a>(&'a self, name: &str) -> Result<Box<dyn ObjectGroup + 'a>, ModelError>;
}

/// An opened fragment group.
pub trait ObjectGroup {
    /// Convert and append this group's geometry, returning the number of
    /// vertices contributed.
    fn convert(&self, precise: bool, out: &mut dyn Write) -> Result<u32, ModelError>;
}
