//! Directory-dump data backend.
//!
//! Implements the vmap4 collaborator traits over a pre-decoded client tree
//! at `<root>/Data/<locale>/`. Proprietary container decoding is someone
//! else's job; this backend consumes the decoded files plus JSON sidecar
//! manifests for the structured pieces:
//!
//! - `DBFilesClient/Map.json` — map rows and copy records
//! - `DBFilesClient/GameObjectDisplayInfo.json` — flat model reference list
//! - `World/Maps/<name>/<name>.wdt.json` — tile grid with per-tile models
//! - `<root descriptor>.json` — converted header (base64) plus group ids
//! - `FILExxxxxxxx.xxx.json` — group geometry payload and vertex count
//!
//! Archive-internal paths use `\` separators and arbitrary case, so lookups
//! go through a lowercased index of the locale tree.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use walkdir::WalkDir;

use vmap4::catalog::{CopyRow, MapRow, MapTable};
use vmap4::locale::Locale;
use vmap4::model::{ModelError, ModelSource, ObjectGroup, ObjectRoot};
use vmap4::storage::{GameData, StorageError, StorageOpener};
use vmap4::walker::{Terrain, TerrainSource, TileCoord};

/// Opens `<root>/Data/<locale>/` as one locale candidate.
pub struct DumpOpener {
    root: PathBuf,
}

impl DumpOpener {
    pub fn new(root: &Path) -> Self {
        DumpOpener {
            root: root.to_path_buf(),
        }
    }
}

impl StorageOpener for DumpOpener {
    fn open(&self, locale: Locale) -> Option<Box<dyn GameData>> {
        let dir = self.root.join("Data").join(locale.name());
        if !dir.is_dir() {
            eprintln!("error opening storage '{}' locale {locale}", dir.display());
            return None;
        }
        Some(Box::new(DumpData::index(&dir)))
    }
}

/// One open locale tree with a case-insensitive file index.
pub struct DumpData {
    files: HashMap<String, PathBuf>,
}

impl DumpData {
    fn index(dir: &Path) -> Self {
        let mut files = HashMap::new();
        for entry in WalkDir::new(dir).into_iter().filter_map(Result::ok) {
            if !entry.file_type().is_file() {
                continue;
            }
            if let Ok(rel) = entry.path().strip_prefix(dir) {
                let key = normalize_path(&rel.to_string_lossy());
                files.insert(key, entry.path().to_path_buf());
            }
        }
        DumpData { files }
    }

    fn read_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, StorageError> {
        let bytes = self.read_file(path)?;
        serde_json::from_slice(&bytes).map_err(|e| StorageError::Malformed {
            name: path.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Archive path to index key: forward slashes, lowercase.
fn normalize_path(path: &str) -> String {
    path.replace('\\', "/").to_ascii_lowercase()
}

impl GameData for DumpData {
    fn read_file(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let on_disk = self
            .files
            .get(&normalize_path(path))
            .ok_or_else(|| StorageError::NotFound(path.to_string()))?;
        Ok(fs::read(on_disk)?)
    }

    fn map_table(&self) -> Result<Box<dyn MapTable>, StorageError> {
        let manifest: MapManifest = self.read_json(r"DBFilesClient\Map.json")?;
        Ok(Box::new(DumpMapTable { manifest }))
    }

    fn display_info_models(&self) -> Result<Vec<String>, StorageError> {
        let manifest: DisplayInfoManifest =
            self.read_json(r"DBFilesClient\GameObjectDisplayInfo.json")?;
        Ok(manifest.models)
    }

    fn terrain_source(&self) -> &dyn TerrainSource {
        self
    }

    fn model_source(&self) -> &dyn ModelSource {
        self
    }
}

// ============================================================================
// Map table
// ============================================================================

#[derive(Debug, Deserialize)]
struct MapManifest {
    records: Vec<MapRecord>,
    #[serde(default)]
    copies: Vec<MapCopy>,
}

#[derive(Debug, Deserialize)]
struct MapRecord {
    id: u32,
    directory: String,
}

#[derive(Debug, Deserialize)]
struct MapCopy {
    source_id: u32,
    new_id: u32,
}

struct DumpMapTable {
    manifest: MapManifest,
}

impl MapTable for DumpMapTable {
    fn row_count(&self) -> usize {
        self.manifest.records.len()
    }

    fn row(&self, index: usize) -> MapRow {
        let record = &self.manifest.records[index];
        MapRow {
            id: record.id,
            directory: record.directory.clone(),
        }
    }

    fn copy_count(&self) -> usize {
        self.manifest.copies.len()
    }

    fn copy(&self, index: usize) -> CopyRow {
        let copy = &self.manifest.copies[index];
        CopyRow {
            source_id: copy.source_id,
            new_id: copy.new_id,
        }
    }
}

#[derive(Debug, Deserialize)]
struct DisplayInfoManifest {
    models: Vec<String>,
}

// ============================================================================
// Terrain
// ============================================================================

#[derive(Debug, Deserialize)]
struct TerrainManifest {
    tiles: Vec<TileRecord>,
}

#[derive(Debug, Deserialize)]
struct TileRecord {
    x: u8,
    y: u8,
    #[serde(default)]
    models: Vec<String>,
}

struct DumpTerrain {
    tiles: HashMap<(u8, u8), Vec<String>>,
}

impl TerrainSource for DumpData {
    fn open<'a>(&'a self, path: &str, _map_id: u32) -> Option<Box<dyn Terrain + 'a>> {
        let manifest: TerrainManifest = self.read_json(&format!("{path}.json")).ok()?;
        let tiles = manifest
            .tiles
            .into_iter()
            .map(|t| ((t.x, t.y), t.models))
            .collect();
        Some(Box::new(DumpTerrain { tiles }))
    }
}

impl Terrain for DumpTerrain {
    fn has_tile(&self, coord: TileCoord) -> bool {
        self.tiles.contains_key(&(coord.x, coord.y))
    }

    fn init_tile(&mut self, coord: TileCoord, emit: &mut dyn FnMut(&str)) {
        if let Some(models) = self.tiles.get(&(coord.x, coord.y)) {
            for reference in models {
                emit(reference);
            }
        }
    }
}

// ============================================================================
// Object models
// ============================================================================

#[derive(Debug, Deserialize)]
struct RootManifest {
    /// Converted root header and metadata, base64.
    header: String,
    #[serde(default)]
    group_ids: Vec<u32>,
}

#[derive(Debug, Deserialize)]
struct GroupManifest {
    vertices: u32,
    /// Converted geometry chunk, base64.
    payload: String,
    vertices_precise: Option<u32>,
    payload_precise: Option<String>,
}

struct DumpRoot<'a> {
    data: &'a DumpData,
    header: Vec<u8>,
    group_ids: Vec<u32>,
}

struct DumpGroup {
    manifest: GroupManifest,
}

fn model_error(name: &str, err: StorageError) -> ModelError {
    match err {
        StorageError::NotFound(path) => ModelError::NotFound(path),
        StorageError::Malformed { reason, .. } => ModelError::Corrupt {
            name: name.to_string(),
            reason,
        },
        StorageError::Io(e) => ModelError::Io(e),
    }
}

fn decode_base64(name: &str, field: &str, value: &str) -> Result<Vec<u8>, ModelError> {
    BASE64.decode(value).map_err(|e| ModelError::Corrupt {
        name: name.to_string(),
        reason: format!("bad base64 in {field}: {e}"),
    })
}

impl ModelSource for DumpData {
    fn open_root<'a>(&'a self, reference: &str) -> Result<Box<dyn ObjectRoot + 'a>, ModelError> {
        let manifest: RootManifest = self
            .read_json(&format!("{reference}.json"))
            .map_err(|e| model_error(reference, e))?;
        let header = decode_base64(reference, "header", &manifest.header)?;
        Ok(Box::new(DumpRoot {
            data: self,
            header,
            group_ids: manifest.group_ids,
        }))
    }
}

impl ObjectRoot for DumpRoot<'_> {
    fn convert_header(&self, out: &mut dyn Write) -> Result<(), ModelError> {
        out.write_all(&self.header)?;
        Ok(())
    }

    fn group_ids(&self) -> &[u32] {
        &self.group_ids
    }

    fn open_group<'a>(&'a self, name: &str) -> Result<Box<dyn ObjectGroup + 'a>, ModelError> {
        let manifest: GroupManifest = self
            .data
            .read_json(&format!("{name}.json"))
            .map_err(|e| model_error(name, e))?;
        // Validate the payload up front so a corrupt group fails at open.
        decode_base64(name, "payload", &manifest.payload)?;
        Ok(Box::new(DumpGroup { manifest }))
    }
}

impl ObjectGroup for DumpGroup {
    fn convert(&self, precise: bool, out: &mut dyn Write) -> Result<u32, ModelError> {
        let (vertices, payload) = if precise {
            (
                self.manifest.vertices_precise.unwrap_or(self.manifest.vertices),
                self.manifest
                    .payload_precise
                    .as_deref()
                    .unwrap_or(&self.manifest.payload),
            )
        } else {
            (self.manifest.vertices, &*self.manifest.payload)
        };
        let bytes = decode_base64("group", "payload", payload)?;
        out.write_all(&bytes)?;
        Ok(vertices)
    }
}
