//! Per-map tile walking.
//!
//! Every map exposes a fixed 64x64 tile grid. Tile existence is queried, not
//! assumed, and the full grid is always scanned. Initializing a present tile
//! makes the terrain collaborator enumerate the object models it references;
//! each reference is routed straight into the exporter and the tile handle
//! is dropped before the next coordinate.

use crate::catalog::MapEntry;
use crate::exporter::ModelExporter;

/// Tiles per map axis.
pub const GRID_DIM: u8 = 64;

/// One terrain cell within a map's grid, each axis in `[0, 64)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileCoord {
    pub x: u8,
    pub y: u8,
}

/// Archive path of a map's terrain container descriptor.
pub fn terrain_path(map_name: &str) -> String {
    format!(r"World\Maps\{map_name}\{map_name}.wdt")
}

/// Opens terrain containers out of the client data.
pub trait TerrainSource {
    /// `None` when no terrain data exists for this map; the map is skipped.
    fn open<'a>(&'a self, path: &str, map_id: u32) -> Option<Box<dyn Terrain + 'a>>;
}

/// An opened terrain container.
pub trait Terrain {
    fn has_tile(&self, coord: TileCoord) -> bool;

    /// Initialize one tile, emitting every object-model reference it holds.
    fn init_tile(&mut self, coord: TileCoord, emit: &mut dyn FnMut(&str));
}

/// Tile totals for one walked map.
#[derive(Debug, Default, Clone, Copy)]
pub struct WalkStats {
    pub tiles_present: u32,
}

/// Walk one map's grid. Returns `None` when the terrain container does not
/// open (map absent, silently skipped). `progress` is called once per
/// completed column; it is observational only.
pub fn walk_map(
    entry: &MapEntry,
    terrain: &dyn TerrainSource,
    exporter: &mut ModelExporter<'_>,
    progress: &mut dyn FnMut(),
) -> Option<WalkStats> {
    let path = terrain_path(entry.name.as_str());
    let mut handle = terrain.open(&path, entry.id)?;

    let mut stats = WalkStats::default();
    for x in 0..GRID_DIM {
        for y in 0..GRID_DIM {
            let coord = TileCoord { x, y };
            if !handle.has_tile(coord) {
                continue;
            }
            stats.tiles_present += 1;
            handle.init_tile(coord, &mut |reference| {
                exporter.export(reference);
            });
        }
        progress();
    }
    Some(stats)
}
