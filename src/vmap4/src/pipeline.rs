//! Top-level extraction sequencing.
//!
//! negotiate locale -> export the display-info model manifest -> build the
//! map catalog -> walk every map. Fatal conditions (no usable locale, map
//! table failures) abort before tile walking; per-unit failures never stop
//! the run, so a completed run with failed units still exits cleanly and a
//! re-run picks up where the output directory left off.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;

use crate::catalog::{self, CatalogError};
use crate::exporter::{ExportStats, ModelExporter};
use crate::locale::Locale;
use crate::session::{self, SessionError};
use crate::storage::{StorageError, StorageOpener};
use crate::walker::{self, GRID_DIM};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(
        "output directory {0} seems to be polluted by a previous run, please use an empty directory"
    )]
    DirtyWorkDir(PathBuf),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("failed to load client table data: {0}")]
    Table(#[from] StorageError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub struct RunOptions {
    /// Flat working directory for all exported containers.
    pub out_dir: PathBuf,
    /// Precise (large) geometry variant instead of the compact default.
    pub precise: bool,
}

/// Final accounting for a completed run.
pub struct RunSummary {
    pub locale: Locale,
    pub build: u32,
    pub maps_total: usize,
    pub maps_walked: usize,
    pub unresolved_copies: u32,
    pub models: ExportStats,
}

/// Refuse to mix runs: recognizable prior output in the target directory
/// means the tool should not (re)create it.
fn check_work_dir(out_dir: &Path) -> Result<(), PipelineError> {
    for marker in ["dir", "dir_bin"] {
        if out_dir.join(marker).exists() {
            return Err(PipelineError::DirtyWorkDir(out_dir.to_path_buf()));
        }
    }
    Ok(())
}

fn map_progress_bar(map_id: u32) -> ProgressBar {
    let pb = ProgressBar::new(u64::from(GRID_DIM));
    pb.set_style(
        ProgressStyle::default_bar()
            .template("Map {msg} [{bar:64}]")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb.set_message(map_id.to_string());
    pb
}

/// Run the whole extraction. Single-threaded and sequential throughout; the
/// only state shared between units is the output directory itself.
pub fn run(opener: &dyn StorageOpener, opts: &RunOptions) -> Result<RunSummary, PipelineError> {
    check_work_dir(&opts.out_dir)?;
    fs::create_dir_all(&opts.out_dir)?;

    let session = session::negotiate(opener)?;
    println!("Detected client build: {}\n", session.build);

    let mut exporter = ModelExporter::new(session.data.model_source(), &opts.out_dir, opts.precise);

    // Standalone pass: models referenced by the flat display-info manifest.
    let manifest = session.data.display_info_models()?;
    println!("Extracting GameObject models ({} references)...", manifest.len());
    for reference in &manifest {
        exporter.export(reference);
    }

    println!("Read map table...");
    let table = session.data.map_table()?;
    let catalog = catalog::load(table.as_ref())?;
    println!("Done! ({} maps loaded)", catalog.entries.len());

    let mut maps_walked = 0;
    let terrain = session.data.terrain_source();
    for entry in &catalog.entries {
        let pb = map_progress_bar(entry.id);
        let walked = walker::walk_map(entry, terrain, &mut exporter, &mut || pb.inc(1));
        match walked {
            Some(_) => {
                pb.finish();
                maps_walked += 1;
            }
            // Terrain data absent for this map: not an error.
            None => pb.finish_and_clear(),
        }
    }

    Ok(RunSummary {
        locale: session.locale,
        build: session.build,
        maps_total: catalog.entries.len(),
        maps_walked,
        unresolved_copies: catalog.unresolved_copies,
        models: exporter.stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_dirty_work_dir_is_refused() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("dir_bin"), b"old run").unwrap();
        assert!(matches!(
            check_work_dir(dir.path()),
            Err(PipelineError::DirtyWorkDir(_))
        ));
    }

    #[test]
    fn test_clean_or_absent_work_dir_is_accepted() {
        let dir = TempDir::new().unwrap();
        assert!(check_work_dir(dir.path()).is_ok());
        assert!(check_work_dir(&dir.path().join("not_created_yet")).is_ok());
    }
}
