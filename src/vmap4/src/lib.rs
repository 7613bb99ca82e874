//! # vmap4
//!
//! World collision-geometry extraction pipeline. Converts a client's shared
//! object-model resources into flat binary containers for a downstream
//! spatial-query engine.
//!
//! The pipeline is a batch, one-shot sequence: negotiate a client locale and
//! build number, export the display-info model manifest, expand the map
//! catalog (copy records included), then walk every map's 64x64 tile grid
//! and export each referenced model exactly once. Proprietary archive and
//! record-table decoding stays behind the collaborator traits in
//! [`storage`], [`catalog`], [`walker`] and [`model`]; any backend that
//! implements them can drive the pipeline.
//!
//! Re-running over an existing output directory is safe: containers that
//! already exist are skipped without reopening any descriptor.

pub mod catalog;
pub mod container;
pub mod exporter;
pub mod locale;
pub mod model;
pub mod pipeline;
pub mod session;
pub mod storage;
pub mod walker;

#[doc(inline)]
pub use catalog::{Catalog, CatalogError, MapEntry, MapName};
#[doc(inline)]
pub use container::{ContainerWriter, PatchToken, RAW_VMAP_MAGIC, VERTEX_COUNT_OFFSET};
#[doc(inline)]
pub use exporter::{ExportOutcome, ExportStats, ModelExporter, SkipReason};
#[doc(inline)]
pub use locale::Locale;
#[doc(inline)]
pub use pipeline::{run, PipelineError, RunOptions, RunSummary};
#[doc(inline)]
pub use session::{Session, SessionError};
#[doc(inline)]
pub use storage::{GameData, StorageError, StorageOpener};
