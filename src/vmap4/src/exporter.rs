//! Object-model export.
//!
//! Many tiles reference the same shared model, so the exporter keys on the
//! normalized local filename: if the output file already exists the
//! reference is done, with no descriptor opened. A reference that names a
//! fragment group is skipped outright. Everything else is a two-phase
//! write: root header with a reserved vertex count, then each fragment
//! group appended in declared order, then the count patched in. A failed
//! group aborts the remaining loop and the partial file is removed, so an
//! interrupted or failed run never leaves a partial container behind.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::container::ContainerWriter;
use crate::model::{
    classify, group_file_name, normalize_file_name, plain_name, ModelClass, ModelError,
    ModelSource,
};

/// Why a reference was skipped. Both count as success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Output already present from this or an earlier run.
    AlreadyExtracted,
    /// Fragment groups are only extracted through their root.
    FragmentGroup,
}

/// Per-reference outcome; never fatal for the pipeline.
#[derive(Debug)]
pub enum ExportOutcome {
    Extracted,
    Skipped(SkipReason),
    Failed(ModelError),
}

/// Running totals across all export calls.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExportStats {
    pub extracted: u64,
    pub skipped: u64,
    pub failed: u64,
}

pub struct ModelExporter<'a> {
    source: &'a dyn ModelSource,
    out_dir: PathBuf,
    precise: bool,
    pub stats: ExportStats,
}

impl<'a> ModelExporter<'a> {
    pub fn new(source: &'a dyn ModelSource, out_dir: &Path, precise: bool) -> Self {
        ModelExporter {
            source,
            out_dir: out_dir.to_path_buf(),
            precise,
            stats: ExportStats::default(),
        }
    }

    /// Export one referenced model, recording the outcome in the stats.
    pub fn export(&mut self, reference: &str) -> ExportOutcome {
        let outcome = self.export_inner(reference);
        match outcome {
            ExportOutcome::Extracted => self.stats.extracted += 1,
            ExportOutcome::Skipped(_) => self.stats.skipped += 1,
            ExportOutcome::Failed(ref err) => {
                eprintln!("Failed to extract {reference}: {err}");
                self.stats.failed += 1;
            }
        }
        outcome
    }

    fn export_inner(&mut self, reference: &str) -> ExportOutcome {
        let local_name = normalize_file_name(plain_name(reference));
        let out_path = self.out_dir.join(&local_name);

        if out_path.exists() {
            return ExportOutcome::Skipped(SkipReason::AlreadyExtracted);
        }

        if classify(&local_name) == ModelClass::FragmentGroup {
            return ExportOutcome::Skipped(SkipReason::FragmentGroup);
        }

        let root = match self.source.open_root(reference) {
            Ok(root) => root,
            Err(err) => return ExportOutcome::Failed(err),
        };

        println!("Extracting {reference}");
        match write_container(root.as_ref(), &out_path, self.precise) {
            Ok(()) => ExportOutcome::Extracted,
            Err(err) => {
                // Never leave a partial container on disk.
                let _ = fs::remove_file(&out_path);
                ExportOutcome::Failed(err)
            }
        }
    }
}

fn write_container(
    root: &dyn crate::model::ObjectRoot,
    out_path: &Path,
    precise: bool,
) -> Result<(), ModelError> {
    let file = File::create(out_path)?;
    let mut out = ContainerWriter::new(file)?;
    let vertex_field = out.reserve_u32()?;
    root.convert_header(&mut out)?;

    let mut total_vertices: u32 = 0;
    for &id in root.group_ids() {
        let name = group_file_name(id);
        let group = root.open_group(&name)?;
        total_vertices += group.convert(precise, &mut out)?;
    }

    out.finalize(vertex_field, total_vertices)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{RAW_VMAP_MAGIC, VERTEX_COUNT_OFFSET};
    use crate::model::{ObjectGroup, ObjectRoot};
    use std::cell::Cell;
    use tempfile::TempDir;

    struct FakeGroup {
        vertices: u32,
        payload: Vec<u8>,
    }

    impl ObjectGroup for FakeGroup {
        fn convert(&self, _precise: bool, out: &mut dyn Write) -> Result<u32, ModelError> {
            out.write_all(&self.payload)?;
            Ok(self.vertices)
        }
    }

    struct FakeRoot {
        group_ids: Vec<u32>,
        // Ids whose group descriptor is "missing".
        broken: Vec<u32>,
    }

    impl ObjectRoot for FakeRoot {
        fn convert_header(&self, out: &mut dyn Write) -> Result<(), ModelError> {
            out.write_all(b"HDR")?;
            Ok(())
        }

        fn group_ids(&self) -> &[u32] {
            &self.group_ids
        }

        fn open_group<'a>(&'a self, name: &str) -> Result<Box<dyn ObjectGroup + 'a>, ModelError> {
            let id = u32::from_str_radix(&name[4..12], 16).unwrap();
            if self.broken.contains(&id) {
                return Err(ModelError::NotFound(name.to_string()));
            }
            Ok(Box::new(FakeGroup {
                vertices: id,
                payload: vec![0xCD; 4],
            }))
        }
    }

    struct FakeSource {
        root: Option<FakeRoot>,
        opens: Cell<u32>,
    }

    impl ModelSource for FakeSource {
        fn open_root<'a>(
            &'a self,
            reference: &str,
        ) -> Result<Box<dyn ObjectRoot + 'a>, ModelError> {
            self.opens.set(self.opens.get() + 1);
            match &self.root {
                Some(root) => Ok(Box::new(FakeRootRef { inner: root })),
                None => Err(ModelError::NotFound(reference.to_string())),
            }
        }
    }

    // Borrowing wrapper so the source can hand out its one root repeatedly.
    struct FakeRootRef<'a> {
        inner: &'a FakeRoot,
    }

    impl ObjectRoot for FakeRootRef<'_> {
        fn convert_header(&self, out: &mut dyn Write) -> Result<(), ModelError> {
            self.inner.convert_header(out)
        }

        fn group_ids(&self) -> &[u32] {
            self.inner.group_ids()
        }

        fn open_group<'b>(&'b self, name: &str) -> Result<Box<dyn ObjectGroup + 'b>, ModelError> {
            self.inner.open_group(name)
        }
    }

    fn source_with_groups(group_ids: Vec<u32>, broken: Vec<u32>) -> FakeSource {
        FakeSource {
            root: Some(FakeRoot { group_ids, broken }),
            opens: Cell::new(0),
        }
    }

    #[test]
    fn test_export_patches_vertex_total() {
        let dir = TempDir::new().unwrap();
        let source = source_with_groups(vec![120, 0, 45], vec![]);
        let mut exporter = ModelExporter::new(&source, dir.path(), false);

        assert!(matches!(
            exporter.export(r"World\wmo\Keep.wmo"),
            ExportOutcome::Extracted
        ));

        let bytes = fs::read(dir.path().join("keep.wmo")).unwrap();
        assert_eq!(&bytes[..8], &RAW_VMAP_MAGIC);
        let off = VERTEX_COUNT_OFFSET as usize;
        let count = u32::from_le_bytes(bytes[off..off + 4].try_into().unwrap());
        assert_eq!(count, 165);
        // Header then three 4-byte group payloads.
        assert_eq!(&bytes[12..15], b"HDR");
        assert_eq!(bytes.len(), 15 + 12);
    }

    #[test]
    fn test_second_export_is_skipped_without_opening() {
        let dir = TempDir::new().unwrap();
        let source = source_with_groups(vec![10], vec![]);
        let mut exporter = ModelExporter::new(&source, dir.path(), false);

        assert!(matches!(exporter.export("Keep.wmo"), ExportOutcome::Extracted));
        let first = fs::read(dir.path().join("keep.wmo")).unwrap();
        assert_eq!(source.opens.get(), 1);

        assert!(matches!(
            exporter.export("Keep.wmo"),
            ExportOutcome::Skipped(SkipReason::AlreadyExtracted)
        ));
        assert_eq!(source.opens.get(), 1, "second run must not open descriptors");
        assert_eq!(fs::read(dir.path().join("keep.wmo")).unwrap(), first);
        assert_eq!(exporter.stats.extracted, 1);
        assert_eq!(exporter.stats.skipped, 1);
    }

    #[test]
    fn test_fragment_reference_never_opens_anything() {
        let dir = TempDir::new().unwrap();
        let source = source_with_groups(vec![], vec![]);
        let mut exporter = ModelExporter::new(&source, dir.path(), false);

        assert!(matches!(
            exporter.export(r"World\wmo\ironforge_017.wmo"),
            ExportOutcome::Skipped(SkipReason::FragmentGroup)
        ));
        assert_eq!(source.opens.get(), 0);
        assert!(!dir.path().join("ironforge_017.wmo").exists());
    }

    #[test]
    fn test_failed_group_removes_partial_file() {
        let dir = TempDir::new().unwrap();
        // Second of three groups is broken.
        let source = source_with_groups(vec![1, 2, 3], vec![2]);
        let mut exporter = ModelExporter::new(&source, dir.path(), false);

        assert!(matches!(
            exporter.export("Keep.wmo"),
            ExportOutcome::Failed(ModelError::NotFound(_))
        ));
        assert!(!dir.path().join("keep.wmo").exists());
        assert_eq!(exporter.stats.failed, 1);
    }

    #[test]
    fn test_missing_root_fails_without_creating_file() {
        let dir = TempDir::new().unwrap();
        let source = FakeSource {
            root: None,
            opens: Cell::new(0),
        };
        let mut exporter = ModelExporter::new(&source, dir.path(), false);

        assert!(matches!(
            exporter.export("Keep.wmo"),
            ExportOutcome::Failed(ModelError::NotFound(_))
        ));
        assert!(!dir.path().join("keep.wmo").exists());
    }
}
