//! Map identifier catalog.
//!
//! The map record table provides the primary id -> directory-name mapping.
//! Copy records then alias additional ids onto already-loaded primary rows;
//! a copy never references another copy, so one expansion pass suffices.
//! Primary entries keep table order, copy entries follow in table order, and
//! that order drives the tile walk.

use std::collections::HashMap;

use thiserror::Error;

/// Storage bound for map directory names, NUL terminator included. A name
/// must be strictly shorter than this.
pub const MAX_MAP_NAME: usize = 64;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("map name too long for map {id}: {len} bytes (limit {max})", max = MAX_MAP_NAME - 1)]
    NameTooLong { id: u32, len: usize },
}

/// Map directory name, guaranteed shorter than [`MAX_MAP_NAME`] bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapName(String);

impl MapName {
    /// Validate the bound. The name must leave room for a NUL terminator in
    /// fixed [`MAX_MAP_NAME`]-byte storage; `Err` carries the rejected
    /// length.
    pub fn new(name: impl Into<String>) -> Result<Self, usize> {
        let name = name.into();
        if name.len() >= MAX_MAP_NAME {
            return Err(name.len());
        }
        Ok(MapName(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MapName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One catalog entry; immutable once created.
#[derive(Debug, Clone)]
pub struct MapEntry {
    pub id: u32,
    pub name: MapName,
}

/// A primary row of the map record table.
#[derive(Debug, Clone)]
pub struct MapRow {
    pub id: u32,
    pub directory: String,
}

/// A copy record: `source_id`'s data is also addressable as `new_id`.
#[derive(Debug, Clone, Copy)]
pub struct CopyRow {
    pub source_id: u32,
    pub new_id: u32,
}

/// Loaded map record table. Structural decoding happens behind this trait;
/// a load failure surfaces before a `MapTable` ever exists.
pub trait MapTable {
    fn row_count(&self) -> usize;
    fn row(&self, index: usize) -> MapRow;
    fn copy_count(&self) -> usize;
    fn copy(&self, index: usize) -> CopyRow;
}

/// The expanded catalog.
pub struct Catalog {
    pub entries: Vec<MapEntry>,
    /// Copy records whose source id was not in the primary table. Skipped,
    /// but reported: a nonzero count can flag inconsistent client data.
    pub unresolved_copies: u32,
}

/// Build the catalog: primary pass validates names and indexes ids, copy
/// pass appends aliased entries.
pub fn load(table: &dyn MapTable) -> Result<Catalog, CatalogError> {
    let mut entries = Vec::with_capacity(table.row_count());
    let mut id_to_index = HashMap::with_capacity(table.row_count());

    for i in 0..table.row_count() {
        let row = table.row(i);
        let name = MapName::new(row.directory)
            .map_err(|len| CatalogError::NameTooLong { id: row.id, len })?;
        id_to_index.insert(row.id, i);
        entries.push(MapEntry { id: row.id, name });
    }

    let mut unresolved_copies = 0;
    for i in 0..table.copy_count() {
        let copy = table.copy(i);
        match id_to_index.get(&copy.source_id) {
            Some(&index) => {
                let name = entries[index].name.clone();
                entries.push(MapEntry {
                    id: copy.new_id,
                    name,
                });
            }
            None => unresolved_copies += 1,
        }
    }

    Ok(Catalog {
        entries,
        unresolved_copies,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeTable {
        rows: Vec<MapRow>,
        copies: Vec<CopyRow>,
    }

    impl MapTable for FakeTable {
        fn row_count(&self) -> usize {
            self.rows.len()
        }

        fn row(&self, index: usize) -> MapRow {
            self.rows[index].clone()
        }

        fn copy_count(&self) -> usize {
            self.copies.len()
        }

        fn copy(&self, index: usize) -> CopyRow {
            self.copies[index]
        }
    }

    fn row(id: u32, directory: &str) -> MapRow {
        MapRow {
            id,
            directory: directory.to_string(),
        }
    }

    #[test]
    fn test_copy_expansion() {
        let table = FakeTable {
            rows: vec![row(0, "Kalimdor"), row(1, "Azeroth")],
            copies: vec![CopyRow {
                source_id: 0,
                new_id: 778,
            }],
        };

        let catalog = load(&table).unwrap();
        let got: Vec<(u32, &str)> = catalog
            .entries
            .iter()
            .map(|e| (e.id, e.name.as_str()))
            .collect();
        assert_eq!(got, [(0, "Kalimdor"), (1, "Azeroth"), (778, "Kalimdor")]);
        assert_eq!(catalog.unresolved_copies, 0);
    }

    #[test]
    fn test_unknown_copy_source_is_skipped_and_counted() {
        let table = FakeTable {
            rows: vec![row(0, "Kalimdor")],
            copies: vec![
                CopyRow {
                    source_id: 999,
                    new_id: 1000,
                },
                CopyRow {
                    source_id: 0,
                    new_id: 30,
                },
            ],
        };

        let catalog = load(&table).unwrap();
        assert_eq!(catalog.entries.len(), 2);
        assert_eq!(catalog.entries[1].id, 30);
        assert_eq!(catalog.unresolved_copies, 1);
    }

    #[test]
    fn test_multiple_copies_of_one_source() {
        let table = FakeTable {
            rows: vec![row(5, "Outland")],
            copies: vec![
                CopyRow {
                    source_id: 5,
                    new_id: 6,
                },
                CopyRow {
                    source_id: 5,
                    new_id: 7,
                },
            ],
        };

        let catalog = load(&table).unwrap();
        assert_eq!(catalog.entries.len(), 3);
        assert_eq!(catalog.entries[1].name.as_str(), "Outland");
        assert_eq!(catalog.entries[2].name.as_str(), "Outland");
    }

    #[test]
    fn test_name_at_bound_is_fatal() {
        let long = "x".repeat(MAX_MAP_NAME);
        let table = FakeTable {
            rows: vec![row(3, &long)],
            copies: vec![],
        };
        assert!(matches!(
            load(&table),
            Err(CatalogError::NameTooLong { id: 3, len }) if len == MAX_MAP_NAME
        ));
    }

    #[test]
    fn test_name_just_under_bound_is_accepted() {
        let name = "x".repeat(MAX_MAP_NAME - 1);
        let table = FakeTable {
            rows: vec![row(3, &name)],
            copies: vec![],
        };
        assert!(load(&table).is_ok());
    }
}
