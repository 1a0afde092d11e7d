//! Save/load for a grid's contents.
//!
//! A grid persists as a set of [`SaveRecord`]s, one per placed item:
//! identity string, anchor cell, rotation. Order carries no meaning.
//! The file layer wraps the records in a versioned envelope serialized
//! with bincode.
//!
//! Loading is lenient by design: a record whose identity is missing from
//! the catalog, or whose placement would violate the occupancy invariant
//! (hand-edited or corrupted saves), is skipped with a warning and the rest
//! of the load proceeds.

use std::fmt;
use std::io::{Read, Write};

use hecs::{Entity, World};
use serde::{Deserialize, Serialize};

use crate::catalog::ItemCatalog;
use crate::error::PlacementError;
use crate::grid::GridInventory;
use crate::item::Item;

/// Version number for the save envelope (increment when the format changes).
const SAVE_VERSION: u32 = 1;

/// One placed item's durable state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveRecord {
    pub item_id: String,
    pub anchor_row: i32,
    pub anchor_col: i32,
    pub rotation: u8,
}

/// The on-disk envelope around a grid's records.
#[derive(Serialize, Deserialize)]
pub struct SaveData {
    pub version: u32,
    pub records: Vec<SaveRecord>,
}

/// A record that could not be applied during load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSkip {
    pub record: SaveRecord,
    pub reason: PlacementError,
}

/// What a lenient load actually did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped: Vec<LoadSkip>,
}

/// Snapshot a grid's placed items as records.
///
/// Records come out in first-solid-cell scan order, which is stable for a
/// given grid state; consumers must not rely on any particular order.
pub fn serialize_grid(world: &World, grid: &GridInventory) -> Vec<SaveRecord> {
    let mut seen: Vec<Entity> = Vec::new();
    let mut records = Vec::new();
    for slot in grid.slots() {
        let Some(entity) = slot.occupant() else {
            continue;
        };
        if seen.contains(&entity) {
            continue;
        }
        seen.push(entity);
        let item = world
            .get::<&Item>(entity)
            .expect("grid occupant is not an item");
        let Some((anchor_row, anchor_col)) = item.anchor() else {
            continue;
        };
        records.push(SaveRecord {
            item_id: item.template_id().to_string(),
            anchor_row,
            anchor_col,
            rotation: item.rotation(),
        });
    }
    records
}

/// Spawn and place one record's item. On failure the freshly spawned entity
/// is despawned again, leaving the world and grid untouched.
pub(crate) fn place_record(
    world: &mut World,
    grid: &mut GridInventory,
    catalog: &ItemCatalog,
    record: &SaveRecord,
) -> Result<Entity, PlacementError> {
    let Some(entity) = catalog.spawn(world, &record.item_id) else {
        return Err(PlacementError::UnknownItem);
    };
    {
        let mut item = world
            .get::<&mut Item>(entity)
            .expect("catalog spawned a non-item");
        for _ in 0..(record.rotation % 4) {
            item.rotate();
        }
    }
    match grid.place(world, entity, record.anchor_row, record.anchor_col) {
        Ok(()) => Ok(entity),
        Err(_) => {
            let _ = world.despawn(entity);
            Err(PlacementError::OverlapOnLoad)
        }
    }
}

/// Rebuild a grid's contents from records.
///
/// Unknown identities and records that no longer fit are skipped with a
/// warning; every skip is reported, none is fatal.
pub fn deserialize_grid(
    world: &mut World,
    grid: &mut GridInventory,
    catalog: &ItemCatalog,
    records: &[SaveRecord],
) -> LoadReport {
    let mut report = LoadReport::default();
    for record in records {
        match place_record(world, grid, catalog, record) {
            Ok(_) => report.loaded += 1,
            Err(reason) => {
                log::warn!(
                    "skipping saved item '{}' at ({}, {}): {}",
                    record.item_id,
                    record.anchor_row,
                    record.anchor_col,
                    reason
                );
                report.skipped.push(LoadSkip {
                    record: record.clone(),
                    reason,
                });
            }
        }
    }
    report
}

/// Write a grid's contents to a writer as a versioned bincode envelope.
pub fn save_grid<W: Write>(
    writer: W,
    world: &World,
    grid: &GridInventory,
) -> Result<(), SaveError> {
    let data = SaveData {
        version: SAVE_VERSION,
        records: serialize_grid(world, grid),
    };
    bincode::serialize_into(writer, &data)?;
    Ok(())
}

/// Read a versioned envelope and apply its records to the grid.
pub fn load_grid<R: Read>(
    reader: R,
    world: &mut World,
    grid: &mut GridInventory,
    catalog: &ItemCatalog,
) -> Result<LoadReport, SaveError> {
    let data: SaveData = bincode::deserialize_from(reader)?;
    if data.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: data.version,
        });
    }
    Ok(deserialize_grid(world, grid, catalog, &data.records))
}

/// Errors from the file layer. Skipped records are not errors; they show up
/// in the [`LoadReport`] instead.
#[derive(Debug)]
pub enum SaveError {
    Io(std::io::Error),
    Bincode(Box<bincode::ErrorKind>),
    VersionMismatch { expected: u32, found: u32 },
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<Box<bincode::ErrorKind>> for SaveError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        SaveError::Bincode(e)
    }
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "IO error: {}", e),
            SaveError::Bincode(e) => write!(f, "serialization error: {}", e),
            SaveError::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "save version mismatch: expected {}, found {}",
                    expected, found
                )
            }
        }
    }
}

impl std::error::Error for SaveError {}
