//! Declarative grid setup: dimensions, slot size, and default contents.
//!
//! A [`GridConfig`] is what the composing application loads per inventory
//! (player bag, shop shelf, cargo hold). Starting items go through the
//! normal placement path with the same lenient skip semantics as loading a
//! save.

use hecs::World;
use serde::{Deserialize, Serialize};

use crate::catalog::ItemCatalog;
use crate::grid::GridInventory;
use crate::persistence::{place_record, LoadSkip, SaveRecord};

/// One inventory's configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Visual size of one slot in pixels, used by the pointer mapping.
    pub slot_size: f32,
    #[serde(default)]
    pub starting_items: Vec<StartingItem>,
}

/// An item pre-placed when the grid is first built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartingItem {
    pub item_id: String,
    pub row: i32,
    pub col: i32,
    #[serde(default)]
    pub rotation: u8,
}

/// Build a grid and place its starting items.
///
/// Entries with unknown identities, out-of-bounds anchors, or overlaps are
/// skipped with a warning, exactly like load-time records; the grid still
/// comes up with everything that did fit.
pub fn build_grid(
    world: &mut World,
    catalog: &ItemCatalog,
    config: &GridConfig,
) -> (GridInventory, Vec<LoadSkip>) {
    let mut grid = GridInventory::new(config.width, config.height);
    let mut skipped = Vec::new();
    for start in &config.starting_items {
        let record = SaveRecord {
            item_id: start.item_id.clone(),
            anchor_row: start.row,
            anchor_col: start.col,
            rotation: start.rotation,
        };
        if let Err(reason) = place_record(world, &mut grid, catalog, &record) {
            log::warn!(
                "skipping starting item '{}' in grid '{}': {}",
                start.item_id,
                config.name,
                reason
            );
            skipped.push(LoadSkip { record, reason });
        }
    }
    (grid, skipped)
}
