//! Shape-aware grid inventory engine.
//!
//! A fixed-size 2-D grid of slots into which polyomino-shaped items can be
//! placed, rotated, swapped, and removed, with placement-validity feedback
//! and durable persistence. The engine renders nothing and reads no input
//! devices: a UI collaborator decodes raw input into the discrete intents
//! on [`PlacementSession`] and paints from [`GridInventory::preview_cells`]
//! and slot occupancy.
//!
//! Items live in a `hecs` [`World`](hecs::World) owned by the composing
//! application; grids and the session refer to them by entity handle, so a
//! slot never owns its occupant.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`shape`] | Occupancy bitmaps and the clockwise rotation transform |
//! | [`item`] | The placed/held item component: rotation state, anchor |
//! | [`grid`] | Placement validation, occupancy, swap detection, pointer mapping |
//! | [`session`] | Held-item state and pick-up/place/swap across grids |
//! | [`catalog`] | Item templates keyed by identity string |
//! | [`config`] | Grid dimensions and starting contents |
//! | [`persistence`] | Save records, lenient loading, versioned file envelope |
//! | [`error`] | The recoverable placement/load error taxonomy |

pub mod catalog;
pub mod config;
pub mod error;
pub mod grid;
pub mod item;
pub mod persistence;
pub mod session;
pub mod shape;

pub use catalog::{ItemCatalog, ItemTemplate, TemplateSpec};
pub use config::{build_grid, GridConfig, StartingItem};
pub use error::PlacementError;
pub use grid::{GridInventory, Slot};
pub use item::Item;
pub use persistence::{
    deserialize_grid, load_grid, save_grid, serialize_grid, LoadReport, LoadSkip, SaveData,
    SaveError, SaveRecord,
};
pub use session::{PlaceOutcome, PlacementSession};
pub use shape::{ShapeError, ShapeMask};
