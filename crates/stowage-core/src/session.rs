//! Cross-grid interaction state: the one held item and the pick-up /
//! place / swap / rotate / delete intents the UI collaborator reports.
//!
//! A session is constructed explicitly by the composing application and
//! handed to whoever needs it; there is no ambient global coordinator. The
//! session is the only component aware of multiple grids — grids never
//! reach across to each other.

use hecs::{Entity, World};

use crate::error::PlacementError;
use crate::grid::GridInventory;
use crate::item::Item;

/// What an [`PlacementSession::attempt_place`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceOutcome {
    /// The held item was placed; the hand is now empty.
    Placed,
    /// The held item was placed and the single blocking item was picked up
    /// in its stead (chained pick-up).
    Swapped { displaced: Entity },
    /// Nothing changed; the item stays held.
    Rejected(PlacementError),
    /// No item was held.
    NothingHeld,
}

/// One player's interaction state across any number of grids.
///
/// At most one item is held at a time; a held item belongs to no grid.
#[derive(Default)]
pub struct PlacementSession {
    held: Option<Entity>,
}

impl PlacementSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently held item, for the UI collaborator.
    pub fn held(&self) -> Option<Entity> {
        self.held
    }

    pub fn is_holding(&self) -> bool {
        self.held.is_some()
    }

    /// Pick an item up, detaching it from whichever grid contains it.
    ///
    /// At most one grid will contain it, by the ownership invariant.
    /// Rejected with `AlreadyHeld` while holding — the held item is never
    /// silently dropped.
    pub fn pick_up<'g>(
        &mut self,
        world: &mut World,
        grids: impl IntoIterator<Item = &'g mut GridInventory>,
        item: Entity,
    ) -> Result<(), PlacementError> {
        if self.held.is_some() {
            return Err(PlacementError::AlreadyHeld);
        }
        for grid in grids {
            if grid.contains(item) {
                grid.remove(world, item);
                break;
            }
        }
        self.held = Some(item);
        Ok(())
    }

    /// Try to drop the held item onto `grid` at the pointer position.
    ///
    /// Direct placement when the mapped origin is free; otherwise a swap
    /// against a single clean obstruction, which becomes the new held item.
    /// Anything else leaves every grid, the item, and the hand untouched.
    pub fn attempt_place(
        &mut self,
        world: &mut World,
        grid: &mut GridInventory,
        pointer: (f32, f32),
        slot_size: f32,
    ) -> PlaceOutcome {
        let Some(held) = self.held else {
            return PlaceOutcome::NothingHeld;
        };
        let (origin_row, origin_col) = grid.map_pointer_to_origin(world, held, pointer, slot_size);

        match grid.place(world, held, origin_row, origin_col) {
            Ok(()) => {
                self.held = None;
                PlaceOutcome::Placed
            }
            Err(err) => {
                if let Some(obstruction) =
                    grid.find_single_obstruction(world, held, origin_row, origin_col)
                {
                    if grid.can_place(world, held, origin_row, origin_col, Some(obstruction)) {
                        grid.remove(world, obstruction);
                        // Cannot fail: the sole blocker was just removed.
                        let _ = grid.place(world, held, origin_row, origin_col);
                        self.held = Some(obstruction);
                        return PlaceOutcome::Swapped {
                            displaced: obstruction,
                        };
                    }
                }
                // SlotOccupied with no single obstruction means the footprint
                // was in bounds but blocked by two or more distinct items.
                if err == PlacementError::SlotOccupied {
                    PlaceOutcome::Rejected(PlacementError::MultipleObstructions)
                } else {
                    PlaceOutcome::Rejected(err)
                }
            }
        }
    }

    /// Rotate the held item one clockwise quarter turn; no-op when
    /// empty-handed.
    pub fn rotate_held(&mut self, world: &mut World) {
        if let Some(held) = self.held {
            if let Ok(mut item) = world.get::<&mut Item>(held) {
                item.rotate();
            }
        }
    }

    /// Discard the held item entirely. It belongs to no grid while held, so
    /// despawning it is the whole job.
    pub fn delete_held(&mut self, world: &mut World) {
        if let Some(held) = self.held.take() {
            let _ = world.despawn(held);
        }
    }
}
