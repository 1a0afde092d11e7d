//! The placed/held item entity.
//!
//! An [`Item`] is a `hecs` component: grids and the placement session refer
//! to items by `hecs::Entity` handle, so slots never own their occupant.
//! The four rotation masks are derived once from the template and the item
//! just switches between them.

use crate::catalog::ItemTemplate;
use crate::shape::ShapeMask;

/// A placeable item instance.
///
/// Owned by exactly one of: a grid's occupancy, the session's hand, or
/// nothing (freshly spawned). `anchor` is `Some` only while placed; the grid
/// is the only module that sets or clears it.
#[derive(Clone, Debug)]
pub struct Item {
    template_id: String,
    rotations: [ShapeMask; 4],
    rotation: u8,
    anchor: Option<(i32, i32)>,
}

impl Item {
    /// A fresh, unplaced item stamped from a catalog template.
    pub fn from_template(template: &ItemTemplate) -> Self {
        Self {
            template_id: template.id().to_string(),
            rotations: template.rotations().clone(),
            rotation: 0,
            anchor: None,
        }
    }

    /// Identity string of the template this item was stamped from.
    pub fn template_id(&self) -> &str {
        &self.template_id
    }

    /// Current rotation step, 0..=3 clockwise quarter turns.
    pub fn rotation(&self) -> u8 {
        self.rotation
    }

    /// Top-left grid cell while placed, `None` while held or unplaced.
    pub fn anchor(&self) -> Option<(i32, i32)> {
        self.anchor
    }

    /// The occupancy mask for the current rotation.
    pub fn current_mask(&self) -> &ShapeMask {
        &self.rotations[self.rotation as usize]
    }

    /// Bounding-box width after the current rotation.
    pub fn width(&self) -> u32 {
        self.current_mask().width()
    }

    /// Bounding-box height after the current rotation.
    pub fn height(&self) -> u32 {
        self.current_mask().height()
    }

    /// Advance one clockwise quarter turn.
    ///
    /// Touches only this item. Rotating a placed item can invalidate its
    /// placement; the caller must re-validate and either re-place or revert
    /// (the engine never auto-reflows).
    pub fn rotate(&mut self) {
        self.rotation = (self.rotation + 1) % 4;
    }

    /// Does this item, at its current anchor, occupy absolute grid cell
    /// `(row, col)`? Always false while unplaced.
    pub fn occupies(&self, row: i32, col: i32) -> bool {
        let Some((ar, ac)) = self.anchor else {
            return false;
        };
        let (rel_r, rel_c) = (row - ar, col - ac);
        if rel_r < 0
            || rel_c < 0
            || rel_r >= self.height() as i32
            || rel_c >= self.width() as i32
        {
            return false;
        }
        self.current_mask().is_solid(rel_r as u32, rel_c as u32)
    }

    pub(crate) fn set_anchor(&mut self, anchor: Option<(i32, i32)>) {
        self.anchor = anchor;
    }
}
