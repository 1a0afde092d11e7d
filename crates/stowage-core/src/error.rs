//! Error taxonomy for placement, session, and load operations.
//!
//! Every variant is locally recoverable: a failed operation leaves the grid
//! and the session exactly as they were.

use std::fmt;

/// Why a placement, pick-up, or load step did not happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementError {
    /// The item's solid footprint extends past the grid edge.
    OutOfBounds,
    /// A needed cell is already owned by a different item.
    SlotOccupied,
    /// More than one distinct item blocks the footprint, so no swap is
    /// offered.
    MultipleObstructions,
    /// Pick-up attempted while the session already holds an item.
    AlreadyHeld,
    /// A save record names an identity missing from the catalog.
    UnknownItem,
    /// A save record would violate placement invariants if applied.
    OverlapOnLoad,
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementError::OutOfBounds => write!(f, "footprint exceeds grid bounds"),
            PlacementError::SlotOccupied => write!(f, "slot already occupied by another item"),
            PlacementError::MultipleObstructions => {
                write!(f, "more than one item blocks the footprint")
            }
            PlacementError::AlreadyHeld => write!(f, "session is already holding an item"),
            PlacementError::UnknownItem => write!(f, "item identity not found in catalog"),
            PlacementError::OverlapOnLoad => {
                write!(f, "saved record conflicts with current grid contents")
            }
        }
    }
}

impl std::error::Error for PlacementError {}
