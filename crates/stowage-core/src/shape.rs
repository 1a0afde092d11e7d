//! Shape masks: which cells of an item's bounding box are solid.
//!
//! A mask is a width×height boolean bitmap in row-major order. Items without
//! an explicit bitmap (plain rectangles) use the full-solid sentinel, which
//! reports every cell as solid.

use std::fmt;

/// An immutable occupancy pattern for one item footprint.
///
/// `cells == None` is the legacy full-solid sentinel: every cell of the
/// bounding box counts as solid, including coordinates outside the box (the
/// grid bounds-checks before asking, so real masks never see out-of-range
/// queries).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShapeMask {
    width: u32,
    height: u32,
    cells: Option<Vec<bool>>,
}

/// Cell-count mismatch when building a mask from an explicit bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeError {
    pub expected: usize,
    pub got: usize,
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "shape bitmap has {} cells, bounding box needs {}",
            self.got, self.expected
        )
    }
}

impl std::error::Error for ShapeError {}

impl ShapeMask {
    /// A fully solid width×height rectangle (no explicit bitmap).
    pub fn solid(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: None,
        }
    }

    /// A mask from an explicit row-major bitmap. The bitmap length must
    /// equal `width * height`.
    pub fn from_cells(width: u32, height: u32, cells: Vec<bool>) -> Result<Self, ShapeError> {
        let expected = (width as usize) * (height as usize);
        if cells.len() != expected {
            return Err(ShapeError {
                expected,
                got: cells.len(),
            });
        }
        Ok(Self {
            width,
            height,
            cells: Some(cells),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether the mask carries an explicit bitmap (false for the sentinel).
    pub fn has_bitmap(&self) -> bool {
        self.cells.is_some()
    }

    /// Is the cell at mask-local `(row, col)` solid?
    ///
    /// The full-solid sentinel answers `true` for any coordinate, in or out
    /// of range. Explicit bitmaps answer the stored bit.
    pub fn is_solid(&self, row: u32, col: u32) -> bool {
        match &self.cells {
            None => true,
            Some(bits) => {
                if row >= self.height || col >= self.width {
                    return false;
                }
                bits[(row * self.width + col) as usize]
            }
        }
    }

    /// Iterate the solid mask-local `(row, col)` cells in row-major order.
    pub fn solid_cells(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let (w, h) = (self.width, self.height);
        (0..h)
            .flat_map(move |r| (0..w).map(move |c| (r, c)))
            .filter(move |&(r, c)| self.is_solid(r, c))
    }

    /// Number of solid cells.
    pub fn solid_count(&self) -> usize {
        match &self.cells {
            None => (self.width as usize) * (self.height as usize),
            Some(bits) => bits.iter().filter(|&&b| b).count(),
        }
    }

    /// The mask rotated 90° clockwise: `width' = height`, `height' = width`,
    /// `mask'[r][c] = mask[height-1-c][r]`. Four applications reproduce the
    /// original exactly. Rotating the sentinel swaps dimensions and stays
    /// the sentinel.
    pub fn rotated_clockwise(&self) -> ShapeMask {
        let (w, h) = (self.width, self.height);
        let cells = self.cells.as_ref().map(|old| {
            // New bounding box is h wide and w tall.
            let mut out = vec![false; (w as usize) * (h as usize)];
            for r in 0..w {
                for c in 0..h {
                    let src = ((h - 1 - c) * w + r) as usize;
                    out[(r * h + c) as usize] = old[src];
                }
            }
            out
        });
        ShapeMask {
            width: h,
            height: w,
            cells,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 2×2 L: solid at (0,0), (1,0), (1,1).
    fn l_mask() -> ShapeMask {
        ShapeMask::from_cells(2, 2, vec![true, false, true, true]).unwrap()
    }

    #[test]
    fn bitmap_length_is_validated() {
        let err = ShapeMask::from_cells(2, 3, vec![true; 5]).unwrap_err();
        assert_eq!(err, ShapeError { expected: 6, got: 5 });
    }

    #[test]
    fn sentinel_is_solid_everywhere() {
        let mask = ShapeMask::solid(2, 3);
        assert!(mask.is_solid(0, 0));
        assert!(mask.is_solid(2, 1));
        // Out of range still reads solid for the sentinel.
        assert!(mask.is_solid(99, 99));
        assert_eq!(mask.solid_count(), 6);
    }

    #[test]
    fn bitmap_reads_stored_bits() {
        let mask = l_mask();
        assert!(mask.is_solid(0, 0));
        assert!(!mask.is_solid(0, 1));
        assert!(mask.is_solid(1, 0));
        assert!(mask.is_solid(1, 1));
        assert_eq!(mask.solid_count(), 3);
    }

    #[test]
    fn rotate_l_clockwise() {
        // X.        XX
        // XX   →    X.
        let rotated = l_mask().rotated_clockwise();
        assert_eq!(rotated.width(), 2);
        assert_eq!(rotated.height(), 2);
        assert!(rotated.is_solid(0, 0));
        assert!(rotated.is_solid(0, 1));
        assert!(rotated.is_solid(1, 0));
        assert!(!rotated.is_solid(1, 1));
    }

    #[test]
    fn rotate_bar_swaps_dimensions() {
        let bar = ShapeMask::from_cells(3, 1, vec![true; 3]).unwrap();
        let rotated = bar.rotated_clockwise();
        assert_eq!(rotated.width(), 1);
        assert_eq!(rotated.height(), 3);
        assert_eq!(rotated.solid_count(), 3);
    }

    #[test]
    fn rotate_sentinel_stays_sentinel() {
        let rotated = ShapeMask::solid(4, 2).rotated_clockwise();
        assert_eq!(rotated.width(), 2);
        assert_eq!(rotated.height(), 4);
        assert!(!rotated.has_bitmap());
        assert!(rotated.is_solid(50, 50));
    }

    #[test]
    fn four_rotations_are_identity() {
        let masks = [
            l_mask(),
            ShapeMask::from_cells(3, 2, vec![true, true, false, false, true, true]).unwrap(),
            ShapeMask::from_cells(1, 4, vec![true, false, true, true]).unwrap(),
            ShapeMask::solid(3, 5),
        ];
        for mask in masks {
            let back = mask
                .rotated_clockwise()
                .rotated_clockwise()
                .rotated_clockwise()
                .rotated_clockwise();
            assert_eq!(back, mask);
        }
    }

    #[test]
    fn solid_cells_matches_bitmap() {
        let cells: Vec<(u32, u32)> = l_mask().solid_cells().collect();
        assert_eq!(cells, vec![(0, 0), (1, 0), (1, 1)]);
    }
}
