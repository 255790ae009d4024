//! Grid layout and greedy widget packing.
//!
//! Pages use a 12-column grid with 1-indexed columns and rows. The
//! [`GridPacker`] places widgets left to right and wraps to a new row band
//! before a widget would cross column 12. It never backtracks to fill gaps,
//! so the resulting positions are stable for a given widget sequence.

use serde::{Deserialize, Serialize};

use crate::visualization::Visualization;

/// Number of columns in the dashboard grid.
pub const GRID_COLUMNS: u32 = 12;

/// Minimum row advance when the packer wraps.
pub const ROW_HEIGHT: u32 = 3;

/// Grid rectangle of a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Layout {
    /// First column, 1-indexed.
    pub column: u32,
    /// First row, 1-indexed.
    pub row: u32,
    /// Height in rows.
    pub height: u32,
    /// Width in columns.
    pub width: u32,
}

impl Layout {
    /// Returns true if the rectangle fits the grid (`column + width <= 13`).
    #[must_use]
    pub const fn fits_grid(&self) -> bool {
        self.column >= 1 && self.width >= 1 && self.column + self.width <= GRID_COLUMNS + 1
    }

    /// Returns true if the two rectangles share at least one cell.
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.column < other.column + other.width
            && other.column < self.column + self.width
            && self.row < other.row + other.height
            && other.row < self.row + self.height
    }

    /// First row below this rectangle.
    #[must_use]
    pub const fn bottom(&self) -> u32 {
        self.row + self.height
    }
}

/// Width a widget claims for its item count and visualization.
///
/// Billboards shrink to `min(4, 2 * count)`, tables and markdown take the
/// full grid, everything else is 8 wide above three items and 6 otherwise.
#[must_use]
pub fn optimal_width(item_count: usize, visualization: Visualization) -> u32 {
    match visualization {
        Visualization::Billboard => {
            let doubled = u32::try_from(item_count.saturating_mul(2)).unwrap_or(u32::MAX);
            doubled.clamp(1, 4)
        }
        Visualization::Table | Visualization::Markdown => GRID_COLUMNS,
        _ if item_count > 3 => 8,
        _ => 6,
    }
}

/// Single-pass, left-to-right, top-to-bottom packer for one page.
#[derive(Debug, Clone)]
pub struct GridPacker {
    column: u32,
    row: u32,
    band_height: u32,
    bottom: u32,
}

impl Default for GridPacker {
    fn default() -> Self {
        Self::new()
    }
}

impl GridPacker {
    /// Creates a packer with its cursor at `(1, 1)`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            column: 1,
            row: 1,
            band_height: 0,
            bottom: 1,
        }
    }

    /// Places a widget at the cursor, wrapping first if it would cross the grid edge.
    ///
    /// Widths are clamped to `1..=12`. A wrap advances the row by the taller
    /// of [`ROW_HEIGHT`] and the tallest widget in the current band.
    pub fn place(&mut self, width: u32, height: u32) -> Layout {
        let width = width.clamp(1, GRID_COLUMNS);
        let height = height.max(1);

        if self.column + width - 1 > GRID_COLUMNS {
            self.wrap();
        }

        let layout = Layout {
            column: self.column,
            row: self.row,
            height,
            width,
        };

        self.column += width;
        self.band_height = self.band_height.max(height);
        self.bottom = self.bottom.max(layout.bottom());
        layout
    }

    /// Moves the cursor to column 1 of the first free row, unless the
    /// current band is still empty. Used to start each section on its own row.
    pub fn break_row(&mut self) {
        if self.column > 1 {
            self.column = 1;
            self.row = self.bottom;
            self.band_height = 0;
        }
    }

    /// Current cursor as `(column, row)`.
    #[must_use]
    pub const fn cursor(&self) -> (u32, u32) {
        (self.column, self.row)
    }

    /// First row below every widget placed so far.
    #[must_use]
    pub const fn bottom(&self) -> u32 {
        self.bottom
    }

    fn wrap(&mut self) {
        self.column = 1;
        self.row += self.band_height.max(ROW_HEIGHT);
        self.band_height = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    mod packer_tests {
        use super::*;

        #[test]
        fn places_left_to_right_then_wraps() {
            let mut packer = GridPacker::new();
            let a = packer.place(6, 3);
            let b = packer.place(6, 3);
            let c = packer.place(8, 3);

            assert_eq!((a.column, a.row), (1, 1));
            assert_eq!((b.column, b.row), (7, 1));
            assert_eq!((c.column, c.row), (1, 4));
        }

        #[test]
        fn wraps_before_crossing_the_edge() {
            let mut packer = GridPacker::new();
            packer.place(8, 3);
            let second = packer.place(6, 3);
            assert_eq!((second.column, second.row), (1, 4));
            assert!(second.fits_grid());
        }

        #[test]
        fn small_widgets_fill_the_band() {
            let mut packer = GridPacker::new();
            let placed: Vec<Layout> = (0..4).map(|_| packer.place(4, 3)).collect();
            let columns: Vec<u32> = placed.iter().map(|l| l.column).collect();
            assert_eq!(columns, vec![1, 5, 9, 1]);
            assert_eq!(placed[3].row, 4);
        }

        #[test]
        fn tall_widgets_push_the_next_band_down() {
            let mut packer = GridPacker::new();
            let table = packer.place(12, 5);
            let next = packer.place(6, 3);
            assert_eq!(next.row, 6);
            assert!(!table.overlaps(&next));
        }

        #[test]
        fn break_row_starts_below_everything() {
            let mut packer = GridPacker::new();
            packer.place(12, 2);
            packer.break_row();
            let next = packer.place(6, 3);
            assert_eq!((next.column, next.row), (1, 3));

            packer.break_row();
            assert_eq!(packer.cursor(), (1, 6));
        }

        #[test]
        fn break_row_on_empty_band_is_a_no_op() {
            let mut packer = GridPacker::new();
            packer.break_row();
            assert_eq!(packer.cursor(), (1, 1));
        }

        #[test]
        fn oversized_widths_are_clamped() {
            let mut packer = GridPacker::new();
            let layout = packer.place(40, 3);
            assert_eq!(layout.width, 12);
            assert!(layout.fits_grid());
        }
    }

    mod width_tests {
        use super::*;
        use test_case::test_case;

        #[test_case(1, Visualization::Billboard, 2)]
        #[test_case(2, Visualization::Billboard, 4)]
        #[test_case(5, Visualization::Billboard, 4)]
        #[test_case(1, Visualization::Table, 12)]
        #[test_case(3, Visualization::Line, 6)]
        #[test_case(4, Visualization::Line, 8)]
        #[test_case(5, Visualization::Histogram, 8)]
        fn widths(count: usize, visualization: Visualization, expected: u32) {
            assert_eq!(optimal_width(count, visualization), expected);
        }
    }

    mod layout_tests {
        use super::*;

        #[test]
        fn adjacent_rectangles_do_not_overlap() {
            let a = Layout { column: 1, row: 1, height: 3, width: 6 };
            let b = Layout { column: 7, row: 1, height: 3, width: 6 };
            let c = Layout { column: 1, row: 4, height: 3, width: 12 };
            assert!(!a.overlaps(&b));
            assert!(!a.overlaps(&c));
            assert!(a.overlaps(&a));
        }
    }

    proptest! {
        #[test]
        fn prop_packed_widgets_never_overlap(
            widgets in proptest::collection::vec((1u32..=14, 1u32..=6, any::<bool>()), 0..40),
        ) {
            let mut packer = GridPacker::new();
            let mut placed: Vec<Layout> = Vec::new();

            for (width, height, section_break) in widgets {
                if section_break {
                    packer.break_row();
                }
                let layout = packer.place(width, height);
                prop_assert!(layout.fits_grid());
                for other in &placed {
                    prop_assert!(!layout.overlaps(other));
                }
                placed.push(layout);
            }
        }
    }
}
