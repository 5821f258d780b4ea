#![forbid(unsafe_code)]

//! Row reconstruction from a flat sequence of measured cell widths.
//!
//! Rows are never stored. A flex container wraps its items greedily, so the
//! rows can always be recovered by walking the cells in document order and
//! breaking whenever the running pixel sum would overflow the container.
//! Doing this on every query is the price for never holding a stale row
//! index.

use flexgrid_core::{CellId, GridCoord, Length, UnitConverter};

use crate::edit::{Slot, ValueGrid};

/// One measured cell as seen by the reconstructor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCell {
    /// Position in the container's flat cell sequence.
    pub index: usize,
    pub cell: CellId,
    /// Measured width in pixels.
    pub pixels: f64,
}

/// Cells partitioned into rows.
///
/// Always holds at least one row; an empty container is one empty row.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<GridCell>>,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            rows: vec![Vec::new()],
        }
    }
}

impl Grid {
    /// Partition `cells` into rows that fit in `available` pixels.
    ///
    /// A cell whose width pushes the running sum past `available` starts the
    /// next row. Sums are compared after rounding to whole pixels so that
    /// sub-pixel layout noise does not produce spurious breaks. A single
    /// cell wider than the container still gets a row of its own.
    pub fn reconstruct(cells: impl IntoIterator<Item = GridCell>, available: f64) -> Self {
        let limit = available.round();
        let mut rows = Vec::new();
        let mut row: Vec<GridCell> = Vec::new();
        let mut current = 0.0;

        for cell in cells {
            current += cell.pixels;
            if current.round() > limit && !row.is_empty() {
                rows.push(std::mem::take(&mut row));
                current = cell.pixels;
            }
            row.push(cell);
        }
        rows.push(row);

        // Exact-fit leftovers: trailing empty rows go, the first row stays.
        while rows.len() > 1 && rows.last().is_some_and(Vec::is_empty) {
            rows.pop();
        }
        Self { rows }
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<GridCell>] {
        &self.rows
    }

    #[must_use]
    pub fn row(&self, y: usize) -> Option<&[GridCell]> {
        self.rows.get(y).map(Vec::as_slice)
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// Cells with their coordinates, in document order.
    pub fn iter(&self) -> impl Iterator<Item = (GridCoord, &GridCell)> + '_ {
        self.rows.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .map(move |(x, cell)| (GridCoord::new(x, y), cell))
        })
    }

    /// Coordinate of the cell at flat `index`, if it is part of the grid.
    #[must_use]
    pub fn coord_of(&self, index: usize) -> Option<GridCoord> {
        self.iter()
            .find(|(_, cell)| cell.index == index)
            .map(|(coord, _)| coord)
    }

    #[must_use]
    pub fn cell_at(&self, coord: GridCoord) -> Option<&GridCell> {
        self.rows.get(coord.y)?.get(coord.x)
    }

    /// Unit-valued widths, as handed out by the public `grid()` query.
    #[must_use]
    pub fn lengths(&self, converter: &UnitConverter, precision: u32) -> Vec<Vec<Length>> {
        self.rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| converter.to_length(cell.pixels, precision))
                    .collect()
            })
            .collect()
    }

    /// Unit-valued snapshot used by the structural editor.
    #[must_use]
    pub fn values(&self, converter: &UnitConverter, precision: u32) -> ValueGrid {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| Slot {
                        cell: cell.cell,
                        value: converter.to_value(cell.pixels, precision),
                    })
                    .collect()
            })
            .collect();
        ValueGrid::new(rows, converter.nominal_width(precision))
    }
}
