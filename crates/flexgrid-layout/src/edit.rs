#![forbid(unsafe_code)]

//! Structural edits as pure grid transformations.
//!
//! Every edit follows the same protocol: take a [`ValueGrid`] snapshot of
//! the current layout, derive a candidate grid with one of the transforms
//! below, then [`ValueGrid::diff`] the two to find which cells actually
//! changed width. Transforms return `None` when the edit does not apply to
//! the addressed cell (split on a last column, join on the first row, ...);
//! that is a no-op, not an error.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use flexgrid_core::unit::{div_round, saturate_i64};
use flexgrid_core::{CellId, GridCoord, UnitValue};

use crate::stretch::{stretch, total};

/// Supported structural edits, addressed by flat cell index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOperation {
    /// Break the row after the addressed cell.
    Split { index: usize },
    /// Merge the addressed cell's row into the previous row.
    Join { index: usize },
    /// Take the cell out of the grid, keeping the element alive.
    Detach { index: usize },
    /// Take the cell out of the grid and destroy the element.
    Remove { index: usize },
    /// Place `cell` before the addressed cell, in the same row.
    InsertBefore { index: usize, cell: CellId },
    /// Place `cell` after the addressed cell, in the same row.
    InsertAfter { index: usize, cell: CellId },
    /// Equal shares for the addressed cell's row, or for every row.
    Normalize { index: Option<usize> },
}

impl EditOperation {
    #[must_use]
    pub const fn kind(&self) -> EditKind {
        match self {
            Self::Split { .. } => EditKind::Split,
            Self::Join { .. } => EditKind::Join,
            Self::Detach { .. } => EditKind::Detach,
            Self::Remove { .. } => EditKind::Remove,
            Self::InsertBefore { .. } => EditKind::InsertBefore,
            Self::InsertAfter { .. } => EditKind::InsertAfter,
            Self::Normalize { .. } => EditKind::Normalize,
        }
    }

    /// Flat index of the addressed cell.
    #[must_use]
    pub const fn index(&self) -> Option<usize> {
        match self {
            Self::Split { index }
            | Self::Join { index }
            | Self::Detach { index }
            | Self::Remove { index }
            | Self::InsertBefore { index, .. }
            | Self::InsertAfter { index, .. } => Some(*index),
            Self::Normalize { index } => *index,
        }
    }
}

/// Stable edit discriminator used in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditKind {
    Split,
    Join,
    Detach,
    Remove,
    InsertBefore,
    InsertAfter,
    Normalize,
}

/// Where an inserted cell lands relative to the addressed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    Before,
    After,
}

impl Placement {
    /// Row offset of the new cell for an anchor at column `x`.
    #[must_use]
    pub const fn offset(self, x: usize) -> usize {
        match self {
            Self::Before => x,
            Self::After => x + 1,
        }
    }
}

/// One cell's unit-valued width inside a [`ValueGrid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    pub cell: CellId,
    pub value: UnitValue,
}

/// Width change found by [`ValueGrid::diff`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotChange {
    pub cell: CellId,
    /// `None` when the cell was not in the old grid.
    pub before: Option<UnitValue>,
    pub after: UnitValue,
}

/// Rows of unit-valued widths plus the nominal row total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueGrid {
    rows: Vec<Vec<Slot>>,
    nominal: UnitValue,
}

impl ValueGrid {
    /// An empty `rows` becomes a single empty row.
    #[must_use]
    pub fn new(rows: Vec<Vec<Slot>>, nominal: UnitValue) -> Self {
        let rows = if rows.is_empty() {
            vec![Vec::new()]
        } else {
            rows
        };
        Self { rows, nominal }
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<Slot>] {
        &self.rows
    }

    /// Container width in the configured unit; every row stretches to it.
    #[must_use]
    pub const fn nominal(&self) -> UnitValue {
        self.nominal
    }

    #[must_use]
    pub fn slot(&self, at: GridCoord) -> Option<&Slot> {
        self.rows.get(at.y)?.get(at.x)
    }

    /// Total of one row.
    #[must_use]
    pub fn row_total(&self, y: usize) -> Option<UnitValue> {
        let row = self.rows.get(y)?;
        let values: Vec<UnitValue> = row.iter().map(|slot| slot.value).collect();
        Some(total(&values, self.nominal.precision()))
    }

    /// Slots in document order.
    pub fn flatten(&self) -> impl Iterator<Item = &Slot> + '_ {
        self.rows.iter().flatten()
    }

    fn restretch(row: &mut [Slot], target: UnitValue) {
        let values: Vec<UnitValue> = row.iter().map(|slot| slot.value).collect();
        for (slot, value) in row.iter_mut().zip(stretch(&values, target)) {
            slot.value = value;
        }
    }

    fn contains(&self, at: GridCoord) -> bool {
        self.slot(at).is_some()
    }

    /// Break the row after column `at.x`; both halves fill the container.
    #[must_use]
    pub fn split(&self, at: GridCoord) -> Option<Self> {
        let row = self.rows.get(at.y)?;
        if at.x + 1 >= row.len() {
            return None;
        }
        let mut next = self.clone();
        let mut right = next.rows[at.y].split_off(at.x + 1);
        Self::restretch(&mut next.rows[at.y], self.nominal);
        Self::restretch(&mut right, self.nominal);
        next.rows.insert(at.y + 1, right);
        Some(next)
    }

    /// Merge row `at.y` into the previous row; `at` must be a first column.
    #[must_use]
    pub fn join(&self, at: GridCoord) -> Option<Self> {
        if at.x != 0 || at.y == 0 || !self.contains(at) {
            return None;
        }
        let mut next = self.clone();
        let moved = next.rows.remove(at.y);
        let merged = &mut next.rows[at.y - 1];
        merged.extend(moved);
        Self::restretch(merged, self.nominal);
        Some(next)
    }

    /// Drop the slot at `at` and re-stretch what is left of its row.
    ///
    /// A row emptied this way disappears unless it is the only row.
    #[must_use]
    pub fn detach(&self, at: GridCoord) -> Option<Self> {
        if !self.contains(at) {
            return None;
        }
        let mut next = self.clone();
        next.rows[at.y].remove(at.x);
        if next.rows[at.y].is_empty() {
            if next.rows.len() > 1 {
                next.rows.remove(at.y);
            }
        } else {
            Self::restretch(&mut next.rows[at.y], self.nominal);
        }
        Some(next)
    }

    /// Add `cell` to the row of `at`.
    ///
    /// With an explicit `width` the newcomer keeps it and the rest of the
    /// row shrinks to make room; otherwise it gets the row's average width.
    /// The row is re-stretched either way.
    #[must_use]
    pub fn insert(
        &self,
        at: GridCoord,
        placement: Placement,
        cell: CellId,
        width: Option<UnitValue>,
    ) -> Option<Self> {
        if !self.contains(at) {
            return None;
        }
        let precision = self.nominal.precision();
        let mut next = self.clone();
        let row = &mut next.rows[at.y];
        let offset = placement.offset(at.x);

        let value = match width {
            Some(width) => {
                let width = clamp(width.rescale(precision), self.nominal);
                Self::restretch(row, self.nominal - width);
                width
            }
            None => {
                let values: Vec<UnitValue> = row.iter().map(|slot| slot.value).collect();
                let sum = total(&values, precision);
                let average = div_round(i128::from(sum.scaled()), values.len() as i128);
                UnitValue::from_scaled(saturate_i64(average), precision)
            }
        };
        row.insert(offset, Slot { cell, value });
        Self::restretch(row, self.nominal);
        Some(next)
    }

    /// Equal shares for row `y`, or for every row when `y` is `None`.
    #[must_use]
    pub fn normalize(&self, y: Option<usize>) -> Option<Self> {
        let mut next = self.clone();
        let precision = self.nominal.precision();
        let rows: Vec<usize> = match y {
            Some(y) if y < self.rows.len() => vec![y],
            Some(_) => return None,
            None => (0..self.rows.len()).collect(),
        };
        for y in rows {
            let row = &mut next.rows[y];
            let equal = vec![UnitValue::from_scaled(1, precision); row.len()];
            for (slot, value) in row.iter_mut().zip(stretch(&equal, self.nominal)) {
                slot.value = value;
            }
        }
        Some(next)
    }

    /// Cells of `after` whose width differs from `self`, in `after`'s order.
    #[must_use]
    pub fn diff(&self, after: &Self) -> Vec<SlotChange> {
        let before: FxHashMap<CellId, UnitValue> = self
            .flatten()
            .map(|slot| (slot.cell, slot.value))
            .collect();
        after
            .flatten()
            .filter_map(|slot| {
                let previous = before.get(&slot.cell).copied();
                (previous != Some(slot.value)).then_some(SlotChange {
                    cell: slot.cell,
                    before: previous,
                    after: slot.value,
                })
            })
            .collect()
    }
}

fn clamp(value: UnitValue, max: UnitValue) -> UnitValue {
    let raw = value.scaled().clamp(0, max.scaled().max(0));
    UnitValue::from_scaled(raw, value.precision())
}
