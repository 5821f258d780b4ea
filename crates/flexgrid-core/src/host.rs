#![forbid(unsafe_code)]

//! The host surface the sizer drives.
//!
//! The sizer never paints, never creates elements and never listens to DOM
//! events itself. Everything it needs from the page goes through
//! [`CellHost`]: measurements in, width/attribute writes out.
//!
//! Measurements must be synchronous: after `set_width` the very next
//! `cell_width` call has to report the resolved width, including any
//! min/max clamping. The stretch and diff passes rely on it.

use serde::{Deserialize, Serialize};

use crate::unit::{Length, Metrics};

/// Opaque handle of one cell element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId(pub u64);

/// Opaque handle of one container element.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct ContainerKey(pub u64);

/// Handle of a global pointer-tracking subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackingId(pub u64);

/// Column/row position of a cell in the reconstructed grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCoord {
    pub x: usize,
    pub y: usize,
}

impl GridCoord {
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

bitflags::bitflags! {
    /// Per-cell layout flags written for styling.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CellFlags: u8 {
        /// Cell sits in the last row.
        const LAST_ROW = 1 << 0;
        /// Cell is the last column of its row.
        const LAST_COLUMN = 1 << 1;
    }
}

/// Attributes written on a cell after every refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellTags {
    /// `None` clears the tag (hidden or unmanaged cell).
    pub coord: Option<GridCoord>,
    pub flags: CellFlags,
}

/// Live size labels shown on a handle: its own cell and the next one.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HandleLabels {
    pub column: String,
    pub next: String,
}

/// Box model and element plumbing consumed by the sizer.
pub trait CellHost {
    /// Container measurements (outer width and font sizes).
    fn metrics(&self) -> Metrics;

    /// Attached child cells matching `selector`, in document order.
    fn cells(&self, selector: &str) -> Vec<CellId>;

    /// Current resolved width in pixels.
    fn cell_width(&self, cell: CellId) -> f64;

    /// Configured minimum width in pixels (0 when unset).
    fn cell_min_width(&self, cell: CellId) -> f64;

    /// Explicit width carried by the element itself, if any.
    fn inline_width(&self, cell: CellId) -> Option<Length>;

    /// Hidden cells take no part in the grid.
    fn is_hidden(&self, cell: CellId) -> bool;

    /// Write (or clear with `None`) the cell's width.
    fn set_width(&mut self, cell: CellId, width: Option<Length>);

    /// Write (or clear with `None`) the cell's max width in pixels.
    fn set_max_width(&mut self, cell: CellId, max_width: Option<f64>);

    /// Create the resize handle inside a cell.
    fn attach_handle(&mut self, cell: CellId);

    /// Remove the resize handle from a cell.
    fn detach_handle(&mut self, cell: CellId);

    fn set_tags(&mut self, cell: CellId, tags: CellTags);

    fn set_handle_labels(&mut self, cell: CellId, labels: &HandleLabels);

    /// Move `cell` (attached or not) right before `anchor`.
    fn insert_before(&mut self, anchor: CellId, cell: CellId);

    /// Move `cell` (attached or not) right after `anchor`.
    fn insert_after(&mut self, anchor: CellId, cell: CellId);

    /// Take the cell out of the container, keeping it alive for re-insertion.
    fn detach(&mut self, cell: CellId);

    /// Destroy the cell.
    fn remove(&mut self, cell: CellId);

    /// Start delivering page-wide pointer move/up events to the sizer.
    fn track_pointer(&mut self) -> TrackingId;

    fn untrack_pointer(&mut self, tracking: TrackingId);
}
