#![forbid(unsafe_code)]

//! Resize gesture lifecycle for two adjacent cells.
//!
//! ```text
//! Idle -> Dragging -> Idle
//! ```
//!
//! A gesture ties a cell ("column") to its right neighbour ("next") and
//! turns horizontal pointer travel into a width transfer between them. The
//! pair's combined pixel width stays constant for the whole gesture, apart
//! from a correction when the container's outer width changes mid-drag
//! (typically a vertical scrollbar appearing or disappearing).
//!
//! CSS min/max constraints make "give what you take" unsound, so every move
//! is measured twice: the column is resized first and re-measured, and the
//! neighbour receives the offset that actually took effect.

use serde::{Deserialize, Serialize};

use flexgrid_core::{
    CellChange, CellHost, CellId, ContainerKey, GestureCell, GestureHandle, GestureSnapshot,
    GestureTarget, Length, Track, UnitConverter,
};

/// Decimal places used for the pixel widths pinned during a gesture.
pub const PIXEL_PRECISION: u32 = 6;

/// The cells a gesture ties together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragPair {
    pub container: ContainerKey,
    /// Handle index; equal to the column's flat index.
    pub handle: usize,
    pub column: CellId,
    pub next: CellId,
    /// Flat index of `next`; hidden cells may sit in between.
    pub next_index: usize,
}

/// Drag lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DragState {
    #[default]
    Idle,
    Dragging { gesture: GestureSnapshot },
}

/// Drag lifecycle machine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DragMachine {
    state: DragState,
    transition_counter: u64,
}

impl DragMachine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn state(&self) -> DragState {
        self.state
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Live gesture, if any.
    #[must_use]
    pub const fn gesture(&self) -> Option<&GestureSnapshot> {
        match &self.state {
            DragState::Dragging { gesture } => Some(gesture),
            DragState::Idle => None,
        }
    }

    /// Number of state transitions so far.
    #[must_use]
    pub const fn transitions(&self) -> u64 {
        self.transition_counter
    }

    fn transition(&mut self, to: DragState) {
        self.state = to;
        self.transition_counter = self.transition_counter.saturating_add(1);
    }

    /// Start a gesture at pointer coordinate `x`.
    ///
    /// Pins both cells to their current pixel widths and caps the column so
    /// the neighbour can never be squeezed below its min width. Returns
    /// `None` while another gesture is live; finish that one first.
    pub fn begin<H: CellHost + ?Sized>(
        &mut self,
        host: &mut H,
        pair: DragPair,
        x: f64,
    ) -> Option<GestureSnapshot> {
        if self.is_active() {
            return None;
        }
        let column_start = host.cell_width(pair.column);
        let next_start = host.cell_width(pair.next);
        let max_column = column_start + next_start - host.cell_min_width(pair.next);

        host.set_max_width(pair.column, Some(max_column.max(0.0)));
        host.set_width(pair.column, Some(Length::px(column_start, PIXEL_PRECISION)));
        host.set_width(pair.next, Some(Length::px(next_start, PIXEL_PRECISION)));

        let gesture = GestureSnapshot {
            target: GestureTarget {
                container: pair.container,
                outer_width: host.metrics().outer_width,
            },
            column: GestureCell {
                cell: pair.column,
                index: pair.handle,
                size: Track::starting_at(column_start),
            },
            next: GestureCell {
                cell: pair.next,
                index: pair.next_index,
                size: Track::starting_at(next_start),
            },
            handle: GestureHandle {
                index: pair.handle,
                pointer: Track::starting_at(x),
            },
        };
        #[cfg(feature = "tracing")]
        flexgrid_core::debug!(
            handle = pair.handle,
            column = column_start,
            next = next_start,
            "drag gesture started"
        );
        self.transition(DragState::Dragging { gesture });
        Some(gesture)
    }

    /// Apply pointer travel to coordinate `x`. `None` when idle.
    pub fn update<H: CellHost + ?Sized>(
        &mut self,
        host: &mut H,
        x: f64,
    ) -> Option<GestureSnapshot> {
        let DragState::Dragging { mut gesture } = self.state else {
            return None;
        };
        let column = gesture.column.cell;
        let next = gesture.next.cell;
        gesture.handle.pointer.current = Some(x);

        // Collapse the neighbour so the column can grow into its space, then
        // see how much of the requested offset the column actually took.
        let offset = x - gesture.handle.pointer.start;
        host.set_width(next, Some(Length::px(0.0, PIXEL_PRECISION)));
        host.set_width(
            column,
            Some(Length::px(
                gesture.column.size.start + offset,
                PIXEL_PRECISION,
            )),
        );
        let column_width = host.cell_width(column);
        let applied = column_width - gesture.column.size.start;

        let drift = host.metrics().outer_width - gesture.target.outer_width;
        let next_width = (gesture.next.size.start - applied + drift).max(0.0);
        host.set_width(next, Some(Length::px(next_width, PIXEL_PRECISION)));

        gesture.column.size.current = Some(column_width);
        gesture.next.size.current = Some(host.cell_width(next));
        self.state = DragState::Dragging { gesture };
        Some(gesture)
    }

    /// Freeze the final widths and return to idle. `None` when idle.
    pub fn finish(&mut self, x: f64) -> Option<GestureSnapshot> {
        let DragState::Dragging { mut gesture } = self.state else {
            return None;
        };
        gesture.handle.pointer.stop = Some(x);
        gesture.column.size.stop = Some(gesture.column.size.latest());
        gesture.next.size.stop = Some(gesture.next.size.latest());
        #[cfg(feature = "tracing")]
        flexgrid_core::debug!(
            handle = gesture.handle.index,
            column = gesture.column.size.latest(),
            next = gesture.next.size.latest(),
            "drag gesture finished"
        );
        self.transition(DragState::Idle);
        Some(gesture)
    }
}

/// Committed before/after widths for a finished gesture.
///
/// `None` when the column ended where it started. The neighbour's `after`
/// is derived from the pair total rather than measured, so the two values
/// always add up to exactly what the pair held before the gesture.
#[must_use]
pub fn pair_change(
    gesture: &GestureSnapshot,
    converter: &UnitConverter,
    precision: u32,
) -> Option<[CellChange; 2]> {
    let stop = gesture.column.size.stop?;
    if stop == gesture.column.size.start {
        return None;
    }
    let unit = converter.unit();
    let column_before = converter.to_value(gesture.column.size.start, precision);
    let next_before = converter.to_value(gesture.next.size.start, precision);
    let column_after = converter.to_value(stop, precision);
    let next_after = column_before + next_before - column_after;

    Some([
        CellChange {
            cell: gesture.column.cell,
            index: gesture.column.index,
            before: Some(Length::new(column_before, unit)),
            after: Length::new(column_after, unit),
        },
        CellChange {
            cell: gesture.next.cell,
            index: gesture.next.index,
            before: Some(Length::new(next_before, unit)),
            after: Length::new(next_after, unit),
        },
    ])
}
