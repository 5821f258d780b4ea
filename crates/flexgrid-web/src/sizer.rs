#![forbid(unsafe_code)]

//! One resizable flex grid bound to its host container.
//!
//! A [`Sizer`] owns the host, the options it was initialized with, the grid
//! coordinate tags from the last refresh, the live drag gesture and the
//! listener list. Rows are never cached: every query and every edit starts
//! from a fresh [`Grid::reconstruct`] over the host's measured widths.
//!
//! Structural edits follow one protocol: snapshot the grid as unit values,
//! derive the edited grid, write only the widths that differ, refresh, and
//! emit a single `change` event listing the differences.

use rustc_hash::FxHashMap;

use flexgrid_core::{
    CellChange, CellFlags, CellHost, CellId, CellTags, ChangeEvent, ContainerKey, EventEmitter,
    GestureSnapshot, GridCoord, HandleLabels, Length, SizerEvent, SizerOptions, TrackingId,
    UnitConverter, UnitValue,
};
use flexgrid_layout::{
    DragMachine, DragPair, EditOperation, Grid, GridCell, Placement, SlotChange, ValueGrid,
    pair_change, stretch,
};

use crate::error::SizerError;
use crate::pointer::{DragInput, HandlePointerRouter, PointerButton, PointerDispatch};

/// Resizable grid widget for one container.
#[derive(Debug)]
pub struct Sizer<H: CellHost> {
    key: ContainerKey,
    host: H,
    options: SizerOptions,
    /// Managed cells in document order; position is the public cell index.
    cells: Vec<CellId>,
    /// Grid coordinate per cell index from the last refresh.
    coords: FxHashMap<usize, GridCoord>,
    drag: DragMachine,
    router: HandlePointerRouter,
    tracking: Option<TrackingId>,
    emitter: EventEmitter,
}

impl<H: CellHost> Sizer<H> {
    /// Validate `options`, attach handles to every cell and lay the grid
    /// out once.
    pub fn init(key: ContainerKey, host: H, options: SizerOptions) -> Result<Self, SizerError> {
        options.validate()?;
        let mut sizer = Self {
            key,
            host,
            options,
            cells: Vec::new(),
            coords: FxHashMap::default(),
            drag: DragMachine::new(),
            router: HandlePointerRouter::default(),
            tracking: None,
            emitter: EventEmitter::new(),
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(container = key.0, unit = ?sizer.options.unit, "sizer init");
        sizer.refresh();
        Ok(sizer)
    }

    /// Tear down handles, tags and pointer tracking and hand the host back.
    ///
    /// Cell widths are left as they are.
    pub fn destroy(mut self) -> H {
        if let Some(tracking) = self.tracking.take() {
            self.host.untrack_pointer(tracking);
        }
        for &cell in &self.cells {
            self.host.detach_handle(cell);
            self.host.set_max_width(cell, None);
            self.host.set_tags(cell, CellTags::default());
        }
        self.emitter.clear();
        #[cfg(feature = "tracing")]
        tracing::debug!(container = self.key.0, "sizer destroyed");
        self.host
    }

    #[must_use]
    pub const fn key(&self) -> ContainerKey {
        self.key
    }

    #[must_use]
    pub const fn options(&self) -> &SizerOptions {
        &self.options
    }

    #[must_use]
    pub const fn host(&self) -> &H {
        &self.host
    }

    /// Direct host access; call [`Self::refresh`] after changing the layout.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Listener list for drag and change notifications.
    pub fn events_mut(&mut self) -> &mut EventEmitter {
        &mut self.emitter
    }

    /// Managed cells in index order.
    #[must_use]
    pub fn cells(&self) -> &[CellId] {
        &self.cells
    }

    /// Grid coordinate tagged on the cell at `index` by the last refresh.
    #[must_use]
    pub fn coord(&self, index: usize) -> Option<GridCoord> {
        self.coords.get(&index).copied()
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_active()
    }

    #[must_use]
    pub fn converter(&self) -> UnitConverter {
        UnitConverter::new(
            self.options.unit,
            self.host.metrics(),
            self.options.display_unit,
        )
    }

    fn layout(&self) -> Grid {
        let cells = self
            .cells
            .iter()
            .enumerate()
            .filter(|&(_, &cell)| !self.host.is_hidden(cell))
            .map(|(index, &cell)| GridCell {
                index,
                cell,
                pixels: self.host.cell_width(cell),
            });
        Grid::reconstruct(cells, self.host.metrics().outer_width)
    }

    fn snapshot(&self) -> ValueGrid {
        self.layout()
            .values(&self.converter(), self.options.precision)
    }

    /// Current rows as unit values.
    #[must_use]
    pub fn grid(&self) -> Vec<Vec<Length>> {
        self.layout()
            .lengths(&self.converter(), self.options.precision)
    }

    /// Width of the cell at `index` in the configured unit.
    #[must_use]
    pub fn width(&self, index: usize) -> Option<Length> {
        let cell = *self.cells.get(index)?;
        Some(
            self.converter()
                .to_length(self.host.cell_width(cell), self.options.precision),
        )
    }

    fn sync_cells(&mut self) {
        let current = self.host.cells(&self.options.children);
        for &cell in &current {
            if !self.cells.contains(&cell) {
                self.host.attach_handle(cell);
            }
        }
        self.cells = current;
    }

    /// Re-read the cells, stretch every row onto the container width and
    /// rewrite coordinate tags and handle labels.
    pub fn refresh(&mut self) {
        self.sync_cells();
        let converter = self.converter();
        let precision = self.options.precision;
        let unit = self.options.unit;
        let nominal = converter.nominal_width(precision);

        let grid = self.layout();
        for row in grid.rows() {
            let values: Vec<UnitValue> = row
                .iter()
                .map(|cell| converter.to_value(cell.pixels, precision))
                .collect();
            for (cell, value) in row.iter().zip(stretch(&values, nominal)) {
                self.host.set_width(cell.cell, Some(Length::new(value, unit)));
                self.host.set_max_width(cell.cell, None);
            }
        }

        self.coords.clear();
        let last_row = grid.row_count() - 1;
        for (coord, cell) in grid.iter() {
            let row_len = grid.row(coord.y).map_or(0, <[GridCell]>::len);
            let mut flags = CellFlags::empty();
            flags.set(CellFlags::LAST_ROW, coord.y == last_row);
            flags.set(CellFlags::LAST_COLUMN, coord.x + 1 == row_len);
            self.host.set_tags(
                cell.cell,
                CellTags {
                    coord: Some(coord),
                    flags,
                },
            );
            self.coords.insert(cell.index, coord);
        }
        for &cell in &self.cells {
            if self.host.is_hidden(cell) {
                self.host.set_tags(cell, CellTags::default());
            }
        }

        for (coord, cell) in grid.iter() {
            let next = grid
                .cell_at(GridCoord::new(coord.x + 1, coord.y))
                .map(|next| next.cell);
            self.write_labels(cell.cell, next);
        }
        #[cfg(feature = "tracing")]
        tracing::trace!(
            container = self.key.0,
            rows = grid.row_count(),
            cells = grid.cell_count(),
            "refreshed"
        );
    }

    fn write_labels(&mut self, cell: CellId, next: Option<CellId>) {
        let converter = self.converter();
        let precision = self.options.display_precision;
        let labels = HandleLabels {
            column: converter.display(self.host.cell_width(cell), precision),
            next: next.map_or_else(String::new, |next| {
                converter.display(self.host.cell_width(next), precision)
            }),
        };
        self.host.set_handle_labels(cell, &labels);
    }

    /// Drop every explicit width and lay the grid out from scratch.
    pub fn restart(&mut self) {
        for &cell in &self.cells {
            self.host.set_width(cell, None);
            self.host.set_max_width(cell, None);
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(container = self.key.0, "restart");
        self.refresh();
    }

    // --- structural edits ---

    /// Break the row after the cell at `index`.
    pub fn split(&mut self, index: usize) -> Option<ChangeEvent> {
        self.apply(EditOperation::Split { index })
    }

    /// Merge the row starting at `index` into the previous row.
    pub fn join(&mut self, index: usize) -> Option<ChangeEvent> {
        self.apply(EditOperation::Join { index })
    }

    /// Take the cell at `index` out of the container and give its width to
    /// the rest of its row. The node stays alive for a later insert.
    pub fn detach(&mut self, index: usize) -> Option<ChangeEvent> {
        self.apply(EditOperation::Detach { index })
    }

    /// Like [`Self::detach`], but the node is destroyed.
    pub fn remove(&mut self, index: usize) -> Option<ChangeEvent> {
        self.apply(EditOperation::Remove { index })
    }

    /// Place `cell` in front of the cell at `index`, in the same row.
    ///
    /// A cell that is already managed moves; an explicit inline width is
    /// kept, otherwise the newcomer gets the row's average width.
    pub fn insert_before(&mut self, index: usize, cell: CellId) -> Option<ChangeEvent> {
        self.apply(EditOperation::InsertBefore { index, cell })
    }

    /// Place `cell` behind the cell at `index`; see [`Self::insert_before`].
    pub fn insert_after(&mut self, index: usize, cell: CellId) -> Option<ChangeEvent> {
        self.apply(EditOperation::InsertAfter { index, cell })
    }

    /// Equal widths for the row holding `index`, or for every row.
    pub fn normalize(&mut self, index: Option<usize>) -> Option<ChangeEvent> {
        self.apply(EditOperation::Normalize { index })
    }

    /// Run one structural edit.
    ///
    /// Returns the emitted change event, or `None` when the edit did not
    /// apply or changed nothing.
    pub fn apply(&mut self, op: EditOperation) -> Option<ChangeEvent> {
        let outcome = self.edit(op);
        #[cfg(feature = "tracing")]
        tracing::debug!(
            container = self.key.0,
            op = ?op.kind(),
            index = ?op.index(),
            changed = outcome.as_ref().map_or(0, |event| event.changes.len()),
            "edit applied"
        );
        let event = outcome?;
        self.emitter.emit(&SizerEvent::Change(event.clone()));
        Some(event)
    }

    fn edit(&mut self, op: EditOperation) -> Option<ChangeEvent> {
        match op {
            EditOperation::Split { index } => {
                let at = self.coord(index)?;
                self.commit(|grid| grid.split(at))
            }
            EditOperation::Join { index } => {
                let at = self.coord(index)?;
                self.commit(|grid| grid.join(at))
            }
            EditOperation::Detach { index } | EditOperation::Remove { index } => {
                let destroy = matches!(op, EditOperation::Remove { .. });
                let (before, after) = self.take_out(index, destroy)?;
                self.finish_edit(&before, &after)
            }
            EditOperation::InsertBefore { index, cell } => {
                self.insert(index, cell, Placement::Before)
            }
            EditOperation::InsertAfter { index, cell } => {
                self.insert(index, cell, Placement::After)
            }
            EditOperation::Normalize { index } => {
                let row = match index {
                    Some(index) => Some(self.coord(index)?.y),
                    None => None,
                };
                self.commit(|grid| grid.normalize(row))
            }
        }
    }

    fn commit(&mut self, transform: impl FnOnce(&ValueGrid) -> Option<ValueGrid>) -> Option<ChangeEvent> {
        let before = self.snapshot();
        let after = transform(&before)?;
        self.finish_edit(&before, &after)
    }

    /// Detach (or destroy) the cell at `index` and shrink its row.
    fn take_out(&mut self, index: usize, destroy: bool) -> Option<(ValueGrid, ValueGrid)> {
        let at = self.coord(index)?;
        let cell = *self.cells.get(index)?;
        let before = self.snapshot();
        let after = before.detach(at)?;
        self.host.detach_handle(cell);
        self.host.set_tags(cell, CellTags::default());
        if destroy {
            self.host.remove(cell);
        } else {
            self.host.detach(cell);
        }
        Some((before, after))
    }

    fn insert(&mut self, mut index: usize, cell: CellId, placement: Placement) -> Option<ChangeEvent> {
        let anchor = *self.cells.get(index)?;
        // Only laid-out anchors take a newcomer; check before a move touches the host.
        if anchor == cell || self.coord(index).is_none() {
            return None;
        }
        // A managed cell is moved: detach it silently, then insert.
        if let Some(position) = self.cells.iter().position(|&managed| managed == cell) {
            let (before, after) = self.take_out(position, false)?;
            self.write_changes(&before.diff(&after));
            self.refresh();
            if position < index {
                index -= 1;
            }
        }

        let at = self.coord(index)?;
        let converter = self.converter();
        let precision = self.options.precision;
        let width = self.host.inline_width(cell).map(|length| {
            converter.to_value(converter.metrics().length_to_pixels(length), precision)
        });
        let before = self.snapshot();
        let after = before.insert(at, placement, cell, width)?;
        match placement {
            Placement::Before => self.host.insert_before(anchor, cell),
            Placement::After => self.host.insert_after(anchor, cell),
        }
        self.finish_edit(&before, &after)
    }

    fn write_changes(&mut self, changes: &[SlotChange]) {
        let unit = self.options.unit;
        for change in changes {
            self.host
                .set_width(change.cell, Some(Length::new(change.after, unit)));
        }
    }

    fn finish_edit(&mut self, before: &ValueGrid, after: &ValueGrid) -> Option<ChangeEvent> {
        let diff = before.diff(after);
        self.write_changes(&diff);
        self.refresh();
        if diff.is_empty() {
            return None;
        }
        let unit = self.options.unit;
        let changes = diff
            .iter()
            .filter_map(|change| {
                let index = self.cells.iter().position(|&cell| cell == change.cell)?;
                Some(CellChange {
                    cell: change.cell,
                    index,
                    before: change.before.map(|value| Length::new(value, unit)),
                    after: Length::new(change.after, unit),
                })
            })
            .collect();
        Some(ChangeEvent {
            target: self.key,
            changes,
        })
    }

    // --- pointer interaction ---

    /// Right-hand neighbour of the cell at `index`, if it has one in its row.
    fn neighbour(&self, index: usize) -> Option<(usize, CellId)> {
        let grid = self.layout();
        let coord = grid.coord_of(index)?;
        let next = grid.cell_at(GridCoord::new(coord.x + 1, coord.y))?;
        Some((next.index, next.cell))
    }

    /// Pointer-down on the resize handle of the cell at `handle`.
    pub fn pointer_down(
        &mut self,
        handle: usize,
        pointer_id: u32,
        button: PointerButton,
        x: f64,
    ) -> PointerDispatch {
        let neighbour = self.neighbour(handle);
        let dispatch =
            self.router
                .pointer_down(handle, neighbour.is_some(), pointer_id, button, x);
        if let Some(DragInput::End { x }) = dispatch.input {
            #[cfg(feature = "tracing")]
            tracing::debug!(container = self.key.0, "finalizing stale gesture");
            self.end_gesture(x);
        }
        if let Some(DragInput::Begin { handle, x, stale_x }) = dispatch.input {
            if let Some(stale_x) = stale_x {
                #[cfg(feature = "tracing")]
                tracing::debug!(container = self.key.0, "finalizing stale gesture");
                self.end_gesture(stale_x);
            }
            // The stale commit may have rewrapped the rows.
            let pair = self.neighbour(handle).and_then(|(next_index, next)| {
                let column = *self.cells.get(handle)?;
                Some(DragPair {
                    container: self.key,
                    handle,
                    column,
                    next,
                    next_index,
                })
            });
            let began = pair.is_some_and(|pair| self.begin_gesture(pair, x));
            if !began {
                self.router.reset();
            }
        }
        dispatch
    }

    /// Page-wide pointer-move.
    pub fn pointer_move(&mut self, pointer_id: u32, x: f64) -> PointerDispatch {
        let dispatch = self.router.pointer_move(pointer_id, x);
        if let Some(DragInput::Move { x }) = dispatch.input
            && let Some(gesture) = self.drag.update(&mut self.host, x)
        {
            self.write_labels(gesture.column.cell, Some(gesture.next.cell));
            self.emitter.emit(&SizerEvent::DragMove(gesture));
        }
        dispatch
    }

    /// Page-wide pointer-up.
    pub fn pointer_up(&mut self, pointer_id: u32, button: PointerButton, x: f64) -> PointerDispatch {
        let dispatch = self.router.pointer_up(pointer_id, button, x);
        if let Some(DragInput::End { x }) = dispatch.input {
            self.end_gesture(x);
        }
        dispatch
    }

    fn begin_gesture(&mut self, pair: DragPair, x: f64) -> bool {
        let Some(gesture) = self.drag.begin(&mut self.host, pair, x) else {
            return false;
        };
        self.tracking = Some(self.host.track_pointer());
        self.write_labels(pair.column, Some(pair.next));
        self.emitter.emit(&SizerEvent::DragStart(gesture));
        true
    }

    fn end_gesture(&mut self, x: f64) -> Option<GestureSnapshot> {
        let gesture = self.drag.finish(x)?;
        if let Some(tracking) = self.tracking.take() {
            self.host.untrack_pointer(tracking);
        }
        self.emitter.emit(&SizerEvent::DragStop(gesture));
        self.refresh();
        if let Some(changes) = pair_change(&gesture, &self.converter(), self.options.precision) {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                container = self.key.0,
                handle = gesture.handle.index,
                "drag committed"
            );
            self.emitter.emit(&SizerEvent::Change(ChangeEvent {
                target: self.key,
                changes: changes.to_vec(),
            }));
        }
        Some(gesture)
    }
}
