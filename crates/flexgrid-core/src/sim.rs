#![forbid(unsafe_code)]

//! Deterministic in-memory [`CellHost`] for tests and benchmarks.
//!
//! Widths resolve the way a browser resolves an inline `width` on a flex
//! item: the explicit length (or the natural width when none is set) is
//! clamped by `max-width` first and `min-width` last.

use std::cell::RefCell;
use std::rc::Rc;

use crate::event::{ChangeEvent, EventEmitter, SizerEvent, SizerEventKind};
use crate::host::{CellHost, CellId, CellTags, HandleLabels, TrackingId};
use crate::unit::{Length, Metrics};

/// One simulated cell element.
#[derive(Debug, Clone, PartialEq)]
pub struct SimCell {
    pub id: CellId,
    /// Width used when no explicit width is set.
    pub natural_width: f64,
    pub width: Option<Length>,
    pub min_width: f64,
    pub max_width: Option<f64>,
    pub hidden: bool,
    /// Matched by `.class` selectors.
    pub class: Option<String>,
    pub tags: CellTags,
    pub labels: Option<HandleLabels>,
    pub has_handle: bool,
}

impl SimCell {
    #[must_use]
    pub fn new(id: CellId, natural_width: f64) -> Self {
        Self {
            id,
            natural_width,
            width: None,
            min_width: 0.0,
            max_width: None,
            hidden: false,
            class: None,
            tags: CellTags::default(),
            labels: None,
            has_handle: false,
        }
    }

    fn matches(&self, selector: &str) -> bool {
        match selector.trim() {
            "" | "*" => true,
            other => other
                .strip_prefix('.')
                .is_some_and(|class| self.class.as_deref() == Some(class)),
        }
    }
}

/// Simulated container.
#[derive(Debug, Clone)]
pub struct SimHost {
    metrics: Metrics,
    children: Vec<SimCell>,
    detached: Vec<SimCell>,
    removed: Vec<CellId>,
    next_cell: u64,
    next_tracking: u64,
    tracking: Vec<TrackingId>,
}

impl SimHost {
    /// Empty container with the given outer width and 16px fonts.
    #[must_use]
    pub fn new(outer_width: f64) -> Self {
        Self {
            metrics: Metrics {
                outer_width,
                ..Metrics::default()
            },
            children: Vec::new(),
            detached: Vec::new(),
            removed: Vec::new(),
            next_cell: 0,
            next_tracking: 0,
            tracking: Vec::new(),
        }
    }

    /// Container holding one cell per natural width.
    #[must_use]
    pub fn with_cells(outer_width: f64, widths: &[f64]) -> Self {
        let mut host = Self::new(outer_width);
        for &width in widths {
            host.push_cell(width);
        }
        host
    }

    #[must_use]
    pub fn with_fonts(mut self, font_size: f64, root_font_size: f64) -> Self {
        self.metrics.font_size = font_size;
        self.metrics.root_font_size = root_font_size;
        self
    }

    fn allocate(&mut self) -> CellId {
        self.next_cell += 1;
        CellId(self.next_cell)
    }

    /// Append an attached cell.
    pub fn push_cell(&mut self, natural_width: f64) -> CellId {
        let id = self.allocate();
        self.children.push(SimCell::new(id, natural_width));
        id
    }

    /// Create a cell that is not yet in the container.
    pub fn create_detached(&mut self, natural_width: f64, width: Option<Length>) -> CellId {
        let id = self.allocate();
        let mut cell = SimCell::new(id, natural_width);
        cell.width = width;
        self.detached.push(cell);
        id
    }

    /// Simulate a layout change of the container (e.g. a scrollbar appearing).
    pub fn set_outer_width(&mut self, outer_width: f64) {
        self.metrics.outer_width = outer_width;
    }

    #[must_use]
    pub fn cell(&self, id: CellId) -> Option<&SimCell> {
        self.children
            .iter()
            .chain(self.detached.iter())
            .find(|cell| cell.id == id)
    }

    pub fn cell_mut(&mut self, id: CellId) -> Option<&mut SimCell> {
        self.children
            .iter_mut()
            .chain(self.detached.iter_mut())
            .find(|cell| cell.id == id)
    }

    /// Attached cell ids in document order.
    #[must_use]
    pub fn child_ids(&self) -> Vec<CellId> {
        self.children.iter().map(|cell| cell.id).collect()
    }

    #[must_use]
    pub fn is_attached(&self, id: CellId) -> bool {
        self.children.iter().any(|cell| cell.id == id)
    }

    #[must_use]
    pub fn is_detached(&self, id: CellId) -> bool {
        self.detached.iter().any(|cell| cell.id == id)
    }

    #[must_use]
    pub fn was_removed(&self, id: CellId) -> bool {
        self.removed.contains(&id)
    }

    /// Number of live pointer-tracking subscriptions.
    #[must_use]
    pub fn active_tracking(&self) -> usize {
        self.tracking.len()
    }

    fn resolve(&self, cell: &SimCell) -> f64 {
        let base = cell
            .width
            .map_or(cell.natural_width, |width| self.metrics.length_to_pixels(width));
        let capped = cell.max_width.map_or(base, |max| base.min(max));
        capped.max(cell.min_width)
    }

    fn take(&mut self, id: CellId) -> Option<SimCell> {
        if let Some(pos) = self.children.iter().position(|cell| cell.id == id) {
            return Some(self.children.remove(pos));
        }
        let pos = self.detached.iter().position(|cell| cell.id == id)?;
        Some(self.detached.remove(pos))
    }

    fn insert_relative(&mut self, anchor: CellId, id: CellId, after: bool) {
        if anchor == id {
            return;
        }
        let Some(cell) = self.take(id) else {
            return;
        };
        match self.children.iter().position(|child| child.id == anchor) {
            Some(pos) => {
                let at = if after { pos + 1 } else { pos };
                self.children.insert(at, cell);
            }
            None => self.detached.push(cell),
        }
    }
}

impl CellHost for SimHost {
    fn metrics(&self) -> Metrics {
        self.metrics
    }

    fn cells(&self, selector: &str) -> Vec<CellId> {
        self.children
            .iter()
            .filter(|cell| cell.matches(selector))
            .map(|cell| cell.id)
            .collect()
    }

    fn cell_width(&self, cell: CellId) -> f64 {
        self.cell(cell).map_or(0.0, |cell| self.resolve(cell))
    }

    fn cell_min_width(&self, cell: CellId) -> f64 {
        self.cell(cell).map_or(0.0, |cell| cell.min_width)
    }

    fn inline_width(&self, cell: CellId) -> Option<Length> {
        self.cell(cell).and_then(|cell| cell.width)
    }

    fn is_hidden(&self, cell: CellId) -> bool {
        self.cell(cell).is_some_and(|cell| cell.hidden)
    }

    fn set_width(&mut self, cell: CellId, width: Option<Length>) {
        if let Some(cell) = self.cell_mut(cell) {
            cell.width = width;
        }
    }

    fn set_max_width(&mut self, cell: CellId, max_width: Option<f64>) {
        if let Some(cell) = self.cell_mut(cell) {
            cell.max_width = max_width;
        }
    }

    fn attach_handle(&mut self, cell: CellId) {
        if let Some(cell) = self.cell_mut(cell) {
            cell.has_handle = true;
        }
    }

    fn detach_handle(&mut self, cell: CellId) {
        if let Some(cell) = self.cell_mut(cell) {
            cell.has_handle = false;
            cell.labels = None;
        }
    }

    fn set_tags(&mut self, cell: CellId, tags: CellTags) {
        if let Some(cell) = self.cell_mut(cell) {
            cell.tags = tags;
        }
    }

    fn set_handle_labels(&mut self, cell: CellId, labels: &HandleLabels) {
        if let Some(cell) = self.cell_mut(cell) {
            cell.labels = Some(labels.clone());
        }
    }

    fn insert_before(&mut self, anchor: CellId, cell: CellId) {
        self.insert_relative(anchor, cell, false);
    }

    fn insert_after(&mut self, anchor: CellId, cell: CellId) {
        self.insert_relative(anchor, cell, true);
    }

    fn detach(&mut self, cell: CellId) {
        if let Some(pos) = self.children.iter().position(|child| child.id == cell) {
            let cell = self.children.remove(pos);
            self.detached.push(cell);
        }
    }

    fn remove(&mut self, cell: CellId) {
        if self.take(cell).is_some() {
            self.removed.push(cell);
        }
    }

    fn track_pointer(&mut self) -> TrackingId {
        self.next_tracking += 1;
        let id = TrackingId(self.next_tracking);
        self.tracking.push(id);
        id
    }

    fn untrack_pointer(&mut self, tracking: TrackingId) {
        self.tracking.retain(|id| *id != tracking);
    }
}

/// Records every event delivered by an emitter.
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    events: Rc<RefCell<Vec<SizerEvent>>>,
}

impl EventRecorder {
    /// Subscribe a new recorder to all events of `emitter`.
    pub fn attach(emitter: &mut EventEmitter) -> Self {
        let recorder = Self::default();
        let sink = Rc::clone(&recorder.events);
        emitter.subscribe(None, move |event| sink.borrow_mut().push(event.clone()));
        recorder
    }

    #[must_use]
    pub fn events(&self) -> Vec<SizerEvent> {
        self.events.borrow().clone()
    }

    #[must_use]
    pub fn kinds(&self) -> Vec<SizerEventKind> {
        self.events.borrow().iter().map(SizerEvent::kind).collect()
    }

    #[must_use]
    pub fn changes(&self) -> Vec<ChangeEvent> {
        self.events
            .borrow()
            .iter()
            .filter_map(SizerEvent::change)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}
