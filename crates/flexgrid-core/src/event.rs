#![forbid(unsafe_code)]

//! Lifecycle notifications and the listener list that delivers them.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::host::{CellId, ContainerKey};
use crate::unit::Length;

/// Start/current/stop triple tracked during a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Track {
    pub start: f64,
    pub current: Option<f64>,
    pub stop: Option<f64>,
}

impl Track {
    #[must_use]
    pub const fn starting_at(start: f64) -> Self {
        Self {
            start,
            current: None,
            stop: None,
        }
    }

    /// Latest known value: `current`, falling back to `start`.
    #[must_use]
    pub fn latest(&self) -> f64 {
        self.current.unwrap_or(self.start)
    }
}

/// The container a gesture runs in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureTarget {
    pub container: ContainerKey,
    /// Outer width in pixels when the gesture began.
    pub outer_width: f64,
}

/// One of the two cells tied together by a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureCell {
    pub cell: CellId,
    pub index: usize,
    /// Pixel widths.
    pub size: Track,
}

/// The engaged handle and the pointer's horizontal coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureHandle {
    pub index: usize,
    pub pointer: Track,
}

/// Full state of one resize gesture, as delivered to listeners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureSnapshot {
    pub target: GestureTarget,
    pub column: GestureCell,
    pub next: GestureCell,
    pub handle: GestureHandle,
}

/// Width change of one cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellChange {
    pub cell: CellId,
    pub index: usize,
    /// `None` for a cell that was not part of the grid before the change.
    pub before: Option<Length>,
    pub after: Length,
}

/// Committed width changes for one container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub target: ContainerKey,
    pub changes: Vec<CellChange>,
}

/// Notification pushed to listeners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum SizerEvent {
    DragStart(GestureSnapshot),
    DragMove(GestureSnapshot),
    DragStop(GestureSnapshot),
    Change(ChangeEvent),
}

impl SizerEvent {
    #[must_use]
    pub const fn kind(&self) -> SizerEventKind {
        match self {
            Self::DragStart(_) => SizerEventKind::DragStart,
            Self::DragMove(_) => SizerEventKind::DragMove,
            Self::DragStop(_) => SizerEventKind::DragStop,
            Self::Change(_) => SizerEventKind::Change,
        }
    }

    #[must_use]
    pub const fn gesture(&self) -> Option<&GestureSnapshot> {
        match self {
            Self::DragStart(gesture) | Self::DragMove(gesture) | Self::DragStop(gesture) => {
                Some(gesture)
            }
            Self::Change(_) => None,
        }
    }

    #[must_use]
    pub const fn change(&self) -> Option<&ChangeEvent> {
        match self {
            Self::Change(change) => Some(change),
            _ => None,
        }
    }
}

/// Event discriminator used for filtering and naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizerEventKind {
    DragStart,
    DragMove,
    DragStop,
    Change,
}

impl SizerEventKind {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::DragStart => "dragstart",
            Self::DragMove => "dragmove",
            Self::DragStop => "dragstop",
            Self::Change => "change",
        }
    }
}

impl fmt::Display for SizerEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Handle returned by [`EventEmitter::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Callback = Box<dyn FnMut(&SizerEvent)>;

struct Listener {
    id: ListenerId,
    filter: Option<SizerEventKind>,
    callback: Callback,
}

/// Listener list. Delivery is synchronous and in subscription order.
#[derive(Default)]
pub struct EventEmitter {
    listeners: Vec<Listener>,
    next_id: u64,
}

impl fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("listeners", &self.listeners.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl EventEmitter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback; `filter` restricts it to one event kind.
    pub fn subscribe(
        &mut self,
        filter: Option<SizerEventKind>,
        callback: impl FnMut(&SizerEvent) + 'static,
    ) -> ListenerId {
        self.next_id = self.next_id.saturating_add(1);
        let id = ListenerId(self.next_id);
        self.listeners.push(Listener {
            id,
            filter,
            callback: Box::new(callback),
        });
        id
    }

    /// Returns `false` when the id was unknown.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|listener| listener.id != id);
        self.listeners.len() != before
    }

    /// Deliver `event`; returns how many listeners received it.
    pub fn emit(&mut self, event: &SizerEvent) -> usize {
        let kind = event.kind();
        let mut delivered = 0;
        for listener in &mut self.listeners {
            if listener.filter.is_none_or(|filter| filter == kind) {
                (listener.callback)(event);
                delivered += 1;
            }
        }
        delivered
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
