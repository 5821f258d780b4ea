#![forbid(unsafe_code)]

//! Core: units, options, host collaborators, and events.
//!
//! # Role in the flex grid cell sizer
//! `flexgrid-core` is the vocabulary layer. It owns the fixed-point unit
//! values every width is expressed in, the option set a container is
//! initialized with, the [`host::CellHost`] trait through which the page's
//! box model is read and written, and the notifications pushed to
//! listeners.
//!
//! # How it fits in the system
//! `flexgrid-layout` builds the grid, stretch and drag algorithms on top of
//! these types; `flexgrid-web` wires them into a host-driven widget.

pub mod event;
pub mod host;
pub mod logging;
pub mod options;
pub mod unit;

#[cfg(any(test, feature = "test-helpers"))]
pub mod sim;

pub use event::{
    CellChange, ChangeEvent, EventEmitter, GestureCell, GestureHandle, GestureSnapshot,
    GestureTarget, ListenerId, SizerEvent, SizerEventKind, Track,
};
pub use host::{
    CellFlags, CellHost, CellId, CellTags, ContainerKey, GridCoord, HandleLabels, TrackingId,
};
pub use options::{OptionsError, SizerOptions};
pub use unit::{Length, MAX_PRECISION, Metrics, Unit, UnitConverter, UnitParseError, UnitValue};

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};
