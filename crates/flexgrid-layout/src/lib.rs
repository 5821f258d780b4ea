#![forbid(unsafe_code)]

//! Layout solvers for the flex grid cell sizer.
//!
//! # Role in the flex grid cell sizer
//! Everything here is a pure function of measured widths or a small state
//! machine driven through [`flexgrid_core::CellHost`]:
//!
//! - [`grid`] recovers rows from a flat list of pixel widths.
//! - [`stretch`] rescales one row onto the container width without drift.
//! - [`edit`] expresses split, join, detach, insert and normalize as grid
//!   transforms plus a diff.
//! - [`drag`] runs the two-cell resize gesture.
//!
//! # How it fits in the system
//! `flexgrid-web` owns a host and calls into these modules; nothing in this
//! crate keeps per-container state beyond a live drag gesture.

pub mod drag;
pub mod edit;
pub mod grid;
pub mod stretch;

pub use drag::{DragMachine, DragPair, DragState, PIXEL_PRECISION, pair_change};
pub use edit::{EditKind, EditOperation, Placement, Slot, SlotChange, ValueGrid};
pub use grid::{Grid, GridCell};
pub use stretch::{stretch, stretch_lengths, total};
