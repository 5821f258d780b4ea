#![forbid(unsafe_code)]

//! `flexgrid-web` binds the layout solvers to a live container.
//!
//! Design goals:
//! - **Host-driven**: the embedding environment pushes pointer signals and
//!   answers box-model queries through [`flexgrid_core::CellHost`].
//! - **Stateless rows**: the grid is recomputed from measured widths on
//!   every query; only grid coordinate tags survive between refreshes.
//! - **No threads**: every call runs to completion on the caller's turn.
//!
//! [`Sizer`] is one widget instance, [`SizerRegistry`] maps container keys
//! to instances and dispatches method calls by name.

pub mod error;
pub mod method;
pub mod pointer;
pub mod registry;
pub mod sizer;

pub use error::SizerError;
pub use method::Method;
pub use pointer::{
    CaptureCommand, DragInput, HandlePointerRouter, PointerButton, PointerDispatch,
    PointerIgnoredReason, PointerLogEntry, PointerOutcome, PointerPhase, PointerRouterConfig,
};
pub use registry::SizerRegistry;
pub use sizer::Sizer;
