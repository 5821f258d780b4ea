#![forbid(unsafe_code)]

//! Tracing re-exports.
//!
//! With the `tracing` feature enabled the sizer crates log lifecycle points
//! (init, refresh, committed edits, gesture begin/commit) through these
//! macros. Without it nothing is compiled in.

#[cfg(feature = "tracing")]
pub use tracing::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};
