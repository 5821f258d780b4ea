#![forbid(unsafe_code)]

//! Errors raised by the public call surface.
//!
//! Structural edits that do not apply to their target are not errors; they
//! return no change. Only malformed calls end up here.

use core::fmt;

use flexgrid_core::{ContainerKey, OptionsError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SizerError {
    /// Method name is private (`_` prefix) or not part of the call surface.
    UnknownMethod { name: String },
    /// Argument at `position` has the wrong JSON shape.
    InvalidArgument {
        method: &'static str,
        position: usize,
        expected: &'static str,
        found: &'static str,
    },
    /// No sizer has been initialized for this container.
    UnknownContainer { key: ContainerKey },
    Options(OptionsError),
    /// Result could not be encoded as JSON.
    Encode { message: String },
}

impl fmt::Display for SizerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownMethod { name } => write!(f, "no such method: {name:?}"),
            Self::InvalidArgument {
                method,
                position,
                expected,
                found,
            } => write!(
                f,
                "{method}: argument {position} must be {expected}, got {found}"
            ),
            Self::UnknownContainer { key } => {
                write!(f, "container {} has no sizer; call init first", key.0)
            }
            Self::Options(err) => write!(f, "invalid options: {err}"),
            Self::Encode { message } => write!(f, "failed to encode result: {message}"),
        }
    }
}

impl std::error::Error for SizerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Options(err) => Some(err),
            _ => None,
        }
    }
}

impl From<OptionsError> for SizerError {
    fn from(err: OptionsError) -> Self {
        Self::Options(err)
    }
}
