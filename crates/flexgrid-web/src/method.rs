#![forbid(unsafe_code)]

//! Names of the public call surface.

use core::fmt;
use core::str::FromStr;

use crate::error::SizerError;

/// A method reachable through [`crate::SizerRegistry::invoke`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Init,
    Destroy,
    Grid,
    Width,
    InsertBefore,
    InsertAfter,
    Detach,
    Remove,
    Split,
    Join,
    Normalize,
    Refresh,
    Restart,
}

impl Method {
    pub const ALL: [Self; 13] = [
        Self::Init,
        Self::Destroy,
        Self::Grid,
        Self::Width,
        Self::InsertBefore,
        Self::InsertAfter,
        Self::Detach,
        Self::Remove,
        Self::Split,
        Self::Join,
        Self::Normalize,
        Self::Refresh,
        Self::Restart,
    ];

    /// Name as written by callers.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Destroy => "destroy",
            Self::Grid => "grid",
            Self::Width => "width",
            Self::InsertBefore => "insertBefore",
            Self::InsertAfter => "insertAfter",
            Self::Detach => "detach",
            Self::Remove => "remove",
            Self::Split => "split",
            Self::Join => "join",
            Self::Normalize => "normalize",
            Self::Refresh => "refresh",
            Self::Restart => "restart",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Method {
    type Err = SizerError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.name() == name)
            .ok_or_else(|| SizerError::UnknownMethod {
                name: name.to_owned(),
            })
    }
}
