#![forbid(unsafe_code)]

//! Sizer configuration.
//!
//! Options arrive from the embedding page as a loose JSON object, so every
//! field has a default and unknown keys are ignored.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::unit::{MAX_PRECISION, Unit};

/// Recognized sizer options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SizerOptions {
    /// Selector choosing which child nodes of the container become cells.
    pub children: String,
    /// Decimal places for widths written to cells.
    pub precision: u32,
    /// Decimal places for the sizes shown on handles.
    pub display_precision: u32,
    /// Append the unit suffix to handle labels.
    pub display_unit: bool,
    /// Unit used for cell widths.
    pub unit: Unit,
}

impl Default for SizerOptions {
    fn default() -> Self {
        Self {
            children: "*".to_owned(),
            precision: 4,
            display_precision: 1,
            display_unit: true,
            unit: Unit::Percent,
        }
    }
}

impl SizerOptions {
    /// Parse options from a JSON object, filling missing keys with defaults.
    pub fn from_json(json: &str) -> Result<Self, OptionsError> {
        let options: Self = serde_json::from_str(json).map_err(|err| OptionsError::Malformed {
            message: err.to_string(),
        })?;
        options.validate()?;
        Ok(options)
    }

    /// Parse options from an already-decoded JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, OptionsError> {
        let options: Self =
            serde_json::from_value(value).map_err(|err| OptionsError::Malformed {
                message: err.to_string(),
            })?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), OptionsError> {
        for (field, value) in [
            ("precision", self.precision),
            ("displayPrecision", self.display_precision),
        ] {
            if value > MAX_PRECISION {
                return Err(OptionsError::PrecisionOutOfRange { field, value });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = unit;
        self
    }

    #[must_use]
    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }
}

/// Rejected configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionsError {
    Malformed { message: String },
    PrecisionOutOfRange { field: &'static str, value: u32 },
}

impl fmt::Display for OptionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed { message } => write!(f, "malformed sizer options: {message}"),
            Self::PrecisionOutOfRange { field, value } => write!(
                f,
                "option `{field}` is {value}, maximum supported precision is {MAX_PRECISION}"
            ),
        }
    }
}

impl std::error::Error for OptionsError {}
