//! Error types shared by the engine, the configuration layer and file I/O.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A parameter that failed validation, with its field path and constraint.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid parameter `{field}`: {message}")]
pub struct ParamError {
    /// Parameter key or dotted field path (e.g. `"battSocMinPct"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ParamError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors surfaced by a simulation run or by loading its inputs.
#[derive(Debug, Error)]
pub enum SimError {
    /// A caller-supplied value is non-finite or outside its valid range.
    #[error(transparent)]
    InvalidParameter(#[from] ParamError),

    /// Demand and PV profiles do not cover the same number of steps.
    #[error("profile length mismatch: demand has {demand} samples, pv has {pv}")]
    ProfileLengthMismatch { demand: usize, pv: usize },

    /// A profile has more samples than the period has steps.
    #[error("profile has {samples} samples but the period only has {steps} steps")]
    ProfileTooLong { samples: usize, steps: usize },

    #[error("I/O error on `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl SimError {
    /// Shorthand for an [`SimError::InvalidParameter`].
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter(ParamError::new(field, message))
    }

    /// Whether the error stems from caller input rather than the environment.
    ///
    /// A service wrapping the engine maps these to a client-side failure.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidParameter(_)
                | Self::ProfileLengthMismatch { .. }
                | Self::ProfileTooLong { .. }
                | Self::Toml(_)
                | Self::Json(_)
        )
    }
}
