use std::path::PathBuf;

use thiserror::Error;

/// Rejected handling configuration. Raised before any simulation frame runs.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("{field} must be a finite value greater than zero, got {value}")]
    NonPositive { field: &'static str, value: f32 },

    #[error("{field} must lie in (0, 1], got {value}")]
    CoefficientOutOfRange { field: &'static str, value: f32 },

    #[error("{lower} ({lower_value}) must not exceed {upper} ({upper_value})")]
    ThresholdOrder {
        lower: &'static str,
        lower_value: f32,
        upper: &'static str,
        upper_value: f32,
    },

    #[error("failed to read tuning file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse tuning file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
