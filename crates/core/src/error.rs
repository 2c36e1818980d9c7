//! Validation failure taxonomy surfaced to the webhook boundary.

use thiserror::Error;

/// Why an inbound alert failed validation.
///
/// All variants are expected, recoverable outcomes translated into a client
/// error at the boundary; none is fatal to the process.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("unsupported value `{value}` for field `{field}`")]
    UnsupportedValue { field: &'static str, value: String },
    #[error("value {value} out of range for field `{field}`")]
    OutOfRange { field: &'static str, value: f64 },
    #[error("malformed trading pair `{0}`")]
    MalformedPair(String),
    #[error("ambiguous trading pair `{0}`")]
    AmbiguousPair(String),
    #[error("`targets` must be a non-empty list")]
    EmptyTargets,
    #[error("inconsistent price levels: {0}")]
    InconsistentLevels(String),
}

impl ValidationError {
    /// Field the failure refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingField(field) => field,
            Self::UnsupportedValue { field, .. } | Self::OutOfRange { field, .. } => field,
            Self::MalformedPair(_) | Self::AmbiguousPair(_) => "pair",
            Self::EmptyTargets => "targets",
            Self::InconsistentLevels(_) => "levels",
        }
    }
}
