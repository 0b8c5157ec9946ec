//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`WiserError`]
//! via `From` at port boundaries.

/// Workspace-wide error.
#[derive(Debug, thiserror::Error)]
pub enum WiserError {
    /// The device (or room) is no longer part of the hub's object graph.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// A command argument was rejected before reaching the hub.
    #[error("invalid argument")]
    InvalidArgument(#[from] InvalidArgumentError),

    /// The hub client failed while reading or writing.
    #[error("hub communication failed")]
    Communication(#[from] CommunicationError),
}

impl WiserError {
    /// Whether this error only means the device went away.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// A lookup by id missed.
#[derive(Debug, thiserror::Error)]
#[error("{kind} {id} not found")]
pub struct NotFoundError {
    /// What was looked up (`"Shutter"`, `"Light"`, `"Entity"`, …).
    pub kind: &'static str,
    /// The identifier that missed.
    pub id: String,
}

/// Arguments rejected before any hub call is issued.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InvalidArgumentError {
    #[error("position {0} is outside 0..=100")]
    PositionOutOfRange(u8),

    #[error("output {0}% is outside 0..=100")]
    PercentageOutOfRange(u8),

    #[error("brightness {0} is outside 0..=255")]
    BrightnessOutOfRange(u16),

    #[error("service {service} is not supported by {unique_id}")]
    UnsupportedService { unique_id: String, service: String },

    #[error("service payload field {field} is missing or malformed")]
    MalformedPayload { field: &'static str },
}

/// A hub client call that did not complete.
#[derive(Debug, thiserror::Error)]
#[error("hub call {operation} failed")]
pub struct CommunicationError {
    /// Name of the hub operation (`"open_shutter"`, `"refresh"`, …).
    pub operation: &'static str,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

impl CommunicationError {
    /// Wrap a foreign error raised by `operation`.
    pub fn new(
        operation: &'static str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            operation,
            source: source.into(),
        }
    }
}
