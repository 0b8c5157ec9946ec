//! Simulated hub error types.

use wiserlink_domain::error::{CommunicationError, InvalidArgumentError, NotFoundError, WiserError};
use wiserlink_domain::id::DeviceId;

/// Errors specific to the simulated hub.
#[derive(Debug, thiserror::Error)]
pub enum MemoryHubError {
    /// The hub was taken offline; nothing reaches it.
    #[error("hub is offline")]
    Offline { operation: &'static str },

    /// No shutter or light with this id exists on the hub.
    #[error("device {0} is not on the hub")]
    UnknownDevice(DeviceId),

    /// A lift outside `0..=100` was requested.
    #[error("lift {0} is outside 0..=100")]
    LiftOutOfRange(u8),

    /// An output percentage outside `0..=100` was requested.
    #[error("output {0}% is outside 0..=100")]
    PercentageOutOfRange(u8),
}

impl MemoryHubError {
    /// Convert into a [`WiserError`] for propagation across port boundaries.
    #[must_use]
    pub fn into_domain(self) -> WiserError {
        match self {
            Self::UnknownDevice(id) => NotFoundError {
                kind: "Device",
                id: id.to_string(),
            }
            .into(),
            Self::LiftOutOfRange(lift) => InvalidArgumentError::PositionOutOfRange(lift).into(),
            Self::PercentageOutOfRange(percentage) => {
                InvalidArgumentError::PercentageOutOfRange(percentage).into()
            }
            Self::Offline { operation } => {
                CommunicationError::new(operation, Self::Offline { operation }).into()
            }
        }
    }
}

impl From<MemoryHubError> for WiserError {
    fn from(err: MemoryHubError) -> Self {
        err.into_domain()
    }
}
