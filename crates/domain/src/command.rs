//! Commands: normalized requests a consumer can send to an entity.

use serde_json::Value;

use crate::error::InvalidArgumentError;

/// A normalized command addressed to one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Open,
    Close,
    Stop,
    SetPosition(u8),
    TurnOn { brightness: Option<u16> },
    TurnOff,
}

impl Command {
    /// Host service name of the command.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Open => "open_cover",
            Self::Close => "close_cover",
            Self::Stop => "stop_cover",
            Self::SetPosition(_) => "set_cover_position",
            Self::TurnOn { .. } => "turn_on",
            Self::TurnOff => "turn_off",
        }
    }

    /// Parse a host service call. Range checks happen when the command runs.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgumentError::UnsupportedService`] for an unknown
    /// service name, or [`InvalidArgumentError::MalformedPayload`] when a
    /// required field is missing or not an integer.
    pub fn from_service_call(
        unique_id: &str,
        service: &str,
        data: &Value,
    ) -> Result<Self, InvalidArgumentError> {
        match service {
            "open_cover" => Ok(Self::Open),
            "close_cover" => Ok(Self::Close),
            "stop_cover" => Ok(Self::Stop),
            "set_cover_position" => {
                let position = data
                    .get("position")
                    .and_then(Value::as_u64)
                    .and_then(|p| u8::try_from(p).ok())
                    .ok_or(InvalidArgumentError::MalformedPayload { field: "position" })?;
                Ok(Self::SetPosition(position))
            }
            "turn_on" => {
                let brightness = match data.get("brightness") {
                    None | Some(Value::Null) => None,
                    Some(value) => Some(
                        value
                            .as_u64()
                            .and_then(|b| u16::try_from(b).ok())
                            .ok_or(InvalidArgumentError::MalformedPayload {
                                field: "brightness",
                            })?,
                    ),
                };
                Ok(Self::TurnOn { brightness })
            }
            "turn_off" => Ok(Self::TurnOff),
            other => Err(InvalidArgumentError::UnsupportedService {
                unique_id: unique_id.to_string(),
                service: other.to_string(),
            }),
        }
    }
}

/// Accept a shutter position in `0..=100`.
///
/// # Errors
///
/// Returns [`InvalidArgumentError::PositionOutOfRange`] above 100.
pub fn validate_position(position: u8) -> Result<u8, InvalidArgumentError> {
    if position > 100 {
        return Err(InvalidArgumentError::PositionOutOfRange(position));
    }
    Ok(position)
}

/// Accept a host brightness in `0..=255`.
///
/// # Errors
///
/// Returns [`InvalidArgumentError::BrightnessOutOfRange`] above 255.
pub fn validate_brightness(brightness: u16) -> Result<u8, InvalidArgumentError> {
    u8::try_from(brightness).map_err(|_| InvalidArgumentError::BrightnessOutOfRange(brightness))
}
