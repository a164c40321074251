//! Error types for the scanner event protocol.

use thiserror::Error;

use crate::types::EventType;

/// Errors raised while decoding or encoding scanner events.
///
/// None of these are fatal to a scan: a session that receives a malformed
/// event drops it and carries on with the next one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Event type discriminant is unknown.
    #[error("Unknown event type: {0}")]
    UnknownEventType(String),

    /// Event type requires a payload but none was present.
    #[error("Event {0} requires a payload")]
    MissingPayload(EventType),

    /// Payload present but missing required fields or holding bad values.
    #[error("Invalid {event} payload: {reason}")]
    InvalidPayload { event: EventType, reason: String },

    /// Input is not a well-formed event frame at all.
    #[error("Failed to decode event: {0}")]
    DecodeError(String),

    /// Event could not be serialized.
    #[error("Failed to encode event: {0}")]
    EncodeError(String),
}

impl ProtocolError {
    /// Returns true if the frame was recognised but its payload was unusable.
    pub fn is_payload_error(&self) -> bool {
        matches!(
            self,
            ProtocolError::MissingPayload(_) | ProtocolError::InvalidPayload { .. }
        )
    }
}
