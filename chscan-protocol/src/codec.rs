//! Codec for encoding and decoding scanner events.
//!
//! Events travel as one JSON object per line:
//! ```text
//! {"type":"DTV_PROG_DATA","payload":{ ... payload fields ... }}
//! {"type":"STORE_END"}
//! ```
//! Marker events (STORE_BEGIN, STORE_END, SCAN_END, SCAN_EXIT) carry no
//! payload; a payload sent with a marker is ignored.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProtocolError;
use crate::types::*;

/// Undecoded event frame.
#[derive(Debug, Deserialize, Serialize)]
struct RawFrame {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    payload: Option<Value>,
}

/// Decode one event from a JSON line.
pub fn decode_event(line: &str) -> Result<ScannerEvent, ProtocolError> {
    let frame: RawFrame =
        serde_json::from_str(line.trim()).map_err(|e| ProtocolError::DecodeError(e.to_string()))?;

    let event_type = EventType::from_name(&frame.event_type)
        .ok_or_else(|| ProtocolError::UnknownEventType(frame.event_type.clone()))?;

    let event = match event_type {
        EventType::ScanBegin => ScannerEvent::ScanBegin(decode_payload(event_type, frame.payload)?),
        EventType::LcnInfoData => ScannerEvent::LcnInfo(decode_payload(event_type, frame.payload)?),
        EventType::DtvProgData => {
            ScannerEvent::DtvProgram(decode_payload(event_type, frame.payload)?)
        }
        EventType::AtvProgData => {
            ScannerEvent::AtvProgram(decode_payload(event_type, frame.payload)?)
        }
        EventType::ScanProgress => {
            let progress: ScanProgress = decode_payload(event_type, frame.payload)?;
            if progress.percent > 100 {
                return Err(ProtocolError::InvalidPayload {
                    event: event_type,
                    reason: format!("percent out of range: {}", progress.percent),
                });
            }
            ScannerEvent::Progress(progress)
        }
        EventType::StoreBegin => ScannerEvent::StoreBegin,
        EventType::StoreEnd => ScannerEvent::StoreEnd,
        EventType::ScanEnd => ScannerEvent::ScanEnd,
        EventType::ScanExit => ScannerEvent::ScanExit,
    };

    Ok(event)
}

/// Encode one event as a single JSON line (without the trailing newline).
pub fn encode_event(event: &ScannerEvent) -> Result<String, ProtocolError> {
    let payload = match event {
        ScannerEvent::ScanBegin(p) => Some(to_value(p)?),
        ScannerEvent::LcnInfo(p) => Some(to_value(p)?),
        ScannerEvent::DtvProgram(p) => Some(to_value(p)?),
        ScannerEvent::AtvProgram(p) => Some(to_value(p)?),
        ScannerEvent::Progress(p) => Some(to_value(p)?),
        ScannerEvent::StoreBegin
        | ScannerEvent::StoreEnd
        | ScannerEvent::ScanEnd
        | ScannerEvent::ScanExit => None,
    };

    let frame = RawFrame {
        event_type: event.event_type().as_str().to_string(),
        payload,
    };
    serde_json::to_string(&frame).map_err(|e| ProtocolError::EncodeError(e.to_string()))
}

fn decode_payload<T: DeserializeOwned>(
    event: EventType,
    payload: Option<Value>,
) -> Result<T, ProtocolError> {
    let payload = match payload {
        Some(Value::Null) | None => return Err(ProtocolError::MissingPayload(event)),
        Some(v) => v,
    };
    serde_json::from_value(payload).map_err(|e| ProtocolError::InvalidPayload {
        event,
        reason: e.to_string(),
    })
}

fn to_value<T: Serialize>(payload: &T) -> Result<Value, ProtocolError> {
    serde_json::to_value(payload).map_err(|e| ProtocolError::EncodeError(e.to_string()))
}
