//! Scanner event definitions for the chscan channel-scan engine.
//!
//! This crate defines the values that cross the boundary between the
//! tuner/demodulator and the scan session: the event stream itself, the LCN
//! records, and the scan/sort modes.
//!
//! # Event Stream
//!
//! ```text
//! SCAN_BEGIN
//!   LCN_INFO_DATA*  DTV_PROG_DATA* / ATV_PROG_DATA*  SCAN_PROGRESS*
//!   [STORE_BEGIN  ...  STORE_END]
//! SCAN_END
//! SCAN_EXIT
//! ```
//!
//! # Example
//!
//! ```rust
//! use chscan_protocol::{decode_event, encode_event, EventType, ScannerEvent};
//!
//! let event = decode_event(r#"{"type":"STORE_BEGIN"}"#).unwrap();
//! assert_eq!(event.event_type(), EventType::StoreBegin);
//!
//! let line = encode_event(&ScannerEvent::ScanExit).unwrap();
//! assert_eq!(line, r#"{"type":"SCAN_EXIT"}"#);
//! ```

pub mod codec;
pub mod error;
pub mod types;

pub use codec::{decode_event, encode_event};
pub use error::ProtocolError;
pub use types::{
    AtvProgramData, ChannelKind, DtvProgramData, EventType, LcnInfoData, LcnSlot, ScanBegin,
    ScanMethod, ScanMode, ScanProgress, ScannerEvent, ScannerLcnInfo, ServiceKind, ServiceTriple,
    SortMode,
};
