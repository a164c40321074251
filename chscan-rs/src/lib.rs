//! chscan library - channel scan ingestion and numbering
//!
//! This library turns the event stream of a channel scan into a persisted
//! channel list with stable, conflict-free display numbers and logical
//! channel numbers.
//!
//! ```
//! use chscan::{MemoryGateway, ScanConfig, ScanSession, SinkEvent};
//! use chscan_protocol::{decode_event, ScannerEvent};
//!
//! let mut session = ScanSession::new(ScanConfig::default(), MemoryGateway::new(), Vec::<SinkEvent>::new());
//! let begin = decode_event(
//!     r#"{"type":"SCAN_BEGIN","payload":{"mode":{"kind":"digital","method":"auto"},"sort":"number"}}"#,
//! ).unwrap();
//! session.handle(&begin).unwrap();
//! session.handle(&ScannerEvent::ScanExit).unwrap();
//! assert!(session.batch().is_empty());
//! ```

pub mod assign;
pub mod channel;
pub mod config;
#[cfg(feature = "database")]
pub mod database;
pub mod error;
pub mod gateway;
pub mod session;
pub mod sink;
pub mod store;
pub mod text;

// Re-export commonly used types
pub use assign::{Assignment, LcnAssigner, NumberAssigner};
pub use channel::{ChannelContext, ChannelEntity};
pub use config::ScanConfig;
#[cfg(feature = "database")]
pub use database::{Database, DatabaseError};
pub use error::{CommitError, GatewayError, SessionError};
pub use gateway::{ChannelQuery, MemoryGateway, PersistenceGateway, ServiceFilter};
pub use session::{ScanSession, SessionState};
pub use sink::{EventPayload, EventSink, NullSink, SinkEvent, SinkEventType};
pub use store::{CommitPlan, CommitRecord, CommitSummary, StoreCommitter, StoreMode};
pub use text::{decode_name, MultilingualName, NameError};
