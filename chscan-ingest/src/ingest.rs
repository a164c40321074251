//! Event stream ingestion: one JSON line per scanner event.

use chscan::database::NewScanHistory;
use chscan::{Database, DatabaseError, PersistenceGateway, ScanSession};
use chscan_protocol::{decode_event, EventType};
use futures::StreamExt;
use log::{debug, info, warn};
use thiserror::Error;
use tokio::io::AsyncRead;
use tokio_util::codec::{FramedRead, LinesCodec, LinesCodecError};

use crate::notify::NotificationSender;

/// Longest accepted event line.
const MAX_LINE_LENGTH: usize = 1024 * 1024;

pub type IngestSession = ScanSession<Database, NotificationSender>;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Failed to read event stream: {0}")]
    Read(#[from] LinesCodecError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

/// Counters for one ingest run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub lines: usize,
    pub events: usize,
    pub malformed: usize,
    pub failed: usize,
    pub retried: usize,
}

/// Feed every event of `reader` to the session, in order.
///
/// Malformed lines are skipped. Failed commits are recorded in the scan
/// history; a plan left unflushed by a failure is retried once at the next
/// STORE_END or SCAN_END.
pub async fn ingest<R>(reader: R, session: &mut IngestSession) -> Result<IngestStats, IngestError>
where
    R: AsyncRead + Unpin,
{
    let mut lines = FramedRead::new(reader, LinesCodec::new_with_max_length(MAX_LINE_LENGTH));
    let mut stats = IngestStats::default();

    while let Some(line) = lines.next().await {
        let line = line?;
        stats.lines += 1;
        if line.trim().is_empty() {
            continue;
        }

        let event = match decode_event(&line) {
            Ok(event) => event,
            Err(e) => {
                debug!("Skipping line {}: {}", stats.lines, e);
                stats.malformed += 1;
                continue;
            }
        };
        stats.events += 1;

        let event_type = event.event_type();
        let failed = match session.handle(&event) {
            Ok(()) => false,
            Err(e) => {
                warn!("{} failed: {}", event_type, e);
                stats.failed += 1;
                true
            }
        };

        store_current_channels(session);
        record_history(session)?;

        let boundary = matches!(event_type, EventType::StoreEnd | EventType::ScanEnd);
        if boundary && !failed && session.has_pending() {
            stats.retried += 1;
            match session.retry_pending() {
                Ok(Some(summary)) => info!("Pending commit completed: {}", summary),
                Ok(None) => {}
                Err(e) => warn!("Pending commit retry failed: {}", e),
            }
        }
    }

    info!(
        "Ingested {} events from {} lines ({} malformed, {} failed)",
        stats.events, stats.lines, stats.malformed, stats.failed
    );
    Ok(stats)
}

/// Persist channels a manual analog scan handed to the sink.
fn store_current_channels(session: &mut IngestSession) {
    for channel in session.sink_mut().take_channels_to_store() {
        match session.gateway_mut().update_or_insert(&channel) {
            Ok(()) => debug!("Stored current channel {}", channel.label()),
            Err(e) => warn!("Failed to store current channel {}: {}", channel.label(), e),
        }
    }
}

fn record_history(session: &mut IngestSession) -> Result<(), DatabaseError> {
    if let Some(record) = session.take_last_commit() {
        let entry = NewScanHistory::from_commit(session.config().input_id.clone(), &record);
        session.gateway().record_scan_history(&entry)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chscan::{ScanConfig, ServiceFilter};
    use tokio::sync::mpsc;

    const DTV: &str = r#"{"type":"DTV_PROG_DATA","payload":{"mode":{"kind":"digital","method":"auto"},"sort":"number","frequency":474000,"original_network_id":1,"transport_stream_id":1,"service_id":SID,"service_type":1,"raw_name":"eng=News"}}"#;

    fn session() -> (IngestSession, mpsc::UnboundedReceiver<chscan::SinkEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = ScanSession::new(
            ScanConfig::default(),
            Database::open_in_memory().unwrap(),
            NotificationSender::new(tx),
        );
        (session, rx)
    }

    fn dtv(sid: u16) -> String {
        DTV.replace("SID", &sid.to_string())
    }

    #[tokio::test]
    async fn test_ingest_stream() {
        let input = [
            r#"{"type":"SCAN_BEGIN","payload":{"mode":{"kind":"digital","method":"auto"},"sort":"number"}}"#.to_string(),
            r#"{"type":"STORE_BEGIN"}"#.to_string(),
            dtv(2),
            "not json".to_string(),
            String::new(),
            dtv(1),
            r#"{"type":"BOGUS"}"#.to_string(),
            r#"{"type":"STORE_END"}"#.to_string(),
            r#"{"type":"SCAN_END"}"#.to_string(),
        ]
        .join("\n");

        let (mut session, _rx) = session();
        let stats = ingest(input.as_bytes(), &mut session).await.unwrap();

        assert_eq!(stats.events, 6);
        assert_eq!(stats.malformed, 2);
        assert_eq!(stats.failed, 0);

        let db = session.gateway();
        let channels = db.list_channels("tuner0", ServiceFilter::All).unwrap();
        assert_eq!(channels.len(), 2);
        assert_eq!(channels[0].display_name, "News");

        let history = db.get_scan_history("tuner0", 10).unwrap();
        assert_eq!(history.len(), 1);
        assert!(history[0].success);
        assert_eq!(history[0].summary.inserted, 2);
    }

    #[tokio::test]
    async fn test_manual_analog_channels_stored() {
        let input = [
            r#"{"type":"SCAN_BEGIN","payload":{"mode":{"kind":"analog","method":"manual"},"sort":"number"}}"#,
            r#"{"type":"ATV_PROG_DATA","payload":{"mode":{"kind":"analog","method":"manual"},"sort":"number","frequency":175250,"video_std":1,"audio_std":2}}"#,
            r#"{"type":"SCAN_EXIT"}"#,
        ]
        .join("\n");

        let (mut session, _rx) = session();
        ingest(input.as_bytes(), &mut session).await.unwrap();

        let channels = session
            .gateway()
            .list_channels("tuner0", ServiceFilter::All)
            .unwrap();
        assert_eq!(channels.len(), 1);
        assert_eq!(channels[0].display_name, "ATV-1");
        assert_eq!(channels[0].frequency, 175_250);
    }
}
