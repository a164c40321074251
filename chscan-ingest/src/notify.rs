//! Session notifications forwarded to a consumer task.

use chscan::{ChannelEntity, EventPayload, EventSink, SinkEvent, SinkEventType};
use chscan_protocol::SortMode;
use log::{debug, info, trace, warn};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// [`EventSink`] that sends every notification over a tokio channel.
///
/// Channels handed over by manual analog scans are also queued locally so
/// the ingest loop can persist them through the session's gateway.
#[derive(Debug)]
pub struct NotificationSender {
    tx: mpsc::UnboundedSender<SinkEvent>,
    to_store: Vec<ChannelEntity>,
}

impl NotificationSender {
    pub fn new(tx: mpsc::UnboundedSender<SinkEvent>) -> Self {
        Self {
            tx,
            to_store: Vec::new(),
        }
    }

    /// Take the channels waiting to be stored.
    pub fn take_channels_to_store(&mut self) -> Vec<ChannelEntity> {
        std::mem::take(&mut self.to_store)
    }

    fn send(&self, event: SinkEvent) {
        if self.tx.send(event).is_err() {
            trace!("Notification consumer is gone; dropping notification");
        }
    }
}

impl EventSink for NotificationSender {
    fn on_event(&mut self, event: SinkEventType, payload: EventPayload) {
        self.send(SinkEvent::Event(event, payload));
    }

    fn on_update_current(&mut self, channel: &ChannelEntity, should_store: bool) {
        if should_store {
            self.to_store.push(channel.clone());
        }
        self.send(SinkEvent::UpdateCurrent {
            channel: channel.clone(),
            should_store,
        });
    }

    fn on_numbering_mode_changed(&mut self, mode: SortMode) {
        self.send(SinkEvent::NumberingModeChanged(mode));
    }

    fn on_scan_end(&mut self) {
        self.send(SinkEvent::ScanEnd);
    }

    fn on_scan_exit(&mut self) {
        self.send(SinkEvent::ScanExit);
    }
}

/// Create a sender and spawn the task that logs what it receives.
///
/// The task ends once the sender is dropped and returns the number of
/// notifications it saw.
pub fn spawn_logger() -> (NotificationSender, JoinHandle<usize>) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(async move {
        let mut count = 0;
        while let Some(event) = rx.recv().await {
            count += 1;
            log_notification(&event);
        }
        count
    });
    (NotificationSender::new(tx), handle)
}

fn log_notification(event: &SinkEvent) {
    match event {
        SinkEvent::Event(SinkEventType::Progress, EventPayload::Progress { percent, frequency, channel_count, locked }) => {
            debug!(
                "Progress {}% at {} kHz: {} channels, locked={}",
                percent, frequency, channel_count, locked
            );
        }
        SinkEvent::Event(SinkEventType::StoreEnd, EventPayload::Stored(summary)) => {
            info!("Store finished: {}", summary);
        }
        SinkEvent::Event(SinkEventType::StoreEnd, EventPayload::StoreFailed(message)) => {
            warn!("Store failed: {}", message);
        }
        SinkEvent::Event(event, EventPayload::Mode { mode, sort }) => {
            info!("{:?}: {} scan, numbering by {}", event, mode, sort.as_str());
        }
        SinkEvent::Event(event, payload) => {
            debug!("{:?}: {:?}", event, payload);
        }
        SinkEvent::UpdateCurrent { channel, should_store } => {
            info!("Current channel: {} (store={})", channel.label(), should_store);
        }
        SinkEvent::NumberingModeChanged(mode) => {
            debug!("Numbering mode: {}", mode.as_str());
        }
        SinkEvent::ScanEnd => info!("Scan ended"),
        SinkEvent::ScanExit => info!("Scan exited"),
    }
}
