//! UI-facing notifications emitted by a scan session.

use chscan_protocol::{ScanMode, SortMode};

use crate::channel::ChannelEntity;
use crate::store::CommitSummary;

/// Notification kinds passed to [`EventSink::on_event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SinkEventType {
    ScanBegin,
    DisplayNumber,
    Progress,
    StoreBegin,
    StoreEnd,
    ScanEnd,
    ScanExit,
}

/// Payload attached to a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventPayload {
    None,
    Mode {
        mode: ScanMode,
        sort: SortMode,
    },
    DisplayNumber(u32),
    Progress {
        percent: u8,
        frequency: u32,
        channel_count: u32,
        locked: bool,
    },
    /// Final commit succeeded.
    Stored(CommitSummary),
    /// Final commit failed; the message describes the failure.
    StoreFailed(String),
}

/// Consumer of session notifications.
///
/// Calls arrive in the same order as the scanner events that caused them.
pub trait EventSink {
    fn on_event(&mut self, event: SinkEventType, payload: EventPayload);

    /// A channel found by a manual analog scan; when `should_store` is set
    /// the consumer is responsible for persisting it.
    fn on_update_current(&mut self, channel: &ChannelEntity, should_store: bool);

    fn on_numbering_mode_changed(&mut self, mode: SortMode);

    fn on_scan_end(&mut self);

    fn on_scan_exit(&mut self);
}

/// One recorded sink call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    Event(SinkEventType, EventPayload),
    UpdateCurrent {
        channel: ChannelEntity,
        should_store: bool,
    },
    NumberingModeChanged(SortMode),
    ScanEnd,
    ScanExit,
}

/// Records every call, in order.
impl EventSink for Vec<SinkEvent> {
    fn on_event(&mut self, event: SinkEventType, payload: EventPayload) {
        self.push(SinkEvent::Event(event, payload));
    }

    fn on_update_current(&mut self, channel: &ChannelEntity, should_store: bool) {
        self.push(SinkEvent::UpdateCurrent {
            channel: channel.clone(),
            should_store,
        });
    }

    fn on_numbering_mode_changed(&mut self, mode: SortMode) {
        self.push(SinkEvent::NumberingModeChanged(mode));
    }

    fn on_scan_end(&mut self) {
        self.push(SinkEvent::ScanEnd);
    }

    fn on_scan_exit(&mut self) {
        self.push(SinkEvent::ScanExit);
    }
}

/// Discards every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn on_event(&mut self, _event: SinkEventType, _payload: EventPayload) {}

    fn on_update_current(&mut self, _channel: &ChannelEntity, _should_store: bool) {}

    fn on_numbering_mode_changed(&mut self, _mode: SortMode) {}

    fn on_scan_end(&mut self) {}

    fn on_scan_exit(&mut self) {}
}
