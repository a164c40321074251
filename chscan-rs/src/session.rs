//! Scan session: the scanner event state machine.

use chscan_protocol::{
    AtvProgramData, ChannelKind, DtvProgramData, ScanMode, ScanProgress, ScannerEvent,
    ScannerLcnInfo, SortMode,
};
use log::{debug, info, trace, warn};

use crate::channel::ChannelEntity;
use crate::config::ScanConfig;
use crate::error::{CommitError, Result, SessionError};
use crate::gateway::{ChannelQuery, PersistenceGateway};
use crate::sink::{EventPayload, EventSink, SinkEventType};
use crate::store::{
    AllocationCursors, CommitInput, CommitPlan, CommitRecord, CommitSummary, StoreCommitter,
    StoreMode,
};

/// Coarse position of a session in the scan lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Idle,
    Scanning,
    CollectingLcn,
    CollectingPrograms,
    Storing,
}

/// All mutable state of one channel scan.
///
/// Events are handled one at a time, to completion, in arrival order. The
/// sink sees notifications in that same order.
pub struct ScanSession<G, S> {
    config: ScanConfig,
    committer: StoreCommitter,
    gateway: G,
    sink: S,

    state: SessionState,
    modes: Option<(ScanMode, SortMode)>,

    old_channels: Vec<ChannelEntity>,
    old_taken: bool,
    new_channels: Vec<ChannelEntity>,
    lcn_records: Vec<ScannerLcnInfo>,

    realtime_number: u32,
    final_number: u32,
    cursors: AllocationCursors,

    realtime_store: bool,
    final_store: bool,

    /// Plan whose execution failed part way.
    pending: Option<CommitPlan>,
    last_commit: Option<CommitRecord>,
}

impl<G: PersistenceGateway, S: EventSink> ScanSession<G, S> {
    pub fn new(config: ScanConfig, gateway: G, sink: S) -> Self {
        let initial = config.initial_display_number;
        Self {
            committer: StoreCommitter::new(&config),
            cursors: AllocationCursors::new(&config),
            config,
            gateway,
            sink,
            state: SessionState::Idle,
            modes: None,
            old_channels: Vec::new(),
            old_taken: false,
            new_channels: Vec::new(),
            lcn_records: Vec::new(),
            realtime_number: initial,
            final_number: initial,
            realtime_store: false,
            final_store: false,
            pending: None,
            last_commit: None,
        }
    }

    /// Handle one scanner event.
    ///
    /// Errors come from persistence only; the event itself is always
    /// applied to the session.
    pub fn handle(&mut self, event: &ScannerEvent) -> Result<()> {
        trace!("Scan event {} in state {:?}", event.event_type(), self.state);

        match event {
            ScannerEvent::ScanBegin(begin) => {
                self.begin(begin.mode, begin.sort);
                Ok(())
            }
            ScannerEvent::LcnInfo(data) => {
                self.ensure_begun(data.mode, data.sort);
                self.lcn_records.push(data.lcn.clone());
                self.enter(SessionState::CollectingLcn);
                Ok(())
            }
            ScannerEvent::DtvProgram(data) => self.on_dtv_program(data),
            ScannerEvent::AtvProgram(data) => self.on_atv_program(data),
            ScannerEvent::Progress(progress) => self.on_progress(progress),
            ScannerEvent::StoreBegin => {
                self.final_store = true;
                self.final_number = self.config.initial_display_number;
                self.lcn_records.clear();
                self.state = SessionState::Storing;
                self.sink.on_event(SinkEventType::StoreBegin, EventPayload::None);
                Ok(())
            }
            ScannerEvent::StoreEnd => self.on_store_end(),
            ScannerEvent::ScanEnd => {
                self.sink.on_scan_end();
                self.sink.on_event(SinkEventType::ScanEnd, EventPayload::None);
                self.state = SessionState::Idle;
                Ok(())
            }
            ScannerEvent::ScanExit => {
                self.reset();
                self.sink.on_scan_exit();
                self.sink.on_event(SinkEventType::ScanExit, EventPayload::None);
                Ok(())
            }
        }
    }

    /// Resume a commit plan whose execution failed.
    ///
    /// Returns `Ok(None)` when nothing is pending.
    pub fn retry_pending(&mut self) -> std::result::Result<Option<CommitSummary>, CommitError> {
        let Some(plan) = self.pending.as_mut() else {
            return Ok(None);
        };
        info!("Retrying {} pending commit operations", plan.remaining());
        let summary = plan.execute(&mut self.gateway)?;
        self.pending = None;
        Ok(Some(summary))
    }

    /// Drop every counter, accumulator and pending plan.
    pub fn reset(&mut self) {
        let initial = self.config.initial_display_number;
        self.state = SessionState::Idle;
        self.modes = None;
        self.old_channels.clear();
        self.old_taken = false;
        self.new_channels.clear();
        self.lcn_records.clear();
        self.realtime_number = initial;
        self.final_number = initial;
        self.cursors = AllocationCursors::new(&self.config);
        self.realtime_store = false;
        self.final_store = false;
        if let Some(plan) = self.pending.take() {
            warn!("Discarding {} unflushed commit operations", plan.remaining());
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Scan and sort mode of the current scan.
    pub fn modes(&self) -> Option<(ScanMode, SortMode)> {
        self.modes
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Channels collected and not yet committed.
    pub fn batch(&self) -> &[ChannelEntity] {
        &self.new_channels
    }

    /// Whether the session is in the final store stage.
    pub fn is_storing(&self) -> bool {
        self.final_store
    }

    /// Whether channels have been collected for incremental storing.
    pub fn is_realtime_storing(&self) -> bool {
        self.realtime_store
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the record of the latest commit attempt.
    pub fn take_last_commit(&mut self) -> Option<CommitRecord> {
        self.last_commit.take()
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_parts(self) -> (G, S) {
        (self.gateway, self.sink)
    }

    fn begin(&mut self, mode: ScanMode, sort: SortMode) {
        info!("Scan begin: {} scan, sorted by {}", mode, sort.as_str());
        let initial = self.config.initial_display_number;
        self.modes = Some((mode, sort));
        self.realtime_number = initial;
        self.final_number = initial;
        self.cursors = AllocationCursors::new(&self.config);
        self.final_store = false;
        self.state = SessionState::Scanning;
        self.sink.on_numbering_mode_changed(sort);
        self.sink
            .on_event(SinkEventType::ScanBegin, EventPayload::Mode { mode, sort });
    }

    /// Start the session from an event's embedded modes if SCAN_BEGIN was
    /// never seen.
    fn ensure_begun(&mut self, mode: ScanMode, sort: SortMode) {
        if self.modes.is_none() {
            info!("No scan begin received; starting from event modes");
            self.begin(mode, sort);
        }
    }

    fn enter(&mut self, state: SessionState) {
        if self.state != SessionState::Storing {
            self.state = state;
        }
    }

    fn on_dtv_program(&mut self, data: &DtvProgramData) -> Result<()> {
        self.ensure_begun(data.mode, data.sort);
        if !self.final_store {
            self.realtime_store = true;
        }

        let snapshot = if data.mode.is_manual() {
            self.take_snapshot(ChannelQuery::kind(ChannelKind::Digital).on_frequency(data.frequency))
        } else {
            Ok(())
        };

        let number = self.current_number();
        let channel = ChannelEntity::from_dtv(data, &self.config.channel_context(number));
        debug!("Found {}", channel.label());
        self.new_channels.push(channel);
        self.after_program(number);
        snapshot
    }

    fn on_atv_program(&mut self, data: &AtvProgramData) -> Result<()> {
        self.ensure_begun(data.mode, data.sort);
        if !self.final_store {
            self.realtime_store = true;
        }

        let query = ChannelQuery::kind(ChannelKind::Analog);
        let query = if data.mode.is_manual() {
            query.on_frequency(data.frequency)
        } else {
            query
        };
        let snapshot = self.take_snapshot(query);

        let number = self.current_number();
        let channel = ChannelEntity::from_atv(data, &self.config.channel_context(number));
        debug!("Found {}", channel.label());
        if data.mode.is_manual() {
            self.sink.on_update_current(&channel, true);
        } else {
            self.new_channels.push(channel);
        }
        self.after_program(number);
        snapshot
    }

    fn after_program(&mut self, number: u32) {
        self.advance_number();
        if self.final_store {
            self.sink
                .on_event(SinkEventType::DisplayNumber, EventPayload::DisplayNumber(number));
        }
        self.enter(SessionState::CollectingPrograms);
    }

    fn on_progress(&mut self, progress: &ScanProgress) -> Result<()> {
        self.ensure_begun(progress.mode, progress.sort);

        let mut result = Ok(());
        if !self.final_store && progress.mode.is_digital() && !progress.mode.is_manual() {
            if !self.new_channels.is_empty() || self.pending.is_some() {
                result = self.commit(StoreMode::Realtime).map(|_| ());
            }
            self.realtime_number = self.config.initial_display_number;
        }

        if progress.mode.is_analog() && progress.locked {
            let number = self.current_number();
            self.sink
                .on_event(SinkEventType::DisplayNumber, EventPayload::DisplayNumber(number));
            self.advance_number();
        }

        self.sink.on_event(
            SinkEventType::Progress,
            EventPayload::Progress {
                percent: progress.percent,
                frequency: progress.frequency,
                channel_count: progress.channel_count,
                locked: progress.locked,
            },
        );
        result.map_err(SessionError::from)
    }

    fn on_store_end(&mut self) -> Result<()> {
        let result = self.commit(StoreMode::Final);
        let payload = match &result {
            Ok(summary) => {
                info!("Channel list stored: {}", summary);
                EventPayload::Stored(*summary)
            }
            Err(e) => {
                warn!("Channel list store failed: {}", e);
                EventPayload::StoreFailed(e.to_string())
            }
        };
        self.state = SessionState::Scanning;
        self.sink.on_event(SinkEventType::StoreEnd, payload);
        result.map(|_| ()).map_err(SessionError::from)
    }

    /// Flush any unflushed plan, then plan and execute the batch.
    fn commit(&mut self, store: StoreMode) -> std::result::Result<CommitSummary, CommitError> {
        let Some((mode, sort)) = self.modes else {
            debug!("Store requested before any scan began; nothing to commit");
            return Ok(CommitSummary::default());
        };

        let channel_count = self.new_channels.len();
        let result = self.flush_and_commit(store, mode, sort);
        self.last_commit = Some(CommitRecord {
            store,
            mode,
            sort,
            channel_count,
            outcome: result.as_ref().copied().map_err(|e| e.to_string()),
        });
        result
    }

    fn flush_and_commit(
        &mut self,
        store: StoreMode,
        mode: ScanMode,
        sort: SortMode,
    ) -> std::result::Result<CommitSummary, CommitError> {
        self.retry_pending()?;

        if store == StoreMode::Realtime && self.new_channels.is_empty() {
            return Ok(CommitSummary::default());
        }

        let input = CommitInput {
            store,
            mode,
            sort,
            input_id: &self.config.input_id,
            batch: &self.new_channels,
            lcn_records: &self.lcn_records,
            old: &self.old_channels,
        };
        let mut plan = self
            .committer
            .plan(&self.gateway, input, &mut self.cursors)?;

        self.new_channels.clear();
        self.lcn_records.clear();
        self.old_channels.clear();
        self.old_taken = false;
        self.cursors = AllocationCursors::new(&self.config);

        match plan.execute(&mut self.gateway) {
            Ok(summary) => Ok(summary),
            Err(e) => {
                self.pending = Some(plan);
                Err(e)
            }
        }
    }

    /// Capture the stored channels a manual scan may prune, once per session.
    fn take_snapshot(&mut self, query: ChannelQuery) -> Result<()> {
        if self.old_taken {
            return Ok(());
        }
        match self.gateway.query_channels(&self.config.input_id, &query) {
            Ok(channels) => {
                debug!("Captured {} stored channels before scanning", channels.len());
                self.old_channels = channels;
                self.old_taken = true;
                Ok(())
            }
            Err(e) => {
                warn!("Failed to read stored channels: {}", e);
                Err(SessionError::Snapshot(e))
            }
        }
    }

    fn current_number(&self) -> u32 {
        if self.final_store {
            self.final_number
        } else {
            self.realtime_number
        }
    }

    fn advance_number(&mut self) {
        if self.final_store {
            self.final_number += 1;
        } else {
            self.realtime_number += 1;
        }
    }
}

impl<G, S> std::fmt::Debug for ScanSession<G, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanSession")
            .field("input_id", &self.config.input_id)
            .field("state", &self.state)
            .field("modes", &self.modes)
            .field("batch", &self.new_channels.len())
            .field("pending", &self.pending.as_ref().map(|p| p.remaining()))
            .finish()
    }
}
