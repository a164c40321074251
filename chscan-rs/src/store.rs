//! Batch commit: numbering the accumulated channels and writing them out.
//!
//! A commit is split in two steps. [`StoreCommitter::plan`] reads the stored
//! channels, runs the assigners and produces a [`CommitPlan`], an ordered
//! list of gateway operations. [`CommitPlan::execute`] then applies the
//! operations in order and stops at the first failure; calling it again
//! resumes from the operation that failed.

use std::fmt;

use chscan_protocol::{ScanMode, ScannerLcnInfo, SortMode};
use log::{debug, info, warn};

use crate::assign::{Known, LcnAssigner, NumberAssigner};
use crate::channel::ChannelEntity;
use crate::config::ScanConfig;
use crate::error::CommitError;
use crate::gateway::{PersistenceGateway, ServiceFilter};

/// How a batch is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreMode {
    /// Incremental store during an automatic scan; rows are upserted.
    Realtime,
    /// Store at STORE_END; manual scans also prune stale rows.
    Final,
}

impl StoreMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreMode::Realtime => "realtime",
            StoreMode::Final => "final",
        }
    }
}

impl fmt::Display for StoreMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counts of what a commit wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommitSummary {
    pub inserted: usize,
    pub updated: usize,
    pub upserted: usize,
    pub deleted: usize,
    /// Stored channels moved to their secondary LCN.
    pub swapped: usize,
}

impl CommitSummary {
    pub fn total(&self) -> usize {
        self.inserted + self.updated + self.upserted + self.deleted + self.swapped
    }
}

impl fmt::Display for CommitSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} inserted, {} updated, {} upserted, {} deleted, {} swapped",
            self.inserted, self.updated, self.upserted, self.deleted, self.swapped
        )
    }
}

/// One gateway operation of a commit plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOp {
    /// Move a stored channel outside the batch to its secondary LCN.
    Swap(ChannelEntity),
    /// Replace the stored row of a rediscovered service.
    Update(ChannelEntity),
    Insert(ChannelEntity),
    UpdateOrInsert(ChannelEntity),
    /// Remove stored channels a manual scan did not find again.
    Delete(Vec<ChannelEntity>),
}

impl CommitOp {
    fn apply<G: PersistenceGateway + ?Sized>(
        &self,
        gateway: &mut G,
        summary: &mut CommitSummary,
    ) -> Result<(), crate::error::GatewayError> {
        match self {
            CommitOp::Swap(ch) => {
                gateway.update(ch)?;
                summary.swapped += 1;
            }
            CommitOp::Update(ch) => {
                gateway.update(ch)?;
                summary.updated += 1;
            }
            CommitOp::Insert(ch) => {
                gateway.insert(ch, ch.display_number)?;
                summary.inserted += 1;
            }
            CommitOp::UpdateOrInsert(ch) => {
                gateway.update_or_insert(ch)?;
                summary.upserted += 1;
            }
            CommitOp::Delete(channels) => {
                summary.deleted += gateway.delete(channels)?;
            }
        }
        Ok(())
    }
}

/// Ordered gateway operations produced by one commit.
#[derive(Debug, Clone, Default)]
pub struct CommitPlan {
    ops: Vec<CommitOp>,
    next: usize,
    summary: CommitSummary,
}

impl CommitPlan {
    pub fn ops(&self) -> &[CommitOp] {
        &self.ops
    }

    /// Operations not yet applied.
    pub fn remaining(&self) -> usize {
        self.ops.len() - self.next
    }

    pub fn is_complete(&self) -> bool {
        self.next == self.ops.len()
    }

    /// Apply the remaining operations in order.
    ///
    /// On failure the failed operation stays first in line; the summary
    /// returned on success covers every attempt.
    pub fn execute<G: PersistenceGateway + ?Sized>(
        &mut self,
        gateway: &mut G,
    ) -> Result<CommitSummary, CommitError> {
        while let Some(op) = self.ops.get(self.next) {
            if let Err(source) = op.apply(gateway, &mut self.summary) {
                warn!(
                    "Commit stopped at operation {} of {}: {}",
                    self.next + 1,
                    self.ops.len(),
                    source
                );
                return Err(CommitError::Aborted {
                    completed: self.next,
                    total: self.ops.len(),
                    source,
                });
            }
            self.next += 1;
        }
        Ok(self.summary)
    }
}

/// Number and LCN allocation cursors used while planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationCursors {
    pub number: u32,
    pub lcn: u32,
}

impl AllocationCursors {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            number: config.initial_display_number,
            lcn: config.lcn_overflow_start,
        }
    }
}

/// Everything a commit reads from the session.
#[derive(Debug, Clone, Copy)]
pub struct CommitInput<'a> {
    pub store: StoreMode,
    pub mode: ScanMode,
    pub sort: SortMode,
    pub input_id: &'a str,
    pub batch: &'a [ChannelEntity],
    pub lcn_records: &'a [ScannerLcnInfo],
    /// Stored channels captured before the scan touched them.
    pub old: &'a [ChannelEntity],
}

/// Outcome of a commit, kept for scan history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub store: StoreMode,
    pub mode: ScanMode,
    pub sort: SortMode,
    pub channel_count: usize,
    pub outcome: Result<CommitSummary, String>,
}

/// Turns an accumulated batch into a commit plan.
#[derive(Debug, Clone, Copy)]
pub struct StoreCommitter {
    numbers: NumberAssigner,
}

impl StoreCommitter {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            numbers: NumberAssigner::new(config.initial_display_number),
        }
    }

    /// Sort and number the batch against the stored channels and lay out
    /// the writes.
    ///
    /// Nothing is written here. The only gateway call is the read of the
    /// stored channels; its failure leaves the batch untouched.
    pub fn plan<G: PersistenceGateway + ?Sized>(
        &self,
        gateway: &G,
        input: CommitInput<'_>,
        cursors: &mut AllocationCursors,
    ) -> Result<CommitPlan, CommitError> {
        let batch = sorted_batch(input.batch);
        let prune = input.store == StoreMode::Final && input.mode.is_manual();

        let persisted = gateway
            .list_channels(input.input_id, ServiceFilter::All)
            .map_err(CommitError::Snapshot)?;

        let is_deleted = |stored: &ChannelEntity| {
            (prune && input.old.iter().any(|o| o.same_service(stored)))
                || batch.iter().any(|b| b.same_service(stored))
        };
        let surviving = persisted.iter().filter(|&p| !is_deleted(p)).cloned().collect();
        let mut known = Known::new(surviving);

        let lcns = LcnAssigner::new(!input.mode.is_auto());
        for channel in &batch {
            let reclaimed = match input.sort {
                SortMode::Number => self.numbers.reclaims(channel, input.old),
                SortMode::Lcn => lcns.reclaims(channel, input.lcn_records, input.old),
            };
            if let Some(old) = reclaimed {
                known.reserve(old);
            }
        }

        for channel in &batch {
            let assignment = match input.sort {
                SortMode::Number => {
                    self.numbers
                        .assign(channel, &known, input.old, &mut cursors.number)
                }
                SortMode::Lcn => lcns.assign(
                    channel,
                    input.lcn_records,
                    &mut known,
                    input.old,
                    &mut cursors.lcn,
                ),
            };
            debug!(
                "Assigned {}: number {:?}, LCN {:?}",
                channel.label(),
                assignment.display_number,
                assignment.lcn
            );
            known.push_assigned(assignment.apply(channel));
        }

        let (assigned, swapped) = known.into_parts();
        let mut ops: Vec<CommitOp> = swapped.into_iter().map(CommitOp::Swap).collect();

        for mut channel in assigned {
            let op = match input.store {
                StoreMode::Realtime => CommitOp::UpdateOrInsert(channel),
                StoreMode::Final => match persisted.iter().find(|p| p.same_service(&channel)) {
                    Some(stored) => {
                        channel.inherit_from(stored);
                        CommitOp::Update(channel)
                    }
                    None => CommitOp::Insert(channel),
                },
            };
            ops.push(op);
        }

        if prune {
            let stale: Vec<ChannelEntity> = input
                .old
                .iter()
                .filter(|o| !batch.iter().any(|b| b.same_service(o)))
                .cloned()
                .collect();
            if !stale.is_empty() {
                info!("Removing {} channels not found by the manual scan", stale.len());
                ops.push(CommitOp::Delete(stale));
            }
        }

        info!(
            "{} commit ({}, {}): {} channels, {} operations",
            input.store,
            input.mode,
            input.sort.as_str(),
            batch.len(),
            ops.len()
        );

        Ok(CommitPlan {
            ops,
            next: 0,
            summary: CommitSummary::default(),
        })
    }
}

/// Batch in commit order, without repeated services.
fn sorted_batch(batch: &[ChannelEntity]) -> Vec<ChannelEntity> {
    let mut sorted: Vec<ChannelEntity> = Vec::with_capacity(batch.len());
    for channel in batch {
        if sorted.iter().any(|c| c.same_service(channel)) {
            debug!("Dropping repeated service {}", channel.label());
            continue;
        }
        sorted.push(channel.clone());
    }
    sorted.sort_by_key(|c| (c.frequency, c.service_id));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::tests::{ctx, dtv_data};
    use crate::gateway::MemoryGateway;
    use chscan_protocol::{ChannelKind, LcnSlot, ScanMethod, ServiceKind};

    fn dtv(sid: u16, frequency: u32) -> ChannelEntity {
        let mut ch = ChannelEntity::from_dtv(&dtv_data(1, 1, sid, frequency), &ctx(0));
        ch.display_number = None;
        ch
    }

    fn digital(method: ScanMethod) -> ScanMode {
        ScanMode::new(ChannelKind::Digital, method)
    }

    fn input<'a>(
        store: StoreMode,
        mode: ScanMode,
        sort: SortMode,
        batch: &'a [ChannelEntity],
        old: &'a [ChannelEntity],
    ) -> CommitInput<'a> {
        CommitInput {
            store,
            mode,
            sort,
            input_id: "tuner0",
            batch,
            lcn_records: &[],
            old,
        }
    }

    fn numbers(gw: &MemoryGateway) -> Vec<(u16, Option<u32>)> {
        let mut rows: Vec<_> = gw
            .channels()
            .iter()
            .map(|c| (c.service_id, c.display_number))
            .collect();
        rows.sort();
        rows
    }

    #[test]
    fn test_numbers_follow_service_order() {
        let config = ScanConfig::default();
        let mut gw = MemoryGateway::new();
        let batch = vec![dtv(3, 474_000), dtv(1, 474_000), dtv(2, 474_000)];
        let mut cursors = AllocationCursors::new(&config);

        let mut plan = StoreCommitter::new(&config)
            .plan(
                &gw,
                input(StoreMode::Final, digital(ScanMethod::Auto), SortMode::Number, &batch, &[]),
                &mut cursors,
            )
            .unwrap();
        let summary = plan.execute(&mut gw).unwrap();

        assert_eq!(summary.inserted, 3);
        assert_eq!(numbers(&gw), vec![(1, Some(1)), (2, Some(2)), (3, Some(3))]);
    }

    #[test]
    fn test_rediscovered_service_keeps_number() {
        let config = ScanConfig::default();
        let mut stored = dtv(9, 474_000);
        stored.display_number = Some(5);
        stored.favourite = true;
        let mut gw = MemoryGateway::with_channels([stored]);
        let old = gw.channels().to_vec();
        let batch = vec![dtv(9, 474_000), dtv(4, 474_000)];
        let mut cursors = AllocationCursors::new(&config);

        let mut plan = StoreCommitter::new(&config)
            .plan(
                &gw,
                input(StoreMode::Final, digital(ScanMethod::Manual), SortMode::Number, &batch, &old),
                &mut cursors,
            )
            .unwrap();
        let summary = plan.execute(&mut gw).unwrap();

        assert_eq!((summary.updated, summary.inserted), (1, 1));
        assert_eq!(numbers(&gw), vec![(4, Some(6)), (9, Some(5))]);
        let kept = gw.channels().iter().find(|c| c.service_id == 9).unwrap();
        assert!(kept.favourite);
        assert_eq!(kept.id, Some(1));
    }

    #[test]
    fn test_new_numbers_skip_stored_ones() {
        let config = ScanConfig::default();
        let mut stored = dtv(7, 482_000);
        stored.display_number = Some(4);
        let mut gw = MemoryGateway::with_channels([stored]);
        let batch = vec![dtv(1, 474_000)];
        let mut cursors = AllocationCursors::new(&config);

        let mut plan = StoreCommitter::new(&config)
            .plan(
                &gw,
                input(StoreMode::Realtime, digital(ScanMethod::Auto), SortMode::Number, &batch, &[]),
                &mut cursors,
            )
            .unwrap();
        assert_eq!(plan.execute(&mut gw).unwrap().upserted, 1);
        assert_eq!(numbers(&gw), vec![(1, Some(5)), (7, Some(4))]);
    }

    #[test]
    fn test_lcn_swap_moves_stored_holder() {
        let config = ScanConfig::default();
        let mut holder = dtv(7, 482_000);
        holder.lcn = Some(20);
        holder.lcn1 = Some(20);
        holder.lcn2 = Some(30);
        holder.display_number = Some(20);
        let mut gw = MemoryGateway::with_channels([holder]);
        let batch = vec![dtv(1, 474_000)];
        let records = vec![ScannerLcnInfo::new(
            1,
            1,
            1,
            [LcnSlot::new(10, true, true), LcnSlot::new(20, true, true)],
        )];
        let mut cursors = AllocationCursors::new(&config);

        let mut commit = input(StoreMode::Final, digital(ScanMethod::Manual), SortMode::Lcn, &batch, &[]);
        commit.lcn_records = &records;
        let mut plan = StoreCommitter::new(&config).plan(&gw, commit, &mut cursors).unwrap();
        assert!(matches!(plan.ops()[0], CommitOp::Swap(ref c) if c.service_id == 7));

        let summary = plan.execute(&mut gw).unwrap();
        assert_eq!((summary.swapped, summary.inserted), (1, 1));

        let lcn_of = |sid| gw.channels().iter().find(|c| c.service_id == sid).unwrap().lcn;
        assert_eq!(lcn_of(7), Some(30));
        assert_eq!(lcn_of(1), Some(10));
    }

    #[test]
    fn test_missing_lcn_uses_overflow() {
        let config = ScanConfig::default();
        let mut gw = MemoryGateway::new();
        let batch = vec![dtv(1, 474_000), dtv(2, 474_000)];
        let mut cursors = AllocationCursors::new(&config);

        let mut plan = StoreCommitter::new(&config)
            .plan(
                &gw,
                input(StoreMode::Final, digital(ScanMethod::Auto), SortMode::Lcn, &batch, &[]),
                &mut cursors,
            )
            .unwrap();
        plan.execute(&mut gw).unwrap();

        assert_eq!(numbers(&gw), vec![(1, Some(900)), (2, Some(901))]);
        assert_eq!(cursors.lcn, 902);
    }

    #[test]
    fn test_manual_final_prunes_stale_channels() {
        let config = ScanConfig::default();
        let mut gw = MemoryGateway::with_channels([dtv(1, 474_000), dtv(2, 474_000)]);
        let old = gw.channels().to_vec();
        let batch = vec![dtv(1, 474_000)];

        let committer = StoreCommitter::new(&config);
        let mut plan = committer
            .plan(
                &gw,
                input(StoreMode::Final, digital(ScanMethod::Manual), SortMode::Number, &batch, &old),
                &mut AllocationCursors::new(&config),
            )
            .unwrap();
        assert_eq!(plan.execute(&mut gw).unwrap().deleted, 1);
        assert_eq!(gw.channels().len(), 1);
        assert_eq!(gw.channels()[0].service_id, 1);

        // automatic scans never delete
        let mut gw = MemoryGateway::with_channels([dtv(1, 474_000), dtv(2, 474_000)]);
        let mut plan = committer
            .plan(
                &gw,
                input(StoreMode::Final, digital(ScanMethod::Auto), SortMode::Number, &batch, &old),
                &mut AllocationCursors::new(&config),
            )
            .unwrap();
        assert_eq!(plan.execute(&mut gw).unwrap().deleted, 0);
        assert_eq!(gw.channels().len(), 2);
    }

    #[test]
    fn test_other_services_stored_hidden() {
        let config = ScanConfig::default();
        let mut gw = MemoryGateway::new();
        let mut data = dtv(1, 474_000);
        data.service_kind = ServiceKind::Other;
        let batch = vec![data, dtv(2, 474_000)];

        let mut plan = StoreCommitter::new(&config)
            .plan(
                &gw,
                input(StoreMode::Final, digital(ScanMethod::Auto), SortMode::Number, &batch, &[]),
                &mut AllocationCursors::new(&config),
            )
            .unwrap();
        plan.execute(&mut gw).unwrap();

        let other = gw.channels().iter().find(|c| c.service_id == 1).unwrap();
        assert!(!other.browsable);
        assert_eq!(other.display_number, None);
        assert_eq!(numbers(&gw), vec![(1, None), (2, Some(1))]);
    }

    #[test]
    fn test_repeated_service_committed_once() {
        let config = ScanConfig::default();
        let mut gw = MemoryGateway::new();
        let batch = vec![dtv(1, 474_000), dtv(1, 474_000)];

        let mut plan = StoreCommitter::new(&config)
            .plan(
                &gw,
                input(StoreMode::Final, digital(ScanMethod::Auto), SortMode::Number, &batch, &[]),
                &mut AllocationCursors::new(&config),
            )
            .unwrap();
        assert_eq!(plan.ops().len(), 1);
        plan.execute(&mut gw).unwrap();
        assert_eq!(gw.channels().len(), 1);
    }

    #[test]
    fn test_execute_resumes_after_failure() {
        let config = ScanConfig::default();
        let mut gw = MemoryGateway::new();
        let batch = vec![dtv(1, 474_000), dtv(2, 474_000), dtv(3, 474_000)];

        let mut plan = StoreCommitter::new(&config)
            .plan(
                &gw,
                input(StoreMode::Final, digital(ScanMethod::Auto), SortMode::Number, &batch, &[]),
                &mut AllocationCursors::new(&config),
            )
            .unwrap();

        gw.fail_writes_after(1);
        let err = plan.execute(&mut gw).unwrap_err();
        assert!(matches!(err, CommitError::Aborted { completed: 1, total: 3, .. }));
        assert_eq!(plan.remaining(), 2);

        gw.heal();
        let summary = plan.execute(&mut gw).unwrap();
        assert_eq!(summary.inserted, 3);
        assert!(plan.is_complete());
        assert_eq!(gw.channels().len(), 3);
        assert_eq!(gw.write_count(), 3);
    }

    fn assert_unique(values: &[Option<u32>]) {
        let mut seen: Vec<u32> = values.iter().flatten().copied().collect();
        let count = seen.len();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), count, "repeated value in {:?}", values);
    }

    #[test]
    fn test_reclaimed_number_not_drawn_by_earlier_channel() {
        let config = ScanConfig::default();
        let mut stored = dtv(9, 474_000);
        stored.display_number = Some(1);
        let mut gw = MemoryGateway::with_channels([stored]);
        let old = gw.channels().to_vec();
        // sid 4 sorts before sid 9 and draws from the cursor first
        let batch = vec![dtv(9, 474_000), dtv(4, 474_000)];

        let mut plan = StoreCommitter::new(&config)
            .plan(
                &gw,
                input(StoreMode::Final, digital(ScanMethod::Manual), SortMode::Number, &batch, &old),
                &mut AllocationCursors::new(&config),
            )
            .unwrap();
        plan.execute(&mut gw).unwrap();

        let rows = numbers(&gw);
        assert_eq!(rows, vec![(4, Some(2)), (9, Some(1))]);
        assert_unique(&rows.iter().map(|r| r.1).collect::<Vec<_>>());
    }

    #[test]
    fn test_numbers_unique_when_reuse_and_fresh_mix() {
        let config = ScanConfig::default().with_initial_display_number(3);
        let mut stored = Vec::new();
        for (sid, number) in [(5, 3), (8, 4), (12, 1)] {
            let mut ch = dtv(sid, 474_000);
            ch.display_number = Some(number);
            stored.push(ch);
        }
        let mut gw = MemoryGateway::with_channels(stored);
        let old = gw.channels().to_vec();
        let batch = vec![dtv(12, 474_000), dtv(8, 474_000), dtv(2, 474_000), dtv(5, 474_000), dtv(1, 474_000)];

        let mut plan = StoreCommitter::new(&config)
            .plan(
                &gw,
                input(StoreMode::Final, digital(ScanMethod::Manual), SortMode::Number, &batch, &old),
                &mut AllocationCursors::new(&config),
            )
            .unwrap();
        plan.execute(&mut gw).unwrap();

        let rows = numbers(&gw);
        assert_eq!(rows.len(), 5);
        assert_unique(&rows.iter().map(|r| r.1).collect::<Vec<_>>());
        let number_of = |sid| rows.iter().find(|r| r.0 == sid).unwrap().1;
        assert_eq!(number_of(5), Some(3));
        assert_eq!(number_of(8), Some(4));
        assert_eq!(number_of(12), Some(1));
    }

    #[test]
    fn test_reclaimed_lcn_not_taken_by_record() {
        let config = ScanConfig::default();
        let mut stored = dtv(9, 474_000);
        stored.lcn = Some(5);
        stored.lcn1 = Some(5);
        stored.display_number = Some(5);
        let mut gw = MemoryGateway::with_channels([stored]);
        let old = gw.channels().to_vec();
        let batch = vec![dtv(9, 474_000), dtv(4, 474_000), dtv(6, 474_000)];
        let records = vec![
            ScannerLcnInfo::new(1, 1, 4, [LcnSlot::new(5, true, true), LcnSlot::invalid()]),
            ScannerLcnInfo::new(1, 1, 6, [LcnSlot::new(2, true, true), LcnSlot::invalid()]),
        ];

        let mut commit = input(StoreMode::Final, digital(ScanMethod::Manual), SortMode::Lcn, &batch, &old);
        commit.lcn_records = &records;
        let mut plan = StoreCommitter::new(&config)
            .plan(&gw, commit, &mut AllocationCursors::new(&config))
            .unwrap();
        plan.execute(&mut gw).unwrap();

        let lcns: Vec<(u16, Option<u32>)> = {
            let mut rows: Vec<_> = gw.channels().iter().map(|c| (c.service_id, c.lcn)).collect();
            rows.sort();
            rows
        };
        assert_eq!(lcns, vec![(4, Some(900)), (6, Some(2)), (9, Some(5))]);
        assert_unique(&lcns.iter().map(|r| r.1).collect::<Vec<_>>());
    }

    #[test]
    fn test_stored_number_at_limit_does_not_abort_commit() {
        let config = ScanConfig::default();
        let mut stored = dtv(7, 482_000);
        stored.display_number = Some(u32::MAX);
        let mut gw = MemoryGateway::with_channels([stored]);
        let batch = vec![dtv(1, 474_000)];

        let mut plan = StoreCommitter::new(&config)
            .plan(
                &gw,
                input(StoreMode::Realtime, digital(ScanMethod::Auto), SortMode::Number, &batch, &[]),
                &mut AllocationCursors::new(&config),
            )
            .unwrap();
        plan.execute(&mut gw).unwrap();
        assert_eq!(numbers(&gw), vec![(1, Some(1)), (7, Some(u32::MAX))]);
    }

    #[test]
    fn test_overflow_start_configurable() {
        let config = ScanConfig::default().with_lcn_overflow_start(500);
        let mut gw = MemoryGateway::new();
        let batch = vec![dtv(1, 474_000)];
        let mut cursors = AllocationCursors::new(&config);

        let mut plan = StoreCommitter::new(&config)
            .plan(
                &gw,
                input(StoreMode::Final, digital(ScanMethod::Auto), SortMode::Lcn, &batch, &[]),
                &mut cursors,
            )
            .unwrap();
        plan.execute(&mut gw).unwrap();

        assert_eq!(numbers(&gw), vec![(1, Some(500))]);
        assert_eq!(cursors.lcn, 501);
    }
}
