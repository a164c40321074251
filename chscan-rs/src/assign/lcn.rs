//! Logical channel number assignment.

use chscan_protocol::ScannerLcnInfo;
use log::{debug, trace};

use super::{find_old, Assignment, Known};
use crate::channel::ChannelEntity;

/// Assigns LCNs from the broadcaster's LCN records.
#[derive(Debug, Clone, Copy)]
pub struct LcnAssigner {
    /// Resolve conflicts on the secondary slot by swapping the holder.
    /// Automatic scans skip this.
    conflict_check: bool,
}

impl LcnAssigner {
    pub fn new(conflict_check: bool) -> Self {
        Self { conflict_check }
    }

    /// Old-snapshot channel whose LCN `channel` will take back: it has no
    /// usable LCN record but used to hold an LCN.
    pub fn reclaims<'a>(
        &self,
        channel: &ChannelEntity,
        records: &[ScannerLcnInfo],
        old: &'a [ChannelEntity],
    ) -> Option<&'a ChannelEntity> {
        if channel.service_kind.is_other() || usable_record(channel, records).is_some() {
            return None;
        }
        find_old(old, channel).filter(|o| o.lcn.is_some())
    }

    /// Resolve the LCN of `channel`. The display number follows the LCN.
    ///
    /// `overflow` is the next LCN handed out to services without a usable
    /// LCN; values already held by known channels are skipped.
    ///
    /// When both slots are valid, a channel holding the secondary value is
    /// moved to its own secondary slot. That move is a single substitution:
    /// a conflict it creates is left as it is.
    pub fn assign(
        &self,
        channel: &ChannelEntity,
        records: &[ScannerLcnInfo],
        known: &mut Known,
        old: &[ChannelEntity],
        overflow: &mut u32,
    ) -> Assignment {
        if channel.service_kind.is_other() {
            return Assignment::excluded();
        }

        let Some(record) = usable_record(channel, records) else {
            let reclaimed = self.reclaims(channel, records, old).filter(|prev| {
                prev.lcn
                    .map_or(false, |lcn| known.holder_of_lcn(lcn, channel).is_none())
            });
            if let Some(prev) = reclaimed {
                trace!("{} keeps LCN {:?}", channel.label(), prev.lcn);
                return Assignment {
                    display_number: prev.lcn,
                    lcn: prev.lcn,
                    lcn1: prev.lcn1,
                    lcn2: prev.lcn2,
                    browsable: true,
                };
            }
            let lcn = next_overflow(known, overflow);
            debug!("{} has no LCN record; overflow LCN {}", channel.label(), lcn);
            return Assignment {
                display_number: Some(lcn),
                lcn: Some(lcn),
                lcn1: None,
                lcn2: None,
                browsable: true,
            };
        };

        let [first, second] = record.slots;
        let winner = if first.valid { first } else { second };
        let mut lcn = winner.lcn;

        let mut swapped = false;
        if record.both_valid() && self.conflict_check {
            if let Some(idx) = known.holder_of_lcn(second.lcn, channel) {
                swapped = known.move_to_secondary(idx);
            }
        }

        if !swapped && known.holder_of_lcn(lcn, channel).is_some() {
            let moved = next_overflow(known, overflow);
            debug!(
                "{}: LCN {} already taken; overflow LCN {}",
                channel.label(),
                lcn,
                moved
            );
            lcn = moved;
        }

        Assignment {
            display_number: Some(lcn),
            lcn: Some(lcn),
            lcn1: first.valid.then_some(first.lcn),
            lcn2: second.valid.then_some(second.lcn),
            browsable: winner.visible,
        }
    }
}

/// Last LCN record of the channel's service, unless both slots are invalid.
fn usable_record<'a>(
    channel: &ChannelEntity,
    records: &'a [ScannerLcnInfo],
) -> Option<&'a ScannerLcnInfo> {
    if !channel.is_digital() {
        return None;
    }
    records
        .iter()
        .rev()
        .find(|r| r.triple() == channel.triple())
        .filter(|r| r.slots[0].valid || r.slots[1].valid)
}

fn next_overflow(known: &Known, overflow: &mut u32) -> u32 {
    while *overflow < u32::MAX && known.lcn_taken(*overflow) {
        *overflow += 1;
    }
    let lcn = *overflow;
    *overflow = overflow.saturating_add(1);
    lcn
}
