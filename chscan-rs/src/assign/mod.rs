//! Display number and LCN assignment.
//!
//! Both assigners run once per channel of a committed batch, in commit
//! order, against a [`Known`] set holding every channel whose number or LCN
//! is already fixed: the stored channels that survive the commit, the batch
//! channels assigned so far, and the old values later batch channels will
//! reclaim.

mod lcn;
mod number;

pub use lcn::LcnAssigner;
pub use number::NumberAssigner;

use log::debug;

use crate::channel::ChannelEntity;

/// Outcome of assigning one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub display_number: Option<u32>,
    pub lcn: Option<u32>,
    pub lcn1: Option<u32>,
    pub lcn2: Option<u32>,
    pub browsable: bool,
}

impl Assignment {
    /// Channels of service kind "other": hidden, unnumbered.
    pub fn excluded() -> Self {
        Self {
            display_number: None,
            lcn: None,
            lcn1: None,
            lcn2: None,
            browsable: false,
        }
    }

    pub fn number(number: u32) -> Self {
        Self {
            display_number: Some(number),
            lcn: None,
            lcn1: None,
            lcn2: None,
            browsable: true,
        }
    }

    /// Apply to a channel, producing the version that gets stored.
    pub fn apply(&self, channel: &ChannelEntity) -> ChannelEntity {
        let mut assigned = channel.clone();
        assigned.display_number = self.display_number;
        assigned.lcn = self.lcn;
        assigned.lcn1 = self.lcn1;
        assigned.lcn2 = self.lcn2;
        assigned.browsable = self.browsable;
        assigned
    }
}

/// Where a known channel came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Stored,
    Batch,
    /// Old value a batch channel takes back once it is assigned.
    Reserved,
}

#[derive(Debug, Clone)]
struct KnownChannel {
    channel: ChannelEntity,
    origin: Origin,
    /// LCN moved by a swap; stored channels need an update.
    swapped: bool,
}

/// Channels holding numbers/LCNs that a new assignment must not collide with.
#[derive(Debug, Clone, Default)]
pub struct Known {
    entries: Vec<KnownChannel>,
}

impl Known {
    /// Start from the stored channels that are not being deleted or replaced.
    pub fn new(stored: Vec<ChannelEntity>) -> Self {
        Self {
            entries: stored
                .into_iter()
                .map(|channel| KnownChannel {
                    channel,
                    origin: Origin::Stored,
                    swapped: false,
                })
                .collect(),
        }
    }

    /// Hold the number/LCN of an old-snapshot channel for the batch channel
    /// of the same service.
    pub fn reserve(&mut self, old: &ChannelEntity) {
        self.entries.push(KnownChannel {
            channel: old.clone(),
            origin: Origin::Reserved,
            swapped: false,
        });
    }

    /// Record a batch channel whose assignment is final. Its reservation,
    /// if any, is released.
    pub fn push_assigned(&mut self, channel: ChannelEntity) {
        self.entries
            .retain(|e| !(e.origin == Origin::Reserved && e.channel.same_service(&channel)));
        self.entries.push(KnownChannel {
            channel,
            origin: Origin::Batch,
            swapped: false,
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChannelEntity> {
        self.entries.iter().map(|e| &e.channel)
    }

    /// Highest display number at or above `floor`.
    pub fn max_number_from(&self, floor: u32) -> Option<u32> {
        self.iter()
            .filter_map(|c| c.display_number)
            .filter(|n| *n >= floor)
            .max()
    }

    /// Whether a channel other than `channel`'s service holds this number.
    pub fn number_held(&self, number: u32, channel: &ChannelEntity) -> bool {
        self.iter()
            .any(|c| c.display_number == Some(number) && !c.same_service(channel))
    }

    /// Whether any known channel holds this LCN.
    pub fn lcn_taken(&self, lcn: u32) -> bool {
        self.iter().any(|c| c.lcn == Some(lcn))
    }

    /// Index of a channel other than `channel`'s service holding `lcn`.
    fn holder_of_lcn(&self, lcn: u32, channel: &ChannelEntity) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.channel.lcn == Some(lcn) && !e.channel.same_service(channel))
    }

    /// Move the channel at `idx` to its own secondary LCN. Returns false if
    /// it has no secondary candidate or holds a reservation.
    fn move_to_secondary(&mut self, idx: usize) -> bool {
        let Some(entry) = self.entries.get_mut(idx) else {
            return false;
        };
        if entry.origin == Origin::Reserved {
            return false;
        }
        let Some(secondary) = entry.channel.lcn2 else {
            return false;
        };
        debug!(
            "LCN swap: {} moves from {:?} to {}",
            entry.channel.label(),
            entry.channel.lcn,
            secondary
        );
        entry.channel.lcn = Some(secondary);
        entry.channel.display_number = Some(secondary);
        entry.swapped = true;
        true
    }

    /// Split into (assigned batch channels in commit order, stored channels
    /// moved by a swap).
    pub fn into_parts(self) -> (Vec<ChannelEntity>, Vec<ChannelEntity>) {
        let mut batch = Vec::new();
        let mut swapped = Vec::new();
        for entry in self.entries {
            match entry.origin {
                Origin::Batch => batch.push(entry.channel),
                Origin::Stored if entry.swapped => swapped.push(entry.channel),
                Origin::Stored | Origin::Reserved => {}
            }
        }
        (batch, swapped)
    }
}

/// Find the old-snapshot version of a channel.
pub(crate) fn find_old<'a>(
    old: &'a [ChannelEntity],
    channel: &ChannelEntity,
) -> Option<&'a ChannelEntity> {
    old.iter().find(|o| o.same_service(channel))
}
