//! Sequential display numbering.

use log::{debug, trace};

use super::{find_old, Assignment, Known};
use crate::channel::ChannelEntity;

/// Assigns unique sequential display numbers.
#[derive(Debug, Clone, Copy)]
pub struct NumberAssigner {
    initial: u32,
}

impl NumberAssigner {
    pub fn new(initial: u32) -> Self {
        Self { initial }
    }

    /// Old-snapshot channel whose display number `channel` will take back.
    pub fn reclaims<'a>(
        &self,
        channel: &ChannelEntity,
        old: &'a [ChannelEntity],
    ) -> Option<&'a ChannelEntity> {
        if channel.service_kind.is_other() {
            return None;
        }
        find_old(old, channel).filter(|o| o.display_number.is_some())
    }

    /// Resolve the display number of `channel`.
    ///
    /// `cursor` is the next free number; it is raised past every known
    /// number and advanced when a fresh number is drawn.
    pub fn assign(
        &self,
        channel: &ChannelEntity,
        known: &Known,
        old: &[ChannelEntity],
        cursor: &mut u32,
    ) -> Assignment {
        if channel.service_kind.is_other() {
            return Assignment::excluded();
        }

        if let Some(next) = known
            .max_number_from(self.initial)
            .and_then(|max| max.checked_add(1))
        {
            *cursor = (*cursor).max(next);
        }

        if let Some(number) = self.reclaims(channel, old).and_then(|o| o.display_number) {
            if !known.number_held(number, channel) {
                trace!("{} keeps display number {}", channel.label(), number);
                return Assignment::number(number);
            }
            debug!("{}: display number {} already taken", channel.label(), number);
        }

        let number = *cursor;
        *cursor = cursor.saturating_add(1);
        Assignment::number(number)
    }
}
