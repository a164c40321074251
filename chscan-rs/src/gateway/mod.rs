//! Channel store access.
//!
//! The scan core never talks to a store directly; it goes through
//! [`PersistenceGateway`]. Two implementations ship with the crate:
//! [`MemoryGateway`] and, with the `database` feature, the SQLite-backed
//! [`Database`](crate::database::Database).

mod memory;

pub use memory::MemoryGateway;

use chscan_protocol::{ChannelKind, ServiceKind};

use crate::channel::ChannelEntity;
use crate::error::GatewayError;

/// Service-kind filter for channel listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServiceFilter {
    #[default]
    All,
    /// Audio-video services only.
    Tv,
    /// Audio-only services only.
    Radio,
    /// Audio-video and audio-only services.
    TvAndRadio,
    /// Services of kind "other" only.
    Other,
}

impl ServiceFilter {
    pub fn matches(&self, kind: ServiceKind) -> bool {
        match self {
            ServiceFilter::All => true,
            ServiceFilter::Tv => kind == ServiceKind::AudioVideo,
            ServiceFilter::Radio => kind == ServiceKind::Audio,
            ServiceFilter::TvAndRadio => kind != ServiceKind::Other,
            ServiceFilter::Other => kind == ServiceKind::Other,
        }
    }

    /// Service kinds accepted by this filter.
    pub fn kinds(&self) -> &'static [ServiceKind] {
        match self {
            ServiceFilter::All => &[ServiceKind::AudioVideo, ServiceKind::Audio, ServiceKind::Other],
            ServiceFilter::Tv => &[ServiceKind::AudioVideo],
            ServiceFilter::Radio => &[ServiceKind::Audio],
            ServiceFilter::TvAndRadio => &[ServiceKind::AudioVideo, ServiceKind::Audio],
            ServiceFilter::Other => &[ServiceKind::Other],
        }
    }
}

/// Selection criteria for [`PersistenceGateway::query_channels`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelQuery {
    pub kind: Option<ChannelKind>,
    pub frequency: Option<u32>,
    pub service: ServiceFilter,
}

impl ChannelQuery {
    pub fn kind(kind: ChannelKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn on_frequency(mut self, frequency: u32) -> Self {
        self.frequency = Some(frequency);
        self
    }

    pub fn matches(&self, channel: &ChannelEntity) -> bool {
        self.kind.map_or(true, |k| channel.kind == k)
            && self.frequency.map_or(true, |f| channel.frequency == f)
            && self.service.matches(channel.service_kind)
    }
}

/// Synchronous channel store used by the scan session.
///
/// Calls block the event-processing path. Retries and timeouts are the
/// implementation's concern.
pub trait PersistenceGateway {
    /// All channels of an input, filtered by service kind.
    fn list_channels(
        &self,
        input_id: &str,
        filter: ServiceFilter,
    ) -> Result<Vec<ChannelEntity>, GatewayError>;

    /// Channels of an input matching a query.
    fn query_channels(
        &self,
        input_id: &str,
        query: &ChannelQuery,
    ) -> Result<Vec<ChannelEntity>, GatewayError>;

    /// Insert a new row with the given display number. Returns the row id.
    fn insert(&mut self, channel: &ChannelEntity, number: Option<u32>)
        -> Result<i64, GatewayError>;

    /// Update the stored row of the same service, or insert one.
    fn update_or_insert(&mut self, channel: &ChannelEntity) -> Result<(), GatewayError>;

    /// Update an existing row, by id when known and by service otherwise.
    fn update(&mut self, channel: &ChannelEntity) -> Result<(), GatewayError>;

    /// Delete rows. Returns how many were removed.
    fn delete(&mut self, channels: &[ChannelEntity]) -> Result<usize, GatewayError>;
}

impl<G: PersistenceGateway + ?Sized> PersistenceGateway for Box<G> {
    fn list_channels(
        &self,
        input_id: &str,
        filter: ServiceFilter,
    ) -> Result<Vec<ChannelEntity>, GatewayError> {
        (**self).list_channels(input_id, filter)
    }

    fn query_channels(
        &self,
        input_id: &str,
        query: &ChannelQuery,
    ) -> Result<Vec<ChannelEntity>, GatewayError> {
        (**self).query_channels(input_id, query)
    }

    fn insert(
        &mut self,
        channel: &ChannelEntity,
        number: Option<u32>,
    ) -> Result<i64, GatewayError> {
        (**self).insert(channel, number)
    }

    fn update_or_insert(&mut self, channel: &ChannelEntity) -> Result<(), GatewayError> {
        (**self).update_or_insert(channel)
    }

    fn update(&mut self, channel: &ChannelEntity) -> Result<(), GatewayError> {
        (**self).update(channel)
    }

    fn delete(&mut self, channels: &[ChannelEntity]) -> Result<usize, GatewayError> {
        (**self).delete(channels)
    }
}
