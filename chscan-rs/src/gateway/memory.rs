//! In-memory channel store.

use super::{ChannelQuery, PersistenceGateway, ServiceFilter};
use crate::channel::ChannelEntity;
use crate::error::GatewayError;

/// Channel store kept in a `Vec`, for tests and dry runs.
#[derive(Debug, Default, Clone)]
pub struct MemoryGateway {
    rows: Vec<ChannelEntity>,
    next_id: i64,
    /// Writes still allowed before every write fails.
    write_budget: Option<usize>,
    writes: usize,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-existing rows, assigning ids to those without one.
    pub fn with_channels(channels: impl IntoIterator<Item = ChannelEntity>) -> Self {
        let mut gateway = Self::new();
        for ch in channels {
            gateway.push(ch);
        }
        gateway
    }

    /// Make every write after the next `n` fail with a backend error.
    pub fn fail_writes_after(&mut self, n: usize) {
        self.write_budget = Some(n);
    }

    /// Let writes succeed again.
    pub fn heal(&mut self) {
        self.write_budget = None;
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    pub fn channels(&self) -> &[ChannelEntity] {
        &self.rows
    }

    fn push(&mut self, mut channel: ChannelEntity) -> i64 {
        self.next_id += 1;
        let id = channel.id.unwrap_or(self.next_id);
        self.next_id = self.next_id.max(id);
        channel.id = Some(id);
        self.rows.push(channel);
        id
    }

    fn charge_write(&mut self) -> Result<(), GatewayError> {
        if let Some(budget) = self.write_budget.as_mut() {
            if *budget == 0 {
                return Err(GatewayError::Backend("write rejected".to_string()));
            }
            *budget -= 1;
        }
        self.writes += 1;
        Ok(())
    }

    fn position(&self, channel: &ChannelEntity) -> Option<usize> {
        match channel.id {
            Some(id) => self.rows.iter().position(|r| r.id == Some(id)),
            None => self
                .rows
                .iter()
                .position(|r| r.input_id == channel.input_id && r.same_service(channel)),
        }
    }
}

impl PersistenceGateway for MemoryGateway {
    fn list_channels(
        &self,
        input_id: &str,
        filter: ServiceFilter,
    ) -> Result<Vec<ChannelEntity>, GatewayError> {
        Ok(self
            .rows
            .iter()
            .filter(|r| r.input_id == input_id && filter.matches(r.service_kind))
            .cloned()
            .collect())
    }

    fn query_channels(
        &self,
        input_id: &str,
        query: &ChannelQuery,
    ) -> Result<Vec<ChannelEntity>, GatewayError> {
        Ok(self
            .rows
            .iter()
            .filter(|r| r.input_id == input_id && query.matches(r))
            .cloned()
            .collect())
    }

    fn insert(
        &mut self,
        channel: &ChannelEntity,
        number: Option<u32>,
    ) -> Result<i64, GatewayError> {
        self.charge_write()?;
        let mut row = channel.clone();
        row.id = None;
        row.display_number = number;
        Ok(self.push(row))
    }

    fn update_or_insert(&mut self, channel: &ChannelEntity) -> Result<(), GatewayError> {
        self.charge_write()?;
        match self.position(channel) {
            Some(pos) => {
                let id = self.rows[pos].id;
                self.rows[pos] = channel.clone();
                self.rows[pos].id = id;
            }
            None => {
                let mut row = channel.clone();
                row.id = None;
                self.push(row);
            }
        }
        Ok(())
    }

    fn update(&mut self, channel: &ChannelEntity) -> Result<(), GatewayError> {
        self.charge_write()?;
        let pos = self
            .position(channel)
            .ok_or_else(|| GatewayError::NotFound(channel.label()))?;
        let id = self.rows[pos].id;
        self.rows[pos] = channel.clone();
        self.rows[pos].id = id;
        Ok(())
    }

    fn delete(&mut self, channels: &[ChannelEntity]) -> Result<usize, GatewayError> {
        self.charge_write()?;
        let before = self.rows.len();
        for ch in channels {
            if let Some(pos) = self.position(ch) {
                self.rows.remove(pos);
            }
        }
        Ok(before - self.rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::tests::{ctx, dtv_data};
    use chscan_protocol::ChannelKind;

    #[test]
    fn test_update_or_insert_matches_service() {
        let mut gw = MemoryGateway::new();
        let ch = ChannelEntity::from_dtv(&dtv_data(1, 1, 1, 474_000), &ctx(1));
        gw.update_or_insert(&ch).unwrap();

        let mut renamed = ch.clone();
        renamed.display_name = "Renamed".to_string();
        gw.update_or_insert(&renamed).unwrap();

        let rows = gw.list_channels("tuner0", ServiceFilter::All).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].display_name, "Renamed");
        assert_eq!(rows[0].id, Some(1));
    }

    #[test]
    fn test_query_and_delete() {
        let mut gw = MemoryGateway::with_channels([
            ChannelEntity::from_dtv(&dtv_data(1, 1, 1, 474_000), &ctx(1)),
            ChannelEntity::from_dtv(&dtv_data(1, 1, 2, 482_000), &ctx(2)),
        ]);

        let query = ChannelQuery::kind(ChannelKind::Digital).on_frequency(482_000);
        let found = gw.query_channels("tuner0", &query).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].service_id, 2);

        assert_eq!(gw.delete(&found).unwrap(), 1);
        assert_eq!(gw.channels().len(), 1);
        assert!(gw.query_channels("other-input", &ChannelQuery::default()).unwrap().is_empty());
    }

    #[test]
    fn test_update_missing_row() {
        let mut gw = MemoryGateway::new();
        let ch = ChannelEntity::from_dtv(&dtv_data(1, 1, 1, 474_000), &ctx(1));
        assert!(matches!(gw.update(&ch), Err(GatewayError::NotFound(_))));
    }

    #[test]
    fn test_write_budget() {
        let mut gw = MemoryGateway::new();
        gw.fail_writes_after(1);
        let ch = ChannelEntity::from_dtv(&dtv_data(1, 1, 1, 474_000), &ctx(1));
        assert!(gw.insert(&ch, Some(1)).is_ok());
        assert!(matches!(gw.insert(&ch, Some(2)), Err(GatewayError::Backend(_))));
        gw.heal();
        assert!(gw.insert(&ch, Some(2)).is_ok());
        assert_eq!(gw.write_count(), 2);
    }
}
