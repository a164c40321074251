//! Channel CRUD operations and the SQLite [`PersistenceGateway`].

use chscan_protocol::{ChannelKind, ServiceKind};
use log::debug;
use rusqlite::types::{Type, Value};
use rusqlite::{params_from_iter, OptionalExtension};
use serde::de::DeserializeOwned;

use super::{Database, Result};
use crate::channel::ChannelEntity;
use crate::error::GatewayError;
use crate::gateway::{ChannelQuery, PersistenceGateway, ServiceFilter};

/// Writable columns, in bind order.
const CHANNEL_COLUMNS: [&str; 30] = [
    "input_id",
    "kind",
    "service_kind",
    "original_network_id",
    "transport_stream_id",
    "service_id",
    "display_number",
    "lcn",
    "lcn1",
    "lcn2",
    "frequency",
    "modulation",
    "symbol_rate",
    "bandwidth",
    "browsable",
    "favourite",
    "locked",
    "scrambled",
    "display_name",
    "raw_name",
    "pcr_pid",
    "video_pid",
    "video_format",
    "audio_pids",
    "audio_formats",
    "audio_langs",
    "subtitle_pids",
    "subtitle_langs",
    "video_std",
    "audio_std",
];

impl Database {
    /// Insert a channel with the given display number. Returns the row id.
    pub fn insert_channel(&self, channel: &ChannelEntity, number: Option<u32>) -> Result<i64> {
        let placeholders: Vec<String> = (1..=CHANNEL_COLUMNS.len())
            .map(|i| format!("?{}", i))
            .collect();
        let sql = format!(
            "INSERT INTO channels ({}) VALUES ({})",
            CHANNEL_COLUMNS.join(", "),
            placeholders.join(", ")
        );

        let mut values = channel_values(channel)?;
        values[6] = number_value(number);
        self.conn.execute(&sql, params_from_iter(values))?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Overwrite the row `id` with `channel`. Returns false if no row has
    /// that id.
    pub fn update_channel(&self, id: i64, channel: &ChannelEntity) -> Result<bool> {
        let assignments: Vec<String> = CHANNEL_COLUMNS
            .iter()
            .enumerate()
            .map(|(i, col)| format!("{} = ?{}", col, i + 1))
            .collect();
        let sql = format!(
            "UPDATE channels SET {} WHERE id = ?{}",
            assignments.join(", "),
            CHANNEL_COLUMNS.len() + 1
        );

        let mut values = channel_values(channel)?;
        values.push(Value::Integer(id));
        let changed = self.conn.execute(&sql, params_from_iter(values))?;
        Ok(changed > 0)
    }

    /// Row id of the stored channel describing the same service.
    pub fn find_channel_id(&self, channel: &ChannelEntity) -> Result<Option<i64>> {
        let id = match channel.kind {
            ChannelKind::Digital => self
                .conn
                .query_row(
                    "SELECT id FROM channels
                     WHERE input_id = ?1 AND kind = 'digital'
                       AND original_network_id = ?2 AND transport_stream_id = ?3 AND service_id = ?4
                     ORDER BY id LIMIT 1",
                    rusqlite::params![
                        channel.input_id,
                        channel.original_network_id as i64,
                        channel.transport_stream_id as i64,
                        channel.service_id as i64,
                    ],
                    |row| row.get(0),
                )
                .optional()?,
            ChannelKind::Analog => self
                .conn
                .query_row(
                    "SELECT id FROM channels
                     WHERE input_id = ?1 AND kind = 'analog' AND frequency = ?2
                     ORDER BY id LIMIT 1",
                    rusqlite::params![channel.input_id, channel.frequency as i64],
                    |row| row.get(0),
                )
                .optional()?,
        };
        Ok(id)
    }

    /// Get a channel by row id.
    pub fn get_channel(&self, id: i64) -> Result<Option<ChannelEntity>> {
        let record = self
            .conn
            .query_row(
                "SELECT * FROM channels WHERE id = ?1",
                [id],
                Self::row_to_channel,
            )
            .optional()?;
        Ok(record)
    }

    /// Get the channels of an input matching a query, in row order.
    pub fn get_channels(&self, input_id: &str, query: &ChannelQuery) -> Result<Vec<ChannelEntity>> {
        let mut sql = String::from("SELECT * FROM channels WHERE input_id = ?1");
        let mut values = vec![Value::Text(input_id.to_string())];

        if let Some(kind) = query.kind {
            values.push(Value::Text(kind.as_str().to_string()));
            sql.push_str(&format!(" AND kind = ?{}", values.len()));
        }
        if let Some(frequency) = query.frequency {
            values.push(Value::Integer(frequency as i64));
            sql.push_str(&format!(" AND frequency = ?{}", values.len()));
        }
        if query.service != ServiceFilter::All {
            let mut slots = Vec::new();
            for kind in query.service.kinds() {
                values.push(Value::Integer(kind.code() as i64));
                slots.push(format!("?{}", values.len()));
            }
            sql.push_str(&format!(" AND service_kind IN ({})", slots.join(", ")));
        }
        sql.push_str(" ORDER BY id");

        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map(params_from_iter(values), Self::row_to_channel)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Delete channels in one transaction, by row id when known and by
    /// service otherwise. Returns the number of removed rows.
    pub fn delete_channels(&mut self, channels: &[ChannelEntity]) -> Result<usize> {
        let mut ids = Vec::with_capacity(channels.len());
        for channel in channels {
            match channel.id {
                Some(id) => ids.push(id),
                None => ids.extend(self.find_channel_id(channel)?),
            }
        }

        let tx = self.conn.transaction()?;
        let mut deleted = 0;
        for id in ids {
            deleted += tx.execute("DELETE FROM channels WHERE id = ?1", [id])?;
        }
        tx.commit()?;

        debug!("Deleted {} channels", deleted);
        Ok(deleted)
    }

    /// Count stored channels of an input.
    pub fn channel_count(&self, input_id: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM channels WHERE input_id = ?1",
            [input_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Helper: Convert a row to ChannelEntity.
    fn row_to_channel(row: &rusqlite::Row) -> rusqlite::Result<ChannelEntity> {
        let kind_name: String = row.get("kind")?;
        let kind = ChannelKind::from_name(&kind_name).ok_or_else(|| {
            conversion_error(row, "kind", format!("unknown channel kind '{}'", kind_name))
        })?;

        Ok(ChannelEntity {
            id: row.get("id")?,
            input_id: row.get("input_id")?,
            kind,
            service_kind: ServiceKind::from_code(row.get::<_, i32>("service_kind")?),
            original_network_id: row.get::<_, i64>("original_network_id")? as u16,
            transport_stream_id: row.get::<_, i64>("transport_stream_id")? as u16,
            service_id: row.get::<_, i64>("service_id")? as u16,
            display_number: row
                .get::<_, Option<String>>("display_number")?
                .and_then(|s| s.trim().parse().ok()),
            lcn: row.get::<_, Option<i64>>("lcn")?.map(|v| v as u32),
            lcn1: row.get::<_, Option<i64>>("lcn1")?.map(|v| v as u32),
            lcn2: row.get::<_, Option<i64>>("lcn2")?.map(|v| v as u32),
            frequency: row.get::<_, i64>("frequency")? as u32,
            modulation: row.get::<_, Option<i64>>("modulation")?.unwrap_or(0) as u32,
            symbol_rate: row.get::<_, Option<i64>>("symbol_rate")?.unwrap_or(0) as u32,
            bandwidth: row.get::<_, Option<i64>>("bandwidth")?.unwrap_or(0) as u32,
            browsable: row.get::<_, i32>("browsable")? != 0,
            favourite: row.get::<_, i32>("favourite")? != 0,
            locked: row.get::<_, i32>("locked")? != 0,
            scrambled: row.get::<_, i32>("scrambled")? != 0,
            display_name: row.get::<_, Option<String>>("display_name")?.unwrap_or_default(),
            raw_name: row.get::<_, Option<String>>("raw_name")?.unwrap_or_default(),
            pcr_pid: row.get::<_, Option<i64>>("pcr_pid")?.map(|v| v as u16),
            video_pid: row.get::<_, Option<i64>>("video_pid")?.map(|v| v as u16),
            video_format: row.get("video_format")?,
            audio_pids: json_column(row, "audio_pids")?,
            audio_formats: json_column(row, "audio_formats")?,
            audio_langs: json_column(row, "audio_langs")?,
            subtitle_pids: json_column(row, "subtitle_pids")?,
            subtitle_langs: json_column(row, "subtitle_langs")?,
            video_std: row.get::<_, Option<i32>>("video_std")?.unwrap_or(0),
            audio_std: row.get::<_, Option<i32>>("audio_std")?.unwrap_or(0),
        })
    }
}

impl PersistenceGateway for Database {
    fn list_channels(
        &self,
        input_id: &str,
        filter: ServiceFilter,
    ) -> std::result::Result<Vec<ChannelEntity>, GatewayError> {
        let query = ChannelQuery {
            service: filter,
            ..ChannelQuery::default()
        };
        Ok(self.get_channels(input_id, &query)?)
    }

    fn query_channels(
        &self,
        input_id: &str,
        query: &ChannelQuery,
    ) -> std::result::Result<Vec<ChannelEntity>, GatewayError> {
        Ok(self.get_channels(input_id, query)?)
    }

    fn insert(
        &mut self,
        channel: &ChannelEntity,
        number: Option<u32>,
    ) -> std::result::Result<i64, GatewayError> {
        Ok(self.insert_channel(channel, number)?)
    }

    fn update_or_insert(&mut self, channel: &ChannelEntity) -> std::result::Result<(), GatewayError> {
        let id = match channel.id {
            Some(id) => Some(id),
            None => self.find_channel_id(channel)?,
        };
        match id {
            Some(id) if self.update_channel(id, channel)? => {}
            _ => {
                self.insert_channel(channel, channel.display_number)?;
            }
        }
        Ok(())
    }

    fn update(&mut self, channel: &ChannelEntity) -> std::result::Result<(), GatewayError> {
        let id = match channel.id {
            Some(id) => Some(id),
            None => self.find_channel_id(channel)?,
        };
        match id {
            Some(id) if self.update_channel(id, channel)? => Ok(()),
            _ => Err(GatewayError::NotFound(channel.label())),
        }
    }

    fn delete(&mut self, channels: &[ChannelEntity]) -> std::result::Result<usize, GatewayError> {
        Ok(self.delete_channels(channels)?)
    }
}

/// Bind values for [`CHANNEL_COLUMNS`].
fn channel_values(ch: &ChannelEntity) -> Result<Vec<Value>> {
    Ok(vec![
        Value::Text(ch.input_id.clone()),
        Value::Text(ch.kind.as_str().to_string()),
        Value::Integer(ch.service_kind.code() as i64),
        Value::Integer(ch.original_network_id as i64),
        Value::Integer(ch.transport_stream_id as i64),
        Value::Integer(ch.service_id as i64),
        number_value(ch.display_number),
        optional(ch.lcn),
        optional(ch.lcn1),
        optional(ch.lcn2),
        Value::Integer(ch.frequency as i64),
        Value::Integer(ch.modulation as i64),
        Value::Integer(ch.symbol_rate as i64),
        Value::Integer(ch.bandwidth as i64),
        Value::Integer(ch.browsable as i64),
        Value::Integer(ch.favourite as i64),
        Value::Integer(ch.locked as i64),
        Value::Integer(ch.scrambled as i64),
        Value::Text(ch.display_name.clone()),
        Value::Text(ch.raw_name.clone()),
        optional(ch.pcr_pid),
        optional(ch.video_pid),
        optional(ch.video_format),
        Value::Text(serde_json::to_string(&ch.audio_pids)?),
        Value::Text(serde_json::to_string(&ch.audio_formats)?),
        Value::Text(serde_json::to_string(&ch.audio_langs)?),
        Value::Text(serde_json::to_string(&ch.subtitle_pids)?),
        Value::Text(serde_json::to_string(&ch.subtitle_langs)?),
        Value::Integer(ch.video_std as i64),
        Value::Integer(ch.audio_std as i64),
    ])
}

/// Display numbers are stored as text.
fn number_value(number: Option<u32>) -> Value {
    number.map_or(Value::Null, |n| Value::Text(n.to_string()))
}

fn optional<T: Into<i64>>(value: Option<T>) -> Value {
    value.map_or(Value::Null, |v| Value::Integer(v.into()))
}

fn json_column<T: DeserializeOwned>(row: &rusqlite::Row, name: &str) -> rusqlite::Result<Vec<T>> {
    match row.get::<_, Option<String>>(name)? {
        Some(text) if !text.is_empty() => serde_json::from_str(&text)
            .map_err(|e| conversion_error(row, name, e.to_string())),
        _ => Ok(Vec::new()),
    }
}

fn conversion_error(row: &rusqlite::Row, name: &str, message: String) -> rusqlite::Error {
    let index = row.as_ref().column_index(name).unwrap_or(0);
    rusqlite::Error::FromSqlConversionFailure(index, Type::Text, message.into())
}
