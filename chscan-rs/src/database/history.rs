//! Scan history ledger.

use rusqlite::params;

use super::{Database, NewScanHistory, Result, ScanHistoryRecord};
use crate::store::CommitSummary;

impl Database {
    /// Record one commit attempt.
    pub fn record_scan_history(&self, entry: &NewScanHistory) -> Result<i64> {
        let now = chrono::Utc::now().timestamp();
        self.conn.execute(
            "INSERT INTO scan_history (
                input_id, scan_time, scan_mode, sort_mode, store_mode, channel_count,
                inserted, updated, upserted, deleted, swapped, success, error_message
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                entry.input_id,
                now,
                entry.scan_mode,
                entry.sort_mode,
                entry.store_mode,
                entry.channel_count,
                entry.summary.inserted as i64,
                entry.summary.updated as i64,
                entry.summary.upserted as i64,
                entry.summary.deleted as i64,
                entry.summary.swapped as i64,
                entry.success() as i32,
                entry.error_message,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Get scan history for an input, most recent first.
    pub fn get_scan_history(&self, input_id: &str, limit: i32) -> Result<Vec<ScanHistoryRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, input_id, scan_time, scan_mode, sort_mode, store_mode, channel_count,
                    inserted, updated, upserted, deleted, swapped, success, error_message
             FROM scan_history WHERE input_id = ?1
             ORDER BY scan_time DESC, id DESC LIMIT ?2",
        )?;

        let records = stmt
            .query_map(params![input_id, limit], |row| {
                Ok(ScanHistoryRecord {
                    id: row.get(0)?,
                    input_id: row.get(1)?,
                    scan_time: row.get(2)?,
                    scan_mode: row.get(3)?,
                    sort_mode: row.get(4)?,
                    store_mode: row.get(5)?,
                    channel_count: row.get(6)?,
                    summary: CommitSummary {
                        inserted: row.get::<_, i64>(7)? as usize,
                        updated: row.get::<_, i64>(8)? as usize,
                        upserted: row.get::<_, i64>(9)? as usize,
                        deleted: row.get::<_, i64>(10)? as usize,
                        swapped: row.get::<_, i64>(11)? as usize,
                    },
                    success: row.get::<_, i32>(12)? != 0,
                    error_message: row.get(13)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }
}
