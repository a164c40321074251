//! Database schema definitions.

/// SQL schema for the channel database.
pub const SCHEMA_SQL: &str = r#"
-- Channel list table
CREATE TABLE IF NOT EXISTS channels (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    input_id TEXT NOT NULL,                  -- Tuner input the channel belongs to
    kind TEXT NOT NULL,                      -- 'analog' or 'digital'
    service_kind INTEGER NOT NULL,           -- 1=TV, 2=Radio, 0=Other
    -- Identity (all zero for analog channels)
    original_network_id INTEGER NOT NULL,
    transport_stream_id INTEGER NOT NULL,
    service_id INTEGER NOT NULL,
    -- Numbering
    display_number TEXT,                     -- Integer encoded as text, NULL = unassigned
    lcn INTEGER,
    lcn1 INTEGER,
    lcn2 INTEGER,
    -- Tuning
    frequency INTEGER NOT NULL,
    modulation INTEGER DEFAULT 0,
    symbol_rate INTEGER DEFAULT 0,
    bandwidth INTEGER DEFAULT 0,
    -- State
    browsable INTEGER DEFAULT 1,
    favourite INTEGER DEFAULT 0,
    locked INTEGER DEFAULT 0,
    scrambled INTEGER DEFAULT 0,
    -- Names
    display_name TEXT,
    raw_name TEXT,                           -- Multilingual form as reported
    -- Elementary streams (JSON arrays for the lists)
    pcr_pid INTEGER,
    video_pid INTEGER,
    video_format INTEGER,
    audio_pids TEXT,
    audio_formats TEXT,
    audio_langs TEXT,
    subtitle_pids TEXT,
    subtitle_langs TEXT,
    -- Analog standards
    video_std INTEGER DEFAULT 0,
    audio_std INTEGER DEFAULT 0,
    -- Metadata
    created_at INTEGER DEFAULT (strftime('%s', 'now')),
    updated_at INTEGER DEFAULT (strftime('%s', 'now'))
);

-- Scan history table
CREATE TABLE IF NOT EXISTS scan_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    input_id TEXT NOT NULL,
    scan_time INTEGER NOT NULL,
    scan_mode TEXT NOT NULL,                 -- e.g. 'digital/manual'
    sort_mode TEXT NOT NULL,                 -- 'number' or 'lcn'
    store_mode TEXT NOT NULL,                -- 'realtime' or 'final'
    channel_count INTEGER,
    inserted INTEGER DEFAULT 0,
    updated INTEGER DEFAULT 0,
    upserted INTEGER DEFAULT 0,
    deleted INTEGER DEFAULT 0,
    swapped INTEGER DEFAULT 0,
    success INTEGER,
    error_message TEXT
);

-- Indexes for efficient queries
CREATE INDEX IF NOT EXISTS idx_channels_identity
    ON channels(input_id, original_network_id, transport_stream_id, service_id);
CREATE INDEX IF NOT EXISTS idx_channels_frequency ON channels(input_id, kind, frequency);
CREATE INDEX IF NOT EXISTS idx_scan_history_input ON scan_history(input_id, scan_time);

-- Trigger to update updated_at on channels
CREATE TRIGGER IF NOT EXISTS channels_updated_at
AFTER UPDATE ON channels
BEGIN
    UPDATE channels SET updated_at = strftime('%s', 'now') WHERE id = NEW.id;
END;
"#;
