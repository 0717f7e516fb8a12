//! v001 -- Initial schema creation.
//!
//! Creates the core tables: `networks`, `identity_profiles`, `settings`,
//! `tabs`, `messages`, `reconnect_configs`, `connection_snapshots` and
//! `favorites`.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Networks (full config as JSON, name duplicated for lookups)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS networks (
    id   TEXT PRIMARY KEY NOT NULL,   -- UUID v4
    name TEXT NOT NULL,
    json TEXT NOT NULL
);

-- ----------------------------------------------------------------
-- Identity profiles
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS identity_profiles (
    id         TEXT PRIMARY KEY NOT NULL,   -- UUID v4
    name       TEXT NOT NULL,
    is_default INTEGER NOT NULL DEFAULT 0,  -- boolean 0/1
    json       TEXT NOT NULL
);

-- ----------------------------------------------------------------
-- Settings (key/value, JSON values)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS settings (
    key  TEXT PRIMARY KEY NOT NULL,
    json TEXT NOT NULL
);

-- ----------------------------------------------------------------
-- Tabs (reduced records, no message bodies)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS tabs (
    id         TEXT PRIMARY KEY NOT NULL,   -- composite tab id
    network_id TEXT NOT NULL,               -- UUID v4
    kind       TEXT NOT NULL,               -- server | channel | query
    name       TEXT NOT NULL,
    encrypted  INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_tabs_network_id ON tabs(network_id);

-- ----------------------------------------------------------------
-- Message history
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS messages (
    seq        INTEGER PRIMARY KEY AUTOINCREMENT,
    network_id TEXT NOT NULL,
    channel    TEXT NOT NULL,               -- channel, nick, or "" for server log
    msgid      TEXT,                        -- IRCv3 msgid when present
    sender     TEXT NOT NULL,
    text       TEXT NOT NULL,
    kind       TEXT NOT NULL,
    timestamp  TEXT NOT NULL                -- ISO-8601 / RFC-3339
);

CREATE INDEX IF NOT EXISTS idx_messages_network_channel_ts
    ON messages(network_id, channel, timestamp DESC);

-- ----------------------------------------------------------------
-- Auto-reconnect policy and connection snapshots
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS reconnect_configs (
    network_id TEXT PRIMARY KEY NOT NULL,
    json       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS connection_snapshots (
    network_id TEXT PRIMARY KEY NOT NULL,
    json       TEXT NOT NULL
);

-- ----------------------------------------------------------------
-- Channel favorites
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS favorites (
    network_id TEXT NOT NULL,
    channel    TEXT NOT NULL,

    PRIMARY KEY (network_id, channel)
);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
