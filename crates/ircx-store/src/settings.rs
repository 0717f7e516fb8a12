//! Typed key-value settings.
//!
//! Values are stored as JSON so callers can persist anything serde can
//! handle, from booleans to whole config structs.

use rusqlite::params;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::database::Database;
use crate::error::Result;

/// Well-known setting keys.
pub mod keys {
    /// Network id dialed by the quick-connect path.
    pub const QUICK_CONNECT_NETWORK_ID: &str = "quick_connect_network_id";
    /// The first successfully connected network; set once, never overwritten.
    pub const PRIMARY_NETWORK_ID: &str = "primary_network_id";
    /// Display name of the most recently connected network.
    pub const SELECTED_NETWORK_NAME: &str = "selected_network_name";
    /// Whether favorites are included in the auto-join channel set.
    pub const AUTO_JOIN_FAVORITES: &str = "auto_join_favorites";
    /// Global proxy applied when a network has none of its own.
    pub const GLOBAL_PROXY: &str = "global_proxy";
}

impl Database {
    /// Read a setting, returning `None` when the key has never been written.
    pub fn get_setting<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let json: Option<String> = self
            .conn()
            .query_row(
                "SELECT json FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;

        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Write a setting, replacing any previous value.
    pub fn set_setting<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        self.conn().execute(
            "INSERT OR REPLACE INTO settings (key, json) VALUES (?1, ?2)",
            params![key, serde_json::to_string(value)?],
        )?;
        Ok(())
    }

    /// Write a setting only when the key is absent.  Returns `true` when a
    /// value was written.
    pub fn set_setting_if_absent<T: Serialize>(&self, key: &str, value: &T) -> Result<bool> {
        let affected = self.conn().execute(
            "INSERT OR IGNORE INTO settings (key, json) VALUES (?1, ?2)",
            params![key, serde_json::to_string(value)?],
        )?;
        Ok(affected > 0)
    }
}
