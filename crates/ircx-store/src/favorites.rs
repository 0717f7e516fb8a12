//! Per-network channel favorites.

use rusqlite::params;
use uuid::Uuid;

use crate::database::Database;
use crate::error::Result;

impl Database {
    /// Favorite channels of a network, ordered by name.
    pub fn favorites_for_network(&self, network_id: Uuid) -> Result<Vec<String>> {
        let mut stmt = self.conn().prepare(
            "SELECT channel FROM favorites WHERE network_id = ?1 ORDER BY channel ASC",
        )?;

        let rows = stmt.query_map(params![network_id.to_string()], |row| {
            row.get::<_, String>(0)
        })?;

        let mut channels = Vec::new();
        for row in rows {
            channels.push(row?);
        }
        Ok(channels)
    }

    /// Mark a channel as favorite.  Adding twice is a no-op.
    pub fn add_favorite(&self, network_id: Uuid, channel: &str) -> Result<()> {
        self.conn().execute(
            "INSERT OR IGNORE INTO favorites (network_id, channel) VALUES (?1, ?2)",
            params![network_id.to_string(), channel],
        )?;
        Ok(())
    }

    /// Remove a favorite.  Returns `true` if a row was deleted.
    pub fn remove_favorite(&self, network_id: Uuid, channel: &str) -> Result<bool> {
        let affected = self.conn().execute(
            "DELETE FROM favorites WHERE network_id = ?1 AND channel = ?2",
            params![network_id.to_string(), channel],
        )?;
        Ok(affected > 0)
    }
}
