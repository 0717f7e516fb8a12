//! Auto-reconnect policy and connection snapshots.

use rusqlite::params;
use uuid::Uuid;

use crate::database::Database;
use crate::error::Result;

use ircx_shared::reconnect::{AutoReconnectConfig, ConnectionSnapshot};

impl Database {
    /// The stored reconnect policy for a network, if any.
    pub fn reconnect_config(&self, network_id: Uuid) -> Result<Option<AutoReconnectConfig>> {
        let json: Option<String> = self
            .conn()
            .query_row(
                "SELECT json FROM reconnect_configs WHERE network_id = ?1",
                params![network_id.to_string()],
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

    /// Write a reconnect policy for a network.
    pub fn set_reconnect_config(
        &self,
        network_id: Uuid,
        config: &AutoReconnectConfig,
    ) -> Result<()> {
        self.conn().execute(
            "INSERT OR REPLACE INTO reconnect_configs (network_id, json) VALUES (?1, ?2)",
            params![network_id.to_string(), serde_json::to_string(config)?],
        )?;
        Ok(())
    }

    /// Persist the state needed to restore a connection after a drop.
    pub fn save_connection_snapshot(&self, snapshot: &ConnectionSnapshot) -> Result<()> {
        self.conn().execute(
            "INSERT OR REPLACE INTO connection_snapshots (network_id, json) VALUES (?1, ?2)",
            params![
                snapshot.network_id.to_string(),
                serde_json::to_string(snapshot)?,
            ],
        )?;
        Ok(())
    }

    /// The last persisted snapshot for a network, if any.
    pub fn connection_snapshot(&self, network_id: Uuid) -> Result<Option<ConnectionSnapshot>> {
        let json: Option<String> = self
            .conn()
            .query_row(
                "SELECT json FROM connection_snapshots WHERE network_id = ?1",
                params![network_id.to_string()],
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
}
