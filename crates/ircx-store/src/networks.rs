//! CRUD operations for [`NetworkConfig`] records.
//!
//! The full config is stored as a JSON column; the name is duplicated into
//! its own column so lookups do not need to parse every row.

use rusqlite::params;
use uuid::Uuid;

use crate::database::Database;
use crate::error::{Result, StoreError};

use ircx_shared::constants::DEFAULT_NETWORK_NAME;
use ircx_shared::network::{NetworkConfig, ServerConfig};

impl Database {
    /// Insert a new network.
    pub fn add_network(&self, network: &NetworkConfig) -> Result<()> {
        self.conn().execute(
            "INSERT INTO networks (id, name, json) VALUES (?1, ?2, ?3)",
            params![
                network.id.to_string(),
                network.name,
                serde_json::to_string(network)?,
            ],
        )?;
        Ok(())
    }

    /// Replace an existing network's stored config.
    pub fn update_network(&self, network: &NetworkConfig) -> Result<()> {
        let affected = self.conn().execute(
            "UPDATE networks SET name = ?2, json = ?3 WHERE id = ?1",
            params![
                network.id.to_string(),
                network.name,
                serde_json::to_string(network)?,
            ],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    /// Fetch a single network by id.
    pub fn get_network(&self, id: Uuid) -> Result<NetworkConfig> {
        let json: String = self
            .conn()
            .query_row(
                "SELECT json FROM networks WHERE id = ?1",
                params![id.to_string()],
                |row| row.get(0),
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Load all stored networks, ordered by name.
    pub fn load_networks(&self) -> Result<Vec<NetworkConfig>> {
        let mut stmt = self
            .conn()
            .prepare("SELECT json FROM networks ORDER BY name ASC")?;

        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut networks = Vec::new();
        for row in rows {
            networks.push(serde_json::from_str(&row?)?);
        }
        Ok(networks)
    }

    /// Delete a network by id.  Returns `true` if a row was deleted.
    pub fn delete_network(&self, id: Uuid) -> Result<bool> {
        let affected = self.conn().execute(
            "DELETE FROM networks WHERE id = ?1",
            params![id.to_string()],
        )?;
        Ok(affected > 0)
    }

    /// Create and persist the bundled default network: one TLS endpoint,
    /// no identity overrides.
    pub fn create_default_network(&self) -> Result<NetworkConfig> {
        let mut network = NetworkConfig::named(DEFAULT_NETWORK_NAME);
        network.servers.push(ServerConfig::fallback());

        tracing::info!(network = %network.name, "creating default network");
        self.add_network(&network)?;
        Ok(network)
    }
}
