//! Auto-reconnect state written after each successful connect.

use tracing::warn;

use ircx_net::{ConnectionConfig, ConnectionManager};
use ircx_shared::network::NetworkConfig;
use ircx_shared::reconnect::{AutoReconnectConfig, ConnectionSnapshot};
use ircx_store::keys;

use crate::connect::Orchestrator;
use crate::error::Result;

impl<C: ConnectionManager> Orchestrator<C> {
    /// Persist the channel set and identity needed to rejoin after a drop,
    /// and lazily create the network's reconnect policy.
    ///
    /// The channel set is the network's favorites (only when the global
    /// auto-join-favorites setting is on) unioned with its explicit
    /// auto-join list, deduplicated by exact name.  An existing policy is
    /// never overwritten.
    pub(crate) fn write_reconnect_state(
        &self,
        network: &NetworkConfig,
        config: &ConnectionConfig,
    ) -> Result<()> {
        let db = self.db().lock().expect("db lock");

        let favorites_enabled: bool = db
            .get_setting(keys::AUTO_JOIN_FAVORITES)?
            .unwrap_or(false);

        let mut channels = if favorites_enabled {
            match db.favorites_for_network(network.id) {
                Ok(favorites) => favorites,
                Err(e) => {
                    warn!(error = %e, network = %network.name, "could not load favorites");
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        for channel in &network.auto_join_channels {
            if !channels.contains(channel) {
                channels.push(channel.clone());
            }
        }

        db.save_connection_snapshot(&ConnectionSnapshot {
            network_id: network.id,
            host: config.host.clone(),
            channels,
            nick: config.nick.clone(),
        })?;

        if db.reconnect_config(network.id)?.is_none() {
            db.set_reconnect_config(network.id, &AutoReconnectConfig::default())?;
        }

        Ok(())
    }
}
