//! Tab and history bootstrap after a successful connect.

use tracing::debug;

use ircx_net::ConnectionManager;
use ircx_shared::constants::SCROLLBACK_LINES;
use ircx_shared::network::NetworkConfig;
use ircx_shared::{Tab, TabKind};
use ircx_store::TabRecord;

use crate::connect::Orchestrator;
use crate::error::Result;

impl<C: ConnectionManager> Orchestrator<C> {
    /// Load the network's persisted tabs, guarantee exactly one server tab,
    /// preload the server tab's scrollback, and merge the set into the live
    /// state, replacing whatever tabs the network had before.
    ///
    /// Non-server tabs come back with empty message lists; their history is
    /// lazy-loaded on first activation.  A scrollback load failure never
    /// fails the connect.
    pub(crate) fn bootstrap_tabs(&self, network: &NetworkConfig) -> Result<()> {
        let mut tabs = {
            let db = self.db().lock().expect("db lock");
            let records = db.tabs_for_network(network.id)?;
            records
                .into_iter()
                .map(TabRecord::into_tab)
                .collect::<Vec<Tab>>()
        };

        // Exactly one server tab: drop extras, synthesize if absent.
        let mut seen_server = false;
        tabs.retain(|t| {
            if t.kind != TabKind::Server {
                return true;
            }
            let keep = !seen_server;
            seen_server = true;
            keep
        });
        if !seen_server {
            tabs.insert(0, Tab::server(network.id, &network.name));
        }

        {
            let db = self.db().lock().expect("db lock");
            match db.recent_messages(network.id, "", SCROLLBACK_LINES) {
                Ok(history) => {
                    if let Some(server_tab) = tabs.iter_mut().find(|t| t.kind == TabKind::Server) {
                        server_tab.messages = history;
                    }
                }
                Err(e) => {
                    debug!(error = %e, network = %network.name, "server tab scrollback unavailable");
                }
            }
        }

        let mut state = self.state().lock().expect("state lock");
        state.replace_network_tabs(network.id, tabs);
        Ok(())
    }
}
