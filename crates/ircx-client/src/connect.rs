//! Connect orchestration.
//!
//! Drives a connect attempt end to end: network fallback resolution,
//! identity merge, server selection, the dial through the connection
//! manager, and the success/failure follow-ups (tab bootstrap, reconnect
//! state, user-facing error surface).

use std::sync::{Arc, Mutex};

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use ircx_net::{ConnectionConfig, ConnectionManager};
use ircx_shared::constants::DEFAULT_NETWORK_NAME;
use ircx_shared::network::{IdentityOverrides, NetworkConfig, ProxyConfig};
use ircx_shared::{Message, TabId, TabKind};
use ircx_store::{keys, Database};

use crate::error::Result;
use crate::identity::resolve_identity;
use crate::ports::{Alert, AlertButton, AlertChoice, AlertStyle, ConnectHooks, ErrorReporter, UiPort};
use crate::select::select_server;
use crate::state::TabState;

/// Parameters of one connect call.  Everything is optional; an empty
/// options value means "connect to whatever the stored state suggests".
#[derive(Debug, Clone, Default)]
pub struct ConnectOptions {
    /// Connect to this network instead of resolving one from storage.
    pub network: Option<NetworkConfig>,
    /// Dial this specific server within the network.
    pub server_id: Option<Uuid>,
    /// Desired connection id; defaults to the network's display name.
    pub connect_id: Option<String>,
    /// Identity profile applied over the network's own link.
    pub profile_id: Option<Uuid>,
    /// Per-call identity overrides.
    pub overrides: IdentityOverrides,
    /// Prefer a favorite server over the configured default.
    pub prefer_favorite: bool,
}

/// The long-lived connection orchestrator.  Owns nothing mutable itself;
/// all state lives in the injected collaborators.
pub struct Orchestrator<C: ConnectionManager> {
    db: Arc<Mutex<Database>>,
    manager: Arc<C>,
    state: Arc<Mutex<TabState>>,
    ui: Arc<dyn UiPort>,
    reporter: Arc<dyn ErrorReporter>,
    hooks: Arc<ConnectHooks>,
}

impl<C: ConnectionManager> Orchestrator<C> {
    pub fn new(
        db: Arc<Mutex<Database>>,
        manager: Arc<C>,
        state: Arc<Mutex<TabState>>,
        ui: Arc<dyn UiPort>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        Self {
            db,
            manager,
            state,
            ui,
            reporter,
            hooks: Arc::new(ConnectHooks::new()),
        }
    }

    pub fn hooks(&self) -> &ConnectHooks {
        &self.hooks
    }

    pub fn manager(&self) -> &Arc<C> {
        &self.manager
    }

    pub(crate) fn db(&self) -> &Arc<Mutex<Database>> {
        &self.db
    }

    pub(crate) fn state(&self) -> &Arc<Mutex<TabState>> {
        &self.state
    }

    /// Run one connect attempt.
    ///
    /// Returns the final connection id on success, `None` when the attempt
    /// was aborted through the UI (missing config, user cancel).  Retry
    /// from the failure alert is a fresh pass through the same flow.
    pub async fn connect(&self, opts: ConnectOptions) -> Result<Option<String>> {
        let network = match opts.network.clone() {
            Some(network) => network,
            None => match self.pick_stored_network()? {
                Some(network) => network,
                None => {
                    warn!("no network could be resolved");
                    self.config_alert("No Network", "No network is configured.");
                    return Ok(None);
                }
            },
        };

        let (profiles, default_profile) = {
            let db = self.db.lock().expect("db lock");
            (db.list_profiles()?, db.default_profile()?)
        };
        let resolved = resolve_identity(
            &network,
            &profiles,
            default_profile.as_ref(),
            opts.profile_id,
            &opts.overrides,
        );

        let server = select_server(&resolved, opts.server_id, opts.prefer_favorite);
        if server.host.is_empty() {
            warn!(network = %resolved.name, "selected server has no host");
            self.config_alert("No Server Configured", "The selected network has no usable server.");
            return Ok(None);
        }

        // Reusing an existing server tab's id keeps history attached across
        // reconnects.
        let desired_id = {
            let state = self.state.lock().expect("state lock");
            match state.server_tab(resolved.id) {
                Some(tab) => tab.id.as_str().to_string(),
                None => opts
                    .connect_id
                    .clone()
                    .unwrap_or_else(|| resolved.name.clone()),
            }
        };

        // Network-level proxy beats the global setting.
        let global_proxy: Option<ProxyConfig> = {
            let db = self.db.lock().expect("db lock");
            db.get_setting(keys::GLOBAL_PROXY)?
        };
        let proxy = resolved.proxy.clone().or(global_proxy);

        let config = ConnectionConfig {
            host: server.host.clone(),
            port: server.port,
            nick: resolved.nick.clone(),
            alt_nick: resolved.alt_nick.clone(),
            username: resolved.ident.clone(),
            realname: resolved.realname.clone(),
            password: server.password.clone(),
            tls: server.tls,
            verify_tls: server.verify_tls,
            proxy,
            sasl: resolved.sasl.clone(),
            client_cert: resolved.client_cert.clone(),
        };

        info!(network = %resolved.name, host = %server.host, port = server.port, "connecting");
        debug!(config = ?config, "prepared connection config");

        loop {
            match self.manager.connect(&desired_id, config.clone()).await {
                Ok(final_id) => {
                    info!(connection = %final_id, "connected");
                    self.hooks.notify(&final_id);

                    {
                        let mut state = self.state.lock().expect("state lock");
                        state.set_connected(resolved.id, true);
                    }
                    {
                        let db = self.db.lock().expect("db lock");
                        db.set_setting(keys::SELECTED_NETWORK_NAME, &resolved.name)?;
                        db.set_setting_if_absent(keys::PRIMARY_NETWORK_ID, &resolved.id)?;
                    }

                    self.bootstrap_tabs(&resolved)?;

                    if let Err(e) = self.write_reconnect_state(&resolved, &config) {
                        warn!(error = %e, network = %resolved.name, "failed to persist reconnect state");
                    }

                    {
                        let mut state = self.state.lock().expect("state lock");
                        state.set_active_tab(TabId::server(resolved.id));
                    }

                    return Ok(Some(final_id));
                }
                Err(e) => {
                    let text = format!("Connection failed: {e}");
                    error!(source = "connect", error = %e, network = %resolved.name, "connection failed");
                    self.reporter.report("connect", &e.to_string(), false);

                    {
                        let mut state = self.state.lock().expect("state lock");
                        let tab = state.ensure_server_tab(resolved.id, &resolved.name);
                        tab.messages.push(Message::error(&text));
                    }

                    match self.ui.alert(Alert::connect_failed(&text)) {
                        AlertChoice::Retry => continue,
                        AlertChoice::OpenNetworks => {
                            self.ui.open_network_list();
                            return Ok(None);
                        }
                        _ => return Ok(None),
                    }
                }
            }
        }
    }

    /// Resolve a network when the caller did not name one.
    ///
    /// Zero stored networks get the bundled default created on the fly.
    /// Otherwise: the quick-connect setting, then the bundled name with
    /// servers, then the bundled name at all, then any network with
    /// servers, then the first.
    fn pick_stored_network(&self) -> Result<Option<NetworkConfig>> {
        let (networks, quick) = {
            let db = self.db.lock().expect("db lock");
            let mut networks = db.load_networks()?;
            if networks.is_empty() {
                db.create_default_network()?;
                networks = db.load_networks()?;
            }
            let quick: Option<Uuid> = db.get_setting(keys::QUICK_CONNECT_NETWORK_ID)?;
            (networks, quick)
        };

        if let Some(id) = quick {
            if let Some(network) = networks.iter().find(|n| n.id == id) {
                return Ok(Some(network.clone()));
            }
        }

        let pick = networks
            .iter()
            .find(|n| n.name == DEFAULT_NETWORK_NAME && n.has_servers())
            .or_else(|| networks.iter().find(|n| n.name == DEFAULT_NETWORK_NAME))
            .or_else(|| networks.iter().find(|n| n.has_servers()))
            .or_else(|| networks.first());

        Ok(pick.cloned())
    }

    /// The network behind the currently active session, if any.
    pub(crate) fn active_network(&self) -> Result<Option<NetworkConfig>> {
        let Some(session) = self.manager.active() else {
            return Ok(None);
        };
        let session_id = session.id().to_string();

        let network_id = {
            let state = self.state.lock().expect("state lock");
            state
                .tabs()
                .iter()
                .find(|t| t.kind == TabKind::Server && t.id.as_str() == session_id)
                .map(|t| t.network_id)
        };

        let db = self.db.lock().expect("db lock");
        if let Some(id) = network_id {
            return Ok(db.get_network(id).ok());
        }
        // Sessions connected before any tab existed carry the network name
        // as their id.
        let networks = db.load_networks()?;
        Ok(networks.into_iter().find(|n| n.name == session_id))
    }

    fn config_alert(&self, title: &str, message: &str) {
        let alert = Alert {
            title: title.to_string(),
            message: message.to_string(),
            buttons: vec![
                AlertButton {
                    label: "Open Networks".to_string(),
                    choice: AlertChoice::OpenNetworks,
                    style: AlertStyle::Default,
                },
                AlertButton {
                    label: "Cancel".to_string(),
                    choice: AlertChoice::Cancel,
                    style: AlertStyle::Cancel,
                },
            ],
        };
        if self.ui.alert(alert) == AlertChoice::OpenNetworks {
            self.ui.open_network_list();
        }
    }
}
