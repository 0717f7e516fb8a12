//! The `/server` command flow.
//!
//! Works from already-tokenized command arguments against the currently
//! active session and the stored network list.  Every failure in here is
//! surfaced as an inline message on the active session rather than thrown.

use std::time::Duration;

use chrono::Utc;
use tracing::{error, warn};

use ircx_net::{ConnectionManager, SessionCommand};
use ircx_shared::constants::{
    DEFAULT_IRC_PORT, DEFAULT_IRC_TLS_PORT, QUIT_GRACE_MS, REGISTRATION_TIMEOUT_SECS,
};
use ircx_shared::network::{NetworkConfig, SaslConfig, ServerConfig};
use ircx_shared::{Message, TabKind};

use crate::connect::{ConnectOptions, Orchestrator};
use crate::error::{ClientError, Result};

/// Tokenized `/server` arguments.
#[derive(Debug, Clone, Default)]
pub struct ServerCommandArgs {
    /// Hostname, or the name of a stored network.
    pub address: Option<String>,
    pub port: Option<u16>,
    /// Dial the n-th server of the currently active network instead.
    pub server_index: Option<usize>,
    pub ssl: bool,
    pub starttls: bool,
    /// Keep the current session and open the target in a new window.
    pub new_window: bool,
    /// Persist the target network without dialing it.
    pub new_window_no_connect: bool,
    pub password: Option<String>,
    /// Name of a stored identity profile to apply.
    pub identity: Option<String>,
    /// SASL account applied inline (paired with `password`).
    pub login: Option<String>,
    pub join_channels: Vec<String>,
}

impl<C: ConnectionManager> Orchestrator<C> {
    /// Run a `/server` command.  Never returns an error to the caller; all
    /// failures land as inline messages on the active session.
    pub async fn handle_server_connect(&self, args: ServerCommandArgs) {
        if let Err(e) = self.server_connect_inner(args).await {
            error!(source = "server_command", error = %e, "/server failed");
            self.append_inline(Message::error(&format!("/server: {e}")));
        }
    }

    async fn server_connect_inner(&self, args: ServerCommandArgs) -> Result<Option<String>> {
        let active = self.manager().active();
        let keep_current = args.new_window || args.new_window_no_connect;

        // Leave the current session cleanly unless it is being kept for a
        // new window.
        if let Some(ref session) = active {
            if !(keep_current && session.is_registered()) {
                let _ = session
                    .send(SessionCommand::Quit(Some("Changing servers".into())))
                    .await;
                tokio::time::sleep(Duration::from_millis(QUIT_GRACE_MS)).await;
            }
        }

        let (mut network, server_id) = self.resolve_target(&args)?;

        // Inline identity/SASL overrides.
        if let Some(ref identity) = args.identity {
            let profiles = {
                let db = self.db().lock().expect("db lock");
                db.list_profiles()?
            };
            match profiles
                .iter()
                .find(|p| p.name.eq_ignore_ascii_case(identity))
            {
                Some(profile) => network.identity_profile_id = Some(profile.id),
                None => warn!(identity = %identity, "no such identity profile"),
            }
        }
        if let Some(ref login) = args.login {
            network.sasl = Some(SaslConfig {
                account: login.clone(),
                password: args.password.clone().unwrap_or_default(),
            });
        }

        if args.new_window_no_connect {
            {
                let db = self.db().lock().expect("db lock");
                if db.get_network(network.id).is_err() {
                    db.add_network(&network)?;
                }
            }
            self.append_inline(Message::system(&format!(
                "Network '{}' saved. Use /server {} to connect.",
                network.name,
                args.address.as_deref().unwrap_or(&network.name),
            )));
            return Ok(None);
        }

        // Subscribe before connecting so a session created under a fresh id
        // cannot slip past us.
        let mut created_rx = self.manager().subscribe_created();

        let final_id = self
            .connect(ConnectOptions {
                network: Some(network),
                server_id: Some(server_id),
                ..ConnectOptions::default()
            })
            .await?;
        let Some(final_id) = final_id else {
            return Ok(None);
        };

        if args.join_channels.is_empty() {
            return Ok(Some(final_id));
        }

        let session = match self.manager().get(&final_id) {
            Some(session) => Some(session),
            None => {
                tokio::time::timeout(Duration::from_secs(REGISTRATION_TIMEOUT_SECS), async {
                    loop {
                        match created_rx.recv().await {
                            Ok(id) if id == final_id => break self.manager().get(&final_id),
                            Ok(_) => continue,
                            Err(_) => break None,
                        }
                    }
                })
                .await
                .ok()
                .flatten()
            }
        };
        let Some(session) = session else {
            warn!(connection = %final_id, "connected session not found, skipping joins");
            return Ok(Some(final_id));
        };

        if session.is_registered() {
            for channel in &args.join_channels {
                let _ = session.send(SessionCommand::Join(channel.clone())).await;
            }
        } else {
            // Join once the registration numeric arrives.
            let channels = args.join_channels.clone();
            tokio::spawn(async move {
                match session
                    .wait_registered(Duration::from_secs(REGISTRATION_TIMEOUT_SECS))
                    .await
                {
                    Ok(()) => {
                        for channel in &channels {
                            let _ = session.send(SessionCommand::Join(channel.clone())).await;
                        }
                    }
                    Err(e) => {
                        warn!(session = session.id(), error = %e, "never registered, skipping joins");
                    }
                }
            });
        }

        Ok(Some(final_id))
    }

    /// Resolve the command's target network and the server to dial within
    /// it, creating or updating server entries from the arguments.
    fn resolve_target(&self, args: &ServerCommandArgs) -> Result<(NetworkConfig, uuid::Uuid)> {
        if let Some(index) = args.server_index {
            let Some(mut network) = self.active_network()? else {
                return Err(ClientError::Command(
                    "no active network to index into".into(),
                ));
            };
            let Some(server) = network.servers.get_mut(index) else {
                return Err(ClientError::Command(format!(
                    "network '{}' has no server #{index}",
                    network.name
                )));
            };
            apply_server_args(server, args);
            let server_id = server.id;

            let db = self.db().lock().expect("db lock");
            if let Err(e) = db.update_network(&network) {
                warn!(error = %e, network = %network.name, "could not persist server update");
            }
            return Ok((network, server_id));
        }

        let Some(ref address) = args.address else {
            return Err(ClientError::Command("no address or server index given".into()));
        };

        let stored = {
            let db = self.db().lock().expect("db lock");
            db.load_networks()?
        };
        let matching = stored.into_iter().find(|n| {
            n.name.eq_ignore_ascii_case(address)
                || n.servers.iter().any(|s| s.host.eq_ignore_ascii_case(address))
        });

        match matching {
            Some(mut network) if !args.new_window => {
                // Update (or add) the endpoint matching the address.
                let server_id = match network
                    .servers
                    .iter_mut()
                    .find(|s| s.host.eq_ignore_ascii_case(address))
                {
                    Some(server) => {
                        apply_server_args(server, args);
                        server.id
                    }
                    None => {
                        let server = synthesized_server(address, args);
                        let id = server.id;
                        network.servers.push(server);
                        id
                    }
                };

                let db = self.db().lock().expect("db lock");
                if let Err(e) = db.update_network(&network) {
                    warn!(error = %e, network = %network.name, "could not persist server update");
                }
                Ok((network, server_id))
            }
            matching => {
                // Temporary network.  A forced new window gets a unique
                // suffix so it never collides with the stored entry.
                let name = if args.new_window && matching.is_some() {
                    format!("{address} ({})", Utc::now().timestamp())
                } else {
                    address.clone()
                };
                let mut network = NetworkConfig::named(&name);
                let server = synthesized_server(address, args);
                let server_id = server.id;
                network.servers.push(server);
                Ok((network, server_id))
            }
        }
    }

    /// Append an inline message to the active session's server tab.
    fn append_inline(&self, message: Message) {
        let Some(session) = self.manager().active() else {
            warn!(text = %message.text, "no active session for inline message");
            return;
        };
        let session_id = session.id().to_string();

        let mut state = self.state().lock().expect("state lock");
        let index = state
            .tabs()
            .iter()
            .position(|t| t.kind == TabKind::Server && t.id.as_str() == session_id)
            .or_else(|| {
                state
                    .tabs()
                    .iter()
                    .position(|t| t.kind == TabKind::Server)
            });
        match index {
            Some(index) => state.tab_at_mut(index).messages.push(message),
            None => warn!(text = %message.text, "no server tab for inline message"),
        }
    }
}

fn apply_server_args(server: &mut ServerConfig, args: &ServerCommandArgs) {
    if let Some(port) = args.port {
        server.port = port;
    }
    if args.ssl || args.starttls {
        server.tls = true;
    }
    if let Some(ref password) = args.password {
        server.password = Some(password.clone());
    }
}

fn synthesized_server(address: &str, args: &ServerCommandArgs) -> ServerConfig {
    let tls = args.ssl || args.starttls;
    let port = args.port.unwrap_or(if tls {
        DEFAULT_IRC_TLS_PORT
    } else {
        DEFAULT_IRC_PORT
    });
    let mut server = ServerConfig::new(address, port, tls);
    server.password = args.password.clone();
    server
}
