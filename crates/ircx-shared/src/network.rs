//! Network, server and identity configuration as edited by the user and
//! persisted by the store.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT};

/// A named IRC server group with identity defaults and candidate endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkConfig {
    pub id: Uuid,
    pub name: String,
    /// Identity defaults. Empty string means "not set"; the identity
    /// resolver substitutes the bundled defaults.
    pub nick: String,
    pub alt_nick: String,
    pub realname: String,
    pub ident: String,
    pub servers: Vec<ServerConfig>,
    pub default_server_id: Option<Uuid>,
    pub proxy: Option<ProxyConfig>,
    pub client_cert: Option<ClientCert>,
    pub auto_join_channels: Vec<String>,
    /// Linked identity profile, if any.
    pub identity_profile_id: Option<Uuid>,
    pub sasl: Option<SaslConfig>,
    pub nickserv_password: Option<String>,
    pub oper: Option<OperCredentials>,
}

impl NetworkConfig {
    /// A bare network with no servers and no identity overrides.
    pub fn named(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            nick: String::new(),
            alt_nick: String::new(),
            realname: String::new(),
            ident: String::new(),
            servers: Vec::new(),
            default_server_id: None,
            proxy: None,
            client_cert: None,
            auto_join_channels: Vec::new(),
            identity_profile_id: None,
            sasl: None,
            nickserv_password: None,
            oper: None,
        }
    }

    pub fn has_servers(&self) -> bool {
        !self.servers.is_empty()
    }
}

/// One dialable endpoint within a network.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    pub id: Uuid,
    pub host: String,
    pub port: u16,
    pub tls: bool,
    /// Whether to reject invalid certificates.
    pub verify_tls: bool,
    pub password: Option<String>,
    pub favorite: bool,
}

impl ServerConfig {
    pub fn new(host: &str, port: u16, tls: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            host: host.to_string(),
            port,
            tls,
            verify_tls: true,
            password: None,
            favorite: false,
        }
    }

    /// The bundled last-resort endpoint used when a network has no servers.
    pub fn fallback() -> Self {
        Self::new(DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, true)
    }
}

/// A reusable identity bundle independent of any network. Empty string
/// fields are treated as unset and never override network values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct IdentityProfile {
    pub id: Uuid,
    pub name: String,
    pub nick: String,
    pub alt_nick: String,
    pub realname: String,
    pub ident: String,
    pub sasl_account: String,
    pub sasl_password: String,
    pub nickserv_password: String,
    pub oper_user: String,
    pub oper_password: String,
}

/// Caller-supplied identity overrides applied on top of network and profile
/// values. `name`/`email` compose into the realname.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdentityOverrides {
    pub nick: Option<String>,
    pub alt_nick: Option<String>,
    pub ident: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientCert {
    pub cert_pem: String,
    pub key_pem: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SaslConfig {
    pub account: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OperCredentials {
    pub user: String,
    pub password: String,
}
