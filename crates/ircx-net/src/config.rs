//! The flattened dial parameters handed to a session.
//!
//! A [`ConnectionConfig`] is built per connect attempt and never persisted.
//! Its `Debug` impl masks every credential so the config can be logged
//! as-is at any call site.

use ircx_shared::network::{ClientCert, ProxyConfig, SaslConfig};

/// Everything a session needs to dial and register.
#[derive(Clone)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub nick: String,
    pub alt_nick: String,
    pub username: String,
    pub realname: String,
    pub password: Option<String>,
    pub tls: bool,
    pub verify_tls: bool,
    pub proxy: Option<ProxyConfig>,
    pub sasl: Option<SaslConfig>,
    pub client_cert: Option<ClientCert>,
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("nick", &self.nick)
            .field("alt_nick", &self.alt_nick)
            .field("username", &self.username)
            .field("realname", &self.realname)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("tls", &self.tls)
            .field("verify_tls", &self.verify_tls)
            .field("proxy", &self.proxy.as_ref().map(|p| redacted_proxy(p)))
            .field("sasl", &self.sasl.as_ref().map(|s| format!("{}:<redacted>", s.account)))
            .field("client_cert", &self.client_cert.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn redacted_proxy(proxy: &ProxyConfig) -> String {
    match &proxy.username {
        Some(user) => format!("{}@{}:{}", user, proxy.host, proxy.port),
        None => format!("{}:{}", proxy.host, proxy.port),
    }
}
