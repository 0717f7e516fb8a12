//! # ircx-shared
//!
//! Domain types shared by every IRCX crate: network and identity
//! configuration, tabs and messages, routing contexts, reconnect policy,
//! and the protocol-wide constants.

pub mod constants;
pub mod message;
pub mod network;
pub mod reconnect;
pub mod types;

pub use message::{Message, MessageFlags, MessageKind, RoutingContext, Tab};
pub use network::{
    ClientCert, IdentityOverrides, IdentityProfile, NetworkConfig, OperCredentials, ProxyConfig,
    SaslConfig, ServerConfig,
};
pub use reconnect::{AutoReconnectConfig, ConnectionSnapshot};
pub use types::{NetworkRef, TabId, TabKind};
