//! Messages, tabs and the routing context that accompanies every incoming
//! protocol event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{NetworkRef, TabId, TabKind};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Privmsg,
    Notice,
    /// Client-generated status lines (connect notices, separators).
    System,
    Error,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageFlags {
    /// Loaded from local history rather than received live.
    pub scrollback: bool,
    /// Server-side playback (e.g. a bouncer replay).
    pub playback: bool,
    /// Raw protocol line surfaced verbatim.
    pub raw: bool,
}

/// A single protocol event. Immutable once created; tabs only append and
/// trim, never edit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// IRCv3 `msgid` when the server provided one; the preferred dedup key.
    pub id: Option<String>,
    pub sender: String,
    pub text: String,
    /// Channel or nick the event was addressed to.
    pub target: String,
    pub timestamp: DateTime<Utc>,
    pub kind: MessageKind,
    pub flags: MessageFlags,
}

impl Message {
    pub fn new(sender: &str, text: &str, target: &str, kind: MessageKind) -> Self {
        Self {
            id: None,
            sender: sender.to_string(),
            text: text.to_string(),
            target: target.to_string(),
            timestamp: Utc::now(),
            kind,
            flags: MessageFlags::default(),
        }
    }

    /// A client-generated status line for a server tab.
    pub fn system(text: &str) -> Self {
        Self::new("*", text, "", MessageKind::System)
    }

    pub fn error(text: &str) -> Self {
        Self::new("*", text, "", MessageKind::Error)
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    /// True for messages that should be written to history storage.
    pub fn is_persistable(&self) -> bool {
        !self.flags.scrollback && !self.flags.playback && !self.flags.raw
    }
}

/// A conversation surface: server log, channel, or private query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tab {
    pub id: TabId,
    pub kind: TabKind,
    pub network_id: Uuid,
    pub name: String,
    pub messages: Vec<Message>,
    pub has_activity: bool,
    pub encrypted: bool,
}

impl Tab {
    pub fn new(kind: TabKind, network_id: Uuid, name: &str) -> Self {
        Self {
            id: TabId::named(kind, network_id, name),
            kind,
            network_id,
            name: name.to_string(),
            messages: Vec::new(),
            has_activity: false,
            encrypted: false,
        }
    }

    /// The server log tab of a network, named after the network itself.
    pub fn server(network_id: Uuid, network_name: &str) -> Self {
        let mut tab = Self::new(TabKind::Server, network_id, network_name);
        tab.id = TabId::server(network_id);
        tab
    }
}

/// Where an incoming message should land.
///
/// Constructed only through the typed builders below so the tab id, kind,
/// target name and network can never disagree with each other.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingContext {
    target_tab_id: TabId,
    target_kind: TabKind,
    /// Original-cased channel/nick name; the network name for server tabs.
    target_name: String,
    network_id: Uuid,
    network: Option<NetworkRef>,
    encrypted: bool,
}

impl RoutingContext {
    pub fn for_server(network: NetworkRef) -> Self {
        Self {
            target_tab_id: TabId::server(network.id),
            target_kind: TabKind::Server,
            target_name: network.name.clone(),
            network_id: network.id,
            network: Some(network),
            encrypted: false,
        }
    }

    pub fn for_channel(network: NetworkRef, channel: &str) -> Self {
        Self {
            target_tab_id: TabId::named(TabKind::Channel, network.id, channel),
            target_kind: TabKind::Channel,
            target_name: channel.to_string(),
            network_id: network.id,
            network: Some(network),
            encrypted: false,
        }
    }

    pub fn for_query(network: NetworkRef, nick: &str) -> Self {
        Self {
            target_tab_id: TabId::named(TabKind::Query, network.id, nick),
            target_kind: TabKind::Query,
            target_name: nick.to_string(),
            network_id: network.id,
            network: Some(network),
            encrypted: false,
        }
    }

    /// A context whose network could not be resolved. Routable only to an
    /// already existing tab; the router never creates tabs for it.
    pub fn detached(kind: TabKind, network_id: Uuid, target: &str) -> Self {
        Self {
            target_tab_id: TabId::named(kind, network_id, target),
            target_kind: kind,
            target_name: target.to_string(),
            network_id,
            network: None,
            encrypted: false,
        }
    }

    pub fn encrypted(mut self) -> Self {
        self.encrypted = true;
        self
    }

    pub fn target_tab_id(&self) -> &TabId {
        &self.target_tab_id
    }

    pub fn target_kind(&self) -> TabKind {
        self.target_kind
    }

    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    pub fn network_id(&self) -> Uuid {
        self.network_id
    }

    pub fn network(&self) -> Option<&NetworkRef> {
        self.network.as_ref()
    }

    pub fn has_valid_network(&self) -> bool {
        self.network.is_some()
    }

    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routing_context_keeps_id_and_kind_consistent() {
        let net = NetworkRef {
            id: Uuid::new_v4(),
            name: "libera".into(),
        };
        let ctx = RoutingContext::for_channel(net.clone(), "#Rust");
        assert_eq!(ctx.target_kind(), TabKind::Channel);
        assert_eq!(
            ctx.target_tab_id(),
            &TabId::named(TabKind::Channel, net.id, "#rust")
        );
        assert!(ctx.has_valid_network());
    }

    #[test]
    fn detached_context_has_no_network() {
        let ctx = RoutingContext::detached(TabKind::Query, Uuid::new_v4(), "alice");
        assert!(!ctx.has_valid_network());
    }

    #[test]
    fn scrollback_messages_are_not_persistable() {
        let mut msg = Message::new("alice", "hi", "#rust", MessageKind::Privmsg);
        assert!(msg.is_persistable());
        msg.flags.scrollback = true;
        assert!(!msg.is_persistable());
    }
}
