use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What kind of conversation a tab holds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TabKind {
    Server,
    Channel,
    Query,
}

impl TabKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TabKind::Server => "server",
            TabKind::Channel => "channel",
            TabKind::Query => "query",
        }
    }

    /// Sort rank within a network group: server log first, then channels,
    /// then queries.
    pub fn rank(&self) -> u8 {
        match self {
            TabKind::Server => 0,
            TabKind::Channel => 1,
            TabKind::Query => 2,
        }
    }
}

impl std::fmt::Display for TabKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable tab identifier: `{kind}:{network}` for server tabs,
/// `{kind}:{network}:{name-lowercased}` otherwise.
///
/// The name segment is lowercased so the id survives casing differences
/// between the wire protocol and stored state; the tab keeps the original
/// casing in its `name` field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TabId(String);

impl TabId {
    /// The single server tab of a network.
    pub fn server(network_id: Uuid) -> Self {
        Self(format!("server:{network_id}"))
    }

    /// A channel or query tab.
    pub fn named(kind: TabKind, network_id: Uuid, name: &str) -> Self {
        match kind {
            TabKind::Server => Self::server(network_id),
            _ => Self(format!("{}:{}:{}", kind.as_str(), network_id, name.to_lowercase())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TabId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Minimal handle on a network carried alongside routed messages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NetworkRef {
    pub id: Uuid,
    pub name: String,
}
