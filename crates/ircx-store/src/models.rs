//! Persistence-side models.
//!
//! Tabs are persisted in reduced form: identity and shape only, never the
//! message bodies (those live in the `messages` table and are lazy-loaded).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use ircx_shared::{Tab, TabId, TabKind};

/// The reduced, persisted form of a [`Tab`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TabRecord {
    pub id: TabId,
    pub network_id: Uuid,
    pub kind: TabKind,
    pub name: String,
    pub encrypted: bool,
}

impl From<&Tab> for TabRecord {
    fn from(tab: &Tab) -> Self {
        Self {
            id: tab.id.clone(),
            network_id: tab.network_id,
            kind: tab.kind,
            name: tab.name.clone(),
            encrypted: tab.encrypted,
        }
    }
}

impl TabRecord {
    /// Rehydrate into a live tab with an empty message list.
    pub fn into_tab(self) -> Tab {
        Tab {
            id: self.id,
            kind: self.kind,
            network_id: self.network_id,
            name: self.name,
            messages: Vec::new(),
            has_activity: false,
            encrypted: self.encrypted,
        }
    }
}
