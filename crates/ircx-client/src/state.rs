//! Live tab state.
//!
//! The tab list is the single shared mutable resource of the core.  It is
//! only ever mutated through the batching router's flush and the
//! bootstrapper's merge, both of which take the state lock for the whole
//! transition, so the UI observes one state change per batch.

use std::collections::HashSet;

use uuid::Uuid;

use ircx_shared::{Tab, TabId, TabKind};

/// The live tab list plus the pieces of UI state the core owns.
#[derive(Default)]
pub struct TabState {
    tabs: Vec<Tab>,
    active_tab_id: Option<TabId>,
    connected_networks: HashSet<Uuid>,
}

impl TabState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    pub fn tab(&self, id: &TabId) -> Option<&Tab> {
        self.tabs.iter().find(|t| &t.id == id)
    }

    pub fn tab_mut(&mut self, id: &TabId) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|t| &t.id == id)
    }

    pub fn index_of(&self, id: &TabId) -> Option<usize> {
        self.tabs.iter().position(|t| &t.id == id)
    }

    /// Case-insensitive fallback lookup by (kind, network, name).  Recovers
    /// from id-casing mismatches between the wire protocol and stored tabs.
    pub fn index_of_loose(&self, kind: TabKind, network_id: Uuid, name: &str) -> Option<usize> {
        self.tabs.iter().position(|t| {
            t.kind == kind && t.network_id == network_id && t.name.eq_ignore_ascii_case(name)
        })
    }

    pub fn tab_at_mut(&mut self, index: usize) -> &mut Tab {
        &mut self.tabs[index]
    }

    pub fn server_tab(&self, network_id: Uuid) -> Option<&Tab> {
        self.tabs
            .iter()
            .find(|t| t.kind == TabKind::Server && t.network_id == network_id)
    }

    /// Get or create the single server tab of a network.
    pub fn ensure_server_tab(&mut self, network_id: Uuid, network_name: &str) -> &mut Tab {
        if let Some(index) = self
            .tabs
            .iter()
            .position(|t| t.kind == TabKind::Server && t.network_id == network_id)
        {
            return &mut self.tabs[index];
        }
        self.tabs.push(Tab::server(network_id, network_name));
        self.tabs.last_mut().expect("just pushed")
    }

    pub fn push_tab(&mut self, tab: Tab) {
        self.tabs.push(tab);
    }

    /// Replace every live tab of a network with the given set, leaving tabs
    /// of other networks untouched.
    pub fn replace_network_tabs(&mut self, network_id: Uuid, tabs: Vec<Tab>) {
        self.tabs.retain(|t| t.network_id != network_id);
        self.tabs.extend(tabs);
        self.sort_grouped();
    }

    pub fn active_tab_id(&self) -> Option<&TabId> {
        self.active_tab_id.as_ref()
    }

    pub fn set_active_tab(&mut self, id: TabId) {
        if let Some(tab) = self.tab_mut(&id) {
            tab.has_activity = false;
        }
        self.active_tab_id = Some(id);
    }

    pub fn set_connected(&mut self, network_id: Uuid, connected: bool) {
        if connected {
            self.connected_networks.insert(network_id);
        } else {
            self.connected_networks.remove(&network_id);
        }
    }

    pub fn is_connected(&self, network_id: Uuid) -> bool {
        self.connected_networks.contains(&network_id)
    }

    /// Grouped ordering: network, then server log before channels before
    /// queries, then case-insensitive name.
    pub fn sort_grouped(&mut self) {
        self.tabs.sort_by(|a, b| {
            a.network_id
                .cmp(&b.network_id)
                .then(a.kind.rank().cmp(&b.kind.rank()))
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_server_tab_is_idempotent() {
        let mut state = TabState::new();
        let net = Uuid::new_v4();

        state.ensure_server_tab(net, "libera");
        state.ensure_server_tab(net, "libera");
        assert_eq!(state.tab_count(), 1);
        assert!(state.server_tab(net).is_some());
    }

    #[test]
    fn replace_leaves_other_networks_alone() {
        let mut state = TabState::new();
        let net_a = Uuid::new_v4();
        let net_b = Uuid::new_v4();

        state.push_tab(Tab::server(net_a, "a"));
        state.push_tab(Tab::new(TabKind::Channel, net_a, "#old"));
        state.push_tab(Tab::server(net_b, "b"));

        state.replace_network_tabs(
            net_a,
            vec![Tab::server(net_a, "a"), Tab::new(TabKind::Channel, net_a, "#new")],
        );

        assert_eq!(state.tab_count(), 3);
        assert!(state.index_of(&TabId::named(TabKind::Channel, net_a, "#old")).is_none());
        assert!(state.index_of(&TabId::named(TabKind::Channel, net_a, "#new")).is_some());
        assert!(state.server_tab(net_b).is_some());
    }

    #[test]
    fn loose_lookup_ignores_case() {
        let mut state = TabState::new();
        let net = Uuid::new_v4();
        state.push_tab(Tab::new(TabKind::Channel, net, "#Rust"));

        assert!(state.index_of_loose(TabKind::Channel, net, "#rust").is_some());
        assert!(state.index_of_loose(TabKind::Query, net, "#rust").is_none());
    }

    #[test]
    fn activating_a_tab_clears_its_activity() {
        let mut state = TabState::new();
        let net = Uuid::new_v4();
        let mut tab = Tab::new(TabKind::Channel, net, "#rust");
        tab.has_activity = true;
        let id = tab.id.clone();
        state.push_tab(tab);

        state.set_active_tab(id.clone());
        assert!(!state.tab(&id).unwrap().has_activity);
        assert_eq!(state.active_tab_id(), Some(&id));
    }

    #[test]
    fn grouped_sort_orders_kinds_within_network() {
        let mut state = TabState::new();
        let net = Uuid::new_v4();
        state.push_tab(Tab::new(TabKind::Query, net, "alice"));
        state.push_tab(Tab::new(TabKind::Channel, net, "#zeta"));
        state.push_tab(Tab::server(net, "libera"));
        state.push_tab(Tab::new(TabKind::Channel, net, "#Alpha"));

        state.sort_grouped();
        let kinds: Vec<TabKind> = state.tabs().iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![TabKind::Server, TabKind::Channel, TabKind::Channel, TabKind::Query]
        );
        assert_eq!(state.tabs()[1].name, "#Alpha");
    }
}
