//! Server selection within a resolved network.

use tracing::warn;
use uuid::Uuid;

use ircx_shared::network::{NetworkConfig, ServerConfig};

/// Pick exactly one endpoint to dial.
///
/// Priority: explicit id, then (when preferred) the first favorite, then
/// the network's default server, then the first entry, then the bundled
/// fallback endpoint for an empty list.  The result is deterministic and
/// independent of list order for the favorite and default cases.
pub fn select_server(
    network: &NetworkConfig,
    server_id: Option<Uuid>,
    prefer_favorite: bool,
) -> ServerConfig {
    if let Some(id) = server_id {
        if let Some(server) = network.servers.iter().find(|s| s.id == id) {
            return server.clone();
        }
    }

    if prefer_favorite {
        if let Some(server) = network.servers.iter().find(|s| s.favorite) {
            return server.clone();
        }
    }

    if let Some(id) = network.default_server_id {
        if let Some(server) = network.servers.iter().find(|s| s.id == id) {
            return server.clone();
        }
    }

    if let Some(server) = network.servers.first() {
        return server.clone();
    }

    warn!(network = %network.name, "network has no servers, using bundled fallback endpoint");
    ServerConfig::fallback()
}

#[cfg(test)]
mod tests {
    use super::*;

    use ircx_shared::constants::DEFAULT_SERVER_HOST;

    fn server(host: &str) -> ServerConfig {
        ServerConfig::new(host, 6697, true)
    }

    #[test]
    fn explicit_id_wins() {
        let mut network = NetworkConfig::named("net");
        network.servers = vec![server("a.example"), server("b.example")];
        let wanted = network.servers[1].id;

        let picked = select_server(&network, Some(wanted), true);
        assert_eq!(picked.host, "b.example");
    }

    #[test]
    fn favorite_wins_regardless_of_position() {
        let mut network = NetworkConfig::named("net");
        network.servers = vec![server("a.example"), server("b.example")];
        network.servers[1].favorite = true;

        assert_eq!(select_server(&network, None, true).host, "b.example");

        // Same servers, reversed order: still the favorite.
        network.servers.reverse();
        assert_eq!(select_server(&network, None, true).host, "b.example");

        // Favorites are ignored when not preferred.
        assert_eq!(select_server(&network, None, false).host, "b.example");
        network.servers.reverse();
        assert_eq!(select_server(&network, None, false).host, "a.example");
    }

    #[test]
    fn default_server_id_beats_first_entry() {
        let mut network = NetworkConfig::named("net");
        network.servers = vec![server("a.example"), server("b.example")];
        network.default_server_id = Some(network.servers[1].id);

        assert_eq!(select_server(&network, None, false).host, "b.example");
    }

    #[test]
    fn unknown_explicit_id_falls_through() {
        let mut network = NetworkConfig::named("net");
        network.servers = vec![server("a.example")];

        let picked = select_server(&network, Some(Uuid::new_v4()), false);
        assert_eq!(picked.host, "a.example");
    }

    #[test]
    fn empty_list_yields_bundled_fallback() {
        let network = NetworkConfig::named("net");
        let picked = select_server(&network, None, true);
        assert_eq!(picked.host, DEFAULT_SERVER_HOST);
        assert!(picked.tls);
    }
}
