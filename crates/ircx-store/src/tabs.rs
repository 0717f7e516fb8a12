//! Reduced tab records, replaced wholesale per network.

use rusqlite::params;
use uuid::Uuid;

use crate::database::Database;
use crate::error::Result;
use crate::models::TabRecord;

use ircx_shared::{TabId, TabKind};

impl Database {
    /// All persisted tabs for a network, server tab first.
    ///
    /// Tab ids are rebuilt from (kind, network, name) on the way out, which
    /// normalizes rows written before the composite id format settled.
    pub fn tabs_for_network(&self, network_id: Uuid) -> Result<Vec<TabRecord>> {
        let mut stmt = self.conn().prepare(
            "SELECT network_id, kind, name, encrypted
             FROM tabs
             WHERE network_id = ?1
             ORDER BY kind DESC, name ASC",
        )?;

        let rows = stmt.query_map(params![network_id.to_string()], row_to_tab_record)?;

        let mut tabs = Vec::new();
        for row in rows {
            tabs.push(row?);
        }
        // "server" sorts after "channel"/"query" lexically; put it first.
        tabs.sort_by_key(|t| t.kind.rank());
        Ok(tabs)
    }

    /// Replace every persisted tab of a network with the given set.
    pub fn save_tabs(&self, network_id: Uuid, tabs: &[TabRecord]) -> Result<()> {
        self.conn().execute(
            "DELETE FROM tabs WHERE network_id = ?1",
            params![network_id.to_string()],
        )?;

        for tab in tabs {
            self.conn().execute(
                "INSERT OR REPLACE INTO tabs (id, network_id, kind, name, encrypted)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    tab.id.as_str(),
                    tab.network_id.to_string(),
                    tab.kind.as_str(),
                    tab.name,
                    tab.encrypted as i32,
                ],
            )?;
        }
        Ok(())
    }
}

fn row_to_tab_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<TabRecord> {
    let network_id_str: String = row.get(0)?;
    let kind_str: String = row.get(1)?;
    let name: String = row.get(2)?;
    let encrypted: i32 = row.get(3)?;

    let network_id = Uuid::parse_str(&network_id_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let kind = match kind_str.as_str() {
        "server" => TabKind::Server,
        "query" => TabKind::Query,
        _ => TabKind::Channel,
    };

    let id = match kind {
        TabKind::Server => TabId::server(network_id),
        _ => TabId::named(kind, network_id, &name),
    };

    Ok(TabRecord {
        id,
        network_id,
        kind,
        name,
        encrypted: encrypted != 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use ircx_shared::Tab;

    fn open_db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("test.db")).unwrap();
        (dir, db)
    }

    #[test]
    fn save_replaces_previous_set() {
        let (_dir, db) = open_db();
        let net = Uuid::new_v4();

        let server = TabRecord::from(&Tab::server(net, "libera"));
        let rust = TabRecord::from(&Tab::new(TabKind::Channel, net, "#rust"));
        db.save_tabs(net, &[server.clone(), rust]).unwrap();
        assert_eq!(db.tabs_for_network(net).unwrap().len(), 2);

        let tokio_tab = TabRecord::from(&Tab::new(TabKind::Channel, net, "#tokio"));
        db.save_tabs(net, &[server, tokio_tab]).unwrap();

        let tabs = db.tabs_for_network(net).unwrap();
        assert_eq!(tabs.len(), 2);
        assert_eq!(tabs[0].kind, TabKind::Server);
        assert_eq!(tabs[1].name, "#tokio");
    }

    #[test]
    fn other_networks_are_untouched() {
        let (_dir, db) = open_db();
        let net_a = Uuid::new_v4();
        let net_b = Uuid::new_v4();

        db.save_tabs(net_a, &[TabRecord::from(&Tab::server(net_a, "a"))])
            .unwrap();
        db.save_tabs(net_b, &[TabRecord::from(&Tab::server(net_b, "b"))])
            .unwrap();
        db.save_tabs(net_a, &[]).unwrap();

        assert!(db.tabs_for_network(net_a).unwrap().is_empty());
        assert_eq!(db.tabs_for_network(net_b).unwrap().len(), 1);
    }
}
