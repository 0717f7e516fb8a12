//! CRUD operations for [`IdentityProfile`] records.

use rusqlite::params;
use uuid::Uuid;

use crate::database::Database;
use crate::error::{Result, StoreError};

use ircx_shared::network::IdentityProfile;

impl Database {
    /// Insert a profile.  When `is_default` is set, any previous default
    /// loses the flag.
    pub fn add_profile(&self, profile: &IdentityProfile, is_default: bool) -> Result<()> {
        if is_default {
            self.conn()
                .execute("UPDATE identity_profiles SET is_default = 0", [])?;
        }
        self.conn().execute(
            "INSERT INTO identity_profiles (id, name, is_default, json)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                profile.id.to_string(),
                profile.name,
                is_default as i32,
                serde_json::to_string(profile)?,
            ],
        )?;
        Ok(())
    }

    /// Fetch a single profile by id.
    pub fn get_profile(&self, id: Uuid) -> Result<IdentityProfile> {
        let json: String = self
            .conn()
            .query_row(
                "SELECT json FROM identity_profiles WHERE id = ?1",
                params![id.to_string()],
                |row| row.get(0),
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })?;
        Ok(serde_json::from_str(&json)?)
    }

    /// List all profiles, ordered by name.
    pub fn list_profiles(&self) -> Result<Vec<IdentityProfile>> {
        let mut stmt = self
            .conn()
            .prepare("SELECT json FROM identity_profiles ORDER BY name ASC")?;

        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut profiles = Vec::new();
        for row in rows {
            profiles.push(serde_json::from_str(&row?)?);
        }
        Ok(profiles)
    }

    /// The designated default profile, if one exists.
    pub fn default_profile(&self) -> Result<Option<IdentityProfile>> {
        let json: Option<String> = self
            .conn()
            .query_row(
                "SELECT json FROM identity_profiles WHERE is_default = 1 LIMIT 1",
                [],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;

        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("test.db")).unwrap();
        (dir, db)
    }

    fn profile(name: &str, nick: &str) -> IdentityProfile {
        IdentityProfile {
            id: Uuid::new_v4(),
            name: name.into(),
            nick: nick.into(),
            ..IdentityProfile::default()
        }
    }

    #[test]
    fn default_flag_moves_to_latest() {
        let (_dir, db) = open_db();

        let first = profile("work", "worker");
        let second = profile("home", "gamer");
        db.add_profile(&first, true).unwrap();
        db.add_profile(&second, true).unwrap();

        let default = db.default_profile().unwrap().unwrap();
        assert_eq!(default.id, second.id);
        assert_eq!(db.list_profiles().unwrap().len(), 2);
    }

    #[test]
    fn no_default_profile_is_none() {
        let (_dir, db) = open_db();
        db.add_profile(&profile("work", "worker"), false).unwrap();
        assert!(db.default_profile().unwrap().is_none());
    }
}
