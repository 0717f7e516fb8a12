//! # ircx-store
//!
//! Local persistence for the IRCX connection core, backed by SQLite.
//!
//! The crate exposes a synchronous `Database` handle that wraps a
//! `rusqlite::Connection` and provides typed helpers for every domain
//! model: networks, identity profiles, settings, reduced tab records,
//! message history, reconnect policy and channel favorites.

pub mod database;
pub mod favorites;
pub mod messages;
pub mod migrations;
pub mod models;
pub mod networks;
pub mod profiles;
pub mod reconnect;
pub mod settings;
pub mod tabs;

mod error;

pub use database::Database;
pub use error::StoreError;
pub use models::TabRecord;
pub use settings::keys;
