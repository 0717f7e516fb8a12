//! Auto-reconnect policy and the per-connection snapshot persisted for it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-network reconnect policy. Created lazily with these defaults on the
/// first successful connect; an existing config is never overwritten.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AutoReconnectConfig {
    pub enabled: bool,
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
    pub rejoin_channels: bool,
    pub smart_reconnect: bool,
    pub min_reconnect_interval_ms: u64,
}

impl Default for AutoReconnectConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 10,
            initial_delay_ms: 1_000,
            max_delay_ms: 60_000,
            backoff_multiplier: 2.0,
            rejoin_channels: true,
            smart_reconnect: true,
            min_reconnect_interval_ms: 5_000,
        }
    }
}

/// State saved after a successful connect so the reconnect policy can
/// restore the session: which host, which channels, which nick.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectionSnapshot {
    pub network_id: Uuid,
    pub host: String,
    pub channels: Vec<String>,
    pub nick: String,
}
