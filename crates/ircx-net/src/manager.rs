//! Session bookkeeping behind the [`ConnectionManager`] trait.
//!
//! The orchestration layer only ever sees the trait, so tests can substitute
//! an in-memory manager and the production engine can substitute a richer
//! transport without touching the connect flow.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;

use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::config::ConnectionConfig;
use crate::error::Result;
use crate::session::{spawn_session, SessionHandle};

/// Owns the live protocol sessions.
pub trait ConnectionManager: Send + Sync {
    /// Establish a session under `desired_id` and return the final id the
    /// session ended up with.
    fn connect(
        &self,
        desired_id: &str,
        config: ConnectionConfig,
    ) -> impl Future<Output = Result<String>> + Send;

    /// Look up a session by id.
    fn get(&self, id: &str) -> Option<SessionHandle>;

    /// The most recently connected session, if any.
    fn active(&self) -> Option<SessionHandle>;

    /// Subscribe to the ids of newly created sessions.
    fn subscribe_created(&self) -> broadcast::Receiver<String>;
}

/// [`ConnectionManager`] over the plain-TCP session task.
pub struct TcpConnectionManager {
    inner: Mutex<Inner>,
    created_tx: broadcast::Sender<String>,
}

struct Inner {
    sessions: HashMap<String, SessionHandle>,
    active: Option<String>,
}

impl TcpConnectionManager {
    pub fn new() -> Self {
        let (created_tx, _) = broadcast::channel(16);
        Self {
            inner: Mutex::new(Inner {
                sessions: HashMap::new(),
                active: None,
            }),
            created_tx,
        }
    }
}

impl Default for TcpConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionManager for TcpConnectionManager {
    async fn connect(&self, desired_id: &str, config: ConnectionConfig) -> Result<String> {
        let handle = spawn_session(desired_id, config).await?;

        {
            let mut inner = self.inner.lock().expect("manager lock");
            if inner.sessions.insert(desired_id.to_string(), handle).is_some() {
                debug!(session = desired_id, "replaced existing session");
            }
            inner.active = Some(desired_id.to_string());
        }

        info!(session = desired_id, "session registered with manager");
        let _ = self.created_tx.send(desired_id.to_string());
        Ok(desired_id.to_string())
    }

    fn get(&self, id: &str) -> Option<SessionHandle> {
        self.inner.lock().expect("manager lock").sessions.get(id).cloned()
    }

    fn active(&self) -> Option<SessionHandle> {
        let inner = self.inner.lock().expect("manager lock");
        inner
            .active
            .as_ref()
            .and_then(|id| inner.sessions.get(id))
            .cloned()
    }

    fn subscribe_created(&self) -> broadcast::Receiver<String> {
        self.created_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(port: u16) -> ConnectionConfig {
        ConnectionConfig {
            host: "127.0.0.1".into(),
            port,
            nick: "tester".into(),
            alt_nick: "tester_".into(),
            username: "tester".into(),
            realname: "Tester".into(),
            password: None,
            tls: false,
            verify_tls: false,
            proxy: None,
            sasl: None,
            client_cert: None,
        }
    }

    #[tokio::test]
    async fn connect_tracks_session_and_broadcasts_creation() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (_sock, _) = listener.accept().await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(500)).await;
        });

        let manager = TcpConnectionManager::new();
        let mut created = manager.subscribe_created();

        assert!(manager.get("mynet").is_none());
        assert!(manager.active().is_none());

        let id = manager.connect("mynet", test_config(port)).await.unwrap();
        assert_eq!(id, "mynet");
        assert!(manager.get("mynet").is_some());
        assert_eq!(manager.active().unwrap().id(), "mynet");
        assert_eq!(created.recv().await.unwrap(), "mynet");
    }

    #[tokio::test]
    async fn connect_to_unreachable_endpoint_fails() {
        // Bind then drop to get a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let manager = TcpConnectionManager::new();
        let err = manager.connect("mynet", test_config(port)).await;
        assert!(err.is_err());
        assert!(manager.get("mynet").is_none());
    }
}
