#![allow(dead_code)]

//! Shared fixtures for the integration tests: an in-memory connection
//! manager driving loopback sessions, plus recording UI and reporter
//! stubs.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

use tokio::sync::broadcast;

use ircx_client::{
    Alert, AlertChoice, ErrorReporter, Orchestrator, TabState, UiPort,
};
use ircx_net::{ConnectionConfig, ConnectionManager, NetError, SessionDriver, SessionHandle};
use ircx_store::Database;

pub struct MockManager {
    /// When set, `connect` fails with this message.
    pub fail_with: Mutex<Option<String>>,
    /// Whether freshly created sessions register immediately.
    pub auto_register: AtomicBool,
    /// Every `(desired_id, config)` pair `connect` was called with.
    pub calls: Mutex<Vec<(String, ConnectionConfig)>>,
    sessions: Mutex<HashMap<String, SessionHandle>>,
    drivers: Mutex<HashMap<String, SessionDriver>>,
    active: Mutex<Option<String>>,
    created_tx: broadcast::Sender<String>,
}

impl MockManager {
    pub fn new() -> Self {
        let (created_tx, _) = broadcast::channel(16);
        Self {
            fail_with: Mutex::new(None),
            auto_register: AtomicBool::new(true),
            calls: Mutex::new(Vec::new()),
            sessions: Mutex::new(HashMap::new()),
            drivers: Mutex::new(HashMap::new()),
            active: Mutex::new(None),
            created_tx,
        }
    }

    /// Take the driving side of a created session to script or inspect it.
    pub fn take_driver(&self, id: &str) -> Option<SessionDriver> {
        self.drivers.lock().unwrap().remove(id)
    }
}

impl ConnectionManager for MockManager {
    async fn connect(
        &self,
        desired_id: &str,
        config: ConnectionConfig,
    ) -> Result<String, NetError> {
        self.calls
            .lock()
            .unwrap()
            .push((desired_id.to_string(), config));

        if let Some(message) = self.fail_with.lock().unwrap().clone() {
            return Err(NetError::Connect(message));
        }

        let (handle, driver) = SessionHandle::loopback(desired_id);
        if self.auto_register.load(Ordering::SeqCst) {
            driver.set_registered(true);
        }
        self.sessions
            .lock()
            .unwrap()
            .insert(desired_id.to_string(), handle);
        self.drivers
            .lock()
            .unwrap()
            .insert(desired_id.to_string(), driver);
        *self.active.lock().unwrap() = Some(desired_id.to_string());
        let _ = self.created_tx.send(desired_id.to_string());
        Ok(desired_id.to_string())
    }

    fn get(&self, id: &str) -> Option<SessionHandle> {
        self.sessions.lock().unwrap().get(id).cloned()
    }

    fn active(&self) -> Option<SessionHandle> {
        let id = self.active.lock().unwrap().clone()?;
        self.sessions.lock().unwrap().get(&id).cloned()
    }

    fn subscribe_created(&self) -> broadcast::Receiver<String> {
        self.created_tx.subscribe()
    }
}

pub struct MockUi {
    pub alerts: Mutex<Vec<Alert>>,
    /// Scripted choices, consumed per alert; defaults to Cancel.
    pub choices: Mutex<VecDeque<AlertChoice>>,
    pub network_list_opened: AtomicUsize,
    pub queries: Mutex<Vec<String>>,
}

impl MockUi {
    pub fn new() -> Self {
        Self {
            alerts: Mutex::new(Vec::new()),
            choices: Mutex::new(VecDeque::new()),
            network_list_opened: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }
}

impl UiPort for MockUi {
    fn alert(&self, alert: Alert) -> AlertChoice {
        self.alerts.lock().unwrap().push(alert);
        self.choices
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(AlertChoice::Cancel)
    }

    fn open_network_list(&self) {
        self.network_list_opened.fetch_add(1, Ordering::SeqCst);
    }

    fn notify_query(&self, from: &str) {
        self.queries.lock().unwrap().push(from.to_string());
    }
}

pub struct MockReporter {
    /// `(source, error, fatal)` triples.
    pub reports: Mutex<Vec<(String, String, bool)>>,
}

impl MockReporter {
    pub fn new() -> Self {
        Self {
            reports: Mutex::new(Vec::new()),
        }
    }
}

impl ErrorReporter for MockReporter {
    fn report(&self, source: &str, error: &str, fatal: bool) {
        self.reports
            .lock()
            .unwrap()
            .push((source.to_string(), error.to_string(), fatal));
    }
}

pub struct TestEnv {
    pub db: Arc<Mutex<Database>>,
    pub state: Arc<Mutex<TabState>>,
    pub manager: Arc<MockManager>,
    pub ui: Arc<MockUi>,
    pub reporter: Arc<MockReporter>,
    pub orchestrator: Orchestrator<MockManager>,
    _dir: tempfile::TempDir,
}

static TRACING: Once = Once::new();

pub fn env() -> TestEnv {
    TRACING.call_once(ircx_client::init_tracing);

    let dir = tempfile::tempdir().unwrap();
    let db = Arc::new(Mutex::new(
        Database::open_at(&dir.path().join("test.db")).unwrap(),
    ));
    let state = Arc::new(Mutex::new(TabState::new()));
    let manager = Arc::new(MockManager::new());
    let ui = Arc::new(MockUi::new());
    let reporter = Arc::new(MockReporter::new());

    let orchestrator = Orchestrator::new(
        db.clone(),
        manager.clone(),
        state.clone(),
        ui.clone(),
        reporter.clone(),
    );

    TestEnv {
        db,
        state,
        manager,
        ui,
        reporter,
        orchestrator,
        _dir: dir,
    }
}
