//! Injected collaborators.
//!
//! The UI surface, the error-reporting backend and the scripting hooks are
//! all constructed once at application start and passed into the
//! orchestrator by reference, so the core never reaches for globals.

use std::sync::Mutex;

/// What the user picked in a blocking alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertChoice {
    Confirm,
    Retry,
    OpenNetworks,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertStyle {
    Default,
    Cancel,
    Destructive,
}

#[derive(Debug, Clone)]
pub struct AlertButton {
    pub label: String,
    pub choice: AlertChoice,
    pub style: AlertStyle,
}

#[derive(Debug, Clone)]
pub struct Alert {
    pub title: String,
    pub message: String,
    pub buttons: Vec<AlertButton>,
}

impl Alert {
    /// A single-button informational alert.
    pub fn info(title: &str, message: &str) -> Self {
        Self {
            title: title.to_string(),
            message: message.to_string(),
            buttons: vec![AlertButton {
                label: "OK".to_string(),
                choice: AlertChoice::Confirm,
                style: AlertStyle::Default,
            }],
        }
    }

    /// The connect-failure alert: Retry, Open Networks, Cancel.
    pub fn connect_failed(message: &str) -> Self {
        Self {
            title: "Connection failed".to_string(),
            message: message.to_string(),
            buttons: vec![
                AlertButton {
                    label: "Retry".to_string(),
                    choice: AlertChoice::Retry,
                    style: AlertStyle::Default,
                },
                AlertButton {
                    label: "Open Networks".to_string(),
                    choice: AlertChoice::OpenNetworks,
                    style: AlertStyle::Default,
                },
                AlertButton {
                    label: "Cancel".to_string(),
                    choice: AlertChoice::Cancel,
                    style: AlertStyle::Cancel,
                },
            ],
        }
    }
}

/// The blocking dialog and notification surface of the embedding UI.
pub trait UiPort: Send + Sync {
    /// Show a blocking alert and return the chosen button.
    fn alert(&self, alert: Alert) -> AlertChoice;

    /// Open the network list screen.
    fn open_network_list(&self);

    /// Ring/notify for a newly opened private query.
    fn notify_query(&self, from: &str);
}

/// Non-fatal error forwarding (crash reporting, analytics).
pub trait ErrorReporter: Send + Sync {
    fn report(&self, source: &str, error: &str, fatal: bool);
}

/// Subscribers notified with the final connection id after a successful
/// connect (the scripting hook surface).
#[derive(Default)]
pub struct ConnectHooks {
    next_id: Mutex<u64>,
    subscribers: Mutex<Vec<(u64, Box<dyn Fn(&str) + Send + Sync>)>>,
}

impl ConnectHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook; keep the returned id to unsubscribe.
    pub fn subscribe(&self, hook: impl Fn(&str) + Send + Sync + 'static) -> u64 {
        let mut next = self.next_id.lock().expect("hooks lock");
        *next += 1;
        let id = *next;
        self.subscribers
            .lock()
            .expect("hooks lock")
            .push((id, Box::new(hook)));
        id
    }

    /// Remove a hook.  Returns `true` if it was still registered.
    pub fn unsubscribe(&self, id: u64) -> bool {
        let mut subs = self.subscribers.lock().expect("hooks lock");
        let before = subs.len();
        subs.retain(|(sub_id, _)| *sub_id != id);
        subs.len() != before
    }

    pub fn notify(&self, connection_id: &str) {
        for (_, hook) in self.subscribers.lock().expect("hooks lock").iter() {
            hook(connection_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn hooks_fire_until_unsubscribed() {
        let hooks = ConnectHooks::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let calls_clone = calls.clone();
        let id = hooks.subscribe(move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });

        hooks.notify("net");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert!(hooks.unsubscribe(id));
        assert!(!hooks.unsubscribe(id));
        hooks.notify("net");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
