//! Message batching and tab routing.
//!
//! Incoming protocol events queue up with their routing context and are
//! folded into the live tab state in batches: one state transition per
//! flush.  The router creates tabs on demand, deduplicates echoed
//! messages, trims oversized tabs, and queues newly created tabs for a
//! scrollback load.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, warn};
use uuid::Uuid;

use ircx_shared::constants::{
    DEDUP_WINDOW_MS, MESSAGE_CLEANUP_THRESHOLD, NOTICES_TAB_NAME, NOTIFICATIONS_TAB_NAME,
    RETAINED_MESSAGE_COUNT, ROUTER_FLUSH_INTERVAL_MS, SCROLLBACK_FOLLOWUP_DELAY_MS,
    SCROLLBACK_LINES, SCROLLBACK_SEPARATOR,
};
use ircx_shared::{Message, RoutingContext, Tab, TabId, TabKind};
use ircx_store::Database;

use crate::ports::UiPort;
use crate::state::TabState;

/// Performance policy for tab message retention and scrollback depth.
#[derive(Debug, Clone)]
pub struct RouterPolicy {
    /// Tab size that triggers a trim.
    pub cleanup_threshold: usize,
    /// How many messages survive a trim (most recent kept).
    pub retained: usize,
    /// History lines loaded into a freshly created tab.
    pub scrollback_lines: u32,
}

impl Default for RouterPolicy {
    fn default() -> Self {
        Self {
            cleanup_threshold: MESSAGE_CLEANUP_THRESHOLD,
            retained: RETAINED_MESSAGE_COUNT,
            scrollback_lines: SCROLLBACK_LINES,
        }
    }
}

pub struct MessageRouter {
    state: Arc<Mutex<TabState>>,
    db: Arc<Mutex<Database>>,
    ui: Arc<dyn UiPort>,
    policy: RouterPolicy,
    pending: Mutex<Vec<(Message, Option<RoutingContext>)>>,
    scrollback_queue: Mutex<Vec<(TabId, Uuid, String)>>,
}

impl MessageRouter {
    pub fn new(
        state: Arc<Mutex<TabState>>,
        db: Arc<Mutex<Database>>,
        ui: Arc<dyn UiPort>,
        policy: RouterPolicy,
    ) -> Self {
        Self {
            state,
            db,
            ui,
            policy,
            pending: Mutex::new(Vec::new()),
            scrollback_queue: Mutex::new(Vec::new()),
        }
    }

    /// Queue one incoming message for the next flush.
    pub fn enqueue(&self, message: Message, context: Option<RoutingContext>) {
        self.pending
            .lock()
            .expect("pending lock")
            .push((message, context));
    }

    /// Drain the queue and apply it to the tab state as one transition.
    ///
    /// Returns the number of messages actually applied (created or
    /// appended); dropped and deduplicated messages do not count.
    pub fn flush_now(&self) -> usize {
        let batch: Vec<(Message, Option<RoutingContext>)> = {
            let mut pending = self.pending.lock().expect("pending lock");
            pending.drain(..).collect()
        };
        if batch.is_empty() {
            return 0;
        }

        let mut applied = 0;
        // (network, channel key, message) tuples persisted after the state
        // transition completes.
        let mut to_persist: Vec<(Uuid, String, Message)> = Vec::new();
        let mut created: Vec<(TabId, Uuid, String)> = Vec::new();

        {
            let mut state = self.state.lock().expect("state lock");
            let before_count = state.tab_count();
            let active = state.active_tab_id().cloned();

            for (message, context) in batch {
                let Some(ctx) = context else {
                    debug!("dropping message without routing context");
                    continue;
                };

                if let Some(network) = ctx.network().cloned() {
                    state.ensure_server_tab(network.id, &network.name);
                    // System tabs (notices, notifications) exist as soon as
                    // something routes toward their synthesized ids.
                    let name = ctx.target_name();
                    if (name == NOTICES_TAB_NAME || name == NOTIFICATIONS_TAB_NAME)
                        && state.index_of(ctx.target_tab_id()).is_none()
                    {
                        state.push_tab(Tab::new(ctx.target_kind(), network.id, name));
                    }
                }

                let found = state.index_of(ctx.target_tab_id()).or_else(|| {
                    state.index_of_loose(ctx.target_kind(), ctx.network_id(), ctx.target_name())
                });

                match found {
                    Some(index) => {
                        let is_active = active.as_ref() == Some(&state.tabs()[index].id);
                        let tab = state.tab_at_mut(index);

                        if is_duplicate(&tab.messages, &message) {
                            debug!(tab = %tab.id, "dropping duplicate message");
                            continue;
                        }

                        if message.is_persistable() && ctx.has_valid_network() {
                            to_persist.push((ctx.network_id(), channel_key(tab), message.clone()));
                        }
                        tab.messages.push(message);
                        applied += 1;

                        if tab.messages.len() > self.policy.cleanup_threshold {
                            let excess = tab.messages.len() - self.policy.retained;
                            tab.messages.drain(0..excess);
                        }
                        if !is_active {
                            tab.has_activity = true;
                        }
                    }
                    None if ctx.has_valid_network() => {
                        let network = ctx.network().expect("checked").clone();
                        let mut tab = Tab::new(ctx.target_kind(), network.id, ctx.target_name());
                        tab.encrypted = ctx.is_encrypted();

                        if ctx.target_kind() == TabKind::Query {
                            self.ui.notify_query(&message.sender);
                        }
                        if message.is_persistable() {
                            to_persist.push((network.id, channel_key(&tab), message.clone()));
                        }
                        tab.messages.push(message);
                        tab.has_activity = active.as_ref() != Some(&tab.id);
                        applied += 1;

                        if ctx.target_kind() != TabKind::Server {
                            created.push((tab.id.clone(), network.id, tab.name.clone()));
                        }
                        state.push_tab(tab);
                    }
                    None => {
                        debug!(target = %ctx.target_tab_id(), "no tab and no valid network, dropping");
                    }
                }
            }

            // Only re-sort when the batch actually changed the tab set.
            if state.tab_count() != before_count {
                state.sort_grouped();
            }
        }

        if !to_persist.is_empty() {
            let db = self.db.lock().expect("db lock");
            for (network_id, channel, message) in &to_persist {
                if let Err(e) = db.append_message(*network_id, channel, message) {
                    warn!(error = %e, channel = %channel, "failed to persist message");
                }
            }
        }

        if !created.is_empty() {
            self.scrollback_queue
                .lock()
                .expect("scrollback lock")
                .extend(created);
        }

        applied
    }

    /// Load scrollback into tabs created by earlier flushes.
    ///
    /// Tabs are processed sequentially after a short delay; failures are
    /// logged and skipped.  History lines already present (by timestamp)
    /// are not duplicated, and a synthetic separator marks the boundary.
    pub async fn load_pending_scrollback(&self) {
        let queued: Vec<(TabId, Uuid, String)> = {
            let mut queue = self.scrollback_queue.lock().expect("scrollback lock");
            queue.drain(..).collect()
        };
        if queued.is_empty() {
            return;
        }

        tokio::time::sleep(Duration::from_millis(SCROLLBACK_FOLLOWUP_DELAY_MS)).await;

        for (tab_id, network_id, name) in queued {
            let history = {
                let db = self.db.lock().expect("db lock");
                match db.recent_messages(network_id, &name, self.policy.scrollback_lines) {
                    Ok(history) => history,
                    Err(e) => {
                        debug!(error = %e, tab = %tab_id, "scrollback unavailable");
                        continue;
                    }
                }
            };
            if history.is_empty() {
                continue;
            }

            let mut state = self.state.lock().expect("state lock");
            let Some(tab) = state.tab_mut(&tab_id) else {
                continue;
            };

            let present: HashSet<i64> = tab
                .messages
                .iter()
                .map(|m| m.timestamp.timestamp_millis())
                .collect();
            let mut prepend: Vec<Message> = history
                .into_iter()
                .filter(|m| !present.contains(&m.timestamp.timestamp_millis()))
                .collect();
            if prepend.is_empty() {
                continue;
            }

            let mut separator = Message::system(SCROLLBACK_SEPARATOR);
            separator.flags.scrollback = true;
            prepend.push(separator);
            tab.messages.splice(0..0, prepend);
        }
    }

    /// Timer-driven drain loop.
    pub async fn run(self: Arc<Self>) {
        let mut interval =
            tokio::time::interval(Duration::from_millis(ROUTER_FLUSH_INTERVAL_MS));
        loop {
            interval.tick().await;
            self.flush_now();
            self.load_pending_scrollback().await;
        }
    }
}

/// History channel key of a tab: the server log uses the empty key.
fn channel_key(tab: &Tab) -> String {
    match tab.kind {
        TabKind::Server => String::new(),
        _ => tab.name.clone(),
    }
}

/// Echo-collision detection.
///
/// When both sides carry an IRCv3 msgid the ids decide; otherwise two
/// messages are the same event when they agree on sender (case-insensitive)
/// and text and arrived within the dedup window.
fn is_duplicate(existing: &[Message], incoming: &Message) -> bool {
    existing.iter().any(|m| match (&m.id, &incoming.id) {
        (Some(a), Some(b)) => a == b,
        _ => {
            (m.timestamp - incoming.timestamp).num_milliseconds().abs() < DEDUP_WINDOW_MS
                && m.sender.eq_ignore_ascii_case(&incoming.sender)
                && m.text == incoming.text
        }
    })
}
