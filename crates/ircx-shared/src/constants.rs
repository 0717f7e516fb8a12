/// Nick used when neither the network nor any identity profile provides one.
pub const DEFAULT_NICK: &str = "AndroidIRCX";

/// Realname fallback.
pub const DEFAULT_REALNAME: &str = "AndroidIRCX User";

/// Ident (username) fallback.
pub const DEFAULT_IDENT: &str = "androidircx";

/// Name of the network created on first launch.
pub const DEFAULT_NETWORK_NAME: &str = "AndroidIRCX";

/// Last-resort server endpoint when a network has an empty server list.
pub const DEFAULT_SERVER_HOST: &str = "irc.androidircx.net";
pub const DEFAULT_SERVER_PORT: u16 = 6697;

/// Standard IRC ports.
pub const DEFAULT_IRC_PORT: u16 = 6667;
pub const DEFAULT_IRC_TLS_PORT: u16 = 6697;

/// Window within which a same-sender same-text pair counts as a local/server
/// echo collision.
pub const DEDUP_WINDOW_MS: i64 = 5000;

/// Message retention: once a tab exceeds the threshold it is trimmed down to
/// the retained count, keeping the most recent messages.
pub const MESSAGE_CLEANUP_THRESHOLD: usize = 1500;
pub const RETAINED_MESSAGE_COUNT: usize = 1000;

/// Number of persisted history lines prepended to a newly created tab.
pub const SCROLLBACK_LINES: u32 = 100;

/// Text of the synthetic message separating scrollback from live traffic.
pub const SCROLLBACK_SEPARATOR: &str = "----- scrollback -----";

/// How long the router waits between batch flushes.
pub const ROUTER_FLUSH_INTERVAL_MS: u64 = 200;

/// Delay before newly created tabs get their scrollback loaded.
pub const SCROLLBACK_FOLLOWUP_DELAY_MS: u64 = 300;

/// How long `/server` waits for a fresh session to register before giving up
/// on the deferred channel joins.
pub const REGISTRATION_TIMEOUT_SECS: u64 = 30;

/// Grace period after sending QUIT on the previous session.
pub const QUIT_GRACE_MS: u64 = 250;

/// Synthesized names of the special system tabs.
pub const NOTICES_TAB_NAME: &str = "*notices*";
pub const NOTIFICATIONS_TAB_NAME: &str = "*notifications*";
