//! # ircx-client
//!
//! The connection core: connect/reconnect orchestration, identity and
//! server resolution, tab/history bootstrap, auto-reconnect state, and the
//! message batching router that folds incoming protocol events into
//! per-conversation state.

pub mod bootstrap;
pub mod connect;
pub mod identity;
pub mod ports;
pub mod reconnect;
pub mod router;
pub mod select;
pub mod server_command;
pub mod state;

mod error;

use tracing_subscriber::{fmt, EnvFilter};

pub use connect::{ConnectOptions, Orchestrator};
pub use error::ClientError;
pub use identity::resolve_identity;
pub use ports::{Alert, AlertButton, AlertChoice, AlertStyle, ConnectHooks, ErrorReporter, UiPort};
pub use router::{MessageRouter, RouterPolicy};
pub use select::select_server;
pub use server_command::ServerCommandArgs;
pub use state::TabState;

/// Install the default tracing subscriber for the embedding application.
///
/// Honors `RUST_LOG` when set; otherwise enables debug logging for the
/// IRCX crates and warnings for everything else.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("ircx_client=debug,ircx_net=debug,ircx_store=info,warn")
    });

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
