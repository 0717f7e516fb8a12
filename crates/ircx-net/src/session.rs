//! Protocol session task with tokio mpsc command / broadcast event pattern.
//!
//! The session runs in a dedicated tokio task. External code communicates
//! with it through a typed command channel and an event broadcast, and
//! observes the registration state through a watch channel, so the
//! networking layer stays fully asynchronous and decoupled.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc, watch};
use tracing::{debug, info, warn};

use crate::config::ConnectionConfig;
use crate::error::{NetError, Result};

// ---------------------------------------------------------------------------
// Command / event types
// ---------------------------------------------------------------------------

/// Commands sent *into* the session task.
#[derive(Debug)]
pub enum SessionCommand {
    /// Write a raw protocol line.
    SendLine(String),
    /// Join a channel.
    Join(String),
    /// Quit with an optional message and close the session.
    Quit(Option<String>),
}

/// Events sent *from* the session task to the application.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Registration completed (numeric 001).
    Registered { nick: String },
    /// A PRIVMSG or NOTICE addressed to us or a channel we are in.
    Message {
        sender: String,
        target: String,
        text: String,
        notice: bool,
        msgid: Option<String>,
    },
    /// Any other protocol line, verbatim.
    Line(String),
    /// The session ended.
    Closed { reason: String },
}

// ---------------------------------------------------------------------------
// Session handle
// ---------------------------------------------------------------------------

/// Cloneable handle on a running session.
#[derive(Clone)]
pub struct SessionHandle {
    id: String,
    commands: mpsc::Sender<SessionCommand>,
    registered: watch::Receiver<bool>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_registered(&self) -> bool {
        *self.registered.borrow()
    }

    /// Send a command to the session task.
    pub async fn send(&self, cmd: SessionCommand) -> Result<()> {
        self.commands
            .send(cmd)
            .await
            .map_err(|_| NetError::SessionClosed)
    }

    /// Subscribe to session events.
    pub fn events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Resolve once the session reaches the registered state.
    ///
    /// Returns [`NetError::RegistrationTimeout`] if the session does not
    /// register within `timeout`, and [`NetError::SessionClosed`] if the
    /// task terminates first.
    pub async fn wait_registered(&self, timeout: Duration) -> Result<()> {
        let mut rx = self.registered.clone();
        tokio::time::timeout(timeout, async move {
            while !*rx.borrow_and_update() {
                rx.changed().await.map_err(|_| NetError::SessionClosed)?;
            }
            Ok(())
        })
        .await
        .map_err(|_| NetError::RegistrationTimeout)?
    }

    /// Build a handle that is not backed by a socket, together with the
    /// driver side used to script it.  This is the seam for protocol
    /// engines that manage their own transport, and for tests.
    pub fn loopback(id: &str) -> (SessionHandle, SessionDriver) {
        let (cmd_tx, cmd_rx) = mpsc::channel(64);
        let (registered_tx, registered_rx) = watch::channel(false);
        let (event_tx, _) = broadcast::channel(256);

        let handle = SessionHandle {
            id: id.to_string(),
            commands: cmd_tx,
            registered: registered_rx,
            events: event_tx.clone(),
        };
        let driver = SessionDriver {
            commands: cmd_rx,
            registered: registered_tx,
            events: event_tx,
        };
        (handle, driver)
    }
}

/// Driving side of a [`SessionHandle::loopback`] pair.
pub struct SessionDriver {
    /// Commands the application sent to the session.
    pub commands: mpsc::Receiver<SessionCommand>,
    registered: watch::Sender<bool>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionDriver {
    pub fn set_registered(&self, registered: bool) {
        let _ = self.registered.send(registered);
    }

    pub fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }
}

// ---------------------------------------------------------------------------
// Session task
// ---------------------------------------------------------------------------

/// Dial the configured endpoint and spawn the session event loop.
///
/// The dial and the registration burst happen before this function returns,
/// so connection errors surface directly to the caller. Everything after
/// that flows through the returned [`SessionHandle`].
pub async fn spawn_session(id: &str, config: ConnectionConfig) -> Result<SessionHandle> {
    if config.tls {
        // This transport is the plain-TCP seam; TLS termination lives in the
        // full protocol engine.
        warn!(host = %config.host, port = config.port, "TLS requested, dialing plain TCP");
    }

    let stream = TcpStream::connect((config.host.as_str(), config.port))
        .await
        .map_err(|e| NetError::Connect(format!("{}:{}: {e}", config.host, config.port)))?;

    info!(session = id, host = %config.host, port = config.port, "session connected");

    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    // Registration burst: PASS (if any), NICK, USER.
    if let Some(ref pass) = config.password {
        writer.write_all(format!("PASS {pass}\r\n").as_bytes()).await?;
    }
    writer
        .write_all(format!("NICK {}\r\n", config.nick).as_bytes())
        .await?;
    writer
        .write_all(
            format!("USER {} 0 * :{}\r\n", config.username, config.realname).as_bytes(),
        )
        .await?;
    writer.flush().await?;

    let (cmd_tx, mut cmd_rx) = mpsc::channel::<SessionCommand>(64);
    let (registered_tx, registered_rx) = watch::channel(false);
    let (event_tx, _) = broadcast::channel::<SessionEvent>(256);

    let handle = SessionHandle {
        id: id.to_string(),
        commands: cmd_tx,
        registered: registered_rx,
        events: event_tx.clone(),
    };

    let session_id = id.to_string();
    tokio::spawn(async move {
        let mut current_nick = config.nick.clone();
        let mut tried_alt = false;
        let reason;

        loop {
            tokio::select! {
                // --- Incoming commands ---
                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(SessionCommand::SendLine(line)) => {
                            if let Err(e) = writer.write_all(format!("{line}\r\n").as_bytes()).await {
                                reason = format!("write failed: {e}");
                                break;
                            }
                        }
                        Some(SessionCommand::Join(channel)) => {
                            debug!(session = %session_id, channel = %channel, "joining");
                            if let Err(e) = writer.write_all(format!("JOIN {channel}\r\n").as_bytes()).await {
                                reason = format!("write failed: {e}");
                                break;
                            }
                        }
                        Some(SessionCommand::Quit(msg)) => {
                            let text = msg.unwrap_or_else(|| "Leaving".to_string());
                            let _ = writer.write_all(format!("QUIT :{text}\r\n").as_bytes()).await;
                            let _ = writer.flush().await;
                            reason = "quit".to_string();
                            break;
                        }
                        None => {
                            reason = "command channel closed".to_string();
                            break;
                        }
                    }
                }

                // --- Protocol lines ---
                line = lines.next_line() => {
                    match line {
                        Ok(Some(raw)) => {
                            let Some(parsed) = parse_irc_line(&raw) else {
                                continue;
                            };
                            match parsed.command {
                                "PING" => {
                                    let token = parsed.params.first().copied().unwrap_or("");
                                    if let Err(e) = writer.write_all(format!("PONG :{token}\r\n").as_bytes()).await {
                                        reason = format!("write failed: {e}");
                                        break;
                                    }
                                }
                                "001" => {
                                    if let Some(nick) = parsed.params.first() {
                                        current_nick = nick.to_string();
                                    }
                                    info!(session = %session_id, nick = %current_nick, "registered");
                                    let _ = registered_tx.send(true);
                                    let _ = event_tx.send(SessionEvent::Registered {
                                        nick: current_nick.clone(),
                                    });
                                }
                                "433" if !*registered_tx.borrow() && !tried_alt => {
                                    // Nick in use during registration: fall back
                                    // to the alternate once.
                                    tried_alt = true;
                                    if !config.alt_nick.is_empty() {
                                        debug!(session = %session_id, alt = %config.alt_nick, "nick in use, trying alternate");
                                        current_nick = config.alt_nick.clone();
                                        if let Err(e) = writer.write_all(format!("NICK {}\r\n", config.alt_nick).as_bytes()).await {
                                            reason = format!("write failed: {e}");
                                            break;
                                        }
                                    }
                                }
                                "PRIVMSG" | "NOTICE" => {
                                    let sender = parsed.prefix.map(nick_of).unwrap_or("").to_string();
                                    let target = parsed.params.first().copied().unwrap_or("").to_string();
                                    let text = parsed.params.get(1).copied().unwrap_or("").to_string();
                                    let msgid = parsed.tags.and_then(msgid_from_tags);
                                    let _ = event_tx.send(SessionEvent::Message {
                                        sender,
                                        target,
                                        text,
                                        notice: parsed.command == "NOTICE",
                                        msgid,
                                    });
                                }
                                _ => {
                                    let _ = event_tx.send(SessionEvent::Line(raw.clone()));
                                }
                            }
                        }
                        Ok(None) => {
                            reason = "connection closed by server".to_string();
                            break;
                        }
                        Err(e) => {
                            reason = format!("read failed: {e}");
                            break;
                        }
                    }
                }
            }
        }

        info!(session = %session_id, reason = %reason, "session terminated");
        let _ = registered_tx.send(false);
        let _ = event_tx.send(SessionEvent::Closed { reason });
    });

    Ok(handle)
}

// ---------------------------------------------------------------------------
// Line parsing
// ---------------------------------------------------------------------------

struct IrcLine<'a> {
    tags: Option<&'a str>,
    prefix: Option<&'a str>,
    command: &'a str,
    params: Vec<&'a str>,
}

/// Split a raw protocol line into tags, prefix, command and params.
fn parse_irc_line(line: &str) -> Option<IrcLine<'_>> {
    let mut rest = line.trim_end_matches(['\r', '\n']);
    if rest.is_empty() {
        return None;
    }

    let tags = if let Some(stripped) = rest.strip_prefix('@') {
        let (tags, tail) = stripped.split_once(' ')?;
        rest = tail;
        Some(tags)
    } else {
        None
    };

    let prefix = if let Some(stripped) = rest.strip_prefix(':') {
        let (prefix, tail) = stripped.split_once(' ')?;
        rest = tail;
        Some(prefix)
    } else {
        None
    };

    let mut params = Vec::new();
    let command = match rest.split_once(' ') {
        Some((command, tail)) => {
            let mut tail = tail.trim_start();
            while !tail.is_empty() {
                if let Some(trailing) = tail.strip_prefix(':') {
                    params.push(trailing);
                    break;
                }
                match tail.split_once(' ') {
                    Some((param, next)) => {
                        params.push(param);
                        tail = next.trim_start();
                    }
                    None => {
                        params.push(tail);
                        break;
                    }
                }
            }
            command
        }
        None => rest,
    };

    Some(IrcLine {
        tags,
        prefix,
        command,
        params,
    })
}

/// Extract the IRCv3 `msgid` tag value, if present.
fn msgid_from_tags(tags: &str) -> Option<String> {
    tags.split(';').find_map(|tag| {
        tag.strip_prefix("msgid=")
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    })
}

/// The nick portion of a `nick!user@host` prefix.
fn nick_of(prefix: &str) -> &str {
    prefix.split('!').next().unwrap_or(prefix)
}
