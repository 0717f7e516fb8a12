//! Message history, keyed by network and channel.

use chrono::{DateTime, Utc};
use rusqlite::params;
use uuid::Uuid;

use crate::database::Database;
use crate::error::Result;

use ircx_shared::{Message, MessageFlags, MessageKind};

impl Database {
    /// Append one message to a channel's history.
    pub fn append_message(&self, network_id: Uuid, channel: &str, message: &Message) -> Result<()> {
        self.conn().execute(
            "INSERT INTO messages (network_id, channel, msgid, sender, text, kind, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                network_id.to_string(),
                channel,
                message.id,
                message.sender,
                message.text,
                kind_to_str(message.kind),
                message.timestamp.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// The last `limit` history lines of a channel, oldest first.
    ///
    /// Returned messages carry the scrollback flag so the router and the
    /// persistence pass can tell them apart from live traffic.
    pub fn recent_messages(
        &self,
        network_id: Uuid,
        channel: &str,
        limit: u32,
    ) -> Result<Vec<Message>> {
        let mut stmt = self.conn().prepare(
            "SELECT msgid, sender, text, kind, timestamp
             FROM messages
             WHERE network_id = ?1 AND channel = ?2
             ORDER BY timestamp DESC, seq DESC
             LIMIT ?3",
        )?;

        let rows = stmt.query_map(params![network_id.to_string(), channel, limit], |row| {
            row_to_message(row, channel)
        })?;

        let mut messages = Vec::new();
        for row in rows {
            messages.push(row?);
        }
        messages.reverse();
        Ok(messages)
    }

    /// Drop a channel's history.  Returns the number of deleted lines.
    pub fn clear_messages(&self, network_id: Uuid, channel: &str) -> Result<usize> {
        let affected = self.conn().execute(
            "DELETE FROM messages WHERE network_id = ?1 AND channel = ?2",
            params![network_id.to_string(), channel],
        )?;
        Ok(affected)
    }
}

fn kind_to_str(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::Privmsg => "privmsg",
        MessageKind::Notice => "notice",
        MessageKind::System => "system",
        MessageKind::Error => "error",
    }
}

fn str_to_kind(s: &str) -> MessageKind {
    match s {
        "notice" => MessageKind::Notice,
        "system" => MessageKind::System,
        "error" => MessageKind::Error,
        _ => MessageKind::Privmsg,
    }
}

fn row_to_message(row: &rusqlite::Row<'_>, channel: &str) -> rusqlite::Result<Message> {
    let msgid: Option<String> = row.get(0)?;
    let sender: String = row.get(1)?;
    let text: String = row.get(2)?;
    let kind_str: String = row.get(3)?;
    let ts_str: String = row.get(4)?;

    let timestamp: DateTime<Utc> = DateTime::parse_from_rfc3339(&ts_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(Message {
        id: msgid,
        sender,
        text,
        target: channel.to_string(),
        timestamp,
        kind: str_to_kind(&kind_str),
        flags: MessageFlags {
            scrollback: true,
            playback: false,
            raw: false,
        },
    })
}
