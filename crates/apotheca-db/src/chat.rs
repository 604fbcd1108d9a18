use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{Row, params};

use apotheca_types::models::{Conversation, Message, MessageStatus, SenderType};

use crate::Database;
use crate::codec::{OptionalExt, decode_enum, decode_opt_ts, decode_ts, encode_ts};
use crate::store::{ChatStore, LastMessage};

const CONVERSATION_COLUMNS: &str = "id, user_id, pharmacy_owner_id, pharmacy_id, last_message, \
     last_message_type, last_message_at, last_message_sender_id, last_message_sender_type, \
     unread_count_user, unread_count_pharmacy_owner, status, created_at, updated_at";

const MESSAGE_COLUMNS: &str = "id, conversation_id, sender_id, sender_type, sender_name, \
     content, image_url, type, status, delivered_at, read_at, created_at";

fn unread_column(side: SenderType) -> &'static str {
    match side {
        SenderType::User => "unread_count_user",
        SenderType::PharmacyOwner => "unread_count_pharmacy_owner",
    }
}

fn participant_column(side: SenderType) -> &'static str {
    match side {
        SenderType::User => "user_id",
        SenderType::PharmacyOwner => "pharmacy_owner_id",
    }
}

impl ChatStore for Database {
    fn find_conversation(
        &self,
        user_id: &str,
        pharmacy_owner_id: &str,
    ) -> Result<Option<Conversation>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!(
                    "SELECT {CONVERSATION_COLUMNS} FROM conversations
                     WHERE user_id = ?1 AND pharmacy_owner_id = ?2 LIMIT 1"
                ),
                params![user_id, pharmacy_owner_id],
                map_conversation,
            )
            .optional()
        })
    }

    fn insert_conversation(&self, c: &Conversation) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                &format!(
                    "INSERT INTO conversations ({CONVERSATION_COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"
                ),
                params![
                    c.id,
                    c.user_id,
                    c.pharmacy_owner_id,
                    c.pharmacy_id,
                    c.last_message,
                    c.last_message_type.as_str(),
                    encode_ts(&c.last_message_at),
                    c.last_message_sender_id,
                    c.last_message_sender_type.as_str(),
                    c.unread_count_user,
                    c.unread_count_pharmacy_owner,
                    c.status.as_str(),
                    encode_ts(&c.created_at),
                    encode_ts(&c.updated_at),
                ],
            )?;
            Ok(())
        })
    }

    fn get_conversation(&self, id: &str) -> Result<Option<Conversation>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = ?1"),
                [id],
                map_conversation,
            )
            .optional()
        })
    }

    fn list_active_conversations(
        &self,
        side: SenderType,
        participant_id: &str,
        limit: u32,
    ) -> Result<Vec<Conversation>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CONVERSATION_COLUMNS} FROM conversations
                 WHERE {} = ?1 AND status = 'active'
                 ORDER BY last_message_at DESC
                 LIMIT ?2",
                participant_column(side)
            ))?;
            let rows = stmt
                .query_map(params![participant_id, limit], map_conversation)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    fn record_last_message(&self, conversation_id: &str, last: &LastMessage) -> Result<bool> {
        let counter = unread_column(last.sender_type.counterpart());

        self.with_conn_mut(|conn| {
            let n = conn.execute(
                &format!(
                    "UPDATE conversations SET
                        last_message = ?1,
                        last_message_type = ?2,
                        last_message_at = ?3,
                        last_message_sender_id = ?4,
                        last_message_sender_type = ?5,
                        {counter} = {counter} + 1,
                        updated_at = ?3
                     WHERE id = ?6"
                ),
                params![
                    last.text,
                    last.message_type.as_str(),
                    encode_ts(&last.at),
                    last.sender_id,
                    last.sender_type.as_str(),
                    conversation_id,
                ],
            )?;
            Ok(n > 0)
        })
    }

    fn archive_conversation(&self, id: &str, at: DateTime<Utc>) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let n = conn.execute(
                "UPDATE conversations SET status = 'archived', updated_at = ?1 WHERE id = ?2",
                params![encode_ts(&at), id],
            )?;
            Ok(n > 0)
        })
    }

    fn insert_message(&self, m: &Message) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                &format!(
                    "INSERT INTO messages ({MESSAGE_COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
                ),
                params![
                    m.id,
                    m.conversation_id,
                    m.sender_id,
                    m.sender_type.as_str(),
                    m.sender_name,
                    m.content,
                    m.image_url,
                    m.message_type.as_str(),
                    m.status.as_str(),
                    m.delivered_at.as_ref().map(encode_ts),
                    m.read_at.as_ref().map(encode_ts),
                    encode_ts(&m.created_at),
                ],
            )?;
            Ok(())
        })
    }

    fn get_message(&self, id: &str) -> Result<Option<Message>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"),
                [id],
                map_message,
            )
            .optional()
        })
    }

    fn list_messages(
        &self,
        conversation_id: &str,
        limit: u32,
        after: Option<&Message>,
    ) -> Result<Vec<Message>> {
        self.with_conn(|conn| {
            let rows = match after {
                Some(cursor) => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {MESSAGE_COLUMNS} FROM messages
                         WHERE conversation_id = ?1
                           AND (created_at < ?3 OR (created_at = ?3 AND id < ?4))
                         ORDER BY created_at DESC, id DESC
                         LIMIT ?2"
                    ))?;
                    stmt.query_map(
                        params![
                            conversation_id,
                            limit,
                            encode_ts(&cursor.created_at),
                            cursor.id
                        ],
                        map_message,
                    )?
                    .collect::<std::result::Result<Vec<_>, _>>()?
                }
                None => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {MESSAGE_COLUMNS} FROM messages
                         WHERE conversation_id = ?1
                         ORDER BY created_at DESC, id DESC
                         LIMIT ?2"
                    ))?;
                    stmt.query_map(params![conversation_id, limit], map_message)?
                        .collect::<std::result::Result<Vec<_>, _>>()?
                }
            };
            Ok(rows)
        })
    }

    fn list_unread_messages(&self, conversation_id: &str) -> Result<Vec<Message>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE conversation_id = ?1 AND status != ?2"
            ))?;
            let rows = stmt
                .query_map(
                    params![conversation_id, MessageStatus::Read.as_str()],
                    map_message,
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    fn mark_messages_read(
        &self,
        conversation_id: &str,
        message_ids: &[String],
        reader: SenderType,
        at: DateTime<Utc>,
    ) -> Result<usize> {
        let read_at = encode_ts(&at);

        self.with_conn_mut(|conn| {
            let tx = conn.unchecked_transaction()?;
            let mut updated = 0;
            {
                let mut stmt = tx.prepare(
                    "UPDATE messages SET status = ?1, read_at = ?2
                     WHERE id = ?3 AND conversation_id = ?4 AND status != ?1",
                )?;
                for id in message_ids {
                    updated += stmt.execute(params![
                        MessageStatus::Read.as_str(),
                        read_at,
                        id,
                        conversation_id
                    ])?;
                }
            }
            tx.execute(
                &format!(
                    "UPDATE conversations SET {} = 0 WHERE id = ?1",
                    unread_column(reader)
                ),
                [conversation_id],
            )?;
            tx.commit()?;
            Ok(updated)
        })
    }
}

fn map_conversation(row: &Row<'_>) -> rusqlite::Result<Conversation> {
    Ok(Conversation {
        id: row.get(0)?,
        user_id: row.get(1)?,
        pharmacy_owner_id: row.get(2)?,
        pharmacy_id: row.get(3)?,
        last_message: row.get(4)?,
        last_message_type: decode_enum(5, row.get(5)?)?,
        last_message_at: decode_ts(6, row.get(6)?)?,
        last_message_sender_id: row.get(7)?,
        last_message_sender_type: decode_enum(8, row.get(8)?)?,
        unread_count_user: row.get(9)?,
        unread_count_pharmacy_owner: row.get(10)?,
        status: decode_enum(11, row.get(11)?)?,
        created_at: decode_ts(12, row.get(12)?)?,
        updated_at: decode_ts(13, row.get(13)?)?,
    })
}

fn map_message(row: &Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        sender_id: row.get(2)?,
        sender_type: decode_enum(3, row.get(3)?)?,
        sender_name: row.get(4)?,
        content: row.get(5)?,
        image_url: row.get(6)?,
        message_type: decode_enum(7, row.get(7)?)?,
        status: decode_enum(8, row.get(8)?)?,
        delivered_at: decode_opt_ts(9, row.get(9)?)?,
        read_at: decode_opt_ts(10, row.get(10)?)?,
        created_at: decode_ts(11, row.get(11)?)?,
    })
}
