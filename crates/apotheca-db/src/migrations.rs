use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE accounts (
                id                      TEXT PRIMARY KEY,
                role                    TEXT NOT NULL,
                name                    TEXT NOT NULL,
                email                   TEXT NOT NULL,
                password                TEXT NOT NULL,
                status                  TEXT NOT NULL,
                pharmacy_id             TEXT,
                notifications_enabled   INTEGER,
                created_at              TEXT NOT NULL,
                updated_at              TEXT NOT NULL,
                created_by              TEXT,
                UNIQUE(role, email)
            );

            CREATE TABLE pharmacies (
                id              TEXT PRIMARY KEY,
                title           TEXT NOT NULL,
                description     TEXT NOT NULL,
                image_url       TEXT NOT NULL DEFAULT '',
                location        TEXT NOT NULL,
                owner_id        TEXT NOT NULL REFERENCES accounts(id),
                working_hours   TEXT NOT NULL DEFAULT '[]',
                status          TEXT NOT NULL,
                created_at      TEXT NOT NULL,
                updated_at      TEXT NOT NULL,
                created_by      TEXT NOT NULL
            );

            CREATE INDEX idx_pharmacies_owner ON pharmacies(owner_id);

            CREATE TABLE medicines (
                id              TEXT PRIMARY KEY,
                title           TEXT NOT NULL,
                description     TEXT NOT NULL,
                front_image_url TEXT NOT NULL DEFAULT '',
                back_image_url  TEXT NOT NULL DEFAULT '',
                status          TEXT NOT NULL,
                created_at      TEXT NOT NULL,
                updated_at      TEXT NOT NULL,
                created_by      TEXT NOT NULL
            );

            -- No foreign key on medicine_id: catalog deletes leave rows behind.
            CREATE TABLE pharmacy_medicines (
                id              TEXT PRIMARY KEY,
                pharmacy_id     TEXT NOT NULL REFERENCES pharmacies(id),
                medicine_id     TEXT NOT NULL,
                status          TEXT NOT NULL,
                added_at        TEXT NOT NULL,
                updated_at      TEXT NOT NULL,
                added_by        TEXT NOT NULL,
                UNIQUE(pharmacy_id, medicine_id)
            );

            CREATE TABLE medicine_subscriptions (
                id              TEXT PRIMARY KEY,
                user_id         TEXT NOT NULL,
                pharmacy_id     TEXT NOT NULL,
                medicine_name   TEXT NOT NULL,
                pharmacy_name   TEXT NOT NULL DEFAULT '',
                notified        INTEGER NOT NULL DEFAULT 0,
                triggered       INTEGER NOT NULL DEFAULT 0,
                triggered_at    TEXT
            );

            CREATE INDEX idx_subscriptions_lookup
                ON medicine_subscriptions(pharmacy_id, medicine_name, triggered);

            CREATE TABLE conversations (
                id                          TEXT PRIMARY KEY,
                user_id                     TEXT NOT NULL,
                pharmacy_owner_id           TEXT NOT NULL,
                pharmacy_id                 TEXT NOT NULL,
                last_message                TEXT NOT NULL DEFAULT '',
                last_message_type           TEXT NOT NULL,
                last_message_at             TEXT NOT NULL,
                last_message_sender_id      TEXT NOT NULL DEFAULT '',
                last_message_sender_type    TEXT NOT NULL,
                unread_count_user           INTEGER NOT NULL DEFAULT 0,
                unread_count_pharmacy_owner INTEGER NOT NULL DEFAULT 0,
                status                      TEXT NOT NULL,
                created_at                  TEXT NOT NULL,
                updated_at                  TEXT NOT NULL,
                UNIQUE(user_id, pharmacy_owner_id)
            );

            CREATE INDEX idx_conversations_user
                ON conversations(user_id, status, last_message_at);
            CREATE INDEX idx_conversations_owner
                ON conversations(pharmacy_owner_id, status, last_message_at);

            CREATE TABLE messages (
                id              TEXT PRIMARY KEY,
                conversation_id TEXT NOT NULL REFERENCES conversations(id),
                sender_id       TEXT NOT NULL,
                sender_type     TEXT NOT NULL,
                sender_name     TEXT NOT NULL,
                content         TEXT NOT NULL DEFAULT '',
                image_url       TEXT,
                type            TEXT NOT NULL,
                status          TEXT NOT NULL,
                delivered_at    TEXT,
                read_at         TEXT,
                created_at      TEXT NOT NULL
            );

            CREATE INDEX idx_messages_conversation
                ON messages(conversation_id, created_at, id);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        run(&conn).unwrap();

        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(version, 1);
    }
}
