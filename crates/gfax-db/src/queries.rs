use crate::Database;
use crate::error::StoreError;
use crate::models::{MessageRow, UserRow};
use rusqlite::{Connection, OptionalExtension, params};

/// Public fax identifier derived from the numeric primary key.
pub fn fax_number_for(id: i64) -> String {
    format!("GFAX-{}", 1000 + id)
}

impl Database {
    // -- Users --

    /// Inserts a user and backfills the derived fax number. Two-phase by
    /// necessity: the fax number is derived from the rowid, which does not
    /// exist before the insert. Both writes commit atomically.
    pub fn register_user(&self, email: &str) -> Result<UserRow, StoreError> {
        self.with_conn(|conn| {
            let tx = conn.unchecked_transaction()?;
            tx.execute("INSERT INTO users (email) VALUES (?1)", [email])
                .map_err(map_unique_violation)?;
            let id = tx.last_insert_rowid();
            tx.execute(
                "UPDATE users SET fax_number = ?1 WHERE id = ?2",
                params![fax_number_for(id), id],
            )?;
            tx.commit()?;

            query_user(conn, "id = ?1", &id)?.ok_or(StoreError::Sqlite(
                rusqlite::Error::QueryReturnedNoRows,
            ))
        })
    }

    pub fn user_by_email(&self, email: &str) -> Result<Option<UserRow>, StoreError> {
        self.with_conn(|conn| query_user(conn, "email = ?1", &email))
    }

    /// Lookup by public identifier. Callers normalize the input
    /// (trim + ASCII uppercase) before calling.
    pub fn user_by_fax_number(&self, fax_number: &str) -> Result<Option<UserRow>, StoreError> {
        self.with_conn(|conn| query_user(conn, "fax_number = ?1", &fax_number))
    }

    pub fn user_by_id(&self, id: i64) -> Result<Option<UserRow>, StoreError> {
        self.with_conn(|conn| query_user(conn, "id = ?1", &id))
    }

    // -- Messages --

    pub fn insert_message(
        &self,
        sender_info: &str,
        recipient_id: i64,
        content: &str,
    ) -> Result<MessageRow, StoreError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (sender_info, content, recipient_id) VALUES (?1, ?2, ?3)",
                params![sender_info, content, recipient_id],
            )?;
            let id = conn.last_insert_rowid();

            query_message(conn, id)?.ok_or(StoreError::Sqlite(
                rusqlite::Error::QueryReturnedNoRows,
            ))
        })
    }

    pub fn message_by_id(&self, id: i64) -> Result<Option<MessageRow>, StoreError> {
        self.with_conn(|conn| query_message(conn, id))
    }

    /// Inbox listing, newest first. The id tiebreak matters because SQLite
    /// timestamps only have one-second resolution.
    pub fn messages_for_recipient(&self, recipient_id: i64) -> Result<Vec<MessageRow>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, sender_info, content, recipient_id, created_at
                 FROM messages
                 WHERE recipient_id = ?1
                 ORDER BY created_at DESC, id DESC",
            )?;

            let rows = stmt
                .query_map([recipient_id], message_from_row)?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

fn query_user(
    conn: &Connection,
    filter: &str,
    value: &dyn rusqlite::types::ToSql,
) -> Result<Option<UserRow>, StoreError> {
    let sql = format!(
        "SELECT id, email, fax_number, created_at FROM users WHERE {}",
        filter
    );
    let mut stmt = conn.prepare(&sql)?;

    let row = stmt
        .query_row([value], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                email: row.get(1)?,
                fax_number: row.get(2)?,
                created_at: row.get(3)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_message(conn: &Connection, id: i64) -> Result<Option<MessageRow>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, sender_info, content, recipient_id, created_at FROM messages WHERE id = ?1",
    )?;

    let row = stmt.query_row([id], message_from_row).optional()?;

    Ok(row)
}

fn message_from_row(row: &rusqlite::Row<'_>) -> Result<MessageRow, rusqlite::Error> {
    Ok(MessageRow {
        id: row.get(0)?,
        sender_info: row.get(1)?,
        content: row.get(2)?,
        recipient_id: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn map_unique_violation(e: rusqlite::Error) -> StoreError {
    match &e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            StoreError::DuplicateEmail
        }
        _ => StoreError::Sqlite(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn register_assigns_derived_fax_number() {
        let db = db();
        let alice = db.register_user("alice@example.com").unwrap();
        let bob = db.register_user("bob@example.com").unwrap();

        assert_eq!(alice.fax_number, format!("GFAX-{}", 1000 + alice.id));
        assert_eq!(bob.fax_number, format!("GFAX-{}", 1000 + bob.id));
        assert_ne!(alice.fax_number, bob.fax_number);
    }

    #[test]
    fn first_user_gets_gfax_1001() {
        let db = db();
        let user = db.register_user("alice@example.com").unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(user.fax_number, "GFAX-1001");
    }

    #[test]
    fn duplicate_email_is_rejected_without_a_second_row() {
        let db = db();
        db.register_user("alice@example.com").unwrap();

        let err = db.register_user("alice@example.com").unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));

        let count: i64 = db
            .with_conn(|conn| {
                Ok(conn
                    .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?)
            })
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn user_lookup_by_fax_number() {
        let db = db();
        let alice = db.register_user("alice@example.com").unwrap();

        let found = db.user_by_fax_number(&alice.fax_number).unwrap().unwrap();
        assert_eq!(found.id, alice.id);
        assert_eq!(found.email, "alice@example.com");

        assert!(db.user_by_fax_number("GFAX-9999").unwrap().is_none());
    }

    #[test]
    fn send_and_list_inbox() {
        let db = db();
        let alice = db.register_user("alice@example.com").unwrap();
        let bob = db.register_user("bob@example.com").unwrap();

        let msg = db
            .insert_message(&alice.fax_number, bob.id, "Hello")
            .unwrap();
        assert_eq!(msg.sender_info, alice.fax_number);
        assert_eq!(msg.recipient_id, bob.id);
        assert_eq!(msg.content, "Hello");
        assert!(!msg.created_at.is_empty());

        let inbox = db.messages_for_recipient(bob.id).unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].id, msg.id);

        // Not visible in the sender's inbox.
        assert!(db.messages_for_recipient(alice.id).unwrap().is_empty());
    }

    #[test]
    fn inbox_is_newest_first() {
        let db = db();
        let alice = db.register_user("alice@example.com").unwrap();
        let bob = db.register_user("bob@example.com").unwrap();

        let first = db.insert_message(&alice.fax_number, bob.id, "one").unwrap();
        let second = db.insert_message(&alice.fax_number, bob.id, "two").unwrap();
        let third = db.insert_message(&alice.fax_number, bob.id, "three").unwrap();

        let inbox = db.messages_for_recipient(bob.id).unwrap();
        let ids: Vec<i64> = inbox.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);
    }

    #[test]
    fn missing_message_is_none() {
        let db = db();
        assert!(db.message_by_id(42).unwrap().is_none());
    }
}
