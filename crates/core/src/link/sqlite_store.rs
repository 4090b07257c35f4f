//! SQLite-backed link store implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::{link_key, DeleteOutcome, DocumentLink, LinkError, LinkStore, NewLink, SetOutcome};
use crate::attachment::TicketId;

/// SQLite-backed key/value link store.
pub struct SqliteLinkStore {
    conn: Mutex<Connection>,
}

impl SqliteLinkStore {
    /// Open (or create) the database file and its tables.
    pub fn new(path: &Path) -> Result<Self, LinkError> {
        let conn = Connection::open(path).map_err(|e| LinkError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, LinkError> {
        let conn =
            Connection::open_in_memory().map_err(|e| LinkError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), LinkError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS document_links (
                key TEXT PRIMARY KEY,
                ticket_id INTEGER NOT NULL,
                document_uuid TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .map_err(|e| LinkError::Database(e.to_string()))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, LinkError> {
        self.conn
            .lock()
            .map_err(|e| LinkError::Database(format!("connection lock poisoned: {}", e)))
    }

    fn query_link(conn: &Connection, ticket_id: TicketId) -> Result<Option<DocumentLink>, LinkError> {
        conn.query_row(
            "SELECT ticket_id, document_uuid, created_at, updated_at FROM document_links WHERE key = ?",
            params![link_key(ticket_id)],
            Self::row_to_link,
        )
        .optional()
        .map_err(|e| LinkError::Database(e.to_string()))
    }

    fn row_to_link(row: &rusqlite::Row) -> rusqlite::Result<DocumentLink> {
        let ticket_id: i64 = row.get(0)?;
        let document_uuid: String = row.get(1)?;
        let created_at_str: String = row.get(2)?;
        let updated_at_str: String = row.get(3)?;

        let ticket_id = TicketId::try_from(ticket_id)
            .map_err(|_| rusqlite::Error::IntegralValueOutOfRange(0, ticket_id))?;

        Ok(DocumentLink {
            ticket_id,
            document_uuid,
            created_at: parse_timestamp(&created_at_str),
            updated_at: parse_timestamp(&updated_at_str),
        })
    }
}

/// SQLite integers are signed; ids past `i64::MAX` cannot be stored.
fn column_id(ticket_id: TicketId) -> Result<i64, LinkError> {
    i64::try_from(ticket_id)
        .map_err(|_| LinkError::Database(format!("ticket id {} out of range", ticket_id)))
}

fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

impl LinkStore for SqliteLinkStore {
    fn get(&self, ticket_id: TicketId) -> Result<Option<DocumentLink>, LinkError> {
        let conn = self.lock()?;
        Self::query_link(&conn, ticket_id)
    }

    fn set(&self, ticket_id: TicketId, document_uuid: &str) -> Result<SetOutcome, LinkError> {
        let column = column_id(ticket_id)?;
        let conn = self.lock()?;
        let now = Utc::now().to_rfc3339();

        let updated = conn
            .execute(
                "UPDATE document_links SET document_uuid = ?, updated_at = ? WHERE key = ?",
                params![document_uuid, now, link_key(ticket_id)],
            )
            .map_err(|e| LinkError::Database(e.to_string()))?;
        if updated > 0 {
            return Ok(SetOutcome::Updated);
        }

        conn.execute(
            "INSERT INTO document_links (key, ticket_id, document_uuid, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
            params![link_key(ticket_id), column, document_uuid, now, now],
        )
        .map_err(|e| LinkError::Database(e.to_string()))?;
        Ok(SetOutcome::Created)
    }

    fn delete(&self, ticket_id: TicketId) -> Result<DeleteOutcome, LinkError> {
        let conn = self.lock()?;
        let deleted = conn
            .execute(
                "DELETE FROM document_links WHERE key = ?",
                params![link_key(ticket_id)],
            )
            .map_err(|e| LinkError::Database(e.to_string()))?;

        Ok(if deleted > 0 {
            DeleteOutcome::Deleted
        } else {
            DeleteOutcome::NotFound
        })
    }

    fn create(&self, link: NewLink) -> Result<DocumentLink, LinkError> {
        let column = column_id(link.ticket_id)?;
        let conn = self.lock()?;

        if let Some(existing) = Self::query_link(&conn, link.ticket_id)? {
            return Err(LinkError::AlreadyLinked {
                ticket_id: link.ticket_id,
                document_uuid: existing.document_uuid,
            });
        }

        let now = Utc::now();
        conn.execute(
            "INSERT INTO document_links (key, ticket_id, document_uuid, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
            params![
                link_key(link.ticket_id),
                column,
                link.document_uuid,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ],
        )
        .map_err(|e| LinkError::Database(e.to_string()))?;

        Ok(DocumentLink {
            ticket_id: link.ticket_id,
            document_uuid: link.document_uuid,
            created_at: now,
            updated_at: now,
        })
    }
}
