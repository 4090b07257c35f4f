//! In-memory link store with injectable write failures.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::attachment::TicketId;
use crate::link::{DeleteOutcome, DocumentLink, LinkError, LinkStore, NewLink, SetOutcome};

/// Mock implementation of [`LinkStore`].
///
/// Reads always work. Once [`MockLinkStore::fail_writes`] is called, every
/// `set`, `delete` and `create` returns `LinkError::Database` with that message.
#[derive(Debug, Default)]
pub struct MockLinkStore {
    links: Mutex<HashMap<TicketId, DocumentLink>>,
    write_error: Mutex<Option<String>>,
}

impl MockLinkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, message: &str) {
        *self.write_error.lock().unwrap() = Some(message.to_string());
    }

    pub fn len(&self) -> usize {
        self.links.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_write(&self) -> Result<(), LinkError> {
        match self.write_error.lock().unwrap().as_ref() {
            Some(message) => Err(LinkError::Database(message.clone())),
            None => Ok(()),
        }
    }
}

impl LinkStore for MockLinkStore {
    fn get(&self, ticket_id: TicketId) -> Result<Option<DocumentLink>, LinkError> {
        Ok(self.links.lock().unwrap().get(&ticket_id).cloned())
    }

    fn set(&self, ticket_id: TicketId, document_uuid: &str) -> Result<SetOutcome, LinkError> {
        self.check_write()?;
        let now = Utc::now();
        let mut links = self.links.lock().unwrap();
        match links.get_mut(&ticket_id) {
            Some(link) => {
                link.document_uuid = document_uuid.to_string();
                link.updated_at = now;
                Ok(SetOutcome::Updated)
            }
            None => {
                links.insert(
                    ticket_id,
                    DocumentLink {
                        ticket_id,
                        document_uuid: document_uuid.to_string(),
                        created_at: now,
                        updated_at: now,
                    },
                );
                Ok(SetOutcome::Created)
            }
        }
    }

    fn delete(&self, ticket_id: TicketId) -> Result<DeleteOutcome, LinkError> {
        self.check_write()?;
        match self.links.lock().unwrap().remove(&ticket_id) {
            Some(_) => Ok(DeleteOutcome::Deleted),
            None => Ok(DeleteOutcome::NotFound),
        }
    }

    fn create(&self, link: NewLink) -> Result<DocumentLink, LinkError> {
        self.check_write()?;
        let mut links = self.links.lock().unwrap();
        if let Some(existing) = links.get(&link.ticket_id) {
            return Err(LinkError::AlreadyLinked {
                ticket_id: link.ticket_id,
                document_uuid: existing.document_uuid.clone(),
            });
        }
        let now = Utc::now();
        let created = DocumentLink {
            ticket_id: link.ticket_id,
            document_uuid: link.document_uuid,
            created_at: now,
            updated_at: now,
        };
        links.insert(created.ticket_id, created.clone());
        Ok(created)
    }
}
