//! Persistent ticket to remote document links.

mod sqlite_store;
mod store;

pub use sqlite_store::SqliteLinkStore;
pub use store::{link_key, DeleteOutcome, DocumentLink, LinkError, LinkStore, NewLink, SetOutcome};
