//! Signatories: typed signer records, order validation, the pre-submission
//! draft table and remote signer management.

mod draft;
mod form;
mod order;
mod types;
mod workflow;

pub use draft::{DraftRow, SignerDraftTable};
pub use form::{signer_form_schema, SignerForm};
pub use order::{SignerOrderError, SignerOrderValidator};
pub use types::{SignatureKind, Signer, SignerRole, SignerRow};
pub use workflow::{RenderCallback, SignerManagementWorkflow};
