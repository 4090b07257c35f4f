//! Document submission: primary upload, secondary uploads, signer
//! registration and ticket link persistence.

mod filename;
mod form;
mod workflow;

pub use filename::{build_filename_with_extension, normalize_filename};
pub use form::{document_form_schema, DocumentForm};
pub use workflow::{
    EventCallback, SecondaryUpload, SignerRegistration, SubmissionPhase, SubmissionReport,
    SubmissionRequest, SubmissionWorkflow,
};
