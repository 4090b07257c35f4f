pub mod attachment;
pub mod auth;
pub mod config;
pub mod document;
pub mod error;
pub mod form;
pub mod link;
pub mod metrics;
pub mod notify;
pub mod signer;
pub mod signing;
pub mod submission;
pub mod testing;

pub use attachment::{
    Attachment, AttachmentResolver, FetchError, HelpdeskApi, HelpdeskClient,
    TicketAttachmentSource, TicketId,
};
pub use auth::{
    create_authenticator, AgentIdentity, AuthError, AuthRequest, Authenticator,
    NoneAuthenticator,
};
pub use config::{
    load_config, load_config_from_str, validate_config, AuthMethod, Config, ConfigError,
    SanitizedConfig,
};
pub use document::{DocumentTracker, TrackedDocument};
pub use error::WorkflowError;
pub use form::{FieldDescriptor, FieldKind, FormSchema, FormValues, ValidationErrors};
pub use link::{DocumentLink, LinkError, LinkStore, SqliteLinkStore};
pub use notify::{
    CollectingNotifier, HostEvent, Notification, NotificationKind, NotificationSink,
};
pub use signer::{
    DraftRow, SignatureKind, Signer, SignerDraftTable, SignerForm, SignerManagementWorkflow,
    SignerOrderError, SignerOrderValidator, SignerRole, SignerRow,
};
pub use signing::{D4SignClient, RemoteDocument, RemoteSigningClient, SigningError};
pub use submission::{
    DocumentForm, SubmissionPhase, SubmissionReport, SubmissionRequest, SubmissionWorkflow,
};
