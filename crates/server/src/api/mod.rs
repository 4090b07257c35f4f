pub mod attachments;
pub mod documents;
pub mod forms;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod signers;

pub use response::{ApiError, ErrorResponse, WorkflowContext, WorkflowResponse};
pub use routes::create_router;
