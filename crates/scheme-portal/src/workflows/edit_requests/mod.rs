//! Citizen-initiated profile edit requests and their one-shot admin
//! resolution.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Decision, EditRequest, EditRequestId, EditRequestStatus, EditRequestSubmission, Resolution,
};
pub use repository::EditRequestRepository;
pub use router::{edit_request_router, EditRequestRoutes};
pub use service::{EditRequestError, EditRequestService};
