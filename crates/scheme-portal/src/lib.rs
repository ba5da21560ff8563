//! Welfare scheme enrollment core: eligibility evaluation plus the application
//! and profile edit-request lifecycles, with the store and identity contracts
//! they depend on.

pub mod auth;
pub mod config;
pub mod error;
pub mod store;
pub mod telemetry;
pub mod workflows;
