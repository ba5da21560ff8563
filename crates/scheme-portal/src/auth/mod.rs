//! Bearer-credential resolution and scope checks for the workflow routers.

mod registry;

pub use registry::{IssuedToken, TokenRegistry, ADMIN_PRINCIPAL};

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::error::{error_response, ErrorKind};
use crate::workflows::profiles::CitizenId;

/// Who a resolved credential belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityKind {
    Citizen,
    Admin,
}

/// Outcome of resolving a bearer token. For citizens `key` is their citizen
/// id; for administrators it is the configured admin principal name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub kind: IdentityKind,
    pub key: String,
}

impl Identity {
    pub fn citizen(citizen_id: &CitizenId) -> Self {
        Self {
            kind: IdentityKind::Citizen,
            key: citizen_id.0.clone(),
        }
    }

    pub fn admin(principal: impl Into<String>) -> Self {
        Self {
            kind: IdentityKind::Admin,
            key: principal.into(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.kind == IdentityKind::Admin
    }

    /// Scope citizen-only actions to the caller's own id.
    pub fn require_citizen(&self) -> Result<CitizenId, AccessError> {
        match self.kind {
            IdentityKind::Citizen => Ok(CitizenId(self.key.clone())),
            IdentityKind::Admin => Err(AccessError::Forbidden("citizen access required")),
        }
    }

    pub fn require_admin(&self) -> Result<(), AccessError> {
        match self.kind {
            IdentityKind::Admin => Ok(()),
            IdentityKind::Citizen => Err(AccessError::Forbidden("admin access required")),
        }
    }
}

/// Credential resolution failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("token is missing")]
    Missing,
    #[error("token is invalid")]
    Invalid,
    #[error("token has expired")]
    Expired,
}

/// Resolves bearer credentials. Supplied at startup so tests can inject
/// their own provider.
pub trait IdentityProvider: Send + Sync {
    fn resolve(&self, bearer_token: &str) -> Result<Identity, AuthError>;
}

/// Boundary failure: either the credential did not resolve or the resolved
/// identity is outside the action's scope.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("{0}")]
    Forbidden(&'static str),
}

impl AccessError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AccessError::Auth(_) => ErrorKind::Auth,
            AccessError::Forbidden(_) => ErrorKind::Forbidden,
        }
    }
}

impl IntoResponse for AccessError {
    fn into_response(self) -> Response {
        error_response(self.kind(), self.to_string())
    }
}

/// Extract the token from `Authorization`, accepting both `Bearer <token>`
/// and a bare token.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let raw = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::Missing)?
        .to_str()
        .map_err(|_| AuthError::Invalid)?
        .trim();

    if raw.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::Missing);
    }

    let token = match raw.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        _ => raw,
    };

    if token.is_empty() {
        Err(AuthError::Missing)
    } else {
        Ok(token)
    }
}

pub fn authenticate(
    provider: &dyn IdentityProvider,
    headers: &HeaderMap,
) -> Result<Identity, AccessError> {
    let token = bearer_token(headers)?;
    provider.resolve(token).map_err(|err| {
        tracing::debug!(error = %err, "bearer credential rejected");
        AccessError::Auth(err)
    })
}
