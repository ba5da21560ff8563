use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::Serialize;
use sha2::{Digest, Sha256};

use super::{AuthError, Identity, IdentityProvider};
use crate::config::{AuthConfig, MAX_TOKEN_TTL_HOURS};
use crate::workflows::profiles::CitizenId;

/// Principal name reported for the configured admin credential.
pub const ADMIN_PRINCIPAL: &str = "admin";

#[derive(Debug, Clone)]
struct StoredToken {
    citizen_id: CitizenId,
    expires_at: DateTime<Utc>,
}

/// Token handed back to a citizen; the registry keeps only its hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// In-memory identity provider: one configured admin credential plus citizen
/// tokens issued with a fixed lifetime.
#[derive(Debug)]
pub struct TokenRegistry {
    admin_hash: String,
    ttl: Duration,
    citizens: RwLock<HashMap<String, StoredToken>>,
}

impl TokenRegistry {
    pub fn new(admin_token: &str, ttl: Duration) -> Self {
        Self {
            admin_hash: hash_secret(admin_token),
            ttl,
            citizens: RwLock::new(HashMap::new()),
        }
    }

    /// Build from loaded config. The lifetime is clamped to
    /// `1..=MAX_TOKEN_TTL_HOURS` for configs built by hand.
    pub fn from_config(config: &AuthConfig) -> Self {
        let hours = config.token_ttl_hours.clamp(1, MAX_TOKEN_TTL_HOURS);
        let ttl = Duration::try_hours(hours).unwrap_or_else(|| Duration::hours(1));
        Self::new(&config.admin_token, ttl)
    }

    pub fn issue_citizen_token(&self, citizen_id: &CitizenId) -> IssuedToken {
        let mut secret = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut secret);
        let token = hex::encode(secret);
        let expires_at = Utc::now()
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.register_citizen_token(&token, citizen_id, expires_at);
        IssuedToken { token, expires_at }
    }

    /// Register an externally minted token for `citizen_id`.
    pub fn register_citizen_token(
        &self,
        token: &str,
        citizen_id: &CitizenId,
        expires_at: DateTime<Utc>,
    ) {
        let stored = StoredToken {
            citizen_id: citizen_id.clone(),
            expires_at,
        };
        self.citizens
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(hash_secret(token), stored);
    }

    pub fn revoke(&self, token: &str) -> bool {
        self.citizens
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&hash_secret(token))
            .is_some()
    }
}

impl IdentityProvider for TokenRegistry {
    fn resolve(&self, bearer_token: &str) -> Result<Identity, AuthError> {
        let hash = hash_secret(bearer_token);
        if hash == self.admin_hash {
            return Ok(Identity::admin(ADMIN_PRINCIPAL));
        }

        let mut citizens = self
            .citizens
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let stored = citizens.get(&hash).ok_or(AuthError::Invalid)?;
        if Utc::now() > stored.expires_at {
            citizens.remove(&hash);
            return Err(AuthError::Expired);
        }
        Ok(Identity::citizen(&stored.citizen_id))
    }
}

fn hash_secret(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}
