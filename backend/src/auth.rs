//! Identity Provider
//!
//! Supplies the opaque identifier of the acting user. Every write is stamped
//! with it and every read is filtered by it. The sign-in flow itself (email,
//! password, account creation) lives outside this backend; only the signed-in
//! state is modeled here.

use std::sync::RwLock;

use crate::domain::{DomainError, DomainResult};

/// Opaque user identifier
pub type UserId = String;

/// Source of the acting identity
pub trait IdentityProvider: Send + Sync {
    /// The signed-in user, or `Unauthenticated` when there is none.
    fn current_user_id(&self) -> DomainResult<UserId>;
}

/// Mutable signed-in state for one app session
pub struct Session {
    current: RwLock<Option<UserId>>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(None),
        }
    }

    pub fn sign_in(&self, user_id: impl Into<UserId>) {
        *self.current.write().expect("session lock poisoned") = Some(user_id.into());
    }

    pub fn sign_out(&self) {
        *self.current.write().expect("session lock poisoned") = None;
    }

    pub fn is_signed_in(&self) -> bool {
        self.current.read().expect("session lock poisoned").is_some()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityProvider for Session {
    fn current_user_id(&self) -> DomainResult<UserId> {
        self.current
            .read()
            .expect("session lock poisoned")
            .clone()
            .ok_or(DomainError::Unauthenticated)
    }
}

/// Always-signed-in identity, for tests and tooling
pub struct FixedIdentity(UserId);

impl FixedIdentity {
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self(user_id.into())
    }
}

impl IdentityProvider for FixedIdentity {
    fn current_user_id(&self) -> DomainResult<UserId> {
        Ok(self.0.clone())
    }
}
