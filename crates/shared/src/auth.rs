//! Session claims carried by bearer tokens.
//!
//! The session collaborator only supplies who is acting and in which role;
//! credentials are managed outside this system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// JWT claims for access tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (display name of the acting personnel).
    pub sub: String,
    /// Role label, e.g. "Liaison" or "Accounting".
    pub role: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for an actor.
    #[must_use]
    pub fn new(name: &str, role: &str, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: name.to_string(),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the actor's display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.sub
    }

    /// Returns the raw role label.
    #[must_use]
    pub fn role(&self) -> &str {
        &self.role
    }
}
