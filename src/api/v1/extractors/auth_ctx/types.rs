/*
 * Responsibility
 * - The authenticated context handlers see
 * - Filled in by the access middleware; handlers only read it
 */
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::services::oauth::AccessToken;

/// Context attached to an authenticated request.
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub token: AccessToken,
}

impl AuthCtx {
    pub fn new(token: AccessToken) -> Self {
        Self { token }
    }

    pub fn resource_owner_id(&self) -> Option<Uuid> {
        self.token.resource_owner_id
    }

    pub fn scopes(&self) -> Vec<String> {
        self.token.scopes().into_iter().map(str::to_owned).collect()
    }

    pub fn expires_in_at(&self, now: DateTime<Utc>) -> Option<i64> {
        self.token.expires_in_remaining_at(now)
    }
}
