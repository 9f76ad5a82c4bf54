use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, error};

use crate::repos::access_token_repo::AccessTokenRepo;
use crate::repos::error::RepoResult;
use crate::services::oauth::token::AccessToken;

/// Persistence seam for the authenticator.
///
/// Implementations own all consistency guarantees (at most one live token per
/// value, serialising concurrent revokes). Errors are returned as-is to the
/// caller of `TokenAuthenticator::authenticate`.
#[async_trait]
pub trait TokenStore: Send + Sync {
    // Exact-match lookup on the presented token value.
    async fn find_by_token(&self, token: &str) -> RepoResult<Option<AccessToken>>;

    // Invalidate the refresh token superseded by `token`, if any.
    async fn revoke_previous_refresh_token(&self, token: &AccessToken) -> RepoResult<()>;
}

#[async_trait]
impl TokenStore for AccessTokenRepo {
    async fn find_by_token(&self, token: &str) -> RepoResult<Option<AccessToken>> {
        let row = AccessTokenRepo::find_by_token(self, token)
            .await
            .inspect_err(|e| error!(error = ?e, "Failed to find access token"))?;

        Ok(row.map(AccessToken::from))
    }

    async fn revoke_previous_refresh_token(&self, token: &AccessToken) -> RepoResult<()> {
        let Some(previous) = token.previous_refresh_token.as_deref() else {
            return Ok(());
        };

        let revoked =
            AccessTokenRepo::revoke_previous_refresh_token(self, token.id, previous, Utc::now())
                .await
                .inspect_err(|e| {
                    error!(
                        token_id = token.id,
                        error = ?e,
                        "Failed to revoke previous refresh token"
                    )
                })?;

        debug!(token_id = token.id, revoked, "Previous refresh token revoked");
        Ok(())
    }
}
