use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::repos::error::{RepoError, RepoResult};
use crate::services::oauth::locator::{self, LocatorError, Strategy};
use crate::services::oauth::request::CredentialRequest;
use crate::services::oauth::store::TokenStore;
use crate::services::oauth::token::AccessToken;

/// Policy knobs captured at construction.
///
/// Note: kept separate from `Config` so the authenticator can be built in tests
/// without touching the environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthenticatorPolicy {
    // When true, every successful lookup revokes the refresh token that the
    // found access token superseded.
    pub refresh_token_rotation: bool,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Locator(#[from] LocatorError),
    #[error(transparent)]
    Store(#[from] RepoError),
}

/// Resolves an inbound credential to a stored access token.
#[derive(Clone)]
pub struct TokenAuthenticator {
    store: Arc<dyn TokenStore>,
    policy: AuthenticatorPolicy,
}

impl std::fmt::Debug for TokenAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAuthenticator")
            .field("policy", &self.policy)
            .finish()
    }
}

impl TokenAuthenticator {
    pub fn new(store: Arc<dyn TokenStore>, policy: AuthenticatorPolicy) -> Self {
        Self { store, policy }
    }

    /// Locate a credential and look it up.
    ///
    /// - No credential: `Ok(None)` without touching the store.
    /// - Unknown token: `Ok(None)`.
    /// - Store errors (lookup or revoke) are returned unchanged.
    pub async fn authenticate(
        &self,
        request: &dyn CredentialRequest,
        strategies: &[Strategy],
    ) -> RepoResult<Option<AccessToken>> {
        let Some(credential) = locator::locate(request, strategies) else {
            debug!("no credential in request");
            return Ok(None);
        };

        let access_token = self.store.find_by_token(&credential).await?;

        if self.policy.refresh_token_rotation {
            if let Some(token) = &access_token {
                debug!(token_id = token.id, "revoking previous refresh token");
                self.store.revoke_previous_refresh_token(token).await?;
            }
        }

        Ok(access_token)
    }

    /// Same as [`authenticate`](Self::authenticate), resolving strategy names first.
    pub async fn authenticate_named(
        &self,
        request: &dyn CredentialRequest,
        names: &[&str],
    ) -> Result<Option<AccessToken>, AuthError> {
        let strategies = Strategy::resolve_all(names)?;
        Ok(self.authenticate(request, &strategies).await?)
    }
}
