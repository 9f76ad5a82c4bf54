use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::repos::error::RepoResult;
use crate::services::oauth::token::AccessToken;

/// DB access for OAuth access tokens.
///
/// Notes:
/// - The schema is owned elsewhere; this repo assumes at least:
///   - oauth_access_tokens.id (bigint)
///   - oauth_access_tokens.token (text, unique)
///   - oauth_access_tokens.refresh_token (text, nullable, unique)
///   - oauth_access_tokens.previous_refresh_token (text, not null, default '')
///   - oauth_access_tokens.resource_owner_id (uuid, nullable)
///   - oauth_access_tokens.application_id (bigint, nullable)
///   - oauth_access_tokens.scopes (text, nullable)
///   - oauth_access_tokens.expires_in (integer, nullable)
///   - oauth_access_tokens.created_at (timestamptz)
///   - oauth_access_tokens.revoked_at (timestamptz, nullable)
/// - With `hash_token_secrets` the `token` column holds hex(sha256(token)).
#[derive(Clone, Debug)]
pub struct AccessTokenRepo {
    pool: PgPool,
    hash_token_secrets: bool,
}

impl AccessTokenRepo {
    pub fn new(pool: PgPool, hash_token_secrets: bool) -> Self {
        Self {
            pool,
            hash_token_secrets,
        }
    }

    /// Fetch a token row by the presented token value.
    ///
    /// Revoked/expired rows are returned as well; callers decide what to do with them.
    pub async fn find_by_token(&self, token: &str) -> RepoResult<Option<AccessTokenRow>> {
        let stored = self.stored_value(token);

        let row = sqlx::query_as::<_, AccessTokenRow>(
            r#"
            SELECT
                id,
                token,
                refresh_token,
                previous_refresh_token,
                resource_owner_id,
                application_id,
                scopes,
                expires_in,
                created_at,
                revoked_at
            FROM oauth_access_tokens
            WHERE token = $1
            LIMIT 1
            "#,
        )
        .bind(stored)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Revoke the access token that owns `previous_refresh_token`, then clear the
    /// pointer on `id` so the revoke happens only once.
    ///
    /// Returns the number of access tokens revoked (0 or 1).
    pub async fn revoke_previous_refresh_token(
        &self,
        id: i64,
        previous_refresh_token: &str,
        now: DateTime<Utc>,
    ) -> RepoResult<u64> {
        let mut tx = self.pool.begin().await?;

        let done = sqlx::query(
            r#"
            UPDATE oauth_access_tokens
            SET revoked_at = $2
            WHERE refresh_token = $1
                AND revoked_at IS NULL
            "#,
        )
        .bind(previous_refresh_token)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE oauth_access_tokens
            SET previous_refresh_token = ''
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(done.rows_affected())
    }

    fn stored_value(&self, token: &str) -> String {
        if self.hash_token_secrets {
            hash_token(token)
        } else {
            token.to_string()
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AccessTokenRow {
    pub id: i64,
    pub token: String,
    pub refresh_token: Option<String>,
    pub previous_refresh_token: String,
    pub resource_owner_id: Option<Uuid>,
    pub application_id: Option<i64>,
    pub scopes: Option<String>,
    pub expires_in: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl From<AccessTokenRow> for AccessToken {
    fn from(row: AccessTokenRow) -> Self {
        Self {
            id: row.id,
            token: row.token,
            refresh_token: row.refresh_token,
            previous_refresh_token: Some(row.previous_refresh_token).filter(|s| !s.is_empty()),
            resource_owner_id: row.resource_owner_id,
            application_id: row.application_id,
            scopes: row.scopes,
            expires_in: row.expires_in.map(i64::from),
            created_at: row.created_at,
            revoked_at: row.revoked_at,
        }
    }
}

/// hex(sha256(token)), the stored form when token secrets are hashed.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(previous_refresh_token: &str) -> AccessTokenRow {
        AccessTokenRow {
            id: 7,
            token: "t".into(),
            refresh_token: Some("r".into()),
            previous_refresh_token: previous_refresh_token.into(),
            resource_owner_id: Some(Uuid::nil()),
            application_id: Some(3),
            scopes: Some("read".into()),
            expires_in: Some(7200),
            created_at: Utc::now(),
            revoked_at: None,
        }
    }

    #[test]
    fn empty_previous_refresh_token_maps_to_none() {
        let token = AccessToken::from(row(""));
        assert_eq!(token.previous_refresh_token, None);
        assert_eq!(token.expires_in, Some(7200));
    }

    #[test]
    fn previous_refresh_token_is_kept() {
        let token = AccessToken::from(row("old"));
        assert_eq!(token.previous_refresh_token.as_deref(), Some("old"));
    }

    #[test]
    fn hash_token_is_hex_sha256() {
        assert_eq!(
            hash_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
