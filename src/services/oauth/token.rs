use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// Access token as seen by the authentication layer.
///
/// NOTE: decoupled from the DB row (`AccessTokenRow`) so stores other than
/// Postgres can hand these out.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub id: i64,
    pub token: String,
    pub refresh_token: Option<String>,
    // Refresh token superseded when this access token was issued.
    pub previous_refresh_token: Option<String>,
    pub resource_owner_id: Option<Uuid>,
    pub application_id: Option<i64>,
    pub scopes: Option<String>,
    // Lifetime in seconds counted from `created_at`. None = never expires.
    pub expires_in: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print token material
        f.debug_struct("AccessToken")
            .field("id", &self.id)
            .field("resource_owner_id", &self.resource_owner_id)
            .field("application_id", &self.application_id)
            .field("scopes", &self.scopes)
            .field("expires_in", &self.expires_in)
            .field("created_at", &self.created_at)
            .field("revoked_at", &self.revoked_at)
            .finish()
    }
}

impl AccessToken {
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_in {
            Some(seconds) => now > self.created_at + Duration::seconds(seconds),
            None => false,
        }
    }

    /// Usable for authenticating a request.
    pub fn is_accessible_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_revoked() && !self.is_expired_at(now)
    }

    /// Seconds left before expiry, floored at zero.
    pub fn expires_in_remaining_at(&self, now: DateTime<Utc>) -> Option<i64> {
        self.expires_in.map(|seconds| {
            let expires_at = self.created_at + Duration::seconds(seconds);
            (expires_at - now).num_seconds().max(0)
        })
    }

    /// Space-separated scopes.
    pub fn scopes(&self) -> Vec<&str> {
        self.scopes
            .as_deref()
            .map(|s| s.split_whitespace().collect())
            .unwrap_or_default()
    }

    pub fn includes_scope(&self, scope: &str) -> bool {
        self.scopes().contains(&scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn token(expires_in: Option<i64>) -> AccessToken {
        AccessToken {
            id: 1,
            token: "abc".into(),
            refresh_token: None,
            previous_refresh_token: None,
            resource_owner_id: None,
            application_id: None,
            scopes: Some("read  write".into()),
            expires_in,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            revoked_at: None,
        }
    }

    #[test]
    fn expiry_is_relative_to_creation() {
        let t = token(Some(60));
        let created = t.created_at;

        assert!(!t.is_expired_at(created + Duration::seconds(60)));
        assert!(t.is_expired_at(created + Duration::seconds(61)));
        assert_eq!(t.expires_in_remaining_at(created + Duration::seconds(45)), Some(15));
        assert_eq!(t.expires_in_remaining_at(created + Duration::seconds(90)), Some(0));
    }

    #[test]
    fn no_lifetime_never_expires() {
        let t = token(None);
        assert!(!t.is_expired_at(t.created_at + Duration::days(3650)));
        assert_eq!(t.expires_in_remaining_at(Utc::now()), None);
    }

    #[test]
    fn revoked_is_not_accessible() {
        let mut t = token(None);
        assert!(t.is_accessible_at(Utc::now()));
        t.revoked_at = Some(Utc::now());
        assert!(!t.is_accessible_at(Utc::now()));
    }

    #[test]
    fn scopes_are_space_separated() {
        let t = token(None);
        assert_eq!(t.scopes(), ["read", "write"]);
        assert!(t.includes_scope("write"));
        assert!(!t.includes_scope("admin"));
    }

    #[test]
    fn debug_hides_token() {
        let t = token(None);
        assert!(!format!("{t:?}").contains("abc"));
    }
}
