use serde::Serialize;
use uuid::Uuid;

/// Introspection view of the access token that authenticated the request.
#[derive(Debug, Clone, Serialize)]
pub struct TokenInfoResponse {
    pub resource_owner_id: Option<Uuid>,
    pub scope: Vec<String>,
    /// Seconds left; null for tokens that never expire.
    pub expires_in: Option<i64>,
    pub application_id: Option<i64>,
    /// Unix seconds.
    pub created_at: i64,
}
