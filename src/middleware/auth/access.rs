//! Access-token authentication for protected routes.
//!
//! Flow:
//! - snapshot credentials (query string, form body, `Authorization`)
//! - `TokenAuthenticator::authenticate` with the configured strategies
//! - reject (401) when nothing usable was found, else store `AuthCtx` in extensions
//!
//! Store failures surface as 500; they are not retried here.

use axum::{
    Router,
    body::{self, Body},
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};
use chrono::Utc;
use tracing::{debug, warn};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::oauth::{RequestCredentials, locate};
use crate::state::AppState;

// Form bodies larger than this are rejected instead of being scanned for tokens.
const MAX_FORM_BODY_BYTES: usize = 64 * 1024;

/// Put `router` behind access-token authentication.
///
/// ```ignore
/// let protected = Router::new().route("/token/info", get(token_info));
/// let protected = middleware::auth::access::apply(protected, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.route_layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let (parts, body) = req.into_parts();
    let mut credentials = RequestCredentials::from_parts(&parts);

    // `access_token` / `bearer_token` may also travel in a form-encoded body.
    let body = if is_form_encoded(&parts.headers) {
        let bytes = body::to_bytes(body, MAX_FORM_BODY_BYTES)
            .await
            .map_err(|err| {
                warn!(error = %err, "failed to read form body");
                AppError::bad_request("INVALID_BODY", "request body could not be read")
            })?;
        credentials.merge_form_encoded(&bytes);
        Body::from(bytes)
    } else {
        body
    };

    let mut req = Request::from_parts(parts, body);

    let token = state
        .authenticator
        .authenticate(&credentials, &state.strategies)
        .await?;

    let Some(token) = token else {
        // Distinguish "nothing presented" from "presented but unknown".
        return Err(if locate(&credentials, &state.strategies).is_some() {
            debug!("access token not found");
            AppError::InvalidToken
        } else {
            AppError::Unauthorized
        });
    };

    if !token.is_accessible_at(Utc::now()) {
        warn!(
            token_id = token.id,
            revoked = token.is_revoked(),
            "access token is revoked or expired"
        );
        return Err(AppError::InvalidToken);
    }

    req.extensions_mut().insert(AuthCtx::new(token));

    Ok(next.run(req).await)
}

fn is_form_encoded(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|mime| {
            mime.trim()
                .eq_ignore_ascii_case("application/x-www-form-urlencoded")
        })
}
