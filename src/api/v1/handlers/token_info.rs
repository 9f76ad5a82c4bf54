/*
 * Responsibility
 * - GET /token/info: describe the token used for this request
 */
use axum::Json;
use chrono::Utc;

use crate::api::v1::dto::token_info::TokenInfoResponse;
use crate::api::v1::extractors::AuthCtxExtractor;

pub async fn token_info(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<TokenInfoResponse> {
    let now = Utc::now();

    Json(TokenInfoResponse {
        resource_owner_id: ctx.resource_owner_id(),
        scope: ctx.scopes(),
        expires_in: ctx.expires_in_at(now),
        application_id: ctx.token.application_id,
        created_at: ctx.token.created_at.timestamp(),
    })
}
