/*
 * Responsibility
 * - v1 URL layout
 * - Decides which routes sit behind the access middleware
 */
use axum::{Router, routing::get};

use crate::api::v1::handlers::{health::health, token_info::token_info};
use crate::middleware;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new().route("/token/info", get(token_info));
    let protected = middleware::auth::access::apply(protected, state);

    Router::new().route("/health", get(health)).merge(protected)
}
