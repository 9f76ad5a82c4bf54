/*
 * Responsibility
 * - Config -> dependencies (pool, store, authenticator) -> Router
 * - HTTP-level middleware
 * - axum::serve()
 */
use std::{panic, process, sync::Arc};

use anyhow::Result;
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::middleware;
use crate::repos::access_token_repo::AccessTokenRepo;
use crate::services::oauth::{AuthenticatorPolicy, TokenAuthenticator};
use crate::state::AppState;

fn init_tracing() {
    // RUST_LOG wins when set, e.g.
    // RUST_LOG=info,oauth_guard=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // stderr may not be collected; always report through tracing as well.
        tracing::error!(?info, "panic");

        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        env = ?config.app_env,
        addr = %config.addr,
        refresh_token_rotation = config.refresh_token_rotation,
        hash_token_secrets = config.hash_token_secrets,
        strategies = ?config.token_lookup_strategies,
        "starting API"
    );

    let state = build_state(&config).await?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;

    let store = AccessTokenRepo::new(pool, config.hash_token_secrets);
    let authenticator = TokenAuthenticator::new(
        Arc::new(store),
        AuthenticatorPolicy {
            refresh_token_rotation: config.refresh_token_rotation,
        },
    );

    Ok(AppState::new(
        Arc::new(authenticator),
        config.token_lookup_strategies.clone(),
    ))
}

fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .nest("/api/v1", api::v1::routes(state.clone()))
        .with_state(state);

    middleware::http::apply(router)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{self, Body};
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::services::oauth::Strategy;
    use crate::services::oauth::store::testing::{MemoryTokenStore, access_token};

    fn state(store: Arc<MemoryTokenStore>) -> AppState {
        let authenticator = TokenAuthenticator::new(store, AuthenticatorPolicy::default());
        AppState::new(
            Arc::new(authenticator),
            vec![Strategy::BearerAuthorization, Strategy::AccessTokenParam],
        )
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = build_router(state(Arc::new(MemoryTokenStore::new())));

        let res = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn token_info_requires_token() {
        let app = build_router(state(Arc::new(MemoryTokenStore::new())));

        let res = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/token/info")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn token_info_describes_the_token() {
        let store = Arc::new(MemoryTokenStore::new());
        let owner = Uuid::new_v4();
        let mut token = access_token(5, "abc");
        token.resource_owner_id = Some(owner);
        token.application_id = Some(11);
        token.scopes = Some("public write".into());
        token.expires_in = Some(7200);
        store.insert(token.clone());

        let app = build_router(state(store));
        let res = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/token/info")
                    .header(header::AUTHORIZATION, "Bearer abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let bytes = body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(json["resource_owner_id"], owner.to_string());
        assert_eq!(json["scope"], serde_json::json!(["public", "write"]));
        assert_eq!(json["application_id"], 11);
        assert_eq!(json["created_at"], token.created_at.timestamp());
        let expires_in = json["expires_in"].as_i64().unwrap();
        assert!((7190..=7200).contains(&expires_in));
    }
}
