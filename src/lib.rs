//! Access-token authentication for an OAuth2 resource server.
//!
//! `services::oauth` holds the framework-free core (credential locator and
//! token authenticator); the rest wires it into an axum API backed by Postgres.
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod repos;
pub mod services;
pub mod state;
