/*
 * Responsibility
 * - Shared context attached to the Router (AppState)
 * - Clone is cheap (everything behind Arc)
 */
use std::sync::Arc;

use crate::services::oauth::{Strategy, TokenAuthenticator};

#[derive(Clone, Debug)]
pub struct AppState {
    pub authenticator: Arc<TokenAuthenticator>,
    // Resolved once from config; tried in order for every protected request.
    pub strategies: Arc<[Strategy]>,
}

impl AppState {
    pub fn new(authenticator: Arc<TokenAuthenticator>, strategies: Vec<Strategy>) -> Self {
        Self {
            authenticator,
            strategies: strategies.into(),
        }
    }
}
