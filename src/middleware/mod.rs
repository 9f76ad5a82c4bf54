/*
 * Responsibility
 * - middleware entry points
 *   - auth: access-token authentication for protected routes
 *   - http: transport-level layers for every route
 */
pub mod auth;
pub mod http;
