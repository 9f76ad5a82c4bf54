//! Inbound OAuth2 access-token authentication.
//!
//! locator: credential discovery (params / Authorization header)
//! authenticator: credential -> stored token, plus refresh-token rotation
pub mod authenticator;
pub mod locator;
pub mod request;
pub mod store;
pub mod token;

pub use authenticator::{AuthError, AuthenticatorPolicy, TokenAuthenticator};
pub use locator::{LocatorError, Strategy, locate, locate_named};
pub use request::{CredentialRequest, RequestCredentials};
pub use store::TokenStore;
pub use token::AccessToken;
