//! Authentication context extractor
//!
//! - types: AuthCtx (what handlers get)
//! - core: axum extractor
mod core;
mod types;

pub use self::core::AuthCtxExtractor;
pub use self::types::AuthCtx;
