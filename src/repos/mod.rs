pub mod access_token_repo;
pub mod error;
