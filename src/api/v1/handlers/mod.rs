pub mod health;
pub mod token_info;
