pub mod token_info;
