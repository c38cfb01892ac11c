pub mod auth_service;
pub mod match_service;
pub mod picture_service;
pub mod sock_service;
pub mod token_service;
pub mod user_service;
