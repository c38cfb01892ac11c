pub mod auth;
pub mod chat;
pub mod health;
pub mod mail;
pub mod matches;
pub mod sock_pictures;
pub mod socks;
pub mod swipe;
pub mod user_pictures;
pub mod users;
