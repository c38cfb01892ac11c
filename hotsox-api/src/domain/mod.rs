//! Rules that need no database, cache or queue.

pub mod account;
pub mod geo;
pub mod mail;
pub mod match_state;
pub mod sock;
