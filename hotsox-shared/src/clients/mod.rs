pub mod db;
pub mod email;
pub mod media;
pub mod rabbitmq;
pub mod redis;
