pub mod config;
pub mod health;
pub mod resource;
pub mod singleton;
pub mod token;
