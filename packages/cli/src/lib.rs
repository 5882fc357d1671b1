pub mod commands;
pub mod config;

pub use config::{Config, DEFAULT_CONFIG_NAME};
