//! Provider client, configuration and shared models

pub mod client;
pub mod config;
pub mod errors;
pub mod models;
