/// Token signing settings from environment variables
pub mod auth;

/// Seed catalog loading from config.toml
pub mod catalog;

/// Database configuration and connection management
pub mod database;
