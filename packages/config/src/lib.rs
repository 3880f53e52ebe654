// ABOUTME: Configuration and environment variable management for OKRDesk
// ABOUTME: Immutable process-wide settings resolved once at startup

pub mod config;
pub mod constants;

pub use config::{AdminBootstrap, Config, ConfigError};
