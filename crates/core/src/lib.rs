//! Hawaii Climate Core Library
//!
//! Shared pieces of the climate API service:
//! - Configuration loading (XDG-compliant)
//! - File system checks for the SQLite store

mod config;
pub mod fs;

pub use config::{find_config_file, load_config, ConfigSource};
pub use fs::{is_file, path_exists};

/// Application name used for XDG paths
pub const APP_NAME: &str = "hawaii-climate";

/// Default API port
pub const DEFAULT_API_PORT: u16 = 5000;

/// Default location of the measurement/station database
pub const DEFAULT_DATABASE_PATH: &str = "./resources/hawaii.sqlite";
