//! Process-level plumbing shared by the server binary: layered configuration,
//! home directory resolution and tracing setup.

pub mod config;
pub mod home_dir;
pub mod logging;

pub use config::{AppConfig, CliArgs, DatabaseConfig, LoggingConfig, Section, ServerConfig};
pub use logging::init_logging_from_config;
