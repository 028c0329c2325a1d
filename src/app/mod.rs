//! Application glue module
//!
//! Configuration shared by the library and the headless runner.

mod config;

pub use config::{default_config_path, ConfigError, EmulatorConfig};
