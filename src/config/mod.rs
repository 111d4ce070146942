//! Engine configuration: classifier messages, build mode, navigation guard
//! and logging filter, loaded from TOML.

mod loader;
mod types;

pub use loader::ConfigError;
pub use types::{BuildMode, ClassifierConfig, Config, LoggingConfig, NavigationConfig};
