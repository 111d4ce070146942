use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::Config;

const APP_DIR: &str = "blocflow";
const FILE_NAME: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("{field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl Config {
    /// `<config dir>/blocflow/config.toml`, relative to the working
    /// directory when the platform has no config dir.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_default()
            .join(APP_DIR)
            .join(FILE_NAME)
    }

    /// Loads [`Config::config_path`]. A missing file means defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        match path.try_exists() {
            Ok(true) => Self::load_from(&path),
            Ok(false) => Ok(Config::default()),
            Err(source) => Err(ConfigError::Read { path, source }),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let read = |source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        };
        let parse = |source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        };

        let content = fs::read_to_string(path).map_err(read)?;
        let config: Config = toml::from_str(&content).map_err(parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects blank fallback texts and a zero navigation window.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let classifier = &self.classifier;
        for (field, text) in [
            ("classifier.api_error_message", &classifier.api_error_message),
            ("classifier.generic_error_message", &classifier.generic_error_message),
            ("classifier.exception_message", &classifier.exception_message),
        ] {
            if text.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must not be blank".to_string(),
                });
            }
        }

        if self.navigation.dedup_window_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "navigation.dedup_window_ms",
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildMode;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
[classifier]
build_mode = "release"
"#,
        )
        .unwrap();
        assert_eq!(config.classifier.build_mode, BuildMode::Release);
        assert_eq!(config.classifier.api_error_message, "An error occurred");
        assert_eq!(config.navigation.dedup_window_ms, 1000);
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn blank_message_fails_validation() {
        let mut config = Config::default();
        config.classifier.generic_error_message = "   ".to_string();
        match config.validate().unwrap_err() {
            ConfigError::Invalid { field, .. } => {
                assert_eq!(field, "classifier.generic_error_message");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn zero_window_names_the_field() {
        let mut config = Config::default();
        config.navigation.dedup_window_ms = 0;
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "navigation.dedup_window_ms: must be greater than zero"
        );
    }
}
