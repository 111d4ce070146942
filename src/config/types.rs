use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub navigation: NavigationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Build flavour the classifier behaves as.
///
/// Parsing errors only surface as error states in [`BuildMode::Debug`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    Debug,
    Release,
}

impl BuildMode {
    /// Mode matching the compile profile of this binary.
    pub fn current() -> Self {
        if cfg!(debug_assertions) {
            BuildMode::Debug
        } else {
            BuildMode::Release
        }
    }

    pub fn is_debug(self) -> bool {
        self == BuildMode::Debug
    }
}

impl Default for BuildMode {
    fn default() -> Self {
        Self::current()
    }
}

/// Classifier behaviour and user-facing fallback texts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Build flavour (default: compile profile).
    #[serde(default)]
    pub build_mode: BuildMode,
    /// Fallback for API errors without a server message.
    #[serde(default = "default_api_error_message")]
    pub api_error_message: String,
    /// Fallback for unclassified outcomes and non-render errors without text.
    #[serde(default = "default_generic_error_message")]
    pub generic_error_message: String,
    /// Text of exception-flavoured error states.
    #[serde(default = "default_exception_message")]
    pub exception_message: String,
}

/// Navigation intent de-duplication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationConfig {
    /// Identical intents issued within this window are dropped (default: 1000).
    #[serde(default = "default_dedup_window_ms")]
    pub dedup_window_ms: u64,
}

impl NavigationConfig {
    pub fn dedup_window(&self) -> Duration {
        Duration::from_millis(self.dedup_window_ms)
    }
}

/// Tracing subscriber settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset (default: "info").
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_api_error_message() -> String {
    "An error occurred".to_string()
}

fn default_generic_error_message() -> String {
    "Sorry, an error occurred".to_string()
}

fn default_exception_message() -> String {
    crate::state::EXCEPTION_MESSAGE.to_string()
}

fn default_dedup_window_ms() -> u64 {
    1000
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            build_mode: BuildMode::default(),
            api_error_message: default_api_error_message(),
            generic_error_message: default_generic_error_message(),
            exception_message: default_exception_message(),
        }
    }
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            dedup_window_ms: default_dedup_window_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}
