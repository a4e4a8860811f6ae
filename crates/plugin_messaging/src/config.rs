//! Messaging templates.
//!
//! Both templates carry one `%s` substitution point and may use backtick
//! color macros (see [`crate::color`]).

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONSOLE_SAY_FORMAT: &str = "<`r*Console`w> %s";
pub const DEFAULT_BROADCAST_FORMAT: &str = "`r[Broadcast] %s";

/// Substitution token replaced by the message text.
pub const PLACEHOLDER: &str = "%s";

fn default_console_say_format() -> String {
    DEFAULT_CONSOLE_SAY_FORMAT.to_string()
}

fn default_broadcast_format() -> String {
    DEFAULT_BROADCAST_FORMAT.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MessagingConfig {
    /// Template for `/say` when run by a non-player sender
    #[serde(default = "default_console_say_format")]
    pub console_say_format: String,
    /// Template for `/broadcast`
    #[serde(default = "default_broadcast_format")]
    pub broadcast_format: String,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            console_say_format: default_console_say_format(),
            broadcast_format: default_broadcast_format(),
        }
    }
}

impl MessagingConfig {
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: MessagingConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !self.console_say_format.contains(PLACEHOLDER) {
            return Err(ConfigError::MissingPlaceholder {
                key: "console-say-format",
            });
        }
        if !self.broadcast_format.contains(PLACEHOLDER) {
            return Err(ConfigError::MissingPlaceholder {
                key: "broadcast-format",
            });
        }
        Ok(())
    }
}
