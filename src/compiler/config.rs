//! Capability flags that influence directive validation

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading compile options
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Configuration options for directive compilation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompileOptions {
    /// Component renders into the light tree; `ref` on `<slot>` is rejected
    pub light_mode: bool,

    /// Comments are significant at every level, so they break conditional chains
    pub preserve_comments: bool,
}

/// TOML structure for deserializing options
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    #[serde(default)]
    compile: CompileOptions,
}

impl CompileOptions {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the light rendering mode capability
    pub fn with_light_mode(mut self, light_mode: bool) -> Self {
        self.light_mode = light_mode;
        self
    }

    /// Set comment preservation for every scope
    pub fn with_preserve_comments(mut self, preserve: bool) -> Self {
        self.preserve_comments = preserve;
        self
    }

    /// Load options from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load options from a TOML string with a `[compile]` table
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let parsed: TomlConfig = toml::from_str(content)?;
        Ok(parsed.compile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let options = CompileOptions::default();
        assert!(!options.light_mode);
        assert!(!options.preserve_comments);
    }

    #[test]
    fn test_builder_pattern() {
        let options = CompileOptions::new()
            .with_light_mode(true)
            .with_preserve_comments(true);
        assert!(options.light_mode);
        assert!(options.preserve_comments);
    }

    #[test]
    fn test_parse_toml() {
        let options = CompileOptions::from_toml_str(
            r#"
[compile]
light_mode = true
"#,
        )
        .expect("Should parse");
        assert!(options.light_mode);
        assert!(!options.preserve_comments);
    }

    #[test]
    fn test_missing_table_uses_defaults() {
        let options = CompileOptions::from_toml_str("").expect("Should parse");
        assert_eq!(options, CompileOptions::default());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = CompileOptions::from_toml_str(
            r#"
[compile]
shadow = true
"#,
        );
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_invalid_toml_error() {
        assert!(CompileOptions::from_toml_str("this is not valid toml {{{{").is_err());
    }
}
