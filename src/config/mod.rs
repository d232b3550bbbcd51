//! Configuration management for Gemlet.
//!
//! Configuration is read from `~/.config/gemlet/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const DEFAULT_HOMEPAGE: &str = "gemini://geminiprotocol.net/";

/// Main configuration struct.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Word-wrap rendered documents to the terminal width
    pub wrap_text: bool,

    /// Maximum column width for wrapping (0 = terminal width)
    pub wrap_width: usize,

    /// Page opened when no URL is given on the command line
    pub homepage: String,

    /// PEM file of trusted server certificates (empty = accept any server)
    pub cert_file: String,

    /// TCP connect timeout in seconds
    pub connect_timeout_secs: u64,

    /// Read timeout in seconds for the response header and body
    pub read_timeout_secs: u64,

    /// Largest response body accepted, in bytes
    pub max_body_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wrap_text: true,
            wrap_width: 0,
            homepage: DEFAULT_HOMEPAGE.to_string(),
            cert_file: String::new(),
            connect_timeout_secs: 10,
            read_timeout_secs: 30,
            max_body_bytes: 4 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/gemlet/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("gemlet").join("config.toml"))
    }

    /// Column budget for wrapping given the terminal width.
    pub fn wrap_columns(&self, term_cols: usize) -> usize {
        if self.wrap_width > 0 {
            term_cols.min(self.wrap_width)
        } else {
            term_cols
        }
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        format!(
            r##"# Gemlet Configuration

# Word-wrap documents to the terminal width
wrap_text = true

# Clamp wrapping to at most this many columns (0 = use the full terminal)
wrap_width = 0

# Page opened when gemlet starts without a URL
homepage = "{DEFAULT_HOMEPAGE}"

# PEM file with trusted server certificates.
# Leave empty to accept any server certificate; most capsules are self-signed.
cert_file = ""

# Network timeouts in seconds
connect_timeout_secs = 10
read_timeout_secs = 30

# Largest response body accepted, in bytes
max_body_bytes = 4194304
"##
        )
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_deserializes() {
        let content = Config::default_config_content();
        let config: Config = toml::from_str(&content).expect("Default config should be valid TOML");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_config() {
        let content = r##"
wrap_width = 72
cert_file = "/etc/gemlet/trust.pem"
"##;
        let config: Config = toml::from_str(content).expect("Partial config should work");

        assert_eq!(config.wrap_width, 72);
        assert_eq!(config.cert_file, "/etc/gemlet/trust.pem");
        assert!(config.wrap_text);
        assert_eq!(config.homepage, DEFAULT_HOMEPAGE);
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").expect("Empty config should work");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_wrap_columns_clamps_only_when_set() {
        let mut config = Config::default();
        assert_eq!(config.wrap_columns(120), 120);
        config.wrap_width = 80;
        assert_eq!(config.wrap_columns(120), 80);
        assert_eq!(config.wrap_columns(40), 40);
    }

    #[test]
    fn test_load_from_reports_parse_errors_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "wrap_text = \"yes\"").unwrap();

        match Config::load_from(&path) {
            Err(ConfigError::Parse { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_create_default_config_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        Config::create_default_config(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }
}
