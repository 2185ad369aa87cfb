//! Configuration types for a decoding session.

use crate::errors::RfbClientError;
use rfb_encodings::Encoding;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Complete session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Config {
    /// Decoding settings.
    #[serde(default)]
    pub decoding: DecodingConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Decoding configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodingConfig {
    /// Enabled encodings in priority order (wire ids).
    #[serde(default = "default_encodings")]
    pub encodings: Vec<i32>,
}

fn default_encodings() -> Vec<i32> {
    vec![
        rfb_encodings::ENCODING_ZLIB,
        rfb_encodings::ENCODING_RAW,
        rfb_encodings::ENCODING_DESKTOP_SIZE,
    ]
}

impl Default for DecodingConfig {
    fn default() -> Self {
        Self {
            encodings: default_encodings(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing-subscriber` filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl Config {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Parses and validates a TOML document.
    ///
    /// Missing sections and fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`RfbClientError::Config`] if the document does not parse or
    /// fails validation.
    pub fn from_toml_str(s: &str) -> Result<Self, RfbClientError> {
        let config: Self =
            toml::from_str(s).map_err(|e| RfbClientError::Config(format!("Invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`RfbClientError::Config`] if the file cannot be read or its
    /// contents are invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RfbClientError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            RfbClientError::Config(format!("Cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<(), RfbClientError> {
        // Validate encodings
        if self.decoding.encodings.is_empty() {
            return Err(RfbClientError::Config(
                "At least one encoding must be specified".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for &id in &self.decoding.encodings {
            if Encoding::from_wire(id).is_none() {
                return Err(RfbClientError::Config(format!("Unknown encoding: {id}")));
            }
            if !seen.insert(id) {
                return Err(RfbClientError::Config(format!("Duplicate encoding: {id}")));
            }
        }

        // Validate logging
        if self.logging.filter.trim().is_empty() {
            return Err(RfbClientError::Config(
                "Log filter cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Returns the enabled encodings in priority order.
    #[must_use]
    pub fn enabled_encodings(&self) -> Vec<Encoding> {
        self.decoding
            .encodings
            .iter()
            .filter_map(|&id| Encoding::from_wire(id))
            .collect()
    }
}

/// Builder for creating a `Config`.
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Sets the enabled encodings (wire ids, priority order).
    #[must_use]
    pub fn encodings(mut self, encodings: impl Into<Vec<i32>>) -> Self {
        self.config.decoding.encodings = encodings.into();
        self
    }

    /// Sets the default log filter directive.
    #[must_use]
    pub fn log_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.logging.filter = filter.into();
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> Result<Config, RfbClientError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
