//! Simulator configuration.
//!
//! Supports loading configuration from:
//! 1. YAML files
//! 2. Environment variables (with `QFORGE_` prefix)
//!
//! Precedence (highest to lowest): environment, file, defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Hard ceiling on the width of a statevector, whatever the configuration says.
///
/// 40 qubits is 16 TiB of `Complex64`; nothing above that is addressable in practice.
pub const HARD_MAX_QUBITS: u32 = 40;

/// Default cap on the width of a statevector (16 GiB of amplitudes).
pub const DEFAULT_MAX_QUBITS: u32 = 30;

/// Simulation settings shared by every state created through [`SimConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Largest qubit count a state may be allocated with.
    pub max_qubits: u32,
    /// Use rayon-parallel amplitude kernels.
    pub multi_worker: bool,
    /// Log level used when the host installs the default subscriber.
    pub log_level: String,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            max_qubits: DEFAULT_MAX_QUBITS,
            multi_worker: false,
            log_level: "info".to_string(),
        }
    }
}

impl SimConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_yaml(&contents)
    }

    /// Parse configuration from a YAML document.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_yaml_ng::from_str(contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables on top of the defaults.
    pub fn from_env() -> Self {
        Self::default().merge_env()
    }

    /// Load configuration with the following precedence:
    /// 1. Environment variables
    /// 2. The YAML file, if given
    /// 3. Defaults
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = config.merge_env();
        config.validate()?;
        Ok(config)
    }

    /// Override fields whose `QFORGE_*` variable is set. Unparseable values are ignored.
    fn merge_env(mut self) -> Self {
        if let Ok(v) = std::env::var("QFORGE_MAX_QUBITS") {
            if let Ok(val) = v.parse() {
                self.max_qubits = val;
            }
        }
        if let Ok(v) = std::env::var("QFORGE_MULTI_WORKER") {
            if let Some(val) = parse_flag(&v) {
                self.multi_worker = val;
            }
        }
        if let Ok(v) = std::env::var("QFORGE_LOG_LEVEL") {
            self.log_level = v;
        }
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_qubits == 0 {
            return Err(ConfigError::ValidationError(
                "max_qubits must be greater than 0".to_string(),
            ));
        }
        if self.max_qubits > HARD_MAX_QUBITS {
            return Err(ConfigError::ValidationError(format!(
                "max_qubits {} exceeds the hard limit of {HARD_MAX_QUBITS}",
                self.max_qubits
            )));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log level: {other}"
                )));
            }
        }

        Ok(())
    }

    /// Set the qubit cap.
    #[must_use]
    pub fn with_max_qubits(mut self, max_qubits: u32) -> Self {
        self.max_qubits = max_qubits;
        self
    }

    /// Select the worker mode.
    #[must_use]
    pub fn with_multi_worker(mut self, multi_worker: bool) -> Self {
        self.multi_worker = multi_worker;
        self
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}
