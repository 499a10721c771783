//! Registry configuration
//!
//! Loaded from a single JSON file:
//!
//! ```json
//! {
//!   "state_dir": "./ledger",
//!   "admin": "6f1c2a4e-0000-4000-8000-000000000001",
//!   "contract_identity": "00000000-0000-0000-0000-000000000000",
//!   "log_level": "info",
//!   "orphan_policy": "retain",
//!   "maintenance_policy": "permissive"
//! }
//! ```
//!
//! Only `state_dir` and `admin` are required.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::{Logger, Severity};
use crate::registry::{MaintenancePolicy, OrphanPolicy, Principal, RegistryIdentity, RegistryPolicy};

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(String),

    #[error("Invalid config JSON: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::Io(_) => "BOOK_CONFIG_IO",
            ConfigError::Parse(_) => "BOOK_CONFIG_PARSE",
            ConfigError::Invalid(_) => "BOOK_CONFIG_INVALID",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Snapshot directory
    pub state_dir: String,

    /// Principal reported by `check_admin_access`
    pub admin: Principal,

    /// Synthetic registry identity, never a valid grant target
    #[serde(default = "Principal::nil")]
    pub contract_identity: Principal,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub orphan_policy: OrphanPolicy,

    #[serde(default)]
    pub maintenance_policy: MaintenancePolicy,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl RegistryConfig {
    /// Configuration with every optional field at its default
    pub fn new(state_dir: impl Into<String>, admin: Principal) -> Self {
        Self {
            state_dir: state_dir.into(),
            admin,
            contract_identity: Principal::nil(),
            log_level: default_log_level(),
            orphan_policy: OrphanPolicy::default(),
            maintenance_policy: MaintenancePolicy::default(),
        }
    }

    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: RegistryConfig =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.state_dir.trim().is_empty() {
            return Err(ConfigError::Invalid("state_dir must not be empty".into()));
        }
        if Severity::parse(&self.log_level).is_none() {
            return Err(ConfigError::Invalid(format!(
                "Unknown log_level '{}'. Expected trace, info, warn or error.",
                self.log_level
            )));
        }
        if self.admin == self.contract_identity {
            return Err(ConfigError::Invalid(
                "admin must differ from contract_identity".into(),
            ));
        }
        Ok(())
    }

    pub fn state_path(&self) -> &Path {
        Path::new(&self.state_dir)
    }

    pub fn identity(&self) -> RegistryIdentity {
        RegistryIdentity::new(self.admin, self.contract_identity)
    }

    pub fn policy(&self) -> RegistryPolicy {
        RegistryPolicy::new(self.orphan_policy, self.maintenance_policy)
    }

    pub fn logger(&self) -> Logger {
        Logger::new(Severity::parse(&self.log_level).unwrap_or(Severity::Info))
    }
}
