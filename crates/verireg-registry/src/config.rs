//! Registry construction parameters.
//!
//! Values come from an optional file (any format the `config` crate detects by
//! extension) overlaid with `VERIREG_*` environment variables, e.g.
//! `VERIREG_VERIFIERS_PER_SHARD=5`.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use verireg_token::Address;

/// Capacity used when none is configured
pub const DEFAULT_VERIFIERS_PER_SHARD: u64 = 3;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "VERIREG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Token ledger stake is deposited through
    pub token_ledger_address: Address,

    /// Admissions per shard before the next shard opens
    #[serde(default = "default_verifiers_per_shard")]
    pub verifiers_per_shard: u64,

    /// Deploying identity, administrator of the registry
    pub owner: Address,

    /// Account holding deposited stake on the token ledger
    pub custody_address: Address,

    /// Reject deposits from identities that never called `create`
    #[serde(default = "default_require_registration")]
    pub require_registration_for_deposit: bool,
}

fn default_verifiers_per_shard() -> u64 {
    DEFAULT_VERIFIERS_PER_SHARD
}

fn default_require_registration() -> bool {
    true
}

impl RegistryConfig {
    pub fn new(
        owner: impl Into<Address>,
        custody_address: impl Into<Address>,
        token_ledger_address: impl Into<Address>,
        verifiers_per_shard: u64,
    ) -> Self {
        RegistryConfig {
            token_ledger_address: token_ledger_address.into(),
            verifiers_per_shard,
            owner: owner.into(),
            custody_address: custody_address.into(),
            require_registration_for_deposit: true,
        }
    }

    pub fn with_open_deposits(mut self) -> Self {
        self.require_registration_for_deposit = false;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.verifiers_per_shard == 0 {
            return Err(ConfigError::Invalid(
                "verifiers_per_shard must be > 0".to_string(),
            ));
        }
        if self.custody_address.as_str().is_empty() {
            return Err(ConfigError::Invalid(
                "custody_address cannot be empty".to_string(),
            ));
        }
        if self.owner.as_str().is_empty() {
            return Err(ConfigError::Invalid("owner cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Load from `path` (if given) and the environment, then validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let loaded: RegistryConfig = settings.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration source error: {0}")]
    Source(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_zero_capacity_invalid() {
        let config = RegistryConfig::new("owner", "registry", "0x123", 0);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_from_file_applies_defaults() {
        let path = std::env::temp_dir().join(format!("verireg-config-{}.json", std::process::id()));
        fs::write(
            &path,
            r#"{ "token_ledger_address": "0x123", "owner": "0xowner", "custody_address": "0xregistry" }"#,
        )
        .unwrap();

        let loaded = RegistryConfig::load(Some(path.as_path())).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(loaded.token_ledger_address, Address::from("0x123"));
        assert_eq!(loaded.verifiers_per_shard, DEFAULT_VERIFIERS_PER_SHARD);
        assert!(loaded.require_registration_for_deposit);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let path = std::env::temp_dir().join(format!("verireg-bad-{}.json", std::process::id()));
        fs::write(
            &path,
            r#"{ "token_ledger_address": "0x123", "owner": "0xowner", "custody_address": "0xregistry", "verifiers_per_shard": 0 }"#,
        )
        .unwrap();

        let result = RegistryConfig::load(Some(path.as_path()));
        fs::remove_file(&path).ok();

        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_environment_overrides_file() {
        // No other test sets the custody key.
        let path = std::env::temp_dir().join(format!("verireg-env-{}.json", std::process::id()));
        fs::write(
            &path,
            r#"{ "token_ledger_address": "0x123", "owner": "0xowner", "custody_address": "0xfile" }"#,
        )
        .unwrap();

        std::env::set_var("VERIREG_CUSTODY_ADDRESS", "0xfromenv");
        let loaded = RegistryConfig::load(Some(path.as_path()));
        std::env::remove_var("VERIREG_CUSTODY_ADDRESS");
        fs::remove_file(&path).ok();

        assert_eq!(loaded.unwrap().custody_address, Address::from("0xfromenv"));
    }
}
