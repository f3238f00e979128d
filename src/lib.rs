//! Verifier registry workspace facade.
//!
//! Re-exports the registry and token ledger crates and wires configuration,
//! logging and the event sink into a ready registry.

use anyhow::{Context, Result};
use env_logger::Env;
use log::info;
use std::path::Path;
use std::sync::Arc;

pub use verireg_registry as registry;
pub use verireg_token as token;

use verireg_registry::{EventSink, RegistryConfig, VerifierRegistry};

/// Install the global logger. Honours `RUST_LOG`, defaults to `info`.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("info")).try_init();
}

/// Build a registry from configuration on disk (if any) and the environment.
pub fn bootstrap(config_path: Option<&Path>, events: Arc<dyn EventSink>) -> Result<VerifierRegistry> {
    let config = RegistryConfig::load(config_path).context("loading registry configuration")?;
    let registry = VerifierRegistry::with_owner(&config, events)
        .context("constructing verifier registry")?;

    info!(
        "Registry ready: owner {}, custody {}",
        config.owner, config.custody_address
    );
    Ok(registry)
}
