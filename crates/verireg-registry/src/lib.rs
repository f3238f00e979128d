/// VERIFIER REGISTRY
///
/// Admits verifiers into a sharded network and tracks their token stake:
/// - Each identity registers once and is assigned a shard from its admission order
/// - Shard assignments never move, even when the per-shard capacity changes
/// - Stake enters through an approve-then-call deposit and leaves through withdraw
/// - Local balances change only together with a successful token ledger transfer
/// - Every successful state change is reported to an injected event sink

pub mod access;
pub mod config;
pub mod error;
pub mod events;
pub mod registry;
pub mod shard;
pub mod shared;
pub mod snapshot;
pub mod types;

// Re-export key types for easy access
pub use access::{AccessControl, AdminSet, OwnerAccessControl};
pub use self::config::{ConfigError, RegistryConfig, DEFAULT_VERIFIERS_PER_SHARD};
pub use error::RegistryError;
pub use events::{EventSink, JsonLinesEventSink, MemoryEventSink, RegistryEvent};
pub use registry::VerifierRegistry;
pub use shard::{assign_shard, shard_occupancy};
pub use shared::SharedRegistry;
pub use snapshot::RegistrySnapshot;
pub use types::{CallerContext, ShardId, VerifierRecord};

pub use verireg_token::{Address, LedgerError, TokenLedger};
