use serde::{Deserialize, Serialize};
use std::fmt;
use verireg_token::Address;

/// ShardId identifies the capacity-bounded partition a verifier was admitted into
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
pub struct ShardId(pub u64);

impl ShardId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ShardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shard-{}", self.0)
    }
}

/// Verifier record held by the registry.
///
/// SAFETY: `id` and `shard` are written once by `create` and never change.
/// `location` changes only through `update`, `balance` only through stake
/// deposits and withdrawals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifierRecord {
    /// Identity that registered
    pub id: Address,

    /// Verifier supplied location (usually a network address)
    pub location: String,

    /// Admission flag
    pub created: bool,

    /// Stake held in custody, in token base units
    pub balance: u128,

    /// Shard assigned at admission
    pub shard: ShardId,
}

impl fmt::Display for VerifierRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Verifier {} (location={}, {}, balance={})",
            self.id, self.location, self.shard, self.balance
        )
    }
}

/// Already-authenticated identity of whoever invoked a registry operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    caller: Address,
}

impl CallerContext {
    pub fn new(caller: impl Into<Address>) -> Self {
        CallerContext {
            caller: caller.into(),
        }
    }

    pub fn caller(&self) -> &Address {
        &self.caller
    }
}
