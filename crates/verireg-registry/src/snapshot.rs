use crate::types::VerifierRecord;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use verireg_token::Address;

/// Point-in-time copy of the registry state, records in admission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub verifiers: Vec<VerifierRecord>,
    pub verifier_count: u64,
    pub token_ledger_address: Address,
    pub verifiers_per_shard: u64,
}

impl RegistrySnapshot {
    /// Hex SHA-256 commitment to the snapshot.
    ///
    /// Variable-length fields are length-prefixed so distinct states cannot
    /// collide by shifting bytes between adjacent fields.
    pub fn commitment(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.verifier_count.to_le_bytes());
        hasher.update(self.verifiers_per_shard.to_le_bytes());
        update_prefixed(&mut hasher, self.token_ledger_address.as_bytes());

        for record in &self.verifiers {
            update_prefixed(&mut hasher, record.id.as_bytes());
            update_prefixed(&mut hasher, record.location.as_bytes());
            hasher.update([record.created as u8]);
            hasher.update(record.balance.to_le_bytes());
            hasher.update(record.shard.as_u64().to_le_bytes());
        }
        hex::encode(hasher.finalize())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn update_prefixed(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}
