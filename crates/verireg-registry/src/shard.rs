// Shard Assignment - deterministic, capacity-bounded verifier-shard binding
//
// SAFETY INVARIANTS:
// 1. Assignment depends only on admission order and the capacity in effect at admission
// 2. All observers independently compute identical assignments
// 3. An assignment never changes after admission (no rebalancing)

use crate::error::RegistryError;
use crate::types::{ShardId, VerifierRecord};
use std::collections::BTreeMap;

/// Shard for the verifier admitted at `admission_index` (0-based).
///
/// The first `verifiers_per_shard` admissions land in shard 0, the next batch
/// in shard 1, and so on.
pub fn assign_shard(admission_index: u64, verifiers_per_shard: u64) -> Result<ShardId, RegistryError> {
    if verifiers_per_shard == 0 {
        return Err(RegistryError::InvalidParameter(
            "verifiers_per_shard must be > 0".to_string(),
        ));
    }
    Ok(ShardId(admission_index / verifiers_per_shard))
}

/// Number of verifiers admitted into each shard.
pub fn shard_occupancy<'a, I>(records: I) -> BTreeMap<ShardId, u64>
where
    I: IntoIterator<Item = &'a VerifierRecord>,
{
    let mut occupancy = BTreeMap::new();
    for record in records {
        *occupancy.entry(record.shard).or_insert(0) += 1;
    }
    occupancy
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_batches_of_three() {
        let shards: Vec<_> = (0..7).map(|i| assign_shard(i, 3).unwrap().as_u64()).collect();
        assert_eq!(shards, vec![0, 0, 0, 1, 1, 1, 2]);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(matches!(assign_shard(0, 0), Err(RegistryError::InvalidParameter(_))));
    }

    proptest! {
        #[test]
        fn prop_shard_is_floor_division(index in 0u64..1_000_000, capacity in 1u64..10_000) {
            let shard = assign_shard(index, capacity).unwrap();
            prop_assert!(shard.as_u64() * capacity <= index);
            prop_assert!(index < (shard.as_u64() + 1) * capacity);
        }
    }
}
