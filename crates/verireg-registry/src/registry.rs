// VERIFIER REGISTRY
// Admission, shard assignment and stake accounting for verifiers
//
// SAFETY INVARIANTS:
// 1. A record with created = true exists iff its identity appears exactly once in the roster
// 2. verifier_count == roster.len() at all times
// 3. A shard is assigned once at admission and never reassigned
// 4. Balances move only together with a successful token ledger transfer
// 5. Every rejected call leaves the registry untouched and emits nothing

use crate::access::{AccessControl, OwnerAccessControl};
use crate::config::RegistryConfig;
use crate::error::RegistryError;
use crate::events::{EventSink, RegistryEvent};
use crate::shard::assign_shard;
use crate::snapshot::RegistrySnapshot;
use crate::types::{CallerContext, ShardId, VerifierRecord};
use log::{debug, info, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use verireg_token::{Address, ApprovalReceiver, TokenLedger};

/// Registry of all admitted verifiers.
///
/// SAFETY: Every state-changing operation takes `&mut self`, so at most one
/// writer touches the registry at a time. Share it across threads through
/// [`crate::SharedRegistry`].
pub struct VerifierRegistry {
    /// Identity -> record
    verifiers: BTreeMap<Address, VerifierRecord>,

    /// Identities in admission order
    roster: Vec<Address>,

    /// Authoritative admission count
    verifier_count: u64,

    /// Ledger stake must flow through
    token_ledger_address: Address,

    /// Capacity per shard for future admissions
    verifiers_per_shard: u64,

    /// Account holding custodial stake on the ledger
    custody_address: Address,

    require_registration_for_deposit: bool,

    access: Arc<dyn AccessControl>,

    events: Arc<dyn EventSink>,
}

impl VerifierRegistry {
    pub fn new(
        config: &RegistryConfig,
        access: Arc<dyn AccessControl>,
        events: Arc<dyn EventSink>,
    ) -> Result<Self, RegistryError> {
        if config.verifiers_per_shard == 0 {
            return Err(RegistryError::InvalidParameter(
                "verifiers_per_shard must be > 0".to_string(),
            ));
        }

        info!(
            "Verifier registry initialised (token ledger {}, {} verifiers per shard)",
            config.token_ledger_address, config.verifiers_per_shard
        );

        Ok(VerifierRegistry {
            verifiers: BTreeMap::new(),
            roster: Vec::new(),
            verifier_count: 0,
            token_ledger_address: config.token_ledger_address.clone(),
            verifiers_per_shard: config.verifiers_per_shard,
            custody_address: config.custody_address.clone(),
            require_registration_for_deposit: config.require_registration_for_deposit,
            access,
            events,
        })
    }

    /// Registry administered by `config.owner` alone.
    pub fn with_owner(
        config: &RegistryConfig,
        events: Arc<dyn EventSink>,
    ) -> Result<Self, RegistryError> {
        let access = Arc::new(OwnerAccessControl::new(config.owner.clone()));
        Self::new(config, access, events)
    }

    /// Admit the caller and assign its shard.
    pub fn create(
        &mut self,
        ctx: &CallerContext,
        location: impl Into<String>,
    ) -> Result<VerifierRecord, RegistryError> {
        let caller = ctx.caller();
        if self.is_registered(caller) {
            warn!("Rejected duplicate registration from {}", caller);
            return Err(RegistryError::AlreadyRegistered(caller.clone()));
        }

        let shard = assign_shard(self.verifier_count, self.verifiers_per_shard)?;
        // Stake deposited before registration (open deposit mode) is kept.
        let balance = self.verifiers.get(caller).map_or(0, |r| r.balance);

        let record = VerifierRecord {
            id: caller.clone(),
            location: location.into(),
            created: true,
            balance,
            shard,
        };

        self.verifiers.insert(caller.clone(), record.clone());
        self.roster.push(caller.clone());
        self.verifier_count += 1;

        info!("Registered verifier {} in {}", caller, shard);
        self.events
            .emit(RegistryEvent::VerifierRegistered(record.clone()));
        Ok(record)
    }

    /// Replace the caller's location. Nothing else on the record changes.
    pub fn update(
        &mut self,
        ctx: &CallerContext,
        location: impl Into<String>,
    ) -> Result<VerifierRecord, RegistryError> {
        let record = self.registered_mut(ctx.caller())?;
        record.location = location.into();
        let updated = record.clone();

        debug!("Verifier {} moved to {}", updated.id, updated.location);
        self.events
            .emit(RegistryEvent::VerifierUpdated(updated.clone()));
        Ok(updated)
    }

    /// Approval callback: pull `amount` from `from` into custody and credit it.
    ///
    /// `token` names the ledger the approval was granted on and must match the
    /// configured ledger, as must `ledger` itself. `data` is accepted and
    /// ignored. Returns the new balance.
    pub fn receive_approval(
        &mut self,
        from: &Address,
        amount: u128,
        token: &Address,
        _data: &[u8],
        ledger: &mut dyn TokenLedger,
    ) -> Result<u128, RegistryError> {
        self.ensure_ledger(token)?;
        self.ensure_ledger(ledger.address())?;
        if amount == 0 {
            return Err(RegistryError::InvalidParameter(
                "deposit amount must be > 0".to_string(),
            ));
        }

        let open = !self.require_registration_for_deposit;
        let current = match self.verifiers.get(from) {
            Some(record) if record.created || open => record.balance,
            None if open => 0,
            _ => {
                warn!("Rejected deposit from unregistered {}", from);
                return Err(RegistryError::NotRegistered(from.clone()));
            }
        };
        let credited = current
            .checked_add(amount)
            .ok_or_else(|| RegistryError::BalanceOverflow(from.clone()))?;

        // Tokens must be in custody before the balance is credited.
        if let Err(e) = ledger.transfer_from(&self.custody_address, from, &self.custody_address, amount) {
            warn!("Deposit of {} from {} failed: {}", amount, from, e);
            return Err(RegistryError::TransferFailed(e));
        }

        let record = self
            .verifiers
            .entry(from.clone())
            .or_insert_with(|| VerifierRecord {
                id: from.clone(),
                location: String::new(),
                created: false,
                balance: 0,
                shard: ShardId(0),
            });
        record.balance = credited;
        let verifier = record.clone();

        info!("Deposited {} stake for {} (balance {})", amount, from, credited);
        self.events
            .emit(RegistryEvent::StakeDeposited { amount, verifier });
        Ok(credited)
    }

    /// Return `amount` of the caller's stake. Returns the remaining balance.
    ///
    /// Only registered verifiers can withdraw. A stake-only record left by an
    /// open-mode deposit is locked until its owner calls `create`, and until
    /// then this returns `NotRegistered`.
    pub fn withdraw(
        &mut self,
        ctx: &CallerContext,
        amount: u128,
        ledger: &mut dyn TokenLedger,
    ) -> Result<u128, RegistryError> {
        if amount == 0 {
            return Err(RegistryError::InvalidParameter(
                "withdraw amount must be > 0".to_string(),
            ));
        }
        self.ensure_ledger(ledger.address())?;

        let caller = ctx.caller().clone();
        let custody = self.custody_address.clone();
        let record = self.registered_mut(&caller)?;

        let previous = record.balance;
        if previous < amount {
            warn!(
                "Rejected withdrawal of {} by {}: balance {}",
                amount, caller, previous
            );
            return Err(RegistryError::InsufficientBalance {
                available: previous,
                requested: amount,
            });
        }

        record.balance = previous - amount;
        if let Err(e) = ledger.transfer(&custody, &caller, amount) {
            record.balance = previous;
            warn!("Withdrawal of {} by {} rolled back: {}", amount, caller, e);
            return Err(RegistryError::TransferFailed(e));
        }
        let verifier = record.clone();
        let remaining = verifier.balance;

        info!("Withdrew {} stake for {} (balance {})", amount, caller, remaining);
        self.events
            .emit(RegistryEvent::StakeWithdrawn { amount, verifier });
        Ok(remaining)
    }

    pub fn update_token_ledger_address(
        &mut self,
        ctx: &CallerContext,
        new_address: impl Into<Address>,
    ) -> Result<(), RegistryError> {
        self.ensure_admin(ctx)?;

        let current = new_address.into();
        let previous = std::mem::replace(&mut self.token_ledger_address, current.clone());

        info!("Token ledger changed from {} to {}", previous, current);
        self.events
            .emit(RegistryEvent::TokenLedgerUpdated { previous, current });
        Ok(())
    }

    /// Change the capacity used for future admissions. Existing shards stay put.
    pub fn update_verifiers_per_shard(
        &mut self,
        ctx: &CallerContext,
        verifiers_per_shard: u64,
    ) -> Result<(), RegistryError> {
        self.ensure_admin(ctx)?;
        if verifiers_per_shard == 0 {
            return Err(RegistryError::InvalidParameter(
                "verifiers_per_shard must be > 0".to_string(),
            ));
        }

        let previous = std::mem::replace(&mut self.verifiers_per_shard, verifiers_per_shard);

        info!("Verifiers per shard changed from {} to {}", previous, verifiers_per_shard);
        self.events.emit(RegistryEvent::VerifiersPerShardUpdated {
            previous,
            current: verifiers_per_shard,
        });
        Ok(())
    }

    pub fn count(&self) -> u64 {
        self.verifier_count
    }

    /// Record for `id`, or `NotFound` if the registry has never seen it.
    ///
    /// With open deposits enabled this also returns the stake-only record of a
    /// depositor that never registered (`created == false`, default location
    /// and shard) rather than `NotFound`.
    pub fn get_verifier(&self, id: &Address) -> Result<&VerifierRecord, RegistryError> {
        self.verifier(id)
            .ok_or_else(|| RegistryError::NotFound(id.clone()))
    }

    /// Record for `id`, including stake-only records of unregistered depositors.
    pub fn verifier(&self, id: &Address) -> Option<&VerifierRecord> {
        self.verifiers.get(id)
    }

    pub fn is_registered(&self, id: &Address) -> bool {
        self.verifiers.get(id).map_or(false, |r| r.created)
    }

    /// Identity admitted at position `index`.
    pub fn verifier_at(&self, index: usize) -> Option<&Address> {
        self.roster.get(index)
    }

    /// Registered verifiers in admission order.
    pub fn roster(&self) -> impl Iterator<Item = &VerifierRecord> + '_ {
        self.roster.iter().filter_map(|id| self.verifiers.get(id))
    }

    pub fn token_ledger_address(&self) -> &Address {
        &self.token_ledger_address
    }

    pub fn verifiers_per_shard(&self) -> u64 {
        self.verifiers_per_shard
    }

    pub fn custody_address(&self) -> &Address {
        &self.custody_address
    }

    /// Sum of all stake held in custody.
    pub fn total_stake(&self) -> u128 {
        self.verifiers
            .values()
            .fold(0u128, |acc, r| acc.saturating_add(r.balance))
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            verifiers: self.roster().cloned().collect(),
            verifier_count: self.verifier_count,
            token_ledger_address: self.token_ledger_address.clone(),
            verifiers_per_shard: self.verifiers_per_shard,
        }
    }

    /// Check the structural invariants between records, roster and count.
    pub fn verify_invariants(&self) -> Result<(), RegistryError> {
        if self.roster.len() as u64 != self.verifier_count {
            return Err(RegistryError::InvariantViolation(format!(
                "verifier_count {} != roster length {}",
                self.verifier_count,
                self.roster.len()
            )));
        }

        let mut seen = BTreeSet::new();
        for id in &self.roster {
            if !seen.insert(id) {
                return Err(RegistryError::InvariantViolation(format!(
                    "{} appears more than once in roster",
                    id
                )));
            }
            match self.verifiers.get(id) {
                Some(record) if record.created && record.id == *id => {}
                _ => {
                    return Err(RegistryError::InvariantViolation(format!(
                        "roster entry {} has no created record",
                        id
                    )))
                }
            }
        }

        let created = self.verifiers.values().filter(|r| r.created).count();
        if created != self.roster.len() {
            return Err(RegistryError::InvariantViolation(format!(
                "{} created records but {} roster entries",
                created,
                self.roster.len()
            )));
        }

        if self.verifiers_per_shard == 0 {
            return Err(RegistryError::InvariantViolation(
                "verifiers_per_shard is 0".to_string(),
            ));
        }
        Ok(())
    }

    fn registered_mut(&mut self, id: &Address) -> Result<&mut VerifierRecord, RegistryError> {
        match self.verifiers.get_mut(id) {
            Some(record) if record.created => Ok(record),
            _ => {
                warn!("Rejected call from unregistered {}", id);
                Err(RegistryError::NotRegistered(id.clone()))
            }
        }
    }

    fn ensure_admin(&self, ctx: &CallerContext) -> Result<(), RegistryError> {
        if self.access.is_admin(ctx.caller()) {
            Ok(())
        } else {
            warn!("Rejected admin call from {}", ctx.caller());
            Err(RegistryError::Unauthorized(ctx.caller().clone()))
        }
    }

    fn ensure_ledger(&self, token: &Address) -> Result<(), RegistryError> {
        if *token == self.token_ledger_address {
            Ok(())
        } else {
            Err(RegistryError::UnknownToken {
                expected: self.token_ledger_address.clone(),
                got: token.clone(),
            })
        }
    }
}

impl ApprovalReceiver for VerifierRegistry {
    type Error = RegistryError;

    fn receiver_address(&self) -> &Address {
        &self.custody_address
    }

    fn receive_approval(
        &mut self,
        from: &Address,
        amount: u128,
        token: &Address,
        data: &[u8],
        ledger: &mut dyn TokenLedger,
    ) -> Result<(), Self::Error> {
        VerifierRegistry::receive_approval(self, from, amount, token, data, ledger).map(|_| ())
    }
}
