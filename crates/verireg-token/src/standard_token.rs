//! In-memory standard fungible token.
//!
//! Balances and allowances live in ordered maps so iteration (and therefore any
//! derived output) is deterministic across nodes.

use crate::address::Address;
use crate::ledger::{ApprovalReceiver, LedgerError, TokenLedger};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardToken {
    /// Ledger address the registry is configured with
    address: Address,
    /// Human readable token name
    pub name: String,
    /// Display decimals (informational only, all math is in base units)
    pub decimals: u8,
    /// Owner -> balance
    balances: BTreeMap<Address, u128>,
    /// (owner, spender) -> remaining allowance
    allowances: BTreeMap<(Address, Address), u128>,
    /// Sum of all balances
    total_supply: u128,
}

impl StandardToken {
    pub fn new(address: impl Into<Address>, name: impl Into<String>, decimals: u8) -> Self {
        StandardToken {
            address: address.into(),
            name: name.into(),
            decimals,
            balances: BTreeMap::new(),
            allowances: BTreeMap::new(),
            total_supply: 0,
        }
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    /// Credit freshly issued tokens to `to`.
    pub fn mint(&mut self, to: &Address, amount: u128) -> Result<(), LedgerError> {
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or_else(|| LedgerError::Overflow(to.clone()))?;
        let balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or_else(|| LedgerError::Overflow(to.clone()))?;

        self.balances.insert(to.clone(), balance);
        self.total_supply = supply;
        debug!("Minted {} to {}", amount, to);
        Ok(())
    }

    /// Set (not increase) the allowance `owner` grants to `spender`.
    pub fn approve(&mut self, owner: &Address, spender: &Address, amount: u128) {
        self.allowances
            .insert((owner.clone(), spender.clone()), amount);
        debug!("{} approved {} to spend {}", owner, spender, amount);
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.allowances
            .get(&(owner.clone(), spender.clone()))
            .copied()
            .unwrap_or(0)
    }

    /// Approve `receiver` for `amount` and notify it in the same call.
    ///
    /// If the receiver rejects the approval, the previous allowance is restored
    /// so the whole call has no effect.
    pub fn approve_and_call<R>(
        &mut self,
        owner: &Address,
        receiver: &mut R,
        amount: u128,
        data: &[u8],
    ) -> Result<(), R::Error>
    where
        R: ApprovalReceiver + ?Sized,
    {
        let spender = receiver.receiver_address().clone();
        let previous = self.allowance(owner, &spender);
        self.approve(owner, &spender, amount);

        let token = self.address.clone();
        let outcome = receiver.receive_approval(owner, amount, &token, data, self);
        if outcome.is_err() {
            warn!("Approval callback on {} rejected, restoring allowance", spender);
            self.approve(owner, &spender, previous);
        }
        outcome
    }

    /// Move funds between two accounts after all checks have passed.
    fn move_balance(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), LedgerError> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                owner: from.clone(),
                available,
                requested: amount,
            });
        }
        if from == to {
            return Ok(());
        }

        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or_else(|| LedgerError::Overflow(to.clone()))?;

        self.balances.insert(from.clone(), available - amount);
        self.balances.insert(to.clone(), credited);
        Ok(())
    }
}

impl TokenLedger for StandardToken {
    fn address(&self) -> &Address {
        &self.address
    }

    fn balance_of(&self, owner: &Address) -> u128 {
        self.balances.get(owner).copied().unwrap_or(0)
    }

    fn transfer(&mut self, sender: &Address, to: &Address, amount: u128) -> Result<(), LedgerError> {
        self.move_balance(sender, to, amount)?;
        debug!("Transfer {} -> {}: {}", sender, to, amount);
        Ok(())
    }

    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), LedgerError> {
        let allowed = self.allowance(from, spender);
        if allowed < amount {
            return Err(LedgerError::InsufficientAllowance {
                owner: from.clone(),
                spender: spender.clone(),
                available: allowed,
                requested: amount,
            });
        }

        self.move_balance(from, to, amount)?;
        self.allowances
            .insert((from.clone(), spender.clone()), allowed - amount);
        debug!("TransferFrom {} -> {} by {}: {}", from, to, spender, amount);
        Ok(())
    }
}
