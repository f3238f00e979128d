//! TOKEN LEDGER INTERFACE
//!
//! The registry never tracks token balances itself. It moves stake through a
//! ledger that exposes the two standard fungible-token transfer semantics and
//! nothing else. Any ledger (in-memory, remote, mocked) can sit behind this
//! trait.

use crate::address::Address;
use thiserror::Error;

/// Standard fungible-token transfer surface consumed by the registry.
///
/// SAFETY: A failed call must leave every balance and allowance untouched.
pub trait TokenLedger {
    /// Address under which this ledger is known to the registry.
    fn address(&self) -> &Address;

    /// Current balance held by `owner`.
    fn balance_of(&self, owner: &Address) -> u128;

    /// Move `amount` from `sender` to `to`.
    fn transfer(&mut self, sender: &Address, to: &Address, amount: u128) -> Result<(), LedgerError>;

    /// Move `amount` from `from` to `to`, spending the allowance `from` granted to `spender`.
    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), LedgerError>;
}

/// Target of an approve-then-call flow.
///
/// The ledger records the allowance first, then hands control (and itself) to
/// the receiver so the receiver can pull the approved funds in the same call.
pub trait ApprovalReceiver {
    type Error;

    /// Address the allowance is granted to.
    fn receiver_address(&self) -> &Address;

    fn receive_approval(
        &mut self,
        from: &Address,
        amount: u128,
        token: &Address,
        data: &[u8],
        ledger: &mut dyn TokenLedger,
    ) -> Result<(), Self::Error>;
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Insufficient balance: {owner} holds {available}, needs {requested}")]
    InsufficientBalance {
        owner: Address,
        available: u128,
        requested: u128,
    },
    #[error("Insufficient allowance: {spender} may spend {available} of {owner}, needs {requested}")]
    InsufficientAllowance {
        owner: Address,
        spender: Address,
        available: u128,
        requested: u128,
    },
    #[error("Balance overflow for {0}")]
    Overflow(Address),
    #[error("Ledger rejected transfer: {0}")]
    Rejected(String),
}
