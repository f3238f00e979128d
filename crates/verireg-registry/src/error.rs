use thiserror::Error;
use verireg_token::{Address, LedgerError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Verifier {0} already registered")]
    AlreadyRegistered(Address),
    #[error("Verifier {0} not registered")]
    NotRegistered(Address),
    #[error("Insufficient balance: {available} available, {requested} requested")]
    InsufficientBalance { available: u128, requested: u128 },
    #[error("Token transfer failed: {0}")]
    TransferFailed(#[from] LedgerError),
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Caller {0} is not an administrator")]
    Unauthorized(Address),
    #[error("Verifier {0} not found")]
    NotFound(Address),
    #[error("Unknown token ledger {got}, expected {expected}")]
    UnknownToken { expected: Address, got: Address },
    #[error("Stake balance overflow for {0}")]
    BalanceOverflow(Address),
    #[error("Registry invariant violated: {0}")]
    InvariantViolation(String),
}
