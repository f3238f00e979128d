//! Token ledger collaborator for the verifier registry.
//!
//! The registry only depends on [`TokenLedger`]. [`StandardToken`] is the
//! in-memory reference ledger used by tests and local deployments; it also
//! implements the approve-then-call hook through [`ApprovalReceiver`].

pub mod address;
pub mod ledger;
pub mod standard_token;

pub use address::Address;
pub use ledger::{ApprovalReceiver, LedgerError, TokenLedger};
pub use standard_token::StandardToken;
