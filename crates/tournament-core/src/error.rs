//! Core error kinds
//!
//! Mirrors the error kinds (not error *types*) the tournament lifecycle
//! engine is specified against: precondition violations are ordinary
//! rejections, insufficient funds is a ledger-layer rejection, and invariant
//! violations are things that should be impossible — a host observing one
//! should treat it as fatal rather than retry.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("precondition violated: {0}")]
    Precondition(&'static str),

    #[error("insufficient funds: could not debit {amount} from payer's balance")]
    InsufficientFunds { amount: u64 },

    #[error("invariant violated: {0}")]
    InvariantViolation(&'static str),
}

pub type CoreResult<T> = Result<T, CoreError>;
