//! On-chain error codes
//!
//! A thin Anchor-facing shell around [`tournament_core::CoreError`] plus the
//! account-wiring errors that only make sense at the chain boundary
//! (signer/PDA mismatches, sysvar layout, lamport accounting).

use anchor_lang::prelude::*;

#[error_code]
pub enum TournamentError {
    #[msg("tournament precondition violated")]
    Precondition = 6000,

    #[msg("insufficient funds for this operation")]
    InsufficientFunds = 6001,

    #[msg("tournament invariant violated")]
    InvariantViolation = 6002,

    #[msg("not authorized to perform this action")]
    Unauthorized = 6003,

    #[msg("SlotHashes sysvar unavailable or malformed")]
    SlotHashUnavailable = 6004,

    #[msg("arithmetic overflow")]
    Overflow = 6005,

    #[msg("house fee must be in [0, 10000] basis points")]
    InvalidFee = 6006,

    #[msg("account does not match the tournament's registered player")]
    AccountMismatch = 6007,

    #[msg("match index out of range")]
    InvalidMatch = 6008,

    #[msg("winner is not one of the match's players")]
    InvalidWinner = 6009,
}

/// `tournament_core::CoreError` carries no account context of its own —
/// translate it to the closest on-chain error code at the call site.
impl From<tournament_core::CoreError> for TournamentError {
    fn from(err: tournament_core::CoreError) -> Self {
        match err {
            tournament_core::CoreError::Precondition(_) => TournamentError::Precondition,
            tournament_core::CoreError::InsufficientFunds { .. } => TournamentError::InsufficientFunds,
            tournament_core::CoreError::InvariantViolation(_) => TournamentError::InvariantViolation,
        }
    }
}
