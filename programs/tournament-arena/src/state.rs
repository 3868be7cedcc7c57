//! Account state definitions
//!
//! `tournament_core::Tournament` and `TournamentDetails` carry the full
//! lifecycle and bracket state; the accounts here only add the PDA
//! bookkeeping (bumps, the house ledger) that is specific to living on
//! Solana. Both core types already derive `borsh`, which is what
//! `AnchorSerialize`/`AnchorDeserialize` require, so they embed directly.

use anchor_lang::prelude::*;
use tournament_core::{AccountId, MatchState, Tournament, TournamentDetails};

/// Delay after a tournament's `end_time` before `close_tournament` may
/// sweep it regardless of outstanding refunds (30 days in production, 2s
/// in testing).
#[cfg(not(feature = "testing"))]
pub const CLOSURE_DELAY_SECONDS: i64 = 2_592_000;
#[cfg(feature = "testing")]
pub const CLOSURE_DELAY_SECONDS: i64 = 2;

/// Global configuration account: one per deployment.
#[account]
#[derive(Default)]
pub struct Config {
    /// Admin who can update fees and withdraw accumulated revenue.
    pub admin: Pubkey,
    /// Operator who can drive tournament lifecycle transitions.
    pub operator: Pubkey,
    /// House fee in basis points (0-10000), taken from each prize pool.
    pub house_fee_bps: u16,
    /// Fees collected but not yet withdrawn, in lamports.
    pub accumulated_fees: u64,
    /// Monotonic id assigned to the next tournament created.
    pub next_tournament_id: u64,
    pub bump: u8,
}

impl Config {
    pub const LEN: usize = 8 // discriminator
        + 32 // admin
        + 32 // operator
        + 2  // house_fee_bps
        + 8  // accumulated_fees
        + 8  // next_tournament_id
        + 1  // bump
        + 16; // padding for future fields
}

/// A tournament, wrapping the chain-agnostic lifecycle state. Grows via
/// `realloc` as players join and as the bracket is built, the same way the
/// source program grew its own players vector.
#[account]
pub struct TournamentAccount {
    pub tournament: Tournament,
    pub details: TournamentDetails,
    pub bump: u8,
}

/// Per-account-slot space contributed by one registered player across
/// `registered_players`, the ledger's two maps, and eventually one match
/// slot — sized for the worst case (two real entrants, one recorded
/// winner) rather than computed exactly, matching the generous
/// per-player budget the source reallocation scheme used.
pub const BYTES_PER_REGISTERED_PLAYER: usize = 32 // registered_players set entry
    + (32 + 8) // ledger.payers entry
    + (32 + 32) // ledger.player_payer entry
    + (4 + 2 * 32 + 4 + 32 + 1); // one MatchSlot, worst case

pub const BYTES_PER_WHITELISTED_ACCOUNT: usize = 32;

impl TournamentAccount {
    pub const BASE_SPACE: usize = 8 // discriminator
        + 8 + 32 // tournament.id, tournament.creator
        + (4 + 8 + 32 + 8 + 9) // options fixed fields + whitelist len prefix
        + 9 + 9 + 8 + 4 + 1 // start_time, end_time, prize_pool, registered_players count, state
        + 4 // details.registered_players len prefix
        + 4 + 4 // ledger maps' len prefixes
        + 4 // details.matches len prefix
        + 1 // bump
        + 32; // padding

    pub fn space(number_of_players: u32, whitelist_len: u32) -> usize {
        Self::BASE_SPACE
            + (whitelist_len as usize) * BYTES_PER_WHITELISTED_ACCOUNT
            + (number_of_players as usize) * BYTES_PER_REGISTERED_PLAYER
    }
}

pub fn pubkey_to_account_id(key: &Pubkey) -> AccountId {
    AccountId::new(key.to_bytes())
}

pub fn account_id_to_pubkey(id: &AccountId) -> Pubkey {
    Pubkey::new_from_array(id.0)
}

/// The account that should receive the prize once the bracket's final
/// (`matches[0]`) has recorded a winner.
pub fn champion(details: &TournamentDetails) -> Option<AccountId> {
    let final_match = details.matches.first()?;
    if final_match.state != MatchState::MatchComplete {
        return None;
    }
    final_match.winners.iter().next().copied()
}
