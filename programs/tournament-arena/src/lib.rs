//! Tournament Arena — single-elimination bracket tournaments
//!
//! A Solana program implementing the host side of a chain-agnostic
//! tournament lifecycle engine: seeded bracket construction, deterministic
//! match advancement, and a prize-pool ledger, all driven from
//! `tournament-core`.

use anchor_lang::prelude::*;

mod error;
mod host;
mod instructions;
mod state;

use instructions::*;

declare_id!("89Pm5Qy61r1K8dLY1Z1fsJLu3PBN5tTLfZFoEAhejDYa");

#[program]
pub mod tournament_arena {
    use super::*;

    /// Initialize the global config (one-time setup).
    pub fn initialize_config(ctx: Context<InitializeConfig>, params: InitializeConfigParams) -> Result<()> {
        instructions::admin::initialize_config(ctx, params)
    }

    /// Update config parameters (admin only).
    pub fn update_config(ctx: Context<UpdateConfig>, params: UpdateConfigParams) -> Result<()> {
        instructions::admin::update_config(ctx, params)
    }

    /// Withdraw accumulated house fees (admin only).
    pub fn withdraw_fees(ctx: Context<WithdrawFees>) -> Result<()> {
        instructions::admin::withdraw_fees(ctx)
    }

    /// Create a new tournament (`tournament_create_operation`).
    pub fn create_tournament(ctx: Context<CreateTournament>, params: CreateTournamentParams) -> Result<()> {
        instructions::tournament::create_tournament(ctx, params)
    }

    /// Register for a tournament (`tournament_join_operation`).
    pub fn join_tournament(ctx: Context<JoinTournament>) -> Result<()> {
        instructions::player::join_tournament(ctx)
    }

    /// Withdraw a registration before the bracket is built (`tournament_leave_operation`).
    pub fn leave_tournament(ctx: Context<LeaveTournament>) -> Result<()> {
        instructions::player::leave_tournament(ctx)
    }

    /// Freeze an under-filled tournament's registration (`registration_deadline_passed`).
    pub fn expire_registration(ctx: Context<ExpireRegistration>) -> Result<()> {
        instructions::tournament::expire_registration(ctx)
    }

    /// Claim a refund from an expired registration.
    pub fn claim_refund(ctx: Context<ClaimRefund>) -> Result<()> {
        instructions::player::claim_refund(ctx)
    }

    /// Seed the shuffle and build the bracket (`start_time_arrived`).
    pub fn start_tournament(ctx: Context<StartTournament>) -> Result<()> {
        instructions::tournament::start_tournament(ctx)
    }

    /// Record a match's winner, advance the bracket, and pay the champion
    /// on conclusion (`game_move_operation` / `tournament_payout_operation`).
    pub fn report_match_result(ctx: Context<ReportMatchResult>, match_index: u32, winner: Pubkey) -> Result<()> {
        instructions::tournament::report_match_result(ctx, match_index, winner)
    }

    /// Recover a finished tournament's rent once nothing is left to claim.
    pub fn close_tournament(ctx: Context<CloseTournament>) -> Result<()> {
        instructions::tournament::close_tournament(ctx)
    }
}
