//! Player instructions: join, leave, and post-expiry refund.
//!
//! All three move lamports directly between the signer and the tournament
//! PDA through [`ChainHost`], scoped to that one signer for the duration
//! of the call — self-registration only, one payer per player, matching
//! the source program's single-wallet stake model.

use crate::host::ChainHost;
use crate::state::{pubkey_to_account_id, TournamentAccount};
use anchor_lang::prelude::*;

#[derive(Accounts)]
pub struct JoinTournament<'info> {
    #[account(
        mut,
        seeds = [b"tournament", tournament.tournament.id.to_le_bytes().as_ref()],
        bump = tournament.bump
    )]
    pub tournament: Account<'info, TournamentAccount>,

    #[account(mut)]
    pub player: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn join_tournament(ctx: Context<JoinTournament>) -> Result<()> {
    let tournament_account = &mut ctx.accounts.tournament;
    let clock = Clock::get()?;
    let player_id = pubkey_to_account_id(&ctx.accounts.player.key());

    let mut host = ChainHost::new(
        clock.unix_timestamp,
        [0u8; 32],
        player_id,
        ctx.accounts.player.to_account_info(),
        tournament_account.to_account_info(),
        ctx.accounts.system_program.to_account_info(),
    );

    tournament_core::register_player(
        &mut tournament_account.tournament,
        &mut tournament_account.details,
        player_id,
        player_id,
        &mut host,
    )
    .map_err(crate::host::map_err)?;

    msg!(
        "player {} joined tournament {}",
        ctx.accounts.player.key(),
        tournament_account.tournament.id
    );
    Ok(())
}

#[derive(Accounts)]
pub struct LeaveTournament<'info> {
    #[account(
        mut,
        seeds = [b"tournament", tournament.tournament.id.to_le_bytes().as_ref()],
        bump = tournament.bump
    )]
    pub tournament: Account<'info, TournamentAccount>,

    #[account(mut)]
    pub player: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn leave_tournament(ctx: Context<LeaveTournament>) -> Result<()> {
    let tournament_account = &mut ctx.accounts.tournament;
    let clock = Clock::get()?;
    let player_id = pubkey_to_account_id(&ctx.accounts.player.key());

    let mut host = ChainHost::new(
        clock.unix_timestamp,
        [0u8; 32],
        player_id,
        ctx.accounts.player.to_account_info(),
        tournament_account.to_account_info(),
        ctx.accounts.system_program.to_account_info(),
    );

    tournament_core::leave_player(
        &mut tournament_account.tournament,
        &mut tournament_account.details,
        player_id,
        &mut host,
    )
    .map_err(crate::host::map_err)?;

    msg!(
        "player {} left tournament {}",
        ctx.accounts.player.key(),
        tournament_account.tournament.id
    );
    Ok(())
}

#[derive(Accounts)]
pub struct ClaimRefund<'info> {
    #[account(
        mut,
        seeds = [b"tournament", tournament.tournament.id.to_le_bytes().as_ref()],
        bump = tournament.bump
    )]
    pub tournament: Account<'info, TournamentAccount>,

    #[account(mut)]
    pub player: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn claim_refund(ctx: Context<ClaimRefund>) -> Result<()> {
    let tournament_account = &mut ctx.accounts.tournament;
    let clock = Clock::get()?;
    let player_id = pubkey_to_account_id(&ctx.accounts.player.key());

    let mut host = ChainHost::new(
        clock.unix_timestamp,
        [0u8; 32],
        player_id,
        ctx.accounts.player.to_account_info(),
        tournament_account.to_account_info(),
        ctx.accounts.system_program.to_account_info(),
    );

    let (_, amount) = tournament_core::claim_refund_after_expiry(
        &tournament_account.tournament,
        &mut tournament_account.details,
        player_id,
        &mut host,
    )
    .map_err(crate::host::map_err)?;

    msg!(
        "refunded {} lamports to {} from expired tournament {}",
        amount,
        ctx.accounts.player.key(),
        tournament_account.tournament.id
    );
    Ok(())
}
