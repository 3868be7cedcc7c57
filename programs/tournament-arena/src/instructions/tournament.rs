//! Tournament lifecycle instructions: creation, registration close, start,
//! match-result reporting through to payout, and final account closure.

use crate::error::TournamentError;
use crate::host::{map_err, NATIVE_ASSET};
use crate::state::{champion, pubkey_to_account_id, Config, TournamentAccount, CLOSURE_DELAY_SECONDS};
use anchor_lang::prelude::*;
use std::collections::BTreeSet;
use tournament_core::{AccountId, StartPolicy, Tournament, TournamentDetails, TournamentOptions, TournamentState};

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct CreateTournamentParams {
    pub number_of_players: u32,
    pub buy_in_amount: u64,
    pub registration_deadline: i64,
    pub start_delay_seconds: i64,
    pub whitelist: Vec<Pubkey>,
}

#[derive(Accounts)]
#[instruction(params: CreateTournamentParams)]
pub struct CreateTournament<'info> {
    #[account(
        mut,
        seeds = [b"config"],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        init,
        payer = creator,
        space = TournamentAccount::space(params.number_of_players, params.whitelist.len() as u32),
        seeds = [b"tournament", config.next_tournament_id.to_le_bytes().as_ref()],
        bump
    )]
    pub tournament: Account<'info, TournamentAccount>,

    #[account(mut)]
    pub creator: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn create_tournament(ctx: Context<CreateTournament>, params: CreateTournamentParams) -> Result<()> {
    let config = &mut ctx.accounts.config;
    let tournament_account = &mut ctx.accounts.tournament;

    let whitelist: BTreeSet<AccountId> = params.whitelist.iter().map(pubkey_to_account_id).collect();

    let options = TournamentOptions {
        number_of_players: params.number_of_players,
        buy_in_amount: params.buy_in_amount,
        buy_in_asset: NATIVE_ASSET,
        registration_deadline: params.registration_deadline,
        start: StartPolicy::DelaySeconds(params.start_delay_seconds),
        whitelist,
    };

    let id = config.next_tournament_id;
    let tournament =
        Tournament::new(id, pubkey_to_account_id(&ctx.accounts.creator.key()), options).map_err(map_err)?;

    tournament_account.tournament = tournament;
    tournament_account.details = TournamentDetails::new();
    tournament_account.bump = ctx.bumps.tournament;

    config.next_tournament_id = config
        .next_tournament_id
        .checked_add(1)
        .ok_or(TournamentError::Overflow)?;

    msg!(
        "tournament {} created by {}, {} players, buy-in {}",
        id,
        ctx.accounts.creator.key(),
        params.number_of_players,
        params.buy_in_amount
    );
    Ok(())
}

#[derive(Accounts)]
pub struct ExpireRegistration<'info> {
    #[account(
        mut,
        seeds = [b"tournament", tournament.tournament.id.to_le_bytes().as_ref()],
        bump = tournament.bump
    )]
    pub tournament: Account<'info, TournamentAccount>,

    pub operator: Signer<'info>,
}

pub fn expire_registration(ctx: Context<ExpireRegistration>) -> Result<()> {
    let tournament_account = &mut ctx.accounts.tournament;
    let clock = Clock::get()?;

    require!(
        clock.unix_timestamp >= tournament_account.tournament.options.registration_deadline,
        TournamentError::Precondition
    );

    // No lamports move here — a live registration's entrants have already
    // paid into this PDA, and each claims their own refund afterward via
    // `claim_refund`, since a single instruction can't reach every payer's
    // account at once.
    let noop_host = NoopHost { now: clock.unix_timestamp };
    tournament_core::expire_registration(&mut tournament_account.tournament, &tournament_account.details, &noop_host)
        .map_err(map_err)?;

    msg!("tournament {} registration expired", tournament_account.tournament.id);
    Ok(())
}

/// A host whose balance adjustments are no-ops, used only where the chain
/// layer defers the actual lamport movement to a later, per-account
/// instruction (see [`expire_registration`]).
struct NoopHost {
    now: i64,
}

impl tournament_core::Host for NoopHost {
    fn head_block_time(&self) -> i64 {
        self.now
    }
    fn random_seed(&self) -> [u8; 32] {
        [0u8; 32]
    }
    fn adjust_balance(&mut self, _account: AccountId, _asset: tournament_core::AssetId, _delta: i64) -> tournament_core::CoreResult<()> {
        Ok(())
    }
}

#[derive(Accounts)]
pub struct StartTournament<'info> {
    #[account(
        mut,
        seeds = [b"tournament", tournament.tournament.id.to_le_bytes().as_ref()],
        bump = tournament.bump
    )]
    pub tournament: Account<'info, TournamentAccount>,

    /// CHECK: read-only sysvar, validated by address.
    #[account(address = anchor_lang::solana_program::sysvar::slot_hashes::ID)]
    pub slot_hashes: AccountInfo<'info>,

    pub operator: Signer<'info>,
}

pub fn start_tournament(ctx: Context<StartTournament>) -> Result<()> {
    let tournament_account = &mut ctx.accounts.tournament;
    let clock = Clock::get()?;

    let seed = derive_seed(&ctx.accounts.slot_hashes, tournament_account.tournament.id)?;
    let host = SeedOnlyHost { now: clock.unix_timestamp, seed };

    tournament_core::start_tournament(&mut tournament_account.tournament, &mut tournament_account.details, &host)
        .map_err(map_err)?;

    msg!(
        "tournament {} started with {} matches",
        tournament_account.tournament.id,
        tournament_account.details.matches.len()
    );
    Ok(())
}

struct SeedOnlyHost {
    now: i64,
    seed: [u8; 32],
}

impl tournament_core::Host for SeedOnlyHost {
    fn head_block_time(&self) -> i64 {
        self.now
    }
    fn random_seed(&self) -> [u8; 32] {
        self.seed
    }
    fn adjust_balance(&mut self, _account: AccountId, _asset: tournament_core::AssetId, _delta: i64) -> tournament_core::CoreResult<()> {
        Ok(())
    }
}

fn derive_seed(slot_hashes: &AccountInfo, tournament_id: u64) -> Result<[u8; 32]> {
    let data = slot_hashes.try_borrow_data()?;
    require!(data.len() >= 48, TournamentError::SlotHashUnavailable);
    let mut seed = [0u8; 32];
    seed.copy_from_slice(&data[16..48]);
    for (i, b) in tournament_id.to_le_bytes().iter().enumerate() {
        seed[i] ^= b;
    }
    Ok(seed)
}

/// Record the winner of `match_index` and let the scheduler promote any
/// newly-ready matches. When this resolves the bracket's final, the prize
/// pool (minus the house fee) pays out to the champion in the same
/// instruction — a single-elimination bracket has exactly one winner, so
/// there is nothing later for a separate claim instruction to distribute.
#[derive(Accounts)]
pub struct ReportMatchResult<'info> {
    #[account(
        mut,
        seeds = [b"config"],
        bump = config.bump,
        has_one = operator @ TournamentError::Unauthorized
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [b"tournament", tournament.tournament.id.to_le_bytes().as_ref()],
        bump = tournament.bump
    )]
    pub tournament: Account<'info, TournamentAccount>,

    pub operator: Signer<'info>,

    /// CHECK: only paid if it matches the bracket's recorded champion.
    #[account(mut)]
    pub champion: AccountInfo<'info>,
}

pub fn report_match_result(ctx: Context<ReportMatchResult>, match_index: u32, winner: Pubkey) -> Result<()> {
    let tournament_account = &mut ctx.accounts.tournament;
    let clock = Clock::get()?;

    require!(
        tournament_account.tournament.state == TournamentState::InProgress,
        TournamentError::Precondition
    );

    let slot = tournament_account
        .details
        .matches
        .get_mut(match_index as usize)
        .ok_or(TournamentError::InvalidMatch)?;
    let winner_id = pubkey_to_account_id(&winner);
    slot.record_winner(winner_id).map_err(map_err)?;

    tournament_core::advance_bracket(
        &mut tournament_account.tournament,
        &mut tournament_account.details,
        &SeedOnlyHost { now: clock.unix_timestamp, seed: [0u8; 32] },
    )
    .map_err(map_err)?;

    msg!(
        "tournament {} match {} won by {}",
        tournament_account.tournament.id,
        match_index,
        winner
    );

    if tournament_account.tournament.state == TournamentState::Concluded {
        let champion_id = champion(&tournament_account.details).ok_or(TournamentError::InvariantViolation)?;
        require!(
            pubkey_to_account_id(&ctx.accounts.champion.key()) == champion_id,
            TournamentError::AccountMismatch
        );

        let config = &mut ctx.accounts.config;
        let pool = tournament_account.tournament.prize_pool;
        let house_fee = pool
            .checked_mul(config.house_fee_bps as u64)
            .ok_or(TournamentError::Overflow)?
            .checked_div(10_000)
            .ok_or(TournamentError::Overflow)?;
        let payout = pool.saturating_sub(house_fee);

        let tournament_info = tournament_account.to_account_info();
        **tournament_info.try_borrow_mut_lamports()? -= payout + house_fee;
        **ctx.accounts.champion.try_borrow_mut_lamports()? += payout;
        **config.to_account_info().try_borrow_mut_lamports()? += house_fee;
        config.accumulated_fees = config
            .accumulated_fees
            .checked_add(house_fee)
            .ok_or(TournamentError::Overflow)?;

        msg!(
            "tournament {} concluded, {} paid to champion {}, {} to house fees",
            tournament_account.tournament.id,
            payout,
            ctx.accounts.champion.key(),
            house_fee
        );
    }

    Ok(())
}

/// Recover a finished tournament's rent once there's nothing left to claim
/// against it, sweeping any residual lamports into `accumulated_fees`.
#[derive(Accounts)]
pub struct CloseTournament<'info> {
    #[account(mut, seeds = [b"config"], bump = config.bump)]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [b"tournament", tournament.tournament.id.to_le_bytes().as_ref()],
        bump = tournament.bump
    )]
    pub tournament: Account<'info, TournamentAccount>,

    #[account(constraint = operator.key() == config.operator || operator.key() == config.admin @ TournamentError::Unauthorized)]
    pub operator: Signer<'info>,
}

pub fn close_tournament(ctx: Context<CloseTournament>) -> Result<()> {
    let config = &mut ctx.accounts.config;
    let tournament_account = &ctx.accounts.tournament;
    let clock = Clock::get()?;

    let closeable = match tournament_account.tournament.state {
        // The champion was already paid directly out of the pool the
        // instant the final resolved — nothing is left to claim.
        TournamentState::Concluded => true,
        // Entrants claim their own refund via `claim_refund`; close early
        // once the ledger has drained, or after the grace period either way.
        TournamentState::RegistrationPeriodExpired => {
            let end_time = tournament_account
                .tournament
                .end_time
                .ok_or(TournamentError::InvariantViolation)?;
            let time_expired = clock.unix_timestamp >= end_time.saturating_add(CLOSURE_DELAY_SECONDS);
            let refunds_settled = tournament_account.details.ledger.total() == 0;
            time_expired || refunds_settled
        }
        _ => false,
    };
    require!(closeable, TournamentError::Precondition);

    let tournament_info = tournament_account.to_account_info();
    let total_lamports = tournament_info.lamports();
    if total_lamports > 0 {
        **tournament_info.try_borrow_mut_lamports()? = 0;
        **config.to_account_info().try_borrow_mut_lamports()? += total_lamports;
        config.accumulated_fees = config
            .accumulated_fees
            .checked_add(total_lamports)
            .ok_or(TournamentError::Overflow)?;
    }

    // Zero the data so the runtime garbage-collects this now-0-lamport account.
    let mut data = tournament_info.try_borrow_mut_data()?;
    for byte in data.iter_mut() {
        *byte = 0;
    }
    drop(data);

    msg!(
        "tournament {} closed, {} lamports swept to accumulated fees",
        tournament_account.tournament.id,
        total_lamports
    );
    Ok(())
}
