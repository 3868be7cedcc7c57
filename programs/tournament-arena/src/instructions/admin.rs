//! Admin instructions

use crate::error::TournamentError;
use crate::state::Config;
use anchor_lang::prelude::*;

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct InitializeConfigParams {
    pub operator: Pubkey,
    pub house_fee_bps: u16,
}

#[derive(Accounts)]
pub struct InitializeConfig<'info> {
    #[account(
        init,
        payer = admin,
        space = Config::LEN,
        seeds = [b"config"],
        bump
    )]
    pub config: Account<'info, Config>,

    #[account(mut)]
    pub admin: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn initialize_config(ctx: Context<InitializeConfig>, params: InitializeConfigParams) -> Result<()> {
    require!(params.house_fee_bps <= 10_000, TournamentError::InvalidFee);

    let config = &mut ctx.accounts.config;
    config.admin = ctx.accounts.admin.key();
    config.operator = params.operator;
    config.house_fee_bps = params.house_fee_bps;
    config.accumulated_fees = 0;
    config.next_tournament_id = 0;
    config.bump = ctx.bumps.config;

    msg!("config initialized by {}, operator = {}", config.admin, config.operator);
    Ok(())
}

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct UpdateConfigParams {
    pub operator: Option<Pubkey>,
    pub house_fee_bps: Option<u16>,
}

#[derive(Accounts)]
pub struct UpdateConfig<'info> {
    #[account(
        mut,
        seeds = [b"config"],
        bump = config.bump,
        has_one = admin @ TournamentError::Unauthorized
    )]
    pub config: Account<'info, Config>,

    pub admin: Signer<'info>,
}

pub fn update_config(ctx: Context<UpdateConfig>, params: UpdateConfigParams) -> Result<()> {
    let config = &mut ctx.accounts.config;

    if let Some(operator) = params.operator {
        config.operator = operator;
    }
    if let Some(fee) = params.house_fee_bps {
        require!(fee <= 10_000, TournamentError::InvalidFee);
        config.house_fee_bps = fee;
    }

    msg!("config updated");
    Ok(())
}

#[derive(Accounts)]
pub struct WithdrawFees<'info> {
    #[account(
        mut,
        seeds = [b"config"],
        bump = config.bump,
        has_one = admin @ TournamentError::Unauthorized
    )]
    pub config: Account<'info, Config>,

    #[account(mut)]
    pub admin: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn withdraw_fees(ctx: Context<WithdrawFees>) -> Result<()> {
    let config = &mut ctx.accounts.config;
    require!(config.accumulated_fees > 0, TournamentError::InsufficientFunds);

    let rent = Rent::get()?;
    let min_balance = rent.minimum_balance(config.to_account_info().data_len());
    let max_withdraw = config.to_account_info().lamports().saturating_sub(min_balance);
    let amount = config.accumulated_fees.min(max_withdraw);

    config.accumulated_fees = config
        .accumulated_fees
        .checked_sub(amount)
        .ok_or(TournamentError::Overflow)?;

    **config.to_account_info().try_borrow_mut_lamports()? -= amount;
    **ctx.accounts.admin.try_borrow_mut_lamports()? += amount;

    msg!("withdrew {} lamports in fees", amount);
    Ok(())
}
