//! `tournament_core::Host` adapter
//!
//! Scoped to a single counterparty account per instruction — the pattern
//! every instruction here already follows when moving lamports between a
//! signer and the tournament PDA. `adjust_balance` refuses to touch any
//! account other than the one it was built for, since the chain layer
//! never has every registered player's `AccountInfo` in one instruction.
//! A debit (signer paying into the pool) goes through a System Program
//! CPI, since the signer's account isn't owned by this program; a credit
//! (pool paying the signer back) moves lamports directly, since this
//! program does own the pool PDA.

use crate::error::TournamentError;
use anchor_lang::prelude::*;
use anchor_lang::system_program::{self, Transfer};
use tournament_core::{AccountId, AssetId, CoreError, CoreResult, Host};

/// Hardcoded: this program only ever moves the chain's native asset.
pub const NATIVE_ASSET: AssetId = AssetId::new([0u8; 32]);

pub struct ChainHost<'info> {
    pub now: i64,
    pub seed: [u8; 32],
    pub counterparty: AccountId,
    pub counterparty_info: AccountInfo<'info>,
    pub pool_info: AccountInfo<'info>,
    pub system_program: AccountInfo<'info>,
}

impl<'info> ChainHost<'info> {
    pub fn new(
        now: i64,
        seed: [u8; 32],
        counterparty: AccountId,
        counterparty_info: AccountInfo<'info>,
        pool_info: AccountInfo<'info>,
        system_program: AccountInfo<'info>,
    ) -> Self {
        Self {
            now,
            seed,
            counterparty,
            counterparty_info,
            pool_info,
            system_program,
        }
    }
}

impl<'info> Host for ChainHost<'info> {
    fn head_block_time(&self) -> i64 {
        self.now
    }

    fn random_seed(&self) -> [u8; 32] {
        self.seed
    }

    fn adjust_balance(&mut self, account: AccountId, asset: AssetId, delta: i64) -> CoreResult<()> {
        if account != self.counterparty || asset != NATIVE_ASSET {
            return Err(CoreError::Precondition(
                "chain host adapter is scoped to a single counterparty/asset pair",
            ));
        }
        if delta == 0 {
            return Ok(());
        }
        let amount = delta.unsigned_abs();
        if delta < 0 {
            // The signer isn't owned by this program — go through the
            // System Program, same as the source `enter_tournament`.
            system_program::transfer(
                CpiContext::new(
                    self.system_program.clone(),
                    Transfer {
                        from: self.counterparty_info.clone(),
                        to: self.pool_info.clone(),
                    },
                ),
                amount,
            )
            .map_err(|_| CoreError::InsufficientFunds { amount })
        } else {
            // The tournament PDA is owned by this program, so a refund or
            // payout can move lamports directly, as the source `claim_refund`
            // already does.
            credit_lamports(&self.pool_info, &self.counterparty_info, amount)
        }
    }
}

fn credit_lamports(from: &AccountInfo, to: &AccountInfo, amount: u64) -> CoreResult<()> {
    let mut from_lamports = from
        .try_borrow_mut_lamports()
        .map_err(|_| CoreError::InvariantViolation("lamport account already borrowed"))?;
    if **from_lamports < amount {
        return Err(CoreError::InsufficientFunds { amount });
    }
    **from_lamports -= amount;
    drop(from_lamports);

    let mut to_lamports = to
        .try_borrow_mut_lamports()
        .map_err(|_| CoreError::InvariantViolation("lamport account already borrowed"))?;
    **to_lamports += amount;
    Ok(())
}

pub fn map_err(err: CoreError) -> anchor_lang::error::Error {
    TournamentError::from(err).into()
}
