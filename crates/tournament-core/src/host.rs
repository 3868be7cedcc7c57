//! Host interface
//!
//! Everything this crate needs from "the surrounding chain code" — the
//! host database, balance ledger, and per-block entropy — is named here
//! and nowhere else. `tournament-arena` (the Anchor program) is one
//! concrete `Host`; tests use an in-memory one. Nothing in
//! `state_machine`, `bracket`, or `schedule` reaches outside this trait.

use crate::error::CoreResult;
use crate::ids::{AccountId, AssetId};

pub trait Host {
    /// The current block's timestamp (Unix seconds).
    fn head_block_time(&self) -> i64;

    /// The per-block entropy used to seed the bracket shuffle.
    fn random_seed(&self) -> [u8; 32];

    /// Apply a signed balance adjustment to `account`'s holdings of
    /// `asset` — negative to debit, positive to credit. Must fail with
    /// `CoreError::InsufficientFunds` rather than allow a negative
    /// balance; the state machine never observes a partial registration.
    fn adjust_balance(&mut self, account: AccountId, asset: AssetId, delta: i64) -> CoreResult<()>;
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::error::CoreError;
    use std::collections::BTreeMap;

    #[derive(Default)]
    pub struct InMemoryHost {
        pub now: i64,
        pub seed: [u8; 32],
        pub balances: BTreeMap<(AccountId, AssetId), i64>,
    }

    impl InMemoryHost {
        pub fn new(now: i64, seed: [u8; 32]) -> Self {
            Self {
                now,
                seed,
                balances: BTreeMap::new(),
            }
        }

        pub fn balance(&self, account: AccountId, asset: AssetId) -> i64 {
            self.balances.get(&(account, asset)).copied().unwrap_or(0)
        }

        pub fn credit(&mut self, account: AccountId, asset: AssetId, amount: i64) {
            *self.balances.entry((account, asset)).or_insert(0) += amount;
        }
    }

    impl Host for InMemoryHost {
        fn head_block_time(&self) -> i64 {
            self.now
        }

        fn random_seed(&self) -> [u8; 32] {
            self.seed
        }

        fn adjust_balance(&mut self, account: AccountId, asset: AssetId, delta: i64) -> CoreResult<()> {
            let entry = self.balances.entry((account, asset)).or_insert(0);
            let next = *entry + delta;
            if next < 0 {
                return Err(CoreError::InsufficientFunds {
                    amount: delta.unsigned_abs(),
                });
            }
            *entry = next;
            Ok(())
        }
    }
}
