//! Prize-pool / refund ledger
//!
//! `payers` is an accumulating multiset of contributions keyed by payer —
//! a single payer may register several distinct players and shows up once
//! with `amount = k * buy_in`. `player_payer` records which payer covered
//! which player so a leave (or registration-expiry refund) can reverse the
//! exact contribution instead of merely subtracting a flat buy-in from
//! whichever payer happens to be first in the map.

use crate::ids::AccountId;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Ledger {
    pub payers: BTreeMap<AccountId, u64>,
    pub player_payer: BTreeMap<AccountId, AccountId>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> u64 {
        self.payers.values().sum()
    }

    /// Record `payer` contributing `buy_in` on behalf of `player`.
    pub fn contribute(&mut self, payer: AccountId, player: AccountId, buy_in: u64) {
        *self.payers.entry(payer).or_insert(0) += buy_in;
        self.player_payer.insert(player, payer);
    }

    /// Reverse the contribution that registered `player`, returning the
    /// `(payer, amount)` that should be credited back. `None` if `player`
    /// was never registered through this ledger.
    pub fn reverse(&mut self, player: AccountId, buy_in: u64) -> Option<(AccountId, u64)> {
        let payer = self.player_payer.remove(&player)?;
        let remaining = self.payers.get(&payer).copied().unwrap_or(0).saturating_sub(buy_in);
        if remaining == 0 {
            self.payers.remove(&payer);
        } else {
            self.payers.insert(payer, remaining);
        }
        Some((payer, buy_in))
    }

    /// All outstanding contributions, for a full refund on expiry. Does not
    /// clear the ledger — callers freeze mutation via tournament state
    /// instead, so the historical record of who paid what survives.
    pub fn all_contributions(&self) -> Vec<(AccountId, u64)> {
        self.payers.iter().map(|(k, v)| (*k, *v)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acc(n: u8) -> AccountId {
        let mut b = [0u8; 32];
        b[0] = n;
        AccountId::new(b)
    }

    #[test]
    fn test_single_payer_multiple_players() {
        let mut ledger = Ledger::new();
        ledger.contribute(acc(1), acc(10), 5);
        ledger.contribute(acc(1), acc(11), 5);
        assert_eq!(ledger.total(), 10);
        assert_eq!(ledger.payers.get(&acc(1)), Some(&10));
    }

    #[test]
    fn test_reverse_restores_exact_contribution() {
        let mut ledger = Ledger::new();
        ledger.contribute(acc(1), acc(10), 5);
        ledger.contribute(acc(2), acc(11), 5);
        assert_eq!(ledger.total(), 10);

        let (payer, amount) = ledger.reverse(acc(10), 5).unwrap();
        assert_eq!(payer, acc(1));
        assert_eq!(amount, 5);
        assert_eq!(ledger.total(), 5);
        assert!(!ledger.payers.contains_key(&acc(1)));
    }

    #[test]
    fn test_reverse_unknown_player_is_none() {
        let mut ledger = Ledger::new();
        assert_eq!(ledger.reverse(acc(99), 5), None);
    }

    #[test]
    fn test_register_then_leave_restores_zero_state() {
        let mut ledger = Ledger::new();
        ledger.contribute(acc(1), acc(10), 7);
        ledger.reverse(acc(10), 7);
        assert_eq!(ledger, Ledger::new());
    }
}
