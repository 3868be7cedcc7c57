//! Tournament state machine
//!
//! A sum type over the five states plus a transition function per event,
//! per the source's re-architecture guidance (spec's design notes call
//! out the original's template-FSM library as needless ceremony for five
//! states and five edges). State is persisted as a single byte-sized enum;
//! there is no back-pointer from `TournamentDetails` to `Tournament` — the
//! caller holds both and passes a `&mut impl Host` through.

use crate::bracket;
use crate::error::{CoreError, CoreResult};
use crate::ids::{AccountId, AssetId};
use crate::ledger::Ledger;
use crate::schedule::{self, MatchSlot, MatchState};
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::host::Host;

#[derive(Clone, Copy, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub enum StartPolicy {
    At(i64),
    DelaySeconds(i64),
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct TournamentOptions {
    pub number_of_players: u32,
    pub buy_in_amount: u64,
    pub buy_in_asset: AssetId,
    pub registration_deadline: i64,
    pub start: StartPolicy,
    pub whitelist: BTreeSet<AccountId>,
}

impl TournamentOptions {
    pub fn validate(&self) -> CoreResult<()> {
        if self.number_of_players < 2 {
            return Err(CoreError::Precondition("number_of_players must be >= 2"));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
#[repr(u8)]
pub enum TournamentState {
    AcceptingRegistrations = 0,
    AwaitingStart = 1,
    InProgress = 2,
    RegistrationPeriodExpired = 3,
    Concluded = 4,
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct TournamentDetails {
    pub registered_players: BTreeSet<AccountId>,
    pub ledger: Ledger,
    pub matches: Vec<MatchSlot>,
}

impl TournamentDetails {
    pub fn new() -> Self {
        Self {
            registered_players: BTreeSet::new(),
            ledger: Ledger::new(),
            matches: Vec::new(),
        }
    }
}

impl Default for TournamentDetails {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Tournament {
    pub id: u64,
    pub creator: AccountId,
    pub options: TournamentOptions,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub prize_pool: u64,
    pub registered_players: u32,
    pub state: TournamentState,
}

impl Tournament {
    pub fn new(id: u64, creator: AccountId, options: TournamentOptions) -> CoreResult<Self> {
        options.validate()?;
        Ok(Self {
            id,
            creator,
            options,
            start_time: None,
            end_time: None,
            prize_pool: 0,
            registered_players: 0,
            state: TournamentState::AcceptingRegistrations,
        })
    }

    /// Invariant 1 & 2 from spec §3, checked against `details`'s ledger.
    pub fn check_invariants(&self, details: &TournamentDetails) -> CoreResult<()> {
        if self.registered_players as usize != details.registered_players.len() {
            return Err(CoreError::InvariantViolation(
                "registered_players count diverges from registered_players set",
            ));
        }
        if self.registered_players > self.options.number_of_players {
            return Err(CoreError::InvariantViolation(
                "registered_players exceeds number_of_players",
            ));
        }
        if self.prize_pool != details.ledger.total() {
            return Err(CoreError::InvariantViolation("prize_pool diverges from ledger total"));
        }
        if self.options.buy_in_amount > 0 {
            let expected = details.ledger.total() / self.options.buy_in_amount;
            if expected != self.registered_players as u64 {
                return Err(CoreError::InvariantViolation(
                    "ledger total is not buy_in * registered_players",
                ));
            }
        } else if details.ledger.total() != 0 {
            return Err(CoreError::InvariantViolation("zero buy-in tournament has nonzero pool"));
        }
        Ok(())
    }
}

/// `player_registered` event — registers `player`, paid for by `payer`.
pub fn register_player(
    tournament: &mut Tournament,
    details: &mut TournamentDetails,
    payer: AccountId,
    player: AccountId,
    host: &mut impl Host,
) -> CoreResult<()> {
    if tournament.state != TournamentState::AcceptingRegistrations {
        return Err(CoreError::Precondition("tournament is not accepting registrations"));
    }
    if !tournament.options.whitelist.is_empty() && !tournament.options.whitelist.contains(&player) {
        return Err(CoreError::Precondition("player is not on the tournament whitelist"));
    }
    if details.registered_players.contains(&player) {
        return Err(CoreError::Precondition("player is already registered"));
    }

    let buy_in = tournament.options.buy_in_amount;
    host.adjust_balance(payer, tournament.options.buy_in_asset, -(buy_in as i64))?;

    details.ledger.contribute(payer, player, buy_in);
    details.registered_players.insert(player);
    tournament.registered_players += 1;
    tournament.prize_pool += buy_in;

    if tournament.registered_players == tournament.options.number_of_players {
        tournament.state = TournamentState::AwaitingStart;
        tournament.start_time = Some(match tournament.options.start {
            StartPolicy::At(ts) => ts,
            StartPolicy::DelaySeconds(delay) => host.head_block_time() + delay,
        });
    }

    Ok(())
}

/// `tournament_leave_operation` — the inverse of `register_player`, legal
/// any time before the bracket is built.
pub fn leave_player(
    tournament: &mut Tournament,
    details: &mut TournamentDetails,
    player: AccountId,
    host: &mut impl Host,
) -> CoreResult<()> {
    if !matches!(
        tournament.state,
        TournamentState::AcceptingRegistrations | TournamentState::AwaitingStart
    ) {
        return Err(CoreError::Precondition("tournament has already started"));
    }
    if !details.registered_players.remove(&player) {
        return Err(CoreError::Precondition("player is not registered"));
    }

    let buy_in = tournament.options.buy_in_amount;
    let (payer, amount) = details
        .ledger
        .reverse(player, buy_in)
        .ok_or(CoreError::InvariantViolation("ledger has no record of a registered player"))?;
    host.adjust_balance(payer, tournament.options.buy_in_asset, amount as i64)?;

    tournament.registered_players -= 1;
    tournament.prize_pool -= amount;

    if tournament.state == TournamentState::AwaitingStart {
        tournament.state = TournamentState::AcceptingRegistrations;
        tournament.start_time = None;
    }

    Ok(())
}

/// `registration_deadline_passed` — freezes the tournament without
/// touching the ledger. Legal only from `accepting_registrations`; a
/// tournament that already reached `awaiting_start` fills before its
/// deadline matters. Every payer's contribution is still on record
/// afterward — `claim_refund_after_expiry` is what actually reverses it,
/// since a host that can only reach one account per call (a Solana
/// instruction holding a single player's `AccountInfo`, say) can't satisfy
/// an all-payers-at-once refund here.
pub fn expire_registration(
    tournament: &mut Tournament,
    details: &TournamentDetails,
    host: &impl Host,
) -> CoreResult<Vec<(AccountId, u64)>> {
    if tournament.state != TournamentState::AcceptingRegistrations {
        return Err(CoreError::Precondition("only an open registration can expire"));
    }

    let refunds = details.ledger.all_contributions();

    tournament.state = TournamentState::RegistrationPeriodExpired;
    tournament.end_time = Some(host.head_block_time());

    Ok(refunds)
}

/// Per-player refund after the registration period has already expired.
/// Reverses `player`'s ledger entry and credits whoever actually paid for
/// them. Legal only once the tournament is already
/// `registration_period_expired`.
pub fn claim_refund_after_expiry(
    tournament: &Tournament,
    details: &mut TournamentDetails,
    player: AccountId,
    host: &mut impl Host,
) -> CoreResult<(AccountId, u64)> {
    if tournament.state != TournamentState::RegistrationPeriodExpired {
        return Err(CoreError::Precondition("tournament registration has not expired"));
    }
    let (payer, amount) = details
        .ledger
        .reverse(player, tournament.options.buy_in_amount)
        .ok_or(CoreError::Precondition("player has no outstanding refund"))?;
    host.adjust_balance(payer, tournament.options.buy_in_asset, amount as i64)?;
    Ok((payer, amount))
}

/// `start_time_arrived` — seeds the shuffle, builds the bracket, and moves
/// the tournament into `in_progress`.
pub fn start_tournament(tournament: &mut Tournament, details: &mut TournamentDetails, host: &impl Host) -> CoreResult<()> {
    if tournament.state != TournamentState::AwaitingStart {
        return Err(CoreError::Precondition("tournament is not awaiting start"));
    }

    let mut seeded: Vec<AccountId> = details.registered_players.iter().copied().collect();
    let mut rng = crate::random::SeededRng::new(host.random_seed());
    bracket::shuffle(&mut seeded, &mut rng);

    let paired = bracket::build_bracket(&seeded)?;
    details.matches = bracket::matches_from_paired(&paired)?;

    tournament.state = TournamentState::InProgress;
    Ok(())
}

/// Drive the scheduler after a match completes, and conclude the
/// tournament if that was the final.
pub fn advance_bracket(tournament: &mut Tournament, details: &mut TournamentDetails, host: &impl Host) -> CoreResult<bool> {
    if tournament.state != TournamentState::InProgress {
        return Err(CoreError::Precondition("tournament is not in progress"));
    }

    // The final's completion is a terminal state, not something to feed
    // back into the scheduler — calling it again would be an invariant
    // violation since there is no round left to promote into.
    if details.matches.first().map(|m| m.state) == Some(MatchState::MatchComplete) {
        tournament.state = TournamentState::Concluded;
        tournament.end_time = Some(host.head_block_time());
        return Ok(false);
    }

    let promoted = schedule::check_for_new_matches_to_start(&mut details.matches)?;

    if details.matches.first().map(|m| m.state) == Some(MatchState::MatchComplete) {
        tournament.state = TournamentState::Concluded;
        tournament.end_time = Some(host.head_block_time());
    }

    Ok(promoted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::test_support::InMemoryHost;

    fn acc(n: u8) -> AccountId {
        let mut b = [0u8; 32];
        b[0] = n;
        AccountId::new(b)
    }

    fn asset() -> AssetId {
        AssetId::new([0xAA; 32])
    }

    fn options(n: u32, buy_in: u64, deadline: i64, start: StartPolicy) -> TournamentOptions {
        TournamentOptions {
            number_of_players: n,
            buy_in_amount: buy_in,
            buy_in_asset: asset(),
            registration_deadline: deadline,
            start,
            whitelist: BTreeSet::new(),
        }
    }

    fn funded_host(players: &[AccountId], amount: i64) -> InMemoryHost {
        let mut host = InMemoryHost::new(1_000, [0u8; 32]);
        for p in players {
            host.credit(*p, asset(), amount);
        }
        host
    }

    #[test]
    fn test_s1_four_player_happy_path() {
        let players = [acc(1), acc(2), acc(3), acc(4)];
        let mut host = funded_host(&players, 100);
        let mut tournament = Tournament::new(1, acc(0), options(4, 10, 10_000, StartPolicy::DelaySeconds(60))).unwrap();
        let mut details = TournamentDetails::new();

        for p in players {
            register_player(&mut tournament, &mut details, p, p, &mut host).unwrap();
        }

        assert_eq!(tournament.state, TournamentState::AwaitingStart);
        assert_eq!(tournament.prize_pool, 40);
        assert_eq!(tournament.start_time, Some(1_000 + 60));
        tournament.check_invariants(&details).unwrap();

        host.seed = [0u8; 32];
        start_tournament(&mut tournament, &mut details, &host).unwrap();
        assert_eq!(tournament.state, TournamentState::InProgress);
        assert_eq!(details.matches.len(), 3);
    }

    #[test]
    fn test_s2_expired_registration_refunds_correct_payers() {
        let p1 = acc(1);
        let p2_player = acc(2);
        let mut host = funded_host(&[p1], 100);
        host.credit(p2_player, asset(), 100);

        let mut tournament = Tournament::new(2, acc(0), options(4, 10, 500, StartPolicy::DelaySeconds(60))).unwrap();
        let mut details = TournamentDetails::new();

        // P1 pays for itself.
        register_player(&mut tournament, &mut details, p1, p1, &mut host).unwrap();
        // P2 pays for P2.
        register_player(&mut tournament, &mut details, p2_player, p2_player, &mut host).unwrap();

        assert_eq!(host.balance(p1, asset()), 90);
        assert_eq!(host.balance(p2_player, asset()), 90);

        let refunds = expire_registration(&mut tournament, &details, &host).unwrap();
        assert_eq!(refunds.len(), 2);
        assert_eq!(tournament.state, TournamentState::RegistrationPeriodExpired);
        // expire_registration only freezes the tournament; balances are untouched
        // until each payer calls claim_refund_after_expiry.
        assert_eq!(host.balance(p1, asset()), 90);
        assert_eq!(host.balance(p2_player, asset()), 90);

        claim_refund_after_expiry(&tournament, &mut details, p1, &mut host).unwrap();
        claim_refund_after_expiry(&tournament, &mut details, p2_player, &mut host).unwrap();
        assert_eq!(host.balance(p1, asset()), 100);
        assert_eq!(host.balance(p2_player, asset()), 100);
    }

    #[test]
    fn test_invariant_buy_in_zero_requires_zero_pool() {
        let players = [acc(1), acc(2)];
        let mut host = funded_host(&players, 0);
        let mut tournament = Tournament::new(3, acc(0), options(2, 0, 10_000, StartPolicy::At(5_000))).unwrap();
        let mut details = TournamentDetails::new();
        for p in players {
            register_player(&mut tournament, &mut details, p, p, &mut host).unwrap();
        }
        tournament.check_invariants(&details).unwrap();
        assert_eq!(tournament.prize_pool, 0);
    }

    #[test]
    fn test_whitelist_rejects_non_member() {
        let mut tournament = Tournament::new(4, acc(0), options(2, 10, 10_000, StartPolicy::At(5_000))).unwrap();
        tournament.options.whitelist.insert(acc(1));
        let mut details = TournamentDetails::new();
        let mut host = funded_host(&[acc(2)], 100);

        let result = register_player(&mut tournament, &mut details, acc(2), acc(2), &mut host);
        assert!(matches!(result, Err(CoreError::Precondition(_))));
    }

    #[test]
    fn test_double_join_rejected() {
        let mut tournament = Tournament::new(5, acc(0), options(2, 10, 10_000, StartPolicy::At(5_000))).unwrap();
        let mut details = TournamentDetails::new();
        let mut host = funded_host(&[acc(1)], 100);

        register_player(&mut tournament, &mut details, acc(1), acc(1), &mut host).unwrap();
        let result = register_player(&mut tournament, &mut details, acc(1), acc(1), &mut host);
        assert!(matches!(result, Err(CoreError::Precondition(_))));
    }

    #[test]
    fn test_insufficient_funds_leaves_no_partial_state() {
        let mut tournament = Tournament::new(6, acc(0), options(2, 50, 10_000, StartPolicy::At(5_000))).unwrap();
        let mut details = TournamentDetails::new();
        let mut host = funded_host(&[acc(1)], 10); // not enough for buy_in=50

        let result = register_player(&mut tournament, &mut details, acc(1), acc(1), &mut host);
        assert!(matches!(result, Err(CoreError::InsufficientFunds { .. })));
        assert_eq!(tournament.registered_players, 0);
        assert_eq!(tournament.prize_pool, 0);
        assert!(details.registered_players.is_empty());
    }

    #[test]
    fn test_property7_register_then_leave_restores_exact_state() {
        let mut tournament = Tournament::new(7, acc(0), options(3, 15, 10_000, StartPolicy::At(5_000))).unwrap();
        let mut details = TournamentDetails::new();
        let mut host = funded_host(&[acc(1)], 100);

        register_player(&mut tournament, &mut details, acc(1), acc(1), &mut host).unwrap();
        let snapshot_before = (tournament.clone(), details.clone(), host.balance(acc(1), asset()));

        leave_player(&mut tournament, &mut details, acc(1), &mut host).unwrap();

        assert_eq!(tournament.prize_pool, 0);
        assert_eq!(tournament.registered_players, 0);
        assert!(details.registered_players.is_empty());
        assert_eq!(host.balance(acc(1), asset()), snapshot_before.2 + 15);
    }

    #[test]
    fn test_leave_from_awaiting_start_reopens_registration() {
        let players = [acc(1), acc(2)];
        let mut host = funded_host(&players, 100);
        let mut tournament = Tournament::new(8, acc(0), options(2, 10, 10_000, StartPolicy::At(5_000))).unwrap();
        let mut details = TournamentDetails::new();

        for p in players {
            register_player(&mut tournament, &mut details, p, p, &mut host).unwrap();
        }
        assert_eq!(tournament.state, TournamentState::AwaitingStart);

        leave_player(&mut tournament, &mut details, acc(1), &mut host).unwrap();
        assert_eq!(tournament.state, TournamentState::AcceptingRegistrations);
        assert_eq!(tournament.registered_players, 1);
    }

    #[test]
    fn test_leave_after_start_rejected() {
        let players = [acc(1), acc(2)];
        let mut host = funded_host(&players, 100);
        let mut tournament = Tournament::new(9, acc(0), options(2, 10, 10_000, StartPolicy::At(0))).unwrap();
        let mut details = TournamentDetails::new();
        for p in players {
            register_player(&mut tournament, &mut details, p, p, &mut host).unwrap();
        }
        start_tournament(&mut tournament, &mut details, &host).unwrap();

        let result = leave_player(&mut tournament, &mut details, acc(1), &mut host);
        assert!(matches!(result, Err(CoreError::Precondition(_))));
    }

    #[test]
    fn test_n2_boundary_one_match_no_byes() {
        let players = [acc(1), acc(2)];
        let mut host = funded_host(&players, 100);
        let mut tournament = Tournament::new(10, acc(0), options(2, 10, 10_000, StartPolicy::At(0))).unwrap();
        let mut details = TournamentDetails::new();
        for p in players {
            register_player(&mut tournament, &mut details, p, p, &mut host).unwrap();
        }
        start_tournament(&mut tournament, &mut details, &host).unwrap();
        assert_eq!(details.matches.len(), 1);
        assert_eq!(details.matches[0].players.len(), 2);
    }

    #[test]
    fn test_full_lifecycle_to_conclusion() {
        let players = [acc(1), acc(2)];
        let mut host = funded_host(&players, 100);
        let mut tournament = Tournament::new(11, acc(0), options(2, 10, 10_000, StartPolicy::At(0))).unwrap();
        let mut details = TournamentDetails::new();
        for p in players {
            register_player(&mut tournament, &mut details, p, p, &mut host).unwrap();
        }
        start_tournament(&mut tournament, &mut details, &host).unwrap();

        details.matches[0].record_winner(acc(1)).unwrap();
        let concluded = advance_bracket(&mut tournament, &mut details, &host).unwrap();
        assert!(!concluded); // advance_bracket returns whether a promotion happened, not conclusion
        assert_eq!(tournament.state, TournamentState::Concluded);
        assert!(tournament.end_time.is_some());
    }

    #[test]
    fn test_claim_refund_after_expiry_pays_correct_payer() {
        let p1 = acc(1);
        let mut host = funded_host(&[p1], 100);
        let mut tournament = Tournament::new(13, acc(0), options(4, 10, 500, StartPolicy::DelaySeconds(60))).unwrap();
        let mut details = TournamentDetails::new();

        register_player(&mut tournament, &mut details, p1, p1, &mut host).unwrap();
        expire_registration(&mut tournament, &details, &host).unwrap();
        assert_eq!(host.balance(p1, asset()), 90);

        let (payer, amount) = claim_refund_after_expiry(&tournament, &mut details, p1, &mut host).unwrap();
        assert_eq!(payer, p1);
        assert_eq!(amount, 10);
        assert_eq!(host.balance(p1, asset()), 100);
        assert!(claim_refund_after_expiry(&tournament, &mut details, p1, &mut host).is_err());
    }

    #[test]
    fn test_serde_roundtrip_preserves_state() {
        let tournament = Tournament::new(12, acc(0), options(4, 10, 10_000, StartPolicy::DelaySeconds(60))).unwrap();
        let bytes = borsh::to_vec(&tournament).unwrap();
        let decoded: Tournament = borsh::from_slice(&bytes).unwrap();
        assert_eq!(tournament, decoded);

        let json = serde_json::to_string(&tournament).unwrap();
        let decoded_json: Tournament = serde_json::from_str(&json).unwrap();
        assert_eq!(tournament, decoded_json);
    }
}
