//! Match-advancement scheduler
//!
//! The bracket is a flat array that represents a complete binary tree with
//! the final at index 0 and the first round at the highest indices — the
//! standard zero-indexed binary-heap layout (parent `p` has children
//! `2p+1` and `2p+2`). `check_for_new_matches_to_start` walks the array
//! round by round from the leaves, finds the highest fully-complete round,
//! and promotes winners into the next round's otherwise-empty matches.
//!
//! The source this was distilled from computed child indices with a
//! formula that doesn't invert its own parent-index derivation (documented
//! in DESIGN.md) and bound the "match to start" to the wrong child. Both
//! are corrected here: child indices use the heap relation directly, and
//! the parent match itself (`matches[parent_idx]`) is what gets mutated.

use crate::error::{CoreError, CoreResult};
use crate::ids::AccountId;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub enum MatchState {
    WaitingOnPreviousMatches,
    InProgress,
    MatchComplete,
}

/// A single bracket slot. `players` holds 0, 1 (a bye), or 2 entrants;
/// `winners` holds 0 or 1 account once the match resolves.
#[derive(Clone, Debug, PartialEq, Eq, Default, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct MatchSlot {
    pub players: Vec<AccountId>,
    pub winners: BTreeSet<AccountId>,
    pub state: MatchState,
}

impl Default for MatchState {
    fn default() -> Self {
        MatchState::WaitingOnPreviousMatches
    }
}

impl MatchSlot {
    pub fn empty() -> Self {
        Self {
            players: Vec::new(),
            winners: BTreeSet::new(),
            state: MatchState::WaitingOnPreviousMatches,
        }
    }

    /// A first-round slot seeded with a single real player is a bye: it
    /// completes immediately with that player as the winner.
    pub fn from_first_round_players(players: Vec<AccountId>) -> Self {
        if players.len() == 1 {
            let mut winners = BTreeSet::new();
            winners.insert(players[0]);
            Self {
                players,
                winners,
                state: MatchState::MatchComplete,
            }
        } else {
            Self {
                players,
                winners: BTreeSet::new(),
                state: MatchState::WaitingOnPreviousMatches,
            }
        }
    }

    pub fn record_winner(&mut self, winner: AccountId) -> CoreResult<()> {
        if !self.players.contains(&winner) {
            return Err(CoreError::Precondition("winner is not a player in this match"));
        }
        if self.state == MatchState::MatchComplete {
            return Err(CoreError::Precondition("match already complete"));
        }
        self.winners.clear();
        self.winners.insert(winner);
        self.state = MatchState::MatchComplete;
        Ok(())
    }
}

/// Number of rounds `R` such that `matches.len() == 2^R - 1`.
fn num_rounds(num_matches: usize) -> CoreResult<u32> {
    if num_matches == 0 {
        return Ok(0);
    }
    let total = num_matches as u64 + 1;
    if !total.is_power_of_two() {
        return Err(CoreError::InvariantViolation(
            "match array length is not of the form 2^R - 1",
        ));
    }
    Ok(total.trailing_zeros())
}

fn level_bounds(num_rounds: u32, round: u32) -> (usize, usize) {
    let level = num_rounds - 1 - round;
    let first = (1usize << level) - 1;
    let count = 1usize << level;
    (first, count)
}

fn left_child(parent: usize) -> usize {
    2 * parent + 1
}

fn right_child(parent: usize) -> usize {
    2 * parent + 2
}

/// Scan the bracket for the highest round whose matches are all complete,
/// and populate the next round's matches with the winners. Returns `true`
/// if a round was promoted, `false` if nothing was ready yet.
pub fn check_for_new_matches_to_start(matches: &mut [MatchSlot]) -> CoreResult<bool> {
    let rounds = num_rounds(matches.len())?;
    if rounds == 0 {
        return Ok(false);
    }

    let mut highest_complete: Option<u32> = None;
    for round in 0..rounds {
        let (first, count) = level_bounds(rounds, round);
        let complete = matches[first..first + count]
            .iter()
            .all(|m| m.state == MatchState::MatchComplete);
        if complete {
            highest_complete = Some(round);
        } else {
            break;
        }
    }

    let completed_round = match highest_complete {
        Some(r) => r,
        None => return Ok(false),
    };

    if completed_round == rounds - 1 {
        return Err(CoreError::InvariantViolation(
            "check_for_new_matches_to_start called on a fully decided bracket",
        ));
    }

    let next_round = completed_round + 1;
    let (next_first, next_count) = level_bounds(rounds, next_round);

    if matches[next_first].state != MatchState::WaitingOnPreviousMatches {
        // Already promoted by an earlier call; idempotent no-op.
        return Ok(false);
    }

    for parent_idx in next_first..next_first + next_count {
        let left = left_child(parent_idx);
        let right = right_child(parent_idx);

        let mut players = Vec::with_capacity(2);
        if let Some(winner) = matches[left].winners.iter().next().copied() {
            players.push(winner);
        }
        if let Some(winner) = matches[right].winners.iter().next().copied() {
            players.push(winner);
        }

        let parent = &mut matches[parent_idx];
        parent.players = players;
        if parent.players.len() == 1 {
            let winner = parent.players[0];
            parent.winners.clear();
            parent.winners.insert(winner);
            parent.state = MatchState::MatchComplete;
        } else {
            parent.state = MatchState::InProgress;
        }
    }

    Ok(true)
}
