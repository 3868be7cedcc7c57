//! Tournament lifecycle engine
//!
//! Chain-agnostic logic for running a single-elimination bracket
//! tournament on top of a host blockchain: deterministic bracket seeding,
//! match-advancement scheduling, a prize-pool ledger, and the five-state
//! lifecycle that ties them together. Everything this crate needs from the
//! surrounding chain is named in [`host::Host`]; `tournament-arena` is the
//! concrete Anchor-program implementation of that trait.

mod bracket;
mod error;
mod host;
mod ids;
mod impact;
mod ledger;
mod notify;
mod random;
mod schedule;
mod state_machine;

pub use bracket::{build_bracket, matches_from_paired, shuffle};
pub use error::{CoreError, CoreResult};
pub use host::Host;
pub use ids::{AccountId, AssetId};
pub use impact::{object_impacted, operation_impacted, Authority, Operation, StoredObject};
pub use ledger::Ledger;
pub use notify::{accumulate_impacted, apply_operation_impact, dispatch_checkpoint, CategoryNotification, CheckpointNotifications, CoreConfig};
pub use random::SeededRng;
pub use schedule::{check_for_new_matches_to_start, MatchSlot, MatchState};
pub use state_machine::{
    advance_bracket, claim_refund_after_expiry, expire_registration, leave_player, register_player, start_tournament,
    StartPolicy, Tournament, TournamentDetails, TournamentOptions, TournamentState,
};
