//! Account-impact resolution
//!
//! Every host-database operation and every stored-object variant names the
//! set of accounts it impacts, used downstream to route change
//! notifications. This module only computes that set; `notify` decides
//! what to do with it.

use crate::ids::AccountId;
use std::collections::BTreeMap;
use std::collections::BTreeSet;

/// A simplified weighted key/account authority — only the account side of
/// a real weighted-threshold authority matters for impact resolution, so
/// key-only entries are dropped at construction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Authority {
    pub account_auths: BTreeMap<AccountId, u16>,
}

impl Authority {
    pub fn single(account: AccountId) -> Self {
        let mut account_auths = BTreeMap::new();
        account_auths.insert(account, 1);
        Self { account_auths }
    }

    fn extend_into(&self, set: &mut BTreeSet<AccountId>) {
        set.extend(self.account_auths.keys().copied());
    }
}

/// Host-database operations whose account impact this crate resolves.
/// Variants with no natural account impact (fee-pool top-ups, feed
/// publication, settle-order bookkeeping, and the sport/event/betting
/// object family) fold into `NoImpact`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    Transfer {
        to: AccountId,
    },
    TransferOverride {
        from: AccountId,
        to: AccountId,
        issuer: AccountId,
    },
    LimitOrderCancel {
        fee_paying_account: AccountId,
    },
    FillOrder {
        account_id: AccountId,
    },
    AccountCreate {
        registrar: AccountId,
        referrer: AccountId,
        owner: Authority,
        active: Authority,
    },
    AccountUpdate {
        account: AccountId,
        new_owner: Option<Authority>,
        new_active: Option<Authority>,
    },
    AccountWhitelist {
        listed_account: AccountId,
    },
    AssetUpdate {
        new_issuer: Option<AccountId>,
    },
    AssetIssue {
        issue_to_account: AccountId,
    },
    AssetDividendDistribution {
        account_id: AccountId,
    },
    WitnessCreate {
        witness_account: AccountId,
    },
    WitnessUpdate {
        witness_account: AccountId,
    },
    CommitteeMemberCreate {
        committee_member_account: AccountId,
    },
    CommitteeMemberUpdate {
        committee_member_account: AccountId,
    },
    ProposalCreate {
        proposed_ops: Vec<Operation>,
        proposer_authority: Authority,
    },
    WithdrawPermissionCreate {
        authorized_account: AccountId,
    },
    WithdrawPermissionUpdate {
        authorized_account: AccountId,
    },
    WithdrawPermissionDelete {
        authorized_account: AccountId,
    },
    WithdrawPermissionClaim {
        withdraw_from_account: AccountId,
    },
    VestingBalanceCreate {
        owner: AccountId,
    },
    TransferToBlind {
        to_authorities: Vec<Authority>,
    },
    TransferFromBlind {
        from_authorities: Vec<Authority>,
    },
    AssetSettleCancel {
        account: AccountId,
    },
    FbaDistribute {
        account_id: AccountId,
    },
    TournamentCreate {
        creator: AccountId,
        whitelist: BTreeSet<AccountId>,
    },
    TournamentJoin {
        payer_account_id: AccountId,
        player_account_id: AccountId,
    },
    TournamentLeave {
        canceling_account_id: AccountId,
        player_account_id: AccountId,
    },
    GameMove {
        player_account_id: AccountId,
    },
    TournamentPayout {
        payout_account_id: AccountId,
    },
    AffiliatePayout {
        affiliate: AccountId,
    },
    NoImpact,
}

/// The set of accounts a single operation impacts. For `TournamentLeave`
/// this is the plain union of the two named accounts — the historical
/// "erase rather than insert" behavior lives one layer up, in
/// [`crate::notify::apply_operation_impact`], since it only makes sense
/// relative to an already-accumulated running set.
pub fn operation_impacted(op: &Operation) -> BTreeSet<AccountId> {
    let mut set = BTreeSet::new();
    match op {
        Operation::Transfer { to } => {
            set.insert(*to);
        }
        Operation::TransferOverride { from, to, issuer } => {
            set.insert(*from);
            set.insert(*to);
            set.insert(*issuer);
        }
        Operation::LimitOrderCancel { fee_paying_account } => {
            set.insert(*fee_paying_account);
        }
        Operation::FillOrder { account_id } => {
            set.insert(*account_id);
        }
        Operation::AccountCreate {
            registrar,
            referrer,
            owner,
            active,
        } => {
            set.insert(*registrar);
            set.insert(*referrer);
            owner.extend_into(&mut set);
            active.extend_into(&mut set);
        }
        Operation::AccountUpdate {
            account,
            new_owner,
            new_active,
        } => {
            set.insert(*account);
            if let Some(a) = new_owner {
                a.extend_into(&mut set);
            }
            if let Some(a) = new_active {
                a.extend_into(&mut set);
            }
        }
        Operation::AccountWhitelist { listed_account } => {
            set.insert(*listed_account);
        }
        Operation::AssetUpdate { new_issuer } => {
            if let Some(issuer) = new_issuer {
                set.insert(*issuer);
            }
        }
        Operation::AssetIssue { issue_to_account } => {
            set.insert(*issue_to_account);
        }
        Operation::AssetDividendDistribution { account_id } => {
            set.insert(*account_id);
        }
        Operation::WitnessCreate { witness_account } | Operation::WitnessUpdate { witness_account } => {
            set.insert(*witness_account);
        }
        Operation::CommitteeMemberCreate {
            committee_member_account,
        }
        | Operation::CommitteeMemberUpdate {
            committee_member_account,
        } => {
            set.insert(*committee_member_account);
        }
        Operation::ProposalCreate {
            proposed_ops,
            proposer_authority,
        } => {
            for inner in proposed_ops {
                set.extend(operation_impacted(inner));
            }
            proposer_authority.extend_into(&mut set);
        }
        Operation::WithdrawPermissionCreate { authorized_account }
        | Operation::WithdrawPermissionUpdate { authorized_account }
        | Operation::WithdrawPermissionDelete { authorized_account } => {
            set.insert(*authorized_account);
        }
        Operation::WithdrawPermissionClaim { withdraw_from_account } => {
            set.insert(*withdraw_from_account);
        }
        Operation::VestingBalanceCreate { owner } => {
            set.insert(*owner);
        }
        Operation::TransferToBlind { to_authorities } => {
            for a in to_authorities {
                a.extend_into(&mut set);
            }
        }
        Operation::TransferFromBlind { from_authorities } => {
            for a in from_authorities {
                a.extend_into(&mut set);
            }
        }
        Operation::AssetSettleCancel { account } => {
            set.insert(*account);
        }
        Operation::FbaDistribute { account_id } => {
            set.insert(*account_id);
        }
        Operation::TournamentCreate { creator, whitelist } => {
            set.insert(*creator);
            set.extend(whitelist.iter().copied());
        }
        Operation::TournamentJoin {
            payer_account_id,
            player_account_id,
        } => {
            set.insert(*payer_account_id);
            set.insert(*player_account_id);
        }
        Operation::TournamentLeave {
            canceling_account_id,
            player_account_id,
        } => {
            set.insert(*canceling_account_id);
            set.insert(*player_account_id);
        }
        Operation::GameMove { player_account_id } => {
            set.insert(*player_account_id);
        }
        Operation::TournamentPayout { payout_account_id } => {
            set.insert(*payout_account_id);
        }
        Operation::AffiliatePayout { affiliate } => {
            set.insert(*affiliate);
        }
        Operation::NoImpact => {}
    }
    set
}

/// Persisted host-database objects whose account impact this crate
/// resolves for new/changed/removed notifications. Impersonal objects
/// (balances, blocks, block summaries, chain/global properties) carry no
/// account impact of their own.
pub enum StoredObject {
    Account { id: AccountId },
    Asset { issuer: AccountId },
    LimitOrder { owner: AccountId },
    BlindedBalance { owner_authority: Authority },
    Proposal { proposed_ops: Vec<Operation>, proposer_authority: Authority },
    OperationHistory { op: Operation },
    Balance,
    Block,
    BlockSummary,
    ChainProperty,
    GlobalProperty,
    DynamicGlobalProperty,
}

pub fn object_impacted(obj: &StoredObject) -> BTreeSet<AccountId> {
    let mut set = BTreeSet::new();
    match obj {
        StoredObject::Account { id } => {
            set.insert(*id);
        }
        StoredObject::Asset { issuer } => {
            set.insert(*issuer);
        }
        StoredObject::LimitOrder { owner } => {
            set.insert(*owner);
        }
        StoredObject::BlindedBalance { owner_authority } => {
            owner_authority.extend_into(&mut set);
        }
        StoredObject::Proposal {
            proposed_ops,
            proposer_authority,
        } => {
            for op in proposed_ops {
                set.extend(operation_impacted(op));
            }
            proposer_authority.extend_into(&mut set);
        }
        StoredObject::OperationHistory { op } => {
            set.extend(operation_impacted(op));
        }
        StoredObject::Balance
        | StoredObject::Block
        | StoredObject::BlockSummary
        | StoredObject::ChainProperty
        | StoredObject::GlobalProperty
        | StoredObject::DynamicGlobalProperty => {}
    }
    set
}
