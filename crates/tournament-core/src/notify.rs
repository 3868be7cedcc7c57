//! Change-notification dispatch
//!
//! Turns a checkpoint's new/changed/removed object lists into the account
//! sets that should be notified, accumulating `impact::object_impacted`
//! across each category and skipping a category entirely when it has
//! nothing to report.

use crate::impact::{self, Operation, StoredObject};
use crate::ids::AccountId;
use std::collections::BTreeSet;

/// Behavior switches for historical quirks in impact accumulation that are
/// kept rather than silently fixed, since downstream consumers may already
/// depend on them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoreConfig {
    /// When true, a `TournamentLeave` operation being folded into a running
    /// impacted-accounts set *removes* the canceling account and the
    /// leaving player from that set instead of adding them. This reproduces
    /// a quirk of the source implementation rather than the more obviously
    /// correct "leaving impacts both accounts" behavior, preserved here
    /// because changing it would alter which accounts get notified of a
    /// tournament-leave in ways existing integrations may rely on.
    pub legacy_leave_erases_impact: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            legacy_leave_erases_impact: true,
        }
    }
}

/// Fold one operation's impact into `running`, applying the leave-erase
/// quirk when configured.
pub fn apply_operation_impact(running: &mut BTreeSet<AccountId>, op: &Operation, config: &CoreConfig) {
    if config.legacy_leave_erases_impact {
        if let Operation::TournamentLeave {
            canceling_account_id,
            player_account_id,
        } = op
        {
            running.remove(canceling_account_id);
            running.remove(player_account_id);
            return;
        }
    }
    running.extend(impact::operation_impacted(op));
}

/// Accumulate the impacted-account set across a list of stored objects,
/// routing `OperationHistory` entries through `apply_operation_impact` so
/// the leave-erase quirk applies uniformly regardless of where the
/// operation appears.
pub fn accumulate_impacted(objects: &[StoredObject], config: &CoreConfig) -> BTreeSet<AccountId> {
    let mut running = BTreeSet::new();
    for obj in objects {
        match obj {
            StoredObject::OperationHistory { op } => apply_operation_impact(&mut running, op, config),
            other => running.extend(impact::object_impacted(other)),
        }
    }
    running
}

/// One category of a checkpoint's notification, present only when its
/// object id list was non-empty.
pub type CategoryNotification<Id> = Option<(Vec<Id>, BTreeSet<AccountId>)>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckpointNotifications<Id> {
    pub new: CategoryNotification<Id>,
    pub changed: CategoryNotification<Id>,
    pub removed: CategoryNotification<Id>,
}

fn dispatch_category<Id: Clone>(objects: &[(Id, StoredObject)], config: &CoreConfig) -> CategoryNotification<Id> {
    if objects.is_empty() {
        return None;
    }
    let ids: Vec<Id> = objects.iter().map(|(id, _)| id.clone()).collect();
    let stored: Vec<&StoredObject> = objects.iter().map(|(_, obj)| obj).collect();
    let mut running = BTreeSet::new();
    for obj in stored {
        match obj {
            StoredObject::OperationHistory { op } => apply_operation_impact(&mut running, op, config),
            other => running.extend(impact::object_impacted(other)),
        }
    }
    Some((ids, running))
}

/// Dispatch a full checkpoint: three independent categories, each present
/// only if its id list is non-empty.
pub fn dispatch_checkpoint<Id: Clone>(
    new_objects: &[(Id, StoredObject)],
    changed_objects: &[(Id, StoredObject)],
    removed_objects: &[(Id, StoredObject)],
    config: &CoreConfig,
) -> CheckpointNotifications<Id> {
    CheckpointNotifications {
        new: dispatch_category(new_objects, config),
        changed: dispatch_category(changed_objects, config),
        removed: dispatch_category(removed_objects, config),
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
    fn test_s5_leave_erases_from_running_set() {
        let config = CoreConfig::default();
        let mut running: BTreeSet<AccountId> = BTreeSet::from([acc(1), acc(2)]);
        let op = Operation::TournamentLeave {
            canceling_account_id: acc(1),
            player_account_id: acc(2),
        };
        apply_operation_impact(&mut running, &op, &config);
        assert!(running.is_empty());
    }

    #[test]
    fn test_leave_erase_disabled_falls_back_to_union() {
        let config = CoreConfig {
            legacy_leave_erases_impact: false,
        };
        let mut running: BTreeSet<AccountId> = BTreeSet::from([acc(3)]);
        let op = Operation::TournamentLeave {
            canceling_account_id: acc(1),
            player_account_id: acc(2),
        };
        apply_operation_impact(&mut running, &op, &config);
        assert_eq!(running, BTreeSet::from([acc(1), acc(2), acc(3)]));
    }

    #[test]
    fn test_empty_category_yields_no_dispatch() {
        let config = CoreConfig::default();
        let result: CheckpointNotifications<u64> = dispatch_checkpoint(&[], &[], &[], &config);
        assert!(result.new.is_none());
        assert!(result.changed.is_none());
        assert!(result.removed.is_none());
    }

    #[test]
    fn test_new_objects_dispatch_with_accumulated_accounts() {
        let config = CoreConfig::default();
        let objects = vec![
            (1u64, StoredObject::Account { id: acc(1) }),
            (2u64, StoredObject::Asset { issuer: acc(2) }),
        ];
        let result = dispatch_checkpoint(&objects, &[], &[], &config);
        let (ids, accounts) = result.new.unwrap();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(accounts, BTreeSet::from([acc(1), acc(2)]));
    }

    #[test]
    fn test_accumulate_impacted_skips_nothing_for_non_leave_ops() {
        let config = CoreConfig::default();
        let objects = vec![
            StoredObject::OperationHistory {
                op: Operation::TournamentJoin {
                    payer_account_id: acc(1),
                    player_account_id: acc(2),
                },
            },
            StoredObject::OperationHistory {
                op: Operation::GameMove { player_account_id: acc(3) },
            },
        ];
        let accounts = accumulate_impacted(&objects, &config);
        assert_eq!(accounts, BTreeSet::from([acc(1), acc(2), acc(3)]));
    }
}
