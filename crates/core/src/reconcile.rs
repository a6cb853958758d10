//! Batch reconciliation for multi-select link dialogs.
//!
//! A selection dialog produces two sets for one entity type: ids now ticked
//! (`to_link`) and ids now unticked (`to_unlink`). Both are applied against
//! the same relation set in one synchronous pass, so no caller ever observes
//! a partially reconciled list.
//!
//! Pinned ordering policy: the link pass runs first, the unlink pass second.
//! An id present in both lists therefore ends up `Removed` (last write
//! wins), and is counted in both `added` and `unlinked`.

use crate::relation::ObjectType;
use crate::store::RelationSet;
use prevdoc_types::EntityId;

/// Mutation counts from one reconcile call, for user feedback.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Records created or reactivated by the link pass.
    pub added: usize,
    /// Active records soft-deleted by the unlink pass.
    pub unlinked: usize,
}

impl ReconcileReport {
    /// True when the call changed nothing; callers report "no changes"
    /// instead of a generic success message.
    pub fn is_noop(self) -> bool {
        self.added == 0 && self.unlinked == 0
    }
}

/// Applies a multi-select result to the relation set.
///
/// The link pass reuses the same resolution policy as single adds: already
/// active pairs contribute nothing to `added`, soft-deleted pairs are
/// reactivated in place, unknown pairs are created. The unlink pass then
/// soft-deletes each listed id that still has an active record.
pub fn reconcile(
    relations: &mut RelationSet,
    object_type: ObjectType,
    to_link: &[EntityId],
    to_unlink: &[EntityId],
) -> ReconcileReport {
    let mut report = ReconcileReport::default();

    for &object_id in to_link {
        if relations.add(object_type, object_id).changed() {
            report.added += 1;
        }
    }

    for &object_id in to_unlink {
        if relations.soft_delete(object_type, object_id) {
            report.unlinked += 1;
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relation::LinkState;

    fn eid(raw: i64) -> EntityId {
        EntityId::new(raw).expect("valid id")
    }

    fn state_of(set: &RelationSet, object_id: EntityId) -> Option<LinkState> {
        set.iter()
            .find(|r| r.object_id == object_id)
            .map(|r| r.answer)
    }

    #[test]
    fn links_and_unlinks_in_one_pass() {
        let mut set = RelationSet::new();
        set.add(ObjectType::Risque, eid(1));
        set.add(ObjectType::Risque, eid(2));

        let report = reconcile(
            &mut set,
            ObjectType::Risque,
            &[eid(3)],
            &[eid(1), eid(2)],
        );

        assert_eq!(report, ReconcileReport { added: 1, unlinked: 2 });
        assert_eq!(state_of(&set, eid(1)), Some(LinkState::Removed));
        assert_eq!(state_of(&set, eid(2)), Some(LinkState::Removed));
        assert_eq!(state_of(&set, eid(3)), Some(LinkState::Linked));
    }

    #[test]
    fn id_in_both_lists_ends_removed_and_counts_twice() {
        // Pinned policy: link pass first, unlink pass second, last write
        // wins. A in both lists → created then soft-deleted.
        let mut set = RelationSet::new();
        let report = reconcile(
            &mut set,
            ObjectType::Risque,
            &[eid(1), eid(2)],
            &[eid(1)],
        );

        assert_eq!(report, ReconcileReport { added: 2, unlinked: 1 });
        assert_eq!(state_of(&set, eid(1)), Some(LinkState::Removed));
        assert_eq!(state_of(&set, eid(2)), Some(LinkState::Linked));
    }

    #[test]
    fn already_linked_ids_do_not_inflate_added() {
        let mut set = RelationSet::new();
        set.add(ObjectType::Risque, eid(1));

        let report = reconcile(&mut set, ObjectType::Risque, &[eid(1), eid(2)], &[]);

        assert_eq!(report, ReconcileReport { added: 1, unlinked: 0 });
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn link_pass_reactivates_soft_deleted_pairs() {
        let mut set = RelationSet::new();
        set.add(ObjectType::Risque, eid(1));
        set.soft_delete(ObjectType::Risque, eid(1));

        let report = reconcile(&mut set, ObjectType::Risque, &[eid(1)], &[]);

        assert_eq!(report, ReconcileReport { added: 1, unlinked: 0 });
        assert_eq!(set.len(), 1, "reactivated, not duplicated");
        assert_eq!(state_of(&set, eid(1)), Some(LinkState::Linked));
    }

    #[test]
    fn unlinking_absent_ids_is_a_noop() {
        let mut set = RelationSet::new();
        let report = reconcile(&mut set, ObjectType::Risque, &[], &[eid(1), eid(2)]);
        assert!(report.is_noop());
        assert!(set.is_empty());
    }

    #[test]
    fn empty_selection_reports_no_changes() {
        let mut set = RelationSet::new();
        set.add(ObjectType::Risque, eid(1));
        let report = reconcile(&mut set, ObjectType::Risque, &[eid(1)], &[]);
        assert!(report.is_noop(), "re-linking an active pair changes nothing");
    }
}
