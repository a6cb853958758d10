//! Duplicate/reactivation resolution for incoming links.
//!
//! This is the single home of the "what happens when this pair is added"
//! policy. [`RelationSet::add`] and the batch reconciler both go through
//! [`resolve`], so duplicate handling and reactivation behave identically
//! whether a link comes from a single click or a multi-select dialog.
//!
//! [`RelationSet::add`]: crate::store::RelationSet::add

use crate::relation::{ObjectType, Relation};
use prevdoc_types::EntityId;

/// Outcome of resolving a candidate (type, id) link against the current
/// relation list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkDecision {
    /// An active record already exists for the pair. Informational, not an
    /// error: the caller surfaces a notice and changes nothing.
    AlreadyLinked,
    /// A soft-deleted record exists at this index; flip it back to linked in
    /// place so its backend id survives (update, not insert).
    Reactivate(usize),
    /// No record exists for the pair; append a fresh one.
    CreateNew,
}

/// Decides how to handle linking (`object_type`, `object_id`).
///
/// The three branches are checked strictly in order: an active record wins
/// over any soft-deleted history, and reactivation wins over creation. Pure
/// function, no mutation.
pub fn resolve(relations: &[Relation], object_type: ObjectType, object_id: EntityId) -> LinkDecision {
    let mut same_pair = relations
        .iter()
        .enumerate()
        .filter(|(_, r)| r.object_type == object_type && r.object_id == object_id);

    if same_pair.clone().any(|(_, r)| r.is_active()) {
        return LinkDecision::AlreadyLinked;
    }

    match same_pair.next() {
        Some((index, _)) => LinkDecision::Reactivate(index),
        None => LinkDecision::CreateNew,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relation::LinkState;

    fn eid(raw: i64) -> EntityId {
        EntityId::new(raw).expect("valid id")
    }

    fn relation(object_id: i64, answer: LinkState) -> Relation {
        Relation {
            answer,
            ..Relation::new_linked(ObjectType::Risque, eid(object_id))
        }
    }

    #[test]
    fn empty_list_creates() {
        assert_eq!(
            resolve(&[], ObjectType::Risque, eid(1)),
            LinkDecision::CreateNew
        );
    }

    #[test]
    fn active_pair_is_already_linked() {
        let relations = vec![relation(1, LinkState::Linked)];
        assert_eq!(
            resolve(&relations, ObjectType::Risque, eid(1)),
            LinkDecision::AlreadyLinked
        );
    }

    #[test]
    fn not_applicable_still_counts_as_linked() {
        // NotApplicable is an active record: the pair is present on the
        // document, just answered "no".
        let relations = vec![relation(1, LinkState::NotApplicable)];
        assert_eq!(
            resolve(&relations, ObjectType::Risque, eid(1)),
            LinkDecision::AlreadyLinked
        );
    }

    #[test]
    fn soft_deleted_pair_reactivates() {
        let relations = vec![relation(2, LinkState::Linked), relation(1, LinkState::Removed)];
        assert_eq!(
            resolve(&relations, ObjectType::Risque, eid(1)),
            LinkDecision::Reactivate(1)
        );
    }

    #[test]
    fn active_record_wins_over_stale_soft_deleted_duplicates() {
        // Historical data can contain a removed duplicate alongside the
        // active record; the active one must decide.
        let relations = vec![relation(1, LinkState::Removed), relation(1, LinkState::Linked)];
        assert_eq!(
            resolve(&relations, ObjectType::Risque, eid(1)),
            LinkDecision::AlreadyLinked
        );
    }

    #[test]
    fn pair_matching_requires_both_type_and_id() {
        let relations = vec![relation(1, LinkState::Linked)];
        assert_eq!(
            resolve(&relations, ObjectType::Dispositif, eid(1)),
            LinkDecision::CreateNew
        );
        assert_eq!(
            resolve(&relations, ObjectType::Risque, eid(2)),
            LinkDecision::CreateNew
        );
    }
}
