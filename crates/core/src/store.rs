//! The relation store: the single owner of a document's relation list.
//!
//! Every mutation — add, soft delete, field update, batch reconcile — goes
//! through [`RelationSet`], which maintains the core invariant: for a given
//! (objectType, objectId) pair, at most one record is non-`Removed` at any
//! time. `Removed` records accumulate as history and are kept in the save
//! payload.

use crate::relation::{
    LinkState, ObjectType, Relation, RelationHandle, RelationPatch,
};
use crate::resolver::{resolve, LinkDecision};
use crate::{DocumentError, DocumentResult};
use prevdoc_types::EntityId;
use serde::{Deserialize, Serialize};

/// What [`RelationSet::add`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddOutcome {
    /// A fresh record was appended.
    Created,
    /// An existing soft-deleted record was flipped back to linked.
    Reactivated,
    /// The pair was already active; nothing changed. Informational — callers
    /// surface a notice, not an error.
    AlreadyLinked,
}

impl AddOutcome {
    /// Whether the call changed the relation list.
    pub fn changed(self) -> bool {
        !matches!(self, AddOutcome::AlreadyLinked)
    }
}

/// A document's relation list, with soft-delete semantics.
///
/// Insertion order is preserved for stable display, but carries no meaning;
/// uniqueness is scoped to the (type, id) pair.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationSet(Vec<Relation>);

impl RelationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Links (`object_type`, `object_id`) to the document.
    ///
    /// Reactivates an existing soft-deleted record in place when one exists
    /// (its backend id is preserved, so persistence sees an update rather
    /// than an insert); otherwise appends a fresh unsaved record. Adding an
    /// already-active pair is idempotent and reports
    /// [`AddOutcome::AlreadyLinked`].
    pub fn add(&mut self, object_type: ObjectType, object_id: EntityId) -> AddOutcome {
        match resolve(&self.0, object_type, object_id) {
            LinkDecision::AlreadyLinked => AddOutcome::AlreadyLinked,
            LinkDecision::Reactivate(index) => {
                self.0[index].answer = LinkState::Linked;
                AddOutcome::Reactivated
            }
            LinkDecision::CreateNew => {
                self.0.push(Relation::new_linked(object_type, object_id));
                AddOutcome::Created
            }
        }
    }

    /// Soft-deletes the active record for (`object_type`, `object_id`).
    ///
    /// Mutates at most one record per call, even if historical data holds
    /// duplicates for the pair. Returns `false` (no-op) when no active
    /// record exists.
    pub fn soft_delete(&mut self, object_type: ObjectType, object_id: EntityId) -> bool {
        let found = self
            .0
            .iter_mut()
            .find(|r| r.object_type == object_type && r.object_id == object_id && r.is_active());
        match found {
            Some(relation) => {
                relation.answer = LinkState::Removed;
                true
            }
            None => false,
        }
    }

    /// Applies a single-field update to exactly the record the handle names.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::RelationNotFound`] when no record matches.
    pub fn update(&mut self, handle: RelationHandle, patch: RelationPatch) -> DocumentResult<()> {
        let relation = self
            .0
            .iter_mut()
            .find(|r| handle.matches(r))
            .ok_or_else(|| DocumentError::RelationNotFound(handle.to_string()))?;
        match patch {
            RelationPatch::Answer(state) => relation.answer = state,
            RelationPatch::Ee(flag) => relation.ee = Some(flag),
            RelationPatch::Eu(flag) => relation.eu = Some(flag),
        }
        Ok(())
    }

    /// Records of the given type that are present on the document
    /// (linked or explicitly not applicable).
    pub fn active_of_type(&self, object_type: ObjectType) -> impl Iterator<Item = &Relation> {
        self.0
            .iter()
            .filter(move |r| r.object_type == object_type && r.is_active())
    }

    /// Records of the given type that are actively linked, excluding
    /// "not applicable" answers.
    pub fn linked_of_type(&self, object_type: ObjectType) -> impl Iterator<Item = &Relation> {
        self.0
            .iter()
            .filter(move |r| r.object_type == object_type && r.is_linked())
    }

    /// All records, history included.
    pub fn iter(&self) -> impl Iterator<Item = &Relation> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Relation] {
        &self.0
    }

    /// Total record count, history included.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Count of non-`Removed` records across all types.
    pub fn active_count(&self) -> usize {
        self.0.iter().filter(|r| r.is_active()).count()
    }
}

impl From<Vec<Relation>> for RelationSet {
    fn from(relations: Vec<Relation>) -> Self {
        Self(relations)
    }
}
