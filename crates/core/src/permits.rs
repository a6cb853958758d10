//! Derivation of the permit types a document still requires.
//!
//! The compliance view joins the linked hazardous risks against the linked
//! permits: every permit category demanded by a linked risk yields one
//! [`RequiredPermitType`] group, covered or not. Groups are pure
//! derivations, recomputed whenever the relation set or the catalogs change,
//! and never stored.
//!
//! The deriver is total: orphaned relation ids are logged and skipped, a
//! missing or empty catalog just leaves every group uncovered.

use crate::entities::{Catalogs, Permit, PermitType, Risque};
use crate::relation::ObjectType;
use crate::store::RelationSet;

/// One permit category demanded by the document's linked risks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequiredPermitType {
    pub permit_type: PermitType,
    /// The linked hazardous risks demanding this category, in relation order.
    pub risks: Vec<Risque>,
    /// Whether a permit of this category is linked to the document.
    pub is_linked: bool,
    /// The covering permit entity, when one is linked.
    pub linked_permit: Option<Permit>,
}

/// Recomputes the required permit groups from the current relation set.
///
/// Risks count when they are linked (`answer == true`), resolvable through
/// the catalog, flagged hazardous and carrying a permit category. Groups
/// come out in first-seen risk order, so repeated recomputes over unchanged
/// data keep a stable order. A group is covered when some catalog permit of
/// its category has a linked PERMIT relation; a PERMIT relation whose id is
/// missing from the catalog counts as not-linked (fail safe toward "still
/// required").
pub fn derive_required_permits(
    relations: &RelationSet,
    catalogs: &Catalogs,
) -> Vec<RequiredPermitType> {
    // Permits currently linked to the document, orphans logged and dropped.
    let linked_permits: Vec<&Permit> = relations
        .linked_of_type(ObjectType::Permit)
        .filter_map(|relation| {
            let permit = catalogs.permit(relation.object_id);
            if permit.is_none() {
                tracing::warn!(
                    object_id = %relation.object_id,
                    "linked permit relation references an id missing from the catalog"
                );
            }
            permit
        })
        .collect();

    let mut groups: Vec<RequiredPermitType> = Vec::new();

    for relation in relations.linked_of_type(ObjectType::Risque) {
        let Some(risque) = catalogs.risque(relation.object_id) else {
            tracing::warn!(
                object_id = %relation.object_id,
                "linked risque relation references an id missing from the catalog"
            );
            continue;
        };
        if !risque.requires_permit() {
            continue;
        }
        let Some(permit_type) = risque.permit_type else {
            continue;
        };

        match groups.iter_mut().find(|g| g.permit_type == permit_type) {
            Some(group) => group.risks.push(risque.clone()),
            None => {
                let linked_permit = linked_permits
                    .iter()
                    .find(|p| p.permit_type == permit_type)
                    .map(|p| (*p).clone());
                groups.push(RequiredPermitType {
                    permit_type,
                    risks: vec![risque.clone()],
                    is_linked: linked_permit.is_some(),
                    linked_permit,
                });
            }
        }
    }

    groups
}
