//! The document aggregate: a PDP or BDT with its scalar fields and relation
//! list.

use crate::permits::{derive_required_permits, RequiredPermitType};
use crate::entities::Catalogs;
use crate::reconcile::{reconcile, ReconcileReport};
use crate::relation::{ObjectType, RelationHandle, RelationPatch};
use crate::store::{AddOutcome, RelationSet};
use crate::DocumentResult;
use chrono::NaiveDate;
use prevdoc_types::{EntityId, Libelle};
use serde::{Deserialize, Serialize};

/// The two document kinds the engine manages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DocumentKind {
    /// Plan de Prévention.
    Pdp,
    /// Bon de Travail.
    Bdt,
}

impl DocumentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentKind::Pdp => "pdp",
            DocumentKind::Bdt => "bdt",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pdp" => Ok(DocumentKind::Pdp),
            "bdt" => Ok(DocumentKind::Bdt),
            other => Err(format!("unknown document kind: {other}")),
        }
    }
}

/// A safety document: scalar business fields plus the owned relation list.
///
/// Scalar fields are optional because documents are drafted incrementally;
/// the validator decides which ones block saving. All relation mutations go
/// through the [`RelationSet`] so the link invariant holds document-wide.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Backend identifier; absent until first saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub kind: DocumentKind,
    /// Document name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nom: Option<Libelle>,
    /// The construction site this document covers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chantier_id: Option<EntityId>,
    /// The external contractor (entreprise extérieure).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entreprise_exterieure_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_debut: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_fin: Option<NaiveDate>,
    /// Full relation history, soft-deleted records included, so persistence
    /// can distinguish "never linked" from "unlinked".
    #[serde(default)]
    pub relations: RelationSet,
}

impl Document {
    /// Creates an empty draft of the given kind.
    pub fn new(kind: DocumentKind) -> Self {
        Self {
            id: None,
            kind,
            nom: None,
            chantier_id: None,
            entreprise_exterieure_id: None,
            date_debut: None,
            date_fin: None,
            relations: RelationSet::new(),
        }
    }

    /// Links an entity to this document. See [`RelationSet::add`].
    pub fn add_relation(&mut self, object_type: ObjectType, object_id: EntityId) -> AddOutcome {
        self.relations.add(object_type, object_id)
    }

    /// Soft-deletes a link. See [`RelationSet::soft_delete`].
    pub fn soft_delete_relation(&mut self, object_type: ObjectType, object_id: EntityId) -> bool {
        self.relations.soft_delete(object_type, object_id)
    }

    /// Updates one field of one relation record. See [`RelationSet::update`].
    pub fn update_relation(
        &mut self,
        handle: RelationHandle,
        patch: RelationPatch,
    ) -> DocumentResult<()> {
        self.relations.update(handle, patch)
    }

    /// Applies a multi-select result in one pass. See
    /// [`reconcile`](crate::reconcile::reconcile).
    pub fn reconcile_relations(
        &mut self,
        object_type: ObjectType,
        to_link: &[EntityId],
        to_unlink: &[EntityId],
    ) -> ReconcileReport {
        reconcile(&mut self.relations, object_type, to_link, to_unlink)
    }

    /// Recomputes the permit compliance view for this document.
    pub fn required_permits(&self, catalogs: &Catalogs) -> Vec<RequiredPermitType> {
        derive_required_permits(&self.relations, catalogs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relation::LinkState;

    fn eid(raw: i64) -> EntityId {
        EntityId::new(raw).expect("valid id")
    }

    #[test]
    fn document_round_trips_with_mixed_relation_states() {
        let mut document = Document::new(DocumentKind::Pdp);
        document.nom = Some(Libelle::new("PDP chantier nord").expect("valid nom"));
        document.chantier_id = Some(eid(7));
        document.date_debut = NaiveDate::from_ymd_opt(2026, 3, 2);

        document.add_relation(ObjectType::Risque, eid(1));
        document.add_relation(ObjectType::Risque, eid(2));
        document.soft_delete_relation(ObjectType::Risque, eid(2));
        document.add_relation(ObjectType::AnalyseDeRisque, eid(3));
        document
            .update_relation(
                RelationHandle::Composite(crate::relation::RelationKey {
                    object_type: ObjectType::AnalyseDeRisque,
                    object_id: eid(3),
                }),
                RelationPatch::Answer(LinkState::NotApplicable),
            )
            .expect("update");

        let json = serde_json::to_string(&document).expect("serialize");
        let back: Document = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, document, "tri-state answers survive the round trip");
    }

    #[test]
    fn kind_wire_form_is_uppercase() {
        let json = serde_json::to_string(&DocumentKind::Bdt).expect("serialize");
        assert_eq!(json, "\"BDT\"");
        assert_eq!("pdp".parse::<DocumentKind>().expect("parse"), DocumentKind::Pdp);
        assert!("plan".parse::<DocumentKind>().is_err());
    }

    #[test]
    fn new_document_starts_empty() {
        let document = Document::new(DocumentKind::Bdt);
        assert!(document.id.is_none());
        assert!(document.relations.is_empty());
    }
}
