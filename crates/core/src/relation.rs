//! Relation records: the polymorphic links between a document and the
//! entities it references.
//!
//! A document (PDP or BDT) owns a list of [`Relation`] records, each pointing
//! at a foreign entity by type and id. Relations are soft-deleted, never
//! physically removed client-side: "unlinking" sets the state to
//! [`LinkState::Removed`] and the record stays in the list as history, so a
//! backend receiving the full payload can distinguish "never linked" from
//! "unlinked".
//!
//! The wire format keeps the backend's tri-state `answer` field (`true`,
//! `false`, `null`); in-memory code works with the explicit [`LinkState`]
//! enum instead of a nullable boolean.

use prevdoc_types::EntityId;
use serde::{Deserialize, Serialize};

/// Closed set of entity kinds a document can reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectType {
    /// A hazard (risque), possibly requiring a permit.
    Risque,
    /// A safety device or measure (dispositif).
    Dispositif,
    /// A work permit of a specific type.
    Permit,
    /// A safety audit.
    Audit,
    /// A detailed risk analysis, scoped by EE/EU applicability.
    AnalyseDeRisque,
}

impl ObjectType {
    /// All object types, in display order.
    pub const ALL: [ObjectType; 5] = [
        ObjectType::Risque,
        ObjectType::Dispositif,
        ObjectType::Permit,
        ObjectType::Audit,
        ObjectType::AnalyseDeRisque,
    ];

    /// Stable lowercase name, used for display and CLI parsing.
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectType::Risque => "risque",
            ObjectType::Dispositif => "dispositif",
            ObjectType::Permit => "permit",
            ObjectType::Audit => "audit",
            ObjectType::AnalyseDeRisque => "analyse-de-risque",
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ObjectType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown object type: {s}"))
    }
}

/// Link lifecycle state of a relation record.
///
/// This is the tri-state `answer` field made explicit: `Linked` serializes as
/// `true`, `NotApplicable` as `false` and `Removed` as `null`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LinkState {
    /// The entity is actively linked to the document.
    Linked,
    /// The user explicitly marked the entity as not applicable.
    NotApplicable,
    /// Soft-deleted; the record is kept as history.
    #[default]
    Removed,
}

impl LinkState {
    /// Converts to the wire form of the `answer` field.
    pub fn as_answer(self) -> Option<bool> {
        match self {
            LinkState::Linked => Some(true),
            LinkState::NotApplicable => Some(false),
            LinkState::Removed => None,
        }
    }

    /// Converts from the wire form of the `answer` field.
    pub fn from_answer(answer: Option<bool>) -> Self {
        match answer {
            Some(true) => LinkState::Linked,
            Some(false) => LinkState::NotApplicable,
            None => LinkState::Removed,
        }
    }

    /// Whether the record counts as present on the document (not soft-deleted).
    pub fn is_active(self) -> bool {
        !matches!(self, LinkState::Removed)
    }
}

/// Serde adapter keeping the nullable-boolean `answer` wire format.
mod answer_wire {
    use super::LinkState;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(state: &LinkState, serializer: S) -> Result<S::Ok, S::Error> {
        state.as_answer().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<LinkState, D::Error> {
        let answer = Option::<bool>::deserialize(deserializer)?;
        Ok(LinkState::from_answer(answer))
    }
}

/// The (type, id) pair identifying which entity a relation points at.
///
/// Link uniqueness is scoped to this pair: a document holds at most one
/// non-`Removed` relation per key, plus any number of `Removed` historical
/// records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RelationKey {
    pub object_type: ObjectType,
    pub object_id: EntityId,
}

impl std::fmt::Display for RelationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.object_id, self.object_type)
    }
}

/// A single link between a document and a referenced entity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    /// Backend identifier; absent until the document has been saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub object_type: ObjectType,
    pub object_id: EntityId,
    /// Tri-state link answer; `null` on the wire means soft-deleted.
    #[serde(default, with = "answer_wire")]
    pub answer: LinkState,
    /// Applies to the entreprise extérieure. Only meaningful for
    /// ANALYSE_DE_RISQUE relations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ee: Option<bool>,
    /// Applies to the entreprise utilisatrice. Only meaningful for
    /// ANALYSE_DE_RISQUE relations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eu: Option<bool>,
}

impl Relation {
    /// Creates a fresh, not-yet-persisted linked relation.
    pub fn new_linked(object_type: ObjectType, object_id: EntityId) -> Self {
        Self {
            id: None,
            object_type,
            object_id,
            answer: LinkState::Linked,
            ee: None,
            eu: None,
        }
    }

    pub fn key(&self) -> RelationKey {
        RelationKey {
            object_type: self.object_type,
            object_id: self.object_id,
        }
    }

    /// Not soft-deleted (either linked or explicitly not applicable).
    pub fn is_active(&self) -> bool {
        self.answer.is_active()
    }

    /// Actively linked (`answer == true` on the wire).
    pub fn is_linked(&self) -> bool {
        self.answer == LinkState::Linked
    }

    /// The update key for this record: the backend id once persisted,
    /// otherwise the `objectId_objectType` composite.
    pub fn handle(&self) -> RelationHandle {
        match self.id {
            Some(id) => RelationHandle::Persisted(id),
            None => RelationHandle::Composite(self.key()),
        }
    }
}

/// Key used to address one relation record for a field update.
///
/// Persisted records are addressed by backend id; unsaved ones by their
/// (type, id) composite key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelationHandle {
    Persisted(EntityId),
    Composite(RelationKey),
}

impl RelationHandle {
    pub(crate) fn matches(&self, relation: &Relation) -> bool {
        match *self {
            RelationHandle::Persisted(id) => relation.id == Some(id),
            RelationHandle::Composite(key) => relation.id.is_none() && relation.key() == key,
        }
    }
}

impl std::fmt::Display for RelationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelationHandle::Persisted(id) => write!(f, "#{id}"),
            RelationHandle::Composite(key) => write!(f, "{key}"),
        }
    }
}

/// A single-field update applied through [`RelationSet::update`].
///
/// [`RelationSet::update`]: crate::store::RelationSet::update
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelationPatch {
    Answer(LinkState),
    Ee(bool),
    Eu(bool),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eid(raw: i64) -> EntityId {
        EntityId::new(raw).expect("valid id")
    }

    #[test]
    fn answer_round_trips_all_three_states() {
        for (state, wire) in [
            (LinkState::Linked, "true"),
            (LinkState::NotApplicable, "false"),
            (LinkState::Removed, "null"),
        ] {
            let relation = Relation {
                answer: state,
                ..Relation::new_linked(ObjectType::Risque, eid(3))
            };
            let json = serde_json::to_string(&relation).expect("serialize");
            assert!(
                json.contains(&format!("\"answer\":{wire}")),
                "expected answer {wire} in {json}"
            );
            let back: Relation = serde_json::from_str(&json).expect("deserialize");
            assert_eq!(back.answer, state, "no coercion between tri-state values");
        }
    }

    #[test]
    fn missing_answer_key_deserializes_as_removed() {
        let back: Relation =
            serde_json::from_str(r#"{"objectType":"RISQUE","objectId":5}"#).expect("deserialize");
        assert_eq!(back.answer, LinkState::Removed);
    }

    #[test]
    fn object_type_uses_backend_tags() {
        let json = serde_json::to_string(&ObjectType::AnalyseDeRisque).expect("serialize");
        assert_eq!(json, "\"ANALYSE_DE_RISQUE\"");
        let back: ObjectType = serde_json::from_str("\"AUDIT\"").expect("deserialize");
        assert_eq!(back, ObjectType::Audit);
    }

    #[test]
    fn object_type_parses_cli_names() {
        for t in ObjectType::ALL {
            assert_eq!(t.as_str().parse::<ObjectType>().expect("parse"), t);
        }
        assert!("chantier".parse::<ObjectType>().is_err());
    }

    #[test]
    fn handle_prefers_backend_id_over_composite() {
        let mut relation = Relation::new_linked(ObjectType::Permit, eid(9));
        assert_eq!(
            relation.handle(),
            RelationHandle::Composite(relation.key())
        );
        relation.id = Some(eid(120));
        assert_eq!(relation.handle(), RelationHandle::Persisted(eid(120)));
    }

    #[test]
    fn composite_handle_does_not_match_persisted_records() {
        let mut relation = Relation::new_linked(ObjectType::Risque, eid(4));
        relation.id = Some(eid(77));
        let composite = RelationHandle::Composite(relation.key());
        assert!(!composite.matches(&relation));
        assert!(RelationHandle::Persisted(eid(77)).matches(&relation));
    }

    #[test]
    fn ee_eu_flags_survive_the_wire() {
        let mut relation = Relation::new_linked(ObjectType::AnalyseDeRisque, eid(2));
        relation.ee = Some(true);
        relation.eu = Some(false);
        let json = serde_json::to_string(&relation).expect("serialize");
        let back: Relation = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.ee, Some(true));
        assert_eq!(back.eu, Some(false));
    }
}
