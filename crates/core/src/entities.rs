//! Referenced entity catalogs.
//!
//! The engine never owns risques, dispositifs, permits, audits or analyses de
//! risque: they arrive as read-only snapshots keyed by id, supplied by
//! whatever fetched them (REST hooks in the web client, JSON files in the
//! CLI). The core only reads ids and, for risques, the flags that drive
//! permit derivation. Lookups are optional-returning; a missing id is the
//! caller's data-integrity problem, never a panic.

use prevdoc_types::{EntityId, Libelle};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Categories of work permits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermitType {
    /// Work at height.
    Hauteur,
    /// Confined-space entry.
    EspaceConfine,
    /// Hot work (welding, cutting...).
    TravailChaud,
    /// Excavation work.
    Fouille,
    /// Electrical work.
    Electrique,
}

impl PermitType {
    pub fn as_str(self) -> &'static str {
        match self {
            PermitType::Hauteur => "HAUTEUR",
            PermitType::EspaceConfine => "ESPACE_CONFINE",
            PermitType::TravailChaud => "TRAVAIL_CHAUD",
            PermitType::Fouille => "FOUILLE",
            PermitType::Electrique => "ELECTRIQUE",
        }
    }
}

impl std::fmt::Display for PermitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A hazard entity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Risque {
    pub id: EntityId,
    pub titre: Libelle,
    /// Flagged as dangerous work.
    #[serde(default)]
    pub travaille_dangereux: bool,
    /// Flagged as requiring a permit.
    #[serde(default)]
    pub travaille_permit: bool,
    /// The permit category this risk calls for, when any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permit_type: Option<PermitType>,
}

impl Risque {
    /// Whether this risk contributes to permit derivation: hazardous (by
    /// either flag) and carrying a permit category.
    pub fn requires_permit(&self) -> bool {
        (self.travaille_dangereux || self.travaille_permit) && self.permit_type.is_some()
    }
}

/// A safety device or measure entity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dispositif {
    pub id: EntityId,
    pub titre: Libelle,
}

/// A work permit entity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permit {
    pub id: EntityId,
    pub titre: Libelle,
    #[serde(rename = "type")]
    pub permit_type: PermitType,
}

/// A safety audit entity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditSecu {
    pub id: EntityId,
    pub titre: Libelle,
}

/// A detailed risk-analysis entity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyseDeRisque {
    pub id: EntityId,
    pub activite: Libelle,
}

/// A read-only snapshot of one entity kind, keyed by id.
pub type Catalog<T> = HashMap<EntityId, T>;

/// Anything that can live in a [`Catalog`].
pub trait CatalogEntity {
    fn entity_id(&self) -> EntityId;
}

macro_rules! impl_catalog_entity {
    ($($ty:ty),+) => {
        $(impl CatalogEntity for $ty {
            fn entity_id(&self) -> EntityId {
                self.id
            }
        })+
    };
}

impl_catalog_entity!(Risque, Dispositif, Permit, AuditSecu, AnalyseDeRisque);

/// Builds a [`Catalog`] from fetched rows, keyed by entity id.
pub fn catalog_rows<T: CatalogEntity>(rows: Vec<T>) -> Catalog<T> {
    rows.into_iter()
        .map(|row| (row.entity_id(), row))
        .collect()
}

/// The full set of entity catalogs the engine reads from.
///
/// All lookups return `Option`; empty catalogs are valid and simply make
/// every lookup miss.
#[derive(Clone, Debug, Default)]
pub struct Catalogs {
    pub risques: Catalog<Risque>,
    pub dispositifs: Catalog<Dispositif>,
    pub permits: Catalog<Permit>,
    pub audits: Catalog<AuditSecu>,
    pub analyses: Catalog<AnalyseDeRisque>,
}

impl Catalogs {
    pub fn risque(&self, id: EntityId) -> Option<&Risque> {
        self.risques.get(&id)
    }

    pub fn dispositif(&self, id: EntityId) -> Option<&Dispositif> {
        self.dispositifs.get(&id)
    }

    pub fn permit(&self, id: EntityId) -> Option<&Permit> {
        self.permits.get(&id)
    }

    pub fn audit(&self, id: EntityId) -> Option<&AuditSecu> {
        self.audits.get(&id)
    }

    pub fn analyse(&self, id: EntityId) -> Option<&AnalyseDeRisque> {
        self.analyses.get(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eid(raw: i64) -> EntityId {
        EntityId::new(raw).expect("valid id")
    }

    fn risque(id: i64, dangereux: bool, permit: bool, permit_type: Option<PermitType>) -> Risque {
        Risque {
            id: eid(id),
            titre: Libelle::new(format!("risque {id}")).expect("valid titre"),
            travaille_dangereux: dangereux,
            travaille_permit: permit,
            permit_type,
        }
    }

    #[test]
    fn requires_permit_needs_a_flag_and_a_type() {
        assert!(risque(1, true, false, Some(PermitType::Hauteur)).requires_permit());
        assert!(risque(2, false, true, Some(PermitType::Fouille)).requires_permit());
        // A permit type without a hazard flag is inert.
        assert!(!risque(3, false, false, Some(PermitType::Hauteur)).requires_permit());
        // A hazard flag without a permit type has nothing to derive.
        assert!(!risque(4, true, true, None).requires_permit());
    }

    #[test]
    fn permit_wire_form_uses_type_key() {
        let permit = Permit {
            id: eid(10),
            titre: Libelle::new("Permis hauteur").expect("valid titre"),
            permit_type: PermitType::Hauteur,
        };
        let json = serde_json::to_string(&permit).expect("serialize");
        assert!(json.contains("\"type\":\"HAUTEUR\""), "json was {json}");
    }

    #[test]
    fn catalog_rows_keys_by_entity_id() {
        let catalog = catalog_rows(vec![
            risque(1, true, false, Some(PermitType::Hauteur)),
            risque(2, false, false, None),
        ]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(&eid(2)).map(|r| r.id), Some(eid(2)));
    }
}
