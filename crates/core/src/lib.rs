//! # prevdoc core
//!
//! The relation and derived-requirement engine behind prevention plans (PDP)
//! and work orders (BDT):
//! - a soft-deletable, deduplicated store of polymorphic links between a
//!   document and referenced entities (risques, dispositifs, permits,
//!   audits, analyses de risque),
//! - batch reconciliation for multi-select dialogs,
//! - derivation of the permit types still required for compliance,
//! - validation gating save and tab navigation,
//! - JSON file persistence of whole documents.
//!
//! **No presentation concerns**: forms, tables, PDF rendering and transport
//! belong to the callers. Core functions are total for expected conditions
//! and return structured results (outcome enums, reports, counts); the
//! caller decides how to present them.

pub mod config;
pub mod constants;
pub mod document;
pub mod entities;
mod error;
pub mod permits;
pub mod reconcile;
pub mod relation;
pub mod repo;
pub mod resolver;
pub mod store;
pub mod validation;

pub use config::CoreConfig;
pub use document::{Document, DocumentKind};
pub use entities::{
    catalog_rows, AnalyseDeRisque, AuditSecu, Catalog, CatalogEntity, Catalogs, Dispositif,
    Permit, PermitType, Risque,
};
pub use error::{DocumentError, DocumentResult};
pub use permits::{derive_required_permits, RequiredPermitType};
pub use reconcile::{reconcile, ReconcileReport};
pub use relation::{LinkState, ObjectType, Relation, RelationHandle, RelationKey, RelationPatch};
pub use repo::{DocumentRepository, SaveGate};
pub use resolver::{resolve, LinkDecision};
pub use store::{AddOutcome, RelationSet};
pub use validation::{validate, DocumentTab, Severity, ValidationIssue, ValidationReport};
