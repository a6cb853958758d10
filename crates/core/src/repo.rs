//! Document persistence: a JSON file store plus the save re-entrancy guard.
//!
//! Documents persist as one JSON file per document under
//! `<data_dir>/{pdp,bdt}/<id>.json`. The payload is the FULL document,
//! soft-deleted relations included, so a backend reading it can tell "never
//! linked" from "unlinked". Local state is optimistic: a failed save leaves
//! both the file and the in-memory document as they were, so the user keeps
//! their edits and can retry.

use crate::config::CoreConfig;
use crate::document::{Document, DocumentKind};
use crate::{DocumentError, DocumentResult};
use prevdoc_types::EntityId;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

/// JSON file store for documents.
pub struct DocumentRepository {
    config: CoreConfig,
}

impl DocumentRepository {
    pub fn new(config: CoreConfig) -> Self {
        Self { config }
    }

    fn document_path(&self, kind: DocumentKind, id: EntityId) -> PathBuf {
        self.config
            .kind_dir(kind)
            .join(format!("{id}.{}", crate::constants::DOCUMENT_FILE_EXT))
    }

    /// Next free document id for a kind: one past the highest stored id.
    fn allocate_id(&self, kind: DocumentKind) -> DocumentResult<EntityId> {
        let highest = self.list(kind)?.into_iter().map(EntityId::get).max();
        EntityId::new(highest.unwrap_or(0) + 1)
            .map_err(|e| DocumentError::InvalidInput(e.to_string()))
    }

    /// Saves a document, allocating an id for first-time saves.
    ///
    /// The id is committed to the in-memory document only after the file
    /// write succeeds; on failure the document is left exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns storage, serialization or write errors from `DocumentError`.
    pub fn save(&self, document: &mut Document) -> DocumentResult<EntityId> {
        let dir = self.config.kind_dir(document.kind);
        fs::create_dir_all(&dir).map_err(DocumentError::StorageDirCreation)?;

        let id = match document.id {
            Some(id) => id,
            None => self.allocate_id(document.kind)?,
        };

        let mut payload = document.clone();
        payload.id = Some(id);
        let json = serde_json::to_string_pretty(&payload).map_err(DocumentError::Serialization)?;
        fs::write(self.document_path(document.kind, id), json)
            .map_err(DocumentError::FileWrite)?;

        document.id = Some(id);
        Ok(id)
    }

    /// Loads one document by kind and id.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::DocumentNotFound` when no such file exists,
    /// and read/deserialization errors otherwise.
    pub fn load(&self, kind: DocumentKind, id: EntityId) -> DocumentResult<Document> {
        let path = self.document_path(kind, id);
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(DocumentError::DocumentNotFound { kind, id });
            }
            Err(e) => return Err(DocumentError::FileRead(e)),
        };
        serde_json::from_str(&json).map_err(DocumentError::Deserialization)
    }

    /// Ids of all stored documents of a kind, ascending. A kind directory
    /// that does not exist yet simply yields no ids.
    pub fn list(&self, kind: DocumentKind) -> DocumentResult<Vec<EntityId>> {
        let dir = self.config.kind_dir(kind);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(DocumentError::FileRead(e)),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(DocumentError::FileRead)?;
            let path = entry.path();
            let stem = path.file_stem().and_then(|s| s.to_str());
            let Some(raw) = stem.and_then(|s| s.parse::<i64>().ok()) else {
                tracing::warn!(path = %path.display(), "ignoring non-document file in store");
                continue;
            };
            match EntityId::new(raw) {
                Ok(id) => ids.push(id),
                Err(_) => {
                    tracing::warn!(path = %path.display(), "ignoring non-positive document id");
                }
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }
}

/// Re-entrancy guard for the asynchronous save round trip.
///
/// While a save is in flight the UI must not trigger another one; relation
/// mutations remain allowed and ride along with the next save attempt.
#[derive(Debug, Default)]
pub struct SaveGate {
    in_flight: bool,
}

impl SaveGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a save as started.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::SaveInFlight` while a previous save has not
    /// finished.
    pub fn begin(&mut self) -> DocumentResult<()> {
        if self.in_flight {
            return Err(DocumentError::SaveInFlight);
        }
        self.in_flight = true;
        Ok(())
    }

    /// Re-arms the gate once the save round trip completed, successfully or
    /// not.
    pub fn finish(&mut self) {
        self.in_flight = false;
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relation::{LinkState, ObjectType};
    use prevdoc_types::Libelle;

    fn eid(raw: i64) -> EntityId {
        EntityId::new(raw).expect("valid id")
    }

    fn repository() -> (tempfile::TempDir, DocumentRepository) {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = CoreConfig::new(dir.path().to_path_buf()).expect("valid config");
        (dir, DocumentRepository::new(config))
    }

    fn draft() -> Document {
        let mut document = Document::new(DocumentKind::Pdp);
        document.nom = Some(Libelle::new("PDP test").expect("valid nom"));
        document.add_relation(ObjectType::Risque, eid(1));
        document.add_relation(ObjectType::Risque, eid(2));
        document.soft_delete_relation(ObjectType::Risque, eid(2));
        document
    }

    #[test]
    fn save_allocates_sequential_ids_per_kind() {
        let (_dir, repo) = repository();
        let mut first = draft();
        let mut second = draft();
        let mut other_kind = Document::new(DocumentKind::Bdt);

        assert_eq!(repo.save(&mut first).expect("save"), eid(1));
        assert_eq!(repo.save(&mut second).expect("save"), eid(2));
        assert_eq!(repo.save(&mut other_kind).expect("save"), eid(1));
        assert_eq!(first.id, Some(eid(1)));
    }

    #[test]
    fn save_load_round_trip_keeps_removed_relations() {
        let (_dir, repo) = repository();
        let mut document = draft();
        let id = repo.save(&mut document).expect("save");

        let loaded = repo.load(DocumentKind::Pdp, id).expect("load");
        assert_eq!(loaded, document);
        assert_eq!(loaded.relations.len(), 2, "history survives persistence");
        assert_eq!(loaded.relations.active_count(), 1);
        let removed = loaded
            .relations
            .iter()
            .find(|r| r.object_id == eid(2))
            .expect("record present");
        assert_eq!(removed.answer, LinkState::Removed);
    }

    #[test]
    fn resaving_keeps_the_same_id() {
        let (_dir, repo) = repository();
        let mut document = draft();
        let id = repo.save(&mut document).expect("save");
        document.add_relation(ObjectType::Dispositif, eid(9));
        assert_eq!(repo.save(&mut document).expect("resave"), id);
        assert_eq!(repo.list(DocumentKind::Pdp).expect("list"), vec![id]);
    }

    #[test]
    fn load_unknown_id_reports_not_found() {
        let (_dir, repo) = repository();
        let err = repo
            .load(DocumentKind::Bdt, eid(42))
            .expect_err("nothing stored");
        assert!(matches!(
            err,
            DocumentError::DocumentNotFound {
                kind: DocumentKind::Bdt,
                ..
            }
        ));
    }

    #[test]
    fn list_on_a_fresh_store_is_empty() {
        let (_dir, repo) = repository();
        assert!(repo.list(DocumentKind::Pdp).expect("list").is_empty());
    }

    #[test]
    fn save_gate_blocks_reentry_until_finished() {
        let mut gate = SaveGate::new();
        gate.begin().expect("first save starts");
        assert!(gate.is_in_flight());
        assert!(matches!(gate.begin(), Err(DocumentError::SaveInFlight)));
        gate.finish();
        gate.begin().expect("gate re-armed after finish");
    }
}
