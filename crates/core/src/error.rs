use crate::document::DocumentKind;
use prevdoc_types::EntityId;

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("no relation matches the given key: {0}")]
    RelationNotFound(String),
    #[error("a save is already in flight for this document")]
    SaveInFlight,
    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to write document file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to read document file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to serialize document: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize document: {0}")]
    Deserialization(serde_json::Error),
    #[error("no {kind} document with id {id}")]
    DocumentNotFound { kind: DocumentKind, id: EntityId },
}

pub type DocumentResult<T> = std::result::Result<T, DocumentError>;
