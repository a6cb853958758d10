//! Constants used throughout the prevdoc core crate.
//!
//! Path and filename constants live here so storage layout stays consistent
//! across the codebase.

/// Default directory for document storage when no explicit directory is
/// configured.
pub const DEFAULT_DATA_DIR: &str = "prevdoc_data";

/// Directory name for prevention plan (PDP) documents.
pub const PDP_DIR_NAME: &str = "pdp";

/// Directory name for work order (BDT) documents.
pub const BDT_DIR_NAME: &str = "bdt";

/// File extension for stored documents.
pub const DOCUMENT_FILE_EXT: &str = "json";
