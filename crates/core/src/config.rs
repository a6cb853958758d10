//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into
//! services, rather than read from the environment mid-operation where it
//! could change under a running command.

use crate::constants::{BDT_DIR_NAME, DEFAULT_DATA_DIR, PDP_DIR_NAME};
use crate::document::DocumentKind;
use crate::{DocumentError, DocumentResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
}

impl CoreConfig {
    /// Create a new `CoreConfig` rooted at the given data directory.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::InvalidInput` if the path is empty.
    pub fn new(data_dir: PathBuf) -> DocumentResult<Self> {
        if data_dir.as_os_str().is_empty() {
            return Err(DocumentError::InvalidInput(
                "data_dir cannot be empty".into(),
            ));
        }
        Ok(Self { data_dir })
    }

    /// The default configuration, storing under [`DEFAULT_DATA_DIR`] in the
    /// working directory.
    pub fn default_dir() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Storage directory for one document kind.
    pub fn kind_dir(&self, kind: DocumentKind) -> PathBuf {
        let name = match kind {
            DocumentKind::Pdp => PDP_DIR_NAME,
            DocumentKind::Bdt => BDT_DIR_NAME,
        };
        self.data_dir.join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_dirs_are_separated() {
        let config = CoreConfig::new(PathBuf::from("/tmp/prevdoc")).expect("valid config");
        assert_eq!(config.kind_dir(DocumentKind::Pdp), Path::new("/tmp/prevdoc/pdp"));
        assert_eq!(config.kind_dir(DocumentKind::Bdt), Path::new("/tmp/prevdoc/bdt"));
    }

    #[test]
    fn empty_data_dir_is_rejected() {
        assert!(CoreConfig::new(PathBuf::new()).is_err());
    }
}
