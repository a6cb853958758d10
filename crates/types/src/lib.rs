//! Validated domain primitives shared across the prevdoc crates.
//!
//! These types enforce their invariants at construction time, so the rest of
//! the codebase can carry them around without re-checking. Deserialization
//! goes through the same constructors, so invalid wire data is rejected at
//! the boundary rather than surfacing later as a half-validated document.

/// Errors that can occur when creating a [`Libelle`].
#[derive(Debug, thiserror::Error)]
pub enum LibelleError {
    /// The input text was empty or contained only whitespace
    #[error("libellé cannot be empty")]
    Empty,
}

/// Errors that can occur when creating an [`EntityId`].
#[derive(Debug, thiserror::Error)]
pub enum EntityIdError {
    /// The identifier was zero or negative
    #[error("entity id must be strictly positive, got {0}")]
    NotPositive(i64),
}

/// A display label that guarantees non-empty content.
///
/// Used for document names, chantier names and catalog entity titles. The
/// input is trimmed of leading and trailing whitespace during construction;
/// a trimmed-empty input is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Libelle(String);

impl Libelle {
    /// Creates a new `Libelle` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the
    /// trimmed result is empty, an error is returned.
    ///
    /// # Errors
    ///
    /// Returns `LibelleError::Empty` if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, LibelleError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(LibelleError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Libelle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Libelle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for Libelle {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for Libelle {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Libelle::new(&s).map_err(serde::de::Error::custom)
    }
}

/// A backend-assigned identifier, guaranteed strictly positive.
///
/// Relation records reference foreign entities (risques, dispositifs,
/// permits...) by these numeric ids; zero and negative values never occur in
/// backend data and are rejected here so lookups downstream cannot silently
/// miss on a sentinel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(i64);

impl EntityId {
    /// Creates a new `EntityId` from a raw backend identifier.
    ///
    /// # Errors
    ///
    /// Returns `EntityIdError::NotPositive` if the value is zero or negative.
    pub fn new(raw: i64) -> Result<Self, EntityIdError> {
        if raw <= 0 {
            return Err(EntityIdError::NotPositive(raw));
        }
        Ok(Self(raw))
    }

    /// Returns the raw identifier value.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl serde::Serialize for EntityId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i64(self.0)
    }
}

impl<'de> serde::Deserialize<'de> for EntityId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = i64::deserialize(deserializer)?;
        EntityId::new(raw).map_err(serde::de::Error::custom)
    }
}
