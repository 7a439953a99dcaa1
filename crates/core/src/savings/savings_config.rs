use std::collections::BTreeSet;
use std::env::VarError;

use serde::{Deserialize, Serialize};

use super::savings_constants::{DEFAULT_EAGER_LOAD_EXCLUSIONS, EAGER_LOAD_EXCLUSIONS_ENV};
use crate::errors::{Error, Result};

/// External identifiers of accounts whose single-account lookups skip eager loading.
///
/// Serialized as a plain JSON array of identifiers. Matching is exact and
/// case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EagerLoadExclusions {
    external_ids: BTreeSet<String>,
}

impl Default for EagerLoadExclusions {
    fn default() -> Self {
        Self::new(DEFAULT_EAGER_LOAD_EXCLUSIONS)
    }
}

impl EagerLoadExclusions {
    pub fn new<I, S>(external_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            external_ids: external_ids.into_iter().map(Into::into).collect(),
        }
    }

    /// An empty set: every single-account lookup is eager-loaded.
    pub fn none() -> Self {
        Self {
            external_ids: BTreeSet::new(),
        }
    }

    /// Parses a comma separated list. Blank entries are ignored, so an empty value
    /// yields an empty set.
    pub fn parse(value: &str) -> Result<Self> {
        let mut external_ids = BTreeSet::new();
        for entry in value.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            if entry.chars().any(char::is_whitespace) {
                return Err(Error::InvalidConfigValue(format!(
                    "{}: '{}' is not a valid external identifier",
                    EAGER_LOAD_EXCLUSIONS_ENV, entry
                )));
            }
            external_ids.insert(entry.to_string());
        }
        Ok(Self { external_ids })
    }

    /// Reads the exclusions from `SAVINGS_EAGER_LOAD_EXCLUSIONS`, falling back to the
    /// built-in set when the variable is not present.
    pub fn from_env() -> Result<Self> {
        match std::env::var(EAGER_LOAD_EXCLUSIONS_ENV) {
            Ok(value) => Self::parse(&value),
            Err(VarError::NotPresent) => Ok(Self::default()),
            Err(e) => Err(Error::InvalidConfigValue(format!(
                "{}: {}",
                EAGER_LOAD_EXCLUSIONS_ENV, e
            ))),
        }
    }

    pub fn contains(&self, external_id: &str) -> bool {
        self.external_ids.contains(external_id)
    }

    /// An account without an external identifier is never excluded.
    pub fn is_excluded(&self, external_id: Option<&str>) -> bool {
        external_id.is_some_and(|id| self.contains(id))
    }

    pub fn len(&self) -> usize {
        self.external_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.external_ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.external_ids.iter().map(String::as_str)
    }
}
