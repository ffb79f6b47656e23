//! Failures surfaced by the container: lookups, alias registration, and
//! alias removal.

use thiserror::Error;

use crate::key::Key;

#[derive(Debug, Error)]
pub enum Error {
    /// The key (or alias) is not registered.
    #[error("key {0:?} is not present")]
    KeyNotFound(Key),

    /// Attribute-style surface of a failed lookup; the item-level failure
    /// is preserved as the source.
    #[error("attribute {name:?} is not present")]
    AttributeNotFound {
        name: String,
        #[source]
        source: Box<Error>,
    },

    /// The alias already resolves to a different canonical key.
    #[error("{alias:?} is already an alias for {existing:?}")]
    AliasCollision { alias: Key, existing: Key },

    /// Canonical keys cannot be removed through the alias API.
    #[error("{0:?} is a canonical key and cannot be removed as an alias")]
    AliasIsCanonicalKey(Key),

    /// The alias is not registered.
    #[error("{0:?} is not a registered alias")]
    AliasNotFound(Key),
}

impl Error {
    /// Wrap an item-level lookup failure for the attribute-style API.
    pub(crate) fn into_attribute(self, name: &str) -> Error {
        Error::AttributeNotFound {
            name: name.to_string(),
            source: Box::new(self),
        }
    }
}
