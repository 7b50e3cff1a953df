//! The flat key-value record fed into the tree.

use serde::{Deserialize, Serialize};

/// A single key-value pair as reported by the origin store.
///
/// The revision fields are carried for display only; the tree never
/// compares them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValueRecord {
    /// Fully-qualified key, `/`-separated by convention.
    pub key: String,

    /// The stored value, exposed as text.
    #[serde(default)]
    pub value: String,

    /// Store revision at which the key was created.
    #[serde(default)]
    pub create_revision: i64,

    /// Store revision of the last modification.
    #[serde(default)]
    pub mod_revision: i64,

    /// Number of modifications since creation. Reset to zero by the store
    /// on deletion.
    #[serde(default)]
    pub version: i64,

    /// Attached lease, zero when there is none.
    #[serde(default)]
    pub lease: i64,
}

impl KeyValueRecord {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            ..Default::default()
        }
    }

    pub fn with_revisions(mut self, create_revision: i64, mod_revision: i64) -> Self {
        self.create_revision = create_revision;
        self.mod_revision = mod_revision;
        self
    }

    pub fn with_version(mut self, version: i64) -> Self {
        self.version = version;
        self
    }

    pub fn with_lease(mut self, lease: i64) -> Self {
        self.lease = lease;
        self
    }

    /// The attached lease, if any.
    pub fn lease_id(&self) -> Option<i64> {
        (self.lease != 0).then_some(self.lease)
    }
}
