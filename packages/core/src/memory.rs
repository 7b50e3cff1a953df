//! In-memory record store.

use std::collections::BTreeMap;

use crate::{Error, KeyValueRecord, RecordReader, RecordWriter};

/// A record store held in a `BTreeMap`.
///
/// Revisions follow the usual MVCC bookkeeping: every put or effective
/// delete bumps a store-wide revision, a key keeps its create revision across
/// updates, and its version counts puts since creation.
///
/// # Example
///
/// ```rust
/// use kvtree_core::{build_tree, MemoryStore, RecordWriter};
///
/// let mut store = MemoryStore::new();
/// store.put("/a", "v1").unwrap();
/// store.put("/a/b", "v2").unwrap();
///
/// let tree = build_tree(&mut store, "/").unwrap();
/// assert_eq!(tree.len(), 2);
/// ```
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    records: BTreeMap<String, KeyValueRecord>,
    revision: i64,
}

impl MemoryStore {
    /// Create an empty store at revision zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given records as-is.
    ///
    /// The store revision starts at the highest `mod_revision` seen.
    #[cfg(test)]
    pub(crate) fn with_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = KeyValueRecord>,
    {
        let records: BTreeMap<_, _> = records
            .into_iter()
            .map(|record| (record.key.clone(), record))
            .collect();
        let revision = records
            .values()
            .map(|record| record.mod_revision)
            .max()
            .unwrap_or(0);
        Self { records, revision }
    }

    /// The current store revision.
    pub fn revision(&self) -> i64 {
        self.revision
    }

    /// Look up a single record.
    pub fn get(&self, key: &str) -> Option<&KeyValueRecord> {
        self.records.get(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordReader for MemoryStore {
    fn list(&mut self, prefix: &str) -> Result<Vec<KeyValueRecord>, Error> {
        let records = self
            .records
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(_, record)| record.clone())
            .collect();
        Ok(records)
    }
}

impl RecordWriter for MemoryStore {
    fn put(&mut self, key: &str, value: &str) -> Result<(), Error> {
        if key.is_empty() {
            return Err(Error::invalid_key("key must not be empty"));
        }

        self.revision += 1;
        let revision = self.revision;
        let record = self
            .records
            .entry(key.to_string())
            .or_insert_with(|| KeyValueRecord::new(key, "").with_revisions(revision, revision));
        record.value = value.to_string();
        record.mod_revision = revision;
        record.version += 1;
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<bool, Error> {
        if self.records.remove(key).is_some() {
            self.revision += 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
