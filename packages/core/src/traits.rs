//! Store traits: the seam between the tree and whatever holds the records.

use crate::{Error, KeyValueRecord};

/// List records from a flat key-value store.
///
/// This trait is object-safe: you can use `Box<dyn RecordReader>`.
pub trait RecordReader: Send + Sync {
    /// Return every record whose key starts with `prefix`.
    ///
    /// An empty prefix lists the whole namespace. Failures to reach the
    /// store are reported as `Error::Fetch`; callers get either the full
    /// listing or an error, never a partial result.
    fn list(&mut self, prefix: &str) -> Result<Vec<KeyValueRecord>, Error>;
}

/// Mutate a flat key-value store.
///
/// Writes go straight to the store. Trees built from earlier listings are
/// not updated; rebuild them to see the change.
pub trait RecordWriter: Send + Sync {
    /// Create or overwrite the value at `key`.
    fn put(&mut self, key: &str, value: &str) -> Result<(), Error>;

    /// Remove `key`. Returns whether anything was deleted.
    fn delete(&mut self, key: &str) -> Result<bool, Error>;
}

/// Combined read/write store.
pub trait RecordStore: RecordReader + RecordWriter {}
impl<T: RecordReader + RecordWriter> RecordStore for T {}
