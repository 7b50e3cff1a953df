//! Fetch-then-fold operations over a record store.

use crate::{Error, KeyValueRecord, PathTree, RecordReader, TrailingSeparator};

/// List records under `prefix`, sorted by key.
///
/// A flat pass-through: no tree is built. Store failures propagate unchanged.
pub fn list<R>(reader: &mut R, prefix: &str) -> Result<Vec<KeyValueRecord>, Error>
where
    R: RecordReader + ?Sized,
{
    let mut records = reader.list(prefix)?;
    records.sort_by(|a, b| a.key.cmp(&b.key));
    log::debug!("listed {} records under {:?}", records.len(), prefix);
    Ok(records)
}

/// Fetch records under `prefix` and fold them into a `PathTree`.
///
/// Trailing separators stay significant. Fetch failures and invalid keys are
/// returned as errors; a partial tree is never handed back.
pub fn build_tree<R>(reader: &mut R, prefix: &str) -> Result<PathTree, Error>
where
    R: RecordReader + ?Sized,
{
    build_tree_with(reader, prefix, TrailingSeparator::default())
}

/// `build_tree` with an explicit trailing-separator policy.
pub fn build_tree_with<R>(
    reader: &mut R,
    prefix: &str,
    policy: TrailingSeparator,
) -> Result<PathTree, Error>
where
    R: RecordReader + ?Sized,
{
    let records = reader.list(prefix)?;
    let count = records.len();

    let mut tree = PathTree::with_policy(policy);
    tree.extend(records)?;

    log::debug!(
        "built tree under {:?}: {} records, {} nodes",
        prefix,
        count,
        tree.node_count()
    );
    Ok(tree)
}
