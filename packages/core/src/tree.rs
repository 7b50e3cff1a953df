//! A tree of path segments built from flat keys.
//!
//! `PathTree` owns a set of root `PathNode`s. Every node carries its full
//! segment path (the key prefix it stands for), an optional record whose key
//! designates it, and its children keyed by their own full segment paths.
//!
//! Placement rules:
//! - A key without a separator is a root of its own (`x`).
//! - A key with a separator lives under the root made of everything up to and
//!   including its first separator (`/` for `/a/b`, `a/` for `a/b`).
//! - Below the root, each further separator closes a segment. The node for
//!   that segment has the key prefix ending just before the separator as its
//!   path, so `/a` and `/a/b` share the node `/a`.
//!
//! Interior node paths therefore never end in the separator: `/a/b/c` passes
//! through `/a` and `/a/b`, not `/a/` and `/a/b/`. A node path ends in `/`
//! only when the key itself does (or the node is a root such as `/`). The
//! same paths key the `children` maps in the JSON output.
//!
//! Dropping, cloning, comparing and traversing a tree use explicit stacks, so
//! arbitrarily deep keys are safe. Serialization nests one level per segment
//! and refuses trees deeper than 256 levels with a serializer error.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::iter::{Iter, Records};
use crate::{Error, KeyValueRecord};

/// The hierarchy separator.
pub const SEPARATOR: char = '/';

/// How keys ending in the separator are placed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TrailingSeparator {
    /// `/a/b` and `/a/b/` are distinct keys and land on distinct nodes; the
    /// latter is the child of the former with an empty last segment.
    #[default]
    Preserve,
    /// Trailing separators are ignored for placement, so `/a/b` and `/a/b/`
    /// share a node (last write wins). A key is never trimmed below its root.
    Normalize,
}

/// A node in a `PathTree`.
///
/// A node may hold a record and children at the same time: that is how a key
/// which is also a prefix of other keys is kept intact.
pub struct PathNode {
    path: String,
    record: Option<KeyValueRecord>,
    children: BTreeMap<String, PathNode>,
}

/// Deepest nesting `Serialize` will emit.
const MAX_SERIALIZED_DEPTH: usize = 256;

impl PathNode {
    fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            record: None,
            children: BTreeMap::new(),
        }
    }

    /// The cumulative segment path from the tree root to this node.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The last segment of the path, for display.
    ///
    /// Roots return their whole path; a node for an empty segment (as in
    /// `/a//b`) returns `""`.
    pub fn segment(&self) -> &str {
        if root_of(&self.path) == self.path {
            return &self.path;
        }
        match self.path.rfind(SEPARATOR) {
            Some(idx) => &self.path[idx + SEPARATOR.len_utf8()..],
            None => &self.path,
        }
    }

    /// The record whose key designates this node, if any.
    pub fn record(&self) -> Option<&KeyValueRecord> {
        self.record.as_ref()
    }

    /// Children keyed by their full segment path, in lexicographic order.
    pub fn children(&self) -> &BTreeMap<String, PathNode> {
        &self.children
    }

    /// Look up an immediate child by its full segment path.
    pub fn child(&self, path: &str) -> Option<&PathNode> {
        self.children.get(path)
    }

    /// True if the node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Count of records held by this node and its descendants.
    pub fn record_count(&self) -> usize {
        self.iter().filter(|(_, node)| node.record.is_some()).count()
    }

    /// Depth-first traversal of this subtree, starting with this node.
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(std::iter::once(self))
    }

    /// Number of levels in this subtree, counting this node.
    fn height(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1)];
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(node.children.values().map(|child| (child, depth + 1)));
        }
        deepest
    }

    /// A copy of this node without its children.
    fn detached(&self) -> Self {
        Self {
            path: self.path.clone(),
            record: self.record.clone(),
            children: BTreeMap::new(),
        }
    }
}

impl Drop for PathNode {
    fn drop(&mut self) {
        let mut stack: Vec<PathNode> = std::mem::take(&mut self.children).into_values().collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(std::mem::take(&mut node.children).into_values());
        }
    }
}

impl Clone for PathNode {
    fn clone(&self) -> Self {
        // Each frame is a copy under construction and the originals of the
        // children it still has to receive.
        let mut stack = vec![(self.detached(), self.children.values())];
        while let Some((_, pending)) = stack.last_mut() {
            if let Some(child) = pending.next() {
                stack.push((child.detached(), child.children.values()));
                continue;
            }
            let (done, _) = match stack.pop() {
                Some(frame) => frame,
                None => break,
            };
            match stack.last_mut() {
                Some((parent, _)) => {
                    parent.children.insert(done.path.clone(), done);
                }
                None => return done,
            }
        }
        self.detached()
    }
}

impl PartialEq for PathNode {
    fn eq(&self, other: &Self) -> bool {
        let mut stack = vec![(self, other)];
        while let Some((left, right)) = stack.pop() {
            if left.path != right.path
                || left.record != right.record
                || left.children.len() != right.children.len()
            {
                return false;
            }
            for ((left_path, left_child), (right_path, right_child)) in
                left.children.iter().zip(&right.children)
            {
                if left_path != right_path {
                    return false;
                }
                stack.push((left_child, right_child));
            }
        }
        true
    }
}

impl Eq for PathNode {}

impl fmt::Debug for PathNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathNode")
            .field("path", &self.path)
            .field("record", &self.record)
            .field("children", &self.children.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Serialize for PathNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        check_depth::<S::Error>(self.height())?;
        Nested(self).serialize(serializer)
    }
}

/// Serializes a node and its subtree once the depth has been checked.
struct Nested<'a>(&'a PathNode);

impl Serialize for Nested<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let node = self.0;
        let len = 1 + usize::from(node.record.is_some()) + usize::from(!node.is_leaf());
        let mut state = serializer.serialize_struct("PathNode", len)?;
        state.serialize_field("path", &node.path)?;
        match &node.record {
            Some(record) => state.serialize_field("record", record)?,
            None => state.skip_field("record")?,
        }
        if node.is_leaf() {
            state.skip_field("children")?;
        } else {
            state.serialize_field("children", &NestedMap(&node.children))?;
        }
        state.end()
    }
}

struct NestedMap<'a>(&'a BTreeMap<String, PathNode>);

impl Serialize for NestedMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(path, node)| (path, Nested(node))))
    }
}

fn check_depth<E: serde::ser::Error>(depth: usize) -> Result<(), E> {
    if depth > MAX_SERIALIZED_DEPTH {
        return Err(E::custom(format!(
            "tree is {} levels deep, more than the {} that can be serialized",
            depth, MAX_SERIALIZED_DEPTH
        )));
    }
    Ok(())
}

/// A tree of `PathNode`s built from a snapshot of key-value records.
///
/// Insertion needs `&mut self`; callers populating one tree from several
/// threads must serialize their inserts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathTree {
    roots: BTreeMap<String, PathNode>,
    policy: TrailingSeparator,
}

impl PathTree {
    /// Create an empty tree that keeps trailing separators significant.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty tree with the given trailing-separator policy.
    pub fn with_policy(policy: TrailingSeparator) -> Self {
        Self {
            roots: BTreeMap::new(),
            policy,
        }
    }

    /// Build a tree from a sequence of records.
    pub fn from_records<I>(records: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = KeyValueRecord>,
    {
        let mut tree = Self::new();
        tree.extend(records)?;
        Ok(tree)
    }

    /// How this tree places keys ending in the separator.
    pub fn policy(&self) -> TrailingSeparator {
        self.policy
    }

    /// Insert a record, creating every node on the way to its key.
    ///
    /// An existing record at the same node is replaced; children are never
    /// touched. Fails only for an empty key, in which case the tree is left
    /// as it was.
    pub fn insert(&mut self, record: KeyValueRecord) -> Result<(), Error> {
        if record.key.is_empty() {
            return Err(Error::invalid_key("key must not be empty"));
        }

        let end = self.placement_len(&record.key);
        let node = get_or_create(&mut self.roots, &record.key[..end]);
        node.record = Some(record);
        Ok(())
    }

    /// Insert every record in order, stopping at the first invalid key.
    pub fn extend<I>(&mut self, records: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = KeyValueRecord>,
    {
        for record in records {
            self.insert(record)?;
        }
        Ok(())
    }

    /// Look up a node by its exact segment path.
    pub fn get(&self, path: &str) -> Option<&PathNode> {
        let mut current = self.roots.get(root_of(path))?;
        for end in segment_ends(path) {
            let child_path = &path[..end];
            if child_path == current.path {
                continue;
            }
            current = current.children.get(child_path)?;
        }
        Some(current)
    }

    /// Look up the record stored for a key, honoring the tree's policy.
    pub fn get_record(&self, key: &str) -> Option<&KeyValueRecord> {
        if key.is_empty() {
            return None;
        }
        self.get(&key[..self.placement_len(key)])?.record()
    }

    /// True if a record is stored for the key.
    pub fn contains(&self, key: &str) -> bool {
        self.get_record(key).is_some()
    }

    /// Top-level nodes keyed by their path.
    pub fn roots(&self) -> &BTreeMap<String, PathNode> {
        &self.roots
    }

    /// Number of records held (not nodes).
    pub fn len(&self) -> usize {
        self.roots.values().map(PathNode::record_count).sum()
    }

    /// True if the tree holds no records.
    pub fn is_empty(&self) -> bool {
        self.records().next().is_none()
    }

    /// Total number of nodes, including structural ones without a record.
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// Depth-first traversal of `(path, node)` pairs.
    ///
    /// Roots and children are visited in lexicographic order of their path,
    /// so the output does not depend on insertion order.
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(self.roots.values())
    }

    /// Every stored record, in traversal order.
    pub fn records(&self) -> Records<'_> {
        Records::new(self.iter())
    }

    /// Length of the key prefix used for placement.
    fn placement_len(&self, key: &str) -> usize {
        match self.policy {
            TrailingSeparator::Preserve => key.len(),
            TrailingSeparator::Normalize => {
                let trimmed = key.trim_end_matches(SEPARATOR).len();
                trimmed.max(root_of(key).len())
            }
        }
    }
}

impl Serialize for PathTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let height = self.roots.values().map(PathNode::height).max().unwrap_or(0);
        check_depth::<S::Error>(height)?;

        let mut state = serializer.serialize_struct("PathTree", 1)?;
        state.serialize_field("roots", &NestedMap(&self.roots))?;
        state.end()
    }
}

impl<'a> IntoIterator for &'a PathTree {
    type Item = (&'a str, &'a PathNode);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// The root path a key lives under.
fn root_of(path: &str) -> &str {
    match path.find(SEPARATOR) {
        Some(idx) => &path[..idx + SEPARATOR.len_utf8()],
        None => path,
    }
}

/// End offsets of each segment below the root, the last being the full path.
fn segment_ends(path: &str) -> impl Iterator<Item = usize> + '_ {
    let start = root_of(path).len();
    path[start..]
        .match_indices(SEPARATOR)
        .map(move |(idx, _)| start + idx)
        .chain(std::iter::once(path.len()))
}

/// Walk from the root to the node for `path`, creating missing nodes.
fn get_or_create<'a>(roots: &'a mut BTreeMap<String, PathNode>, path: &str) -> &'a mut PathNode {
    let root_path = root_of(path);
    let mut current = roots
        .entry(root_path.to_string())
        .or_insert_with(|| PathNode::new(root_path));

    for end in segment_ends(path) {
        let child_path = &path[..end];
        // An empty segment right after the root would name the root itself.
        if child_path == current.path {
            continue;
        }
        current = current
            .children
            .entry(child_path.to_string())
            .or_insert_with(|| PathNode::new(child_path));
    }
    current
}
