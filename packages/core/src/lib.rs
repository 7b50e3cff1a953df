//! kvtree core: a hierarchical view over a flat key-value namespace.
//!
//! Keys in stores like etcd are flat strings that conventionally use `/` as
//! a hierarchy separator. This crate folds a snapshot of such records into a
//! tree of path segments:
//!
//! - `KeyValueRecord`: a key, its value, and the store-assigned metadata
//! - `PathTree` / `PathNode`: the tree, built by repeated `insert`
//! - `RecordReader` / `RecordWriter`: the seam to whatever store supplies records
//! - `build_tree` / `list`: fetch-then-fold helpers over a reader
//!
//! # Example
//!
//! ```rust
//! use kvtree_core::{KeyValueRecord, PathTree};
//!
//! let mut tree = PathTree::new();
//! tree.insert(KeyValueRecord::new("/a", "v1")).unwrap();
//! tree.insert(KeyValueRecord::new("/a/b", "v2")).unwrap();
//!
//! // `/a` holds a value and is also the parent of `/a/b`
//! let a = tree.get("/a").unwrap();
//! assert_eq!(a.record().unwrap().value, "v1");
//! assert!(a.child("/a/b").is_some());
//! ```

mod error;
mod iter;
mod memory;
mod record;
mod service;
mod traits;
mod tree;

pub use error::Error;
pub use iter::{Iter, Records};
pub use memory::MemoryStore;
pub use record::KeyValueRecord;
pub use service::{build_tree, build_tree_with, list};
pub use traits::{RecordReader, RecordStore, RecordWriter};
pub use tree::{PathNode, PathTree, TrailingSeparator, SEPARATOR};
