//! Depth-first traversal over a `PathTree`.

use crate::{KeyValueRecord, PathNode};

/// Iterator over `(path, node)` pairs in depth-first pre-order.
///
/// Siblings come out in lexicographic order of their segment path. The
/// iterator is `Clone`, so a traversal can be restarted from any point.
#[derive(Clone)]
pub struct Iter<'a> {
    stack: Vec<&'a PathNode>,
}

impl<'a> Iter<'a> {
    pub(crate) fn new<I>(start: I) -> Self
    where
        I: IntoIterator<Item = &'a PathNode>,
        I::IntoIter: DoubleEndedIterator,
    {
        Self {
            stack: start.into_iter().rev().collect(),
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a PathNode);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Reverse so the smallest child is popped first.
        self.stack.extend(node.children().values().rev());
        Some((node.path(), node))
    }
}

/// Iterator over the records held in a tree, in traversal order.
#[derive(Clone)]
pub struct Records<'a> {
    inner: Iter<'a>,
}

impl<'a> Records<'a> {
    pub(crate) fn new(inner: Iter<'a>) -> Self {
        Self { inner }
    }
}

impl<'a> Iterator for Records<'a> {
    type Item = &'a KeyValueRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.by_ref().find_map(|(_, node)| node.record())
    }
}

#[cfg(test)]
mod tests {
    use crate::{KeyValueRecord, PathTree};

    fn tree(keys: &[&str]) -> PathTree {
        PathTree::from_records(keys.iter().map(|k| KeyValueRecord::new(*k, *k))).unwrap()
    }

    #[test]
    fn iter_empty() {
        assert_eq!(PathTree::new().iter().count(), 0);
    }

    #[test]
    fn iter_is_depth_first_and_sorted() {
        let tree = tree(&["/b", "/a/c", "x", "/a", "/a/b"]);
        let paths: Vec<_> = tree.iter().map(|(path, _)| path).collect();

        assert_eq!(paths, vec!["/", "/a", "/a/b", "/a/c", "/b", "x"]);
    }

    #[test]
    fn iter_independent_of_insertion_order() {
        let a = tree(&["/z/y/x", "/a", "q", "/m/n"]);
        let b = tree(&["/m/n", "q", "/a", "/z/y/x"]);

        let left: Vec<_> = a.iter().map(|(p, _)| p.to_string()).collect();
        let right: Vec<_> = b.iter().map(|(p, _)| p.to_string()).collect();
        assert_eq!(left, right);
    }

    #[test]
    fn iter_restarts_from_clone() {
        let tree = tree(&["/a/b", "/c"]);
        let mut iter = tree.iter();
        iter.next();

        let rest: Vec<_> = iter.clone().map(|(p, _)| p).collect();
        let again: Vec<_> = iter.map(|(p, _)| p).collect();
        assert_eq!(rest, again);
        assert_eq!(tree.iter().count(), 4);
    }

    #[test]
    fn records_skip_structural_nodes() {
        let tree = tree(&["/a/b/c", "/a"]);
        let keys: Vec<_> = tree.records().map(|r| r.key.as_str()).collect();

        assert_eq!(keys, vec!["/a", "/a/b/c"]);
    }

    #[test]
    fn subtree_iter() {
        let tree = tree(&["/a/b", "/a/c", "/d"]);
        let paths: Vec<_> = tree.get("/a").unwrap().iter().map(|(p, _)| p).collect();

        assert_eq!(paths, vec!["/a", "/a/b", "/a/c"]);
    }

    #[test]
    fn into_iterator_for_ref() {
        let tree = tree(&["k"]);
        let mut count = 0;
        for (path, node) in &tree {
            assert_eq!(path, "k");
            assert!(node.record().is_some());
            count += 1;
        }
        assert_eq!(count, 1);
    }
}
