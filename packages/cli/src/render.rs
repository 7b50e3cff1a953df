//! Text rendering for listings and trees.

use std::fmt::Write;

use kvtree_core::{KeyValueRecord, PathNode, PathTree};

/// One `key = value` line per record.
pub fn render_records(records: &[KeyValueRecord]) -> String {
    let mut out = String::new();
    for record in records {
        let _ = writeln!(out, "{} = {}", record.key, record.value.escape_debug());
    }
    out
}

/// Draw the tree with box-drawing connectors.
///
/// Roots are labelled with their full path, other nodes with their last
/// segment. Nodes holding a record show ` = value`.
///
/// ```text
/// /
/// ├── a = v1
/// │   └── b = v2
/// └── c
///     └── d = v3
/// x = v4
/// ```
pub fn render_tree(tree: &PathTree) -> String {
    let mut out = String::new();
    for root in tree.roots().values() {
        let _ = writeln!(out, "{}", label(root, root.path()));

        let mut stack = children_of(root, "");
        while let Some((node, indent, last)) = stack.pop() {
            let connector = if last { "└── " } else { "├── " };
            let _ = writeln!(out, "{}{}{}", indent, connector, label(node, node.segment()));

            let nested = format!("{}{}", indent, if last { "    " } else { "│   " });
            stack.extend(children_of(node, &nested));
        }
    }
    out
}

/// Stack entries for a node's children, reversed so the first pops first.
fn children_of<'a>(node: &'a PathNode, indent: &str) -> Vec<(&'a PathNode, String, bool)> {
    let count = node.children().len();
    node.children()
        .values()
        .enumerate()
        .map(|(i, child)| (child, indent.to_string(), i + 1 == count))
        .rev()
        .collect()
}

fn label(node: &PathNode, name: &str) -> String {
    let name = if name.is_empty() { "\"\"" } else { name };
    match node.record() {
        Some(record) => format!("{} = {}", name, record.value.escape_debug()),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(pairs: &[(&str, &str)]) -> PathTree {
        PathTree::from_records(pairs.iter().map(|(k, v)| KeyValueRecord::new(*k, *v))).unwrap()
    }

    #[test]
    fn renders_nested_tree() {
        let tree = tree(&[("/a", "v1"), ("/a/b", "v2"), ("/c/d", "v3"), ("x", "v4")]);
        let expected = "\
/
├── a = v1
│   └── b = v2
└── c
    └── d = v3
x = v4
";
        assert_eq!(render_tree(&tree), expected);
    }

    #[test]
    fn empty_segment_is_quoted() {
        let tree = tree(&[("/a/", "dir")]);
        assert_eq!(render_tree(&tree), "/\n└── a\n    └── \"\" = dir\n");
    }

    #[test]
    fn values_are_escaped() {
        let tree = tree(&[("k", "line1\nline2")]);
        assert_eq!(render_tree(&tree), "k = line1\\nline2\n");
    }

    #[test]
    fn renders_deep_chain() {
        let key = "/a".repeat(3_000);
        let rendered = render_tree(&tree(&[(key.as_str(), "end")]));

        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines.len(), 3_001);
        assert_eq!(lines[0], "/");
        assert_eq!(lines[1], "└── a");
        assert_eq!(lines[3_000], format!("{}└── a = end", "    ".repeat(2_999)));
    }

    #[test]
    fn siblings_keep_order_after_nested_children() {
        let tree = tree(&[("/a/b/c", "1"), ("/a/d", "2"), ("/e", "3")]);
        let expected = "\
/
├── a
│   ├── b
│   │   └── c = 1
│   └── d = 2
└── e = 3
";
        assert_eq!(render_tree(&tree), expected);
    }

    #[test]
    fn empty_tree_renders_nothing() {
        assert_eq!(render_tree(&PathTree::new()), "");
    }

    #[test]
    fn renders_records() {
        let records = vec![KeyValueRecord::new("/a", "1"), KeyValueRecord::new("/b", "2")];
        assert_eq!(render_records(&records), "/a = 1\n/b = 2\n");
    }
}
