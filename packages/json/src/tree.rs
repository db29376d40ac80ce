//! The NV-tree: ordered name/value nodes built from a row or a payload.

use rowfs_codec::ByteString;

/// One column of a fetched row. `value: None` is SQL NULL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Column {
    pub name: ByteString,
    pub value: Option<ByteString>,
}

impl Column {
    pub fn new(name: impl Into<ByteString>, value: impl Into<ByteString>) -> Self {
        Column {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    /// A column whose value is SQL NULL.
    pub fn null(name: impl Into<ByteString>) -> Self {
        Column {
            name: name.into(),
            value: None,
        }
    }
}

/// The value half of a node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum NodeValue {
    /// A quoted leaf.
    Scalar(ByteString),
    /// A nested object.
    Child(Tree),
    /// The field exists but carries nothing: `null`, `{}`, or a dangling name.
    #[default]
    Null,
}

/// A named entry inside an object.
///
/// `name` is `None` only for synthetic wrapper nodes built by callers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub name: Option<ByteString>,
    pub value: NodeValue,
}

impl Node {
    pub fn scalar(name: impl Into<ByteString>, value: impl Into<ByteString>) -> Self {
        Node {
            name: Some(name.into()),
            value: NodeValue::Scalar(value.into()),
        }
    }

    pub fn child(name: impl Into<ByteString>, tree: Tree) -> Self {
        Node {
            name: Some(name.into()),
            value: NodeValue::Child(tree),
        }
    }

    pub fn null(name: impl Into<ByteString>) -> Self {
        Node {
            name: Some(name.into()),
            value: NodeValue::Null,
        }
    }

    pub fn as_scalar(&self) -> Option<&ByteString> {
        match &self.value {
            NodeValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_child(&self) -> Option<&Tree> {
        match &self.value {
            NodeValue::Child(t) => Some(t),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.value, NodeValue::Null)
    }
}

/// An ordered sequence of nodes, exclusively owning everything below it.
///
/// Dropping a tree releases every child iteratively, so even a tree built
/// by hand to an arbitrary depth cannot overflow the stack on the way out.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub fn new() -> Self {
        Tree { nodes: Vec::new() }
    }

    /// Build the one-level tree for a row: a single node named by the
    /// primary key whose child holds one node per column, in order.
    ///
    /// A row without columns yields a key node with a `Null` value, which
    /// is also what parsing the rendered text gives back.
    pub fn from_row(key: impl Into<ByteString>, columns: &[Column]) -> Self {
        let value = if columns.is_empty() {
            NodeValue::Null
        } else {
            let nodes = columns
                .iter()
                .map(|c| Node {
                    name: Some(c.name.clone()),
                    value: match &c.value {
                        Some(v) => NodeValue::Scalar(v.clone()),
                        None => NodeValue::Null,
                    },
                })
                .collect();
            NodeValue::Child(Tree { nodes })
        };

        Tree {
            nodes: vec![Node {
                name: Some(key.into()),
                value,
            }],
        }
    }

    pub fn push(&mut self, node: Node) {
        self.nodes.push(node);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// First node with the given name.
    pub fn get(&self, name: &[u8]) -> Option<&Node> {
        self.nodes
            .iter()
            .find(|n| n.name.as_ref().is_some_and(|s| s.as_bytes() == name))
    }

    /// The primary key and column tree of a wrapped row.
    ///
    /// Returns `None` unless the tree is exactly one named node whose value
    /// is an object or `Null` (a row with no columns).
    pub fn wrapper(&self) -> Option<(&ByteString, Option<&Tree>)> {
        let [node] = self.nodes.as_slice() else {
            return None;
        };
        let name = node.name.as_ref()?;
        match &node.value {
            NodeValue::Child(t) => Some((name, Some(t))),
            NodeValue::Null => Some((name, None)),
            NodeValue::Scalar(_) => None,
        }
    }

    /// Number of object levels, counting this one. An empty tree has depth 1.
    pub fn depth(&self) -> usize {
        let mut deepest = 1;
        let mut stack: Vec<(&Tree, usize)> = vec![(self, 1)];
        while let Some((tree, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            for node in &tree.nodes {
                if let NodeValue::Child(child) = &node.value {
                    stack.push((child, depth + 1));
                }
            }
        }
        deepest
    }
}

impl Drop for Tree {
    fn drop(&mut self) {
        let mut pending: Vec<Tree> = Vec::new();
        detach_children(&mut self.nodes, &mut pending);
        while let Some(mut tree) = pending.pop() {
            detach_children(&mut tree.nodes, &mut pending);
            // `tree` now owns no children and drops in constant stack.
        }
    }
}

fn detach_children(nodes: &mut Vec<Node>, pending: &mut Vec<Tree>) {
    for node in nodes.drain(..) {
        if let NodeValue::Child(child) = node.value {
            pending.push(child);
        }
    }
}

impl FromIterator<Node> for Tree {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        Tree {
            nodes: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Tree {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_row_wraps_columns_under_key() {
        let tree = Tree::from_row("42", &[Column::new("name", "Alice"), Column::null("note")]);
        assert_eq!(tree.len(), 1);

        let (key, columns) = tree.wrapper().unwrap();
        assert_eq!(key, "42");
        let columns = columns.unwrap();
        assert_eq!(columns.len(), 2);
        assert_eq!(columns.get(b"name").unwrap().as_scalar().unwrap(), "Alice");
        assert!(columns.get(b"note").unwrap().is_null());
    }

    #[test]
    fn from_row_preserves_order_and_duplicates() {
        let tree = Tree::from_row(
            "k",
            &[
                Column::new("b", "1"),
                Column::new("a", "2"),
                Column::new("b", "3"),
            ],
        );
        let (_, columns) = tree.wrapper().unwrap();
        let names: Vec<_> = columns
            .unwrap()
            .iter()
            .map(|n| n.name.clone().unwrap())
            .collect();
        let expected: Vec<ByteString> = vec!["b".into(), "a".into(), "b".into()];
        assert_eq!(names, expected);
    }

    #[test]
    fn empty_row_is_null_key_node() {
        let tree = Tree::from_row("k", &[]);
        assert_eq!(tree.len(), 1);
        assert!(tree.nodes()[0].is_null());
        assert_eq!(tree.wrapper(), Some((&ByteString::from("k"), None)));
    }

    #[test]
    fn wrapper_requires_single_named_object() {
        let mut tree = Tree::new();
        assert!(tree.wrapper().is_none());

        tree.push(Node::scalar("a", "1"));
        assert!(tree.wrapper().is_none());

        let tree: Tree = [Node::null("a"), Node::null("b")].into_iter().collect();
        assert!(tree.wrapper().is_none());

        let nameless: Tree = [Node {
            name: None,
            value: NodeValue::Child(Tree::new()),
        }]
        .into_iter()
        .collect();
        assert!(nameless.wrapper().is_none());
    }

    #[test]
    fn depth_counts_levels() {
        assert_eq!(Tree::new().depth(), 1);
        assert_eq!(Tree::from_row("k", &[Column::new("a", "b")]).depth(), 2);
    }

    #[test]
    fn deep_tree_drops_without_recursion() {
        let mut tree = Tree::new();
        for _ in 0..200_000 {
            let mut parent = Tree::new();
            parent.push(Node::child("n", tree));
            tree = parent;
        }
        assert_eq!(tree.len(), 1);
        drop(tree);
    }
}
