//! Skill tree node model

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, DomainResult};

/// Opaque node identifier, unique across a whole tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A node in the skill tree.
///
/// Sibling order is the position in `children`; there is no separate order field.
/// Deleted nodes are tombstones: they stay in the data but are never traversed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    /// Immutable identifier (older tree files call it `uuid`)
    #[serde(alias = "uuid")]
    pub id: NodeId,
    /// Display name
    pub name: String,
    /// Ordered children
    #[serde(default)]
    pub children: Vec<TreeNode>,
    /// Soft-delete flag
    #[serde(default)]
    pub is_deleted: bool,
    /// Descendants are hidden while set
    #[serde(default)]
    pub is_collapsed: bool,
    /// Subtree is truncated; more children can be loaded
    #[serde(default, skip_serializing_if = "is_false")]
    pub has_more: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl TreeNode {
    /// Fresh node: no children, not deleted, not collapsed.
    pub fn new(id: impl Into<NodeId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            children: Vec::new(),
            is_deleted: false,
            is_collapsed: false,
            has_more: false,
        }
    }

    pub fn with_children(mut self, children: Vec<TreeNode>) -> Self {
        self.children = children;
        self
    }

    pub fn collapsed(mut self) -> Self {
        self.is_collapsed = true;
        self
    }

    pub fn deleted(mut self) -> Self {
        self.is_deleted = true;
        self
    }

    pub fn with_more(mut self) -> Self {
        self.has_more = true;
        self
    }

    /// Children that take part in traversal (tombstones filtered out).
    pub fn live_children(&self) -> impl DoubleEndedIterator<Item = &TreeNode> {
        self.children.iter().filter(|c| !c.is_deleted)
    }

    pub fn has_live_children(&self) -> bool {
        self.live_children().next().is_some()
    }

    /// Depth-first search for a node by id, including `self`.
    pub fn find(&self, id: &NodeId) -> Option<&TreeNode> {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if &node.id == id {
                return Some(node);
            }
            stack.extend(node.children.iter().rev());
        }
        None
    }

    pub fn find_mut(&mut self, id: &NodeId) -> Option<&mut TreeNode> {
        if &self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(id))
    }

    /// Finds the parent of the node with `id`, if `id` is not `self`.
    pub fn find_parent_mut(&mut self, id: &NodeId) -> Option<&mut TreeNode> {
        if self.children.iter().any(|c| &c.id == id) {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(|c| c.find_parent_mut(id))
    }

    /// Maximum depth of the tree, counting `self` as level 1.
    pub fn depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(|child| child.depth())
            .max()
            .unwrap_or(0)
    }

    /// Number of nodes below `self` that a walk would yield.
    ///
    /// Like the walk, this ignores `self.is_collapsed` and only stops below
    /// collapsed descendants.
    pub fn visible_count(&self) -> usize {
        self.live_children()
            .map(|child| {
                if child.is_collapsed {
                    1
                } else {
                    1 + child.visible_count()
                }
            })
            .sum()
    }

    /// Checks that every id occurs once in the tree.
    pub fn validate(&self) -> DomainResult<()> {
        let mut seen = HashSet::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if !seen.insert(&node.id) {
                return Err(DomainError::DuplicateId(node.id.clone()));
            }
            stack.extend(node.children.iter());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TreeNode {
        TreeNode::new("root", "Root").with_children(vec![
            TreeNode::new("a", "A").with_children(vec![TreeNode::new("a1", "A1")]),
            TreeNode::new("b", "B"),
        ])
    }

    #[test]
    fn given_nested_tree_when_finding_then_returns_descendant() {
        let tree = sample();
        assert_eq!(tree.find(&"a1".into()).map(|n| n.name.as_str()), Some("A1"));
        assert!(tree.find(&"zz".into()).is_none());
    }

    #[test]
    fn given_child_id_when_finding_parent_then_returns_owner() {
        let mut tree = sample();
        let parent = tree.find_parent_mut(&"a1".into()).expect("parent");
        assert_eq!(parent.id, NodeId::from("a"));
        assert!(tree.find_parent_mut(&"root".into()).is_none());
    }

    #[test]
    fn given_tree_when_computing_depth_then_counts_levels() {
        assert_eq!(sample().depth(), 3);
        assert_eq!(TreeNode::new("x", "X").depth(), 1);
    }

    #[test]
    fn given_collapsed_and_deleted_nodes_when_counting_visible_then_excludes_them() {
        let tree = TreeNode::new("root", "Root").with_children(vec![
            TreeNode::new("a", "A")
                .collapsed()
                .with_children(vec![TreeNode::new("a1", "A1")]),
            TreeNode::new("b", "B").deleted(),
            TreeNode::new("c", "C"),
        ]);
        assert_eq!(tree.visible_count(), 2);
    }

    #[test]
    fn given_duplicate_ids_when_validating_then_errors() {
        let tree = TreeNode::new("root", "Root")
            .with_children(vec![TreeNode::new("a", "A"), TreeNode::new("a", "A again")]);
        assert!(matches!(tree.validate(), Err(DomainError::DuplicateId(id)) if id.as_str() == "a"));
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn given_wire_json_without_children_when_parsing_then_defaults_to_empty() {
        let node: TreeNode =
            serde_json::from_str(r#"{"uuid":"n1","name":"Blue Fox"}"#).expect("parse");
        assert!(node.children.is_empty());
        assert!(!node.is_deleted);
        assert!(!node.is_collapsed);
        assert!(!node.has_more);
    }

    #[test]
    fn given_node_when_serializing_then_uses_camel_case_fields() {
        let json = serde_json::to_value(TreeNode::new("n1", "Blue Fox")).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "id": "n1",
                "name": "Blue Fox",
                "children": [],
                "isDeleted": false,
                "isCollapsed": false
            })
        );
    }
}
