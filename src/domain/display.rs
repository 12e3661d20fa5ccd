use termtree::Tree;
use tracing::instrument;

use crate::domain::node::{NodeId, TreeNode};

pub trait TreeDisplay {
    /// Renders the visible part of the tree, honoring collapse and tombstones.
    fn to_display_tree(&self, selected: Option<&NodeId>) -> Tree<String>;
}

/// Label for one node: name, id, and state markers.
pub fn node_label(node: &TreeNode, is_active: bool) -> String {
    let mut label = format!("{} ({})", node.name, node.id);
    if node.is_collapsed && node.has_live_children() {
        label.push_str(" [+]");
    }
    if node.has_more {
        label.push_str(" [...]");
    }
    if is_active {
        label.push_str(" *");
    }
    label
}

impl TreeDisplay for TreeNode {
    #[instrument(level = "debug", skip(self), fields(root = %self.id))]
    fn to_display_tree(&self, selected: Option<&NodeId>) -> Tree<String> {
        fn build(node: &TreeNode, selected: Option<&NodeId>) -> Tree<String> {
            let is_active = selected.is_some_and(|id| id == &node.id);
            let leaves: Vec<_> = if node.is_collapsed {
                Vec::new()
            } else {
                node.live_children().map(|c| build(c, selected)).collect()
            };
            Tree::new(node_label(node, is_active)).with_leaves(leaves)
        }

        // the root is drawn as a plain label, never as an active node
        let leaves: Vec<_> = self.live_children().map(|c| build(c, selected)).collect();
        Tree::new(self.name.clone()).with_leaves(leaves)
    }
}
