//! Pure pre-order traversal from a data tree to view-node descriptors.
//!
//! The walker never touches the tree it reads. The root is never yielded: it is
//! rendered by the host as a distinct tree-root element, and only its descendants
//! are populated from the walk.

use tracing::{instrument, trace};

use crate::domain::node::{NodeId, TreeNode};

/// Render-ready descriptor for one visible node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewNode<'a> {
    pub node: &'a TreeNode,
    pub parent: &'a TreeNode,
    pub is_active: bool,
    /// Nesting level; children of the root are at depth 0
    pub depth: usize,
}

/// Per-node actions a view can offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Affordances {
    pub can_collapse: bool,
    pub is_collapsed: bool,
    pub can_load_more: bool,
}

impl<'a> ViewNode<'a> {
    pub fn id(&self) -> &'a NodeId {
        &self.node.id
    }

    pub fn affordances(&self) -> Affordances {
        Affordances {
            can_collapse: self.node.has_live_children(),
            is_collapsed: self.node.is_collapsed,
            can_load_more: self.node.has_more,
        }
    }
}

/// Lazy pre-order iterator over the visible descendants of a root.
pub struct Walk<'a> {
    selected: Option<NodeId>,
    stack: Vec<(&'a TreeNode, &'a TreeNode, usize)>,
}

impl<'a> Walk<'a> {
    fn new(root: &'a TreeNode, selected: Option<&NodeId>) -> Self {
        let mut walk = Self {
            selected: selected.cloned(),
            stack: Vec::new(),
        };
        walk.push_children(root, 0);
        walk
    }

    fn push_children(&mut self, parent: &'a TreeNode, depth: usize) {
        // reversed so the first child is popped first
        for child in parent.live_children().rev() {
            self.stack.push((child, parent, depth));
        }
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = ViewNode<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (node, parent, depth) = self.stack.pop()?;
        if !node.is_collapsed {
            self.push_children(node, depth + 1);
        }
        let is_active = self.selected.as_ref() == Some(&node.id);
        trace!(id = %node.id, depth, is_active, "walk");
        Some(ViewNode {
            node,
            parent,
            is_active,
            depth,
        })
    }
}

/// Walks `root` and yields its visible descendants in pre-order.
///
/// Collapsed nodes are yielded but their children are not. Deleted nodes are
/// skipped together with their subtrees. For the same `(root, selected)` pair the
/// sequence is always identical.
pub fn walk<'a>(root: &'a TreeNode, selected: Option<&NodeId>) -> Walk<'a> {
    Walk::new(root, selected)
}

/// Eager variant of [`walk`].
#[instrument(level = "debug", skip(root), fields(root = %root.id))]
pub fn walk_collect<'a>(root: &'a TreeNode, selected: Option<&NodeId>) -> Vec<ViewNode<'a>> {
    walk(root, selected).collect()
}
