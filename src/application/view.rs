//! Rendering gate between the tree source and the walker

use tracing::trace;

use crate::domain::{walk_collect, NodeId, TreeNode, ViewNode};
use crate::infrastructure::traits::TreeSnapshot;

/// What a host should draw for a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderState<'a> {
    /// Data is still being fetched
    Loading,
    /// The source failed to load; carries its reason if it gave one
    Unavailable(Option<String>),
    /// Loaded, but the root has no live children
    Empty,
    Ready {
        root: &'a TreeNode,
        nodes: Vec<ViewNode<'a>>,
    },
}

impl RenderState<'_> {
    pub fn is_ready(&self) -> bool {
        matches!(self, RenderState::Ready { .. })
    }

    /// View nodes to draw, empty unless ready.
    pub fn nodes(&self) -> &[ViewNode<'_>] {
        match self {
            RenderState::Ready { nodes, .. } => nodes,
            _ => &[],
        }
    }
}

/// Walks the snapshot's tree only when it loaded successfully and has children.
pub fn render_state<'a>(snapshot: &'a TreeSnapshot, selected: Option<&NodeId>) -> RenderState<'a> {
    if snapshot.is_pending {
        return RenderState::Loading;
    }
    let root = match (&snapshot.data, snapshot.is_success) {
        (Some(root), true) => root,
        _ => return RenderState::Unavailable(snapshot.error.clone()),
    };
    if !root.has_live_children() {
        trace!(root = %root.id, "tree has no live children");
        return RenderState::Empty;
    }
    RenderState::Ready {
        root,
        nodes: walk_collect(root, selected),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_pending_snapshot_when_rendering_then_loading() {
        assert_eq!(render_state(&TreeSnapshot::pending(), None), RenderState::Loading);
    }

    #[test]
    fn given_failed_snapshot_when_rendering_then_unavailable_with_reason() {
        let snapshot = TreeSnapshot::failed("timeout");
        assert_eq!(
            render_state(&snapshot, None),
            RenderState::Unavailable(Some("timeout".into()))
        );
    }

    #[test]
    fn given_data_without_success_when_rendering_then_unavailable() {
        let snapshot = TreeSnapshot {
            data: Some(TreeNode::new("root", "Root")),
            ..TreeSnapshot::default()
        };
        assert_eq!(render_state(&snapshot, None), RenderState::Unavailable(None));
    }

    #[test]
    fn given_childless_root_when_rendering_then_empty() {
        let snapshot = TreeSnapshot::ready(TreeNode::new("root", "Root"));
        let state = render_state(&snapshot, None);
        assert_eq!(state, RenderState::Empty);
        assert!(state.nodes().is_empty());
    }

    #[test]
    fn given_only_deleted_children_when_rendering_then_empty() {
        let snapshot = TreeSnapshot::ready(
            TreeNode::new("root", "Root").with_children(vec![TreeNode::new("a", "A").deleted()]),
        );
        assert_eq!(render_state(&snapshot, None), RenderState::Empty);
    }

    #[test]
    fn given_loaded_tree_when_rendering_then_walks_children() {
        let snapshot = TreeSnapshot::ready(
            TreeNode::new("root", "Root")
                .with_children(vec![TreeNode::new("a", "A"), TreeNode::new("b", "B")]),
        );
        let selected = NodeId::from("b");
        let state = render_state(&snapshot, Some(&selected));

        assert!(state.is_ready());
        let active: Vec<_> = state
            .nodes()
            .iter()
            .filter(|v| v.is_active)
            .map(|v| v.id().as_str())
            .collect();
        assert_eq!(active, vec!["b"]);
    }
}
