//! Boundary traits for the external collaborators of the engine
//!
//! The engine only talks to the outside world through these traits, so hosts
//! (and tests) decide how data is fetched, persisted, named and scrolled.
//! Everything runs on one logical thread: collaborators are shared through
//! `Rc` and their futures are not required to be `Send`.

use std::rc::Rc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::application::selection::ScrollOptions;
use crate::domain::{NodeId, ReparentRequest, TreeNode};
use crate::infrastructure::error::StoreError;

/// Loading/success/data triple supplied by the tree data source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeSnapshot {
    pub data: Option<TreeNode>,
    pub is_pending: bool,
    pub is_success: bool,
    /// Reason reported by the source when loading failed
    pub error: Option<String>,
}

impl TreeSnapshot {
    pub fn ready(root: TreeNode) -> Self {
        Self {
            data: Some(root),
            is_pending: false,
            is_success: true,
            error: None,
        }
    }

    pub fn pending() -> Self {
        Self {
            is_pending: true,
            ..Self::default()
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }
}

/// Supplies the latest confirmed tree.
pub trait TreeSource {
    fn snapshot(&self) -> TreeSnapshot;
}

/// Payload of the create-node mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNodeRequest {
    pub node: TreeNode,
    pub parent_id: NodeId,
    /// Insertion position hint; stores append when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

/// Mutation interface of the external store.
///
/// Each call resolves once the store has confirmed (or refused) the change.
#[async_trait(?Send)]
pub trait TreeStore {
    async fn create_node(&self, request: CreateNodeRequest) -> Result<(), StoreError>;

    /// Fetch additional children for a truncated node.
    async fn load_more(&self, node: &TreeNode) -> Result<(), StoreError>;

    /// Flip `is_collapsed` on the node.
    async fn toggle_collapse(&self, node: &TreeNode) -> Result<(), StoreError>;

    async fn reparent(&self, request: &ReparentRequest) -> Result<(), StoreError>;
}

/// Issues globally unique ids for new nodes.
pub trait IdGenerator {
    fn generate_id(&self) -> NodeId;
}

/// Issues human-readable display names for new nodes.
pub trait NameGenerator {
    fn generate_name(&self) -> String;
}

/// Event published when the selection changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SelectionEvent {
    #[serde(rename = "node/select")]
    NodeSelect { node: TreeNode, parent: TreeNode },
}

/// The single channel through which selection changes leave the engine.
pub trait SelectionSink {
    fn dispatch(&self, event: SelectionEvent);
}

/// A mounted element that can be brought into view.
pub trait ScrollAnchor {
    fn scroll_into_view(&self, options: ScrollOptions);
}

/// Finds the mounted element for a node, if there is one.
pub trait AnchorLookup {
    fn anchor(&self, id: &NodeId) -> Option<Rc<dyn ScrollAnchor>>;
}
