//! In-memory tree store backed by an optional JSON tree file.
//!
//! Serves as the data source and mutation interface for the CLI and for tests.
//! Children that have not been loaded yet live in a per-node backlog and are
//! handed out a page at a time by `load_more`.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::io::Write;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, instrument, warn};

use crate::domain::{DomainError, DomainResult, NodeId, ReparentRequest, TreeNode};
use crate::infrastructure::error::{InfraError, InfraResult, StoreError};
use crate::infrastructure::traits::{CreateNodeRequest, TreeSnapshot, TreeSource, TreeStore};

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// On-disk layout: the tree plus the children not loaded yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeFile {
    Document {
        root: TreeNode,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        backlog: BTreeMap<NodeId, Vec<TreeNode>>,
    },
    Bare(TreeNode),
}

/// Store call as observed by the store, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    CreateNode(CreateNodeRequest),
    LoadMore(NodeId),
    ToggleCollapse(NodeId),
    Reparent(ReparentRequest),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadStatus {
    Pending,
    Loaded,
}

#[derive(Debug)]
pub struct InMemoryTreeStore {
    tree: RefCell<Option<TreeNode>>,
    backlog: RefCell<BTreeMap<NodeId, VecDeque<TreeNode>>>,
    status: Cell<LoadStatus>,
    load_error: RefCell<Option<String>>,
    page_size: usize,
    failures: RefCell<VecDeque<String>>,
    calls: RefCell<Vec<StoreCall>>,
}

impl InMemoryTreeStore {
    pub fn new(root: TreeNode) -> Self {
        Self::with_page_size(root, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(root: TreeNode, page_size: usize) -> Self {
        Self {
            tree: RefCell::new(Some(root)),
            backlog: RefCell::new(BTreeMap::new()),
            status: Cell::new(LoadStatus::Loaded),
            load_error: RefCell::new(None),
            page_size: page_size.max(1),
            failures: RefCell::new(VecDeque::new()),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// A store whose tree has not arrived yet.
    pub fn pending() -> Self {
        let store = Self::with_page_size(TreeNode::new("", ""), DEFAULT_PAGE_SIZE);
        store.tree.replace(None);
        store.status.set(LoadStatus::Pending);
        store
    }

    /// A store whose initial load failed.
    pub fn failed(message: impl Into<String>) -> Self {
        let store = Self::pending();
        store.status.set(LoadStatus::Loaded);
        store.load_error.replace(Some(message.into()));
        store
    }

    /// Reads a tree file (bare tree or document with backlog).
    #[instrument(level = "debug")]
    pub fn load(path: &Path, page_size: usize) -> InfraResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| InfraError::io(format!("read {}", path.display()), e))?;
        let file: TreeFile = serde_json::from_str(&content)
            .map_err(|e| InfraError::serialization(path.display().to_string(), e))?;
        let (root, backlog) = match file {
            TreeFile::Document { root, backlog } => (root, backlog),
            TreeFile::Bare(root) => (root, BTreeMap::new()),
        };
        root.validate()
            .map_err(|e| InfraError::Application(e.into()))?;

        let store = Self::with_page_size(root, page_size);
        for (id, children) in backlog {
            store
                .push_backlog(&id, children)
                .map_err(|e| InfraError::Application(e.into()))?;
        }
        debug!(path = %path.display(), "tree loaded");
        Ok(store)
    }

    /// Writes tree and backlog atomically (temp file + rename).
    #[instrument(level = "debug", skip(self))]
    pub fn save(&self, path: &Path) -> InfraResult<()> {
        let root = self
            .tree()
            .ok_or_else(|| InfraError::io("save tree", std::io::Error::other("tree not loaded")))?;
        let backlog = self
            .backlog
            .borrow()
            .iter()
            .filter(|(_, pending)| !pending.is_empty())
            .map(|(id, pending)| (id.clone(), pending.iter().cloned().collect()))
            .collect();
        let file = TreeFile::Document { root, backlog };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| InfraError::serialization(path.display().to_string(), e))?;

        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)
            .map_err(|e| InfraError::io(format!("create temp file in {}", dir.display()), e))?;
        tmp.write_all(json.as_bytes())
            .map_err(|e| InfraError::io("write temp file", e))?;
        tmp.persist(path)
            .map_err(|e| InfraError::io(format!("persist {}", path.display()), e.error))?;
        Ok(())
    }

    /// Queues children that `load_more` will hand out later and marks the node
    /// as having more.
    ///
    /// Every id in `children` (subtrees included) must be new to both the tree
    /// and the backlog.
    pub fn push_backlog(&self, id: &NodeId, children: Vec<TreeNode>) -> DomainResult<()> {
        if children.is_empty() {
            return Ok(());
        }
        let mut seen = HashSet::new();
        for node in children.iter().flat_map(subtree_ids) {
            if !seen.insert(node) || self.id_in_use(node) {
                return Err(DomainError::DuplicateId(node.clone()));
            }
        }
        if let Some(node) = self.tree.borrow_mut().as_mut().and_then(|t| t.find_mut(id)) {
            node.has_more = true;
        }
        self.backlog
            .borrow_mut()
            .entry(id.clone())
            .or_default()
            .extend(children);
        Ok(())
    }

    /// True when `id` is taken by a node in the tree or one waiting in the backlog.
    fn id_in_use(&self, id: &NodeId) -> bool {
        let in_tree = self
            .tree
            .borrow()
            .as_ref()
            .is_some_and(|t| t.find(id).is_some());
        in_tree
            || self
                .backlog
                .borrow()
                .values()
                .flatten()
                .any(|n| n.find(id).is_some())
    }

    /// Makes the next mutation call fail with `message`.
    pub fn fail_next(&self, message: impl Into<String>) {
        self.failures.borrow_mut().push_back(message.into());
    }

    pub fn tree(&self) -> Option<TreeNode> {
        self.tree.borrow().clone()
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.borrow().clone()
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    fn record(&self, call: StoreCall, operation: &'static str) -> Result<(), StoreError> {
        self.calls.borrow_mut().push(call);
        match self.failures.borrow_mut().pop_front() {
            Some(message) => {
                warn!(operation, %message, "injected store failure");
                Err(StoreError::rejected(operation, message))
            }
            None => Ok(()),
        }
    }

    fn with_tree<T>(
        &self,
        f: impl FnOnce(&mut TreeNode) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut tree = self.tree.borrow_mut();
        let root = tree.as_mut().ok_or(StoreError::NotLoaded)?;
        f(root)
    }
}

/// Ids of `node` and all of its descendants.
fn subtree_ids(node: &TreeNode) -> Vec<&NodeId> {
    let mut ids = Vec::new();
    let mut stack = vec![node];
    while let Some(n) = stack.pop() {
        ids.push(&n.id);
        stack.extend(n.children.iter());
    }
    ids
}

impl TreeSource for InMemoryTreeStore {
    fn snapshot(&self) -> TreeSnapshot {
        if let Some(message) = self.load_error.borrow().as_ref() {
            return TreeSnapshot::failed(message.clone());
        }
        match (self.status.get(), self.tree()) {
            (LoadStatus::Loaded, Some(root)) => TreeSnapshot::ready(root),
            _ => TreeSnapshot::pending(),
        }
    }
}

#[async_trait(?Send)]
impl TreeStore for InMemoryTreeStore {
    #[instrument(level = "debug", skip_all, fields(node = %request.node.id, parent = %request.parent_id))]
    async fn create_node(&self, request: CreateNodeRequest) -> Result<(), StoreError> {
        self.record(StoreCall::CreateNode(request.clone()), "create_node")?;
        let taken = self.id_in_use(&request.node.id);
        self.with_tree(|root| {
            if taken {
                return Err(StoreError::rejected(
                    "create_node",
                    format!("id already exists: {}", request.node.id),
                ));
            }
            let parent = root
                .find_mut(&request.parent_id)
                .ok_or_else(|| StoreError::NodeNotFound(request.parent_id.clone()))?;
            let index = request
                .index
                .map_or(parent.children.len(), |i| i.min(parent.children.len()));
            parent.children.insert(index, request.node);
            Ok(())
        })
    }

    #[instrument(level = "debug", skip_all, fields(node = %node.id))]
    async fn load_more(&self, node: &TreeNode) -> Result<(), StoreError> {
        self.record(StoreCall::LoadMore(node.id.clone()), "load_more")?;
        self.with_tree(|root| match root.find(&node.id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NodeNotFound(node.id.clone())),
        })?;
        let mut backlog = self.backlog.borrow_mut();
        let page: Vec<TreeNode> = match backlog.get_mut(&node.id) {
            Some(pending) => {
                let take = self.page_size.min(pending.len());
                pending.drain(..take).collect()
            }
            None => Vec::new(),
        };
        let exhausted = backlog.get(&node.id).map_or(true, VecDeque::is_empty);
        if exhausted {
            backlog.remove(&node.id);
        }
        drop(backlog);

        self.with_tree(|root| {
            let target = root
                .find_mut(&node.id)
                .ok_or_else(|| StoreError::NodeNotFound(node.id.clone()))?;
            debug!(loaded = page.len(), exhausted, "page loaded");
            target.children.extend(page);
            target.has_more = !exhausted;
            Ok(())
        })
    }

    #[instrument(level = "debug", skip_all, fields(node = %node.id))]
    async fn toggle_collapse(&self, node: &TreeNode) -> Result<(), StoreError> {
        self.record(StoreCall::ToggleCollapse(node.id.clone()), "toggle_collapse")?;
        self.with_tree(|root| {
            let target = root
                .find_mut(&node.id)
                .ok_or_else(|| StoreError::NodeNotFound(node.id.clone()))?;
            target.is_collapsed = !target.is_collapsed;
            Ok(())
        })
    }

    #[instrument(level = "debug", skip_all, fields(node = %request.moved_node_id))]
    async fn reparent(&self, request: &ReparentRequest) -> Result<(), StoreError> {
        self.record(StoreCall::Reparent(request.clone()), "reparent")?;
        self.with_tree(|root| {
            let moved_id = &request.moved_node_id;
            {
                let moved = root
                    .find(moved_id)
                    .ok_or_else(|| StoreError::NodeNotFound(moved_id.clone()))?;
                if moved.find(&request.new_parent_id).is_some() {
                    return Err(StoreError::rejected(
                        "reparent",
                        format!("{} would become its own ancestor", moved_id),
                    ));
                }
            }
            if root.find(&request.new_parent_id).is_none() {
                return Err(StoreError::NodeNotFound(request.new_parent_id.clone()));
            }

            let old_parent = root
                .find_parent_mut(moved_id)
                .ok_or_else(|| StoreError::NodeNotFound(moved_id.clone()))?;
            if old_parent.id != request.old_parent_id {
                return Err(StoreError::rejected(
                    "reparent",
                    format!(
                        "stale move: {} is under {}, not {}",
                        moved_id, old_parent.id, request.old_parent_id
                    ),
                ));
            }
            let position = old_parent
                .children
                .iter()
                .position(|c| &c.id == moved_id)
                .ok_or_else(|| StoreError::NodeNotFound(moved_id.clone()))?;
            let moved = old_parent.children.remove(position);

            let new_parent = root
                .find_mut(&request.new_parent_id)
                .ok_or_else(|| StoreError::NodeNotFound(request.new_parent_id.clone()))?;
            let index = request.new_index.min(new_parent.children.len());
            new_parent.children.insert(index, moved);
            Ok(())
        })
    }
}
