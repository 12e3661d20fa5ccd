//! Mutation dispatcher: user intents → store mutations and selection events
//!
//! The dispatcher never edits the tree. Creations, collapse toggles, load-more
//! and moves are sent to the store and take effect only when the store confirms
//! them; the next walk over the confirmed tree shows the result.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use crate::application::selection::{
    ScrollOutcome, Selection, SelectionController, SelectionPhase, SelectionTicket,
};
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{
    resolve, AncestryIndex, DomainError, DropPosition, InvalidReorder, NodeId, ReparentRequest,
    TreeNode, ViewNode,
};
use crate::infrastructure::traits::{
    AnchorLookup, CreateNodeRequest, IdGenerator, NameGenerator, SelectionEvent, SelectionSink,
    TreeStore,
};

/// Result of a drag-and-drop move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The store accepted the reparent request
    Moved(ReparentRequest),
    /// The drop was refused locally; nothing was sent
    Rejected(InvalidReorder),
}

pub struct MutationDispatcher {
    store: Rc<dyn TreeStore>,
    ids: Rc<dyn IdGenerator>,
    names: Rc<dyn NameGenerator>,
    sink: Rc<dyn SelectionSink>,
    selection: RefCell<SelectionController>,
    pending: RefCell<Vec<NodeId>>,
    last_creation: Cell<u64>,
    /// Sequence of the newest creation that took selection
    last_selected_creation: Cell<u64>,
}

impl MutationDispatcher {
    pub fn new(
        store: Rc<dyn TreeStore>,
        ids: Rc<dyn IdGenerator>,
        names: Rc<dyn NameGenerator>,
        sink: Rc<dyn SelectionSink>,
    ) -> Self {
        Self::with_selection(store, ids, names, sink, SelectionController::default())
    }

    pub fn with_selection(
        store: Rc<dyn TreeStore>,
        ids: Rc<dyn IdGenerator>,
        names: Rc<dyn NameGenerator>,
        sink: Rc<dyn SelectionSink>,
        selection: SelectionController,
    ) -> Self {
        Self {
            store,
            ids,
            names,
            sink,
            selection: RefCell::new(selection),
            pending: RefCell::new(Vec::new()),
            last_creation: Cell::new(0),
            last_selected_creation: Cell::new(0),
        }
    }

    // ---------------------------------------------------------------
    // Selection
    // ---------------------------------------------------------------

    /// Makes `node` the selected node and publishes a `node/select` event.
    pub fn select_node(&self, node: &TreeNode, parent: &TreeNode) -> SelectionTicket {
        info!(node = %node.id, parent = %parent.id, "select node");
        let ticket = self
            .selection
            .borrow_mut()
            .select(node.clone(), parent.clone());
        self.sink.dispatch(SelectionEvent::NodeSelect {
            node: node.clone(),
            parent: parent.clone(),
        });
        ticket
    }

    pub fn selected_id(&self) -> Option<NodeId> {
        self.selection.borrow().selected_id().cloned()
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection.borrow().selection().cloned()
    }

    pub fn selection_phase(&self) -> SelectionPhase {
        self.selection.borrow().phase()
    }

    /// Feeds the latest walk output to the selection controller.
    pub fn confirm_rendered(&self, view: &[ViewNode<'_>], now: Instant) -> bool {
        self.selection.borrow_mut().confirm_rendered(view, now)
    }

    /// Runs the deferred scroll if it is due.
    pub fn poll_scroll(&self, now: Instant, anchors: &dyn AnchorLookup) -> ScrollOutcome {
        self.selection.borrow_mut().poll(now, anchors)
    }

    pub fn next_scroll_deadline(&self) -> Option<Instant> {
        self.selection.borrow().next_deadline()
    }

    // ---------------------------------------------------------------
    // Creation
    // ---------------------------------------------------------------

    /// Ids of nodes whose creation has been requested but not confirmed.
    pub fn pending_creations(&self) -> Vec<NodeId> {
        self.pending.borrow().clone()
    }

    pub fn is_pending(&self, id: &NodeId) -> bool {
        self.pending.borrow().contains(id)
    }

    fn new_node(&self) -> TreeNode {
        TreeNode::new(self.ids.generate_id(), self.names.generate_name())
    }

    /// Creates a new last child of `parent` and selects it once confirmed.
    pub async fn add_child(&self, parent: &TreeNode) -> ApplicationResult<TreeNode> {
        self.create(parent, None).await
    }

    /// Creates a new node right after `anchor` under `anchor_parent` and
    /// selects it once confirmed.
    pub async fn add_sibling(
        &self,
        anchor: &TreeNode,
        anchor_parent: &TreeNode,
    ) -> ApplicationResult<TreeNode> {
        let position = anchor_parent
            .children
            .iter()
            .position(|c| c.id == anchor.id)
            .ok_or_else(|| DomainError::NodeNotFound(anchor.id.clone()))?;
        self.create(anchor_parent, Some(position + 1)).await
    }

    #[instrument(level = "debug", skip_all, fields(parent = %parent.id, ?index))]
    async fn create(&self, parent: &TreeNode, index: Option<usize>) -> ApplicationResult<TreeNode> {
        let node = self.new_node();
        let sequence = self.last_creation.get() + 1;
        self.last_creation.set(sequence);
        self.pending.borrow_mut().push(node.id.clone());
        debug!(node = %node.id, name = %node.name, sequence, "create requested");

        let result = self
            .store
            .create_node(CreateNodeRequest {
                node: node.clone(),
                parent_id: parent.id.clone(),
                index,
            })
            .await;
        self.pending.borrow_mut().retain(|id| id != &node.id);

        if let Err(e) = result {
            warn!(node = %node.id, error = %e, "create failed, selection unchanged");
            return Err(ApplicationError::mutation("create_node", e));
        }

        if sequence > self.last_selected_creation.get() {
            self.last_selected_creation.set(sequence);
            self.select_node(&node, parent);
        } else {
            debug!(node = %node.id, sequence, "newer creation already selected, not selecting");
        }
        Ok(node)
    }

    // ---------------------------------------------------------------
    // Visibility
    // ---------------------------------------------------------------

    /// Asks the store for more children of `node`. Selection is untouched.
    #[instrument(level = "debug", skip_all, fields(node = %node.id))]
    pub async fn load_more(&self, node: &TreeNode) -> ApplicationResult<()> {
        self.store
            .load_more(node)
            .await
            .map_err(|e| ApplicationError::mutation("load_more", e))
    }

    /// Asks the store to flip `is_collapsed` on `node`. Selection is untouched.
    #[instrument(level = "debug", skip_all, fields(node = %node.id))]
    pub async fn toggle_collapse(&self, node: &TreeNode) -> ApplicationResult<()> {
        self.store
            .toggle_collapse(node)
            .await
            .map_err(|e| ApplicationError::mutation("toggle_collapse", e))
    }

    // ---------------------------------------------------------------
    // Reorder
    // ---------------------------------------------------------------

    /// Resolves a drop of `source` onto `target` against `tree` and sends the
    /// resulting reparent request. Invalid drops are reported as
    /// [`MoveOutcome::Rejected`] without contacting the store.
    #[instrument(level = "debug", skip(self, tree))]
    pub async fn move_node(
        &self,
        tree: &TreeNode,
        source: &NodeId,
        target: &NodeId,
        position: DropPosition,
    ) -> ApplicationResult<MoveOutcome> {
        let index = AncestryIndex::build(tree)?;
        let request = match resolve(&index, source, target, position) {
            Ok(request) => request,
            Err(reason) => {
                info!(%reason, "drop rejected");
                return Ok(MoveOutcome::Rejected(reason));
            }
        };
        self.store
            .reparent(&request)
            .await
            .map_err(|e| ApplicationError::mutation("reparent", e))?;
        Ok(MoveOutcome::Moved(request))
    }
}
