//! Collaborators for hosts without a UI: recording selection sink and anchors.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use crate::application::selection::ScrollOptions;
use crate::domain::NodeId;
use crate::infrastructure::traits::{AnchorLookup, ScrollAnchor, SelectionEvent, SelectionSink};

/// Keeps every dispatched selection event in order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: RefCell<Vec<SelectionEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<SelectionEvent> {
        self.events.borrow().clone()
    }

    pub fn last(&self) -> Option<SelectionEvent> {
        self.events.borrow().last().cloned()
    }
}

impl SelectionSink for RecordingSink {
    fn dispatch(&self, event: SelectionEvent) {
        let SelectionEvent::NodeSelect { node, parent } = &event;
        debug!(node = %node.id, parent = %parent.id, "node/select");
        self.events.borrow_mut().push(event);
    }
}

/// Anchor that only counts scroll requests.
#[derive(Debug, Default)]
pub struct RecordingAnchor {
    calls: RefCell<Vec<ScrollOptions>>,
}

impl RecordingAnchor {
    pub fn calls(&self) -> Vec<ScrollOptions> {
        self.calls.borrow().clone()
    }
}

impl ScrollAnchor for RecordingAnchor {
    fn scroll_into_view(&self, options: ScrollOptions) {
        self.calls.borrow_mut().push(options);
    }
}

/// Id → mounted anchor map, updated by the host as view nodes mount and unmount.
#[derive(Default)]
pub struct AnchorRegistry {
    anchors: RefCell<HashMap<NodeId, Rc<dyn ScrollAnchor>>>,
}

impl AnchorRegistry {
    pub fn mount(&self, id: NodeId, anchor: Rc<dyn ScrollAnchor>) {
        self.anchors.borrow_mut().insert(id, anchor);
    }

    pub fn unmount(&self, id: &NodeId) {
        self.anchors.borrow_mut().remove(id);
    }

    pub fn len(&self) -> usize {
        self.anchors.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.borrow().is_empty()
    }
}

impl AnchorLookup for AnchorRegistry {
    fn anchor(&self, id: &NodeId) -> Option<Rc<dyn ScrollAnchor>> {
        self.anchors.borrow().get(id).cloned()
    }
}
