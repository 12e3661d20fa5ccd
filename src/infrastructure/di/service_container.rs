//! Service container for dependency injection
//!
//! Wires settings and boundary collaborators into a mutation dispatcher.

use std::rc::Rc;

use crate::application::{MutationDispatcher, SelectionController};
use crate::config::Settings;
use crate::infrastructure::generators::{UuidIdGenerator, WordPairNameGenerator};
use crate::infrastructure::headless::AnchorRegistry;
use crate::infrastructure::memory_store::InMemoryTreeStore;
use crate::infrastructure::traits::{IdGenerator, NameGenerator, SelectionSink};

/// Container holding the collaborators of one engine instance.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Rc<Settings>,

    /// Tree source and mutation store
    pub store: Rc<InMemoryTreeStore>,

    pub ids: Rc<dyn IdGenerator>,
    pub names: Rc<dyn NameGenerator>,

    /// Receives `node/select` events
    pub sink: Rc<dyn SelectionSink>,

    /// Mounted scroll anchors
    pub anchors: Rc<AnchorRegistry>,
}

impl ServiceContainer {
    /// Create a container with the default generators.
    pub fn new(settings: Settings, store: InMemoryTreeStore, sink: Rc<dyn SelectionSink>) -> Self {
        let names =
            WordPairNameGenerator::new(settings.names.separator.clone(), settings.names.style);
        Self::with_deps(
            settings,
            Rc::new(store),
            Rc::new(UuidIdGenerator),
            Rc::new(names),
            sink,
        )
    }

    /// Create a container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        store: Rc<InMemoryTreeStore>,
        ids: Rc<dyn IdGenerator>,
        names: Rc<dyn NameGenerator>,
        sink: Rc<dyn SelectionSink>,
    ) -> Self {
        Self {
            settings: Rc::new(settings),
            store,
            ids,
            names,
            sink,
            anchors: Rc::new(AnchorRegistry::default()),
        }
    }

    /// Dispatcher over this container's collaborators, using the configured scroll settings.
    pub fn dispatcher(&self) -> MutationDispatcher {
        let selection =
            SelectionController::new(self.settings.scroll_delay(), self.settings.scroll_options());
        MutationDispatcher::with_selection(
            self.store.clone(),
            self.ids.clone(),
            self.names.clone(),
            self.sink.clone(),
            selection,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{walk_collect, TreeNode};
    use crate::infrastructure::generators::{FixedNameGenerator, SequentialIdGenerator};
    use crate::infrastructure::headless::RecordingSink;
    use futures::executor::block_on;
    use std::time::{Duration, Instant};

    #[test]
    fn given_container_when_building_dispatcher_then_uses_configured_delay_and_store() {
        let mut settings = Settings::default();
        settings.scroll.delay_ms = 40;
        let root = TreeNode::new("root", "Root").with_children(vec![TreeNode::new("a", "A")]);
        let container = ServiceContainer::with_deps(
            settings,
            Rc::new(InMemoryTreeStore::new(root.clone())),
            Rc::new(SequentialIdGenerator::new("n")),
            Rc::new(FixedNameGenerator("Blue Fox".into())),
            Rc::new(RecordingSink::default()),
        );
        let dispatcher = container.dispatcher();

        block_on(dispatcher.add_child(&root)).unwrap();

        let tree = container.store.tree().unwrap();
        assert_eq!(tree.children.len(), 2);
        let selected = dispatcher.selected_id();
        let view = walk_collect(&tree, selected.as_ref());
        let now = Instant::now();
        assert!(dispatcher.confirm_rendered(&view, now));
        assert_eq!(
            dispatcher.next_scroll_deadline(),
            Some(now + Duration::from_millis(40))
        );
    }
}
