//! Tests for reading and writing tree files through the in-memory store

use std::fs;

use futures::executor::block_on;
use rstest::rstest;
use tempfile::TempDir;

use skilltree::application::{render_state, ApplicationError, RenderState};
use skilltree::domain::{DomainError, TreeNode};
use skilltree::infrastructure::memory_store::InMemoryTreeStore;
use skilltree::infrastructure::traits::{TreeSource, TreeStore};
use skilltree::infrastructure::InfraError;
use skilltree::util::testing::{init_test_setup, sample_tree};

#[test]
fn given_tree_file_with_duplicate_ids_when_loading_then_rejects_it() {
    init_test_setup();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dup.json");
    fs::write(
        &path,
        r#"{"id":"root","name":"Root","children":[{"id":"x","name":"X"},{"id":"x","name":"Y"}]}"#,
    )
    .unwrap();

    let result = InMemoryTreeStore::load(&path, 10);

    assert!(matches!(
        result,
        Err(InfraError::Application(ApplicationError::Domain(DomainError::DuplicateId(_))))
    ));
}

#[rstest]
#[case::clashes_with_tree(r#"{"b":[{"id":"a1","name":"Again"}]}"#, "a1")]
#[case::clashes_across_pages(r#"{"a":[{"id":"c1","name":"C1"}],"b":[{"id":"c1","name":"C1"}]}"#, "c1")]
#[case::clashes_within_page(r#"{"b":[{"id":"c1","name":"C1"},{"id":"c1","name":"C2"}]}"#, "c1")]
fn given_backlog_with_duplicate_ids_when_loading_then_rejects_it(
    #[case] backlog: &str,
    #[case] duplicate: &str,
) {
    init_test_setup();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("backlog.json");
    let root = serde_json::to_string(&sample_tree()).unwrap();
    fs::write(&path, format!(r#"{{"root":{root},"backlog":{backlog}}}"#)).unwrap();

    let result = InMemoryTreeStore::load(&path, 10);

    match result {
        Err(InfraError::Application(ApplicationError::Domain(DomainError::DuplicateId(id)))) => {
            assert_eq!(id.as_str(), duplicate)
        }
        other => panic!("expected duplicate id error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn given_malformed_json_when_loading_then_reports_serialization_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();

    let result = InMemoryTreeStore::load(&path, 10);

    assert!(matches!(result, Err(InfraError::Serialization { .. })));
}

#[test]
fn given_missing_file_when_loading_then_reports_io_error() {
    let dir = TempDir::new().unwrap();
    let result = InMemoryTreeStore::load(&dir.path().join("nope.json"), 10);
    assert!(matches!(result, Err(InfraError::Io { .. })));
}

#[test]
fn given_mutations_when_saved_and_reloaded_then_file_reflects_them() {
    init_test_setup();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tree.json");
    let store = InMemoryTreeStore::new(sample_tree());
    let a = sample_tree().children[0].clone();

    block_on(store.toggle_collapse(&a)).unwrap();
    store.save(&path).unwrap();

    let reloaded = InMemoryTreeStore::load(&path, 10).unwrap();
    let snapshot = reloaded.snapshot();
    let RenderState::Ready { nodes, .. } = render_state(&snapshot, None) else {
        panic!("expected a renderable tree");
    };
    let ids: Vec<_> = nodes.iter().map(|v| v.id().as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    let json = fs::read_to_string(&path).unwrap();
    assert!(json.contains("\"isCollapsed\": true"));
}

#[test]
fn given_root_without_children_when_rendering_loaded_tree_then_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.json");
    let root = TreeNode::new("root", "Skills");
    fs::write(&path, serde_json::to_string(&root).unwrap()).unwrap();

    let store = InMemoryTreeStore::load(&path, 10).unwrap();
    let snapshot = store.snapshot();

    assert_eq!(render_state(&snapshot, None), RenderState::Empty);
}
