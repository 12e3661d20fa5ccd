//! Tests for drag-reorder resolution applied by the in-memory store

use futures::executor::block_on;
use rstest::rstest;

use skilltree::domain::{resolve, AncestryIndex, DropPosition, InvalidReorder, NodeId, TreeNode};
use skilltree::infrastructure::memory_store::InMemoryTreeStore;
use skilltree::infrastructure::traits::TreeStore;
use skilltree::util::testing::init_test_setup;

/// Root -> [A -> [A1, A2], B -> [B1], C]
fn tree() -> TreeNode {
    TreeNode::new("root", "Root").with_children(vec![
        TreeNode::new("a", "A").with_children(vec![
            TreeNode::new("a1", "A1"),
            TreeNode::new("a2", "A2"),
        ]),
        TreeNode::new("b", "B").with_children(vec![TreeNode::new("b1", "B1")]),
        TreeNode::new("c", "C"),
    ])
}

fn all_ids(node: &TreeNode) -> Vec<String> {
    let mut ids = Vec::new();
    let mut stack = vec![node];
    while let Some(n) = stack.pop() {
        ids.push(n.id.to_string());
        stack.extend(n.children.iter());
    }
    ids.sort();
    ids
}

#[test]
fn given_every_drop_when_resolved_and_applied_then_tree_stays_valid_and_move_lands_at_index() {
    init_test_setup();
    let original = tree();
    let index = AncestryIndex::build(&original).unwrap();
    let ids = all_ids(&original);
    let positions = [DropPosition::Before, DropPosition::After, DropPosition::Into];

    let mut applied = 0;
    for source in &ids {
        for target in &ids {
            for position in positions {
                let source = NodeId::from(source.as_str());
                let target = NodeId::from(target.as_str());
                let Ok(request) = resolve(&index, &source, &target, position) else {
                    continue;
                };

                let store = InMemoryTreeStore::new(original.clone());
                block_on(store.reparent(&request)).unwrap();
                let moved = store.tree().unwrap();

                assert!(moved.validate().is_ok());
                assert_eq!(all_ids(&moved), ids, "nodes lost moving {source} {position} {target}");
                let parent = moved.find(&request.new_parent_id).unwrap();
                assert_eq!(
                    parent.children[request.new_index].id, source,
                    "{source} {position} {target}"
                );
                applied += 1;
            }
        }
    }
    assert!(applied > 0);
}

#[rstest]
#[case("a", "a", DropPosition::Into, InvalidReorder::OntoSelf("a".into()))]
#[case("a", "a2", DropPosition::Before, InvalidReorder::IntoDescendant { source_id: "a".into(), target_id: "a2".into() })]
#[case("root", "c", DropPosition::Into, InvalidReorder::MoveRoot)]
#[case("c", "root", DropPosition::After, InvalidReorder::SiblingOfRoot)]
#[case("c", "zz", DropPosition::Into, InvalidReorder::UnknownNode("zz".into()))]
#[case("a1", "a2", DropPosition::Before, InvalidReorder::NoOp("a1".into()))]
fn given_invalid_drop_when_resolving_then_reports_reason(
    #[case] source: &str,
    #[case] target: &str,
    #[case] position: DropPosition,
    #[case] expected: InvalidReorder,
) {
    let original = tree();
    let index = AncestryIndex::build(&original).unwrap();
    let result = resolve(&index, &source.into(), &target.into(), position);
    assert_eq!(result, Err(expected));
}
