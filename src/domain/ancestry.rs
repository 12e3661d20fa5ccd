use std::collections::HashMap;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{NodeId, TreeNode};

/// Arena entry mirroring one tree node with a parent back-reference.
#[derive(Debug)]
pub struct AncestryEntry {
    pub id: NodeId,
    /// Index of parent entry, None for the root
    pub parent: Option<Index>,
    /// Child entries in sibling order, tombstones included
    pub children: Vec<Index>,
    pub is_collapsed: bool,
    pub is_deleted: bool,
}

/// Id → parent-chain index over a tree snapshot.
///
/// Built once per snapshot so that ancestor queries cost O(depth) instead of a
/// fresh traversal. The index is read-only; rebuild it when the store confirms a
/// new tree.
#[derive(Debug)]
pub struct AncestryIndex {
    arena: Arena<AncestryEntry>,
    by_id: HashMap<NodeId, Index>,
    root: Index,
}

impl AncestryIndex {
    #[instrument(level = "debug", skip(root), fields(root = %root.id))]
    pub fn build(root: &TreeNode) -> DomainResult<Self> {
        let mut arena = Arena::new();
        let mut by_id = HashMap::new();
        let root_idx = Self::insert(&mut arena, &mut by_id, root, None)?;

        let mut stack = vec![(root, root_idx)];
        while let Some((node, idx)) = stack.pop() {
            for child in &node.children {
                let child_idx = Self::insert(&mut arena, &mut by_id, child, Some(idx))?;
                stack.push((child, child_idx));
            }
        }

        Ok(Self {
            arena,
            by_id,
            root: root_idx,
        })
    }

    fn insert(
        arena: &mut Arena<AncestryEntry>,
        by_id: &mut HashMap<NodeId, Index>,
        node: &TreeNode,
        parent: Option<Index>,
    ) -> DomainResult<Index> {
        if by_id.contains_key(&node.id) {
            return Err(DomainError::DuplicateId(node.id.clone()));
        }
        let idx = arena.insert(AncestryEntry {
            id: node.id.clone(),
            parent,
            children: Vec::new(),
            is_collapsed: node.is_collapsed,
            is_deleted: node.is_deleted,
        });
        if let Some(parent_idx) = parent {
            if let Some(entry) = arena.get_mut(parent_idx) {
                entry.children.push(idx);
            }
        }
        by_id.insert(node.id.clone(), idx);
        Ok(idx)
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn root_id(&self) -> &NodeId {
        &self.arena[self.root].id
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn entry(&self, id: &NodeId) -> Option<&AncestryEntry> {
        self.by_id.get(id).and_then(|&idx| self.arena.get(idx))
    }

    pub fn parent_of(&self, id: &NodeId) -> Option<&NodeId> {
        let parent = self.entry(id)?.parent?;
        self.arena.get(parent).map(|e| &e.id)
    }

    /// Position of `id` within its parent's children.
    pub fn position_in_parent(&self, id: &NodeId) -> Option<usize> {
        let idx = *self.by_id.get(id)?;
        let parent = self.arena.get(idx)?.parent?;
        self.arena.get(parent)?.children.iter().position(|&c| c == idx)
    }

    pub fn child_count(&self, id: &NodeId) -> Option<usize> {
        self.entry(id).map(|e| e.children.len())
    }

    /// Ancestors of `id`, nearest first, excluding `id` itself.
    pub fn ancestors<'a>(&'a self, id: &NodeId) -> Ancestors<'a> {
        let next = self
            .by_id
            .get(id)
            .and_then(|&idx| self.arena.get(idx))
            .and_then(|e| e.parent);
        Ancestors { index: self, next }
    }

    /// True iff `candidate` lies strictly below `ancestor`.
    pub fn is_descendant(&self, candidate: &NodeId, ancestor: &NodeId) -> bool {
        self.ancestors(candidate).any(|id| id == ancestor)
    }

    /// True iff a walk from the root would yield `id`.
    ///
    /// A node is hidden when it or any ancestor is deleted, or when any ancestor
    /// is collapsed. The root itself is never walked.
    pub fn is_visible(&self, id: &NodeId) -> bool {
        let Some(entry) = self.entry(id) else {
            return false;
        };
        if entry.is_deleted || entry.parent.is_none() {
            return false;
        }
        let mut current = entry.parent;
        while let Some(idx) = current {
            let Some(ancestor) = self.arena.get(idx) else {
                return false;
            };
            // the root's own flags never hide its children
            if ancestor.parent.is_some() && (ancestor.is_deleted || ancestor.is_collapsed) {
                return false;
            }
            current = ancestor.parent;
        }
        true
    }
}

pub struct Ancestors<'a> {
    index: &'a AncestryIndex,
    next: Option<Index>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.index.arena.get(self.next?)?;
        self.next = entry.parent;
        Some(&entry.id)
    }
}
