//! Drag-and-drop reorder resolution.
//!
//! Turns a (source, target, position) drop into a single reparent request, or
//! refuses it. Nothing here edits the tree: the store applies the move once it
//! accepts the request.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::ancestry::AncestryIndex;
use crate::domain::error::InvalidReorder;
use crate::domain::node::NodeId;

/// Where the dragged node lands relative to the drop target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropPosition {
    Before,
    After,
    Into,
}

impl fmt::Display for DropPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DropPosition::Before => "before",
            DropPosition::After => "after",
            DropPosition::Into => "into",
        };
        f.write_str(s)
    }
}

impl FromStr for DropPosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "before" => Ok(DropPosition::Before),
            "after" => Ok(DropPosition::After),
            "into" => Ok(DropPosition::Into),
            other => Err(format!("unknown drop position: {other}")),
        }
    }
}

/// The only mutation that changes tree topology.
///
/// `new_index` addresses the new parent's children *after* the moved node has
/// been taken out of its old place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReparentRequest {
    pub moved_node_id: NodeId,
    pub old_parent_id: NodeId,
    pub new_parent_id: NodeId,
    pub new_index: usize,
}

/// Resolves a drop of `source` onto `target`.
#[instrument(level = "debug", skip(index))]
pub fn resolve(
    index: &AncestryIndex,
    source: &NodeId,
    target: &NodeId,
    position: DropPosition,
) -> Result<ReparentRequest, InvalidReorder> {
    for id in [source, target] {
        if !index.contains(id) {
            return Err(InvalidReorder::UnknownNode(id.clone()));
        }
    }
    if source == target {
        return Err(InvalidReorder::OntoSelf(source.clone()));
    }
    let old_parent = index.parent_of(source).ok_or(InvalidReorder::MoveRoot)?;
    if index.is_descendant(target, source) {
        return Err(InvalidReorder::IntoDescendant {
            source_id: source.clone(),
            target_id: target.clone(),
        });
    }
    let source_pos = index
        .position_in_parent(source)
        .ok_or_else(|| InvalidReorder::UnknownNode(source.clone()))?;

    let (new_parent, raw_index) = match position {
        DropPosition::Into => {
            let count = index
                .child_count(target)
                .ok_or_else(|| InvalidReorder::UnknownNode(target.clone()))?;
            (target, count)
        }
        DropPosition::Before | DropPosition::After => {
            let parent = index.parent_of(target).ok_or(InvalidReorder::SiblingOfRoot)?;
            let target_pos = index
                .position_in_parent(target)
                .ok_or_else(|| InvalidReorder::UnknownNode(target.clone()))?;
            let offset = usize::from(position == DropPosition::After);
            (parent, target_pos + offset)
        }
    };

    let same_parent = new_parent == old_parent;
    let new_index = if same_parent && source_pos < raw_index {
        raw_index - 1
    } else {
        raw_index
    };
    if same_parent && new_index == source_pos {
        return Err(InvalidReorder::NoOp(source.clone()));
    }

    let request = ReparentRequest {
        moved_node_id: source.clone(),
        old_parent_id: old_parent.clone(),
        new_parent_id: new_parent.clone(),
        new_index,
    };
    debug!(?request, "resolved reorder");
    Ok(request)
}
