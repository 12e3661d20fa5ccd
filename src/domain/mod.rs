//! Domain layer: tree model, traversal and reorder rules
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod ancestry;
pub mod display;
pub mod error;
pub mod node;
pub mod reorder;
pub mod walker;

pub use ancestry::AncestryIndex;
pub use display::TreeDisplay;
pub use error::{DomainError, DomainResult, InvalidReorder};
pub use node::{NodeId, TreeNode};
pub use reorder::{resolve, DropPosition, ReparentRequest};
pub use walker::{walk, walk_collect, Affordances, ViewNode, Walk};
