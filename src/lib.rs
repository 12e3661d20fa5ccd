//! Skill tree engine: tree walking, selection tracking, mutation dispatch and
//! drag-reorder resolution for hierarchical skill editors.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
