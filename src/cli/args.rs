//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::domain::DropPosition;

/// Browse and edit a skill tree stored as JSON
#[derive(Parser, Debug)]
#[command(name = "skilltree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file layered over the global config
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Tree file (default: store.data_file from config)
    #[arg(short, long, global = true, env = "SKILLTREE_TREE", value_hint = ValueHint::FilePath)]
    pub tree: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the visible tree
    Show {
        /// Node to mark as selected
        #[arg(short, long)]
        selected: Option<String>,
    },

    /// List visible nodes in walk order with depth and actions
    Walk {
        /// Node to mark as selected
        #[arg(short, long)]
        selected: Option<String>,
    },

    /// Create a new child under a node and select it
    AddChild {
        /// Parent node id
        id: String,
    },

    /// Create a new node right after a node and select it
    AddSibling {
        /// Anchor node id
        id: String,
    },

    /// Toggle collapse on a node
    Collapse {
        /// Node id
        id: String,
    },

    /// Load the next page of children for a node
    LoadMore {
        /// Node id
        id: String,
    },

    /// Move a node relative to a target node
    Move {
        /// Node to move
        source: String,
        /// Drop target
        target: String,
        /// before | after | into
        #[arg(short, long, default_value_t = DropPosition::Into)]
        position: DropPosition,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Print a config template
    Template,

    /// Show config paths
    Path,
}
