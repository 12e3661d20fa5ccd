//! Command execution against a tree file

use std::io;
use std::path::PathBuf;
use std::rc::Rc;

use clap::CommandFactory;
use futures::executor::block_on;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::{
    render_state, ApplicationError, MoveOutcome, MutationDispatcher, RenderState,
};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, Settings};
use crate::domain::{
    AncestryIndex, DomainError, DropPosition, NodeId, TreeDisplay, TreeNode, ViewNode,
};
use crate::infrastructure::headless::RecordingSink;
use crate::infrastructure::memory_store::InMemoryTreeStore;
use crate::infrastructure::traits::TreeSource;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

/// Execute the parsed command line.
pub fn execute(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given (see `skilltree --help`)".into(),
        ));
    };

    match command {
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "skilltree", &mut io::stdout());
            Ok(())
        }
        Commands::Config { command } => cmd_config(cli, command),
        Commands::Show { selected } => {
            let session = Session::open(cli)?;
            session.show(selected.as_deref())
        }
        Commands::Walk { selected } => {
            let session = Session::open(cli)?;
            session.walk(selected.as_deref())
        }
        Commands::AddChild { id } => Session::open(cli)?.add_child(id),
        Commands::AddSibling { id } => Session::open(cli)?.add_sibling(id),
        Commands::Collapse { id } => Session::open(cli)?.collapse(id),
        Commands::LoadMore { id } => Session::open(cli)?.load_more(id),
        Commands::Move {
            source,
            target,
            position,
        } => Session::open(cli)?.move_node(source, target, *position),
    }
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    Ok(Settings::load(cli.config.as_deref())?)
}

fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            let global = global_config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(no config directory)".into());
            output::info(&format!("global: {global}"));
            if let Some(path) = &cli.config {
                output::info(&format!("file:   {}", path.display()));
            }
        }
    }
    Ok(())
}

/// One engine instance over the tree file named on the command line.
struct Session {
    path: PathBuf,
    container: ServiceContainer,
    sink: Rc<RecordingSink>,
    dispatcher: MutationDispatcher,
}

impl Session {
    #[instrument(level = "debug", skip_all)]
    fn open(cli: &Cli) -> CliResult<Self> {
        let settings = load_settings(cli)?;
        let path = cli
            .tree
            .clone()
            .or_else(|| settings.store.data_file.clone())
            .ok_or_else(|| {
                CliError::Usage("no tree file: pass --tree or set store.data_file".into())
            })?;
        debug!(path = %path.display(), "opening tree");

        let store = InMemoryTreeStore::load(&path, settings.store.page_size)?;
        let sink = Rc::new(RecordingSink::default());
        let container = ServiceContainer::new(settings, store, sink.clone());
        let dispatcher = container.dispatcher();
        Ok(Self {
            path,
            container,
            sink,
            dispatcher,
        })
    }

    fn tree(&self) -> CliResult<TreeNode> {
        let snapshot = self.container.store.snapshot();
        match snapshot.data {
            Some(root) if snapshot.is_success => Ok(root),
            _ => Err(CliError::Application(
                ApplicationError::LoadFailure {
                    message: snapshot.error.unwrap_or_else(|| "tree not loaded".into()),
                },
            )),
        }
    }

    fn node(&self, tree: &TreeNode, id: &str) -> CliResult<TreeNode> {
        let id = NodeId::from(id);
        tree.find(&id)
            .cloned()
            .ok_or_else(|| DomainError::NodeNotFound(id).into())
    }

    fn parent_of(&self, tree: &TreeNode, id: &str) -> CliResult<TreeNode> {
        let index = AncestryIndex::build(tree)?;
        let id = NodeId::from(id);
        if !index.contains(&id) {
            return Err(DomainError::NodeNotFound(id).into());
        }
        let parent = index
            .parent_of(&id)
            .ok_or_else(|| CliError::InvalidArgs(format!("{id} is the root and has no parent")))?;
        self.node(tree, parent.as_str())
    }

    fn save(&self) -> CliResult<()> {
        self.container.store.save(&self.path)?;
        debug!(path = %self.path.display(), "tree saved");
        Ok(())
    }

    /// Prints the `node/select` event the last action produced, if any.
    fn print_selection_event(&self) -> CliResult<()> {
        if let Some(event) = self.sink.last() {
            let json = serde_json::to_string_pretty(&event)
                .map_err(|e| InfraError::serialization("selection event", e))?;
            output::info(&json);
        }
        Ok(())
    }

    /// Warns when the selected node exists but a walk would not show it.
    fn warn_if_hidden(&self, tree: &TreeNode, selected: Option<&NodeId>) -> CliResult<()> {
        let Some(id) = selected else {
            return Ok(());
        };
        let index = AncestryIndex::build(tree)?;
        if !index.contains(id) {
            return Err(DomainError::NodeNotFound(id.clone()).into());
        }
        if !index.is_visible(id) {
            output::warning(&format!("{id} is hidden by a collapsed or deleted ancestor"));
        }
        Ok(())
    }

    fn show(&self, selected: Option<&str>) -> CliResult<()> {
        let snapshot = self.container.store.snapshot();
        let selected = selected.map(NodeId::from);
        if let Some(tree) = &snapshot.data {
            self.warn_if_hidden(tree, selected.as_ref())?;
        }
        match render_state(&snapshot, selected.as_ref()) {
            RenderState::Loading => output::warning("tree is still loading"),
            RenderState::Unavailable(reason) => {
                return Err(CliError::Application(
                    ApplicationError::LoadFailure {
                        message: reason.unwrap_or_else(|| "tree not available".into()),
                    },
                ))
            }
            RenderState::Empty => {
                let root = self.tree()?;
                output::header(&root.name);
                output::detail(&"(no skills yet)");
            }
            RenderState::Ready { root, .. } => {
                output::info(&root.to_display_tree(selected.as_ref()));
            }
        }
        Ok(())
    }

    fn walk(&self, selected: Option<&str>) -> CliResult<()> {
        let tree = self.tree()?;
        let selected = selected.map(NodeId::from);
        self.warn_if_hidden(&tree, selected.as_ref())?;
        let snapshot = self.container.store.snapshot();
        let state = render_state(&snapshot, selected.as_ref());
        output::header(&tree.name);
        for view in state.nodes() {
            output::info(&walk_line(view));
        }
        Ok(())
    }

    fn add_child(&self, id: &str) -> CliResult<()> {
        let tree = self.tree()?;
        let parent = self.node(&tree, id)?;
        let created = block_on(self.dispatcher.add_child(&parent))?;
        self.save()?;
        output::success(&format!("created {} ({}) under {}", created.name, created.id, parent.id));
        self.print_selection_event()
    }

    fn add_sibling(&self, id: &str) -> CliResult<()> {
        let tree = self.tree()?;
        let anchor = self.node(&tree, id)?;
        let parent = self.parent_of(&tree, id)?;
        let created = block_on(self.dispatcher.add_sibling(&anchor, &parent))?;
        self.save()?;
        output::success(&format!("created {} ({}) after {}", created.name, created.id, anchor.id));
        self.print_selection_event()
    }

    fn collapse(&self, id: &str) -> CliResult<()> {
        let tree = self.tree()?;
        let node = self.node(&tree, id)?;
        block_on(self.dispatcher.toggle_collapse(&node))?;
        self.save()?;
        let state = if node.is_collapsed { "expanded" } else { "collapsed" };
        output::success(&format!("{} ({}) {state}", node.name, node.id));
        Ok(())
    }

    fn load_more(&self, id: &str) -> CliResult<()> {
        let tree = self.tree()?;
        let node = self.node(&tree, id)?;
        if !node.has_more {
            output::warning(&format!("{} has nothing more to load", node.id));
            return Ok(());
        }
        block_on(self.dispatcher.load_more(&node))?;
        self.save()?;
        let after = self.node(&self.tree()?, id)?;
        let loaded = after.children.len().saturating_sub(node.children.len());
        output::success(&format!("loaded {loaded} more under {}", node.id));
        if after.has_more {
            output::detail(&"more available");
        }
        Ok(())
    }

    fn move_node(&self, source: &str, target: &str, position: DropPosition) -> CliResult<()> {
        let tree = self.tree()?;
        let outcome = block_on(self.dispatcher.move_node(
            &tree,
            &NodeId::from(source),
            &NodeId::from(target),
            position,
        ))?;
        match outcome {
            MoveOutcome::Moved(request) => {
                self.save()?;
                output::success(&format!(
                    "moved {} to {} at index {}",
                    request.moved_node_id, request.new_parent_id, request.new_index
                ));
                Ok(())
            }
            MoveOutcome::Rejected(reason) => Err(CliError::Rejected(reason)),
        }
    }
}

/// One `walk` output line: indented name, id and available actions.
fn walk_line(view: &ViewNode<'_>) -> String {
    let affordances = view.affordances();
    let mut flags = Vec::new();
    if affordances.can_collapse {
        flags.push(if affordances.is_collapsed { "expand" } else { "collapse" });
    }
    if affordances.can_load_more {
        flags.push("load-more");
    }
    let name = if view.is_active {
        output::active(&view.node.name)
    } else {
        view.node.name.clone()
    };
    let mut line = format!(
        "{}{} {}",
        "  ".repeat(view.depth),
        name,
        output::dim(&format!("({})", view.id()))
    );
    if !flags.is_empty() {
        line.push_str(&format!(" [{}]", flags.iter().join(", ")));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::walk_collect;

    #[test]
    fn given_view_nodes_when_formatting_walk_lines_then_indents_and_lists_actions() {
        colored::control::set_override(false);
        let tree = TreeNode::new("root", "Root").with_children(vec![
            TreeNode::new("a", "A")
                .collapsed()
                .with_children(vec![TreeNode::new("a1", "A1")]),
            TreeNode::new("b", "B").with_more().with_children(vec![TreeNode::new("b1", "B1")]),
        ]);
        let lines: Vec<_> = walk_collect(&tree, None).iter().map(walk_line).collect();
        assert_eq!(
            lines,
            vec![
                "A (a) [expand]",
                "B (b) [collapse, load-more]",
                "  B1 (b1)",
            ]
        );
    }
}
