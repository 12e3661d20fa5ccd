//! Test support: one-time tracing setup and a shared sample tree

use std::sync::Once;

use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::TreeNode;

static TEST_SETUP: Once = Once::new();

/// Installs a global test subscriber once per process.
///
/// `RUST_LOG` wins when set; otherwise the crate logs at trace level.
pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("skilltree=trace"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else if let Err(e) = subscriber.try_init() {
        eprintln!("Error: Failed to set up logging: {}", e);
    }
}

/// `Root -> [A -> [A1], B]`, the tree most scenarios start from.
pub fn sample_tree() -> TreeNode {
    TreeNode::new("root", "Root").with_children(vec![
        TreeNode::new("a", "A").with_children(vec![TreeNode::new("a1", "A1")]),
        TreeNode::new("b", "B"),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_repeated_calls_when_initializing_then_sets_up_once() {
        init_test_setup();
        init_test_setup();
        assert!(tracing::dispatcher::has_been_set());
    }

    #[test]
    fn given_sample_tree_when_counting_then_has_three_visible_nodes() {
        assert_eq!(sample_tree().visible_count(), 3);
    }
}
