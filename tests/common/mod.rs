//! Shared test utilities for integration tests.
//!
//! Import from integration test files as:
//! ```ignore
//! mod common;
//! ```

use std::path::{Path, PathBuf};

use genjson::{config::EngineConfig, session::Session};
use serde_json::Value;
use tempfile::TempDir;

/// Initialize tracing for tests, respecting RUST_LOG env var.
///
/// Safe to call multiple times; subsequent calls are no-ops.
#[allow(dead_code)]
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

#[allow(dead_code)]
pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Load one of the documents under `tests/fixtures` with the default configuration.
#[allow(dead_code)]
pub fn load_fixture(name: &str) -> Session {
    Session::from_path(fixture_path(name), EngineConfig::default()).unwrap()
}

/// Write `document` into `temp_dir` and return its path.
#[allow(dead_code)]
pub fn write_document(temp_dir: &TempDir, name: &str, document: &Value) -> PathBuf {
    let path = temp_dir.path().join(name);
    std::fs::write(&path, serde_json::to_string_pretty(document).unwrap()).unwrap();
    path
}

/// Ids of a tree in pre-order, indented two spaces per level. Handy for shape assertions.
#[allow(dead_code)]
pub fn outline(node: &genjson::traverse::TreeNode) -> Vec<String> {
    node.iter()
        .map(|(depth, node)| format!("{}{}", "  ".repeat(depth), node.id))
        .collect()
}
