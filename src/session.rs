//! [Session]: one loaded document with everything built from it.
//!
//! A session owns its [`RecordStore`], the resolved references, the [`KinshipGraph`] and the
//! diagnostics collected while building them. It is immutable once loaded, so any number of
//! threads can run traversals and queries against a shared session without locking. Holding
//! several documents at once means holding several sessions; they share nothing.
//!
//! ```rust
//! use genjson::{session::Session, traverse::Lineage, nodekey::NodeKey};
//!
//! let session = Session::from_json_str(r#"{
//!     "individuals": {
//!         "I1": {"full_name": "John Doe", "children": ["I2"]},
//!         "I2": {"full_name": "Jane Doe", "parents": ["I1"]}
//!     }
//! }"#)?;
//! let tree = session
//!     .hierarchy()
//!     .tree(&NodeKey::individual("I1"), Lineage::Descendants)
//!     .unwrap();
//! assert_eq!(tree.root.children[0].id, "I2");
//! # Ok::<(), genjson::GenJsonError>(())
//! ```
use serde_json::Value;
use std::path::Path;

use crate::{
    codec::{ingest, Diagnostic, SchemaOracle, ShapeOracle},
    config::EngineConfig,
    error::GenJsonError,
    graph::KinshipGraph,
    query::QueryEngine,
    resolver::{ReferenceResolver, ResolvedDocument},
    store::RecordStore,
    traverse::Hierarchy,
};

#[derive(Debug, Clone)]
pub struct Session {
    config: EngineConfig,
    store: RecordStore,
    resolved: ResolvedDocument,
    graph: KinshipGraph,
    diagnostics: Vec<Diagnostic>,
}

impl Session {
    /// Load with the default configuration and the built-in [`ShapeOracle`].
    pub fn load(document: &Value) -> Result<Self, GenJsonError> {
        Session::load_with(document, EngineConfig::default(), &ShapeOracle)
    }

    /// Build a session. The oracle runs first; with `enforce_schema` its rejection aborts the
    /// load, otherwise each finding becomes a warning. Structural failures (root not an object, a
    /// section that is not a mapping) are always fatal.
    pub fn load_with(
        document: &Value,
        config: EngineConfig,
        oracle: &dyn SchemaOracle,
    ) -> Result<Self, GenJsonError> {
        config.validate()?;
        let mut diagnostics = Vec::new();
        if let Err(violations) = oracle.validate(document) {
            if config.enforce_schema {
                tracing::warn!(
                    "[Session] schema rejected document ({} violations)",
                    violations.len()
                );
                return Err(GenJsonError::SchemaRejected(violations));
            }
            diagnostics.extend(
                violations
                    .into_iter()
                    .map(|violation| Diagnostic::warning(format!("schema: {violation}"))),
            );
        }

        let loaded = ingest(document)?;
        diagnostics.extend(loaded.diagnostics);
        let store = loaded.store;

        let (resolved, resolve_diagnostics) = ReferenceResolver::new(&store)
            .report_asymmetric(config.report_asymmetric)
            .resolve();
        diagnostics.extend(resolve_diagnostics);
        let graph = KinshipGraph::build(&store, &resolved);

        tracing::info!(
            "[Session] loaded {} records, {} diagnostics",
            store.len(),
            diagnostics.len()
        );
        Ok(Session {
            config,
            store,
            resolved,
            graph,
            diagnostics,
        })
    }

    pub fn from_json_str(content: &str) -> Result<Self, GenJsonError> {
        let document: Value = serde_json::from_str(content)?;
        Session::load(&document)
    }

    pub fn from_path<P: AsRef<Path>>(path: P, config: EngineConfig) -> Result<Self, GenJsonError> {
        tracing::debug!("[Session] reading document from: {:?}", path.as_ref());
        let content = std::fs::read_to_string(path)?;
        let document: Value = serde_json::from_str(&content)?;
        Session::load_with(&document, config, &ShapeOracle)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn resolved(&self) -> &ResolvedDocument {
        &self.resolved
    }

    pub fn graph(&self) -> &KinshipGraph {
        &self.graph
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Tree views configured from this session's [`EngineConfig`].
    pub fn hierarchy(&self) -> Hierarchy<'_> {
        Hierarchy::new(&self.graph, &self.store)
            .with_max_depth(self.config.max_depth)
            .follow_back_edges(self.config.follow_back_edges)
    }

    pub fn query(&self) -> QueryEngine<'_> {
        QueryEngine::new(&self.store, &self.graph, &self.resolved)
    }
}
