//! Shared test utilities for unit tests

use serde_json::{json, Value};

use crate::{
    codec::{ingest, Diagnostic},
    graph::KinshipGraph,
    query::QueryEngine,
    resolver::{ReferenceResolver, ResolvedDocument},
    store::RecordStore,
    traverse::Hierarchy,
};

/// Initialize logging for tests
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// Every stage of a load, kept apart so tests can poke at each one.
pub struct Built {
    pub store: RecordStore,
    pub resolved: ResolvedDocument,
    pub graph: KinshipGraph,
    pub diagnostics: Vec<Diagnostic>,
}

impl Built {
    pub fn hierarchy(&self) -> Hierarchy<'_> {
        Hierarchy::new(&self.graph, &self.store)
    }

    pub fn query(&self) -> QueryEngine<'_> {
        QueryEngine::new(&self.store, &self.graph, &self.resolved)
    }
}

/// Ingest, resolve and build `document`, panicking on structural errors.
pub fn build(document: Value) -> Built {
    init_logging();
    let loaded = ingest(&document).expect("fixture is a valid document");
    let (resolved, resolve_diagnostics) = ReferenceResolver::new(&loaded.store).resolve();
    let graph = KinshipGraph::build(&loaded.store, &resolved);
    let mut diagnostics = loaded.diagnostics;
    diagnostics.extend(resolve_diagnostics);
    Built {
        store: loaded.store,
        resolved,
        graph,
        diagnostics,
    }
}

/// `I1` has parents `I3` and `I4` and child `I5`; `I5` does not list `I1` back.
pub fn three_generations() -> Value {
    json!({
        "individuals": {
            "I1": {
                "full_name": "John Doe",
                "parents": [
                    {"id": "I3", "relationship": "biological", "role": "father"},
                    {"id": "I4", "relationship": "biological", "role": "mother"}
                ],
                "children": [{"id": "I5", "relationship": "biological"}]
            },
            "I3": {"full_name": "Pat Doe", "children": [{"id": "I1"}]},
            "I4": {"full_name": "Mary Roe", "children": [{"id": "I1"}]},
            "I5": {"full_name": "Ann Doe"}
        }
    })
}

/// A single line of descent `I0 -> I1 -> ... -> I{length-1}`, each declaring its parent.
pub fn chain(length: usize) -> Value {
    let mut individuals = serde_json::Map::new();
    for n in 0..length {
        let mut body = json!({"full_name": format!("Gen {n}")});
        if n > 0 {
            body["parents"] = json!([{"id": format!("I{}", n - 1)}]);
        }
        individuals.insert(format!("I{n}"), body);
    }
    json!({ "individuals": individuals })
}
