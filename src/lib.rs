//! # genjson
//!
//! Entity-graph resolution and traversal for GEN-JSON genealogical documents.
//!
//! ## Overview
//!
//! A GEN-JSON document holds eight ID-keyed record sections (individuals, families, events,
//! places, sources, repositories, media, notes) that reference each other by ID. genjson loads
//! such a document into a typed record store, resolves every cross reference, builds a directed
//! relationship graph with explicit back-edges, and answers tree views and queries over it.
//!
//! ### Key Features
//!
//! - **Failure isolation**: a broken record or reference never aborts a load; it becomes a
//!   [`codec::Diagnostic`]
//! - **Legacy shape support**: flat names, inline `birth`/`death` and untyped ID arrays are
//!   normalized while loading
//! - **Declared vs derived links**: every declared edge gets a back-edge marked as derived, so
//!   navigation works both ways without treating both directions as equally authoritative
//! - **Bounded traversal**: cycle and depth guards on an explicit stack, deterministic order
//! - **Shareable sessions**: a loaded [`session::Session`] is immutable and `Send + Sync`
//!
//! ## Architecture
//!
//! Data flows leaf first through these modules:
//!
//! - **[`codec`]**: Ingestion boundary (`ingest`), legacy normalization, schema oracle, diagnostics
//! - **[`store`]**: The Record Store, one table per [`properties::EntityKind`]
//! - **[`resolver`]**: Classifies each reference as resolved, dangling or self
//! - **[`graph`]**: The [`graph::KinshipGraph`] (petgraph multigraph with back-edges)
//! - **[`traverse`]**: Rooted, depth bounded tree views ([`traverse::Hierarchy`])
//! - **[`query`]**: Read-only lookups ([`query::QueryEngine`])
//! - **[`session`]**: Owns all of the above for one document
//!
//! ## Quick Start
//!
//! ```rust
//! use genjson::{nodekey::NodeKey, session::Session, traverse::Lineage};
//! use serde_json::json;
//!
//! let session = Session::load(&json!({
//!     "version": "2.0",
//!     "individuals": {
//!         "I1": {"name": {"given": "John", "surname": "Doe"}, "children": [{"id": "I5"}]},
//!         "I3": {"full_name": "Pat Doe", "children": ["I1"]},
//!         "I5": {"full_name": "Ann Doe"}
//!     },
//!     "events": {
//!         "E1": {
//!             "type": "immigration",
//!             "individual": "I1",
//!             "date": {"value": "1920", "type": "approximate", "circa": true}
//!         }
//!     }
//! }))?;
//!
//! // I5 never names I1 as a parent; the back-edge still finds it.
//! let ancestors = session
//!     .hierarchy()
//!     .tree(&NodeKey::individual("I5"), Lineage::Ancestors)
//!     .unwrap();
//! assert_eq!(ancestors.root.children[0].id, "I1");
//!
//! let immigration = session.query().events_for("I1", Some("immigration"));
//! assert_eq!(immigration.len(), 1);
//! # Ok::<(), genjson::GenJsonError>(())
//! ```
//!
//! ### Working with Diagnostics
//!
//! ```rust
//! # use genjson::{codec::Diagnostic, session::Session};
//! # use serde_json::json;
//! let session = Session::load(&json!({
//!     "individuals": {"I2": {"full_name": "Self Wed", "spouses": [{"id": "I2"}]}}
//! }))?;
//! for diagnostic in session.diagnostics() {
//!     match diagnostic {
//!         Diagnostic::SelfReference(issue) => println!("self reference: {issue}"),
//!         Diagnostic::DanglingReference(issue) => println!("broken: {issue}"),
//!         other => println!("{other}"),
//!     }
//! }
//! # Ok::<(), genjson::GenJsonError>(())
//! ```
//!
//! ## Features
//!
//! - **default**: The library
//! - **bin**: The `genjson` command line tool (`check`, `tree`, `events`)
//!
//! ## Module Guide
//!
//! Start with [`session::Session`] to load a document, then use [`session::Session::hierarchy`]
//! and [`session::Session::query`]. See [`entity`] for the record shapes and [`properties`] for
//! the closed vocabularies.

pub mod codec;
pub mod config;
pub mod entity;
pub mod error;
pub mod graph;
pub mod nodekey;
pub mod properties;
pub mod query;
pub mod resolver;
pub mod session;
pub mod store;
#[cfg(test)]
mod tests;
pub mod traverse;

pub use error::*;
