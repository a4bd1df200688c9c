//! Document ingestion: parsed JSON value in, [`RecordStore`] plus diagnostics out.
//!
//! This is the only place that looks at raw document values. Everything downstream works on the
//! typed records of [`crate::entity`].
//!
//! ## Key Components
//!
//! - [`ingest`] - Builds a [`RecordStore`] from a parsed document
//! - [`legacy`] - Rewrites the legacy flat shape into the structured one, record by record
//! - [`SchemaOracle`] - The pass/fail schema validation boundary ([`ShapeOracle`] built in)
//! - [`Diagnostic`] - Non-fatal findings collected during ingestion and resolution
//!
//! ## Failure Isolation
//!
//! Only structural problems abort a load: a root that is not an object, or an entity section
//! that is not an ID-keyed object ([`GenJsonError::NotAnObject`],
//! [`GenJsonError::InvalidSection`]). A single record that fails to deserialize, or fails its
//! identity check (an individual without any name), is skipped with a
//! [`Diagnostic::MalformedEntity`] naming its kind and ID.
//!
//! ```rust
//! use genjson::codec::{ingest, Diagnostic};
//! use serde_json::json;
//!
//! let loaded = ingest(&json!({
//!     "individuals": {
//!         "I1": {"full_name": "John Doe", "birth": {"date": "1850"}},
//!         "I2": {"sex": "F"}
//!     }
//! }))?;
//! assert!(loaded.store.individual("I1").is_some());
//! assert!(loaded.store.event("I1-birth").is_some());
//! assert!(loaded.diagnostics.iter().any(Diagnostic::is_malformed));
//! # Ok::<(), genjson::GenJsonError>(())
//! ```

pub mod diagnostic;
pub mod legacy;
pub mod validate;

pub use diagnostic::{Diagnostic, ReferenceIssue};
pub use validate::{AcceptAll, SchemaOracle, ShapeOracle};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

use crate::{
    entity::{Event, Family, Individual, Media, Note, Place, Repository, Source},
    error::GenJsonError,
    nodekey::NodeKey,
    properties::EntityKind,
    store::{RecordStore, Stored},
};

/// Result of [`ingest`]: the populated store and everything worth reporting about the load.
#[derive(Debug, Clone, Default)]
pub struct Ingested {
    pub store: RecordStore,
    pub diagnostics: Vec<Diagnostic>,
}

fn section<'a>(
    root: &'a Map<String, Value>,
    kind: EntityKind,
) -> Result<Option<&'a Map<String, Value>>, GenJsonError> {
    match root.get(kind.section()) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(records)) => Ok(Some(records)),
        Some(other) => Err(GenJsonError::InvalidSection {
            section: kind.section().to_string(),
            found: validate::json_type(other).to_string(),
        }),
    }
}

/// Deserialize one record body and store it, or record why it was rejected.
fn load_record<R: Stored + DeserializeOwned>(
    id: &str,
    body: Map<String, Value>,
    store: &mut RecordStore,
    diagnostics: &mut Vec<Diagnostic>,
) -> bool {
    let key = NodeKey::new(R::KIND, id);
    let mut record = match serde_json::from_value::<R>(Value::Object(body)) {
        Ok(record) => record,
        Err(err) => {
            tracing::warn!("[ingest] rejecting {key}: {err}");
            diagnostics.push(Diagnostic::malformed(key, err.to_string()));
            return false;
        }
    };
    record.set_id(id.to_string());
    if let Err(message) = record.validate() {
        tracing::warn!("[ingest] rejecting {key}: {message}");
        diagnostics.push(Diagnostic::malformed(key, message));
        return false;
    }
    store.insert(record);
    true
}

/// Load every record of a section. `normalize` rewrites a body before it is deserialized; its
/// output is handed back only for the records that were accepted, so anything derived from a
/// rejected record is dropped with it.
fn load_section<R: Stored + DeserializeOwned, T>(
    records: Option<&Map<String, Value>>,
    store: &mut RecordStore,
    diagnostics: &mut Vec<Diagnostic>,
    mut normalize: impl FnMut(&str, &mut Map<String, Value>) -> T,
) -> Vec<T> {
    let mut accepted = Vec::new();
    let Some(records) = records else {
        return accepted;
    };
    for (id, value) in records {
        let Value::Object(body) = value else {
            diagnostics.push(Diagnostic::malformed(
                NodeKey::new(R::KIND, id.as_str()),
                format!("record must be an object, found {}", validate::json_type(value)),
            ));
            continue;
        };
        let mut body = body.clone();
        let derived = normalize(id, &mut body);
        if load_record::<R>(id, body, store, diagnostics) {
            accepted.push(derived);
        }
    }
    accepted
}

/// Build a [`RecordStore`] out of a parsed document.
///
/// The legacy shape is normalized record by record while loading (see [`legacy`]); events
/// synthesized from inline vital records are stored alongside the declared events.
pub fn ingest(document: &Value) -> Result<Ingested, GenJsonError> {
    let Value::Object(root) = document else {
        return Err(GenJsonError::NotAnObject {
            found: validate::json_type(document).to_string(),
        });
    };

    // Resolve every section up front so a structural failure aborts before any work is done.
    let individuals = section(root, EntityKind::Individual)?;
    let families = section(root, EntityKind::Family)?;
    let events = section(root, EntityKind::Event)?;
    let places = section(root, EntityKind::Place)?;
    let sources = section(root, EntityKind::Source)?;
    let repositories = section(root, EntityKind::Repository)?;
    let media = section(root, EntityKind::Media)?;
    let notes = section(root, EntityKind::Note)?;

    let mut store = RecordStore::new();
    let mut diagnostics = Vec::new();
    store.version = root
        .get("version")
        .and_then(Value::as_str)
        .map(str::to_string);

    let mut taken_event_ids: BTreeSet<String> = events
        .map(|records| records.keys().cloned().collect())
        .unwrap_or_default();
    let loaded = load_section::<Individual, _>(
        individuals,
        &mut store,
        &mut diagnostics,
        |id, body| {
            let legacy = legacy::is_legacy_individual(body);
            (
                legacy,
                legacy::normalize_individual(id, body, &mut taken_event_ids),
            )
        },
    );
    let legacy_count = loaded.iter().filter(|(legacy, _)| *legacy).count();
    let synthesized = loaded.into_iter().flat_map(|(_, events)| events);
    load_section::<Family, _>(families, &mut store, &mut diagnostics, |_, body| {
        legacy::normalize_family(body)
    });
    load_section::<Event, _>(events, &mut store, &mut diagnostics, |_, body| {
        legacy::normalize_event(body)
    });
    for (id, mut body) in synthesized {
        legacy::normalize_event(&mut body);
        load_record::<Event>(&id, body, &mut store, &mut diagnostics);
    }
    load_section::<Place, _>(places, &mut store, &mut diagnostics, |_, _| {});
    load_section::<Source, _>(sources, &mut store, &mut diagnostics, |_, _| {});
    load_section::<Repository, _>(repositories, &mut store, &mut diagnostics, |_, _| {});
    load_section::<Media, _>(media, &mut store, &mut diagnostics, |_, _| {});
    load_section::<Note, _>(notes, &mut store, &mut diagnostics, |_, _| {});

    if legacy_count > 0 {
        diagnostics.push(Diagnostic::info(format!(
            "normalized {legacy_count} legacy individual record(s)"
        )));
    }
    tracing::info!(
        "[ingest] loaded {} records ({} individuals, {} families, {} events); {} rejected",
        store.len(),
        store.count(EntityKind::Individual),
        store.count(EntityKind::Family),
        store.count(EntityKind::Event),
        diagnostics.iter().filter(|d| d.is_malformed()).count()
    );

    Ok(Ingested { store, diagnostics })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{PlaceRef, Subject};
    use crate::properties::{DateType, RelationshipKind};
    use serde_json::json;

    #[test]
    fn rejects_non_object_documents() {
        assert_eq!(
            ingest(&json!([1, 2])).unwrap_err(),
            GenJsonError::NotAnObject {
                found: "array".to_string()
            }
        );
        let err = ingest(&json!({"individuals": ["I1"]})).unwrap_err();
        assert!(matches!(err, GenJsonError::InvalidSection { ref section, .. } if section.as_str() == "individuals"));
    }

    #[test]
    fn malformed_records_are_isolated() {
        let loaded = ingest(&json!({
            "individuals": {
                "I1": {"full_name": "Kept"},
                "I2": {"sex": "M"},
                "I3": 42
            },
            "events": {
                "E1": {"individual": "I1"},
                "E2": {"type": "census", "individual": "I1"}
            }
        }))
        .unwrap();

        assert_eq!(loaded.store.all_ids(EntityKind::Individual).len(), 1);
        assert_eq!(loaded.store.all_ids(EntityKind::Event).len(), 1);
        let rejected = loaded
            .diagnostics
            .iter()
            .filter_map(|d| match d {
                Diagnostic::MalformedEntity { key, .. } => Some(key.to_string()),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(
            rejected,
            vec!["individual:I2", "individual:I3", "event:E1"]
        );
    }

    #[test]
    fn legacy_document_is_normalized() {
        let loaded = ingest(&json!({
            "version": "1.0",
            "individuals": {
                "I1": {
                    "full_name": "John Doe",
                    "sex": "M",
                    "birth": {"date": "1850", "place": "Cork"},
                    "death": {},
                    "parents": ["I3"],
                    "spouses": [],
                    "children": []
                },
                "I3": {"full_name": "Pat Doe"}
            },
            "families": {},
            "sources": {},
            "media": {}
        }))
        .unwrap();

        assert_eq!(loaded.store.version.as_deref(), Some("1.0"));
        let john = loaded.store.individual("I1").unwrap();
        assert_eq!(john.display_name(), "John Doe");
        assert_eq!(john.parents[0].kind, RelationshipKind::Unknown);
        assert_eq!(john.events, vec!["I1-birth".to_string()]);

        let birth = loaded.store.event("I1-birth").unwrap();
        assert_eq!(birth.subject, Some(Subject::Individual("I1".to_string())));
        let date = birth.date.as_ref().unwrap();
        assert_eq!(date.value, "1850");
        assert_eq!(date.date_type, DateType::Exact);
        assert_eq!(
            birth.place,
            Some(PlaceRef::Text {
                original: "Cork".to_string()
            })
        );
        assert!(loaded
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::Info(msg) if msg.contains("1 legacy"))));
    }

    #[test]
    fn synthesized_ids_avoid_declared_events() {
        let loaded = ingest(&json!({
            "individuals": {"I1": {"full_name": "A", "birth": {"date": "1900"}}},
            "events": {"I1-birth": {"type": "baptism", "individual": "I1"}}
        }))
        .unwrap();
        assert_eq!(loaded.store.event("I1-birth").unwrap().event_type, "baptism");
        assert_eq!(loaded.store.event("I1-birth-2").unwrap().event_type, "birth");
    }

    #[test]
    fn rejected_individual_takes_its_vitals_along() {
        let loaded = ingest(&json!({
            "individuals": {
                "I1": {"full_name": "Kept", "birth": {"date": "1880"}},
                "I2": {"sex": "F", "birth": {"date": "1900"}}
            }
        }))
        .unwrap();
        assert!(loaded.store.individual("I2").is_none());
        assert!(loaded.store.event("I2-birth").is_none());
        assert!(loaded.store.event("I1-birth").is_some());
        assert!(loaded
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::Info(msg) if msg == "normalized 1 legacy individual record(s)")));
    }

    #[test]
    fn structured_event_keeps_date_and_place() {
        let loaded = ingest(&json!({
            "events": {
                "E1": {
                    "type": "immigration",
                    "individual": "I1",
                    "date": {"value": "1920", "type": "approximate", "circa": true},
                    "place": {"id": "P1"}
                }
            }
        }))
        .unwrap();
        let event = loaded.store.event("E1").unwrap();
        let date = event.date.as_ref().unwrap();
        assert_eq!(date.value, "1920");
        assert_eq!(date.date_type, DateType::Approximate);
        assert_eq!(date.circa, Some(true));
        assert_eq!(
            event.place,
            Some(PlaceRef::Id {
                id: "P1".to_string(),
                original: None
            })
        );
    }
}
