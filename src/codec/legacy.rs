//! Legacy → structured shape normalization.
//!
//! Version 1.0 documents (and the output of the GEDCOM converter) describe individuals with a
//! flat `full_name`, inline `birth`/`death` objects and untyped ID arrays for `parents`,
//! `spouses` and `children`. These helpers rewrite one record body at a time, in place, into the
//! structured shape the [`crate::entity`] types deserialize. Every rewrite is a no-op on a body
//! that is already structured, so they run unconditionally.
//!
//! Inline vital records become real events: `I1.birth = {date, place}` turns into event
//! `I1-birth` with `I1` as subject, linked from `I1.events`.

use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Inline event fields of the legacy individual shape.
pub const VITAL_EVENTS: &[&str] = &["birth", "death"];

const KINSHIP_FIELDS: &[&str] = &["parents", "spouses", "children"];

/// Whether an individual body uses any part of the legacy shape.
pub fn is_legacy_individual(body: &Map<String, Value>) -> bool {
    let flat_name_only = body.contains_key("full_name") && !body.contains_key("name");
    let inline_vitals = VITAL_EVENTS.iter().any(|field| body.contains_key(*field));
    let untyped_ids = KINSHIP_FIELDS.iter().any(|field| {
        body.get(*field)
            .and_then(Value::as_array)
            .is_some_and(|items| items.iter().any(Value::is_string))
    });
    flat_name_only || inline_vitals || untyped_ids
}

fn relationship_record(id: &str, with_role: bool) -> Value {
    let mut record = Map::new();
    record.insert("id".to_string(), Value::String(id.to_string()));
    record.insert(
        "relationship".to_string(),
        Value::String("unknown".to_string()),
    );
    if with_role {
        record.insert("role".to_string(), Value::String("parent".to_string()));
    }
    Value::Object(record)
}

fn type_relationship_ids(body: &mut Map<String, Value>, field: &str, with_role: bool) {
    if let Some(Value::Array(items)) = body.get_mut(field) {
        for item in items.iter_mut() {
            if let Some(id) = item.as_str().map(str::to_string) {
                *item = relationship_record(&id, with_role);
            }
        }
    }
}

/// Build a structured event body out of an inline `birth`/`death` value. Empty inline
/// objects (`{}`) carry no information and produce nothing.
fn vital_event(subject: &str, event_type: &str, inline: Value) -> Option<Map<String, Value>> {
    let mut inline = match inline {
        Value::Object(map) => map,
        Value::String(date) if !date.trim().is_empty() => {
            let mut map = Map::new();
            map.insert("date".to_string(), Value::String(date));
            map
        }
        _ => return None,
    };

    let mut event = Map::new();
    match inline.remove("date") {
        Some(Value::String(date)) if !date.trim().is_empty() => {
            let mut descriptor = Map::new();
            descriptor.insert("value".to_string(), Value::String(date));
            descriptor.insert("type".to_string(), Value::String("exact".to_string()));
            event.insert("date".to_string(), Value::Object(descriptor));
        }
        Some(descriptor @ Value::Object(_)) => {
            event.insert("date".to_string(), descriptor);
        }
        _ => {}
    }
    match inline.remove("place") {
        Some(Value::String(place)) if !place.trim().is_empty() => {
            let mut original = Map::new();
            original.insert("original".to_string(), Value::String(place));
            event.insert("place".to_string(), Value::Object(original));
        }
        Some(place @ Value::Object(_)) => {
            event.insert("place".to_string(), place);
        }
        _ => {}
    }
    for carried in ["sources", "notes", "confidence"] {
        if let Some(value) = inline.remove(carried) {
            event.insert(carried.to_string(), value);
        }
    }
    if event.is_empty() {
        return None;
    }

    event.insert("type".to_string(), Value::String(event_type.to_string()));
    event.insert("individual".to_string(), Value::String(subject.to_string()));
    Some(event)
}

fn unique_event_id(subject: &str, event_type: &str, taken: &mut BTreeSet<String>) -> String {
    let base = format!("{subject}-{event_type}");
    let mut candidate = base.clone();
    let mut suffix = 2;
    while taken.contains(&candidate) {
        candidate = format!("{base}-{suffix}");
        suffix += 1;
    }
    taken.insert(candidate.clone());
    candidate
}

/// Normalize an individual body in place. Returns the events synthesized from inline vital
/// records as `(event id, event body)` pairs; their IDs are already appended to the
/// individual's `events` list. `taken_event_ids` holds every event ID in use and is extended.
pub fn normalize_individual(
    id: &str,
    body: &mut Map<String, Value>,
    taken_event_ids: &mut BTreeSet<String>,
) -> Vec<(String, Map<String, Value>)> {
    type_relationship_ids(body, "parents", true);
    type_relationship_ids(body, "spouses", false);
    type_relationship_ids(body, "children", false);

    let mut synthesized = Vec::new();
    for event_type in VITAL_EVENTS {
        let Some(inline) = body.remove(*event_type) else {
            continue;
        };
        let Some(event) = vital_event(id, event_type, inline) else {
            continue;
        };
        let event_id = unique_event_id(id, event_type, taken_event_ids);
        let events = body
            .entry("events")
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(events) = events {
            events.push(Value::String(event_id.clone()));
        }
        synthesized.push((event_id, event));
    }
    synthesized
}

/// Normalize a family body in place: `husband`/`wife` scalars become partner records, bare
/// partner and child IDs become records.
pub fn normalize_family(body: &mut Map<String, Value>) {
    let mut partners = match body.remove("partners") {
        Some(Value::Array(items)) => items,
        Some(other) => {
            // Leave a malformed value for the deserializer to report.
            body.insert("partners".to_string(), other);
            return;
        }
        None => Vec::new(),
    };
    for item in partners.iter_mut() {
        if let Some(id) = item.as_str().map(str::to_string) {
            let mut record = Map::new();
            record.insert("id".to_string(), Value::String(id));
            *item = Value::Object(record);
        }
    }
    for role in ["husband", "wife"] {
        if let Some(Value::String(id)) = body.remove(role) {
            let mut record = Map::new();
            record.insert("id".to_string(), Value::String(id));
            record.insert("role".to_string(), Value::String(role.to_string()));
            partners.push(Value::Object(record));
        }
    }
    if !partners.is_empty() {
        body.insert("partners".to_string(), Value::Array(partners));
    }
    type_relationship_ids(body, "children", false);
}

/// Normalize an event body in place: bare date strings become descriptors, top level
/// `date_type`/`circa` move into the descriptor, a bare place string is a place ID.
pub fn normalize_event(body: &mut Map<String, Value>) {
    if let Some(Value::String(date)) = body.get("date") {
        let mut descriptor = Map::new();
        descriptor.insert("value".to_string(), Value::String(date.clone()));
        body.insert("date".to_string(), Value::Object(descriptor));
    }
    for (outer, inner) in [("date_type", "type"), ("circa", "circa")] {
        let Some(value) = body.remove(outer) else {
            continue;
        };
        match body.get_mut("date") {
            Some(Value::Object(descriptor)) => {
                descriptor.entry(inner).or_insert(value);
            }
            _ => {
                let mut descriptor = Map::new();
                descriptor.insert(inner.to_string(), value);
                body.insert("date".to_string(), Value::Object(descriptor));
            }
        }
    }
    if let Some(Value::String(place)) = body.get("place") {
        let mut reference = Map::new();
        reference.insert("id".to_string(), Value::String(place.clone()));
        body.insert("place".to_string(), Value::Object(reference));
    }
}
