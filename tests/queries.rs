use genjson::{
    entity::PlaceRef,
    nodekey::NodeKey,
    properties::{Confidence, DateType},
    session::Session,
};
use serde_json::json;
use test_log::test;

mod common;

fn ids<'a, T: 'a>(items: impl IntoIterator<Item = &'a T>, id: impl Fn(&T) -> &str) -> Vec<String> {
    items.into_iter().map(|item| id(item).to_string()).collect()
}

#[test]
fn immigration_keeps_its_uncertainty() {
    let session = common::load_fixture("structured_v2.json");
    let query = session.query();
    let found = query.events_for("I1", Some("immigration"));
    assert_eq!(found.len(), 1);

    let event = found[0];
    assert_eq!(event.id, "E2");
    let date = event.date.as_ref().unwrap();
    assert_eq!(date.value, "1920");
    assert_eq!(date.date_type, DateType::Approximate);
    assert_eq!(date.circa, Some(true));
    assert!(date.is_uncertain());
    assert_eq!(
        event.place,
        Some(PlaceRef::Text {
            original: "Ellis Island, New York".to_string()
        })
    );
    assert_eq!(event.details["ship"], json!("SS Kroonland"));
}

#[test]
fn events_include_family_participation() {
    let session = common::load_fixture("structured_v2.json");
    let query = session.query();
    assert_eq!(
        ids(query.events_for("I1", None), |e| e.id.as_str()),
        vec!["E1", "E2", "E3", "E4"]
    );
    assert_eq!(ids(query.events_for("I2", Some("Marriage")), |e| e.id.as_str()), vec!["E4"]);
    assert!(query.events_for("I5", Some("immigration")).is_empty());
}

#[test]
fn sources_reach_through_events() {
    let session = common::load_fixture("structured_v2.json");
    let citations = session
        .query()
        .sources_for("I1")
        .into_iter()
        .map(|c| format!("{} <- {}{}", c.source_id, c.cited_by, if c.is_dangling() { " (dangling)" } else { "" }))
        .collect::<Vec<_>>();
    assert_eq!(
        citations,
        vec![
            "S1 <- individual:I1",
            "S9 <- individual:I1 (dangling)",
            "S1 <- event:E1",
            "S2 <- event:E2",
        ]
    );
}

#[test]
fn confidence_filters_use_tier_order() {
    let session = common::load_fixture("structured_v2.json");
    let query = session.query();

    let high = query
        .by_confidence(Confidence::High)
        .into_iter()
        .map(|entity| entity.key().to_string())
        .collect::<Vec<_>>();
    assert_eq!(high, vec!["individual:I1", "event:E1", "source:S1"]);

    assert_eq!(
        query.by_confidence(Confidence::Low).len() + 4,
        query.by_confidence(Confidence::Unknown).len()
    );
    assert_eq!(
        ids(query.sources_for_at_least("I1", Confidence::Medium), |s| s.id.as_str()),
        vec!["S1", "S2"]
    );
    assert_eq!(
        ids(query.events_at_least("I1", Confidence::Medium), |e| e.id.as_str()),
        vec!["E1", "E2"]
    );
}

#[test]
fn notes_from_both_sides() {
    let session = common::load_fixture("structured_v2.json");
    let query = session.query();
    assert_eq!(
        ids(query.notes_related_to(&NodeKey::individual("I1")), |n| n.id.as_str()),
        vec!["N1", "N2"]
    );
    assert_eq!(
        ids(query.notes_related_to(&NodeKey::event("E1")), |n| n.id.as_str()),
        vec!["N1"]
    );
    assert!(query.notes_related_to(&NodeKey::place("P1")).is_empty());
}

#[test]
fn broken_citations_are_reported() {
    let session = common::load_fixture("structured_v2.json");
    let report = session
        .query()
        .dangling_references()
        .into_iter()
        .map(|broken| format!("{} -> {}", broken.owner.key(), broken.reference.target))
        .collect::<Vec<_>>();
    assert_eq!(
        report,
        vec!["individual:I1 -> source:S9", "event:E3 -> place:P404"]
    );
}

#[test]
fn kin_lookups_merge_declared_and_derived() {
    let session = common::load_fixture("structured_v2.json");
    let query = session.query();
    assert_eq!(ids(query.parents_of("I1"), |i| i.id.as_str()), vec!["I3", "I4"]);
    assert_eq!(ids(query.parents_of("I5"), |i| i.id.as_str()), vec!["I1"]);
    assert_eq!(ids(query.children_of("I3"), |i| i.id.as_str()), vec!["I1"]);
    assert_eq!(ids(query.spouses_of("I2"), |i| i.id.as_str()), vec!["I1"]);
    assert_eq!(ids(query.families_of("I5"), |f| f.id.as_str()), vec!["F1"]);
}

#[test]
fn absent_ids_give_empty_results() {
    let session = Session::load(&json!({"individuals": {"I1": {"full_name": "A"}}})).unwrap();
    let query = session.query();
    assert!(query.events_for("I404", None).is_empty());
    assert!(query.sources_for("I404").is_empty());
    assert!(query.notes_related_to(&NodeKey::note("N404")).is_empty());
    assert!(query.parents_of("I404").is_empty());
    assert!(query.families_of("I404").is_empty());
    assert!(query.dangling_references().is_empty());
}
