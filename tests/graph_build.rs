use genjson::{
    codec::{Diagnostic, ReferenceIssue},
    nodekey::NodeKey,
    properties::{EdgeLabel, ReferenceField},
    session::Session,
    traverse::Lineage,
};
use serde_json::json;
use test_log::test;

mod common;

#[test]
fn self_spouse_is_flagged_and_harmless() {
    let session = common::load_fixture("structured_v2.json");
    assert!(session
        .diagnostics()
        .contains(&Diagnostic::SelfReference(ReferenceIssue::new(
            NodeKey::individual("I2"),
            ReferenceField::Spouses,
            NodeKey::individual("I2"),
        ))));
    assert!(session
        .resolved()
        .get(&NodeKey::individual("I2"))
        .unwrap()
        .is_self_referential());

    let i2 = NodeKey::individual("I2");
    let spouses = session
        .graph()
        .neighbors(&i2, EdgeLabel::SpouseOf.into(), true)
        .into_iter()
        .map(|key| key.to_string())
        .collect::<Vec<_>>();
    assert_eq!(spouses, vec!["individual:I1", "family:F1"]);

    for lineage in [Lineage::Descendants, Lineage::Ancestors] {
        let tree = session.hierarchy().tree(&i2, lineage).unwrap();
        assert!(tree.root.children.is_empty());
    }
}

#[test]
fn broken_references_stay_visible() {
    let session = common::load_fixture("structured_v2.json");
    let dangling = session
        .diagnostics()
        .iter()
        .filter_map(Diagnostic::as_reference_issue)
        .filter(|issue| issue.owner != issue.target)
        .map(|issue| issue.to_string())
        .collect::<Vec<_>>();
    assert_eq!(
        dangling,
        vec!["individual:I1.sources -> source:S9", "event:E3.place -> place:P404"]
    );
    // The owners are still in the store.
    assert!(session.store().individual("I1").is_some());
    assert!(session.store().event("E3").is_some());
}

#[test]
fn one_sided_child_is_observed_not_inferred() {
    let session = common::load_fixture("structured_v2.json");
    let asymmetric = session
        .diagnostics()
        .iter()
        .filter(|d| matches!(d, Diagnostic::AsymmetricRelationship { .. }))
        .collect::<Vec<_>>();
    assert_eq!(
        asymmetric,
        vec![&Diagnostic::AsymmetricRelationship {
            declared_by: NodeKey::individual("I1"),
            target: NodeKey::individual("I5"),
            field: ReferenceField::Children,
        }]
    );
    // Nothing was written back into I5.
    assert!(session.store().individual("I5").unwrap().parents.is_empty());

    let declared = session
        .graph()
        .outgoing(&NodeKey::individual("I5"), EdgeLabel::ChildOf.into(), false);
    assert!(declared.is_empty());
    let derived = session
        .graph()
        .outgoing(&NodeKey::individual("I5"), EdgeLabel::ChildOf.into(), true);
    assert!(derived.iter().all(|(_, relation)| relation.derived));
    assert_eq!(derived[0].0, &NodeKey::individual("I1"));
}

#[test]
fn every_declared_edge_has_one_back_edge() {
    let session = common::load_fixture("structured_v2.json");
    let graph = session.graph().as_graph();
    let declared = graph
        .edge_weights()
        .filter(|relation| !relation.derived)
        .count();
    let derived = graph.edge_weights().filter(|relation| relation.derived).count();
    assert_eq!(declared, derived);
    assert_eq!(
        declared,
        session
            .resolved()
            .iter()
            .map(|entity| entity.resolved().count())
            .sum::<usize>()
    );
    assert_eq!(session.graph().node_count(), session.store().len());
}

#[test]
fn building_twice_is_idempotent() {
    let content = std::fs::read_to_string(common::fixture_path("structured_v2.json")).unwrap();
    let first = Session::from_json_str(&content).unwrap();
    let second = Session::from_json_str(&content).unwrap();

    assert_eq!(first.graph().edge_set(), second.graph().edge_set());
    assert_eq!(first.diagnostics(), second.diagnostics());
    assert_eq!(first.hierarchy().forest(), second.hierarchy().forest());
}

#[test]
fn missing_event_subject_is_kept_and_flagged() {
    let session = Session::load(&json!({
        "individuals": {"I1": {"full_name": "Present"}},
        "events": {
            "E1": {"type": "birth", "individual": "I9"},
            "E2": {"type": "marriage", "family": "F9", "participants": ["I1"]}
        }
    }))
    .unwrap();

    assert!(session.store().event("E1").is_some());
    assert!(session.store().event("E2").is_some());
    let diagnostics = session.diagnostics();
    assert!(diagnostics.contains(&Diagnostic::dangling(
        NodeKey::event("E1"),
        ReferenceField::Subject,
        NodeKey::individual("I9"),
    )));
    assert!(diagnostics.contains(&Diagnostic::dangling(
        NodeKey::event("E2"),
        ReferenceField::Subject,
        NodeKey::family("F9"),
    )));

    // The participant that does exist still reaches the event.
    let events = session.query().events_for("I1", None);
    assert_eq!(events.iter().map(|e| e.id.as_str()).collect::<Vec<_>>(), vec!["E2"]);
    assert_eq!(
        session
            .graph()
            .neighbors(&NodeKey::event("E1"), EdgeLabel::ParticipatesIn.into(), true)
            .len(),
        0
    );
}
