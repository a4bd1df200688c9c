//! Read-only queries over a built document.
//!
//! Every query is a projection over the [`KinshipGraph`] and the resolved references; none of
//! them scans the whole document except the document wide reports
//! ([`QueryEngine::dangling_references`], [`QueryEngine::by_confidence`]). Asking about an ID that
//! is not in the document yields an empty result, never an error.
use serde::Serialize;
use std::collections::BTreeSet;

use crate::{
    entity::{Entity, Event, Family, Individual, Note, Source},
    graph::KinshipGraph,
    nodekey::NodeKey,
    properties::{Confidence, EdgeLabel, EntityKind, ReferenceField},
    resolver::{ResolvedDocument, ResolvedReference},
    store::RecordStore,
};

/// One citation of a source by an individual or by one of its events. `source` is `None` when
/// the cited ID is not in the document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Citation<'a> {
    pub source_id: String,
    pub cited_by: NodeKey,
    pub source: Option<&'a Source>,
}

impl Citation<'_> {
    pub fn is_dangling(&self) -> bool {
        self.source.is_none()
    }
}

/// A reference whose target is missing, with the record that declared it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrokenReference<'a> {
    pub owner: Entity<'a>,
    pub reference: &'a ResolvedReference,
}

pub struct QueryEngine<'a> {
    store: &'a RecordStore,
    graph: &'a KinshipGraph,
    resolved: &'a ResolvedDocument,
}

impl<'a> QueryEngine<'a> {
    pub fn new(
        store: &'a RecordStore,
        graph: &'a KinshipGraph,
        resolved: &'a ResolvedDocument,
    ) -> Self {
        QueryEngine {
            store,
            graph,
            resolved,
        }
    }

    fn individuals_along(&self, id: &str, label: EdgeLabel) -> Vec<&'a Individual> {
        self.graph
            .neighbors(&NodeKey::individual(id), label.into(), true)
            .into_iter()
            .filter(|key| key.is_individual())
            .filter_map(|key| self.store.individual(&key.id))
            .collect()
    }

    /// Events of an individual, optionally restricted to one type (ASCII case-insensitive).
    /// Covers events the individual lists and events naming it as subject or participant, in that
    /// order. Listed event IDs that do not resolve are left out here; they show up in
    /// [`QueryEngine::dangling_references`].
    pub fn events_for(&self, individual: &str, event_type: Option<&str>) -> Vec<&'a Event> {
        self.graph
            .neighbors(
                &NodeKey::individual(individual),
                EdgeLabel::ParticipatesIn.into(),
                true,
            )
            .into_iter()
            .filter(|key| key.kind == EntityKind::Event)
            .filter_map(|key| self.store.event(&key.id))
            .filter(|event| event_type.map_or(true, |wanted| event.is_type(wanted)))
            .collect()
    }

    /// Sources cited by an individual directly and through its events, dangling citations
    /// included. Each `(source, citing record)` pair appears once.
    pub fn sources_for(&self, individual: &str) -> Vec<Citation<'a>> {
        let key = NodeKey::individual(individual);
        if !self.store.contains(&key) {
            return Vec::new();
        }
        let citing = std::iter::once(key)
            .chain(
                self.events_for(individual, None)
                    .into_iter()
                    .map(|event| NodeKey::event(event.id.as_str())),
            )
            .collect::<Vec<_>>();

        let mut seen = BTreeSet::new();
        let mut citations = Vec::new();
        for owner in citing {
            let Some(resolved) = self.resolved.get(&owner) else {
                continue;
            };
            for reference in resolved.in_field(ReferenceField::Sources) {
                if !seen.insert((reference.target.id.clone(), owner.clone())) {
                    continue;
                }
                citations.push(Citation {
                    source_id: reference.target.id.clone(),
                    cited_by: owner.clone(),
                    source: self.store.source(&reference.target.id),
                });
            }
        }
        citations
    }

    /// Resolved sources of an individual whose confidence is at least `min`.
    pub fn sources_for_at_least(&self, individual: &str, min: Confidence) -> Vec<&'a Source> {
        let mut seen = BTreeSet::new();
        self.sources_for(individual)
            .into_iter()
            .filter_map(|citation| citation.source)
            .filter(|source| source.confidence.at_least(min))
            .filter(|source| seen.insert(source.id.as_str()))
            .collect()
    }

    /// Notes attached to `key`: notes the record lists itself and notes naming it in
    /// `related_to`. As with [`QueryEngine::events_for`], unresolved note IDs are only reported
    /// by [`QueryEngine::dangling_references`].
    pub fn notes_related_to(&self, key: &NodeKey) -> Vec<&'a Note> {
        self.graph
            .neighbors(key, EdgeLabel::DocumentedBy.into(), true)
            .into_iter()
            .filter(|target| target.kind == EntityKind::Note)
            .filter_map(|target| self.store.note(&target.id))
            .collect()
    }

    /// Individuals, events and sources at or above `min`, in that order, IDs ascending.
    pub fn by_confidence(&self, min: Confidence) -> Vec<Entity<'a>> {
        self.store
            .records::<Individual>()
            .map(Entity::Individual)
            .chain(self.store.records::<Event>().map(Entity::Event))
            .chain(self.store.records::<Source>().map(Entity::Source))
            .filter(|entity| entity.confidence().at_least(min))
            .collect()
    }

    /// Events of an individual at or above `min`.
    pub fn events_at_least(&self, individual: &str, min: Confidence) -> Vec<&'a Event> {
        self.events_for(individual, None)
            .into_iter()
            .filter(|event| event.confidence.at_least(min))
            .collect()
    }

    /// Every reference whose target is missing, grouped by declaring record in key order. This is
    /// the one report of broken links; the record oriented queries only return what resolved,
    /// except [`QueryEngine::sources_for`], which keeps dangling citations in place.
    pub fn dangling_references(&self) -> Vec<BrokenReference<'a>> {
        self.resolved
            .dangling()
            .filter_map(|(owner, reference)| {
                self.store
                    .get_key(owner)
                    .map(|owner| BrokenReference { owner, reference })
            })
            .collect()
    }

    pub fn parents_of(&self, individual: &str) -> Vec<&'a Individual> {
        self.individuals_along(individual, EdgeLabel::ChildOf)
    }

    pub fn children_of(&self, individual: &str) -> Vec<&'a Individual> {
        self.individuals_along(individual, EdgeLabel::ParentOf)
    }

    pub fn spouses_of(&self, individual: &str) -> Vec<&'a Individual> {
        self.individuals_along(individual, EdgeLabel::SpouseOf)
    }

    /// Families listing the individual as partner or child.
    pub fn families_of(&self, individual: &str) -> Vec<&'a Family> {
        self.graph
            .neighbors(
                &NodeKey::individual(individual),
                EdgeLabel::SpouseOf | EdgeLabel::ChildOf,
                true,
            )
            .into_iter()
            .filter(|key| key.kind == EntityKind::Family)
            .filter_map(|key| self.store.record::<Family>(&key.id))
            .collect()
    }
}
