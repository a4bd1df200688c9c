//! The record store: one ID-keyed table per entity kind. Pure data, lookup only.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::{
    entity::{Entity, Event, Family, Individual, Media, Note, Place, Record, Repository, Source},
    nodekey::NodeKey,
    properties::EntityKind,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecordStore {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    individuals: BTreeMap<String, Individual>,
    families: BTreeMap<String, Family>,
    events: BTreeMap<String, Event>,
    places: BTreeMap<String, Place>,
    sources: BTreeMap<String, Source>,
    repositories: BTreeMap<String, Repository>,
    media: BTreeMap<String, Media>,
    notes: BTreeMap<String, Note>,
}

/// Records that own a table inside the [RecordStore].
pub trait Stored: Record + Sized + 'static {
    fn table(store: &RecordStore) -> &BTreeMap<String, Self>;
    fn table_mut(store: &mut RecordStore) -> &mut BTreeMap<String, Self>;
}

macro_rules! stored {
    ($record:ty, $field:ident) => {
        impl Stored for $record {
            fn table(store: &RecordStore) -> &BTreeMap<String, Self> {
                &store.$field
            }

            fn table_mut(store: &mut RecordStore) -> &mut BTreeMap<String, Self> {
                &mut store.$field
            }
        }
    };
}

stored!(Individual, individuals);
stored!(Family, families);
stored!(Event, events);
stored!(Place, places);
stored!(Source, sources);
stored!(Repository, repositories);
stored!(Media, media);
stored!(Note, notes);

impl RecordStore {
    pub fn new() -> Self {
        RecordStore::default()
    }

    /// Insert a record under its own ID. Returns the record it replaced, if any.
    pub fn insert<R: Stored>(&mut self, record: R) -> Option<R> {
        R::table_mut(self).insert(record.id().to_string(), record)
    }

    pub fn get(&self, kind: EntityKind, id: &str) -> Option<Entity<'_>> {
        match kind {
            EntityKind::Individual => self.individuals.get(id).map(Entity::Individual),
            EntityKind::Family => self.families.get(id).map(Entity::Family),
            EntityKind::Event => self.events.get(id).map(Entity::Event),
            EntityKind::Place => self.places.get(id).map(Entity::Place),
            EntityKind::Source => self.sources.get(id).map(Entity::Source),
            EntityKind::Repository => self.repositories.get(id).map(Entity::Repository),
            EntityKind::Media => self.media.get(id).map(Entity::Media),
            EntityKind::Note => self.notes.get(id).map(Entity::Note),
        }
    }

    pub fn get_key(&self, key: &NodeKey) -> Option<Entity<'_>> {
        self.get(key.kind, &key.id)
    }

    pub fn contains(&self, key: &NodeKey) -> bool {
        match key.kind {
            EntityKind::Individual => self.individuals.contains_key(&key.id),
            EntityKind::Family => self.families.contains_key(&key.id),
            EntityKind::Event => self.events.contains_key(&key.id),
            EntityKind::Place => self.places.contains_key(&key.id),
            EntityKind::Source => self.sources.contains_key(&key.id),
            EntityKind::Repository => self.repositories.contains_key(&key.id),
            EntityKind::Media => self.media.contains_key(&key.id),
            EntityKind::Note => self.notes.contains_key(&key.id),
        }
    }

    pub fn all_ids(&self, kind: EntityKind) -> BTreeSet<&str> {
        fn ids<R>(table: &BTreeMap<String, R>) -> BTreeSet<&str> {
            table.keys().map(String::as_str).collect()
        }
        match kind {
            EntityKind::Individual => ids(&self.individuals),
            EntityKind::Family => ids(&self.families),
            EntityKind::Event => ids(&self.events),
            EntityKind::Place => ids(&self.places),
            EntityKind::Source => ids(&self.sources),
            EntityKind::Repository => ids(&self.repositories),
            EntityKind::Media => ids(&self.media),
            EntityKind::Note => ids(&self.notes),
        }
    }

    /// Typed lookup, e.g. `store.record::<Event>("E1")`.
    pub fn record<R: Stored>(&self, id: &str) -> Option<&R> {
        R::table(self).get(id)
    }

    pub fn records<R: Stored>(&self) -> impl Iterator<Item = &R> {
        R::table(self).values()
    }

    pub fn individual(&self, id: &str) -> Option<&Individual> {
        self.individuals.get(id)
    }

    pub fn event(&self, id: &str) -> Option<&Event> {
        self.events.get(id)
    }

    pub fn source(&self, id: &str) -> Option<&Source> {
        self.sources.get(id)
    }

    pub fn note(&self, id: &str) -> Option<&Note> {
        self.notes.get(id)
    }

    /// Every record, kind by kind in [EntityKind::all] order, IDs ascending within a kind.
    pub fn entities(&self) -> impl Iterator<Item = Entity<'_>> {
        self.individuals
            .values()
            .map(Entity::Individual)
            .chain(self.families.values().map(Entity::Family))
            .chain(self.events.values().map(Entity::Event))
            .chain(self.places.values().map(Entity::Place))
            .chain(self.sources.values().map(Entity::Source))
            .chain(self.repositories.values().map(Entity::Repository))
            .chain(self.media.values().map(Entity::Media))
            .chain(self.notes.values().map(Entity::Note))
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Individual => self.individuals.len(),
            EntityKind::Family => self.families.len(),
            EntityKind::Event => self.events.len(),
            EntityKind::Place => self.places.len(),
            EntityKind::Source => self.sources.len(),
            EntityKind::Repository => self.repositories.len(),
            EntityKind::Media => self.media.len(),
            EntityKind::Note => self.notes.len(),
        }
    }

    pub fn len(&self) -> usize {
        EntityKind::all().iter().map(|kind| self.count(*kind)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
