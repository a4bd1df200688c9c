//! Entity records of a GEN-JSON document.
//!
//! Every record type deserializes from the *structured* document shape. The legacy flat shape
//! (flat `full_name`, inline `birth`/`death`, untyped ID arrays) is rewritten into this shape by
//! [`crate::codec::legacy`] before deserialization, so nothing in here needs to know about it.
//!
//! The ID of a record is the key it is stored under in its section, not a field of the record
//! body. It is filled in by the ingestion step and skipped when serializing back.
//!
//! Each record type declares its cross-reference fields through [`Record::declared_references`].
//! That list is the only thing the [`crate::resolver`] looks at, so resolution treats every kind
//! uniformly.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::{
    nodekey::NodeKey,
    properties::{
        Confidence, DateType, EntityKind, ParentRole, Quality, ReferenceField, RelationshipKind,
    },
};

/// A single reference as declared by its owning record, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredRef {
    pub field: ReferenceField,
    pub target: NodeKey,
    /// Position within the declaring field. Drives sibling order during traversal.
    pub position: usize,
    pub relationship: Option<RelationshipKind>,
    pub role: Option<ParentRole>,
}

impl DeclaredRef {
    pub fn new(field: ReferenceField, target: NodeKey, position: usize) -> Self {
        DeclaredRef {
            field,
            target,
            position,
            relationship: None,
            role: None,
        }
    }
}

fn push_ids(out: &mut Vec<DeclaredRef>, field: ReferenceField, kind: EntityKind, ids: &[String]) {
    out.extend(
        ids.iter()
            .enumerate()
            .map(|(pos, id)| DeclaredRef::new(field, NodeKey::new(kind, id.as_str()), pos)),
    );
}

fn push_relationships(out: &mut Vec<DeclaredRef>, field: ReferenceField, records: &[Relationship]) {
    out.extend(records.iter().enumerate().map(|(pos, rel)| DeclaredRef {
        field,
        target: NodeKey::individual(rel.id.as_str()),
        position: pos,
        relationship: Some(rel.kind),
        role: rel.role,
    }));
}

/// Common behavior of every stored record kind.
pub trait Record {
    const KIND: EntityKind;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    fn key(&self) -> NodeKey {
        NodeKey::new(Self::KIND, self.id())
    }

    /// Short human readable label, used for tree nodes.
    fn label(&self) -> String;

    fn confidence(&self) -> Confidence {
        Confidence::Unknown
    }

    fn declared_references(&self) -> Vec<DeclaredRef>;

    /// Identity checks beyond what deserialization enforces. An `Err` rejects the record at
    /// ingestion with a malformed-entity diagnostic.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredName {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
}

impl StructuredName {
    pub fn display(&self) -> String {
        [&self.prefix, &self.given, &self.surname, &self.suffix]
            .iter()
            .filter_map(|part| part.as_deref())
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Typed relationship record pointing at another individual.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: String,
    #[serde(default, rename = "relationship", alias = "kind")]
    pub kind: RelationshipKind,
    /// Only meaningful on parent records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<ParentRole>,
}

impl Relationship {
    pub fn new(id: impl Into<String>, kind: RelationshipKind) -> Self {
        Relationship {
            id: id.into(),
            kind,
            role: None,
        }
    }

    pub fn with_role(mut self, role: ParentRole) -> Self {
        self.role = Some(role);
        self
    }
}

/// A person. At least one of the two name forms must be present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Individual {
    #[serde(skip)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<StructuredName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<Relationship>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub spouses: Vec<Relationship>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Relationship>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<String>,
    #[serde(default)]
    pub confidence: Confidence,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<String>,
}

impl Individual {
    /// Structured name when it has content, otherwise the flat name.
    pub fn display_name(&self) -> String {
        let structured = self
            .name
            .as_ref()
            .map(StructuredName::display)
            .unwrap_or_default();
        if !structured.is_empty() {
            return structured;
        }
        self.full_name
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string()
    }
}

impl Record for Individual {
    const KIND: EntityKind = EntityKind::Individual;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn label(&self) -> String {
        let name = self.display_name();
        if name.is_empty() {
            format!("(unnamed {})", self.id)
        } else {
            name
        }
    }

    fn confidence(&self) -> Confidence {
        self.confidence
    }

    fn declared_references(&self) -> Vec<DeclaredRef> {
        let mut out = Vec::new();
        push_relationships(&mut out, ReferenceField::Parents, &self.parents);
        push_relationships(&mut out, ReferenceField::Spouses, &self.spouses);
        push_relationships(&mut out, ReferenceField::Children, &self.children);
        push_ids(&mut out, ReferenceField::Events, EntityKind::Event, &self.events);
        push_ids(&mut out, ReferenceField::Sources, EntityKind::Source, &self.sources);
        push_ids(&mut out, ReferenceField::Notes, EntityKind::Note, &self.notes);
        push_ids(&mut out, ReferenceField::Media, EntityKind::Media, &self.media);
        out
    }

    fn validate(&self) -> Result<(), String> {
        if self.name.is_none() && self.full_name.is_none() {
            return Err("individual has neither a structured `name` nor a flat `full_name`".into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partner {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Family {
    #[serde(skip)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub partners: Vec<Partner>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Relationship>,
    #[serde(
        default,
        rename = "type",
        alias = "family_type",
        skip_serializing_if = "Option::is_none"
    )]
    pub family_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<String>,
    #[serde(default)]
    pub confidence: Confidence,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl Record for Family {
    const KIND: EntityKind = EntityKind::Family;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn label(&self) -> String {
        match &self.family_type {
            Some(family_type) => format!("{} ({family_type})", self.id),
            None => self.id.clone(),
        }
    }

    fn confidence(&self) -> Confidence {
        self.confidence
    }

    fn declared_references(&self) -> Vec<DeclaredRef> {
        let mut out = Vec::new();
        out.extend(self.partners.iter().enumerate().map(|(pos, partner)| {
            DeclaredRef::new(
                ReferenceField::Partners,
                NodeKey::individual(partner.id.as_str()),
                pos,
            )
        }));
        push_relationships(&mut out, ReferenceField::Children, &self.children);
        push_ids(&mut out, ReferenceField::Events, EntityKind::Event, &self.events);
        push_ids(&mut out, ReferenceField::Sources, EntityKind::Source, &self.sources);
        push_ids(&mut out, ReferenceField::Notes, EntityKind::Note, &self.notes);
        out
    }
}

/// Who an event belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    Individual(String),
    Family { id: String, participants: Vec<String> },
}

impl Subject {
    pub fn key(&self) -> NodeKey {
        match self {
            Subject::Individual(id) => NodeKey::individual(id.as_str()),
            Subject::Family { id, .. } => NodeKey::family(id.as_str()),
        }
    }

    pub fn participants(&self) -> &[String] {
        match self {
            Subject::Individual(_) => &[],
            Subject::Family { participants, .. } => participants,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateDescriptor {
    #[serde(default)]
    pub value: String,
    #[serde(default, rename = "type", alias = "date_type")]
    pub date_type: DateType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circa: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_value: Option<String>,
}

impl DateDescriptor {
    pub fn exact(value: impl Into<String>) -> Self {
        DateDescriptor {
            value: value.into(),
            ..Default::default()
        }
    }

    pub fn is_uncertain(&self) -> bool {
        self.circa.unwrap_or(false) || !matches!(self.date_type, DateType::Exact)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlaceRef {
    /// A place record, optionally with the wording the source used for it.
    Id {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        original: Option<String>,
    },
    Text { original: String },
}

/// Wire shape of an [`Event`]. The subject is spread over `individual`, `family` and
/// `participants` in the document and is checked into a [`Subject`] on conversion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub individual: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub participants: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place: Option<PlaceRef>,
    #[serde(default)]
    pub confidence: Confidence,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, Value>,
}

/// Something that happened. `event_type` is open ended (`birth`, `immigration`,
/// `land_grant`, ...) and type specific data lives in `details`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EventRecord", into = "EventRecord")]
pub struct Event {
    pub id: String,
    pub event_type: String,
    pub subject: Option<Subject>,
    pub date: Option<DateDescriptor>,
    pub place: Option<PlaceRef>,
    pub confidence: Confidence,
    pub sources: Vec<String>,
    pub notes: Vec<String>,
    pub media: Vec<String>,
    pub details: BTreeMap<String, Value>,
}

impl Event {
    pub fn is_type(&self, event_type: &str) -> bool {
        self.event_type.eq_ignore_ascii_case(event_type.trim())
    }
}

impl TryFrom<EventRecord> for Event {
    type Error = String;

    fn try_from(record: EventRecord) -> Result<Self, Self::Error> {
        if record.event_type.trim().is_empty() {
            return Err("event `type` must not be empty".to_string());
        }
        let subject = match (record.individual, record.family) {
            (Some(_), Some(_)) => {
                return Err("event names both an `individual` and a `family` subject".to_string())
            }
            (Some(individual), None) => {
                if !record.participants.is_empty() {
                    return Err("`participants` require a `family` subject".to_string());
                }
                Some(Subject::Individual(individual))
            }
            (None, Some(family)) => Some(Subject::Family {
                id: family,
                participants: record.participants,
            }),
            (None, None) => {
                if !record.participants.is_empty() {
                    return Err("`participants` require a `family` subject".to_string());
                }
                None
            }
        };
        Ok(Event {
            id: String::new(),
            event_type: record.event_type,
            subject,
            date: record.date,
            place: record.place,
            confidence: record.confidence,
            sources: record.sources,
            notes: record.notes,
            media: record.media,
            details: record.details,
        })
    }
}

impl From<Event> for EventRecord {
    fn from(event: Event) -> Self {
        let (individual, family, participants) = match event.subject {
            Some(Subject::Individual(id)) => (Some(id), None, vec![]),
            Some(Subject::Family { id, participants }) => (None, Some(id), participants),
            None => (None, None, vec![]),
        };
        EventRecord {
            event_type: event.event_type,
            individual,
            family,
            participants,
            date: event.date,
            place: event.place,
            confidence: event.confidence,
            sources: event.sources,
            notes: event.notes,
            media: event.media,
            details: event.details,
        }
    }
}

impl Record for Event {
    const KIND: EntityKind = EntityKind::Event;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn label(&self) -> String {
        match self.date.as_ref().filter(|date| !date.value.is_empty()) {
            Some(date) => format!("{} {}", self.event_type, date.value),
            None => self.event_type.clone(),
        }
    }

    fn confidence(&self) -> Confidence {
        self.confidence
    }

    fn declared_references(&self) -> Vec<DeclaredRef> {
        let mut out = Vec::new();
        if let Some(subject) = &self.subject {
            out.push(DeclaredRef::new(ReferenceField::Subject, subject.key(), 0));
            push_ids(
                &mut out,
                ReferenceField::Participants,
                EntityKind::Individual,
                subject.participants(),
            );
        }
        if let Some(PlaceRef::Id { id, .. }) = &self.place {
            out.push(DeclaredRef::new(
                ReferenceField::Place,
                NodeKey::place(id.as_str()),
                0,
            ));
        }
        push_ids(&mut out, ReferenceField::Sources, EntityKind::Source, &self.sources);
        push_ids(&mut out, ReferenceField::Notes, EntityKind::Note, &self.notes);
        push_ids(&mut out, ReferenceField::Media, EntityKind::Media, &self.media);
        out
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceComponents {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Place {
    #[serde(skip)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<PlaceComponents>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub historical_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl Record for Place {
    const KIND: EntityKind = EntityKind::Place;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn label(&self) -> String {
        if self.name.is_empty() {
            self.id.clone()
        } else {
            self.name.clone()
        }
    }

    fn declared_references(&self) -> Vec<DeclaredRef> {
        let mut out = Vec::new();
        push_ids(&mut out, ReferenceField::Sources, EntityKind::Source, &self.sources);
        push_ids(&mut out, ReferenceField::Notes, EntityKind::Note, &self.notes);
        out
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    #[serde(skip)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(default)]
    pub quality: Quality,
    #[serde(default)]
    pub confidence: Confidence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl Record for Source {
    const KIND: EntityKind = EntityKind::Source;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn label(&self) -> String {
        if self.title.is_empty() {
            self.id.clone()
        } else {
            self.title.clone()
        }
    }

    fn confidence(&self) -> Confidence {
        self.confidence
    }

    fn declared_references(&self) -> Vec<DeclaredRef> {
        let mut out = Vec::new();
        if let Some(repository) = &self.repository {
            out.push(DeclaredRef::new(
                ReferenceField::Repository,
                NodeKey::new(EntityKind::Repository, repository.as_str()),
                0,
            ));
        }
        push_ids(&mut out, ReferenceField::Media, EntityKind::Media, &self.media);
        push_ids(&mut out, ReferenceField::Notes, EntityKind::Note, &self.notes);
        out
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    #[serde(skip)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl Record for Repository {
    const KIND: EntityKind = EntityKind::Repository;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn label(&self) -> String {
        if self.name.is_empty() {
            self.id.clone()
        } else {
            self.name.clone()
        }
    }

    fn declared_references(&self) -> Vec<DeclaredRef> {
        let mut out = Vec::new();
        push_ids(&mut out, ReferenceField::Notes, EntityKind::Note, &self.notes);
        out
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    #[serde(skip)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, alias = "file", alias = "url", skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl Record for Media {
    const KIND: EntityKind = EntityKind::Media;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn label(&self) -> String {
        self.title
            .clone()
            .or_else(|| self.path.clone())
            .unwrap_or_else(|| self.id.clone())
    }

    fn declared_references(&self) -> Vec<DeclaredRef> {
        let mut out = Vec::new();
        push_ids(&mut out, ReferenceField::Sources, EntityKind::Source, &self.sources);
        push_ids(&mut out, ReferenceField::Notes, EntityKind::Note, &self.notes);
        out
    }
}

/// Free text attached to other records. `related_to` keys are entity kinds, singular or
/// plural (`individuals`, `event`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    #[serde(skip)]
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(
        default,
        deserialize_with = "merge_related",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub related_to: BTreeMap<NoteTarget, Vec<String>>,
}

/// Singular and plural spellings of a `related_to` key name the same target; their ID lists
/// are concatenated instead of one replacing the other.
fn merge_related<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<NoteTarget, Vec<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    let raw = serde_json::Map::<String, Value>::deserialize(deserializer)?;
    let mut merged: BTreeMap<NoteTarget, Vec<String>> = BTreeMap::new();
    for (key, ids) in raw {
        let target: NoteTarget =
            serde_json::from_value(Value::String(key)).map_err(D::Error::custom)?;
        let ids: Vec<String> = serde_json::from_value(ids).map_err(D::Error::custom)?;
        merged.entry(target).or_default().extend(ids);
    }
    Ok(merged)
}

/// Key of a note's `related_to` mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteTarget {
    #[serde(alias = "individual")]
    Individuals,
    #[serde(alias = "family")]
    Families,
    #[serde(alias = "event")]
    Events,
    #[serde(alias = "place")]
    Places,
    #[serde(alias = "source")]
    Sources,
    #[serde(alias = "repository")]
    Repositories,
    Media,
    #[serde(alias = "note")]
    Notes,
}

impl From<NoteTarget> for EntityKind {
    fn from(target: NoteTarget) -> Self {
        match target {
            NoteTarget::Individuals => EntityKind::Individual,
            NoteTarget::Families => EntityKind::Family,
            NoteTarget::Events => EntityKind::Event,
            NoteTarget::Places => EntityKind::Place,
            NoteTarget::Sources => EntityKind::Source,
            NoteTarget::Repositories => EntityKind::Repository,
            NoteTarget::Media => EntityKind::Media,
            NoteTarget::Notes => EntityKind::Note,
        }
    }
}

impl Record for Note {
    const KIND: EntityKind = EntityKind::Note;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn label(&self) -> String {
        let first_line = self.text.lines().next().unwrap_or_default().trim();
        if first_line.is_empty() {
            return self.id.clone();
        }
        match first_line.char_indices().nth(48) {
            Some((cut, _)) => format!("{}...", &first_line[..cut]),
            None => first_line.to_string(),
        }
    }

    fn declared_references(&self) -> Vec<DeclaredRef> {
        let mut out = Vec::new();
        for (target, ids) in &self.related_to {
            push_ids(&mut out, ReferenceField::RelatedTo, (*target).into(), ids);
        }
        out
    }
}

/// Borrowed view of any stored record, as returned by [`crate::store::RecordStore::get`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Entity<'a> {
    Individual(&'a Individual),
    Family(&'a Family),
    Event(&'a Event),
    Place(&'a Place),
    Source(&'a Source),
    Repository(&'a Repository),
    Media(&'a Media),
    Note(&'a Note),
}

macro_rules! with_record {
    ($entity:expr, $record:ident => $body:expr) => {
        match $entity {
            Entity::Individual($record) => $body,
            Entity::Family($record) => $body,
            Entity::Event($record) => $body,
            Entity::Place($record) => $body,
            Entity::Source($record) => $body,
            Entity::Repository($record) => $body,
            Entity::Media($record) => $body,
            Entity::Note($record) => $body,
        }
    };
}

impl<'a> Entity<'a> {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Individual(_) => EntityKind::Individual,
            Entity::Family(_) => EntityKind::Family,
            Entity::Event(_) => EntityKind::Event,
            Entity::Place(_) => EntityKind::Place,
            Entity::Source(_) => EntityKind::Source,
            Entity::Repository(_) => EntityKind::Repository,
            Entity::Media(_) => EntityKind::Media,
            Entity::Note(_) => EntityKind::Note,
        }
    }

    pub fn id(&self) -> &'a str {
        with_record!(*self, record => record.id())
    }

    pub fn key(&self) -> NodeKey {
        with_record!(self, record => record.key())
    }

    pub fn label(&self) -> String {
        with_record!(self, record => record.label())
    }

    pub fn confidence(&self) -> Confidence {
        with_record!(self, record => record.confidence())
    }

    pub fn declared_references(&self) -> Vec<DeclaredRef> {
        with_record!(self, record => record.declared_references())
    }

    pub fn as_individual(&self) -> Option<&'a Individual> {
        match self {
            Entity::Individual(individual) => Some(individual),
            _ => None,
        }
    }

    pub fn as_event(&self) -> Option<&'a Event> {
        match self {
            Entity::Event(event) => Some(event),
            _ => None,
        }
    }

    pub fn as_source(&self) -> Option<&'a Source> {
        match self {
            Entity::Source(source) => Some(source),
            _ => None,
        }
    }

    pub fn as_note(&self) -> Option<&'a Note> {
        match self {
            Entity::Note(note) => Some(note),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn structured_name_wins_over_flat_name() {
        let individual: Individual = serde_json::from_value(json!({
            "name": {"given": "Johann", "surname": "Dör"},
            "full_name": "John Doe"
        }))
        .unwrap();
        assert_eq!(individual.display_name(), "Johann Dör");

        let flat: Individual = serde_json::from_value(json!({"full_name": " John Doe "})).unwrap();
        assert_eq!(flat.display_name(), "John Doe");
    }

    #[test]
    fn individual_without_any_name_is_invalid() {
        let individual: Individual = serde_json::from_value(json!({"sex": "F"})).unwrap();
        assert!(individual.validate().is_err());
        assert_eq!(individual.confidence, Confidence::Unknown);
    }

    #[test]
    fn relationship_records_default_to_unknown() {
        let individual: Individual = serde_json::from_value(json!({
            "full_name": "A",
            "parents": [{"id": "I3", "relationship": "adoptive", "role": "mother"}, {"id": "I4"}]
        }))
        .unwrap();
        assert_eq!(individual.parents[0].kind, RelationshipKind::Adoptive);
        assert_eq!(individual.parents[0].role, Some(ParentRole::Mother));
        assert_eq!(individual.parents[1].kind, RelationshipKind::Unknown);
        assert_eq!(individual.parents[1].role, None);
    }

    #[test]
    fn event_subject_shapes() {
        let single: Event = serde_json::from_value(json!({
            "type": "immigration",
            "individual": "I1",
            "date": {"value": "1920", "type": "approximate", "circa": true},
            "details": {"ship": "SS Kroonland"}
        }))
        .unwrap();
        assert_eq!(single.subject, Some(Subject::Individual("I1".to_string())));
        assert!(single.date.as_ref().unwrap().is_uncertain());
        assert_eq!(single.details["ship"], json!("SS Kroonland"));

        let family: Event = serde_json::from_value(json!({
            "type": "marriage",
            "family": "F1",
            "participants": ["I1", "I2"]
        }))
        .unwrap();
        let subject = family.subject.unwrap();
        assert_eq!(subject.key(), NodeKey::family("F1"));
        assert_eq!(subject.participants(), ["I1".to_string(), "I2".to_string()]);

        let both = serde_json::from_value::<Event>(json!({
            "type": "birth", "individual": "I1", "family": "F1"
        }));
        assert!(both.is_err());

        let missing_type = serde_json::from_value::<Event>(json!({"individual": "I1"}));
        assert!(missing_type.is_err());
    }

    #[test]
    fn event_serializes_back_to_wire_shape() {
        let event: Event = serde_json::from_value(json!({
            "type": "marriage",
            "family": "F1",
            "participants": ["I1"],
            "place": {"original": "Boston"}
        }))
        .unwrap();
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["family"], json!("F1"));
        assert_eq!(value["participants"], json!(["I1"]));
        assert_eq!(value["place"], json!({"original": "Boston"}));
        assert!(value.get("id").is_none());
    }

    #[test]
    fn declared_references_cover_every_field() {
        let event: Event = serde_json::from_value(json!({
            "type": "census",
            "family": "F1",
            "participants": ["I1", "I2"],
            "place": {"id": "P1"},
            "sources": ["S1"],
            "notes": ["N1"],
            "media": ["M1"]
        }))
        .unwrap();
        let fields = event
            .declared_references()
            .into_iter()
            .map(|r| r.field)
            .collect::<Vec<_>>();
        assert_eq!(
            fields,
            vec![
                ReferenceField::Subject,
                ReferenceField::Participants,
                ReferenceField::Participants,
                ReferenceField::Place,
                ReferenceField::Sources,
                ReferenceField::Notes,
                ReferenceField::Media,
            ]
        );

        let note: Note = serde_json::from_value(json!({
            "text": "Family bible entry",
            "related_to": {"individuals": ["I1"], "event": ["E1"]}
        }))
        .unwrap();
        let targets = note
            .declared_references()
            .into_iter()
            .map(|r| r.target)
            .collect::<Vec<_>>();
        assert_eq!(targets, vec![NodeKey::individual("I1"), NodeKey::event("E1")]);
    }

    #[test]
    fn source_tiers_default_to_unknown() {
        let source: Source = serde_json::from_value(json!({"title": "Passenger Manifest"})).unwrap();
        assert_eq!(source.quality, Quality::Unknown);
        assert_eq!(source.confidence, Confidence::Unknown);

        let graded: Source =
            serde_json::from_value(json!({"title": "Parish register", "quality": "primary"}))
                .unwrap();
        assert_eq!(graded.quality, Quality::Primary);
    }

    #[test]
    fn place_reference_keeps_source_wording() {
        let event: Event = serde_json::from_value(json!({
            "type": "birth",
            "individual": "I1",
            "place": {"id": "P1", "original": "Corke"}
        }))
        .unwrap();
        assert_eq!(
            event.place,
            Some(PlaceRef::Id {
                id: "P1".to_string(),
                original: Some("Corke".to_string())
            })
        );
        let wire = serde_json::to_value(&event).unwrap();
        assert_eq!(wire["place"], json!({"id": "P1", "original": "Corke"}));
    }

    #[test]
    fn note_target_spellings_are_merged() {
        let note: Note = serde_json::from_value(json!({
            "text": "Two spellings",
            "related_to": {"individual": ["I1"], "individuals": ["I2"], "events": ["E1"]}
        }))
        .unwrap();
        assert_eq!(
            note.related_to[&NoteTarget::Individuals],
            vec!["I1".to_string(), "I2".to_string()]
        );
        assert_eq!(note.declared_references().len(), 3);
        assert!(serde_json::from_value::<Note>(json!({"related_to": {"people": ["I1"]}})).is_err());
    }
}
