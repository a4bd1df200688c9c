//! [crate::properties] contains the closed vocabularies shared by the entity model, the
//! relationship graph and the query engine.
pub use enumset::EnumSet;
use enumset::EnumSetType;
use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use crate::error::GenJsonError;

/// The eight record namespaces of a document. IDs are unique within a kind, so `I1` and `E1`
/// may coexist, and so may an individual and an event that both happen to be called `X1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Individual,
    Family,
    Event,
    Place,
    Source,
    Repository,
    Media,
    Note,
}

impl EntityKind {
    pub fn all() -> &'static [EntityKind] {
        &[
            EntityKind::Individual,
            EntityKind::Family,
            EntityKind::Event,
            EntityKind::Place,
            EntityKind::Source,
            EntityKind::Repository,
            EntityKind::Media,
            EntityKind::Note,
        ]
    }

    /// Name of the top level document section holding this kind.
    pub fn section(&self) -> &'static str {
        match self {
            EntityKind::Individual => "individuals",
            EntityKind::Family => "families",
            EntityKind::Event => "events",
            EntityKind::Place => "places",
            EntityKind::Source => "sources",
            EntityKind::Repository => "repositories",
            EntityKind::Media => "media",
            EntityKind::Note => "notes",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Individual => "individual",
            EntityKind::Family => "family",
            EntityKind::Event => "event",
            EntityKind::Place => "place",
            EntityKind::Source => "source",
            EntityKind::Repository => "repository",
            EntityKind::Media => "media",
            EntityKind::Note => "note",
        }
    }

    /// Conventional ID prefix (`I1`, `F3`, `E12`, ...).
    pub fn prefix(&self) -> char {
        match self {
            EntityKind::Individual => 'I',
            EntityKind::Family => 'F',
            EntityKind::Event => 'E',
            EntityKind::Place => 'P',
            EntityKind::Source => 'S',
            EntityKind::Repository => 'R',
            EntityKind::Media => 'M',
            EntityKind::Note => 'N',
        }
    }

    pub fn from_prefix(prefix: char) -> Option<EntityKind> {
        EntityKind::all()
            .iter()
            .copied()
            .find(|kind| kind.prefix() == prefix.to_ascii_uppercase())
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Accepts both the singular kind name and the plural section name, as used by the keys of a
/// note's `related_to` mapping.
impl FromStr for EntityKind {
    type Err = GenJsonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        EntityKind::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str() == lowered || kind.section() == lowered)
            .ok_or_else(|| GenJsonError::InvalidKey(s.to_string()))
    }
}

/// Ordinal data-quality marker. Variant order is the tier order: `Unknown < Low < Medium < High`.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    #[default]
    Unknown,
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn at_least(&self, tier: Confidence) -> bool {
        *self >= tier
    }
}

impl Display for Confidence {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let name = match self {
            Confidence::Unknown => "unknown",
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        };
        write!(f, "{name}")
    }
}

impl FromStr for Confidence {
    type Err = GenJsonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unknown" => Ok(Confidence::Unknown),
            "low" => Ok(Confidence::Low),
            "medium" => Ok(Confidence::Medium),
            "high" => Ok(Confidence::High),
            _ => Err(GenJsonError::Serialization(format!(
                "'{s}' is not a confidence tier (unknown, low, medium, high)"
            ))),
        }
    }
}

/// Evidence tier of a source.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Primary,
    Secondary,
    Tertiary,
    #[default]
    Unknown,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipKind {
    Biological,
    Adoptive,
    Step,
    Foster,
    #[default]
    Unknown,
}

impl Display for RelationshipKind {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", format!("{self:?}").to_lowercase())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParentRole {
    Father,
    Mother,
    #[default]
    Parent,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateType {
    #[default]
    Exact,
    Approximate,
    Before,
    After,
    Between,
    From,
    To,
    Calculated,
}

impl DateType {
    /// Types whose descriptor carries a second bound in `end_value`.
    pub fn is_range(&self) -> bool {
        matches!(self, DateType::Between | DateType::From)
    }
}

/// Typed relation between two entity nodes in the [`crate::graph::KinshipGraph`].
#[derive(Debug, PartialOrd, Ord, Hash, Serialize, Deserialize, EnumSetType)]
#[serde(rename_all = "snake_case")]
pub enum EdgeLabel {
    ParentOf,
    ChildOf,
    SpouseOf,
    ParticipatesIn,
    Cites,
    LocatedAt,
    DocumentedBy,
}

pub type EdgeLabelSet = EnumSet<EdgeLabel>;

impl EdgeLabel {
    /// Label carried by the materialized back-edge of a declared edge.
    pub fn inverse(&self) -> EdgeLabel {
        match self {
            EdgeLabel::ParentOf => EdgeLabel::ChildOf,
            EdgeLabel::ChildOf => EdgeLabel::ParentOf,
            other => *other,
        }
    }

    pub fn kinship() -> EdgeLabelSet {
        EdgeLabel::ParentOf | EdgeLabel::ChildOf | EdgeLabel::SpouseOf
    }
}

impl Display for EdgeLabel {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let name = match self {
            EdgeLabel::ParentOf => "parent_of",
            EdgeLabel::ChildOf => "child_of",
            EdgeLabel::SpouseOf => "spouse_of",
            EdgeLabel::ParticipatesIn => "participates_in",
            EdgeLabel::Cites => "cites",
            EdgeLabel::LocatedAt => "located_at",
            EdgeLabel::DocumentedBy => "documented_by",
        };
        write!(f, "{name}")
    }
}

/// The cross-reference fields an entity kind may declare. Each field maps to exactly one
/// [`EdgeLabel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceField {
    Parents,
    Spouses,
    Children,
    Partners,
    Events,
    Subject,
    Participants,
    Sources,
    Repository,
    Place,
    Notes,
    Media,
    RelatedTo,
}

impl ReferenceField {
    pub fn label(&self) -> EdgeLabel {
        match self {
            ReferenceField::Parents => EdgeLabel::ChildOf,
            ReferenceField::Children => EdgeLabel::ParentOf,
            ReferenceField::Spouses | ReferenceField::Partners => EdgeLabel::SpouseOf,
            ReferenceField::Events | ReferenceField::Subject | ReferenceField::Participants => {
                EdgeLabel::ParticipatesIn
            }
            ReferenceField::Sources | ReferenceField::Repository => EdgeLabel::Cites,
            ReferenceField::Place => EdgeLabel::LocatedAt,
            ReferenceField::Notes | ReferenceField::Media | ReferenceField::RelatedTo => {
                EdgeLabel::DocumentedBy
            }
        }
    }

    /// The field a target individual is expected to declare back for a kinship field.
    pub fn reciprocal(&self) -> Option<ReferenceField> {
        match self {
            ReferenceField::Parents => Some(ReferenceField::Children),
            ReferenceField::Children => Some(ReferenceField::Parents),
            ReferenceField::Spouses => Some(ReferenceField::Spouses),
            _ => None,
        }
    }
}

impl Display for ReferenceField {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let name = match self {
            ReferenceField::Parents => "parents",
            ReferenceField::Spouses => "spouses",
            ReferenceField::Children => "children",
            ReferenceField::Partners => "partners",
            ReferenceField::Events => "events",
            ReferenceField::Subject => "subject",
            ReferenceField::Participants => "participants",
            ReferenceField::Sources => "sources",
            ReferenceField::Repository => "repository",
            ReferenceField::Place => "place",
            ReferenceField::Notes => "notes",
            ReferenceField::Media => "media",
            ReferenceField::RelatedTo => "related_to",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_tiers_are_ordered() {
        assert!(Confidence::Unknown < Confidence::Low);
        assert!(Confidence::Low < Confidence::Medium);
        assert!(Confidence::Medium < Confidence::High);
        assert!(Confidence::High.at_least(Confidence::Medium));
        assert!(!Confidence::Unknown.at_least(Confidence::Low));
        assert_eq!(Confidence::default(), Confidence::Unknown);
    }

    #[test]
    fn entity_kind_parses_singular_and_plural() {
        assert_eq!("individuals".parse::<EntityKind>().unwrap(), EntityKind::Individual);
        assert_eq!("Family".parse::<EntityKind>().unwrap(), EntityKind::Family);
        assert_eq!("media".parse::<EntityKind>().unwrap(), EntityKind::Media);
        assert!("people".parse::<EntityKind>().is_err());
        assert_eq!(EntityKind::from_prefix('e'), Some(EntityKind::Event));
        assert_eq!(EntityKind::from_prefix('X'), None);
    }

    #[test]
    fn back_edges_invert_only_parentage() {
        assert_eq!(EdgeLabel::ParentOf.inverse(), EdgeLabel::ChildOf);
        assert_eq!(EdgeLabel::ChildOf.inverse(), EdgeLabel::ParentOf);
        assert_eq!(EdgeLabel::SpouseOf.inverse(), EdgeLabel::SpouseOf);
        assert_eq!(EdgeLabel::Cites.inverse(), EdgeLabel::Cites);
        assert!(EdgeLabel::kinship().contains(EdgeLabel::SpouseOf));
        assert!(!EdgeLabel::kinship().contains(EdgeLabel::Cites));
    }

    #[test]
    fn kinship_fields_are_reciprocal() {
        assert_eq!(ReferenceField::Parents.reciprocal(), Some(ReferenceField::Children));
        assert_eq!(ReferenceField::Spouses.reciprocal(), Some(ReferenceField::Spouses));
        assert_eq!(ReferenceField::Sources.reciprocal(), None);
        assert_eq!(ReferenceField::Parents.label(), EdgeLabel::ChildOf);
        assert_eq!(ReferenceField::RelatedTo.label(), EdgeLabel::DocumentedBy);
    }
}
