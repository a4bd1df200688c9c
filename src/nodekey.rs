/// [crate::nodekey] contains [NodeKey], the kind-scoped identity of every entity in a
/// [crate::store::RecordStore] and every node of a [crate::graph::KinshipGraph].
use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use crate::{properties::EntityKind, GenJsonError};

/// IDs are only unique within their kind, so lookups always carry both halves.
#[derive(Debug, Clone, Serialize, Deserialize, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct NodeKey {
    pub kind: EntityKind,
    pub id: String,
}

impl NodeKey {
    pub fn new(kind: EntityKind, id: impl Into<String>) -> Self {
        NodeKey {
            kind,
            id: id.into(),
        }
    }

    pub fn individual(id: impl Into<String>) -> Self {
        NodeKey::new(EntityKind::Individual, id)
    }

    pub fn family(id: impl Into<String>) -> Self {
        NodeKey::new(EntityKind::Family, id)
    }

    pub fn event(id: impl Into<String>) -> Self {
        NodeKey::new(EntityKind::Event, id)
    }

    pub fn place(id: impl Into<String>) -> Self {
        NodeKey::new(EntityKind::Place, id)
    }

    pub fn source(id: impl Into<String>) -> Self {
        NodeKey::new(EntityKind::Source, id)
    }

    pub fn note(id: impl Into<String>) -> Self {
        NodeKey::new(EntityKind::Note, id)
    }

    /// Guess the kind from the conventional ID prefix (`I12` is an individual). Only used for
    /// user supplied keys; document references always know their target kind from the field.
    pub fn infer(id: &str) -> Option<NodeKey> {
        let prefix = id.trim().chars().next()?;
        EntityKind::from_prefix(prefix).map(|kind| NodeKey::new(kind, id.trim()))
    }

    pub fn is_individual(&self) -> bool {
        self.kind == EntityKind::Individual
    }
}

impl Display for NodeKey {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Parses either `kind:id` (`individual:I1`, `events:E4`) or a bare prefixed ID (`I1`).
impl FromStr for NodeKey {
    type Err = GenJsonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((kind, id)) if !id.trim().is_empty() => {
                let kind = kind
                    .parse::<EntityKind>()
                    .map_err(|_| GenJsonError::InvalidKey(s.to_string()))?;
                Ok(NodeKey::new(kind, id.trim()))
            }
            Some(_) => Err(GenJsonError::InvalidKey(s.to_string())),
            None => NodeKey::infer(s).ok_or_else(|| GenJsonError::InvalidKey(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scoped_and_bare_keys() {
        assert_eq!(
            "individual:I1".parse::<NodeKey>().unwrap(),
            NodeKey::individual("I1")
        );
        assert_eq!("events:E4".parse::<NodeKey>().unwrap(), NodeKey::event("E4"));
        assert_eq!("F2".parse::<NodeKey>().unwrap(), NodeKey::family("F2"));
        assert!("individual:".parse::<NodeKey>().is_err());
        assert!("X9".parse::<NodeKey>().is_err());
        assert!("planet:P1".parse::<NodeKey>().is_err());
    }

    #[test]
    fn cross_kind_ids_are_distinct() {
        let person = NodeKey::individual("X1");
        let event = NodeKey::event("X1");
        assert_ne!(person, event);
        assert_eq!(person.to_string(), "individual:X1");
        assert_eq!(
            person.to_string().parse::<NodeKey>().unwrap(),
            person,
            "display output parses back"
        );
    }
}
