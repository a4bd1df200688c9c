//! Diagnostic types for document ingestion and reference resolution.
//!
//! Genealogical data is incomplete by nature, so almost nothing found while loading a document
//! is fatal. Broken references, self references, one-sided relationships and rejected records are
//! collected as [`Diagnostic`]s on the built session instead of aborting the load.

use serde::Serialize;

use crate::{
    nodekey::NodeKey,
    properties::{ReferenceField, RelationshipKind},
};

/// A single reference that did not resolve to another record.
///
/// # Examples
///
/// ```
/// # use genjson::{nodekey::NodeKey, properties::ReferenceField, codec::ReferenceIssue};
/// // I1 cites a source that is not in the document:
/// let issue = ReferenceIssue {
///     owner: NodeKey::individual("I1"),
///     field: ReferenceField::Sources,
///     target: NodeKey::source("S404"),
/// };
/// assert_eq!(issue.to_string(), "individual:I1.sources -> source:S404");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceIssue {
    /// The record declaring the reference
    pub owner: NodeKey,

    /// The field the reference was declared in
    pub field: ReferenceField,

    /// The key the reference points at
    pub target: NodeKey,
}

impl ReferenceIssue {
    pub fn new(owner: NodeKey, field: ReferenceField, target: NodeKey) -> Self {
        Self {
            owner,
            field,
            target,
        }
    }
}

impl std::fmt::Display for ReferenceIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{} -> {}", self.owner, self.field, self.target)
    }
}

/// Diagnostic information produced while ingesting and resolving a document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Diagnostic {
    /// The target ID does not exist in the target kind's table. The owning record is kept and
    /// the reference stays visible (marked dangling) to queries.
    DanglingReference(ReferenceIssue),

    /// A record references its own ID. The minimal cycle; never materialized as a graph edge.
    SelfReference(ReferenceIssue),

    /// A kinship reference the target does not declare back (A lists B as a child, but B does
    /// not list A as a parent). Navigation still works through back-edges.
    AsymmetricRelationship {
        declared_by: NodeKey,
        target: NodeKey,
        field: ReferenceField,
    },

    /// Relationship records between the same pair of individuals disagree on the kind of
    /// relationship. Both are kept; nothing is resolved.
    ConflictingRelationship {
        from: NodeKey,
        to: NodeKey,
        kinds: Vec<RelationshipKind>,
    },

    /// A record was rejected at ingestion. The rest of the document still loads.
    MalformedEntity { key: NodeKey, message: String },

    /// A non-fatal problem that does not fit the variants above
    Warning(String),

    /// An informational message about the load
    Info(String),
}

impl Diagnostic {
    pub fn dangling(owner: NodeKey, field: ReferenceField, target: NodeKey) -> Self {
        Self::DanglingReference(ReferenceIssue::new(owner, field, target))
    }

    pub fn self_reference(owner: NodeKey, field: ReferenceField) -> Self {
        let target = owner.clone();
        Self::SelfReference(ReferenceIssue::new(owner, field, target))
    }

    pub fn malformed(key: NodeKey, message: impl Into<String>) -> Self {
        Self::MalformedEntity {
            key,
            message: message.into(),
        }
    }

    /// Create a warning diagnostic
    pub fn warning(message: impl Into<String>) -> Self {
        Self::Warning(message.into())
    }

    /// Create an info diagnostic
    pub fn info(message: impl Into<String>) -> Self {
        Self::Info(message.into())
    }

    pub fn is_dangling(&self) -> bool {
        matches!(self, Self::DanglingReference(_))
    }

    pub fn is_self_reference(&self) -> bool {
        matches!(self, Self::SelfReference(_))
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedEntity { .. })
    }

    /// Get the reference issue if this is a dangling or self reference
    pub fn as_reference_issue(&self) -> Option<&ReferenceIssue> {
        match self {
            Self::DanglingReference(issue) | Self::SelfReference(issue) => Some(issue),
            _ => None,
        }
    }

    /// The record this diagnostic is about, when there is one.
    pub fn subject(&self) -> Option<&NodeKey> {
        match self {
            Self::DanglingReference(issue) | Self::SelfReference(issue) => Some(&issue.owner),
            Self::AsymmetricRelationship { declared_by, .. } => Some(declared_by),
            Self::ConflictingRelationship { from, .. } => Some(from),
            Self::MalformedEntity { key, .. } => Some(key),
            Self::Warning(_) | Self::Info(_) => None,
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DanglingReference(issue) => write!(f, "Dangling reference: {issue}"),
            Self::SelfReference(issue) => write!(f, "Self reference: {issue}"),
            Self::AsymmetricRelationship {
                declared_by,
                target,
                field,
            } => write!(
                f,
                "Asymmetric relationship: {declared_by} lists {target} in '{field}' without a reciprocal entry"
            ),
            Self::ConflictingRelationship { from, to, kinds } => write!(
                f,
                "Conflicting relationship between {from} and {to}: {}",
                kinds
                    .iter()
                    .map(|kind| kind.to_string())
                    .collect::<Vec<_>>()
                    .join(" vs ")
            ),
            Self::MalformedEntity { key, message } => write!(f, "Malformed {key}: {message}"),
            Self::Warning(msg) => write!(f, "Warning: {msg}"),
            Self::Info(msg) => write!(f, "Info: {msg}"),
        }
    }
}
