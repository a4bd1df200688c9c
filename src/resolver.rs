//! Reference resolution: every declared reference of every record, classified against the
//! [`RecordStore`].
//!
//! Resolution is uniform over entity kinds. The resolver never looks at record fields directly;
//! it walks [`crate::entity::Record::declared_references`] and checks the target key against the
//! store. Each reference ends up as one of:
//!
//! - [`Resolution::Resolved`]: the target exists in its kind's table
//! - [`Resolution::Dangling`]: the target ID is absent. The reference is retained so queries can
//!   report it.
//! - [`Resolution::SelfReference`]: the record references its own key. This is the minimal
//!   cycle, and it never becomes a graph edge.
//!
//! Besides the per reference classification, the resolver reports two kinship observations:
//! asymmetric relationships (A lists B as a child, but B does not list A as a parent) and
//! conflicting relationship kinds between the same pair of individuals. Neither one is resolved
//! or inferred. Both are only reported.
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::{
    codec::Diagnostic,
    entity::{DeclaredRef, Entity, Individual},
    nodekey::NodeKey,
    properties::{ParentRole, ReferenceField, RelationshipKind},
    store::RecordStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Resolved,
    Dangling,
    SelfReference,
}

/// A declared reference annotated with its [`Resolution`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedReference {
    pub field: ReferenceField,
    pub target: NodeKey,
    pub position: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship: Option<RelationshipKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<ParentRole>,
    pub resolution: Resolution,
}

impl ResolvedReference {
    fn new(declared: DeclaredRef, resolution: Resolution) -> Self {
        ResolvedReference {
            field: declared.field,
            target: declared.target,
            position: declared.position,
            relationship: declared.relationship,
            role: declared.role,
            resolution,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolution == Resolution::Resolved
    }

    pub fn is_dangling(&self) -> bool {
        self.resolution == Resolution::Dangling
    }
}

/// The resolved view of one record: its key and every reference it declares, in declaration
/// order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedEntity {
    pub key: NodeKey,
    pub references: Vec<ResolvedReference>,
}

impl ResolvedEntity {
    pub fn resolved(&self) -> impl Iterator<Item = &ResolvedReference> {
        self.references.iter().filter(|r| r.is_resolved())
    }

    pub fn dangling(&self) -> impl Iterator<Item = &ResolvedReference> {
        self.references.iter().filter(|r| r.is_dangling())
    }

    pub fn is_self_referential(&self) -> bool {
        self.references
            .iter()
            .any(|r| r.resolution == Resolution::SelfReference)
    }

    pub fn in_field(&self, field: ReferenceField) -> impl Iterator<Item = &ResolvedReference> {
        self.references.iter().filter(move |r| r.field == field)
    }
}

/// Resolved view of a whole store, keyed by record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedDocument {
    entities: BTreeMap<NodeKey, ResolvedEntity>,
}

impl ResolvedDocument {
    pub fn get(&self, key: &NodeKey) -> Option<&ResolvedEntity> {
        self.entities.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedEntity> {
        self.entities.values()
    }

    /// Every dangling reference in the document as `(owner, reference)`, owners in key order.
    pub fn dangling(&self) -> impl Iterator<Item = (&NodeKey, &ResolvedReference)> {
        self.entities
            .values()
            .flat_map(|entity| entity.dangling().map(move |r| (&entity.key, r)))
    }

    pub fn self_referential(&self) -> impl Iterator<Item = &NodeKey> {
        self.entities
            .values()
            .filter(|entity| entity.is_self_referential())
            .map(|entity| &entity.key)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

pub struct ReferenceResolver<'a> {
    store: &'a RecordStore,
    report_asymmetric: bool,
}

fn declares(individual: &Individual, field: ReferenceField, id: &str) -> bool {
    let records = match field {
        ReferenceField::Parents => &individual.parents,
        ReferenceField::Children => &individual.children,
        ReferenceField::Spouses => &individual.spouses,
        _ => return false,
    };
    records.iter().any(|record| record.id == id)
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(store: &'a RecordStore) -> Self {
        ReferenceResolver {
            store,
            report_asymmetric: true,
        }
    }

    pub fn report_asymmetric(mut self, report: bool) -> Self {
        self.report_asymmetric = report;
        self
    }

    fn classify(&self, owner: &NodeKey, declared: &DeclaredRef) -> Resolution {
        if declared.target == *owner {
            Resolution::SelfReference
        } else if self.store.contains(&declared.target) {
            Resolution::Resolved
        } else {
            Resolution::Dangling
        }
    }

    /// Resolve every reference of every record. Diagnostics come out in record key order,
    /// relationship conflicts last.
    pub fn resolve(&self) -> (ResolvedDocument, Vec<Diagnostic>) {
        let mut entities = BTreeMap::new();
        let mut diagnostics = Vec::new();
        // Unordered individual pair -> relationship kinds declared between them.
        let mut pair_kinds: BTreeMap<(NodeKey, NodeKey), BTreeSet<RelationshipKind>> =
            BTreeMap::new();

        for entity in self.store.entities() {
            let key = entity.key();
            if let Entity::Event(event) = entity {
                if event.subject.is_none() {
                    diagnostics.push(Diagnostic::warning(format!(
                        "{key} ({}) has no subject",
                        event.event_type
                    )));
                }
            }

            let mut references = Vec::new();
            for declared in entity.declared_references() {
                let resolution = self.classify(&key, &declared);
                match resolution {
                    Resolution::Dangling => {
                        tracing::debug!(
                            "[ReferenceResolver] dangling {key}.{} -> {}",
                            declared.field,
                            declared.target
                        );
                        diagnostics.push(Diagnostic::dangling(
                            key.clone(),
                            declared.field,
                            declared.target.clone(),
                        ));
                    }
                    Resolution::SelfReference => {
                        tracing::debug!("[ReferenceResolver] self reference {key}.{}", declared.field);
                        diagnostics.push(Diagnostic::self_reference(key.clone(), declared.field));
                    }
                    Resolution::Resolved => {
                        if let Some(individual) = entity.as_individual() {
                            self.check_reciprocal(individual, &declared, &mut diagnostics);
                            if let (
                                ReferenceField::Parents | ReferenceField::Children,
                                Some(kind),
                            ) = (declared.field, declared.relationship)
                            {
                                let pair = if key < declared.target {
                                    (key.clone(), declared.target.clone())
                                } else {
                                    (declared.target.clone(), key.clone())
                                };
                                pair_kinds.entry(pair).or_default().insert(kind);
                            }
                        }
                    }
                }
                references.push(ResolvedReference::new(declared, resolution));
            }
            entities.insert(key.clone(), ResolvedEntity { key, references });
        }

        for ((from, to), kinds) in pair_kinds {
            let kinds = kinds
                .into_iter()
                .filter(|kind| *kind != RelationshipKind::Unknown)
                .collect::<Vec<_>>();
            if kinds.len() > 1 {
                tracing::debug!("[ReferenceResolver] conflicting relationship {from} / {to}");
                diagnostics.push(Diagnostic::ConflictingRelationship { from, to, kinds });
            }
        }

        let resolved = ResolvedDocument { entities };
        tracing::debug!(
            "[ReferenceResolver] resolved {} records, {} dangling references",
            resolved.len(),
            resolved.dangling().count()
        );
        (resolved, diagnostics)
    }

    fn check_reciprocal(
        &self,
        owner: &Individual,
        declared: &DeclaredRef,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        if !self.report_asymmetric {
            return;
        }
        let Some(reciprocal) = declared.field.reciprocal() else {
            return;
        };
        let Some(target) = self.store.individual(&declared.target.id) else {
            return;
        };
        if !declares(target, reciprocal, &owner.id) {
            diagnostics.push(Diagnostic::AsymmetricRelationship {
                declared_by: NodeKey::individual(owner.id.as_str()),
                target: declared.target.clone(),
                field: declared.field,
            });
        }
    }
}
