//! The relationship graph: a directed, labeled multigraph over every record of a document.
//!
//! Nodes are [`NodeKey`]s of any kind. Every resolved reference `A -> B` becomes two edges: the
//! declared edge `A -> B` labeled after the declaring field, and a back-edge `B -> A` carrying
//! the inverse label with [`Relation::derived`] set. Navigation works in both directions that way
//! (an individual's children are found even when only the children declare the parent) while
//! consumers can still tell declared links from derived ones.
//!
//! Dangling and self references never become edges. The graph is built in one pass and is
//! immutable afterwards.
use petgraph::{
    graph::{EdgeIndex, NodeIndex},
    visit::EdgeRef,
    Direction,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::{
    nodekey::NodeKey,
    properties::{EdgeLabel, EdgeLabelSet, ParentRole, ReferenceField, RelationshipKind},
    resolver::ResolvedDocument,
    store::RecordStore,
};

/// Edge weight of the [`KinshipGraph`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub label: EdgeLabel,
    /// `true` for a materialized back-edge, `false` for the edge as declared.
    pub derived: bool,
    /// Field of the record that declared the underlying reference.
    pub field: ReferenceField,
    pub position: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship: Option<RelationshipKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<ParentRole>,
}

#[derive(Debug, Clone, Default)]
pub struct KinshipGraph {
    graph: petgraph::Graph<NodeKey, Relation>,
    index: BTreeMap<NodeKey, NodeIndex>,
}

impl KinshipGraph {
    /// Build the graph of `store` from its resolved view. Linear in the number of references.
    pub fn build(store: &RecordStore, resolved: &ResolvedDocument) -> Self {
        let mut graph = petgraph::Graph::new();
        let mut index = BTreeMap::new();
        for entity in store.entities() {
            let key = entity.key();
            let idx = graph.add_node(key.clone());
            index.insert(key, idx);
        }

        for entity in resolved.iter() {
            let Some(&source_idx) = index.get(&entity.key) else {
                continue;
            };
            for reference in entity.resolved() {
                let Some(&sink_idx) = index.get(&reference.target) else {
                    continue;
                };
                let declared = Relation {
                    label: reference.field.label(),
                    derived: false,
                    field: reference.field,
                    position: reference.position,
                    relationship: reference.relationship,
                    role: reference.role,
                };
                let back = Relation {
                    label: declared.label.inverse(),
                    derived: true,
                    ..declared.clone()
                };
                graph.add_edge(source_idx, sink_idx, declared);
                graph.add_edge(sink_idx, source_idx, back);
            }
        }

        tracing::info!(
            "[KinshipGraph] built {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        KinshipGraph { graph, index }
    }

    pub fn as_graph(&self) -> &petgraph::Graph<NodeKey, Relation> {
        &self.graph
    }

    pub fn node_index(&self, key: &NodeKey) -> Option<NodeIndex> {
        self.index.get(key).copied()
    }

    pub fn contains(&self, key: &NodeKey) -> bool {
        self.index.contains_key(key)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Outgoing edges of `key` whose label is in `labels`, in a stable order: declared edges
    /// first (by declaring field, then position within the field), then derived edges in the
    /// order they were materialized. Unknown keys have no edges.
    pub fn outgoing(
        &self,
        key: &NodeKey,
        labels: EdgeLabelSet,
        include_derived: bool,
    ) -> Vec<(&NodeKey, &Relation)> {
        let Some(idx) = self.node_index(key) else {
            return Vec::new();
        };
        let mut edges = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .filter(|edge| labels.contains(edge.weight().label))
            .filter(|edge| include_derived || !edge.weight().derived)
            .collect::<Vec<_>>();
        edges.sort_by_key(|edge| {
            let relation = edge.weight();
            let edge_idx: EdgeIndex = edge.id();
            if relation.derived {
                (true, None, 0, edge_idx.index())
            } else {
                (
                    false,
                    Some(relation.field),
                    relation.position,
                    edge_idx.index(),
                )
            }
        });
        edges
            .into_iter()
            .map(|edge| (&self.graph[edge.target()], edge.weight()))
            .collect()
    }

    /// Distinct targets of [`KinshipGraph::outgoing`], first occurrence wins.
    pub fn neighbors(
        &self,
        key: &NodeKey,
        labels: EdgeLabelSet,
        include_derived: bool,
    ) -> Vec<&NodeKey> {
        let mut seen = BTreeSet::new();
        self.outgoing(key, labels, include_derived)
            .into_iter()
            .map(|(target, _)| target)
            .filter(|target| seen.insert(*target))
            .collect()
    }

    /// Number of declared `child_of` edges from `key` to individuals, i.e. the parents the record
    /// itself lists and that resolved.
    pub fn declared_parent_count(&self, key: &NodeKey) -> usize {
        self.outgoing(key, EdgeLabel::ChildOf.into(), false)
            .into_iter()
            .filter(|(target, _)| target.is_individual())
            .count()
    }

    /// Every edge as `(source, label, target, derived)`. Two graphs built from the same document
    /// have equal edge sets.
    pub fn edge_set(&self) -> BTreeSet<(NodeKey, EdgeLabel, NodeKey, bool)> {
        self.graph
            .edge_references()
            .map(|edge| {
                (
                    self.graph[edge.source()].clone(),
                    edge.weight().label,
                    self.graph[edge.target()].clone(),
                    edge.weight().derived,
                )
            })
            .collect()
    }
}
