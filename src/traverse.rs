//! Hierarchy traversal: rooted, depth bounded tree views over the [`KinshipGraph`].
//!
//! ## Roots
//!
//! An individual is a root candidate when it declares no parent that resolved (zero declared
//! `child_of` edges to individuals). When no individual qualifies, for example because every
//! individual sits on a parent cycle, every individual becomes its own root and the forest is a
//! flat list ([`RootSet::fallback`]).
//!
//! ## Expansion
//!
//! The children of a node in the descendant view are the individuals reachable through its
//! outgoing `parent_of` edges, declared ones first in declaration order and then the derived
//! ones. The ancestor view expands along `child_of` instead. Targets are deduplicated.
//!
//! ## Guards
//!
//! Traversal carries the path of ancestors of the current node. A child already on that path is
//! not emitted, and neither is a child that would sit deeper than the configured ceiling. Both
//! truncations are silent in the produced tree and counted in [`TraversalStats`].
//!
//! The walk runs on an explicit stack over an index arena, so neither the stack depth of the
//! program nor the size of the path depends on the shape of the data.
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::{
    config::DEFAULT_MAX_DEPTH,
    graph::KinshipGraph,
    nodekey::NodeKey,
    properties::{EdgeLabel, EntityKind},
    store::RecordStore,
};

static YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{3,4})\b").expect("valid year regex"));

/// Abstract tree node handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub id: String,
    pub kind: EntityKind,
    pub label: String,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Number of edges on the longest root to leaf path.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(node.children.iter().map(|child| (child, depth + 1)));
        }
        deepest
    }

    /// Pre-order iterator over `(depth, node)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &TreeNode)> {
        let mut stack = vec![(0usize, self)];
        std::iter::from_fn(move || {
            let (depth, node) = stack.pop()?;
            stack.extend(node.children.iter().rev().map(|child| (depth + 1, child)));
            Some((depth, node))
        })
    }
}

/// Truncation counters of one traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TraversalStats {
    pub nodes: usize,
    /// Children left out because they already were on the path from the root.
    pub cycles_truncated: usize,
    /// Children left out because they would exceed the depth ceiling.
    pub depth_truncated: usize,
    pub max_depth_reached: usize,
}

impl TraversalStats {
    fn absorb(&mut self, other: TraversalStats) {
        self.nodes += other.nodes;
        self.cycles_truncated += other.cycles_truncated;
        self.depth_truncated += other.depth_truncated;
        self.max_depth_reached = self.max_depth_reached.max(other.max_depth_reached);
    }
}

/// Direction of a tree view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Lineage {
    #[default]
    Descendants,
    Ancestors,
}

impl Lineage {
    fn label(&self) -> EdgeLabel {
        match self {
            Lineage::Descendants => EdgeLabel::ParentOf,
            Lineage::Ancestors => EdgeLabel::ChildOf,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RootSet {
    pub roots: Vec<NodeKey>,
    /// `true` when no individual qualified as root and every individual was taken instead.
    pub fallback: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tree {
    pub root: TreeNode,
    pub stats: TraversalStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Forest {
    pub trees: Vec<TreeNode>,
    pub fallback: bool,
    pub stats: TraversalStats,
}

pub struct Hierarchy<'a> {
    graph: &'a KinshipGraph,
    store: &'a RecordStore,
    max_depth: usize,
    follow_back_edges: bool,
}

impl<'a> Hierarchy<'a> {
    pub fn new(graph: &'a KinshipGraph, store: &'a RecordStore) -> Self {
        Hierarchy {
            graph,
            store,
            max_depth: DEFAULT_MAX_DEPTH,
            follow_back_edges: true,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn follow_back_edges(mut self, follow: bool) -> Self {
        self.follow_back_edges = follow;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Root candidates in ID order, or every individual when there are none.
    pub fn roots(&self) -> RootSet {
        let individuals = self
            .store
            .all_ids(EntityKind::Individual)
            .into_iter()
            .map(NodeKey::individual)
            .collect::<Vec<_>>();
        let roots = individuals
            .iter()
            .filter(|key| self.graph.declared_parent_count(key) == 0)
            .cloned()
            .collect::<Vec<_>>();
        if roots.is_empty() && !individuals.is_empty() {
            tracing::debug!(
                "[Hierarchy] no root candidates, falling back to {} flat roots",
                individuals.len()
            );
            return RootSet {
                roots: individuals,
                fallback: true,
            };
        }
        RootSet {
            roots,
            fallback: false,
        }
    }

    /// Distinct individuals one step away from `key` in the `lineage` direction.
    fn candidates(&self, key: &NodeKey, lineage: Lineage) -> Vec<NodeKey> {
        self.graph
            .neighbors(key, lineage.label().into(), self.follow_back_edges)
            .into_iter()
            .filter(|target| target.is_individual() && *target != key)
            .cloned()
            .collect()
    }

    /// One level of expansion for a UI that opens nodes on demand. `path` holds the ancestors of
    /// `key` from the root down, excluding `key`. Children on the path, and children past the
    /// depth ceiling, are left out.
    pub fn expand(&self, key: &NodeKey, path: &[NodeKey], lineage: Lineage) -> Vec<NodeKey> {
        if path.len() + 1 > self.max_depth {
            return Vec::new();
        }
        self.candidates(key, lineage)
            .into_iter()
            .filter(|child| !path.contains(child))
            .collect()
    }

    /// Lazy pre-order walk from `root`. Dropping the iterator early is fine.
    pub fn walk(&self, root: &NodeKey, lineage: Lineage) -> Walk<'_, 'a> {
        let mut walk = Walk {
            hierarchy: self,
            lineage,
            arena: Vec::new(),
            stack: Vec::new(),
            stats: TraversalStats::default(),
        };
        if self.graph.contains(root) {
            walk.arena.push(Slot {
                key: root.clone(),
                depth: 0,
                parent: None,
            });
            walk.stack.push(0);
        }
        walk
    }

    /// Full tree rooted at `root`. `None` when `root` is not in the document.
    pub fn tree(&self, root: &NodeKey, lineage: Lineage) -> Option<Tree> {
        if !self.graph.contains(root) {
            return None;
        }
        let mut walk = self.walk(root, lineage);
        walk.by_ref().for_each(drop);
        let stats = walk.stats;

        let mut nodes = walk
            .arena
            .iter()
            .map(|slot| Some(self.node(&slot.key)))
            .collect::<Vec<_>>();
        // Children always sit after their parent in the arena, so by the time a node is moved into
        // its parent every descendant has already been attached to it.
        for idx in (1..walk.arena.len()).rev() {
            let Some(mut node) = nodes[idx].take() else {
                continue;
            };
            node.children.reverse();
            if let Some(parent) = walk.arena[idx].parent.and_then(|p| nodes[p].as_mut()) {
                parent.children.push(node);
            }
        }
        let mut root = nodes.into_iter().next().flatten()?;
        root.children.reverse();
        Some(Tree { root, stats })
    }

    /// Descendant trees of every root. In fallback mode each individual is a childless root.
    pub fn forest(&self) -> Forest {
        let RootSet { roots, fallback } = self.roots();
        let mut stats = TraversalStats::default();
        let mut trees = Vec::with_capacity(roots.len());
        for root in &roots {
            if fallback {
                stats.nodes += 1;
                trees.push(self.node(root));
            } else if let Some(tree) = self.tree(root, Lineage::Descendants) {
                stats.absorb(tree.stats);
                trees.push(tree.root);
            }
        }
        Forest {
            trees,
            fallback,
            stats,
        }
    }

    fn node(&self, key: &NodeKey) -> TreeNode {
        TreeNode {
            id: key.id.clone(),
            kind: key.kind,
            label: self.label(key),
            children: Vec::new(),
        }
    }

    /// Record label; individuals get their life years appended when known, as in
    /// `John Doe (1850-1920)`.
    pub fn label(&self, key: &NodeKey) -> String {
        let Some(entity) = self.store.get_key(key) else {
            return key.id.clone();
        };
        let label = entity.label();
        if !key.is_individual() {
            return label;
        }
        match (self.vital_year(key, "birth"), self.vital_year(key, "death")) {
            (Some(born), Some(died)) => format!("{label} ({born}-{died})"),
            (Some(born), None) => format!("{label} (b. {born})"),
            (None, Some(died)) => format!("{label} (d. {died})"),
            (None, None) => label,
        }
    }

    fn vital_year(&self, key: &NodeKey, event_type: &str) -> Option<String> {
        self.graph
            .neighbors(key, EdgeLabel::ParticipatesIn.into(), true)
            .into_iter()
            .filter(|target| target.kind == EntityKind::Event)
            .filter_map(|target| self.store.event(&target.id))
            .filter(|event| event.is_type(event_type))
            .find_map(|event| {
                let date = event.date.as_ref()?;
                YEAR_RE
                    .captures(&date.value)
                    .and_then(|caps| caps.get(1))
                    .map(|year| year.as_str().to_string())
            })
    }
}

struct Slot {
    key: NodeKey,
    depth: usize,
    parent: Option<usize>,
}

/// Iterator returned by [`Hierarchy::walk`], yielding `(depth, key)` in pre-order.
pub struct Walk<'h, 'a> {
    hierarchy: &'h Hierarchy<'a>,
    lineage: Lineage,
    arena: Vec<Slot>,
    stack: Vec<usize>,
    stats: TraversalStats,
}

impl Walk<'_, '_> {
    /// Counters for everything yielded so far.
    pub fn stats(&self) -> TraversalStats {
        self.stats
    }

    fn on_path(&self, mut idx: usize, key: &NodeKey) -> bool {
        loop {
            let slot = &self.arena[idx];
            if slot.key == *key {
                return true;
            }
            match slot.parent {
                Some(parent) => idx = parent,
                None => return false,
            }
        }
    }
}

impl Iterator for Walk<'_, '_> {
    type Item = (usize, NodeKey);

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.stack.pop()?;
        let depth = self.arena[idx].depth;
        let key = self.arena[idx].key.clone();
        self.stats.nodes += 1;
        self.stats.max_depth_reached = self.stats.max_depth_reached.max(depth);

        let mut pending = Vec::new();
        for child in self.hierarchy.candidates(&key, self.lineage) {
            if self.on_path(idx, &child) {
                tracing::debug!("[Hierarchy] cycle at {child} below {key}, not expanding");
                self.stats.cycles_truncated += 1;
            } else if depth + 1 > self.hierarchy.max_depth {
                tracing::debug!("[Hierarchy] depth ceiling reached at {key}");
                self.stats.depth_truncated += 1;
            } else {
                pending.push(self.arena.len());
                self.arena.push(Slot {
                    key: child,
                    depth: depth + 1,
                    parent: Some(idx),
                });
            }
        }
        self.stack.extend(pending.into_iter().rev());
        Some((depth, key))
    }
}
