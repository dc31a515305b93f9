//! Relationship model: link sets, link updates and the typed edge graph.
//!
//! # Responsibility
//! - Give link sets set semantics over an ordered transport sequence.
//! - Describe full-replacement link updates and validate them before submit.
//! - Build a kind-tagged edge list from fetched records for consistency checks.
//!
//! # Invariants
//! - A `LinkSet` never holds duplicates; equality ignores order.
//! - A `LinkUpdate` carries a set for every kind its anchor may link to; a
//!   kind left untouched is submitted as the empty set.
//! - An artist development entry never links to itself.
//! - Reverse links are written by the backend; this module only observes them.

use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::model::{EntityKind, EntityRecord, EntityRef};

static EMPTY_LINK_SET: LinkSet = LinkSet { ids: Vec::new() };

/// Set of foreign IDs of one kind, kept in first-seen order.
#[derive(Debug, Clone, Default, Eq)]
pub struct LinkSet {
    ids: Vec<String>,
}

impl LinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from a transport sequence, dropping repeated IDs.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new();
        for id in ids {
            set.insert(id);
        }
        set
    }

    /// Inserts `id`; returns `false` when it was already present.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.contains(&id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Removes `id`; returns `false` when it was absent.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.ids.len();
        self.ids.retain(|existing| existing != id);
        self.ids.len() != before
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|existing| existing == id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.ids
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.ids.clone()
    }

    /// IDs present in either set, `self` first.
    pub fn union(&self, other: &LinkSet) -> LinkSet {
        let mut merged = self.clone();
        for id in other.iter() {
            merged.insert(id);
        }
        merged
    }
}

impl PartialEq for LinkSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|id| other.contains(id))
    }
}

impl<S: Into<String>> FromIterator<S> for LinkSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::from_ids(iter)
    }
}

/// Link sets of one anchor, keyed by target kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkSets {
    sets: BTreeMap<EntityKind, LinkSet>,
}

impl LinkSets {
    /// Empty sets for every kind `anchor_kind` may link to.
    pub fn empty_for(anchor_kind: EntityKind) -> Self {
        Self {
            sets: anchor_kind
                .linkable_kinds()
                .iter()
                .map(|&kind| (kind, LinkSet::new()))
                .collect(),
        }
    }

    /// Set for `kind`; the empty set when none is held.
    pub fn get(&self, kind: EntityKind) -> &LinkSet {
        self.sets.get(&kind).unwrap_or(&EMPTY_LINK_SET)
    }

    pub fn get_mut(&mut self, kind: EntityKind) -> &mut LinkSet {
        self.sets.entry(kind).or_default()
    }

    /// Replaces the set for `kind`, returning the previous one.
    pub fn replace(&mut self, kind: EntityKind, set: LinkSet) -> LinkSet {
        self.sets.insert(kind, set).unwrap_or_default()
    }

    pub fn kinds(&self) -> impl Iterator<Item = EntityKind> + '_ {
        self.sets.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityKind, &LinkSet)> {
        self.sets.iter().map(|(kind, set)| (*kind, set))
    }

    /// Number of links across all kinds.
    pub fn total_len(&self) -> usize {
        self.sets.values().map(LinkSet::len).sum()
    }
}

/// Full-replacement link update for one anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkUpdate {
    anchor: EntityRef,
    targets: LinkSets,
}

impl LinkUpdate {
    /// Starts an update that clears every link set of `anchor`.
    pub fn new(anchor: EntityRef) -> Self {
        let targets = LinkSets::empty_for(anchor.kind);
        Self { anchor, targets }
    }

    /// Builds an update from complete link sets.
    pub fn from_sets(anchor: EntityRef, sets: &LinkSets) -> Self {
        let mut update = Self::new(anchor);
        for (kind, set) in sets.iter() {
            update.targets.replace(kind, set.clone());
        }
        update
    }

    /// Sets the complete target list for `kind`.
    pub fn with_targets<I, S>(mut self, kind: EntityKind, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.targets.replace(kind, LinkSet::from_ids(ids));
        self
    }

    pub fn anchor(&self) -> &EntityRef {
        &self.anchor
    }

    pub fn targets(&self, kind: EntityKind) -> &LinkSet {
        self.targets.get(kind)
    }

    pub fn target_sets(&self) -> &LinkSets {
        &self.targets
    }

    /// Checks the update against the kind table and the self-link rule.
    pub fn validate(&self) -> Result<(), LinkValidationError> {
        if self.anchor.id.trim().is_empty() {
            return Err(LinkValidationError::BlankAnchorId);
        }

        for (kind, set) in self.targets.iter() {
            if !self.anchor.kind.links_to(kind) {
                if set.is_empty() {
                    continue;
                }
                return Err(LinkValidationError::KindNotLinkable {
                    anchor_kind: self.anchor.kind,
                    target_kind: kind,
                });
            }
            if set.iter().any(|id| id.trim().is_empty()) {
                return Err(LinkValidationError::BlankTargetId(kind));
            }
        }

        if self
            .targets
            .get(self.anchor.kind)
            .contains(self.anchor.id.as_str())
        {
            return Err(LinkValidationError::SelfLink(self.anchor.clone()));
        }

        Ok(())
    }
}

/// Link update rejected before submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkValidationError {
    BlankAnchorId,
    BlankTargetId(EntityKind),
    KindNotLinkable {
        anchor_kind: EntityKind,
        target_kind: EntityKind,
    },
    SelfLink(EntityRef),
}

impl Display for LinkValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankAnchorId => write!(f, "link anchor id must not be blank"),
            Self::BlankTargetId(kind) => write!(f, "blank {kind} id in link targets"),
            Self::KindNotLinkable {
                anchor_kind,
                target_kind,
            } => write!(f, "{anchor_kind} records cannot link to {target_kind} records"),
            Self::SelfLink(anchor) => write!(f, "{anchor} cannot link to itself"),
        }
    }
}

impl Error for LinkValidationError {}

/// Directed edge between two records.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LinkEdge {
    pub from: EntityRef,
    pub to: EntityRef,
}

impl LinkEdge {
    pub fn reversed(&self) -> LinkEdge {
        LinkEdge {
            from: self.to.clone(),
            to: self.from.clone(),
        }
    }
}

/// Kind-tagged edge list built from a snapshot of fetched records.
#[derive(Debug, Clone, Default)]
pub struct RelationshipGraph {
    nodes: BTreeSet<EntityRef>,
    edges: BTreeSet<LinkEdge>,
}

impl RelationshipGraph {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a EntityRecord>,
    {
        let mut graph = Self::default();
        for record in records {
            let from = record.entity_ref();
            for (kind, set) in record.link_sets().iter() {
                for id in set.iter() {
                    graph.edges.insert(LinkEdge {
                        from: from.clone(),
                        to: EntityRef::new(kind, id),
                    });
                }
            }
            graph.nodes.insert(from);
        }
        graph
    }

    pub fn contains_node(&self, node: &EntityRef) -> bool {
        self.nodes.contains(node)
    }

    pub fn edges(&self) -> impl Iterator<Item = &LinkEdge> {
        self.edges.iter()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn has_edge(&self, from: &EntityRef, to: &EntityRef) -> bool {
        self.edges.contains(&LinkEdge {
            from: from.clone(),
            to: to.clone(),
        })
    }

    pub fn edges_from<'a>(&'a self, from: &'a EntityRef) -> impl Iterator<Item = &'a LinkEdge> {
        self.edges.iter().filter(move |edge| &edge.from == from)
    }

    /// Targets of `from` that are of `kind`.
    pub fn neighbors(&self, from: &EntityRef, kind: EntityKind) -> LinkSet {
        self.edges_from(from)
            .filter(|edge| edge.to.kind == kind)
            .map(|edge| edge.to.id.clone())
            .collect()
    }

    /// Edges whose target is in the snapshot but does not link back.
    ///
    /// Edges to records outside the snapshot are not reported; their reverse
    /// side is unknown, not missing.
    pub fn missing_reverse_links(&self) -> Vec<LinkEdge> {
        self.edges
            .iter()
            .filter(|edge| self.nodes.contains(&edge.to))
            .filter(|edge| !self.edges.contains(&edge.reversed()))
            .cloned()
            .collect()
    }
}
