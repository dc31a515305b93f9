//! Entity option resolver.
//!
//! # Responsibility
//! - Derive link-picker candidates per kind from cached reads.
//! - Resolve linked IDs to display labels for detail pages.
//!
//! # Invariants
//! - Admins see every record of every kind; everyone else sees only the
//!   caller aggregate. The two sources are never mixed.
//! - A label is the record's display name, or its ID when the name is
//!   missing or blank.
//! - Candidates with a blank ID are dropped.
//! - Loading and error are reported alongside whatever candidates are ready.

use crate::cache::{QueryCache, QueryState};
use crate::error::PortalError;
use crate::model::{EntityKind, EntityRecord};
use crate::session::SessionContext;

/// One selectable link target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityOption {
    pub id: String,
    pub label: String,
}

/// Link-picker candidates for every kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkableOptions {
    pub memberships: Vec<EntityOption>,
    pub artists: Vec<EntityOption>,
    pub works: Vec<EntityOption>,
    pub releases: Vec<EntityOption>,
    pub projects: Vec<EntityOption>,
    pub is_loading: bool,
    pub error: Option<PortalError>,
}

impl LinkableOptions {
    pub fn for_kind(&self, kind: EntityKind) -> &[EntityOption] {
        match kind {
            EntityKind::Membership => &self.memberships,
            EntityKind::ArtistDevelopment => &self.artists,
            EntityKind::PublishingWork => &self.works,
            EntityKind::Release => &self.releases,
            EntityKind::RecordingProject => &self.projects,
        }
    }

    /// Label for a linked ID; the ID itself when it is not a candidate.
    pub fn label_for(&self, kind: EntityKind, id: &str) -> String {
        self.for_kind(kind)
            .iter()
            .find(|option| option.id == id)
            .map(|option| option.label.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Total number of candidates across kinds.
    pub fn len(&self) -> usize {
        EntityKind::ALL
            .iter()
            .map(|&kind| self.for_kind(kind).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn options_mut(&mut self, kind: EntityKind) -> &mut Vec<EntityOption> {
        match kind {
            EntityKind::Membership => &mut self.memberships,
            EntityKind::ArtistDevelopment => &mut self.artists,
            EntityKind::PublishingWork => &mut self.works,
            EntityKind::Release => &mut self.releases,
            EntityKind::RecordingProject => &mut self.projects,
        }
    }

    fn push(&mut self, record: &EntityRecord) {
        if let Some(option) = option_for(record) {
            self.options_mut(record.kind()).push(option);
        }
    }

    fn absorb<T>(&mut self, state: &QueryState<T>) {
        if state.is_loading() {
            self.is_loading = true;
        }
        if let (None, Some(err)) = (&self.error, state.error()) {
            self.error = Some(err.clone());
        }
    }
}

/// Linked IDs of one kind resolved to labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedLabels {
    pub kind: EntityKind,
    pub entries: Vec<EntityOption>,
}

/// `name` when it has visible text, else `id`.
pub fn label_or_id(name: Option<&str>, id: &str) -> String {
    name.map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(id)
        .to_string()
}

/// Candidate for `record`; `None` when its ID is blank.
pub fn option_for(record: &EntityRecord) -> Option<EntityOption> {
    let id = record.id().trim();
    if id.is_empty() {
        return None;
    }
    Some(EntityOption {
        id: id.to_string(),
        label: label_or_id(record.display_name(), id),
    })
}

/// Resolves candidates for the session from what the cache holds.
///
/// Admin sessions read the five per-kind lists; other signed-in sessions
/// read the caller aggregate. Anonymous sessions get no candidates.
pub fn resolve_options(session: &SessionContext, cache: &QueryCache) -> LinkableOptions {
    let mut options = LinkableOptions::default();
    if session.identity().is_none() {
        return options;
    }

    if session.is_admin() {
        for kind in EntityKind::ALL {
            let state = cache.list(kind);
            options.absorb(state);
            if let Some(records) = state.ready() {
                for record in records {
                    options.push(record);
                }
            }
        }
        return options;
    }

    let state = cache.caller_entities();
    options.absorb(state);
    if let Some(entities) = state.ready() {
        for record in entities.records() {
            options.push(&record);
        }
    }
    options
}

/// Resolves every linked ID of `record` to a label, grouped by kind.
pub fn related_labels(options: &LinkableOptions, record: &EntityRecord) -> Vec<RelatedLabels> {
    record
        .link_sets()
        .iter()
        .map(|(kind, set)| RelatedLabels {
            kind,
            entries: set
                .iter()
                .map(|id| EntityOption {
                    id: id.to_string(),
                    label: options.label_for(kind, id),
                })
                .collect(),
        })
        .collect()
}
