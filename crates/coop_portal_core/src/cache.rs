//! Client-side query cache.
//!
//! # Responsibility
//! - Hold the last settled result of every read, keyed by what was read.
//! - Expose loading/error/ready state per key so views can tell them apart.
//!
//! # Invariants
//! - The only write discipline is "invalidate affected keys after a
//!   successful mutation"; invalidated keys return to `Idle`.
//! - A `Failed` entry stays failed until explicitly invalidated; there is no
//!   automatic retry.
//! - Single-threaded: no locking.

use std::collections::HashMap;

use crate::error::PortalError;
use crate::model::{ApprovalInfo, CallerEntities, EntityKind, EntityRecord, EntityRef, Role};

/// Lifecycle of one cached read.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum QueryState<T> {
    /// Never fetched, or invalidated since the last fetch.
    #[default]
    Idle,
    /// Request issued, response not yet applied.
    Loading,
    Failed(PortalError),
    Ready(T),
}

impl<T> QueryState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Idle | Self::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&PortalError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn from_result(result: Result<T, PortalError>) -> Self {
        match result {
            Ok(value) => Self::Ready(value),
            Err(err) => Self::Failed(err),
        }
    }
}

/// Key of one cached read.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CacheKey {
    Record(EntityRef),
    List(EntityKind),
    CallerEntities,
    CallerRole,
    CallerApproval,
    Approvals,
}

/// Query cache for one session.
#[derive(Debug, Default)]
pub struct QueryCache {
    records: HashMap<EntityRef, QueryState<EntityRecord>>,
    lists: HashMap<EntityKind, QueryState<Vec<EntityRecord>>>,
    caller_entities: QueryState<CallerEntities>,
    role: QueryState<Role>,
    approved: QueryState<bool>,
    approvals: QueryState<Vec<ApprovalInfo>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entity: &EntityRef) -> &QueryState<EntityRecord> {
        self.records.get(entity).unwrap_or(&QueryState::Idle)
    }

    pub fn set_record(&mut self, entity: EntityRef, state: QueryState<EntityRecord>) {
        self.records.insert(entity, state);
    }

    pub fn list(&self, kind: EntityKind) -> &QueryState<Vec<EntityRecord>> {
        self.lists.get(&kind).unwrap_or(&QueryState::Idle)
    }

    pub fn set_list(&mut self, kind: EntityKind, state: QueryState<Vec<EntityRecord>>) {
        self.lists.insert(kind, state);
    }

    pub fn caller_entities(&self) -> &QueryState<CallerEntities> {
        &self.caller_entities
    }

    pub fn set_caller_entities(&mut self, state: QueryState<CallerEntities>) {
        self.caller_entities = state;
    }

    pub fn role(&self) -> &QueryState<Role> {
        &self.role
    }

    pub fn set_role(&mut self, state: QueryState<Role>) {
        self.role = state;
    }

    pub fn approved(&self) -> &QueryState<bool> {
        &self.approved
    }

    pub fn set_approved(&mut self, state: QueryState<bool>) {
        self.approved = state;
    }

    pub fn approvals(&self) -> &QueryState<Vec<ApprovalInfo>> {
        &self.approvals
    }

    pub fn set_approvals(&mut self, state: QueryState<Vec<ApprovalInfo>>) {
        self.approvals = state;
    }

    /// Resets one key to `Idle`.
    pub fn invalidate(&mut self, key: &CacheKey) {
        match key {
            CacheKey::Record(entity) => {
                self.records.remove(entity);
            }
            CacheKey::List(kind) => {
                self.lists.remove(kind);
            }
            CacheKey::CallerEntities => self.caller_entities = QueryState::Idle,
            CacheKey::CallerRole => self.role = QueryState::Idle,
            CacheKey::CallerApproval => self.approved = QueryState::Idle,
            CacheKey::Approvals => self.approvals = QueryState::Idle,
        }
    }

    pub fn invalidate_all<'a, I>(&mut self, keys: I)
    where
        I: IntoIterator<Item = &'a CacheKey>,
    {
        for key in keys {
            self.invalidate(key);
        }
    }

    /// Drops every entry, e.g. after the signed-in identity changes.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
