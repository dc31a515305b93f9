//! In-process backend used by tests and the CLI demo.
//!
//! # Responsibility
//! - Implement `PortalBackend` over shared in-memory state.
//! - Enforce admin/owner authorization the way the remote backend does.
//! - Write reverse links on every link update.
//!
//! # Invariants
//! - All sessions created from one backend share the same store.
//! - A rejected call leaves the store untouched.
//! - Injected failures are consumed by the next call of any operation.

use log::debug;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use super::{BackendError, BackendResult, PortalBackend};
use crate::links::LinkUpdate;
use crate::model::{
    ApprovalInfo, ApprovalStatus, ArtistDevelopment, CallerEntities, EntityKind, EntityRecord,
    EntityRef, Membership, MembershipProfile, MembershipUpdate, MemberStatus, NewArtistDevelopment,
    NewMembership,
    NewPublishingWork, NewRecordingProject, NewRelease, Principal, PublishingWork,
    RecordingProject, Release, Role,
};

#[derive(Debug, Default)]
struct StoreState {
    records: BTreeMap<EntityRef, EntityRecord>,
    roles: HashMap<Principal, Role>,
    approvals: BTreeMap<Principal, ApprovalStatus>,
    failures: VecDeque<BackendError>,
    link_writes: u64,
}

impl StoreState {
    fn role_of(&self, caller: Option<&Principal>) -> Role {
        caller
            .and_then(|principal| self.roles.get(principal).copied())
            .unwrap_or(Role::Guest)
    }

    fn is_approved(&self, caller: Option<&Principal>) -> bool {
        caller
            .and_then(|principal| self.approvals.get(principal))
            .is_some_and(|status| *status == ApprovalStatus::Approved)
    }
}

/// Shared in-memory store viewed through one caller's session.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Rc<RefCell<StoreState>>,
    caller: Option<Principal>,
}

impl MemoryBackend {
    /// Creates an empty store with an anonymous session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Session over the same store acting as `principal`.
    pub fn as_caller(&self, principal: Principal) -> Self {
        Self {
            state: Rc::clone(&self.state),
            caller: Some(principal),
        }
    }

    /// Session over the same store without a signed-in caller.
    pub fn anonymous(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
            caller: None,
        }
    }

    pub fn caller(&self) -> Option<&Principal> {
        self.caller.as_ref()
    }

    /// Grants a role without authorization checks.
    pub fn seed_role(&self, principal: Principal, role: Role) {
        self.state.borrow_mut().roles.insert(principal, role);
    }

    /// Sets an approval status without authorization checks.
    pub fn seed_approval(&self, principal: Principal, status: ApprovalStatus) {
        self.state.borrow_mut().approvals.insert(principal, status);
    }

    /// Stores a record as-is, replacing any record with the same reference.
    pub fn insert(&self, record: impl Into<EntityRecord>) -> EntityRef {
        let record = record.into();
        let entity = record.entity_ref();
        self.state
            .borrow_mut()
            .records
            .insert(entity.clone(), record);
        entity
    }

    /// Stores a raw payload, simulating records written by an older schema.
    pub fn insert_json(&self, kind: EntityKind, value: Value) -> Result<EntityRef, serde_json::Error> {
        let record = EntityRecord::decode(kind, value)?;
        Ok(self.insert(record))
    }

    /// Makes the next call of any operation fail with `error`.
    pub fn fail_next(&self, error: BackendError) {
        self.state.borrow_mut().failures.push_back(error);
    }

    /// Reads a record bypassing authorization.
    pub fn stored(&self, entity: &EntityRef) -> Option<EntityRecord> {
        self.state.borrow().records.get(entity).cloned()
    }

    /// Number of successful link updates applied to the store.
    pub fn link_write_count(&self) -> u64 {
        self.state.borrow().link_writes
    }

    fn take_failure(&self) -> BackendResult<()> {
        match self.state.borrow_mut().failures.pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn require_caller(&self) -> BackendResult<&Principal> {
        self.caller
            .as_ref()
            .ok_or_else(|| BackendError::Unauthorized("sign-in required".to_string()))
    }

    fn require_admin(&self, state: &StoreState) -> BackendResult<()> {
        if state.role_of(self.caller.as_ref()) == Role::Admin {
            return Ok(());
        }
        Err(BackendError::Unauthorized("admin role required".to_string()))
    }

    fn require_member_access(&self, state: &StoreState) -> BackendResult<()> {
        self.require_caller()?;
        let caller = self.caller.as_ref();
        if state.role_of(caller) == Role::Admin || state.is_approved(caller) {
            return Ok(());
        }
        Err(BackendError::Unauthorized("approval required".to_string()))
    }

    fn require_owner_or_admin(
        &self,
        state: &StoreState,
        entity: &EntityRef,
        action: &str,
    ) -> BackendResult<()> {
        let caller = self.require_caller()?;
        let record = state
            .records
            .get(entity)
            .ok_or_else(|| BackendError::NotFound(entity.clone()))?;
        let is_admin = state.role_of(Some(caller)) == Role::Admin;
        if is_admin || record.governing_principal() == Some(caller) {
            return Ok(());
        }
        Err(BackendError::Unauthorized(format!(
            "only the owner or an admin may {action} {entity}"
        )))
    }

    fn insert_created(&self, record: EntityRecord) -> EntityRef {
        let entity = record.entity_ref();
        debug!(
            "event=memory_create module=backend status=ok kind={} id={}",
            entity.kind, entity.id
        );
        self.insert(record)
    }

    fn owner(&self) -> Option<Principal> {
        self.caller.clone()
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or_default()
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

impl PortalBackend for MemoryBackend {
    fn caller_role(&self) -> BackendResult<Role> {
        self.take_failure()?;
        Ok(self.state.borrow().role_of(self.caller.as_ref()))
    }

    fn is_caller_approved(&self) -> BackendResult<bool> {
        self.take_failure()?;
        Ok(self.state.borrow().is_approved(self.caller.as_ref()))
    }

    fn request_approval(&self) -> BackendResult<()> {
        self.take_failure()?;
        let caller = self.require_caller()?.clone();
        let mut state = self.state.borrow_mut();
        let status = state
            .approvals
            .entry(caller)
            .or_insert(ApprovalStatus::Pending);
        if *status == ApprovalStatus::Rejected {
            *status = ApprovalStatus::Pending;
        }
        Ok(())
    }

    fn list_approvals(&self) -> BackendResult<Vec<ApprovalInfo>> {
        self.take_failure()?;
        let state = self.state.borrow();
        self.require_admin(&state)?;
        Ok(state
            .approvals
            .iter()
            .map(|(principal, status)| ApprovalInfo {
                principal: principal.clone(),
                status: *status,
            })
            .collect())
    }

    fn set_approval(&self, principal: &Principal, status: ApprovalStatus) -> BackendResult<()> {
        self.take_failure()?;
        let mut state = self.state.borrow_mut();
        self.require_admin(&state)?;
        state.approvals.insert(principal.clone(), status);
        Ok(())
    }

    fn assign_role(&self, principal: &Principal, role: Role) -> BackendResult<()> {
        self.take_failure()?;
        let mut state = self.state.borrow_mut();
        self.require_admin(&state)?;
        state.roles.insert(principal.clone(), role);
        Ok(())
    }

    fn list_all(&self, kind: EntityKind) -> BackendResult<Vec<EntityRecord>> {
        self.take_failure()?;
        let state = self.state.borrow();
        self.require_admin(&state)?;
        Ok(state
            .records
            .iter()
            .filter(|(entity, _)| entity.kind == kind)
            .map(|(_, record)| record.clone())
            .collect())
    }

    fn get_record(&self, entity: &EntityRef) -> BackendResult<EntityRecord> {
        self.take_failure()?;
        let state = self.state.borrow();
        self.require_member_access(&state)?;
        state
            .records
            .get(entity)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(entity.clone()))
    }

    fn entities_for_caller(&self) -> BackendResult<CallerEntities> {
        self.take_failure()?;
        let state = self.state.borrow();
        self.require_member_access(&state)?;
        let caller = self.require_caller()?;

        let mut entities = CallerEntities::default();
        for record in state.records.values() {
            if record.governing_principal() != Some(caller) {
                continue;
            }
            match record {
                EntityRecord::Membership(membership) => entities
                    .memberships
                    .push((membership.profile.id.clone(), membership.clone())),
                EntityRecord::PublishingWork(work) => entities.publishing_works.push(work.clone()),
                EntityRecord::Release(release) => entities.releases.push(release.clone()),
                EntityRecord::RecordingProject(project) => {
                    entities.recording_projects.push(project.clone())
                }
                EntityRecord::ArtistDevelopment(entry) => {
                    entities.artist_development.push(entry.clone())
                }
            }
        }
        Ok(entities)
    }

    fn create_membership(&self, request: &NewMembership) -> BackendResult<MembershipProfile> {
        self.take_failure()?;
        {
            let state = self.state.borrow();
            self.require_member_access(&state)?;
            let entity = EntityRef::new(EntityKind::Membership, request.id.trim());
            if state.records.contains_key(&entity) {
                return Err(BackendError::Rejected(format!(
                    "membership id already exists: {}",
                    entity.id
                )));
            }
        }

        let now = now_millis();
        let profile = MembershipProfile {
            id: request.id.trim().to_string(),
            name: request.name.trim().to_string(),
            email: request.email.trim().to_string(),
            status: MemberStatus::Applicant,
            created_at: now,
            updated_at: now,
            principal: self.owner(),
            ..MembershipProfile::default()
        };
        self.insert_created(EntityRecord::Membership(Membership {
            profile: profile.clone(),
            ..Membership::default()
        }));
        Ok(profile)
    }

    fn create_publishing_work(&self, request: &NewPublishingWork) -> BackendResult<PublishingWork> {
        self.take_failure()?;
        self.require_admin(&self.state.borrow())?;
        let work = PublishingWork {
            id: new_id(),
            title: request.title.trim().to_string(),
            contributors: request.contributors.clone(),
            ownership_splits: request.ownership_splits.clone(),
            iswc: request.iswc.clone(),
            isrc: request.isrc.clone(),
            registration_status: request.registration_status.clone(),
            created_at: now_millis(),
            owner: self.owner(),
            ..PublishingWork::default()
        };
        self.insert_created(EntityRecord::PublishingWork(work.clone()));
        Ok(work)
    }

    fn create_release(&self, request: &NewRelease) -> BackendResult<Release> {
        self.take_failure()?;
        self.require_admin(&self.state.borrow())?;
        let release = Release {
            id: new_id(),
            title: request.title.trim().to_string(),
            release_type: request.release_type.trim().to_string(),
            tracklist: request.tracklist.clone(),
            key_dates: request.key_dates.clone(),
            owners: request.owners.clone(),
            created_at: now_millis(),
            owner: self.owner(),
            ..Release::default()
        };
        self.insert_created(EntityRecord::Release(release.clone()));
        Ok(release)
    }

    fn create_recording_project(
        &self,
        request: &NewRecordingProject,
    ) -> BackendResult<RecordingProject> {
        self.take_failure()?;
        self.require_admin(&self.state.borrow())?;
        let project = RecordingProject {
            id: new_id(),
            title: request.title.trim().to_string(),
            status: request.status,
            participants: request.participants.clone(),
            session_date: request.session_date,
            notes: request.notes.clone(),
            created_at: now_millis(),
            owner: self.owner(),
            ..RecordingProject::default()
        };
        self.insert_created(EntityRecord::RecordingProject(project.clone()));
        Ok(project)
    }

    fn create_artist_development(
        &self,
        request: &NewArtistDevelopment,
    ) -> BackendResult<ArtistDevelopment> {
        self.take_failure()?;
        self.require_admin(&self.state.borrow())?;
        let entry = ArtistDevelopment {
            id: new_id(),
            artist_id: request.artist_id.trim().to_string(),
            goals: request.goals.clone(),
            plans: request.plans.clone(),
            milestones: request.milestones.clone(),
            internal_notes: request.internal_notes.clone(),
            created_at: now_millis(),
            owner: self.owner(),
            ..ArtistDevelopment::default()
        };
        self.insert_created(EntityRecord::ArtistDevelopment(entry.clone()));
        Ok(entry)
    }

    fn update_membership_profile(
        &self,
        update: &MembershipUpdate,
    ) -> BackendResult<MembershipProfile> {
        self.take_failure()?;
        let mut state = self.state.borrow_mut();
        let entity = EntityRef::new(EntityKind::Membership, update.id.trim());
        self.require_owner_or_admin(&state, &entity, "edit")?;
        match state.records.get_mut(&entity) {
            Some(EntityRecord::Membership(membership)) => {
                let profile = &mut membership.profile;
                profile.name = update.name.trim().to_string();
                profile.email = update.email.trim().to_string();
                profile.status = update.status;
                profile.updated_at = now_millis();
                debug!(
                    "event=memory_profile_write module=backend status=ok id={}",
                    entity.id
                );
                Ok(profile.clone())
            }
            _ => Err(BackendError::NotFound(entity)),
        }
    }

    fn add_publishing_work_notes(&self, id: &str, notes: &str) -> BackendResult<()> {
        self.take_failure()?;
        let mut state = self.state.borrow_mut();
        let entity = EntityRef::new(EntityKind::PublishingWork, id.trim());
        self.require_owner_or_admin(&state, &entity, "edit")?;
        match state.records.get_mut(&entity) {
            Some(EntityRecord::PublishingWork(work)) => {
                work.notes = notes.to_string();
                debug!(
                    "event=memory_notes_write module=backend status=ok id={} len={}",
                    entity.id,
                    notes.len()
                );
                Ok(())
            }
            _ => Err(BackendError::NotFound(entity)),
        }
    }

    fn update_links(&self, update: &LinkUpdate) -> BackendResult<()> {
        self.take_failure()?;
        let mut state = self.state.borrow_mut();
        let anchor_ref = update.anchor().clone();
        self.require_owner_or_admin(&state, &anchor_ref, "edit links of")?;
        let previous = state
            .records
            .get(&anchor_ref)
            .map(EntityRecord::link_sets)
            .ok_or_else(|| BackendError::NotFound(anchor_ref.clone()))?;

        for (kind, set) in update.target_sets().iter() {
            if !anchor_ref.kind.links_to(kind) {
                if set.is_empty() {
                    continue;
                }
                return Err(BackendError::Rejected(format!(
                    "{} records cannot link to {kind} records",
                    anchor_ref.kind
                )));
            }
            for id in set.iter() {
                let target = EntityRef::new(kind, id);
                if target == anchor_ref {
                    return Err(BackendError::Rejected(format!(
                        "{anchor_ref} cannot link to itself"
                    )));
                }
                if !state.records.contains_key(&target) {
                    return Err(BackendError::InvalidTarget(target));
                }
            }
        }

        for &kind in anchor_ref.kind.linkable_kinds() {
            let next = update.targets(kind);
            if let Some(ids) = state
                .records
                .get_mut(&anchor_ref)
                .and_then(|record| record.link_ids_mut(kind))
            {
                *ids = next.to_vec();
            }

            for removed in previous.get(kind).iter().filter(|id| !next.contains(id)) {
                let target = EntityRef::new(kind, removed);
                if let Some(ids) = state
                    .records
                    .get_mut(&target)
                    .and_then(|record| record.link_ids_mut(anchor_ref.kind))
                {
                    ids.retain(|id| *id != anchor_ref.id);
                }
            }

            for added in next.iter() {
                let target = EntityRef::new(kind, added);
                if let Some(ids) = state
                    .records
                    .get_mut(&target)
                    .and_then(|record| record.link_ids_mut(anchor_ref.kind))
                {
                    if !ids.iter().any(|id| *id == anchor_ref.id) {
                        ids.push(anchor_ref.id.clone());
                    }
                }
            }
        }

        state.link_writes += 1;
        debug!(
            "event=memory_links_write module=backend status=ok anchor={} links={}",
            anchor_ref,
            update.target_sets().total_len()
        );
        Ok(())
    }
}
