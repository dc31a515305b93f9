//! Portal use-case client.
//!
//! # Responsibility
//! - Provide stable entry points for portal views: reads, link editing,
//!   content edits, creation and role/approval administration.
//! - Route every read through the query cache and every write through the
//!   backend, invalidating the keys each write makes stale.
//!
//! # Invariants
//! - Reads fetch only when their cache key is idle; failed reads stay failed
//!   until `retry`.
//! - Writes never update cached records in place.
//! - Role and approval changes affecting the caller refresh the session.

use log::{info, warn};

use crate::backend::{BackendError, PortalBackend};
use crate::cache::{CacheKey, QueryCache, QueryState};
use crate::error::{PortalError, PortalResult};
use crate::links::LinkUpdate;
use crate::model::{
    ApprovalInfo, ApprovalStatus, ArtistDevelopment, CallerEntities, EntityKind, EntityRecord,
    EntityRef, Identity, MembershipProfile, MembershipUpdate, NewArtistDevelopment,
    NewMembership, NewPublishingWork, NewRecordingProject, NewRelease, Principal,
    PublishingWork, RecordingProject, Release, Role,
};
use crate::mutation::{submit_update, LinkEditor};
use crate::options::{related_labels, resolve_options, LinkableOptions, RelatedLabels};
use crate::permissions::can_edit_entity;
use crate::session::{AccessDecision, IdentityProvider, SessionContext};

/// Portal client for one signed-in (or anonymous) session.
pub struct PortalClient<B: PortalBackend> {
    backend: B,
    cache: QueryCache,
    session: SessionContext,
}

impl<B: PortalBackend> PortalClient<B> {
    /// Creates an anonymous client over `backend`.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            cache: QueryCache::new(),
            session: SessionContext::anonymous(),
        }
    }

    /// Creates a client for the provider's current identity.
    pub fn connect<P>(backend: B, provider: &P) -> PortalResult<Self>
    where
        P: IdentityProvider + ?Sized,
    {
        let mut client = Self::new(backend);
        client.set_identity(provider.current_identity())?;
        Ok(client)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn access(&self) -> AccessDecision {
        self.session.access()
    }

    /// Switches identity, dropping everything cached for the previous one.
    pub fn set_identity(&mut self, identity: Option<Identity>) -> PortalResult<AccessDecision> {
        self.cache.clear();
        self.session = SessionContext::new(identity, Role::Guest, false);
        self.refresh_session()
    }

    /// Re-reads role and approval for the current identity.
    pub fn refresh_session(&mut self) -> PortalResult<AccessDecision> {
        self.cache.invalidate(&CacheKey::CallerRole);
        self.cache.invalidate(&CacheKey::CallerApproval);

        let identity = self.session.identity().cloned();
        if identity.is_none() {
            self.session = SessionContext::anonymous();
            return Ok(self.session.access());
        }

        let role = self.fetch_role()?;
        let approved = self.fetch_approved()?;
        self.session = SessionContext::new(identity, role, approved);
        info!(
            "event=session_refresh module=client status=ok role={} approved={}",
            role.as_str(),
            approved
        );
        Ok(self.session.access())
    }

    /// Cached read of one record.
    pub fn record(&mut self, entity: &EntityRef) -> &QueryState<EntityRecord> {
        if matches!(self.cache.record(entity), QueryState::Idle) {
            let result = self
                .backend
                .get_record(entity)
                .map_err(|err| fetch_failed("record", err));
            self.cache
                .set_record(entity.clone(), QueryState::from_result(result));
        }
        self.cache.record(entity)
    }

    /// Cached read of every record of `kind`; admin-scoped.
    pub fn list(&mut self, kind: EntityKind) -> &QueryState<Vec<EntityRecord>> {
        if matches!(self.cache.list(kind), QueryState::Idle) {
            let result = self
                .backend
                .list_all(kind)
                .map_err(|err| fetch_failed("list", err));
            self.cache.set_list(kind, QueryState::from_result(result));
        }
        self.cache.list(kind)
    }

    /// Cached read of the caller aggregate.
    pub fn caller_entities(&mut self) -> &QueryState<CallerEntities> {
        if matches!(self.cache.caller_entities(), QueryState::Idle) {
            let result = self
                .backend
                .entities_for_caller()
                .map_err(|err| fetch_failed("caller_entities", err));
            self.cache
                .set_caller_entities(QueryState::from_result(result));
        }
        self.cache.caller_entities()
    }

    /// Cached read of the approval queue; admin-scoped.
    pub fn approvals(&mut self) -> &QueryState<Vec<ApprovalInfo>> {
        if matches!(self.cache.approvals(), QueryState::Idle) {
            let result = self
                .backend
                .list_approvals()
                .map_err(|err| fetch_failed("approvals", err));
            self.cache.set_approvals(QueryState::from_result(result));
        }
        self.cache.approvals()
    }

    /// Clears `key` so the next read fetches again.
    pub fn retry(&mut self, key: &CacheKey) {
        self.cache.invalidate(key);
    }

    /// Loads the reads the session's candidates come from and resolves them.
    pub fn linkable_options(&mut self) -> LinkableOptions {
        if self.session.is_admin() {
            for kind in EntityKind::ALL {
                self.list(kind);
            }
        } else if self.session.identity().is_some() {
            self.caller_entities();
        }
        resolve_options(&self.session, &self.cache)
    }

    /// Labels of every record linked from `entity`, grouped by kind.
    pub fn related_labels(&mut self, entity: &EntityRef) -> PortalResult<Vec<RelatedLabels>> {
        let record = self.fetch_record(entity)?;
        let options = self.linkable_options();
        Ok(related_labels(&options, &record))
    }

    /// Advisory edit permission for `record`.
    pub fn can_edit(&self, record: &EntityRecord) -> bool {
        can_edit_entity(&self.session, record)
    }

    /// Opens a link editor on `entity` when the caller may edit it.
    pub fn open_link_editor(&mut self, entity: &EntityRef) -> PortalResult<LinkEditor> {
        let record = self.fetch_record(entity)?;
        self.require_edit(&record)?;
        Ok(LinkEditor::opened(&record))
    }

    /// Submits the editor's draft when the caller may edit its anchor.
    pub fn submit_links(&mut self, editor: &mut LinkEditor) -> PortalResult<()> {
        if let Some(anchor) = editor.anchor().cloned() {
            let record = self.fetch_record(&anchor)?;
            self.require_edit(&record)?;
        }
        editor.submit(&self.backend, &mut self.cache)
    }

    /// Submits a complete link update for an anchor without an editor.
    pub fn update_links(&mut self, update: &LinkUpdate) -> PortalResult<()> {
        let record = self.fetch_record(update.anchor())?;
        self.require_edit(&record)?;
        submit_update(&self.backend, &mut self.cache, update, &record.link_sets())
    }

    /// Rewrites the editable profile fields of a membership.
    pub fn update_membership_profile(
        &mut self,
        update: &MembershipUpdate,
    ) -> PortalResult<MembershipProfile> {
        update.validate()?;
        let entity = EntityRef::new(EntityKind::Membership, update.id.trim());
        let record = self.fetch_record(&entity)?;
        self.require_edit(&record)?;
        let profile = self
            .backend
            .update_membership_profile(update)
            .map_err(|err| write_failed("update_membership_profile", err))?;
        self.after_content_edit(&entity);
        Ok(profile)
    }

    /// Replaces the notes of a publishing work.
    pub fn add_publishing_work_notes(&mut self, id: &str, notes: &str) -> PortalResult<()> {
        let entity = EntityRef::new(EntityKind::PublishingWork, id.trim());
        let record = self.fetch_record(&entity)?;
        self.require_edit(&record)?;
        self.backend
            .add_publishing_work_notes(&entity.id, notes)
            .map_err(|err| write_failed("add_publishing_work_notes", err))?;
        self.after_content_edit(&entity);
        Ok(())
    }

    pub fn create_membership(&mut self, request: &NewMembership) -> PortalResult<MembershipProfile> {
        request.validate()?;
        let profile = self
            .backend
            .create_membership(request)
            .map_err(|err| write_failed("create_membership", err))?;
        self.after_create(EntityKind::Membership, &profile.id);
        Ok(profile)
    }

    pub fn create_publishing_work(
        &mut self,
        request: &NewPublishingWork,
    ) -> PortalResult<PublishingWork> {
        request.validate()?;
        let work = self
            .backend
            .create_publishing_work(request)
            .map_err(|err| write_failed("create_publishing_work", err))?;
        self.after_create(EntityKind::PublishingWork, &work.id);
        Ok(work)
    }

    pub fn create_release(&mut self, request: &NewRelease) -> PortalResult<Release> {
        request.validate()?;
        let release = self
            .backend
            .create_release(request)
            .map_err(|err| write_failed("create_release", err))?;
        self.after_create(EntityKind::Release, &release.id);
        Ok(release)
    }

    pub fn create_recording_project(
        &mut self,
        request: &NewRecordingProject,
    ) -> PortalResult<RecordingProject> {
        request.validate()?;
        let project = self
            .backend
            .create_recording_project(request)
            .map_err(|err| write_failed("create_recording_project", err))?;
        self.after_create(EntityKind::RecordingProject, &project.id);
        Ok(project)
    }

    pub fn create_artist_development(
        &mut self,
        request: &NewArtistDevelopment,
    ) -> PortalResult<ArtistDevelopment> {
        request.validate()?;
        let entry = self
            .backend
            .create_artist_development(request)
            .map_err(|err| write_failed("create_artist_development", err))?;
        self.after_create(EntityKind::ArtistDevelopment, &entry.id);
        Ok(entry)
    }

    /// Asks for approval as the signed-in caller.
    pub fn request_approval(&mut self) -> PortalResult<AccessDecision> {
        self.backend
            .request_approval()
            .map_err(|err| write_failed("request_approval", err))?;
        self.cache.invalidate(&CacheKey::Approvals);
        info!("event=approval_request module=client status=ok");
        self.refresh_session()
    }

    /// Sets the approval status of the principal typed in `principal_text`.
    pub fn set_approval(&mut self, principal_text: &str, status: ApprovalStatus) -> PortalResult<()> {
        let principal = Principal::parse(principal_text)?;
        self.backend
            .set_approval(&principal, status)
            .map_err(|err| write_failed("set_approval", err))?;
        self.cache.invalidate(&CacheKey::Approvals);
        info!(
            "event=approval_set module=client status=ok target={} approval={:?}",
            principal, status
        );
        self.refresh_if_caller(&principal)
    }

    /// Assigns `role` to the principal typed in `principal_text`.
    pub fn assign_role(&mut self, principal_text: &str, role: Role) -> PortalResult<()> {
        let principal = Principal::parse(principal_text)?;
        self.backend
            .assign_role(&principal, role)
            .map_err(|err| write_failed("assign_role", err))?;
        self.cache.invalidate(&CacheKey::Approvals);
        info!(
            "event=role_assign module=client status=ok target={} role={}",
            principal,
            role.as_str()
        );
        self.refresh_if_caller(&principal)
    }

    fn refresh_if_caller(&mut self, principal: &Principal) -> PortalResult<()> {
        let is_caller = self
            .session
            .identity()
            .is_some_and(|identity| identity.principal_ref() == principal);
        if is_caller {
            self.refresh_session()?;
        }
        Ok(())
    }

    fn after_create(&mut self, kind: EntityKind, id: &str) {
        self.cache.invalidate(&CacheKey::List(kind));
        self.cache.invalidate(&CacheKey::CallerEntities);
        info!(
            "event=entity_create module=client status=ok kind={} id={}",
            kind, id
        );
    }

    fn after_content_edit(&mut self, entity: &EntityRef) {
        self.cache.invalidate(&CacheKey::Record(entity.clone()));
        self.cache.invalidate(&CacheKey::List(entity.kind));
        self.cache.invalidate(&CacheKey::CallerEntities);
        info!(
            "event=entity_update module=client status=ok entity={}",
            entity
        );
    }

    fn require_edit(&self, record: &EntityRecord) -> PortalResult<()> {
        if self.can_edit(record) {
            return Ok(());
        }
        Err(PortalError::Unauthorized(format!(
            "caller may not edit {}",
            record.entity_ref()
        )))
    }

    fn fetch_record(&mut self, entity: &EntityRef) -> PortalResult<EntityRecord> {
        settled(self.record(entity)).cloned()
    }

    fn fetch_role(&mut self) -> PortalResult<Role> {
        if matches!(self.cache.role(), QueryState::Idle) {
            let result = self
                .backend
                .caller_role()
                .map_err(|err| fetch_failed("caller_role", err));
            self.cache.set_role(QueryState::from_result(result));
        }
        settled(self.cache.role()).copied()
    }

    fn fetch_approved(&mut self) -> PortalResult<bool> {
        if matches!(self.cache.approved(), QueryState::Idle) {
            let result = self
                .backend
                .is_caller_approved()
                .map_err(|err| fetch_failed("caller_approval", err));
            self.cache.set_approved(QueryState::from_result(result));
        }
        settled(self.cache.approved()).copied()
    }
}

fn settled<T>(state: &QueryState<T>) -> PortalResult<&T> {
    match state {
        QueryState::Ready(value) => Ok(value),
        QueryState::Failed(err) => Err(err.clone()),
        QueryState::Idle | QueryState::Loading => Err(PortalError::Backend(
            BackendError::Unavailable("query has not settled".to_string()),
        )),
    }
}

fn fetch_failed(query: &str, err: BackendError) -> PortalError {
    let err = PortalError::from(err);
    warn!(
        "event=query_fetch module=client status=error query={} error_code={} error={}",
        query,
        err.code(),
        err
    );
    err
}

fn write_failed(operation: &str, err: BackendError) -> PortalError {
    let err = PortalError::from(err);
    warn!(
        "event=portal_write module=client status=error operation={} error_code={} error={}",
        operation,
        err.code(),
        err
    );
    err
}
