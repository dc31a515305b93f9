//! Link mutation protocol.
//!
//! # Responsibility
//! - Hold the draft link sets of one anchor while the user edits them.
//! - Submit drafts as full-replacement updates and invalidate every cache
//!   key the backend's reverse writes may have touched.
//!
//! # Invariants
//! - At most one submission per editor is in flight.
//! - A failed submission changes neither the cache nor the draft; the editor
//!   returns to `Editing` with the error kept for display.
//! - A successful submission closes the editor; redisplay re-fetches.

use log::{info, warn};
use std::collections::BTreeSet;

use crate::backend::PortalBackend;
use crate::cache::{CacheKey, QueryCache};
use crate::error::{PortalError, PortalResult};
use crate::links::{LinkSet, LinkSets, LinkUpdate, LinkValidationError};
use crate::model::{EntityKind, EntityRecord, EntityRef};

/// Lifecycle of a link editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorState {
    #[default]
    Closed,
    Editing,
    Saving,
}

impl EditorState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Editing => "editing",
            Self::Saving => "saving",
        }
    }
}

/// Draft link selections for one anchor record.
#[derive(Debug, Clone, Default)]
pub struct LinkEditor {
    anchor: Option<EntityRef>,
    original: LinkSets,
    draft: LinkSets,
    state: EditorState,
    last_error: Option<PortalError>,
}

impl LinkEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Editor opened on `record` with its current links as the draft.
    pub fn opened(record: &EntityRecord) -> Self {
        let mut editor = Self::new();
        editor.reset_to(record);
        editor
    }

    /// Opens the editor on `record`, discarding any previous draft.
    ///
    /// # Errors
    /// - `EditInProgress` while a submission is still in flight.
    pub fn open(&mut self, record: &EntityRecord) -> PortalResult<()> {
        if self.state == EditorState::Saving {
            return Err(PortalError::EditInProgress(self.anchor_or(record)));
        }
        self.reset_to(record);
        Ok(())
    }

    pub fn anchor(&self) -> Option<&EntityRef> {
        self.anchor.as_ref()
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    /// Current draft for `kind`.
    pub fn draft(&self, kind: EntityKind) -> &LinkSet {
        self.draft.get(kind)
    }

    pub fn draft_sets(&self) -> &LinkSets {
        &self.draft
    }

    /// Link sets the editor was opened with.
    pub fn original_sets(&self) -> &LinkSets {
        &self.original
    }

    /// Replaces the draft selection for `kind`.
    pub fn set_selection<I, S>(&mut self, kind: EntityKind, ids: I) -> PortalResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.require_editing(kind)?;
        self.draft.replace(kind, LinkSet::from_ids(ids));
        Ok(())
    }

    /// Flips selection of one target; returns whether it is now selected.
    pub fn toggle(&mut self, kind: EntityKind, id: &str) -> PortalResult<bool> {
        self.require_editing(kind)?;
        let set = self.draft.get_mut(kind);
        if set.remove(id) {
            return Ok(false);
        }
        set.insert(id);
        Ok(true)
    }

    /// Returns whether the draft differs from the opened link sets.
    pub fn is_dirty(&self) -> bool {
        self.draft != self.original
    }

    /// Validates the draft and moves the editor to `Saving`.
    ///
    /// # Errors
    /// - `EditorClosed` when nothing is open.
    /// - `EditInProgress` when a submission is already in flight.
    /// - `InvalidLinks` when the draft fails validation; the editor stays in
    ///   `Editing`.
    pub fn prepare_submit(&mut self) -> PortalResult<LinkUpdate> {
        let anchor = self.current_anchor()?;
        match self.state {
            EditorState::Saving => return Err(PortalError::EditInProgress(anchor)),
            EditorState::Closed => return Err(PortalError::EditorClosed),
            EditorState::Editing => {}
        }

        let update = LinkUpdate::from_sets(anchor, &self.draft);
        if let Err(err) = update.validate() {
            let err = PortalError::from(err);
            self.last_error = Some(err.clone());
            return Err(err);
        }

        self.state = EditorState::Saving;
        self.last_error = None;
        Ok(update)
    }

    /// Applies the backend outcome of a prepared submission.
    ///
    /// On success the affected cache keys are invalidated and the editor
    /// closes; on failure the draft and cache are left untouched.
    pub fn complete_submit(
        &mut self,
        result: PortalResult<()>,
        cache: &mut QueryCache,
    ) -> PortalResult<()> {
        let anchor = self.current_anchor()?;
        if self.state != EditorState::Saving {
            return Err(PortalError::EditorClosed);
        }

        match result {
            Ok(()) => {
                let keys = affected_keys(&anchor, &self.original, &self.draft);
                cache.invalidate_all(&keys);
                info!(
                    "event=links_update module=mutation status=ok anchor={} links={} invalidated={}",
                    anchor,
                    self.draft.total_len(),
                    keys.len()
                );
                self.close();
                Ok(())
            }
            Err(err) => {
                warn!(
                    "event=links_update module=mutation status=error anchor={} error_code={} error={}",
                    anchor,
                    err.code(),
                    err
                );
                self.state = EditorState::Editing;
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Prepares, sends and completes one submission.
    pub fn submit<B>(&mut self, backend: &B, cache: &mut QueryCache) -> PortalResult<()>
    where
        B: PortalBackend + ?Sized,
    {
        let update = self.prepare_submit()?;
        let result = backend.update_links(&update).map_err(PortalError::from);
        self.complete_submit(result, cache)
    }

    /// Discards the draft; refused while a submission is in flight.
    pub fn cancel(&mut self) -> PortalResult<()> {
        if self.state == EditorState::Saving {
            let anchor = self.current_anchor()?;
            return Err(PortalError::EditInProgress(anchor));
        }
        self.close();
        Ok(())
    }

    /// Error of the last failed submission, kept until the next attempt.
    pub fn last_error(&self) -> Option<&PortalError> {
        self.last_error.as_ref()
    }

    fn reset_to(&mut self, record: &EntityRecord) {
        let sets = record.link_sets();
        self.anchor = Some(record.entity_ref());
        self.draft = sets.clone();
        self.original = sets;
        self.state = EditorState::Editing;
        self.last_error = None;
    }

    fn close(&mut self) {
        self.anchor = None;
        self.original = LinkSets::default();
        self.draft = LinkSets::default();
        self.state = EditorState::Closed;
        self.last_error = None;
    }

    fn anchor_or(&self, record: &EntityRecord) -> EntityRef {
        self.anchor.clone().unwrap_or_else(|| record.entity_ref())
    }

    fn current_anchor(&self) -> PortalResult<EntityRef> {
        self.anchor.clone().ok_or(PortalError::EditorClosed)
    }

    fn require_editing(&self, kind: EntityKind) -> PortalResult<()> {
        let anchor = self.current_anchor()?;
        match self.state {
            EditorState::Editing => {}
            EditorState::Saving => return Err(PortalError::EditInProgress(anchor)),
            EditorState::Closed => return Err(PortalError::EditorClosed),
        }
        if !anchor.kind.links_to(kind) {
            return Err(PortalError::InvalidLinks(
                LinkValidationError::KindNotLinkable {
                    anchor_kind: anchor.kind,
                    target_kind: kind,
                },
            ));
        }
        Ok(())
    }
}

/// Submits a link update outside an editor.
///
/// `before` is the client's last view of the anchor's links; it widens the
/// invalidation to targets the update removes.
pub fn submit_update<B>(
    backend: &B,
    cache: &mut QueryCache,
    update: &LinkUpdate,
    before: &LinkSets,
) -> PortalResult<()>
where
    B: PortalBackend + ?Sized,
{
    update.validate()?;
    if let Err(err) = backend.update_links(update) {
        let err = PortalError::from(err);
        warn!(
            "event=links_update module=mutation status=error anchor={} error_code={} error={}",
            update.anchor(),
            err.code(),
            err
        );
        return Err(err);
    }

    let keys = affected_keys(update.anchor(), before, update.target_sets());
    cache.invalidate_all(&keys);
    info!(
        "event=links_update module=mutation status=ok anchor={} links={} invalidated={}",
        update.anchor(),
        update.target_sets().total_len(),
        keys.len()
    );
    Ok(())
}

/// Cache keys a successful update of `anchor` makes stale.
///
/// Covers the anchor record and list, every target in the union of the old
/// and new sets together with its list, and the caller aggregate.
pub fn affected_keys(anchor: &EntityRef, before: &LinkSets, after: &LinkSets) -> Vec<CacheKey> {
    let mut keys = BTreeSet::new();
    keys.insert(CacheKey::Record(anchor.clone()));
    keys.insert(CacheKey::List(anchor.kind));
    keys.insert(CacheKey::CallerEntities);

    for &kind in anchor.kind.linkable_kinds() {
        let touched = before.get(kind).union(after.get(kind));
        if touched.is_empty() {
            continue;
        }
        keys.insert(CacheKey::List(kind));
        for id in touched.iter() {
            keys.insert(CacheKey::Record(EntityRef::new(kind, id)));
        }
    }

    keys.into_iter().collect()
}
