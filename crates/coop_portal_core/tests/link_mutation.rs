use coop_portal_core::{
    ArtistDevelopment, BackendError, CacheKey, EditorState, EntityKind, EntityRecord, EntityRef,
    Identity, LinkEditor, LinkSet, LinkUpdate, MemoryBackend, PortalClient, PortalError,
    Principal, PublishingWork, QueryState, Release, Role,
};

const ADMIN: &str = "aaaaa-aa";
const MEMBER: &str = "rrkah-fqaaa";
const OUTSIDER: &str = "ryjl3-tyaaa";

fn principal(text: &str) -> Principal {
    Principal::parse(text).unwrap()
}

fn client_for(store: &MemoryBackend, text: &str) -> PortalClient<MemoryBackend> {
    let mut client = PortalClient::new(store.as_caller(principal(text)));
    client
        .set_identity(Some(Identity::new(principal(text))))
        .unwrap();
    client
}

fn seeded_store() -> MemoryBackend {
    let store = MemoryBackend::new();
    store.seed_role(principal(ADMIN), Role::Admin);
    store.seed_role(principal(MEMBER), Role::User);
    store.seed_approval(principal(MEMBER), coop_portal_core::ApprovalStatus::Approved);
    store.seed_approval(principal(OUTSIDER), coop_portal_core::ApprovalStatus::Approved);

    store.insert(Release {
        id: "r-1".to_string(),
        title: "First Light".to_string(),
        owner: Some(principal(MEMBER)),
        ..Release::default()
    });
    for (id, title) in [("w-1", "Blue Hour"), ("w-2", "Night Bus"), ("w-3", "Tideline")] {
        store.insert(PublishingWork {
            id: id.to_string(),
            title: title.to_string(),
            owner: Some(principal(ADMIN)),
            ..PublishingWork::default()
        });
    }
    store.insert(ArtistDevelopment {
        id: "a-1".to_string(),
        artist_id: "artist-ada".to_string(),
        owner: Some(principal(ADMIN)),
        ..ArtistDevelopment::default()
    });
    store
}

fn release_ref() -> EntityRef {
    EntityRef::new(EntityKind::Release, "r-1")
}

fn work_ref(id: &str) -> EntityRef {
    EntityRef::new(EntityKind::PublishingWork, id)
}

fn stored_links(store: &MemoryBackend, entity: &EntityRef, kind: EntityKind) -> LinkSet {
    store.stored(entity).unwrap().link_sets().get(kind).clone()
}

#[test]
fn owner_submits_links_and_backend_writes_reverse_side() {
    let store = seeded_store();
    let mut member = client_for(&store, MEMBER);

    let mut editor = member.open_link_editor(&release_ref()).unwrap();
    editor
        .set_selection(EntityKind::PublishingWork, ["w-1", "w-2"])
        .unwrap();
    member.submit_links(&mut editor).unwrap();

    assert_eq!(editor.state(), EditorState::Closed);
    assert_eq!(
        stored_links(&store, &release_ref(), EntityKind::PublishingWork),
        LinkSet::from_ids(["w-2", "w-1"])
    );
    for id in ["w-1", "w-2"] {
        assert!(stored_links(&store, &work_ref(id), EntityKind::Release).contains("r-1"));
    }
    assert!(stored_links(&store, &work_ref("w-3"), EntityKind::Release).is_empty());
}

#[test]
fn full_replacement_is_idempotent() {
    let store = seeded_store();
    let mut admin = client_for(&store, ADMIN);
    let update = LinkUpdate::new(release_ref())
        .with_targets(EntityKind::PublishingWork, ["w-1", "w-2"])
        .with_targets(EntityKind::ArtistDevelopment, ["a-1"]);

    admin.update_links(&update).unwrap();
    let first = store.stored(&release_ref()).unwrap();
    admin.update_links(&update).unwrap();
    let second = store.stored(&release_ref()).unwrap();

    assert_eq!(first.link_sets(), second.link_sets());
    assert_eq!(store.link_write_count(), 2);
    let artist = EntityRef::new(EntityKind::ArtistDevelopment, "a-1");
    let reverse = stored_links(&store, &artist, EntityKind::Release);
    assert_eq!(reverse.len(), 1);
}

#[test]
fn replacement_removes_dropped_targets_and_their_reverse_links() {
    let store = seeded_store();
    let mut admin = client_for(&store, ADMIN);
    admin
        .update_links(
            &LinkUpdate::new(release_ref()).with_targets(EntityKind::PublishingWork, ["w-1", "w-2"]),
        )
        .unwrap();
    admin
        .update_links(&LinkUpdate::new(release_ref()).with_targets(EntityKind::PublishingWork, ["w-2"]))
        .unwrap();

    assert_eq!(
        stored_links(&store, &release_ref(), EntityKind::PublishingWork),
        LinkSet::from_ids(["w-2"])
    );
    assert!(stored_links(&store, &work_ref("w-1"), EntityKind::Release).is_empty());
    assert!(stored_links(&store, &work_ref("w-2"), EntityKind::Release).contains("r-1"));
}

#[test]
fn untouched_kinds_are_cleared_by_a_replacement() {
    let store = seeded_store();
    let mut admin = client_for(&store, ADMIN);
    admin
        .update_links(&LinkUpdate::new(release_ref()).with_targets(EntityKind::ArtistDevelopment, ["a-1"]))
        .unwrap();
    admin
        .update_links(&LinkUpdate::new(release_ref()).with_targets(EntityKind::PublishingWork, ["w-3"]))
        .unwrap();

    assert!(stored_links(&store, &release_ref(), EntityKind::ArtistDevelopment).is_empty());
}

#[test]
fn success_invalidates_anchor_targets_and_aggregate() {
    let store = seeded_store();
    let mut member = client_for(&store, MEMBER);
    assert!(member.record(&release_ref()).ready().is_some());
    assert!(member.caller_entities().ready().is_some());

    let mut editor = member.open_link_editor(&release_ref()).unwrap();
    editor.toggle(EntityKind::PublishingWork, "w-1").unwrap();
    member.submit_links(&mut editor).unwrap();

    assert_eq!(member.cache().record(&release_ref()), &QueryState::Idle);
    assert_eq!(member.cache().record(&work_ref("w-1")), &QueryState::Idle);
    assert!(member.cache().caller_entities().is_loading());

    let refreshed = member.record(&release_ref()).ready().cloned().unwrap();
    assert!(refreshed
        .link_sets()
        .get(EntityKind::PublishingWork)
        .contains("w-1"));
}

#[test]
fn failed_submission_keeps_draft_cache_and_store_intact() {
    let store = seeded_store();
    let mut member = client_for(&store, MEMBER);
    let before = member.record(&release_ref()).ready().cloned().unwrap();

    let mut editor = member.open_link_editor(&release_ref()).unwrap();
    editor
        .set_selection(EntityKind::PublishingWork, ["w-3"])
        .unwrap();
    store.fail_next(BackendError::Unavailable("connection reset".to_string()));
    let err = member.submit_links(&mut editor).unwrap_err();

    assert!(err.is_transient());
    assert!(!err.user_message().is_empty());
    assert_eq!(editor.state(), EditorState::Editing);
    assert_eq!(editor.last_error(), Some(&err));
    assert!(editor.draft(EntityKind::PublishingWork).contains("w-3"));
    assert_eq!(member.cache().record(&release_ref()).ready(), Some(&before));
    assert_eq!(store.link_write_count(), 0);

    member.submit_links(&mut editor).unwrap();
    assert!(stored_links(&store, &release_ref(), EntityKind::PublishingWork).contains("w-3"));
}

#[test]
fn second_submission_while_saving_is_rejected() {
    let store = seeded_store();
    let mut member = client_for(&store, MEMBER);
    let mut editor = member.open_link_editor(&release_ref()).unwrap();

    let update = editor.prepare_submit().unwrap();
    assert_eq!(update.anchor(), &release_ref());
    assert!(matches!(
        member.submit_links(&mut editor),
        Err(PortalError::EditInProgress(_))
    ));
    assert_eq!(store.link_write_count(), 0);
}

#[test]
fn non_owner_cannot_open_editor_or_update() {
    let store = seeded_store();
    let mut outsider = client_for(&store, OUTSIDER);

    assert!(matches!(
        outsider.open_link_editor(&release_ref()),
        Err(PortalError::Unauthorized(_))
    ));
    let update = LinkUpdate::new(release_ref()).with_targets(EntityKind::PublishingWork, ["w-1"]);
    assert!(matches!(
        outsider.update_links(&update),
        Err(PortalError::Unauthorized(_))
    ));
    assert_eq!(store.link_write_count(), 0);
}

#[test]
fn backend_rejection_of_non_owner_surfaces_as_unauthorized() {
    let store = seeded_store();
    let outsider = store.as_caller(principal(OUTSIDER));
    let update = LinkUpdate::new(release_ref()).with_targets(EntityKind::PublishingWork, ["w-1"]);
    assert!(matches!(
        coop_portal_core::PortalBackend::update_links(&outsider, &update),
        Err(BackendError::Unauthorized(_))
    ));
}

#[test]
fn artist_self_link_never_reaches_backend() {
    let store = seeded_store();
    let mut admin = client_for(&store, ADMIN);
    let artist = EntityRef::new(EntityKind::ArtistDevelopment, "a-1");

    let mut editor = admin.open_link_editor(&artist).unwrap();
    editor
        .toggle(EntityKind::ArtistDevelopment, "a-1")
        .unwrap();
    assert!(matches!(
        admin.submit_links(&mut editor),
        Err(PortalError::InvalidLinks(_))
    ));
    assert_eq!(editor.state(), EditorState::Editing);
    assert_eq!(store.link_write_count(), 0);
}

#[test]
fn unknown_target_is_rejected_without_partial_writes() {
    let store = seeded_store();
    let mut admin = client_for(&store, ADMIN);
    let update = LinkUpdate::new(release_ref())
        .with_targets(EntityKind::PublishingWork, ["w-1", "w-missing"]);

    let err = admin.update_links(&update).unwrap_err();
    assert_eq!(
        err,
        PortalError::Backend(BackendError::InvalidTarget(work_ref("w-missing")))
    );
    assert!(stored_links(&store, &work_ref("w-1"), EntityKind::Release).is_empty());
}

#[test]
fn missing_anchor_reports_not_found() {
    let store = seeded_store();
    let mut admin = client_for(&store, ADMIN);
    let missing = EntityRef::new(EntityKind::Release, "r-gone");
    assert_eq!(
        admin.open_link_editor(&missing).unwrap_err(),
        PortalError::NotFound(missing.clone())
    );

    admin.retry(&CacheKey::Record(missing.clone()));
    store.insert(EntityRecord::Release(Release {
        id: "r-gone".to_string(),
        ..Release::default()
    }));
    assert!(admin.open_link_editor(&missing).is_ok());
}

#[test]
fn hand_built_editor_is_rechecked_on_submit() {
    let store = seeded_store();
    let mut outsider = client_for(&store, OUTSIDER);
    let release = store.stored(&release_ref()).unwrap();

    let mut editor = LinkEditor::opened(&release);
    editor
        .set_selection(EntityKind::PublishingWork, ["w-1"])
        .unwrap();
    assert!(matches!(
        outsider.submit_links(&mut editor),
        Err(PortalError::Unauthorized(_))
    ));
    assert_eq!(editor.state(), EditorState::Editing);
    assert_eq!(store.link_write_count(), 0);
}
