use coop_portal_core::{
    ApprovalStatus, BackendError, CacheKey, EntityKind, EntityRecord, EntityRef, Identity,
    MemberStatus, Membership, MembershipProfile, MembershipUpdate, MemoryBackend, PortalClient,
    PortalError, Principal, PublishingWork, QueryState, Role, ValidationError,
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
    store.seed_approval(principal(MEMBER), ApprovalStatus::Approved);
    store.seed_approval(principal(OUTSIDER), ApprovalStatus::Approved);

    store.insert(Membership {
        profile: MembershipProfile {
            id: "m-1".to_string(),
            name: "Ada Lovelace".to_string(),
            email: "ada@example.org".to_string(),
            principal: Some(principal(MEMBER)),
            ..MembershipProfile::default()
        },
        ..Membership::default()
    });
    store.insert(PublishingWork {
        id: "w-1".to_string(),
        title: "Blue Hour".to_string(),
        owner: Some(principal(MEMBER)),
        ..PublishingWork::default()
    });
    store
}

fn membership_ref() -> EntityRef {
    EntityRef::new(EntityKind::Membership, "m-1")
}

fn work_ref() -> EntityRef {
    EntityRef::new(EntityKind::PublishingWork, "w-1")
}

fn profile_update(name: &str) -> MembershipUpdate {
    MembershipUpdate {
        id: "m-1".to_string(),
        name: name.to_string(),
        email: "ada@example.org".to_string(),
        status: MemberStatus::Active,
    }
}

fn stored_profile(store: &MemoryBackend) -> MembershipProfile {
    match store.stored(&membership_ref()).unwrap() {
        EntityRecord::Membership(membership) => membership.profile,
        other => panic!("unexpected record {other:?}"),
    }
}

fn stored_notes(store: &MemoryBackend) -> String {
    match store.stored(&work_ref()).unwrap() {
        EntityRecord::PublishingWork(work) => work.notes,
        other => panic!("unexpected record {other:?}"),
    }
}

#[test]
fn owner_updates_membership_profile() {
    let store = seeded_store();
    let mut member = client_for(&store, MEMBER);
    assert!(member.record(&membership_ref()).ready().is_some());

    let profile = member
        .update_membership_profile(&profile_update(" Ada King "))
        .unwrap();

    assert_eq!(profile.name, "Ada King");
    assert_eq!(profile.status, MemberStatus::Active);
    assert!(profile.updated_at > 0);
    assert_eq!(stored_profile(&store), profile);
    assert_eq!(member.cache().record(&membership_ref()), &QueryState::Idle);
    assert!(member.cache().caller_entities().is_loading());

    let refreshed = member.record(&membership_ref()).ready().cloned().unwrap();
    assert_eq!(refreshed.display_name(), Some("Ada King"));
}

#[test]
fn admin_edits_content_of_records_it_does_not_own() {
    let store = seeded_store();
    let mut admin = client_for(&store, ADMIN);
    assert!(admin.list(EntityKind::PublishingWork).ready().is_some());

    admin
        .update_membership_profile(&profile_update("Ada Byron"))
        .unwrap();
    admin
        .add_publishing_work_notes("w-1", "Registered with the society.")
        .unwrap();

    assert_eq!(stored_profile(&store).name, "Ada Byron");
    assert_eq!(stored_notes(&store), "Registered with the society.");
    assert!(admin.cache().list(EntityKind::PublishingWork).is_loading());
    assert!(admin.cache().list(EntityKind::Membership).is_loading());
}

#[test]
fn non_owner_content_edits_are_refused() {
    let store = seeded_store();
    let mut outsider = client_for(&store, OUTSIDER);

    assert!(matches!(
        outsider.update_membership_profile(&profile_update("Mallory")),
        Err(PortalError::Unauthorized(_))
    ));
    assert!(matches!(
        outsider.add_publishing_work_notes("w-1", "overwritten"),
        Err(PortalError::Unauthorized(_))
    ));
    assert_eq!(stored_profile(&store).name, "Ada Lovelace");
    assert!(stored_notes(&store).is_empty());
}

#[test]
fn backend_refuses_non_owner_content_edits() {
    let store = seeded_store();
    let outsider = store.as_caller(principal(OUTSIDER));
    assert!(matches!(
        coop_portal_core::PortalBackend::add_publishing_work_notes(&outsider, "w-1", "x"),
        Err(BackendError::Unauthorized(_))
    ));
    assert!(matches!(
        coop_portal_core::PortalBackend::update_membership_profile(
            &outsider,
            &profile_update("Mallory")
        ),
        Err(BackendError::Unauthorized(_))
    ));
}

#[test]
fn owner_replaces_work_notes() {
    let store = seeded_store();
    let mut member = client_for(&store, MEMBER);

    member.add_publishing_work_notes("w-1", "First draft").unwrap();
    member.add_publishing_work_notes(" w-1 ", "Second draft").unwrap();

    assert_eq!(stored_notes(&store), "Second draft");
    assert_eq!(member.cache().record(&work_ref()), &QueryState::Idle);
}

#[test]
fn invalid_profile_update_never_reaches_the_backend() {
    let store = seeded_store();
    let mut member = client_for(&store, MEMBER);
    store.fail_next(BackendError::Unavailable("should stay queued".to_string()));

    assert_eq!(
        member.update_membership_profile(&profile_update("  ")).unwrap_err(),
        PortalError::Validation(ValidationError::BlankField("name"))
    );
    assert!(matches!(
        member.update_membership_profile(&MembershipUpdate {
            email: "not-an-email".to_string(),
            ..profile_update("Ada")
        }),
        Err(PortalError::Validation(ValidationError::InvalidEmail(_)))
    ));
    assert!(store.stored(&membership_ref()).is_some());
    member.retry(&CacheKey::Record(membership_ref()));
    assert!(member.record(&membership_ref()).error().is_some());
}

#[test]
fn failed_write_keeps_cached_record() {
    let store = seeded_store();
    let mut member = client_for(&store, MEMBER);
    let before = member.record(&work_ref()).ready().cloned().unwrap();

    store.fail_next(BackendError::Unavailable("connection reset".to_string()));
    let err = member
        .add_publishing_work_notes("w-1", "lost")
        .unwrap_err();

    assert!(err.is_transient());
    assert_eq!(member.cache().record(&work_ref()).ready(), Some(&before));
    assert!(stored_notes(&store).is_empty());
}

#[test]
fn missing_record_reports_not_found() {
    let store = seeded_store();
    let mut admin = client_for(&store, ADMIN);
    assert_eq!(
        admin
            .add_publishing_work_notes("w-gone", "notes")
            .unwrap_err(),
        PortalError::NotFound(EntityRef::new(EntityKind::PublishingWork, "w-gone"))
    );
}
