use coop_portal_core::{
    ApprovalStatus, EntityKind, EntityRef, Identity, LinkedRecord, MemberStatus, MemoryBackend,
    NewArtistDevelopment, NewMembership, NewRecordingProject, NewRelease, PortalClient,
    PortalError, Principal, ProjectStatus, Role, ValidationError,
};

const ADMIN: &str = "aaaaa-aa";
const MEMBER: &str = "rrkah-fqaaa";

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
    store
}

#[test]
fn approved_member_creates_own_membership() {
    let store = seeded_store();
    let mut member = client_for(&store, MEMBER);
    assert!(member.caller_entities().ready().unwrap().is_empty());

    let profile = member
        .create_membership(&NewMembership {
            id: " member-001 ".to_string(),
            name: "Ada Lovelace".to_string(),
            email: "ada@example.org".to_string(),
        })
        .unwrap();

    assert_eq!(profile.id, "member-001");
    assert_eq!(profile.status, MemberStatus::Applicant);
    assert_eq!(profile.principal, Some(principal(MEMBER)));
    assert!(member.cache().caller_entities().is_loading());

    let entities = member.caller_entities().ready().cloned().unwrap();
    assert_eq!(entities.memberships.len(), 1);
    assert_eq!(entities.memberships[0].0, "member-001");
}

#[test]
fn duplicate_membership_id_is_rejected() {
    let store = seeded_store();
    let mut member = client_for(&store, MEMBER);
    let request = NewMembership {
        id: "member-001".to_string(),
        name: "Ada Lovelace".to_string(),
        email: "ada@example.org".to_string(),
    };
    member.create_membership(&request).unwrap();
    assert!(matches!(
        member.create_membership(&request),
        Err(PortalError::Backend(_))
    ));
}

#[test]
fn membership_requires_name_and_plausible_email() {
    let store = seeded_store();
    let mut member = client_for(&store, MEMBER);

    let blank_name = NewMembership {
        id: "member-001".to_string(),
        name: "  ".to_string(),
        email: "ada@example.org".to_string(),
    };
    assert_eq!(
        member.create_membership(&blank_name).unwrap_err(),
        PortalError::Validation(ValidationError::BlankField("name"))
    );

    let bad_email = NewMembership {
        name: "Ada".to_string(),
        email: "ada.example.org".to_string(),
        ..blank_name
    };
    assert!(matches!(
        member.create_membership(&bad_email),
        Err(PortalError::Validation(ValidationError::InvalidEmail(_)))
    ));
}

#[test]
fn admin_creates_every_catalog_kind_and_lists_refresh() {
    let store = seeded_store();
    let mut admin = client_for(&store, ADMIN);
    assert!(admin.list(EntityKind::Release).ready().unwrap().is_empty());

    let release = admin
        .create_release(&NewRelease {
            title: "First Light".to_string(),
            release_type: "EP".to_string(),
            tracklist: vec!["Blue Hour".to_string()],
            ..NewRelease::default()
        })
        .unwrap();
    assert!(admin.cache().list(EntityKind::Release).is_loading());
    assert_eq!(admin.list(EntityKind::Release).ready().unwrap().len(), 1);
    assert_eq!(release.owner, Some(principal(ADMIN)));

    let project = admin
        .create_recording_project(&NewRecordingProject {
            title: "Studio Week".to_string(),
            status: ProjectStatus::InProgress,
            ..NewRecordingProject::default()
        })
        .unwrap();
    assert_eq!(project.status, ProjectStatus::InProgress);

    let artist = admin
        .create_artist_development(&NewArtistDevelopment {
            artist_id: "artist-ada".to_string(),
            goals: vec!["First tour".to_string()],
            ..NewArtistDevelopment::default()
        })
        .unwrap();
    assert_eq!(artist.display_name(), Some("artist-ada"));
    assert_ne!(artist.id, project.id);

    let stored = store
        .stored(&EntityRef::new(EntityKind::RecordingProject, project.id.as_str()))
        .unwrap();
    assert_eq!(stored.display_name(), Some("Studio Week"));
}

#[test]
fn required_titles_are_checked_before_creation() {
    let store = seeded_store();
    let mut admin = client_for(&store, ADMIN);
    assert_eq!(
        admin
            .create_release(&NewRelease {
                title: "First Light".to_string(),
                ..NewRelease::default()
            })
            .unwrap_err(),
        PortalError::Validation(ValidationError::BlankField("release type"))
    );
    assert!(matches!(
        admin.create_recording_project(&NewRecordingProject::default()),
        Err(PortalError::Validation(ValidationError::BlankField(_)))
    ));
    assert!(matches!(
        admin.create_artist_development(&NewArtistDevelopment::default()),
        Err(PortalError::Validation(ValidationError::BlankField(_)))
    ));
}

#[test]
fn catalog_creation_is_admin_only() {
    let store = seeded_store();
    let mut member = client_for(&store, MEMBER);
    let err = member
        .create_release(&NewRelease {
            title: "First Light".to_string(),
            release_type: "single".to_string(),
            ..NewRelease::default()
        })
        .unwrap_err();
    assert!(matches!(err, PortalError::Unauthorized(_)));
    assert!(err.user_message().contains("permission"));
}
