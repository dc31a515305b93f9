use coop_portal_core::permissions::{can_edit_entity, can_edit_record};
use coop_portal_core::{
    can_edit, resolve_edit, CallerIdentity, DenyReason, EditDecision, EntityKind, EntityRecord,
    Identity, IdentityError, Membership, MembershipProfile, Principal, Release, Role,
    SessionContext,
};
use serde_json::json;

struct ExpiredDelegation;

impl CallerIdentity for ExpiredDelegation {
    fn principal(&self) -> Result<Principal, IdentityError> {
        Err(IdentityError::Unavailable("delegation expired".to_string()))
    }
}

fn principal(text: &str) -> Principal {
    Principal::parse(text).unwrap()
}

fn owned_release(owner: Option<Principal>) -> Release {
    Release {
        id: "r-1".to_string(),
        title: "First Light".to_string(),
        owner,
        ..Release::default()
    }
}

#[test]
fn no_identity_always_denies() {
    let owner = principal("rrkah-fqaaa");
    for is_admin in [false, true] {
        assert_eq!(
            resolve_edit(None, is_admin, Some(&owner)),
            EditDecision::Deny(DenyReason::NoIdentity)
        );
        assert!(!can_edit(None, is_admin, None));
    }
}

#[test]
fn admin_allows_regardless_of_owner() {
    let admin = Identity::new(principal("aaaaa-aa"));
    let other = principal("rrkah-fqaaa");
    assert!(can_edit(Some(&admin), true, Some(&other)));
    assert!(can_edit(Some(&admin), true, None));
}

#[test]
fn missing_owner_denies_non_admin() {
    let caller = Identity::new(principal("rrkah-fqaaa"));
    assert_eq!(
        resolve_edit(Some(&caller), false, None),
        EditDecision::Deny(DenyReason::MissingOwner)
    );
}

#[test]
fn owner_match_is_exact_principal_equality() {
    let caller = Identity::new(principal("rrkah-fqaaa"));
    let same = principal("rrkah-fqaaa");
    let other = principal("ryjl3-tyaaa");
    assert_eq!(
        resolve_edit(Some(&caller), false, Some(&same)),
        EditDecision::Allow
    );
    assert_eq!(
        resolve_edit(Some(&caller), false, Some(&other)),
        EditDecision::Deny(DenyReason::NotOwner)
    );
}

#[test]
fn principal_resolution_failure_denies() {
    let owner = principal("rrkah-fqaaa");
    assert_eq!(
        resolve_edit(Some(&ExpiredDelegation), false, Some(&owner)),
        EditDecision::Deny(DenyReason::IdentityUnavailable)
    );
}

#[test]
fn session_helpers_apply_the_same_rule_to_every_kind() {
    let member = principal("rrkah-fqaaa");
    let session = SessionContext::new(Some(Identity::new(member.clone())), Role::User, true);

    let release = owned_release(Some(member.clone()));
    assert!(can_edit_record(&session, &release));
    assert!(!can_edit_record(&session, &owned_release(None)));

    let membership = EntityRecord::Membership(Membership {
        profile: MembershipProfile {
            id: "m-1".to_string(),
            principal: Some(member),
            ..MembershipProfile::default()
        },
        ..Membership::default()
    });
    assert!(can_edit_entity(&session, &membership));

    let anonymous = SessionContext::anonymous();
    assert!(!can_edit_entity(&anonymous, &membership));
}

#[test]
fn admin_role_without_identity_is_not_admin() {
    let session = SessionContext::new(None, Role::Admin, true);
    assert!(!session.is_admin());
    assert!(!can_edit_record(&session, &owned_release(None)));
}

#[test]
fn blank_stored_owner_counts_as_missing() {
    let caller = Identity::new(principal("rrkah-fqaaa"));
    let release = EntityRecord::decode(EntityKind::Release, json!({ "id": "r-1", "owner": "" }))
        .unwrap();
    let membership = EntityRecord::decode(
        EntityKind::Membership,
        json!({ "profile": { "id": "m-1", "principal": "  " } }),
    )
    .unwrap();

    for record in [&release, &membership] {
        assert!(record.governing_principal().is_none());
        assert_eq!(
            resolve_edit(Some(&caller), false, record.governing_principal()),
            EditDecision::Deny(DenyReason::MissingOwner)
        );
    }
}
