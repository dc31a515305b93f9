//! Edit permission resolver.
//!
//! # Invariants
//! - One rule for all five kinds: no identity denies, admin allows, missing
//!   owner denies, otherwise allow only on exact principal equality.
//! - Any failure while resolving the caller principal denies.
//! - The result is advisory for the UI; the backend authorizes writes.

use log::warn;

use crate::model::{CallerIdentity, EntityRecord, LinkedRecord, Principal};
use crate::session::SessionContext;

/// Why an edit was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    NoIdentity,
    MissingOwner,
    IdentityUnavailable,
    NotOwner,
}

/// Outcome of an edit permission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditDecision {
    Allow,
    Deny(DenyReason),
}

impl EditDecision {
    pub fn is_allowed(self) -> bool {
        self == Self::Allow
    }
}

/// Resolves edit permission for one record owner.
pub fn resolve_edit(
    caller: Option<&dyn CallerIdentity>,
    is_admin: bool,
    owner: Option<&Principal>,
) -> EditDecision {
    let Some(caller) = caller else {
        return EditDecision::Deny(DenyReason::NoIdentity);
    };
    if is_admin {
        return EditDecision::Allow;
    }
    let Some(owner) = owner else {
        return EditDecision::Deny(DenyReason::MissingOwner);
    };

    match caller.principal() {
        Ok(principal) if principal == *owner => EditDecision::Allow,
        Ok(_) => EditDecision::Deny(DenyReason::NotOwner),
        Err(err) => {
            warn!(
                "event=permission_check module=permissions status=error error_code=identity_unavailable error={}",
                err
            );
            EditDecision::Deny(DenyReason::IdentityUnavailable)
        }
    }
}

/// Boolean form of [`resolve_edit`].
pub fn can_edit(
    caller: Option<&dyn CallerIdentity>,
    is_admin: bool,
    owner: Option<&Principal>,
) -> bool {
    resolve_edit(caller, is_admin, owner).is_allowed()
}

/// Checks a typed record against the session.
pub fn can_edit_record<R: LinkedRecord>(session: &SessionContext, record: &R) -> bool {
    can_edit(
        session.caller(),
        session.is_admin(),
        record.governing_principal(),
    )
}

/// Checks a kind-tagged record against the session.
pub fn can_edit_entity(session: &SessionContext, record: &EntityRecord) -> bool {
    can_edit(
        session.caller(),
        session.is_admin(),
        record.governing_principal(),
    )
}

#[cfg(test)]
mod tests {
    use super::{resolve_edit, DenyReason, EditDecision};
    use crate::model::{Identity, Principal};

    #[test]
    fn admin_allows_even_without_owner() {
        let identity = Identity::new(Principal::from_trusted("aaaaa-aa"));
        assert_eq!(resolve_edit(Some(&identity), true, None), EditDecision::Allow);
    }

    #[test]
    fn missing_identity_denies_before_admin_check() {
        assert_eq!(
            resolve_edit(None, true, None),
            EditDecision::Deny(DenyReason::NoIdentity)
        );
    }
}
