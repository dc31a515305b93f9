//! Session context: who is calling, with which role and approval.
//!
//! # Responsibility
//! - Load role and approval once per session and pass them explicitly.
//! - Decide portal access (sign-in, approval gate) from that context.
//!
//! # Invariants
//! - Anonymous sessions are guests, never approved, and never hit the backend.
//! - Admins bypass the approval gate.
//! - Context is refreshed explicitly after role or approval mutations.

use log::info;

use crate::backend::PortalBackend;
use crate::error::PortalResult;
use crate::model::{CallerIdentity, Identity, IdentityError, Principal, Role};

/// Provider of the signed-in identity.
pub trait IdentityProvider {
    fn current_identity(&self) -> Option<Identity>;
    fn login(&mut self) -> Result<Identity, IdentityError>;
    fn logout(&mut self);
}

/// Identity provider with a fixed principal, for tests and local tooling.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentityProvider {
    principal: Option<Principal>,
    signed_in: bool,
}

impl StaticIdentityProvider {
    /// Provider that logs in as `principal`; starts signed out.
    pub fn new(principal: Principal) -> Self {
        Self {
            principal: Some(principal),
            signed_in: false,
        }
    }

    /// Provider already signed in as `principal`.
    pub fn signed_in(principal: Principal) -> Self {
        Self {
            principal: Some(principal),
            signed_in: true,
        }
    }
}

impl IdentityProvider for StaticIdentityProvider {
    fn current_identity(&self) -> Option<Identity> {
        if !self.signed_in {
            return None;
        }
        self.principal.clone().map(Identity::new)
    }

    fn login(&mut self) -> Result<Identity, IdentityError> {
        let principal = self
            .principal
            .clone()
            .ok_or_else(|| IdentityError::LoginFailed("no principal configured".to_string()))?;
        self.signed_in = true;
        Ok(Identity::new(principal))
    }

    fn logout(&mut self) {
        self.signed_in = false;
    }
}

/// Portal access for the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    SignInRequired,
    PendingApproval,
    Granted,
}

/// Caller context passed to permission and option resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    identity: Option<Identity>,
    role: Role,
    approved: bool,
}

impl SessionContext {
    pub fn new(identity: Option<Identity>, role: Role, approved: bool) -> Self {
        Self {
            identity,
            role,
            approved,
        }
    }

    pub fn anonymous() -> Self {
        Self::new(None, Role::Guest, false)
    }

    /// Loads role and approval for the provider's current identity.
    pub fn load<B, P>(backend: &B, provider: &P) -> PortalResult<Self>
    where
        B: PortalBackend + ?Sized,
        P: IdentityProvider + ?Sized,
    {
        Self::for_identity(backend, provider.current_identity())
    }

    /// Loads role and approval for `identity`; anonymous when `None`.
    pub fn for_identity<B>(backend: &B, identity: Option<Identity>) -> PortalResult<Self>
    where
        B: PortalBackend + ?Sized,
    {
        let Some(identity) = identity else {
            return Ok(Self::anonymous());
        };
        let role = backend.caller_role()?;
        let approved = backend.is_caller_approved()?;
        info!(
            "event=session_load module=session status=ok role={} approved={}",
            role.as_str(),
            approved
        );
        Ok(Self::new(Some(identity), role, approved))
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Caller as a trait object for the permission resolver.
    pub fn caller(&self) -> Option<&dyn CallerIdentity> {
        self.identity
            .as_ref()
            .map(|identity| identity as &dyn CallerIdentity)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.identity.is_some() && self.role == Role::Admin
    }

    pub fn is_approved(&self) -> bool {
        self.approved
    }

    pub fn access(&self) -> AccessDecision {
        if self.identity.is_none() {
            return AccessDecision::SignInRequired;
        }
        if self.is_admin() || self.approved {
            return AccessDecision::Granted;
        }
        AccessDecision::PendingApproval
    }
}
