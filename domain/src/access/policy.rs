//! Access policy for model dispatch
//!
//! The policy is a pure function over the caller and the model's tier and
//! restriction class. It runs in every use case before any network call;
//! front-ends may additionally pre-check it for fast feedback, but the
//! use-case evaluation is the authoritative one.

use crate::catalog::descriptor::{RestrictionClass, Tier};
use serde::{Deserialize, Serialize};

/// Role of the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallerRole {
    Admin,
    #[default]
    User,
}

/// Identity of the caller, as reported by the identity source
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Caller {
    pub authenticated: bool,
    pub role: CallerRole,
    pub email: Option<String>,
}

impl Caller {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated_user(email: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            role: CallerRole::User,
            email: Some(email.into()),
        }
    }

    pub fn admin(email: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            role: CallerRole::Admin,
            email: Some(email.into()),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == CallerRole::Admin
    }
}

/// Why a caller was denied access to a model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// Premium models require an authenticated caller
    AuthRequired,
    /// Restricted models require an admin caller
    Forbidden,
}

/// Outcome of an access check. Derived per call, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Deny(DenyReason),
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allow)
    }
}

/// Evaluate the access rules, in order:
///
/// 1. AdminOnly restriction and a non-admin caller -> `Deny(Forbidden)`
/// 2. Premium tier and an unauthenticated caller -> `Deny(AuthRequired)`
/// 3. Otherwise -> `Allow`
pub fn authorize(caller: &Caller, tier: Tier, restriction: RestrictionClass) -> AccessDecision {
    if restriction == RestrictionClass::AdminOnly && !caller.is_admin() {
        return AccessDecision::Deny(DenyReason::Forbidden);
    }

    if tier == Tier::Premium && !caller.authenticated {
        return AccessDecision::Deny(DenyReason::AuthRequired);
    }

    AccessDecision::Allow
}
