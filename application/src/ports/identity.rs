//! Identity port

use polychat_domain::Caller;

/// Source of the current caller's identity.
///
/// The access policy trusts what this port reports; a networked deployment
/// backs it with verification of a signed credential rather than a
/// client-asserted role.
pub trait IdentityProvider: Send + Sync {
    fn current_caller(&self) -> Caller;
}
