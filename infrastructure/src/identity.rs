//! Config-backed identity provider
//!
//! A CLI process has no session to inspect; who it acts as comes from the
//! `[identity]` section of the config file.

use polychat_application::ports::identity::IdentityProvider;
use polychat_domain::Caller;

pub struct ConfigIdentityProvider {
    caller: Caller,
}

impl ConfigIdentityProvider {
    pub fn new(caller: Caller) -> Self {
        Self { caller }
    }
}

impl IdentityProvider for ConfigIdentityProvider {
    fn current_caller(&self) -> Caller {
        self.caller.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polychat_domain::CallerRole;

    #[test]
    fn returns_the_configured_caller() {
        let provider = ConfigIdentityProvider::new(Caller::admin("ops@example.com"));
        let caller = provider.current_caller();
        assert!(caller.authenticated);
        assert_eq!(caller.role, CallerRole::Admin);
    }
}
