//! Helpers shared by the use cases

use crate::ports::model_catalog::ModelCatalog;
use polychat_domain::{
    AccessDecision, Caller, Message, PromptTemplate, RestrictionClass, Role, Tier, authorize,
    normalize,
};

/// Authorize one model for the caller.
///
/// A model id that is not in the catalog passes through with free tier and
/// no restriction; if it is bogus, the failure surfaces later as an upstream
/// 404-class error.
pub(crate) fn access_for(
    catalog: &dyn ModelCatalog,
    caller: &Caller,
    model_id: &str,
) -> AccessDecision {
    let (tier, restriction) = match catalog.find(model_id) {
        Some(descriptor) => (descriptor.tier(), descriptor.restriction),
        None => (Tier::Free, RestrictionClass::None),
    };
    authorize(caller, tier, restriction)
}

/// Build the outbound message list: the default system prompt followed by
/// the normalized history.
pub(crate) fn outbound_messages(history: &[Message]) -> Vec<Message> {
    let mut messages = vec![Message::system(PromptTemplate::default_system())];
    messages.extend(normalize(history));
    messages
}

/// Joined user-message text, recorded as the audit prompt.
pub(crate) fn audit_prompt(messages: &[Message]) -> String {
    messages
        .iter()
        .filter(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
