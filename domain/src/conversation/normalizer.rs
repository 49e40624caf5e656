//! Conversation history normalization
//!
//! Several upstream providers enforce strict role alternation: ignoring
//! system messages, no two adjacent messages may share a role and the first
//! non-system message must be from the user. [`normalize`] repairs an
//! arbitrary history so it satisfies that constraint.
//!
//! One model family additionally rejects system-role messages outright;
//! [`fold_system_messages`] is the second, provider-triggered pass that
//! folds system content into the first user message. It runs after the
//! generic pass, never instead of it.

use crate::conversation::message::{Message, Role};

/// Synthetic user message inserted when a history starts with an assistant
/// turn, so the sequence still opens user -> assistant.
pub const CONTEXT_PLACEHOLDER: &str = "(Continuing from an earlier conversation.)";

/// Separator used when merging adjacent same-role messages.
const MERGE_SEPARATOR: &str = "\n\n";

/// Repair a message list so the non-system subsequence strictly alternates
/// roles starting with `user`. System messages are kept untouched, in their
/// original order, ahead of the alternating run.
pub fn normalize(messages: &[Message]) -> Vec<Message> {
    let system: Vec<Message> = messages.iter().filter(|m| m.is_system()).cloned().collect();
    let non_system: Vec<Message> = messages.iter().filter(|m| !m.is_system()).cloned().collect();

    let mut merged = merge_adjacent(non_system);

    if merged.first().is_some_and(|m| m.role == Role::Assistant) {
        merged.insert(0, Message::user(CONTEXT_PLACEHOLDER));
        // The insertion cannot create a same-role pair on its own, but a
        // second pass keeps the invariant unconditional.
        merged = merge_adjacent(merged);
    }

    let mut out = system;
    out.extend(merged);
    out
}

/// Fold all system message content into the front of the first user message.
///
/// For the model families that reject system-role messages entirely. If the
/// list has no user message, one is synthesized from the system text alone.
pub fn fold_system_messages(messages: &[Message]) -> Vec<Message> {
    let system_text: Vec<&str> = messages
        .iter()
        .filter(|m| m.is_system())
        .map(|m| m.content.as_str())
        .collect();

    let mut non_system: Vec<Message> =
        messages.iter().filter(|m| !m.is_system()).cloned().collect();

    if system_text.is_empty() {
        return non_system;
    }

    let folded = system_text.join("\n");

    match non_system.first_mut() {
        Some(first) if first.role == Role::User => {
            first.content = format!("{}{}{}", folded, MERGE_SEPARATOR, first.content);
            non_system
        }
        _ => {
            let mut out = vec![Message::user(folded)];
            out.extend(non_system);
            out
        }
    }
}

/// Merge consecutive messages that share a role, concatenating their content
/// with a blank-line separator and preserving order.
fn merge_adjacent(messages: Vec<Message>) -> Vec<Message> {
    let mut merged: Vec<Message> = Vec::with_capacity(messages.len());

    for message in messages {
        match merged.last_mut() {
            Some(last) if last.role == message.role => {
                last.content.push_str(MERGE_SEPARATOR);
                last.content.push_str(&message.content);
            }
            _ => merged.push(message),
        }
    }

    merged
}
