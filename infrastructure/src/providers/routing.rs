//! Model routing
//!
//! Translates public model ids to upstream ids and decides which lane
//! carries the call. The Restricted lane is resolved from the authoritative
//! catalog's restriction classes, never inferred from id prefixes alone; a
//! spoofed id string that merely looks restricted routes to Primary and
//! fails upstream.

use polychat_application::ModelCatalog;
use polychat_domain::RestrictionClass;
use std::collections::{HashMap, HashSet};

/// Upstream gateway lane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lane {
    /// General-purpose multi-model gateway (OpenRouter)
    Primary,
    /// Single-purpose gated gateway (Perplexity) with separate credentials
    Restricted,
}

/// Result of routing one public model id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub upstream_id: String,
    pub lane: Lane,
    /// The upstream model rejects system-role messages; fold them into the
    /// first user message before dispatch.
    pub fold_system: bool,
}

/// Upstream model families that reject system-role messages
const SYSTEM_REJECTING_FAMILY: &str = "google/gemma-3-27b-it";

/// Router from public model ids to upstream ids and lanes
pub struct ModelRouter {
    aliases: HashMap<String, String>,
    restricted_ids: HashSet<String>,
}

impl ModelRouter {
    /// Build a router whose Restricted lane membership is exactly the given
    /// id set.
    pub fn new(restricted_ids: HashSet<String>) -> Self {
        Self {
            aliases: default_aliases(),
            restricted_ids,
        }
    }

    /// Build a router from the catalog: every `AdminOnly` entry belongs to
    /// the Restricted lane, under both its full id and its bare upstream
    /// name (`perplexity/sonar` and `sonar` are the same model).
    pub fn from_catalog(catalog: &dyn ModelCatalog) -> Self {
        let mut restricted_ids = HashSet::new();
        for m in catalog.list_models() {
            if m.restriction == RestrictionClass::AdminOnly {
                restricted_ids.insert(restricted_upstream_name(&m.id));
                restricted_ids.insert(m.id);
            }
        }
        Self::new(restricted_ids)
    }

    /// Resolve a public model id. Unknown ids pass through unchanged to the
    /// Primary lane; an unresolvable id is not an error at this layer.
    pub fn resolve(&self, public_id: &str) -> Route {
        if self.restricted_ids.contains(public_id) {
            return Route {
                upstream_id: restricted_upstream_name(public_id),
                lane: Lane::Restricted,
                fold_system: false,
            };
        }

        let upstream_id = self
            .aliases
            .get(public_id)
            .cloned()
            .unwrap_or_else(|| public_id.to_string());

        let fold_system = upstream_id.contains(SYSTEM_REJECTING_FAMILY);

        Route {
            upstream_id,
            lane: Lane::Primary,
            fold_system,
        }
    }
}

/// Strip the provider prefix the Restricted upstream does not recognize.
fn restricted_upstream_name(public_id: &str) -> String {
    public_id
        .strip_prefix("perplexity/")
        .unwrap_or(public_id)
        .to_string()
}

/// Legacy short ids translated to fully qualified upstream ids. Ids already
/// fully qualified pass through via the identity fallback in `resolve`.
fn default_aliases() -> HashMap<String, String> {
    [
        ("gpt-4o", "openai/gpt-4o"),
        ("gpt-4o-mini", "openai/gpt-4o-mini"),
        ("claude-3-5-sonnet", "anthropic/claude-3.5-sonnet"),
        ("claude-3-5-haiku", "anthropic/claude-3.5-haiku"),
        ("gemini-2.0-flash", "google/gemini-2.0-flash"),
        ("gemini-1.5-pro", "google/gemini-pro-1.5"),
        ("deepseek-chat", "deepseek/deepseek-chat"),
        (
            "deepseek/deepseek-chat-v3-0324:free",
            "deepseek/deepseek-chat",
        ),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}
