//! Stable classification of upstream call failures
//!
//! Raw provider responses vary wildly; the rest of the system only ever sees
//! an [`ErrorKind`]. Classification happens once, at the gateway, from the
//! HTTP status plus a short excerpt of the provider's error body.

use serde::{Deserialize, Serialize};

/// How much of a provider error body is kept as an excerpt
const EXCERPT_LEN: usize = 200;

/// Stable failure categories for one upstream call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// HTTP 429. `hard_cap` marks a daily-quota signal that retrying cannot
    /// fix within the attempt budget.
    RateLimited {
        reset_hint: Option<String>,
        hard_cap: bool,
    },
    /// 404-class: the upstream has no endpoint serving this model
    EndpointNotFound,
    /// 404-class: the model exists but no provider is currently allowed
    NoProviderAvailable,
    /// 5xx from the upstream
    UpstreamServerError { status: u16 },
    /// Any other non-2xx status
    GenericUpstream { status: u16 },
    /// The model is inside a local cooldown window after earlier failures;
    /// no upstream call was made
    CooldownActive,
    /// The call exceeded its time budget
    Timeout,
}

impl ErrorKind {
    /// Classify an upstream HTTP failure.
    ///
    /// `provider_message` is the already-extracted human-readable part of
    /// the error body (see [`extract_provider_message`]).
    pub fn classify(status: u16, provider_message: &str, reset_hint: Option<String>) -> Self {
        match status {
            429 => ErrorKind::RateLimited {
                reset_hint,
                hard_cap: is_hard_cap(provider_message),
            },
            404 => {
                if provider_message.contains("No allowed providers") {
                    ErrorKind::NoProviderAvailable
                } else {
                    ErrorKind::EndpointNotFound
                }
            }
            s if s >= 500 => ErrorKind::UpstreamServerError { status: s },
            s => ErrorKind::GenericUpstream { status: s },
        }
    }

    /// Whether the retry policy may attempt this failure again
    pub fn is_transient(&self) -> bool {
        match self {
            ErrorKind::RateLimited { hard_cap, .. } => !hard_cap,
            ErrorKind::UpstreamServerError { .. } => true,
            ErrorKind::GenericUpstream { .. } => true,
            ErrorKind::Timeout => true,
            ErrorKind::CooldownActive => false,
            ErrorKind::EndpointNotFound | ErrorKind::NoProviderAvailable => false,
        }
    }

    /// Whether this failure should put the model into a cooldown window
    pub fn marks_unavailable(&self) -> bool {
        matches!(
            self,
            ErrorKind::EndpointNotFound
                | ErrorKind::NoProviderAvailable
                | ErrorKind::UpstreamServerError { .. }
        )
    }

    /// One short, actionable message per category. Rate-limit messages carry
    /// the reset hint when the upstream supplied one.
    pub fn user_message(&self, model_id: &str) -> String {
        match self {
            ErrorKind::RateLimited {
                reset_hint: Some(reset),
                ..
            } => format!(
                "{} is rate limited right now. Try again after {}.",
                model_id, reset
            ),
            ErrorKind::RateLimited {
                reset_hint: None, ..
            } => format!(
                "{} is rate limited right now. Try again in 10-60 seconds or pick another model.",
                model_id
            ),
            ErrorKind::EndpointNotFound => format!(
                "{} is not currently served by any endpoint. Pick another model.",
                model_id
            ),
            ErrorKind::NoProviderAvailable => format!(
                "No provider is currently available for {}. Pick another model.",
                model_id
            ),
            ErrorKind::UpstreamServerError { status } => format!(
                "The provider behind {} failed temporarily ({}). Try again shortly.",
                model_id, status
            ),
            ErrorKind::GenericUpstream { status } => {
                format!("Request to {} failed ({}).", model_id, status)
            }
            ErrorKind::CooldownActive => format!(
                "{} is cooling down after repeated failures. Try again later or pick another model.",
                model_id
            ),
            ErrorKind::Timeout => {
                format!("{} did not answer within the time budget.", model_id)
            }
        }
    }
}

fn is_hard_cap(provider_message: &str) -> bool {
    provider_message.contains("Daily limit reached") || provider_message.contains("limit_rpd")
}

/// Pull the human-readable message out of a provider error body.
///
/// Handles the common OpenRouter shapes (`error.message`,
/// `error.metadata.raw`, top-level `message`/`error`) and falls back to a
/// short excerpt of the raw body.
pub fn extract_provider_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();

    let message = parsed.as_ref().and_then(|v| {
        v.pointer("/error/message")
            .or_else(|| v.pointer("/error/metadata/raw"))
            .or_else(|| v.get("message"))
            .or_else(|| v.get("error"))
            .and_then(|m| m.as_str())
            .map(str::to_string)
    });

    let text = message.unwrap_or_else(|| body.to_string());
    if text.len() > EXCERPT_LEN {
        let mut end = EXCERPT_LEN;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        text[..end].to_string()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_429_with_hard_cap_signal() {
        let kind = ErrorKind::classify(429, "Daily limit reached for this key", None);
        assert_eq!(
            kind,
            ErrorKind::RateLimited {
                reset_hint: None,
                hard_cap: true
            }
        );
        assert!(!kind.is_transient());
    }

    #[test]
    fn classifies_ordinary_429_as_transient() {
        let kind = ErrorKind::classify(429, "Rate limit exceeded", Some("1717000000".into()));
        assert!(kind.is_transient());
        assert!(!kind.marks_unavailable());
    }

    #[test]
    fn classifies_404_variants() {
        assert_eq!(
            ErrorKind::classify(404, "No endpoints found for model", None),
            ErrorKind::EndpointNotFound
        );
        assert_eq!(
            ErrorKind::classify(404, "No allowed providers are available", None),
            ErrorKind::NoProviderAvailable
        );
        assert!(ErrorKind::classify(404, "", None).marks_unavailable());
    }

    #[test]
    fn classifies_server_errors_and_other_statuses() {
        assert_eq!(
            ErrorKind::classify(503, "", None),
            ErrorKind::UpstreamServerError { status: 503 }
        );
        assert_eq!(
            ErrorKind::classify(400, "bad request", None),
            ErrorKind::GenericUpstream { status: 400 }
        );
    }

    #[test]
    fn cooldown_is_terminal_and_does_not_mark_unavailability_again() {
        let kind = ErrorKind::CooldownActive;
        assert!(!kind.is_transient());
        assert!(!kind.marks_unavailable());
        assert!(kind.user_message("gpt-4o").contains("cooling down"));
    }

    #[test]
    fn rate_limit_message_includes_reset_hint_when_present() {
        let kind = ErrorKind::RateLimited {
            reset_hint: Some("30s".into()),
            hard_cap: false,
        };
        assert!(kind.user_message("gpt-4o").contains("30s"));
    }

    #[test]
    fn extracts_nested_openrouter_error_message() {
        let body = r#"{"error":{"message":"No endpoints found","code":404}}"#;
        assert_eq!(extract_provider_message(body), "No endpoints found");

        let body = r#"{"error":{"metadata":{"raw":"upstream exploded"}}}"#;
        assert_eq!(extract_provider_message(body), "upstream exploded");
    }

    #[test]
    fn falls_back_to_truncated_raw_body() {
        let body = "x".repeat(500);
        let msg = extract_provider_message(&body);
        assert_eq!(msg.len(), 200);
    }
}
