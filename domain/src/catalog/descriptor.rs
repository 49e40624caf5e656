//! Model descriptor value objects
//!
//! A [`ModelDescriptor`] is the core's read-only view of one catalog entry.
//! The catalog itself may be a static table or an external store; either
//! way, raw records cross into the typed world through exactly one seam:
//! [`ModelDescriptor::from_raw`].

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Cost tier of a model, derived from its prices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    /// Both input and output prices are zero
    Free,
    /// Any positive price
    Premium,
}

/// Restriction class of a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestrictionClass {
    #[default]
    None,
    /// Only admin callers may dispatch to this model
    AdminOnly,
}

/// One entry of the model catalog (Value Object)
///
/// `id` is globally unique and stable; the orchestration core never mutates
/// descriptors, it only reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub id: String,
    pub display_name: String,
    pub provider: String,
    /// USD per one million input tokens
    pub input_price_per_million: f64,
    /// USD per one million output tokens
    pub output_price_per_million: f64,
    pub context_window_tokens: u32,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub restriction: RestrictionClass,
}

fn default_active() -> bool {
    true
}

impl ModelDescriptor {
    /// Derive the cost tier from the prices.
    pub fn tier(&self) -> Tier {
        if self.input_price_per_million == 0.0 && self.output_price_per_million == 0.0 {
            Tier::Free
        } else {
            Tier::Premium
        }
    }

    pub fn is_free(&self) -> bool {
        self.tier() == Tier::Free
    }

    /// Parse one raw external catalog record into a typed descriptor.
    ///
    /// All schema uncertainty of the catalog source is isolated here:
    /// missing or mistyped fields fail with a descriptive error instead of
    /// leaking loosely-typed values into the rest of the core.
    pub fn from_raw(raw: &serde_json::Value) -> Result<Self, DomainError> {
        let id = required_str(raw, "id")?;

        let descriptor = Self {
            id: id.to_string(),
            display_name: raw
                .get("display_name")
                .or_else(|| raw.get("name"))
                .and_then(|v| v.as_str())
                .unwrap_or(id)
                .to_string(),
            provider: required_str(raw, "provider")?.to_string(),
            input_price_per_million: required_price(raw, "input_price_per_million", "inputPrice")?,
            output_price_per_million: required_price(
                raw,
                "output_price_per_million",
                "outputPrice",
            )?,
            context_window_tokens: raw
                .get("context_window_tokens")
                .or_else(|| raw.get("contextWindow"))
                .and_then(|v| v.as_u64())
                .unwrap_or(0) as u32,
            is_active: raw.get("is_active").and_then(|v| v.as_bool()).unwrap_or(true),
            restriction: raw
                .get("restriction")
                .map(|v| serde_json::from_value(v.clone()))
                .transpose()
                .map_err(|e| {
                    DomainError::InvalidCatalogRecord(format!(
                        "model {}: bad restriction class: {}",
                        id, e
                    ))
                })?
                .unwrap_or_default(),
        };

        if descriptor.input_price_per_million < 0.0 || descriptor.output_price_per_million < 0.0 {
            return Err(DomainError::InvalidCatalogRecord(format!(
                "model {}: negative price",
                id
            )));
        }

        Ok(descriptor)
    }
}

fn required_str<'a>(raw: &'a serde_json::Value, key: &str) -> Result<&'a str, DomainError> {
    raw.get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| DomainError::InvalidCatalogRecord(format!("missing field `{}`", key)))
}

fn required_price(
    raw: &serde_json::Value,
    key: &str,
    legacy_key: &str,
) -> Result<f64, DomainError> {
    raw.get(key)
        .or_else(|| raw.get(legacy_key))
        .and_then(|v| v.as_f64())
        .ok_or_else(|| DomainError::InvalidCatalogRecord(format!("missing field `{}`", key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn descriptor(input: f64, output: f64) -> ModelDescriptor {
        ModelDescriptor {
            id: "m".into(),
            display_name: "M".into(),
            provider: "openrouter".into(),
            input_price_per_million: input,
            output_price_per_million: output,
            context_window_tokens: 128_000,
            is_active: true,
            restriction: RestrictionClass::None,
        }
    }

    #[test]
    fn tier_is_free_only_when_both_prices_are_zero() {
        assert_eq!(descriptor(0.0, 0.0).tier(), Tier::Free);
        assert_eq!(descriptor(0.0, 0.3).tier(), Tier::Premium);
        assert_eq!(descriptor(3.0, 0.0).tier(), Tier::Premium);
        assert_eq!(descriptor(3.0, 15.0).tier(), Tier::Premium);
    }

    #[test]
    fn from_raw_parses_a_full_record() {
        let raw = json!({
            "id": "claude-3-5-sonnet",
            "display_name": "Claude 3.5 Sonnet",
            "provider": "anthropic",
            "input_price_per_million": 3.0,
            "output_price_per_million": 15.0,
            "context_window_tokens": 200_000,
            "restriction": "none",
        });
        let d = ModelDescriptor::from_raw(&raw).unwrap();
        assert_eq!(d.id, "claude-3-5-sonnet");
        assert_eq!(d.tier(), Tier::Premium);
        assert!(d.is_active);
    }

    #[test]
    fn from_raw_accepts_legacy_field_names() {
        let raw = json!({
            "id": "google/gemini-2.0-flash-exp:free",
            "name": "Gemini 2.0 Flash (Free)",
            "provider": "google",
            "inputPrice": 0.0,
            "outputPrice": 0.0,
            "contextWindow": 1_048_576,
        });
        let d = ModelDescriptor::from_raw(&raw).unwrap();
        assert_eq!(d.display_name, "Gemini 2.0 Flash (Free)");
        assert_eq!(d.tier(), Tier::Free);
        assert_eq!(d.context_window_tokens, 1_048_576);
    }

    #[test]
    fn from_raw_parses_admin_only_restriction() {
        let raw = json!({
            "id": "perplexity/sonar",
            "provider": "perplexity",
            "input_price_per_million": 1.0,
            "output_price_per_million": 1.0,
            "restriction": "admin_only",
        });
        let d = ModelDescriptor::from_raw(&raw).unwrap();
        assert_eq!(d.restriction, RestrictionClass::AdminOnly);
    }

    #[test]
    fn from_raw_rejects_missing_or_invalid_fields() {
        assert!(ModelDescriptor::from_raw(&json!({"provider": "x"})).is_err());
        assert!(ModelDescriptor::from_raw(&json!({"id": "m"})).is_err());
        assert!(
            ModelDescriptor::from_raw(&json!({
                "id": "m",
                "provider": "x",
                "input_price_per_million": -1.0,
                "output_price_per_million": 0.0,
            }))
            .is_err()
        );
    }
}
