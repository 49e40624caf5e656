//! Console output formatting

use colored::Colorize;
use polychat_application::HealthRecord;
use polychat_domain::{ModelDescriptor, RestrictionClass, SynthesisOutcome, Tier};

/// Format a full synthesis outcome: per-model answers plus the synthesis
pub fn format_full(question: &str, outcome: &SynthesisOutcome) -> String {
    let mut output = String::new();

    output.push_str(&format!("{} {}\n\n", "Question:".cyan().bold(), question));

    output.push_str(&format!("{}\n", "Per-model answers".cyan().bold()));
    for answer in &outcome.per_model_responses {
        output.push_str(&format!(
            "\n{}\n{}\n",
            format!("── {} ──", answer.model_id).yellow().bold(),
            answer.content
        ));
    }

    output.push_str(&format!("\n{}\n\n", "Synthesis".cyan().bold()));
    output.push_str(&outcome.synthesis);
    output.push('\n');

    output
}

/// Format only the final synthesis
pub fn format_synthesis_only(outcome: &SynthesisOutcome) -> String {
    format!("{}\n", outcome.synthesis)
}

/// Format as JSON
pub fn format_json(outcome: &SynthesisOutcome) -> String {
    serde_json::to_string_pretty(outcome).unwrap_or_else(|_| "{}".to_string())
}

/// Format the model catalog as an aligned listing. Fresh health rows, when
/// present, annotate the matching models.
pub fn format_catalog(models: &[ModelDescriptor], health: &[HealthRecord]) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "{:<42} {:<10} {:<8} {:>12}  {}\n",
        "MODEL".bold(),
        "PROVIDER".bold(),
        "TIER".bold(),
        "CONTEXT".bold(),
        "NOTES".bold()
    ));

    for model in models {
        let tier = match model.tier() {
            Tier::Free => "free".green(),
            Tier::Premium => "premium".yellow(),
        };
        let mut notes = Vec::new();
        if model.restriction == RestrictionClass::AdminOnly {
            notes.push("admin-only".to_string());
        }
        if !model.is_active {
            notes.push("inactive".to_string());
        }
        if let Some(record) = health.iter().find(|r| r.model_id == model.id) {
            if record.is_available {
                notes.push("available".to_string());
            } else {
                notes.push(format!("{}", "unavailable".red()));
            }
        }
        output.push_str(&format!(
            "{:<42} {:<10} {:<8} {:>12}  {}\n",
            model.id,
            model.provider,
            tier,
            model.context_window_tokens,
            notes.join(", ")
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use polychat_domain::ModelAnswer;

    fn outcome() -> SynthesisOutcome {
        SynthesisOutcome {
            per_model_responses: vec![
                ModelAnswer {
                    model_id: "m1".into(),
                    content: "first answer".into(),
                },
                ModelAnswer {
                    model_id: "m2".into(),
                    content: "second answer".into(),
                },
            ],
            synthesis: "merged answer".into(),
        }
    }

    #[test]
    fn full_format_contains_every_answer_and_the_synthesis() {
        let text = format_full("why", &outcome());
        assert!(text.contains("m1"));
        assert!(text.contains("first answer"));
        assert!(text.contains("m2"));
        assert!(text.contains("merged answer"));
    }

    #[test]
    fn synthesis_only_format_drops_per_model_answers() {
        let text = format_synthesis_only(&outcome());
        assert!(text.contains("merged answer"));
        assert!(!text.contains("first answer"));
    }

    #[test]
    fn catalog_listing_annotates_fresh_health_rows() {
        let models = vec![ModelDescriptor {
            id: "deepseek-chat".into(),
            display_name: "DeepSeek V3".into(),
            provider: "deepseek".into(),
            input_price_per_million: 0.14,
            output_price_per_million: 0.28,
            context_window_tokens: 64_000,
            is_active: true,
            restriction: RestrictionClass::None,
        }];
        let health = vec![HealthRecord::unavailable(
            "deepseek-chat",
            chrono::Utc::now(),
            "502",
        )];

        colored::control::set_override(false);
        let text = format_catalog(&models, &health);
        assert!(text.contains("unavailable"));
        let text = format_catalog(&models, &[]);
        assert!(!text.contains("unavailable"));
    }

    #[test]
    fn json_format_round_trips() {
        let text = format_json(&outcome());
        let parsed: SynthesisOutcome = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.per_model_responses.len(), 2);
        assert_eq!(parsed.synthesis, "merged answer");
    }
}
