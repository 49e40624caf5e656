//! Chat-completion wire types
//!
//! Both upstreams speak the common chat-completion shape: request
//! `{model, messages, stream}`, response `choices[0].message.content` plus
//! `model` and `usage`.

use polychat_domain::{Message, Usage};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
    pub stream: bool,
}

impl<'a> ChatCompletionRequest<'a> {
    pub fn new(model: &'a str, messages: &'a [Message]) -> Self {
        Self {
            model,
            messages,
            stream: false,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub model: String,
    pub usage: Option<UsagePayload>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct UsagePayload {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

impl From<UsagePayload> for Usage {
    fn from(u: UsagePayload) -> Self {
        Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        }
    }
}

impl ChatCompletionResponse {
    /// The answer text, if the upstream produced any choice at all
    pub fn content(&self) -> Option<&str> {
        self.choices.first().map(|c| c.message.content.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_typical_completion_response() {
        let body = r#"{
            "id": "gen-123",
            "model": "openai/gpt-4o-mini",
            "choices": [{"message": {"role": "assistant", "content": "hello"}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
        }"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.content(), Some("hello"));
        assert_eq!(parsed.model, "openai/gpt-4o-mini");
        assert_eq!(Usage::from(parsed.usage.unwrap()).total_tokens, 15);
    }

    #[test]
    fn missing_choices_yield_no_content() {
        let parsed: ChatCompletionResponse = serde_json::from_str(r#"{"model":"m"}"#).unwrap();
        assert_eq!(parsed.content(), None);
    }

    #[test]
    fn request_serializes_roles_in_lowercase() {
        let messages = vec![Message::system("s"), Message::user("u")];
        let req = ChatCompletionRequest::new("some/model", &messages);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["stream"], false);
    }
}
