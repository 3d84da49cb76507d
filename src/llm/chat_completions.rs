//! `OpenAI` Chat Completions client.
//!
//! Issues one non-streaming `POST /v1/chat/completions` per request. No retries.

use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use super::{CompletionRequest, LlmSettings, TextGenerator};

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Client for the `OpenAI` Chat Completions API.
#[derive(Clone)]
pub struct ChatCompletionsClient {
    http: reqwest::Client,
    settings: LlmSettings,
    url: String,
}

impl std::fmt::Debug for ChatCompletionsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionsClient")
            .field("settings", &self.settings)
            .field("url", &self.url)
            .finish()
    }
}

impl ChatCompletionsClient {
    /// Create a client with the given settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(settings: LlmSettings) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .context("failed to build HTTP client")?;
        let url = completions_url(&settings.base_url);
        Ok(Self {
            http,
            settings,
            url,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Build the completions URL, accepting base URLs with or without a `/v1` suffix.
fn completions_url(base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if base.ends_with("/v1") {
        format!("{base}/chat/completions")
    } else {
        format!("{base}/v1/chat/completions")
    }
}

#[async_trait::async_trait]
impl TextGenerator for ChatCompletionsClient {
    async fn complete(&self, req: CompletionRequest) -> anyhow::Result<Option<String>> {
        let body = serde_json::json!({
            "model": self.settings.model,
            "messages": req.messages,
            "max_tokens": req.max_tokens,
        });

        let mut rb = self.http.post(&self.url).json(&body);
        if let Some(k) = &self.settings.api_key {
            rb = rb.bearer_auth(k);
        }

        tracing::debug!(
            url = %self.url,
            model = %self.settings.model,
            message_count = req.messages.len(),
            max_tokens = req.max_tokens,
            "Sending chat completion request"
        );

        let resp = rb.send().await?.error_for_status()?;
        let parsed: ChatCompletionResponse = resp
            .json()
            .await
            .context("malformed chat completion response")?;

        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completions_url_without_version() {
        assert_eq!(
            completions_url("https://api.openai.com"),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(
            completions_url("http://localhost:8080/"),
            "http://localhost:8080/v1/chat/completions"
        );
    }

    #[test]
    fn test_completions_url_with_version() {
        assert_eq!(
            completions_url("https://proxy.example.com/openai/v1/"),
            "https://proxy.example.com/openai/v1/chat/completions"
        );
    }

    #[test]
    fn test_parse_first_choice() {
        let parsed: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":" hi "}},{"message":{"content":"no"}}]}"#,
        )
        .unwrap();
        let first = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content);
        assert_eq!(first.as_deref(), Some(" hi "));
    }

    #[test]
    fn test_parse_missing_choices() {
        let parsed: ChatCompletionResponse = serde_json::from_str(r#"{"id":"x"}"#).unwrap();
        assert!(parsed.choices.is_empty());
    }

    #[test]
    fn test_debug_hides_api_key() {
        let settings = LlmSettings {
            base_url: "https://api.openai.com".to_string(),
            api_key: Some("sk-secret".to_string()),
            model: "gpt-4o-mini".to_string(),
            max_tokens: 150,
            request_timeout_secs: 30,
        };
        let client = ChatCompletionsClient::new(settings).unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("sk-secret"));
    }
}
