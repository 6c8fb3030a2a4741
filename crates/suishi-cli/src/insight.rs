//! Seasonal insight generation over HTTP.
//!
//! Talks to either the Anthropic messages API or any OpenAI-compatible chat
//! endpoint, picked from the URL. Every failure collapses to a fixed
//! fallback record at [`fetch_insight`]; callers never see an error.

use std::fmt;

use futures_util::future::BoxFuture;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use suishi_core::{Insight, Term, insight_prompt, parse_insight};

use crate::config::InsightConfig;

const MAX_TOKENS: u32 = 1024;
const SYSTEM_PROMPT: &str = "你是二十四节气与中医养生方面的专家。只输出 JSON。";

#[derive(Debug)]
pub enum InsightError {
    /// No API key configured; no request was made.
    MissingCredential,
    Http(String),
    Status(u16, String),
    EmptyResponse,
    Malformed(String),
}

impl fmt::Display for InsightError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsightError::MissingCredential => write!(f, "no API key configured"),
            InsightError::Http(e) => write!(f, "request failed: {e}"),
            InsightError::Status(code, body) => write!(f, "API error {code}: {body}"),
            InsightError::EmptyResponse => write!(f, "empty response"),
            InsightError::Malformed(text) => write!(f, "unparseable insight: {text}"),
        }
    }
}

impl std::error::Error for InsightError {}

/// Anything that can produce an [`Insight`] for a term.
pub trait InsightSource: Send + Sync {
    fn generate<'a>(&'a self, term: &'a Term) -> BoxFuture<'a, Result<Insight, InsightError>>;
}

/// Generate an insight, substituting the fixed records on failure.
pub async fn fetch_insight(source: &dyn InsightSource, term: &Term) -> Insight {
    match source.generate(term).await {
        Ok(insight) => insight,
        Err(InsightError::MissingCredential) => {
            tracing::debug!("no API key, returning placeholder insight for {}", term.name);
            Insight::missing_credential()
        }
        Err(e) => {
            tracing::warn!("insight generation failed for {}: {e}", term.name);
            Insight::fallback()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiFormat {
    Anthropic,
    OpenAI,
}

impl ApiFormat {
    fn detect(url: &str) -> Self {
        if url.contains("anthropic.com") {
            ApiFormat::Anthropic
        } else {
            ApiFormat::OpenAI
        }
    }
}

pub struct HttpInsightSource {
    client: Client,
    api_key: Option<String>,
    api_url: String,
    model: String,
    api_format: ApiFormat,
}

impl HttpInsightSource {
    pub fn new(api_key: Option<String>, api_url: String, model: String) -> Self {
        let api_format = ApiFormat::detect(&api_url);
        Self {
            client: Client::new(),
            api_key,
            api_url,
            model,
            api_format,
        }
    }

    /// Reads the key from the environment variable named in `config`.
    pub fn from_config(config: &InsightConfig) -> Self {
        Self::new(config.api_key(), config.api_url.clone(), config.model.clone())
    }

    async fn complete(&self, api_key: &str, prompt: &str) -> Result<String, InsightError> {
        let request = match self.api_format {
            ApiFormat::Anthropic => self
                .client
                .post(&self.api_url)
                .header("x-api-key", api_key)
                .header("anthropic-version", "2023-06-01")
                .json(&AnthropicRequest {
                    model: &self.model,
                    max_tokens: MAX_TOKENS,
                    system: SYSTEM_PROMPT,
                    messages: vec![Message {
                        role: "user",
                        content: prompt,
                    }],
                }),
            ApiFormat::OpenAI => self
                .client
                .post(&self.api_url)
                .bearer_auth(api_key)
                .json(&OpenAIRequest {
                    model: &self.model,
                    max_tokens: MAX_TOKENS,
                    messages: vec![
                        Message {
                            role: "system",
                            content: SYSTEM_PROMPT,
                        },
                        Message {
                            role: "user",
                            content: prompt,
                        },
                    ],
                }),
        };

        let response = request
            .send()
            .await
            .map_err(|e| InsightError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InsightError::Status(status.as_u16(), body));
        }

        let text = match self.api_format {
            ApiFormat::Anthropic => response
                .json::<AnthropicResponse>()
                .await
                .map_err(|e| InsightError::Http(e.to_string()))?
                .content
                .into_iter()
                .next()
                .map(|c| c.text),
            ApiFormat::OpenAI => response
                .json::<OpenAIResponse>()
                .await
                .map_err(|e| InsightError::Http(e.to_string()))?
                .choices
                .into_iter()
                .next()
                .map(|c| c.message.content),
        };
        text.ok_or(InsightError::EmptyResponse)
    }
}

impl InsightSource for HttpInsightSource {
    fn generate<'a>(&'a self, term: &'a Term) -> BoxFuture<'a, Result<Insight, InsightError>> {
        Box::pin(async move {
            let Some(api_key) = self.api_key.as_deref() else {
                return Err(InsightError::MissingCredential);
            };
            tracing::debug!("requesting insight for {} from {}", term.name, self.api_url);
            let text = self.complete(api_key, &insight_prompt(term)).await?;
            parse_insight(&text).ok_or(InsightError::Malformed(text))
        })
    }
}

// Anthropic messages API
#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: String,
}

// OpenAI-compatible chat completions
#[derive(Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

/// Canned source for tests: fixed result, optional delay before answering.
#[cfg(test)]
pub struct StubSource {
    pub result: fn() -> Result<Insight, InsightError>,
    pub delay: std::time::Duration,
}

#[cfg(test)]
impl InsightSource for StubSource {
    fn generate<'a>(&'a self, _term: &'a Term) -> BoxFuture<'a, Result<Insight, InsightError>> {
        Box::pin(async move {
            tokio::time::sleep(self.delay).await;
            (self.result)()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use suishi_core::TermTable;

    fn stub(result: fn() -> Result<Insight, InsightError>) -> StubSource {
        StubSource {
            result,
            delay: Duration::ZERO,
        }
    }

    #[test]
    fn test_detect_api_format() {
        assert_eq!(
            ApiFormat::detect("https://api.anthropic.com/v1/messages"),
            ApiFormat::Anthropic
        );
        assert_eq!(
            ApiFormat::detect("https://api.deepseek.com/chat/completions"),
            ApiFormat::OpenAI
        );
    }

    #[tokio::test]
    async fn test_missing_key_skips_network() {
        // unroutable URL: any request attempt would fail with Http, not MissingCredential
        let source = HttpInsightSource::new(None, "http://127.0.0.1:9/".into(), "m".into());
        let table = TermTable::builtin();
        let term = table.by_id(1).unwrap();
        assert!(matches!(
            source.generate(term).await,
            Err(InsightError::MissingCredential)
        ));
        assert_eq!(fetch_insight(&source, term).await, Insight::missing_credential());
    }

    #[tokio::test]
    async fn test_failure_returns_fallback() {
        let table = TermTable::builtin();
        let term = table.by_id(5).unwrap();
        let source = stub(|| Err(InsightError::Status(500, "boom".into())));
        assert_eq!(fetch_insight(&source, term).await, Insight::fallback());

        let source = stub(|| Err(InsightError::Malformed("{}".into())));
        assert_eq!(fetch_insight(&source, term).await, Insight::fallback());
    }

    #[tokio::test]
    async fn test_success_passes_through() {
        let table = TermTable::builtin();
        let source = stub(|| {
            Ok(Insight {
                poem: "p".into(),
                advice: "a".into(),
                food: "f".into(),
            })
        });
        let insight = fetch_insight(&source, table.by_id(9).unwrap()).await;
        assert_eq!(insight.poem, "p");
    }

    #[test]
    fn test_openai_request_shape() {
        let body = serde_json::to_value(OpenAIRequest {
            model: "deepseek-chat",
            max_tokens: MAX_TOKENS,
            messages: vec![Message {
                role: "user",
                content: "hi",
            }],
        })
        .unwrap();
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["max_tokens"], 1024);
    }

    #[test]
    fn test_anthropic_response_parses() {
        let resp: AnthropicResponse =
            serde_json::from_str(r#"{"content":[{"type":"text","text":"{}"}],"id":"x"}"#)
                .unwrap();
        assert_eq!(resp.content[0].text, "{}");
    }
}
