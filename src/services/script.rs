use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::project::script::word_count;

/// Script shown in place of a generated one when generation fails.
pub const FALLBACK_SCRIPT: &str = "Failed to generate the script. Please try again.";

const DEFAULT_STYLE: &str = "engaging";
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const SYSTEM_PROMPT: &str = "You are a professional YouTube Shorts scriptwriter. Create scripts that are engaging, concise, and perfect for TTS generation.";

/// Why a generator produced no script.
#[derive(thiserror::Error, Debug)]
pub enum ScriptError {
    /// The provider account is out of quota.
    #[error("script provider quota exceeded")]
    QuotaExceeded,
    /// Any other provider or transport failure.
    #[error("script generation failed: {0}")]
    Failed(String),
}

/// Produces a short-form video script for a topic.
#[async_trait]
pub trait ScriptGenerator: Send + Sync {
    /// Generate a script about `topic` in `style`.
    async fn generate(&self, topic: &str, style: &str) -> Result<String, ScriptError>;
}

/// Script generator backed by the OpenAI chat completions API.
#[derive(Clone, Debug)]
pub struct OpenAiScriptGenerator {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    language: String,
}

impl OpenAiScriptGenerator {
    /// Generator authenticating with `api_key`.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: OPENAI_BASE_URL.to_owned(),
            model: "gpt-3.5-turbo".to_owned(),
            language: "Korean".to_owned(),
        }
    }

    /// Generator configured from `OPENAI_API_KEY`, if set and non-empty.
    pub fn from_env() -> Option<Self> {
        std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .map(Self::new)
    }

    /// Point at an OpenAI-compatible endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    /// Language the script is written in.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    fn prompt(&self, topic: &str, style: &str) -> String {
        format!(
            "Create an engaging YouTube Shorts script about \"{topic}\".\n\n\
             Requirements:\n\
             - Duration: 30-60 seconds when spoken\n\
             - Style: {style}, attention-grabbing\n\
             - Structure: Hook + Main content + Call to action\n\
             - Language: {language}\n\
             - Format: Natural speaking style for TTS\n\n\
             The script should be:\n\
             - Conversational and easy to understand\n\
             - Suitable for short-form video content\n\
             - Include emotional hooks to keep viewers engaged\n\
             - End with a strong call to action\n\n\
             Topic: {topic}\n",
            language = self.language
        )
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    code: Option<String>,
    #[serde(default)]
    message: String,
}

#[async_trait]
impl ScriptGenerator for OpenAiScriptGenerator {
    async fn generate(&self, topic: &str, style: &str) -> Result<String, ScriptError> {
        let prompt = self.prompt(topic, style);
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            max_tokens: 500,
            temperature: 0.7,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ScriptError::Failed(format!("request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ScriptError::Failed(format!("failed to read response: {e}")))?;
        if !status.is_success() {
            return Err(classify_api_error(status.as_u16(), &body));
        }
        parse_completion(&body)
    }
}

/// Map a non-success provider response to a [`ScriptError`].
pub(crate) fn classify_api_error(status: u16, body: &str) -> ScriptError {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(b) if b.error.code.as_deref() == Some("insufficient_quota") => ScriptError::QuotaExceeded,
        Ok(b) => ScriptError::Failed(format!("provider returned {status}: {}", b.error.message)),
        Err(_) => ScriptError::Failed(format!("provider returned {status}")),
    }
}

/// Script text of the first completion choice; empty when the provider returned none.
pub(crate) fn parse_completion(body: &str) -> Result<String, ScriptError> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| ScriptError::Failed(format!("malformed completion: {e}")))?;
    Ok(parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .unwrap_or_default())
}

/// Body of a script generation request.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ScriptRequest {
    /// Topic to write about. Required.
    #[serde(default)]
    pub topic: Option<String>,
    /// Tone of the script; `engaging` when absent.
    #[serde(default)]
    pub style: Option<String>,
}

/// Successful script generation body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptResponse {
    /// Generated script.
    pub script: String,
    /// Topic echoed back.
    pub topic: String,
    /// Whitespace-separated words in `script`.
    pub word_count: usize,
}

/// Status code and JSON body of a handled request.
#[derive(Clone, Debug, PartialEq)]
pub struct ServiceResponse {
    /// HTTP-style status code.
    pub status: u16,
    /// JSON body: a [`ScriptResponse`] on success, `{"error": ..}` otherwise.
    pub body: serde_json::Value,
}

impl ServiceResponse {
    fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            body: json!({ "error": message }),
        }
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Script from a successful body, or [`FALLBACK_SCRIPT`] for any failure.
    pub fn script_or_fallback(&self) -> String {
        if !self.is_success() {
            return FALLBACK_SCRIPT.to_owned();
        }
        self.body
            .get("script")
            .and_then(|s| s.as_str())
            .map_or_else(|| FALLBACK_SCRIPT.to_owned(), str::to_owned)
    }
}

/// Request/response surface over a [`ScriptGenerator`].
#[derive(Debug)]
pub struct ScriptService<G> {
    generator: G,
}

impl<G: ScriptGenerator> ScriptService<G> {
    /// Serve requests with `generator`.
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    /// Parse a JSON body and handle it. Unparseable bodies are a 500, as any other failure.
    pub async fn handle_json(&self, body: &str) -> ServiceResponse {
        match serde_json::from_str::<ScriptRequest>(body) {
            Ok(req) => self.handle(req).await,
            Err(e) => {
                tracing::warn!(error = %e, "malformed script request");
                ServiceResponse::error(500, "Failed to generate script")
            }
        }
    }

    /// Handle one request: 400 without a topic, 429 on quota exhaustion, 500 on other failures.
    #[tracing::instrument(skip_all)]
    pub async fn handle(&self, req: ScriptRequest) -> ServiceResponse {
        let Some(topic) = req.topic.filter(|t| !t.trim().is_empty()) else {
            return ServiceResponse::error(400, "Topic is required");
        };
        let style = req.style.unwrap_or_else(|| DEFAULT_STYLE.to_owned());

        match self.generator.generate(&topic, &style).await {
            Ok(script) => {
                let response = ScriptResponse {
                    word_count: word_count(&script),
                    script,
                    topic,
                };
                tracing::info!(words = response.word_count, "script generated");
                match serde_json::to_value(&response) {
                    Ok(body) => ServiceResponse { status: 200, body },
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to encode script response");
                        ServiceResponse::error(500, "Failed to generate script")
                    }
                }
            }
            Err(ScriptError::QuotaExceeded) => {
                tracing::warn!("script provider quota exceeded");
                ServiceResponse::error(429, "OpenAI API quota exceeded")
            }
            Err(e) => {
                tracing::warn!(error = %e, "script generation failed");
                ServiceResponse::error(500, "Failed to generate script")
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/services/script.rs"]
mod tests;
