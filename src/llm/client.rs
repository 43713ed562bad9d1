//! Messages-API client for the external generative service.
//!
//! Every agent reaches the model through the [`LlmProvider`] trait so tests
//! can substitute a scripted provider. [`AnthropicClient`] is the HTTP
//! implementation used by the binary.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::LlmError;

/// Default base URL for the Messages API.
pub const DEFAULT_API_BASE: &str = "https://api.anthropic.com";

/// API version header value sent with every request.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Tool type identifier for the server-side web search tool.
const WEB_SEARCH_TOOL_TYPE: &str = "web_search_20250305";

/// A message in a conversation with an LLM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender.
    pub role: String,
    /// Content of the message.
    pub content: String,
}

impl Message {
    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Server-side web search directive with a cap on sub-queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebSearchTool {
    /// Maximum number of searches the model may issue for this request.
    pub max_uses: u32,
}

/// Request for text generation from an LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model identifier to use for generation.
    pub model: String,
    /// Conversation messages.
    pub messages: Vec<Message>,
    /// Maximum number of tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Optional web search budget.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_search: Option<WebSearchTool>,
}

impl GenerationRequest {
    /// Default output budget when none is set explicitly.
    pub const DEFAULT_MAX_TOKENS: u32 = 8000;

    /// Create a new generation request with default parameters.
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            max_tokens: Self::DEFAULT_MAX_TOKENS,
            temperature: None,
            web_search: None,
        }
    }

    /// Set the max tokens for this request.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the temperature for this request.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Enable web search with at most `max_uses` searches.
    pub fn with_web_search(mut self, max_uses: u32) -> Self {
        self.web_search = Some(WebSearchTool { max_uses });
        self
    }

    /// Concatenated content of all user messages, mostly useful in tests.
    pub fn prompt_text(&self) -> String {
        self.messages
            .iter()
            .filter(|m| m.role == "user")
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// One block of returned content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ContentBlock {
    /// Generated text.
    Text(String),
    /// Tool activity (search calls, search results) that carries no text for us.
    ToolActivity,
}

/// Token and tool usage statistics for a generation request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    /// Number of tokens in the prompt.
    pub input_tokens: u32,
    /// Number of tokens generated.
    pub output_tokens: u32,
    /// Number of web searches the service performed.
    pub web_search_requests: u32,
}

/// Response from an LLM generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Unique identifier for this response.
    pub id: String,
    /// Model that generated this response.
    pub model: String,
    /// Reason the generation stopped (e.g., "end_turn", "max_tokens").
    pub stop_reason: Option<String>,
    /// Returned content blocks in order.
    pub content: Vec<ContentBlock>,
    /// Usage statistics.
    pub usage: Usage,
}

impl GenerationResponse {
    /// Convenience constructor for a single text block response.
    pub fn from_text(model: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            model: model.into(),
            stop_reason: Some("end_turn".to_string()),
            content: vec![ContentBlock::Text(text.into())],
            usage: Usage::default(),
        }
    }

    /// Set the reported web search count.
    pub fn with_search_count(mut self, searches: u32) -> Self {
        self.usage.web_search_requests = searches;
        self
    }

    /// All text blocks joined in order.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text(text) => Some(text.as_str()),
                ContentBlock::ToolActivity => None,
            })
            .collect()
    }

    /// Whether any text block is present.
    pub fn has_text(&self) -> bool {
        self.content
            .iter()
            .any(|block| matches!(block, ContentBlock::Text(_)))
    }

    /// Number of web searches reported by the service.
    pub fn search_count(&self) -> u32 {
        self.usage.web_search_requests
    }
}

/// Trait for LLM providers that can generate text.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a response for the given request.
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, LlmError>;
}

/// HTTP client for the Messages API.
pub struct AnthropicClient {
    /// Base URL for the API.
    api_base: String,
    /// API key for authentication.
    api_key: String,
    /// HTTP client for making API requests.
    http_client: Client,
}

impl std::fmt::Debug for AnthropicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicClient")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl AnthropicClient {
    /// Create a new client against the default API base.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::MissingApiKey` for an empty key and
    /// `LlmError::ClientBuild` if the HTTP client cannot be constructed.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, LlmError> {
        Self::with_base_url(api_key, DEFAULT_API_BASE, timeout)
    }

    /// Create a new client against a custom API base (proxies, test servers).
    pub fn with_base_url(
        api_key: impl Into<String>,
        api_base: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::MissingApiKey);
        }

        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::ClientBuild(e.to_string()))?;

        Ok(Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_key,
            http_client,
        })
    }

    /// Get the API base URL.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }
}

/// Internal request structure for the Messages API.
#[derive(Debug, Serialize)]
struct ApiRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ApiTool>,
}

impl From<GenerationRequest> for ApiRequest {
    fn from(request: GenerationRequest) -> Self {
        let tools = request
            .web_search
            .map(|search| ApiTool {
                tool_type: WEB_SEARCH_TOOL_TYPE.to_string(),
                name: "web_search".to_string(),
                max_uses: search.max_uses,
            })
            .into_iter()
            .collect();

        Self {
            model: request.model,
            max_tokens: request.max_tokens,
            messages: request.messages,
            temperature: request.temperature,
            tools,
        }
    }
}

/// Server tool declaration.
#[derive(Debug, Serialize)]
struct ApiTool {
    #[serde(rename = "type")]
    tool_type: String,
    name: String,
    max_uses: u32,
}

/// Internal response structure from the Messages API.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    id: String,
    model: String,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    content: Vec<ApiContentBlock>,
    #[serde(default)]
    usage: ApiUsage,
}

/// Internal content block; anything but text is opaque to us.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ApiContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

/// Internal usage structure from the API response.
#[derive(Debug, Default, Deserialize)]
struct ApiUsage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
    #[serde(default)]
    server_tool_use: Option<ApiServerToolUse>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiServerToolUse {
    #[serde(default)]
    web_search_requests: u32,
}

/// Error response from the API.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

/// Error detail from the API.
#[derive(Debug, Deserialize)]
#[allow(dead_code)] // Fields kept for complete API error deserialization
struct ApiErrorDetail {
    #[serde(rename = "type")]
    error_type: Option<String>,
    message: String,
}

impl From<ApiResponse> for GenerationResponse {
    fn from(api: ApiResponse) -> Self {
        let content = api
            .content
            .into_iter()
            .map(|block| match block {
                ApiContentBlock::Text { text } => ContentBlock::Text(text),
                ApiContentBlock::Other => ContentBlock::ToolActivity,
            })
            .collect();

        Self {
            id: api.id,
            model: api.model,
            stop_reason: api.stop_reason,
            content,
            usage: Usage {
                input_tokens: api.usage.input_tokens,
                output_tokens: api.usage.output_tokens,
                web_search_requests: api
                    .usage
                    .server_tool_use
                    .map(|u| u.web_search_requests)
                    .unwrap_or(0),
            },
        }
    }
}

#[async_trait]
impl LlmProvider for AnthropicClient {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, LlmError> {
        let api_request = ApiRequest::from(request);
        let url = format!("{}/v1/messages", self.api_base);

        tracing::debug!(
            model = %api_request.model,
            max_tokens = api_request.max_tokens,
            tools = api_request.tools.len(),
            "Sending Messages API request"
        );

        let http_response = self
            .http_client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&api_request)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        let status = http_response.status();

        if !status.is_success() {
            let status_code = status.as_u16();

            let error_text = http_response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response".to_string());

            if let Ok(error_response) = serde_json::from_str::<ApiErrorResponse>(&error_text) {
                if status_code == 429 {
                    return Err(LlmError::RateLimited(error_response.error.message));
                }

                return Err(LlmError::ApiError {
                    code: status_code,
                    message: error_response.error.message,
                });
            }

            return Err(LlmError::ApiError {
                code: status_code,
                message: error_text,
            });
        }

        let api_response: ApiResponse = http_response
            .json()
            .await
            .map_err(|e| LlmError::ParseError(format!("Failed to parse API response: {}", e)))?;

        Ok(api_response.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_request_builder() {
        let request = GenerationRequest::new("model-a", vec![Message::user("test")])
            .with_max_tokens(1000)
            .with_temperature(0.7)
            .with_web_search(3);

        assert_eq!(request.model, "model-a");
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.max_tokens, 1000);
        assert_eq!(request.temperature, Some(0.7));
        assert_eq!(request.web_search, Some(WebSearchTool { max_uses: 3 }));
        assert_eq!(request.prompt_text(), "test");
    }

    #[test]
    fn test_api_request_serialization_with_search() {
        let request = GenerationRequest::new("model-a", vec![Message::user("find news")])
            .with_max_tokens(8000)
            .with_web_search(2);

        let json = serde_json::to_value(ApiRequest::from(request)).expect("serializes");
        assert_eq!(json["model"], "model-a");
        assert_eq!(json["max_tokens"], 8000);
        assert_eq!(json["tools"][0]["type"], "web_search_20250305");
        assert_eq!(json["tools"][0]["name"], "web_search");
        assert_eq!(json["tools"][0]["max_uses"], 2);
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn test_api_request_serialization_without_tools() {
        let request = GenerationRequest::new("model-a", vec![Message::user("curate")]);
        let json = serde_json::to_string(&ApiRequest::from(request)).expect("serializes");
        assert!(!json.contains("tools"));
    }

    #[test]
    fn test_api_response_conversion() {
        let body = r#"{
            "id": "msg_01",
            "model": "model-a",
            "stop_reason": "end_turn",
            "content": [
                {"type": "text", "text": "Searching. "},
                {"type": "server_tool_use", "id": "srv_1", "name": "web_search", "input": {"query": "news"}},
                {"type": "web_search_tool_result", "tool_use_id": "srv_1", "content": []},
                {"type": "text", "text": "{\"articles\": []}"}
            ],
            "usage": {
                "input_tokens": 120,
                "output_tokens": 40,
                "server_tool_use": {"web_search_requests": 2}
            }
        }"#;

        let api: ApiResponse = serde_json::from_str(body).expect("deserializes");
        let response = GenerationResponse::from(api);

        assert_eq!(response.content.len(), 4);
        assert_eq!(response.text(), "Searching. {\"articles\": []}");
        assert_eq!(response.search_count(), 2);
        assert_eq!(response.usage.input_tokens, 120);
        assert_eq!(response.stop_reason.as_deref(), Some("end_turn"));
    }

    #[test]
    fn test_api_response_without_tool_usage() {
        let body = r#"{"id": "msg_02", "model": "m", "content": [], "usage": {"input_tokens": 1, "output_tokens": 0}}"#;
        let api: ApiResponse = serde_json::from_str(body).expect("deserializes");
        let response = GenerationResponse::from(api);

        assert_eq!(response.search_count(), 0);
        assert!(!response.has_text());
        assert_eq!(response.text(), "");
    }

    #[test]
    fn test_client_rejects_empty_key() {
        let result = AnthropicClient::new("  ", Duration::from_secs(5));
        assert!(matches!(result, Err(LlmError::MissingApiKey)));
    }

    #[test]
    fn test_client_trims_base_url() {
        let client =
            AnthropicClient::with_base_url("key", "http://localhost:4000/", Duration::from_secs(5))
                .expect("client builds");
        assert_eq!(client.api_base(), "http://localhost:4000");
    }

    #[tokio::test]
    async fn test_generate_connection_error() {
        let client = AnthropicClient::with_base_url(
            "key",
            "http://localhost:65535",
            Duration::from_secs(5),
        )
        .expect("client builds");

        let request = GenerationRequest::new("model-a", vec![Message::user("test")]);
        let result = client.generate(request).await;

        assert!(matches!(result, Err(LlmError::RequestFailed(_))));
    }
}
