//! Model access for the news agents.
//!
//! Agents depend only on the [`LlmProvider`] trait. [`AnthropicClient`] is
//! the production implementation over the Messages API, including the
//! server-side web search tool used by gatherers.
//!
//! ```ignore
//! use news_forge::llm::{AnthropicClient, GenerationRequest, LlmProvider, Message};
//!
//! let client = AnthropicClient::new(api_key, Duration::from_secs(600))?;
//! let request = GenerationRequest::new("claude-sonnet-4-5-20250929", vec![Message::user("Hi")])
//!     .with_web_search(3);
//! let response = client.generate(request).await?;
//! println!("{} ({} searches)", response.text(), response.search_count());
//! ```

pub mod client;

pub use client::{
    AnthropicClient, ContentBlock, GenerationRequest, GenerationResponse, LlmProvider, Message,
    Usage, WebSearchTool, DEFAULT_API_BASE,
};
